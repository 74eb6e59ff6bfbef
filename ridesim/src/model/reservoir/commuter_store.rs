use super::ReservoirError;
use crate::model::commuter::{Commuter, CommuterId, CommuterQueue, Direction, RouteSegmentIndex};
use ridesim_geo::location::Coordinate;

/// the ownership container behind a reservoir: a plain FIFO for depots, a
/// grid-partitioned index for routes. all mutation happens under the
/// reservoir's state lock.
pub enum CommuterStore {
    Depot(CommuterQueue),
    Route(Box<RouteSegmentIndex>),
}

impl CommuterStore {
    pub fn insert(&mut self, commuter: Commuter) -> Result<(), ReservoirError> {
        match self {
            CommuterStore::Depot(queue) => {
                queue.add(commuter);
                Ok(())
            }
            CommuterStore::Route(index) => {
                let origin = commuter.origin;
                index.add(commuter).map(|_| ()).ok_or_else(|| {
                    ReservoirError::NoCellAvailable {
                        lat: origin.lat,
                        lon: origin.lon,
                    }
                })
            }
        }
    }

    /// pops the oldest waiting commuter: depots ignore the location, routes
    /// match the nearest grid cell's directional queue
    pub fn next(&mut self, near: Option<&Coordinate>, direction: Direction) -> Option<Commuter> {
        match self {
            CommuterStore::Depot(queue) => queue.get_next(),
            CommuterStore::Route(index) => {
                let cell = index.nearest_cell(near?)?;
                index.get_next(&cell, direction)
            }
        }
    }

    pub fn take_by_id(&mut self, id: CommuterId) -> Option<Commuter> {
        match self {
            CommuterStore::Depot(queue) => queue.take_by_id(id),
            CommuterStore::Route(index) => index.take_by_id(id),
        }
    }

    pub fn get_all(&self) -> Vec<Commuter> {
        match self {
            CommuterStore::Depot(queue) => queue.get_all(),
            CommuterStore::Route(index) => index.get_all(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            CommuterStore::Depot(queue) => queue.len(),
            CommuterStore::Route(index) => index.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
