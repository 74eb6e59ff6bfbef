use super::{Commuter, CommuterId, CommuterQueue, Direction};
use itertools::Itertools;
use ridesim_geo::assembly::RouteGeometry;
use ridesim_geo::location::Coordinate;
use rstar::{primitives::GeomWithData, RTree};
use std::collections::HashMap;

const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

pub type CellKey = (i64, i64);

/// one spatial partition of the route polyline. each cell owns two
/// independent FIFO queues, one per travel direction.
#[derive(Debug)]
struct GridCell {
    centroid: Coordinate,
    outbound: CommuterQueue,
    inbound: CommuterQueue,
}

impl GridCell {
    fn queue(&self, direction: Direction) -> &CommuterQueue {
        match direction {
            Direction::Outbound => &self.outbound,
            Direction::Inbound => &self.inbound,
        }
    }

    fn queue_mut(&mut self, direction: Direction) -> &mut CommuterQueue {
        match direction {
            Direction::Outbound => &mut self.outbound,
            Direction::Inbound => &mut self.inbound,
        }
    }

    fn len(&self) -> usize {
        self.outbound.len() + self.inbound.len()
    }
}

/// grid-partitioned commuter container used by route reservoirs. the
/// assembled route polyline is quantized into fixed-size cells sized around
/// the boarding proximity threshold; spawned commuters land in the cell
/// nearest their origin and boarding requests match the nearest waiting
/// group.
pub struct RouteSegmentIndex {
    cells: HashMap<CellKey, GridCell>,
    tree: RTree<GeomWithData<[f64; 2], CellKey>>,
    lat_step: f64,
    lon_step: f64,
}

impl RouteSegmentIndex {
    pub fn from_geometry(geometry: &RouteGeometry, cell_size_m: f64) -> RouteSegmentIndex {
        let mean_lat = if geometry.points.is_empty() {
            0.0
        } else {
            geometry.points.iter().map(|p| p.lat).sum::<f64>() / geometry.points.len() as f64
        };
        let lat_step = cell_size_m / METERS_PER_DEGREE_LAT;
        let lon_scale = mean_lat.to_radians().cos().abs().max(0.01);
        let lon_step = cell_size_m / (METERS_PER_DEGREE_LAT * lon_scale);

        // accumulate polyline vertices per cell, centroid = vertex mean
        let mut sums: HashMap<CellKey, (f64, f64, usize)> = HashMap::new();
        for point in geometry.points.iter() {
            let key = quantize(point, lat_step, lon_step);
            let entry = sums.entry(key).or_insert((0.0, 0.0, 0));
            entry.0 += point.lat;
            entry.1 += point.lon;
            entry.2 += 1;
        }

        let mut cells = HashMap::with_capacity(sums.len());
        let mut tree_entries = Vec::with_capacity(sums.len());
        for (key, (lat_sum, lon_sum, count)) in sums {
            let centroid = Coordinate::new(lat_sum / count as f64, lon_sum / count as f64);
            tree_entries.push(GeomWithData::new([centroid.lon, centroid.lat], key));
            cells.insert(
                key,
                GridCell {
                    centroid,
                    outbound: CommuterQueue::new(),
                    inbound: CommuterQueue::new(),
                },
            );
        }

        RouteSegmentIndex {
            cells,
            tree: RTree::bulk_load(tree_entries),
            lat_step,
            lon_step,
        }
    }

    /// the grid cell whose centroid lies nearest the coordinate
    pub fn nearest_cell(&self, coordinate: &Coordinate) -> Option<CellKey> {
        self.tree
            .nearest_neighbor(&[coordinate.lon, coordinate.lat])
            .map(|entry| entry.data)
    }

    pub fn cell_centroid(&self, key: &CellKey) -> Option<Coordinate> {
        self.cells.get(key).map(|cell| cell.centroid)
    }

    /// inserts into the cell nearest the commuter's origin, returning the
    /// chosen cell key. None when the index has no cells.
    pub fn add(&mut self, commuter: Commuter) -> Option<CellKey> {
        let key = self.nearest_cell(&commuter.origin)?;
        let direction = commuter.direction;
        self.cells.get_mut(&key)?.queue_mut(direction).add(commuter);
        Some(key)
    }

    /// pops the oldest waiting commuter in a cell's directional queue
    pub fn get_next(&mut self, key: &CellKey, direction: Direction) -> Option<Commuter> {
        self.cells.get_mut(key)?.queue_mut(direction).get_next()
    }

    pub fn take_by_id(&mut self, id: CommuterId) -> Option<Commuter> {
        let keys: Vec<CellKey> = self.cells.keys().copied().sorted().collect();
        for key in keys {
            if let Some(cell) = self.cells.get_mut(&key) {
                if let Some(found) = cell
                    .outbound
                    .take_by_id(id)
                    .or_else(|| cell.inbound.take_by_id(id))
                {
                    return Some(found);
                }
            }
        }
        None
    }

    /// idempotent: false when the id is absent everywhere
    pub fn remove_by_id(&mut self, id: CommuterId) -> bool {
        self.take_by_id(id).is_some()
    }

    /// snapshot across all cells, in stable cell-key order
    pub fn get_all(&self) -> Vec<Commuter> {
        self.cells
            .iter()
            .sorted_by_key(|(key, _)| **key)
            .flat_map(|(_, cell)| {
                cell.outbound
                    .get_all()
                    .into_iter()
                    .chain(cell.inbound.get_all())
            })
            .collect()
    }

    pub fn get_all_in_cell(&self, key: &CellKey, direction: Direction) -> Vec<Commuter> {
        self.cells
            .get(key)
            .map(|cell| cell.queue(direction).get_all())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.cells.values().map(|cell| cell.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn cell_size_degrees(&self) -> (f64, f64) {
        (self.lat_step, self.lon_step)
    }
}

fn quantize(point: &Coordinate, lat_step: f64, lon_step: f64) -> CellKey {
    (
        (point.lat / lat_step).floor() as i64,
        (point.lon / lon_step).floor() as i64,
    )
}

#[cfg(test)]
mod test {
    use super::RouteSegmentIndex;
    use crate::model::commuter::{Commuter, Direction};
    use ridesim_geo::assembly::{assemble, ShapeSegment};
    use ridesim_geo::location::Coordinate;

    /// a straight east-west route near the equator, about 2.2km long
    fn geometry() -> ridesim_geo::assembly::RouteGeometry {
        let points = (0..21)
            .map(|i| Coordinate::new(0.0, i as f64 * 0.001))
            .collect();
        let segments = vec![ShapeSegment::new("s1", points)];
        assemble("20", &segments).expect("fixture assembly failed")
    }

    fn commuter(id: u64, origin: Coordinate, direction: Direction) -> Commuter {
        Commuter::new(id, origin, Coordinate::new(0.0, 0.02), direction, "20")
    }

    #[test]
    fn test_polyline_partitions_into_multiple_cells() {
        let index = RouteSegmentIndex::from_geometry(&geometry(), 250.0);
        assert!(index.cell_count() > 1);
        assert!(index.is_empty());
    }

    #[test]
    fn test_add_places_commuter_in_nearest_cell() {
        let mut index = RouteSegmentIndex::from_geometry(&geometry(), 250.0);
        let west_origin = Coordinate::new(0.0001, 0.0002);
        let east_origin = Coordinate::new(0.0001, 0.0198);
        let west_cell = index
            .add(commuter(1, west_origin, Direction::Outbound))
            .expect("no cell for west origin");
        let east_cell = index
            .add(commuter(2, east_origin, Direction::Outbound))
            .expect("no cell for east origin");
        assert_ne!(west_cell, east_cell);
        assert_eq!(index.nearest_cell(&west_origin), Some(west_cell));
    }

    #[test]
    fn test_directional_queues_are_independent() {
        let mut index = RouteSegmentIndex::from_geometry(&geometry(), 250.0);
        let origin = Coordinate::new(0.0, 0.0101);
        let cell = index
            .add(commuter(1, origin, Direction::Outbound))
            .expect("add failed");
        index.add(commuter(2, origin, Direction::Inbound));
        index.add(commuter(3, origin, Direction::Outbound));

        assert_eq!(index.get_all_in_cell(&cell, Direction::Outbound).len(), 2);
        let next_out = index
            .get_next(&cell, Direction::Outbound)
            .expect("outbound queue empty");
        assert_eq!(next_out.id, 1);
        let next_in = index
            .get_next(&cell, Direction::Inbound)
            .expect("inbound queue empty");
        assert_eq!(next_in.id, 2);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_remove_by_id_scans_all_cells() {
        let mut index = RouteSegmentIndex::from_geometry(&geometry(), 250.0);
        index.add(commuter(1, Coordinate::new(0.0, 0.0002), Direction::Outbound));
        index.add(commuter(2, Coordinate::new(0.0, 0.0198), Direction::Inbound));
        assert!(index.remove_by_id(2));
        assert!(!index.remove_by_id(2));
        assert_eq!(index.len(), 1);
    }
}
