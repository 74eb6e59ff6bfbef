mod commuter;
mod commuter_queue;
mod segment_index;

pub use commuter::{Commuter, CommuterId, CommuterStatus, Direction};
pub use commuter_queue::CommuterQueue;
pub use segment_index::{CellKey, RouteSegmentIndex};
