mod commuter_sink;
mod lifecycle_event;

pub use commuter_sink::{
    load_rows_json, CommuterFilter, CommuterRow, CommuterSink, InMemoryCommuterSink, SinkError,
};
pub use lifecycle_event::{LifecycleEvent, LifecycleEventKind};
