mod assembler;
mod catalog;
mod geometry_error;
mod route_geometry;
mod shape;

pub use assembler::{assemble, RouteGeometryAssembler};
pub use catalog::{
    fetch_all_links, fetch_all_points, InMemoryShapeCatalog, Page, ShapeCatalog,
    DEFAULT_PAGE_SIZE,
};
pub use geometry_error::GeometryError;
pub use route_geometry::{RouteGeometry, SEAM_GAP_WARN_METERS};
pub use shape::{RouteShapeLink, ShapePoint, ShapeSegment};
