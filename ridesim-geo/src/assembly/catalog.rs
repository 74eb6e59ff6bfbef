use super::{GeometryError, RouteShapeLink, ShapePoint};
use std::path::Path;

pub const DEFAULT_PAGE_SIZE: usize = 500;

/// a window into a paginated catalog read
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub offset: usize,
    pub limit: usize,
}

impl Page {
    pub fn first(limit: usize) -> Page {
        Page { offset: 0, limit }
    }

    pub fn next(&self) -> Page {
        Page {
            offset: self.offset + self.limit,
            limit: self.limit,
        }
    }
}

/// read side of the upstream route/shape store. a route may be assembled
/// from dozens of segments and thousands of points, so both reads are
/// paginated. implementations must return shape points sorted by
/// (shape_id, sequence).
pub trait ShapeCatalog {
    fn route_shape_links(
        &self,
        route_code: &str,
        page: Page,
    ) -> Result<Vec<RouteShapeLink>, GeometryError>;

    fn shape_points(
        &self,
        shape_ids: &[String],
        page: Page,
    ) -> Result<Vec<ShapePoint>, GeometryError>;
}

/// drains every link page for a route
pub fn fetch_all_links<C: ShapeCatalog + ?Sized>(
    catalog: &C,
    route_code: &str,
    page_size: usize,
) -> Result<Vec<RouteShapeLink>, GeometryError> {
    let mut result = vec![];
    let mut page = Page::first(page_size);
    loop {
        let batch = catalog.route_shape_links(route_code, page)?;
        let batch_len = batch.len();
        result.extend(batch);
        // an empty batch also ends the drain, so a zero limit cannot spin
        if batch_len < page.limit || batch_len == 0 {
            return Ok(result);
        }
        page = page.next();
    }
}

/// drains every point page for a set of shape ids
pub fn fetch_all_points<C: ShapeCatalog + ?Sized>(
    catalog: &C,
    shape_ids: &[String],
    page_size: usize,
) -> Result<Vec<ShapePoint>, GeometryError> {
    let mut result = vec![];
    let mut page = Page::first(page_size);
    loop {
        let batch = catalog.shape_points(shape_ids, page)?;
        let batch_len = batch.len();
        result.extend(batch);
        if batch_len < page.limit || batch_len == 0 {
            return Ok(result);
        }
        page = page.next();
    }
}

/// shape catalog backed by in-memory vectors, loadable from CSV fixture
/// files. used by the CLI and tests; production deployments put a database
/// behind [ShapeCatalog] instead.
pub struct InMemoryShapeCatalog {
    links: Vec<RouteShapeLink>,
    points: Vec<ShapePoint>,
}

impl InMemoryShapeCatalog {
    pub fn new(links: Vec<RouteShapeLink>, mut points: Vec<ShapePoint>) -> InMemoryShapeCatalog {
        points.sort_by(|a, b| {
            a.shape_id
                .cmp(&b.shape_id)
                .then(a.sequence.cmp(&b.sequence))
        });
        InMemoryShapeCatalog { links, points }
    }

    /// reads `route_code,shape_id,variant` link rows and
    /// `shape_id,sequence,lat,lon` point rows from headed CSV files
    pub fn from_csv<P: AsRef<Path>>(
        links_file: P,
        points_file: P,
    ) -> Result<InMemoryShapeCatalog, GeometryError> {
        let links = read_csv_rows::<RouteShapeLink, _>(links_file)?;
        let points = read_csv_rows::<ShapePoint, _>(points_file)?;
        Ok(InMemoryShapeCatalog::new(links, points))
    }
}

impl ShapeCatalog for InMemoryShapeCatalog {
    fn route_shape_links(
        &self,
        route_code: &str,
        page: Page,
    ) -> Result<Vec<RouteShapeLink>, GeometryError> {
        let matching = self
            .links
            .iter()
            .filter(|link| link.route_code == route_code)
            .skip(page.offset)
            .take(page.limit)
            .cloned()
            .collect();
        Ok(matching)
    }

    fn shape_points(
        &self,
        shape_ids: &[String],
        page: Page,
    ) -> Result<Vec<ShapePoint>, GeometryError> {
        let matching = self
            .points
            .iter()
            .filter(|point| shape_ids.contains(&point.shape_id))
            .skip(page.offset)
            .take(page.limit)
            .cloned()
            .collect();
        Ok(matching)
    }
}

fn read_csv_rows<T: serde::de::DeserializeOwned, P: AsRef<Path>>(
    file: P,
) -> Result<Vec<T>, GeometryError> {
    let path = file.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| GeometryError::CatalogReadError(format!("failed to open {path:?}: {e}")))?;
    reader
        .deserialize()
        .map(|row| {
            row.map_err(|e| {
                GeometryError::CatalogReadError(format!("failed to parse row in {path:?}: {e}"))
            })
        })
        .collect()
}
