use super::{
    fetch_all_links, fetch_all_points, GeometryError, RouteGeometry, ShapeCatalog, ShapeSegment,
    DEFAULT_PAGE_SIZE, SEAM_GAP_WARN_METERS,
};
use crate::location::Coordinate;
use geo::{Distance, Haversine};
use itertools::Itertools;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// stitches a route's unordered shape segments into one continuous
/// polyline, caching the result per route until the underlying shape data
/// changes.
pub struct RouteGeometryAssembler {
    page_size: usize,
    cache: HashMap<String, CachedGeometry>,
}

struct CachedGeometry {
    fingerprint: u64,
    geometry: Arc<RouteGeometry>,
}

impl Default for RouteGeometryAssembler {
    fn default() -> Self {
        RouteGeometryAssembler::new()
    }
}

impl RouteGeometryAssembler {
    pub fn new() -> RouteGeometryAssembler {
        RouteGeometryAssembler {
            page_size: DEFAULT_PAGE_SIZE,
            cache: HashMap::new(),
        }
    }

    pub fn with_page_size(page_size: usize) -> RouteGeometryAssembler {
        RouteGeometryAssembler {
            // a zero-row page would drain nothing; one row is the floor
            page_size: page_size.max(1),
            cache: HashMap::new(),
        }
    }

    /// fetches the route's linked shapes from the catalog (paginated) and
    /// assembles them, reusing the cached geometry when the source data
    /// fingerprint is unchanged.
    pub fn assemble_route<C: ShapeCatalog + ?Sized>(
        &mut self,
        route_code: &str,
        catalog: &C,
    ) -> Result<Arc<RouteGeometry>, GeometryError> {
        let links = fetch_all_links(catalog, route_code, self.page_size)?;
        if links.is_empty() {
            return Err(GeometryError::NoSegmentsFound(route_code.to_string()));
        }

        // a route may link the same shape under several variants; keep one
        // segment per shape id, in first-seen order for determinism
        let shape_ids: Vec<String> = links
            .iter()
            .map(|link| link.shape_id.clone())
            .unique()
            .collect();
        let points = fetch_all_points(catalog, &shape_ids, self.page_size)?;

        let mut grouped: HashMap<&str, Vec<(u32, Coordinate)>> = HashMap::new();
        for point in points.iter() {
            grouped
                .entry(point.shape_id.as_str())
                .or_default()
                .push((point.sequence, point.coordinate()));
        }
        let mut segments: Vec<ShapeSegment> = Vec::with_capacity(shape_ids.len());
        for shape_id in shape_ids.iter() {
            let mut shape_points = grouped
                .remove(shape_id.as_str())
                .ok_or_else(|| GeometryError::NoPointsFound(shape_id.clone()))?;
            shape_points.sort_by_key(|(sequence, _)| *sequence);
            let coordinates = shape_points.into_iter().map(|(_, c)| c).collect();
            segments.push(ShapeSegment::new(shape_id, coordinates));
        }

        let fingerprint = fingerprint(&segments);
        if let Some(cached) = self.cache.get(route_code) {
            if cached.fingerprint == fingerprint {
                return Ok(cached.geometry.clone());
            }
        }

        let geometry = Arc::new(assemble(route_code, &segments)?);
        self.cache.insert(
            route_code.to_string(),
            CachedGeometry {
                fingerprint,
                geometry: geometry.clone(),
            },
        );
        Ok(geometry)
    }
}

/// reconstructs a single continuous coordinate sequence from an unordered
/// set of shape segments, minimizing total path length.
///
/// every segment index is tried as the chain's starting candidate. from a
/// candidate, the chain grows greedily: the unused segment whose start or
/// end point lies nearest (great-circle) to the current tail is appended,
/// reversed first when its end point is the nearer one. the candidate whose
/// finished chain has the globally smallest total length wins; the first
/// strict minimum wins ties, so identical inputs always produce identical
/// output.
pub fn assemble(
    route_code: &str,
    segments: &[ShapeSegment],
) -> Result<RouteGeometry, GeometryError> {
    if segments.is_empty() {
        return Err(GeometryError::NoSegmentsFound(route_code.to_string()));
    }
    for segment in segments.iter() {
        if segment.points.is_empty() {
            return Err(GeometryError::NoPointsFound(segment.shape_id.clone()));
        }
    }

    let mut best: Option<(Vec<Coordinate>, f64, f64)> = None;
    for start in 0..segments.len() {
        let (points, max_seam_gap) = chain_from(start, segments);
        let total_length = polyline_length_m(&points);
        let improved = match best {
            Some((_, best_length, _)) => total_length < best_length,
            None => true,
        };
        if improved {
            best = Some((points, total_length, max_seam_gap));
        }
    }

    // segments is non-empty so at least one candidate ran
    let (points, total_length_m, max_seam_gap_m) =
        best.ok_or_else(|| GeometryError::NoSegmentsFound(route_code.to_string()))?;

    let fragmented = max_seam_gap_m > SEAM_GAP_WARN_METERS;
    if fragmented {
        log::warn!(
            "route {route_code} assembled with a {max_seam_gap_m:.1}m seam gap; source shape data looks fragmented"
        );
    }

    Ok(RouteGeometry {
        route_code: route_code.to_string(),
        point_count: points.len(),
        points,
        total_length_m,
        max_seam_gap_m,
        fragmented,
    })
}

/// grows one greedy chain starting from the given segment index, returning
/// the stitched coordinate sequence and the widest seam encountered.
fn chain_from(start: usize, segments: &[ShapeSegment]) -> (Vec<Coordinate>, f64) {
    let mut used = vec![false; segments.len()];
    used[start] = true;
    let mut points = segments[start].points.clone();
    let mut max_seam_gap = 0.0_f64;

    for _ in 1..segments.len() {
        let tail = match points.last() {
            Some(tail) => *tail,
            None => break,
        };

        // nearest unused endpoint to the current tail, scanning in index
        // order with strict improvement so the pick is deterministic
        let mut next: Option<(usize, bool, f64)> = None;
        for (index, segment) in segments.iter().enumerate() {
            if used[index] {
                continue;
            }
            let (first, last) = match (segment.first(), segment.last()) {
                (Some(first), Some(last)) => (first, last),
                _ => continue,
            };
            let forward_gap = haversine_m(tail, first);
            let reverse_gap = haversine_m(tail, last);
            let candidates = [(forward_gap, false), (reverse_gap, true)];
            for (gap, reversed) in candidates {
                let improved = match next {
                    Some((_, _, best_gap)) => gap < best_gap,
                    None => true,
                };
                if improved {
                    next = Some((index, reversed, gap));
                }
            }
        }

        let (index, reversed, gap) = match next {
            Some(pick) => pick,
            None => break,
        };
        used[index] = true;
        max_seam_gap = max_seam_gap.max(gap);

        let segment_points = if reversed {
            segments[index].points.iter().rev().copied().collect()
        } else {
            segments[index].points.clone()
        };
        append_deduplicated(&mut points, segment_points, tail);
    }

    (points, max_seam_gap)
}

/// appends stitched points, dropping an exact duplicate of the current tail
/// so touching segments don't repeat their shared endpoint
fn append_deduplicated(points: &mut Vec<Coordinate>, incoming: Vec<Coordinate>, tail: Coordinate) {
    let mut iter = incoming.into_iter();
    if let Some(first) = iter.next() {
        if first != tail {
            points.push(first);
        }
        points.extend(iter);
    }
}

pub fn polyline_length_m(points: &[Coordinate]) -> f64 {
    points
        .windows(2)
        .map(|pair| haversine_m(pair[0], pair[1]))
        .sum()
}

fn haversine_m(a: Coordinate, b: Coordinate) -> f64 {
    Haversine.distance(a.to_point(), b.to_point())
}

/// content hash of the source segment data, used to invalidate the
/// per-route geometry cache
fn fingerprint(segments: &[ShapeSegment]) -> u64 {
    let mut hasher = DefaultHasher::new();
    for segment in segments.iter() {
        segment.shape_id.hash(&mut hasher);
        segment.points.len().hash(&mut hasher);
        for point in segment.points.iter() {
            point.lat.to_bits().hash(&mut hasher);
            point.lon.to_bits().hash(&mut hasher);
        }
    }
    hasher.finish()
}
