use super::AppError;
use ridesim_geo::assembly::{InMemoryShapeCatalog, RouteGeometry, RouteGeometryAssembler};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Arc;
use wkt::ToWkt;

/// the per-route metrics row printed to stdout, one JSON object per line
#[derive(Debug, Serialize)]
struct GeometrySummary {
    route_code: String,
    point_count: usize,
    total_length_m: f64,
    max_seam_gap_m: f64,
    fragmented: bool,
}

impl GeometrySummary {
    fn from_geometry(geometry: &RouteGeometry) -> GeometrySummary {
        GeometrySummary {
            route_code: geometry.route_code.clone(),
            point_count: geometry.point_count,
            total_length_m: geometry.total_length_m,
            max_seam_gap_m: geometry.max_seam_gap_m,
            fragmented: geometry.fragmented,
        }
    }
}

pub fn run(
    links_file: &str,
    points_file: &str,
    route_codes: &[String],
    wkt_output: Option<&str>,
    page_size: usize,
) -> Result<(), AppError> {
    let catalog = InMemoryShapeCatalog::from_csv(links_file, points_file)?;
    let mut assembler = RouteGeometryAssembler::with_page_size(page_size);

    let mut geometries: Vec<Arc<RouteGeometry>> = Vec::with_capacity(route_codes.len());
    for route_code in route_codes.iter() {
        let geometry = assembler.assemble_route(route_code, &catalog)?;
        if geometry.fragmented {
            log::warn!(
                "route {route_code} geometry is fragmented: max seam gap {:.1}m",
                geometry.max_seam_gap_m
            );
        }
        let summary = GeometrySummary::from_geometry(&geometry);
        let line = serde_json::to_string(&summary)
            .map_err(|e| AppError::OutputError(format!("failed to serialize summary: {e}")))?;
        println!("{line}");
        geometries.push(geometry);
    }

    if let Some(path) = wkt_output {
        write_wkt(path, &geometries)?;
        log::info!("wrote {} geometries to {path}", geometries.len());
    }
    Ok(())
}

fn write_wkt(path: &str, geometries: &[Arc<RouteGeometry>]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::OutputError(format!("failed to create {path}: {e}")))?;
    let mut writer = BufWriter::new(file);
    for geometry in geometries.iter() {
        let wkt = geometry.line_string().to_wkt();
        writeln!(writer, "{}\t{}", geometry.route_code, wkt)
            .map_err(|e| AppError::OutputError(format!("failed to write {path}: {e}")))?;
    }
    Ok(())
}
