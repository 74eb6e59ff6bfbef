use super::AppError;
use crate::model::event::{InMemoryCommuterSink, LifecycleEvent};
use crate::model::reservoir::{partition_zones, FleetCoordinator, GeographyKind};
use crate::model::simulation_config::SimulationConfig;
use crate::model::zone::{InMemoryZoneCatalog, Zone, ZoneCatalog};
use ridesim_geo::assembly::{InMemoryShapeCatalog, RouteGeometryAssembler};
use ridesim_geo::location::Coordinate;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

pub struct SimulateOptions {
    pub zones_file: Option<String>,
    pub config_file: Option<String>,
    pub links_file: Option<String>,
    pub points_file: Option<String>,
    pub routes: Vec<String>,
    pub depots: Vec<String>,
    pub duration_secs: u64,
    pub output: Option<String>,
    pub follow: bool,
    pub follow_reservoir: Option<String>,
}

pub fn run(options: SimulateOptions) -> Result<(), AppError> {
    let config = match &options.config_file {
        Some(path) => SimulationConfig::from_file(path)?,
        None => SimulationConfig::default(),
    };
    let zones: Vec<Zone> = match &options.zones_file {
        Some(path) => InMemoryZoneCatalog::from_json_file(path)?.zones()?,
        None => vec![],
    };

    let geographies = build_geographies(&options)?;
    if geographies.is_empty() {
        return Err(AppError::InvalidArgument(
            "nothing to simulate: pass at least one --depot or --route".to_string(),
        ));
    }
    let mut assignments = partition_zones(&zones, &geographies);

    let sink = Arc::new(InMemoryCommuterSink::new());
    let coordinator = FleetCoordinator::new(config, sink.clone());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::RuntimeError(e.to_string()))?;
    runtime.block_on(async {
        let feed = if options.follow {
            Some(tokio::spawn(follow_feed(
                coordinator.subscribe(),
                options.follow_reservoir.clone(),
            )))
        } else {
            None
        };
        for (id, kind) in geographies {
            let assigned = assignments.remove(&id).unwrap_or_default();
            match kind {
                GeographyKind::Depot { location } => {
                    coordinator.activate_depot(&id, location, assigned);
                }
                GeographyKind::Route { geometry } => {
                    coordinator.activate_route(&id, geometry, assigned);
                }
            }
        }

        wait_for_shutdown(options.duration_secs).await;

        for (id, stats) in coordinator.all_stats() {
            log::info!(
                "reservoir {id}: {} active, {} added, {} expired, {} removed, spawn success rate {:.2}",
                stats.current_active_commuters,
                stats.total_commuters_added,
                stats.total_commuters_expired,
                stats.total_commuters_removed,
                stats.spawn_success_rate
            );
        }
        coordinator.shutdown().await;
        if let Some(feed) = feed {
            feed.abort();
        }
    });

    if let Some(path) = &options.output {
        let written = sink.dump_json(path)?;
        log::info!("wrote {written} commuter rows to {path}");
    }
    Ok(())
}

fn build_geographies(
    options: &SimulateOptions,
) -> Result<Vec<(String, GeographyKind)>, AppError> {
    let mut geographies: Vec<(String, GeographyKind)> = vec![];
    for spec in options.depots.iter() {
        let (id, location) = parse_depot_spec(spec)?;
        geographies.push((id, GeographyKind::Depot { location }));
    }
    if !options.routes.is_empty() {
        let (links, points) = match (&options.links_file, &options.points_file) {
            (Some(links), Some(points)) => (links, points),
            _ => {
                return Err(AppError::InvalidArgument(
                    "--route requires --links-file and --points-file".to_string(),
                ))
            }
        };
        let catalog = InMemoryShapeCatalog::from_csv(links, points)?;
        let mut assembler = RouteGeometryAssembler::new();
        for route_code in options.routes.iter() {
            let geometry = assembler.assemble_route(route_code, &catalog)?;
            if geometry.fragmented {
                log::warn!(
                    "route {route_code} geometry is fragmented: max seam gap {:.1}m",
                    geometry.max_seam_gap_m
                );
            }
            geographies.push((route_code.clone(), GeographyKind::Route { geometry }));
        }
    }
    Ok(geographies)
}

/// parses a depot argument of the form "id:lat:lon"
fn parse_depot_spec(spec: &str) -> Result<(String, Coordinate), AppError> {
    let parts: Vec<&str> = spec.split(':').collect();
    let invalid = || {
        AppError::InvalidArgument(format!(
            "invalid depot spec '{spec}', expected \"id:lat:lon\""
        ))
    };
    match parts.as_slice() {
        [id, lat, lon] if !id.is_empty() => {
            let lat: f64 = lat.parse().map_err(|_| invalid())?;
            let lon: f64 = lon.parse().map_err(|_| invalid())?;
            Ok((id.to_string(), Coordinate::new(lat, lon)))
        }
        _ => Err(invalid()),
    }
}

async fn wait_for_shutdown(duration_secs: u64) {
    if duration_secs > 0 {
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(duration_secs)) => {}
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    log::warn!("failed to listen for interrupt: {e}");
                } else {
                    log::info!("interrupted, shutting down");
                }
            }
        }
    } else if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("failed to listen for interrupt: {e}");
    }
}

/// the streaming notification feed: every lifecycle event as one JSON line,
/// optionally restricted to a single reservoir
async fn follow_feed(
    mut receiver: broadcast::Receiver<LifecycleEvent>,
    filter: Option<String>,
) {
    loop {
        match receiver.recv().await {
            Ok(event) => {
                if let Some(filter) = &filter {
                    if event.reservoir_id != *filter {
                        continue;
                    }
                }
                match serde_json::to_string(&event) {
                    Ok(line) => println!("{line}"),
                    Err(e) => log::warn!("failed to serialize event: {e}"),
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                log::warn!("event feed lagged, skipped {skipped} events");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
