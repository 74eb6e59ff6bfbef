use super::AppError;
use crate::model::event::{load_rows_json, CommuterFilter, CommuterRow};
use chrono::{DateTime, Utc};

pub fn run(
    rows_file: &str,
    route: Option<&str>,
    depot: Option<&str>,
    since: Option<&str>,
    until: Option<&str>,
) -> Result<(), AppError> {
    let filter = CommuterFilter {
        route_id: route.map(str::to_string),
        depot_id: depot.map(str::to_string),
        since: parse_timestamp(since)?,
        until: parse_timestamp(until)?,
    };
    let mut rows: Vec<CommuterRow> = load_rows_json(rows_file)?
        .into_iter()
        .filter(|row| filter.matches(row))
        .collect();
    rows.sort_by(|a, b| {
        a.spawned_at
            .cmp(&b.spawned_at)
            .then(a.commuter_id.cmp(&b.commuter_id))
    });

    let json = serde_json::to_string_pretty(&rows)
        .map_err(|e| AppError::OutputError(format!("failed to serialize rows: {e}")))?;
    println!("{json}");
    log::info!("{} commuters matched", rows.len());
    Ok(())
}

fn parse_timestamp(value: Option<&str>) -> Result<Option<DateTime<Utc>>, AppError> {
    match value {
        None => Ok(None),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|parsed| Some(parsed.with_timezone(&Utc)))
            .map_err(|e| {
                AppError::InvalidArgument(format!("invalid RFC 3339 timestamp '{raw}': {e}"))
            }),
    }
}
