use super::{assemble_ops, commuters_ops, simulate_ops, AppError};
use clap::Subcommand;
use ridesim_geo::assembly::DEFAULT_PAGE_SIZE;

#[derive(Subcommand)]
pub enum Operation {
    #[command(
        name = "assemble",
        about = "stitch a route's stored shape fragments into one continuous geometry"
    )]
    Assemble {
        /// a CSV file of route_code,shape_id,variant link rows
        links_file: String,
        /// a CSV file of shape_id,sequence,lat,lon point rows
        points_file: String,
        /// comma-delimited route codes to assemble
        route_codes: String,
        /// file to write one "route_code<TAB>LINESTRING(...)" row per route
        #[arg(long)]
        wkt_output: Option<String>,
        /// catalog page size for link and point reads
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,
    },
    #[command(
        name = "simulate",
        about = "run commuter reservoirs over depots and assembled routes"
    )]
    Simulate {
        /// a JSON file containing an array of zone records
        #[arg(long)]
        zones_file: Option<String>,
        /// a TOML engine configuration file; built-in defaults apply when omitted
        #[arg(long)]
        config_file: Option<String>,
        /// a CSV file of link rows, required with --route
        #[arg(long)]
        links_file: Option<String>,
        /// a CSV file of shape point rows, required with --route
        #[arg(long)]
        points_file: Option<String>,
        /// route code to activate a route reservoir for (repeatable)
        #[arg(long = "route")]
        routes: Vec<String>,
        /// depot to activate, as "id:lat:lon" (repeatable)
        #[arg(long = "depot")]
        depots: Vec<String>,
        /// seconds to run; 0 runs until interrupted
        #[arg(long, default_value_t = 0)]
        duration_secs: u64,
        /// file to dump persisted commuter rows to as JSON on shutdown
        #[arg(long)]
        output: Option<String>,
        /// print lifecycle events to stdout as line-delimited JSON
        #[arg(long)]
        follow: bool,
        /// restrict the event feed to one reservoir id
        #[arg(long)]
        follow_reservoir: Option<String>,
    },
    #[command(
        name = "commuters",
        about = "query a dumped commuter rows file by route, depot, and time window"
    )]
    Commuters {
        /// a JSON rows file produced by `simulate --output`
        rows_file: String,
        /// keep rows belonging to this route id
        #[arg(long)]
        route: Option<String>,
        /// keep rows belonging to this depot id
        #[arg(long)]
        depot: Option<String>,
        /// RFC 3339 lower bound on spawned_at
        #[arg(long)]
        since: Option<String>,
        /// RFC 3339 upper bound on spawned_at
        #[arg(long)]
        until: Option<String>,
    },
}

impl Operation {
    pub fn run(&self) -> Result<(), AppError> {
        match self {
            Self::Assemble {
                links_file,
                points_file,
                route_codes,
                wkt_output,
                page_size,
            } => {
                let codes: Vec<String> = route_codes
                    .split(',')
                    .map(|code| code.trim().to_string())
                    .filter(|code| !code.is_empty())
                    .collect();
                if codes.is_empty() {
                    return Err(AppError::InvalidArgument(
                        "no route codes provided".to_string(),
                    ));
                }
                assemble_ops::run(
                    links_file,
                    points_file,
                    &codes,
                    wkt_output.as_deref(),
                    *page_size,
                )
            }
            Self::Simulate {
                zones_file,
                config_file,
                links_file,
                points_file,
                routes,
                depots,
                duration_secs,
                output,
                follow,
                follow_reservoir,
            } => simulate_ops::run(simulate_ops::SimulateOptions {
                zones_file: zones_file.clone(),
                config_file: config_file.clone(),
                links_file: links_file.clone(),
                points_file: points_file.clone(),
                routes: routes.clone(),
                depots: depots.clone(),
                duration_secs: *duration_secs,
                output: output.clone(),
                follow: *follow,
                follow_reservoir: follow_reservoir.clone(),
            }),
            Self::Commuters {
                rows_file,
                route,
                depot,
                since,
                until,
            } => commuters_ops::run(
                rows_file,
                route.as_deref(),
                depot.as_deref(),
                since.as_deref(),
                until.as_deref(),
            ),
        }
    }
}
