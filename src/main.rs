use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use facility_router::{io, BuildOptions, FacilitySet, Point, Router, RouterOptions};

#[derive(Debug, thiserror::Error)]
#[error("failed to load the road network: {0}")]
struct GraphLoadError(#[source] facility_router::BuildError);

#[derive(Parser)]
struct Cli {
    /// GeoJSON file with facility points
    #[arg(long, global = true)]
    facilities: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Find the shortest route from a facility to the node closest to a point
    #[command(allow_negative_numbers = true)]
    Route {
        #[command(flatten)]
        network: NetworkArgs,

        facility_id: i64,
        x: f64,
        y: f64,
    },

    /// Print the facilities GeoJSON
    Facilities,
}

#[derive(Args)]
struct NetworkArgs {
    /// Tab-separated junction table, or a directory of `*.nds` tables
    #[arg(long)]
    nodes: PathBuf,

    /// GeoJSON file with road centerlines
    #[arg(long)]
    roads: PathBuf,

    /// Warn about road endpoints further than this from any node (0 disables)
    #[arg(long, default_value_t = 0.0)]
    snap_tolerance: f64,

    /// Max number of node expansions per query
    #[arg(long, default_value_t = facility_router::DEFAULT_STEP_LIMIT)]
    step_limit: usize,
}

pub fn main() -> Result<ExitCode, Box<dyn Error>> {
    colog::init();
    let cli = Cli::parse();

    let facilities = match &cli.facilities {
        Some(path) => io::read_facilities_from_path(path, io::FileFormat::Unknown)?,
        None => FacilitySet::default(),
    };

    match cli.command {
        Command::Facilities => {
            match facilities.document() {
                Some(document) => println!("{document}"),
                None => println!(r#"{{"type":"FeatureCollection","features":[]}}"#),
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Route {
            network,
            facility_id,
            x,
            y,
        } => {
            let g = load_graph(&network)?;
            let options = RouterOptions {
                step_limit: network.step_limit,
            };
            let router = Router::new(g, facilities, options);

            match router.route(Point::new(x, y), facility_id) {
                Ok(result) => {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    println!("{}", serde_json::json!({ "error": e.to_string() }));
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}

fn load_graph(network: &NetworkArgs) -> Result<facility_router::Graph, GraphLoadError> {
    let options = BuildOptions {
        snap_tolerance: network.snap_tolerance,
    };
    io::load_graph(&network.nodes, &network.roads, &options).map_err(GraphLoadError)
}
