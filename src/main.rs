//! CLI entry point for the SOC hex map tool.
//!
//! Provides subcommands for building the hex layer from a local CSV and for
//! serving it over HTTP.

use anyhow::Result;
use clap::{Parser, Subcommand};
use soc_hexmap::{
    grid::H3Grid,
    pipeline::{DEFAULT_RESOLUTION, MapQuery, run_file},
    render::{to_json, write_geojson},
    server::{ServerConfig, serve},
};
use std::ffi::OsStr;
use std::io::Write;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "soc_hexmap")]
#[command(about = "Aggregate geotagged SOC readings into an H3 hex map layer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the GeoJSON hex layer from a CSV file
    Process {
        /// CSV with latitude, longitude, soc, timestamp and asset_id columns
        #[arg(value_name = "FILE")]
        source: PathBuf,

        /// H3 resolution (0-15, higher is finer)
        #[arg(short, long, default_value_t = DEFAULT_RESOLUTION)]
        resolution: u8,

        /// Lowest cell average SOC to keep
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        min_soc: f64,

        /// Highest cell average SOC to keep
        #[arg(long, default_value_t = 100.0, allow_negative_numbers = true)]
        max_soc: f64,

        /// Fewest readings a cell needs to be kept
        #[arg(long, default_value_t = 0)]
        min_assets: u64,

        /// Write GeoJSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print the JSON
        #[arg(long, default_value_t = false)]
        pretty: bool,

        /// Gzip compress the output file (requires --output)
        #[arg(long, default_value_t = false, requires = "output")]
        gzip: bool,
    },
    /// Serve the hex layer over HTTP
    Serve {
        /// Listen address
        #[arg(short, long, default_value = "0.0.0.0:5001", env = "SOC_HEXMAP_LISTEN")]
        listen: SocketAddr,

        /// Directory the `file` query parameter is resolved against
        #[arg(short, long, default_value = "/data/raw_csvs", env = "SOC_HEXMAP_DATA_DIR")]
        data_dir: PathBuf,

        /// Front-end origin allowed by CORS
        #[arg(
            long,
            default_value = "http://localhost:3000",
            env = "SOC_HEXMAP_CORS_ORIGIN"
        )]
        cors_origin: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/soc_hexmap.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("soc_hexmap.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            source,
            resolution,
            min_soc,
            max_soc,
            min_assets,
            output,
            pretty,
            gzip,
        } => {
            let query = MapQuery {
                resolution,
                min_soc,
                max_soc,
                min_assets,
            };
            let collection = run_file(&source, &query, &H3Grid)?;

            match output {
                Some(path) => {
                    write_geojson(&path, &collection, pretty, gzip)?;
                    info!(
                        path = %path.display(),
                        features = collection.features.len(),
                        "GeoJSON written"
                    );
                }
                None => {
                    let mut stdout = std::io::stdout().lock();
                    writeln!(stdout, "{}", to_json(&collection, pretty)?)?;
                }
            }
        }
        Commands::Serve {
            listen,
            data_dir,
            cors_origin,
        } => {
            let config = ServerConfig {
                listen,
                data_dir,
                cors_origin,
            };
            serve(config, Arc::new(H3Grid)).await?;
        }
    }

    Ok(())
}
