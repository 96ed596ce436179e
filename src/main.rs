use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

use data_analyst_agent::config::Config;
use data_analyst_agent::pipeline::Pipeline;
use data_analyst_agent::{logging, metrics, server};

#[derive(Parser)]
#[command(name = "data_analyst_agent")]
#[command(about = "Answers data analysis questions over scraped tables")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file (defaults to ./config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Port to listen on (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Answer a single question file and print the JSON response
    Analyze {
        /// File containing the question text
        #[arg(short, long)]
        file: PathBuf,
    },
}

fn init_metrics(config: &Config) {
    let Some(addr) = config.metrics.addr.as_deref() else {
        return;
    };
    match addr.parse() {
        Ok(addr) => metrics::init_metrics(addr),
        Err(e) => warn!("Invalid metrics address '{}': {}", addr, e),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;

    let _guard = logging::init_logging(&config.logging);
    init_metrics(&config);

    let pipeline = Arc::new(Pipeline::from_config(&config)?);

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            info!(
                "Starting server on {}:{} (films url: {})",
                config.server.host, config.server.port, config.films.url
            );
            if let Err(e) = server::start_server(pipeline, &config).await {
                error!("Server failed: {}", e);
                return Err(e);
            }
        }
        Commands::Analyze { file } => {
            let question = std::fs::read_to_string(&file)?;
            match pipeline.answer(&question).await {
                Ok(response) => {
                    println!("{}", serde_json::to_string_pretty(&response)?);
                }
                Err(e) => {
                    error!("Analysis failed: {}", e);
                    eprintln!("❌ {}", e);
                    return Err(e.into());
                }
            }
        }
    }

    Ok(())
}
