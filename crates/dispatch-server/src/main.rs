use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use dispatch_core::{DispatchConfig, Dispatcher};
use dispatch_server::logging::init_logging;
use dispatch_server::{run_server, AppState};
use dispatch_tools::{default_table, ToolsConfig};

#[derive(Parser, Debug, Clone)]
#[command(name = "dispatch-server")]
#[command(about = "Prompt-triggered task dispatcher")]
#[command(version)]
struct Cli {
    /// Enable debug mode
    #[arg(long, env = "DEBUG", default_value = "false")]
    debug: bool,

    /// Server port
    #[arg(long, env = "PORT", default_value = "5000")]
    port: u16,

    /// Directory uploaded PDFs are written to
    #[arg(long, env = "UPLOAD_DIR", default_value = "uploads")]
    upload_dir: PathBuf,

    /// Append logs to this file instead of stderr
    #[arg(long, env = "LOG_FILE")]
    log_file: Option<PathBuf>,

    /// YAML file overriding the built-in dispatch configuration
    #[arg(long, env = "DISPATCH_CONFIG")]
    config: Option<PathBuf>,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_logging(cli.debug, cli.log_file.as_deref()).context("failed to initialise logging")?;

    let config = match &cli.config {
        Some(path) => DispatchConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => DispatchConfig::default(),
    };
    log::debug!("Dispatch configuration: {:?}", config);

    let tools = ToolsConfig::from_env();
    let table = default_table(&tools).context("failed to build capability table")?;
    let dispatcher = Dispatcher::new(config, table).context("capability table is incomplete")?;

    log::info!("Starting dispatch server on port {}", cli.port);
    run_server(cli.port, AppState::new(dispatcher, cli.upload_dir))
        .await
        .context("server error")
}
