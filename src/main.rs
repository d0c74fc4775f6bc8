use clap::Parser;
use tracing::error;

use devfused::cli::{Cli, GetVerbosity};
use devfused::config::AppConfig;
use devfused::logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::setup_logger(Some(cli.cmd.get_verbosity().tracing_level_filter()));

    let config = AppConfig::from_env();
    if let Err(e) = cli.cmd.run(config).await {
        error!("{e}");
        std::process::exit(1);
    }
}
