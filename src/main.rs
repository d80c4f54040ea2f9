//! SwiftSage CLI entry point.

use clap::Parser;

use swiftsage::cli::{Cli, Commands};
use swiftsage::infrastructure::config::ConfigLoader;
use swiftsage::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ConfigLoader::load_with(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => swiftsage::cli::handle_error(&err, cli.json),
    };

    let log_config = match LogConfig::try_from(&config.logging) {
        Ok(log_config) => match cli.log_level {
            Some(ref level) => log_config.with_level(level.clone()),
            None => log_config,
        },
        Err(err) => swiftsage::cli::handle_error(&err, cli.json),
    };
    let _logger = match LoggerImpl::init(&log_config) {
        Ok(logger) => logger,
        Err(err) => swiftsage::cli::handle_error(&err, cli.json),
    };

    let result = match cli.command {
        Commands::Solve(args) => swiftsage::cli::commands::solve::execute(args, &config, cli.json).await,
        Commands::Exec(args) => swiftsage::cli::commands::exec::execute(args, &config, cli.json).await,
        Commands::Config(args) => swiftsage::cli::commands::config::execute(args, &config, cli.json).await,
    };

    if let Err(err) = result {
        swiftsage::cli::handle_error(&err, cli.json);
    }
}
