mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Command};
use hb_logger::{LevelFilter, Logger};
use hostbridge::BridgeContext;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    let _logger = Logger::builder().name(env!("CARGO_PKG_NAME")).console(true).level(level).init()?;

    let context = BridgeContext::load(cli.config.as_deref())?;

    match cli.command {
        Command::Detect => commands::detect(&context),
        Command::Matrix { format } => commands::matrix(&context, format),
        Command::Check { feature, version } => commands::check(&context, &feature, version),
        Command::Call { method, params, timeout_ms, host_year } => {
            commands::call(&context, &method, &params, timeout_ms, host_year).await
        },
    }
}
