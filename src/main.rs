use clap::Parser;
use tracing_subscriber::EnvFilter;

mod app;
mod cli;
mod config;
mod extract;
mod generation;
mod huggingface;
mod notes;
mod semantic;
mod storage;
#[cfg(test)]
mod tests;

use app::AppFactory;

fn main() -> anyhow::Result<()> {
    // RUST_LOG wins; `log` records are bridged into the subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Args::parse();

    let paths = AppFactory::get_paths()?;
    let (config, app) = AppFactory::create_app(&paths)?;

    let owner = args.user.unwrap_or(config.default_user.clone());
    log::debug!("base path: {}", config.base_path().display());

    cli::handle_command(args.command, &owner, &app)
}
