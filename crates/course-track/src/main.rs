//! course-track: inspect and convert running-course tracks from the command line

mod cli;
mod commands;
mod logging;

use clap::Parser;
use cli::{Cli, Command};
use std::process::ExitCode;

fn main() -> ExitCode {
    logging::setup_logging();
    let cli = Cli::parse();

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(cli)) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<String> {
    match cli.command {
        Command::Inspect(source) => {
            let points = commands::load_source(&source).await?;
            commands::render_summary(&points)
        }
        Command::Convert { source, to, name } => {
            let points = commands::load_source(&source).await?;
            tracing::info!("Converting {} points to {to:?}", points.len());
            commands::render_conversion(&points, to, name.as_deref())
        }
    }
}
