//! tabreg - Main Entry Point

use clap::Parser;
use tabreg::cli::{cmd_effect_size, cmd_extract, cmd_info, cmd_run, Cli, Commands};
use tabreg::error::PipelineError;
use tabreg::telemetry;
use tracing::error;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let paths = cli.project_paths();

    telemetry::init(&cli.logging_config(&paths)?)?;

    let result = match &cli.command {
        Commands::Run { config, version } => {
            cmd_run(&paths, config.as_deref(), version.as_deref())
        }
        Commands::Extract { config } => cmd_extract(&paths, config),
        Commands::Info { data } => cmd_info(data),
        Commands::EffectSize { data, group_col, value_col, group_a, group_b } => {
            cmd_effect_size(data, group_col, value_col, group_a, group_b)
        }
    };

    let collaborator = result
        .as_ref()
        .err()
        .and_then(|err| err.downcast_ref::<PipelineError>())
        .filter(|e| e.is_collaborator());
    if let Some(e) = collaborator {
        match e {
            PipelineError::UnknownConnection(_) => error!("Incorrect connection keys: {}", e),
            _ => error!("Unable to connect to db: {}", e),
        }
        std::process::exit(1);
    }

    result
}
