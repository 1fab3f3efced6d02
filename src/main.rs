//! Brandcanvas CLI
//!
//! Command-line front end for projects stored as JSON files.
//! Exit codes: 0 success, 1 error, 2 operation blocked by a brand rule.

use std::process::ExitCode;

use clap::Parser;
use serde_json::json;
use tracing::{debug, Level};

use brandcanvas::cli::commands::{self, ExportArgs, Outcome};
use brandcanvas::cli::{Cli, Commands};
use brandcanvas::config::StudioConfig;
use brandcanvas::telemetry::init_tracing;
use brandcanvas::StudioError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    init_tracing(cli.json_logs, level);
    debug!("Brandcanvas v{}", env!("CARGO_PKG_VERSION"));

    match run(cli).await {
        Ok(outcome) => {
            print_json(&outcome.output);
            if outcome.blocked {
                ExitCode::from(2)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(err) => {
            let body = match err.downcast_ref::<StudioError>() {
                Some(studio) => json!({
                    "error": studio.to_string(),
                    "code": studio.error_code(),
                    "retryable": studio.is_retryable(),
                    "suggestion": studio.recovery_suggestion(),
                }),
                None => json!({ "error": format!("{:#}", err) }),
            };
            eprintln!("{}", body);
            ExitCode::FAILURE
        }
    }
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(_) => println!("{}", value),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<StudioConfig> {
    let config = match &cli.config {
        Some(path) => StudioConfig::load(path)?,
        None => StudioConfig::default(),
    };
    Ok(config.apply_env()?)
}

async fn run(cli: Cli) -> anyhow::Result<Outcome> {
    let config = load_config(&cli)?;

    match cli.command {
        Commands::New {
            path,
            name,
            brand_kit,
            preset,
            size,
        } => commands::new_project(
            &path,
            &name,
            &brand_kit,
            preset.as_deref(),
            size.as_deref(),
            &config,
        ),
        Commands::Presets => commands::list_presets(),
        Commands::Validate { project, source } => commands::validate(&project, &source, &config),
        Commands::Apply { project, source } => commands::apply(&project, &source, &config),
        Commands::Undo { project } => commands::undo(&project, &config),
        Commands::Redo { project } => commands::redo(&project, &config),
        Commands::History { project } => commands::show_history(&project, &config),
        Commands::Export {
            project,
            out,
            format,
            quality,
            assets_root,
            fonts,
            fallback_font,
        } => {
            let args = ExportArgs {
                out: &out,
                format,
                quality,
                assets_root: assets_root.as_deref(),
                fonts: &fonts,
                fallback_font: fallback_font.as_deref(),
            };
            commands::export(&project, args, &config).await
        }
        Commands::Enrich { project, prompt } => commands::enrich(&project, &prompt, &config),
        Commands::Generate {
            project,
            prompt,
            variations,
            model,
        } => commands::generate(&project, &prompt, variations, model.as_deref(), &config).await,
    }
}
