//! Main application entry point.
//!
//! Usage: `designkit <script.json> [--config <config.json>]`

use designkit_app::{AppConfig, Editor, NotificationLevel, parse_script, run_script};
use designkit_core::{RestGateway, StaticToken};
use std::path::PathBuf;
use std::process::ExitCode;

const USAGE: &str = "Usage: designkit <script.json> [--config <config.json>]";

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    log::info!("Starting designkit");

    let (script_path, config_path) = match parse_args(std::env::args().skip(1)) {
        Some(args) => args,
        None => {
            eprintln!("{}", USAGE);
            return ExitCode::FAILURE;
        }
    };

    match run(script_path, config_path).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("designkit: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Option<(PathBuf, Option<PathBuf>)> {
    let mut script = None;
    let mut config = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config = Some(PathBuf::from(args.next()?)),
            _ if script.is_none() => script = Some(PathBuf::from(arg)),
            _ => return None,
        }
    }
    Some((script?, config))
}

async fn run(
    script_path: PathBuf,
    config_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load(config_path.as_deref())?;
    log::info!("Using design API at {}", config.api_base_url);

    let script = std::fs::read_to_string(&script_path)
        .map_err(|e| format!("Failed to read {}: {}", script_path.display(), e))?;
    let actions = parse_script(&script)?;

    let gateway = RestGateway::new(&config.api_base_url);
    let mut editor = Editor::new(gateway, StaticToken(config.token.clone()), &config);
    let result = run_script(&mut editor, &actions).await;

    for notification in editor.take_notifications() {
        match notification.level {
            NotificationLevel::Info => log::info!("{}", notification.message),
            NotificationLevel::Error => log::error!("{}", notification.message),
        }
    }
    result?;

    log::info!(
        "Session finished with {} objects on the canvas",
        editor.store().len()
    );
    Ok(())
}
