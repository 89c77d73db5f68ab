//! shici-worker: runs the poem sensor standalone on a tokio host.
//!
//! Reads trigger commands from stdin, one per line:
//! - `press`: refresh now, ignoring the interval
//! - `press-throttled`: refresh only if the interval has elapsed
//! - `update <entity_id>`: generic entity update
//! - `button`: press the refresh button
//! - `state`: print the current sensor state as JSON
//! - `options <hours>`: store a new refresh interval (applies after restart)
//! - `quit`: tear down and exit
//!
//! Every published state is printed as one JSON line on stdout.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use shici_core::config::load_dotenv;
use shici_core::{Config, ConfigFlow, EntryOptions, OptionsFlow, SensorState};
use shici_dataset::DatasetStore;
use shici_refresh::{Host, RefreshButton, RefreshController, ServiceCall, TokioHost};

// ── CLI ─────────────────────────────────────────────────────────────

/// Random classical poem sensor, refreshed on a timer.
#[derive(Parser, Debug)]
#[command(name = "shici-worker", version, about)]
struct Cli {
    /// Directory holding the bundled dataset (overrides SHICI_INSTALL_DIR).
    #[arg(long)]
    install_dir: Option<PathBuf>,

    /// Refresh interval in hours (overrides the config entry).
    #[arg(long)]
    scan_interval: Option<u32>,

    /// Config entry file (overrides SHICI_ENTRY_FILE).
    #[arg(long)]
    entry_file: Option<PathBuf>,
}

// ── commands ────────────────────────────────────────────────────────

#[derive(Debug, PartialEq)]
enum Command {
    Call(ServiceCall),
    State,
    Options(u32),
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    match (parts.next()?, parts.next()) {
        ("press", None) => Some(Command::Call(ServiceCall::press())),
        ("press-throttled", None) => Some(Command::Call(ServiceCall::Press { force_update: false })),
        ("update", Some(entity_id)) => Some(Command::Call(ServiceCall::UpdateEntity {
            entity_id: entity_id.to_string(),
        })),
        ("button", None) => Some(Command::Call(RefreshButton.press())),
        ("state", None) => Some(Command::State),
        ("options", Some(hours)) => hours.parse().ok().map(Command::Options),
        ("quit", None) | ("exit", None) => Some(Command::Quit),
        _ => None,
    }
}

fn print_state(state: &SensorState) {
    match serde_json::to_string(state) {
        Ok(json) => println!("{}", json),
        Err(e) => warn!(error = %e, "failed to serialize sensor state"),
    }
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(dir) = cli.install_dir {
        config.install_dir = dir;
    }
    if let Some(file) = cli.entry_file {
        config.entry_file = file;
    }
    if cli.scan_interval.is_some() {
        config.scan_interval = cli.scan_interval;
    }
    config.log_summary();

    let entry = ConfigFlow::new(config.entry_file.clone()).load_or_create()?;
    let interval_hours = config.scan_interval.unwrap_or_else(|| entry.scan_interval());
    if interval_hours == 0 {
        anyhow::bail!("scan interval must be at least 1 hour");
    }

    let options_flow = OptionsFlow::new(config.entry_file.clone());

    let host = Arc::new(TokioHost::new());
    let controller = Arc::new(RefreshController::new(
        DatasetStore::bundled(&config.install_dir),
        Arc::clone(&host) as Arc<dyn Host>,
        interval_hours,
    ));

    // Print every published state.
    let mut states = host.subscribe();
    let printer = tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let latest = states.borrow_and_update().clone();
            if let Some(state) = latest {
                print_state(&state);
            }
        }
    });

    let outcome = controller.initialize().await;
    info!(?outcome, interval_hours, "shici-worker started");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        warn!(error = %e, "stdin read error");
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line) {
                    Some(Command::Call(call)) => {
                        let outcome = controller.handle_service(call).await;
                        info!(?outcome, "service call handled");
                    }
                    Some(Command::State) => print_state(&controller.sensor_state().await),
                    Some(Command::Options(hours)) => {
                        match options_flow.update(EntryOptions::with_scan_interval(hours)) {
                            Ok(entry) => info!(
                                scan_interval = entry.scan_interval(),
                                "options saved, restart shici-worker to apply"
                            ),
                            Err(e) => warn!(error = %e, "failed to update options"),
                        }
                    }
                    Some(Command::Quit) => break,
                    None => warn!(command = %line.trim(), "unknown command"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received");
                break;
            }
        }
    }

    controller.teardown().await;
    printer.abort();
    info!("shici-worker exited cleanly");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_service_commands() {
        assert_eq!(parse_command("press"), Some(Command::Call(ServiceCall::press())));
        assert_eq!(
            parse_command("press-throttled"),
            Some(Command::Call(ServiceCall::Press { force_update: false }))
        );
        assert_eq!(parse_command("button"), Some(Command::Call(ServiceCall::update_sensor())));
        assert_eq!(
            parse_command("update sensor.weather"),
            Some(Command::Call(ServiceCall::UpdateEntity {
                entity_id: "sensor.weather".to_string()
            }))
        );
        assert_eq!(parse_command("  quit "), Some(Command::Quit));
    }

    #[test]
    fn parses_options_interval() {
        assert_eq!(parse_command("options 6"), Some(Command::Options(6)));
        assert_eq!(parse_command("options 0"), Some(Command::Options(0)));
        assert_eq!(parse_command("options"), None);
        assert_eq!(parse_command("options soon"), None);
        assert_eq!(parse_command("options -1"), None);
    }
}
