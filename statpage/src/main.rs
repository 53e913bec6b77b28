use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};

use statpage::{AppState, DashboardServer, Settings, SysinfoProbe};

#[derive(Parser, Debug)]
#[command(name = "statpage")]
#[command(about = "Single-page dashboard for CPU, memory, disk, time and cron job status")]
struct Args {
    /// Path to a TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on (e.g. "0.0.0.0:5000")
    #[arg(short, long)]
    listen: Option<String>,

    /// Show usage of the filesystem holding this path
    #[arg(short, long)]
    disk: Option<PathBuf>,

    /// Status log written by the cron job
    #[arg(long)]
    cron_log: Option<PathBuf>,

    /// IANA timezone for the clock (e.g. "US/Eastern")
    #[arg(short, long)]
    timezone: Option<String>,

    /// Sample once, write the dashboard as JSON to this file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn apply(&self, settings: &mut Settings) {
        if let Some(listen) = &self.listen {
            settings.listen_addr = listen.clone();
        }
        if let Some(disk) = &self.disk {
            settings.disk_path = disk.clone();
        }
        if let Some(cron_log) = &self.cron_log {
            settings.cron_log = cron_log.clone();
        }
        if let Some(timezone) = &self.timezone {
            settings.timezone = timezone.clone();
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    let mut settings = Settings::load(args.config.as_deref())?;
    args.apply(&mut settings);

    let state = AppState::new(settings, SysinfoProbe::new())?;

    // Handle export mode (non-interactive)
    if let Some(export_path) = &args.export {
        return export_to_file(&state, export_path);
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        info!(
            "Disk: {}, cron log: {}, timezone: {}",
            state.settings().disk_path.display(),
            state.settings().cron_log.display(),
            state.settings().timezone
        );
        DashboardServer::new(state)
            .run()
            .await
            .context("Dashboard server stopped")
    })
}

/// Take one snapshot and write it as pretty-printed JSON.
fn export_to_file(state: &AppState, export_path: &Path) -> Result<()> {
    let dashboard = state.snapshot();
    let json = serde_json::to_string_pretty(&dashboard)?;
    std::fs::write(export_path, json)
        .with_context(|| format!("Failed to write {}", export_path.display()))?;

    println!("Exported dashboard to: {}", export_path.display());
    Ok(())
}
