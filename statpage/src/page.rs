//! Page model and HTML rendering.

use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;
use statpage_core::{format_stats, read_job_status, JobStatus};
use tera::{Context, Tera};
use tracing::warn;

use crate::sampler::HostProbe;
use crate::settings::Settings;

/// Format used for the clock line.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";

/// Everything shown on one page view, as display strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub cpu: Vec<String>,
    pub memory: Vec<String>,
    pub disk: Vec<String>,
    pub time: String,
    pub cron: Vec<String>,
    /// Serialized with a `state` tag: `ok`, `down`, `unrecognized` or
    /// `unavailable`.
    pub cron_status: JobStatus,
}

impl Dashboard {
    /// Sample the host and read the cron log.
    ///
    /// Blocks for the configured CPU sample window. A disk path with no
    /// mounted filesystem shows up as a single line in the disk section.
    pub fn collect(probe: &mut dyn HostProbe, settings: &Settings, now: DateTime<Tz>) -> Self {
        let cpu = cpu_lines(&probe.cpu_percent_per_core(settings.cpu_sample_window()));
        let memory = format_stats(&probe.memory()).lines();
        let disk = match probe.disk(&settings.disk_path) {
            Ok(reading) => format_stats(&reading).lines(),
            Err(e) => {
                warn!("Disk usage unavailable: {}", e);
                vec![e.to_string()]
            }
        };

        let status = read_job_status(&settings.cron_log);
        if !status.is_healthy() {
            warn!(
                "Cron status for {} is {}",
                settings.cron_log.display(),
                status.label()
            );
        }

        Self {
            cpu,
            memory,
            disk,
            time: now.format(TIME_FORMAT).to_string(),
            cron: status.lines(),
            cron_status: status,
        }
    }
}

/// `"CPU Core 1: 12.5%"` style lines, cores numbered from one.
pub fn cpu_lines(percents: &[f32]) -> Vec<String> {
    percents
        .iter()
        .enumerate()
        .map(|(i, pct)| format!("CPU Core {}: {:.1}%", i + 1, pct))
        .collect()
}

/// Name the page template is registered under. The `.html` suffix turns
/// on autoescaping.
pub const TEMPLATE_NAME: &str = "show_stats.html";

const TEMPLATE: &str = include_str!("../templates/show_stats.html");

/// Render the dashboard as a complete HTML document.
pub fn render_html(dashboard: &Dashboard) -> Result<String, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_template(TEMPLATE_NAME, TEMPLATE)?;
    let context = Context::from_serialize(dashboard)?;
    tera.render(TEMPLATE_NAME, &context)
}
