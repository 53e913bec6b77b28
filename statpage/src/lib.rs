//! # statpage
//!
//! A single-page dashboard for one host: per-core CPU utilisation, memory
//! and disk usage, the current time in a fixed timezone, and the status of
//! the last run of a cron job.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       DashboardServer                        │
//! │   GET /  ──▶ AppState::snapshot() ──▶ render_html()          │
//! │   GET /api/stats ──────────┬────────▶ serde_json             │
//! │                            │                                 │
//! │                            ▼                                 │
//! │  ┌─────────────┐    ┌─────────────┐    ┌──────────────────┐  │
//! │  │  HostProbe  │───▶│  Dashboard  │◀───│ read_job_status  │  │
//! │  │ (sampler)   │    │   (page)    │    │  (cron log file) │  │
//! │  └─────────────┘    └─────────────┘    └──────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`settings`]**: layered configuration (defaults, TOML file, `STATPAGE_*` env)
//! - **[`sampler`]**: the [`HostProbe`] trait and its `sysinfo` implementation
//! - **[`page`]**: the [`Dashboard`] model and HTML rendering
//! - **[`server`]**: the hyper HTTP server
//!
//! Formatting of byte counts and parsing of the cron log live in
//! [`statpage_core`].
//!
//! ## Usage
//!
//! ```bash
//! statpage --disk /media/backup --cron-log /var/log/dns_update_status.log
//! ```
//!
//! ### As a library
//!
//! ```
//! use statpage::{Dashboard, FixedProbe, Settings};
//! use chrono::Utc;
//!
//! let settings = Settings {
//!     cron_log: "/nonexistent.log".into(),
//!     ..Default::default()
//! };
//! let mut probe = FixedProbe {
//!     cpu: vec![3.5],
//!     ..Default::default()
//! };
//! let now = Utc::now().with_timezone(&settings.tz().unwrap());
//!
//! let dashboard = Dashboard::collect(&mut probe, &settings, now);
//! assert_eq!(dashboard.cpu, vec!["CPU Core 1: 3.5%"]);
//! ```
//!
//! ### Serving
//!
//! ```no_run
//! use statpage::{AppState, DashboardServer, Settings, SysinfoProbe};
//!
//! # tokio_test::block_on(async {
//! let state = AppState::new(Settings::default(), SysinfoProbe::new()).unwrap();
//! DashboardServer::new(state).run().await.unwrap();
//! # });
//! ```

pub mod page;
pub mod sampler;
pub mod server;
pub mod settings;

pub use page::{render_html, Dashboard};
pub use sampler::{resolve_disk_path, FixedProbe, HostProbe, SampleError, SysinfoProbe};
pub use server::{AppState, DashboardServer};
pub use settings::{Settings, SettingsError};
