//! # statpage-core
//!
//! Formatting and parsing logic behind the statpage host dashboard.
//!
//! The dashboard shows raw numbers from the operating system and the text of
//! a cron job's status log. This crate turns those into display strings:
//!
//! - [`scale`]: byte counts to a magnitude and unit (`B`, `KB`, `MB`, `GB`, `TB`)
//! - [`format_stats`]: a [`StatReading`] (e.g. memory or disk usage) to a
//!   [`FormattedStat`] with title-cased keys
//! - [`read_job_status`]: the status log to a [`JobStatus`], never failing
//!
//! Everything here is synchronous and holds no state between calls.
//!
//! ## Features
//!
//! - `serde`: `Serialize`/`Deserialize` for the data model
//!
//! ## Example
//!
//! ```rust
//! use statpage_core::{format_stats, JobStatus, StatReading};
//!
//! let memory = StatReading::builder()
//!     .field("total", 17_179_869_184u64)
//!     .field("percent", 37.81)
//!     .build();
//!
//! assert_eq!(
//!     format_stats(&memory).lines(),
//!     vec!["Total: 16.0 GB", "Percent: 37.8%"]
//! );
//!
//! let cron = JobStatus::parse("DNS record updated.\nExit status: 1");
//! assert_eq!(cron.lines(), vec!["DNS record updated.\n - Down"]);
//! ```

mod error;
mod stats;
mod status;
mod units;

pub use error::*;
pub use stats::*;
pub use status::*;
pub use units::*;
