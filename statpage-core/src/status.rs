//! Last-run status of the scheduled job, read from its status log.
//!
//! The job writes free-form text followed by `Exit status: 0` or
//! `Exit status: 1`. Anything the reader cannot make sense of is passed
//! through so it still shows up on the page.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::StatusError;

/// Text before the first `Exit status: ` that is followed by `0` or `1`.
static EXIT_STATUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)(.*?)Exit status: ([01])").expect("valid regex"));

/// Outcome of the most recent job run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "state", rename_all = "snake_case"))]
pub enum JobStatus {
    /// Exit status 0.
    Ok { summary: String },
    /// Exit status 1.
    Down { summary: String },
    /// The log has no recognizable exit status line; holds the whole file.
    Unrecognized { raw: String },
    /// The log could not be read.
    Unavailable { diagnostic: String },
}

impl JobStatus {
    /// Classify the full text of a status log.
    ///
    /// ```rust
    /// use statpage_core::JobStatus;
    ///
    /// let status = JobStatus::parse("Update ran fine.\nExit status: 0\n");
    /// assert_eq!(status.lines(), vec!["Update ran fine.\n - OK"]);
    /// ```
    pub fn parse(content: &str) -> Self {
        let Some(caps) = EXIT_STATUS.captures(content) else {
            return JobStatus::Unrecognized {
                raw: content.to_string(),
            };
        };

        let summary = caps[1].to_string();
        if &caps[2] == "0" {
            JobStatus::Ok { summary }
        } else {
            JobStatus::Down { summary }
        }
    }

    /// Report lines for the page. Always exactly one entry.
    pub fn lines(&self) -> Vec<String> {
        let line = match self {
            JobStatus::Ok { summary } => format!("{} - OK", summary),
            JobStatus::Down { summary } => format!("{} - Down", summary),
            JobStatus::Unrecognized { raw } => raw.clone(),
            JobStatus::Unavailable { diagnostic } => diagnostic.clone(),
        };
        vec![line]
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, JobStatus::Ok { .. })
    }

    /// Short label, matching the serialized `state` tag.
    pub fn label(&self) -> &'static str {
        match self {
            JobStatus::Ok { .. } => "ok",
            JobStatus::Down { .. } => "down",
            JobStatus::Unrecognized { .. } => "unrecognized",
            JobStatus::Unavailable { .. } => "unavailable",
        }
    }
}

impl From<StatusError> for JobStatus {
    fn from(err: StatusError) -> Self {
        JobStatus::Unavailable {
            diagnostic: err.to_string(),
        }
    }
}

/// Read the whole status file as UTF-8 text.
///
/// The file handle is dropped before this returns, on success or failure.
pub fn load_status_file(path: impl AsRef<Path>) -> Result<String, StatusError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| StatusError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|source| StatusError::Encoding {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and classify the status log at `path`.
///
/// Never fails: a file that cannot be read becomes
/// [`JobStatus::Unavailable`] with the error text as its diagnostic.
pub fn read_job_status(path: impl AsRef<Path>) -> JobStatus {
    match load_status_file(path) {
        Ok(content) => JobStatus::parse(&content),
        Err(err) => err.into(),
    }
}
