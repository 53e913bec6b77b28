//! Error types for the status reader.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading a cron status file.
#[derive(Debug, Error)]
pub enum StatusError {
    /// The file could not be opened or read (missing, permissions, I/O).
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file was read but is not valid UTF-8.
    #[error("{} is not valid UTF-8: {source}", .path.display())]
    Encoding {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

impl StatusError {
    /// Path of the file that failed to load.
    pub fn path(&self) -> &std::path::Path {
        match self {
            StatusError::Read { path, .. } | StatusError::Encoding { path, .. } => path,
        }
    }
}
