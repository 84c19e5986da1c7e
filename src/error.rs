use std::path::PathBuf;
use thiserror::Error;

/// Error types for scanning and remediation.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Setup failed: {message}")]
    Setup { message: String },

    #[error("Archive read failed for {path}: {message}")]
    Archive { path: String, message: String },

    #[error("{tool} invocation failed: {message}")]
    Tool { tool: String, message: String },

    #[error("Remediation failed for {path}: {message}")]
    Remediation { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, ScanError>;

impl ScanError {
    pub fn setup<S: Into<String>>(message: S) -> Self {
        Self::Setup { message: message.into() }
    }

    pub fn archive<S1: Into<String>, S2: Into<String>>(path: S1, message: S2) -> Self {
        Self::Archive { path: path.into(), message: message.into() }
    }

    pub fn tool<S1: Into<String>, S2: Into<String>>(tool: S1, message: S2) -> Self {
        Self::Tool { tool: tool.into(), message: message.into() }
    }

    pub fn remediation<P: Into<PathBuf>, S: Into<String>>(path: P, message: S) -> Self {
        Self::Remediation { path: path.into(), message: message.into() }
    }

    /// Returns true if the error must abort the whole run rather than a
    /// single candidate.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Setup { .. })
    }
}
