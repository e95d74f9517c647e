//! Error types for splitting, launching and collecting units.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Diagnostic shown when the system refuses another process or thread.
pub const RESOURCE_EXHAUSTED: &str = "cannot allocate resources for another worker unit";

#[derive(Debug, Error)]
pub enum Error {
    #[error("file does not exist: {}", .path.display())]
    InputMissing { path: PathBuf },
    #[error("lack file read permissions: {}", .path.display())]
    InputDenied { path: PathBuf },
    #[error("invalid input {}: {source}", .path.display())]
    InvalidInput { path: PathBuf, source: io::Error },
    #[error("invalid number of parts {parts}: must be between 1 and the input length ({len} bytes)")]
    InvalidPartition { parts: i64, len: usize },
    #[error("compressed file(s) exist: {}", .artifact.display())]
    PreexistingArtifact { artifact: PathBuf },
    #[error("failed to launch unit {index}: {source}")]
    Launch { index: usize, source: io::Error },
    #[error("{} of {total} units failed: {failed:?}", .failed.len())]
    UnitExecution { failed: Vec<usize>, total: usize },
    #[error("{codec} codec failed: {message}")]
    Codec { codec: &'static str, message: String },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Classify a failure to open or read the input file.
    pub fn from_input(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::NotFound => Error::InputMissing { path },
            io::ErrorKind::PermissionDenied => Error::InputDenied { path },
            _ => Error::InvalidInput { path, source },
        }
    }

    /// True for launch failures caused by process/thread or memory limits.
    pub fn is_resource_exhaustion(&self) -> bool {
        match self {
            Error::Launch { source, .. } => matches!(
                source.raw_os_error(),
                Some(code) if code == libc::EAGAIN || code == libc::ENOMEM
            ),
            _ => false,
        }
    }

    /// Extra diagnostic for failures that need one beyond the error itself.
    pub fn hint(&self) -> Option<&'static str> {
        if self.is_resource_exhaustion() {
            Some(RESOURCE_EXHAUSTED)
        } else {
            None
        }
    }

    /// Validation failures happen before any artifact or unit exists.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InputMissing { .. }
                | Error::InputDenied { .. }
                | Error::InvalidInput { .. }
                | Error::InvalidPartition { .. }
                | Error::PreexistingArtifact { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
