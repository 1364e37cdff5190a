//! Top-level error for a `dartdl` run.

use dartdl_data::DataError;
use std::path::PathBuf;
use thiserror::Error;

/// Anything that ends a run early.
#[derive(Debug, Error)]
pub(crate) enum AppError {
    /// Registry or listing failure
    #[error(transparent)]
    Data(#[from] DataError),

    /// Terminal prompt failure other than an interrupt
    #[error("prompt failed: {0}")]
    Prompt(dialoguer::Error),

    /// Output folder could not be created
    #[error("could not create output folder {path}: {source}")]
    OutputDir {
        /// Folder that failed
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// A blocking prompt task panicked or was cancelled
    #[error("prompt task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Ctrl-C
    #[error("interrupted")]
    Interrupted,
}

impl From<dialoguer::Error> for AppError {
    fn from(e: dialoguer::Error) -> Self {
        match e {
            dialoguer::Error::IO(io) if io.kind() == std::io::ErrorKind::Interrupted => {
                Self::Interrupted
            }
            e => Self::Prompt(e),
        }
    }
}

impl AppError {
    /// Process exit code for this error.
    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Interrupted => 130,
            _ => 1,
        }
    }
}
