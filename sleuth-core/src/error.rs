use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A failure that aborts an analysis run.
///
/// Failures of the probe request itself are not in here: they are folded
/// into the probe result and reported as findings. Only a prober that
/// cannot be built aborts a run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("cannot read {}: {source}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("cannot persist report: {0}")]
    Persist(#[source] io::Error),

    #[error("cannot set up prober: {0}")]
    Probe(#[from] sleuth_scanner::ProbeError),
}

pub type Result<T> = std::result::Result<T, RunError>;
