//! Error types for trust orchestration.

use thiserror::Error;

use crate::api::Target;

/// Result type alias using the orchestration [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort an orchestration run.
///
/// Resource-absent signals (404 on a collection, no matching item) never
/// surface here; probes turn them into `None` or `false`.
#[derive(Debug, Error)]
pub enum Error {
    /// Connection or protocol failure talking to an endpoint
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Endpoint answered with a status the current step does not accept
    #[error("{target} returned {status} for {method} {path}")]
    Status {
        target: Target,
        method: &'static str,
        path: String,
        status: u16,
    },

    /// Body could not be converted to or from the expected JSON shape
    #[error("JSON error on {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Device-info response carried no machine identifier
    #[error("{0} device-info response has no machineId")]
    MissingMachineId(Target),

    /// Endpoint configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A sequencer step failed; wraps the underlying cause
    #[error("{step}: {source}")]
    Step {
        step: &'static str,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Attach the name of the sequencer step that was running.
    pub fn in_step(self, step: &'static str) -> Self {
        Self::Step {
            step,
            source: Box::new(self),
        }
    }
}

/// Extension for tagging a fallible step result with its step name.
pub trait StepContext<T> {
    fn step(self, step: &'static str) -> Result<T>;
}

impl<T> StepContext<T> for Result<T> {
    fn step(self, step: &'static str) -> Result<T> {
        self.map_err(|e| e.in_step(step))
    }
}
