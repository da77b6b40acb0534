//! Error types for the node planner.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using the planner's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building or rendering a capacity plan.
#[derive(Error, Debug)]
pub enum Error {
    /// A configuration value is outside its allowed domain.
    #[error("invalid configuration: `{field}` {reason}")]
    InvalidConfiguration { field: &'static str, reason: String },

    /// The configuration file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for a [`FleetConfig`](crate::FleetConfig).
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The report could not be serialized.
    #[error("failed to render report: {0}")]
    Render(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidConfiguration {
            field,
            reason: reason.into(),
        }
    }
}
