use crate::config::ConfigError;
use crate::registry::Kind;
use thiserror::Error;

/// Top-level error type for the app-essentials library.
///
/// Every variant is a configuration or programming error; none is worth
/// retrying.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("instance of {0} can't be obtained: no such kind is registered")]
    Unregistered(Kind),

    #[error("required configuration section '{0}' does not exist")]
    MissingSection(String),

    #[error("invalid log level '{0}'; use trace, debug, info, warn, error or off")]
    InvalidLogLevel(String),

    #[error("factory registered for {expected} produced {found}")]
    KindMismatch { expected: Kind, found: Kind },
}
