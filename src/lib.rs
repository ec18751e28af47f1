pub mod config;
mod error;
pub mod logging;
pub mod registry;
pub mod settings;

pub use config::{Config, ConfigError, ConfigTree};
pub use error::Error;
pub use logging::{Logger, LoggerSettings};
pub use registry::{essentials, Bundle, Instance, Kind, Registry, Resolvable, Resolver};
pub use settings::{EnvironmentFile, Key, Settings, SettingsOptions, SettingsProvider};
