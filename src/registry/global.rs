//! The process-wide default registry.

use once_cell::sync::Lazy;

use super::Registry;
use crate::settings::SettingsOptions;

// Created on first access with the default settings layout.
static ESSENTIALS: Lazy<Registry> = Lazy::new(|| Registry::with_defaults(SettingsOptions::default()));

/// Registry shared by the whole process.
///
/// Reads `appsettings.toml` (and the file for the current environment) from
/// the working directory. Build a [`Registry`] explicitly for any other layout.
///
/// ```no_run
/// use app_essentials::{essentials, Logger};
///
/// let logger = essentials().resolve::<Logger>()?;
/// logger.info("Application has been started");
/// # Ok::<(), app_essentials::Error>(())
/// ```
pub fn essentials() -> &'static Registry {
    &ESSENTIALS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Kind;

    #[test]
    fn test_global_registry_is_shared() {
        assert!(std::ptr::eq(essentials(), essentials()));
        assert_eq!(essentials().kinds(), vec![Kind::Settings, Kind::Logger]);
    }
}
