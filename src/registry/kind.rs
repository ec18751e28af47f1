use std::fmt;
use std::sync::Arc;

use crate::logging::Logger;
use crate::settings::Settings;

/// The singleton kinds a [`Registry`](super::Registry) can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    Settings,
    Logger,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Settings => f.write_str("settings"),
            Kind::Logger => f.write_str("logger"),
        }
    }
}

/// A resolved singleton. Clones share the same underlying instance.
#[derive(Debug, Clone)]
pub enum Instance {
    Settings(Arc<Settings>),
    Logger(Arc<Logger>),
}

impl Instance {
    pub fn kind(&self) -> Kind {
        match self {
            Instance::Settings(_) => Kind::Settings,
            Instance::Logger(_) => Kind::Logger,
        }
    }

    /// True when both point at the same allocation.
    pub fn same_as(&self, other: &Instance) -> bool {
        match (self, other) {
            (Instance::Settings(a), Instance::Settings(b)) => Arc::ptr_eq(a, b),
            (Instance::Logger(a), Instance::Logger(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<Settings> for Instance {
    fn from(settings: Settings) -> Self {
        Instance::Settings(Arc::new(settings))
    }
}

impl From<Logger> for Instance {
    fn from(logger: Logger) -> Self {
        Instance::Logger(Arc::new(logger))
    }
}

/// Types that can be resolved from a registry by type.
pub trait Resolvable: Send + Sync + 'static {
    const KIND: Kind;

    fn from_instance(instance: Instance) -> Option<Arc<Self>>;
}

impl Resolvable for Settings {
    const KIND: Kind = Kind::Settings;

    fn from_instance(instance: Instance) -> Option<Arc<Self>> {
        match instance {
            Instance::Settings(settings) => Some(settings),
            _ => None,
        }
    }
}

impl Resolvable for Logger {
    const KIND: Kind = Kind::Logger;

    fn from_instance(instance: Instance) -> Option<Arc<Self>> {
        match instance {
            Instance::Logger(logger) => Some(logger),
            _ => None,
        }
    }
}
