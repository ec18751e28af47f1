//! Type-keyed registry of lazily resolved application singletons.
//!
//! A [`Registry`] holds one deferred factory per [`Kind`] and caches the
//! instance each factory produces. Lookups go through the cache first; on a
//! miss the factory runs once, even when many threads ask at the same time,
//! and every caller receives the same instance.
//!
//! Cached instances live in a *generation*. [`Registry::rebuild`] builds a
//! complete new generation off to the side and swaps it in, so callers see
//! either the old set of singletons or the new one, never a mix.
//!
//! ## Example
//!
//! ```no_run
//! use app_essentials::{Key, Logger, Registry, Settings, SettingsOptions};
//!
//! let registry = Registry::with_defaults(SettingsOptions::default().with_base_dir("config"));
//!
//! let logger = registry.resolve::<Logger>()?.for_context("Program");
//! let settings = registry.resolve::<Settings>()?;
//!
//! logger.info(format!("PingKey: {:?}", settings.value(&Key::new("PingKey"))));
//! # Ok::<(), app_essentials::Error>(())
//! ```

mod global;
mod kind;

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::{Mutex, RwLock};

use crate::logging::{Logger, DEFAULT_SECTION};
use crate::settings::{Settings, SettingsOptions, SettingsProvider};
use crate::Error;

pub use global::essentials;
pub use kind::{Instance, Kind, Resolvable};

/// Deferred constructor for one kind.
///
/// The [`Resolver`] lets a factory pull in the other kinds it depends on.
pub type Factory = Arc<dyn Fn(&Resolver<'_>) -> Result<Instance, Error> + Send + Sync>;

/// One complete set of cache slots, one per registered kind.
struct Generation {
    slots: HashMap<Kind, OnceCell<Instance>>,
}

impl Generation {
    fn new<'a>(kinds: impl IntoIterator<Item = &'a Kind>) -> Self {
        Self {
            slots: kinds.into_iter().map(|kind| (*kind, OnceCell::new())).collect(),
        }
    }
}

/// Settings and logger taken from the same generation.
#[derive(Debug, Clone)]
pub struct Bundle {
    pub settings: Arc<Settings>,
    pub logger: Arc<Logger>,
}

/// Process-wide container of lazily built singletons.
///
/// Factories are fixed at construction; only the cache changes afterwards.
/// A factory that resolves its own kind, directly or through another factory,
/// deadlocks.
pub struct Registry {
    factories: HashMap<Kind, Factory>,
    cache: RwLock<Arc<Generation>>,
    rebuild_lock: Mutex<()>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder {
            factories: HashMap::new(),
        }
    }

    /// Registry with the canonical settings and logger factories.
    pub fn with_defaults(options: SettingsOptions) -> Self {
        Self::with_provider(Arc::new(SettingsProvider::new(options)), DEFAULT_SECTION)
    }

    /// Registry whose settings come from `provider` and whose logger is built
    /// from the `logger_section` of those settings.
    ///
    /// The provider keeps its own instance, so a rebuild reuses the loaded
    /// settings and builds a fresh logger from them.
    pub fn with_provider(provider: Arc<SettingsProvider>, logger_section: impl Into<String>) -> Self {
        let section = logger_section.into();
        Self::builder()
            .register(Kind::Settings, move |_| provider.get().map(Instance::Settings))
            .register(Kind::Logger, move |resolver| {
                let settings = resolver.resolve::<Settings>()?;
                Logger::from_settings(&settings, &section).map(Instance::from)
            })
            .build()
    }

    pub fn is_registered(&self, kind: Kind) -> bool {
        self.factories.contains_key(&kind)
    }

    /// Registered kinds in resolution order.
    pub fn kinds(&self) -> Vec<Kind> {
        let mut kinds: Vec<Kind> = self.factories.keys().copied().collect();
        kinds.sort();
        kinds
    }

    /// Resolves the singleton of type `T`.
    pub fn resolve<T: Resolvable>(&self) -> Result<Arc<T>, Error> {
        extract(self.resolve_kind(T::KIND)?)
    }

    /// Resolves the singleton registered for `kind`.
    ///
    /// Returns the cached instance when there is one. Otherwise runs the
    /// factory, caches its result and returns it. Fails with
    /// [`Error::Unregistered`] when no factory exists for `kind`.
    pub fn resolve_kind(&self, kind: Kind) -> Result<Instance, Error> {
        let generation = self.current();
        self.resolve_in(&generation, kind)
    }

    /// Builds every singleton eagerly.
    ///
    /// Without `force`, the current generation is filled in place: kinds
    /// already cached stay as they are, and a first `resolve` running
    /// concurrently shares its factory run with this one.
    ///
    /// With `force`, all factories run against a fresh generation, which
    /// replaces the current one only once every factory has succeeded. On
    /// failure the current generation is left untouched.
    pub fn rebuild(&self, force: bool) -> Result<(), Error> {
        let _guard = self.rebuild_lock.lock();
        if !force {
            let generation = self.current();
            for kind in self.kinds() {
                self.resolve_in(&generation, kind)?;
            }
            return Ok(());
        }

        let generation = Generation::new(self.factories.keys());
        for kind in self.kinds() {
            self.resolve_in(&generation, kind)?;
        }
        *self.cache.write() = Arc::new(generation);

        tracing::info!(force, kinds = self.factories.len(), "registry rebuilt");
        Ok(())
    }

    /// Settings and logger from one consistent generation.
    ///
    /// Resolves everything eagerly first; `rebuild` forces a fresh generation.
    pub fn bundle(&self, rebuild: bool) -> Result<Bundle, Error> {
        self.rebuild(rebuild)?;
        let generation = self.current();
        let resolver = Resolver {
            registry: self,
            generation: &generation,
        };
        Ok(Bundle {
            settings: resolver.resolve::<Settings>()?,
            logger: resolver.resolve::<Logger>()?,
        })
    }

    fn current(&self) -> Arc<Generation> {
        Arc::clone(&*self.cache.read())
    }

    fn resolve_in(&self, generation: &Generation, kind: Kind) -> Result<Instance, Error> {
        let (Some(slot), Some(factory)) = (generation.slots.get(&kind), self.factories.get(&kind))
        else {
            return Err(Error::Unregistered(kind));
        };

        let instance = slot.get_or_try_init(|| {
            tracing::debug!(%kind, "resolving");
            let instance = factory(&Resolver {
                registry: self,
                generation,
            })?;
            if instance.kind() != kind {
                return Err(Error::KindMismatch {
                    expected: kind,
                    found: instance.kind(),
                });
            }
            Ok(instance)
        })?;

        Ok(instance.clone())
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("kinds", &self.kinds())
            .finish_non_exhaustive()
    }
}

/// Builder for a [`Registry`].
#[derive(Default)]
#[must_use = "builders do nothing until .build() is called"]
pub struct RegistryBuilder {
    factories: HashMap<Kind, Factory>,
}

impl RegistryBuilder {
    /// Registers the factory for `kind`, replacing any earlier one.
    pub fn register<F>(mut self, kind: Kind, factory: F) -> Self
    where
        F: Fn(&Resolver<'_>) -> Result<Instance, Error> + Send + Sync + 'static,
    {
        self.factories.insert(kind, Arc::new(factory));
        self
    }

    pub fn build(self) -> Registry {
        let generation = Generation::new(self.factories.keys());
        Registry {
            factories: self.factories,
            cache: RwLock::new(Arc::new(generation)),
            rebuild_lock: Mutex::new(()),
        }
    }
}

/// View of a registry handed to factories.
///
/// Resolves within the generation the calling factory is building, so a
/// rebuild wires new instances only to other new instances.
pub struct Resolver<'a> {
    registry: &'a Registry,
    generation: &'a Generation,
}

impl Resolver<'_> {
    pub fn resolve<T: Resolvable>(&self) -> Result<Arc<T>, Error> {
        extract(self.resolve_kind(T::KIND)?)
    }

    pub fn resolve_kind(&self, kind: Kind) -> Result<Instance, Error> {
        self.registry.resolve_in(self.generation, kind)
    }
}

fn extract<T: Resolvable>(instance: Instance) -> Result<Arc<T>, Error> {
    let found = instance.kind();
    T::from_instance(instance).ok_or(Error::KindMismatch {
        expected: T::KIND,
        found,
    })
}
