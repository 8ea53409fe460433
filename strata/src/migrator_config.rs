//! Configuration management for the migrator.

use crate::adapter::Adapter;
use crate::errors::{ErrorKind, StrataError, StrataResult};
use crate::naming::NamingConfig;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Public interface for migrator configuration.
///
/// Holds the adapter, the naming affixes and the transactional flag. Once a
/// [crate::migrator::Migrator] is built from it the configuration is frozen: every
/// setter fails with [ErrorKind::InvalidOperation], so affixes cannot change while a
/// migration is running.
///
/// # Examples
///
/// ```rust,ignore
/// use strata::migrator::Migrator;
///
/// let migrator = Migrator::builder()
///     .adapter(Arc::new(MemoryAdapter::new()))
///     .table_name_prefix("app_")
///     .build()?;
/// assert_eq!(migrator.config().naming().table_name_prefix(), "app_");
/// ```
#[derive(Clone)]
pub struct MigratorConfig {
    /// The pointer to implementation. Uses Arc for cheap cloning and thread safety.
    inner: Arc<MigratorConfigInner>,
}

impl Default for MigratorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl MigratorConfig {
    /// Creates a new configuration: no adapter, empty affixes, transactional.
    pub fn new() -> Self {
        MigratorConfig {
            inner: Arc::new(MigratorConfigInner::new()),
        }
    }

    /// Returns the configured adapter.
    ///
    /// # Errors
    ///
    /// Returns error if no adapter has been set.
    pub fn adapter(&self) -> StrataResult<Arc<dyn Adapter>> {
        self.inner.adapter()
    }

    /// Sets the adapter. It can be set only once.
    pub fn set_adapter(&self, adapter: Arc<dyn Adapter>) -> StrataResult<()> {
        self.inner.set_adapter(adapter)
    }

    /// Returns a snapshot of the naming configuration.
    pub fn naming(&self) -> NamingConfig {
        self.inner.naming.read().clone()
    }

    /// Sets the global table name prefix.
    ///
    /// # Errors
    ///
    /// Returns error if already configured or if the prefix contains characters other
    /// than ASCII letters, digits and underscores.
    pub fn set_table_name_prefix(&self, prefix: &str) -> StrataResult<()> {
        self.inner.set_table_name_prefix(prefix)
    }

    /// Sets the global table name suffix.
    pub fn set_table_name_suffix(&self, suffix: &str) -> StrataResult<()> {
        self.inner.set_table_name_suffix(suffix)
    }

    /// Whether each migration step runs inside an adapter transaction.
    pub fn transactional(&self) -> bool {
        self.inner.transactional.load(Ordering::Relaxed)
    }

    pub fn set_transactional(&self, transactional: bool) -> StrataResult<()> {
        self.inner.check_not_configured("transactional mode")?;
        self.inner
            .transactional
            .store(transactional, Ordering::Relaxed);
        Ok(())
    }

    /// Freezes the configuration.
    pub(crate) fn initialize(&self) -> StrataResult<()> {
        self.inner.adapter()?;
        self.inner.configured.store(true, Ordering::Relaxed);
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.inner.configured.load(Ordering::Relaxed)
    }
}

/// Private implementation of migrator configuration.
struct MigratorConfigInner {
    /// Set once a migrator has been built from this configuration
    configured: AtomicBool,
    /// The database adapter (set only once)
    adapter: OnceLock<Arc<dyn Adapter>>,
    /// Global table name affixes
    naming: RwLock<NamingConfig>,
    /// Wrap every step in a transaction
    transactional: AtomicBool,
}

impl MigratorConfigInner {
    fn new() -> Self {
        MigratorConfigInner {
            configured: AtomicBool::from(false),
            adapter: OnceLock::new(),
            naming: RwLock::new(NamingConfig::default()),
            transactional: AtomicBool::from(true),
        }
    }

    fn check_not_configured(&self, what: &str) -> StrataResult<()> {
        if self.configured.load(Ordering::Relaxed) {
            log::error!("The {} cannot be changed after initialization", what);
            return Err(StrataError::new(
                &format!("The {} cannot be changed after initialization", what),
                ErrorKind::InvalidOperation,
            ));
        }
        Ok(())
    }

    fn adapter(&self) -> StrataResult<Arc<dyn Adapter>> {
        match self.adapter.get() {
            Some(adapter) => Ok(adapter.clone()),
            None => {
                log::error!("No adapter is configured");
                Err(StrataError::new(
                    "No adapter is configured",
                    ErrorKind::InvalidOperation,
                ))
            }
        }
    }

    fn set_adapter(&self, adapter: Arc<dyn Adapter>) -> StrataResult<()> {
        self.check_not_configured("adapter")?;
        self.adapter.set(adapter).map_err(|_| {
            log::error!("An adapter is already configured");
            StrataError::new(
                "An adapter is already configured",
                ErrorKind::InvalidOperation,
            )
        })
    }

    fn set_table_name_prefix(&self, prefix: &str) -> StrataResult<()> {
        self.check_not_configured("table name prefix")?;
        let mut naming = self.naming.write();
        *naming = NamingConfig::new(prefix, naming.table_name_suffix())?;
        Ok(())
    }

    fn set_table_name_suffix(&self, suffix: &str) -> StrataResult<()> {
        self.check_not_configured("table name suffix")?;
        let mut naming = self.naming.write();
        *naming = NamingConfig::new(naming.table_name_prefix(), suffix)?;
        Ok(())
    }
}
