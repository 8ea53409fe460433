use crate::adapter::Adapter;
use crate::errors::{StrataError, StrataResult};
use crate::migrator::Migrator;
use crate::migrator_config::MigratorConfig;
use std::sync::Arc;

/// Builder for creating and configuring a [Migrator].
///
/// `MigratorBuilder` provides a fluent API for configuring the migrator. It captures
/// the first configuration error and reports it from [MigratorBuilder::build], so a
/// chain of setters can be written without intermediate error handling.
///
/// # Examples
///
/// ```rust,ignore
/// use strata::adapter::MemoryAdapter;
/// use strata::migrator::Migrator;
///
/// let migrator = Migrator::builder()
///     .adapter(Arc::new(MemoryAdapter::new()))
///     .table_name_prefix("prefix_")
///     .table_name_suffix("_suffix")
///     .build()?;
/// assert_eq!(migrator.schema_info_table_name(), "prefix_schema_info_suffix");
/// ```
#[derive(Default)]
pub struct MigratorBuilder {
    error: Option<StrataError>,
    config: MigratorConfig,
}

impl MigratorBuilder {
    /// Creates a new `MigratorBuilder` with the default configuration: no adapter,
    /// no table name affixes, transactional steps.
    pub fn new() -> Self {
        MigratorBuilder {
            error: None,
            config: MigratorConfig::new(),
        }
    }

    /// Sets the database adapter migrations run against.
    pub fn adapter(mut self, adapter: Arc<dyn Adapter>) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_adapter(adapter) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Sets the global table name prefix.
    ///
    /// # Arguments
    ///
    /// * `prefix` - ASCII letters, digits and underscores only
    ///
    /// An invalid prefix is captured and returned by `build()`.
    pub fn table_name_prefix(mut self, prefix: &str) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_table_name_prefix(prefix) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Sets the global table name suffix.
    pub fn table_name_suffix(mut self, suffix: &str) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_table_name_suffix(suffix) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Chooses whether each migration step (body plus version write) runs inside an
    /// adapter transaction. Enabled by default.
    pub fn transactional(mut self, transactional: bool) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_transactional(transactional) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Builds the migrator, freezing the configuration.
    ///
    /// # Returns
    ///
    /// `Ok(Migrator)` on success, or the first error captured by a setter. Fails if no
    /// adapter was configured.
    pub fn build(self) -> StrataResult<Migrator> {
        if let Some(error) = self.error {
            return Err(error);
        }
        self.config.initialize()?;
        Migrator::new(self.config)
    }
}
