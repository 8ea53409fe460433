use crate::adapter::SqliteAdapter;
use crate::config::SqliteConfig;
use strata::errors::StrataResult;

/// Builder for configuring a SQLite adapter.
///
/// `SqliteAdapterBuilder` provides a fluent API for the connection parameters. Without
/// a `db_path` the adapter opens a private in-memory database.
pub struct SqliteAdapterBuilder {
    config: SqliteConfig,
}

impl SqliteAdapterBuilder {
    /// Creates a new builder with default configuration.
    #[inline]
    pub fn new() -> SqliteAdapterBuilder {
        SqliteAdapterBuilder {
            config: SqliteConfig::new(),
        }
    }

    /// Sets the database file path. The file is created if it does not exist.
    ///
    /// # Arguments
    ///
    /// * `path` - File system path of the database file
    ///
    /// # Returns
    ///
    /// This `SqliteAdapterBuilder` for method chaining
    #[inline]
    pub fn db_path(self, path: &str) -> Self {
        self.config.set_db_path(path);
        self
    }

    /// Sets how long a statement waits on a locked database, in milliseconds.
    #[inline]
    pub fn busy_timeout(self, timeout_ms: u64) -> Self {
        self.config.set_busy_timeout(timeout_ms);
        self
    }

    /// Enables or disables foreign key enforcement for the connection.
    #[inline]
    pub fn foreign_keys(self, enabled: bool) -> Self {
        self.config.set_foreign_keys(enabled);
        self
    }

    /// Opens the connection and builds the adapter.
    ///
    /// # Returns
    ///
    /// `Ok(SqliteAdapter)` on success, or an error if the database cannot be opened.
    pub fn build(self) -> StrataResult<SqliteAdapter> {
        SqliteAdapter::open(self.config)
    }
}

impl Default for SqliteAdapterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
