use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Default time a statement waits on a locked database before failing.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

#[derive(Clone)]
/// SQLite connection configuration.
///
/// A cloneable, thread-safe holder for the connection parameters, using the PIMPL
/// pattern with `Arc<SqliteConfigInner>`.
///
/// Characteristics:
/// - No `db_path` means an in-memory database
/// - Busy timeout defaults to [DEFAULT_BUSY_TIMEOUT_MS]
/// - Foreign key enforcement is off by default, as in SQLite itself
///
/// Usage: configure through [crate::SqliteAdapterBuilder] rather than directly.
pub struct SqliteConfig {
    inner: Arc<SqliteConfigInner>,
}

impl SqliteConfig {
    #[inline]
    pub fn new() -> SqliteConfig {
        SqliteConfig {
            inner: Arc::new(SqliteConfigInner::new()),
        }
    }

    /// Database file path, or `None` for an in-memory database.
    pub fn db_path(&self) -> Option<String> {
        self.inner.db_path.read().clone()
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.inner.busy_timeout_ms.load(Ordering::Relaxed))
    }

    pub fn foreign_keys(&self) -> bool {
        self.inner.foreign_keys.load(Ordering::Relaxed)
    }

    pub(crate) fn set_db_path(&self, path: &str) {
        *self.inner.db_path.write() = Some(path.to_string());
    }

    pub(crate) fn set_busy_timeout(&self, timeout_ms: u64) {
        self.inner
            .busy_timeout_ms
            .store(timeout_ms, Ordering::Relaxed);
    }

    pub(crate) fn set_foreign_keys(&self, enabled: bool) {
        self.inner.foreign_keys.store(enabled, Ordering::Relaxed);
    }
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self::new()
    }
}

struct SqliteConfigInner {
    db_path: RwLock<Option<String>>,
    busy_timeout_ms: AtomicU64,
    foreign_keys: AtomicBool,
}

impl SqliteConfigInner {
    fn new() -> Self {
        SqliteConfigInner {
            db_path: RwLock::new(None),
            busy_timeout_ms: AtomicU64::new(DEFAULT_BUSY_TIMEOUT_MS),
            foreign_keys: AtomicBool::new(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SqliteConfig::new();
        assert_eq!(config.db_path(), None);
        assert_eq!(config.busy_timeout(), Duration::from_millis(5_000));
        assert!(!config.foreign_keys());
    }

    #[test]
    fn test_clones_share_settings() {
        let config = SqliteConfig::new();
        let clone = config.clone();
        config.set_db_path("/tmp/strata.db");
        config.set_busy_timeout(250);
        config.set_foreign_keys(true);

        assert_eq!(clone.db_path(), Some("/tmp/strata.db".to_string()));
        assert_eq!(clone.busy_timeout(), Duration::from_millis(250));
        assert!(clone.foreign_keys());
    }
}
