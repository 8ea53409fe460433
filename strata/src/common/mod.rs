//! Common types shared across strata modules.

mod inflector;
mod value;

pub use inflector::*;
pub use value::*;

/// Logical name of the table holding the current schema version.
pub const SCHEMA_INFO_TABLE: &str = "schema_info";

/// Column of [SCHEMA_INFO_TABLE] holding the version number.
pub const SCHEMA_INFO_VERSION_COLUMN: &str = "version";

/// Version reported before any migration has been applied.
pub const INITIAL_SCHEMA_VERSION: u64 = 0;
