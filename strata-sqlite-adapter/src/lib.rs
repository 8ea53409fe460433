//! # strata SQLite adapter
//!
//! Persistent schema migrations for [strata] backed by SQLite through `rusqlite`, with
//! SQLite compiled in.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use strata::migrator::Migrator;
//! use strata_sqlite_adapter::SqliteAdapter;
//!
//! let adapter = SqliteAdapter::with_config()
//!     .db_path("/path/to/app.db")
//!     .build()?;
//! let migrator = Migrator::builder().adapter(Arc::new(adapter)).build()?;
//! ```
//!
//! Column types map to native SQLite types as follows: `string` to `varchar(n)`
//! (255 unless a limit is given), `primary_key` to `INTEGER PRIMARY KEY AUTOINCREMENT`,
//! `binary` to `blob`, and every other type to the SQLite type of the same name.

mod adapter;
mod builder;
mod config;
mod wrapper;

pub use adapter::*;
pub use builder::*;
pub use config::*;
pub use wrapper::SqliteValueError;
