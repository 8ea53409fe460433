#![allow(clippy::module_inception)]
//! # Strata - Versioned Schema Migrations
//!
//! Strata applies an ordered sequence of reversible, versioned schema changes to a
//! relational database and records which version the database currently reflects.
//!
//! ## Key Features
//!
//! - **Versioned**: migrations are identified by `<version>_<name>` and run in version order
//! - **Reversible**: every migration pairs an `up` body with the `down` body that undoes it
//! - **Targeted**: move up or down to any version, or let [migrator::Migrator::migrate]
//!   pick the direction
//! - **Tracked**: the current version lives in a single-row `schema_info` table
//! - **Prefixed Tables**: global or per-entity table name prefixes and suffixes
//! - **Pluggable Adapters**: an in-memory adapter ships with the core, SQLite lives in
//!   the `strata_sqlite_adapter` crate
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use strata::adapter::MemoryAdapter;
//! use strata::migration::MigrationSet;
//! use strata::migrator::Migrator;
//! use strata::schema::{ColumnOptions, ColumnType};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let migrator = Migrator::builder()
//!     .adapter(Arc::new(MemoryAdapter::new()))
//!     .build()?;
//!
//! let migrations = MigrationSet::new().add(
//!     "1_create_people",
//!     |schema| schema.create_table("people", |t| {
//!         t.string("first_name");
//!         t.column("age", ColumnType::Integer, ColumnOptions::new().not_null().default_value(0));
//!     }),
//!     |schema| schema.drop_table("people"),
//! );
//!
//! migrator.up(&migrations, None)?;
//! assert_eq!(migrator.current_version()?, 1);
//!
//! migrator.down(&migrations, None)?;
//! assert_eq!(migrator.current_version()?, 0);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`adapter`] - Adapter traits and the in-memory adapter
//! - [`common`] - Values, naming helpers and shared constants
//! - [`errors`] - Error types and result definitions
//! - [`migration`] - Migration units, the schema handle and migration sources
//! - [`migrator`] - Planning and executing migrations
//! - [`migrator_builder`] - Builder for the migrator
//! - [`migrator_config`] - Migrator configuration
//! - [`naming`] - Table name resolution
//! - [`schema`] - Column, table and index definitions
//! - [`version_store`] - Persisted schema version

pub mod adapter;
pub mod common;
pub mod errors;
pub mod migration;
pub mod migrator;
pub mod migrator_builder;
pub mod migrator_config;
pub mod naming;
pub mod schema;
pub mod version_store;

pub use common::Value;
pub use errors::{ErrorKind, StrataError, StrataResult};
pub use migrator::Migrator;
