//! Migration units, the DDL handle they run against, and the sources they are
//! discovered from.
//!
//! A migration is identified by `<version>_<name>`, e.g. `1_people_have_last_names`.
//! Versions define a total order; names are informational.
//!
//! # Defining migrations in code
//!
//! ```rust,ignore
//! use strata::migration::MigrationSet;
//! use strata::schema::ColumnType;
//!
//! let migrations = MigrationSet::new()
//!     .add(
//!         "1_people_have_last_names",
//!         |schema| {
//!             schema.add_column("people", "last_name", ColumnType::String, Default::default())
//!         },
//!         |schema| schema.remove_column("people", "last_name"),
//!     )
//!     .add(
//!         "2_we_need_reminders",
//!         |schema| schema.create_table("reminders", |t| {
//!             t.text("content");
//!             t.datetime("remind_at");
//!         }),
//!         |schema| schema.drop_table("reminders"),
//!     );
//! ```
//!
//! # Loading migrations from a directory
//!
//! A [DirectorySource] reads `<version>_<name>.up.sql` / `<version>_<name>.down.sql`
//! pairs and runs their contents as raw SQL.

mod migration;
mod schema;
mod source;

pub use migration::*;
pub use schema::*;
pub use source::*;
