//! Adapter contract between the migration engine and a database.
//!
//! An adapter is split into two traits: [SchemaStatements] covers the DDL surface used
//! by migration bodies, [DatabaseStatements] covers raw statements, record access and
//! transactions. Anything implementing both is an [Adapter].

mod memory;

pub use memory::*;

use crate::common::Value;
use crate::errors::{ErrorKind, StrataResult};
use crate::schema::{
    index_name, Column, ColumnOptions, ColumnType, IndexDefinition, IndexOptions, IndexTarget,
    Removal, Row, TableDefinition,
};

/// DDL operations a migration can perform.
///
/// # Purpose
/// Defines the structural changes a migration delegates to the database: creating and
/// dropping tables, adding, removing and changing columns, and managing indexes, plus
/// the introspection queries needed to observe the result.
///
/// # Errors
/// Every failure is reported as [ErrorKind::StatementInvalid] carrying the database's
/// own message (e.g. `no such table: reminders`). The engine never catches these.
///
/// # Thread Safety
/// Implementers must be `Send + Sync`.
pub trait SchemaStatements: Send + Sync {
    /// Creates table `name` with the columns collected in `definition`.
    ///
    /// When [crate::schema::TableOptions::force] is set an existing table of the same
    /// name is dropped first.
    fn create_table(&self, name: &str, definition: &TableDefinition) -> StrataResult<()>;

    /// Drops table `name`. Fails if the table does not exist.
    fn drop_table(&self, name: &str) -> StrataResult<()>;

    /// Adds a column to an existing table.
    ///
    /// # Arguments
    /// * `table` - The table to alter
    /// * `column` - The new column's name
    /// * `column_type` - Its abstract type
    /// * `options` - Nullability, default and limit
    fn add_column(
        &self,
        table: &str,
        column: &str,
        column_type: ColumnType,
        options: &ColumnOptions,
    ) -> StrataResult<()>;

    /// Removes a column, keeping the rest of the table's data.
    fn remove_column(&self, table: &str, column: &str) -> StrataResult<()>;

    /// Renames a column, keeping its data and any indexes that cover it.
    fn rename_column(&self, table: &str, old_name: &str, new_name: &str) -> StrataResult<()>;

    /// Replaces a column's type and options, keeping its data where it converts.
    fn change_column(
        &self,
        table: &str,
        column: &str,
        column_type: ColumnType,
        options: &ColumnOptions,
    ) -> StrataResult<()>;

    /// Sets (or clears, with `None`) a column's default value.
    fn change_column_default(
        &self,
        table: &str,
        column: &str,
        default: Option<Value>,
    ) -> StrataResult<()>;

    /// Creates an index over `columns`. The name defaults to [SchemaStatements::index_name].
    fn add_index(&self, table: &str, columns: &[String], options: &IndexOptions)
        -> StrataResult<()>;

    /// Drops the index identified by `target`.
    fn remove_index(&self, table: &str, target: &IndexTarget) -> StrataResult<()>;

    /// Checks whether table `name` exists.
    fn table_exists(&self, name: &str) -> StrataResult<bool>;

    /// Lists the columns of `table` in declaration order.
    ///
    /// # Returns
    /// * `Ok(Vec<Column>)` with the introspected columns
    /// * `Err(StrataError)` if the table does not exist
    fn columns(&self, table: &str) -> StrataResult<Vec<Column>>;

    /// Lists the user-created indexes of `table`.
    fn indexes(&self, table: &str) -> StrataResult<Vec<IndexDefinition>>;

    /// Conventional index name for `columns` on `table`.
    fn index_name(&self, table: &str, columns: &[String]) -> String {
        index_name(table, columns)
    }

    /// Drops table `name` if it exists.
    ///
    /// # Returns
    /// * `Ok(Removal::Removed)` if the table was dropped
    /// * `Ok(Removal::AlreadyAbsent)` if there was nothing to drop
    fn drop_table_if_exists(&self, name: &str) -> StrataResult<Removal> {
        if self.table_exists(name)? {
            self.drop_table(name)?;
            Ok(Removal::Removed)
        } else {
            Ok(Removal::AlreadyAbsent)
        }
    }

    /// Removes `column` from `table` if both exist.
    fn remove_column_if_exists(&self, table: &str, column: &str) -> StrataResult<Removal> {
        if !self.table_exists(table)? {
            return Ok(Removal::AlreadyAbsent);
        }
        let present = self.columns(table)?.iter().any(|c| c.name() == column);
        if present {
            self.remove_column(table, column)?;
            Ok(Removal::Removed)
        } else {
            Ok(Removal::AlreadyAbsent)
        }
    }
}

/// Statement execution, record access and transactions.
///
/// The record operations are deliberately coarse (whole-table select, update and
/// delete). They exist for the version store and for seeding data from migrations,
/// so they work against any adapter without a query language.
pub trait DatabaseStatements: Send + Sync {
    /// Executes a raw SQL statement (or several, separated by `;`).
    fn execute(&self, sql: &str) -> StrataResult<()>;

    /// Inserts one row. Missing columns take their defaults.
    fn insert(&self, table: &str, row: &Row) -> StrataResult<()>;

    /// Returns every row of `table`, with values coerced to the column types.
    fn select_all(&self, table: &str) -> StrataResult<Vec<Row>>;

    /// Sets the given columns on every row of `table` and returns the number of rows
    /// touched.
    fn update_all(&self, table: &str, values: &Row) -> StrataResult<usize>;

    /// Deletes every row of `table` and returns how many were removed.
    fn delete_all(&self, table: &str) -> StrataResult<usize>;

    /// Runs `body` as one atomic unit.
    ///
    /// If `body` fails, the changes it made are rolled back and its error is returned
    /// unchanged. The default runs `body` without any protection, for adapters that
    /// cannot offer atomic DDL.
    fn transaction(&self, body: &mut dyn FnMut() -> StrataResult<()>) -> StrataResult<()> {
        body()
    }
}

/// A complete database adapter.
pub trait Adapter: SchemaStatements + DatabaseStatements {}

impl<T: SchemaStatements + DatabaseStatements> Adapter for T {}

pub(crate) fn statement_invalid(message: &str) -> crate::errors::StrataError {
    crate::errors::StrataError::new(message, ErrorKind::StatementInvalid)
}
