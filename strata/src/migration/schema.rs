use crate::adapter::{Adapter, DatabaseStatements, SchemaStatements};
use crate::common::Value;
use crate::errors::StrataResult;
use crate::naming::{NamingConfig, TableRef};
use crate::schema::{
    Column, ColumnOptions, ColumnType, IndexDefinition, IndexOptions, IndexTarget, Removal, Row,
    TableDefinition, TableOptions,
};
use std::time::Instant;

/// The DDL surface handed to migration bodies.
///
/// Every table argument is resolved to its physical name through the migrator's
/// [NamingConfig] before it reaches the adapter, so a body written against
/// `"reminders"` operates on `prefix_reminders_suffix` when affixes are configured.
/// Raw [Schema::execute] is passed through untouched.
///
/// Each operation is logged as `-- add_column(people, last_name)` followed by its
/// duration.
pub struct Schema<'a> {
    adapter: &'a dyn Adapter,
    naming: &'a NamingConfig,
}

impl<'a> Schema<'a> {
    pub fn new(adapter: &'a dyn Adapter, naming: &'a NamingConfig) -> Self {
        Schema { adapter, naming }
    }

    /// The underlying adapter, for operations that should bypass name resolution.
    pub fn adapter(&self) -> &dyn Adapter {
        self.adapter
    }

    pub fn proper_table_name<'t>(&self, table: impl Into<TableRef<'t>>) -> String {
        self.naming.proper_table_name(table)
    }

    /// Creates a table with default [TableOptions] (an `id` primary key is added).
    pub fn create_table<'t, F>(&self, table: impl Into<TableRef<'t>>, build: F) -> StrataResult<()>
    where
        F: FnOnce(&mut TableDefinition),
    {
        self.create_table_with(table, TableOptions::default(), build)
    }

    /// Creates a table with explicit options.
    pub fn create_table_with<'t, F>(
        &self,
        table: impl Into<TableRef<'t>>,
        options: TableOptions,
        build: F,
    ) -> StrataResult<()>
    where
        F: FnOnce(&mut TableDefinition),
    {
        let table = self.proper_table_name(table);
        let mut definition = TableDefinition::new(options);
        build(&mut definition);
        self.say_with_time(&format!("create_table({})", table), || {
            self.adapter.create_table(&table, &definition)
        })
    }

    pub fn drop_table<'t>(&self, table: impl Into<TableRef<'t>>) -> StrataResult<()> {
        let table = self.proper_table_name(table);
        self.say_with_time(&format!("drop_table({})", table), || {
            self.adapter.drop_table(&table)
        })
    }

    pub fn drop_table_if_exists<'t>(
        &self,
        table: impl Into<TableRef<'t>>,
    ) -> StrataResult<Removal> {
        let table = self.proper_table_name(table);
        self.say_with_time(&format!("drop_table_if_exists({})", table), || {
            self.adapter.drop_table_if_exists(&table)
        })
    }

    pub fn add_column<'t>(
        &self,
        table: impl Into<TableRef<'t>>,
        column: &str,
        column_type: ColumnType,
        options: ColumnOptions,
    ) -> StrataResult<()> {
        let table = self.proper_table_name(table);
        self.say_with_time(&format!("add_column({}, {})", table, column), || {
            self.adapter.add_column(&table, column, column_type, &options)
        })
    }

    pub fn remove_column<'t>(
        &self,
        table: impl Into<TableRef<'t>>,
        column: &str,
    ) -> StrataResult<()> {
        let table = self.proper_table_name(table);
        self.say_with_time(&format!("remove_column({}, {})", table, column), || {
            self.adapter.remove_column(&table, column)
        })
    }

    pub fn remove_column_if_exists<'t>(
        &self,
        table: impl Into<TableRef<'t>>,
        column: &str,
    ) -> StrataResult<Removal> {
        let table = self.proper_table_name(table);
        self.say_with_time(
            &format!("remove_column_if_exists({}, {})", table, column),
            || self.adapter.remove_column_if_exists(&table, column),
        )
    }

    pub fn rename_column<'t>(
        &self,
        table: impl Into<TableRef<'t>>,
        old_name: &str,
        new_name: &str,
    ) -> StrataResult<()> {
        let table = self.proper_table_name(table);
        self.say_with_time(
            &format!("rename_column({}, {}, {})", table, old_name, new_name),
            || self.adapter.rename_column(&table, old_name, new_name),
        )
    }

    pub fn change_column<'t>(
        &self,
        table: impl Into<TableRef<'t>>,
        column: &str,
        column_type: ColumnType,
        options: ColumnOptions,
    ) -> StrataResult<()> {
        let table = self.proper_table_name(table);
        self.say_with_time(
            &format!("change_column({}, {}, {})", table, column, column_type),
            || self.adapter.change_column(&table, column, column_type, &options),
        )
    }

    pub fn change_column_default<'t>(
        &self,
        table: impl Into<TableRef<'t>>,
        column: &str,
        default: Option<Value>,
    ) -> StrataResult<()> {
        let table = self.proper_table_name(table);
        self.say_with_time(
            &format!("change_column_default({}, {})", table, column),
            || self.adapter.change_column_default(&table, column, default.clone()),
        )
    }

    pub fn add_index<'t>(
        &self,
        table: impl Into<TableRef<'t>>,
        columns: &[&str],
        options: IndexOptions,
    ) -> StrataResult<()> {
        let table = self.proper_table_name(table);
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        self.say_with_time(
            &format!("add_index({}, [{}])", table, columns.join(", ")),
            || self.adapter.add_index(&table, &columns, &options),
        )
    }

    pub fn remove_index<'t>(
        &self,
        table: impl Into<TableRef<'t>>,
        target: impl Into<IndexTarget>,
    ) -> StrataResult<()> {
        let table = self.proper_table_name(table);
        let target = target.into();
        self.say_with_time(
            &format!("remove_index({}, {})", table, target.resolve(&table)),
            || self.adapter.remove_index(&table, &target),
        )
    }

    pub fn table_exists<'t>(&self, table: impl Into<TableRef<'t>>) -> StrataResult<bool> {
        self.adapter.table_exists(&self.proper_table_name(table))
    }

    pub fn columns<'t>(&self, table: impl Into<TableRef<'t>>) -> StrataResult<Vec<Column>> {
        self.adapter.columns(&self.proper_table_name(table))
    }

    pub fn indexes<'t>(
        &self,
        table: impl Into<TableRef<'t>>,
    ) -> StrataResult<Vec<IndexDefinition>> {
        self.adapter.indexes(&self.proper_table_name(table))
    }

    /// Executes raw SQL. Table names inside `sql` are not resolved.
    pub fn execute(&self, sql: &str) -> StrataResult<()> {
        self.say_with_time(&format!("execute({})", sql.trim()), || {
            self.adapter.execute(sql)
        })
    }

    /// Inserts a row, typically seed data.
    pub fn insert<'t>(&self, table: impl Into<TableRef<'t>>, row: Row) -> StrataResult<()> {
        let table = self.proper_table_name(table);
        self.adapter.insert(&table, &row)
    }

    pub fn select_all<'t>(&self, table: impl Into<TableRef<'t>>) -> StrataResult<Vec<Row>> {
        self.adapter.select_all(&self.proper_table_name(table))
    }

    fn say_with_time<T, F>(&self, message: &str, operation: F) -> StrataResult<T>
    where
        F: FnOnce() -> StrataResult<T>,
    {
        log::info!("-- {}", message);
        let start = Instant::now();
        let result = operation()?;
        log::info!("   -> {:.4}s", start.elapsed().as_secs_f64());
        Ok(result)
    }
}
