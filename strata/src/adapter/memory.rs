use crate::adapter::{statement_invalid, DatabaseStatements, SchemaStatements};
use crate::common::Value;
use crate::errors::StrataResult;
use crate::schema::{
    Column, ColumnDefinition, ColumnOptions, ColumnType, IndexDefinition, IndexOptions,
    IndexTarget, Row, TableDefinition,
};
use indexmap::IndexMap;
use itertools::Itertools;
use parking_lot::RwLock;
use std::sync::Arc;

/// In-memory implementation of the adapter traits.
///
/// # Purpose
/// `MemoryAdapter` keeps a catalog of tables, columns, indexes and rows in memory. It
/// enforces the same rules a relational database would for the operations it supports
/// (unknown tables and columns, duplicate names, NOT NULL and UNIQUE constraints) and
/// reports violations with SQLite-style messages, so migrations can be exercised without
/// a database.
///
/// # Characteristics
/// - **Thread-Safe**: the catalog sits behind a `parking_lot::RwLock`
/// - **Transactional**: [DatabaseStatements::transaction] snapshots the catalog and
///   restores it when the body fails
/// - **No SQL**: raw [DatabaseStatements::execute] is rejected
///
/// # Usage
/// ```text
/// let adapter = MemoryAdapter::new();
/// let migrator = Migrator::builder().adapter(Arc::new(adapter)).build()?;
/// ```
#[derive(Clone, Default)]
pub struct MemoryAdapter {
    inner: Arc<MemoryAdapterInner>,
}

impl MemoryAdapter {
    pub fn new() -> MemoryAdapter {
        MemoryAdapter::default()
    }

    /// Names of all tables, in creation order.
    pub fn table_names(&self) -> Vec<String> {
        self.inner.catalog.read().tables.keys().cloned().collect()
    }
}

#[derive(Default)]
struct MemoryAdapterInner {
    catalog: RwLock<MemoryCatalog>,
}

#[derive(Clone, Default)]
struct MemoryCatalog {
    tables: IndexMap<String, MemoryTable>,
}

#[derive(Clone)]
struct MemoryTable {
    name: String,
    columns: Vec<ColumnDefinition>,
    indexes: Vec<IndexDefinition>,
    rows: Vec<Row>,
    /// `None` once the auto-increment range is used up.
    next_id: Option<i64>,
}

impl MemoryCatalog {
    fn table(&self, name: &str) -> StrataResult<&MemoryTable> {
        self.tables
            .get(name)
            .ok_or_else(|| statement_invalid(&format!("no such table: {}", name)))
    }

    fn table_mut(&mut self, name: &str) -> StrataResult<&mut MemoryTable> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| statement_invalid(&format!("no such table: {}", name)))
    }

    fn index_exists(&self, index_name: &str) -> bool {
        self.tables
            .values()
            .any(|t| t.indexes.iter().any(|i| i.name == index_name))
    }
}

impl MemoryTable {
    fn new(name: &str, columns: Vec<ColumnDefinition>) -> Self {
        MemoryTable {
            name: name.to_string(),
            columns,
            indexes: Vec::new(),
            rows: Vec::new(),
            next_id: Some(1),
        }
    }

    fn position(&self, column: &str) -> StrataResult<usize> {
        self.columns
            .iter()
            .position(|c| c.name == column)
            .ok_or_else(|| statement_invalid(&format!("no such column: {}", column)))
    }

    fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c.name == column)
    }

    fn check_not_null(&self, rows: &[Row]) -> StrataResult<()> {
        for column in self.columns.iter().filter(|c| !c.options.null) {
            let violated = rows
                .iter()
                .any(|row| row.get(&column.name).map_or(true, Value::is_null));
            if violated {
                return Err(statement_invalid(&format!(
                    "NOT NULL constraint failed: {}.{}",
                    self.name, column.name
                )));
            }
        }
        Ok(())
    }

    fn check_unique(&self, rows: &[Row]) -> StrataResult<()> {
        let primary_keys = self
            .columns
            .iter()
            .filter(|c| c.column_type == ColumnType::PrimaryKey)
            .map(|c| vec![c.name.clone()]);
        let unique_indexes = self
            .indexes
            .iter()
            .filter(|i| i.unique)
            .map(|i| i.columns.clone());

        for columns in primary_keys.chain(unique_indexes) {
            let keys = rows
                .iter()
                .map(|row| {
                    columns
                        .iter()
                        .map(|c| row.get(c).cloned().unwrap_or_default())
                        .collect::<Vec<Value>>()
                })
                // NULLs never collide
                .filter(|key| key.iter().all(|v| !v.is_null()))
                .map(|key| key.iter().map(|v| format!("{}:{}", v.type_name(), v)).join("|"))
                .collect::<Vec<String>>();
            if !keys.iter().all_unique() {
                let qualified = columns
                    .iter()
                    .map(|c| format!("{}.{}", self.name, c))
                    .join(", ");
                return Err(statement_invalid(&format!(
                    "UNIQUE constraint failed: {}",
                    qualified
                )));
            }
        }
        Ok(())
    }

    /// Builds a complete row from the given values, filling defaults and the
    /// auto-increment key. Returns the row and the table's next id after it; the
    /// table itself is left untouched.
    fn complete_row(&self, values: &Row) -> StrataResult<(Row, Option<i64>)> {
        if let Some(unknown) = values.keys().find(|k| !self.has_column(k)) {
            return Err(statement_invalid(&format!(
                "table {} has no column named {}",
                self.name, unknown
            )));
        }

        let mut next_id = self.next_id;
        let mut row = Row::with_capacity(self.columns.len());
        for column in &self.columns {
            let value = match values.get(&column.name) {
                Some(value) => column.column_type.coerce(value.clone())?,
                None => column
                    .options
                    .effective_default()
                    .cloned()
                    .unwrap_or_default(),
            };

            let value = if column.column_type == ColumnType::PrimaryKey {
                match value {
                    Value::Integer(id) => {
                        next_id = match (next_id, id.checked_add(1)) {
                            (Some(current), Some(after)) => Some(current.max(after)),
                            _ => None,
                        };
                        Value::Integer(id)
                    }
                    _ => {
                        let id = next_id.ok_or_else(|| {
                            statement_invalid(&format!(
                                "no ids left for {}.{}",
                                self.name, column.name
                            ))
                        })?;
                        next_id = id.checked_add(1);
                        Value::Integer(id)
                    }
                }
            } else {
                value
            };
            row.insert(column.name.clone(), value);
        }
        Ok((row, next_id))
    }

    fn to_column(&self, definition: &ColumnDefinition) -> Column {
        let (sql_type, column_type, primary) = match definition.column_type {
            ColumnType::PrimaryKey => ("integer".to_string(), ColumnType::Integer, true),
            ColumnType::String => (
                format!("varchar({})", definition.options.limit.unwrap_or(255)),
                ColumnType::String,
                false,
            ),
            other => (other.name().to_string(), other, false),
        };
        Column::new(
            &definition.name,
            &sql_type,
            column_type,
            definition.options.null && !primary,
            definition.options.effective_default().cloned(),
            primary,
        )
    }
}

impl SchemaStatements for MemoryAdapter {
    fn create_table(&self, name: &str, definition: &TableDefinition) -> StrataResult<()> {
        let mut catalog = self.inner.catalog.write();
        if definition.options().force {
            catalog.tables.shift_remove(name);
        }
        if catalog.tables.contains_key(name) {
            return Err(statement_invalid(&format!("table {} already exists", name)));
        }
        if let Some(column) = definition.duplicate_column() {
            return Err(statement_invalid(&format!(
                "duplicate column name: {}",
                column
            )));
        }

        catalog
            .tables
            .insert(name.to_string(), MemoryTable::new(name, definition.columns()));
        Ok(())
    }

    fn drop_table(&self, name: &str) -> StrataResult<()> {
        let mut catalog = self.inner.catalog.write();
        catalog
            .tables
            .shift_remove(name)
            .map(|_| ())
            .ok_or_else(|| statement_invalid(&format!("no such table: {}", name)))
    }

    fn add_column(
        &self,
        table: &str,
        column: &str,
        column_type: ColumnType,
        options: &ColumnOptions,
    ) -> StrataResult<()> {
        let mut catalog = self.inner.catalog.write();
        let memory_table = catalog.table_mut(table)?;
        if memory_table.has_column(column) {
            return Err(statement_invalid(&format!("duplicate column name: {}", column)));
        }
        if column_type == ColumnType::PrimaryKey {
            return Err(statement_invalid("Cannot add a PRIMARY KEY column"));
        }

        let definition = ColumnDefinition::new(column, column_type, options.clone());
        let fill = options.effective_default().cloned().unwrap_or_default();
        let mut rows = memory_table.rows.clone();
        for row in rows.iter_mut() {
            row.insert(column.to_string(), fill.clone());
        }

        memory_table.columns.push(definition);
        if let Err(err) = memory_table.check_not_null(&rows) {
            memory_table.columns.pop();
            return Err(err);
        }
        memory_table.rows = rows;
        Ok(())
    }

    fn remove_column(&self, table: &str, column: &str) -> StrataResult<()> {
        let mut catalog = self.inner.catalog.write();
        let memory_table = catalog.table_mut(table)?;
        let position = memory_table.position(column)?;

        memory_table.columns.remove(position);
        for row in memory_table.rows.iter_mut() {
            row.shift_remove(column);
        }
        memory_table
            .indexes
            .retain(|index| !index.columns.iter().any(|c| c == column));
        Ok(())
    }

    fn rename_column(&self, table: &str, old_name: &str, new_name: &str) -> StrataResult<()> {
        let mut catalog = self.inner.catalog.write();
        let memory_table = catalog.table_mut(table)?;
        let position = memory_table.position(old_name)?;
        if memory_table.has_column(new_name) {
            return Err(statement_invalid(&format!(
                "duplicate column name: {}",
                new_name
            )));
        }

        memory_table.columns[position].name = new_name.to_string();
        for row in memory_table.rows.iter_mut() {
            let renamed = row
                .drain(..)
                .map(|(k, v)| if k == old_name { (new_name.to_string(), v) } else { (k, v) })
                .collect::<Row>();
            *row = renamed;
        }
        for index in memory_table.indexes.iter_mut() {
            for indexed in index.columns.iter_mut() {
                if indexed == old_name {
                    *indexed = new_name.to_string();
                }
            }
        }
        Ok(())
    }

    fn change_column(
        &self,
        table: &str,
        column: &str,
        column_type: ColumnType,
        options: &ColumnOptions,
    ) -> StrataResult<()> {
        let mut catalog = self.inner.catalog.write();
        let memory_table = catalog.table_mut(table)?;
        let position = memory_table.position(column)?;

        let mut rows = memory_table.rows.clone();
        for row in rows.iter_mut() {
            if let Some(value) = row.get_mut(column) {
                // values that do not convert are kept as stored
                if let Ok(converted) = column_type.coerce(value.clone()) {
                    *value = converted;
                }
            }
        }

        let previous = std::mem::replace(
            &mut memory_table.columns[position],
            ColumnDefinition::new(column, column_type, options.clone()),
        );
        if let Err(err) = memory_table.check_not_null(&rows) {
            memory_table.columns[position] = previous;
            return Err(err);
        }
        memory_table.rows = rows;
        Ok(())
    }

    fn change_column_default(
        &self,
        table: &str,
        column: &str,
        default: Option<Value>,
    ) -> StrataResult<()> {
        let mut catalog = self.inner.catalog.write();
        let memory_table = catalog.table_mut(table)?;
        let position = memory_table.position(column)?;
        memory_table.columns[position].options.default = default;
        Ok(())
    }

    fn add_index(
        &self,
        table: &str,
        columns: &[String],
        options: &IndexOptions,
    ) -> StrataResult<()> {
        let mut catalog = self.inner.catalog.write();
        let index_name = options
            .name
            .clone()
            .unwrap_or_else(|| self.index_name(table, columns));
        if catalog.index_exists(&index_name) {
            return Err(statement_invalid(&format!(
                "index {} already exists",
                index_name
            )));
        }

        let memory_table = catalog.table_mut(table)?;
        for column in columns {
            memory_table.position(column)?;
        }

        memory_table.indexes.push(IndexDefinition {
            table: table.to_string(),
            name: index_name,
            columns: columns.to_vec(),
            unique: options.unique,
        });
        if let Err(err) = memory_table.check_unique(&memory_table.rows) {
            memory_table.indexes.pop();
            return Err(err);
        }
        Ok(())
    }

    fn remove_index(&self, table: &str, target: &IndexTarget) -> StrataResult<()> {
        let mut catalog = self.inner.catalog.write();
        let memory_table = catalog.table_mut(table)?;
        let index_name = target.resolve(table);
        let position = memory_table
            .indexes
            .iter()
            .position(|i| i.name == index_name)
            .ok_or_else(|| statement_invalid(&format!("no such index: {}", index_name)))?;
        memory_table.indexes.remove(position);
        Ok(())
    }

    fn table_exists(&self, name: &str) -> StrataResult<bool> {
        Ok(self.inner.catalog.read().tables.contains_key(name))
    }

    fn columns(&self, table: &str) -> StrataResult<Vec<Column>> {
        let catalog = self.inner.catalog.read();
        let memory_table = catalog.table(table)?;
        Ok(memory_table
            .columns
            .iter()
            .map(|c| memory_table.to_column(c))
            .collect())
    }

    fn indexes(&self, table: &str) -> StrataResult<Vec<IndexDefinition>> {
        let catalog = self.inner.catalog.read();
        Ok(catalog.table(table)?.indexes.clone())
    }
}

impl DatabaseStatements for MemoryAdapter {
    fn execute(&self, sql: &str) -> StrataResult<()> {
        Err(statement_invalid(&format!(
            "raw SQL is not supported by the in-memory adapter: {}",
            sql
        )))
    }

    fn insert(&self, table: &str, row: &Row) -> StrataResult<()> {
        let mut catalog = self.inner.catalog.write();
        let memory_table = catalog.table_mut(table)?;
        let (complete, next_id) = memory_table.complete_row(row)?;

        let mut rows = memory_table.rows.clone();
        rows.push(complete);
        memory_table.check_not_null(&rows)?;
        memory_table.check_unique(&rows)?;
        memory_table.rows = rows;
        memory_table.next_id = next_id;
        Ok(())
    }

    fn select_all(&self, table: &str) -> StrataResult<Vec<Row>> {
        let catalog = self.inner.catalog.read();
        Ok(catalog.table(table)?.rows.clone())
    }

    fn update_all(&self, table: &str, values: &Row) -> StrataResult<usize> {
        let mut catalog = self.inner.catalog.write();
        let memory_table = catalog.table_mut(table)?;

        let mut converted = Row::with_capacity(values.len());
        for (column, value) in values {
            let position = memory_table.position(column)?;
            let column_type = memory_table.columns[position].column_type;
            converted.insert(column.clone(), column_type.coerce(value.clone())?);
        }

        let mut rows = memory_table.rows.clone();
        for row in rows.iter_mut() {
            for (column, value) in &converted {
                row.insert(column.clone(), value.clone());
            }
        }
        memory_table.check_not_null(&rows)?;
        memory_table.check_unique(&rows)?;

        let count = rows.len();
        memory_table.rows = rows;
        Ok(count)
    }

    fn delete_all(&self, table: &str) -> StrataResult<usize> {
        let mut catalog = self.inner.catalog.write();
        let memory_table = catalog.table_mut(table)?;
        let count = memory_table.rows.len();
        memory_table.rows.clear();
        Ok(count)
    }

    fn transaction(&self, body: &mut dyn FnMut() -> StrataResult<()>) -> StrataResult<()> {
        let snapshot = self.inner.catalog.read().clone();
        match body() {
            Ok(()) => Ok(()),
            Err(err) => {
                log::debug!("Rolling back in-memory catalog after failure: {}", err);
                *self.inner.catalog.write() = snapshot;
                Err(err)
            }
        }
    }
}
