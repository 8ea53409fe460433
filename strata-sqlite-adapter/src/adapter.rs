use crate::builder::SqliteAdapterBuilder;
use crate::config::SqliteConfig;
use crate::wrapper::{
    from_value_ref, parse_default, quote_identifier, sql_literal, to_sql_value, to_strata_error,
};
use itertools::Itertools;
use parking_lot::Mutex;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use strata::adapter::{DatabaseStatements, SchemaStatements};
use strata::common::Value;
use strata::errors::{ErrorKind, StrataError, StrataResult};
use strata::schema::{
    Column, ColumnDefinition, ColumnOptions, ColumnType, IndexDefinition, IndexOptions,
    IndexTarget, Row, TableDefinition,
};

const ALTER_SAVEPOINT: &str = "strata_alter";

/// First SQLite release (3.35.0) with `ALTER TABLE .. DROP COLUMN`.
const NATIVE_DROP_COLUMN_VERSION: i32 = 3_035_000;

/// SQLite implementation of the strata adapter traits.
///
/// # Purpose
/// Renders the structured DDL of a migration as SQLite statements and runs raw SQL
/// bodies verbatim. Column changes SQLite cannot express natively (removing a column,
/// changing a type or default, adding a NOT NULL column without a default) are applied
/// by rebuilding the table: a copy named `altered_<table>` is created with the new
/// shape, the surviving data is copied over, the original is dropped and the copy is
/// renamed back. Indexes whose columns survive are recreated afterwards.
///
/// # Characteristics
/// - **Thread-Safe**: the connection sits behind a `parking_lot::Mutex` that is held
///   for one statement (or one table rebuild), never across a migration body
/// - **Transactional**: [DatabaseStatements::transaction] runs the body inside a
///   `SAVEPOINT`, so a failed step leaves no partial DDL behind
/// - **Typed reads**: [DatabaseStatements::select_all] coerces values to the declared
///   column types, so booleans come back as booleans
///
/// # Usage
/// ```text
/// let adapter = SqliteAdapter::with_config()
///     .db_path("/path/to/app.db")
///     .busy_timeout(2_000)
///     .build()?;
/// let migrator = Migrator::builder().adapter(Arc::new(adapter)).build()?;
/// ```
#[derive(Clone)]
pub struct SqliteAdapter {
    inner: Arc<SqliteAdapterInner>,
}

struct SqliteAdapterInner {
    connection: Mutex<Connection>,
    config: SqliteConfig,
    savepoint_depth: AtomicUsize,
}

impl SqliteAdapter {
    /// Creates a new builder for configuring a SQLite adapter.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let adapter = SqliteAdapter::with_config()
    ///     .db_path("/path/to/app.db")
    ///     .build()?;
    /// ```
    #[inline]
    pub fn with_config() -> SqliteAdapterBuilder {
        SqliteAdapterBuilder::new()
    }

    /// Opens a private in-memory database with the default settings.
    pub fn open_in_memory() -> StrataResult<SqliteAdapter> {
        SqliteAdapterBuilder::new().build()
    }

    pub(crate) fn open(config: SqliteConfig) -> StrataResult<SqliteAdapter> {
        let connection = match config.db_path() {
            Some(path) => Connection::open(&path),
            None => Connection::open_in_memory(),
        }
        .map_err(|e| {
            log::error!("Failed to open SQLite database: {}", e);
            to_strata_error(e)
        })?;

        connection
            .busy_timeout(config.busy_timeout())
            .map_err(to_strata_error)?;
        connection
            .pragma_update(None, "foreign_keys", config.foreign_keys())
            .map_err(to_strata_error)?;

        log::debug!(
            "Opened SQLite database {}",
            config.db_path().as_deref().unwrap_or(":memory:")
        );
        Ok(SqliteAdapter {
            inner: Arc::new(SqliteAdapterInner {
                connection: Mutex::new(connection),
                config,
                savepoint_depth: AtomicUsize::new(0),
            }),
        })
    }

    pub fn config(&self) -> &SqliteConfig {
        &self.inner.config
    }

    /// Names of all user tables, sorted.
    pub fn table_names(&self) -> StrataResult<Vec<String>> {
        let connection = self.inner.connection.lock();
        let mut stmt = connection
            .prepare(
                "SELECT name FROM sqlite_master WHERE type = 'table' \
                 AND name NOT LIKE 'sqlite_%' ORDER BY name",
            )
            .map_err(to_strata_error)?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(to_strata_error)?
            .collect::<Result<Vec<String>, _>>()
            .map_err(to_strata_error)?;
        Ok(names)
    }

    fn run(&self, sql: &str) -> StrataResult<()> {
        log::debug!("{}", sql);
        let connection = self.inner.connection.lock();
        connection.execute_batch(sql).map_err(to_strata_error)
    }

    fn run_with(&self, sql: &str, params: &[SqlValue]) -> StrataResult<usize> {
        log::debug!("{}", sql);
        let connection = self.inner.connection.lock();
        connection
            .execute(sql, params_from_iter(params.iter()))
            .map_err(to_strata_error)
    }

    fn table_info(&self, table: &str) -> StrataResult<Vec<TableInfo>> {
        let sql = format!("PRAGMA table_info({})", quote_identifier(table));
        let connection = self.inner.connection.lock();
        let mut stmt = connection.prepare(&sql).map_err(to_strata_error)?;
        let info = stmt
            .query_map([], |row| {
                Ok(TableInfo {
                    name: row.get(1)?,
                    sql_type: row.get(2)?,
                    not_null: row.get::<_, i64>(3)? != 0,
                    default: row.get(4)?,
                    key_position: row.get(5)?,
                })
            })
            .map_err(to_strata_error)?
            .collect::<Result<Vec<TableInfo>, _>>()
            .map_err(to_strata_error)?;

        // PRAGMA table_info is silent about unknown tables
        if info.is_empty() {
            return Err(no_such_table(table));
        }
        Ok(info)
    }

    /// Whether the stored `CREATE TABLE` of `table` declares `AUTOINCREMENT`.
    fn uses_autoincrement(&self, table: &str) -> StrataResult<bool> {
        let connection = self.inner.connection.lock();
        let sql = connection
            .query_row(
                "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1 \
                 UNION ALL \
                 SELECT sql FROM sqlite_temp_master WHERE type = 'table' AND name = ?1",
                [table],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()
            .map_err(to_strata_error)?
            .flatten();
        Ok(sql.is_some_and(|sql| sql.to_ascii_uppercase().contains("AUTOINCREMENT")))
    }

    /// Indexes of `table` with the given `PRAGMA index_list` origin: `c` for
    /// `CREATE INDEX`, `u` for UNIQUE constraints, `pk` for the primary key.
    fn index_entries(&self, table: &str, origin: &str) -> StrataResult<Vec<IndexDefinition>> {
        let connection = self.inner.connection.lock();
        let mut list = connection
            .prepare(&format!("PRAGMA index_list({})", quote_identifier(table)))
            .map_err(to_strata_error)?;
        let entries = list
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)? != 0,
                    row.get::<_, String>(3)?,
                ))
            })
            .map_err(to_strata_error)?
            .collect::<Result<Vec<(String, bool, String)>, _>>()
            .map_err(to_strata_error)?;

        let mut indexes = Vec::new();
        for (name, unique, _) in entries.into_iter().filter(|(_, _, o)| o == origin) {
            let mut info = connection
                .prepare(&format!("PRAGMA index_info({})", quote_identifier(&name)))
                .map_err(to_strata_error)?;
            let columns = info
                .query_map([], |row| row.get::<_, Option<String>>(2))
                .map_err(to_strata_error)?
                .collect::<Result<Vec<Option<String>>, _>>()
                .map_err(to_strata_error)?
                .into_iter()
                .flatten()
                .collect();
            indexes.push(IndexDefinition {
                table: table.to_string(),
                name,
                columns,
                unique,
            });
        }
        indexes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(indexes)
    }

    fn foreign_keys(&self, table: &str) -> StrataResult<Vec<ForeignKey>> {
        let sql = format!("PRAGMA foreign_key_list({})", quote_identifier(table));
        let connection = self.inner.connection.lock();
        let mut stmt = connection.prepare(&sql).map_err(to_strata_error)?;
        let references = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                ))
            })
            .map_err(to_strata_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(to_strata_error)?;

        let mut foreign_keys: Vec<ForeignKey> = Vec::new();
        for (id, _, parent, from, to, on_update, on_delete) in references
            .into_iter()
            .sorted_by_key(|(id, seq, ..)| (*id, *seq))
        {
            match foreign_keys.last_mut() {
                Some(foreign_key) if foreign_key.id == id => {
                    foreign_key.columns.push(from);
                    foreign_key.parent_columns.push(to);
                }
                _ => foreign_keys.push(ForeignKey {
                    id,
                    columns: vec![from],
                    parent,
                    parent_columns: vec![to],
                    on_update,
                    on_delete,
                }),
            }
        }
        Ok(foreign_keys)
    }

    /// Runs `statements` under the alter savepoint, rolling all of them back if one
    /// fails.
    fn run_in_savepoint(&self, table: &str, statements: &[String]) -> StrataResult<()> {
        let connection = self.inner.connection.lock();
        connection
            .execute_batch(&format!("SAVEPOINT {}", ALTER_SAVEPOINT))
            .map_err(to_strata_error)?;
        for sql in statements {
            log::debug!("{}", sql);
            if let Err(e) = connection.execute_batch(sql) {
                let rollback = format!("ROLLBACK TO {0}; RELEASE {0}", ALTER_SAVEPOINT);
                if let Err(rollback_error) = connection.execute_batch(&rollback) {
                    log::error!("Failed to roll back changes to {}: {}", table, rollback_error);
                }
                return Err(to_strata_error(e));
            }
        }
        connection
            .execute_batch(&format!("RELEASE {}", ALTER_SAVEPOINT))
            .map_err(to_strata_error)
    }

    /// Rebuilds `table` with the columns returned by `alter`.
    ///
    /// `alter` receives the current column definitions and returns the new ones, each
    /// paired with the existing column its data is copied from (`None` for a new
    /// column). The primary key, UNIQUE constraints, foreign keys and indexes are
    /// carried over when all of their columns survive. CHECK constraints are not.
    /// Runs under its own savepoint; on failure the table is left untouched.
    fn alter_table<F>(&self, table: &str, alter: F) -> StrataResult<()>
    where
        F: FnOnce(Vec<ColumnDefinition>) -> StrataResult<Vec<(ColumnDefinition, Option<String>)>>,
    {
        let info = self.table_info(table)?;
        let keys = info
            .iter()
            .filter(|c| c.primary())
            .sorted_by_key(|c| c.key_position)
            .collect::<Vec<&TableInfo>>();
        let primary_key = keys.iter().map(|c| c.name.clone()).collect::<Vec<String>>();
        // only a lone INTEGER key is an alias for the rowid
        let rowid_key = match keys.as_slice() {
            [key] if key.sql_type.trim().eq_ignore_ascii_case("integer") => Some(key.name.clone()),
            _ => None,
        };
        let current = info
            .iter()
            .map(|c| c.definition(rowid_key.as_deref() == Some(c.name.as_str())))
            .collect::<Vec<ColumnDefinition>>();
        let autoincrement = self.uses_autoincrement(table)?;
        let indexes = self.index_entries(table, "c")?;
        let unique_constraints = self.index_entries(table, "u")?;
        let foreign_keys = self.foreign_keys(table)?;

        let altered = alter(current)?;
        let survives = |columns: &[String]| {
            columns
                .iter()
                .all(|c| altered.iter().any(|(column, _)| &column.name == c))
        };

        let mut definitions = altered
            .iter()
            .map(|(column, _)| rebuilt_column_sql(column, autoincrement))
            .collect::<StrataResult<Vec<String>>>()?;
        let rowid_kept = altered
            .iter()
            .any(|(column, _)| column.column_type == ColumnType::PrimaryKey);
        if !rowid_kept && !primary_key.is_empty() {
            if survives(&primary_key) {
                definitions.push(format!("PRIMARY KEY ({})", quoted_list(&primary_key)));
            } else {
                log::debug!("Dropping the primary key of {} with its columns", table);
            }
        }
        for constraint in &unique_constraints {
            if survives(&constraint.columns) {
                definitions.push(format!("UNIQUE ({})", quoted_list(&constraint.columns)));
            }
        }
        for foreign_key in &foreign_keys {
            if survives(&foreign_key.columns) {
                definitions.push(foreign_key.sql());
            }
        }

        let altered_table = format!("altered_{}", table);
        let mut statements = vec![format!(
            "CREATE TABLE {} ({})",
            quote_identifier(&altered_table),
            definitions.join(", ")
        )];

        let copied = altered
            .iter()
            .filter_map(|(column, source)| source.as_ref().map(|s| (&column.name, s)))
            .collect::<Vec<_>>();
        if !copied.is_empty() {
            statements.push(format!(
                "INSERT INTO {} ({}) SELECT {} FROM {}",
                quote_identifier(&altered_table),
                copied.iter().map(|(target, _)| quote_identifier(target)).join(", "),
                copied.iter().map(|(_, source)| quote_identifier(source)).join(", "),
                quote_identifier(table)
            ));
        }
        statements.push(format!("DROP TABLE {}", quote_identifier(table)));
        statements.push(format!(
            "ALTER TABLE {} RENAME TO {}",
            quote_identifier(&altered_table),
            quote_identifier(table)
        ));

        for index in indexes {
            if survives(&index.columns) {
                statements.push(create_index_sql(table, &index.name, &index.columns, index.unique));
            } else {
                log::debug!("Dropping index {} with the columns it covered", index.name);
            }
        }

        self.run_in_savepoint(table, &statements)
    }
}

impl SchemaStatements for SqliteAdapter {
    fn create_table(&self, name: &str, definition: &TableDefinition) -> StrataResult<()> {
        let options = definition.options();
        if options.force {
            self.run(&format!("DROP TABLE IF EXISTS {}", quote_identifier(name)))?;
        }

        let columns = definition
            .columns()
            .iter()
            .map(column_sql)
            .collect::<StrataResult<Vec<String>>>()?;
        let sql = format!(
            "CREATE {}TABLE {} ({}){}",
            if options.temporary { "TEMPORARY " } else { "" },
            quote_identifier(name),
            columns.join(", "),
            options
                .options
                .as_ref()
                .map(|extra| format!(" {}", extra))
                .unwrap_or_default()
        );
        self.run(&sql)
    }

    fn drop_table(&self, name: &str) -> StrataResult<()> {
        self.run(&format!("DROP TABLE {}", quote_identifier(name)))
    }

    fn add_column(
        &self,
        table: &str,
        column: &str,
        column_type: ColumnType,
        options: &ColumnOptions,
    ) -> StrataResult<()> {
        let definition = ColumnDefinition::new(column, column_type, options.clone());
        if options.null || options.effective_default().is_some() {
            return self.run(&format!(
                "ALTER TABLE {} ADD COLUMN {}",
                quote_identifier(table),
                column_sql(&definition)?
            ));
        }

        // SQLite refuses NOT NULL columns without a default in ADD COLUMN
        self.alter_table(table, |columns| {
            if columns.iter().any(|c| c.name == column) {
                return Err(statement_invalid(&format!("duplicate column name: {}", column)));
            }
            let mut altered = keep_all(columns);
            altered.push((definition, None));
            Ok(altered)
        })
    }

    fn remove_column(&self, table: &str, column: &str) -> StrataResult<()> {
        let info = self.table_info(table)?;
        let target = info
            .iter()
            .find(|c| c.name == column)
            .ok_or_else(|| no_such_column(column))?;
        let covers = |columns: &[String]| columns.iter().any(|c| c == column);
        let constrained = target.primary()
            || self
                .index_entries(table, "u")?
                .iter()
                .any(|constraint| covers(&constraint.columns))
            || self
                .foreign_keys(table)?
                .iter()
                .any(|foreign_key| covers(&foreign_key.columns));

        if !constrained && rusqlite::version_number() >= NATIVE_DROP_COLUMN_VERSION {
            // DROP COLUMN refuses indexed columns, so their indexes go first
            let mut statements = self
                .index_entries(table, "c")?
                .iter()
                .filter(|index| covers(&index.columns))
                .map(|index| format!("DROP INDEX {}", quote_identifier(&index.name)))
                .collect::<Vec<String>>();
            statements.push(format!(
                "ALTER TABLE {} DROP COLUMN {}",
                quote_identifier(table),
                quote_identifier(column)
            ));
            return self.run_in_savepoint(table, &statements);
        }

        self.alter_table(table, |columns| {
            let position = position_of(&columns, column)?;
            let mut altered = keep_all(columns);
            altered.remove(position);
            Ok(altered)
        })
    }

    fn rename_column(&self, table: &str, old_name: &str, new_name: &str) -> StrataResult<()> {
        self.run(&format!(
            "ALTER TABLE {} RENAME COLUMN {} TO {}",
            quote_identifier(table),
            quote_identifier(old_name),
            quote_identifier(new_name)
        ))
    }

    fn change_column(
        &self,
        table: &str,
        column: &str,
        column_type: ColumnType,
        options: &ColumnOptions,
    ) -> StrataResult<()> {
        self.alter_table(table, |columns| {
            let position = position_of(&columns, column)?;
            let mut altered = keep_all(columns);
            altered[position].0.column_type = column_type;
            altered[position].0.options = options.clone();
            Ok(altered)
        })
    }

    fn change_column_default(
        &self,
        table: &str,
        column: &str,
        default: Option<Value>,
    ) -> StrataResult<()> {
        self.alter_table(table, |columns| {
            let position = position_of(&columns, column)?;
            let mut altered = keep_all(columns);
            altered[position].0.options.default = default;
            Ok(altered)
        })
    }

    fn add_index(
        &self,
        table: &str,
        columns: &[String],
        options: &IndexOptions,
    ) -> StrataResult<()> {
        let name = options
            .name
            .clone()
            .unwrap_or_else(|| self.index_name(table, columns));
        self.run(&create_index_sql(table, &name, columns, options.unique))
    }

    fn remove_index(&self, table: &str, target: &IndexTarget) -> StrataResult<()> {
        let name = target.resolve(table);
        self.run(&format!("DROP INDEX {}", quote_identifier(&name)))
    }

    fn table_exists(&self, name: &str) -> StrataResult<bool> {
        let connection = self.inner.connection.lock();
        let found = connection
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1 \
                 UNION ALL \
                 SELECT name FROM sqlite_temp_master WHERE type = 'table' AND name = ?1",
                [name],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(to_strata_error)?;
        Ok(found.is_some())
    }

    fn columns(&self, table: &str) -> StrataResult<Vec<Column>> {
        Ok(self
            .table_info(table)?
            .iter()
            .map(TableInfo::column)
            .collect())
    }

    fn indexes(&self, table: &str) -> StrataResult<Vec<IndexDefinition>> {
        // fails for unknown tables, which index_list would not
        self.table_info(table)?;
        self.index_entries(table, "c")
    }
}

impl DatabaseStatements for SqliteAdapter {
    fn execute(&self, sql: &str) -> StrataResult<()> {
        self.run(sql)
    }

    fn insert(&self, table: &str, row: &Row) -> StrataResult<()> {
        if row.is_empty() {
            return self.run(&format!("INSERT INTO {} DEFAULT VALUES", quote_identifier(table)));
        }
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_identifier(table),
            row.keys().map(|c| quote_identifier(c)).join(", "),
            (1..=row.len()).map(|i| format!("?{}", i)).join(", ")
        );
        let params = row.values().map(to_sql_value).collect::<Vec<SqlValue>>();
        self.run_with(&sql, &params).map(|_| ())
    }

    fn select_all(&self, table: &str) -> StrataResult<Vec<Row>> {
        let types = self
            .table_info(table)?
            .into_iter()
            .map(|info| (info.name.clone(), ColumnType::from_sql_type(&info.sql_type)))
            .collect::<HashMap<String, ColumnType>>();

        let sql = format!("SELECT * FROM {}", quote_identifier(table));
        log::debug!("{}", sql);
        let connection = self.inner.connection.lock();
        let mut stmt = connection.prepare(&sql).map_err(to_strata_error)?;
        let names = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect::<Vec<String>>();

        let mut records = Vec::new();
        let mut rows = stmt.query([]).map_err(to_strata_error)?;
        while let Some(row) = rows.next().map_err(to_strata_error)? {
            let mut record = Row::with_capacity(names.len());
            for (i, name) in names.iter().enumerate() {
                let raw = from_value_ref(row.get_ref(i).map_err(to_strata_error)?)?;
                let value = match types.get(name) {
                    Some(column_type) => column_type.coerce(raw)?,
                    None => raw,
                };
                record.insert(name.clone(), value);
            }
            records.push(record);
        }
        Ok(records)
    }

    fn update_all(&self, table: &str, values: &Row) -> StrataResult<usize> {
        if values.is_empty() {
            return Ok(0);
        }
        let sql = format!(
            "UPDATE {} SET {}",
            quote_identifier(table),
            values
                .keys()
                .enumerate()
                .map(|(i, c)| format!("{} = ?{}", quote_identifier(c), i + 1))
                .join(", ")
        );
        let params = values.values().map(to_sql_value).collect::<Vec<SqlValue>>();
        self.run_with(&sql, &params)
    }

    fn delete_all(&self, table: &str) -> StrataResult<usize> {
        self.run_with(&format!("DELETE FROM {}", quote_identifier(table)), &[])
    }

    fn transaction(&self, body: &mut dyn FnMut() -> StrataResult<()>) -> StrataResult<()> {
        let depth = self.inner.savepoint_depth.fetch_add(1, Ordering::SeqCst);
        let savepoint = format!("strata_migration_{}", depth);

        let outcome = match self.run(&format!("SAVEPOINT {}", savepoint)) {
            Ok(()) => match body() {
                Ok(()) => self.run(&format!("RELEASE {}", savepoint)),
                Err(error) => {
                    let rollback = format!("ROLLBACK TO {0}; RELEASE {0}", savepoint);
                    if let Err(rollback_error) = self.run(&rollback) {
                        log::error!("Failed to roll back {}: {}", savepoint, rollback_error);
                    }
                    Err(error)
                }
            },
            Err(error) => Err(error),
        };

        self.inner.savepoint_depth.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}

/// One row of `PRAGMA table_info`.
struct TableInfo {
    name: String,
    sql_type: String,
    not_null: bool,
    default: Option<String>,
    /// 1-based position in the primary key, 0 outside it.
    key_position: i64,
}

impl TableInfo {
    fn primary(&self) -> bool {
        self.key_position > 0
    }

    fn column_type(&self) -> ColumnType {
        ColumnType::from_sql_type(&self.sql_type)
    }

    fn typed_default(&self) -> Option<Value> {
        let raw = parse_default(self.default.as_deref()?)?;
        match self.column_type().typecast(&raw) {
            Ok(value) => Some(value),
            // expressions such as CURRENT_TIMESTAMP stay textual
            Err(_) => Some(Value::String(raw)),
        }
    }

    fn column(&self) -> Column {
        Column::new(
            &self.name,
            &self.sql_type,
            self.column_type(),
            !self.not_null,
            self.typed_default(),
            self.primary(),
        )
    }

    fn definition(&self, rowid_key: bool) -> ColumnDefinition {
        let column_type = if rowid_key {
            ColumnType::PrimaryKey
        } else {
            self.column_type()
        };
        ColumnDefinition::new(
            &self.name,
            column_type,
            ColumnOptions {
                null: !self.not_null,
                default: self.typed_default(),
                limit: declared_limit(&self.sql_type),
            },
        )
    }
}

/// One `FOREIGN KEY` clause, gathered from `PRAGMA foreign_key_list`.
struct ForeignKey {
    id: i64,
    columns: Vec<String>,
    parent: String,
    /// `None` entries reference the parent's primary key implicitly.
    parent_columns: Vec<Option<String>>,
    on_update: String,
    on_delete: String,
}

impl ForeignKey {
    fn sql(&self) -> String {
        let mut sql = format!(
            "FOREIGN KEY ({}) REFERENCES {}",
            quoted_list(&self.columns),
            quote_identifier(&self.parent)
        );
        let parent_columns = self.parent_columns.iter().flatten().cloned().collect::<Vec<_>>();
        if parent_columns.len() == self.columns.len() {
            sql.push_str(&format!(" ({})", quoted_list(&parent_columns)));
        }
        for (event, action) in [("UPDATE", &self.on_update), ("DELETE", &self.on_delete)] {
            if !action.eq_ignore_ascii_case("NO ACTION") {
                sql.push_str(&format!(" ON {} {}", event, action));
            }
        }
        sql
    }
}

/// Native SQLite type for an abstract column type.
pub fn native_type(column_type: ColumnType, limit: Option<u32>) -> String {
    match column_type {
        ColumnType::PrimaryKey => "INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL".to_string(),
        ColumnType::String => format!("varchar({})", limit.unwrap_or(255)),
        ColumnType::Text => "text".to_string(),
        ColumnType::Integer => "integer".to_string(),
        ColumnType::Float => "float".to_string(),
        ColumnType::DateTime => "datetime".to_string(),
        ColumnType::Timestamp => "timestamp".to_string(),
        ColumnType::Time => "time".to_string(),
        ColumnType::Date => "date".to_string(),
        ColumnType::Binary => "blob".to_string(),
        ColumnType::Boolean => "boolean".to_string(),
    }
}

fn column_sql(column: &ColumnDefinition) -> StrataResult<String> {
    let mut sql = format!(
        "{} {}",
        quote_identifier(&column.name),
        native_type(column.column_type, column.options.limit)
    );
    if column.column_type == ColumnType::PrimaryKey {
        return Ok(sql);
    }
    if !column.options.null {
        sql.push_str(" NOT NULL");
    }
    if let Some(default) = column.options.effective_default() {
        sql.push_str(" DEFAULT ");
        sql.push_str(&sql_literal(default)?);
    }
    Ok(sql)
}

/// Column clause for a rebuilt table. A rowid key only gets `AUTOINCREMENT` back if
/// the original table had it.
fn rebuilt_column_sql(column: &ColumnDefinition, autoincrement: bool) -> StrataResult<String> {
    if column.column_type != ColumnType::PrimaryKey || autoincrement {
        return column_sql(column);
    }
    Ok(format!(
        "{} INTEGER PRIMARY KEY{}",
        quote_identifier(&column.name),
        if column.options.null { "" } else { " NOT NULL" }
    ))
}

fn quoted_list(columns: &[String]) -> String {
    columns.iter().map(|c| quote_identifier(c)).join(", ")
}

fn create_index_sql(table: &str, name: &str, columns: &[String], unique: bool) -> String {
    format!(
        "CREATE {}INDEX {} ON {} ({})",
        if unique { "UNIQUE " } else { "" },
        quote_identifier(name),
        quote_identifier(table),
        columns.iter().map(|c| quote_identifier(c)).join(", ")
    )
}

fn declared_limit(sql_type: &str) -> Option<u32> {
    let open = sql_type.find('(')?;
    let close = open + sql_type[open..].find(')')?;
    sql_type[open + 1..close].split(',').next()?.trim().parse().ok()
}

fn keep_all(columns: Vec<ColumnDefinition>) -> Vec<(ColumnDefinition, Option<String>)> {
    columns
        .into_iter()
        .map(|c| {
            let source = Some(c.name.clone());
            (c, source)
        })
        .collect()
}

fn position_of(columns: &[ColumnDefinition], column: &str) -> StrataResult<usize> {
    columns
        .iter()
        .position(|c| c.name == column)
        .ok_or_else(|| no_such_column(column))
}

fn no_such_column(column: &str) -> StrataError {
    statement_invalid(&format!("no such column: {}", column))
}

fn no_such_table(table: &str) -> StrataError {
    statement_invalid(&format!("no such table: {}", table))
}

fn statement_invalid(message: &str) -> StrataError {
    StrataError::new(message, ErrorKind::StatementInvalid)
}
