use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use std::{env, fs};
use strata::adapter::{DatabaseStatements, SchemaStatements};
use strata::common::Value;
use strata::errors::{ErrorKind, StrataError, StrataResult};
use strata::migration::{MigrationSet, Schema};
use strata::migrator::Migrator;
use strata::naming::{NamingConfig, TableEntity};
use strata::schema::{ColumnOptions, ColumnType, Row, TableDefinition, TableOptions};
use strata_sqlite_adapter::SqliteAdapter;

/// Runs a test against a fresh context, always running `after` to clean up.
///
/// A failing or panicking test still gets its database removed before the failure is
/// reported.
pub fn run_test<B, T, A>(before: B, test: T, after: A)
where
    B: FnOnce() -> StrataResult<TestContext>,
    T: FnOnce(TestContext) -> StrataResult<()>,
    A: FnOnce(TestContext) -> StrataResult<()>,
{
    let ctx = match before() {
        Ok(ctx) => ctx,
        Err(e) => panic!("Before run failed: {:?}", e),
    };

    let result = panic::catch_unwind(AssertUnwindSafe(|| test(ctx.clone())));
    let after_result = after(ctx);

    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => panic!("Test failed: {:?}", e),
        Err(panic_err) => panic::resume_unwind(panic_err),
    }
    if let Err(e) = after_result {
        panic!("After run failed: {:?}", e);
    }
}

/// A SQLite database file seeded with a `people` table, and a migrator over it.
#[derive(Clone)]
pub struct TestContext {
    path: String,
    adapter: SqliteAdapter,
    migrator: Migrator,
}

impl TestContext {
    pub fn new(path: String, adapter: SqliteAdapter, migrator: Migrator) -> Self {
        Self {
            path,
            adapter,
            migrator,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn adapter(&self) -> &SqliteAdapter {
        &self.adapter
    }

    pub fn migrator(&self) -> &Migrator {
        &self.migrator
    }

    pub fn naming(&self) -> NamingConfig {
        self.migrator.config().naming()
    }

    /// Runs `body` against a [Schema] using the migrator's naming.
    pub fn with_schema<F>(&self, body: F) -> StrataResult<()>
    where
        F: FnOnce(&Schema) -> StrataResult<()>,
    {
        let naming = self.naming();
        let schema = Schema::new(&self.adapter, &naming);
        body(&schema)
    }

    /// Column names of a physical table, in declaration order.
    pub fn column_names(&self, table: &str) -> StrataResult<Vec<String>> {
        Ok(self
            .adapter
            .columns(table)?
            .iter()
            .map(|c| c.name().to_string())
            .collect())
    }

    pub fn has_column(&self, table: &str, column: &str) -> StrataResult<bool> {
        Ok(self.column_names(table)?.iter().any(|c| c == column))
    }
}

pub fn random_path() -> String {
    let id = uuid::Uuid::new_v4();
    let temp_dir = env::temp_dir();
    temp_dir
        .join(format!("strata-{}.db", id))
        .to_string_lossy()
        .to_string()
}

pub fn create_test_context() -> StrataResult<TestContext> {
    create_prefixed_test_context("", "")
}

/// Creates a context whose migrator decorates table names with `prefix` and `suffix`.
///
/// The seeded `people` table is created undecorated, as an existing table would be.
pub fn create_prefixed_test_context(prefix: &str, suffix: &str) -> StrataResult<TestContext> {
    let path = random_path();
    let adapter = SqliteAdapter::with_config().db_path(&path).build()?;

    let mut people = TableDefinition::new(TableOptions::default());
    people.string("first_name");
    adapter.create_table("people", &people)?;

    let migrator = Migrator::builder()
        .adapter(Arc::new(adapter.clone()))
        .table_name_prefix(prefix)
        .table_name_suffix(suffix)
        .build()?;
    Ok(TestContext::new(path, adapter, migrator))
}

pub fn cleanup(ctx: TestContext) -> StrataResult<()> {
    let path = ctx.path().to_string();
    drop(ctx);

    for file in [path.clone(), format!("{}-journal", path)] {
        if Path::new(&file).exists() {
            fs::remove_file(&file).map_err(|e| {
                StrataError::new(
                    &format!("Failed to remove {}: {}", file, e),
                    ErrorKind::IOError,
                )
            })?;
        }
    }
    Ok(())
}

pub fn row(pairs: &[(&str, Value)]) -> Row {
    pairs
        .iter()
        .map(|(column, value)| (column.to_string(), value.clone()))
        .collect()
}

/// The reminders table as a typed entity.
pub struct Reminder {
    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

impl Reminder {
    pub fn new() -> Self {
        Reminder {
            prefix: None,
            suffix: None,
        }
    }

    pub fn with_affixes(prefix: &str, suffix: &str) -> Self {
        Reminder {
            prefix: Some(prefix.to_string()),
            suffix: Some(suffix.to_string()),
        }
    }
}

impl Default for Reminder {
    fn default() -> Self {
        Self::new()
    }
}

impl TableEntity for Reminder {
    fn table_name(&self) -> String {
        "reminders".to_string()
    }

    fn table_name_prefix(&self) -> Option<String> {
        self.prefix.clone()
    }

    fn table_name_suffix(&self) -> Option<String> {
        self.suffix.clone()
    }
}

/// Adds `people.last_name`.
pub fn people_have_last_names(schema: &Schema) -> StrataResult<()> {
    schema.add_column("people", "last_name", ColumnType::String, ColumnOptions::default())
}

pub fn remove_last_names(schema: &Schema) -> StrataResult<()> {
    schema.remove_column("people", "last_name")
}

/// Creates the `reminders` table.
pub fn we_need_reminders(schema: &Schema) -> StrataResult<()> {
    schema.create_table("reminders", |t| {
        t.text("content");
        t.datetime("remind_at");
    })
}

pub fn drop_reminders(schema: &Schema) -> StrataResult<()> {
    schema.drop_table("reminders")
}

/// The two reference migrations, registered in code.
pub fn people_migrations() -> MigrationSet {
    MigrationSet::new()
        .add(
            "1_people_have_last_names",
            people_have_last_names,
            remove_last_names,
        )
        .add("2_we_need_reminders", we_need_reminders, drop_reminders)
}

/// The two reference migrations as SQL files in `dir`.
pub fn write_sql_migrations(dir: &Path) -> StrataResult<()> {
    fs::write(
        dir.join("1_people_have_last_names.up.sql"),
        "ALTER TABLE people ADD COLUMN last_name varchar(255);",
    )?;
    fs::write(
        dir.join("1_people_have_last_names.down.sql"),
        "ALTER TABLE people DROP COLUMN last_name;",
    )?;
    fs::write(
        dir.join("2_we_need_reminders.up.sql"),
        "CREATE TABLE reminders (\n  id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,\n  \
         content text,\n  remind_at datetime\n);",
    )?;
    fs::write(
        dir.join("2_we_need_reminders.down.sql"),
        "DROP TABLE reminders;",
    )?;
    Ok(())
}

/// Inserts a reminder and reads back the content of the first one.
pub fn create_and_read_reminder(ctx: &TestContext, table: &str) -> StrataResult<Value> {
    let now = chrono::Local::now().naive_local();
    ctx.adapter().insert(
        table,
        &row(&[
            ("content", Value::from("hello world")),
            ("remind_at", Value::DateTime(now)),
        ]),
    )?;
    let rows = ctx.adapter().select_all(table)?;
    Ok(rows
        .first()
        .and_then(|r| r.get("content"))
        .cloned()
        .unwrap_or_default())
}
