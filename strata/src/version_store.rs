use crate::adapter::{Adapter, DatabaseStatements, SchemaStatements};
use crate::common::{Value, INITIAL_SCHEMA_VERSION, SCHEMA_INFO_VERSION_COLUMN};
use crate::errors::{ErrorKind, StrataError, StrataResult};
use crate::naming::NamingConfig;
use crate::schema::{ColumnOptions, ColumnType, Row, TableDefinition, TableOptions};
use std::sync::Arc;

/// Persisted record of the schema version the database reflects.
///
/// The record lives in a single-row table named `schema_info` decorated with the
/// global prefix and suffix. The table is created on first access and seeded with
/// version `0`. Every write updates all rows, so the table can never disagree with
/// itself. Only structured adapter calls are used, never raw SQL.
pub struct VersionStore {
    adapter: Arc<dyn Adapter>,
    table_name: String,
}

impl VersionStore {
    pub fn new(adapter: Arc<dyn Adapter>, naming: &NamingConfig) -> Self {
        VersionStore {
            adapter,
            table_name: naming.schema_info_table_name(),
        }
    }

    /// Physical name of the version table.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Reads the persisted version, creating and seeding the table if needed.
    pub fn current_version(&self) -> StrataResult<u64> {
        self.ensure_table()?;
        let rows = self.adapter.select_all(&self.table_name)?;
        match rows.first().and_then(|row| row.get(SCHEMA_INFO_VERSION_COLUMN)) {
            Some(Value::Integer(version)) => u64::try_from(*version).map_err(|_| {
                log::error!("Stored schema version {} is negative", version);
                StrataError::new(
                    &format!("Stored schema version {} is negative", version),
                    ErrorKind::InvalidDataType,
                )
            }),
            Some(Value::Null) | None => Ok(INITIAL_SCHEMA_VERSION),
            Some(other) => {
                log::error!("Stored schema version has type {}", other.type_name());
                Err(StrataError::new(
                    &format!(
                        "Stored schema version {} is not an integer",
                        other
                    ),
                    ErrorKind::InvalidDataType,
                ))
            }
        }
    }

    /// Overwrites the persisted version.
    pub fn set_version(&self, version: u64) -> StrataResult<()> {
        let stored = i64::try_from(version).map_err(|_| {
            StrataError::new(
                &format!("Schema version {} is too large to store", version),
                ErrorKind::InvalidDataType,
            )
        })?;
        self.ensure_table()?;

        let mut values = Row::new();
        values.insert(SCHEMA_INFO_VERSION_COLUMN.to_string(), Value::Integer(stored));
        self.adapter.update_all(&self.table_name, &values)?;
        log::debug!("Schema version set to {}", version);
        Ok(())
    }

    fn ensure_table(&self) -> StrataResult<()> {
        if !self.adapter.table_exists(&self.table_name)? {
            log::debug!("Creating schema version table {}", self.table_name);
            let mut definition = TableDefinition::new(TableOptions::default().without_id());
            definition.column(
                SCHEMA_INFO_VERSION_COLUMN,
                ColumnType::Integer,
                ColumnOptions::default(),
            );
            self.adapter.create_table(&self.table_name, &definition)?;
        }

        if self.adapter.select_all(&self.table_name)?.is_empty() {
            let mut seed = Row::new();
            seed.insert(
                SCHEMA_INFO_VERSION_COLUMN.to_string(),
                Value::Integer(INITIAL_SCHEMA_VERSION as i64),
            );
            self.adapter.insert(&self.table_name, &seed)?;
        }
        Ok(())
    }
}
