use crate::common::SCHEMA_INFO_TABLE;
use crate::errors::{ErrorKind, StrataError, StrataResult};
use regex::Regex;
use std::sync::LazyLock;

static AFFIX_PATTERN: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]*$"));

/// Trait for types that map to a table and may carry their own naming affixes.
///
/// # Purpose
/// Lets a typed reference stand in for a raw table name when resolving physical table
/// names. An entity that sets its own prefix or suffix overrides the global ones.
///
/// # Usage
/// ```ignore
/// struct Reminder;
///
/// impl TableEntity for Reminder {
///     fn table_name(&self) -> String {
///         tableize("Reminder")
///     }
/// }
/// ```
pub trait TableEntity {
    /// Base, undecorated table name.
    fn table_name(&self) -> String;

    /// Entity-specific prefix. `None` (or empty) defers to the global prefix.
    fn table_name_prefix(&self) -> Option<String> {
        None
    }

    /// Entity-specific suffix. `None` (or empty) defers to the global suffix.
    fn table_name_suffix(&self) -> Option<String> {
        None
    }
}

/// A logical table reference: a raw name or a typed entity.
#[derive(Clone, Copy)]
pub enum TableRef<'a> {
    Name(&'a str),
    Entity(&'a dyn TableEntity),
}

impl<'a> From<&'a str> for TableRef<'a> {
    fn from(name: &'a str) -> Self {
        TableRef::Name(name)
    }
}

impl<'a, T: TableEntity> From<&'a T> for TableRef<'a> {
    fn from(entity: &'a T) -> Self {
        TableRef::Entity(entity)
    }
}

/// Global table-name affixes.
///
/// The configuration is an explicit value: the migrator owns one, and it cannot change
/// while a migration runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamingConfig {
    table_name_prefix: String,
    table_name_suffix: String,
}

impl NamingConfig {
    /// Creates a naming configuration, validating both affixes.
    ///
    /// # Errors
    /// Returns [ErrorKind::ValidationError] if an affix contains anything other than
    /// ASCII letters, digits and underscores.
    pub fn new(prefix: &str, suffix: &str) -> StrataResult<Self> {
        validate_affix("prefix", prefix)?;
        validate_affix("suffix", suffix)?;
        Ok(NamingConfig {
            table_name_prefix: prefix.to_string(),
            table_name_suffix: suffix.to_string(),
        })
    }

    pub fn table_name_prefix(&self) -> &str {
        &self.table_name_prefix
    }

    pub fn table_name_suffix(&self) -> &str {
        &self.table_name_suffix
    }

    /// Resolves a logical table reference to its physical name.
    ///
    /// A raw name is wrapped in the global prefix and suffix. An entity uses its own
    /// prefix and suffix when either of them is set (non-empty), and the global ones
    /// otherwise.
    pub fn proper_table_name<'a>(&self, table: impl Into<TableRef<'a>>) -> String {
        match table.into() {
            TableRef::Name(name) => self.decorate(name, None, None),
            TableRef::Entity(entity) => {
                let prefix = entity.table_name_prefix().unwrap_or_default();
                let suffix = entity.table_name_suffix().unwrap_or_default();
                if prefix.is_empty() && suffix.is_empty() {
                    self.decorate(&entity.table_name(), None, None)
                } else {
                    self.decorate(&entity.table_name(), Some(&prefix), Some(&suffix))
                }
            }
        }
    }

    /// Physical name of the schema-info table. Always uses the global affixes.
    pub fn schema_info_table_name(&self) -> String {
        self.proper_table_name(SCHEMA_INFO_TABLE)
    }

    fn decorate(&self, name: &str, prefix: Option<&str>, suffix: Option<&str>) -> String {
        let prefix = prefix.unwrap_or(&self.table_name_prefix);
        let suffix = suffix.unwrap_or(&self.table_name_suffix);
        let mut result = String::with_capacity(prefix.len() + name.len() + suffix.len());
        result.push_str(prefix);
        result.push_str(name);
        result.push_str(suffix);
        result
    }
}

fn validate_affix(which: &str, affix: &str) -> StrataResult<()> {
    let pattern = AFFIX_PATTERN.as_ref().map_err(|err| {
        StrataError::new(
            &format!("Invalid table name pattern: {}", err),
            ErrorKind::InternalError,
        )
    })?;
    if pattern.is_match(affix) {
        Ok(())
    } else {
        log::error!("{} is not a valid table name {}", affix, which);
        Err(StrataError::new(
            &format!("{} is not a valid table name {}", affix, which),
            ErrorKind::ValidationError,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::tableize;

    struct Reminder;

    impl TableEntity for Reminder {
        fn table_name(&self) -> String {
            tableize("Reminder")
        }
    }

    struct LegacyReminder {
        prefix: Option<String>,
        suffix: Option<String>,
    }

    impl TableEntity for LegacyReminder {
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

    #[test]
    fn test_raw_name_uses_global_affixes() -> StrataResult<()> {
        let naming = NamingConfig::new("prefix_", "_suffix")?;
        assert_eq!(naming.proper_table_name("table"), "prefix_table_suffix");
        assert_eq!(naming.proper_table_name("table"), "prefix_table_suffix");

        let plain = NamingConfig::default();
        assert_eq!(plain.proper_table_name("table"), "table");
        Ok(())
    }

    #[test]
    fn test_entity_without_overrides_uses_global_affixes() -> StrataResult<()> {
        let naming = NamingConfig::new("p_", "_s")?;
        assert_eq!(naming.proper_table_name(&Reminder), "p_reminders_s");

        let empty = LegacyReminder {
            prefix: Some(String::new()),
            suffix: None,
        };
        assert_eq!(naming.proper_table_name(&empty), "p_reminders_s");
        Ok(())
    }

    #[test]
    fn test_entity_override_wins() -> StrataResult<()> {
        let naming = NamingConfig::new("p_", "_s")?;
        let own_prefix = LegacyReminder {
            prefix: Some("legacy_".to_string()),
            suffix: None,
        };
        // once the entity sets one affix the global ones no longer apply
        assert_eq!(naming.proper_table_name(&own_prefix), "legacy_reminders");

        let own_suffix = LegacyReminder {
            prefix: None,
            suffix: Some("_v2".to_string()),
        };
        assert_eq!(naming.proper_table_name(&own_suffix), "reminders_v2");
        Ok(())
    }

    #[test]
    fn test_schema_info_table_name() -> StrataResult<()> {
        assert_eq!(NamingConfig::default().schema_info_table_name(), "schema_info");
        let naming = NamingConfig::new("foo_", "_bar")?;
        assert_eq!(naming.schema_info_table_name(), "foo_schema_info_bar");
        Ok(())
    }

    #[test]
    fn test_invalid_affix_rejected() {
        let err = NamingConfig::new("bad prefix", "").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ValidationError);
        assert!(NamingConfig::new("", "x;drop").is_err());
    }
}
