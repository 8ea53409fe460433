/// Options accepted by `add_index`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexOptions {
    pub name: Option<String>,
    pub unique: bool,
}

impl IndexOptions {
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
}

/// Identifies the index to drop in `remove_index`: either the column(s) it was built
/// on, which resolves to the conventional name, or an explicit name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexTarget {
    Columns(Vec<String>),
    Name(String),
}

impl IndexTarget {
    pub fn column(column: &str) -> Self {
        IndexTarget::Columns(vec![column.to_string()])
    }

    pub fn name(name: &str) -> Self {
        IndexTarget::Name(name.to_string())
    }

    /// Resolves to the index name for `table`.
    pub fn resolve(&self, table: &str) -> String {
        match self {
            IndexTarget::Columns(columns) => index_name(table, columns),
            IndexTarget::Name(name) => name.clone(),
        }
    }
}

impl From<&str> for IndexTarget {
    fn from(column: &str) -> Self {
        IndexTarget::column(column)
    }
}

/// An index as reported by an adapter's introspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDefinition {
    pub table: String,
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

/// Conventional index name: `<table>_<first column>_index`.
pub fn index_name(table: &str, columns: &[String]) -> String {
    let first = columns.first().map(String::as_str).unwrap_or_default();
    format!("{}_{}_index", table, first)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conventional_index_name() {
        let columns = vec!["last_name".to_string(), "first_name".to_string()];
        assert_eq!(index_name("people", &columns), "people_last_name_index");
    }

    #[test]
    fn test_index_target_resolution() {
        assert_eq!(
            IndexTarget::from("last_name").resolve("people"),
            "people_last_name_index"
        );
        assert_eq!(IndexTarget::name("by_name").resolve("people"), "by_name");
    }
}
