use crate::schema::{ColumnDefinition, ColumnOptions, ColumnType};

/// Options accepted by `create_table`.
///
/// * `id` - add an auto-increment integer primary key (default `true`)
/// * `primary_key` - name of that key column (default `"id"`)
/// * `force` - drop an existing table of the same name first
/// * `temporary` - create a temporary table
/// * `options` - extra text appended verbatim after the column list
#[derive(Debug, Clone, PartialEq)]
pub struct TableOptions {
    pub id: bool,
    pub primary_key: String,
    pub force: bool,
    pub temporary: bool,
    pub options: Option<String>,
}

impl Default for TableOptions {
    fn default() -> Self {
        TableOptions {
            id: true,
            primary_key: "id".to_string(),
            force: false,
            temporary: false,
            options: None,
        }
    }
}

impl TableOptions {
    pub fn without_id(mut self) -> Self {
        self.id = false;
        self
    }

    pub fn primary_key(mut self, name: &str) -> Self {
        self.primary_key = name.to_string();
        self
    }

    pub fn force(mut self) -> Self {
        self.force = true;
        self
    }

    pub fn temporary(mut self) -> Self {
        self.temporary = true;
        self
    }

    pub fn options(mut self, options: &str) -> Self {
        self.options = Some(options.to_string());
        self
    }
}

/// Collects the columns of a table inside a `create_table` block.
///
/// The implicit primary key requested by [TableOptions::id] is not stored as a column
/// definition; [TableDefinition::columns] prepends it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableDefinition {
    options: TableOptions,
    columns: Vec<ColumnDefinition>,
}

impl TableDefinition {
    pub fn new(options: TableOptions) -> Self {
        TableDefinition {
            options,
            columns: Vec::new(),
        }
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    /// Declares a column.
    pub fn column(
        &mut self,
        name: &str,
        column_type: ColumnType,
        options: ColumnOptions,
    ) -> &mut Self {
        self.columns
            .push(ColumnDefinition::new(name, column_type, options));
        self
    }

    pub fn primary_key(&mut self, name: &str) -> &mut Self {
        self.column(name, ColumnType::PrimaryKey, ColumnOptions::default())
    }

    pub fn string(&mut self, name: &str) -> &mut Self {
        self.column(name, ColumnType::String, ColumnOptions::default())
    }

    pub fn text(&mut self, name: &str) -> &mut Self {
        self.column(name, ColumnType::Text, ColumnOptions::default())
    }

    pub fn integer(&mut self, name: &str) -> &mut Self {
        self.column(name, ColumnType::Integer, ColumnOptions::default())
    }

    pub fn float(&mut self, name: &str) -> &mut Self {
        self.column(name, ColumnType::Float, ColumnOptions::default())
    }

    pub fn datetime(&mut self, name: &str) -> &mut Self {
        self.column(name, ColumnType::DateTime, ColumnOptions::default())
    }

    pub fn date(&mut self, name: &str) -> &mut Self {
        self.column(name, ColumnType::Date, ColumnOptions::default())
    }

    pub fn boolean(&mut self, name: &str) -> &mut Self {
        self.column(name, ColumnType::Boolean, ColumnOptions::default())
    }

    /// All columns in declaration order, led by the implicit primary key when
    /// [TableOptions::id] is set.
    pub fn columns(&self) -> Vec<ColumnDefinition> {
        let mut columns = Vec::with_capacity(self.columns.len() + 1);
        if self.options.id {
            columns.push(ColumnDefinition::new(
                &self.options.primary_key,
                ColumnType::PrimaryKey,
                ColumnOptions::default(),
            ));
        }
        columns.extend(self.columns.iter().cloned());
        columns
    }

    /// First column name declared more than once, if any.
    pub fn duplicate_column(&self) -> Option<String> {
        let columns = self.columns();
        for (i, column) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name == column.name) {
                return Some(column.name.clone());
            }
        }
        None
    }
}
