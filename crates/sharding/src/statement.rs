use crate::condition::ShardingValue;

/// Value on the right-hand side of an `ON DUPLICATE KEY UPDATE` assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentValue {
    Literal(ShardingValue),
    /// Zero-based index of a parameter marker.
    Parameter(usize),
    /// Any other expression, kept as SQL text.
    Expression(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnAssignment {
    pub column: String,
    pub value: AssignmentValue,
}

impl ColumnAssignment {
    pub fn new(column: impl Into<String>, value: AssignmentValue) -> Self {
        ColumnAssignment {
            column: column.into(),
            value,
        }
    }
}

/// The `SELECT` feeding an `INSERT ... SELECT`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertSelectContext {
    /// Tables referenced by the subquery.
    pub tables: Vec<String>,
}

/// Parsed INSERT statement, as far as sharding validation is concerned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertStatementContext {
    /// Target logical table.
    pub table: Option<String>,
    /// Explicit column list, empty if omitted.
    pub columns: Vec<String>,
    pub insert_select: Option<InsertSelectContext>,
    pub on_duplicate_key_columns: Option<Vec<ColumnAssignment>>,
    /// Original SQL text, used for logging.
    pub sql: String,
}

impl InsertStatementContext {
    pub fn new(table: impl Into<String>) -> Self {
        InsertStatementContext {
            table: Some(table.into()),
            ..Default::default()
        }
    }

    pub fn with_columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_insert_select<S: Into<String>>(
        mut self,
        tables: impl IntoIterator<Item = S>,
    ) -> Self {
        self.insert_select = Some(InsertSelectContext {
            tables: tables.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn with_on_duplicate_key_columns(mut self, assignments: Vec<ColumnAssignment>) -> Self {
        self.on_duplicate_key_columns = Some(assignments);
        self
    }

    pub fn with_sql(mut self, sql: impl Into<String>) -> Self {
        self.sql = sql.into();
        self
    }

    /// Target table name, empty if the statement has none.
    pub fn table_name(&self) -> &str {
        self.table.as_deref().unwrap_or("")
    }

    pub fn is_insert_select(&self) -> bool {
        self.insert_select.is_some()
    }

    /// Distinct tables referenced by the statement, target first.
    pub fn table_names(&self) -> Vec<String> {
        let subquery_tables = self
            .insert_select
            .iter()
            .flat_map(|select| select.tables.iter());

        let mut names: Vec<String> = Vec::new();
        for name in self.table.iter().chain(subquery_tables) {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }

    /// `ON DUPLICATE KEY UPDATE` assignments, empty if absent.
    pub fn on_duplicate_key_assignments(&self) -> &[ColumnAssignment] {
        self.on_duplicate_key_columns.as_deref().unwrap_or(&[])
    }
}
