use std::collections::BTreeMap;

/// Routing hints supplied by the client alongside a statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HintValueContext {
    /// Force the statement onto the write data source.
    pub write_route_only: bool,
    pub skip_sql_rewrite: bool,
    /// Explicit database sharding values keyed by logical table.
    pub sharding_database_values: BTreeMap<String, Vec<String>>,
    /// Explicit table sharding values keyed by logical table.
    pub sharding_table_values: BTreeMap<String, Vec<String>>,
}

impl HintValueContext {
    pub fn write_route_only() -> Self {
        HintValueContext {
            write_route_only: true,
            ..Default::default()
        }
    }

    /// Whether any explicit sharding value was hinted for the table.
    pub fn contains_hint_sharding_value(&self, table: &str) -> bool {
        let has = |values: &BTreeMap<String, Vec<String>>| {
            values.get(table).is_some_and(|v| !v.is_empty())
        };
        has(&self.sharding_database_values) || has(&self.sharding_table_values)
    }
}
