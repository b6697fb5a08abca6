/// Sharding metadata consulted during validation.
///
/// Table names are logical table names.
pub trait ShardingRule: Sync + Send {
    /// Name of the column filled by the table's key generator, if it has one.
    fn find_generate_key_column_name(&self, table: &str) -> Option<String>;

    fn is_generate_key_column(&self, column: &str, table: &str) -> bool {
        self.find_generate_key_column_name(table)
            .is_some_and(|name| name.eq_ignore_ascii_case(column))
    }

    /// Whether any of `tables` is sharded.
    fn contains_sharding_table(&self, tables: &[String]) -> bool;

    /// Whether every one of `tables` is sharded.
    fn is_all_sharding_tables(&self, tables: &[String]) -> bool;

    /// Whether `tables` all belong to one binding table group.
    fn is_all_binding_tables(&self, tables: &[String]) -> bool;

    /// The sharding column of `table` matching `column`, if `column` is one.
    fn find_sharding_column(&self, column: &str, table: &str) -> Option<String>;
}
