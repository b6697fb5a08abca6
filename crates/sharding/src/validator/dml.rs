use crate::condition::{ShardingCondition, ShardingConditionValue, ShardingConditions, ShardingValue};
use crate::errors::{Result, ShardingError};
use crate::route::RouteContext;
use crate::rule::ShardingRule;
use crate::statement::{AssignmentValue, ColumnAssignment};

/// Reject DML touching several sharding tables unless they're bound together,
/// or mixing sharding and non-sharding tables.
pub fn validate_multiple_table(rule: &dyn ShardingRule, table_names: &[String]) -> Result<()> {
    let all_sharding = rule.is_all_sharding_tables(table_names);
    if all_sharding && (table_names.len() == 1 || rule.is_all_binding_tables(table_names)) {
        return Ok(());
    }
    if !all_sharding && !rule.contains_sharding_table(table_names) {
        return Ok(());
    }
    Err(ShardingError::DmlWithMultipleShardingTables {
        tables: table_names.to_vec(),
    })
}

/// Derive sharding conditions from the values assigned to sharding columns.
///
/// Only literal and parameter values are considered. Returns `None` if no
/// sharding column receives one.
pub fn create_sharding_conditions(
    rule: &dyn ShardingRule,
    table: &str,
    assignments: &[ColumnAssignment],
    params: &[ShardingValue],
) -> Result<Option<ShardingConditions>> {
    let mut values = Vec::new();
    for assignment in assignments {
        let Some(column) = rule.find_sharding_column(&assignment.column, table) else {
            continue;
        };
        let value = match &assignment.value {
            AssignmentValue::Literal(value) => value.clone(),
            AssignmentValue::Parameter(index) => params
                .get(*index)
                .cloned()
                .ok_or(ShardingError::ParameterIndexOutOfRange {
                    index: *index,
                    len: params.len(),
                })?,
            AssignmentValue::Expression(_) => continue,
        };
        values.push(ShardingConditionValue::new(column, table, vec![value]));
    }

    if values.is_empty() {
        return Ok(None);
    }
    Ok(Some(ShardingConditions::new(
        vec![ShardingCondition::new(values)],
        false,
    )))
}

/// Whether both contexts route every logical table to the same data nodes.
pub fn is_same_route_context(route_context: &RouteContext, other: &RouteContext) -> bool {
    route_context == other
}
