use tracing::{debug, info};

use super::dml::{create_sharding_conditions, is_same_route_context, validate_multiple_table};
use super::{ShardingStatementValidator, ValidateContext};
use crate::condition::ShardingConditions;
use crate::errors::{Result, ShardingError};
use crate::route::RouteContext;
use crate::rule::ShardingRule;
use crate::statement::InsertStatementContext;

/// Guards for INSERT statements into sharding tables.
#[derive(Debug, Clone)]
pub struct ShardingInsertStatementValidator {
    /// Conditions extracted from the rows being inserted.
    sharding_conditions: ShardingConditions,
}

impl ShardingInsertStatementValidator {
    pub fn new(sharding_conditions: ShardingConditions) -> Self {
        ShardingInsertStatementValidator {
            sharding_conditions,
        }
    }

    pub fn sharding_conditions(&self) -> &ShardingConditions {
        &self.sharding_conditions
    }

    /// An explicit column list must name the generated key column.
    fn contains_generate_key_column(
        rule: &dyn ShardingRule,
        statement: &InsertStatementContext,
    ) -> bool {
        let table = statement.table_name();
        statement
            .columns
            .iter()
            .any(|column| rule.is_generate_key_column(column, table))
    }

    fn show(ctx: &ValidateContext, phase: &str) {
        if !ctx.props.sql_show {
            return;
        }
        if ctx.props.sql_simple {
            info!(database = %ctx.database, table = %ctx.statement.table_name(), %phase, "validated insert");
        } else {
            info!(
                database = %ctx.database,
                table = %ctx.statement.table_name(),
                sql = %ctx.statement.sql,
                params = ?ctx.params,
                %phase,
                "validated insert"
            );
        }
    }
}

impl ShardingStatementValidator for ShardingInsertStatementValidator {
    fn pre_validate(&self, ctx: &ValidateContext) -> Result<()> {
        let statement = ctx.statement;
        if !statement.is_insert_select() {
            validate_multiple_table(ctx.rule, &statement.table_names())?;
        }

        let table = statement.table_name();
        if statement.is_insert_select() {
            if ctx.rule.find_generate_key_column_name(table).is_some()
                && !Self::contains_generate_key_column(ctx.rule, statement)
            {
                return Err(ShardingError::MissingGenerateKeyColumnWithInsertSelect {
                    table: table.to_string(),
                });
            }

            let tables = statement.table_names();
            if ctx.rule.contains_sharding_table(&tables)
                && tables.len() != 1
                && !ctx.rule.is_all_binding_tables(&tables)
            {
                return Err(ShardingError::InsertSelectTableViolation {
                    table: table.to_string(),
                    tables,
                });
            }
        }

        Self::show(ctx, "pre");
        Ok(())
    }

    fn post_validate(&self, ctx: &ValidateContext, route_context: &RouteContext) -> Result<()> {
        let statement = ctx.statement;
        let table = statement.table_name();

        if statement.is_insert_select()
            && self.sharding_conditions.needs_merge()
            && !(route_context.is_single_routing() || self.sharding_conditions.is_uniform())
        {
            return Err(ShardingError::UnsupportedShardingOperation {
                operation: "INSERT ... SELECT ...",
                table: table.to_string(),
            });
        }

        let assignments = statement.on_duplicate_key_assignments();
        if let Some(conditions) =
            create_sharding_conditions(ctx.rule, table, assignments, ctx.params)?
        {
            debug!(%table, %conditions, "re-routing on duplicate key update");
            let update_route_context = ctx.route_engine.route(
                table,
                &conditions,
                statement,
                ctx.hint,
                ctx.props,
                ctx.rule,
            )?;
            if !is_same_route_context(route_context, &update_route_context) {
                return Err(ShardingError::UnsupportedUpdatingShardingValue {
                    table: table.to_string(),
                });
            }
        }

        if !route_context.is_single_routing()
            && route_context
                .original_data_nodes()
                .iter()
                .any(|nodes| nodes.len() != 1)
        {
            return Err(ShardingError::DuplicateInsertDataRecord {
                conditions: self.sharding_conditions.clone(),
                table: table.to_string(),
            });
        }

        Self::show(ctx, "post");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ruleconfig::{ConfigurationProperties, HintValueContext};

    use super::*;
    use crate::condition::{ShardingCondition, ShardingConditionValue, ShardingValue};
    use crate::datanode::DataNode;
    use crate::route::RouteEngine;
    use crate::statement::{AssignmentValue, ColumnAssignment};
    use crate::testutil::{ModRouteEngine, TestShardingRule};

    struct Fixture {
        rule: TestShardingRule,
        engine: ModRouteEngine,
        hint: HintValueContext,
        props: ConfigurationProperties,
        params: Vec<ShardingValue>,
    }

    impl Fixture {
        fn new() -> Self {
            logutil::init_test();
            Fixture {
                rule: TestShardingRule::order_rule(),
                engine: ModRouteEngine,
                hint: HintValueContext::default(),
                props: ConfigurationProperties {
                    sql_show: true,
                    ..Default::default()
                },
                params: Vec::new(),
            }
        }

        fn ctx<'a>(&'a self, statement: &'a InsertStatementContext) -> ValidateContext<'a> {
            ValidateContext {
                rule: &self.rule,
                route_engine: &self.engine,
                statement,
                hint: &self.hint,
                params: &self.params,
                database: "sharding_db",
                props: &self.props,
            }
        }

        fn route(
            &self,
            statement: &InsertStatementContext,
            conditions: &ShardingConditions,
        ) -> RouteContext {
            self.engine
                .route(
                    statement.table_name(),
                    conditions,
                    statement,
                    &self.hint,
                    &self.props,
                    &self.rule,
                )
                .unwrap()
        }
    }

    fn user_rows(table: &str, user_ids: &[i64]) -> Vec<ShardingCondition> {
        user_ids
            .iter()
            .map(|id| {
                ShardingCondition::new(vec![ShardingConditionValue::new(
                    "user_id",
                    table,
                    vec![ShardingValue::Int(*id)],
                )])
            })
            .collect()
    }

    fn validator(table: &str, user_ids: &[i64], needs_merge: bool) -> ShardingInsertStatementValidator {
        ShardingInsertStatementValidator::new(ShardingConditions::new(
            user_rows(table, user_ids),
            needs_merge,
        ))
    }

    #[test]
    fn plain_insert_without_key_generator() {
        let fixture = Fixture::new();
        let statement = InsertStatementContext::new("t_user")
            .with_columns(["user_id", "name"])
            .with_sql("INSERT INTO t_user (user_id, name) VALUES (1, 'a')");

        validator("t_user", &[1], false)
            .pre_validate(&fixture.ctx(&statement))
            .unwrap();
    }

    #[test]
    fn non_sharding_insert() {
        let fixture = Fixture::new();
        let statement = InsertStatementContext::new("t_config");
        let validator = ShardingInsertStatementValidator::new(ShardingConditions::default());
        let ctx = fixture.ctx(&statement);

        validator.pre_validate(&ctx).unwrap();
        let route_context = RouteContext::new().with_data_node("t_config", DataNode::new("ds_0", "t_config"));
        validator.post_validate(&ctx, &route_context).unwrap();
    }

    #[test]
    fn insert_select_missing_generate_key_column() {
        let fixture = Fixture::new();
        let validator = validator("t_order", &[1], true);

        let statement = InsertStatementContext::new("t_order")
            .with_insert_select(["t_order"])
            .with_sql("INSERT INTO t_order SELECT * FROM t_order");
        let err = validator.pre_validate(&fixture.ctx(&statement)).unwrap_err();
        assert!(matches!(
            err,
            ShardingError::MissingGenerateKeyColumnWithInsertSelect { ref table } if table == "t_order"
        ));

        let statement = InsertStatementContext::new("t_order")
            .with_columns(["user_id", "status"])
            .with_insert_select(["t_order"]);
        let err = validator.pre_validate(&fixture.ctx(&statement)).unwrap_err();
        assert!(matches!(
            err,
            ShardingError::MissingGenerateKeyColumnWithInsertSelect { .. }
        ));

        let statement = InsertStatementContext::new("t_order")
            .with_columns(["ORDER_ID", "user_id"])
            .with_insert_select(["t_order"]);
        validator.pre_validate(&fixture.ctx(&statement)).unwrap();
    }

    #[test]
    fn insert_select_from_other_table_missing_generate_key_column() {
        let fixture = Fixture::new();
        let validator = validator("t_order", &[1], true);

        // t_user isn't bound to t_order, but the key column check comes first.
        let statement = InsertStatementContext::new("t_order")
            .with_insert_select(["t_user"])
            .with_sql("INSERT INTO t_order SELECT * FROM t_user");
        let err = validator.pre_validate(&fixture.ctx(&statement)).unwrap_err();
        assert!(matches!(
            err,
            ShardingError::MissingGenerateKeyColumnWithInsertSelect { ref table } if table == "t_order"
        ));

        let statement = InsertStatementContext::new("t_order")
            .with_insert_select(["t_order_item"])
            .with_sql("INSERT INTO t_order SELECT * FROM t_order_item");
        let err = validator.pre_validate(&fixture.ctx(&statement)).unwrap_err();
        assert!(matches!(
            err,
            ShardingError::MissingGenerateKeyColumnWithInsertSelect { .. }
        ));
    }

    #[test]
    fn insert_select_across_tables() {
        let fixture = Fixture::new();
        let validator = validator("t_order", &[1], true);

        let statement = InsertStatementContext::new("t_order")
            .with_columns(["order_id", "user_id"])
            .with_insert_select(["t_order_item"]);
        validator.pre_validate(&fixture.ctx(&statement)).unwrap();

        let statement = InsertStatementContext::new("t_order")
            .with_columns(["order_id", "user_id"])
            .with_insert_select(["t_user"]);
        let err = validator.pre_validate(&fixture.ctx(&statement)).unwrap_err();
        match err {
            ShardingError::InsertSelectTableViolation { table, tables } => {
                assert_eq!("t_order", table);
                assert_eq!(vec!["t_order", "t_user"], tables);
            }
            other => panic!("unexpected error: {other}"),
        }

        // Selecting from unsharded tables into an unsharded table is fine.
        let statement = InsertStatementContext::new("t_config").with_insert_select(["t_dict"]);
        validator.pre_validate(&fixture.ctx(&statement)).unwrap();
    }

    #[test]
    fn insert_select_needs_merge() {
        let fixture = Fixture::new();
        let statement = InsertStatementContext::new("t_order")
            .with_columns(["order_id", "user_id"])
            .with_insert_select(["t_order"]);

        let mixed = validator("t_order", &[1, 2], true);
        let route_context = fixture.route(&statement, mixed.sharding_conditions());
        assert!(!route_context.is_single_routing());
        let err = mixed
            .post_validate(&fixture.ctx(&statement), &route_context)
            .unwrap_err();
        assert!(matches!(
            err,
            ShardingError::UnsupportedShardingOperation {
                operation: "INSERT ... SELECT ...",
                ..
            }
        ));

        // Same values on every row.
        let uniform = validator("t_order", &[1, 1], true);
        let route_context = fixture.route(&statement, uniform.sharding_conditions());
        uniform
            .post_validate(&fixture.ctx(&statement), &route_context)
            .unwrap();

        let mut spread = RouteContext::new()
            .with_data_node("t_order", DataNode::new("ds_0", "t_order_0"))
            .with_data_node("t_order", DataNode::new("ds_1", "t_order_1"));
        spread.push_original_data_nodes(vec![DataNode::new("ds_0", "t_order_0")]);
        spread.push_original_data_nodes(vec![DataNode::new("ds_1", "t_order_1")]);
        assert!(!spread.is_single_routing());
        uniform
            .post_validate(&fixture.ctx(&statement), &spread)
            .unwrap();
        mixed
            .post_validate(&fixture.ctx(&statement), &spread)
            .unwrap_err();

        // Different values landing in one data source.
        let single = validator("t_order", &[1, 3], true);
        let route_context = fixture.route(&statement, single.sharding_conditions());
        assert!(route_context.is_single_routing());
        single
            .post_validate(&fixture.ctx(&statement), &route_context)
            .unwrap();

        // No merge needed, rows route independently.
        let no_merge = validator("t_order", &[1, 2], false);
        let route_context = fixture.route(&statement, no_merge.sharding_conditions());
        no_merge
            .post_validate(&fixture.ctx(&statement), &route_context)
            .unwrap();
    }

    #[test]
    fn on_duplicate_key_update_changes_sharding_value() {
        let fixture = Fixture::new();
        let validator = validator("t_order", &[2], false);
        let statement = InsertStatementContext::new("t_order")
            .with_columns(["order_id", "user_id"])
            .with_on_duplicate_key_columns(vec![ColumnAssignment::new(
                "user_id",
                AssignmentValue::Literal(ShardingValue::Int(5)),
            )])
            .with_sql("INSERT INTO t_order (order_id, user_id) VALUES (1, 2) ON DUPLICATE KEY UPDATE user_id = 5");
        let route_context = fixture.route(&statement, validator.sharding_conditions());

        let err = validator
            .post_validate(&fixture.ctx(&statement), &route_context)
            .unwrap_err();
        assert!(matches!(
            err,
            ShardingError::UnsupportedUpdatingShardingValue { ref table } if table == "t_order"
        ));
    }

    #[test]
    fn on_duplicate_key_update_same_route() {
        let mut fixture = Fixture::new();
        fixture.params = vec![ShardingValue::Int(4)];
        let validator = validator("t_order", &[2], false);
        let statement = InsertStatementContext::new("t_order")
            .with_columns(["order_id", "user_id"])
            .with_on_duplicate_key_columns(vec![
                ColumnAssignment::new("user_id", AssignmentValue::Parameter(0)),
                ColumnAssignment::new("status", AssignmentValue::Literal("ok".into())),
            ]);
        let route_context = fixture.route(&statement, validator.sharding_conditions());

        validator
            .post_validate(&fixture.ctx(&statement), &route_context)
            .unwrap();
    }

    #[test]
    fn on_duplicate_key_update_parameter_out_of_range() {
        let fixture = Fixture::new();
        let validator = validator("t_order", &[2], false);
        let statement = InsertStatementContext::new("t_order").with_on_duplicate_key_columns(vec![
            ColumnAssignment::new("user_id", AssignmentValue::Parameter(3)),
        ]);
        let route_context = fixture.route(&statement, validator.sharding_conditions());

        let err = validator
            .post_validate(&fixture.ctx(&statement), &route_context)
            .unwrap_err();
        assert!(matches!(
            err,
            ShardingError::ParameterIndexOutOfRange { index: 3, len: 0 }
        ));
    }

    #[test]
    fn ambiguous_data_nodes() {
        let fixture = Fixture::new();
        let validator = validator("t_order", &[1], false);
        let statement = InsertStatementContext::new("t_order");

        let mut route_context = RouteContext::new()
            .with_data_node("t_order", DataNode::new("ds_0", "t_order_0"))
            .with_data_node("t_order", DataNode::new("ds_1", "t_order_1"));
        route_context.push_original_data_nodes(vec![
            DataNode::new("ds_0", "t_order_0"),
            DataNode::new("ds_1", "t_order_1"),
        ]);

        let err = validator
            .post_validate(&fixture.ctx(&statement), &route_context)
            .unwrap_err();
        match err {
            ShardingError::DuplicateInsertDataRecord { conditions, table } => {
                assert_eq!("t_order", table);
                assert_eq!(validator.sharding_conditions(), &conditions);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rows_routed_to_one_node_each() {
        let fixture = Fixture::new();
        let validator = validator("t_order", &[1, 2], false);
        let statement = InsertStatementContext::new("t_order");
        let route_context = fixture.route(&statement, validator.sharding_conditions());

        assert!(!route_context.is_single_routing());
        assert_eq!(2, route_context.original_data_nodes().len());
        validator
            .post_validate(&fixture.ctx(&statement), &route_context)
            .unwrap();
    }

    #[test]
    fn hinted_route_on_duplicate_key_update() {
        let mut fixture = Fixture::new();
        fixture
            .hint
            .sharding_database_values
            .insert("t_order".to_string(), vec!["0".to_string()]);
        let validator = validator("t_order", &[2], false);
        let statement = InsertStatementContext::new("t_order").with_on_duplicate_key_columns(vec![
            ColumnAssignment::new("user_id", AssignmentValue::Literal(ShardingValue::Int(5))),
        ]);
        let route_context = fixture.route(&statement, validator.sharding_conditions());

        // Hint pins both routes to the same node.
        validator
            .post_validate(&fixture.ctx(&statement), &route_context)
            .unwrap();
    }
}
