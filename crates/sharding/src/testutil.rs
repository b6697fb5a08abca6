//! In-memory sharding rule and route engine for tests.
use std::collections::HashMap;

use ruleconfig::{ConfigurationProperties, HintValueContext};

use crate::condition::{ShardingConditions, ShardingValue};
use crate::datanode::DataNode;
use crate::errors::{Result, ShardingError};
use crate::route::{RouteContext, RouteEngine};
use crate::rule::ShardingRule;
use crate::statement::InsertStatementContext;

#[derive(Debug, Default)]
struct TestTableRule {
    sharding_column: String,
    generate_key_column: Option<String>,
}

#[derive(Debug, Default)]
pub struct TestShardingRule {
    tables: HashMap<String, TestTableRule>,
    binding_groups: Vec<Vec<String>>,
}

impl TestShardingRule {
    pub fn with_table(
        mut self,
        table: &str,
        sharding_column: &str,
        generate_key_column: Option<&str>,
    ) -> Self {
        self.tables.insert(
            table.to_string(),
            TestTableRule {
                sharding_column: sharding_column.to_string(),
                generate_key_column: generate_key_column.map(str::to_string),
            },
        );
        self
    }

    pub fn with_binding_group(mut self, tables: &[&str]) -> Self {
        self.binding_groups
            .push(tables.iter().map(|s| s.to_string()).collect());
        self
    }

    /// `t_order` and `t_order_item` sharded by `user_id` and bound together,
    /// `t_user` sharded on its own. `t_order` generates `order_id`.
    pub fn order_rule() -> Self {
        Self::default()
            .with_table("t_order", "user_id", Some("order_id"))
            .with_table("t_order_item", "user_id", Some("item_id"))
            .with_table("t_user", "user_id", None)
            .with_binding_group(&["t_order", "t_order_item"])
    }
}

impl ShardingRule for TestShardingRule {
    fn find_generate_key_column_name(&self, table: &str) -> Option<String> {
        self.tables.get(table)?.generate_key_column.clone()
    }

    fn contains_sharding_table(&self, tables: &[String]) -> bool {
        tables.iter().any(|t| self.tables.contains_key(t))
    }

    fn is_all_sharding_tables(&self, tables: &[String]) -> bool {
        !tables.is_empty() && tables.iter().all(|t| self.tables.contains_key(t))
    }

    fn is_all_binding_tables(&self, tables: &[String]) -> bool {
        !tables.is_empty()
            && self
                .binding_groups
                .iter()
                .any(|group| tables.iter().all(|t| group.contains(t)))
    }

    fn find_sharding_column(&self, column: &str, table: &str) -> Option<String> {
        let rule = self.tables.get(table)?;
        rule.sharding_column
            .eq_ignore_ascii_case(column)
            .then(|| rule.sharding_column.clone())
    }
}

/// Routes integer sharding value `v` to `ds_{v % 2}.<table>_{v % 2}`.
///
/// A row without sharding values routes to every node. Hinted database
/// values take precedence over conditions.
#[derive(Debug, Default)]
pub struct ModRouteEngine;

impl ModRouteEngine {
    fn node(table: &str, value: i64) -> DataNode {
        let shard = value.rem_euclid(2);
        DataNode::new(format!("ds_{shard}"), format!("{table}_{shard}"))
    }

    fn all_nodes(table: &str) -> Vec<DataNode> {
        vec![Self::node(table, 0), Self::node(table, 1)]
    }

    fn route_values(table: &str, values: &[ShardingValue]) -> Result<Vec<DataNode>> {
        let mut nodes = Vec::new();
        for value in values {
            let ShardingValue::Int(v) = value else {
                return Err(ShardingError::Route {
                    table: table.to_string(),
                    reason: format!("unsupported sharding value {value}"),
                });
            };
            let node = Self::node(table, *v);
            if !nodes.contains(&node) {
                nodes.push(node);
            }
        }
        Ok(nodes)
    }
}

impl RouteEngine for ModRouteEngine {
    fn route(
        &self,
        table_name: &str,
        conditions: &ShardingConditions,
        _statement: &InsertStatementContext,
        hint: &HintValueContext,
        _props: &ConfigurationProperties,
        _rule: &dyn ShardingRule,
    ) -> Result<RouteContext> {
        let mut groups = Vec::new();
        if hint.contains_hint_sharding_value(table_name) {
            let values = hint
                .sharding_database_values
                .get(table_name)
                .into_iter()
                .flatten()
                .map(|v| {
                    v.parse::<i64>()
                        .map(ShardingValue::Int)
                        .map_err(|e| ShardingError::Route {
                            table: table_name.to_string(),
                            reason: e.to_string(),
                        })
                })
                .collect::<Result<Vec<_>>>()?;
            groups.push(Self::route_values(table_name, &values)?);
        } else if conditions.is_empty() {
            groups.push(Self::all_nodes(table_name));
        } else {
            for condition in conditions.conditions() {
                let values: Vec<ShardingValue> = condition
                    .values
                    .iter()
                    .flat_map(|v| v.values.iter().cloned())
                    .collect();
                if values.is_empty() {
                    groups.push(Self::all_nodes(table_name));
                } else {
                    groups.push(Self::route_values(table_name, &values)?);
                }
            }
        }

        let mut route_context = RouteContext::new();
        for nodes in groups {
            for node in &nodes {
                route_context.add_data_node(table_name, node.clone());
            }
            route_context.push_original_data_nodes(nodes);
        }
        Ok(route_context)
    }
}
