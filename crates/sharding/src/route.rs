use std::collections::{BTreeMap, BTreeSet};

use ruleconfig::{ConfigurationProperties, HintValueContext};

use crate::condition::ShardingConditions;
use crate::datanode::DataNode;
use crate::errors::Result;
use crate::rule::ShardingRule;
use crate::statement::InsertStatementContext;

/// Resolved placement of a statement's logical tables.
///
/// Equality only considers which data nodes each logical table routes to,
/// ignoring order and the per-row grouping.
#[derive(Debug, Clone, Default)]
pub struct RouteContext {
    units: BTreeMap<String, BTreeSet<DataNode>>,
    /// Candidate data nodes per inserted row, before deduplication.
    original_data_nodes: Vec<Vec<DataNode>>,
}

impl RouteContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_data_node(&mut self, logical_table: impl Into<String>, node: DataNode) {
        self.units
            .entry(logical_table.into())
            .or_default()
            .insert(node);
    }

    pub fn with_data_node(mut self, logical_table: impl Into<String>, node: DataNode) -> Self {
        self.add_data_node(logical_table, node);
        self
    }

    /// Record the candidate data nodes for one row.
    pub fn push_original_data_nodes(&mut self, nodes: Vec<DataNode>) {
        self.original_data_nodes.push(nodes);
    }

    pub fn units(&self) -> &BTreeMap<String, BTreeSet<DataNode>> {
        &self.units
    }

    pub fn data_nodes(&self, logical_table: &str) -> Option<&BTreeSet<DataNode>> {
        self.units.get(logical_table)
    }

    pub fn original_data_nodes(&self) -> &[Vec<DataNode>] {
        &self.original_data_nodes
    }

    /// Distinct data sources across all routed data nodes.
    pub fn actual_data_source_names(&self) -> BTreeSet<&str> {
        self.units
            .values()
            .flatten()
            .map(|node| node.data_source_name.as_str())
            .collect()
    }

    /// Whether the statement executes against a single data source.
    pub fn is_single_routing(&self) -> bool {
        self.actual_data_source_names().len() == 1
    }
}

impl PartialEq for RouteContext {
    fn eq(&self, other: &Self) -> bool {
        self.units == other.units
    }
}

impl Eq for RouteContext {}

/// Maps sharding conditions for a logical table onto data nodes.
pub trait RouteEngine: Sync + Send {
    fn route(
        &self,
        table_name: &str,
        conditions: &ShardingConditions,
        statement: &InsertStatementContext,
        hint: &HintValueContext,
        props: &ConfigurationProperties,
        rule: &dyn ShardingRule,
    ) -> Result<RouteContext>;
}
