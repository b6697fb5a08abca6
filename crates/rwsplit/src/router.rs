use ruleconfig::{ConfigurationProperties, HintValueContext};
use tracing::{info, warn};

use crate::datasource_rule::DataSourceRule;

/// What the router needs to know about a statement.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteRequest<'a> {
    /// Statement modifies data (INSERT, UPDATE, DELETE, DDL, ...).
    pub is_write: bool,
    /// Read that takes row locks, e.g. `SELECT ... FOR UPDATE`.
    pub is_locking_read: bool,
    /// Statement runs inside an explicit transaction.
    pub in_transaction: bool,
    pub hint: Option<&'a HintValueContext>,
}

impl RouteRequest<'_> {
    fn requires_primary(&self) -> bool {
        self.is_write
            || self.is_locking_read
            || self.in_transaction
            || self.hint.is_some_and(|h| h.write_route_only)
    }
}

/// Picks the physical data source for a statement under a read-write
/// splitting rule.
#[derive(Debug)]
pub struct ReadwriteSplittingDataSourceRouter<'a> {
    rule: &'a DataSourceRule,
    props: &'a ConfigurationProperties,
}

impl<'a> ReadwriteSplittingDataSourceRouter<'a> {
    pub fn new(rule: &'a DataSourceRule, props: &'a ConfigurationProperties) -> Self {
        ReadwriteSplittingDataSourceRouter { rule, props }
    }

    /// Route to the write data source, or to an enabled read data source
    /// chosen by the rule's load balancer.
    ///
    /// Falls back to the write data source when no read data source is
    /// available.
    pub fn route(&self, request: &RouteRequest) -> String {
        let write = self.rule.write_data_source();
        if request.requires_primary() {
            self.show(request, &write);
            return write;
        }

        let reads = self.rule.read_data_source_names();
        if reads.is_empty() {
            warn!(rule = %self.rule.name(), "no read data source available, routing read to write data source");
            self.show(request, &write);
            return write;
        }

        let target = self
            .rule
            .load_balancer()
            .get_data_source(self.rule.name(), &write, &reads);
        self.show(request, &target);
        target
    }

    fn show(&self, request: &RouteRequest, target: &str) {
        if !self.props.sql_show {
            return;
        }
        if self.props.sql_simple {
            info!(rule = %self.rule.name(), %target, "readwrite-splitting route");
        } else {
            info!(rule = %self.rule.name(), %target, ?request, "readwrite-splitting route");
        }
    }
}
