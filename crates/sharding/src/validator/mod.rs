//! Statement validators run around routing.
mod dml;
mod insert;

pub use dml::{create_sharding_conditions, is_same_route_context, validate_multiple_table};
pub use insert::ShardingInsertStatementValidator;

use ruleconfig::{ConfigurationProperties, HintValueContext};

use crate::condition::ShardingValue;
use crate::errors::Result;
use crate::route::{RouteContext, RouteEngine};
use crate::rule::ShardingRule;
use crate::statement::InsertStatementContext;

/// Everything a validator may consult for one statement execution.
#[derive(Clone, Copy)]
pub struct ValidateContext<'a> {
    pub rule: &'a dyn ShardingRule,
    pub route_engine: &'a dyn RouteEngine,
    pub statement: &'a InsertStatementContext,
    pub hint: &'a HintValueContext,
    /// Bound parameter values, indexed by parameter marker.
    pub params: &'a [ShardingValue],
    pub database: &'a str,
    pub props: &'a ConfigurationProperties,
}

pub trait ShardingStatementValidator {
    /// Checks that only need the statement, run before routing.
    fn pre_validate(&self, ctx: &ValidateContext) -> Result<()>;

    /// Checks against the computed route, run after routing.
    fn post_validate(&self, ctx: &ValidateContext, route_context: &RouteContext) -> Result<()>;
}
