use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use parking_lot::RwLock;
use tracing::debug;

use crate::balance::ReadQueryLoadBalanceAlgorithm;
use crate::config::DataSourceRuleConfig;
use crate::errors::{ReadwriteSplittingError, Result};
use crate::strategy::{AutoAwareDiscovery, DataSourceStrategy, REPLICA_DATA_SOURCE_NAMES};

/// A single read-write splitting rule.
///
/// Everything but the set of disabled data sources is fixed at construction.
/// Redefining a rule replaces the whole value.
///
/// Disabled names are updated by health checks while statements concurrently
/// read them. Updates are serialized by a lock, and each read works against a
/// consistent snapshot of the set. A read racing with an update may or may
/// not observe it.
#[derive(Debug)]
pub struct DataSourceRule {
    name: String,
    load_balancer: Arc<dyn ReadQueryLoadBalanceAlgorithm>,
    strategy: DataSourceStrategy,
    disabled_data_source_names: RwLock<HashSet<String>>,
}

impl DataSourceRule {
    pub fn new(
        config: &DataSourceRuleConfig,
        load_balancer: Arc<dyn ReadQueryLoadBalanceAlgorithm>,
        discovery: Option<&Arc<dyn AutoAwareDiscovery>>,
    ) -> Result<Self> {
        if config.name.is_empty() {
            return Err(ReadwriteSplittingError::MissingRuleName);
        }

        let strategy = DataSourceStrategy::new(&config.strategy, discovery)?;
        debug!(
            name = %config.name,
            strategy = strategy.type_name(),
            load_balancer = load_balancer.type_name(),
            "created readwrite-splitting data source rule",
        );

        Ok(DataSourceRule {
            name: config.name.clone(),
            load_balancer,
            strategy,
            disabled_data_source_names: RwLock::new(HashSet::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn load_balancer(&self) -> &dyn ReadQueryLoadBalanceAlgorithm {
        self.load_balancer.as_ref()
    }

    pub fn strategy(&self) -> &DataSourceStrategy {
        &self.strategy
    }

    pub fn write_data_source(&self) -> String {
        self.strategy.write_data_source()
    }

    /// Read data sources that are currently enabled, in configured order.
    pub fn read_data_source_names(&self) -> Vec<String> {
        let mut names = self.strategy.read_data_sources();
        let disabled = self.disabled_data_source_names.read();
        if !disabled.is_empty() {
            names.retain(|name| !disabled.contains(name));
        }
        names
    }

    /// Mark a data source as disabled or enabled.
    ///
    /// Disabling an already disabled data source, or enabling one that isn't
    /// disabled, does nothing.
    pub fn update_disabled_data_source_names(&self, data_source_name: &str, disabled: bool) {
        let mut names = self.disabled_data_source_names.write();
        let changed = if disabled {
            names.insert(data_source_name.to_string())
        } else {
            names.remove(data_source_name)
        };

        if changed {
            debug!(rule = %self.name, data_source = %data_source_name, %disabled, "updated disabled data sources");
        }
    }

    /// Snapshot of the currently disabled data sources.
    pub fn disabled_data_source_names(&self) -> HashSet<String> {
        self.disabled_data_source_names.read().clone()
    }

    /// All data sources this rule spans, regardless of disabled state.
    pub fn data_source_mapper(&self) -> HashMap<String, IndexSet<String>> {
        self.strategy.data_source_mapper(&self.name)
    }

    /// Exportable view of the rule's data sources.
    ///
    /// If `remove_disabled` is set, disabled data sources are dropped from the
    /// replica list. Every other entry is returned as is.
    pub fn data_sources(&self, remove_disabled: bool) -> IndexMap<String, String> {
        let mut result = self.strategy.data_sources();
        if !remove_disabled {
            return result;
        }

        if let Some(value) = result.get_mut(REPLICA_DATA_SOURCE_NAMES) {
            *value = self.remove_disabled_data_sources(value);
        }
        result
    }

    fn remove_disabled_data_sources(&self, read_data_sources: &str) -> String {
        let disabled = self.disabled_data_source_names.read();
        if disabled.is_empty() {
            return read_data_sources.to_string();
        }

        read_data_sources
            .split(',')
            .map(str::trim)
            .filter(|name| !disabled.contains(*name))
            .collect::<Vec<_>>()
            .join(",")
    }
}
