use std::collections::HashMap;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::balance::LoadBalancerRegistry;
use crate::config::RuleConfiguration;
use crate::datasource_rule::DataSourceRule;
use crate::errors::{ReadwriteSplittingError, Result};
use crate::strategy::AutoAwareDiscovery;

/// All read-write splitting rules of a database.
#[derive(Debug)]
pub struct ReadwriteSplittingRule {
    config: RuleConfiguration,
    /// Rules keyed by name, in configured order.
    data_source_rules: IndexMap<String, Arc<DataSourceRule>>,
}

impl ReadwriteSplittingRule {
    /// Build every data source rule in the configuration.
    ///
    /// Load balancers are resolved through `registry`. `discovery` is required
    /// only if some rule uses a dynamic strategy.
    pub fn new(
        config: RuleConfiguration,
        registry: &LoadBalancerRegistry,
        discovery: Option<Arc<dyn AutoAwareDiscovery>>,
    ) -> Result<Self> {
        let mut data_source_rules = IndexMap::with_capacity(config.data_sources.len());

        for ds_config in &config.data_sources {
            let lb_config = config
                .load_balancers
                .get(&ds_config.load_balancer_name)
                .ok_or_else(|| ReadwriteSplittingError::MissingLoadBalancerConfig {
                    rule: ds_config.name.clone(),
                    load_balancer: ds_config.load_balancer_name.clone(),
                })?;
            let load_balancer = registry.create(lb_config)?;
            let rule = DataSourceRule::new(ds_config, load_balancer, discovery.as_ref())?;

            if data_source_rules
                .insert(ds_config.name.clone(), Arc::new(rule))
                .is_some()
            {
                return Err(ReadwriteSplittingError::DuplicateRuleName(
                    ds_config.name.clone(),
                ));
            }
        }

        debug!(rules = data_source_rules.len(), "built readwrite-splitting rule");

        Ok(ReadwriteSplittingRule {
            config,
            data_source_rules,
        })
    }

    pub fn config(&self) -> &RuleConfiguration {
        &self.config
    }

    pub fn find_data_source_rule(&self, name: &str) -> Option<&Arc<DataSourceRule>> {
        self.data_source_rules.get(name)
    }

    pub fn data_source_rules(&self) -> impl Iterator<Item = &Arc<DataSourceRule>> {
        self.data_source_rules.values()
    }

    /// Data sources spanned by every rule, keyed by rule name.
    pub fn data_source_mapper(&self) -> HashMap<String, IndexSet<String>> {
        let mut mapper = HashMap::with_capacity(self.data_source_rules.len());
        for rule in self.data_source_rules.values() {
            mapper.extend(rule.data_source_mapper());
        }
        mapper
    }

    /// Disable or enable a data source within the named rule.
    pub fn update_status(
        &self,
        rule_name: &str,
        data_source_name: &str,
        disabled: bool,
    ) -> Result<()> {
        let rule = self
            .data_source_rules
            .get(rule_name)
            .ok_or_else(|| ReadwriteSplittingError::RuleNotFound(rule_name.to_string()))?;
        rule.update_disabled_data_source_names(data_source_name, disabled);
        Ok(())
    }

    /// Exportable data sources of every rule, keyed by rule name.
    pub fn export_data_sources(
        &self,
        remove_disabled: bool,
    ) -> IndexMap<String, IndexMap<String, String>> {
        self.data_source_rules
            .iter()
            .map(|(name, rule)| (name.clone(), rule.data_sources(remove_disabled)))
            .collect()
    }
}
