use std::collections::HashMap;

use ruleconfig::algorithm::{
    check_properties_empty,
    split_comma_list,
    take_bool_property,
    take_property,
};
use ruleconfig::{AlgorithmConfig, Properties};
use serde::{Deserialize, Serialize};

use crate::errors::{ReadwriteSplittingError, Result};

pub const STATIC_STRATEGY_TYPE: &str = "Static";
pub const DYNAMIC_STRATEGY_TYPE: &str = "Dynamic";

pub const WRITE_DATA_SOURCE_NAME_PROP: &str = "write-data-source-name";
pub const READ_DATA_SOURCE_NAMES_PROP: &str = "read-data-source-names";
pub const AUTO_AWARE_DATA_SOURCE_NAME_PROP: &str = "auto-aware-data-source-name";
pub const WRITE_DATA_SOURCE_QUERY_ENABLED_PROP: &str = "write-data-source-query-enabled";

/// Configuration for every read-write splitting rule of a database.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleConfiguration {
    #[serde(default)]
    pub data_sources: Vec<DataSourceRuleConfig>,
    /// Load balancer descriptors keyed by `<rule name>_<balancer type>`.
    #[serde(default)]
    pub load_balancers: HashMap<String, AlgorithmConfig>,
}

impl RuleConfiguration {
    /// Parse a rule configuration from json.
    pub fn from_json(s: &str) -> Result<Self> {
        let config = serde_json::from_str(s).map_err(ruleconfig::errors::ConfigError::from)?;
        Ok(config)
    }
}

/// Configuration for a single read-write splitting rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceRuleConfig {
    pub name: String,
    pub strategy: DataSourceStrategyConfig,
    pub load_balancer_name: String,
}

impl DataSourceRuleConfig {
    pub fn static_strategy(&self) -> Option<&StaticStrategyConfig> {
        match &self.strategy {
            DataSourceStrategyConfig::Static(s) => Some(s),
            DataSourceStrategyConfig::Dynamic(_) => None,
        }
    }

    pub fn dynamic_strategy(&self) -> Option<&DynamicStrategyConfig> {
        match &self.strategy {
            DataSourceStrategyConfig::Static(_) => None,
            DataSourceStrategyConfig::Dynamic(s) => Some(s),
        }
    }
}

/// How a rule finds its data sources.
///
/// Serialized as an [`AlgorithmConfig`]: the declared strategy type plus its
/// properties, resolved through [`DataSourceStrategyConfig::from_type_and_props`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AlgorithmConfig", into = "AlgorithmConfig")]
pub enum DataSourceStrategyConfig {
    Static(StaticStrategyConfig),
    Dynamic(DynamicStrategyConfig),
}

impl DataSourceStrategyConfig {
    pub const fn type_name(&self) -> &'static str {
        match self {
            DataSourceStrategyConfig::Static(_) => STATIC_STRATEGY_TYPE,
            DataSourceStrategyConfig::Dynamic(_) => DYNAMIC_STRATEGY_TYPE,
        }
    }

    /// Create a strategy config from its declared type and raw properties.
    ///
    /// Type names are matched case-insensitively. All properties must be
    /// consumed by the strategy.
    pub fn from_type_and_props(type_name: &str, mut props: Properties) -> Result<Self> {
        let config = if type_name.eq_ignore_ascii_case(STATIC_STRATEGY_TYPE) {
            let write_data_source_name = take_property(WRITE_DATA_SOURCE_NAME_PROP, &mut props)?;
            let read_data_source_names = props
                .remove(READ_DATA_SOURCE_NAMES_PROP)
                .map(|names| split_comma_list(&names))
                .unwrap_or_default();
            DataSourceStrategyConfig::Static(StaticStrategyConfig {
                write_data_source_name,
                read_data_source_names,
            })
        } else if type_name.eq_ignore_ascii_case(DYNAMIC_STRATEGY_TYPE) {
            let auto_aware_data_source_name =
                take_property(AUTO_AWARE_DATA_SOURCE_NAME_PROP, &mut props)?;
            let write_data_source_query_enabled =
                take_bool_property(WRITE_DATA_SOURCE_QUERY_ENABLED_PROP, &mut props, true)?;
            DataSourceStrategyConfig::Dynamic(DynamicStrategyConfig {
                auto_aware_data_source_name,
                write_data_source_query_enabled,
            })
        } else {
            return Err(ReadwriteSplittingError::UnknownStrategyType(
                type_name.to_string(),
            ));
        };

        check_properties_empty(&props)?;
        Ok(config)
    }

    /// The declared type and properties this config is created from.
    pub fn to_algorithm_config(&self) -> AlgorithmConfig {
        let mut props = Properties::new();
        match self {
            DataSourceStrategyConfig::Static(config) => {
                props.insert(
                    WRITE_DATA_SOURCE_NAME_PROP.to_string(),
                    config.write_data_source_name.clone(),
                );
                if !config.read_data_source_names.is_empty() {
                    props.insert(
                        READ_DATA_SOURCE_NAMES_PROP.to_string(),
                        config.read_data_source_names.join(","),
                    );
                }
            }
            DataSourceStrategyConfig::Dynamic(config) => {
                props.insert(
                    AUTO_AWARE_DATA_SOURCE_NAME_PROP.to_string(),
                    config.auto_aware_data_source_name.clone(),
                );
                props.insert(
                    WRITE_DATA_SOURCE_QUERY_ENABLED_PROP.to_string(),
                    config.write_data_source_query_enabled.to_string(),
                );
            }
        }
        AlgorithmConfig::new(self.type_name(), props)
    }
}

impl TryFrom<AlgorithmConfig> for DataSourceStrategyConfig {
    type Error = ReadwriteSplittingError;

    fn try_from(config: AlgorithmConfig) -> Result<Self> {
        Self::from_type_and_props(&config.type_name, config.props)
    }
}

impl From<DataSourceStrategyConfig> for AlgorithmConfig {
    fn from(config: DataSourceStrategyConfig) -> Self {
        config.to_algorithm_config()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticStrategyConfig {
    pub write_data_source_name: String,
    pub read_data_source_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicStrategyConfig {
    pub auto_aware_data_source_name: String,
    /// Whether the primary also serves reads.
    pub write_data_source_query_enabled: bool,
}
