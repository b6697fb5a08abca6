//! Conversion of parsed readwrite-splitting rule definitions into rule
//! configuration.
use std::collections::HashMap;

use ruleconfig::{AlgorithmConfig, Properties};

use crate::config::{
    DataSourceRuleConfig,
    DataSourceStrategyConfig,
    DynamicStrategyConfig,
    RuleConfiguration,
    StaticStrategyConfig,
};

/// Load balancer as written in a rule definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmSegment {
    pub name: String,
    pub props: Properties,
}

impl AlgorithmSegment {
    pub fn new(name: impl Into<String>, props: Properties) -> Self {
        AlgorithmSegment {
            name: name.into(),
            props,
        }
    }
}

/// Where a rule segment gets its data sources from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSegmentSource {
    Static {
        write_data_source: String,
        read_data_sources: Option<Vec<String>>,
    },
    Dynamic {
        auto_aware_resource: String,
    },
}

/// A single parsed readwrite-splitting rule definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSegment {
    pub name: String,
    pub source: RuleSegmentSource,
    pub load_balancer: AlgorithmSegment,
}

impl RuleSegment {
    pub fn new_static(
        name: impl Into<String>,
        write_data_source: impl Into<String>,
        read_data_sources: Option<Vec<String>>,
        load_balancer: AlgorithmSegment,
    ) -> Self {
        RuleSegment {
            name: name.into(),
            source: RuleSegmentSource::Static {
                write_data_source: write_data_source.into(),
                read_data_sources,
            },
            load_balancer,
        }
    }

    pub fn new_dynamic(
        name: impl Into<String>,
        auto_aware_resource: impl Into<String>,
        load_balancer: AlgorithmSegment,
    ) -> Self {
        RuleSegment {
            name: name.into(),
            source: RuleSegmentSource::Dynamic {
                auto_aware_resource: auto_aware_resource.into(),
            },
            load_balancer,
        }
    }

    /// Key the segment's load balancer is registered under.
    pub fn load_balancer_name(&self) -> String {
        format!("{}_{}", self.name, self.load_balancer.name)
    }
}

/// Convert rule segments into a rule configuration.
///
/// Each segment produces exactly one data source entry and one load balancer
/// entry, keyed by `<rule name>_<balancer type>` so that two rules using the
/// same balancer type never share an entry. Segment order is preserved.
pub fn convert<'a>(segments: impl IntoIterator<Item = &'a RuleSegment>) -> RuleConfiguration {
    let mut data_sources = Vec::new();
    let mut load_balancers = HashMap::new();

    for segment in segments {
        let load_balancer_name = segment.load_balancer_name();
        data_sources.push(convert_data_source(segment, load_balancer_name.clone()));
        load_balancers.insert(
            load_balancer_name,
            AlgorithmConfig::new(
                segment.load_balancer.name.clone(),
                segment.load_balancer.props.clone(),
            ),
        );
    }

    RuleConfiguration {
        data_sources,
        load_balancers,
    }
}

fn convert_data_source(segment: &RuleSegment, load_balancer_name: String) -> DataSourceRuleConfig {
    let strategy = match &segment.source {
        RuleSegmentSource::Static {
            write_data_source,
            read_data_sources,
        } => DataSourceStrategyConfig::Static(StaticStrategyConfig {
            write_data_source_name: write_data_source.clone(),
            read_data_source_names: read_data_sources.clone().unwrap_or_default(),
        }),
        RuleSegmentSource::Dynamic {
            auto_aware_resource,
        } => DataSourceStrategyConfig::Dynamic(DynamicStrategyConfig {
            auto_aware_data_source_name: auto_aware_resource.clone(),
            write_data_source_query_enabled: true,
        }),
    };

    DataSourceRuleConfig {
        name: segment.name.clone(),
        strategy,
        load_balancer_name,
    }
}
