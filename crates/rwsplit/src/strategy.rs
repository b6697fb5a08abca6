use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use tracing::trace;

use crate::config::{DataSourceStrategyConfig, DynamicStrategyConfig, StaticStrategyConfig};
use crate::errors::{ReadwriteSplittingError, Result};

/// Export key holding the write data source name.
pub const PRIMARY_DATA_SOURCE_NAME: &str = "primary_data_source_name";
/// Export key holding the comma separated read data source names.
pub const REPLICA_DATA_SOURCE_NAMES: &str = "replica_data_source_names";
/// Export key holding the auto-aware resource name.
pub const AUTO_AWARE_DATA_SOURCE_NAME: &str = "auto_aware_data_source_name";

/// Roles of the data sources in an auto-aware resource at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataSourceRoles {
    /// The primary (write) data source, if known.
    pub primary: Option<String>,
    /// The replica (read) data sources.
    pub replicas: Vec<String>,
}

/// Resolves the current roles of data sources inside an auto-aware resource.
///
/// Freshness of the answers is up to the implementation. Strategies call into
/// this once per lookup and never cache.
pub trait AutoAwareDiscovery: Sync + Send + Debug {
    /// Primary and replicas of the resource, taken as a single snapshot.
    fn data_source_roles(&self, resource: &str) -> DataSourceRoles;
}

/// How a rule resolves its write and read data sources.
#[derive(Debug)]
pub enum DataSourceStrategy {
    Static(StaticDataSourceStrategy),
    Dynamic(DynamicDataSourceStrategy),
}

impl DataSourceStrategy {
    /// Create the strategy backing a rule.
    ///
    /// Dynamic strategies require a discovery service.
    pub fn new(
        config: &DataSourceStrategyConfig,
        discovery: Option<&Arc<dyn AutoAwareDiscovery>>,
    ) -> Result<Self> {
        match config {
            DataSourceStrategyConfig::Static(config) => {
                Ok(DataSourceStrategy::Static(StaticDataSourceStrategy::new(config)))
            }
            DataSourceStrategyConfig::Dynamic(config) => {
                let discovery = discovery.ok_or_else(|| {
                    ReadwriteSplittingError::MissingDiscovery(
                        config.auto_aware_data_source_name.clone(),
                    )
                })?;
                Ok(DataSourceStrategy::Dynamic(DynamicDataSourceStrategy::new(
                    config,
                    discovery.clone(),
                )))
            }
        }
    }

    pub const fn type_name(&self) -> &'static str {
        match self {
            DataSourceStrategy::Static(_) => crate::config::STATIC_STRATEGY_TYPE,
            DataSourceStrategy::Dynamic(_) => crate::config::DYNAMIC_STRATEGY_TYPE,
        }
    }

    pub fn write_data_source(&self) -> String {
        match self {
            DataSourceStrategy::Static(s) => s.write_data_source(),
            DataSourceStrategy::Dynamic(s) => s.write_data_source(),
        }
    }

    pub fn read_data_sources(&self) -> Vec<String> {
        match self {
            DataSourceStrategy::Static(s) => s.read_data_sources(),
            DataSourceStrategy::Dynamic(s) => s.read_data_sources(),
        }
    }

    /// Raw exportable view of the strategy.
    pub fn data_sources(&self) -> IndexMap<String, String> {
        match self {
            DataSourceStrategy::Static(s) => s.data_sources(),
            DataSourceStrategy::Dynamic(s) => s.data_sources(),
        }
    }

    /// All data sources the rule spans, keyed by rule name.
    pub fn data_source_mapper(&self, rule_name: &str) -> HashMap<String, IndexSet<String>> {
        let (write, reads) = match self {
            DataSourceStrategy::Static(s) => (s.write_data_source(), s.read_data_sources()),
            DataSourceStrategy::Dynamic(s) => {
                let roles = s.roles();
                (s.write_from(&roles), s.reads_from(roles))
            }
        };

        let mut names = IndexSet::new();
        if !write.is_empty() {
            names.insert(write);
        }
        names.extend(reads);

        let mut mapper = HashMap::with_capacity(1);
        mapper.insert(rule_name.to_string(), names);
        mapper
    }
}

/// Write and read data sources fixed by configuration.
#[derive(Debug, Clone)]
pub struct StaticDataSourceStrategy {
    write_data_source_name: String,
    read_data_source_names: Vec<String>,
}

impl StaticDataSourceStrategy {
    pub fn new(config: &StaticStrategyConfig) -> Self {
        StaticDataSourceStrategy {
            write_data_source_name: config.write_data_source_name.clone(),
            read_data_source_names: config.read_data_source_names.clone(),
        }
    }

    pub fn write_data_source(&self) -> String {
        self.write_data_source_name.clone()
    }

    pub fn read_data_sources(&self) -> Vec<String> {
        self.read_data_source_names.clone()
    }

    pub fn data_sources(&self) -> IndexMap<String, String> {
        let mut result = IndexMap::with_capacity(2);
        result.insert(
            PRIMARY_DATA_SOURCE_NAME.to_string(),
            self.write_data_source_name.clone(),
        );
        result.insert(
            REPLICA_DATA_SOURCE_NAMES.to_string(),
            self.read_data_source_names.join(","),
        );
        result
    }
}

/// Write and read data sources discovered from an auto-aware resource.
#[derive(Debug, Clone)]
pub struct DynamicDataSourceStrategy {
    auto_aware_data_source_name: String,
    /// Whether the primary also serves reads.
    write_data_source_query_enabled: bool,
    discovery: Arc<dyn AutoAwareDiscovery>,
}

impl DynamicDataSourceStrategy {
    pub fn new(config: &DynamicStrategyConfig, discovery: Arc<dyn AutoAwareDiscovery>) -> Self {
        DynamicDataSourceStrategy {
            auto_aware_data_source_name: config.auto_aware_data_source_name.clone(),
            write_data_source_query_enabled: config.write_data_source_query_enabled,
            discovery,
        }
    }

    pub fn auto_aware_data_source_name(&self) -> &str {
        &self.auto_aware_data_source_name
    }

    fn roles(&self) -> DataSourceRoles {
        self.discovery
            .data_source_roles(&self.auto_aware_data_source_name)
    }

    fn write_from(&self, roles: &DataSourceRoles) -> String {
        roles.primary.clone().unwrap_or_default()
    }

    fn reads_from(&self, roles: DataSourceRoles) -> Vec<String> {
        let mut names = roles.replicas;
        if self.write_data_source_query_enabled {
            match roles.primary {
                Some(primary) if !primary.is_empty() && !names.contains(&primary) => {
                    names.push(primary)
                }
                _ => (),
            }
        }

        trace!(resource = %self.auto_aware_data_source_name, ?names, "discovered read data sources");
        names
    }

    /// Discovered primary, or an empty string if discovery doesn't know one
    /// yet.
    pub fn write_data_source(&self) -> String {
        self.write_from(&self.roles())
    }

    pub fn read_data_sources(&self) -> Vec<String> {
        self.reads_from(self.roles())
    }

    pub fn data_sources(&self) -> IndexMap<String, String> {
        let roles = self.roles();
        let mut result = IndexMap::with_capacity(3);
        result.insert(
            AUTO_AWARE_DATA_SOURCE_NAME.to_string(),
            self.auto_aware_data_source_name.clone(),
        );
        result.insert(
            PRIMARY_DATA_SOURCE_NAME.to_string(),
            self.write_from(&roles),
        );
        result.insert(
            REPLICA_DATA_SOURCE_NAMES.to_string(),
            roles.replicas.join(","),
        );
        result
    }
}
