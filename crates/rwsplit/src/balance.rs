//! Load balancing across read data sources.
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rand::Rng;
use ruleconfig::{AlgorithmConfig, Properties};
use tracing::debug;

use crate::errors::{ReadwriteSplittingError, Result};

pub const ROUND_ROBIN: &str = "ROUND_ROBIN";
pub const RANDOM: &str = "RANDOM";
pub const WEIGHT: &str = "WEIGHT";

/// Picks the read data source that serves a query.
pub trait ReadQueryLoadBalanceAlgorithm: Sync + Send + Debug {
    fn type_name(&self) -> &str;

    /// Choose one of `read_data_source_names`.
    ///
    /// Callers must pass a non-empty list.
    fn get_data_source(
        &self,
        rule_name: &str,
        write_data_source_name: &str,
        read_data_source_names: &[String],
    ) -> String;
}

/// Builds a load balancer from its properties.
pub type LoadBalancerFactory = fn(&Properties) -> Result<Arc<dyn ReadQueryLoadBalanceAlgorithm>>;

/// Registry of load balancer factories keyed by type name.
///
/// Type names are stored upper case and looked up case-insensitively.
#[derive(Debug, Default)]
pub struct LoadBalancerRegistry {
    factories: HashMap<String, LoadBalancerFactory>,
}

impl LoadBalancerRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry containing the built-in load balancers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .factories
            .insert(ROUND_ROBIN.to_string(), RoundRobinLoadBalancer::create);
        registry
            .factories
            .insert(RANDOM.to_string(), RandomLoadBalancer::create);
        registry
            .factories
            .insert(WEIGHT.to_string(), WeightLoadBalancer::create);
        registry
    }

    pub fn with_load_balancer(
        mut self,
        type_name: impl Into<String>,
        factory: LoadBalancerFactory,
    ) -> Result<Self> {
        let type_name = type_name.into().to_ascii_uppercase();
        if self.factories.contains_key(&type_name) {
            return Err(ReadwriteSplittingError::DuplicateLoadBalancer(type_name));
        }
        self.factories.insert(type_name, factory);
        Ok(self)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.factories
            .contains_key(&type_name.to_ascii_uppercase())
    }

    /// Create a load balancer from its descriptor.
    pub fn create(&self, config: &AlgorithmConfig) -> Result<Arc<dyn ReadQueryLoadBalanceAlgorithm>> {
        let factory = self
            .factories
            .get(&config.type_name.to_ascii_uppercase())
            .ok_or_else(|| ReadwriteSplittingError::UnknownLoadBalancer(config.type_name.clone()))?;

        debug!(type_name = %config.type_name, props = ?config.props, "creating load balancer");
        factory(&config.props)
    }
}

fn check_no_props(type_name: &str, props: &Properties) -> Result<()> {
    match props.keys().next() {
        Some(key) => Err(ReadwriteSplittingError::InvalidLoadBalancerProps {
            load_balancer: type_name.to_string(),
            reason: format!("unexpected property '{key}'"),
        }),
        None => Ok(()),
    }
}

/// Cycles through read data sources in order.
#[derive(Debug, Default)]
pub struct RoundRobinLoadBalancer {
    count: AtomicUsize,
}

impl RoundRobinLoadBalancer {
    fn create(props: &Properties) -> Result<Arc<dyn ReadQueryLoadBalanceAlgorithm>> {
        check_no_props(ROUND_ROBIN, props)?;
        Ok(Arc::new(Self::default()))
    }
}

impl ReadQueryLoadBalanceAlgorithm for RoundRobinLoadBalancer {
    fn type_name(&self) -> &str {
        ROUND_ROBIN
    }

    fn get_data_source(
        &self,
        _rule_name: &str,
        _write_data_source_name: &str,
        read_data_source_names: &[String],
    ) -> String {
        let idx = self.count.fetch_add(1, Ordering::Relaxed) % read_data_source_names.len();
        read_data_source_names[idx].clone()
    }
}

/// Picks a read data source uniformly at random.
#[derive(Debug, Default)]
pub struct RandomLoadBalancer;

impl RandomLoadBalancer {
    fn create(props: &Properties) -> Result<Arc<dyn ReadQueryLoadBalanceAlgorithm>> {
        check_no_props(RANDOM, props)?;
        Ok(Arc::new(RandomLoadBalancer))
    }
}

impl ReadQueryLoadBalanceAlgorithm for RandomLoadBalancer {
    fn type_name(&self) -> &str {
        RANDOM
    }

    fn get_data_source(
        &self,
        _rule_name: &str,
        _write_data_source_name: &str,
        read_data_source_names: &[String],
    ) -> String {
        let idx = rand::rng().random_range(0..read_data_source_names.len());
        read_data_source_names[idx].clone()
    }
}

/// Picks a read data source at random, proportionally to configured weights.
///
/// Properties map data source names to positive weights. Data sources without
/// a weight are never picked unless none of the candidates has one, in which
/// case the first candidate is used.
#[derive(Debug)]
pub struct WeightLoadBalancer {
    weights: HashMap<String, f64>,
}

impl WeightLoadBalancer {
    fn create(props: &Properties) -> Result<Arc<dyn ReadQueryLoadBalanceAlgorithm>> {
        let mut weights = HashMap::with_capacity(props.len());
        for (name, value) in props {
            let weight: f64 = value.trim().parse().map_err(|_| {
                ReadwriteSplittingError::InvalidLoadBalancerProps {
                    load_balancer: WEIGHT.to_string(),
                    reason: format!("weight '{value}' for '{name}' is not a number"),
                }
            })?;
            if !weight.is_finite() || weight <= 0.0 {
                return Err(ReadwriteSplittingError::InvalidLoadBalancerProps {
                    load_balancer: WEIGHT.to_string(),
                    reason: format!("weight for '{name}' must be positive, got {weight}"),
                });
            }
            weights.insert(name.clone(), weight);
        }

        let total: f64 = weights.values().sum();
        if !total.is_finite() {
            return Err(ReadwriteSplittingError::InvalidLoadBalancerProps {
                load_balancer: WEIGHT.to_string(),
                reason: format!("sum of weights must be finite, got {total}"),
            });
        }

        Ok(Arc::new(WeightLoadBalancer { weights }))
    }

    /// Pick the candidate the cumulative weight `point` falls into.
    fn pick(&self, read_data_source_names: &[String], point: f64) -> Option<String> {
        let mut cumulative = 0.0;
        let mut last = None;
        for name in read_data_source_names {
            if let Some(weight) = self.weights.get(name) {
                cumulative += weight;
                last = Some(name);
                if point < cumulative {
                    return Some(name.clone());
                }
            }
        }
        // Float rounding can leave `point` at the very top of the range.
        last.cloned()
    }

    fn total_weight(&self, read_data_source_names: &[String]) -> f64 {
        read_data_source_names
            .iter()
            .filter_map(|name| self.weights.get(name))
            .sum()
    }
}

impl ReadQueryLoadBalanceAlgorithm for WeightLoadBalancer {
    fn type_name(&self) -> &str {
        WEIGHT
    }

    fn get_data_source(
        &self,
        _rule_name: &str,
        _write_data_source_name: &str,
        read_data_source_names: &[String],
    ) -> String {
        let total = self.total_weight(read_data_source_names);
        if total <= 0.0 {
            return read_data_source_names[0].clone();
        }

        let point = rand::rng().random_range(0.0..total);
        self.pick(read_data_source_names, point)
            .unwrap_or_else(|| read_data_source_names[0].clone())
    }
}
