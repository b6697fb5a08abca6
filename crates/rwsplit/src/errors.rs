#[derive(Debug, thiserror::Error)]
pub enum ReadwriteSplittingError {
    #[error("Readwrite-splitting rule name is required")]
    MissingRuleName,

    #[error("Duplicate readwrite-splitting rule name: '{0}'")]
    DuplicateRuleName(String),

    #[error("Readwrite-splitting rule not found: '{0}'")]
    RuleNotFound(String),

    #[error("Unknown data source strategy type: '{0}'")]
    UnknownStrategyType(String),

    #[error("Auto-aware resource '{0}' requires a discovery service")]
    MissingDiscovery(String),

    #[error("Unknown load balancer type: '{0}'")]
    UnknownLoadBalancer(String),

    #[error("Duplicate load balancer type: '{0}'")]
    DuplicateLoadBalancer(String),

    #[error("Load balancer '{load_balancer}' for rule '{rule}' is not configured")]
    MissingLoadBalancerConfig { rule: String, load_balancer: String },

    #[error("Invalid properties for load balancer '{load_balancer}': {reason}")]
    InvalidLoadBalancerProps {
        load_balancer: String,
        reason: String,
    },

    #[error(transparent)]
    Config(#[from] ruleconfig::errors::ConfigError),
}

pub type Result<T, E = ReadwriteSplittingError> = std::result::Result<T, E>;
