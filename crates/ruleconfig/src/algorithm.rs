use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{ConfigError, Result};

/// Key-value properties attached to an algorithm or strategy.
///
/// Ordered so that exported configuration is stable.
pub type Properties = BTreeMap<String, String>;

/// Descriptor for a pluggable algorithm, e.g. a load balancer.
///
/// Descriptors are immutable once produced from a rule definition. Resolving a
/// descriptor into an actual algorithm is the job of whichever registry owns
/// that algorithm kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmConfig {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub props: Properties,
}

impl AlgorithmConfig {
    pub fn new(type_name: impl Into<String>, props: Properties) -> Self {
        AlgorithmConfig {
            type_name: type_name.into(),
            props,
        }
    }
}

/// Take a property from the map, returning an error if it doesn't exist.
pub fn take_property(name: &str, props: &mut Properties) -> Result<String> {
    props
        .remove(name)
        .ok_or_else(|| ConfigError::MissingProperty(name.to_string()))
}

/// Take an optional boolean property, falling back to `default` if absent.
pub fn take_bool_property(name: &str, props: &mut Properties, default: bool) -> Result<bool> {
    match props.remove(name) {
        Some(value) => parse_bool(name, &value),
        None => Ok(default),
    }
}

/// Check that all properties have been consumed, erroring on the first
/// leftover.
pub fn check_properties_empty(props: &Properties) -> Result<()> {
    match props.keys().next() {
        Some(name) => Err(ConfigError::UnknownProperty(name.clone())),
        None => Ok(()),
    }
}

/// Split a comma separated list, trimming whitespace around each entry and
/// dropping empty entries.
pub fn split_comma_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub(crate) fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "1" => Ok(true),
        "false" | "off" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidPropertyValue {
            name: name.to_string(),
            value: value.to_string(),
            expected: "a boolean",
        }),
    }
}
