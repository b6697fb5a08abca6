use std::collections::HashMap;
use std::sync::LazyLock;

use tracing::debug;

use crate::algorithm::{Properties, parse_bool};
use crate::errors::{ConfigError, Result};

/// Kernel properties consulted while routing and validating statements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigurationProperties {
    /// Log each routed/validated statement at info level.
    pub sql_show: bool,
    /// When showing sql, omit parameter values.
    pub sql_simple: bool,
}

impl ConfigurationProperties {
    /// Build properties from a raw key-value map, starting from defaults.
    ///
    /// Errors on unknown keys.
    pub fn from_properties(props: &Properties) -> Result<Self> {
        let mut conf = Self::default();
        for (name, value) in props {
            conf.set(name, value)?;
        }
        Ok(conf)
    }

    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        let func = PROPERTY_FUNCTIONS
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProperty(name.to_string()))?;

        debug!(%name, %value, "setting configuration property");
        (func.set)(value, self)
    }

    pub fn get(&self, name: &str) -> Result<String> {
        let func = PROPERTY_FUNCTIONS
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProperty(name.to_string()))?;

        Ok((func.get)(self))
    }

    pub fn reset(&mut self, name: &str) -> Result<()> {
        let def_conf = Self::default();

        let func = PROPERTY_FUNCTIONS
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProperty(name.to_string()))?;

        let value = (func.get)(&def_conf);
        (func.set)(&value, self)
    }

    /// Names of all known properties, sorted.
    pub fn property_names() -> Vec<&'static str> {
        let mut names: Vec<_> = PROPERTY_FUNCTIONS.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

struct PropertyFunctions {
    set: fn(value: &str, conf: &mut ConfigurationProperties) -> Result<()>,
    get: fn(conf: &ConfigurationProperties) -> String,
}

impl PropertyFunctions {
    const fn new<P: ConfigurationProperty>() -> Self {
        PropertyFunctions {
            set: P::set_from_str as _,
            get: P::get_as_string as _,
        }
    }
}

fn insert_property<P: ConfigurationProperty>(map: &mut HashMap<&'static str, PropertyFunctions>) {
    if map.insert(P::NAME, PropertyFunctions::new::<P>()).is_some() {
        panic!("Duplicate property names: {}", P::NAME);
    }
}

static PROPERTY_FUNCTIONS: LazyLock<HashMap<&'static str, PropertyFunctions>> =
    LazyLock::new(|| {
        let mut map = HashMap::new();

        insert_property::<SqlShow>(&mut map);
        insert_property::<SqlSimple>(&mut map);

        map
    });

pub trait ConfigurationProperty: Sync + Send + 'static {
    const NAME: &'static str;
    const DESCRIPTION: &'static str;

    fn set_from_str(value: &str, conf: &mut ConfigurationProperties) -> Result<()>;
    fn get_as_string(conf: &ConfigurationProperties) -> String;
}

pub struct SqlShow;

impl ConfigurationProperty for SqlShow {
    const NAME: &'static str = "sql-show";
    const DESCRIPTION: &'static str = "Log routing and validation decisions for each statement.";

    fn set_from_str(value: &str, conf: &mut ConfigurationProperties) -> Result<()> {
        conf.sql_show = parse_bool(Self::NAME, value)?;
        Ok(())
    }

    fn get_as_string(conf: &ConfigurationProperties) -> String {
        conf.sql_show.to_string()
    }
}

pub struct SqlSimple;

impl ConfigurationProperty for SqlSimple {
    const NAME: &'static str = "sql-simple";
    const DESCRIPTION: &'static str = "Omit parameter values when showing sql.";

    fn set_from_str(value: &str, conf: &mut ConfigurationProperties) -> Result<()> {
        conf.sql_simple = parse_bool(Self::NAME, value)?;
        Ok(())
    }

    fn get_as_string(conf: &ConfigurationProperties) -> String {
        conf.sql_simple.to_string()
    }
}
