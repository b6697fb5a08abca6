use std::fmt;
use std::str::FromStr;

use crate::errors::ShardingError;

/// A physical table in a physical data source.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DataNode {
    pub data_source_name: String,
    pub table_name: String,
}

impl DataNode {
    pub fn new(data_source_name: impl Into<String>, table_name: impl Into<String>) -> Self {
        DataNode {
            data_source_name: data_source_name.into(),
            table_name: table_name.into(),
        }
    }
}

impl FromStr for DataNode {
    type Err = ShardingError;

    /// Parse `<data source>.<table>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((ds, table)) if !ds.is_empty() && !table.is_empty() && !table.contains('.') => {
                Ok(DataNode::new(ds, table))
            }
            _ => Err(ShardingError::InvalidDataNode(s.to_string())),
        }
    }
}

impl fmt::Display for DataNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.data_source_name, self.table_name)
    }
}
