use std::fmt;

/// A value a sharding column is compared against or assigned.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShardingValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
}

impl fmt::Display for ShardingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShardingValue::Null => write!(f, "NULL"),
            ShardingValue::Bool(v) => write!(f, "{v}"),
            ShardingValue::Int(v) => write!(f, "{v}"),
            ShardingValue::Text(v) => write!(f, "'{v}'"),
        }
    }
}

impl From<i64> for ShardingValue {
    fn from(value: i64) -> Self {
        ShardingValue::Int(value)
    }
}

impl From<&str> for ShardingValue {
    fn from(value: &str) -> Self {
        ShardingValue::Text(value.to_string())
    }
}

/// Values a single sharding column of a table takes in one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardingConditionValue {
    pub column_name: String,
    pub table_name: String,
    pub values: Vec<ShardingValue>,
}

impl ShardingConditionValue {
    pub fn new(
        column_name: impl Into<String>,
        table_name: impl Into<String>,
        values: Vec<ShardingValue>,
    ) -> Self {
        ShardingConditionValue {
            column_name: column_name.into(),
            table_name: table_name.into(),
            values,
        }
    }
}

impl fmt::Display for ShardingConditionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} IN (", self.table_name, self.column_name)?;
        for (idx, value) in self.values.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, ")")
    }
}

/// Sharding values extracted from one row of a statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShardingCondition {
    pub values: Vec<ShardingConditionValue>,
}

impl ShardingCondition {
    pub fn new(values: Vec<ShardingConditionValue>) -> Self {
        ShardingCondition { values }
    }
}

/// Sharding conditions for every row of a statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShardingConditions {
    conditions: Vec<ShardingCondition>,
    /// Rows come from a subquery whose results need merging before insert.
    needs_merge: bool,
}

impl ShardingConditions {
    pub fn new(conditions: Vec<ShardingCondition>, needs_merge: bool) -> Self {
        ShardingConditions {
            conditions,
            needs_merge,
        }
    }

    pub fn conditions(&self) -> &[ShardingCondition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub const fn needs_merge(&self) -> bool {
        self.needs_merge
    }

    /// Whether every row shards on the same value.
    ///
    /// True iff no row carries more than one condition value, and all rows
    /// carrying one carry an equal one.
    pub fn is_uniform(&self) -> bool {
        let mut first: Option<&ShardingConditionValue> = None;
        for condition in &self.conditions {
            match condition.values.as_slice() {
                [] => continue,
                [value] => match first {
                    Some(first) if first != value => return false,
                    Some(_) => (),
                    None => first = Some(value),
                },
                _ => return false,
            }
        }
        true
    }
}

impl fmt::Display for ShardingConditions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (row, condition) in self.conditions.iter().enumerate() {
            if row > 0 {
                write!(f, "; ")?;
            }
            for (idx, value) in condition.values.iter().enumerate() {
                if idx > 0 {
                    write!(f, " AND ")?;
                }
                write!(f, "{value}")?;
            }
        }
        write!(f, "]")
    }
}
