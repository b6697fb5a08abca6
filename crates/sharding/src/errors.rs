use crate::condition::ShardingConditions;

#[derive(Debug, thiserror::Error)]
pub enum ShardingError {
    #[error(
        "INSERT INTO ... SELECT into '{table}' can not apply key generator without the generate key column"
    )]
    MissingGenerateKeyColumnWithInsertSelect { table: String },

    #[error(
        "INSERT INTO ... SELECT into '{table}' can only use the same table or binding tables, got {tables:?}"
    )]
    InsertSelectTableViolation { table: String, tables: Vec<String> },

    #[error("Can not support operation '{operation}' with sharding table '{table}'")]
    UnsupportedShardingOperation {
        operation: &'static str,
        table: String,
    },

    #[error("Can not update sharding value for table '{table}'")]
    UnsupportedUpdatingShardingValue { table: String },

    #[error(
        "Can not insert into table '{table}', the record routes to multiple data nodes; sharding conditions: {conditions}"
    )]
    DuplicateInsertDataRecord {
        conditions: ShardingConditions,
        table: String,
    },

    #[error("Can not support DML operation with multiple tables {tables:?}")]
    DmlWithMultipleShardingTables { tables: Vec<String> },

    #[error("Parameter index {index} out of range, statement has {len} parameters")]
    ParameterIndexOutOfRange { index: usize, len: usize },

    #[error("Invalid data node '{0}', expected '<data source>.<table>'")]
    InvalidDataNode(String),

    #[error("Failed to route table '{table}': {reason}")]
    Route { table: String, reason: String },
}

pub type Result<T, E = ShardingError> = std::result::Result<T, E>;
