#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown property: '{0}'")]
    UnknownProperty(String),

    #[error("Missing required property: '{0}'")]
    MissingProperty(String),

    #[error("Invalid value '{value}' for property '{name}', expected {expected}")]
    InvalidPropertyValue {
        name: String,
        value: String,
        expected: &'static str,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = ConfigError> = std::result::Result<T, E>;
