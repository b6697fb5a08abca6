//! Configuration types shared by the sharding and read-write splitting rules.
pub mod algorithm;
pub mod errors;
pub mod hint;
pub mod props;

pub use algorithm::{AlgorithmConfig, Properties};
pub use hint::HintValueContext;
pub use props::ConfigurationProperties;
