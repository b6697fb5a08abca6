//! Read-write splitting rules.
//!
//! A rule groups one write data source with a set of read data sources. The
//! write/read membership is either configured statically or discovered at
//! runtime from an auto-aware resource. Read data sources can be disabled
//! and re-enabled by health checks without touching the configuration.
pub mod balance;
pub mod config;
pub mod converter;
pub mod datasource_rule;
pub mod errors;
pub mod router;
pub mod rule;
pub mod strategy;
