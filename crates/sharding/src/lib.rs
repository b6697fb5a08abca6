//! Safety validation for INSERT statements against sharded tables.
//!
//! Parsing, routing and execution happen elsewhere. The validators here sit
//! before and after routing and reject any statement whose effects can't be
//! applied safely across shards.
pub mod condition;
pub mod datanode;
pub mod errors;
pub mod route;
pub mod rule;
pub mod statement;
pub mod validator;

#[cfg(test)]
pub(crate) mod testutil;
