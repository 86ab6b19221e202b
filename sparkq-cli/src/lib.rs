//! # SparkQ CLI
//!
//! A thin command-line client for the SparkQ HTTP API. Every subcommand is
//! a single request plus a JSON print — there's no scheduling logic here,
//! that all lives in `sparkq-core`/`sparkq-api`.
//!
//! ## Modules
//!
//! - `client`: minimal `reqwest` wrapper, error mapping from the API's
//!   `{"detail","code"}` body
//! - `commands`: one module per resource (`session`, `queue`, `task`)

pub mod client;
pub mod commands;
