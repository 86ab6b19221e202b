//! # SparkQ API Server Library
//!
//! The HTTP surface for SparkQ: request decoding, validation, routing to
//! `sparkq-core`'s Scheduler/Store, response encoding, error mapping, and
//! the two background reapers.
//!
//! ## Modules
//!
//! - `app`: application state and router builder
//! - `error`: error handling and HTTP response mapping
//! - `routes`: API route handlers
//! - `reapers`: auto-fail and purge background workers
//! - `lockfile`: single-instance lockfile
//! - `static_assets`: dashboard asset serving

pub mod app;
pub mod error;
pub mod lockfile;
pub mod middleware;
pub mod reapers;
pub mod routes;
pub mod static_assets;
