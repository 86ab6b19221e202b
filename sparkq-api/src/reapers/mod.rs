/// Background reapers
///
/// Two independent periodic workers, launched from `main.rs` alongside the
/// HTTP server and cancelled together at shutdown: `auto_fail` (stale-task
/// timeout enforcement) and `purge` (terminal-task retention).
pub mod auto_fail;
pub mod purge;
