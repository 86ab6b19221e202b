/// Middleware modules for the API server
///
/// - `security`: security response headers
/// - `request_id`: per-request correlation id, inserted into the tracing span
pub mod request_id;
pub mod security;
