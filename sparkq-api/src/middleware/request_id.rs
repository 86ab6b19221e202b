/// Request correlation id middleware
///
/// Stamps every request with a short opaque id, echoed back as
/// `X-Request-Id` and attached to the tracing span so log lines for a
/// single request can be correlated, including the scrubbed 500 logged by
/// `ApiError::Internal`.
use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use sparkq_core::ids;

const HEADER_NAME: &str = "x-request-id";

pub async fn request_id_layer(mut req: Request, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(HEADER_NAME)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| ids::generate("req_"));

    req.extensions_mut().insert(RequestId(request_id.clone()));

    let span = tracing::info_span!("request", request_id = %request_id);
    let _guard = span.enter();

    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(HEADER_NAME, value);
    }
    response
}

#[derive(Debug, Clone)]
pub struct RequestId(pub String);
