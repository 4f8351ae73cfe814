use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use core_config::tracing::REQUEST_LOG_TARGET;
use uuid::Uuid;

/// Header carrying the per-request id, on the request and the response.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Tags each request with a fresh id and writes one line per request to the
/// request log target.
///
/// ```ignore
/// let app = Router::new().layer(axum::middleware::from_fn(request_log));
/// ```
pub async fn request_log(mut req: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let header = HeaderValue::from_str(&request_id.to_string()).ok();

    if let Some(value) = &header {
        req.headers_mut().insert(REQUEST_ID_HEADER, value.clone());
    }

    tracing::info!(
        target: REQUEST_LOG_TARGET,
        %request_id,
        method = %req.method(),
        uri = %req.uri(),
        "request"
    );

    let mut response = next.run(req).await;
    if let Some(value) = header {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
