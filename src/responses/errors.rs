use crate::errors::ServerError;
use crate::responses::json_response;
use crate::templates::error_page;
use astra::{Body, Response, ResponseBuilder};
use serde_json::json;

/// Turns a handler error into the response the caller expects: JSON for
/// the API routes the page script calls, an HTML page otherwise.
pub fn error_to_response(err: ServerError) -> Response {
    let status = err.status();
    if status >= 500 {
        tracing::error!(status, "request failed: {err}");
    } else {
        tracing::debug!(status, "request rejected: {err}");
    }

    let built = if err.is_json() {
        json_response(status, &json!({ "error": err.to_string() }))
    } else {
        ResponseBuilder::new()
            .status(status)
            .header("Content-Type", "text/html; charset=utf-8")
            .body(Body::from(error_page(status, &err.to_string()).into_string()))
            .map_err(|_| ServerError::InternalError)
    };

    built.unwrap_or_else(|_| Response::new(Body::from("Internal Server Error")))
}
