use poem::http::StatusCode;
use poem::web::Json;
use poem::{IntoResponse, Response};
use serde::Serialize;

pub const ERROR_MESSAGE: &str = "An error occurred while processing your request";

/// JSON error body: `{"error": "…"}`.
#[derive(Serialize)]
pub struct ErrorBody<'a> {
    pub error: &'a str,
}

/// The prediction service could not be called, whatever the reason.
///
/// The details never reach the caller.
pub struct UpstreamUnreachable;

impl IntoResponse for UpstreamUnreachable {
    fn into_response(self) -> Response {
        internal_server_error()
    }
}

/// `500 Internal Server Error` with the generic message.
pub fn internal_server_error() -> Response {
    Json(ErrorBody {
        error: ERROR_MESSAGE,
    })
    .with_status(StatusCode::INTERNAL_SERVER_ERROR)
    .into_response()
}
