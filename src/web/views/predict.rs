//! Forwards prediction requests to the prediction service.

use poem::http::StatusCode;
use poem::web::{Data, Json};
use poem::{handler, IntoResponse, Response};
use serde_json::value::RawValue;

use crate::prelude::*;
use crate::web::error::UpstreamUnreachable;
use crate::web::state::State;

/// Relays the JSON body unchanged and echoes the prediction service response.
///
/// A body that is not valid JSON never gets here.
#[handler]
#[instrument(level = "info", skip_all)]
pub async fn post_predict(
    Json(body): Json<Box<RawValue>>,
    Data(state): Data<&State>,
) -> Response {
    let reply = match state.upstream.predict(&body).await {
        Ok(reply) => reply,
        Err(error) => {
            error!("failed to call the prediction service: {:#}", error);
            return UpstreamUnreachable.into_response();
        }
    };
    let status = if state.propagate_upstream_status {
        reply.status
    } else {
        StatusCode::OK
    };
    info!(upstream_status = %reply.status, %status);
    Response::builder()
        .status(status)
        .content_type("application/json")
        .body(reply.body)
}
