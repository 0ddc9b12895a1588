use poem::http::header::CONTENT_LENGTH;
use poem::http::StatusCode;
use poem::web::Json;
use poem::{Endpoint, IntoResponse, Middleware, Request, Response, Result};
use tokio::io::AsyncReadExt;

use crate::prelude::*;
use crate::web::error::ErrorBody;

/// Rejects request bodies over the limit with `413 Payload Too Large`.
///
/// The body gets buffered, so a missing or lying `Content-Length` is handled too.
pub struct BodyLimitMiddleware {
    max_size: u64,
}

impl BodyLimitMiddleware {
    pub const fn new(max_size: u64) -> Self {
        Self { max_size }
    }
}

impl<E: Endpoint<Output = Response>> Middleware<E> for BodyLimitMiddleware {
    type Output = BodyLimitMiddlewareImpl<E>;

    fn transform(&self, ep: E) -> Self::Output {
        BodyLimitMiddlewareImpl {
            ep,
            max_size: self.max_size,
        }
    }
}

pub struct BodyLimitMiddlewareImpl<E> {
    ep: E,
    max_size: u64,
}

#[poem::async_trait]
impl<E: Endpoint<Output = Response>> Endpoint for BodyLimitMiddlewareImpl<E> {
    type Output = Response;

    async fn call(&self, mut request: Request) -> Result<Self::Output> {
        let content_length = request
            .header(CONTENT_LENGTH)
            .and_then(|value| value.parse::<u64>().ok());
        if content_length.map_or(false, |length| length > self.max_size) {
            info!(?content_length, max_size = self.max_size, "declared body is too large");
            return Ok(payload_too_large());
        }

        let mut body = Vec::new();
        let n_bytes = match request
            .take_body()
            .into_async_read()
            .take(self.max_size + 1)
            .read_to_end(&mut body)
            .await
        {
            Ok(n_bytes) => n_bytes,
            Err(error) => {
                info!("failed to read the request body: {:#}", error);
                return Ok(StatusCode::BAD_REQUEST.into_response());
            }
        };
        if n_bytes as u64 > self.max_size {
            info!(max_size = self.max_size, "body is too large");
            return Ok(payload_too_large());
        }

        request.set_body(body);
        self.ep.call(request).await
    }
}

fn payload_too_large() -> Response {
    Json(ErrorBody {
        error: "request entity too large",
    })
    .with_status(StatusCode::PAYLOAD_TOO_LARGE)
    .into_response()
}
