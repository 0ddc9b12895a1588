use poem::error::{MethodNotAllowedError, NotFoundError, ParseFormError, ParseJsonError};
use poem::http::StatusCode;
use poem::web::Json;
use poem::{Endpoint, IntoResponse, Middleware, Request, Response, Result};

use crate::prelude::*;
use crate::web::error::{internal_server_error, ErrorBody};

/// Turns the framework errors into responses.
///
/// Malformed request bodies are rejected here, before any handler runs.
pub struct ErrorMiddleware;

impl<E: Endpoint<Output = Response>> Middleware<E> for ErrorMiddleware {
    type Output = ErrorMiddlewareImpl<E>;

    fn transform(&self, ep: E) -> Self::Output {
        ErrorMiddlewareImpl { ep }
    }
}

pub struct ErrorMiddlewareImpl<E> {
    ep: E,
}

#[poem::async_trait]
impl<E: Endpoint<Output = Response>> Endpoint for ErrorMiddlewareImpl<E> {
    type Output = Response;

    async fn call(&self, request: Request) -> Result<Self::Output> {
        let method = request.method().clone();
        let uri = request.uri().clone();
        match self.ep.call(request).await {
            Err(error) if error.is::<NotFoundError>() => {
                info!(?method, ?uri, "{:#}", error);
                Ok(StatusCode::NOT_FOUND.into_response())
            }
            Err(error) if error.is::<MethodNotAllowedError>() => {
                info!(?method, ?uri, "{:#}", error);
                Ok(StatusCode::METHOD_NOT_ALLOWED.into_response())
            }
            Err(error) if error.is::<ParseJsonError>() || error.is::<ParseFormError>() => {
                info!(?method, ?uri, "{:#}", error);
                let message = error.to_string();
                Ok(Json(ErrorBody { error: &message })
                    .with_status(StatusCode::BAD_REQUEST)
                    .into_response())
            }
            Err(error) => {
                error!(?method, ?uri, "{:#}", error);
                Ok(internal_server_error())
            }
            result => result,
        }
    }
}
