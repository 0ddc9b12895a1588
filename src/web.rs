use std::any::Any;

use poem::listener::TcpListener;
use poem::middleware::{CatchPanic, Cors, Tracing};
use poem::{get, post, Endpoint, EndpointExt, Response, Route, Server};

use crate::opts::{UpstreamOpts, WebOpts};
use crate::prelude::*;
use crate::web::error::internal_server_error;
use crate::web::middleware::{BodyLimitMiddleware, ErrorMiddleware, SentryMiddleware};
use crate::web::state::State;

mod error;
mod middleware;
mod partials;
mod state;
#[cfg(test)]
pub mod test;
mod views;

/// Time given to the in-flight requests on shutdown.
const GRACEFUL_SHUTDOWN_TIMEOUT: StdDuration = StdDuration::from_secs(10);

#[instrument(skip_all)]
pub async fn run(opts: &WebOpts, upstream: &UpstreamOpts) -> Result {
    let app = create_app(State::new(upstream)?);
    info!(
        host = %opts.host,
        port = opts.port,
        upstream = upstream.base_url.as_str(),
        timeout = ?upstream.timeout,
        "listening…"
    );
    Server::new(TcpListener::bind((opts.host, opts.port)))
        .run_with_graceful_shutdown(
            app,
            async {
                if let Err(error) = tokio::signal::ctrl_c().await {
                    error!("failed to listen for the shutdown signal: {:#}", error);
                }
                info!("shutting down…");
            },
            Some(GRACEFUL_SHUTDOWN_TIMEOUT),
        )
        .await?;
    Ok(())
}

/// Largest accepted proxy request body.
const MAX_BODY_SIZE: u64 = 100 * 1024;

/// Creates the application: the proxy routes, the form and the health check.
///
/// The `/api` prefix mirrors the development reverse-proxy rule of the form.
pub fn create_app(state: State) -> impl Endpoint {
    let app = Route::new()
        .at("/", get(views::form::get_form).post(views::form::post_form))
        .at("/predict", post(predict_endpoint()))
        .at("/api/predict", post(predict_endpoint()))
        .at("/health", get(views::health::get_health))
        .data(state);
    with_middleware(app)
}

fn predict_endpoint() -> impl Endpoint<Output = Response> {
    views::predict::post_predict.with(BodyLimitMiddleware::new(MAX_BODY_SIZE))
}

/// Wraps the routes into the middleware stack.
///
/// A panic is answered with the same generic error as any other failure.
fn with_middleware(ep: impl Endpoint<Output = Response>) -> impl Endpoint {
    ep.with(Tracing)
        .with(CatchPanic::new().with_handler(|_: Box<dyn Any + Send>| internal_server_error()))
        .with(ErrorMiddleware)
        .with(Cors::new())
        .with(SentryMiddleware)
}

#[cfg(test)]
mod tests {
    use poem::handler;
    use poem::http::StatusCode;
    use poem::test::TestClient;
    use serde_json::json;

    use super::*;
    use crate::web::error::ERROR_MESSAGE;

    #[handler]
    fn explode() {
        panic!("explode");
    }

    #[tokio::test]
    async fn panic_is_internal_server_error_ok() {
        let client = TestClient::new(with_middleware(Route::new().at("/explode", get(explode))));

        let response = client.get("/explode").send().await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        response.assert_json(json!({ "error": ERROR_MESSAGE })).await;
    }
}
