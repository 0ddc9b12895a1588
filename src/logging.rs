//! Logging into the console and Sentry.
//!
//! Each destination has its own `EnvFilter`:
//!
//! - `FLIGHT_DELAY_BRIDGE_LOG` for the console, `flight_delay_bridge=info,poem=info` by default
//! - `FLIGHT_DELAY_BRIDGE_SENTRY_LOG` for Sentry, `flight_delay_bridge=debug` by default

use std::borrow::Cow;

use sentry::integrations::tracing::EventFilter;
use sentry::{ClientInitGuard, ClientOptions};
use tracing::{Level, Metadata, Subscriber};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::prelude::*;

/// Installs the global subscriber. The guard flushes Sentry when dropped.
pub fn init(sentry_dsn: Option<String>, traces_sample_rate: f32) -> Result<ClientInitGuard> {
    let guard = sentry::init((
        sentry_dsn,
        ClientOptions {
            release: Some(Cow::Borrowed(env!("CARGO_PKG_VERSION"))),
            traces_sample_rate,
            ..Default::default()
        },
    ));
    Registry::default()
        .with(console_layer()?)
        .with(sentry_layer()?)
        .try_init()
        .context("failed to install the tracing subscriber")?;
    Ok(guard)
}

/// Timestamped lines on stderr.
fn console_layer<S>() -> Result<impl Layer<S>>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let filter = env_filter("FLIGHT_DELAY_BRIDGE_LOG", "flight_delay_bridge=info,poem=info")?;
    Ok(tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter))
}

fn sentry_layer<S>() -> Result<impl Layer<S>>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let filter = env_filter("FLIGHT_DELAY_BRIDGE_SENTRY_LOG", "flight_delay_bridge=debug")?;
    Ok(sentry::integrations::tracing::layer()
        .event_filter(sentry_event_kind)
        .span_filter(|metadata| *metadata.level() <= Level::INFO)
        .with_filter(filter))
}

/// Warnings and errors become Sentry events, anything quieter is kept as a breadcrumb.
fn sentry_event_kind(metadata: &Metadata<'_>) -> EventFilter {
    if *metadata.level() <= Level::WARN {
        EventFilter::Event
    } else {
        EventFilter::Breadcrumb
    }
}

fn env_filter(variable: &str, default: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_env(variable) {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(default)
            .with_context(|| format!("invalid default filter `{}`", default)),
    }
}
