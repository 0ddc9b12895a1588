//! CLI options.
//!
//! Every option may also be provided through the environment, including a `.env` file.

use std::net::IpAddr;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};

use crate::prelude::*;

mod parsers;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Opts {
    #[command(flatten)]
    pub sentry: SentryOpts,

    #[command(flatten)]
    pub web: WebOpts,

    #[command(flatten)]
    pub upstream: UpstreamOpts,
}

#[derive(clap::Args)]
pub struct SentryOpts {
    /// Sentry DSN
    #[arg(long = "sentry-dsn", env = "SENTRY_DSN")]
    pub dsn: Option<String>,

    /// Sentry performance monitoring sample rate
    #[arg(
        long,
        env = "TRACES_SAMPLE_RATE",
        default_value = "0",
        value_parser = parsers::sample_rate,
    )]
    pub traces_sample_rate: f32,
}

#[derive(clap::Args)]
pub struct WebOpts {
    /// Bind host
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Bind port
    #[arg(short, long, env = "PORT", default_value = "3000")]
    pub port: u16,
}

#[derive(clap::Args, Clone)]
pub struct UpstreamOpts {
    /// Prediction service base URL, `/predict` gets appended to it
    #[arg(
        long = "upstream-url",
        env = "VPS_API_URL",
        default_value = "http://70.34.200.208:5000",
        value_parser = parsers::base_url,
    )]
    pub base_url: String,

    /// Prediction service call timeout
    #[arg(
        long = "upstream-timeout",
        env = "UPSTREAM_TIMEOUT",
        default_value = "30s",
        value_parser = parsers::non_zero_duration,
    )]
    pub timeout: StdDuration,

    /// Respond with the prediction service status code instead of always responding with `200 OK`
    #[arg(
        long,
        env = "PROPAGATE_UPSTREAM_STATUS",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        num_args = 0..=1,
        require_equals = true,
        default_value = "false",
        default_missing_value = "true",
    )]
    pub propagate_upstream_status: bool,
}
