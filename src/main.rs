//! Forwarding proxy and form for a flight delay prediction service.

use clap::Parser;

use crate::opts::Opts;
use crate::prelude::*;

mod logging;
mod opts;
mod prelude;
mod upstream;
mod web;

#[tokio::main]
async fn main() -> Result {
    let dotenv = dotenvy::dotenv();
    let opts = Opts::parse();
    let _sentry_guard = logging::init(opts.sentry.dsn.clone(), opts.sentry.traces_sample_rate)?;
    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded the environment file"),
        Err(error) if error.not_found() => {}
        Err(error) => warn!("failed to load the environment file: {:#}", error),
    }
    sentry::configure_scope(|scope| scope.set_tag("app", "bridge"));
    web::run(&opts.web, &opts.upstream).await
}
