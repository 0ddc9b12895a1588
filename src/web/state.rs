use crate::opts::UpstreamOpts;
use crate::prelude::*;
use crate::upstream;

/// Immutable application state shared by all requests.
#[derive(Clone)]
pub struct State {
    pub upstream: upstream::Client,
    pub propagate_upstream_status: bool,
}

impl State {
    pub fn new(opts: &UpstreamOpts) -> Result<Self> {
        Ok(Self {
            upstream: upstream::Client::new(opts)?,
            propagate_upstream_status: opts.propagate_upstream_status,
        })
    }
}
