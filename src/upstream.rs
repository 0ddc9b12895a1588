//! Prediction service client.

use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::de::IgnoredAny;
use serde_json::value::RawValue;

use crate::opts::UpstreamOpts;
use crate::prelude::*;

#[derive(Clone)]
pub struct Client {
    client: reqwest::Client,
    predict_url: String,
}

/// Completed prediction service call.
#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,

    /// Always a valid JSON document.
    pub body: Vec<u8>,
}

impl Client {
    pub fn new(opts: &UpstreamOpts) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(opts.timeout).build()?;
        Ok(Self {
            client,
            predict_url: format!("{}/predict", opts.base_url),
        })
    }

    /// Posts the body to the prediction service as is.
    ///
    /// Only the content negotiation headers are set.
    /// Any completed call is a success, whatever the response status.
    #[instrument(level = "debug", skip_all)]
    pub async fn predict(&self, body: &RawValue) -> Result<Reply> {
        let start_instant = Instant::now();
        let response = self
            .client
            .post(&self.predict_url)
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .await
            .with_context(|| format!("failed to call `{}`", self.predict_url))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .context("failed to read the prediction service response")?;
        debug!(%status, n_bytes = body.len(), elapsed = ?start_instant.elapsed());
        Ok(Reply {
            status,
            body: into_json(body.to_vec())?,
        })
    }
}

/// Keeps a JSON body intact and wraps anything else into a JSON string.
fn into_json(body: Vec<u8>) -> Result<Vec<u8>> {
    if serde_json::from_slice::<IgnoredAny>(&body).is_ok() {
        Ok(body)
    } else {
        warn!(n_bytes = body.len(), "the prediction service responded with a non-JSON body");
        Ok(serde_json::to_vec(&String::from_utf8_lossy(&body))?)
    }
}
