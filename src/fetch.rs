//! Thin HTTP helpers shared by the schedule sources.

use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;

/// Both upstreams reject requests without a browser-like agent.
const USER_AGENT: &str = "Mozilla/5.0";

/// Build the shared client used for all schedule requests.
pub fn client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .context("building http client")
}

/// GET a page body as text, treating non-2xx statuses as errors.
pub async fn get_text(client: &Client, url: &str) -> Result<String> {
    let resp = client.get(url).send().await.with_context(|| format!("GET {url}"))?;
    let status = resp.status();
    if !status.is_success() {
        bail!("GET {url} returned {status}");
    }
    resp.text().await.with_context(|| format!("reading body of {url}"))
}

/// GET and decode a JSON payload, treating non-2xx statuses as errors.
pub async fn get_json<T: DeserializeOwned>(client: &Client, url: &str) -> Result<T> {
    let resp = client.get(url).send().await.with_context(|| format!("GET {url}"))?;
    let status = resp.status();
    if !status.is_success() {
        bail!("GET {url} returned {status}");
    }
    resp.json().await.with_context(|| format!("decoding json from {url}"))
}
