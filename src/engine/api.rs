//! HTTP surface of the augmentation service.
//!
//! One method per endpoint. Channel identifiers are opaque and land in
//! the URL path verbatim; the service owns their encoding. Response
//! bodies are read as plain text and decoded against the success body,
//! never as JSON, and HTTP status codes are never inspected.

use crate::model::{Outcome, PrefixSet, RunConfig, ViewTarget};
use anyhow::{Context, Result};
use tracing::debug;

#[derive(Clone)]
pub(crate) struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(cfg: &RunConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Form-shape augment: caller-provided prefixes, augmentation route.
    pub async fn augment(&self, channel: &str, prefix: &PrefixSet) -> Result<Outcome> {
        let url = format!("{}/augmentation/{}/augment", self.base_url, channel);
        self.post_prefix(&url, prefix).await
    }

    /// Direct-shape augment: default glyphs, channel-list route.
    pub async fn quick_augment(&self, channel: &str) -> Result<Outcome> {
        let url = format!("{}/augmentations/{}/augment", self.base_url, channel);
        self.post_prefix(&url, &PrefixSet::default_glyphs()).await
    }

    pub async fn change_prefix(&self, channel: &str, prefix: &PrefixSet) -> Result<Outcome> {
        let url = format!("{}/augmentation/{}/change_prefix", self.base_url, channel);
        self.post_prefix(&url, prefix).await
    }

    pub async fn abridge(&self, channel: &str) -> Result<Outcome> {
        let url = format!("{}/augmentation/{}/abridge", self.base_url, channel);
        self.post_empty(&url).await
    }

    pub async fn remove(&self, channel: &str) -> Result<Outcome> {
        let url = format!("{}/augmentations/{}/remove", self.base_url, channel);
        self.post_empty(&url).await
    }

    /// Re-fetch the page an action was triggered from. The body is read
    /// and discarded; only the fetch itself matters.
    pub async fn reload_view(&self, view: &ViewTarget) -> Result<()> {
        let url = format!("{}{}", self.base_url, view.path());
        debug!(%url, "refreshing view");
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {url} failed"))?;
        let _ = resp
            .text()
            .await
            .with_context(|| format!("reading view body from {url} failed"))?;
        Ok(())
    }

    async fn post_prefix(&self, url: &str, prefix: &PrefixSet) -> Result<Outcome> {
        debug!(%url, "posting prefix payload");
        let body = self
            .http
            .post(url)
            .json(prefix)
            .send()
            .await
            .with_context(|| format!("POST {url} failed"))?
            .text()
            .await
            .with_context(|| format!("reading response body from {url} failed"))?;
        debug!(%url, body = %body, "action response");
        Ok(Outcome::from_body(&body))
    }

    async fn post_empty(&self, url: &str) -> Result<Outcome> {
        debug!(%url, "posting without payload");
        let body = self
            .http
            .post(url)
            .send()
            .await
            .with_context(|| format!("POST {url} failed"))?
            .text()
            .await
            .with_context(|| format!("reading response body from {url} failed"))?;
        debug!(%url, body = %body, "action response");
        Ok(Outcome::from_body(&body))
    }
}
