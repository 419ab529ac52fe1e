use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client as HttpClient, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use super::api::KapacitorApi;
use super::types::*;

const SOURCES_PATH: &str = "/chronograf/v1/sources";
const KAPACITOR_PING_PATH: &str = "/kapacitor/v1/ping";

/// Chronograf REST API client
#[derive(Debug, Clone)]
pub struct ChronografClient {
    base_url: String,
    client: HttpClient,
}

impl ChronografClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: HttpClient::new(),
        }
    }

    /// Resolve a link advertised by the API against the base URL
    fn url_for(&self, link: &str) -> String {
        if link.starts_with("http://") || link.starts_with("https://") {
            link.to_string()
        } else {
            format!("{}{}", self.base_url, link)
        }
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> Result<Response> {
        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to connect to Chronograf at {}", url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Chronograf returned error: {} - {}",
                status,
                if body.is_empty() { "No details" } else { &body }
            );
        }

        Ok(response)
    }

    async fn get<T: DeserializeOwned>(&self, link: &str) -> Result<T> {
        let url = self.url_for(link);
        tracing::debug!(%url, "GET");
        let response = self.send(self.client.get(&url), &url).await?;
        response
            .json()
            .await
            .context("Failed to parse Chronograf response")
    }

    /// Test connection to the Chronograf API
    pub async fn test_connection(&self) -> Result<()> {
        self.get_sources().await?;
        Ok(())
    }
}

#[async_trait]
impl KapacitorApi for ChronografClient {
    async fn get_sources(&self) -> Result<Vec<Source>> {
        let response: SourcesResponse = self.get(SOURCES_PATH).await?;
        Ok(response.sources)
    }

    async fn get_kapacitors(&self, source: &Source) -> Result<Vec<Kapacitor>> {
        let response: KapacitorsResponse = self.get(&source.links.kapacitors).await?;
        Ok(response.kapacitors)
    }

    async fn create_kapacitor(&self, source: &Source, kapacitor: &Kapacitor) -> Result<Kapacitor> {
        let url = self.url_for(&source.links.kapacitors);
        tracing::debug!(%url, name = %kapacitor.name, "POST kapacitor");
        let response = self
            .send(self.client.post(&url).json(kapacitor), &url)
            .await?;
        response
            .json()
            .await
            .context("Failed to parse created Kapacitor")
    }

    async fn update_kapacitor(&self, kapacitor: &Kapacitor) -> Result<Kapacitor> {
        let url = self.url_for(&kapacitor.links.self_link);
        tracing::debug!(%url, "PATCH kapacitor");
        let response = self
            .send(self.client.patch(&url).json(kapacitor), &url)
            .await?;
        response
            .json()
            .await
            .context("Failed to parse updated Kapacitor")
    }

    async fn delete_kapacitor(&self, kapacitor: &Kapacitor) -> Result<()> {
        let url = self.url_for(&kapacitor.links.self_link);
        tracing::debug!(%url, "DELETE kapacitor");
        self.send(self.client.delete(&url), &url).await?;
        Ok(())
    }

    async fn ping_kapacitor(&self, kapacitor: &Kapacitor) -> Result<()> {
        let url = self.url_for(&kapacitor.links.proxy);
        tracing::debug!(%url, "ping kapacitor");
        self.send(
            self.client
                .get(&url)
                .query(&[("path", KAPACITOR_PING_PATH)]),
            &url,
        )
        .await
        .with_context(|| format!("Kapacitor {} did not answer ping", kapacitor.name))?;
        Ok(())
    }

    async fn get_rules(&self, kapacitor: &Kapacitor) -> Result<Vec<AlertRule>> {
        let response: RulesResponse = self.get(&kapacitor.links.rules).await?;
        Ok(response.rules)
    }

    async fn delete_rule(&self, rule: &AlertRule) -> Result<()> {
        let url = self.url_for(&rule.links.self_link);
        tracing::debug!(%url, "DELETE rule");
        self.send(self.client.delete(&url), &url).await?;
        Ok(())
    }

    async fn update_rule_status(&self, rule: &AlertRule, status: RuleStatus) -> Result<AlertRule> {
        let url = self.url_for(&rule.links.self_link);
        tracing::debug!(%url, status = status.as_str(), "PATCH rule status");
        let response = self
            .send(
                self.client
                    .patch(&url)
                    .json(&serde_json::json!({ "status": status.as_str() })),
                &url,
            )
            .await?;
        response
            .json()
            .await
            .context("Failed to parse updated rule")
    }
}
