// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use invtrack_app::{Item, ItemId, ItemPayload};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const BASE_URL_ENV: &str = "INVTRACK_API_BASE";

/// Blocking client for the inventory REST API.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        validate_base_url(&base_url)?;
        if timeout.is_zero() {
            bail!("api timeout must be positive");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn health(&self) -> Result<()> {
        let response = self.send(self.http.get(self.endpoint("/health")))?;
        let parsed: HealthResponse = response.json().context("decode health response")?;
        if parsed.status != "ok" {
            bail!(
                "API at {} reports status {:?}; expected \"ok\"",
                self.base_url,
                parsed.status
            );
        }
        Ok(())
    }

    pub fn list_items(&self) -> Result<Vec<Item>> {
        let response = self.send(self.http.get(self.endpoint("/items")))?;
        response.json().context("decode item list")
    }

    pub fn get_item(&self, id: ItemId) -> Result<Item> {
        let response = self.send(self.http.get(self.item_endpoint(id)))?;
        response
            .json()
            .with_context(|| format!("decode item {id}"))
    }

    pub fn create_item(&self, payload: &ItemPayload) -> Result<Item> {
        let response = self.send(self.http.post(self.endpoint("/items")).json(payload))?;
        response.json().context("decode created item")
    }

    pub fn update_item(&self, id: ItemId, payload: &ItemPayload) -> Result<Item> {
        let response = self.send(self.http.put(self.item_endpoint(id)).json(payload))?;
        response
            .json()
            .with_context(|| format!("decode updated item {id}"))
    }

    pub fn delete_item(&self, id: ItemId) -> Result<()> {
        self.send(self.http.delete(self.item_endpoint(id)))?;
        Ok(())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn item_endpoint(&self, id: ItemId) -> String {
        self.endpoint(&format!("/items/{}", id.get()))
    }

    fn send(&self, request: RequestBuilder) -> Result<Response> {
        let request = request
            .build()
            .context("build API request")?;
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending API request");

        let response = self
            .http
            .execute(request)
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            warn!(%method, %url, status = status.as_u16(), "API request failed");
            return Err(clean_error_response(status, &body));
        }
        Ok(response)
    }
}

/// Accepts absolute `http`/`https` URLs with a host.
pub fn validate_base_url(raw: &str) -> Result<Url> {
    if raw.trim().is_empty() {
        bail!("api base URL must not be empty");
    }
    let parsed = Url::parse(raw)
        .with_context(|| format!("api base URL {raw:?} is not a valid absolute URL"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!(
            "api base URL {raw:?} uses scheme {:?}; use http:// or https://",
            parsed.scheme()
        );
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        bail!("api base URL {raw:?} has no host");
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        bail!("api base URL {raw:?} must not carry a query or fragment");
    }
    Ok(parsed)
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    if error.is_timeout() {
        return anyhow!("request to {base_url} timed out -- the inventory API is slow or stuck");
    }
    anyhow!(
        "cannot reach {base_url} -- start the inventory API or set {BASE_URL_ENV} ({error})"
    )
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<DetailEnvelope>(body)
        && let Some(detail) = parsed.detail
    {
        let message = match detail {
            serde_json::Value::String(text) => text,
            serde_json::Value::Array(entries) => entries
                .iter()
                .filter_map(|entry| entry.get("msg").and_then(serde_json::Value::as_str))
                .collect::<Vec<&str>>()
                .join("; "),
            _ => String::new(),
        };
        if !message.is_empty() {
            return anyhow!("server error ({}): {}", status.as_u16(), message);
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() < 100 && !trimmed.contains('{') {
        return anyhow!("server error ({}): {}", status.as_u16(), trimmed);
    }

    anyhow!("server returned {}", status.as_u16())
}

#[derive(Debug, Deserialize)]
struct DetailEnvelope {
    detail: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

#[cfg(test)]
mod tests {
    use super::{Client, clean_error_response, validate_base_url};
    use reqwest::StatusCode;
    use std::time::Duration;

    #[test]
    fn fastapi_string_detail_is_surfaced() {
        let error = clean_error_response(StatusCode::NOT_FOUND, r#"{"detail":"Item not found"}"#);
        assert_eq!(error.to_string(), "server error (404): Item not found");
    }

    #[test]
    fn fastapi_validation_detail_joins_messages() {
        let body = r#"{"detail":[{"loc":["body","name"],"msg":"field required","type":"value_error.missing"},{"loc":["body","quantity"],"msg":"value is not a valid integer"}]}"#;
        let error = clean_error_response(StatusCode::UNPROCESSABLE_ENTITY, body);
        assert_eq!(
            error.to_string(),
            "server error (422): field required; value is not a valid integer"
        );
    }

    #[test]
    fn short_plain_bodies_are_kept_and_json_noise_is_dropped() {
        let plain = clean_error_response(StatusCode::BAD_GATEWAY, "upstream down\n");
        assert_eq!(plain.to_string(), "server error (502): upstream down");

        let noisy = clean_error_response(StatusCode::INTERNAL_SERVER_ERROR, r#"{"trace":[1,2]}"#);
        assert_eq!(noisy.to_string(), "server returned 500");
    }

    #[test]
    fn base_url_validation_rejects_bad_forms() {
        assert!(validate_base_url("http://localhost:8000").is_ok());
        assert!(validate_base_url("https://inventory.example.com/api").is_ok());
        assert!(validate_base_url("").is_err());
        assert!(validate_base_url("localhost:8000").is_err());
        assert!(validate_base_url("ftp://localhost").is_err());
        assert!(validate_base_url("http://localhost:8000/?x=1").is_err());
    }

    #[test]
    fn client_trims_trailing_slashes() {
        let client = Client::new("http://localhost:8000///", Duration::from_secs(1))
            .expect("client should initialize");
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.timeout(), Duration::from_secs(1));
    }

    #[test]
    fn client_rejects_zero_timeout() {
        let error = Client::new("http://localhost:8000", Duration::ZERO)
            .expect_err("zero timeout should fail");
        assert!(error.to_string().contains("timeout must be positive"));
    }
}
