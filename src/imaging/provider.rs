use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::aggregator::{snippet, ApiError};

const GENERATE_TIMEOUT: Duration = Duration::from_secs(180);

/// What a provider handed back, decoded at the network boundary.
#[derive(Clone, Debug, PartialEq)]
pub enum ImagePayload {
    Url(Url),
    /// Base64 text, either raw or lifted out of a `data:` URL.
    Base64(String),
    Bytes(Bytes),
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {0}")]
    Api(String),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("response contained no image")]
    NoImage,
    #[error("invalid image URL: {0}")]
    InvalidUrl(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum ProviderResult {
    Success(ImagePayload),
    Failure(String),
}

impl ProviderResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

#[async_trait]
pub trait ImageProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, model: &str, prompt: &str) -> Result<ImagePayload, ProviderError>;
}

/// Calls the provider exactly once and folds any error into a failure.
pub async fn invoke(provider: &dyn ImageProvider, model: &str, prompt: &str) -> ProviderResult {
    match provider.generate(model, prompt).await {
        Ok(payload) => ProviderResult::Success(payload),
        Err(e) => {
            tracing::warn!("provider {} failed for model {model}: {e}", provider.name());
            ProviderResult::Failure(e.to_string())
        }
    }
}

// --- Aggregator-backed provider ---

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    provider: &'a str,
    response_format: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    data: Option<Vec<ImageDatum>>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ImageDatum {
    Plain(String),
    Object {
        url: Option<String>,
        b64_json: Option<String>,
    },
}

/// One named backend reached through the aggregator's image endpoint.
pub struct AggregatorImageProvider {
    name: String,
    http: reqwest::Client,
    base_url: String,
}

impl AggregatorImageProvider {
    pub fn new(name: impl Into<String>, http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ImageProvider for AggregatorImageProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<ImagePayload, ProviderError> {
        let request = GenerateRequest {
            model,
            prompt,
            provider: &self.name,
            response_format: "url",
        };

        let resp = self
            .http
            .post(format!("{}/v1/images/generate", self.base_url))
            .timeout(GENERATE_TIMEOUT)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        match parse_generate_response(&body) {
            Err(ProviderError::Malformed(_)) if !status.is_success() => {
                Err(ProviderError::Api(format!("status {status}: {}", snippet(&body))))
            }
            other => other,
        }
    }
}

pub(crate) fn parse_generate_response(body: &str) -> Result<ImagePayload, ProviderError> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::Malformed(e.to_string()))?;

    if let Some(err) = response.error {
        return Err(ProviderError::Api(err.into_message()));
    }

    let datum = response
        .data
        .and_then(|d| d.into_iter().next())
        .ok_or(ProviderError::NoImage)?;

    match datum {
        ImageDatum::Plain(url) => payload_from_url(&url),
        ImageDatum::Object { b64_json: Some(b64), .. } if !b64.is_empty() => {
            Ok(ImagePayload::Base64(b64))
        }
        ImageDatum::Object { url: Some(url), .. } => payload_from_url(&url),
        ImageDatum::Object { .. } => Err(ProviderError::NoImage),
    }
}

pub(crate) fn payload_from_url(raw: &str) -> Result<ImagePayload, ProviderError> {
    let raw = raw.trim();
    if let Some(b64) = extract_base64_from_data_url(raw) {
        return Ok(ImagePayload::Base64(b64.to_string()));
    }
    Url::parse(raw)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .map(ImagePayload::Url)
        .ok_or_else(|| ProviderError::InvalidUrl(raw.chars().take(100).collect()))
}

fn extract_base64_from_data_url(url: &str) -> Option<&str> {
    let lower = url.to_ascii_lowercase();
    if !lower.starts_with("data:image/") {
        return None;
    }
    let marker = ";base64,";
    let idx = lower.find(marker)?;
    Some(&url[idx + marker.len()..])
}

/// Provider identifiers resolved to implementations. Names nobody registered
/// explicitly go through the aggregator.
pub struct ProviderRegistry {
    http: reqwest::Client,
    base_url: String,
    registered: HashMap<String, Arc<dyn ImageProvider>>,
}

impl ProviderRegistry {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            registered: HashMap::new(),
        }
    }

    pub fn register(mut self, provider: Arc<dyn ImageProvider>) -> Self {
        self.registered.insert(provider.name().to_string(), provider);
        self
    }

    pub fn get(&self, name: &str) -> Arc<dyn ImageProvider> {
        match self.registered.get(name) {
            Some(p) => Arc::clone(p),
            None => Arc::new(AggregatorImageProvider::new(
                name,
                self.http.clone(),
                self.base_url.clone(),
            )),
        }
    }

    pub fn resolve(&self, names: &[String]) -> Vec<Arc<dyn ImageProvider>> {
        names.iter().map(|n| self.get(n)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    #[async_trait]
    impl ImageProvider for Failing {
        fn name(&self) -> &str {
            "Failing"
        }

        async fn generate(&self, _model: &str, _prompt: &str) -> Result<ImagePayload, ProviderError> {
            Err(ProviderError::Api("model not supported".to_string()))
        }
    }

    #[tokio::test]
    async fn test_invoke_folds_error_into_failure() {
        let result = invoke(&Failing, "flux", "a cat").await;
        assert_eq!(
            result,
            ProviderResult::Failure("API error: model not supported".to_string())
        );
        assert!(!result.is_success());
    }

    #[test]
    fn test_parse_url_object() {
        let payload =
            parse_generate_response(r#"{"data":[{"url":"https://cdn.example.com/a.png"}]}"#).unwrap();
        assert_eq!(
            payload,
            ImagePayload::Url(Url::parse("https://cdn.example.com/a.png").unwrap())
        );
    }

    #[test]
    fn test_parse_plain_string_entry() {
        let payload = parse_generate_response(r#"{"data":["https://x.example/img.jpg"]}"#).unwrap();
        assert!(matches!(payload, ImagePayload::Url(u) if u.host_str() == Some("x.example")));
    }

    #[test]
    fn test_parse_b64_json_preferred() {
        let payload = parse_generate_response(
            r#"{"data":[{"url":"https://x.example/a.png","b64_json":"iVBORw0KGgo="}]}"#,
        )
        .unwrap();
        assert_eq!(payload, ImagePayload::Base64("iVBORw0KGgo=".to_string()));
    }

    #[test]
    fn test_parse_data_url() {
        let payload =
            parse_generate_response(r#"{"data":[{"url":"data:image/png;base64,AAAA"}]}"#).unwrap();
        assert_eq!(payload, ImagePayload::Base64("AAAA".to_string()));
    }

    #[test]
    fn test_parse_structured_error() {
        let err = parse_generate_response(r#"{"error":{"message":"No provider available"}}"#)
            .unwrap_err();
        assert!(matches!(err, ProviderError::Api(m) if m == "No provider available"));
    }

    #[test]
    fn test_parse_empty_data() {
        assert!(matches!(
            parse_generate_response(r#"{"data":[]}"#),
            Err(ProviderError::NoImage)
        ));
        assert!(matches!(
            parse_generate_response(r#"{"data":[{}]}"#),
            Err(ProviderError::NoImage)
        ));
    }

    #[test]
    fn test_payload_rejects_non_http_urls() {
        assert!(matches!(
            payload_from_url("ftp://example.com/a.png"),
            Err(ProviderError::InvalidUrl(_))
        ));
        assert!(matches!(
            payload_from_url("not a url"),
            Err(ProviderError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_registry_prefers_registered() {
        let registry = ProviderRegistry::new(reqwest::Client::new(), "http://localhost:1337")
            .register(Arc::new(Failing));
        let resolved = registry.resolve(&["Failing".to_string(), "Together".to_string()]);
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].name(), "Failing");
        assert_eq!(resolved[1].name(), "Together");
    }
}
