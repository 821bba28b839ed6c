use std::time::Duration;

use base64::Engine;
use bytes::{Bytes, BytesMut};
use thiserror::Error;

use super::provider::ImagePayload;

pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);
pub const MAX_DOWNLOAD_BYTES: usize = 64 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("invalid base64 image data: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("image download timed out")]
    Timeout,
    #[error("image download failed: {0}")]
    Request(reqwest::Error),
    #[error("image download returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("image payload was empty")]
    Empty,
    #[error("image download exceeded {0} bytes")]
    TooLarge(usize),
}

impl From<reqwest::Error> for NormalizeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Request(e)
        }
    }
}

/// Turns a provider payload into raw image bytes. Only URL payloads touch
/// the network, with a single GET bounded by `timeout`.
pub async fn normalize(
    http: &reqwest::Client,
    payload: ImagePayload,
    timeout: Duration,
) -> Result<Bytes, NormalizeError> {
    let bytes = match payload {
        ImagePayload::Bytes(bytes) => bytes,
        ImagePayload::Base64(b64) => decode_base64(&b64)?.into(),
        ImagePayload::Url(url) => download(http, url, timeout, MAX_DOWNLOAD_BYTES).await?,
    };

    if bytes.is_empty() {
        return Err(NormalizeError::Empty);
    }
    Ok(bytes)
}

async fn download(
    http: &reqwest::Client,
    url: url::Url,
    timeout: Duration,
    max_bytes: usize,
) -> Result<Bytes, NormalizeError> {
    let mut resp = http.get(url).timeout(timeout).send().await?;
    if !resp.status().is_success() {
        return Err(NormalizeError::Status(resp.status()));
    }
    if resp.content_length().is_some_and(|len| len > max_bytes as u64) {
        return Err(NormalizeError::TooLarge(max_bytes));
    }

    // Content-Length can be absent or wrong, so the cap also holds while streaming.
    let mut body = BytesMut::new();
    while let Some(chunk) = resp.chunk().await? {
        if body.len() + chunk.len() > max_bytes {
            return Err(NormalizeError::TooLarge(max_bytes));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body.freeze())
}

fn decode_base64(b64: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let cleaned: String = b64
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && *c != '=')
        .collect();
    if cleaned.contains(|c: char| c == '-' || c == '_') {
        base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(cleaned)
    } else {
        base64::engine::general_purpose::STANDARD_NO_PAD.decode(cleaned)
    }
}
