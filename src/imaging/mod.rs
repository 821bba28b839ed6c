pub mod fanout;
pub mod models;
pub mod normalize;
pub mod provider;
pub mod reencode;

use std::time::Duration;

use futures::future::join_all;
use image::ImageFormat;

pub use fanout::{fan_out, ProviderOutcome};
pub use models::ModelProviderMap;
pub use provider::{ImagePayload, ImageProvider, ProviderRegistry, ProviderResult};

use provider::ProviderResult::{Failure, Success};

/// One finished image, labelled with the provider that produced it.
#[derive(Clone, Debug)]
pub struct ImageCandidate {
    pub source_provider: String,
    pub bytes: Vec<u8>,
    pub size_bytes: usize,
}

impl ImageCandidate {
    fn new(source_provider: String, bytes: Vec<u8>) -> Self {
        Self {
            size_bytes: bytes.len(),
            source_provider,
            bytes,
        }
    }

    pub fn extension(&self) -> &'static str {
        match image::guess_format(&self.bytes) {
            Ok(ImageFormat::Png) => "png",
            Ok(ImageFormat::Gif) => "gif",
            Ok(ImageFormat::WebP) => "webp",
            _ => "jpg",
        }
    }

    pub fn file_name(&self) -> String {
        let stem: String = self
            .source_provider
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        format!("{stem}.{}", self.extension())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProviderFailure {
    pub provider: String,
    pub reason: String,
}

#[derive(Clone, Debug, Default)]
pub struct ImageBatch {
    pub candidates: Vec<ImageCandidate>,
    pub failures: Vec<ProviderFailure>,
}

impl ImageBatch {
    /// No provider produced a usable image.
    pub fn all_failed(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Fan-out, download, and shrink, end to end.
pub struct ImagePipeline {
    http: reqwest::Client,
    models: ModelProviderMap,
    registry: ProviderRegistry,
    ceiling: usize,
    download_timeout: Duration,
}

impl ImagePipeline {
    pub fn new(
        http: reqwest::Client,
        models: ModelProviderMap,
        registry: ProviderRegistry,
        ceiling: usize,
    ) -> Self {
        Self {
            http,
            models,
            registry,
            ceiling,
            download_timeout: normalize::DOWNLOAD_TIMEOUT,
        }
    }

    pub fn with_download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }

    pub fn models(&self) -> &ModelProviderMap {
        &self.models
    }

    /// Never fails as a whole: every provider ends up either as a candidate
    /// or as a failure, in provider preference order.
    pub async fn generate(&self, model: &str, prompt: &str) -> ImageBatch {
        let providers = self.registry.resolve(self.models.resolve(model));
        tracing::info!(
            "image fan-out: model={model} providers={}",
            providers.len()
        );

        let outcomes = fan_out(&providers, model, prompt).await;
        let finished = join_all(outcomes.into_iter().map(|o| self.finish(o))).await;

        let mut batch = ImageBatch::default();
        for result in finished {
            match result {
                Ok(candidate) => batch.candidates.push(candidate),
                Err(failure) => batch.failures.push(failure),
            }
        }

        tracing::info!(
            "image fan-out done: model={model} ok={} failed={}",
            batch.candidates.len(),
            batch.failures.len()
        );
        batch
    }

    async fn finish(&self, outcome: ProviderOutcome) -> Result<ImageCandidate, ProviderFailure> {
        let ProviderOutcome { provider, result } = outcome;
        let fail = |reason: String| ProviderFailure {
            provider: provider.clone(),
            reason,
        };

        let payload = match result {
            Success(payload) => payload,
            Failure(reason) => return Err(fail(reason)),
        };

        let raw = normalize::normalize(&self.http, payload, self.download_timeout)
            .await
            .map_err(|e| {
                tracing::warn!("provider {provider}: {e}");
                fail(e.to_string())
            })?;

        let reencoded = reencode::fit_within_blocking(raw, self.ceiling)
            .await
            .map_err(|e| {
                tracing::warn!("provider {provider}: {e}");
                fail(e.to_string())
            })?;

        if !reencoded.fits {
            tracing::warn!(
                "provider {provider}: image still {} bytes after re-encoding",
                reencoded.bytes.len()
            );
        }

        Ok(ImageCandidate::new(provider, reencoded.bytes))
    }
}
