use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use aggregator_bot::imaging::provider::ProviderError;
use aggregator_bot::imaging::{
    ImagePayload, ImagePipeline, ImageProvider, ModelProviderMap, ProviderRegistry,
};
use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine;
use serde_json::{json, Value};

const CEILING: usize = 8 * 1024 * 1024;

fn noise_png(width: u32, height: u32) -> Vec<u8> {
    let mut state: u32 = 0x9E37_79B9;
    let img = image::RgbImage::from_fn(width, height, |_, _| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let [r, g, b, _] = state.to_le_bytes();
        image::Rgb([r, g, b])
    });
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[derive(Clone)]
struct Fixture {
    addr: SocketAddr,
    png: Arc<Vec<u8>>,
}

async fn generate(State(fx): State<Fixture>, Json(body): Json<Value>) -> impl IntoResponse {
    let provider = body["provider"].as_str().unwrap_or_default().to_string();
    assert_eq!(body["response_format"], "url");
    match provider.as_str() {
        "PollinationsAI" => (
            StatusCode::OK,
            Json(json!({"data": [{"url": format!("http://{}/img/a.png", fx.addr)}]})),
        ),
        "Together" => (
            StatusCode::OK,
            Json(json!({"data": [format!("http://{}/img/b.png", fx.addr)]})),
        ),
        _ => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({"error": {"message": "quota exceeded"}})),
        ),
    }
}

async fn image_file(State(fx): State<Fixture>, Path(_name): Path<String>) -> Vec<u8> {
    fx.png.as_ref().clone()
}

/// Aggregator stand-in on an ephemeral port.
async fn spawn_aggregator(png: Vec<u8>) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let fixture = Fixture {
        addr,
        png: Arc::new(png),
    };
    let app = Router::new()
        .route("/v1/images/generate", post(generate))
        .route("/img/:name", get(image_file))
        .with_state(fixture);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

struct InlineProvider {
    name: &'static str,
    delay: Duration,
    png: Vec<u8>,
}

#[async_trait]
impl ImageProvider for InlineProvider {
    fn name(&self) -> &str {
        self.name
    }

    async fn generate(&self, _model: &str, _prompt: &str) -> Result<ImagePayload, ProviderError> {
        tokio::time::sleep(self.delay).await;
        Ok(ImagePayload::Base64(
            base64::engine::general_purpose::STANDARD.encode(&self.png),
        ))
    }
}

/// Hands back a fixed URL, leaving the download to the pipeline.
struct UrlProvider {
    name: &'static str,
    url: String,
}

#[async_trait]
impl ImageProvider for UrlProvider {
    fn name(&self) -> &str {
        self.name
    }

    async fn generate(&self, _model: &str, _prompt: &str) -> Result<ImagePayload, ProviderError> {
        Ok(ImagePayload::Url(url::Url::parse(&self.url).unwrap()))
    }
}

/// Image host with one good file, one missing file, and one that stalls.
async fn spawn_image_host(png: Vec<u8>) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let png = Arc::new(png);
    let app = Router::new()
        .route(
            "/ok.png",
            get(move || {
                let png = Arc::clone(&png);
                async move { png.as_ref().clone() }
            }),
        )
        .route("/gone.png", get(|| async { StatusCode::NOT_FOUND }))
        .route(
            "/stall.png",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                StatusCode::OK
            }),
        );
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

struct BrokenProvider;

#[async_trait]
impl ImageProvider for BrokenProvider {
    fn name(&self) -> &str {
        "Broken"
    }

    async fn generate(&self, _model: &str, _prompt: &str) -> Result<ImagePayload, ProviderError> {
        Err(ProviderError::Api("model not supported".to_string()))
    }
}

#[tokio::test]
async fn test_flux_two_of_three_providers_succeed() {
    let png = noise_png(64, 64);
    let addr = spawn_aggregator(png.clone()).await;
    let http = reqwest::Client::new();
    let pipeline = ImagePipeline::new(
        http.clone(),
        ModelProviderMap::builtin(),
        ProviderRegistry::new(http, format!("http://{addr}")),
        CEILING,
    );

    let batch = pipeline.generate("flux", "a red fox in snow").await;

    assert!(!batch.all_failed());
    let labels: Vec<&str> = batch
        .candidates
        .iter()
        .map(|c| c.source_provider.as_str())
        .collect();
    assert_eq!(labels, ["PollinationsAI", "Together"]);
    for candidate in &batch.candidates {
        assert_eq!(candidate.bytes, png, "under the ceiling the bytes pass through");
        assert_eq!(candidate.size_bytes, png.len());
        assert_eq!(candidate.extension(), "png");
    }

    assert_eq!(batch.failures.len(), 1);
    assert_eq!(batch.failures[0].provider, "HuggingSpace");
    assert!(batch.failures[0].reason.contains("quota exceeded"));
}

#[tokio::test]
async fn test_oversized_images_are_reencoded_under_ceiling() {
    let png = noise_png(256, 256);
    let addr = spawn_aggregator(png.clone()).await;
    let ceiling = 20_000;
    assert!(png.len() > ceiling);

    let http = reqwest::Client::new();
    let pipeline = ImagePipeline::new(
        http.clone(),
        ModelProviderMap::builtin(),
        ProviderRegistry::new(http, format!("http://{addr}")),
        ceiling,
    );

    let batch = pipeline.generate("flux", "static").await;
    assert_eq!(batch.candidates.len(), 2);
    for candidate in &batch.candidates {
        assert!(candidate.size_bytes <= ceiling, "got {} bytes", candidate.size_bytes);
        assert_eq!(candidate.extension(), "jpg");
        assert!(candidate.file_name().ends_with(".jpg"));
    }
}

#[tokio::test]
async fn test_model_without_providers_yields_empty_batch() {
    let http = reqwest::Client::new();
    let models = ModelProviderMap::from_entries([("ghost", vec![])], vec![]);
    let pipeline = ImagePipeline::new(
        http.clone(),
        models,
        ProviderRegistry::new(http, "http://127.0.0.1:9"),
        CEILING,
    );

    let batch = pipeline.generate("ghost", "anything").await;
    assert!(batch.candidates.is_empty());
    assert!(batch.failures.is_empty());
    assert!(batch.all_failed());
}

#[tokio::test]
async fn test_every_provider_failing_is_reported() {
    let http = reqwest::Client::new();
    let models = ModelProviderMap::from_entries([("only-broken", vec!["Broken"])], vec![]);
    let registry = ProviderRegistry::new(http.clone(), "http://127.0.0.1:9")
        .register(Arc::new(BrokenProvider));
    let pipeline = ImagePipeline::new(http, models, registry, CEILING);

    let batch = pipeline.generate("only-broken", "x").await;
    assert!(batch.all_failed());
    assert_eq!(batch.failures.len(), 1);
    assert_eq!(batch.failures[0].provider, "Broken");
    assert!(batch.failures[0].reason.contains("model not supported"));
}

#[tokio::test]
async fn test_providers_run_concurrently_and_keep_preference_order() {
    let png = noise_png(16, 16);
    let http = reqwest::Client::new();
    let models = ModelProviderMap::from_entries([("pair", vec!["Slow", "Fast"])], vec![]);
    let registry = ProviderRegistry::new(http.clone(), "http://127.0.0.1:9")
        .register(Arc::new(InlineProvider {
            name: "Slow",
            delay: Duration::from_millis(300),
            png: png.clone(),
        }))
        .register(Arc::new(InlineProvider {
            name: "Fast",
            delay: Duration::from_millis(300),
            png,
        }));
    let pipeline = ImagePipeline::new(http, models, registry, CEILING);

    let started = Instant::now();
    let batch = pipeline.generate("pair", "dots").await;
    let elapsed = started.elapsed();

    assert!(elapsed < Duration::from_millis(550), "took {elapsed:?}");
    let labels: Vec<&str> = batch
        .candidates
        .iter()
        .map(|c| c.source_provider.as_str())
        .collect();
    assert_eq!(labels, ["Slow", "Fast"]);
}

#[tokio::test]
async fn test_unknown_model_uses_default_providers() {
    let png = noise_png(32, 32);
    let addr = spawn_aggregator(png).await;
    let http = reqwest::Client::new();
    let pipeline = ImagePipeline::new(
        http.clone(),
        ModelProviderMap::builtin(),
        ProviderRegistry::new(http, format!("http://{addr}")),
        CEILING,
    );

    let batch = pipeline.generate("not-a-real-model", "x").await;
    let labels: Vec<&str> = batch
        .candidates
        .iter()
        .map(|c| c.source_provider.as_str())
        .collect();
    assert_eq!(labels, ["PollinationsAI", "Together"]);
    assert!(batch.failures.is_empty());
}

#[tokio::test]
async fn test_download_failures_only_drop_their_own_candidate() {
    let png = noise_png(24, 24);
    let host = spawn_image_host(png.clone()).await;
    let http = reqwest::Client::new();
    let models =
        ModelProviderMap::from_entries([("mixed", vec!["Missing", "Good", "Stalled"])], vec![]);
    let registry = ProviderRegistry::new(http.clone(), "http://127.0.0.1:9")
        .register(Arc::new(UrlProvider {
            name: "Missing",
            url: format!("http://{host}/gone.png"),
        }))
        .register(Arc::new(UrlProvider {
            name: "Good",
            url: format!("http://{host}/ok.png"),
        }))
        .register(Arc::new(UrlProvider {
            name: "Stalled",
            url: format!("http://{host}/stall.png"),
        }));
    let pipeline = ImagePipeline::new(http, models, registry, CEILING)
        .with_download_timeout(Duration::from_millis(300));

    let started = Instant::now();
    let batch = pipeline.generate("mixed", "a lantern").await;
    assert!(started.elapsed() < Duration::from_secs(3));

    assert_eq!(batch.candidates.len(), 1);
    assert_eq!(batch.candidates[0].source_provider, "Good");
    assert_eq!(batch.candidates[0].bytes, png);

    let reasons: Vec<(&str, &str)> = batch
        .failures
        .iter()
        .map(|f| (f.provider.as_str(), f.reason.as_str()))
        .collect();
    assert_eq!(reasons.len(), 2);
    assert_eq!(reasons[0].0, "Missing");
    assert!(reasons[0].1.contains("status 404 Not Found"), "got {:?}", reasons[0].1);
    assert_eq!(reasons[1].0, "Stalled");
    assert!(reasons[1].1.contains("timed out"), "got {:?}", reasons[1].1);
}
