pub mod aggregator;
pub mod commands;
pub mod config;
pub mod events;
pub mod health;
pub mod imaging;
pub mod movies;
pub mod music;
pub mod session;
pub mod speech;
pub mod utils;

use std::sync::Arc;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

pub struct Data {
    pub sessions: session::SessionStore,
    pub aggregator: aggregator::AggregatorClient,
    pub images: imaging::ImagePipeline,
    pub movies: movies::MovieClient,
    pub queue_manager: music::QueueManager,
    pub http_client: reqwest::Client,
    pub status: Arc<health::StatusBoard>,
    pub speech_api_key: Option<String>,
}

impl Data {
    pub fn new(config: &config::Config, status: Arc<health::StatusBoard>) -> Self {
        let http_client = reqwest::Client::new();
        let registry =
            imaging::ProviderRegistry::new(http_client.clone(), config.aggregator_url.clone());

        Self {
            sessions: session::SessionStore::new(config.default_image_model.clone()),
            aggregator: aggregator::AggregatorClient::new(
                http_client.clone(),
                config.aggregator_url.clone(),
                config.chat_model.clone(),
            ),
            images: imaging::ImagePipeline::new(
                http_client.clone(),
                imaging::ModelProviderMap::builtin(),
                registry,
                config.size_ceiling,
            ),
            movies: movies::MovieClient::new(http_client.clone(), config.tmdb_api_key.clone()),
            queue_manager: music::new_queue_manager(),
            http_client,
            status,
            speech_api_key: config.speech_api_key.clone(),
        }
    }
}
