use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;

const API_URL: &str = "https://api.themoviedb.org/3";
const CACHE_TTL: Duration = Duration::from_secs(3600);

pub type Cache = Arc<RwLock<HashMap<String, (Instant, Movie)>>>;

pub fn new_cache() -> Cache {
    Arc::new(RwLock::new(HashMap::new()))
}

#[derive(Debug, Error)]
pub enum MovieError {
    #[error("movie lookup is not configured")]
    NotConfigured,
    #[error("no movies found for \"{0}\"")]
    NotFound(String),
    #[error("could not reach the movie database: {0}")]
    Network(#[from] reqwest::Error),
    #[error("movie database returned status {0}")]
    Status(reqwest::StatusCode),
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Genre {
    pub name: String,
}

/// Details merged with external ids.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Movie {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub imdb_id: Option<String>,
}

impl Movie {
    pub fn year(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .filter(|d| d.len() >= 4)
            .map(|d| &d[..4])
    }

    pub fn poster_url(&self) -> Option<String> {
        self.poster_path
            .as_ref()
            .map(|p| format!("https://image.tmdb.org/t/p/w500{p}"))
    }

    pub fn tmdb_url(&self) -> String {
        format!("https://www.themoviedb.org/movie/{}", self.id)
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    id: u64,
}

#[derive(Deserialize)]
struct ExternalIds {
    imdb_id: Option<String>,
}

pub struct MovieClient {
    http: reqwest::Client,
    api_key: Option<String>,
    cache: Cache,
}

impl MovieClient {
    pub fn new(http: reqwest::Client, api_key: Option<String>) -> Self {
        Self {
            http,
            api_key,
            cache: new_cache(),
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        api_key: &str,
        path: &str,
        extra: &[(&str, &str)],
    ) -> Result<T, MovieError> {
        let resp = self
            .http
            .get(format!("{API_URL}{path}"))
            .query(&[("api_key", api_key), ("language", "en-US")])
            .query(extra)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(MovieError::Status(resp.status()));
        }
        Ok(resp.json().await?)
    }

    /// Best match for `query`, with details and IMDb id filled in.
    /// Successful lookups are cached for an hour.
    pub async fn lookup(&self, query: &str) -> Result<Movie, MovieError> {
        let api_key = self.api_key.as_deref().ok_or(MovieError::NotConfigured)?;
        let cache_key = query.trim().to_lowercase();

        {
            let cache = self.cache.read().await;
            if let Some((inserted_at, movie)) = cache.get(&cache_key) {
                if inserted_at.elapsed() < CACHE_TTL {
                    return Ok(movie.clone());
                }
            }
        }

        let search: SearchResponse = self
            .get(api_key, "/search/movie", &[("query", query.trim())])
            .await?;
        let hit = search
            .results
            .first()
            .ok_or_else(|| MovieError::NotFound(query.trim().to_string()))?;

        let mut movie: Movie = self.get(api_key, &format!("/movie/{}", hit.id), &[]).await?;
        if movie.imdb_id.is_none() {
            let ids: ExternalIds = self
                .get(api_key, &format!("/movie/{}/external_ids", hit.id), &[])
                .await?;
            movie.imdb_id = ids.imdb_id;
        }

        {
            let mut cache = self.cache.write().await;
            cache.insert(cache_key, (Instant::now(), movie.clone()));
            cache.retain(|_, (inserted_at, _)| inserted_at.elapsed() < CACHE_TTL);
        }

        Ok(movie)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Movie {
        serde_json::from_str(
            r#"{"id":27205,"title":"Inception","release_date":"2010-07-15","vote_average":8.369,
                "runtime":148,"genres":[{"id":28,"name":"Action"},{"id":878,"name":"Science Fiction"}],
                "overview":"Cobb steals secrets.","poster_path":"/abc.jpg","imdb_id":"tt1375666"}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_movie_helpers() {
        let movie = sample();
        assert_eq!(movie.year(), Some("2010"));
        assert_eq!(
            movie.poster_url().as_deref(),
            Some("https://image.tmdb.org/t/p/w500/abc.jpg")
        );
        assert_eq!(movie.tmdb_url(), "https://www.themoviedb.org/movie/27205");
        assert_eq!(movie.genres.len(), 2);
    }

    #[test]
    fn test_movie_sparse_details() {
        let movie: Movie = serde_json::from_str(r#"{"id":1,"title":"Untitled","release_date":""}"#).unwrap();
        assert_eq!(movie.year(), None);
        assert!(movie.poster_url().is_none());
        assert!(movie.genres.is_empty());
    }

    #[tokio::test]
    async fn test_lookup_without_key() {
        let client = MovieClient::new(reqwest::Client::new(), None);
        assert!(matches!(
            client.lookup("Inception").await,
            Err(MovieError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_cache_hit_skips_network() {
        let client = MovieClient::new(reqwest::Client::new(), Some("unused".to_string()));
        client
            .cache
            .write()
            .await
            .insert("inception".to_string(), (Instant::now(), sample()));

        let movie = client.lookup("  Inception ").await.unwrap();
        assert_eq!(movie.id, 27205);
    }
}
