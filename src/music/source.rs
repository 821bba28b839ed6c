use serde::Deserialize;
use thiserror::Error;
use tokio::process::Command;

use super::{format_duration, Song};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("yt-dlp is not available: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("yt-dlp failed: {0}")]
    Failed(String),
    #[error("unexpected yt-dlp output: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct YtDlpOutput {
    title: Option<String>,
    duration: Option<f64>,
    webpage_url: Option<String>,
    original_url: Option<String>,
}

pub fn is_url(query: &str) -> bool {
    query.starts_with("http://") || query.starts_with("https://")
}

fn parse_output(stdout: &[u8], query: &str) -> Result<Song, SourceError> {
    let info: YtDlpOutput = serde_json::from_slice(stdout)?;
    let url = info
        .webpage_url
        .or(info.original_url)
        .unwrap_or_else(|| query.to_string());

    Ok(Song {
        title: info.title.unwrap_or_else(|| "Unknown title".to_string()),
        url,
        duration: info.duration.map(format_duration),
        requester: String::new(),
    })
}

/// Resolves a URL or free-text search (first YouTube hit) into a playable song.
pub async fn get_song_info(query: &str) -> Result<Song, SourceError> {
    let target = if is_url(query) {
        query.to_string()
    } else {
        format!("ytsearch1:{query}")
    };

    let output = Command::new("yt-dlp")
        .args(["-j", "-f", "bestaudio", "--no-playlist", "--no-warnings"])
        .arg(&target)
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SourceError::Failed(stderr.trim().to_string()));
    }

    parse_output(&output.stdout, query)
}
