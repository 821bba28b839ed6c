use std::process::Stdio;

use serde::Deserialize;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

const RECOGNIZE_URL: &str = "https://www.google.com/speech-api/v2/recognize";
const SAMPLE_RATE: u32 = 16_000;

#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error("unsupported or corrupt audio: {0}")]
    UnsupportedAudio(String),
    #[error("could not understand the audio")]
    Unintelligible,
    #[error("speech recognition service unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for TranscribeError {
    fn from(e: reqwest::Error) -> Self {
        Self::Unavailable(e.to_string())
    }
}

#[derive(Deserialize)]
struct RecognizeLine {
    #[serde(default)]
    result: Vec<RecognizeResult>,
}

#[derive(Deserialize)]
struct RecognizeResult {
    #[serde(default)]
    alternative: Vec<Alternative>,
}

#[derive(Deserialize)]
struct Alternative {
    transcript: Option<String>,
}

/// Converts whatever the user uploaded into 16 kHz mono FLAC through `ffmpeg`.
pub async fn to_flac(audio: &[u8]) -> Result<Vec<u8>, TranscribeError> {
    let mut child = Command::new("ffmpeg")
        .args([
            "-hide_banner",
            "-loglevel",
            "error",
            "-i",
            "pipe:0",
            "-ac",
            "1",
            "-ar",
            "16000",
            "-f",
            "flac",
            "pipe:1",
        ])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| TranscribeError::Unavailable(format!("ffmpeg not available: {e}")))?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| TranscribeError::Unavailable("ffmpeg stdin closed".to_string()))?;
    let input = audio.to_vec();
    // Feed stdin concurrently so a full stdout pipe cannot deadlock ffmpeg.
    let writer = tokio::spawn(async move {
        let _ = stdin.write_all(&input).await;
        let _ = stdin.shutdown().await;
    });

    let output = child
        .wait_with_output()
        .await
        .map_err(|e| TranscribeError::Unavailable(format!("ffmpeg failed: {e}")))?;
    let _ = writer.await;

    if !output.status.success() || output.stdout.is_empty() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(TranscribeError::UnsupportedAudio(
            stderr.lines().last().unwrap_or("ffmpeg error").to_string(),
        ));
    }
    Ok(output.stdout)
}

/// Picks the first non-empty transcript out of the recognizer's
/// newline-delimited JSON.
pub fn parse_transcript(body: &str) -> Result<String, TranscribeError> {
    body.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str::<RecognizeLine>(line).ok())
        .flat_map(|line| line.result)
        .flat_map(|result| result.alternative)
        .filter_map(|alt| alt.transcript)
        .map(|t| t.trim().to_string())
        .find(|t| !t.is_empty())
        .ok_or(TranscribeError::Unintelligible)
}

pub async fn recognize(
    client: &reqwest::Client,
    api_key: &str,
    flac: Vec<u8>,
    lang: &str,
) -> Result<String, TranscribeError> {
    let resp = client
        .post(RECOGNIZE_URL)
        .query(&[("client", "chromium"), ("lang", lang), ("key", api_key)])
        .header(
            reqwest::header::CONTENT_TYPE,
            format!("audio/x-flac; rate={SAMPLE_RATE}"),
        )
        .body(flac)
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        return Err(TranscribeError::Unavailable(format!("status {status}")));
    }
    parse_transcript(&resp.text().await?)
}

/// Full path from uploaded bytes to text.
pub async fn transcribe(
    client: &reqwest::Client,
    api_key: Option<&str>,
    audio: &[u8],
    lang: &str,
) -> Result<String, TranscribeError> {
    let api_key = api_key
        .ok_or_else(|| TranscribeError::Unavailable("no recognizer key configured".to_string()))?;
    let flac = to_flac(audio).await?;
    recognize(client, api_key, flac, lang).await
}
