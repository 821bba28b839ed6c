use thiserror::Error;

const TTS_URL: &str = "https://translate.google.com/translate_tts";
/// The endpoint rejects longer `q` values.
pub const MAX_CHUNK_CHARS: usize = 200;
/// Upper bound on input so one command cannot turn into dozens of requests.
pub const MAX_TEXT_CHARS: usize = 1000;

#[derive(Debug, Error)]
pub enum TtsError {
    #[error("nothing to say")]
    EmptyText,
    #[error("text is longer than {} characters", MAX_TEXT_CHARS)]
    TooLong,
    #[error("speech service unavailable: {0}")]
    Http(#[from] reqwest::Error),
    #[error("speech service returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Splits on whitespace into pieces of at most `max` chars. Words longer than
/// `max` are cut hard.
pub fn split_text(text: &str, max: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word.to_string();
        while word.chars().count() > max {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            let head: String = word.chars().take(max).collect();
            word = word.chars().skip(max).collect();
            chunks.push(head);
        }
        if word.is_empty() {
            continue;
        }

        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Fetches MP3 audio for `text`, one request per chunk, concatenated.
pub async fn synthesize(
    client: &reqwest::Client,
    text: &str,
    lang: &str,
) -> Result<Vec<u8>, TtsError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(TtsError::EmptyText);
    }
    if text.chars().count() > MAX_TEXT_CHARS {
        return Err(TtsError::TooLong);
    }

    let chunks = split_text(text, MAX_CHUNK_CHARS);
    let total = chunks.len().to_string();
    let mut audio = Vec::new();

    for (idx, chunk) in chunks.iter().enumerate() {
        let idx = idx.to_string();
        let textlen = chunk.chars().count().to_string();
        let resp = client
            .get(TTS_URL)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", lang),
                ("q", chunk.as_str()),
                ("idx", idx.as_str()),
                ("total", total.as_str()),
                ("textlen", textlen.as_str()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(TtsError::Status(resp.status()));
        }
        audio.extend_from_slice(&resp.bytes().await?);
    }

    Ok(audio)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_short_text_single_chunk() {
        assert_eq!(split_text("hello world", 200), vec!["hello world"]);
    }

    #[test]
    fn test_split_respects_limit() {
        let text = "word ".repeat(100);
        let chunks = split_text(&text, 20);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 20);
        }
        assert_eq!(chunks.join(" "), text.trim());
    }

    #[test]
    fn test_split_long_word() {
        let chunks = split_text("abcdefghij xy", 4);
        assert_eq!(chunks, vec!["abcd", "efgh", "ij", "xy"]);
    }

    #[test]
    fn test_split_multibyte() {
        let chunks = split_text("안녕하세요 반갑습니다", 5);
        assert_eq!(chunks, vec!["안녕하세요", "반갑습니다"]);
    }

    #[tokio::test]
    async fn test_empty_text_rejected() {
        let client = reqwest::Client::new();
        assert!(matches!(
            synthesize(&client, "   ", "en").await,
            Err(TtsError::EmptyText)
        ));
    }

    #[tokio::test]
    async fn test_too_long_rejected() {
        let client = reqwest::Client::new();
        let text = "a".repeat(MAX_TEXT_CHARS + 1);
        assert!(matches!(
            synthesize(&client, &text, "en").await,
            Err(TtsError::TooLong)
        ));
    }
}
