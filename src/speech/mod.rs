pub mod stt;
pub mod tts;

pub use stt::{transcribe, TranscribeError};
pub use tts::{synthesize, TtsError};

/// Attachments over this size are refused before downloading.
pub const MAX_AUDIO_BYTES: u32 = 25 * 1024 * 1024;

pub fn is_audio_attachment(content_type: Option<&str>, filename: &str) -> bool {
    if content_type.is_some_and(|ct| ct.starts_with("audio/") || ct.starts_with("video/")) {
        return true;
    }
    let lower = filename.to_ascii_lowercase();
    [".mp3", ".wav", ".ogg", ".oga", ".m4a", ".flac", ".webm", ".mp4", ".aac", ".opus"]
        .iter()
        .any(|ext| lower.ends_with(ext))
}
