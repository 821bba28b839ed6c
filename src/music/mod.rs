pub mod player;
pub mod queue;
pub mod source;

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use serenity::model::id::GuildId;
use songbird::tracks::TrackHandle;
use tokio::sync::RwLock;

#[derive(Clone, Debug, PartialEq)]
pub struct Song {
    pub title: String,
    pub url: String,
    pub duration: Option<String>,
    pub requester: String,
}

#[derive(Default)]
pub struct GuildQueue {
    pub songs: VecDeque<Song>,
    pub current_song: Option<Song>,
    pub track_handle: Option<TrackHandle>,
}

pub type QueueManager = Arc<RwLock<HashMap<GuildId, GuildQueue>>>;

pub fn new_queue_manager() -> QueueManager {
    Arc::new(RwLock::new(HashMap::new()))
}

/// `m:ss`, or `h:mm:ss` for anything an hour or longer.
pub fn format_duration(seconds: f64) -> String {
    let secs = seconds.max(0.0) as u64;
    let (hours, mins, rest) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours > 0 {
        format!("{hours}:{mins:02}:{rest:02}")
    } else {
        format!("{mins}:{rest:02}")
    }
}
