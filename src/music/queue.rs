use serenity::model::id::GuildId;
use songbird::tracks::TrackHandle;

use super::{QueueManager, Song};

/// Appends a song and returns its position among the waiting songs.
pub async fn add_song(manager: &QueueManager, guild_id: GuildId, song: Song) -> usize {
    let mut queues = manager.write().await;
    let queue = queues.entry(guild_id).or_default();
    queue.songs.push_back(song);
    queue.songs.len()
}

/// Pops the next waiting song and makes it current.
pub async fn get_next_song(manager: &QueueManager, guild_id: GuildId) -> Option<Song> {
    let mut queues = manager.write().await;
    let queue = queues.entry(guild_id).or_default();
    let next = queue.songs.pop_front();
    queue.current_song = next.clone();
    next
}

/// What a track-end event did to the queue.
#[derive(Debug, PartialEq)]
pub enum Advance {
    /// The ended track was not the stored current one (stopped, replaced,
    /// or the guild was left), so nothing changed.
    Stale,
    Next(Song),
    Finished,
}

/// Advances only when one of `ended` is the stored current track. Check and
/// pop happen under one write lock so a concurrent `play` cannot interleave.
pub async fn advance_after(manager: &QueueManager, guild_id: GuildId, ended: &[TrackHandle]) -> Advance {
    let mut queues = manager.write().await;
    let Some(queue) = queues.get_mut(&guild_id) else {
        return Advance::Stale;
    };

    let current = queue.track_handle.as_ref().map(TrackHandle::uuid);
    if !ends_current(current, ended.iter().map(TrackHandle::uuid)) {
        return Advance::Stale;
    }

    queue.current_song = queue.songs.pop_front();
    match queue.current_song.clone() {
        Some(song) => Advance::Next(song),
        None => {
            queue.track_handle = None;
            Advance::Finished
        }
    }
}

fn ends_current<T: PartialEq>(current: Option<T>, mut ended: impl Iterator<Item = T>) -> bool {
    current.is_some_and(|current| ended.any(|id| id == current))
}

pub async fn peek_next(manager: &QueueManager, guild_id: GuildId) -> Option<Song> {
    let queues = manager.read().await;
    queues.get(&guild_id).and_then(|q| q.songs.front().cloned())
}

/// Empties the queue; the returned handle is what was playing, if anything.
pub async fn clear(manager: &QueueManager, guild_id: GuildId) -> Option<TrackHandle> {
    let mut queues = manager.write().await;
    let queue = queues.get_mut(&guild_id)?;
    queue.songs.clear();
    queue.current_song = None;
    queue.track_handle.take()
}

pub async fn remove_guild(manager: &QueueManager, guild_id: GuildId) -> Option<TrackHandle> {
    let mut queues = manager.write().await;
    queues.remove(&guild_id).and_then(|q| q.track_handle)
}

pub async fn get_queue_list(manager: &QueueManager, guild_id: GuildId) -> (Option<Song>, Vec<Song>) {
    let queues = manager.read().await;
    match queues.get(&guild_id) {
        Some(queue) => (queue.current_song.clone(), queue.songs.iter().cloned().collect()),
        None => (None, vec![]),
    }
}

pub async fn get_current(manager: &QueueManager, guild_id: GuildId) -> Option<Song> {
    let queues = manager.read().await;
    queues.get(&guild_id).and_then(|q| q.current_song.clone())
}

pub async fn set_track_handle(manager: &QueueManager, guild_id: GuildId, handle: Option<TrackHandle>) {
    let mut queues = manager.write().await;
    if let Some(q) = queues.get_mut(&guild_id) {
        q.track_handle = handle;
    }
}

pub async fn get_track_handle(manager: &QueueManager, guild_id: GuildId) -> Option<TrackHandle> {
    let queues = manager.read().await;
    queues.get(&guild_id).and_then(|q| q.track_handle.clone())
}

pub async fn is_empty(manager: &QueueManager, guild_id: GuildId) -> bool {
    let queues = manager.read().await;
    queues
        .get(&guild_id)
        .map_or(true, |q| q.current_song.is_none() && q.songs.is_empty())
}
