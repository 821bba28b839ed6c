use std::sync::Arc;

use async_trait::async_trait;
use serenity::model::id::GuildId;
use songbird::events::{Event, EventContext, EventHandler, TrackEvent};
use songbird::input::YoutubeDl;
use songbird::tracks::TrackHandle;
use songbird::Call;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use super::queue::{self, Advance};
use super::{QueueManager, Song};
use crate::Error;

/// Advances the guild queue whenever the current track ends or is stopped.
struct TrackEndNotifier {
    guild_id: GuildId,
    queue_manager: QueueManager,
    http_client: reqwest::Client,
    call: Arc<Mutex<Call>>,
}

#[async_trait]
impl EventHandler for TrackEndNotifier {
    async fn act(&self, ctx: &EventContext<'_>) -> Option<Event> {
        let EventContext::Track(tracks) = ctx else {
            return None;
        };
        let ended: Vec<TrackHandle> = tracks.iter().map(|(_, handle)| (*handle).clone()).collect();

        let guild_id = self.guild_id;
        let queue_manager = self.queue_manager.clone();
        let http_client = self.http_client.clone();
        let call = self.call.clone();

        tokio::spawn(async move {
            if let Err(e) = advance(guild_id, &queue_manager, &http_client, &call, &ended).await {
                error!("Failed to start next track in guild {guild_id}: {e}");
            }
        });

        None
    }
}

pub async fn play_song(
    guild_id: GuildId,
    queue_manager: &QueueManager,
    http_client: &reqwest::Client,
    call: &Arc<Mutex<Call>>,
    song: &Song,
) -> Result<(), Error> {
    let src = YoutubeDl::new(http_client.clone(), song.url.clone());

    let track_handle = {
        let mut handler = call.lock().await;
        let track_handle = handler.play_only_input(src.into());
        track_handle.add_event(
            Event::Track(TrackEvent::End),
            TrackEndNotifier {
                guild_id,
                queue_manager: queue_manager.clone(),
                http_client: http_client.clone(),
                call: call.clone(),
            },
        )?;
        track_handle
    };

    queue::set_track_handle(queue_manager, guild_id, Some(track_handle)).await;
    info!("Now playing in guild {guild_id}: {}", song.title);
    Ok(())
}

async fn advance(
    guild_id: GuildId,
    queue_manager: &QueueManager,
    http_client: &reqwest::Client,
    call: &Arc<Mutex<Call>>,
    ended: &[TrackHandle],
) -> Result<(), Error> {
    match queue::advance_after(queue_manager, guild_id, ended).await {
        Advance::Next(song) => play_song(guild_id, queue_manager, http_client, call, &song).await,
        Advance::Finished => {
            info!("Queue finished in guild {guild_id}");
            Ok(())
        }
        Advance::Stale => {
            debug!("Ignoring end of a track that is no longer current in guild {guild_id}");
            Ok(())
        }
    }
}
