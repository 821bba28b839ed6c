use poise::CreateReply;

use crate::music::queue;
use crate::utils::embed;
use crate::{Context, Error};

async fn nowplaying_impl(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command only works in a server")?;
    let manager = &ctx.data().queue_manager;

    let Some(song) = queue::get_current(manager, guild_id).await else {
        ctx.send(CreateReply::default().embed(embed::error("Nothing is playing.")))
            .await?;
        return Ok(());
    };

    let is_paused = match queue::get_track_handle(manager, guild_id).await {
        Some(h) => h
            .get_info()
            .await
            .map(|info| info.playing == songbird::tracks::PlayMode::Pause)
            .unwrap_or(false),
        None => false,
    };

    let mut e = embed::now_playing(&song);
    if is_paused {
        e = e.field("State", "⏸️ Paused", true);
    }
    let (_, upcoming) = queue::get_queue_list(manager, guild_id).await;
    if let Some(next) = upcoming.first() {
        e = e.field("Up next", &next.title, false);
    }

    ctx.send(CreateReply::default().embed(e)).await?;
    Ok(())
}

/// Show the current song
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn nowplaying(ctx: Context<'_>) -> Result<(), Error> {
    nowplaying_impl(ctx).await
}

/// Show the current song (nowplaying shortcut)
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn np(ctx: Context<'_>) -> Result<(), Error> {
    nowplaying_impl(ctx).await
}
