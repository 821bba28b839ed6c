use poise::CreateReply;

use crate::music::queue;
use crate::utils::embed;
use crate::{Context, Error};

/// Skip the current song
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn skip(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command only works in a server")?;
    let manager = &ctx.data().queue_manager;

    let (Some(current), Some(handle)) = (
        queue::get_current(manager, guild_id).await,
        queue::get_track_handle(manager, guild_id).await,
    ) else {
        ctx.send(CreateReply::default().embed(embed::error("Nothing is playing.")))
            .await?;
        return Ok(());
    };

    let next = queue::peek_next(manager, guild_id).await;
    // Stopping fires the track-end handler, which starts the next song.
    handle.stop()?;

    let msg = match next {
        Some(next_song) => format!("⏭️ Skipped **{}** → **{}**", current.title, next_song.title),
        None => format!("⏭️ Skipped **{}** (queue is empty)", current.title),
    };
    ctx.say(msg).await?;
    Ok(())
}
