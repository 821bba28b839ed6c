use poise::CreateReply;

use crate::music::queue;
use crate::utils::embed;
use crate::{Context, Error};

/// Stop playback and clear the queue
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn stop(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command only works in a server")?;

    if queue::is_empty(&ctx.data().queue_manager, guild_id).await {
        ctx.send(CreateReply::default().embed(embed::error("Nothing is playing.")))
            .await?;
        return Ok(());
    }

    if let Some(handle) = queue::clear(&ctx.data().queue_manager, guild_id).await {
        let _ = handle.stop();
    }

    ctx.say("⏹️ Stopped playback and cleared the queue.").await?;
    Ok(())
}
