use poise::CreateReply;

use crate::music::queue;
use crate::utils::embed;
use crate::{Context, Error};

async fn disconnect_impl(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command only works in a server")?;

    let manager = songbird::get(ctx.serenity_context())
        .await
        .ok_or("Voice client not initialised")?;

    if manager.get(guild_id).is_none() {
        ctx.send(CreateReply::default().embed(embed::error("I'm not in a voice channel.")))
            .await?;
        return Ok(());
    }

    // Drop the queue first so the track-end handler finds nothing to play.
    if let Some(handle) = queue::remove_guild(&ctx.data().queue_manager, guild_id).await {
        let _ = handle.stop();
    }
    manager.remove(guild_id).await?;

    ctx.say("👋 Disconnected from the voice channel.").await?;
    Ok(())
}

/// Leave the voice channel
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn disconnect(ctx: Context<'_>) -> Result<(), Error> {
    disconnect_impl(ctx).await
}

/// Leave the voice channel (disconnect shortcut)
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn leave(ctx: Context<'_>) -> Result<(), Error> {
    disconnect_impl(ctx).await
}
