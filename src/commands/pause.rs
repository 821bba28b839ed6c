use poise::CreateReply;

use crate::music::queue;
use crate::utils::embed;
use crate::{Context, Error};

/// Pause the current song
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn pause(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command only works in a server")?;
    let manager = &ctx.data().queue_manager;

    match queue::get_track_handle(manager, guild_id).await {
        Some(handle) => {
            handle.pause()?;
            let title = queue::get_current(manager, guild_id)
                .await
                .map_or_else(|| "Unknown".to_string(), |s| s.title);
            ctx.say(format!("⏸️ Paused **{title}**")).await?;
        }
        None => {
            ctx.send(CreateReply::default().embed(embed::error("Nothing is playing.")))
                .await?;
        }
    }
    Ok(())
}
