use poise::CreateReply;

use crate::music::queue as music_queue;
use crate::utils::embed;
use crate::{Context, Error};

/// Show the queue
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn queue(
    ctx: Context<'_>,
    #[description = "Page number"] page: Option<usize>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command only works in a server")?;

    let (current, songs) = music_queue::get_queue_list(&ctx.data().queue_manager, guild_id).await;
    let embed = embed::queue_list(current.as_ref(), &songs, page.unwrap_or(1));

    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}
