use poise::CreateReply;

use crate::music::{player, queue, source};
use crate::utils::embed;
use crate::{Context, Error};

async fn play_impl(ctx: Context<'_>, query: Option<String>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command only works in a server")?;

    let query = match query.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => q.to_string(),
        _ => {
            ctx.say(format!("Usage: `{}play <song name or URL>`", ctx.prefix()))
                .await?;
            return Ok(());
        }
    };

    let channel_id = {
        let guild = ctx.guild().ok_or("Could not read server information")?;
        guild
            .voice_states
            .get(&ctx.author().id)
            .and_then(|vs| vs.channel_id)
    };

    let Some(channel_id) = channel_id else {
        ctx.send(CreateReply::default().embed(embed::error("Join a voice channel first!")))
            .await?;
        return Ok(());
    };

    ctx.defer_or_broadcast().await?;

    let mut song = match source::get_song_info(&query).await {
        Ok(s) => s,
        Err(e) => {
            ctx.send(
                CreateReply::default().embed(embed::error(&format!("Could not find that song: {e}"))),
            )
            .await?;
            return Ok(());
        }
    };
    song.requester = ctx.author().name.clone();

    let manager = songbird::get(ctx.serenity_context())
        .await
        .ok_or("Voice client not initialised")?;
    let call = manager.join(guild_id, channel_id).await?;

    let data = ctx.data();
    let is_first = queue::is_empty(&data.queue_manager, guild_id).await;
    let position = queue::add_song(&data.queue_manager, guild_id, song.clone()).await;

    if is_first {
        if let Some(next) = queue::get_next_song(&data.queue_manager, guild_id).await {
            player::play_song(guild_id, &data.queue_manager, &data.http_client, &call, &next)
                .await?;
            ctx.send(CreateReply::default().embed(embed::now_playing(&next)))
                .await?;
        }
    } else {
        ctx.send(CreateReply::default().embed(embed::added_to_queue(&song, position)))
            .await?;
    }

    Ok(())
}

/// Play a song or add it to the queue
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn play(
    ctx: Context<'_>,
    #[description = "Song name or URL"]
    #[rest]
    query: Option<String>,
) -> Result<(), Error> {
    play_impl(ctx, query).await
}
