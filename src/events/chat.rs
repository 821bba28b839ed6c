use poise::serenity_prelude as serenity;
use tracing::error;

use crate::commands::{converse, failure_message};
use crate::session::SessionKey;
use crate::utils::text::strip_mention;
use crate::{Data, Error};

/// Mentions in a guild and every DM are treated like `ask`, as long as the
/// message is not a prefixed command and the channel is allowed.
pub async fn handle(
    ctx: &serenity::Context,
    msg: &serenity::Message,
    framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    if msg.author.bot {
        return Ok(());
    }

    let prefix = framework.options.prefix_options.prefix.as_deref();
    if prefix.is_some_and(|p| msg.content.starts_with(p)) {
        return Ok(());
    }

    let bot_id = framework.bot_id;
    let is_dm = msg.guild_id.is_none();
    if !is_dm && !msg.mentions_user_id(bot_id) {
        return Ok(());
    }

    if let Some(guild_id) = msg.guild_id {
        if !data
            .sessions
            .is_channel_allowed(SessionKey::Guild(guild_id.get()), msg.channel_id.get())
        {
            return Ok(());
        }
    }

    let question = strip_mention(&msg.content, bot_id.get());
    if question.is_empty() {
        msg.reply(ctx, "Hi! Ask me anything, or use `help` to see my commands.")
            .await?;
        return Ok(());
    }

    let _ = msg.channel_id.broadcast_typing(&ctx.http).await;

    match converse(data, msg.author.id.get(), &question).await {
        Ok(chunks) => {
            for chunk in chunks {
                msg.reply(ctx, chunk).await?;
            }
        }
        Err(e) => {
            error!("Chat error for user {}: {e}", msg.author.id);
            msg.reply(ctx, failure_message(&e)).await?;
        }
    }
    Ok(())
}
