use crate::session::SessionKey;
use crate::{Context, Error};

/// Clear your conversation history
#[poise::command(slash_command, prefix_command)]
pub async fn clear(ctx: Context<'_>) -> Result<(), Error> {
    let key = SessionKey::User(ctx.author().id.get());
    if ctx.data().sessions.clear_history(key) {
        ctx.say("✅ Your conversation history has been cleared!").await?;
    } else {
        ctx.say("You don't have any conversation history.").await?;
    }
    Ok(())
}
