use poise::serenity_prelude as serenity;
use poise::CreateReply;

use crate::session::SessionKey;
use crate::utils::embed;
use crate::{Context, Error};

/// Commands that keep working in any channel so a restriction can always be undone.
pub const EXEMPT_COMMANDS: &[&str] = &["allowchannel", "disallowchannel", "clearchannels", "channels"];

fn guild_key(ctx: &Context<'_>) -> Result<SessionKey, Error> {
    let guild_id = ctx.guild_id().ok_or("This command only works in a server")?;
    Ok(SessionKey::Guild(guild_id.get()))
}

/// Framework-wide check: `false` silently drops the invocation.
pub async fn check_channel(ctx: Context<'_>) -> Result<bool, Error> {
    if EXEMPT_COMMANDS.contains(&ctx.command().name.as_str()) {
        return Ok(true);
    }
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(true);
    };
    Ok(ctx
        .data()
        .sessions
        .is_channel_allowed(SessionKey::Guild(guild_id.get()), ctx.channel_id().get()))
}

/// Let the bot respond in a channel
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    required_permissions = "MANAGE_GUILD"
)]
pub async fn allowchannel(
    ctx: Context<'_>,
    #[description = "Channel (defaults to this one)"] channel: Option<serenity::GuildChannel>,
) -> Result<(), Error> {
    let key = guild_key(&ctx)?;
    let channel_id = channel.map_or(ctx.channel_id(), |c| c.id);

    if ctx.data().sessions.allow_channel(key, channel_id.get()) {
        ctx.say(format!("✅ I will now respond in <#{channel_id}>.")).await?;
    } else {
        ctx.say(format!("<#{channel_id}> is already allowed.")).await?;
    }
    Ok(())
}

/// Stop the bot responding in a channel
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    required_permissions = "MANAGE_GUILD"
)]
pub async fn disallowchannel(
    ctx: Context<'_>,
    #[description = "Channel (defaults to this one)"] channel: Option<serenity::GuildChannel>,
) -> Result<(), Error> {
    let key = guild_key(&ctx)?;
    let channel_id = channel.map_or(ctx.channel_id(), |c| c.id);

    if ctx.data().sessions.disallow_channel(key, channel_id.get()) {
        let remaining = ctx.data().sessions.get_allowed_channels(key);
        let note = if remaining.is_empty() {
            " No restrictions remain, so I respond everywhere."
        } else {
            ""
        };
        ctx.say(format!("🚫 Removed <#{channel_id}> from the allowed list.{note}"))
            .await?;
    } else {
        ctx.say(format!("<#{channel_id}> was not in the allowed list."))
            .await?;
    }
    Ok(())
}

/// Remove all channel restrictions
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    required_permissions = "MANAGE_GUILD"
)]
pub async fn clearchannels(ctx: Context<'_>) -> Result<(), Error> {
    let key = guild_key(&ctx)?;
    ctx.data().sessions.clear_allowed_channels(key);
    ctx.say("✅ Channel restrictions cleared. I respond in every channel.")
        .await?;
    Ok(())
}

/// List the channels the bot responds in
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn channels(ctx: Context<'_>) -> Result<(), Error> {
    let key = guild_key(&ctx)?;
    let allowed = ctx.data().sessions.get_allowed_channels(key);

    let description = if allowed.is_empty() {
        "No restrictions: I respond in every channel.".to_string()
    } else {
        allowed
            .iter()
            .map(|id| format!("• <#{id}>"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    ctx.send(CreateReply::default().embed(embed::info("📌 Allowed Channels", &description)))
        .await?;
    Ok(())
}
