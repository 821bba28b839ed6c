pub mod chat;

use poise::serenity_prelude as serenity;
use tracing::info;

use crate::{Data, Error};

pub async fn handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            let guilds = data_about_bot.guilds.len();
            data.status.mark_ready(&data_about_bot.user.tag(), guilds);
            info!("Logged in as {} in {guilds} guild(s)", data_about_bot.user.tag());
        }
        serenity::FullEvent::GuildCreate { guild, is_new } => {
            data.status.set_guilds(ctx.cache.guild_count());
            if *is_new == Some(true) {
                info!("Joined guild {} ({})", guild.name, guild.id);
            }
        }
        serenity::FullEvent::GuildDelete { incomplete, .. } => {
            data.status.set_guilds(ctx.cache.guild_count());
            if !incomplete.unavailable {
                info!("Removed from guild {}", incomplete.id);
            }
        }
        serenity::FullEvent::Message { new_message } => {
            chat::handle(ctx, new_message, framework, data).await?;
        }
        _ => {}
    }
    Ok(())
}
