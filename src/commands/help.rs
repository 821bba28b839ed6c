use poise::CreateReply;
use serenity::builder::CreateEmbed;

use crate::{Context, Error};

async fn help_impl(ctx: Context<'_>) -> Result<(), Error> {
    let p = ctx.prefix();

    let chat_cmds = format!(
        "\
`{p}ask` (`{p}chat`) — Ask the AI anything
Mention me or DM me to chat without a command
`{p}clear` — Clear your conversation history
`{p}ping` — Check bot latency"
    );

    let image_cmds = format!(
        "\
`{p}imagine` — Generate images from several providers at once
`{p}models` — List image models
`{p}setmodel` — Pick the image model for this server"
    );

    let media_cmds = format!(
        "\
`{p}tts` — Turn text into speech
`{p}transcribe` — Transcribe an attached audio file
`{p}movie` — Movie info and streaming links"
    );

    let music_cmds = format!(
        "\
`{p}play` — Play a song or add it to the queue
`{p}pause` / `{p}resume` — Pause or resume playback
`{p}skip` — Skip the current song
`{p}stop` — Stop and clear the queue
`{p}queue` — Show the queue
`{p}nowplaying` (`{p}np`) — Show the current song
`{p}disconnect` (`{p}leave`) — Leave the voice channel"
    );

    let admin_cmds = format!(
        "\
`{p}allowchannel` / `{p}disallowchannel` — Restrict where I respond
`{p}clearchannels` — Respond everywhere again
`{p}channels` — List allowed channels"
    );

    let embed = CreateEmbed::new()
        .title("🤖 AI Bot Help")
        .description("I'm an AI assistant powered by g4f!")
        .field("💬 Chat", chat_cmds, false)
        .field("🎨 Images", image_cmds, false)
        .field("🔊 Media", media_cmds, false)
        .field("🎵 Music", music_cmds, false)
        .field("🛡️ Channels (Manage Server)", admin_cmds, false)
        .color(0x57F287);

    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Show all commands
#[poise::command(slash_command, prefix_command)]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    help_impl(ctx).await
}
