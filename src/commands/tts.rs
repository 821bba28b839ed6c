use poise::CreateReply;
use serenity::builder::CreateAttachment;
use tracing::error;

use crate::speech::{self, TtsError};
use crate::utils::embed;
use crate::{Context, Error};

const TTS_LANG: &str = "en";

async fn tts_impl(ctx: Context<'_>, text: Option<String>) -> Result<(), Error> {
    let text = text.unwrap_or_default();
    ctx.defer_or_broadcast().await?;

    match speech::synthesize(&ctx.data().http_client, &text, TTS_LANG).await {
        Ok(audio) => {
            ctx.send(
                CreateReply::default()
                    .content("🔊 Here you go:")
                    .attachment(CreateAttachment::bytes(audio, "speech.mp3")),
            )
            .await?;
        }
        Err(TtsError::EmptyText) => {
            ctx.say(format!(
                "Please provide some text! Example: `{}tts hello world`",
                ctx.prefix()
            ))
            .await?;
        }
        Err(e @ TtsError::TooLong) => {
            ctx.send(CreateReply::default().embed(embed::error(&e.to_string())))
                .await?;
        }
        Err(e) => {
            error!("TTS failed: {e}");
            ctx.send(CreateReply::default().embed(embed::error(&format!(
                "Text-to-speech service unavailable: {e}"
            ))))
            .await?;
        }
    }
    Ok(())
}

/// Convert text to speech
#[poise::command(slash_command, prefix_command)]
pub async fn tts(
    ctx: Context<'_>,
    #[description = "Text to speak"]
    #[rest]
    text: Option<String>,
) -> Result<(), Error> {
    tts_impl(ctx, text).await
}
