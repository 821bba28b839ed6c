use poise::serenity_prelude as serenity;
use poise::CreateReply;
use tracing::error;

use crate::speech::{self, TranscribeError, MAX_AUDIO_BYTES};
use crate::utils::embed;
use crate::utils::text::{split_message, MESSAGE_LIMIT};
use crate::{Context, Error};

const STT_LANG: &str = "en-US";

async fn transcribe_impl(
    ctx: Context<'_>,
    attachment: Option<serenity::Attachment>,
) -> Result<(), Error> {
    let Some(attachment) = attachment else {
        ctx.say(format!(
            "Please attach an audio file! Example: `{}transcribe` with a voice message attached",
            ctx.prefix()
        ))
        .await?;
        return Ok(());
    };

    if !speech::is_audio_attachment(attachment.content_type.as_deref(), &attachment.filename) {
        ctx.send(CreateReply::default().embed(embed::error(&format!(
            "`{}` doesn't look like an audio file.",
            attachment.filename
        ))))
        .await?;
        return Ok(());
    }
    if attachment.size > MAX_AUDIO_BYTES {
        ctx.send(CreateReply::default().embed(embed::error("That file is too large to transcribe.")))
            .await?;
        return Ok(());
    }

    ctx.defer_or_broadcast().await?;
    let audio = attachment.download().await?;

    let result = speech::transcribe(
        &ctx.data().http_client,
        ctx.data().speech_api_key.as_deref(),
        &audio,
        STT_LANG,
    )
    .await;

    match result {
        Ok(text) => {
            let chunks = split_message(&format!("📝 **Transcript:**\n{text}"), MESSAGE_LIMIT);
            for chunk in chunks {
                ctx.say(chunk).await?;
            }
        }
        Err(TranscribeError::Unintelligible) => {
            ctx.say("Sorry, I could not understand the audio.").await?;
        }
        Err(e @ TranscribeError::UnsupportedAudio(_)) => {
            ctx.send(CreateReply::default().embed(embed::error(&e.to_string())))
                .await?;
        }
        Err(e @ TranscribeError::Unavailable(_)) => {
            error!("Transcription failed: {e}");
            ctx.send(CreateReply::default().embed(embed::error(
                "The speech recognition service is unavailable right now.",
            )))
            .await?;
        }
    }
    Ok(())
}

/// Transcribe an attached audio file
#[poise::command(slash_command, prefix_command)]
pub async fn transcribe(
    ctx: Context<'_>,
    #[description = "Audio file"] attachment: Option<serenity::Attachment>,
) -> Result<(), Error> {
    transcribe_impl(ctx, attachment).await
}
