use poise::CreateReply;
use serenity::builder::{CreateAttachment, CreateEmbedFooter};
use tracing::warn;

use crate::session::SessionKey;
use crate::utils::embed;
use crate::{Context, Error};

async fn imagine_impl(ctx: Context<'_>, prompt: Option<String>) -> Result<(), Error> {
    let prompt = match prompt.as_deref().map(str::trim) {
        Some(p) if !p.is_empty() => p.to_string(),
        _ => {
            ctx.say(format!(
                "Please provide a prompt! Example: `{}imagine a beautiful sunset`",
                ctx.prefix()
            ))
            .await?;
            return Ok(());
        }
    };

    let key = SessionKey::scope(ctx.guild_id().map(|g| g.get()), ctx.author().id.get());
    let model = ctx.data().sessions.get_image_model(key);

    ctx.defer_or_broadcast().await?;
    let status = ctx
        .say(format!(
            "🎨 Generating image with **{model}**: *{prompt}*\nThis may take a moment..."
        ))
        .await?;

    let batch = ctx.data().images.generate(&model, &prompt).await;

    if batch.all_failed() {
        warn!("All providers failed for model {model}");
        let reasons: Vec<String> = batch
            .failures
            .iter()
            .map(|f| format!("• **{}**: {}", f.provider, f.reason))
            .collect();
        let message = if reasons.is_empty() {
            "No providers are configured for this model.".to_string()
        } else {
            format!("Every provider failed:\n{}", reasons.join("\n"))
        };
        status
            .edit(
                ctx,
                CreateReply::default()
                    .content("Sorry, I couldn't generate that image.")
                    .embed(embed::error(&message)),
            )
            .await?;
        return Ok(());
    }

    let failures = embed::image_failures(&batch);
    let count = batch.candidates.len();
    let mut reply = CreateReply::default().content(format!(
        "🎨 {count} image(s) for {}",
        ctx.author().name
    ));

    for (i, candidate) in batch.candidates.iter().enumerate() {
        let mut image_embed = embed::generated_image(candidate, &prompt, &model);
        if i + 1 == count {
            if let Some(ref footer) = failures {
                image_embed = image_embed.footer(CreateEmbedFooter::new(footer));
            }
        }
        reply = reply
            .attachment(CreateAttachment::bytes(
                candidate.bytes.clone(),
                candidate.file_name(),
            ))
            .embed(image_embed);
    }

    ctx.send(reply).await?;
    let _ = status.delete(ctx).await;
    Ok(())
}

/// Generate images from every provider of the selected model
#[poise::command(slash_command, prefix_command)]
pub async fn imagine(
    ctx: Context<'_>,
    #[description = "What to draw"]
    #[rest]
    prompt: Option<String>,
) -> Result<(), Error> {
    imagine_impl(ctx, prompt).await
}
