use poise::CreateReply;

use crate::session::SessionKey;
use crate::utils::embed;
use crate::{Context, Error};

fn scope(ctx: &Context<'_>) -> SessionKey {
    SessionKey::scope(ctx.guild_id().map(|g| g.get()), ctx.author().id.get())
}

/// List the available image models
#[poise::command(slash_command, prefix_command)]
pub async fn models(ctx: Context<'_>) -> Result<(), Error> {
    let current = ctx.data().sessions.get_image_model(scope(&ctx));
    let map = ctx.data().images.models();

    let lines: Vec<String> = map
        .models()
        .map(|model| {
            let providers = map.resolve(model).join(", ");
            if model.eq_ignore_ascii_case(&current) {
                format!("▶ **{model}** (current) — {providers}")
            } else {
                format!("• `{model}` — {providers}")
            }
        })
        .collect();

    ctx.send(CreateReply::default().embed(embed::info(
        "🖼️ Image Models",
        &format!(
            "{}\n\nUse `{}setmodel <model>` to switch.",
            lines.join("\n"),
            ctx.prefix()
        ),
    )))
    .await?;
    Ok(())
}

/// Choose the image model used by imagine
#[poise::command(slash_command, prefix_command)]
pub async fn setmodel(
    ctx: Context<'_>,
    #[description = "Model name, see models"] model: Option<String>,
) -> Result<(), Error> {
    let requested = match model.as_deref().map(str::trim) {
        Some(m) if !m.is_empty() => m.to_string(),
        _ => {
            ctx.say(format!("Usage: `{}setmodel <model>`", ctx.prefix()))
                .await?;
            return Ok(());
        }
    };

    let Some(canonical) = ctx.data().images.models().canonical(&requested) else {
        let known: Vec<&str> = ctx.data().images.models().models().collect();
        ctx.send(CreateReply::default().embed(embed::error(&format!(
            "Unknown model `{requested}`. Available: {}",
            known.join(", ")
        ))))
        .await?;
        return Ok(());
    };

    ctx.data().sessions.set_image_model(scope(&ctx), canonical);
    ctx.say(format!("✅ Image model set to **{canonical}**")).await?;
    Ok(())
}
