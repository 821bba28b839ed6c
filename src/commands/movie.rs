use poise::CreateReply;
use tracing::warn;

use crate::movies::{self, MovieError};
use crate::utils::embed;
use crate::{Context, Error};

async fn movie_impl(ctx: Context<'_>, title: Option<String>) -> Result<(), Error> {
    let title = match title.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => {
            ctx.say(format!("Usage: `{}movie <title>`", ctx.prefix()))
                .await?;
            return Ok(());
        }
    };

    ctx.defer_or_broadcast().await?;

    match ctx.data().movies.lookup(&title).await {
        Ok(movie) => {
            ctx.send(CreateReply::default().embed(movies::embed::movie(&movie)))
                .await?;
        }
        Err(e @ (MovieError::NotFound(_) | MovieError::NotConfigured)) => {
            ctx.send(CreateReply::default().embed(embed::error(&e.to_string())))
                .await?;
        }
        Err(e) => {
            warn!("Movie lookup failed for {title:?}: {e}");
            ctx.send(CreateReply::default().embed(embed::error(&e.to_string())))
                .await?;
        }
    }
    Ok(())
}

/// Look up a movie and where to stream it
#[poise::command(slash_command, prefix_command)]
pub async fn movie(
    ctx: Context<'_>,
    #[description = "Movie title"]
    #[rest]
    title: Option<String>,
) -> Result<(), Error> {
    movie_impl(ctx, title).await
}
