use tracing::error;

use crate::aggregator::{AggregatorError, Role};
use crate::session::SessionKey;
use crate::utils::text::{split_message, MESSAGE_LIMIT};
use crate::{Context, Data, Error};

/// Runs one conversational turn for `user_id` and returns the reply already
/// split into sendable chunks. The question stays in history even if the
/// aggregator fails.
pub async fn converse(
    data: &Data,
    user_id: u64,
    question: &str,
) -> Result<Vec<String>, AggregatorError> {
    let key = SessionKey::User(user_id);
    data.sessions.append_turn(key, Role::User, question);

    let history = data.sessions.get_history(key);
    let answer = data.aggregator.chat(&history).await?;

    data.sessions.append_turn(key, Role::Assistant, answer.as_str());
    Ok(split_message(&answer, MESSAGE_LIMIT))
}

pub fn failure_message(e: &AggregatorError) -> String {
    format!("Sorry, I encountered an error: {e}")
}

async fn ask_impl(ctx: Context<'_>, question: Option<String>) -> Result<(), Error> {
    let question = match question.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => q.to_string(),
        _ => {
            ctx.say("Please ask a question! Example: `!ask what is the speed of light?`")
                .await?;
            return Ok(());
        }
    };

    ctx.defer_or_broadcast().await?;

    match converse(ctx.data(), ctx.author().id.get(), &question).await {
        Ok(chunks) => {
            for chunk in chunks {
                ctx.say(chunk).await?;
            }
        }
        Err(e) => {
            error!("Chat error for user {}: {e}", ctx.author().id);
            ctx.say(failure_message(&e)).await?;
        }
    }
    Ok(())
}

/// Ask the AI a question
#[poise::command(slash_command, prefix_command)]
pub async fn ask(
    ctx: Context<'_>,
    #[description = "Your question"]
    #[rest]
    question: Option<String>,
) -> Result<(), Error> {
    ask_impl(ctx, question).await
}

/// Ask the AI a question (ask shortcut)
#[poise::command(slash_command, prefix_command)]
pub async fn chat(
    ctx: Context<'_>,
    #[description = "Your question"]
    #[rest]
    question: Option<String>,
) -> Result<(), Error> {
    ask_impl(ctx, question).await
}
