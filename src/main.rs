use std::sync::Arc;
use std::time::Duration;

use aggregator_bot::{commands, config, events, health, Data, Error};
use poise::serenity_prelude as serenity;
use songbird::SerenityInit;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const LATENCY_REFRESH: Duration = Duration::from_secs(30);

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Command '{}' failed: {error}", ctx.command().name);
            if let Err(e) = ctx.say(format!("Sorry, something went wrong: {error}")).await {
                error!("Could not report command failure: {e}");
            }
        }
        poise::FrameworkError::MissingUserPermissions { ctx, .. } => {
            let _ = ctx
                .say("🚫 You need the **Manage Server** permission to use this command.")
                .await;
        }
        poise::FrameworkError::MissingBotPermissions {
            missing_permissions,
            ctx,
            ..
        } => {
            let _ = ctx
                .say(format!("🚫 I'm missing permissions: {missing_permissions}"))
                .await;
        }
        poise::FrameworkError::CommandCheckFailed { error, ctx, .. } => {
            if let Some(e) = error {
                warn!("Channel check failed for '{}': {e}", ctx.command().name);
            }
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    dotenvy::dotenv().ok();
    let config = match config::Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let status = Arc::new(health::StatusBoard::new());
    {
        let board = status.clone();
        let port = config.port;
        tokio::spawn(async move {
            if let Err(e) = health::serve(port, board).await {
                error!("Health server stopped: {e}");
            }
        });
    }

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    let framework_config = config.clone();
    let framework_status = status.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(config.prefix.clone()),
                mention_as_prefix: false,
                ..Default::default()
            },
            on_error: |error| Box::pin(on_error(error)),
            command_check: Some(|ctx| Box::pin(commands::channels::check_channel(ctx))),
            event_handler: |ctx, event, framework, data| {
                Box::pin(events::handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            framework_status.mark_ready(&ready.user.tag(), ready.guilds.len());
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                let shard_manager = framework.shard_manager().clone();
                let board = framework_status.clone();
                tokio::spawn(async move {
                    loop {
                        let latency = {
                            let runners = shard_manager.runners.lock().await;
                            runners.values().find_map(|runner| runner.latency)
                        };
                        board.set_latency(latency);
                        tokio::time::sleep(LATENCY_REFRESH).await;
                    }
                });

                let data = Data::new(&framework_config, framework_status);

                if let Some(url) = framework_config.external_url.clone() {
                    tokio::spawn(health::keep_alive(data.http_client.clone(), url));
                }

                info!("Bot is ready!");
                Ok(data)
            })
        })
        .build();

    let mut client = match serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .register_songbird()
        .await
    {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to create client: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = client.start().await {
        error!("Client error: {e}");
    }
}
