mod commands;
mod config;
mod controls;
mod embeds;
mod error;
mod events;
mod games;
mod music;
mod tickets;
mod utils;

use dotenv::dotenv;
use poise::serenity_prelude as serenity;
use songbird::SerenityInit;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use config::Config;
use error::BotError;
use games::GameState;
use music::mute::MuteStore;
use tickets::store::TicketStore;

/// Shared state, accessible in all command invocations.
pub struct Data {
    pub config: Config,
    pub tickets: TicketStore,
    pub mutes: MuteStore,
    pub games: GameState,
}

type Error = BotError;
type Context<'a> = poise::Context<'a, Data, Error>;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("configuration error: {e}");
            std::process::exit(1);
        }
    };
    let token = config.token.clone();
    let guild_id = config.guild_id;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::music::play(),
                commands::music::skip(),
                commands::music::list_queue(),
                commands::music::stop(),
                commands::music::shuffle(),
                commands::music::pause(),
                commands::music::chart(),
                commands::music::inspireme(),
                commands::music::clearqueue(),
                commands::music::musicmute(),
                commands::music::unmusicmute(),
                commands::radio::radio(),
                commands::tickets::setup(),
                commands::tickets::menu(),
                commands::github::github(),
            ],
            event_handler: |ctx, event, _framework, data| {
                Box::pin(events::handle(ctx, event, data))
            },
            pre_command: |ctx| {
                Box::pin(async move {
                    info!(
                        command = %ctx.command().qualified_name,
                        user = %ctx.author().name,
                        "executing command"
                    );
                })
            },
            on_error: |err| {
                Box::pin(async move {
                    if let Err(e) = poise::builtins::on_error(err).await {
                        error!("error while handling error: {e}");
                    }
                })
            },
            ..Default::default()
        })
        .token(token)
        .client_settings(|client_builder| client_builder.register_songbird())
        .intents(
            serenity::GatewayIntents::non_privileged()
                | serenity::GatewayIntents::MESSAGE_CONTENT
                | serenity::GatewayIntents::GUILD_MEMBERS,
        )
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_in_guild(ctx, &framework.options().commands, guild_id)
                    .await?;
                info!(guild = guild_id.0, "slash commands registered");

                let tickets = TicketStore::open(config.tickets_file());
                let mutes = MuteStore::open(config.mutes_file());
                Ok(Data {
                    config,
                    tickets,
                    mutes,
                    games: GameState::default(),
                })
            })
        });

    if let Err(e) = framework.run().await {
        error!("client error: {e}");
        std::process::exit(1);
    }
}
