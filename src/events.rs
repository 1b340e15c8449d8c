//! Gateway event dispatch: the counting and guessing channels, ticket
//! component/modal routing, the controls panel and the voice sweeps.

use std::time::{Duration, Instant};

use poise::serenity_prelude as serenity;
use serenity::{
    ChannelId, InteractionResponseType, Mentionable, Message, ModalSubmitInteraction, ReactionType,
};
use tracing::{error, info, warn};

use crate::games::counting::{self, CountOutcome};
use crate::games::guess::{Difficulty, GuessGame, GuessOutcome};
use crate::utils::check_msg;
use crate::{controls, music, tickets, Data, Error};

const COUNTING_CHANNEL: &str = "counting";
const GUESS_CHANNEL: &str = "guess-number";

const GUESS_EASY_BTN: &str = "guess_easy";
const GUESS_NORMAL_BTN: &str = "guess_normal";
const GUESS_HARD_BTN: &str = "guess_hard";
const GUESS_CUSTOM_BTN: &str = "guess_custom";
const GUESS_CUSTOM_MODAL: &str = "guess_custom_modal";

/// How long the bot waits before leaving an empty voice channel.
const EMPTY_CHANNEL_GRACE: Duration = Duration::from_secs(5);

pub async fn handle(
    ctx: &serenity::Context,
    event: &poise::Event<'_>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        poise::Event::Ready { data_about_bot } => {
            info!(user = %data_about_bot.user.name, "connected to the gateway");
            controls::repost(ctx, data.config.controls_channel).await?;
        }
        poise::Event::Message { new_message } => {
            handle_message(ctx, data, new_message).await?;
        }
        poise::Event::VoiceStateUpdate { old, new } => {
            handle_voice_update(ctx, data, old.as_ref(), new).await;
        }
        poise::Event::ThreadUpdate { thread } => {
            let archived = thread
                .thread_metadata
                .map_or(false, |meta| meta.archived);
            if archived && data.tickets.is_ticket(thread.id.0) {
                tickets::archive_sweep(ctx, data, thread).await?;
            }
        }
        poise::Event::InteractionCreate { interaction } => match interaction {
            serenity::Interaction::MessageComponent(mci) => {
                handle_component(ctx, data, mci).await?;
            }
            serenity::Interaction::ModalSubmit(msi) => {
                handle_modal(ctx, data, msi).await?;
            }
            _ => {}
        },
        _ => {}
    }
    Ok(())
}

async fn handle_message(
    ctx: &serenity::Context,
    data: &Data,
    msg: &Message,
) -> Result<(), Error> {
    if msg.author.bot {
        return Ok(());
    }

    // Moderator shorthand inside ticket threads.
    let content = msg.content.trim();
    if (content.eq_ignore_ascii_case("?close") || content.eq_ignore_ascii_case("?c"))
        && data.tickets.is_ticket(msg.channel_id.0)
    {
        if let Some(guild_id) = msg.guild_id {
            if tickets::member_is_mod(ctx, data, guild_id, msg.author.id).await {
                check_msg(msg.delete(&ctx.http).await);
                tickets::close_prompt(ctx, data, msg).await?;
            }
        }
        return Ok(());
    }

    let channel_name = match msg.channel_id.name(&ctx.cache).await {
        Some(name) => name,
        None => return Ok(()),
    };
    match channel_name.as_str() {
        COUNTING_CHANNEL => handle_counting(ctx, data, msg).await,
        GUESS_CHANNEL => handle_guess(ctx, data, msg).await,
        _ => Ok(()),
    }
}

/// The counting game: valid numbers are reposted through a webhook so the
/// channel stays clean, everything else is dropped.
async fn handle_counting(
    ctx: &serenity::Context,
    data: &Data,
    msg: &Message,
) -> Result<(), Error> {
    let outcome = data
        .games
        .counting()
        .entry(msg.channel_id.0)
        .or_default()
        .submit(msg.author.id.0, &msg.content, Instant::now());

    match outcome {
        CountOutcome::OnCooldown | CountOutcome::NotANumber | CountOutcome::RepeatUser => {
            check_msg(msg.delete(&ctx.http).await);
            Ok(())
        }
        CountOutcome::Correct(number) => {
            check_msg(msg.delete(&ctx.http).await);
            repost_via_webhook(ctx, msg, &number.to_string(), true).await
        }
        CountOutcome::Reset { expected, got } => {
            info!(
                channel = msg.channel_id.0,
                expected, got, "counting chain broken"
            );
            repost_via_webhook(ctx, msg, counting::random_fail_message(), false).await
        }
    }
}

/// Reposts content under the author's name and avatar through a throwaway
/// webhook, optionally celebrating with a reaction.
async fn repost_via_webhook(
    ctx: &serenity::Context,
    msg: &Message,
    content: &str,
    celebrate: bool,
) -> Result<(), Error> {
    let webhook = msg
        .channel_id
        .create_webhook(&ctx.http, &msg.author.name)
        .await?;
    let avatar = msg
        .author
        .avatar_url()
        .unwrap_or_else(|| msg.author.default_avatar_url());
    let posted = webhook
        .execute(&ctx.http, true, |w| {
            w.username(&msg.author.name).avatar_url(avatar).content(content)
        })
        .await?;
    if celebrate {
        if let Some(posted) = posted {
            check_msg(
                posted
                    .react(&ctx.http, ReactionType::Unicode("🎉".to_string()))
                    .await,
            );
        }
    }
    webhook.delete(&ctx.http).await?;
    Ok(())
}

/// The guess-the-number channel: numbers are guesses, a few keywords
/// control the game, everything else is swept away.
async fn handle_guess(
    ctx: &serenity::Context,
    data: &Data,
    msg: &Message,
) -> Result<(), Error> {
    let content = msg.content.trim().to_lowercase();

    if let Ok(number) = msg.content.trim().parse::<u32>() {
        let outcome = data
            .games
            .guess()
            .get_mut(&msg.channel_id.0)
            .map(|game| game.guess(msg.author.id.0, number, Instant::now()));
        match outcome {
            None => {
                check_msg(msg.delete(&ctx.http).await);
                send_temporary(
                    ctx,
                    msg.channel_id,
                    "Game not started yet. Type 'start' to begin.".to_string(),
                )
                .await;
            }
            Some(GuessOutcome::OnCooldown { remaining }) => {
                check_msg(msg.delete(&ctx.http).await);
                send_temporary(
                    ctx,
                    msg.channel_id,
                    format!(
                        "{} Please wait {}s before guessing again!",
                        msg.author.mention(),
                        remaining.as_secs().max(1)
                    ),
                )
                .await;
            }
            Some(GuessOutcome::Win { guesses }) => {
                check_msg(
                    msg.channel_id
                        .say(
                            &ctx.http,
                            format!(
                                "{} Congratulations! You guessed the number **{}** in **{}** guesses! 🎉",
                                msg.author.mention(), number, guesses
                            ),
                        )
                        .await,
                );
                data.games.guess().remove(&msg.channel_id.0);
            }
            Some(GuessOutcome::Higher { temperature }) => {
                react_pair(ctx, msg, "⬆️", temperature).await;
            }
            Some(GuessOutcome::Lower { temperature }) => {
                react_pair(ctx, msg, "⬇️", temperature).await;
            }
        }
        return Ok(());
    }

    match content.as_str() {
        "start" | ":s" => {
            data.games.guess().remove(&msg.channel_id.0);
            check_msg(msg.delete(&ctx.http).await);
            check_msg(
                msg.channel_id
                    .send_message(&ctx.http, |m| {
                        m.content(format!("{} Please select a difficulty:", msg.author.mention()))
                            .components(|c| {
                                c.create_action_row(|row| {
                                    row.create_button(|b| {
                                        b.custom_id(GUESS_EASY_BTN)
                                            .label("Easy (1-100)")
                                            .style(serenity::ButtonStyle::Success)
                                    })
                                    .create_button(|b| {
                                        b.custom_id(GUESS_NORMAL_BTN)
                                            .label("Normal (1-1000)")
                                            .style(serenity::ButtonStyle::Primary)
                                    })
                                    .create_button(|b| {
                                        b.custom_id(GUESS_HARD_BTN)
                                            .label("Hard (1-10000)")
                                            .style(serenity::ButtonStyle::Danger)
                                    })
                                    .create_button(|b| {
                                        b.custom_id(GUESS_CUSTOM_BTN)
                                            .label("Custom")
                                            .style(serenity::ButtonStyle::Secondary)
                                    })
                                })
                            })
                    })
                    .await,
            );
        }
        "difficulty" => {
            let label = data
                .games
                .guess()
                .get(&msg.channel_id.0)
                .map(|game| game.difficulty().label())
                .unwrap_or_else(|| "No game active".to_string());
            check_msg(msg.delete(&ctx.http).await);
            send_temporary(
                ctx,
                msg.channel_id,
                format!("{} Current difficulty: `{label}`", msg.author.mention()),
            )
            .await;
        }
        "surrender" => {
            let surrendered = data.games.guess().remove(&msg.channel_id.0);
            check_msg(msg.delete(&ctx.http).await);
            match surrendered {
                Some(game) => {
                    check_msg(
                        msg.channel_id
                            .say(
                                &ctx.http,
                                format!(
                                    "{} You surrendered! With `{}` guesses in `{}` difficulty. The number was: `{}`!",
                                    msg.author.mention(),
                                    game.guesses(),
                                    game.difficulty().label(),
                                    game.secret()
                                ),
                            )
                            .await,
                    );
                }
                None => {
                    send_temporary(
                        ctx,
                        msg.channel_id,
                        "Game not started yet. Type 'start' to begin.".to_string(),
                    )
                    .await;
                }
            }
        }
        _ => {
            check_msg(msg.delete(&ctx.http).await);
            send_temporary(
                ctx,
                msg.channel_id,
                format!("{} Please only use numbers to guess.", msg.author.mention()),
            )
            .await;
        }
    }
    Ok(())
}

async fn react_pair(ctx: &serenity::Context, msg: &Message, direction: &str, temperature: &str) {
    check_msg(
        msg.react(&ctx.http, ReactionType::Unicode(direction.to_string()))
            .await,
    );
    check_msg(
        msg.react(&ctx.http, ReactionType::Unicode(temperature.to_string()))
            .await,
    );
}

/// Sends a short-lived notice and cleans it up after a few seconds.
async fn send_temporary(ctx: &serenity::Context, channel: ChannelId, content: String) {
    let sent = match channel.say(&ctx.http, content).await {
        Ok(msg) => msg,
        Err(e) => {
            error!("could not send notice: {e}");
            return;
        }
    };
    let http = ctx.http.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(4)).await;
        if let Err(e) = sent.delete(&http).await {
            warn!("could not delete notice: {e}");
        }
    });
}

/// Leaves voice when the bot is kicked or the channel empties out.
async fn handle_voice_update(
    ctx: &serenity::Context,
    data: &Data,
    old: Option<&serenity::VoiceState>,
    new: &serenity::VoiceState,
) {
    let bot_id = ctx.cache.current_user_id();

    // The bot itself was disconnected.
    if new.user_id == bot_id && new.channel_id.is_none() {
        if let Some(guild_id) = new.guild_id.or_else(|| old.and_then(|o| o.guild_id)) {
            // `/stop` already removed the call and reposted the panel; only
            // clean up here when the call is still live (kick, region move).
            if music::manager(ctx).await.get(guild_id).is_some() {
                if let Err(e) = music::teardown(ctx, data.config.controls_channel, guild_id).await {
                    error!("voice teardown after disconnect failed: {e}");
                }
            }
        }
        return;
    }

    // Someone left a channel; if it was ours and nobody is left after the
    // grace period, follow them out.
    let Some(old_state) = old else { return };
    let Some(left_channel) = old_state.channel_id else { return };
    if new.channel_id == Some(left_channel) || new.user_id == bot_id {
        return;
    }
    let Some(guild_id) = old_state.guild_id.or(new.guild_id) else { return };

    let ctx = ctx.clone();
    let controls_channel = data.config.controls_channel;
    tokio::spawn(async move {
        tokio::time::sleep(EMPTY_CHANNEL_GRACE).await;

        let manager = music::manager(&ctx).await;
        let Some(call) = manager.get(guild_id) else { return };
        let bot_channel = call.lock().await.current_channel().map(|c| c.0);
        if bot_channel != Some(left_channel.0) {
            return;
        }
        let still_listening = ctx
            .cache
            .guild(guild_id)
            .map(|g| {
                g.voice_states
                    .iter()
                    .filter(|(user, vs)| {
                        **user != ctx.cache.current_user_id()
                            && vs.channel_id == Some(left_channel)
                    })
                    .count()
            })
            .unwrap_or(0);
        if still_listening == 0 {
            info!(guild = guild_id.0, "voice channel empty, leaving");
            if let Err(e) = music::teardown(&ctx, controls_channel, guild_id).await {
                error!("voice teardown after empty channel failed: {e}");
            }
        }
    });
}

async fn handle_component(
    ctx: &serenity::Context,
    data: &Data,
    mci: &serenity::MessageComponentInteraction,
) -> Result<(), Error> {
    match mci.data.custom_id.as_str() {
        tickets::CATEGORY_SELECT => tickets::open_category_modal(ctx, mci).await,
        tickets::CLOSE_BTN => tickets::confirm_close(ctx, mci).await,
        tickets::CLOSE_REASON_BTN => tickets::open_close_reason_modal(ctx, mci).await,
        tickets::CLOSE_YES_BTN => {
            tickets::delete_source_message(ctx, mci).await?;
            tickets::close_thread(ctx, mci.channel_id, &mci.user, None).await
        }
        tickets::CLOSE_NO_BTN | tickets::DELETE_NO_BTN => {
            tickets::delete_source_message(ctx, mci).await
        }
        tickets::REOPEN_BTN => tickets::reopen_thread(ctx, data, mci).await,
        tickets::ARCHIVE_BTN => tickets::open_archive_modal(ctx, mci).await,
        tickets::TRANSCRIPT_BTN => tickets::open_transcript_modal(ctx, mci).await,
        tickets::DELETE_BTN => tickets::confirm_delete(ctx, mci).await,
        tickets::DELETE_YES_BTN => tickets::delete_thread(ctx, data, mci).await,
        controls::INSPIRE_BTN | controls::CHARTS_BTN => {
            controls::handle_button(ctx, mci).await
        }
        GUESS_EASY_BTN => start_guess_game(ctx, data, mci, Difficulty::Easy).await,
        GUESS_NORMAL_BTN => start_guess_game(ctx, data, mci, Difficulty::Normal).await,
        GUESS_HARD_BTN => start_guess_game(ctx, data, mci, Difficulty::Hard).await,
        GUESS_CUSTOM_BTN => open_custom_guess_modal(ctx, mci).await,
        _ => Ok(()),
    }
}

async fn start_guess_game(
    ctx: &serenity::Context,
    data: &Data,
    mci: &serenity::MessageComponentInteraction,
    difficulty: Difficulty,
) -> Result<(), Error> {
    let game = GuessGame::start(difficulty);
    data.games.guess().insert(mci.channel_id.0, game);

    let flair = match difficulty {
        Difficulty::Hard => "Good Luck, you will need it! ✅",
        _ => "Good Luck! ✅",
    };
    mci.create_interaction_response(&ctx.http, |r| {
        r.kind(InteractionResponseType::ChannelMessageWithSource)
            .interaction_response_data(|d| {
                d.content(format!(
                    "Started on `{}` difficulty! {flair}",
                    difficulty.label()
                ))
            })
    })
    .await?;
    check_msg(mci.message.delete(&ctx.http).await);
    Ok(())
}

async fn open_custom_guess_modal(
    ctx: &serenity::Context,
    mci: &serenity::MessageComponentInteraction,
) -> Result<(), Error> {
    mci.create_interaction_response(&ctx.http, |r| {
        r.kind(InteractionResponseType::Modal)
            .interaction_response_data(|d| {
                d.custom_id(GUESS_CUSTOM_MODAL)
                    .title("Custom difficulty")
                    .components(|c| {
                        c.create_action_row(|row| {
                            row.create_input_text(|t| {
                                t.custom_id("max")
                                    .label("Upper bound of the range (1 - N)")
                                    .placeholder("e.g. 500")
                                    .style(serenity::InputTextStyle::Short)
                                    .max_length(7)
                                    .required(true)
                            })
                        })
                    })
            })
    })
    .await?;
    Ok(())
}

async fn handle_modal(
    ctx: &serenity::Context,
    data: &Data,
    msi: &ModalSubmitInteraction,
) -> Result<(), Error> {
    let custom_id = msi.data.custom_id.as_str();
    if let Some(value) = custom_id.strip_prefix(tickets::MODAL_PREFIX) {
        if let Some(category) = tickets::TicketCategory::from_value(value) {
            return tickets::create_ticket_thread(ctx, data, msi, category).await;
        }
        return Ok(());
    }
    match custom_id {
        tickets::CLOSE_REASON_MODAL => tickets::close_with_reason(ctx, msi).await,
        tickets::ARCHIVE_MODAL => tickets::archive_thread(ctx, msi).await,
        tickets::TRANSCRIPT_MODAL => tickets::create_transcript(ctx, data, msi).await,
        GUESS_CUSTOM_MODAL => start_custom_guess(ctx, data, msi).await,
        _ => Ok(()),
    }
}

async fn start_custom_guess(
    ctx: &serenity::Context,
    data: &Data,
    msi: &ModalSubmitInteraction,
) -> Result<(), Error> {
    let raw = msi
        .data
        .components
        .iter()
        .flat_map(|row| &row.components)
        .find_map(|component| match component {
            serenity::ActionRowComponent::InputText(input) if input.custom_id == "max" => {
                Some(input.value.trim().to_string())
            }
            _ => None,
        })
        .unwrap_or_default();

    let max = match raw.parse::<u32>() {
        Ok(max) if max >= 2 => max,
        _ => {
            tickets::respond_embed(
                ctx,
                msi,
                crate::embeds::RED,
                "The upper bound must be a whole number of at least 2.",
            )
            .await?;
            return Ok(());
        }
    };

    let difficulty = Difficulty::Custom(max);
    data.games
        .guess()
        .insert(msi.channel_id.0, GuessGame::start(difficulty));
    msi.create_interaction_response(&ctx.http, |r| {
        r.kind(InteractionResponseType::ChannelMessageWithSource)
            .interaction_response_data(|d| {
                d.content(format!(
                    "Started on `Custom` difficulty! Range: 1 - {max}! ✅"
                ))
            })
    })
    .await?;
    Ok(())
}
