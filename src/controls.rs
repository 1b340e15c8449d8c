//! Static "Music Controls" message kept at the bottom of the controls
//! channel, with one-tap buttons for the random-song commands.

use poise::serenity_prelude as serenity;
use serenity::{ChannelId, InteractionResponseType, MessageComponentInteraction};
use tracing::{info, warn};

use crate::error::BotError;
use crate::utils::check_msg;
use crate::{embeds, music};

pub const INSPIRE_BTN: &str = "controls_inspire";
pub const CHARTS_BTN: &str = "controls_charts";

const PANEL_TITLE: &str = "Music Controls";

/// Deletes the previous panel among the last 100 messages and posts a
/// fresh one. Called on startup and whenever the bot leaves voice.
pub async fn repost(ctx: &serenity::Context, channel: ChannelId) -> Result<(), BotError> {
    let recent = channel.messages(&ctx.http, |g| g.limit(100)).await?;
    let me = ctx.cache.current_user_id();

    for message in &recent {
        let is_panel = message.author.id == me
            && message
                .embeds
                .first()
                .and_then(|e| e.title.as_deref())
                .map_or(false, |t| t.contains(PANEL_TITLE));
        if is_panel {
            if let Err(e) = message.delete(&ctx.http).await {
                warn!("could not delete stale controls panel: {e}");
            }
            break;
        }
    }

    let guilds = ctx.cache.guild_count();
    let users = ctx.cache.user_count();
    channel
        .send_message(&ctx.http, |m| {
            m.embed(|e| {
                e.color(embeds::BLURPLE)
                    .title(PANEL_TITLE)
                    .description("Use the commands below to control music.")
                    .field(
                        "Commands",
                        "```/play <url|search>\n/queue\n/skip\n/pause\n/shuffle\n/stop\n/chart\n/clearqueue```",
                        false,
                    )
                    .field(
                        "Status",
                        format!("```Servers: {guilds}\nUsers: {users}```"),
                        true,
                    )
                    .footer(|f| f.text(format!("Serving {users} users")))
                    .timestamp(serenity::Timestamp::now())
            })
            .components(|c| {
                c.create_action_row(|row| {
                    row.create_button(|b| {
                        b.custom_id(INSPIRE_BTN)
                            .label("Inspire Me")
                            .emoji('✨')
                            .style(serenity::ButtonStyle::Success)
                    })
                    .create_button(|b| {
                        b.custom_id(CHARTS_BTN)
                            .label("Charts")
                            .emoji('🎶')
                            .style(serenity::ButtonStyle::Secondary)
                    })
                })
            })
        })
        .await?;
    info!(channel = channel.0, "controls panel posted");
    Ok(())
}

/// One of the panel buttons was pressed: queue a random pick in the
/// presser's voice channel.
pub async fn handle_button(
    ctx: &serenity::Context,
    mci: &MessageComponentInteraction,
) -> Result<(), BotError> {
    let pick = match mci.data.custom_id.as_str() {
        INSPIRE_BTN => music::random_inspire_song(),
        CHARTS_BTN => music::random_chart_song(),
        _ => return Ok(()),
    };

    let guild_id = match mci.guild_id {
        Some(id) => id,
        None => return Ok(()),
    };
    let voice_channel = ctx
        .cache
        .guild(guild_id)
        .and_then(|g| g.voice_states.get(&mci.user.id).and_then(|vs| vs.channel_id));
    let Some(voice_channel) = voice_channel else {
        mci.create_interaction_response(&ctx.http, |r| {
            r.kind(InteractionResponseType::ChannelMessageWithSource)
                .interaction_response_data(|d| {
                    d.ephemeral(true).embed(|e| {
                        embeds::error(
                            e,
                            "Voice channel required",
                            "Join a voice channel first, then press the button again.",
                        )
                    })
                })
        })
        .await?;
        return Ok(());
    };
    let active = music::active_channel(ctx, guild_id).await;
    if !music::channel_joinable(active, voice_channel) {
        mci.create_interaction_response(&ctx.http, |r| {
            r.kind(InteractionResponseType::ChannelMessageWithSource)
                .interaction_response_data(|d| {
                    d.ephemeral(true).embed(|e| {
                        embeds::error(
                            e,
                            "Wrong voice channel",
                            "You must be in the same voice channel as the bot.",
                        )
                    })
                })
        })
        .await?;
        return Ok(());
    }

    mci.create_interaction_response(&ctx.http, |r| {
        r.kind(InteractionResponseType::DeferredChannelMessageWithSource)
    })
    .await?;

    let call = music::join_channel(ctx, guild_id, voice_channel, mci.channel_id).await?;
    match music::enqueue_query(&call, pick).await {
        Ok(queued) => {
            let metadata = queued.handle.metadata().clone();
            check_msg(
                mci.create_followup_message(&ctx.http, |m| {
                    m.embed(|e| embeds::queued_up(e, &metadata, queued.position, queued.eta))
                })
                .await,
            );
        }
        Err(e) => {
            check_msg(
                mci.create_followup_message(&ctx.http, |m| {
                    m.embed(|em| {
                        embeds::error(
                            em,
                            "Could not load the song",
                            &format!("```{e}```"),
                        )
                    })
                })
                .await,
            );
        }
    }
    Ok(())
}
