use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use poise::futures_util::StreamExt;
use poise::serenity_prelude as serenity;
use rand::seq::SliceRandom;
use serenity::{ChannelId, GuildId, InteractionResponseType, Mentionable};
use songbird::tracks::PlayMode;
use songbird::Call;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::embeds::{self, ReplyEmbeds};
use crate::music::{
    self,
    vote::{Ballot, CastResult, VoteTally},
};
use crate::utils::{check_msg, format_time};
use crate::{Context, Error};

const VOTE_SECONDS: u64 = 20;
const VOTE_YES: &str = "vote_clear_yes";
const VOTE_NO: &str = "vote_clear_no";

/// Plays a song from a URL or search term
#[poise::command(slash_command, guild_only)]
pub async fn play(
    ctx: Context<'_>,
    #[description = "YouTube song name/URL"] song: String,
) -> Result<(), Error> {
    if muted(&ctx).await? {
        return Ok(());
    }
    let Some((guild_id, voice_channel)) = caller_voice_channel(&ctx).await? else {
        return Ok(());
    };
    let active = music::active_channel(ctx.serenity_context(), guild_id).await;
    if !music::channel_joinable(active, voice_channel) {
        return wrong_channel(&ctx).await;
    }

    ctx.defer().await?;
    let call = music::join_channel(
        ctx.serenity_context(),
        guild_id,
        voice_channel,
        ctx.channel_id(),
    )
    .await?;

    if music::is_playlist_url(&song) {
        return queue_playlist(ctx, guild_id, &call, &song).await;
    }

    let queued = match music::enqueue_query(&call, &song).await {
        Ok(queued) => queued,
        Err(e) => {
            ctx.send(|m| {
                m.embed_error(
                    "Could not load the song",
                    &format!("Nothing found for that input.\n```{e}```"),
                )
            })
            .await?;
            return Ok(());
        }
    };

    let metadata = queued.handle.metadata().clone();
    info!(
        guild = guild_id.0,
        title = metadata.title.as_deref().unwrap_or("?"),
        position = queued.position,
        "queued track"
    );
    if queued.starts_now {
        check_msg(
            ctx.send(|m| m.embed_now_playing(&metadata, Duration::ZERO))
                .await,
        );
    } else {
        check_msg(
            ctx.send(|m| m.embed_queued_up(&metadata, queued.position, queued.eta))
                .await,
        );
    }
    Ok(())
}

/// Skips the current song
#[poise::command(slash_command, guild_only)]
pub async fn skip(ctx: Context<'_>) -> Result<(), Error> {
    if muted(&ctx).await? {
        return Ok(());
    }
    let Some((_, call)) = same_channel_call(&ctx).await? else {
        return Ok(());
    };

    let handler = call.lock().await;
    let queue = handler.queue().current_queue();
    if queue.is_empty() {
        drop(handler);
        ctx.send(|m| m.embed_error("Nothing playing", "Use /play to start music."))
            .await?;
        return Ok(());
    }
    handler
        .queue()
        .skip()
        .map_err(|e| Error::other(format!("skip failed: {e}")))?;
    drop(handler);

    match queue.get(1) {
        Some(next) => {
            let metadata = next.metadata().clone();
            let left = queue.len().saturating_sub(2);
            check_msg(
                ctx.send(|m| {
                    m.embed(|e| {
                        e.color(embeds::BLUE)
                            .title("Skipped")
                            .description(format!(
                                "Up next: {}",
                                metadata.title.as_deref().unwrap_or("Unknown title")
                            ))
                            .field("Songs left", format!("```{left}```"), true);
                        if let Some(thumb) = &metadata.thumbnail {
                            e.thumbnail(thumb);
                        }
                        e
                    })
                })
                .await,
            );
        }
        None => {
            check_msg(
                ctx.send(|m| {
                    m.embed(|e| {
                        e.color(embeds::GREY)
                            .title("Skipped")
                            .description("Queue is empty.")
                    })
                })
                .await,
            );
        }
    }
    Ok(())
}

/// Lists the queued songs
#[poise::command(slash_command, guild_only, rename = "queue")]
pub async fn list_queue(ctx: Context<'_>) -> Result<(), Error> {
    if muted(&ctx).await? {
        return Ok(());
    }
    let guild_id = ctx.guild_id().ok_or_else(|| Error::other("not in a guild"))?;
    let manager = music::manager(ctx.serenity_context()).await;

    let queue = match manager.get(guild_id) {
        Some(call) => call.lock().await.queue().current_queue(),
        None => Vec::new(),
    };
    if queue.is_empty() {
        ctx.send(|m| {
            m.embed(|e| {
                e.color(embeds::GREY)
                    .title("Queue is empty")
                    .description("Use /play to add some music.")
                    .field("Quick start", "```/play <song>\n/chart```", false)
            })
        })
        .await?;
        return Ok(());
    }

    let total = music::playtime_ahead(&queue).await;
    ctx.send(|m| {
        m.embed(|e| {
            e.color(embeds::BLURPLE)
                .title(format!("Queue ({})", queue.len()))
                .description("Upcoming tracks:")
                .footer(|f| f.text("Use /skip to skip the current song"));
            let mut wait = Duration::ZERO;
            for (i, track) in queue.iter().take(15).enumerate() {
                let metadata = track.metadata();
                let duration = metadata.duration.unwrap_or(Duration::ZERO);
                e.field(
                    format!(
                        "{}. {}",
                        i + 1,
                        metadata.title.as_deref().unwrap_or("Unknown title")
                    ),
                    format!(
                        "```Duration: {} • Starts in: {}```",
                        format_time(duration),
                        format_time(wait)
                    ),
                    false,
                );
                wait += duration;
            }
            if queue.len() > 15 {
                e.field(
                    "More",
                    format!(
                        "```+{} more\nTotal duration: {}```",
                        queue.len() - 15,
                        format_time(total)
                    ),
                    false,
                );
            } else {
                e.field(
                    "Summary",
                    format!("```Total duration: {}```", format_time(total)),
                    false,
                );
            }
            e
        })
    })
    .await?;
    Ok(())
}

/// Stops the music and disconnects the bot
#[poise::command(slash_command, guild_only)]
pub async fn stop(ctx: Context<'_>) -> Result<(), Error> {
    if muted(&ctx).await? {
        return Ok(());
    }
    let guild_id = ctx.guild_id().ok_or_else(|| Error::other("not in a guild"))?;
    let manager = music::manager(ctx.serenity_context()).await;
    let Some(call) = manager.get(guild_id) else {
        ctx.send(|m| {
            m.embed_error(
                "Not connected",
                "The bot is not connected to a voice channel.",
            )
        })
        .await?;
        return Ok(());
    };
    if !in_same_channel(&ctx, &call).await {
        wrong_channel(&ctx).await?;
        return Ok(());
    }

    let queue = call.lock().await.queue().current_queue();
    let cleared = queue.len();
    let time_left = music::playtime_ahead(&queue).await;

    music::teardown(
        ctx.serenity_context(),
        ctx.data().config.controls_channel,
        guild_id,
    )
    .await?;

    ctx.send(|m| {
        m.embed(|e| {
            e.color(embeds::RED)
                .title("Disconnected")
                .description("Left the voice channel.")
                .field(
                    "Session summary",
                    format!(
                        "```Time left in queue: {}\nSongs cleared: {}```",
                        format_time(time_left),
                        cleared
                    ),
                    false,
                )
                .footer(|f| f.text("See you next time!"))
        })
    })
    .await?;
    Ok(())
}

/// Shuffles the queue
#[poise::command(slash_command, guild_only)]
pub async fn shuffle(ctx: Context<'_>) -> Result<(), Error> {
    if muted(&ctx).await? {
        return Ok(());
    }
    let Some((_, call)) = same_channel_call(&ctx).await? else {
        return Ok(());
    };

    let handler = call.lock().await;
    if handler.queue().len() < 2 {
        drop(handler);
        ctx.send(|m| m.embed_error("Queue is empty", "Nothing to shuffle."))
            .await?;
        return Ok(());
    }
    // Leave the playing track at the front, shuffle everything behind it.
    handler.queue().modify_queue(|pending| {
        pending.make_contiguous()[1..].shuffle(&mut rand::thread_rng());
    });
    let queue = handler.queue().current_queue();
    drop(handler);

    let total = music::playtime_ahead(&queue).await;
    ctx.send(|m| {
        m.embed(|e| {
            e.color(embeds::BLURPLE)
                .title("Queue shuffled")
                .description(format!("{} songs reshuffled.", queue.len()))
                .footer(|f| f.text("Enjoy!"));
            let mut wait = Duration::ZERO;
            for (i, track) in queue.iter().take(10).enumerate() {
                let metadata = track.metadata();
                let duration = metadata.duration.unwrap_or(Duration::ZERO);
                e.field(
                    format!(
                        "{}. {}",
                        i + 1,
                        metadata.title.as_deref().unwrap_or("Unknown title")
                    ),
                    format!(
                        "```Duration: {} • Starts in: {}```",
                        format_time(duration),
                        format_time(wait)
                    ),
                    false,
                );
                wait += duration;
            }
            e.field(
                "Summary",
                format!("```Total duration: {}```", format_time(total)),
                false,
            )
        })
    })
    .await?;
    Ok(())
}

/// Pauses or resumes the playback
#[poise::command(slash_command, guild_only)]
pub async fn pause(ctx: Context<'_>) -> Result<(), Error> {
    if muted(&ctx).await? {
        return Ok(());
    }
    let Some((_, call)) = same_channel_call(&ctx).await? else {
        return Ok(());
    };

    let current = call.lock().await.queue().current();
    let Some(track) = current else {
        ctx.send(|m| m.embed_error("Nothing playing", "Use /play to start music."))
            .await?;
        return Ok(());
    };

    let mode = track
        .get_info()
        .await
        .map(|info| info.playing)
        .unwrap_or(PlayMode::Stop);
    if mode == PlayMode::Pause {
        track
            .play()
            .map_err(|e| Error::other(format!("resume failed: {e}")))?;
        ctx.send(|m| {
            m.embed(|e| {
                e.color(embeds::GREEN)
                    .title("Resumed")
                    .description("Playback resumed.")
                    .footer(|f| f.text("Use /pause to toggle"))
            })
        })
        .await?;
    } else {
        track
            .pause()
            .map_err(|e| Error::other(format!("pause failed: {e}")))?;
        ctx.send(|m| {
            m.embed(|e| {
                e.color(embeds::ORANGE)
                    .title("Paused")
                    .description("Playback paused.")
                    .footer(|f| f.text("Use /pause to toggle"))
            })
        })
        .await?;
    }
    Ok(())
}

/// Plays a random song from the current charts
#[poise::command(slash_command, guild_only)]
pub async fn chart(ctx: Context<'_>) -> Result<(), Error> {
    if muted(&ctx).await? {
        return Ok(());
    }
    queue_random(ctx, music::random_chart_song(), "A chart hit was picked for you 🎶").await
}

/// Surprises you with a song you did not know you needed
#[poise::command(slash_command, guild_only)]
pub async fn inspireme(ctx: Context<'_>) -> Result<(), Error> {
    if muted(&ctx).await? {
        return Ok(());
    }
    queue_random(ctx, music::random_inspire_song(), "Let this one inspire you ✨").await
}

async fn queue_random(ctx: Context<'_>, pick: &str, flair: &str) -> Result<(), Error> {
    let Some((guild_id, voice_channel)) = caller_voice_channel(&ctx).await? else {
        return Ok(());
    };
    let active = music::active_channel(ctx.serenity_context(), guild_id).await;
    if !music::channel_joinable(active, voice_channel) {
        return wrong_channel(&ctx).await;
    }

    ctx.defer().await?;
    let call = music::join_channel(
        ctx.serenity_context(),
        guild_id,
        voice_channel,
        ctx.channel_id(),
    )
    .await?;
    let queued = music::enqueue_query(&call, pick).await?;
    let metadata = queued.handle.metadata().clone();

    check_msg(
        ctx.send(|m| {
            m.content(flair)
                .embed_queued_up(&metadata, queued.position, queued.eta)
        })
        .await,
    );
    Ok(())
}

/// How many songs a playlist link may add to the queue at once.
const MAX_PLAYLIST_TRACKS: usize = 25;

async fn queue_playlist(
    ctx: Context<'_>,
    guild_id: GuildId,
    call: &Arc<Mutex<Call>>,
    url: &str,
) -> Result<(), Error> {
    let entries = match music::playlist_entries(url).await {
        Ok(entries) if !entries.is_empty() => entries,
        Ok(_) => {
            ctx.send(|m| m.embed_error("Empty playlist", "That playlist has no playable songs."))
                .await?;
            return Ok(());
        }
        Err(e) => {
            ctx.send(|m| {
                m.embed_error(
                    "Could not read the playlist",
                    &format!("Nothing found for that link.\n```{e}```"),
                )
            })
            .await?;
            return Ok(());
        }
    };

    let total = entries.len();
    let mut added = 0usize;
    for entry in entries.iter().take(MAX_PLAYLIST_TRACKS) {
        match music::enqueue_query(call, entry).await {
            Ok(_) => added += 1,
            Err(e) => warn!("skipping playlist entry: {e}"),
        }
    }
    info!(guild = guild_id.0, added, total, "queued playlist");

    let queue_len = call.lock().await.queue().len();
    check_msg(
        ctx.send(|m| {
            m.embed(|e| {
                e.color(embeds::GREEN)
                    .title("Playlist added")
                    .description(format!("Queued {added} of {total} songs."))
                    .field("In queue", format!("```{queue_len}```"), true)
            })
        })
        .await,
    );
    Ok(())
}

/// Vote to clear the entire queue
#[poise::command(slash_command, guild_only)]
pub async fn clearqueue(ctx: Context<'_>) -> Result<(), Error> {
    if muted(&ctx).await? {
        return Ok(());
    }
    let Some((guild_id, call)) = same_channel_call(&ctx).await? else {
        return Ok(());
    };

    // Moderators and lone listeners clear without a vote.
    let is_mod = ctx
        .author_member()
        .await
        .and_then(|m| m.permissions)
        .map_or(false, |p| p.kick_members());
    let voters = eligible_voters(&ctx, &call).await;

    if is_mod || voters.len() <= 1 {
        let (cleared, time_removed) = clear_now(&call).await;
        ctx.send(|m| {
            m.embed(|e| {
                cleared_embed(e, cleared, time_removed)
                    .description(format!("Cleared by {}.", ctx.author().name))
            })
        })
        .await?;
        return Ok(());
    }

    let mut tally = VoteTally::new(voters.iter().copied());
    let required = tally.required();
    let total_voters = tally.eligible_count();

    let reply = ctx
        .send(|m| {
            m.embed(|e| vote_embed(e, &ctx.author().name, total_voters, required, 0, 0))
                .components(|c| {
                    c.create_action_row(|row| {
                        row.create_button(|b| {
                            b.custom_id(VOTE_YES)
                                .label("✅ Yes")
                                .style(serenity::ButtonStyle::Success)
                        })
                        .create_button(|b| {
                            b.custom_id(VOTE_NO)
                                .label("❌ No")
                                .style(serenity::ButtonStyle::Danger)
                        })
                    })
                })
        })
        .await?;
    let message = reply.message().await?;

    let mut collector = message
        .await_component_interactions(ctx.serenity_context())
        .timeout(Duration::from_secs(VOTE_SECONDS))
        .build();

    let mut passed = false;
    while let Some(mci) = collector.next().await {
        let ballot = match mci.data.custom_id.as_str() {
            VOTE_YES => Ballot::Yes,
            VOTE_NO => Ballot::No,
            _ => continue,
        };
        let ack = match tally.cast(mci.user.id.0, ballot) {
            CastResult::NotEligible => "You are not eligible to vote in this vote.",
            CastResult::Withdrawn => "Your vote has been removed.",
            CastResult::Registered { passed: p } => {
                passed = p;
                "Your vote has been registered."
            }
        };
        check_msg(
            mci.create_interaction_response(ctx.serenity_context(), |r| {
                r.kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|d| d.ephemeral(true).content(ack))
            })
            .await,
        );
        if passed {
            break;
        }
        let (yes, no) = (tally.yes_count(), tally.no_count());
        check_msg(
            reply
                .edit(ctx, |m| {
                    m.embed(|e| vote_embed(e, &ctx.author().name, total_voters, required, yes, no))
                })
                .await,
        );
    }
    drop(collector);

    if passed {
        let (cleared, time_removed) = clear_now(&call).await;
        info!(guild = guild_id.0, cleared, "clear-queue vote passed");
        reply
            .edit(ctx, |m| {
                m.components(|c| c).embed(|e| {
                    cleared_embed(e, cleared, time_removed)
                        .title("Vote passed")
                        .description(format!(
                            "Queue cleared ({}/{} voted yes).",
                            tally.yes_count(),
                            total_voters
                        ))
                })
            })
            .await?;
    } else {
        reply
            .edit(ctx, |m| {
                m.components(|c| c).embed(|e| {
                    e.color(embeds::GREY)
                        .title("Vote failed")
                        .description(format!(
                            "Not enough votes to clear the queue ({}/{} voted yes).",
                            tally.yes_count(),
                            total_voters
                        ))
                        .field("Yes", format!("```{}```", tally.yes_count()), true)
                        .field("No", format!("```{}```", tally.no_count()), true)
                        .field("Required", format!("```{required}```"), true)
                })
            })
            .await?;
    }
    Ok(())
}

/// Mute a user from using music commands
#[poise::command(slash_command, guild_only, required_permissions = "KICK_MEMBERS")]
pub async fn musicmute(
    ctx: Context<'_>,
    #[description = "The user to mute"] user: serenity::Member,
    #[description = "Duration in minutes"]
    #[min = 1]
    #[max = 10000]
    duration: u32,
) -> Result<(), Error> {
    let entry = ctx.data().mutes.mute(
        user.user.id.0,
        &user.display_name(),
        ctx.author().id.0,
        &ctx.author().name,
        i64::from(duration),
        Utc::now(),
    )?;

    ctx.send(|m| {
        m.ephemeral(true).embed(|e| {
            e.color(embeds::ORANGE)
                .title("User muted")
                .description(format!(
                    "{} has been muted from music commands.",
                    user.mention()
                ))
                .field("Duration", format!("```{} minutes```", entry.minutes), true)
                .field(
                    "Ends at",
                    format!("```{}```", entry.end.format("%H:%M:%S")),
                    true,
                )
                .field("Moderator", format!("```{}```", entry.muted_by_name), true)
        })
    })
    .await?;
    Ok(())
}

/// Remove a music-command mute from a user
#[poise::command(slash_command, guild_only, required_permissions = "KICK_MEMBERS")]
pub async fn unmusicmute(
    ctx: Context<'_>,
    #[description = "The user to unmute"] user: serenity::Member,
) -> Result<(), Error> {
    if !ctx.data().mutes.unmute(user.user.id.0, Utc::now())? {
        ctx.send(|m| {
            m.embed_error(
                "Not muted",
                &format!("{} is not currently muted.", user.display_name()),
            )
        })
        .await?;
        return Ok(());
    }

    ctx.send(|m| {
        m.embed(|e| {
            e.color(embeds::GREEN)
                .title("Mute removed")
                .description(format!(
                    "{} can now use music commands again.",
                    user.mention()
                ))
                .field("Removed by", format!("```{}```", ctx.author().name), true)
        })
    })
    .await?;
    Ok(())
}

/// Ephemeral rejection when the caller has an active music mute.
async fn muted(ctx: &Context<'_>) -> Result<bool, Error> {
    let Some(entry) = ctx.data().mutes.active(ctx.author().id.0, Utc::now()) else {
        return Ok(false);
    };
    let remaining = (entry.end - Utc::now()).num_minutes().max(0);
    ctx.send(|m| {
        m.ephemeral(true).embed(|e| {
            e.color(embeds::RED)
                .title("Muted")
                .description("You cannot use music commands right now.")
                .field("Time remaining", format!("```{remaining} minutes```"), true)
                .field(
                    "Ends at",
                    format!("```{}```", entry.end.format("%H:%M:%S")),
                    true,
                )
                .field("By", format!("```{}```", entry.muted_by_name), true)
        })
    })
    .await?;
    Ok(true)
}

/// The caller's voice channel, with an error reply when they are not in one.
async fn caller_voice_channel(ctx: &Context<'_>) -> Result<Option<(GuildId, ChannelId)>, Error> {
    let guild = ctx.guild().ok_or_else(|| Error::other("not in a guild"))?;
    let channel = guild
        .voice_states
        .get(&ctx.author().id)
        .and_then(|vs| vs.channel_id);
    match channel {
        Some(channel) => Ok(Some((guild.id, channel))),
        None => {
            ctx.send(|m| {
                m.embed_error(
                    "Voice channel required",
                    "You have to be in a voice channel to execute commands!",
                )
            })
            .await?;
            Ok(None)
        }
    }
}

/// The active call, after checking the caller shares the bot's channel.
async fn same_channel_call(
    ctx: &Context<'_>,
) -> Result<Option<(GuildId, Arc<Mutex<Call>>)>, Error> {
    let guild_id = ctx.guild_id().ok_or_else(|| Error::other("not in a guild"))?;
    let manager = music::manager(ctx.serenity_context()).await;
    let Some(call) = manager.get(guild_id) else {
        ctx.send(|m| m.embed_error("Nothing playing", "Use /play to start music."))
            .await?;
        return Ok(None);
    };
    if !in_same_channel(ctx, &call).await {
        wrong_channel(ctx).await?;
        return Ok(None);
    }
    Ok(Some((guild_id, call)))
}

async fn in_same_channel(ctx: &Context<'_>, call: &Arc<Mutex<Call>>) -> bool {
    let bot_channel = call.lock().await.current_channel().map(|c| c.0);
    let user_channel = ctx.guild().and_then(|g| {
        g.voice_states
            .get(&ctx.author().id)
            .and_then(|vs| vs.channel_id)
    });
    match (bot_channel, user_channel) {
        (Some(bot), Some(user)) => bot == user.0,
        _ => false,
    }
}

async fn wrong_channel(ctx: &Context<'_>) -> Result<(), Error> {
    ctx.send(|m| {
        m.embed_error(
            "Wrong voice channel",
            "You must be in the same voice channel as the bot.",
        )
    })
    .await?;
    Ok(())
}

/// Non-bot members currently in the bot's voice channel.
async fn eligible_voters(ctx: &Context<'_>, call: &Arc<Mutex<Call>>) -> Vec<u64> {
    let bot_channel = call.lock().await.current_channel().map(|c| c.0);
    let bot_id = ctx.serenity_context().cache.current_user_id();
    let Some(bot_channel) = bot_channel else {
        return Vec::new();
    };
    ctx.guild()
        .map(|g| {
            g.voice_states
                .iter()
                .filter(|(user, vs)| {
                    **user != bot_id && vs.channel_id.map(|c| c.0) == Some(bot_channel)
                })
                .map(|(user, _)| user.0)
                .collect()
        })
        .unwrap_or_default()
}

/// Stops playback and empties the queue, reporting what was dropped.
async fn clear_now(call: &Arc<Mutex<Call>>) -> (usize, Duration) {
    let handler = call.lock().await;
    let queue = handler.queue().current_queue();
    let cleared = queue.len();
    let time_removed = music::playtime_ahead(&queue).await;
    handler.queue().stop();
    (cleared, time_removed)
}

fn cleared_embed(
    e: &mut serenity::CreateEmbed,
    cleared: usize,
    time_removed: Duration,
) -> &mut serenity::CreateEmbed {
    e.color(embeds::GREEN)
        .title("Queue cleared")
        .field("Songs cleared", format!("```{cleared}```"), true)
        .field(
            "Time removed",
            format!("```{}```", format_time(time_removed)),
            true,
        )
}

fn vote_embed<'a>(
    e: &'a mut serenity::CreateEmbed,
    starter: &str,
    total_voters: usize,
    required: usize,
    yes: usize,
    no: usize,
) -> &'a mut serenity::CreateEmbed {
    e.color(embeds::YELLOW)
        .title("Vote to clear queue")
        .description(format!(
            "{starter} started a vote to clear the queue.\n\n\
             Members in voice channel: {total_voters}\n\
             Required votes to clear: {required}\n\n\
             ✅ Yes: {yes} • ❌ No: {no}\n\n\
             Voting ends in {VOTE_SECONDS} seconds."
        ))
}
