pub mod mute;
pub mod vote;

use std::sync::Arc;
use std::time::Duration;

use poise::async_trait;
use poise::serenity_prelude as serenity;
use serenity::{ChannelId, GuildId, Http};
use songbird::tracks::TrackHandle;
use songbird::{Call, Event, EventContext, EventHandler as VoiceEventHandler, Songbird, TrackEvent};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::BotError;
use crate::utils::check_msg;
use crate::{controls, embeds};

pub async fn manager(ctx: &serenity::Context) -> Arc<Songbird> {
    songbird::get(ctx)
        .await
        .expect("Songbird was not registered with the client builder")
        .clone()
}

/// Outcome of queueing a single track, used to build the reply embed.
pub struct Queued {
    pub handle: TrackHandle,
    /// 1-based position in the queue, including the playing track.
    pub position: usize,
    /// Playtime ahead of this track.
    pub eta: Duration,
    /// True when nothing was playing before, i.e. this track starts now.
    pub starts_now: bool,
}

/// Joins the caller's voice channel unless already connected, deafens the
/// bot and installs the track-end announcer on fresh joins.
pub async fn join_channel(
    ctx: &serenity::Context,
    guild_id: GuildId,
    voice_channel: ChannelId,
    announce_channel: ChannelId,
) -> Result<Arc<Mutex<Call>>, BotError> {
    let manager = manager(ctx).await;
    if let Some(call) = manager.get(guild_id) {
        return Ok(call);
    }

    let (call, join_result) = manager.join(guild_id, voice_channel).await;
    join_result?;
    info!(guild = guild_id.0, channel = voice_channel.0, "joined voice channel");

    let mut handler = call.lock().await;
    if let Err(e) = handler.deafen(true).await {
        warn!("could not self-deafen: {e}");
    }
    handler.add_global_event(
        Event::Track(TrackEvent::End),
        TrackEndNotifier {
            channel: announce_channel,
            http: ctx.http.clone(),
            call: call.clone(),
        },
    );
    drop(handler);

    Ok(call)
}

/// The voice channel of the guild's active call, if any.
pub async fn active_channel(ctx: &serenity::Context, guild_id: GuildId) -> Option<u64> {
    let call = manager(ctx).await.get(guild_id)?;
    let channel = call.lock().await.current_channel();
    channel.map(|c| c.0)
}

/// Whether a caller in `caller` may start or add playback: the bot must be
/// idle or already connected to that same channel.
pub fn channel_joinable(active: Option<u64>, caller: ChannelId) -> bool {
    active.map_or(true, |bot| bot == caller.0)
}

/// True for YouTube URLs that point at a playlist rather than a single video.
pub fn is_playlist_url(query: &str) -> bool {
    let Ok(parsed) = url::Url::parse(query) else {
        return false;
    };
    let host = parsed.host_str().unwrap_or("");
    if !(host.ends_with("youtube.com") || host == "youtu.be") {
        return false;
    }
    parsed.query_pairs().any(|(key, _)| key == "list")
}

/// Resolves a playlist into per-video URLs without fetching each video page.
pub async fn playlist_entries(url: &str) -> Result<Vec<String>, BotError> {
    let output = tokio::process::Command::new("yt-dlp")
        .args(["--flat-playlist", "-j", "--", url])
        .output()
        .await?;
    if !output.status.success() {
        return Err(BotError::other("yt-dlp could not read the playlist"));
    }
    Ok(parse_flat_playlist(&String::from_utf8_lossy(&output.stdout)))
}

/// One JSON object per line, as emitted by `yt-dlp --flat-playlist -j`.
fn parse_flat_playlist(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| {
            let entry: serde_json::Value = serde_json::from_str(line).ok()?;
            if let Some(direct) = entry.get("url").and_then(|u| u.as_str()) {
                return Some(direct.to_string());
            }
            entry
                .get("id")
                .and_then(|id| id.as_str())
                .map(|id| format!("https://www.youtube.com/watch?v={id}"))
        })
        .collect()
}

/// Resolves a URL or search term into an input and enqueues it on the
/// guild's builtin track queue.
pub async fn enqueue_query(call: &Arc<Mutex<Call>>, query: &str) -> Result<Queued, BotError> {
    let source = if query.starts_with("http") {
        let parsed = url::Url::parse(query).map_err(|e| BotError::other(format!("invalid URL: {e}")))?;
        songbird::ytdl(parsed.as_str()).await?
    } else {
        songbird::input::ytdl_search(query).await?
    };

    let mut handler = call.lock().await;
    let ahead = handler.queue().current_queue();
    let eta = playtime_ahead(&ahead).await;
    let starts_now = ahead.is_empty();
    handler.enqueue_source(source);
    let handle = handler
        .queue()
        .current_queue()
        .into_iter()
        .last()
        .ok_or_else(|| BotError::other("track vanished from the queue"))?;
    let position = handler.queue().len();
    drop(handler);

    Ok(Queued {
        handle,
        position,
        eta,
        starts_now,
    })
}

/// Sum of the remaining playtime of everything currently in the queue: full
/// durations of the pending tracks, remaining time of the playing one.
pub async fn playtime_ahead(queue: &[TrackHandle]) -> Duration {
    let mut total = Duration::ZERO;
    for (i, track) in queue.iter().enumerate() {
        let duration = track.metadata().duration.unwrap_or(Duration::ZERO);
        if i == 0 {
            let elapsed = track
                .get_info()
                .await
                .map(|info| info.play_time)
                .unwrap_or(Duration::ZERO);
            total += duration.saturating_sub(elapsed);
        } else {
            total += duration;
        }
    }
    total
}

/// Announces the next track whenever one ends, or reposts the controls
/// message once the queue runs dry.
pub struct TrackEndNotifier {
    pub channel: ChannelId,
    pub http: Arc<Http>,
    pub call: Arc<Mutex<Call>>,
}

#[async_trait]
impl VoiceEventHandler for TrackEndNotifier {
    async fn act(&self, ctx: &EventContext<'_>) -> Option<Event> {
        if let EventContext::Track(_) = ctx {
            let handler = self.call.lock().await;
            let current = handler.queue().current();
            drop(handler);

            if let Some(np) = current {
                let elapsed = np
                    .get_info()
                    .await
                    .map(|info| info.play_time)
                    .unwrap_or(Duration::ZERO);
                let metadata = np.metadata().clone();
                check_msg(
                    self.channel
                        .send_message(&self.http, |m| {
                            m.embed(|e| embeds::now_playing(e, &metadata, elapsed))
                        })
                        .await,
                );
            } else {
                check_msg(
                    self.channel
                        .send_message(&self.http, |m| m.embed(embeds::empty_queue))
                        .await,
                );
            }
        }
        None
    }
}

/// Stops playback, drops the queue and leaves voice. Used by `/stop`, the
/// empty-channel sweep and the kick handler.
pub async fn teardown(
    ctx: &serenity::Context,
    controls_channel: ChannelId,
    guild_id: GuildId,
) -> Result<(), BotError> {
    let manager = manager(ctx).await;
    if let Some(call) = manager.get(guild_id) {
        let handler = call.lock().await;
        handler.queue().stop();
        drop(handler);
        manager.remove(guild_id).await?;
        info!(guild = guild_id.0, "left voice channel");
    }
    controls::repost(ctx, controls_channel).await
}

/// A random pick for `/chart`, mirroring the curated chart fallback list.
pub fn random_chart_song() -> &'static str {
    const CHART: &[&str] = &[
        "Flowers Miley Cyrus",
        "As It Was Harry Styles",
        "Bad Habit Steve Lacy",
        "About Damn Time Lizzo",
        "Heat Waves Glass Animals",
        "Stay The Kid LAROI Justin Bieber",
        "Ghost Justin Bieber",
        "Industry Baby Lil Nas X",
        "Good 4 U Olivia Rodrigo",
        "Levitating Dua Lipa",
    ];
    CHART[rand::random::<usize>() % CHART.len()]
}

/// A random pick for `/inspireme`.
pub fn random_inspire_song() -> &'static str {
    const SONGS: &[&str] = &[
        "Never Gonna Give You Up Rick Astley",
        "Bohemian Rhapsody Queen",
        "Imagine Dragons Believer",
        "The Weeknd Blinding Lights",
        "Dua Lipa Levitating",
        "Ed Sheeran Shape of You",
        "Billie Eilish bad guy",
        "Post Malone Circles",
        "Ariana Grande 7 rings",
        "Drake God's Plan",
        "Taylor Swift Anti-Hero",
        "Harry Styles As It Was",
        "Olivia Rodrigo good 4 u",
        "Doja Cat Kiss Me More",
        "The Kid LAROI Stay",
        "Lil Nas X Industry Baby",
        "Glass Animals Heat Waves",
        "Måneskin Beggin",
        "Adele Easy On Me",
        "Bruno Mars Uptown Funk",
        "Queen Don't Stop Me Now",
        "Journey Don't Stop Believin'",
        "Michael Jackson Billie Jean",
        "A-ha Take On Me",
        "Toto Africa",
        "Guns N' Roses Sweet Child O' Mine",
        "AC/DC Back In Black",
        "Nirvana Smells Like Teen Spirit",
        "Linkin Park In The End",
        "The Killers Mr. Brightside",
        "Arctic Monkeys Do I Wanna Know?",
        "Coldplay Viva La Vida",
        "OneRepublic Counting Stars",
        "Lewis Capaldi Someone You Loved",
        "Hozier Take Me to Church",
        "Vance Joy Riptide",
        "The Chainsmokers Closer",
    ];
    SONGS[rand::random::<usize>() % SONGS.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_bot_is_joinable_from_anywhere() {
        assert!(channel_joinable(None, ChannelId(42)));
    }

    #[test]
    fn matching_channel_is_joinable() {
        assert!(channel_joinable(Some(42), ChannelId(42)));
    }

    #[test]
    fn other_channel_is_rejected_while_connected() {
        assert!(!channel_joinable(Some(42), ChannelId(7)));
    }

    #[test]
    fn recognizes_playlist_urls() {
        assert!(is_playlist_url(
            "https://www.youtube.com/playlist?list=PLabc123"
        ));
        assert!(is_playlist_url(
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ&list=PLabc123"
        ));
        assert!(!is_playlist_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(!is_playlist_url("https://soundcloud.com/sets/whatever?list=x"));
        assert!(!is_playlist_url("not a url"));
    }

    #[test]
    fn parses_flat_playlist_output() {
        let raw = concat!(
            r#"{"id":"aaa","url":"https://www.youtube.com/watch?v=aaa","title":"One"}"#,
            "\n",
            r#"{"id":"bbb","title":"Two"}"#,
            "\n",
            "garbage line\n",
        );
        let entries = parse_flat_playlist(raw);
        assert_eq!(
            entries,
            vec![
                "https://www.youtube.com/watch?v=aaa".to_string(),
                "https://www.youtube.com/watch?v=bbb".to_string(),
            ]
        );
    }

    #[test]
    fn empty_playlist_output_yields_no_entries() {
        assert!(parse_flat_playlist("").is_empty());
    }
}
