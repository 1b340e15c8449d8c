use regex::Regex;
use tracing::info;

use crate::embeds::ReplyEmbeds;
use crate::music;
use crate::utils::check_msg;
use crate::{Context, Error};

/// Fixed station list offered in the slash command. Any other stream can be
/// played through the free-form `url` parameter.
#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum Station {
    #[name = "Charts, WW"]
    Charts,
    #[name = "DLF, Ger"]
    Dlf,
    #[name = "RADIO BOB!, Ger"]
    RadioBob,
    #[name = "1 Live, Ger"]
    EinsLive,
    #[name = "WDR 3, Ger"]
    Wdr3,
    #[name = "BBC World Service, GB"]
    Bbc,
    #[name = "Jazz24, USA"]
    Jazz24,
    #[name = "Classical, USA"]
    Classical,
    #[name = "Smooth Jazz, USA"]
    SmoothJazz,
    #[name = "Chill Out, Int"]
    ChillOut,
}

impl Station {
    fn stream_url(self) -> &'static str {
        match self {
            Station::Charts => "http://streams.bigfm.de/bigfm-charts-128-aac?usid=0-0-H-A-D-30",
            Station::Dlf => {
                "https://st01.sslstream.dlf.de/dlf/01/128/mp3/stream.mp3?aggregator=web"
            }
            Station::RadioBob => "http://streams.radiobob.de/bob-live/mp3-192/mediaplayer",
            Station::EinsLive => {
                "http://wdr-1live-live.icecast.wdr.de/wdr/1live/live/mp3/128/stream.mp3"
            }
            Station::Wdr3 => {
                "http://wdr-wdr3-live.icecast.wdr.de/wdr/wdr3/live/mp3/256/stream.mp3"
            }
            Station::Bbc => "http://stream.live.vc.bbcmedia.co.uk/bbc_world_service",
            Station::Jazz24 => "http://live.streamtheworld.com/JAZZ24AAC.aac",
            Station::Classical => "http://streams.publicradio.org/classical.m3u",
            Station::SmoothJazz => "http://smoothjazz.cdnstream1.com/2640_128.mp3",
            Station::ChillOut => "http://media-ice.musicradio.com/ChillMP3.m3u",
        }
    }
}

/// Play a radio stream
#[poise::command(slash_command, guild_only)]
pub async fn radio(
    ctx: Context<'_>,
    #[description = "Pick a station"] station: Option<Station>,
    #[description = "Or a custom stream URL"] url: Option<String>,
) -> Result<(), Error> {
    let guild = ctx.guild().ok_or_else(|| Error::other("not in a guild"))?;
    let voice_channel = guild
        .voice_states
        .get(&ctx.author().id)
        .and_then(|vs| vs.channel_id);
    let voice_channel = match voice_channel {
        Some(c) => c,
        None => {
            ctx.send(|m| {
                m.embed_error(
                    "Voice channel required",
                    "You must be in a voice channel to use this command!",
                )
            })
            .await?;
            return Ok(());
        }
    };
    let guild_id = guild.id;
    let active = music::active_channel(ctx.serenity_context(), guild_id).await;
    if !music::channel_joinable(active, voice_channel) {
        ctx.send(|m| {
            m.embed_error(
                "Already connected",
                "The bot is already playing in a different voice channel.",
            )
        })
        .await?;
        return Ok(());
    }

    let (name, raw_url): (String, String) = match (station, url) {
        (Some(station), _) => (station.name().to_string(), station.stream_url().to_string()),
        (None, Some(url)) => ("Custom Radio".to_string(), url),
        (None, None) => {
            ctx.send(|m| {
                m.embed_error(
                    "Missing input",
                    "Pick a station from the list or pass a custom stream URL.",
                )
            })
            .await?;
            return Ok(());
        }
    };

    ctx.defer().await?;

    let stream_url = match resolve_stream_url(&raw_url).await {
        Ok(url) => url,
        Err(e) => {
            ctx.send(|m| {
                m.embed_error(
                    "Stream processing failed",
                    &format!("Could not resolve the stream URL.\n```{e}```"),
                )
            })
            .await?;
            return Ok(());
        }
    };

    let call = music::join_channel(
        ctx.serenity_context(),
        guild_id,
        voice_channel,
        ctx.channel_id(),
    )
    .await?;

    let source = match songbird::ffmpeg(&stream_url).await {
        Ok(source) => source,
        Err(why) => {
            ctx.send(|m| {
                m.embed_error(
                    "Playback error",
                    &format!("Failed to open the radio stream.\n```{:?}```", why),
                )
            })
            .await?;
            return Ok(());
        }
    };

    {
        let mut handler = call.lock().await;
        handler.queue().stop();
        handler.play_only_source(source);
    }
    info!(guild = guild_id.0, station = %name, "radio stream started");

    let listener_count = guild
        .voice_states
        .values()
        .filter(|vs| vs.channel_id == Some(voice_channel))
        .count();

    check_msg(
        ctx.send(|m| {
            m.embed(|e| {
                e.color(0x00FF88)
                    .title("📻 Radio stream started")
                    .description(format!("Now broadcasting **{}** live! 🎵", name))
                    .field("📡 Station", format!("```{}```", name), true)
                    .field("👥 Listeners", format!("```{}```", listener_count), true)
                    .field(
                        "🔗 Stream URL",
                        format!("```{}```", truncate(&stream_url, 80)),
                        false,
                    )
                    .footer(|f| f.text("Use /stop to stop the radio"))
            })
        })
        .await,
    );
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        format!("{}...", s.chars().take(max).collect::<String>())
    } else {
        s.to_string()
    }
}

/// Direct media and protocol URLs pass through; playlist container formats
/// are fetched and the first stream entry extracted.
pub async fn resolve_stream_url(url: &str) -> Result<String, Error> {
    let lower = url.to_ascii_lowercase();
    if lower.ends_with(".pls")
        || lower.ends_with(".m3u")
        || lower.ends_with(".m3u8")
        || lower.ends_with(".asx")
        || lower.ends_with(".xspf")
    {
        let body = reqwest::get(url).await?.error_for_status()?.text().await?;
        let entry = if lower.ends_with(".pls") {
            parse_pls(&body)
        } else if lower.ends_with(".asx") {
            parse_asx(&body)
        } else if lower.ends_with(".xspf") {
            parse_xspf(&body)
        } else {
            parse_m3u(&body)
        };
        return entry.ok_or_else(|| Error::other("playlist file contained no stream entry"));
    }
    Ok(url.to_string())
}

pub fn parse_pls(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let line = line.trim();
        let lower = line.to_ascii_lowercase();
        lower
            .starts_with("file1=")
            .then(|| line.splitn(2, '=').nth(1))
            .flatten()
            .map(|s| s.trim().to_string())
    })
}

pub fn parse_m3u(content: &str) -> Option<String> {
    content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
}

pub fn parse_asx(content: &str) -> Option<String> {
    let re = Regex::new(r#"(?i)href\s*=\s*["']([^"']+)["']"#).expect("asx regex");
    re.captures(content).map(|c| c[1].to_string())
}

pub fn parse_xspf(content: &str) -> Option<String> {
    let re = Regex::new(r"(?i)<location>([^<]+)</location>").expect("xspf regex");
    re.captures(content).map(|c| c[1].trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pls_takes_file1() {
        let pls = "[playlist]\nNumberOfEntries=2\nFile1=http://a/stream.mp3\nFile2=http://b\n";
        assert_eq!(parse_pls(pls), Some("http://a/stream.mp3".to_string()));
        assert_eq!(parse_pls("[playlist]\nTitle1=x\n"), None);
    }

    #[test]
    fn pls_is_case_insensitive() {
        assert_eq!(
            parse_pls("file1=http://a/s"),
            Some("http://a/s".to_string())
        );
    }

    #[test]
    fn m3u_skips_comments_and_blank_lines() {
        let m3u = "#EXTM3U\n\n#EXTINF:-1,Some Station\nhttp://stream.example/live\n";
        assert_eq!(
            parse_m3u(m3u),
            Some("http://stream.example/live".to_string())
        );
        assert_eq!(parse_m3u("#EXTM3U\n"), None);
    }

    #[test]
    fn asx_extracts_href() {
        let asx = r#"<asx version="3.0"><entry><ref HREF="http://a/live"/></entry></asx>"#;
        assert_eq!(parse_asx(asx), Some("http://a/live".to_string()));
        assert_eq!(parse_asx("<asx></asx>"), None);
    }

    #[test]
    fn xspf_extracts_location() {
        let xspf = "<playlist><trackList><track><location>http://a/live</location></track></trackList></playlist>";
        assert_eq!(parse_xspf(xspf), Some("http://a/live".to_string()));
        assert_eq!(parse_xspf("<playlist/>"), None);
    }

    #[test]
    fn truncation_preserves_short_urls() {
        assert_eq!(truncate("short", 80), "short");
        assert_eq!(truncate(&"x".repeat(100), 10), format!("{}...", "x".repeat(10)));
    }
}
