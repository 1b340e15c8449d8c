use poise::serenity_prelude as serenity;
use serenity::{CreateEmbed, Timestamp};
use songbird::input::Metadata;
use std::time::Duration;

use crate::utils::{bold, format_time, hyperlink};

pub const BLURPLE: u32 = 0x5865F2;
pub const GREEN: u32 = 0x2ECC71;
pub const RED: u32 = 0xE74C3C;
pub const YELLOW: u32 = 0xF1C40F;
pub const ORANGE: u32 = 0xF39C12;
pub const GREY: u32 = 0x95A5A6;
pub const BLUE: u32 = 0x3498DB;

const FALLBACK_THUMBNAIL: &str =
    "https://images.pexels.com/photos/11733110/pexels-photo-11733110.jpeg";

fn title_link(metadata: &Metadata) -> String {
    let title = metadata.title.as_deref().unwrap_or("Unknown title");
    match metadata.source_url.as_deref() {
        Some(url) => bold(hyperlink(title, url)),
        None => bold(title),
    }
}

fn thumbnail(metadata: &Metadata) -> &str {
    metadata.thumbnail.as_deref().unwrap_or(FALLBACK_THUMBNAIL)
}

/// "New song queued up" card with the queue position and how long until
/// the track is reached.
pub fn queued_up<'a>(
    e: &'a mut CreateEmbed,
    metadata: &Metadata,
    position: usize,
    eta: Duration,
) -> &'a mut CreateEmbed {
    e.color(GREEN)
        .title("New song queued up")
        .description(title_link(metadata))
        .fields(vec![
            (
                "Duration",
                metadata
                    .duration
                    .map(format_time)
                    .unwrap_or_else(|| "live".to_string()),
                true,
            ),
            ("Position in queue", format!("#{}", position), true),
            ("Starts in", format_time(eta), true),
        ])
        .thumbnail(thumbnail(metadata))
        .timestamp(Timestamp::now())
}

pub fn now_playing<'a>(
    e: &'a mut CreateEmbed,
    metadata: &Metadata,
    elapsed: Duration,
) -> &'a mut CreateEmbed {
    let remaining = metadata
        .duration
        .map(|d| d.saturating_sub(elapsed))
        .map(format_time)
        .unwrap_or_else(|| "live".to_string());
    e.color(BLURPLE)
        .title("Now playing")
        .description(title_link(metadata))
        .field(
            "Artist",
            metadata
                .artist
                .as_deref()
                .or(metadata.channel.as_deref())
                .unwrap_or("Unknown artist"),
            true,
        )
        .field("Time remaining", remaining, true)
        .thumbnail(thumbnail(metadata))
        .footer(|f| f.text("Use /skip to go to the next song"))
        .timestamp(Timestamp::now())
}

pub fn empty_queue(e: &mut CreateEmbed) -> &mut CreateEmbed {
    e.color(GREY).title("There are no songs in the queue")
}

pub fn simple<'a>(e: &'a mut CreateEmbed, text: &str, color: u32) -> &'a mut CreateEmbed {
    e.color(color).description(text)
}

pub fn error<'a>(e: &'a mut CreateEmbed, title: &str, description: &str) -> &'a mut CreateEmbed {
    e.color(RED).title(title).description(description)
}

/// Embed extensions for command replies, in the spirit of the playback
/// commands: one method per recurring card.
pub trait ReplyEmbeds<'a> {
    fn embed_queued_up(&mut self, metadata: &Metadata, position: usize, eta: Duration)
        -> &mut Self;
    fn embed_now_playing(&mut self, metadata: &Metadata, elapsed: Duration) -> &mut Self;
    fn embed_empty_queue(&mut self) -> &mut Self;
    fn embed_error(&mut self, title: &str, description: &str) -> &mut Self;
}

impl<'a> ReplyEmbeds<'a> for poise::CreateReply<'a> {
    fn embed_queued_up(
        &mut self,
        metadata: &Metadata,
        position: usize,
        eta: Duration,
    ) -> &mut Self {
        self.embed(|e| queued_up(e, metadata, position, eta))
    }

    fn embed_now_playing(&mut self, metadata: &Metadata, elapsed: Duration) -> &mut Self {
        self.embed(|e| now_playing(e, metadata, elapsed))
    }

    fn embed_empty_queue(&mut self) -> &mut Self {
        self.embed(empty_queue)
    }

    fn embed_error(&mut self, title: &str, description: &str) -> &mut Self {
        self.ephemeral(true).embed(|e| error(e, title, description))
    }
}
