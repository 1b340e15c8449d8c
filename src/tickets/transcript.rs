//! HTML transcript rendering for closed tickets. The Discord-specific
//! gathering lives in the ticket module; everything here works on plain
//! data and is testable offline.

use minijinja::{context, Environment};
use regex::Regex;
use serde::Serialize;

use crate::error::BotError;

const TEMPLATE: &str = include_str!("transcript.html");

#[derive(Debug, Serialize)]
pub struct TranscriptMessage {
    pub author: String,
    pub avatar_url: String,
    pub timestamp: String,
    pub content_html: String,
    pub attachments: Vec<String>,
    pub embeds: Vec<TranscriptEmbed>,
}

#[derive(Debug, Serialize)]
pub struct TranscriptEmbed {
    pub title: Option<String>,
    pub description: Option<String>,
    pub color: String,
    pub image_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub fields: Vec<TranscriptField>,
}

#[derive(Debug, Serialize)]
pub struct TranscriptField {
    pub name: String,
    pub value: String,
}

/// Per-user message counts for the stats embed, insertion-ordered by first
/// appearance.
#[derive(Debug, Default)]
pub struct MessageStats {
    counts: Vec<(String, usize)>,
    pub total: usize,
}

impl MessageStats {
    pub fn record(&mut self, author: &str) {
        self.total += 1;
        if let Some(entry) = self.counts.iter_mut().find(|(name, _)| name == author) {
            entry.1 += 1;
        } else {
            self.counts.push((author.to_string(), 1));
        }
    }

    pub fn user_count(&self) -> usize {
        self.counts.len()
    }

    pub fn summary(&self) -> String {
        self.counts
            .iter()
            .map(|(name, count)| format!("* {} ({})", name, count))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn render_html(channel_name: &str, messages: &[TranscriptMessage]) -> Result<String, BotError> {
    let mut env = Environment::new();
    env.add_template("transcript", TEMPLATE)?;
    let tmpl = env.get_template("transcript")?;
    Ok(tmpl.render(context! {
        channel_name => channel_name,
        messages => messages,
    })?)
}

/// Escapes the raw message content and rewrites Discord-isms into HTML:
/// custom emoji become `<img>` tags, URLs become links, and the common
/// inline markdown (bold, italics, inline code) is translated.
pub fn process_content(content: &str) -> String {
    let escaped = escape_html(content);

    let url_re = Regex::new(r"(https?://[^\s<]+)").expect("url regex");
    let linked = url_re.replace_all(&escaped, r#"<a href="$1" target="_blank">$1</a>"#);

    let emoji_re = Regex::new(r"&lt;(a?):([^:]+):(\d+)&gt;").expect("emoji regex");
    let with_emoji = emoji_re.replace_all(&linked, |caps: &regex::Captures| {
        let ext = if &caps[1] == "a" { "gif" } else { "png" };
        format!(
            r#"<img class="emoji" src="https://cdn.discordapp.com/emojis/{id}.{ext}" alt=":{name}:" title=":{name}:" width="22" height="22">"#,
            id = &caps[3],
            ext = ext,
            name = &caps[2],
        )
    });

    let code_re = Regex::new(r"`([^`]+)`").expect("code regex");
    let with_code = code_re.replace_all(&with_emoji, "<code>$1</code>");

    let bold_re = Regex::new(r"\*\*([^*]+)\*\*").expect("bold regex");
    let with_bold = bold_re.replace_all(&with_code, "<b>$1</b>");

    let italic_re = Regex::new(r"\*([^*]+)\*").expect("italic regex");
    italic_re.replace_all(&with_bold, "<i>$1</i>").into_owned()
}

pub fn embed_color_hex(value: Option<u32>) -> String {
    match value {
        Some(c) => format!("#{:06x}", c),
        None => "#4f545c".to_string(),
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Bounds transcript memory: the stats count everything, the rendered page
/// keeps at most this many messages.
pub const MAX_RENDERED_MESSAGES: usize = 2_000;

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(content: &str) -> TranscriptMessage {
        TranscriptMessage {
            author: "tester".to_string(),
            avatar_url: "https://example.com/a.png".to_string(),
            timestamp: "01-01-2026 12:00".to_string(),
            content_html: process_content(content),
            attachments: vec![],
            embeds: vec![],
        }
    }

    #[test]
    fn renders_channel_and_messages() {
        let html = render_html("support", &[msg("hello world")]).expect("render");
        assert!(html.contains("#support"));
        assert!(html.contains("hello world"));
        assert!(html.contains("tester"));
    }

    #[test]
    fn escapes_injected_html() {
        let processed = process_content("<script>alert(1)</script>");
        assert!(!processed.contains("<script>"));
        assert!(processed.contains("&lt;script&gt;"));
    }

    #[test]
    fn linkifies_urls() {
        let processed = process_content("see https://example.com/page please");
        assert!(processed.contains(r#"<a href="https://example.com/page""#));
    }

    #[test]
    fn rewrites_custom_emoji() {
        let processed = process_content("<:check:1368203772123283506>");
        assert!(processed.contains("cdn.discordapp.com/emojis/1368203772123283506.png"));
        let animated = process_content("<a:dance:123>");
        assert!(animated.contains("emojis/123.gif"));
    }

    #[test]
    fn translates_inline_markdown() {
        assert_eq!(process_content("**hi**"), "<b>hi</b>");
        assert_eq!(process_content("*hi*"), "<i>hi</i>");
        assert_eq!(process_content("`code`"), "<code>code</code>");
    }

    #[test]
    fn stats_count_in_order() {
        let mut stats = MessageStats::default();
        stats.record("alice");
        stats.record("bob");
        stats.record("alice");
        assert_eq!(stats.total, 3);
        assert_eq!(stats.user_count(), 2);
        assert_eq!(stats.summary(), "* alice (2)\n* bob (1)");
    }

    #[test]
    fn embed_colors() {
        assert_eq!(embed_color_hex(Some(0x5865F2)), "#5865f2");
        assert_eq!(embed_color_hex(None), "#4f545c");
    }
}
