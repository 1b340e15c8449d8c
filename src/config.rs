use std::path::PathBuf;

use poise::serenity_prelude::{ChannelId, GuildId};

use crate::error::BotError;

/// Runtime configuration, read once at startup from the environment
/// (`.env` is honoured via dotenv, see `main`).
#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    /// Guild the slash commands are synced to.
    pub guild_id: GuildId,
    /// Channel carrying the ticket panel; ticket threads live under it.
    pub ticket_channel: ChannelId,
    /// Channel receiving finished ticket transcripts.
    pub transcript_channel: ChannelId,
    /// Channel holding the static music controls message.
    pub controls_channel: ChannelId,
    /// Role names pinged when a ticket opens.
    pub mod_role: String,
    pub trial_mod_role: String,
    /// Directory for the small JSON stores (tickets, music mutes).
    pub data_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, BotError> {
        Ok(Self {
            token: require("DISCORD_TOKEN")?,
            guild_id: GuildId(parse_id("GUILD_ID")?),
            ticket_channel: ChannelId(parse_id("TICKET_CHANNEL_ID")?),
            transcript_channel: ChannelId(parse_id("TRANSCRIPT_CHANNEL_ID")?),
            controls_channel: ChannelId(parse_id("CONTROLS_CHANNEL_ID")?),
            mod_role: std::env::var("MOD_ROLE").unwrap_or_else(|_| "Moderator".to_string()),
            trial_mod_role: std::env::var("TRIAL_MOD_ROLE")
                .unwrap_or_else(|_| "Trial Moderator".to_string()),
            data_dir: std::env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
        })
    }

    pub fn tickets_file(&self) -> PathBuf {
        self.data_dir.join("tickets.json")
    }

    pub fn mutes_file(&self) -> PathBuf {
        self.data_dir.join("music_mutes.json")
    }
}

fn require(name: &'static str) -> Result<String, BotError> {
    std::env::var(name).map_err(|_| BotError::MissingEnv(name))
}

fn parse_id(name: &'static str) -> Result<u64, BotError> {
    require(name)?
        .trim()
        .parse()
        .map_err(|_| BotError::InvalidEnv(name))
}
