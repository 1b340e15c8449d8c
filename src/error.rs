use poise::serenity_prelude as serenity;

/// Anything a command or event handler can fail with. poise prints these
/// through `on_error`, so every variant carries enough context on its own.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("discord api error: {0}")]
    Discord(#[from] serenity::Error),

    #[error("failed to join voice channel: {0}")]
    Join(#[from] songbird::error::JoinError),

    #[error("failed to create audio source: {0}")]
    Source(#[from] songbird::input::error::Error),

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("transcript template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),

    #[error("environment variable {0} is not a valid id")]
    InvalidEnv(&'static str),

    #[error("{0}")]
    Other(String),
}

impl BotError {
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
