pub mod store;
pub mod transcript;

use std::borrow::Cow;

use poise::serenity_prelude as serenity;
use serenity::{
    ActionRowComponent, AttachmentType, ButtonStyle, ChannelId, GuildId, InputTextStyle,
    InteractionResponseType, Mentionable, Message, MessageComponentInteraction,
    ModalSubmitInteraction, Timestamp, UserId,
};
use tracing::{info, warn};

use crate::embeds;
use crate::error::BotError;
use crate::utils::check_msg;
use crate::Data;

// Component custom ids. Everything is matched by prefix in the event
// handler, so keep the `ticket_` namespace.
pub const CATEGORY_SELECT: &str = "ticket_category";
pub const CLOSE_BTN: &str = "ticket_close";
pub const CLOSE_REASON_BTN: &str = "ticket_close_reason";
pub const CLOSE_YES_BTN: &str = "ticket_close_yes";
pub const CLOSE_NO_BTN: &str = "ticket_close_no";
pub const REOPEN_BTN: &str = "ticket_reopen";
pub const ARCHIVE_BTN: &str = "ticket_archive";
pub const TRANSCRIPT_BTN: &str = "ticket_transcript";
pub const DELETE_BTN: &str = "ticket_delete";
pub const DELETE_YES_BTN: &str = "ticket_delete_yes";
pub const DELETE_NO_BTN: &str = "ticket_delete_no";
pub const MODAL_PREFIX: &str = "ticket_modal:";
pub const CLOSE_REASON_MODAL: &str = "ticket_close_reason_modal";
pub const ARCHIVE_MODAL: &str = "ticket_archive_modal";
pub const TRANSCRIPT_MODAL: &str = "ticket_transcript_modal";

const GREEN: u32 = embeds::GREEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketCategory {
    General,
    Technical,
    Report,
    Appeal,
    Other,
}

impl TicketCategory {
    pub const ALL: [TicketCategory; 5] = [
        TicketCategory::General,
        TicketCategory::Technical,
        TicketCategory::Report,
        TicketCategory::Appeal,
        TicketCategory::Other,
    ];

    pub fn value(self) -> &'static str {
        match self {
            TicketCategory::General => "general",
            TicketCategory::Technical => "technical",
            TicketCategory::Report => "report",
            TicketCategory::Appeal => "appeal",
            TicketCategory::Other => "other",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.value() == value)
    }

    pub fn label(self) -> &'static str {
        match self {
            TicketCategory::General => "General question",
            TicketCategory::Technical => "Technical issue",
            TicketCategory::Report => "Report a user",
            TicketCategory::Appeal => "Ban appeal",
            TicketCategory::Other => "Something else",
        }
    }

    pub fn emoji(self) -> char {
        match self {
            TicketCategory::General => '💬',
            TicketCategory::Technical => '🔧',
            TicketCategory::Report => '📝',
            TicketCategory::Appeal => '⚖',
            TicketCategory::Other => '❓',
        }
    }

    /// Extra modal input beyond subject and details, if the category needs
    /// one.
    fn extra_field(self) -> Option<(&'static str, &'static str)> {
        match self {
            TicketCategory::Report => Some(("reported_user", "Who are you reporting?")),
            TicketCategory::Appeal => Some(("case_ref", "Ban or case reference")),
            _ => None,
        }
    }
}

/// Category select picked on the panel: open the matching modal.
pub async fn open_category_modal(
    ctx: &serenity::Context,
    mci: &MessageComponentInteraction,
) -> Result<(), BotError> {
    let value = mci.data.values.first().map(String::as_str).unwrap_or("");
    let category = match TicketCategory::from_value(value) {
        Some(c) => c,
        None => return Ok(()),
    };

    mci.create_interaction_response(&ctx.http, |r| {
        r.kind(InteractionResponseType::Modal)
            .interaction_response_data(|d| {
                d.custom_id(format!("{}{}", MODAL_PREFIX, category.value()))
                    .title(category.label())
                    .components(|c| {
                        c.create_action_row(|row| {
                            row.create_input_text(|t| {
                                t.custom_id("subject")
                                    .label("Subject")
                                    .style(InputTextStyle::Short)
                                    .max_length(60)
                                    .required(true)
                            })
                        });
                        if let Some((id, label)) = category.extra_field() {
                            c.create_action_row(|row| {
                                row.create_input_text(|t| {
                                    t.custom_id(id)
                                        .label(label)
                                        .style(InputTextStyle::Short)
                                        .max_length(100)
                                        .required(true)
                                })
                            });
                        }
                        c.create_action_row(|row| {
                            row.create_input_text(|t| {
                                t.custom_id("details")
                                    .label("Describe your issue")
                                    .style(InputTextStyle::Paragraph)
                                    .max_length(1_000)
                                    .required(false)
                            })
                        })
                    })
            })
    })
    .await?;
    Ok(())
}

/// Modal submitted: create the private thread, record the creator and post
/// the overview card with the close buttons.
pub async fn create_ticket_thread(
    ctx: &serenity::Context,
    data: &Data,
    msi: &ModalSubmitInteraction,
    category: TicketCategory,
) -> Result<(), BotError> {
    let subject = modal_value(msi, "subject").unwrap_or("Support").to_string();
    let details = modal_value(msi, "details").unwrap_or("").to_string();
    let extra = category
        .extra_field()
        .and_then(|(id, label)| Some((label, modal_value(msi, id)?.to_string())));

    let opener = &msi.user;
    let thread_name = format!("{} by {}", subject, opener.name);
    let thread = data
        .config
        .ticket_channel
        .create_private_thread(&ctx.http, |t| {
            // serenity 0.11's CreateThread has no `invitable` builder method;
            // set the field directly (same key EditThread::invitable uses).
            t.name(&thread_name);
            t.0.insert("invitable", serde_json::Value::from(false));
            t
        })
        .await?;
    info!(thread = thread.id.0, user = opener.id.0, "ticket thread created");

    data.tickets.record(thread.id.0, opener.id.0)?;
    thread.id.add_thread_member(&ctx.http, opener.id).await?;

    let role_mentions = msi
        .guild_id
        .map(|gid| mod_mentions(ctx, data, gid))
        .unwrap_or_default();

    let avatar = opener.avatar_url();
    let category_label = category.label();
    thread
        .id
        .send_message(&ctx.http, |m| {
            m.content(format!(
                "{} You will be helped as soon as possible!",
                role_mentions
            ))
            .embed(|e| {
                e.color(0x00D166)
                    .title("🎫 Ticket overview")
                    .description(
                        "Close the ticket with 🔒 and confirm, or close it \
                         with a reason via the second button.",
                    )
                    .author(|a| {
                        a.name(&opener.name);
                        if let Some(url) = &avatar {
                            a.icon_url(url);
                        }
                        a
                    })
                    .field("📋 Category", format!("```{}```", category_label), false)
                    .field("📝 Subject", format!("```{}```", subject), false);
                if let Some((label, value)) = &extra {
                    e.field(format!("❗ {}", label), format!("```{}```", value), false);
                }
                if !details.trim().is_empty() {
                    e.field("📋 Details", format!("```{}```", details), false);
                }
                e.footer(|f| f.text("Ticket system")).timestamp(Timestamp::now())
            })
            .components(|c| {
                c.create_action_row(|row| {
                    row.create_button(|b| {
                        b.custom_id(CLOSE_BTN)
                            .label("Close ticket")
                            .style(ButtonStyle::Danger)
                            .emoji('🔒')
                    })
                    .create_button(|b| {
                        b.custom_id(CLOSE_REASON_BTN)
                            .label("Close with reason")
                            .style(ButtonStyle::Secondary)
                            .emoji('📄')
                    })
                })
            })
        })
        .await?;

    respond_embed(ctx, msi, GREEN, &format!("Ticket created in {}!", thread.id.mention())).await
}

/// `?close` typed by a moderator inside a ticket thread.
pub async fn close_prompt(
    ctx: &serenity::Context,
    data: &Data,
    msg: &Message,
) -> Result<(), BotError> {
    let creator = data.tickets.creator(msg.channel_id.0);
    let mention = creator
        .map(|id| UserId(id).mention().to_string())
        .unwrap_or_else(|| "@here".to_string());

    msg.channel_id
        .send_message(&ctx.http, |m| {
            m.content(format!(
                "{} If you have no further questions, feel free to close the ticket!",
                mention
            ))
            .components(|c| {
                c.create_action_row(|row| {
                    row.create_button(|b| {
                        b.custom_id(CLOSE_BTN)
                            .label("Close ticket")
                            .style(ButtonStyle::Danger)
                            .emoji('🔒')
                    })
                    .create_button(|b| {
                        b.custom_id(CLOSE_REASON_BTN)
                            .label("Close with reason")
                            .style(ButtonStyle::Secondary)
                            .emoji('📄')
                    })
                    .create_button(|b| {
                        b.custom_id(CLOSE_NO_BTN)
                            .label("Cancel")
                            .style(ButtonStyle::Secondary)
                            .emoji('✖')
                    })
                })
            })
        })
        .await?;
    Ok(())
}

/// Close button: ask for confirmation.
pub async fn confirm_close(
    ctx: &serenity::Context,
    mci: &MessageComponentInteraction,
) -> Result<(), BotError> {
    mci.create_interaction_response(&ctx.http, |r| {
        r.kind(InteractionResponseType::ChannelMessageWithSource)
            .interaction_response_data(|d| {
                d.embed(|e| {
                    embeds::simple(
                        e,
                        &format!(
                            "> {} Are you sure you want to close this ticket?",
                            mci.user.mention()
                        ),
                        0xFFAA00,
                    )
                })
                .components(|c| {
                    c.create_action_row(|row| {
                        row.create_button(|b| {
                            b.custom_id(CLOSE_YES_BTN)
                                .label("Yes, close")
                                .style(ButtonStyle::Danger)
                                .emoji('✔')
                        })
                        .create_button(|b| {
                            b.custom_id(CLOSE_NO_BTN)
                                .label("No")
                                .style(ButtonStyle::Secondary)
                                .emoji('✖')
                        })
                    })
                })
            })
    })
    .await?;
    Ok(())
}

/// Close-with-reason button: collect the reason through a modal.
pub async fn open_close_reason_modal(
    ctx: &serenity::Context,
    mci: &MessageComponentInteraction,
) -> Result<(), BotError> {
    mci.create_interaction_response(&ctx.http, |r| {
        r.kind(InteractionResponseType::Modal)
            .interaction_response_data(|d| {
                d.custom_id(CLOSE_REASON_MODAL)
                    .title("Close ticket")
                    .components(|c| {
                        c.create_action_row(|row| {
                            row.create_input_text(|t| {
                                t.custom_id("reason")
                                    .label("Reason")
                                    .placeholder("Why is this ticket being closed?")
                                    .style(InputTextStyle::Paragraph)
                                    .max_length(300)
                                    .required(true)
                            })
                        })
                    })
            })
    })
    .await?;
    Ok(())
}

/// Locks and archives the thread, announces who closed it and posts the
/// post-close action row. `reason` is `None` for the plain close.
pub async fn close_thread(
    ctx: &serenity::Context,
    channel: ChannelId,
    closed_by: &serenity::User,
    reason: Option<&str>,
) -> Result<(), BotError> {
    let notice = match reason {
        Some(reason) => format!(
            "> Ticket closed by **{}** for the following reason: ```{}```",
            closed_by.name, reason
        ),
        None => format!("> Ticket closed by **{}**", closed_by.name),
    };

    channel
        .send_message(&ctx.http, |m| {
            m.embed(|e| embeds::simple(e, &notice, embeds::ORANGE))
                .components(|c| {
                    c.create_action_row(|row| {
                        row.create_button(|b| {
                            b.custom_id(REOPEN_BTN)
                                .label("Reopen")
                                .style(ButtonStyle::Success)
                                .emoji('🔓')
                        })
                        .create_button(|b| {
                            b.custom_id(ARCHIVE_BTN)
                                .label("Archive")
                                .style(ButtonStyle::Secondary)
                                .emoji('💾')
                        })
                        .create_button(|b| {
                            b.custom_id(TRANSCRIPT_BTN)
                                .label("Transcript")
                                .style(ButtonStyle::Secondary)
                                .emoji('📄')
                        })
                        .create_button(|b| {
                            b.custom_id(DELETE_BTN)
                                .label("Delete")
                                .style(ButtonStyle::Danger)
                                .emoji('🗑')
                        })
                    })
                })
        })
        .await?;

    channel
        .edit_thread(&ctx.http, |t| t.archived(true).locked(true))
        .await?;
    info!(thread = channel.0, by = closed_by.id.0, "ticket closed");
    Ok(())
}

/// Close-reason modal submitted: acknowledge silently and close.
pub async fn close_with_reason(
    ctx: &serenity::Context,
    msi: &ModalSubmitInteraction,
) -> Result<(), BotError> {
    let reason = modal_value(msi, "reason")
        .unwrap_or("No reason given")
        .to_string();
    msi.create_interaction_response(&ctx.http, |r| {
        r.kind(InteractionResponseType::DeferredUpdateMessage)
    })
    .await?;
    close_thread(ctx, msi.channel_id, &msi.user, Some(&reason)).await
}

pub async fn reopen_thread(
    ctx: &serenity::Context,
    data: &Data,
    mci: &MessageComponentInteraction,
) -> Result<(), BotError> {
    mci.channel_id
        .edit_thread(&ctx.http, |t| t.archived(false).locked(false))
        .await?;
    if let Some(creator) = data.tickets.creator(mci.channel_id.0) {
        if let Err(e) = mci.channel_id.add_thread_member(&ctx.http, UserId(creator)).await {
            warn!("could not re-add ticket creator: {e}");
        }
    }
    respond_component_embed(
        ctx,
        mci,
        GREEN,
        &format!("> {} The ticket has been reopened.", mci.user.mention()),
    )
    .await
}

/// Archive button: offer a rename before archiving.
pub async fn open_archive_modal(
    ctx: &serenity::Context,
    mci: &MessageComponentInteraction,
) -> Result<(), BotError> {
    mci.create_interaction_response(&ctx.http, |r| {
        r.kind(InteractionResponseType::Modal)
            .interaction_response_data(|d| {
                d.custom_id(ARCHIVE_MODAL)
                    .title("Archive the ticket")
                    .components(|c| {
                        c.create_action_row(|row| {
                            row.create_input_text(|t| {
                                t.custom_id("name")
                                    .label("Rename the ticket before archiving?")
                                    .placeholder("New thread name")
                                    .style(InputTextStyle::Short)
                                    .max_length(30)
                                    .required(false)
                            })
                        })
                    })
            })
    })
    .await?;
    Ok(())
}

pub async fn archive_thread(
    ctx: &serenity::Context,
    msi: &ModalSubmitInteraction,
) -> Result<(), BotError> {
    let new_name = modal_value(msi, "name").unwrap_or("").trim().to_string();
    msi.create_interaction_response(&ctx.http, |r| {
        r.kind(InteractionResponseType::DeferredUpdateMessage)
    })
    .await?;
    msi.channel_id
        .edit_thread(&ctx.http, |t| {
            if !new_name.is_empty() {
                t.name(&new_name);
            }
            t.archived(true)
        })
        .await?;
    Ok(())
}

pub async fn confirm_delete(
    ctx: &serenity::Context,
    mci: &MessageComponentInteraction,
) -> Result<(), BotError> {
    mci.create_interaction_response(&ctx.http, |r| {
        r.kind(InteractionResponseType::ChannelMessageWithSource)
            .interaction_response_data(|d| {
                d.embed(|e| {
                    embeds::simple(
                        e,
                        &format!(
                            "> {} Do you really want to delete this ticket?",
                            mci.user.mention()
                        ),
                        embeds::RED,
                    )
                })
                .components(|c| {
                    c.create_action_row(|row| {
                        row.create_button(|b| {
                            b.custom_id(DELETE_YES_BTN)
                                .label("Yes, delete")
                                .style(ButtonStyle::Danger)
                                .emoji('✔')
                        })
                        .create_button(|b| {
                            b.custom_id(DELETE_NO_BTN)
                                .label("No")
                                .style(ButtonStyle::Secondary)
                                .emoji('✖')
                        })
                    })
                })
            })
    })
    .await?;
    Ok(())
}

pub async fn delete_thread(
    ctx: &serenity::Context,
    data: &Data,
    mci: &MessageComponentInteraction,
) -> Result<(), BotError> {
    data.tickets.forget(mci.channel_id.0)?;
    mci.channel_id.delete(&ctx.http).await?;
    info!(thread = mci.channel_id.0, "ticket deleted");
    Ok(())
}

/// Transcript button: ask for a short summary first.
pub async fn open_transcript_modal(
    ctx: &serenity::Context,
    mci: &MessageComponentInteraction,
) -> Result<(), BotError> {
    mci.create_interaction_response(&ctx.http, |r| {
        r.kind(InteractionResponseType::Modal)
            .interaction_response_data(|d| {
                d.custom_id(TRANSCRIPT_MODAL)
                    .title("Ticket description")
                    .components(|c| {
                        c.create_action_row(|row| {
                            row.create_input_text(|t| {
                                t.custom_id("summary")
                                    .label("Short summary of the ticket")
                                    .style(InputTextStyle::Paragraph)
                                    .max_length(500)
                                    .required(false)
                            })
                        })
                    })
            })
    })
    .await?;
    Ok(())
}

/// Renders the full thread history to HTML and uploads it, with a stats
/// embed, to the transcript channel.
pub async fn create_transcript(
    ctx: &serenity::Context,
    data: &Data,
    msi: &ModalSubmitInteraction,
) -> Result<(), BotError> {
    let summary = modal_value(msi, "summary").unwrap_or("").to_string();
    msi.create_interaction_response(&ctx.http, |r| {
        r.kind(InteractionResponseType::ChannelMessageWithSource)
            .interaction_response_data(|d| {
                d.embed(|e| embeds::simple(e, "📄 Creating the transcript...", 0xFFFF00))
            })
    })
    .await?;

    let channel = msi.channel_id;
    let channel_name = channel
        .name(&ctx.cache)
        .await
        .unwrap_or_else(|| format!("thread-{}", channel.0));

    let mut stats = transcript::MessageStats::default();
    let mut rendered = Vec::new();
    for msg in fetch_full_history(ctx, channel).await? {
        if msg.content.is_empty() && msg.embeds.is_empty() && msg.attachments.is_empty() {
            continue;
        }
        if !msg.author.bot {
            stats.record(&msg.author.name);
        }
        if rendered.len() < transcript::MAX_RENDERED_MESSAGES {
            rendered.push(to_transcript_message(&msg));
        }
    }

    let html = transcript::render_html(&channel_name, &rendered)?;

    let creator = data
        .tickets
        .creator(channel.0)
        .map(|id| UserId(id).mention().to_string())
        .unwrap_or_else(|| "Unknown".to_string());
    let summary_text = if summary.trim().is_empty() {
        "No description given.".to_string()
    } else {
        summary
    };
    let filename = format!("transcript-{}.html", channel_name);
    let user_counts = stats.summary();
    let total = stats.total;
    let member_count = stats.user_count();

    let transcript_msg = data
        .config
        .transcript_channel
        .send_message(&ctx.http, |m| {
            m.add_file(AttachmentType::Bytes {
                data: Cow::Owned(html.into_bytes()),
                filename,
            })
            .embed(|e| {
                e.color(GREEN)
                    .title(format!("📄 Transcript - {}", channel_name))
                    .field("Description", &summary_text, false)
                    .field("Messages", total.to_string(), true)
                    .field("Created by", &creator, true)
                    .field(
                        format!("Users (total: {})", member_count),
                        if user_counts.is_empty() {
                            "-".to_string()
                        } else {
                            user_counts
                        },
                        false,
                    )
                    .footer(|f| f.text("Ticket system"))
                    .timestamp(Timestamp::now())
            })
        })
        .await?;

    msi.edit_original_interaction_response(&ctx.http, |m| {
        m.embed(|e| {
            embeds::simple(
                e,
                &format!(
                    "📄 Transcript created in {}!\n[Jump to transcript]({})",
                    data.config.transcript_channel.mention(),
                    transcript_msg.link()
                ),
                GREEN,
            )
        })
    })
    .await?;
    Ok(())
}

/// Oldest-first history of the whole thread.
async fn fetch_full_history(
    ctx: &serenity::Context,
    channel: ChannelId,
) -> Result<Vec<Message>, BotError> {
    let mut all = Vec::new();
    let mut before: Option<serenity::MessageId> = None;
    loop {
        let batch = channel
            .messages(&ctx.http, |g| match before {
                Some(before) => g.before(before).limit(100),
                None => g.limit(100),
            })
            .await?;
        if batch.is_empty() {
            break;
        }
        before = batch.last().map(|m| m.id);
        all.extend(batch);
    }
    all.reverse();
    Ok(all)
}

fn to_transcript_message(msg: &Message) -> transcript::TranscriptMessage {
    transcript::TranscriptMessage {
        author: msg.author.name.clone(),
        avatar_url: msg
            .author
            .avatar_url()
            .unwrap_or_else(|| msg.author.default_avatar_url()),
        timestamp: chrono::DateTime::<chrono::Utc>::from_timestamp(msg.timestamp.unix_timestamp(), 0)
            .map(|t| t.format("%d-%m-%Y %H:%M").to_string())
            .unwrap_or_default(),
        content_html: transcript::process_content(&msg.content),
        attachments: msg
            .attachments
            .iter()
            .filter(|a| {
                a.content_type
                    .as_deref()
                    .map_or(false, |t| t.starts_with("image/"))
            })
            .map(|a| a.url.clone())
            .collect(),
        embeds: msg
            .embeds
            .iter()
            .map(|e| transcript::TranscriptEmbed {
                title: e.title.clone(),
                description: e.description.clone(),
                color: transcript::embed_color_hex(e.colour.map(|c| c.0)),
                image_url: e.image.as_ref().map(|i| i.url.clone()),
                thumbnail_url: e.thumbnail.as_ref().map(|t| t.url.clone()),
                fields: e
                    .fields
                    .iter()
                    .map(|f| transcript::TranscriptField {
                        name: f.name.clone(),
                        value: f.value.clone(),
                    })
                    .collect(),
            })
            .collect(),
    }
}

/// Sweeps non-moderator members out of an archived ticket thread.
pub async fn archive_sweep(
    ctx: &serenity::Context,
    data: &Data,
    thread: &serenity::GuildChannel,
) -> Result<(), BotError> {
    let guild_id = thread.guild_id;
    let members = thread.id.get_thread_members(&ctx.http).await?;
    let mut notified = false;
    for tm in members {
        let user_id = match tm.user_id {
            Some(id) => id,
            None => continue,
        };
        if user_id == ctx.cache.current_user_id() {
            continue;
        }
        if member_is_mod(ctx, data, guild_id, user_id).await {
            continue;
        }
        if !notified {
            check_msg(
                thread
                    .id
                    .send_message(&ctx.http, |m| {
                        m.embed(|e| {
                            embeds::simple(
                                e,
                                "> Ticket closed for the following reason: \
                                 ```Timed out after 30 days of inactivity.```",
                                0xFFAA00,
                            )
                        })
                    })
                    .await,
            );
            notified = true;
        }
        if let Err(e) = thread.id.remove_thread_member(&ctx.http, user_id).await {
            warn!("could not remove user from archived ticket: {e}");
        } else {
            info!(thread = thread.id.0, user = user_id.0, "removed user from archived ticket");
        }
    }
    Ok(())
}

/// Moderator check by configured role name (or administrator), for contexts
/// where no interaction permission set is available.
pub async fn member_is_mod(
    ctx: &serenity::Context,
    data: &Data,
    guild_id: GuildId,
    user_id: UserId,
) -> bool {
    let member = match guild_id.member(ctx, user_id).await {
        Ok(m) => m,
        Err(_) => return false,
    };
    let roles = match ctx.cache.guild_roles(guild_id) {
        Some(r) => r,
        None => return false,
    };
    member.roles.iter().any(|role_id| {
        roles.get(role_id).map_or(false, |role| {
            role.permissions.administrator()
                || role.permissions.kick_members()
                || role.name == data.config.mod_role
                || role.name == data.config.trial_mod_role
        })
    })
}

fn mod_mentions(ctx: &serenity::Context, data: &Data, guild_id: GuildId) -> String {
    let guild = match ctx.cache.guild(guild_id) {
        Some(g) => g,
        None => return String::new(),
    };
    let mut mentions = Vec::new();
    for name in [&data.config.mod_role, &data.config.trial_mod_role] {
        if let Some(role) = guild.role_by_name(name) {
            mentions.push(role.mention().to_string());
        }
    }
    mentions.join(" ")
}

fn modal_value<'a>(msi: &'a ModalSubmitInteraction, id: &str) -> Option<&'a str> {
    for row in &msi.data.components {
        for component in &row.components {
            if let ActionRowComponent::InputText(input) = component {
                if input.custom_id == id && !input.value.is_empty() {
                    return Some(input.value.as_str());
                }
            }
        }
    }
    None
}

/// Ephemeral embed reply to a modal submit.
pub async fn respond_embed(
    ctx: &serenity::Context,
    msi: &ModalSubmitInteraction,
    color: u32,
    text: &str,
) -> Result<(), BotError> {
    msi.create_interaction_response(&ctx.http, |r| {
        r.kind(InteractionResponseType::ChannelMessageWithSource)
            .interaction_response_data(|d| {
                d.ephemeral(true).embed(|e| embeds::simple(e, text, color))
            })
    })
    .await?;
    Ok(())
}

/// Ephemeral embed reply to a component press.
pub async fn respond_component_embed(
    ctx: &serenity::Context,
    mci: &MessageComponentInteraction,
    color: u32,
    text: &str,
) -> Result<(), BotError> {
    mci.create_interaction_response(&ctx.http, |r| {
        r.kind(InteractionResponseType::ChannelMessageWithSource)
            .interaction_response_data(|d| {
                d.ephemeral(true).embed(|e| embeds::simple(e, text, color))
            })
    })
    .await?;
    Ok(())
}

/// Deletes the interaction's own message, used by cancel buttons.
pub async fn delete_source_message(
    ctx: &serenity::Context,
    mci: &MessageComponentInteraction,
) -> Result<(), BotError> {
    mci.create_interaction_response(&ctx.http, |r| {
        r.kind(InteractionResponseType::DeferredUpdateMessage)
    })
    .await?;
    check_msg(mci.message.delete(&ctx.http).await);
    Ok(())
}
