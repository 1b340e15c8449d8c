use poise::serenity_prelude as serenity;
use serenity::{ButtonStyle, Timestamp};

use crate::embeds;
use crate::tickets::{self, TicketCategory};
use crate::{Context, Error};

/// Set up the ticket panel in this channel
#[poise::command(
    slash_command,
    guild_only,
    rename = "tickets",
    required_permissions = "ADMINISTRATOR"
)]
pub async fn setup(ctx: Context<'_>) -> Result<(), Error> {
    ctx.send(|m| {
        m.ephemeral(true)
            .embed(|e| embeds::simple(e, "Panel has been posted.", embeds::GREEN))
    })
    .await?;

    let guild_icon = ctx.guild().and_then(|g| g.icon_url());
    ctx.channel_id()
        .send_message(&ctx.serenity_context().http, |m| {
            m.embed(|e| {
                e.color(embeds::BLURPLE)
                    .title("🎫 Support")
                    .description(
                        "📋 Questions, problems or feedback? Open a **support \
                         ticket** to get in touch with the team. Someone will \
                         answer as soon as possible — no need to ping anyone.",
                    )
                    .field(
                        "What next?",
                        "Pick a **category** from the **drop-down menu** below \
                         to tailor your ticket.",
                        false,
                    )
                    .footer(|f| f.text("Ticket system"))
                    .timestamp(Timestamp::now());
                if let Some(icon) = &guild_icon {
                    e.thumbnail(icon);
                }
                e
            })
            .components(|c| {
                c.create_action_row(|row| {
                    row.create_select_menu(|s| {
                        s.custom_id(tickets::CATEGORY_SELECT)
                            .placeholder("Choose a category")
                            .options(|o| {
                                for category in TicketCategory::ALL {
                                    o.create_option(|op| {
                                        op.label(category.label())
                                            .value(category.value())
                                            .emoji::<serenity::ReactionType>(category.emoji().into())
                                    });
                                }
                                o
                            })
                    })
                })
            })
        })
        .await?;
    Ok(())
}

/// Manage the current ticket thread
#[poise::command(slash_command, guild_only, required_permissions = "KICK_MEMBERS")]
pub async fn menu(ctx: Context<'_>) -> Result<(), Error> {
    if !ctx.data().tickets.is_ticket(ctx.channel_id().0) {
        ctx.send(|m| {
            m.ephemeral(true).embed(|e| {
                embeds::simple(
                    e,
                    "This command can only be used in a ticket thread.",
                    embeds::RED,
                )
            })
        })
        .await?;
        return Ok(());
    }

    ctx.send(|m| {
        m.ephemeral(true)
            .embed(|e| {
                e.color(embeds::BLURPLE)
                    .title("⚒️ Management menu")
                    .description("Pick an action for this ticket.")
            })
            .components(|c| {
                c.create_action_row(|row| {
                    row.create_button(|b| {
                        b.custom_id(tickets::CLOSE_BTN)
                            .label("Close ticket")
                            .style(ButtonStyle::Danger)
                            .emoji('🔒')
                    })
                    .create_button(|b| {
                        b.custom_id(tickets::CLOSE_REASON_BTN)
                            .label("Close with reason")
                            .style(ButtonStyle::Secondary)
                            .emoji('📄')
                    })
                    .create_button(|b| {
                        b.custom_id(tickets::TRANSCRIPT_BTN)
                            .label("Transcript")
                            .style(ButtonStyle::Secondary)
                            .emoji('📄')
                    })
                })
                .create_action_row(|row| {
                    row.create_button(|b| {
                        b.custom_id(tickets::ARCHIVE_BTN)
                            .label("Archive")
                            .style(ButtonStyle::Secondary)
                            .emoji('💾')
                    })
                    .create_button(|b| {
                        b.custom_id(tickets::DELETE_BTN)
                            .label("Delete")
                            .style(ButtonStyle::Danger)
                            .emoji('🗑')
                    })
                    .create_button(|b| {
                        b.custom_id(tickets::REOPEN_BTN)
                            .label("Reopen")
                            .style(ButtonStyle::Success)
                            .emoji('🔓')
                    })
                })
            })
    })
    .await?;
    Ok(())
}
