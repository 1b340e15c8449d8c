use crate::{Context, Error};

const REPO_URL: &str = "https://github.com/ninocss/Shizo";

/// Show information about the bot's GitHub repository
#[poise::command(slash_command)]
pub async fn github(ctx: Context<'_>) -> Result<(), Error> {
    let avatar = ctx
        .serenity_context()
        .cache
        .current_user()
        .avatar_url();

    ctx.send(|m| {
        m.ephemeral(true).embed(|e| {
            e.color(0x00FF00)
                .title("GitHub Repository")
                .description(format!(
                    "Here you can find the source code, report issues, and contribute to the bot!\n\n\
                     [View Repository]({REPO_URL})\n\
                     [Report an Issue]({REPO_URL}/issues)\n\
                     [Contribute]({REPO_URL}/pulls)\n"
                ))
                .author(|a| {
                    a.name("GitHub");
                    if let Some(url) = &avatar {
                        a.icon_url(url);
                    }
                    a
                })
                .thumbnail(
                    "https://github.githubassets.com/images/modules/logos_page/GitHub-Mark.png",
                )
                .field(
                    "Latest Release",
                    format!("[Releases]({REPO_URL}/releases)"),
                    true,
                )
                .field("Stars", "⭐ Give me a star if you like the bot!", false)
        })
    })
    .await?;
    Ok(())
}
