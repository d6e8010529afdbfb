use teloxide::{
    macros::BotCommands,
    payloads::SetMyCommandsSetters,
    prelude::Requester,
    types::{BotCommand, BotCommandScope, ChatId, Recipient, UserId},
    Bot,
};

use crate::error::HandlerResult;
use crate::services::directory::UserDirectory;
use crate::services::user::Role;
use crate::storage::UserRecord;

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    Start,
    Help,
    Language,
    Budget,
    Reset,
    Summarize,
    Settings,
    Users,
}

pub fn base_commands() -> Vec<BotCommand> {
    vec![
        BotCommand::new("start", t!("commands.description.start")),
        BotCommand::new("help", t!("commands.description.help")),
        BotCommand::new("language", t!("commands.description.language")),
        BotCommand::new("budget", t!("commands.description.budget")),
    ]
}

pub fn user_commands() -> Vec<BotCommand> {
    let mut commands = base_commands();
    commands.push(BotCommand::new("reset", t!("commands.description.reset")));
    commands.push(BotCommand::new(
        "summarize",
        t!("commands.description.summarize"),
    ));
    commands
}

pub fn admin_commands() -> Vec<BotCommand> {
    let mut commands = user_commands();
    commands.push(BotCommand::new(
        "settings",
        t!("commands.description.settings"),
    ));
    commands
}

pub fn owner_commands() -> Vec<BotCommand> {
    let mut commands = admin_commands();
    commands.push(BotCommand::new("users", t!("commands.description.users")));
    commands
}

/// The command set advertised for a resolved role. Banned and unknown
/// identities both get exactly the base tier.
pub fn commands_for(role: Option<Role>) -> Vec<BotCommand> {
    match role {
        Some(Role::Owner) => owner_commands(),
        Some(Role::Admin) => admin_commands(),
        Some(Role::User) => user_commands(),
        Some(Role::Banned) | None => base_commands(),
    }
}

/// Default-scope commands advertised before any identity is resolved.
pub async fn setup_base_commands(bot: &Bot) -> HandlerResult<()> {
    bot.set_my_commands(base_commands()).await?;
    Ok(())
}

/// Resolves the caller's record, creating one on first contact.
///
/// An identity that resolves to no record is materialized as a banned record
/// with defaults (plus the display name when Telegram provides one). This is
/// the only place unknown identities get silently banned; resolution itself
/// stays a pure lookup.
pub async fn resolve_or_materialize(
    directory: &UserDirectory,
    user_id: UserId,
    user_name: Option<&str>,
) -> HandlerResult<UserRecord> {
    if let Some(record) = directory.resolve(user_id.0).await? {
        return Ok(record);
    }

    info!("Materializing banned record for unknown identity {}", user_id);
    directory.set_role(user_id.0, Role::Banned).await?;
    if let Some(name) = user_name {
        directory.set_display_name(user_id.0, name).await?;
    }

    match directory.resolve(user_id.0).await? {
        Some(record) => Ok(record),
        None => Err(anyhow::anyhow!("record for {} missing after materialization", user_id).into()),
    }
}

/// Refreshes the chat-scoped command list for the caller and returns the
/// caller's record, materializing it first if this is the caller's first
/// contact.
pub async fn refresh_commands(
    bot: &Bot,
    chat_id: ChatId,
    user_id: UserId,
    user_name: Option<&str>,
    directory: &UserDirectory,
) -> HandlerResult<UserRecord> {
    let record = resolve_or_materialize(directory, user_id, user_name).await?;

    bot.set_my_commands(commands_for(Some(record.info.role)))
        .scope(BotCommandScope::Chat {
            chat_id: Recipient::Id(chat_id),
        })
        .await?;

    Ok(record)
}
