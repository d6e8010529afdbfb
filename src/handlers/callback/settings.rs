//! Self-service settings subtree: the admin settings screen plus the
//! language/model pickers a caller applies to their own record.

use teloxide::prelude::*;

use super::{answer_plain, answer_toast, Screen};
use crate::command;
use crate::error::HandlerResult;
use crate::handlers::{keyboard, RequestContext};
use crate::services::user::{ChatModel, Language};
use crate::state::AppState;

pub(super) async fn show_settings(bot: &Bot, query_id: &str, screen: Screen) -> HandlerResult<()> {
    bot.edit_message_text(screen.chat_id, screen.message_id, t!("callbacks.settings.menu"))
        .reply_markup(keyboard::settings_keyboard())
        .await?;
    answer_plain(bot, query_id).await
}

pub(super) async fn show_own_language_menu(
    bot: &Bot,
    state: &AppState,
    ctx: &RequestContext,
    query_id: &str,
    screen: Screen,
) -> HandlerResult<()> {
    let language = state
        .directory
        .language(ctx.telegram_user_id.0)
        .await?
        .unwrap_or_default();
    bot.edit_message_text(
        screen.chat_id,
        screen.message_id,
        t!("callbacks.settings.language_menu", language = language),
    )
    .reply_markup(keyboard::own_language_keyboard())
    .await?;
    answer_plain(bot, query_id).await
}

pub(super) async fn show_own_model_menu(
    bot: &Bot,
    state: &AppState,
    ctx: &RequestContext,
    query_id: &str,
    screen: Screen,
) -> HandlerResult<()> {
    let model = state
        .directory
        .model(ctx.telegram_user_id.0)
        .await?
        .unwrap_or_default();
    bot.edit_message_text(
        screen.chat_id,
        screen.message_id,
        t!("callbacks.settings.model_menu", model = model),
    )
    .reply_markup(keyboard::own_model_keyboard())
    .await?;
    answer_plain(bot, query_id).await
}

/// Switching the caller's own language takes effect immediately: the process
/// locale flips and the chat-scoped command descriptions are re-advertised in
/// the new language.
pub(super) async fn set_own_language(
    bot: &Bot,
    state: &AppState,
    ctx: &RequestContext,
    query_id: &str,
    screen: Screen,
    language: Language,
) -> HandlerResult<()> {
    state
        .directory
        .set_language(ctx.telegram_user_id.0, language)
        .await?;
    rust_i18n::set_locale(&language.to_string());

    command::refresh_commands(
        bot,
        screen.chat_id,
        ctx.telegram_user_id,
        Some(&ctx.telegram_user_name),
        &state.directory,
    )
    .await?;

    answer_toast(
        bot,
        query_id,
        t!("callbacks.settings.language_set", language = language),
    )
    .await?;

    bot.edit_message_text(
        screen.chat_id,
        screen.message_id,
        t!("callbacks.settings.language_menu", language = language),
    )
    .reply_markup(keyboard::own_language_keyboard())
    .await?;
    Ok(())
}

pub(super) async fn set_own_model(
    bot: &Bot,
    state: &AppState,
    ctx: &RequestContext,
    query_id: &str,
    screen: Screen,
    model: ChatModel,
) -> HandlerResult<()> {
    state
        .directory
        .set_model(ctx.telegram_user_id.0, model)
        .await?;

    answer_toast(bot, query_id, t!("callbacks.settings.model_set", model = model)).await?;

    bot.edit_message_text(screen.chat_id, screen.message_id, t!("callbacks.settings.menu"))
        .reply_markup(keyboard::settings_keyboard())
        .await?;
    Ok(())
}
