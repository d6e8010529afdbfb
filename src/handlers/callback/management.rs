//! Owner-only user-management subtree. Every mutating transition applies the
//! change through the directory, acknowledges it, and re-renders the screen
//! the owner should see next; unresolved targets answer with an alert and
//! leave the screen untouched.

use teloxide::prelude::*;
use teloxide::types::UserId;

use super::{answer_alert, answer_plain, answer_toast, Category, Screen};
use crate::error::HandlerResult;
use crate::handlers::keyboard;
use crate::services::directory::BudgetStep;
use crate::services::user::{ChatModel, Language};
use crate::state::AppState;
use crate::storage::UserRecord;

/// Best-effort display name: the stored name when one is cached, otherwise a
/// chat member lookup, otherwise the stored placeholder.
async fn display_name(bot: &Bot, screen: Screen, record: &UserRecord) -> String {
    if record.info.name != "unknown" {
        return record.info.name.clone();
    }

    match bot.get_chat_member(screen.chat_id, UserId(record.id)).await {
        Ok(member) => member
            .user
            .username
            .clone()
            .unwrap_or_else(|| member.user.first_name.clone()),
        Err(_) => record.info.name.clone(),
    }
}

async fn resolve_target(
    bot: &Bot,
    state: &AppState,
    query_id: &str,
    id: u64,
) -> HandlerResult<Option<UserRecord>> {
    match state.directory.resolve(id).await? {
        Some(record) => Ok(Some(record)),
        None => {
            answer_alert(bot, query_id, t!("messages.something_wrong")).await?;
            Ok(None)
        }
    }
}

async fn render_categories(bot: &Bot, screen: Screen) -> HandlerResult<()> {
    bot.edit_message_text(screen.chat_id, screen.message_id, t!("callbacks.manage.root"))
        .reply_markup(keyboard::user_categories_keyboard())
        .await?;
    Ok(())
}

async fn render_category_list(
    bot: &Bot,
    state: &AppState,
    screen: Screen,
    category: Category,
) -> HandlerResult<()> {
    let records = state.directory.list_by_role(category.role()).await?;
    let text = match category {
        Category::Admins => t!("callbacks.manage.list.admins"),
        Category::Users => t!("callbacks.manage.list.users"),
        Category::Banned => t!("callbacks.manage.list.banned"),
    };
    bot.edit_message_text(screen.chat_id, screen.message_id, text)
        .reply_markup(keyboard::category_list_keyboard(category, &records))
        .await?;
    Ok(())
}

async fn render_detail(
    bot: &Bot,
    screen: Screen,
    category: Category,
    record: &UserRecord,
) -> HandlerResult<()> {
    let name = display_name(bot, screen, record).await;
    let text = match category {
        Category::Admins => t!("callbacks.manage.detail.admin", name = name),
        Category::Users => t!("callbacks.manage.detail.user", name = name),
        Category::Banned => t!("callbacks.manage.detail.banned", name = name),
    };
    bot.edit_message_text(screen.chat_id, screen.message_id, text)
        .reply_markup(keyboard::detail_keyboard(category, record.id))
        .await?;
    Ok(())
}

async fn render_budget_menu(bot: &Bot, screen: Screen, record: &UserRecord) -> HandlerResult<()> {
    let name = display_name(bot, screen, record).await;
    bot.edit_message_text(
        screen.chat_id,
        screen.message_id,
        t!(
            "callbacks.manage.budget_menu",
            name = name,
            budget = record.info.budget
        ),
    )
    .reply_markup(keyboard::manage_budget_keyboard(record.id))
    .await?;
    Ok(())
}

pub(super) async fn show_categories(bot: &Bot, query_id: &str, screen: Screen) -> HandlerResult<()> {
    render_categories(bot, screen).await?;
    answer_plain(bot, query_id).await
}

pub(super) async fn show_category_list(
    bot: &Bot,
    state: &AppState,
    query_id: &str,
    screen: Screen,
    category: Category,
) -> HandlerResult<()> {
    render_category_list(bot, state, screen, category).await?;
    answer_plain(bot, query_id).await
}

pub(super) async fn show_detail(
    bot: &Bot,
    state: &AppState,
    query_id: &str,
    screen: Screen,
    category: Category,
    id: u64,
) -> HandlerResult<()> {
    let Some(record) = resolve_target(bot, state, query_id, id).await? else {
        return Ok(());
    };
    render_detail(bot, screen, category, &record).await?;
    answer_plain(bot, query_id).await
}

pub(super) async fn show_language_menu(
    bot: &Bot,
    state: &AppState,
    query_id: &str,
    screen: Screen,
    id: u64,
) -> HandlerResult<()> {
    let Some(record) = resolve_target(bot, state, query_id, id).await? else {
        return Ok(());
    };
    let name = display_name(bot, screen, &record).await;
    bot.edit_message_text(
        screen.chat_id,
        screen.message_id,
        t!(
            "callbacks.manage.language_menu",
            name = name,
            language = record.info.language
        ),
    )
    .reply_markup(keyboard::manage_language_keyboard(id))
    .await?;
    answer_plain(bot, query_id).await
}

pub(super) async fn show_model_menu(
    bot: &Bot,
    state: &AppState,
    query_id: &str,
    screen: Screen,
    id: u64,
) -> HandlerResult<()> {
    let Some(record) = resolve_target(bot, state, query_id, id).await? else {
        return Ok(());
    };
    let name = display_name(bot, screen, &record).await;
    bot.edit_message_text(
        screen.chat_id,
        screen.message_id,
        t!(
            "callbacks.manage.model_menu",
            name = name,
            model = record.info.model
        ),
    )
    .reply_markup(keyboard::manage_model_keyboard(id))
    .await?;
    answer_plain(bot, query_id).await
}

pub(super) async fn show_budget_menu(
    bot: &Bot,
    state: &AppState,
    query_id: &str,
    screen: Screen,
    id: u64,
) -> HandlerResult<()> {
    let Some(record) = resolve_target(bot, state, query_id, id).await? else {
        return Ok(());
    };
    render_budget_menu(bot, screen, &record).await?;
    answer_plain(bot, query_id).await
}

/// Role changes return to the category root, the screen the owner navigates
/// from when reassigning several users in a row.
pub(super) async fn change_role(
    bot: &Bot,
    state: &AppState,
    query_id: &str,
    screen: Screen,
    category: Category,
    id: u64,
) -> HandlerResult<()> {
    let Some(record) = resolve_target(bot, state, query_id, id).await? else {
        return Ok(());
    };
    let name = display_name(bot, screen, &record).await;

    state.directory.set_role(id, category.role()).await?;

    let text = match category {
        Category::Admins => t!("callbacks.manage.role_set.admin", name = name),
        Category::Users => t!("callbacks.manage.role_set.user", name = name),
        Category::Banned => t!("callbacks.manage.role_set.banned", name = name),
    };
    answer_alert(bot, query_id, text).await?;
    render_categories(bot, screen).await
}

/// Attribute changes return to the detail screen of the same target. The
/// query is answered before the screen edit, so the refreshed screen is
/// built from the mutation result rather than a second lookup.
pub(super) async fn change_language(
    bot: &Bot,
    state: &AppState,
    query_id: &str,
    screen: Screen,
    language: Language,
    id: u64,
) -> HandlerResult<()> {
    let Some(mut record) = resolve_target(bot, state, query_id, id).await? else {
        return Ok(());
    };
    let name = display_name(bot, screen, &record).await;

    state.directory.set_language(id, language).await?;
    record.info.language = language;

    answer_toast(
        bot,
        query_id,
        t!("callbacks.manage.language_set", name = name, language = language),
    )
    .await?;

    render_detail(bot, screen, Category::Users, &record).await
}

pub(super) async fn change_model(
    bot: &Bot,
    state: &AppState,
    query_id: &str,
    screen: Screen,
    model: ChatModel,
    id: u64,
) -> HandlerResult<()> {
    let Some(mut record) = resolve_target(bot, state, query_id, id).await? else {
        return Ok(());
    };
    let name = display_name(bot, screen, &record).await;

    state.directory.set_model(id, model).await?;
    record.info.model = model;

    answer_toast(
        bot,
        query_id,
        t!("callbacks.manage.model_set", name = name, model = model),
    )
    .await?;

    render_detail(bot, screen, Category::Users, &record).await
}

pub(super) async fn step_budget(
    bot: &Bot,
    state: &AppState,
    query_id: &str,
    screen: Screen,
    step: BudgetStep,
    id: u64,
) -> HandlerResult<()> {
    let Some(mut record) = resolve_target(bot, state, query_id, id).await? else {
        return Ok(());
    };
    let name = display_name(bot, screen, &record).await;

    let balance = state.directory.adjust_budget(id, step).await?;
    record.info.budget = balance;

    let text = match step {
        BudgetStep::Plus => {
            t!("callbacks.manage.budget_increased", name = name, budget = balance)
        }
        BudgetStep::Minus if balance.is_zero() => {
            t!("callbacks.manage.budget_zeroed", name = name)
        }
        BudgetStep::Minus => {
            t!("callbacks.manage.budget_decreased", name = name, budget = balance)
        }
    };
    answer_toast(bot, query_id, text).await?;

    render_budget_menu(bot, screen, &record).await
}

pub(super) async fn show_delete_confirm(
    bot: &Bot,
    state: &AppState,
    query_id: &str,
    screen: Screen,
    category: Category,
    id: u64,
) -> HandlerResult<()> {
    let Some(record) = resolve_target(bot, state, query_id, id).await? else {
        return Ok(());
    };
    let name = display_name(bot, screen, &record).await;

    bot.edit_message_text(
        screen.chat_id,
        screen.message_id,
        t!("callbacks.manage.delete_confirm", name = name),
    )
    .reply_markup(keyboard::delete_confirm_keyboard(category, id))
    .await?;
    answer_plain(bot, query_id).await
}

/// Confirmed deletes return to the list screen of the category, which no
/// longer includes the deleted identity.
pub(super) async fn delete_user(
    bot: &Bot,
    state: &AppState,
    query_id: &str,
    screen: Screen,
    category: Category,
    id: u64,
) -> HandlerResult<()> {
    let Some(record) = resolve_target(bot, state, query_id, id).await? else {
        return Ok(());
    };
    let name = display_name(bot, screen, &record).await;

    state.directory.delete(id).await?;

    answer_alert(bot, query_id, t!("callbacks.manage.deleted", name = name)).await?;
    render_category_list(bot, state, screen, category).await
}

#[cfg(test)]
mod tests {
    use crate::services::directory::{BudgetStep, UserDirectory};
    use crate::services::user::{ChatModel, Language, Role};
    use crate::storage::MemoryStore;
    use rust_decimal::Decimal;
    use std::sync::Arc;

    // Attribute and budget changes render the refreshed screen from the
    // in-hand record copy; this pins that copy to a fresh lookup.
    #[tokio::test]
    async fn updated_copy_matches_the_store_after_each_mutation() {
        let directory = UserDirectory::new(Arc::new(MemoryStore::new()));
        directory.set_role(5, Role::User).await.unwrap();

        let mut record = directory.resolve(5).await.unwrap().unwrap();

        directory.set_language(5, Language::Russian).await.unwrap();
        record.info.language = Language::Russian;
        assert_eq!(directory.resolve(5).await.unwrap().unwrap(), record);

        directory.set_model(5, ChatModel::Gpt4).await.unwrap();
        record.info.model = ChatModel::Gpt4;
        assert_eq!(directory.resolve(5).await.unwrap().unwrap(), record);

        record.info.budget = directory.adjust_budget(5, BudgetStep::Plus).await.unwrap();
        assert_eq!(directory.resolve(5).await.unwrap().unwrap(), record);
        assert_eq!(record.info.budget, Decimal::new(1, 1));
    }
}
