mod management;
mod settings;
mod token;

pub use token::{CallbackToken, Category};

use token::TokenError;

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::MessageId;

use crate::error::HandlerResult;
use crate::handlers::RequestContext;
use crate::services::policy;
use crate::services::user::Role;
use crate::state::AppState;

/// The message currently displaying the menu; every transition edits it in
/// place.
#[derive(Debug, Clone, Copy)]
pub(super) struct Screen {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// Why a button press was turned away before any work happened.
#[derive(Debug, PartialEq)]
enum Rejection {
    Malformed(TokenError),
    Disallowed,
}

/// Parses the payload and checks the caller's role against the token's
/// subtree. Pure; dispatch only ever sees admitted tokens, so a rejected
/// press can never mutate anything.
fn admit(data: &str, role: Option<Role>) -> Result<CallbackToken, Rejection> {
    let token = data.parse::<CallbackToken>().map_err(Rejection::Malformed)?;
    if !policy::satisfies(role, token.required_access()) {
        return Err(Rejection::Disallowed);
    }
    Ok(token)
}

/// Single entry point for every button press. The token is parsed once, the
/// caller's own role is checked against the token's subtree, and the variant
/// is matched exhaustively; anything unparseable answers with an alert and
/// leaves the screen untouched.
pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    ctx: RequestContext,
    state: Arc<AppState>,
) -> HandlerResult<()> {
    let (data, message) = match (q.data.as_deref(), q.message.as_ref()) {
        (Some(data), Some(message)) => (data, message),
        _ => {
            answer_alert(&bot, &q.id, t!("messages.something_wrong")).await?;
            return Ok(());
        }
    };

    let screen = Screen {
        chat_id: message.chat().id,
        message_id: message.id(),
    };

    let token = match admit(data, ctx.role) {
        Ok(token) => token,
        Err(Rejection::Malformed(e)) => {
            warn!("Rejected callback token from {}: {}", ctx.telegram_user_id, e);
            answer_alert(&bot, &q.id, t!("messages.something_wrong")).await?;
            return Ok(());
        }
        Err(Rejection::Disallowed) => {
            answer_alert(&bot, &q.id, t!("messages.disallowed")).await?;
            return Ok(());
        }
    };

    let result = match token {
        CallbackToken::ManageRoot => management::show_categories(&bot, &q.id, screen).await,
        CallbackToken::ManageList(category) => {
            management::show_category_list(&bot, &state, &q.id, screen, category).await
        }
        CallbackToken::ManageDetail(category, id) => {
            management::show_detail(&bot, &state, &q.id, screen, category, id).await
        }
        CallbackToken::ManageLanguage(id) => {
            management::show_language_menu(&bot, &state, &q.id, screen, id).await
        }
        CallbackToken::ManageModel(id) => {
            management::show_model_menu(&bot, &state, &q.id, screen, id).await
        }
        CallbackToken::ManageBudget(id) => {
            management::show_budget_menu(&bot, &state, &q.id, screen, id).await
        }
        CallbackToken::ChangeRole(category, id) => {
            management::change_role(&bot, &state, &q.id, screen, category, id).await
        }
        CallbackToken::ChangeLanguage(language, id) => {
            management::change_language(&bot, &state, &q.id, screen, language, id).await
        }
        CallbackToken::ChangeModel(model, id) => {
            management::change_model(&bot, &state, &q.id, screen, model, id).await
        }
        CallbackToken::ChangeBudget(step, id) => {
            management::step_budget(&bot, &state, &q.id, screen, step, id).await
        }
        CallbackToken::DeleteConfirm(category, id) => {
            management::show_delete_confirm(&bot, &state, &q.id, screen, category, id).await
        }
        CallbackToken::DeleteConfirmed(category, id) => {
            management::delete_user(&bot, &state, &q.id, screen, category, id).await
        }
        CallbackToken::SettingsMenu => settings::show_settings(&bot, &q.id, screen).await,
        CallbackToken::OwnLanguageMenu => {
            settings::show_own_language_menu(&bot, &state, &ctx, &q.id, screen).await
        }
        CallbackToken::OwnModelMenu => {
            settings::show_own_model_menu(&bot, &state, &ctx, &q.id, screen).await
        }
        CallbackToken::SetOwnLanguage(language) => {
            settings::set_own_language(&bot, &state, &ctx, &q.id, screen, language).await
        }
        CallbackToken::SetOwnModel(model) => {
            settings::set_own_model(&bot, &state, &ctx, &q.id, screen, model).await
        }
    };

    if let Err(e) = result {
        error!("Callback handling failed: {:?}", e);
        // best effort; the query may already have been answered
        let _ = answer_alert(&bot, &q.id, t!("messages.something_wrong")).await;
    }

    Ok(())
}

pub(super) async fn answer_alert(
    bot: &Bot,
    query_id: &str,
    text: impl Into<String>,
) -> HandlerResult<()> {
    bot.answer_callback_query(query_id)
        .text(text)
        .show_alert(true)
        .await?;
    Ok(())
}

pub(super) async fn answer_toast(
    bot: &Bot,
    query_id: &str,
    text: impl Into<String>,
) -> HandlerResult<()> {
    bot.answer_callback_query(query_id).text(text).await?;
    Ok(())
}

pub(super) async fn answer_plain(bot: &Bot, query_id: &str) -> HandlerResult<()> {
    bot.answer_callback_query(query_id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_is_turned_away_from_the_management_subtree() {
        for data in [
            "manage_bot",
            "manage_users",
            "manage_user_5",
            "change_role_admin_5",
            "change_budget_plus_5",
            "delete_confirmed_user_5",
        ] {
            assert_eq!(
                admit(data, Some(Role::Admin)),
                Err(Rejection::Disallowed),
                "data: {data}"
            );
        }

        // the same presses go through for the owner
        assert_eq!(
            admit("manage_bot", Some(Role::Owner)),
            Ok(CallbackToken::ManageRoot)
        );
        assert_eq!(
            admit("delete_confirmed_user_5", Some(Role::Owner)),
            Ok(CallbackToken::DeleteConfirmed(Category::Users, 5))
        );
    }

    #[test]
    fn self_service_admission_follows_the_tiers() {
        assert_eq!(
            admit("settings_menu", Some(Role::Admin)),
            Ok(CallbackToken::SettingsMenu)
        );
        assert_eq!(
            admit("settings_menu", Some(Role::User)),
            Err(Rejection::Disallowed)
        );
        assert!(admit("settings_language_ru", Some(Role::Banned)).is_ok());
        assert_eq!(
            admit("settings_language_ru", None),
            Err(Rejection::Disallowed)
        );
    }

    #[test]
    fn malformed_payloads_are_rejected_before_gating() {
        for data in ["", "bogus", "manage_admin_xyz", "manage_owner_5"] {
            assert!(
                matches!(admit(data, Some(Role::Owner)), Err(Rejection::Malformed(_))),
                "data: {data}"
            );
        }
    }
}
