pub mod callback;
mod command;
pub mod keyboard;
mod message;

use command::get_command_handler;
use message::get_message_handler;

use std::sync::Arc;

use teloxide::{
    dispatching::{dialogue::GetChatId, UpdateFilterExt, UpdateHandler},
    types::{Update, UserId},
    Bot,
};

use crate::services::user::Role;
use crate::state::AppState;

/// Per-update identity, resolved once by the middleware and injected into
/// every handler.
#[derive(Clone, Debug)]
pub struct RequestContext {
    pub telegram_user_id: UserId,
    pub telegram_user_name: String,
    /// `None` is the unknown sentinel at the policy seam; the middleware
    /// always supplies `Some` since first contact materializes a record.
    pub role: Option<Role>,
}

/// The dispatch tree. The middleware resolves the sender, refreshes that
/// chat's advertised command list (materializing unknown identities as banned
/// along the way), flips the process locale to the sender's language, and
/// injects a `RequestContext`; updates without a resolvable sender are
/// dropped.
pub fn get_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    dptree::entry()
        .filter_map_async(|update: Update, bot: Bot, state: Arc<AppState>| async move {
            let user = update.from()?.clone();
            let chat_id = update.chat_id()?;

            let record = match crate::command::refresh_commands(
                &bot,
                chat_id,
                user.id,
                Some(&user.first_name),
                &state.directory,
            )
            .await
            {
                Ok(record) => record,
                Err(e) => {
                    error!("Failed to refresh commands for {}: {:?}", user.id, e);
                    return None;
                }
            };

            rust_i18n::set_locale(&record.info.language.to_string());

            Some(RequestContext {
                telegram_user_id: user.id,
                telegram_user_name: user.first_name,
                role: Some(record.info.role),
            })
        })
        .branch(get_command_handler())
        .branch(Update::filter_callback_query().endpoint(callback::handle_callback))
        .branch(get_message_handler())
}
