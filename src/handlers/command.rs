use teloxide::dispatching::{HandlerExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;
use teloxide::Bot;

use std::sync::Arc;

use crate::command::Command;
use crate::error::HandlerResult;
use crate::handlers::{keyboard, RequestContext};
use crate::services::policy;
use crate::state::AppState;

async fn handle_start(bot: Bot, msg: Message, ctx: RequestContext) -> HandlerResult<()> {
    bot.send_message(
        msg.chat.id,
        t!("messages.start", name = ctx.telegram_user_name),
    )
    .await?;
    Ok(())
}

async fn handle_help(bot: Bot, msg: Message) -> HandlerResult<()> {
    bot.send_message(msg.chat.id, t!("messages.help")).await?;
    Ok(())
}

async fn handle_language(bot: Bot, msg: Message) -> HandlerResult<()> {
    bot.send_message(msg.chat.id, t!("messages.choose_language"))
        .reply_markup(keyboard::own_language_keyboard())
        .await?;
    Ok(())
}

async fn handle_budget(
    bot: Bot,
    msg: Message,
    ctx: RequestContext,
    state: Arc<AppState>,
) -> HandlerResult<()> {
    let budget = state.directory.budget(ctx.telegram_user_id.0).await?;
    bot.send_message(msg.chat.id, t!("messages.budget", budget = budget))
        .await?;
    Ok(())
}

async fn handle_reset(bot: Bot, msg: Message) -> HandlerResult<()> {
    // conversation history is not wired up yet
    bot.send_message(msg.chat.id, t!("messages.reset_placeholder"))
        .await?;
    Ok(())
}

async fn handle_summarize(bot: Bot, msg: Message) -> HandlerResult<()> {
    bot.send_message(msg.chat.id, t!("messages.summarize_placeholder"))
        .await?;
    Ok(())
}

async fn handle_settings(bot: Bot, msg: Message) -> HandlerResult<()> {
    bot.send_message(msg.chat.id, t!("callbacks.settings.menu"))
        .reply_markup(keyboard::settings_keyboard())
        .await?;
    Ok(())
}

async fn handle_users(bot: Bot, msg: Message) -> HandlerResult<()> {
    bot.send_message(msg.chat.id, t!("callbacks.manage.root"))
        .reply_markup(keyboard::user_categories_keyboard())
        .await?;
    Ok(())
}

/// Role-gates the command before dispatch. A caller below the command's tier
/// gets the refusal text; a handler failure surfaces as a generic apology so
/// the chat never goes silent.
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    ctx: RequestContext,
    state: Arc<AppState>,
) -> HandlerResult<()> {
    if !policy::is_allowed(ctx.role, policy::required_role(&cmd)) {
        info!(
            "Refusing {:?} from {} (role {:?})",
            cmd, ctx.telegram_user_id, ctx.role
        );
        bot.send_message(msg.chat.id, t!("messages.disallowed"))
            .await?;
        return Ok(());
    }

    let chat_id = msg.chat.id;
    let result = match cmd {
        Command::Start => handle_start(bot.clone(), msg, ctx).await,
        Command::Help => handle_help(bot.clone(), msg).await,
        Command::Language => handle_language(bot.clone(), msg).await,
        Command::Budget => handle_budget(bot.clone(), msg, ctx, state).await,
        Command::Reset => handle_reset(bot.clone(), msg).await,
        Command::Summarize => handle_summarize(bot.clone(), msg).await,
        Command::Settings => handle_settings(bot.clone(), msg).await,
        Command::Users => handle_users(bot.clone(), msg).await,
    };

    if let Err(e) = result {
        error!("Command handling failed: {:?}", e);
        bot.send_message(chat_id, t!("messages.something_wrong"))
            .await?;
    }

    Ok(())
}

pub fn get_command_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync>> {
    Update::filter_message()
        .filter_command::<Command>()
        .endpoint(handle_command)
}
