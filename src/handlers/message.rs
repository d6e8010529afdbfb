use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::{InputFile, Message, ReplyParameters};
use teloxide::Bot;

use crate::error::HandlerResult;
use crate::handlers::RequestContext;
use crate::services::policy;
use crate::services::user::Role;

/// Plain (non-command) traffic. Banned and unknown identities are told they
/// have no access; everyone else gets their content echoed back as a reply,
/// which stands in for the chat pipeline until one is wired up.
pub async fn handle_message(bot: Bot, msg: Message, ctx: RequestContext) -> HandlerResult<()> {
    if !policy::is_allowed(ctx.role, Role::User) {
        bot.send_message(msg.chat.id, t!("messages.banned")).await?;
        return Ok(());
    }

    let reply = ReplyParameters::new(msg.id);
    let chat_id = msg.chat.id;

    if let Some(text) = msg.text() {
        bot.send_message(chat_id, text)
            .reply_parameters(reply)
            .await?;
    } else if let Some(sizes) = msg.photo() {
        // Telegram lists sizes small to large; echo the largest
        if let Some(photo) = sizes.last() {
            bot.send_photo(chat_id, InputFile::file_id(photo.file.id.clone()))
                .reply_parameters(reply)
                .await?;
        }
    } else if let Some(audio) = msg.audio() {
        bot.send_audio(chat_id, InputFile::file_id(audio.file.id.clone()))
            .reply_parameters(reply)
            .await?;
    } else if let Some(voice) = msg.voice() {
        bot.send_voice(chat_id, InputFile::file_id(voice.file.id.clone()))
            .reply_parameters(reply)
            .await?;
    } else if let Some(video) = msg.video() {
        bot.send_video(chat_id, InputFile::file_id(video.file.id.clone()))
            .reply_parameters(reply)
            .await?;
    } else if let Some(note) = msg.video_note() {
        bot.send_video_note(chat_id, InputFile::file_id(note.file.id.clone()))
            .reply_parameters(reply)
            .await?;
    } else if let Some(document) = msg.document() {
        bot.send_document(chat_id, InputFile::file_id(document.file.id.clone()))
            .reply_parameters(reply)
            .await?;
    } else if msg.dice().is_some() {
        bot.send_dice(chat_id).reply_parameters(reply).await?;
    } else {
        bot.send_message(chat_id, t!("messages.unsupported"))
            .reply_parameters(reply)
            .await?;
    }

    Ok(())
}

pub fn get_message_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync>> {
    Update::filter_message().endpoint(handle_message)
}
