use std::net::SocketAddr;
use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::update_listeners::webhooks;
use teloxide::Bot;

use crate::command;
use crate::config::AppConfig;
use crate::error::{BotResult, HandlerResult};
use crate::handlers::get_handler;
use crate::services::user::Role;
use crate::state::AppState;

pub struct BotService {
    bot: Bot,
    state: Arc<AppState>,
}

impl BotService {
    pub async fn new(config: AppConfig) -> BotResult<Self> {
        info!("Initializing AppState...");
        let bot = Bot::new(config.telegram.token.clone());
        let state = Arc::new(AppState::new(config).await?);
        Ok(Self { bot, state })
    }

    /// Grants the configured owner their role on every boot, so a fresh
    /// database (or a demoted owner) self-heals without manual edits.
    async fn bootstrap_owner(&self) -> BotResult<()> {
        let owner = &self.state.config.owner;
        self.state
            .directory
            .set_role(owner.telegram_user_id.0, Role::Owner)
            .await?;
        if let Some(name) = &owner.telegram_user_name {
            self.state
                .directory
                .set_display_name(owner.telegram_user_id.0, name)
                .await?;
        }
        info!("Owner role granted to {}", owner.telegram_user_id);
        Ok(())
    }

    pub async fn start(self) -> HandlerResult<()> {
        info!("Testing connection to Telegram API...");
        match self.bot.get_me().await {
            Ok(me) => info!("Connected to Telegram API as @{}", me.username()),
            Err(e) => {
                error!("Failed to connect to Telegram API: {:?}", e);
                return Err(anyhow::anyhow!("Failed to connect to Telegram API: {}", e).into());
            }
        }

        self.bootstrap_owner().await?;
        command::setup_base_commands(&self.bot).await?;

        let webhook = &self.state.config.webhook;
        let address = SocketAddr::from(([0, 0, 0, 0], webhook.port));
        let options = webhooks::Options::new(address, webhook.public_url.clone());

        info!("Registering webhook at {}", webhook.public_url);
        let listener = webhooks::axum(self.bot.clone(), options)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to register webhook: {}", e))?;

        Dispatcher::builder(self.bot, get_handler())
            .dependencies(dptree::deps![self.state])
            .enable_ctrlc_handler()
            .build()
            .dispatch_with_listener(
                listener,
                LoggingErrorHandler::with_custom_text("An error has occurred in the dispatcher"),
            )
            .await;

        Ok(())
    }
}
