use bot::BotService;

extern crate pretty_env_logger;
#[macro_use]
extern crate log;
#[macro_use]
extern crate rust_i18n;

mod bot;
mod command;
mod config;
mod error;
mod handlers;
mod services;
mod state;
mod storage;

i18n!("locales", fallback = "en");

#[tokio::main]
async fn main() -> error::HandlerResult<()> {
    dotenvy::dotenv().ok();

    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "info");
    }
    let _ = pretty_env_logger::try_init_timed();

    info!("Starting bot...");

    let config = config::build_config()?;
    let service = BotService::new(config).await?;
    service.start().await
}
