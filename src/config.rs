use teloxide::types::UserId;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidVar(&'static str, String),
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub telegram: TelegramConfig,
    pub owner: OwnerConfig,
    pub storage: StorageConfig,
    pub webhook: WebhookConfig,
}

#[derive(Clone, Debug)]
pub struct TelegramConfig {
    pub token: String,
}

#[derive(Clone, Debug)]
pub struct OwnerConfig {
    pub telegram_user_id: UserId,
    pub telegram_user_name: Option<String>,
}

#[derive(Clone, Debug)]
pub enum StorageConfig {
    Turso { url: String, token: String },
    Memory,
}

#[derive(Clone, Debug)]
pub struct WebhookConfig {
    pub public_url: Url,
    pub port: u16,
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

pub fn build_config() -> Result<AppConfig, ConfigError> {
    info!("Building AppConfig...");

    let token = required("TELEGRAM_BOT_TOKEN")?;

    let owner_id = required("OWNER_TELEGRAM_ID")?
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidVar("OWNER_TELEGRAM_ID", e.to_string()))?;
    let owner_name = std::env::var("OWNER_TELEGRAM_NAME").ok();

    let storage = match std::env::var("STORAGE_BACKEND").as_deref() {
        Ok("memory") => StorageConfig::Memory,
        _ => StorageConfig::Turso {
            url: required("TURSO_DATABASE_URL")?,
            token: required("TURSO_AUTH_TOKEN")?,
        },
    };

    let public_url = required("WEBHOOK_URL")?
        .parse::<Url>()
        .map_err(|e| ConfigError::InvalidVar("WEBHOOK_URL", e.to_string()))?;
    let port = match std::env::var("WEBHOOK_PORT") {
        Ok(port) => port
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidVar("WEBHOOK_PORT", e.to_string()))?,
        Err(_) => 8443,
    };

    Ok(AppConfig {
        telegram: TelegramConfig { token },
        owner: OwnerConfig {
            telegram_user_id: UserId(owner_id),
            telegram_user_name: owner_name,
        },
        storage,
        webhook: WebhookConfig { public_url, port },
    })
}
