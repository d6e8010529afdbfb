use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Privilege tier of a known identity, ordered low to high. An identity with
/// no stored record has no `Role` at all and is handled as `None` ("unknown")
/// at the policy layer; that state is never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Banned,
    User,
    Admin,
    Owner,
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Role::Owner),
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            "banned" => Ok(Role::Banned),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Owner => write!(f, "owner"),
            Role::Admin => write!(f, "admin"),
            Role::User => write!(f, "user"),
            Role::Banned => write!(f, "banned"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "ru")]
    Russian,
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Language::English),
            "ru" => Ok(Language::Russian),
            _ => Err(format!("Unknown language code: {}", s)),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::English => write!(f, "en"),
            Language::Russian => write!(f, "ru"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChatModel {
    #[default]
    #[serde(rename = "gpt-3.5-turbo")]
    Gpt35Turbo,
    #[serde(rename = "gpt-4")]
    Gpt4,
}

impl ChatModel {
    /// Short form used inside callback tokens, where dots and dashes are
    /// inconvenient.
    pub fn slug(&self) -> &'static str {
        match self {
            ChatModel::Gpt35Turbo => "gpt35",
            ChatModel::Gpt4 => "gpt4",
        }
    }
}

impl FromStr for ChatModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gpt-3.5-turbo" | "gpt35" => Ok(ChatModel::Gpt35Turbo),
            "gpt-4" | "gpt4" => Ok(ChatModel::Gpt4),
            _ => Err(format!("Unknown chat model: {}", s)),
        }
    }
}

impl fmt::Display for ChatModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatModel::Gpt35Turbo => write!(f, "gpt-3.5-turbo"),
            ChatModel::Gpt4 => write!(f, "gpt-4"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_ordering_matches_privilege() {
        assert!(Role::Banned < Role::User);
        assert!(Role::User < Role::Admin);
        assert!(Role::Admin < Role::Owner);
    }

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::Owner, Role::Admin, Role::User, Role::Banned] {
            assert_eq!(role.to_string().parse::<Role>(), Ok(role));
        }
        assert!("unknown".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn language_round_trips_through_str() {
        assert_eq!("en".parse::<Language>(), Ok(Language::English));
        assert_eq!("ru".parse::<Language>(), Ok(Language::Russian));
        assert!("de".parse::<Language>().is_err());
    }

    #[test]
    fn chat_model_accepts_full_name_and_slug() {
        assert_eq!("gpt-3.5-turbo".parse::<ChatModel>(), Ok(ChatModel::Gpt35Turbo));
        assert_eq!("gpt35".parse::<ChatModel>(), Ok(ChatModel::Gpt35Turbo));
        assert_eq!("gpt4".parse::<ChatModel>(), Ok(ChatModel::Gpt4));
        assert!("gpt-5".parse::<ChatModel>().is_err());
        assert_eq!(ChatModel::Gpt4.to_string(), "gpt-4");
        assert_eq!(ChatModel::Gpt35Turbo.slug(), "gpt35");
    }
}
