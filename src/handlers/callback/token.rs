use std::fmt;
use std::str::FromStr;

use crate::services::directory::BudgetStep;
use crate::services::policy::Access;
use crate::services::user::{ChatModel, Language, Role};

/// Category of managed users; the owner is never listed for management.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Admins,
    Users,
    Banned,
}

impl Category {
    pub fn role(self) -> Role {
        match self {
            Category::Admins => Role::Admin,
            Category::Users => Role::User,
            Category::Banned => Role::Banned,
        }
    }

    fn singular(self) -> &'static str {
        match self {
            Category::Admins => "admin",
            Category::Users => "user",
            Category::Banned => "banned",
        }
    }

    fn plural(self) -> &'static str {
        match self {
            Category::Admins => "admins",
            Category::Users => "users",
            Category::Banned => "banned",
        }
    }
}

/// A callback token encodes both the current menu location and the requested
/// transition in one opaque string; there is no server-side menu session.
/// This is the only place the wire grammar lives: `FromStr` is the single
/// parser and `Display` the single renderer, and keyboards build their
/// buttons exclusively from rendered tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackToken {
    /// Root screen with the three user categories.
    ManageRoot,
    /// List of all users in one category.
    ManageList(Category),
    /// Detail screen for one managed user.
    ManageDetail(Category, u64),
    /// Language picker for a managed user.
    ManageLanguage(u64),
    /// Chat model picker for a managed user.
    ManageModel(u64),
    /// Budget adjustment screen for a managed user.
    ManageBudget(u64),
    /// Move the target user into the given category.
    ChangeRole(Category, u64),
    ChangeLanguage(Language, u64),
    ChangeModel(ChatModel, u64),
    ChangeBudget(BudgetStep, u64),
    /// Two-phase delete: the confirmation screen, scoped to the category the
    /// target was listed under.
    DeleteConfirm(Category, u64),
    DeleteConfirmed(Category, u64),
    /// Self-service settings screen (admin and up).
    SettingsMenu,
    /// Self-service language picker (any known identity, via /language too).
    OwnLanguageMenu,
    /// Self-service chat model picker (admin and up).
    OwnModelMenu,
    SetOwnLanguage(Language),
    SetOwnModel(ChatModel),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("unrecognized callback token: {0}")]
    Unrecognized(String),

    #[error("invalid target id in callback token: {0}")]
    InvalidId(String),
}

fn parse_id(raw: &str) -> Result<u64, TokenError> {
    raw.parse::<u64>()
        .map_err(|_| TokenError::InvalidId(raw.to_string()))
}

impl FromStr for CallbackToken {
    type Err = TokenError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let unrecognized = || TokenError::Unrecognized(data.to_string());

        if let Some(rest) = data.strip_prefix("manage_") {
            return match rest {
                "bot" => Ok(CallbackToken::ManageRoot),
                "admins" => Ok(CallbackToken::ManageList(Category::Admins)),
                "users" => Ok(CallbackToken::ManageList(Category::Users)),
                "banned" => Ok(CallbackToken::ManageList(Category::Banned)),
                _ => {
                    if let Some(id) = rest.strip_prefix("admin_") {
                        Ok(CallbackToken::ManageDetail(Category::Admins, parse_id(id)?))
                    } else if let Some(id) = rest.strip_prefix("user_") {
                        Ok(CallbackToken::ManageDetail(Category::Users, parse_id(id)?))
                    } else if let Some(id) = rest.strip_prefix("banned_") {
                        Ok(CallbackToken::ManageDetail(Category::Banned, parse_id(id)?))
                    } else if let Some(id) = rest.strip_prefix("language_") {
                        Ok(CallbackToken::ManageLanguage(parse_id(id)?))
                    } else if let Some(id) = rest.strip_prefix("model_") {
                        Ok(CallbackToken::ManageModel(parse_id(id)?))
                    } else if let Some(id) = rest.strip_prefix("budget_") {
                        Ok(CallbackToken::ManageBudget(parse_id(id)?))
                    } else {
                        Err(unrecognized())
                    }
                }
            };
        }

        if let Some(rest) = data.strip_prefix("change_role_") {
            return if let Some(id) = rest.strip_prefix("admin_") {
                Ok(CallbackToken::ChangeRole(Category::Admins, parse_id(id)?))
            } else if let Some(id) = rest.strip_prefix("user_") {
                Ok(CallbackToken::ChangeRole(Category::Users, parse_id(id)?))
            } else if let Some(id) = rest.strip_prefix("banned_") {
                Ok(CallbackToken::ChangeRole(Category::Banned, parse_id(id)?))
            } else {
                Err(unrecognized())
            };
        }

        if let Some(rest) = data.strip_prefix("change_language_") {
            return if let Some(id) = rest.strip_prefix("en_") {
                Ok(CallbackToken::ChangeLanguage(Language::English, parse_id(id)?))
            } else if let Some(id) = rest.strip_prefix("ru_") {
                Ok(CallbackToken::ChangeLanguage(Language::Russian, parse_id(id)?))
            } else {
                Err(unrecognized())
            };
        }

        if let Some(rest) = data.strip_prefix("change_model_") {
            return if let Some(id) = rest.strip_prefix("gpt35_") {
                Ok(CallbackToken::ChangeModel(ChatModel::Gpt35Turbo, parse_id(id)?))
            } else if let Some(id) = rest.strip_prefix("gpt4_") {
                Ok(CallbackToken::ChangeModel(ChatModel::Gpt4, parse_id(id)?))
            } else {
                Err(unrecognized())
            };
        }

        if let Some(rest) = data.strip_prefix("change_budget_") {
            return if let Some(id) = rest.strip_prefix("plus_") {
                Ok(CallbackToken::ChangeBudget(BudgetStep::Plus, parse_id(id)?))
            } else if let Some(id) = rest.strip_prefix("minus_") {
                Ok(CallbackToken::ChangeBudget(BudgetStep::Minus, parse_id(id)?))
            } else {
                Err(unrecognized())
            };
        }

        if let Some(rest) = data.strip_prefix("delete_confirmed_") {
            return if let Some(id) = rest.strip_prefix("admin_") {
                Ok(CallbackToken::DeleteConfirmed(Category::Admins, parse_id(id)?))
            } else if let Some(id) = rest.strip_prefix("user_") {
                Ok(CallbackToken::DeleteConfirmed(Category::Users, parse_id(id)?))
            } else if let Some(id) = rest.strip_prefix("banned_") {
                Ok(CallbackToken::DeleteConfirmed(Category::Banned, parse_id(id)?))
            } else {
                Err(unrecognized())
            };
        }

        if let Some(rest) = data.strip_prefix("delete_") {
            return if let Some(id) = rest.strip_prefix("admin_") {
                Ok(CallbackToken::DeleteConfirm(Category::Admins, parse_id(id)?))
            } else if let Some(id) = rest.strip_prefix("user_") {
                Ok(CallbackToken::DeleteConfirm(Category::Users, parse_id(id)?))
            } else if let Some(id) = rest.strip_prefix("banned_") {
                Ok(CallbackToken::DeleteConfirm(Category::Banned, parse_id(id)?))
            } else {
                Err(unrecognized())
            };
        }

        if let Some(rest) = data.strip_prefix("settings_") {
            return match rest {
                "menu" => Ok(CallbackToken::SettingsMenu),
                "language" => Ok(CallbackToken::OwnLanguageMenu),
                "model" => Ok(CallbackToken::OwnModelMenu),
                "language_en" => Ok(CallbackToken::SetOwnLanguage(Language::English)),
                "language_ru" => Ok(CallbackToken::SetOwnLanguage(Language::Russian)),
                "model_gpt35" => Ok(CallbackToken::SetOwnModel(ChatModel::Gpt35Turbo)),
                "model_gpt4" => Ok(CallbackToken::SetOwnModel(ChatModel::Gpt4)),
                _ => Err(unrecognized()),
            };
        }

        Err(unrecognized())
    }
}

impl fmt::Display for CallbackToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackToken::ManageRoot => write!(f, "manage_bot"),
            CallbackToken::ManageList(category) => write!(f, "manage_{}", category.plural()),
            CallbackToken::ManageDetail(category, id) => {
                write!(f, "manage_{}_{}", category.singular(), id)
            }
            CallbackToken::ManageLanguage(id) => write!(f, "manage_language_{}", id),
            CallbackToken::ManageModel(id) => write!(f, "manage_model_{}", id),
            CallbackToken::ManageBudget(id) => write!(f, "manage_budget_{}", id),
            CallbackToken::ChangeRole(category, id) => {
                write!(f, "change_role_{}_{}", category.singular(), id)
            }
            CallbackToken::ChangeLanguage(language, id) => {
                write!(f, "change_language_{}_{}", language, id)
            }
            CallbackToken::ChangeModel(model, id) => {
                write!(f, "change_model_{}_{}", model.slug(), id)
            }
            CallbackToken::ChangeBudget(BudgetStep::Plus, id) => {
                write!(f, "change_budget_plus_{}", id)
            }
            CallbackToken::ChangeBudget(BudgetStep::Minus, id) => {
                write!(f, "change_budget_minus_{}", id)
            }
            CallbackToken::DeleteConfirm(category, id) => {
                write!(f, "delete_{}_{}", category.singular(), id)
            }
            CallbackToken::DeleteConfirmed(category, id) => {
                write!(f, "delete_confirmed_{}_{}", category.singular(), id)
            }
            CallbackToken::SettingsMenu => write!(f, "settings_menu"),
            CallbackToken::OwnLanguageMenu => write!(f, "settings_language"),
            CallbackToken::OwnModelMenu => write!(f, "settings_model"),
            CallbackToken::SetOwnLanguage(language) => {
                write!(f, "settings_language_{}", language)
            }
            CallbackToken::SetOwnModel(model) => write!(f, "settings_model_{}", model.slug()),
        }
    }
}

impl CallbackToken {
    /// Minimum access the caller's own role must satisfy before the token is
    /// handled at all. Management screens are owner-only; the self-service
    /// language picker admits any known identity; the self-service model
    /// picker and the settings screen are admin and up.
    pub fn required_access(&self) -> Access {
        match self {
            CallbackToken::OwnLanguageMenu | CallbackToken::SetOwnLanguage(_) => Access::Known,
            CallbackToken::SettingsMenu
            | CallbackToken::OwnModelMenu
            | CallbackToken::SetOwnModel(_) => Access::Admin,
            _ => Access::Owner,
        }
    }
}
