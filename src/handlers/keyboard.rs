use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::handlers::callback::{CallbackToken, Category};
use crate::services::directory::BudgetStep;
use crate::services::user::{ChatModel, Language};
use crate::storage::UserRecord;

fn callback(text: impl Into<String>, token: CallbackToken) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text, token.to_string())
}

/// Root screen: the three user categories.
pub fn user_categories_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([
        vec![
            callback(t!("buttons.manage.admins"), CallbackToken::ManageList(Category::Admins)),
            callback(t!("buttons.manage.users"), CallbackToken::ManageList(Category::Users)),
        ],
        vec![callback(
            t!("buttons.manage.banned"),
            CallbackToken::ManageList(Category::Banned),
        )],
    ])
}

/// One button per listed record, then a back link to the category root.
pub fn category_list_keyboard(category: Category, records: &[UserRecord]) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = records
        .iter()
        .map(|record| {
            vec![callback(
                record.info.name.clone(),
                CallbackToken::ManageDetail(category, record.id),
            )]
        })
        .collect();

    rows.push(vec![callback(t!("buttons.back"), CallbackToken::ManageRoot)]);

    InlineKeyboardMarkup::new(rows)
}

pub fn detail_keyboard(category: Category, id: u64) -> InlineKeyboardMarkup {
    match category {
        Category::Admins => admin_detail_keyboard(id),
        Category::Users => user_detail_keyboard(id),
        Category::Banned => banned_detail_keyboard(id),
    }
}

fn admin_detail_keyboard(id: u64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([
        vec![callback(t!("buttons.manage.make_user"), CallbackToken::ChangeRole(Category::Users, id))],
        vec![callback(t!("buttons.manage.make_banned"), CallbackToken::ChangeRole(Category::Banned, id))],
        vec![callback(t!("buttons.manage.delete"), CallbackToken::DeleteConfirm(Category::Admins, id))],
        vec![callback(t!("buttons.back"), CallbackToken::ManageList(Category::Admins))],
    ])
}

fn user_detail_keyboard(id: u64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([
        vec![
            callback(t!("buttons.manage.language"), CallbackToken::ManageLanguage(id)),
            callback(t!("buttons.manage.model"), CallbackToken::ManageModel(id)),
        ],
        vec![callback(t!("buttons.manage.budget"), CallbackToken::ManageBudget(id))],
        vec![
            callback(t!("buttons.manage.make_admin"), CallbackToken::ChangeRole(Category::Admins, id)),
            callback(t!("buttons.manage.make_banned"), CallbackToken::ChangeRole(Category::Banned, id)),
        ],
        vec![callback(t!("buttons.manage.delete"), CallbackToken::DeleteConfirm(Category::Users, id))],
        vec![callback(t!("buttons.back"), CallbackToken::ManageList(Category::Users))],
    ])
}

fn banned_detail_keyboard(id: u64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([
        vec![
            callback(t!("buttons.manage.make_admin"), CallbackToken::ChangeRole(Category::Admins, id)),
            callback(t!("buttons.manage.make_user"), CallbackToken::ChangeRole(Category::Users, id)),
        ],
        vec![callback(t!("buttons.manage.delete"), CallbackToken::DeleteConfirm(Category::Banned, id))],
        vec![callback(t!("buttons.back"), CallbackToken::ManageList(Category::Banned))],
    ])
}

/// Attribute pickers below always lead back to the user detail screen; the
/// language/model/budget submenus only exist for the user category.
pub fn manage_language_keyboard(id: u64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([
        vec![
            callback(t!("buttons.language.en"), CallbackToken::ChangeLanguage(Language::English, id)),
            callback(t!("buttons.language.ru"), CallbackToken::ChangeLanguage(Language::Russian, id)),
        ],
        vec![callback(
            t!("buttons.manage.leave_unchanged"),
            CallbackToken::ManageDetail(Category::Users, id),
        )],
    ])
}

pub fn manage_model_keyboard(id: u64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([
        vec![
            callback(t!("buttons.model.gpt35"), CallbackToken::ChangeModel(ChatModel::Gpt35Turbo, id)),
            callback(t!("buttons.model.gpt4"), CallbackToken::ChangeModel(ChatModel::Gpt4, id)),
        ],
        vec![callback(
            t!("buttons.manage.leave_unchanged"),
            CallbackToken::ManageDetail(Category::Users, id),
        )],
    ])
}

pub fn manage_budget_keyboard(id: u64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([
        vec![
            callback(t!("buttons.manage.budget_plus"), CallbackToken::ChangeBudget(BudgetStep::Plus, id)),
            callback(t!("buttons.manage.budget_minus"), CallbackToken::ChangeBudget(BudgetStep::Minus, id)),
        ],
        vec![callback(
            t!("buttons.manage.leave_unchanged"),
            CallbackToken::ManageDetail(Category::Users, id),
        )],
    ])
}

/// Yes performs the delete; No returns to the detail screen unchanged.
pub fn delete_confirm_keyboard(category: Category, id: u64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([
        vec![
            callback(t!("buttons.yes"), CallbackToken::DeleteConfirmed(category, id)),
            callback(t!("buttons.no"), CallbackToken::ManageDetail(category, id)),
        ],
    ])
}

pub fn settings_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([
        vec![
            callback(t!("buttons.manage.language"), CallbackToken::OwnLanguageMenu),
            callback(t!("buttons.manage.model"), CallbackToken::OwnModelMenu),
        ],
    ])
}

/// Shared by the /language command, so it carries no back link into the
/// admin-only settings screen.
pub fn own_language_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([vec![
        callback(t!("buttons.language.en"), CallbackToken::SetOwnLanguage(Language::English)),
        callback(t!("buttons.language.ru"), CallbackToken::SetOwnLanguage(Language::Russian)),
    ]])
}

pub fn own_model_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([
        vec![
            callback(t!("buttons.model.gpt35"), CallbackToken::SetOwnModel(ChatModel::Gpt35Turbo)),
            callback(t!("buttons.model.gpt4"), CallbackToken::SetOwnModel(ChatModel::Gpt4)),
        ],
        vec![callback(t!("buttons.back"), CallbackToken::SettingsMenu)],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::UserInfo;
    use teloxide::types::InlineKeyboardButtonKind;

    fn tokens_of(keyboard: &InlineKeyboardMarkup) -> Vec<CallbackToken> {
        keyboard
            .inline_keyboard
            .iter()
            .flatten()
            .map(|button| match &button.kind {
                InlineKeyboardButtonKind::CallbackData(data) => data
                    .parse::<CallbackToken>()
                    .unwrap_or_else(|e| panic!("button data {:?} did not parse: {e}", data)),
                other => panic!("unexpected button kind: {:?}", other),
            })
            .collect()
    }

    #[test]
    fn every_button_carries_a_parseable_token() {
        let records = vec![
            UserRecord { id: 1, info: UserInfo::default() },
            UserRecord { id: 2, info: UserInfo::default() },
        ];

        for keyboard in [
            user_categories_keyboard(),
            category_list_keyboard(Category::Admins, &records),
            detail_keyboard(Category::Admins, 5),
            detail_keyboard(Category::Users, 5),
            detail_keyboard(Category::Banned, 5),
            manage_language_keyboard(5),
            manage_model_keyboard(5),
            manage_budget_keyboard(5),
            delete_confirm_keyboard(Category::Users, 5),
            settings_keyboard(),
            own_language_keyboard(),
            own_model_keyboard(),
        ] {
            assert!(!tokens_of(&keyboard).is_empty());
        }
    }

    #[test]
    fn category_list_links_each_record_and_a_back_button() {
        let records = vec![
            UserRecord { id: 10, info: UserInfo::default() },
            UserRecord { id: 11, info: UserInfo::default() },
        ];
        let tokens = tokens_of(&category_list_keyboard(Category::Users, &records));
        assert_eq!(
            tokens,
            vec![
                CallbackToken::ManageDetail(Category::Users, 10),
                CallbackToken::ManageDetail(Category::Users, 11),
                CallbackToken::ManageRoot,
            ]
        );
    }

    #[test]
    fn delete_confirmation_is_scoped_to_the_category() {
        for category in [Category::Admins, Category::Users, Category::Banned] {
            let tokens = tokens_of(&delete_confirm_keyboard(category, 9));
            assert_eq!(
                tokens,
                vec![
                    CallbackToken::DeleteConfirmed(category, 9),
                    CallbackToken::ManageDetail(category, 9),
                ]
            );
        }
    }

    #[test]
    fn detail_screens_offer_the_other_two_roles() {
        let tokens = tokens_of(&detail_keyboard(Category::Banned, 3));
        assert!(tokens.contains(&CallbackToken::ChangeRole(Category::Admins, 3)));
        assert!(tokens.contains(&CallbackToken::ChangeRole(Category::Users, 3)));
        assert!(!tokens.contains(&CallbackToken::ChangeRole(Category::Banned, 3)));
        assert!(tokens.contains(&CallbackToken::DeleteConfirm(Category::Banned, 3)));
    }
}
