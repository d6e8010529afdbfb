use crate::command::Command;
use crate::services::user::Role;

/// Minimum access level a callback subtree demands from the caller. `Known`
/// admits any identity with a stored record, banned included; an unknown
/// identity satisfies nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Known,
    Admin,
    Owner,
}

/// `None` is the unknown sentinel: the identity has no stored record.
pub fn is_allowed(role: Option<Role>, min: Role) -> bool {
    role.map_or(false, |role| role >= min)
}

pub fn satisfies(role: Option<Role>, access: Access) -> bool {
    match access {
        Access::Known => role.is_some(),
        Access::Admin => is_allowed(role, Role::Admin),
        Access::Owner => is_allowed(role, Role::Owner),
    }
}

/// Minimum tier per command. Banned identities keep the base tier: they can
/// start the bot, read help and see their language and budget, nothing more.
pub fn required_role(command: &Command) -> Role {
    match command {
        Command::Start | Command::Help | Command::Language | Command::Budget => Role::Banned,
        Command::Reset | Command::Summarize => Role::User,
        Command::Settings => Role::Admin,
        Command::Users => Role::Owner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_identity_is_allowed_nothing() {
        assert!(!is_allowed(None, Role::Banned));
        assert!(!satisfies(None, Access::Known));
        assert!(!satisfies(None, Access::Admin));
        assert!(!satisfies(None, Access::Owner));
    }

    #[test]
    fn banned_identity_is_known_but_unprivileged() {
        let banned = Some(Role::Banned);
        assert!(satisfies(banned, Access::Known));
        assert!(!satisfies(banned, Access::Admin));
        assert!(!satisfies(banned, Access::Owner));
        assert!(is_allowed(banned, Role::Banned));
        assert!(!is_allowed(banned, Role::User));
    }

    #[test]
    fn tiers_are_nested() {
        for role in [Role::User, Role::Admin, Role::Owner] {
            assert!(is_allowed(Some(role), Role::Banned));
        }
        assert!(is_allowed(Some(Role::Admin), Role::User));
        assert!(!is_allowed(Some(Role::Admin), Role::Owner));
        assert!(satisfies(Some(Role::Owner), Access::Admin));
        assert!(satisfies(Some(Role::Owner), Access::Owner));
        assert!(!satisfies(Some(Role::Admin), Access::Owner));
    }

    #[test]
    fn command_minimums_follow_the_table() {
        assert_eq!(required_role(&Command::Start), Role::Banned);
        assert_eq!(required_role(&Command::Help), Role::Banned);
        assert_eq!(required_role(&Command::Language), Role::Banned);
        assert_eq!(required_role(&Command::Budget), Role::Banned);
        assert_eq!(required_role(&Command::Reset), Role::User);
        assert_eq!(required_role(&Command::Summarize), Role::User);
        assert_eq!(required_role(&Command::Settings), Role::Admin);
        assert_eq!(required_role(&Command::Users), Role::Owner);
    }
}
