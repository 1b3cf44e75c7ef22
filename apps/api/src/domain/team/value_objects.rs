use serde::{Deserialize, Serialize};

/// Visibility of a team
///
/// Open teams can be joined by anyone in the installation, invite-only teams
/// require an invitation handled outside this core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "team_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TeamType {
    /// Anyone may join
    Open,
    /// Members must be invited
    Invite,
}

impl TeamType {
    /// Parses the wire representation ("open" / "invite", or the single
    /// letters "O" / "I")
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" | "O" => Some(TeamType::Open),
            "invite" | "I" => Some(TeamType::Invite),
            _ => None,
        }
    }
}

impl std::fmt::Display for TeamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TeamType::Open => write!(f, "open"),
            TeamType::Invite => write!(f, "invite"),
        }
    }
}

/// Names no team may take because they collide with application routes
pub const RESERVED_TEAM_NAMES: &[&str] = &[
    "admin", "api", "channel", "claim", "error", "files", "help", "landing", "login", "mfa",
    "oauth", "plug", "plugins", "post", "signup",
];

/// Checks whether `name` is a valid team slug
///
/// # Validation Rules
/// - 2 to 64 characters
/// - Lowercase ASCII letters, digits and `-` only
/// - Starts and ends with a letter or digit
/// - Not a reserved name
pub fn is_valid_team_name(name: &str) -> bool {
    if name.len() < 2 || name.len() > 64 {
        return false;
    }

    let allowed = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
    if !name.chars().all(|c| allowed(c) || c == '-') {
        return false;
    }

    let first_ok = name.chars().next().is_some_and(allowed);
    let last_ok = name.chars().last().is_some_and(allowed);

    first_ok && last_ok && !RESERVED_TEAM_NAMES.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_type_display() {
        assert_eq!(TeamType::Open.to_string(), "open");
        assert_eq!(TeamType::Invite.to_string(), "invite");
    }

    #[test]
    fn team_type_parse() {
        assert_eq!(TeamType::parse("O"), Some(TeamType::Open));
        assert_eq!(TeamType::parse("invite"), Some(TeamType::Invite));
        assert_eq!(TeamType::parse("private"), None);
    }

    #[test]
    fn valid_team_names() {
        assert!(is_valid_team_name("ab"));
        assert!(is_valid_team_name("name4x9k2"));
        assert!(is_valid_team_name("my-team-1"));
    }

    #[test]
    fn invalid_team_names() {
        assert!(!is_valid_team_name("a"));
        assert!(!is_valid_team_name("-team"));
        assert!(!is_valid_team_name("team-"));
        assert!(!is_valid_team_name("Team"));
        assert!(!is_valid_team_name("my_team"));
        assert!(!is_valid_team_name(&"x".repeat(65)));
    }

    #[test]
    fn reserved_names_are_rejected() {
        assert!(!is_valid_team_name("admin"));
        assert!(!is_valid_team_name("api"));
    }
}
