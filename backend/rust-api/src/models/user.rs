use serde::{Deserialize, Serialize};

/// User profile stored in the "users" collection.
///
/// Profiles are owned and mutated by the account-management subsystem; the
/// leaderboard engine only reads snapshots of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(rename = "photoURL", default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub status: AccountStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    /// Absent means enabled; only an explicit `false` opts the user out.
    #[serde(
        rename = "leaderboardEnabled",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub leaderboard_enabled: Option<bool>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    Active,
    Inactive,
    Warned,
    Banned,
}

impl UserProfile {
    /// Single gate deciding whether this profile may appear on any
    /// leaderboard. Admins bypass the opt-in checks; standard users need a
    /// non-blank nickname, must not have opted out, and must not be banned
    /// or inactive. Both aggregators go through this method and nowhere else.
    pub fn is_leaderboard_eligible(&self) -> bool {
        match self.role {
            UserRole::Admin => true,
            UserRole::User => {
                let has_nickname = self
                    .nickname
                    .as_deref()
                    .is_some_and(|n| !n.trim().is_empty());
                has_nickname
                    && self.leaderboard_enabled != Some(false)
                    && !matches!(self.status, AccountStatus::Banned | AccountStatus::Inactive)
            }
        }
    }

    /// Name shown on leaderboards: standard users appear under their
    /// nickname, admins under their display name.
    pub fn leaderboard_name(&self) -> &str {
        match self.role {
            UserRole::Admin => &self.display_name,
            UserRole::User => self
                .nickname
                .as_deref()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or(&self.display_name),
        }
    }
}
