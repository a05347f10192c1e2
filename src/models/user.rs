use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,        // auth identity, the one the bearer token belongs to
    pub username: String,
    pub email: String,
    pub avatar: Option<String>,
    pub profile_id: Option<String>, // linked leftorium-user record, referenced by comments and ratings
}

/// Storefront profile linked one-to-one with an auth identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
}

impl User {
    /// Overlays profile data: profile username/email win over the auth record.
    pub fn merge_profile(mut self, profile: Profile) -> Self {
        if let Some(username) = profile.username.filter(|u| !u.is_empty()) {
            self.username = username;
        }
        if let Some(email) = profile.email.filter(|e| !e.is_empty()) {
            self.email = email;
        }
        if profile.avatar.is_some() {
            self.avatar = profile.avatar;
        }
        self.profile_id = Some(profile.id);
        self
    }
}
