use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user. `is_public` controls whether the profile and schedule
/// are visible to viewers without an accepted friendship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Applies a partial profile update. Only fields present in the patch
    /// change; the rest keep their current values.
    pub fn apply(&mut self, patch: ProfilePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(bio) = patch.bio {
            self.bio = Some(bio);
        }
        if let Some(photo_url) = patch.photo_url {
            self.photo_url = Some(photo_url);
        }
        if let Some(is_public) = patch.is_public {
            self.is_public = is_public;
        }
    }
}

/// Payload for registering a new user. Profiles are public by default.
#[derive(Debug, Clone)]
pub struct UserCreate {
    pub name: String,
    pub email: String,
    pub is_public: bool,
}

impl UserCreate {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            is_public: true,
        }
    }

    /// Registers the user with a private profile.
    pub fn private(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            is_public: false,
            ..Self::new(name, email)
        }
    }
}

/// Partial profile update; only provided fields are applied.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
    pub is_public: Option<bool>,
}

/// What a viewer is allowed to see of a subject. Private fields (email
/// included) are `None` when the visibility gate denies the viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub is_public: bool,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
}

impl Profile {
    /// The profile as the subject themselves (or an approved friend) sees it.
    pub fn full(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            is_public: user.is_public,
            email: Some(user.email.clone()),
            bio: user.bio.clone(),
            photo_url: user.photo_url.clone(),
        }
    }

    /// The public identity only: id, name, and the public flag.
    pub fn redacted(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            is_public: user.is_public,
            email: None,
            bio: None,
            photo_url: None,
        }
    }
}
