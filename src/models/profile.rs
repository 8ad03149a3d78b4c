use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::nullable;
use crate::security::neutralize_markup;

/// A user's profile row. `id` is the subject of the user's credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for `PUT /api/users/me`.
///
/// Only `name` and `avatar_url` may change; both accept `null` to clear.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProfileChanges {
    #[serde(default, deserialize_with = "nullable")]
    #[validate(length(max = 100))]
    pub name: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable")]
    #[validate(url)]
    pub avatar_url: Option<Option<String>>,
}

impl ProfileChanges {
    pub fn sanitized(self) -> Self {
        Self {
            name: self.name.map(|value| value.as_deref().map(neutralize_markup)),
            ..self
        }
    }
}

impl Profile {
    /// A fresh profile for `id`, as created when the user signs up.
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            email: email.into(),
            name: None,
            avatar_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, changes: &ProfileChanges) {
        if let Some(name) = &changes.name {
            self.name = name.clone();
        }
        if let Some(avatar_url) = &changes.avatar_url {
            self.avatar_url = avatar_url.clone();
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_changes_validation() {
        let valid: ProfileChanges = serde_json::from_value(json!({
            "name": "Ada",
            "avatar_url": "https://example.com/ada.png"
        }))
        .unwrap();
        assert!(valid.validate().is_ok());

        let bad_url: ProfileChanges =
            serde_json::from_value(json!({ "avatar_url": "ada.png" })).unwrap();
        assert!(bad_url.validate().is_err());

        let cleared: ProfileChanges =
            serde_json::from_value(json!({ "avatar_url": null })).unwrap();
        assert!(cleared.validate().is_ok());
        assert_eq!(cleared.avatar_url, Some(None));
    }

    #[test]
    fn test_email_is_not_updatable() {
        let changes: ProfileChanges = serde_json::from_value(json!({
            "email": "other@example.com",
            "name": "Ada"
        }))
        .unwrap();

        let mut profile = Profile::new("u1", "ada@example.com");
        profile.apply(&changes);

        assert_eq!(profile.email, "ada@example.com");
        assert_eq!(profile.name.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_sanitized_name() {
        let changes = ProfileChanges {
            name: Some(Some("<script>x</script>".to_string())),
            avatar_url: None,
        }
        .sanitized();

        assert_eq!(
            changes.name,
            Some(Some("&lt;script&gt;x&lt;/script&gt;".to_string()))
        );
    }
}
