use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named container of tasks owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    #[serde(rename = "user_id")]
    pub owner_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    /// Anyone may view a public project; only the owner may edit it.
    #[serde(default)]
    pub is_public: bool,
}

impl Project {
    pub fn new(owner_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name: name.into(),
            created_at: Utc::now(),
            is_public: false,
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }

    /// Relative link under which a public project can be shared.
    pub fn share_path(&self) -> String {
        format!("/projects/{}", self.id)
    }
}
