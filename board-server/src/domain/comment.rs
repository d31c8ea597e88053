use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A comment lives under its post; the post id is part of its key.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(post_id: Uuid, user_id: Uuid, username: String, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id,
            user_id,
            username,
            content,
            created_at: Utc::now(),
        }
    }
}
