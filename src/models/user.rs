// src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::PlaceRef;

/// User account row. Owned by the accounts service, read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub fullname: String,
    #[serde(default, rename = "avatarUrl", alias = "avatar_url")]
    pub avatar_url: Option<String>,
    #[serde(default = "chrono::Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "chrono::Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn to_summary(&self) -> UserSummary {
        UserSummary {
            fullname: self.fullname.clone(),
            avatar_url: self.avatar_url.clone(),
            id: self.id,
        }
    }
}

/// Join record between a user and a place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserPlace {
    pub id: Uuid,
    pub user_id: Uuid,
    pub place_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// User as embedded in a place: name, avatar and id only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserSummary {
    pub fullname: String,
    #[serde(rename = "avatarUrl")]
    pub avatar_url: Option<String>,
    pub id: Uuid,
}

/// Response for GET /places/user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserWithPlaces {
    pub id: Uuid,
    pub places: Vec<PlaceRef>,
}
