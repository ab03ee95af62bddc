// src/models/place.rs
// DOCUMENTATION: Core data structures for places
// PURPOSE: Database rows, request payloads and response shapes for places

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::{ContentSummary, UserSummary};

/// Represents a complete place record from the database
/// DOCUMENTATION: Maps directly to the places table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Place {
    /// Internal identifier (UUID v4)
    pub id: Uuid,

    /// External place identifier (e.g. a maps provider id), unique
    pub place_id: String,

    pub name: Option<String>,

    pub address: Option<String>,

    pub latitude: Option<f64>,

    pub longitude: Option<f64>,

    pub image_url: Option<String>,

    /// When record was created
    #[serde(rename = "createdAt", default = "chrono::Utc::now")]
    pub created_at: DateTime<Utc>,

    /// When record was last modified
    #[serde(rename = "updatedAt", default = "chrono::Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// Place with its users and contents expanded
/// DOCUMENTATION: Returned by addPlace after the relation is created
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceDetail {
    #[serde(flatten)]
    pub place: Place,
    pub users: Vec<UserSummary>,
    pub contents: Vec<ContentSummary>,
}

/// Listing shape for GET /places
/// DOCUMENTATION: Same as PlaceDetail without the creation timestamp
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceListing {
    pub id: Uuid,
    pub place_id: String,
    pub name: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image_url: Option<String>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    pub users: Vec<UserSummary>,
    pub contents: Vec<ContentSummary>,
}

impl From<PlaceDetail> for PlaceListing {
    fn from(detail: PlaceDetail) -> Self {
        let PlaceDetail {
            place,
            users,
            contents,
        } = detail;

        PlaceListing {
            id: place.id,
            place_id: place.place_id,
            name: place.name,
            address: place.address,
            latitude: place.latitude,
            longitude: place.longitude,
            image_url: place.image_url,
            updated_at: place.updated_at,
            users,
            contents,
        }
    }
}

/// Minimal place reference nested under a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PlaceRef {
    pub id: Uuid,
    pub place_id: String,
}

/// Request DTO for adding a place to the caller's list
/// DOCUMENTATION: Only these attributes are ever written to storage.
/// Unknown fields in the JSON body are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NewPlaceRequest {
    /// External place identifier (required, lookup key)
    #[validate(length(min = 1, max = 255))]
    pub place_id: String,

    #[validate(length(max = 255))]
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub address: Option<String>,

    #[validate(range(min = -90.0, max = 90.0))]
    #[serde(default)]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    #[serde(default)]
    pub longitude: Option<f64>,

    #[validate(url)]
    #[serde(default, alias = "imageUrl")]
    pub image_url: Option<String>,
}

/// Outcome of a transactional place removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RemovalReport {
    pub place_deleted: bool,
    pub contents_deleted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_place() -> Place {
        let now = Utc::now();
        Place {
            id: Uuid::new_v4(),
            place_id: "abc123".to_string(),
            name: Some("Central Park".to_string()),
            address: None,
            latitude: Some(40.7812),
            longitude: Some(-73.9665),
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_listing_drops_created_at() {
        let detail = PlaceDetail {
            place: sample_place(),
            users: vec![],
            contents: vec![],
        };

        let detail_json = serde_json::to_value(&detail).unwrap();
        assert!(detail_json.get("createdAt").is_some());
        assert_eq!(detail_json["place_id"], "abc123");

        let listing_json = serde_json::to_value(PlaceListing::from(detail)).unwrap();
        assert!(listing_json.get("createdAt").is_none());
        assert!(listing_json.get("updatedAt").is_some());
        assert_eq!(listing_json["users"], serde_json::json!([]));
    }

    #[test]
    fn test_new_place_request_ignores_unknown_fields() {
        let req: NewPlaceRequest = serde_json::from_value(serde_json::json!({
            "place_id": "abc123",
            "name": "Central Park",
            "id": "00000000-0000-0000-0000-000000000000",
            "created_at": "1970-01-01T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(req.place_id, "abc123");
        assert_eq!(req.name.as_deref(), Some("Central Park"));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_new_place_request_validation() {
        let empty = NewPlaceRequest::default();
        assert!(empty.validate().is_err());

        let bad_lat = NewPlaceRequest {
            place_id: "abc".to_string(),
            latitude: Some(91.0),
            ..Default::default()
        };
        assert!(bad_lat.validate().is_err());

        let bad_url = NewPlaceRequest {
            place_id: "abc".to_string(),
            image_url: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(bad_url.validate().is_err());
    }
}
