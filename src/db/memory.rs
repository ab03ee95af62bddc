// src/db/memory.rs
// DOCUMENTATION: In-memory implementation of PlaceStore
// PURPOSE: Local development without PostgreSQL, and handler tests
//
// Not durable: all state is lost on restart. A single RwLock guards every
// table, so find-or-create and removal are atomic within one process.

use crate::db::{PlaceStore, StoreResult};
use crate::errors::PlacesError;
use crate::models::*;
use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Places, users and contents to preload, read from MEMORY_SEED_PATH
#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub places: Vec<Place>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub contents: Vec<Content>,
}

#[derive(Debug, Default)]
struct Tables {
    /// Insertion order doubles as creation order
    places: Vec<Place>,
    users: HashMap<Uuid, User>,
    user_places: Vec<UserPlace>,
    contents: Vec<Content>,
}

impl Tables {
    fn detail(&self, place: &Place) -> PlaceDetail {
        let users = self
            .user_places
            .iter()
            .filter(|up| up.place_id == place.id)
            .filter_map(|up| self.users.get(&up.user_id))
            .map(User::to_summary)
            .collect();

        let contents = self
            .contents
            .iter()
            .filter(|c| c.place_id == place.id)
            .map(|c| ContentSummary { id: c.id })
            .collect();

        PlaceDetail {
            place: place.clone(),
            users,
            contents,
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryPlaceStore {
    tables: RwLock<Tables>,
}

impl MemoryPlaceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store preloaded from a JSON seed file
    pub async fn from_seed_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading seed file {}", path.display()))?;
        let seed: SeedData = serde_json::from_str(&raw)
            .with_context(|| format!("parsing seed file {}", path.display()))?;

        let store = Self::new();
        store
            .seed(seed)
            .await
            .with_context(|| format!("loading seed file {}", path.display()))?;
        Ok(store)
    }

    /// Load seed rows. Places go in before contents, and every content must
    /// reference a seeded place; nothing is written if a check fails.
    pub async fn seed(&self, seed: SeedData) -> anyhow::Result<()> {
        let mut tables = self.tables.write().await;

        for (i, place) in seed.places.iter().enumerate() {
            let duplicate = tables.places.iter().chain(&seed.places[..i]).any(|p| {
                p.id == place.id || p.place_id == place.place_id
            });
            anyhow::ensure!(
                !duplicate,
                "duplicate seeded place {} ({})",
                place.id,
                place.place_id
            );
        }
        for content in &seed.contents {
            let known = tables.places.iter().any(|p| p.id == content.place_id)
                || seed.places.iter().any(|p| p.id == content.place_id);
            if !known {
                anyhow::bail!(
                    "content {} references unknown place {}",
                    content.id,
                    content.place_id
                );
            }
        }

        log::info!(
            "Seeding memory store with {} places, {} users and {} contents",
            seed.places.len(),
            seed.users.len(),
            seed.contents.len()
        );
        tables.places.extend(seed.places);
        for user in seed.users {
            tables.users.insert(user.id, user);
        }
        tables.contents.extend(seed.contents);
        Ok(())
    }

    pub async fn insert_user(&self, user: User) {
        self.tables.write().await.users.insert(user.id, user);
    }

    /// Attach a content row to an existing place
    #[cfg(test)]
    pub async fn insert_content(&self, place_id: Uuid) -> StoreResult<Content> {
        let mut tables = self.tables.write().await;
        if !tables.places.iter().any(|p| p.id == place_id) {
            return Err(PlacesError::NotFound(format!("Place {}", place_id)));
        }

        let content = Content {
            id: Uuid::new_v4(),
            place_id,
            created_at: Utc::now(),
        };
        tables.contents.push(content.clone());
        Ok(content)
    }

    #[cfg(test)]
    pub async fn user_place_count(&self) -> usize {
        self.tables.read().await.user_places.len()
    }
}

#[async_trait]
impl PlaceStore for MemoryPlaceStore {
    async fn list_places(&self) -> StoreResult<Vec<PlaceDetail>> {
        let tables = self.tables.read().await;
        Ok(tables.places.iter().map(|p| tables.detail(p)).collect())
    }

    async fn find_place(&self, id: Uuid) -> StoreResult<Option<Place>> {
        let tables = self.tables.read().await;
        Ok(tables.places.iter().find(|p| p.id == id).cloned())
    }

    async fn find_place_detail(&self, id: Uuid) -> StoreResult<Option<PlaceDetail>> {
        let tables = self.tables.read().await;
        Ok(tables
            .places
            .iter()
            .find(|p| p.id == id)
            .map(|p| tables.detail(p)))
    }

    async fn find_user_places(&self, user_id: Uuid) -> StoreResult<Option<UserWithPlaces>> {
        let tables = self.tables.read().await;
        if !tables.users.contains_key(&user_id) {
            return Ok(None);
        }

        let places = tables
            .user_places
            .iter()
            .filter(|up| up.user_id == user_id)
            .filter_map(|up| tables.places.iter().find(|p| p.id == up.place_id))
            .map(|p| PlaceRef {
                id: p.id,
                place_id: p.place_id.clone(),
            })
            .collect();

        Ok(Some(UserWithPlaces {
            id: user_id,
            places,
        }))
    }

    async fn find_or_create_place(&self, req: &NewPlaceRequest) -> StoreResult<(Place, bool)> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.places.iter().find(|p| p.place_id == req.place_id) {
            return Ok((existing.clone(), false));
        }

        let now = Utc::now();
        let place = Place {
            id: Uuid::new_v4(),
            place_id: req.place_id.clone(),
            name: req.name.clone(),
            address: req.address.clone(),
            latitude: req.latitude,
            longitude: req.longitude,
            image_url: req.image_url.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.places.push(place.clone());
        log::info!("Created place {} ({})", place.id, place.place_id);
        Ok((place, true))
    }

    async fn find_or_create_user_place(
        &self,
        user_id: Uuid,
        place_id: Uuid,
    ) -> StoreResult<(UserPlace, bool)> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user_id) {
            return Err(PlacesError::NotFound(format!("User {}", user_id)));
        }
        if !tables.places.iter().any(|p| p.id == place_id) {
            return Err(PlacesError::NotFound(format!("Place {}", place_id)));
        }

        if let Some(existing) = tables
            .user_places
            .iter()
            .find(|up| up.user_id == user_id && up.place_id == place_id)
        {
            return Ok((existing.clone(), false));
        }

        let user_place = UserPlace {
            id: Uuid::new_v4(),
            user_id,
            place_id,
            created_at: Utc::now(),
        };
        tables.user_places.push(user_place.clone());
        Ok((user_place, true))
    }

    async fn remove_place(&self, id: Uuid) -> StoreResult<RemovalReport> {
        let mut tables = self.tables.write().await;
        let before = tables.places.len();
        tables.places.retain(|p| p.id != id);
        if tables.places.len() == before {
            return Err(PlacesError::NotFound(format!("Place {}", id)));
        }

        let contents_before = tables.contents.len();
        tables.contents.retain(|c| c.place_id != id);
        let contents_deleted = (contents_before - tables.contents.len()) as u64;
        tables.user_places.retain(|up| up.place_id != id);

        Ok(RemovalReport {
            place_deleted: true,
            contents_deleted,
        })
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn user(name: &str) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            fullname: name.to_string(),
            avatar_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn request(place_id: &str) -> NewPlaceRequest {
        NewPlaceRequest {
            place_id: place_id.to_string(),
            name: Some("Central Park".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_find_or_create_place_keeps_first_attributes() {
        let store = MemoryPlaceStore::new();

        let (first, created) = assert_ok!(store.find_or_create_place(&request("abc")).await);
        assert!(created);

        let mut renamed = request("abc");
        renamed.name = Some("Renamed".to_string());
        let (second, created) = assert_ok!(store.find_or_create_place(&renamed).await);
        assert!(!created);
        assert_eq!(first, second);
        assert_eq!(second.name.as_deref(), Some("Central Park"));
    }

    #[tokio::test]
    async fn test_user_place_requires_existing_user() {
        let store = MemoryPlaceStore::new();
        let (place, _) = assert_ok!(store.find_or_create_place(&request("abc")).await);

        let err = assert_err!(store.find_or_create_user_place(Uuid::new_v4(), place.id).await);
        assert!(matches!(err, PlacesError::NotFound(_)));
        assert_eq!(store.user_place_count().await, 0);
    }

    #[tokio::test]
    async fn test_user_place_is_unique_per_pair() {
        let store = MemoryPlaceStore::new();
        let u = user("Ada");
        store.insert_user(u.clone()).await;
        let (place, _) = assert_ok!(store.find_or_create_place(&request("abc")).await);

        let (_, created) = assert_ok!(store.find_or_create_user_place(u.id, place.id).await);
        assert!(created);
        let (_, created) = assert_ok!(store.find_or_create_user_place(u.id, place.id).await);
        assert!(!created);
        assert_eq!(store.user_place_count().await, 1);
    }

    #[tokio::test]
    async fn test_remove_place_reports_contents_and_drops_relations() {
        let store = MemoryPlaceStore::new();
        let u = user("Ada");
        store.insert_user(u.clone()).await;
        let (place, _) = assert_ok!(store.find_or_create_place(&request("abc")).await);
        let (other, _) = assert_ok!(store.find_or_create_place(&request("def")).await);
        assert_ok!(store.find_or_create_user_place(u.id, place.id).await);
        assert_ok!(store.insert_content(place.id).await);
        assert_ok!(store.insert_content(place.id).await);
        let kept = assert_ok!(store.insert_content(other.id).await);

        let report = assert_ok!(store.remove_place(place.id).await);
        assert_eq!(
            report,
            RemovalReport {
                place_deleted: true,
                contents_deleted: 2
            }
        );
        assert_eq!(store.user_place_count().await, 0);

        let remaining = assert_ok!(store.find_place_detail(other.id).await).unwrap();
        assert_eq!(remaining.contents, vec![ContentSummary { id: kept.id }]);

        let err = assert_err!(store.remove_place(place.id).await);
        assert!(matches!(err, PlacesError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_seed_data_parses_camel_case_users() {
        let seed: SeedData = serde_json::from_value(serde_json::json!({
            "users": [{
                "id": "7f1d8f5c-3f43-4b7c-9a53-5d6f1d3a2b10",
                "fullname": "Ada Lovelace",
                "avatarUrl": "https://example.com/ada.png"
            }]
        }))
        .unwrap();

        let store = MemoryPlaceStore::new();
        assert_ok!(store.seed(seed).await);

        let id = Uuid::parse_str("7f1d8f5c-3f43-4b7c-9a53-5d6f1d3a2b10").unwrap();
        let user = assert_ok!(store.find_user_places(id).await).unwrap();
        assert!(user.places.is_empty());
    }

    const SEEDED_PLACE: &str = "5465eb9d-1c1e-4b8a-9d56-3a0b7c2e4f11";

    fn seed_with_content(content_place: &str) -> SeedData {
        serde_json::from_value(serde_json::json!({
            "places": [{
                "id": SEEDED_PLACE,
                "place_id": "abc",
                "name": "Central Park",
                "address": null,
                "latitude": 40.78,
                "longitude": -73.96,
                "image_url": null
            }],
            "contents": [{
                "id": "0b6f3b0e-8d8e-4f57-a0a2-6c1e5b1f9d20",
                "place_id": content_place
            }]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_seeded_contents_attach_to_seeded_places() {
        let store = MemoryPlaceStore::new();
        assert_ok!(store.seed(seed_with_content(SEEDED_PLACE)).await);

        let places = assert_ok!(store.list_places().await);
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].place.place_id, "abc");
        assert_eq!(places[0].contents.len(), 1);

        // Adding the same external id finds the seeded row
        let (place, created) = assert_ok!(store.find_or_create_place(&request("abc")).await);
        assert!(!created);
        assert_eq!(place.id.to_string(), SEEDED_PLACE);

        let report = assert_ok!(store.remove_place(place.id).await);
        assert_eq!(report.contents_deleted, 1);
        assert!(assert_ok!(store.list_places().await).is_empty());
    }

    #[tokio::test]
    async fn test_seed_rejects_content_for_unknown_place() {
        let store = MemoryPlaceStore::new();
        let err = assert_err!(
            store
                .seed(seed_with_content("9a3c2d1e-0000-4000-8000-000000000001"))
                .await
        );
        assert!(err.to_string().contains("unknown place"));

        // Nothing from the rejected seed is kept
        assert!(assert_ok!(store.list_places().await).is_empty());
    }

    #[tokio::test]
    async fn test_seed_rejects_duplicate_place_ids() {
        let store = MemoryPlaceStore::new();
        assert_ok!(store.seed(seed_with_content(SEEDED_PLACE)).await);

        let again = SeedData {
            contents: Vec::new(),
            ..seed_with_content(SEEDED_PLACE)
        };
        let err = assert_err!(store.seed(again).await);
        assert!(err.to_string().contains("duplicate seeded place"));
        assert_eq!(assert_ok!(store.list_places().await).len(), 1);
    }

    #[tokio::test]
    async fn test_seed_file_reports_orphan_content() {
        let path = std::env::temp_dir().join(format!("places-seed-{}.json", Uuid::new_v4()));
        let raw = serde_json::json!({
            "contents": [{
                "id": "0b6f3b0e-8d8e-4f57-a0a2-6c1e5b1f9d20",
                "place_id": SEEDED_PLACE
            }]
        });
        tokio::fs::write(&path, raw.to_string()).await.unwrap();

        let result = MemoryPlaceStore::from_seed_file(&path).await;
        tokio::fs::remove_file(&path).await.unwrap();

        let err = assert_err!(result);
        assert!(format!("{:#}", err).contains("references unknown place"));
    }
}
