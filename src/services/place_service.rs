// src/services/place_service.rs
// DOCUMENTATION: Business logic for places
// PURPOSE: Intermediary between handlers and the PlaceStore

use crate::db::PlaceStore;
use crate::errors::PlacesError;
use crate::models::{NewPlaceRequest, Place, PlaceDetail, PlaceListing, RemovalReport, UserWithPlaces};
use uuid::Uuid;
use validator::Validate;

pub const RELATION_EXISTS_MESSAGE: &str = "User-Place relation already exists";

pub struct PlaceService;

impl PlaceService {
    /// All places with user summaries and content ids, creation time omitted
    pub async fn get_all_places(store: &dyn PlaceStore) -> Result<Vec<PlaceListing>, PlacesError> {
        let places = store.list_places().await?;
        log::debug!("Listing {} places", places.len());
        Ok(places.into_iter().map(PlaceListing::from).collect())
    }

    /// Parse a path identifier
    pub fn parse_place_id(raw: &str) -> Result<Uuid, PlacesError> {
        Uuid::parse_str(raw.trim())
            .map_err(|_| PlacesError::ValidationError(format!("Invalid place id '{}'", raw)))
    }

    pub async fn get_place(store: &dyn PlaceStore, id: Uuid) -> Result<Option<Place>, PlacesError> {
        store.find_place(id).await
    }

    pub async fn get_places_by_user(
        store: &dyn PlaceStore,
        user_id: Uuid,
    ) -> Result<Option<UserWithPlaces>, PlacesError> {
        store.find_user_places(user_id).await
    }

    /// Add a place to the user's list
    /// DOCUMENTATION: Find-or-create the place by place_id, then find-or-create
    /// the user relation. An existing relation is a conflict. An existing place
    /// keeps its stored attributes.
    pub async fn add_place(
        store: &dyn PlaceStore,
        user_id: Uuid,
        req: NewPlaceRequest,
    ) -> Result<PlaceDetail, PlacesError> {
        req.validate()?;

        let (place, place_created) = store.find_or_create_place(&req).await?;
        let (_, relation_created) = store.find_or_create_user_place(user_id, place.id).await?;

        if !relation_created {
            log::info!(
                "User {} already has place {} ({})",
                user_id,
                place.id,
                place.place_id
            );
            return Err(PlacesError::AlreadyExists(RELATION_EXISTS_MESSAGE.to_string()));
        }

        log::info!(
            "User {} added place {} (new place: {})",
            user_id,
            place.id,
            place_created
        );

        // Re-read so the response carries every linked user and content
        store
            .find_place_detail(place.id)
            .await?
            .ok_or_else(|| PlacesError::NotFound(format!("Place {}", place.id)))
    }

    /// Remove a place and its contents in one transaction
    /// DOCUMENTATION: Contents are matched on the requested place id. Earlier
    /// releases filtered contents on an unrelated identifier outside any
    /// transaction and only reported success when both deletes hit rows.
    pub async fn remove_place(
        store: &dyn PlaceStore,
        id: Uuid,
    ) -> Result<RemovalReport, PlacesError> {
        store.remove_place(id).await
    }
}
