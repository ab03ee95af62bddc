// src/db/store.rs
// DOCUMENTATION: Persistence interface for the places domain
// PURPOSE: Lets handlers run against PostgreSQL or the in-memory backend

use crate::errors::PlacesError;
use crate::models::{NewPlaceRequest, Place, PlaceDetail, RemovalReport, UserPlace, UserWithPlaces};
use async_trait::async_trait;
use uuid::Uuid;

pub type StoreResult<T> = Result<T, PlacesError>;

/// Queries needed by the places handlers.
///
/// Find-or-create operations return `(row, created)`. Implementations must make
/// them atomic with respect to the unique key so concurrent callers converge on
/// one row.
#[async_trait]
pub trait PlaceStore: Send + Sync {
    /// All places with users and content ids, ordered by creation then id
    async fn list_places(&self) -> StoreResult<Vec<PlaceDetail>>;

    async fn find_place(&self, id: Uuid) -> StoreResult<Option<Place>>;

    async fn find_place_detail(&self, id: Uuid) -> StoreResult<Option<PlaceDetail>>;

    /// The user's id and the places linked to it, `None` if the user is unknown
    async fn find_user_places(&self, user_id: Uuid) -> StoreResult<Option<UserWithPlaces>>;

    /// Keyed on `place_id`; `req` supplies the attributes of a new row only
    async fn find_or_create_place(&self, req: &NewPlaceRequest) -> StoreResult<(Place, bool)>;

    /// Keyed on `(user_id, place_id)`. Fails with NotFound if either side is missing.
    async fn find_or_create_user_place(
        &self,
        user_id: Uuid,
        place_id: Uuid,
    ) -> StoreResult<(UserPlace, bool)>;

    /// Deletes the place and its contents atomically. NotFound leaves everything untouched.
    async fn remove_place(&self, id: Uuid) -> StoreResult<RemovalReport>;

    async fn health_check(&self) -> StoreResult<()>;

    fn backend_name(&self) -> &'static str;
}
