// src/db/repository.rs
// DOCUMENTATION: Database access layer - all SQL queries
// PURPOSE: PostgreSQL implementation of PlaceStore

use crate::db::{PlaceStore, StoreResult};
use crate::errors::PlacesError;
use crate::models::*;
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

const PLACE_COLUMNS: &str = r#"
    id, place_id, name, address, latitude, longitude, image_url,
    created_at, updated_at
"#;

/// User summary row tagged with the place it belongs to
#[derive(Debug, FromRow)]
struct PlaceUserRow {
    place_id: Uuid,
    fullname: String,
    avatar_url: Option<String>,
    id: Uuid,
}

/// Content id row tagged with its place
#[derive(Debug, FromRow)]
struct PlaceContentRow {
    place_id: Uuid,
    id: Uuid,
}

/// PgPlaceStore: All database operations for the places domain
/// DOCUMENTATION: Uses query_as for type-safe SQL queries
#[derive(Clone)]
pub struct PgPlaceStore {
    pool: PgPool,
}

impl PgPlaceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load users and content ids for a batch of places and stitch them on.
    /// Two queries regardless of how many places are passed in.
    async fn attach_relations(&self, places: Vec<Place>) -> StoreResult<Vec<PlaceDetail>> {
        if places.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = places.iter().map(|p| p.id).collect();

        let user_rows = sqlx::query_as::<_, PlaceUserRow>(
            r#"
            SELECT up.place_id, u.fullname, u.avatar_url, u.id
            FROM user_places up
            JOIN users u ON u.id = up.user_id
            WHERE up.place_id = ANY($1)
            ORDER BY up.created_at ASC, u.id ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!("Failed to fetch users for {} places: {}", ids.len(), e);
            PlacesError::DatabaseError(e.to_string())
        })?;

        let content_rows = sqlx::query_as::<_, PlaceContentRow>(
            r#"
            SELECT place_id, id
            FROM contents
            WHERE place_id = ANY($1)
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!("Failed to fetch contents for {} places: {}", ids.len(), e);
            PlacesError::DatabaseError(e.to_string())
        })?;

        let mut users: HashMap<Uuid, Vec<UserSummary>> = HashMap::new();
        for row in user_rows {
            users.entry(row.place_id).or_default().push(UserSummary {
                fullname: row.fullname,
                avatar_url: row.avatar_url,
                id: row.id,
            });
        }

        let mut contents: HashMap<Uuid, Vec<ContentSummary>> = HashMap::new();
        for row in content_rows {
            contents
                .entry(row.place_id)
                .or_default()
                .push(ContentSummary { id: row.id });
        }

        Ok(places
            .into_iter()
            .map(|place| PlaceDetail {
                users: users.remove(&place.id).unwrap_or_default(),
                contents: contents.remove(&place.id).unwrap_or_default(),
                place,
            })
            .collect())
    }
}

/// Map a foreign-key violation on user_places to NotFound
fn map_user_place_error(e: sqlx::Error, user_id: Uuid, place_id: Uuid) -> PlacesError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.code().as_deref() == Some("23503") {
            return match db_err.constraint() {
                Some("user_places_user_id_fkey") => {
                    PlacesError::NotFound(format!("User {}", user_id))
                }
                _ => PlacesError::NotFound(format!("Place {}", place_id)),
            };
        }
    }

    log::error!(
        "Failed to create user-place relation ({}, {}): {}",
        user_id,
        place_id,
        e
    );
    PlacesError::DatabaseError(e.to_string())
}

#[async_trait]
impl PlaceStore for PgPlaceStore {
    async fn list_places(&self) -> StoreResult<Vec<PlaceDetail>> {
        let sql = format!(
            "SELECT {} FROM places ORDER BY created_at ASC, id ASC",
            PLACE_COLUMNS
        );

        let places = sqlx::query_as::<_, Place>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                log::error!("Failed to list places: {}", e);
                PlacesError::DatabaseError(e.to_string())
            })?;

        self.attach_relations(places).await
    }

    async fn find_place(&self, id: Uuid) -> StoreResult<Option<Place>> {
        let sql = format!("SELECT {} FROM places WHERE id = $1", PLACE_COLUMNS);

        sqlx::query_as::<_, Place>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                log::error!("Database error fetching place {}: {}", id, e);
                PlacesError::DatabaseError(e.to_string())
            })
    }

    async fn find_place_detail(&self, id: Uuid) -> StoreResult<Option<PlaceDetail>> {
        let Some(place) = self.find_place(id).await? else {
            return Ok(None);
        };

        Ok(self.attach_relations(vec![place]).await?.pop())
    }

    async fn find_user_places(&self, user_id: Uuid) -> StoreResult<Option<UserWithPlaces>> {
        let user: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                log::error!("Database error fetching user {}: {}", user_id, e);
                PlacesError::DatabaseError(e.to_string())
            })?;

        let Some((id,)) = user else {
            log::warn!("User not found: {}", user_id);
            return Ok(None);
        };

        let places = sqlx::query_as::<_, PlaceRef>(
            r#"
            SELECT p.id, p.place_id
            FROM places p
            JOIN user_places up ON up.place_id = p.id
            WHERE up.user_id = $1
            ORDER BY up.created_at ASC, p.id ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!("Failed to fetch places for user {}: {}", id, e);
            PlacesError::DatabaseError(e.to_string())
        })?;

        Ok(Some(UserWithPlaces { id, places }))
    }

    async fn find_or_create_place(&self, req: &NewPlaceRequest) -> StoreResult<(Place, bool)> {
        // Insert first; on conflict do nothing so we can detect creation
        let insert_sql = format!(
            r#"
            INSERT INTO places (
                id, place_id, name, address, latitude, longitude, image_url,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW())
            ON CONFLICT (place_id) DO NOTHING
            RETURNING {}
            "#,
            PLACE_COLUMNS
        );

        let inserted = sqlx::query_as::<_, Place>(&insert_sql)
            .bind(Uuid::new_v4()) // $1
            .bind(&req.place_id) // $2
            .bind(&req.name) // $3
            .bind(&req.address) // $4
            .bind(req.latitude) // $5
            .bind(req.longitude) // $6
            .bind(&req.image_url) // $7
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                log::error!("Failed to insert place {}: {}", req.place_id, e);
                PlacesError::DatabaseError(e.to_string())
            })?;

        if let Some(place) = inserted {
            log::info!("Created place {} ({})", place.id, place.place_id);
            return Ok((place, true));
        }

        let select_sql = format!("SELECT {} FROM places WHERE place_id = $1", PLACE_COLUMNS);
        let existing = sqlx::query_as::<_, Place>(&select_sql)
            .bind(&req.place_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                log::error!("Failed to load existing place {}: {}", req.place_id, e);
                PlacesError::DatabaseError(e.to_string())
            })?;

        Ok((existing, false))
    }

    async fn find_or_create_user_place(
        &self,
        user_id: Uuid,
        place_id: Uuid,
    ) -> StoreResult<(UserPlace, bool)> {
        let inserted = sqlx::query_as::<_, UserPlace>(
            r#"
            INSERT INTO user_places (id, user_id, place_id, created_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (user_id, place_id) DO NOTHING
            RETURNING id, user_id, place_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(place_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_user_place_error(e, user_id, place_id))?;

        if let Some(user_place) = inserted {
            return Ok((user_place, true));
        }

        let existing = sqlx::query_as::<_, UserPlace>(
            r#"
            SELECT id, user_id, place_id, created_at
            FROM user_places
            WHERE user_id = $1 AND place_id = $2
            "#,
        )
        .bind(user_id)
        .bind(place_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            log::error!(
                "Failed to load user-place relation ({}, {}): {}",
                user_id,
                place_id,
                e
            );
            PlacesError::DatabaseError(e.to_string())
        })?;

        Ok((existing, false))
    }

    async fn remove_place(&self, id: Uuid) -> StoreResult<RemovalReport> {
        let mut tx = self.pool.begin().await?;

        // contents.place_id has no cascade, so it goes first
        let contents = sqlx::query("DELETE FROM contents WHERE place_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                log::error!("Failed to delete contents for place {}: {}", id, e);
                PlacesError::DatabaseError(e.to_string())
            })?;

        let places = sqlx::query("DELETE FROM places WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                log::error!("Failed to delete place {}: {}", id, e);
                PlacesError::DatabaseError(e.to_string())
            })?;

        if places.rows_affected() == 0 {
            tx.rollback().await?;
            log::warn!("Place not found for removal: {}", id);
            return Err(PlacesError::NotFound(format!("Place {}", id)));
        }

        tx.commit().await?;

        let report = RemovalReport {
            place_deleted: true,
            contents_deleted: contents.rows_affected(),
        };
        log::info!(
            "Removed place {} with {} contents",
            id,
            report.contents_deleted
        );
        Ok(report)
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
