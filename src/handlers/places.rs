// src/handlers/places.rs
// DOCUMENTATION: HTTP handlers for place operations
// PURPOSE: Parse requests, call services, return responses

use crate::auth::AuthenticatedUser;
use crate::db::PlaceStore;
use crate::errors::PlacesError;
use crate::models::{NewPlaceRequest, RemovalReport};
use crate::services::{PlaceService, ResponseMode};
use actix_web::{
    error::{InternalError, JsonPayloadError},
    http::StatusCode,
    web, Error, HttpRequest, HttpResponse,
};
use serde::Serialize;

/// Body of a successful DELETE /places/{id}
#[derive(Debug, Serialize)]
pub struct RemovePlaceResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub report: RemovalReport,
}

/// GET /places
/// List every place with its users and content ids
pub async fn get_all_places(
    store: web::Data<dyn PlaceStore>,
    mode: web::Data<ResponseMode>,
) -> HttpResponse {
    let result = PlaceService::get_all_places(store.get_ref()).await;
    mode.render(StatusCode::OK, result)
}

/// GET /places/{id}
/// Retrieve a single place row
pub async fn get_place(
    store: web::Data<dyn PlaceStore>,
    mode: web::Data<ResponseMode>,
    path: web::Path<String>,
) -> HttpResponse {
    let id = match PlaceService::parse_place_id(&path.into_inner()) {
        Ok(id) => id,
        Err(e) => return mode.failure(&e),
    };

    let result = PlaceService::get_place(store.get_ref(), id).await;
    mode.render_lookup(result, || PlacesError::NotFound(format!("Place {}", id)))
}

/// GET /places/user
/// Places linked to the authenticated user
pub async fn get_places_by_user(
    store: web::Data<dyn PlaceStore>,
    mode: web::Data<ResponseMode>,
    user: AuthenticatedUser,
) -> HttpResponse {
    let result = PlaceService::get_places_by_user(store.get_ref(), user.user_id).await;
    mode.render_lookup(result, || {
        PlacesError::NotFound(format!("User {}", user.user_id))
    })
}

/// POST /places
/// Add a place to the authenticated user's list
pub async fn add_place(
    store: web::Data<dyn PlaceStore>,
    mode: web::Data<ResponseMode>,
    user: AuthenticatedUser,
    req: web::Json<NewPlaceRequest>,
) -> HttpResponse {
    let result = PlaceService::add_place(store.get_ref(), user.user_id, req.into_inner()).await;
    mode.render(StatusCode::CREATED, result)
}

/// DELETE /places/{id}
/// Remove a place and its contents
pub async fn remove_place(
    store: web::Data<dyn PlaceStore>,
    mode: web::Data<ResponseMode>,
    path: web::Path<String>,
) -> HttpResponse {
    let id = match PlaceService::parse_place_id(&path.into_inner()) {
        Ok(id) => id,
        Err(e) => return mode.failure(&e),
    };

    match PlaceService::remove_place(store.get_ref(), id).await {
        Ok(report) => mode.success(
            StatusCode::OK,
            &RemovePlaceResponse {
                status: "Success",
                report,
            },
        ),
        Err(PlacesError::NotFound(_)) if mode.is_legacy() => {
            HttpResponse::Unauthorized().json(serde_json::json!({ "status": "Failed" }))
        }
        Err(e) => mode.failure(&e),
    }
}

/// Malformed JSON bodies become validation errors in the active response mode
fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> Error {
    let mode = req
        .app_data::<web::Data<ResponseMode>>()
        .map(|m| *m.get_ref())
        .unwrap_or(ResponseMode::Legacy);
    let places_error = PlacesError::ValidationError(err.to_string());
    let response = mode.failure(&places_error);
    InternalError::from_response(places_error, response).into()
}

/// Configuration for place routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/places")
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .route("", web::get().to(get_all_places))
            .route("", web::post().to(add_place))
            .route("/user", web::get().to(get_places_by_user))
            .route("/{id}", web::get().to(get_place))
            .route("/{id}", web::delete().to(remove_place)),
    );
}
