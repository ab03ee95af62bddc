// src/services/response.rs
// DOCUMENTATION: Status code contract for the places endpoints
// PURPOSE: Render service results in the legacy or the standard mapping

use crate::errors::PlacesError;
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;
use std::str::FromStr;

/// How results are turned into HTTP responses
///
/// `Legacy` answers 201 for every success and 401 for every failure, which is
/// what existing mobile clients were built against. `Standard` uses the status
/// of each error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    Legacy,
    Standard,
}

impl FromStr for ResponseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(ResponseMode::Legacy),
            "standard" => Ok(ResponseMode::Standard),
            other => Err(format!("unknown RESPONSE_MODE '{}'", other)),
        }
    }
}

impl ResponseMode {
    pub fn is_legacy(&self) -> bool {
        matches!(self, ResponseMode::Legacy)
    }

    /// Success response; `status` applies in standard mode only
    pub fn success<T: Serialize>(&self, status: StatusCode, body: &T) -> HttpResponse {
        match self {
            ResponseMode::Legacy => HttpResponse::Created().json(body),
            ResponseMode::Standard => HttpResponse::build(status).json(body),
        }
    }

    pub fn failure(&self, err: &PlacesError) -> HttpResponse {
        match self {
            ResponseMode::Legacy => HttpResponse::Unauthorized().json(err.legacy_body()),
            ResponseMode::Standard => err.error_response(),
        }
    }

    pub fn render<T: Serialize>(
        &self,
        status: StatusCode,
        result: Result<T, PlacesError>,
    ) -> HttpResponse {
        match result {
            Ok(body) => self.success(status, &body),
            Err(e) => self.failure(&e),
        }
    }

    /// Lookup by id. Legacy answers a missing row with an empty body,
    /// standard mode turns it into NotFound.
    pub fn render_lookup<T: Serialize>(
        &self,
        result: Result<Option<T>, PlacesError>,
        missing: impl FnOnce() -> PlacesError,
    ) -> HttpResponse {
        match (self, result) {
            (ResponseMode::Standard, Ok(None)) => self.failure(&missing()),
            (_, result) => self.render(StatusCode::OK, result),
        }
    }
}
