// src/auth.rs
// DOCUMENTATION: Bearer token verification
// PURPOSE: Turn an Authorization header into a typed, verified user id

use crate::errors::PlacesError;
use crate::services::ResponseMode;
use actix_web::{dev::Payload, error::InternalError, web, Error, FromRequest, HttpRequest};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};
use uuid::Uuid;

/// JWT claims issued by the accounts service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    #[serde(alias = "subject")]
    pub sub: String,
    /// Expiration time
    pub exp: usize,
}

/// Verifies HS256 tokens with the configured secret
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Decode the token and return the subject as a user id
    pub fn verify(&self, token: &str) -> Result<Uuid, PlacesError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            log::warn!("Rejected bearer token: {}", e);
            PlacesError::Unauthorized(format!("Invalid token: {}", e))
        })?;

        Uuid::parse_str(&data.claims.sub).map_err(|_| {
            log::warn!("Token subject is not a user id: {}", data.claims.sub);
            PlacesError::Unauthorized("Token subject is not a valid user id".to_string())
        })
    }
}

/// Verified caller identity, extracted per request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

fn bearer_token(req: &HttpRequest) -> Result<&str, PlacesError> {
    let header = req
        .headers()
        .get("Authorization")
        .ok_or_else(|| PlacesError::Unauthorized("Missing Authorization header".to_string()))?
        .to_str()
        .map_err(|_| PlacesError::Unauthorized("Invalid Authorization header".to_string()))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            PlacesError::Unauthorized("Authorization must use Bearer scheme".to_string())
        })
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = match req.app_data::<web::Data<JwtVerifier>>() {
            Some(verifier) => bearer_token(req).and_then(|token| verifier.verify(token)),
            None => {
                log::error!("JwtVerifier missing from application data");
                Err(PlacesError::Unauthorized("Authentication unavailable".to_string()))
            }
        };

        // Rejections follow the configured response mode like every other failure
        let mode = req
            .app_data::<web::Data<ResponseMode>>()
            .map(|m| *m.get_ref())
            .unwrap_or(ResponseMode::Legacy);

        ready(
            result
                .map(|user_id| AuthenticatedUser { user_id })
                .map_err(|e| {
                    let response = mode.failure(&e);
                    InternalError::from_response(e, response).into()
                }),
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    pub fn create_test_jwt(subject: &str, expires_in_seconds: i64, secret: &str) -> String {
        let exp = (chrono::Utc::now().timestamp() + expires_in_seconds) as usize;
        let claims = Claims {
            sub: subject.to_string(),
            exp,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_token_yields_user_id() {
        let id = Uuid::new_v4();
        let token = create_test_jwt(&id.to_string(), 3600, "secret");
        assert_eq!(JwtVerifier::new("secret").verify(&token), Ok(id));
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = create_test_jwt(&Uuid::new_v4().to_string(), -3600, "secret");
        let err = JwtVerifier::new("secret").verify(&token).unwrap_err();
        assert!(matches!(err, PlacesError::Unauthorized(_)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_test_jwt(&Uuid::new_v4().to_string(), 3600, "secret");
        assert!(JwtVerifier::new("other").verify(&token).is_err());
    }

    #[test]
    fn test_non_uuid_subject_rejected() {
        let token = create_test_jwt("user-123", 3600, "secret");
        assert!(JwtVerifier::new("secret").verify(&token).is_err());
    }

    #[test]
    fn test_subject_alias_accepted() {
        let claims: Claims = serde_json::from_value(serde_json::json!({
            "subject": "abc",
            "exp": 1
        }))
        .unwrap();
        assert_eq!(claims.sub, "abc");
    }
}
