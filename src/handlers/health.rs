// src/handlers/health.rs
// DOCUMENTATION: Health check handler
// PURPOSE: Simple endpoint to verify service and store status

use crate::db::PlaceStore;
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

pub async fn health_check(store: web::Data<dyn PlaceStore>) -> impl Responder {
    let (mut response, status) = match store.health_check().await {
        Ok(()) => (HttpResponse::Ok(), "ok"),
        Err(e) => {
            log::error!("Health check failed: {}", e);
            (HttpResponse::ServiceUnavailable(), "unavailable")
        }
    };

    response.json(json!({
        "status": status,
        "service": "places-api",
        "store": store.backend_name(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryPlaceStore;
    use actix_web::{test, App};
    use serde_json::Value;
    use std::sync::Arc;

    #[actix_web::test]
    async fn test_health_reports_backend() {
        let store: Arc<dyn PlaceStore> = Arc::new(MemoryPlaceStore::new());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::from(store))
                .configure(config),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["store"], "memory");
    }
}
