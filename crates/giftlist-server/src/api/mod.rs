mod catalog;
mod shared;
mod wishlists;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{request_id, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "forbidden" => StatusCode::FORBIDDEN,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Normalizes 1-based paging params: page defaults to 1, page size to 20,
/// capped at 100.
pub(super) fn normalize_paging(page: Option<i64>, page_size: Option<i64>) -> (i64, i64) {
    (page.unwrap_or(1).max(1), page_size.unwrap_or(20).clamp(1, 100))
}

pub(super) fn map_db_error(request_id: String, error: &giftlist_db::DbError) -> ApiError {
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

pub(super) fn map_wishlist_error(
    request_id: String,
    error: &giftlist_core::WishlistError,
) -> ApiError {
    match error {
        giftlist_core::WishlistError::Validation(message) => {
            ApiError::new(request_id, "validation_error", message.clone())
        }
        giftlist_core::WishlistError::NotFound => {
            ApiError::new(request_id, "not_found", "wishlist not found")
        }
        giftlist_core::WishlistError::Forbidden => ApiError::new(
            request_id,
            "forbidden",
            "only the owner may modify this wishlist",
        ),
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/categories", get(catalog::list_categories))
        .route("/api/v1/products", get(catalog::list_products))
        .route("/api/v1/products/search", get(catalog::search_products))
        .route(
            "/api/v1/wishlists",
            get(wishlists::list_wishlists).post(wishlists::create_wishlist),
        )
        .route(
            "/api/v1/wishlists/{id}",
            get(wishlists::get_wishlist)
                .patch(wishlists::rename_wishlist)
                .delete(wishlists::delete_wishlist),
        )
        .route("/api/v1/wishlists/{id}/items", post(wishlists::add_item))
        .route(
            "/api/v1/wishlists/{id}/items/{product_key}",
            delete(wishlists::remove_item),
        )
        .route(
            "/api/v1/wishlists/{id}/items/{product_key}/quantity",
            put(wishlists::set_item_quantity),
        )
        .route("/api/v1/wishlists/{id}/share", post(wishlists::share_wishlist))
        .route("/api/v1/shared/{share_id}", get(shared::get_shared_wishlist))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match giftlist_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use giftlist_core::Product;
    use rust_decimal::Decimal;
    use tower::ServiceExt;

    #[test]
    fn normalize_paging_applies_defaults_and_bounds() {
        assert_eq!(normalize_paging(None, None), (1, 20));
        assert_eq!(normalize_paging(Some(0), Some(0)), (1, 1));
        assert_eq!(normalize_paging(Some(3), Some(1_000)), (3, 100));
        assert_eq!(normalize_paging(Some(2), Some(25)), (2, 25));
    }

    #[test]
    fn api_error_forbidden_maps_to_403() {
        let response = ApiError::new("req-1", "forbidden", "not the owner").into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn api_error_validation_error_maps_to_bad_request() {
        let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn wishlist_errors_map_to_expected_codes() {
        let not_found = map_wishlist_error("r".into(), &giftlist_core::WishlistError::NotFound);
        assert_eq!(not_found.error.code, "not_found");

        let forbidden = map_wishlist_error("r".into(), &giftlist_core::WishlistError::Forbidden);
        assert_eq!(forbidden.error.code, "forbidden");

        let validation = map_wishlist_error(
            "r".into(),
            &giftlist_core::WishlistError::Validation("blank name".into()),
        );
        assert_eq!(validation.error.code, "validation_error");
        assert_eq!(validation.error.message, "blank name");
    }

    async fn seed_product(pool: &sqlx::PgPool, sku: &str, title: &str, price_cents: i64) {
        let product = Product {
            sku: sku.to_string(),
            title: title.to_string(),
            price: Decimal::new(price_cents, 2),
            image_url: Some(format!("https://melcom.com/media/{sku}.jpg")),
            product_url: None,
            category: "Home Appliances".to_string(),
        };
        giftlist_db::insert_product_if_absent(pool, &product)
            .await
            .expect("seed product");
    }

    async fn get_json(
        app: Router,
        uri: &str,
    ) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json = serde_json::from_slice(&body).expect("json parse");
        (status, json)
    }

    async fn send_json(
        app: Router,
        method: Method,
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json = serde_json::from_slice(&bytes).expect("json parse");
        (status, json)
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn categories_lists_the_known_table(pool: sqlx::PgPool) {
        let app = build_app(AppState { pool });
        let (status, json) = get_json(app, "/api/v1/categories").await;

        assert_eq!(status, StatusCode::OK);
        let data = json["data"].as_array().expect("data array");
        assert_eq!(data.len(), 11);
        assert!(data
            .iter()
            .any(|c| c["name"] == "ELECTRICAL APPLIANCES" && c["id"] == "1289"));
        assert!(json["meta"]["request_id"].is_string());
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn products_browse_pages_by_category(pool: sqlx::PgPool) {
        seed_product(&pool, "MEL-1", "Microwave", 80_000).await;
        seed_product(&pool, "MEL-2", "Kettle", 12_000).await;

        let app = build_app(AppState { pool });
        let (status, json) = get_json(
            app,
            "/api/v1/products?category=Home%20Appliances&page=1&page_size=1",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["total_count"], 2);
        let items = json["data"]["items"].as_array().expect("items");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["title"], "Microwave");
        assert_eq!(items[0]["price"], "800.00");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn products_search_matches_substring(pool: sqlx::PgPool) {
        seed_product(&pool, "MEL-3", "Binatone Blender", 25_000).await;
        seed_product(&pool, "MEL-4", "Hand Mixer", 18_000).await;

        let app = build_app(AppState { pool });
        let (status, json) = get_json(app, "/api/v1/products/search?q=blend").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["total_count"], 1);
        assert_eq!(json["data"]["items"][0]["sku"], "MEL-3");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn products_search_requires_a_term(pool: sqlx::PgPool) {
        let app = build_app(AppState { pool });
        let (status, json) = get_json(app, "/api/v1/products/search?q=%20").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn wishlist_lifecycle_over_http(pool: sqlx::PgPool) {
        seed_product(&pool, "MEL-10", "Blender", 25_000).await;
        let app = build_app(AppState { pool });

        // Create.
        let (status, json) = send_json(
            app.clone(),
            Method::POST,
            "/api/v1/wishlists",
            serde_json::json!({
                "name": "Ama's Birthday",
                "event_type": "birthday",
                "owner": "kofi"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = json["data"]["id"].as_str().expect("wishlist id").to_string();
        assert_eq!(json["data"]["total_price"], "0");

        // Add a catalog item by sku.
        let (status, json) = send_json(
            app.clone(),
            Method::POST,
            &format!("/api/v1/wishlists/{id}/items"),
            serde_json::json!({ "owner": "kofi", "sku": "MEL-10", "quantity": 1 }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["already_present"], false);
        assert_eq!(json["data"]["wishlist"]["total_price"], "250.00");

        // Adding the same key again reports already_present and changes nothing.
        let (status, json) = send_json(
            app.clone(),
            Method::POST,
            &format!("/api/v1/wishlists/{id}/items"),
            serde_json::json!({ "owner": "kofi", "sku": "MEL-10", "quantity": 5 }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["already_present"], true);
        assert_eq!(json["data"]["wishlist"]["total_price"], "250.00");

        // Bump the quantity.
        let (status, json) = send_json(
            app.clone(),
            Method::PUT,
            &format!("/api/v1/wishlists/{id}/items/MEL-10/quantity"),
            serde_json::json!({ "owner": "kofi", "quantity": 3 }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["total_price"], "750.00");

        // Share and fetch the public view.
        let (status, json) = send_json(
            app.clone(),
            Method::POST,
            &format!("/api/v1/wishlists/{id}/share"),
            serde_json::json!({
                "owner": "kofi",
                "contact": { "name": "Kofi Mensah", "email": "kofi@example.com" }
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let share_id = json["data"]["share_id"].as_str().expect("share id").to_string();

        let (status, json) = get_json(app.clone(), &format!("/api/v1/shared/{share_id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["name"], "Ama's Birthday");
        assert_eq!(json["data"]["owner_contact"]["name"], "Kofi Mensah");

        // Remove the item, then delete the list.
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri(format!("/api/v1/wishlists/{id}/items/MEL-10?owner=kofi"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri(format!("/api/v1/wishlists/{id}?owner=kofi"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        // The share link dies with the wishlist.
        let (status, _) = get_json(app, &format!("/api/v1/shared/{share_id}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn wishlist_mutation_by_non_owner_is_forbidden(pool: sqlx::PgPool) {
        let app = build_app(AppState { pool });

        let (status, json) = send_json(
            app.clone(),
            Method::POST,
            "/api/v1/wishlists",
            serde_json::json!({ "name": "Wedding", "event_type": "wedding", "owner": "kofi" }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = json["data"]["id"].as_str().expect("id").to_string();

        let (status, json) = send_json(
            app,
            Method::PATCH,
            &format!("/api/v1/wishlists/{id}"),
            serde_json::json!({ "owner": "ama", "name": "Hijacked" }),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["error"]["code"], "forbidden");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn unknown_wishlist_returns_404(pool: sqlx::PgPool) {
        let app = build_app(AppState { pool });
        let (status, json) = get_json(
            app,
            "/api/v1/wishlists/00000000-0000-0000-0000-000000000000",
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "not_found");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn create_wishlist_with_blank_name_is_rejected(pool: sqlx::PgPool) {
        let app = build_app(AppState { pool });
        let (status, json) = send_json(
            app,
            Method::POST,
            "/api/v1/wishlists",
            serde_json::json!({ "name": "   ", "event_type": "birthday", "owner": "kofi" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
    }
}
