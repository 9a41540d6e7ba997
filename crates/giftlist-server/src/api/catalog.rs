use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, normalize_paging, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct CategoryItem {
    id: &'static str,
    name: &'static str,
}

#[derive(Debug, Serialize)]
pub(super) struct ProductItem {
    sku: String,
    title: String,
    #[serde(with = "rust_decimal::serde::str")]
    price: Decimal,
    image_url: Option<String>,
    product_url: Option<String>,
    category: String,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(super) struct ProductPageData {
    items: Vec<ProductItem>,
    page: i64,
    page_size: i64,
    total_count: i64,
}

#[derive(Debug, Deserialize)]
pub(super) struct BrowseQuery {
    pub category: String,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SearchQuery {
    pub q: String,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

pub(super) async fn list_categories(
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<CategoryItem>>> {
    let data = giftlist_scraper::CATEGORIES
        .iter()
        .map(|c| CategoryItem {
            id: c.id,
            name: c.name,
        })
        .collect();

    Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    })
}

pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<BrowseQuery>,
) -> Result<Json<ApiResponse<ProductPageData>>, ApiError> {
    let (page, page_size) = normalize_paging(query.page, query.page_size);

    let result = giftlist_db::list_by_category(&state.pool, &query.category, page, page_size)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: to_page_data(result, page, page_size),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn search_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<ProductPageData>>, ApiError> {
    let term = query.q.trim();
    if term.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "search term must not be empty",
        ));
    }

    let (page, page_size) = normalize_paging(query.page, query.page_size);

    let result = giftlist_db::search_by_title(&state.pool, term, page, page_size)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: to_page_data(result, page, page_size),
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn to_page_data(result: giftlist_db::ProductPage, page: i64, page_size: i64) -> ProductPageData {
    ProductPageData {
        items: result
            .items
            .into_iter()
            .map(|row| ProductItem {
                sku: row.sku,
                title: row.title,
                price: row.price,
                image_url: row.image_url,
                product_url: row.product_url,
                category: row.category,
                updated_at: row.updated_at,
            })
            .collect(),
        page,
        page_size,
        total_count: result.total_count,
    }
}
