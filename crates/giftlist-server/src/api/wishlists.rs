//! Owner-facing wishlist routes.
//!
//! Mutations are read-modify-write through the persistence port: load the
//! aggregate, apply the domain operation, store the whole aggregate back.
//! There is no login; callers identify the acting owner explicitly, and any
//! mismatch with the stored owner is rejected as forbidden.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use giftlist_core::{
    AddItemOutcome, OwnerContact, Product, RemoveItemOutcome, Wishlist, WishlistError,
};

use crate::middleware::RequestId;

use super::{map_db_error, map_wishlist_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct CreateWishlistBody {
    pub name: String,
    pub event_type: String,
    pub owner: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct OwnerQuery {
    pub owner: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct RenameBody {
    pub owner: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct AddItemBody {
    pub owner: String,
    /// Key of an already-ingested catalog product.
    pub sku: Option<String>,
    /// Ad-hoc snapshot for gifts that are not in the catalog.
    pub product: Option<Product>,
    pub quantity: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SetQuantityBody {
    pub owner: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub(super) struct ShareBody {
    pub owner: String,
    pub contact: OwnerContact,
}

#[derive(Debug, Serialize)]
pub(super) struct AddItemData {
    pub wishlist: Wishlist,
    pub already_present: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct RemoveItemData {
    pub wishlist: Wishlist,
    pub removed: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct ShareData {
    pub share_id: Uuid,
    pub wishlist: Wishlist,
}

/// Loads the aggregate, mapping a missing row to the domain's not-found.
async fn load_wishlist(state: &AppState, req_id: &str, id: Uuid) -> Result<Wishlist, ApiError> {
    giftlist_db::get_wishlist(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.to_string(), &e))?
        .ok_or_else(|| map_wishlist_error(req_id.to_string(), &WishlistError::NotFound))
}

fn require_owner(wishlist: &Wishlist, owner: &str, req_id: &str) -> Result<(), ApiError> {
    if wishlist.is_owned_by(owner) {
        Ok(())
    } else {
        Err(map_wishlist_error(
            req_id.to_string(),
            &WishlistError::Forbidden,
        ))
    }
}

async fn store_wishlist(
    state: &AppState,
    req_id: &str,
    wishlist: &Wishlist,
) -> Result<(), ApiError> {
    giftlist_db::put_wishlist(&state.pool, wishlist)
        .await
        .map_err(|e| map_db_error(req_id.to_string(), &e))
}

pub(super) async fn create_wishlist(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateWishlistBody>,
) -> Result<(StatusCode, Json<ApiResponse<Wishlist>>), ApiError> {
    let wishlist = Wishlist::create(&body.name, &body.event_type, &body.owner)
        .map_err(|e| map_wishlist_error(req_id.0.clone(), &e))?;

    store_wishlist(&state, &req_id.0, &wishlist).await?;
    tracing::info!(wishlist_id = %wishlist.id, owner = %wishlist.owner_username, "wishlist created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: wishlist,
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

pub(super) async fn list_wishlists(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<ApiResponse<Vec<Wishlist>>>, ApiError> {
    let data = giftlist_db::list_wishlists_by_owner(&state.pool, &query.owner)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_wishlist(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Wishlist>>, ApiError> {
    let wishlist = load_wishlist(&state, &req_id.0, id).await?;

    Ok(Json(ApiResponse {
        data: wishlist,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn rename_wishlist(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<RenameBody>,
) -> Result<Json<ApiResponse<Wishlist>>, ApiError> {
    let mut wishlist = load_wishlist(&state, &req_id.0, id).await?;
    require_owner(&wishlist, &body.owner, &req_id.0)?;

    wishlist
        .rename(&body.name)
        .map_err(|e| map_wishlist_error(req_id.0.clone(), &e))?;
    store_wishlist(&state, &req_id.0, &wishlist).await?;

    Ok(Json(ApiResponse {
        data: wishlist,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn delete_wishlist(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Query(query): Query<OwnerQuery>,
) -> Result<StatusCode, ApiError> {
    let wishlist = load_wishlist(&state, &req_id.0, id).await?;
    require_owner(&wishlist, &query.owner, &req_id.0)?;

    giftlist_db::delete_wishlist(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    tracing::info!(wishlist_id = %id, "wishlist deleted");

    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn add_item(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<AddItemBody>,
) -> Result<Json<ApiResponse<AddItemData>>, ApiError> {
    let mut wishlist = load_wishlist(&state, &req_id.0, id).await?;
    require_owner(&wishlist, &body.owner, &req_id.0)?;

    let product = match (body.sku, body.product) {
        (Some(sku), None) => giftlist_db::find_by_sku(&state.pool, &sku)
            .await
            .map_err(|e| map_db_error(req_id.0.clone(), &e))?
            .map(Product::from)
            .ok_or_else(|| {
                ApiError::new(req_id.0.clone(), "not_found", "no catalog product with that sku")
            })?,
        (None, Some(product)) => product,
        _ => {
            return Err(ApiError::new(
                req_id.0,
                "validation_error",
                "provide exactly one of `sku` or `product`",
            ));
        }
    };

    let outcome = wishlist.add_item(&product, body.quantity.unwrap_or(1));
    let already_present = outcome == AddItemOutcome::AlreadyPresent;
    if !already_present {
        store_wishlist(&state, &req_id.0, &wishlist).await?;
    }

    Ok(Json(ApiResponse {
        data: AddItemData {
            wishlist,
            already_present,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn remove_item(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((id, product_key)): Path<(Uuid, String)>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<ApiResponse<RemoveItemData>>, ApiError> {
    let mut wishlist = load_wishlist(&state, &req_id.0, id).await?;
    require_owner(&wishlist, &query.owner, &req_id.0)?;

    let removed = wishlist.remove_item(&product_key) == RemoveItemOutcome::Removed;
    if removed {
        store_wishlist(&state, &req_id.0, &wishlist).await?;
    }

    Ok(Json(ApiResponse {
        data: RemoveItemData { wishlist, removed },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn set_item_quantity(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((id, product_key)): Path<(Uuid, String)>,
    Json(body): Json<SetQuantityBody>,
) -> Result<Json<ApiResponse<Wishlist>>, ApiError> {
    let mut wishlist = load_wishlist(&state, &req_id.0, id).await?;
    require_owner(&wishlist, &body.owner, &req_id.0)?;

    if !wishlist.set_quantity(&product_key, body.quantity) {
        return Err(ApiError::new(
            req_id.0,
            "not_found",
            "no item with that product key",
        ));
    }
    store_wishlist(&state, &req_id.0, &wishlist).await?;

    Ok(Json(ApiResponse {
        data: wishlist,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn share_wishlist(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<ShareBody>,
) -> Result<Json<ApiResponse<ShareData>>, ApiError> {
    let mut wishlist = load_wishlist(&state, &req_id.0, id).await?;
    require_owner(&wishlist, &body.owner, &req_id.0)?;

    let share_id = wishlist
        .attach_owner_contact(body.contact)
        .map_err(|e| map_wishlist_error(req_id.0.clone(), &e))?;
    store_wishlist(&state, &req_id.0, &wishlist).await?;
    tracing::info!(wishlist_id = %id, share_id = %share_id, "wishlist shared");

    Ok(Json(ApiResponse {
        data: ShareData { share_id, wishlist },
        meta: ResponseMeta::new(req_id.0),
    }))
}
