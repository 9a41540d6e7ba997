//! The public share view: anyone holding a share link may read the wishlist.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use giftlist_core::Wishlist;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

pub(super) async fn get_shared_wishlist(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(share_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Wishlist>>, ApiError> {
    let wishlist = giftlist_db::find_by_share_id(&state.pool, share_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| {
            ApiError::new(req_id.0.clone(), "not_found", "no wishlist for that share link")
        })?;

    Ok(Json(ApiResponse {
        data: wishlist,
        meta: ResponseMeta::new(req_id.0),
    }))
}
