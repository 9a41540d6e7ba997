//! The wishlist persistence port: load and store whole aggregates.
//!
//! Mutation logic lives in `giftlist_core::Wishlist`; this module only
//! rehydrates aggregates from rows and writes them back. `total_price` is
//! never stored — it is recomputed from the item rows on every load, so the
//! stored state can never contradict the derived total.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use giftlist_core::{OwnerContact, Wishlist, WishlistItem};

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
struct WishlistRow {
    id: Uuid,
    name: String,
    event_type: String,
    owner_username: String,
    share_id: Option<Uuid>,
    contact_name: Option<String>,
    contact_email: Option<String>,
    contact_phone: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct WishlistItemRow {
    wishlist_id: Uuid,
    product_key: String,
    title: String,
    price: Decimal,
    image_url: Option<String>,
    product_url: Option<String>,
    category: Option<String>,
    quantity: i32,
    added_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

const HEADER_COLUMNS: &str = "id, name, event_type, owner_username, share_id, \
     contact_name, contact_email, contact_phone, created_at";

const ITEM_COLUMNS: &str = "wishlist_id, product_key, title, price, image_url, product_url, \
     category, quantity, added_at, updated_at";

/// Loads a wishlist aggregate by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a query fails.
pub async fn get_wishlist(pool: &PgPool, id: Uuid) -> Result<Option<Wishlist>, DbError> {
    let row = sqlx::query_as::<_, WishlistRow>(&format!(
        "SELECT {HEADER_COLUMNS} FROM wishlists WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let items = fetch_items(pool, &[id]).await?.remove(&id).unwrap_or_default();
    Ok(Some(hydrate(row, items)))
}

/// Loads a wishlist aggregate by its public share id.
///
/// This is the shared view's lookup: it is owner-agnostic by design, and a
/// deleted wishlist takes its share id with it, so stale links miss here.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a query fails.
pub async fn find_by_share_id(pool: &PgPool, share_id: Uuid) -> Result<Option<Wishlist>, DbError> {
    let row = sqlx::query_as::<_, WishlistRow>(&format!(
        "SELECT {HEADER_COLUMNS} FROM wishlists WHERE share_id = $1"
    ))
    .bind(share_id)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let id = row.id;
    let items = fetch_items(pool, &[id]).await?.remove(&id).unwrap_or_default();
    Ok(Some(hydrate(row, items)))
}

/// Lists all wishlists owned by `username`, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a query fails.
pub async fn list_wishlists_by_owner(
    pool: &PgPool,
    username: &str,
) -> Result<Vec<Wishlist>, DbError> {
    let rows = sqlx::query_as::<_, WishlistRow>(&format!(
        "SELECT {HEADER_COLUMNS} FROM wishlists \
         WHERE owner_username = $1 \
         ORDER BY created_at ASC, id ASC"
    ))
    .bind(username)
    .fetch_all(pool)
    .await?;

    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let mut items_by_list = fetch_items(pool, &ids).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let items = items_by_list.remove(&row.id).unwrap_or_default();
            hydrate(row, items)
        })
        .collect())
}

/// Writes a whole aggregate: header upsert plus item-set replacement, in one
/// transaction. Either everything lands or nothing does — a failed store
/// never leaves a half-written item set.
///
/// `event_type`, `owner_username`, and `created_at` are set at insert and
/// never updated afterward; they are immutable in the domain.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement in the transaction fails.
pub async fn put_wishlist(pool: &PgPool, wishlist: &Wishlist) -> Result<(), DbError> {
    let contact = wishlist.owner_contact.as_ref();
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO wishlists \
             (id, name, event_type, owner_username, share_id, \
              contact_name, contact_email, contact_phone, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         ON CONFLICT (id) DO UPDATE SET \
             name          = EXCLUDED.name, \
             share_id      = EXCLUDED.share_id, \
             contact_name  = EXCLUDED.contact_name, \
             contact_email = EXCLUDED.contact_email, \
             contact_phone = EXCLUDED.contact_phone",
    )
    .bind(wishlist.id)
    .bind(&wishlist.name)
    .bind(&wishlist.event_type)
    .bind(&wishlist.owner_username)
    .bind(wishlist.share_id)
    .bind(contact.map(|c| c.name.clone()))
    .bind(contact.and_then(|c| c.email.clone()))
    .bind(contact.and_then(|c| c.phone.clone()))
    .bind(wishlist.created_at)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM wishlist_items WHERE wishlist_id = $1")
        .bind(wishlist.id)
        .execute(&mut *tx)
        .await?;

    for (position, item) in wishlist.items.iter().enumerate() {
        sqlx::query(
            "INSERT INTO wishlist_items \
                 (wishlist_id, product_key, title, price, image_url, product_url, \
                  category, quantity, position, added_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(wishlist.id)
        .bind(&item.product_key)
        .bind(&item.title)
        .bind(item.price)
        .bind(&item.image_url)
        .bind(&item.product_url)
        .bind(&item.category)
        .bind(i32::try_from(item.quantity).unwrap_or(i32::MAX))
        .bind(i32::try_from(position).unwrap_or(i32::MAX))
        .bind(item.added_at)
        .bind(item.updated_at)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Deletes a wishlist and, via cascade, its items. Returns `true` if a row
/// was deleted. The share id dies with the row, which is what invalidates
/// previously issued share links.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_wishlist(pool: &PgPool, id: Uuid) -> Result<bool, DbError> {
    let rows_affected = sqlx::query("DELETE FROM wishlists WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();

    Ok(rows_affected > 0)
}

async fn fetch_items(
    pool: &PgPool,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<WishlistItem>>, DbError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query_as::<_, WishlistItemRow>(&format!(
        "SELECT {ITEM_COLUMNS} FROM wishlist_items \
         WHERE wishlist_id = ANY($1) \
         ORDER BY wishlist_id, position ASC"
    ))
    .bind(ids)
    .fetch_all(pool)
    .await?;

    let mut grouped: HashMap<Uuid, Vec<WishlistItem>> = HashMap::new();
    for row in rows {
        grouped
            .entry(row.wishlist_id)
            .or_default()
            .push(WishlistItem {
                product_key: row.product_key,
                title: row.title,
                price: row.price,
                image_url: row.image_url,
                product_url: row.product_url,
                category: row.category,
                quantity: u32::try_from(row.quantity).unwrap_or(1),
                added_at: row.added_at,
                updated_at: row.updated_at,
            });
    }
    Ok(grouped)
}

fn hydrate(row: WishlistRow, items: Vec<WishlistItem>) -> Wishlist {
    let owner_contact = row.contact_name.map(|name| OwnerContact {
        name,
        email: row.contact_email,
        phone: row.contact_phone,
    });

    let mut wishlist = Wishlist {
        id: row.id,
        name: row.name,
        event_type: row.event_type,
        owner_username: row.owner_username,
        items,
        total_price: Decimal::ZERO,
        share_id: row.share_id,
        owner_contact,
        created_at: row.created_at,
    };
    wishlist.total_price = wishlist.computed_total();
    wishlist
}
