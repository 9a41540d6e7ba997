//! Database operations for the `products` catalog table.
//!
//! This is the product persistence port: atomic insert-if-absent for the
//! ingest pipeline, key lookup, and the two paged read queries the UI-facing
//! service layer uses (browse by category, free-text title search).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub sku: String,
    pub title: String,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub product_url: Option<String>,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for giftlist_core::Product {
    fn from(row: ProductRow) -> Self {
        Self {
            sku: row.sku,
            title: row.title,
            price: row.price,
            image_url: row.image_url,
            product_url: row.product_url,
            category: row.category,
        }
    }
}

/// One page of catalog results plus the total match count.
#[derive(Debug, Clone)]
pub struct ProductPage {
    pub items: Vec<ProductRow>,
    pub total_count: i64,
}

const SELECT_COLUMNS: &str =
    "id, sku, title, price, image_url, product_url, category, created_at, updated_at";

/// Inserts a catalog entry unless a row with the same dedupe key exists.
///
/// A single `ON CONFLICT DO NOTHING` statement, so two concurrent ingests of
/// the same category cannot race a separate check-then-insert into a
/// double insert. Returns `true` if a row was inserted, `false` if the key
/// was already present.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_product_if_absent(
    pool: &PgPool,
    product: &giftlist_core::Product,
) -> Result<bool, DbError> {
    let rows_affected = sqlx::query(
        "INSERT INTO products (sku, title, price, image_url, product_url, category) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT (sku) DO NOTHING",
    )
    .bind(&product.sku)
    .bind(&product.title)
    .bind(product.price)
    .bind(&product.image_url)
    .bind(&product.product_url)
    .bind(&product.category)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(rows_affected > 0)
}

/// Looks up a catalog entry by its dedupe key.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_by_sku(pool: &PgPool, sku: &str) -> Result<Option<ProductRow>, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM products WHERE sku = $1"
    ))
    .bind(sku)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Lists one page of a category, most expensive first (the storefront's
/// browse order), along with the total number of rows in the category.
///
/// `page` is 1-based; both `page` and `page_size` are clamped to sane ranges.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either query fails.
pub async fn list_by_category(
    pool: &PgPool,
    category: &str,
    page: i64,
    page_size: i64,
) -> Result<ProductPage, DbError> {
    let (limit, offset) = page_bounds(page, page_size);

    let total_count: i64 =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE category = $1")
            .bind(category)
            .fetch_one(pool)
            .await?;

    let items = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM products \
         WHERE category = $1 \
         ORDER BY price DESC, id ASC \
         LIMIT $2 OFFSET $3"
    ))
    .bind(category)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(ProductPage { items, total_count })
}

/// Case-insensitive substring search over titles, paged like
/// [`list_by_category`].
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either query fails.
pub async fn search_by_title(
    pool: &PgPool,
    term: &str,
    page: i64,
    page_size: i64,
) -> Result<ProductPage, DbError> {
    let (limit, offset) = page_bounds(page, page_size);
    let pattern = format!("%{}%", escape_like(term));

    let total_count: i64 =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE title ILIKE $1")
            .bind(&pattern)
            .fetch_one(pool)
            .await?;

    let items = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM products \
         WHERE title ILIKE $1 \
         ORDER BY price DESC, id ASC \
         LIMIT $2 OFFSET $3"
    ))
    .bind(&pattern)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(ProductPage { items, total_count })
}

fn page_bounds(page: i64, page_size: i64) -> (i64, i64) {
    let page = page.max(1);
    let limit = page_size.clamp(1, 100);
    (limit, (page - 1) * limit)
}

/// Escapes LIKE metacharacters so a search term matches literally.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
