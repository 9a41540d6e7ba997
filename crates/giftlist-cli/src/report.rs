//! Row-count report over the catalog and wishlist tables.

use sqlx::PgPool;

/// Prints catalog and wishlist counts, with a per-category breakdown.
///
/// # Errors
///
/// Fails if any count query fails.
pub async fn print_report(pool: &PgPool) -> anyhow::Result<()> {
    let products: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await?;
    let wishlists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM wishlists")
        .fetch_one(pool)
        .await?;
    let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM wishlist_items")
        .fetch_one(pool)
        .await?;
    let shared: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM wishlists WHERE share_id IS NOT NULL")
            .fetch_one(pool)
            .await?;

    println!("products:  {products}");
    println!("wishlists: {wishlists} ({shared} shared)");
    println!("items:     {items}");

    let by_category: Vec<(String, i64)> = sqlx::query_as(
        "SELECT category, COUNT(*) FROM products GROUP BY category ORDER BY COUNT(*) DESC",
    )
    .fetch_all(pool)
    .await?;

    if !by_category.is_empty() {
        println!();
        println!("catalog by category:");
        for (category, count) in by_category {
            println!("  {category}: {count}");
        }
    }

    Ok(())
}
