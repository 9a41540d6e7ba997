//! The catalog ingest runner: fetch rendered listing pages, parse the cards,
//! and insert each product unless its dedupe key is already stored.
//!
//! Per-category failures are logged and the batch moves on; the run only
//! fails outright when every requested category failed.

use std::time::Duration;

use giftlist_core::AppConfig;
use giftlist_scraper::{find_category, Category, ProxyClient, ScraperError, CATEGORIES};
use sqlx::PgPool;

/// Totals for one ingest run. `skipped` counts cards whose dedupe key was
/// already in the catalog.
#[derive(Debug, Default, Clone, Copy)]
pub struct IngestSummary {
    pub inserted: u64,
    pub skipped: u64,
}

impl IngestSummary {
    fn absorb(&mut self, other: IngestSummary) {
        self.inserted += other.inserted;
        self.skipped += other.skipped;
    }
}

/// Runs the pipeline over one category (by id) or all known categories.
///
/// # Errors
///
/// Fails on an unknown category id, on client construction failure, or when
/// every requested category failed to ingest.
pub async fn run_ingest(
    pool: &PgPool,
    config: &AppConfig,
    category_filter: Option<&str>,
    max_pages_override: Option<u32>,
) -> anyhow::Result<()> {
    let categories = resolve_categories(category_filter)?;
    let client = ProxyClient::from_config(config)?;
    let max_pages = max_pages_override
        .unwrap_or(config.scraper_max_pages_per_category)
        .max(1);
    let delay = Duration::from_millis(config.scraper_inter_request_delay_ms);

    let mut totals = IngestSummary::default();
    let mut failed: usize = 0;

    for category in &categories {
        match ingest_category(pool, &client, category, max_pages, delay).await {
            Ok(summary) => {
                tracing::info!(
                    category = category.name,
                    inserted = summary.inserted,
                    skipped = summary.skipped,
                    "category ingested"
                );
                totals.absorb(summary);
            }
            Err(e) => {
                tracing::error!(category = category.name, error = %e, "category ingest failed");
                failed += 1;
            }
        }
    }

    if failed == categories.len() {
        anyhow::bail!("all {failed} categories failed to ingest");
    }

    println!(
        "ingest complete: {} inserted, {} already present, {} of {} categories failed",
        totals.inserted,
        totals.skipped,
        failed,
        categories.len()
    );
    Ok(())
}

/// Ingests one category: pages `1..=max_pages`, stopping early at the first
/// page that yields no cards.
///
/// # Errors
///
/// Propagates fetch errors and insert failures; per-card parse anomalies are
/// already skipped inside the parser.
pub async fn ingest_category(
    pool: &PgPool,
    client: &ProxyClient,
    category: &Category,
    max_pages: u32,
    delay: Duration,
) -> anyhow::Result<IngestSummary> {
    let mut summary = IngestSummary::default();

    for page in 1..=max_pages {
        if page > 1 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let html = client.fetch_category_page(category.id, page).await?;
        let products = giftlist_scraper::parse_category_products(&html, category.name);
        if products.is_empty() {
            tracing::debug!(category = category.name, page, "no cards on page, stopping");
            break;
        }

        for product in &products {
            if giftlist_db::insert_product_if_absent(pool, product).await? {
                summary.inserted += 1;
            } else {
                summary.skipped += 1;
            }
        }
        tracing::debug!(category = category.name, page, cards = products.len(), "page ingested");
    }

    Ok(summary)
}

/// Fetches a single product detail page and prints the parsed entry as JSON.
/// Diagnostic only; nothing is written to the database.
///
/// # Errors
///
/// Fails on fetch or parse errors.
pub async fn inspect_product_page(
    config: &AppConfig,
    url: &str,
    category_filter: Option<&str>,
) -> anyhow::Result<()> {
    let category_name = match category_filter {
        Some(id) => {
            find_category(id)
                .ok_or_else(|| ScraperError::UnknownCategory(id.to_string()))?
                .name
        }
        None => "UNCATEGORIZED",
    };

    let client = ProxyClient::from_config(config)?;
    let html = client.fetch_product_page(url).await?;
    let detail = giftlist_scraper::parse_product_page(&html)?;
    let product = detail.into_product(category_name);

    println!("{}", serde_json::to_string_pretty(&product)?);
    Ok(())
}

fn resolve_categories(filter: Option<&str>) -> Result<Vec<Category>, ScraperError> {
    match filter {
        Some(id) => {
            let category =
                find_category(id).ok_or_else(|| ScraperError::UnknownCategory(id.to_string()))?;
            Ok(vec![*category])
        }
        None => Ok(CATEGORIES.to_vec()),
    }
}
