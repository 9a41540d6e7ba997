use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A catalog entry scraped from the retailer and normalized for storage.
///
/// `sku` is the dedupe key: either the SKU embedded in the listing markup or
/// a deterministic substitute derived from title and category. It is unique
/// within the catalog store; ingest never creates two rows with the same key.
///
/// `price` is always numeric. The source markup carries formatted strings
/// with a currency glyph and thousands separators; those are stripped at the
/// parse boundary and never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub sku: String,
    pub title: String,
    pub price: Decimal,
    pub image_url: Option<String>,
    /// Link back to the source listing, when the card carried one.
    pub product_url: Option<String>,
    pub category: String,
}

impl Product {
    /// Returns `true` when the entry carries everything the storefront UI
    /// needs to render a card (image included).
    #[must_use]
    pub fn is_displayable(&self) -> bool {
        !self.title.is_empty() && self.image_url.is_some()
    }
}
