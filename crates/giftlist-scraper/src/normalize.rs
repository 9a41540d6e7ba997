//! Normalization from scraped price text and card fields to canonical values.
//!
//! Prices arrive as display strings ("₵1,234.50", sometimes with sale and
//! original prices side by side); canonical storage is numeric, so all
//! formatting is stripped here at the parse boundary.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};

/// First run of digits with optional thousands separators and decimals.
static PRICE_VALUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d[\d,]*(?:\.\d+)?").expect("price value regex is valid")
});

/// Prefix marking a dedupe key as derived rather than a real SKU.
const DERIVED_KEY_PREFIX: &str = "melcom-";

/// Price texts pulled from one product card, keyed by how the markup tags
/// them. A card on sale carries both a `special` (current) and an `old`
/// (pre-sale) price; a regular card carries only the plain price box text.
#[derive(Debug, Clone, Default)]
pub struct PriceText {
    pub special: Option<String>,
    pub old: Option<String>,
    pub regular: Option<String>,
}

/// Parses a single price string to a numeric value.
///
/// Strips the currency glyph and thousands separators; when the text carries
/// several price segments, the first one wins.
#[must_use]
pub fn parse_price_value(text: &str) -> Option<Decimal> {
    let raw = PRICE_VALUE_RE.find(text)?.as_str().replace(',', "");
    raw.parse::<Decimal>().ok()
}

/// Resolves one card's price texts to the canonical numeric price.
///
/// A marked current ("special") price always wins over a marked original
/// ("old") price; either alone is used as-is, and the untagged price box
/// text sits in between.
#[must_use]
pub fn normalize_price(price: &PriceText) -> Option<Decimal> {
    price
        .special
        .as_deref()
        .and_then(parse_price_value)
        .or_else(|| price.regular.as_deref().and_then(parse_price_value))
        .or_else(|| price.old.as_deref().and_then(parse_price_value))
}

/// Returns the dedupe key for a scraped card: the embedded SKU when present
/// and non-empty, otherwise a deterministic digest of title and category.
///
/// The derivation must never be random — a per-run random fallback would
/// defeat deduplication on every re-ingest. The `\x1f` separator keeps
/// `("ab", "c")` and `("a", "bc")` from colliding.
#[must_use]
pub fn resolve_dedupe_key(sku: Option<&str>, title: &str, category: &str) -> String {
    if let Some(sku) = sku {
        let sku = sku.trim();
        if !sku.is_empty() {
            return sku.to_string();
        }
    }

    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update([0x1f]);
    hasher.update(category.as_bytes());
    let digest = hasher.finalize();

    let mut key = String::with_capacity(DERIVED_KEY_PREFIX.len() + 16);
    key.push_str(DERIVED_KEY_PREFIX);
    for byte in &digest[..8] {
        key.push_str(&format!("{byte:02x}"));
    }
    key
}
