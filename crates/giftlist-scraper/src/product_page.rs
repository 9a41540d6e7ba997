//! Single-product detail page extraction.
//!
//! Used for ad-hoc probing of one listing URL rather than a whole category
//! grid. Unlike the listing parser, a detail page missing its required
//! fields is an error: the caller asked for this specific product.

use std::sync::LazyLock;

use scraper::{Html, Selector};

use giftlist_core::Product;

use crate::error::ScraperError;
use crate::normalize::{parse_price_value, resolve_dedupe_key};

static PAGE_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".page-title").expect("page title selector is valid"));
static PRICE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".price").expect("price selector is valid"));
static GALLERY_IMAGE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".gallery-placeholder__image").expect("gallery image selector is valid")
});
static DETAILS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".product.info.detailed").expect("details selector is valid")
});
static SKU_VALUE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".product.attribute.sku .value").expect("sku selector is valid")
});
static AVAILABILITY: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".stock.available").expect("availability selector is valid")
});

/// Everything extracted from one product detail page.
#[derive(Debug, Clone)]
pub struct ProductDetail {
    pub title: String,
    pub price: rust_decimal::Decimal,
    pub image_url: String,
    pub details: Option<String>,
    pub sku: Option<String>,
    pub availability: Option<String>,
}

impl ProductDetail {
    /// Converts the detail into a catalog entry under `category`, resolving
    /// the dedupe key the same way the listing parser does.
    #[must_use]
    pub fn into_product(self, category: &str) -> Product {
        Product {
            sku: resolve_dedupe_key(self.sku.as_deref(), &self.title, category),
            title: self.title,
            price: self.price,
            image_url: Some(self.image_url),
            product_url: None,
            category: category.to_string(),
        }
    }
}

/// Parses a rendered product detail page.
///
/// # Errors
///
/// Returns [`ScraperError::IncompleteProduct`] when the page lacks a title,
/// a parseable price, or an image.
pub fn parse_product_page(html: &str) -> Result<ProductDetail, ScraperError> {
    let document = Html::parse_document(html);

    let title = first_text(&document, &PAGE_TITLE)
        .ok_or(ScraperError::IncompleteProduct { field: "title" })?;
    let price = first_text(&document, &PRICE)
        .as_deref()
        .and_then(parse_price_value)
        .ok_or(ScraperError::IncompleteProduct { field: "price" })?;
    let image_url = document
        .select(&GALLERY_IMAGE)
        .next()
        .and_then(|el| el.value().attr("src"))
        .map(str::to_string)
        .ok_or(ScraperError::IncompleteProduct { field: "image" })?;

    Ok(ProductDetail {
        title,
        price,
        image_url,
        details: first_text(&document, &DETAILS),
        sku: first_text(&document, &SKU_VALUE),
        availability: first_text(&document, &AVAILABILITY),
    })
}

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    let element = document.select(selector).next()?;
    let text = element.text().collect::<String>().trim().to_string();
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn detail_page(title_html: &str, price_html: &str, image_html: &str) -> String {
        format!(
            r#"<html><body>
                 {title_html}
                 {price_html}
                 {image_html}
                 <div class="product info detailed">2-year warranty. 400W motor.</div>
                 <div class="product attribute sku"><span class="value">MEL-BLE-02</span></div>
                 <div class="stock available">In stock</div>
               </body></html>"#
        )
    }

    #[test]
    fn parses_a_complete_detail_page() {
        let html = detail_page(
            r#"<h1 class="page-title">Binatone Blender BLG-402</h1>"#,
            r#"<span class="price">₵1,234.50</span>"#,
            r#"<img class="gallery-placeholder__image" src="https://melcom.com/media/blg-402.jpg"/>"#,
        );

        let detail = parse_product_page(&html).expect("page should parse");
        assert_eq!(detail.title, "Binatone Blender BLG-402");
        assert_eq!(detail.price, "1234.50".parse::<Decimal>().unwrap());
        assert_eq!(detail.sku.as_deref(), Some("MEL-BLE-02"));
        assert_eq!(detail.availability.as_deref(), Some("In stock"));
    }

    #[test]
    fn missing_price_is_an_error() {
        let html = detail_page(
            r#"<h1 class="page-title">Binatone Blender</h1>"#,
            "",
            r#"<img class="gallery-placeholder__image" src="https://melcom.com/media/b.jpg"/>"#,
        );
        let err = parse_product_page(&html).unwrap_err();
        assert!(matches!(
            err,
            ScraperError::IncompleteProduct { field: "price" }
        ));
    }

    #[test]
    fn missing_image_is_an_error() {
        let html = detail_page(
            r#"<h1 class="page-title">Binatone Blender</h1>"#,
            r#"<span class="price">₵45</span>"#,
            "",
        );
        let err = parse_product_page(&html).unwrap_err();
        assert!(matches!(
            err,
            ScraperError::IncompleteProduct { field: "image" }
        ));
    }

    #[test]
    fn into_product_uses_page_sku_as_key() {
        let html = detail_page(
            r#"<h1 class="page-title">Binatone Blender BLG-402</h1>"#,
            r#"<span class="price">₵250.00</span>"#,
            r#"<img class="gallery-placeholder__image" src="https://melcom.com/media/blg-402.jpg"/>"#,
        );
        let product = parse_product_page(&html)
            .unwrap()
            .into_product("ELECTRICAL APPLIANCES");
        assert_eq!(product.sku, "MEL-BLE-02");
        assert_eq!(product.category, "ELECTRICAL APPLIANCES");
    }
}
