//! Product-card extraction from rendered category listing pages.
//!
//! The listing grid is a Magento storefront: each card is an
//! `li.item.product.product-item` with a photo anchor, a name link, a price
//! box (plain, or special + old when on sale), and the SKU stashed on the
//! add-to-cart form. Scraped HTML is noisy; a card missing its title, price,
//! or image is expected debris and is skipped, never an error.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use giftlist_core::Product;

use crate::normalize::{normalize_price, resolve_dedupe_key, PriceText};

static CARD: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("li.item.product.product-item").expect("card selector is valid")
});
static PHOTO_LINK: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a.product.photo.product-item-photo").expect("photo link selector is valid")
});
static TITLE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".product.name.product-item-name .product-item-link")
        .expect("title selector is valid")
});
static IMAGE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".product-image-photo").expect("image selector is valid"));
static PRICE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".price-box.price-final_price .price").expect("price selector is valid")
});
static SPECIAL_PRICE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".special-price .price").expect("special price selector is valid")
});
static OLD_PRICE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".old-price .price").expect("old price selector is valid")
});
static CART_FORM: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("form[data-role=\"tocart-form\"]").expect("cart form selector is valid")
});

/// Extracts and normalizes every complete product card from one listing page.
///
/// The result follows document order; cards lacking a title, price, or image
/// are skipped with a debug log. Each product's `sku` is its dedupe key —
/// the markup SKU when the card carries one, a deterministic derivation
/// otherwise.
#[must_use]
pub fn parse_category_products(html: &str, category_name: &str) -> Vec<Product> {
    let document = Html::parse_document(html);
    let mut products = Vec::new();

    for card in document.select(&CARD) {
        match extract_card(&card, category_name) {
            Some(product) => products.push(product),
            None => {
                tracing::debug!(category = category_name, "skipping incomplete product card");
            }
        }
    }

    products
}

fn extract_card(card: &ElementRef<'_>, category_name: &str) -> Option<Product> {
    let title = text_of(card, &TITLE)?;

    let price = normalize_price(&PriceText {
        special: text_of(card, &SPECIAL_PRICE),
        old: text_of(card, &OLD_PRICE),
        regular: text_of(card, &PRICE),
    })?;

    let image_url = attr_of(card, &IMAGE, "src")?;
    let product_url = attr_of(card, &PHOTO_LINK, "href");
    let sku = attr_of(card, &CART_FORM, "data-product-sku");

    Some(Product {
        sku: resolve_dedupe_key(sku.as_deref(), &title, category_name),
        title,
        price,
        image_url: Some(image_url),
        product_url,
        category: category_name.to_string(),
    })
}

fn text_of(card: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    let element = card.select(selector).next()?;
    let text = element.text().collect::<String>().trim().to_string();
    (!text.is_empty()).then_some(text)
}

fn attr_of(card: &ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    let value = card.select(selector).next()?.value().attr(attr)?.trim();
    (!value.is_empty()).then_some(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn card(title: &str, price_html: &str, image: &str, sku_attr: &str) -> String {
        format!(
            r#"<li class="item product product-item">
                 <a class="product photo product-item-photo" href="https://melcom.com/{title}.html">
                   <img class="product-image-photo" src="{image}"/>
                 </a>
                 <div class="product name product-item-name">
                   <a class="product-item-link"> {title} </a>
                 </div>
                 <div class="price-box price-final_price">{price_html}</div>
                 <form data-role="tocart-form" {sku_attr}></form>
               </li>"#
        )
    }

    fn listing(cards: &[String]) -> String {
        format!(
            r#"<html><body>
                 <div class="products wrapper grid products-grid">
                   <ol class="container-products-switch">{}</ol>
                 </div>
               </body></html>"#,
            cards.join("\n")
        )
    }

    #[test]
    fn parses_complete_cards_in_document_order() {
        let html = listing(&[
            card(
                "Kettle",
                r#"<span class="price">₵150.00</span>"#,
                "https://melcom.com/media/kettle.jpg",
                r#"data-product-sku="MEL-KET-01""#,
            ),
            card(
                "Blender",
                r#"<span class="price">₵250.00</span>"#,
                "https://melcom.com/media/blender.jpg",
                r#"data-product-sku="MEL-BLE-02""#,
            ),
        ]);

        let products = parse_category_products(&html, "HOME & KITCHEN ESSENTIALS");
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].sku, "MEL-KET-01");
        assert_eq!(products[0].title, "Kettle");
        assert_eq!(products[0].price, Decimal::from(150));
        assert_eq!(products[1].sku, "MEL-BLE-02");
        assert_eq!(
            products[1].product_url.as_deref(),
            Some("https://melcom.com/Blender.html")
        );
        assert_eq!(products[1].category, "HOME & KITCHEN ESSENTIALS");
    }

    #[test]
    fn sale_card_uses_special_price_over_old() {
        let html = listing(&[card(
            "Blender",
            r#"<span class="special-price"><span class="price">₵900</span></span>
               <span class="old-price"><span class="price">₵1,200</span></span>"#,
            "https://melcom.com/media/blender.jpg",
            r#"data-product-sku="MEL-BLE-02""#,
        )]);

        let products = parse_category_products(&html, "ELECTRICAL APPLIANCES");
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].price, Decimal::from(900));
    }

    #[test]
    fn card_without_sku_gets_a_derived_key() {
        let html = listing(&[card(
            "Blender",
            r#"<span class="price">₵250.00</span>"#,
            "https://melcom.com/media/blender.jpg",
            "",
        )]);

        let products = parse_category_products(&html, "ELECTRICAL APPLIANCES");
        assert_eq!(products.len(), 1);
        assert!(products[0].sku.starts_with("melcom-"));
        assert_eq!(
            products[0].sku,
            crate::normalize::resolve_dedupe_key(None, "Blender", "ELECTRICAL APPLIANCES")
        );
    }

    #[test]
    fn incomplete_cards_are_skipped_not_fatal() {
        let no_price = card(
            "Mystery Item",
            "",
            "https://melcom.com/media/mystery.jpg",
            "",
        );
        let no_image = r#"<li class="item product product-item">
             <div class="product name product-item-name">
               <a class="product-item-link">No Image</a>
             </div>
             <div class="price-box price-final_price"><span class="price">₵10</span></div>
           </li>"#
            .to_string();
        let good = card(
            "Kettle",
            r#"<span class="price">₵150.00</span>"#,
            "https://melcom.com/media/kettle.jpg",
            r#"data-product-sku="MEL-KET-01""#,
        );

        let products =
            parse_category_products(&listing(&[no_price, no_image, good]), "SUPERMARKET");
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].sku, "MEL-KET-01");
    }

    #[test]
    fn empty_page_yields_no_products() {
        let products = parse_category_products(&listing(&[]), "SUPERMARKET");
        assert!(products.is_empty());
    }
}
