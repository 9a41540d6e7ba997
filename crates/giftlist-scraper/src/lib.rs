pub mod categories;
pub mod client;
pub mod error;
pub mod normalize;
pub mod parse;
pub mod product_page;

pub use categories::{find_category, Category, CATEGORIES};
pub use client::ProxyClient;
pub use error::ScraperError;
pub use normalize::{normalize_price, parse_price_value, resolve_dedupe_key, PriceText};
pub use parse::parse_category_products;
pub use product_page::{parse_product_page, ProductDetail};
