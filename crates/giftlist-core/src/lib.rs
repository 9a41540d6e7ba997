pub mod app_config;
pub mod config;
pub mod error;
pub mod product;
pub mod wishlist;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, WishlistError};
pub use product::Product;
pub use wishlist::{AddItemOutcome, OwnerContact, RemoveItemOutcome, Wishlist, WishlistItem};
