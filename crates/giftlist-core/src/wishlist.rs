//! The wishlist aggregate and its invariant-preserving mutations.
//!
//! All writes to `items` and `total_price` go through the methods here. The
//! invariants they maintain:
//!
//! - no two items in the same wishlist share a `product_key`;
//! - `total_price` always equals the sum of `price × quantity` over `items`;
//! - `share_id`, once assigned, is never changed or reassigned.
//!
//! Persistence and the "wishlist not found" case live behind the store; this
//! module only ever operates on a loaded aggregate.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::WishlistError;
use crate::product::Product;

/// Contact details attached when the owner shares a wishlist. Only the name
/// is required; email and phone are shown to viewers when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerContact {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// A product reference embedded in a wishlist.
///
/// The title, price, image, and link are a snapshot taken at add-time, not a
/// live join against the catalog. Catalog price changes after the item was
/// added do not retroactively change the wishlist — intentional, so a shared
/// list keeps showing what the owner saw when they picked the gift.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistItem {
    pub product_key: String,
    pub title: String,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub product_url: Option<String>,
    pub category: Option<String>,
    pub quantity: u32,
    pub added_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WishlistItem {
    /// Price of this line: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Outcome of [`Wishlist::add_item`]. `AlreadyPresent` is a normal branch
/// the caller checks, not an error: the item set is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddItemOutcome {
    Added,
    AlreadyPresent,
}

/// Outcome of [`Wishlist::remove_item`]. Removing an absent key is a no-op,
/// which makes repeated removal calls idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveItemOutcome {
    Removed,
    NotPresent,
}

/// A named, owned collection of gift items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wishlist {
    pub id: Uuid,
    pub name: String,
    /// Event tag chosen at creation ("Wedding", "Birthday", ...). Immutable
    /// after creation.
    pub event_type: String,
    pub owner_username: String,
    /// Insertion-ordered; order is meaningful for display.
    pub items: Vec<WishlistItem>,
    /// Derived from `items`; recomputed after every mutation and never
    /// trusted from storage.
    pub total_price: Decimal,
    /// Assigned lazily on the first share; stable thereafter.
    pub share_id: Option<Uuid>,
    pub owner_contact: Option<OwnerContact>,
    pub created_at: DateTime<Utc>,
}

impl Wishlist {
    /// Creates an empty wishlist owned by `owner_username`.
    ///
    /// # Errors
    ///
    /// Returns [`WishlistError::Validation`] if `name` is empty or blank.
    pub fn create(
        name: &str,
        event_type: &str,
        owner_username: &str,
    ) -> Result<Self, WishlistError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WishlistError::Validation(
                "wishlist name must not be empty".to_string(),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            event_type: event_type.to_string(),
            owner_username: owner_username.to_string(),
            items: Vec::new(),
            total_price: Decimal::ZERO,
            share_id: None,
            owner_contact: None,
            created_at: Utc::now(),
        })
    }

    #[must_use]
    pub fn is_owned_by(&self, username: &str) -> bool {
        self.owner_username == username
    }

    /// The total recomputed from scratch. `total_price` must always equal
    /// this; exposed so callers (and tests) can assert the invariant.
    #[must_use]
    pub fn computed_total(&self) -> Decimal {
        self.items.iter().map(WishlistItem::line_total).sum()
    }

    /// Appends a snapshot of `product` unless an item with the same key is
    /// already present.
    ///
    /// A `quantity` of zero is treated as one; quantities never go below one.
    pub fn add_item(&mut self, product: &Product, quantity: u32) -> AddItemOutcome {
        if self.items.iter().any(|i| i.product_key == product.sku) {
            return AddItemOutcome::AlreadyPresent;
        }

        let now = Utc::now();
        self.items.push(WishlistItem {
            product_key: product.sku.clone(),
            title: product.title.clone(),
            price: product.price,
            image_url: product.image_url.clone(),
            product_url: product.product_url.clone(),
            category: Some(product.category.clone()),
            quantity: quantity.max(1),
            added_at: now,
            updated_at: now,
        });
        self.recompute_total();
        AddItemOutcome::Added
    }

    /// Removes the item with `product_key`, if present.
    pub fn remove_item(&mut self, product_key: &str) -> RemoveItemOutcome {
        let before = self.items.len();
        self.items.retain(|i| i.product_key != product_key);
        if self.items.len() == before {
            return RemoveItemOutcome::NotPresent;
        }
        self.recompute_total();
        RemoveItemOutcome::Removed
    }

    /// Sets the quantity of the item with `product_key`, clamped to a
    /// minimum of one. Removing an item entirely must go through
    /// [`Wishlist::remove_item`], never through a zero quantity.
    ///
    /// Returns `true` when an item was updated, `false` when no item with
    /// that key exists (the wishlist is unchanged).
    pub fn set_quantity(&mut self, product_key: &str, requested: i64) -> bool {
        let clamped = u32::try_from(requested.max(1)).unwrap_or(u32::MAX);
        let Some(item) = self.items.iter_mut().find(|i| i.product_key == product_key) else {
            return false;
        };
        item.quantity = clamped;
        item.updated_at = Utc::now();
        self.recompute_total();
        true
    }

    /// Renames the wishlist.
    ///
    /// # Errors
    ///
    /// Returns [`WishlistError::Validation`] if `new_name` is empty or blank.
    pub fn rename(&mut self, new_name: &str) -> Result<(), WishlistError> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(WishlistError::Validation(
                "wishlist name must not be empty".to_string(),
            ));
        }
        self.name = new_name.to_string();
        Ok(())
    }

    /// Attaches (or updates) the owner's contact details and returns the
    /// share id, assigning one on the first call only. Later calls update
    /// the contact but never reassign the id.
    ///
    /// # Errors
    ///
    /// Returns [`WishlistError::Validation`] if `contact.name` is empty.
    pub fn attach_owner_contact(&mut self, contact: OwnerContact) -> Result<Uuid, WishlistError> {
        if contact.name.trim().is_empty() {
            return Err(WishlistError::Validation(
                "contact name must not be empty".to_string(),
            ));
        }

        self.owner_contact = Some(contact);
        let share_id = *self.share_id.get_or_insert_with(Uuid::new_v4);
        Ok(share_id)
    }

    fn recompute_total(&mut self) {
        self.total_price = self.computed_total();
    }
}
