//! The shopping cart.
//!
//! Holds at most one [`CartItem`] per product id, each with a quantity of at
//! least 1. Whether the cart survives a restart is decided by
//! [`CartPersistence`]: a durable cart is rehydrated in [`CartStore::open`] and
//! written after every mutation; a session cart lives only in memory and
//! discards any previously persisted record.
//!
//! The in-memory cart is authoritative. A mutator that returns a
//! [`StateError`] has already been applied in memory; only the stored copy is
//! stale, and the next successful write brings it up to date.

use std::sync::Arc;

use fakestore_core::{CartItem, CartPersistence, CatalogProduct};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::StateError;
use crate::storage::{load_json, save_json, MemoryStorage, StateStorage, CART_KEY};

#[derive(Serialize)]
struct CartRecord<'a> {
    items: &'a [CartItem],
}

/// Entries are decoded one by one so a single bad entry does not discard the
/// rest of the cart.
#[derive(Deserialize)]
struct StoredCart {
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

#[derive(Debug)]
pub struct CartStore {
    items: Vec<CartItem>,
    storage: Arc<dyn StateStorage>,
    persistence: CartPersistence,
}

impl CartStore {
    /// Opens the cart according to `persistence`.
    ///
    /// A durable cart is rehydrated from storage; malformed entries (quantity
    /// 0, missing or zero product id, undecodable JSON) and duplicate product
    /// ids are skipped with a warning. A session cart starts empty and removes
    /// any persisted record.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Io`] if storage cannot be read or cleared.
    pub fn open(
        storage: Arc<dyn StateStorage>,
        persistence: CartPersistence,
    ) -> Result<Self, StateError> {
        let items = match persistence {
            CartPersistence::Durable => rehydrate(storage.as_ref())?,
            CartPersistence::Session => {
                storage.remove(CART_KEY)?;
                Vec::new()
            }
        };
        tracing::debug!(%persistence, items = items.len(), "cart opened");
        Ok(Self {
            items,
            storage,
            persistence,
        })
    }

    /// An empty cart that is never written anywhere.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            items: Vec::new(),
            storage: Arc::new(MemoryStorage::new()),
            persistence: CartPersistence::Session,
        }
    }

    #[must_use]
    pub fn persistence(&self) -> CartPersistence {
        self.persistence
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn item(&self, product_id: i64) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product.id == product_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds one unit of `product`.
    ///
    /// An existing line for the same id has its quantity incremented;
    /// otherwise a new line with quantity 1 is appended, holding a snapshot of
    /// the product with missing fields defaulted. A product without an id is
    /// logged and ignored.
    ///
    /// # Errors
    ///
    /// Returns a [`StateError`] if the cart cannot be persisted.
    pub fn add_to_cart<P: Into<CatalogProduct>>(&mut self, product: P) -> Result<(), StateError> {
        let record: CatalogProduct = product.into();
        let Some(id) = record.usable_id() else {
            tracing::error!(title = ?record.title, "invalid product data: missing id, not added to cart");
            return Ok(());
        };

        if let Some(item) = self.items.iter_mut().find(|item| item.product.id == id) {
            item.quantity = item.quantity.saturating_add(1);
        } else if let Some(product) = record.normalize() {
            self.items.push(CartItem {
                product,
                quantity: 1,
            });
        }

        tracing::info!(product_id = id, "added to cart");
        self.persist()
    }

    /// Removes the line for `product_id`. Unknown ids are a no-op.
    ///
    /// # Errors
    ///
    /// Returns a [`StateError`] if the cart cannot be persisted.
    pub fn remove_from_cart(&mut self, product_id: i64) -> Result<(), StateError> {
        let before = self.items.len();
        self.items.retain(|item| item.product.id != product_id);
        if self.items.len() == before {
            return Ok(());
        }
        tracing::info!(product_id, "removed from cart");
        self.persist()
    }

    /// Sets the quantity of the line for `product_id`.
    ///
    /// Quantities below 1 are ignored; removal is the only way to drop a line.
    /// Unknown ids are a no-op.
    ///
    /// # Errors
    ///
    /// Returns a [`StateError`] if the cart cannot be persisted.
    pub fn update_quantity(&mut self, product_id: i64, quantity: u32) -> Result<(), StateError> {
        if quantity == 0 {
            return Ok(());
        }
        let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.product.id == product_id)
        else {
            return Ok(());
        };
        item.quantity = quantity;
        tracing::info!(product_id, quantity, "cart quantity updated");
        self.persist()
    }

    /// Empties the cart.
    ///
    /// # Errors
    ///
    /// Returns a [`StateError`] if the cart cannot be persisted.
    pub fn clear_cart(&mut self) -> Result<(), StateError> {
        self.items.clear();
        tracing::info!("cart cleared");
        self.persist()
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.quantity))
            .sum()
    }

    /// Sum of unit price times quantity across all lines.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    fn persist(&self) -> Result<(), StateError> {
        match self.persistence {
            CartPersistence::Durable => save_json(
                self.storage.as_ref(),
                CART_KEY,
                &CartRecord { items: &self.items },
            ),
            CartPersistence::Session => Ok(()),
        }
    }
}

fn rehydrate(storage: &dyn StateStorage) -> Result<Vec<CartItem>, StateError> {
    let stored = match load_json::<StoredCart>(storage, CART_KEY) {
        Ok(Some(stored)) => stored,
        Ok(None) => return Ok(Vec::new()),
        Err(StateError::Decode { key, source }) => {
            tracing::warn!(%key, error = %source, "persisted cart is unreadable, starting empty");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    let mut items: Vec<CartItem> = Vec::with_capacity(stored.items.len());
    for (index, raw) in stored.items.into_iter().enumerate() {
        let item = match serde_json::from_value::<CartItem>(raw) {
            Ok(item) => item,
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping malformed cart entry");
                continue;
            }
        };
        if item.quantity == 0 || item.product.id == 0 {
            tracing::warn!(
                index,
                product_id = item.product.id,
                quantity = item.quantity,
                "skipping malformed cart entry"
            );
            continue;
        }
        if items.iter().any(|kept| kept.product.id == item.product.id) {
            tracing::warn!(index, product_id = item.product.id, "skipping duplicate cart entry");
            continue;
        }
        items.push(item);
    }
    Ok(items)
}

#[cfg(test)]
#[path = "cart_test.rs"]
mod tests;
