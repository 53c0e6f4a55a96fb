use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Title given to products that arrive from the catalog without one.
pub const UNTITLED_PRODUCT: &str = "Untitled Product";

/// A product as served by the remote catalog.
///
/// Every field is optional because the demo API makes no guarantees about
/// shape. Use [`CatalogProduct::normalize`] to obtain a [`Product`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogProduct {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub rating: Option<Rating>,
}

impl CatalogProduct {
    /// Returns the product id when it is usable as a cart identity.
    ///
    /// Zero is treated the same as a missing id.
    #[must_use]
    pub fn usable_id(&self) -> Option<i64> {
        self.id.filter(|id| *id != 0)
    }

    /// Converts the wire record into a [`Product`], filling missing optional
    /// fields with safe defaults.
    ///
    /// Returns `None` when the record has no usable id.
    #[must_use]
    pub fn normalize(self) -> Option<Product> {
        let id = self.usable_id()?;
        let price = self
            .price
            .filter(|p| !p.is_sign_negative())
            .unwrap_or(Decimal::ZERO);
        Some(Product {
            id,
            title: self
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| UNTITLED_PRODUCT.to_string()),
            price,
            description: self.description.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            image: self.image.unwrap_or_default(),
            rating: self.rating.unwrap_or_default(),
        })
    }
}

impl From<Product> for CatalogProduct {
    fn from(product: Product) -> Self {
        Self {
            id: Some(product.id),
            title: Some(product.title),
            price: Some(product.price),
            description: Some(product.description),
            category: Some(product.category),
            image: Some(product.image),
            rating: Some(product.rating),
        }
    }
}

impl From<&Product> for CatalogProduct {
    fn from(product: &Product) -> Self {
        Self::from(product.clone())
    }
}

/// A normalized catalog product. Never mutated locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub title: String,
    /// Unit price in the store currency. Never negative.
    pub price: Decimal,
    pub description: String,
    /// Category tag, e.g. `"electronics"` or `"men's clothing"`.
    pub category: String,
    /// Image URL.
    pub image: String,
    pub rating: Rating,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    #[serde(default)]
    pub rate: Decimal,
    #[serde(default)]
    pub count: u32,
}

/// One line of the cart: a snapshot of the product plus how many of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    /// Always at least 1. Absence from the cart represents zero.
    pub quantity: u32,
}

impl CartItem {
    /// Price of this line: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// Ordering applied to a filtered product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
}

impl SortKey {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::PriceAsc => "price-asc",
            SortKey::PriceDesc => "price-desc",
            SortKey::NameAsc => "name-asc",
            SortKey::NameDesc => "name-desc",
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SortKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price-asc" => Ok(SortKey::PriceAsc),
            "price-desc" => Ok(SortKey::PriceDesc),
            "name-asc" => Ok(SortKey::NameAsc),
            "name-desc" => Ok(SortKey::NameDesc),
            other => Err(CoreError::InvalidSortKey(other.to_string())),
        }
    }
}
