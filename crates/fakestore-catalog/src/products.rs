//! Product endpoints for the catalog client.

use fakestore_core::{CatalogProduct, Product};

use crate::client::CatalogClient;
use crate::error::CatalogError;

impl CatalogClient {
    /// Fetches the full product list.
    ///
    /// Records without a usable id are skipped with a warning.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Rejected`] / [`CatalogError::NotFound`] on non-2xx.
    /// - [`CatalogError::Http`] on network failure.
    /// - [`CatalogError::Deserialize`] if the body is not a product array.
    pub async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        let url = self.endpoint("products")?;
        let records: Vec<CatalogProduct> =
            self.get_json(&url, "Failed to fetch products").await?;
        Ok(normalize_all(records, "list_products"))
    }

    /// Fetches the products of one category tag.
    ///
    /// # Errors
    ///
    /// Same as [`CatalogClient::list_products`].
    pub async fn list_products_in_category(
        &self,
        category: &str,
    ) -> Result<Vec<Product>, CatalogError> {
        let mut url = self.endpoint("products/category")?;
        // Pushed as a segment so tags like "men's clothing" are percent-encoded.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(category);
        }
        let records: Vec<CatalogProduct> =
            self.get_json(&url, "Failed to fetch products").await?;
        Ok(normalize_all(records, "list_products_in_category"))
    }

    /// Fetches a single product by id.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::NotFound`] on 404 or the empty body the demo catalog
    ///   returns for unknown ids.
    /// - [`CatalogError::Malformed`] if the record has no usable id.
    /// - [`CatalogError::Rejected`], [`CatalogError::Http`],
    ///   [`CatalogError::Deserialize`] as for [`CatalogClient::list_products`].
    pub async fn get_product(&self, id: i64) -> Result<Product, CatalogError> {
        let url = self.endpoint(&format!("products/{id}"))?;
        let record: CatalogProduct = self.get_json(&url, "Failed to fetch product").await?;
        record.normalize().ok_or_else(|| CatalogError::Malformed {
            context: format!("get_product(id={id})"),
            reason: "product has no id".to_owned(),
        })
    }
}

fn normalize_all(records: Vec<CatalogProduct>, context: &str) -> Vec<Product> {
    records
        .into_iter()
        .filter_map(|record| {
            let title = record.title.clone();
            let product = record.normalize();
            if product.is_none() {
                tracing::warn!(context, ?title, "skipping catalog product without an id");
            }
            product
        })
        .collect()
}
