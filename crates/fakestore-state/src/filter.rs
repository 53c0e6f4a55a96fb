use std::cmp::Ordering;
use std::collections::BTreeSet;

use fakestore_core::{Product, SortKey};
use rust_decimal::Decimal;

/// Upper price bound applied by [`FilterCriteria::default`].
pub const DEFAULT_MAX_PRICE: u32 = 1000;

/// Active search, category, price and sort filters. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub search_query: String,
    /// `None` matches every category.
    pub category: Option<String>,
    pub min_price: Decimal,
    pub max_price: Decimal,
    pub sort_by: SortKey,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            search_query: String::new(),
            category: None,
            min_price: Decimal::ZERO,
            max_price: Decimal::from(DEFAULT_MAX_PRICE),
            sort_by: SortKey::default(),
        }
    }
}

impl FilterCriteria {
    fn matches(&self, product: &Product, needle: &str) -> bool {
        let matches_search = needle.is_empty()
            || product.title.to_lowercase().contains(needle)
            || product.description.to_lowercase().contains(needle);
        let matches_category = self
            .category
            .as_deref()
            .is_none_or(|category| product.category == category);
        let matches_price = product.price >= self.min_price && product.price <= self.max_price;

        matches_search && matches_category && matches_price
    }

    fn compare(&self, a: &Product, b: &Product) -> Ordering {
        match self.sort_by {
            SortKey::PriceAsc => a.price.cmp(&b.price),
            SortKey::PriceDesc => b.price.cmp(&a.price),
            SortKey::NameAsc => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortKey::NameDesc => b.title.to_lowercase().cmp(&a.title.to_lowercase()),
        }
    }
}

/// Holds the current [`FilterCriteria`] and applies them to product lists.
#[derive(Debug, Clone, Default)]
pub struct FilterStore {
    criteria: FilterCriteria,
}

impl FilterStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.criteria.search_query = query.into();
    }

    /// An empty tag clears the category filter.
    pub fn set_category(&mut self, category: impl Into<String>) {
        let category = category.into();
        self.criteria.category = (!category.is_empty()).then_some(category);
    }

    /// Sets the inclusive price bounds. An inverted range is stored as given
    /// and matches nothing.
    pub fn set_price_range(&mut self, min: Decimal, max: Decimal) {
        self.criteria.min_price = min;
        self.criteria.max_price = max;
    }

    pub fn set_sort_by(&mut self, sort_by: SortKey) {
        self.criteria.sort_by = sort_by;
    }

    pub fn reset_filters(&mut self) {
        self.criteria = FilterCriteria::default();
    }

    /// Returns the products matching every criterion, sorted by the selected
    /// key. The sort is stable, so ties keep their input order.
    #[must_use]
    pub fn filter_products(&self, products: &[Product]) -> Vec<Product> {
        let needle = self.criteria.search_query.to_lowercase();
        let mut matched: Vec<Product> = products
            .iter()
            .filter(|product| self.criteria.matches(product, &needle))
            .cloned()
            .collect();
        matched.sort_by(|a, b| self.criteria.compare(a, b));
        tracing::debug!(
            total = products.len(),
            matched = matched.len(),
            sort_by = %self.criteria.sort_by,
            "filtered products"
        );
        matched
    }

    /// Sorted, de-duplicated category tags present in `products`.
    #[must_use]
    pub fn categories(products: &[Product]) -> Vec<String> {
        products
            .iter()
            .filter(|product| !product.category.is_empty())
            .map(|product| product.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use fakestore_core::Rating;

    use super::*;

    fn product(id: i64, title: &str, price: i64, category: &str) -> Product {
        Product {
            id,
            title: title.to_string(),
            price: Decimal::from(price),
            description: format!("{title} description"),
            category: category.to_string(),
            image: String::new(),
            rating: Rating::default(),
        }
    }

    fn ids(products: &[Product]) -> Vec<i64> {
        products.iter().map(|p| p.id).collect()
    }

    fn catalog() -> Vec<Product> {
        vec![
            product(1, "Shirt", 20, "men's clothing"),
            product(2, "Hat", 10, "men's clothing"),
            product(3, "ring", 150, "jewelery"),
            product(4, "Monitor", 599, "electronics"),
        ]
    }

    #[test]
    fn default_criteria_sort_by_price_ascending() {
        let store = FilterStore::new();
        let products = vec![product(1, "Shirt", 20, ""), product(2, "Hat", 10, "")];
        assert_eq!(ids(&store.filter_products(&products)), vec![2, 1]);
    }

    #[test]
    fn search_matches_title_or_description_case_insensitively() {
        let mut store = FilterStore::new();
        store.set_search_query("MONITOR");
        assert_eq!(ids(&store.filter_products(&catalog())), vec![4]);

        let mut products = catalog();
        products[0].description = "soft cotton".to_string();
        store.set_search_query("Cotton");
        assert_eq!(ids(&store.filter_products(&products)), vec![1]);
    }

    #[test]
    fn category_must_match_exactly() {
        let mut store = FilterStore::new();
        store.set_category("men's clothing");
        assert_eq!(ids(&store.filter_products(&catalog())), vec![2, 1]);

        store.set_category("Men's Clothing");
        assert!(store.filter_products(&catalog()).is_empty());

        store.set_category("");
        assert_eq!(store.criteria().category, None);
        assert_eq!(store.filter_products(&catalog()).len(), 4);
    }

    #[test]
    fn price_range_is_inclusive() {
        let mut store = FilterStore::new();
        store.set_price_range(Decimal::from(10), Decimal::from(150));
        assert_eq!(ids(&store.filter_products(&catalog())), vec![2, 1, 3]);
    }

    #[test]
    fn default_range_excludes_prices_above_1000() {
        let store = FilterStore::new();
        let products = vec![product(1, "Laptop", 1001, ""), product(2, "Mouse", 1000, "")];
        assert_eq!(ids(&store.filter_products(&products)), vec![2]);
    }

    #[test]
    fn name_sort_ignores_case() {
        let mut store = FilterStore::new();
        store.set_sort_by(SortKey::NameAsc);
        assert_eq!(ids(&store.filter_products(&catalog())), vec![2, 4, 3, 1]);

        store.set_sort_by(SortKey::NameDesc);
        assert_eq!(ids(&store.filter_products(&catalog())), vec![1, 3, 4, 2]);
    }

    #[test]
    fn price_descending_keeps_ties_in_input_order() {
        let mut store = FilterStore::new();
        store.set_sort_by(SortKey::PriceDesc);
        let products = vec![
            product(1, "A", 5, ""),
            product(2, "B", 9, ""),
            product(3, "C", 5, ""),
        ];
        assert_eq!(ids(&store.filter_products(&products)), vec![2, 1, 3]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let mut store = FilterStore::new();
        store.set_search_query("h");
        store.set_sort_by(SortKey::NameAsc);
        let once = store.filter_products(&catalog());
        let twice = store.filter_products(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut store = FilterStore::new();
        store.set_search_query("x");
        store.set_category("jewelery");
        store.set_price_range(Decimal::from(5), Decimal::from(6));
        store.set_sort_by(SortKey::NameDesc);

        store.reset_filters();

        assert_eq!(store.criteria(), &FilterCriteria::default());
        assert_eq!(store.criteria().max_price, Decimal::from(1000));
    }

    #[test]
    fn categories_are_sorted_and_unique() {
        assert_eq!(
            FilterStore::categories(&catalog()),
            vec!["electronics", "jewelery", "men's clothing"]
        );
    }
}
