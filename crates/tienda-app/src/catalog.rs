// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::Product;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogStatus {
    Loading,
    Ready,
    Failed(String),
}

/// Owns the product list and the search filter. The list is installed at
/// most once; everything derived from it is recomputed on read.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogStore {
    products: Vec<Product>,
    search_term: String,
    status: CatalogStatus,
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self {
            products: Vec::new(),
            search_term: String::new(),
            status: CatalogStatus::Loading,
        }
    }
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts the fetched feed exactly once. Later installs are ignored so
    /// a duplicate mount or a stray late result cannot replace the catalog.
    pub fn install(&mut self, products: Vec<Product>) {
        if self.status != CatalogStatus::Loading {
            return;
        }
        self.products = products;
        self.status = CatalogStatus::Ready;
    }

    /// Records a fetch failure. Only meaningful while still loading.
    pub fn fail(&mut self, message: impl Into<String>) {
        if self.status != CatalogStatus::Loading {
            return;
        }
        self.status = CatalogStatus::Failed(message.into());
    }

    pub fn status(&self) -> &CatalogStatus {
        &self.status
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    /// Products whose title contains the search term case-insensitively,
    /// in feed order. An empty term matches everything.
    pub fn visible_products(&self) -> Vec<&Product> {
        let needle = self.search_term.to_lowercase();
        self.products
            .iter()
            .filter(|product| product.title.to_lowercase().contains(&needle))
            .collect()
    }
}
