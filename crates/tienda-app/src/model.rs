// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};

use crate::ids::ProductId;

/// One catalog entry. Built only by feed normalization; immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub image: String,
}

impl Product {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            bail!("product {} has an empty title", self.id.get());
        }
        if self.price < 0.0 {
            bail!(
                "product {} has a negative price {}",
                self.id.get(),
                self.price
            );
        }
        Ok(())
    }
}
