// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde_json::{Value, json};
use tienda_app::{Product, ProductId};

const ADJECTIVES: [&str; 12] = [
    "Red", "Blue", "Classic", "Vintage", "Slim", "Cozy", "Bold", "Urban", "Coastal", "Midnight",
    "Canvas", "Everyday",
];

const ITEMS: [&str; 12] = [
    "Shirt", "Jacket", "Mug", "Backpack", "Sneakers", "Hat", "Hoodie", "Scarf", "Lamp", "Wallet",
    "Notebook", "Headphones",
];

const DESCRIPTION_WORDS: [&str; 20] = [
    "soft", "durable", "lightweight", "cotton", "everyday", "fit", "stitched", "classic",
    "water-resistant", "layered", "breathable", "pocket", "zip", "trim", "wash", "comfort",
    "travel", "compact", "matte", "finish",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Deterministic sample-catalog generator for tests and demo data.
#[derive(Debug, Clone)]
pub struct CatalogFaker {
    rng: DeterministicRng,
}

impl CatalogFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn product(&mut self, id: i64) -> Product {
        let adjective = self.pick(&ADJECTIVES);
        let item = self.pick(&ITEMS);
        let cents = 199 + self.rng.int_n(19_800) as i64;
        Product {
            id: ProductId::new(id),
            title: format!("{adjective} {item}"),
            description: self.sentence(4, 9),
            price: cents as f64 / 100.0,
            image: format!("https://img.example.com/products/{id}.png"),
        }
    }

    /// Products with ids 1..=count, in feed order.
    pub fn catalog(&mut self, count: usize) -> Vec<Product> {
        (1..=count as i64).map(|id| self.product(id)).collect()
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn sentence(&mut self, min_words: usize, max_words: usize) -> String {
        let count = min_words + self.rng.int_n(max_words - min_words + 1);
        let mut parts = Vec::with_capacity(count);
        for _ in 0..count {
            parts.push(self.pick(&DESCRIPTION_WORDS).to_owned());
        }
        let mut sentence = parts.join(" ");
        if let Some(first) = sentence.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        sentence.push('.');
        sentence
    }
}

/// Serializes products the way the remote feed does.
pub fn feed_json(products: &[Product]) -> String {
    Value::Array(products.iter().map(feed_record).collect()).to_string()
}

/// Same as [`feed_json`] but every record carries extra fields the client
/// must drop.
pub fn feed_json_with_noise(products: &[Product]) -> String {
    let records = products
        .iter()
        .map(|product| {
            let mut record = feed_record(product);
            let fields = record.as_object_mut().expect("record is an object");
            fields.insert("category".to_owned(), json!("men's clothing"));
            fields.insert("rating".to_owned(), json!({"rate": 3.9, "count": 120}));
            record
        })
        .collect();
    Value::Array(records).to_string()
}

fn feed_record(product: &Product) -> Value {
    json!({
        "id": product.id.get(),
        "title": product.title,
        "description": product.description,
        "price": product.price,
        "image": product.image,
    })
}

#[cfg(test)]
mod tests {
    use super::{CatalogFaker, feed_json, feed_json_with_noise};

    #[test]
    fn same_seed_generates_the_same_catalog() {
        let first = CatalogFaker::new(42).catalog(5);
        let second = CatalogFaker::new(42).catalog(5);
        assert_eq!(first, second);
    }

    #[test]
    fn catalog_ids_are_sequential_and_prices_non_negative() {
        let products = CatalogFaker::new(7).catalog(8);
        for (index, product) in products.iter().enumerate() {
            assert_eq!(product.id.get(), index as i64 + 1);
            assert!(product.price >= 0.0);
            assert!(!product.title.trim().is_empty());
        }
    }

    #[test]
    fn feed_json_round_trips_through_serde() {
        let products = CatalogFaker::new(3).catalog(2);
        let body = feed_json(&products);
        let parsed: serde_json::Value = serde_json::from_str(&body).expect("valid json");
        assert_eq!(parsed.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn noisy_feed_carries_extra_fields() {
        let products = CatalogFaker::new(3).catalog(1);
        let body = feed_json_with_noise(&products);
        assert!(body.contains("rating"));
        assert!(body.contains("category"));
    }
}
