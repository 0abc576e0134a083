// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use std::sync::mpsc::Sender;
use std::thread;
use tienda_app::{Product, ProductId};
use tienda_feed::Client;
use tienda_tui::{AppRuntime, FeedEvent, InternalEvent};

pub struct FeedRuntime {
    client: Client,
    greeting: String,
}

impl FeedRuntime {
    pub fn new(client: Client, greeting: String) -> Self {
        Self { client, greeting }
    }
}

impl AppRuntime for FeedRuntime {
    fn load_catalog(&mut self) -> Result<Vec<Product>> {
        self.client.fetch_products()
    }

    // The fetch must never block the interface thread.
    fn spawn_catalog_load(&mut self, tx: Sender<InternalEvent>) -> Result<()> {
        let client = self.client.clone();
        thread::spawn(move || {
            let event = match client.fetch_products() {
                Ok(products) => InternalEvent::Feed(FeedEvent::Loaded(products)),
                Err(error) => InternalEvent::Feed(FeedEvent::Failed(error.to_string())),
            };
            let _ = tx.send(event);
        });
        Ok(())
    }

    fn chat_greeting(&self) -> String {
        self.greeting.clone()
    }
}

/// Offline runtime behind `--demo`: serves a built-in catalog, no network.
pub struct DemoRuntime {
    greeting: String,
}

impl DemoRuntime {
    pub fn new(greeting: String) -> Self {
        Self { greeting }
    }
}

impl AppRuntime for DemoRuntime {
    fn load_catalog(&mut self) -> Result<Vec<Product>> {
        Ok(demo_catalog())
    }

    fn chat_greeting(&self) -> String {
        self.greeting.clone()
    }
}

fn demo_catalog() -> Vec<Product> {
    let entries: [(i64, &str, &str, f64); 6] = [
        (
            1,
            "Red Shirt",
            "Everyday cotton tee with a straight fit.",
            19.99,
        ),
        (
            2,
            "Canvas Backpack",
            "Two compartments, fits a 15 inch laptop.",
            54.50,
        ),
        (
            3,
            "Enamel Mug",
            "Camp-style mug, holds 350 ml.",
            7.25,
        ),
        (
            4,
            "Wool Scarf",
            "Mid-weight weave for shoulder seasons.",
            24.00,
        ),
        (
            5,
            "Desk Lamp",
            "Warm LED with a weighted base.",
            39.95,
        ),
        (
            6,
            "Denim Jacket",
            "Classic cut, pre-washed.",
            89.00,
        ),
    ];

    entries
        .into_iter()
        .map(|(id, title, description, price)| Product {
            id: ProductId::new(id),
            title: title.to_owned(),
            description: description.to_owned(),
            price,
            image: format!("https://img.example.com/demo/{id}.png"),
        })
        .collect()
}
