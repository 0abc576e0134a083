// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::time::Duration;
use tienda_app::{Product, ProductId};
use url::Url;

#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("feed.base_url must not be empty");
        }

        let parsed =
            Url::parse(&base_url).with_context(|| format!("invalid feed.base_url {base_url:?}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!(
                "feed.base_url must use http or https, got {:?}",
                parsed.scheme()
            );
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Issues the single catalog GET and normalizes the raw records into
    /// products. Any malformation in the body fails the whole fetch.
    pub fn fetch_products(&self) -> Result<Vec<Product>> {
        let response = self
            .http
            .get(format!("{}/products", self.base_url))
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        let records: Vec<FeedRecord> = response.json().context("decode product feed")?;
        normalize(records)
    }
}

fn normalize(records: Vec<FeedRecord>) -> Result<Vec<Product>> {
    let mut seen = BTreeSet::new();
    let mut products = Vec::with_capacity(records.len());

    for record in records {
        let product = Product {
            id: ProductId::new(record.id),
            title: record.title,
            description: record.description,
            price: record.price,
            image: record.image,
        };
        product.validate()?;
        if !seen.insert(product.id) {
            bail!("product feed repeats id {}", product.id.get());
        }
        products.push(product);
    }

    Ok(products)
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    anyhow!(
        "cannot reach {} -- check [feed] base_url or launch with --demo ({} )",
        base_url,
        error
    )
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body) {
        if let Some(error) = parsed.error
            && !error.is_empty()
        {
            return anyhow!("feed error ({}): {}", status.as_u16(), error);
        }
        if let Some(message) = parsed.message
            && !message.is_empty()
        {
            return anyhow!("feed error ({}): {}", status.as_u16(), message);
        }
    }

    if body.len() < 100 && !body.contains('{') && !body.trim().is_empty() {
        return anyhow!("feed error ({}): {}", status.as_u16(), body.trim());
    }

    anyhow!("feed returned {}", status.as_u16())
}

// Raw wire shape; anything beyond these fields is dropped at decode time.
#[derive(Debug, Deserialize)]
struct FeedRecord {
    id: i64,
    title: String,
    description: String,
    price: f64,
    image: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<String>,
    message: Option<String>,
}
