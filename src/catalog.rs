//! # Product Catalog Module
//!
//! Read access to the catalog of purchasable products. Rows are mapped into
//! [`ProductRecord`] once, at this boundary, so the matcher and resolver work
//! with named fields only.
//!
//! - [`PgCatalog`]: the Postgres `ai.products` table
//! - [`InMemoryCatalog`]: a fixed snapshot, e.g. loaded from a JSON file
//! - [`CachedCatalog`]: read-through cache reusing one snapshot for a TTL

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::errors::CatalogError;

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductRecord {
    /// Canonical product name in the catalog's language
    #[sqlx(rename = "product_name")]
    #[serde(alias = "product_name")]
    pub name: String,
    /// Tax percentage and tax-inclusive price, e.g. "10% 108円"
    #[sqlx(rename = "tax")]
    #[serde(alias = "tax")]
    pub tax_descriptor: String,
    /// Tax-exclusive price as stored
    pub price: String,
    pub weight: f64,
    pub unit: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub is_vegan: Option<bool>,
}

impl ProductRecord {
    /// Build a record with the fields the matching pipeline needs
    pub fn new(name: &str, tax_descriptor: &str, price: &str, weight: f64, unit: &str) -> Self {
        Self {
            name: name.to_string(),
            tax_descriptor: tax_descriptor.to_string(),
            price: price.to_string(),
            weight,
            unit: unit.to_string(),
            brand: None,
            is_vegan: None,
        }
    }

    pub fn with_brand(mut self, brand: &str) -> Self {
        self.brand = Some(brand.to_string());
        self
    }

    pub fn with_vegan(mut self, is_vegan: bool) -> Self {
        self.is_vegan = Some(is_vegan);
        self
    }
}

/// Source of the full product list
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn fetch_products(&self) -> Result<Vec<ProductRecord>, CatalogError>;
}

const PRODUCTS_QUERY: &str = "
    SELECT DISTINCT ON (product_name)
        product_name,
        COALESCE(tax::TEXT, '') AS tax,
        COALESCE(price::TEXT, '') AS price,
        COALESCE(weight::FLOAT8, 0) AS weight,
        COALESCE(unit::TEXT, '') AS unit,
        brand,
        is_vegan
    FROM ai.products
    ORDER BY product_name";

/// Catalog backed by the Postgres `ai.products` table
#[derive(Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a small connection pool for catalog reads
    pub async fn connect(database_url: &str) -> Result<Self, CatalogError> {
        info!("Connecting to product catalog database");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await
            .map_err(|e| CatalogError::Connection(e.to_string()))?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ProductCatalog for PgCatalog {
    async fn fetch_products(&self) -> Result<Vec<ProductRecord>, CatalogError> {
        let products = sqlx::query_as::<_, ProductRecord>(PRODUCTS_QUERY)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Product fetch error: {}", e);
                CatalogError::from(e)
            })?;

        info!("Fetched {} products from catalog", products.len());
        Ok(products)
    }
}

/// Create the catalog schema if it does not exist
pub async fn init_catalog_schema(pool: &PgPool) -> anyhow::Result<()> {
    info!("Initializing catalog schema...");

    sqlx::query("CREATE SCHEMA IF NOT EXISTS ai")
        .execute(pool)
        .await
        .context("Failed to create ai schema")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS ai.products (
            product_id SERIAL PRIMARY KEY,
            product_name TEXT NOT NULL,
            tax TEXT NOT NULL DEFAULT '',
            price NUMERIC(10, 2) NOT NULL DEFAULT 0,
            stock_quantity INTEGER NOT NULL DEFAULT 0,
            category TEXT,
            weight DOUBLE PRECISION NOT NULL DEFAULT 0,
            unit TEXT NOT NULL DEFAULT '',
            brand TEXT,
            expiry_date DATE,
            is_vegan BOOLEAN
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create products table")?;

    info!("Catalog schema initialized successfully");
    Ok(())
}

/// Insert one product row, returning its id
pub async fn insert_product(pool: &PgPool, product: &ProductRecord) -> anyhow::Result<i32> {
    let price: f64 = product.price.trim().parse().unwrap_or(0.0);

    let row: (i32,) = sqlx::query_as(
        "INSERT INTO ai.products (product_name, tax, price, weight, unit, brand, is_vegan)
         VALUES ($1, $2, $3::FLOAT8::NUMERIC, $4, $5, $6, $7)
         RETURNING product_id",
    )
    .bind(&product.name)
    .bind(&product.tax_descriptor)
    .bind(price)
    .bind(product.weight)
    .bind(&product.unit)
    .bind(&product.brand)
    .bind(product.is_vegan)
    .fetch_one(pool)
    .await
    .context("Failed to insert product")?;

    debug!("Inserted product '{}' with id {}", product.name, row.0);
    Ok(row.0)
}

/// A fixed product snapshot, deduplicated by name (first occurrence wins)
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    products: Vec<ProductRecord>,
}

impl InMemoryCatalog {
    pub fn new(products: Vec<ProductRecord>) -> Self {
        let mut seen = HashSet::new();
        let products = products
            .into_iter()
            .filter(|product| seen.insert(product.name.clone()))
            .collect();
        Self { products }
    }

    /// Load a JSON array of product records
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file {}", path.display()))?;
        let products: Vec<ProductRecord> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse catalog file {}", path.display()))?;
        Ok(Self::new(products))
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[async_trait]
impl ProductCatalog for InMemoryCatalog {
    async fn fetch_products(&self) -> Result<Vec<ProductRecord>, CatalogError> {
        Ok(self.products.clone())
    }
}

struct Snapshot {
    products: Arc<Vec<ProductRecord>>,
    fetched_at: Instant,
}

/// Read-through cache over a [`ProductCatalog`]
///
/// One snapshot is shared by all reads within `ttl`. Failed reads are not
/// cached and are returned to the caller as-is.
pub struct CachedCatalog {
    source: Arc<dyn ProductCatalog>,
    ttl: Duration,
    snapshot: Mutex<Option<Snapshot>>,
}

impl CachedCatalog {
    pub fn new(source: Arc<dyn ProductCatalog>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            snapshot: Mutex::new(None),
        }
    }

    /// The current snapshot, refreshed from the source when stale
    pub async fn products(&self) -> Result<Arc<Vec<ProductRecord>>, CatalogError> {
        let mut snapshot = self.snapshot.lock().await;

        if let Some(current) = snapshot.as_ref() {
            if current.fetched_at.elapsed() < self.ttl {
                debug!("Reusing catalog snapshot of {} products", current.products.len());
                return Ok(Arc::clone(&current.products));
            }
        }

        let products = Arc::new(self.source.fetch_products().await?);
        *snapshot = Some(Snapshot {
            products: Arc::clone(&products),
            fetched_at: Instant::now(),
        });
        Ok(products)
    }

    /// Drop the current snapshot so the next read goes to the source
    pub async fn invalidate(&self) {
        *self.snapshot.lock().await = None;
    }
}
