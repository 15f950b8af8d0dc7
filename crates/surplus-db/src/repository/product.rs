//! # Product Repository
//!
//! Database operations for surplus product listings.
//!
//! ## Key Operations
//! - CRUD for listings
//! - Stock adjustments
//! - Bulk fetch keyed by id, used by the cart staleness recompute and the
//!   checkout stock gate
//!
//! Cart lines snapshot a product at add time; every cart read comes back
//! here for the live row, so `get_map` is the hottest query in the crate.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::debug;

use crate::error::DbResult;
use surplus_core::{Product, ProductStatus};

const PRODUCT_COLUMNS: &str = "id, supplier_id, category_id, name, description, price_paise, \
     discount_bps, gst_rate_bps, stock, unit, condition, listing_type, status, \
     created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let product = repo.get_by_id("uuid-here").await?;
/// let live = repo.get_map(&["id-1".into(), "id-2".into()]).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a product listing.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, supplier_id, category_id, name, description, price_paise,
                discount_bps, gst_rate_bps, stock, unit, condition,
                listing_type, status, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
        )
        .bind(&product.id)
        .bind(&product.supplier_id)
        .bind(&product.category_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_paise)
        .bind(product.discount_bps)
        .bind(product.gst_rate_bps)
        .bind(product.stock)
        .bind(&product.unit)
        .bind(&product.condition)
        .bind(product.listing_type)
        .bind(product.status)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Fetches live product rows for a set of ids, keyed by id.
    ///
    /// Missing ids are simply absent from the map; the callers (staleness
    /// flags, stock gate) treat absence as "product gone".
    pub async fn get_map(&self, ids: &[String]) -> DbResult<HashMap<String, Product>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        // SQLite has no array binds; build the placeholder list by hand.
        let placeholders = (1..=ids.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id IN ({placeholders})");

        let mut query = sqlx::query_as::<_, Product>(&sql);
        for id in ids {
            query = query.bind(id);
        }

        let products = query.fetch_all(&self.pool).await?;

        Ok(products.into_iter().map(|p| (p.id.clone(), p)).collect())
    }

    /// Lists active listings, most recent first.
    pub async fn list_active(&self, limit: u32) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE status = 'active' ORDER BY created_at DESC LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Sets a product's live stock.
    pub async fn set_stock(&self, id: &str, stock: i64, now: DateTime<Utc>) -> DbResult<()> {
        debug!(id = %id, stock = stock, "Updating product stock");

        sqlx::query("UPDATE products SET stock = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(stock)
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Sets a product's price, in paise.
    pub async fn set_price(&self, id: &str, price_paise: i64, now: DateTime<Utc>) -> DbResult<()> {
        sqlx::query("UPDATE products SET price_paise = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(price_paise)
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Sets a product's lifecycle status.
    pub async fn set_status(&self, id: &str, status: ProductStatus, now: DateTime<Utc>) -> DbResult<()> {
        sqlx::query("UPDATE products SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use surplus_core::ListingType;

    pub(crate) fn sample_product(id: &str, price_paise: i64, stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            supplier_id: "supplier-1".to_string(),
            category_id: Some("cat-metals".to_string()),
            name: format!("Product {id}"),
            description: None,
            price_paise,
            discount_bps: 0,
            gst_rate_bps: 1800,
            stock,
            unit: "piece".to_string(),
            condition: "used".to_string(),
            listing_type: ListingType::FixedPrice,
            status: ProductStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        repo.insert(&sample_product("p-1", 100_000, 10)).await.unwrap();

        let found = repo.get_by_id("p-1").await.unwrap().unwrap();
        assert_eq!(found.price_paise, 100_000);
        assert_eq!(found.stock, 10);
        assert_eq!(found.status, ProductStatus::Active);

        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_map_skips_missing_ids() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        repo.insert(&sample_product("p-1", 50_000, 5)).await.unwrap();
        repo.insert(&sample_product("p-2", 75_000, 3)).await.unwrap();

        let map = repo
            .get_map(&["p-1".to_string(), "p-2".to_string(), "ghost".to_string()])
            .await
            .unwrap();

        assert_eq!(map.len(), 2);
        assert!(map.contains_key("p-1"));
        assert!(!map.contains_key("ghost"));
    }

    #[tokio::test]
    async fn test_stock_and_status_updates() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        repo.insert(&sample_product("p-1", 100_000, 10)).await.unwrap();

        repo.set_stock("p-1", 2, Utc::now()).await.unwrap();
        repo.set_status("p-1", ProductStatus::Inactive, Utc::now())
            .await
            .unwrap();

        let found = repo.get_by_id("p-1").await.unwrap().unwrap();
        assert_eq!(found.stock, 2);
        assert!(!found.is_active());
    }
}
