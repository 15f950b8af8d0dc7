//! # Shipping Zone Repository
//!
//! Flat per-state shipping zones with a free-shipping threshold.
//!
//! Zone lookup is case-insensitive: states are stored lowercased and the
//! query lowercases its input. A destination with no zone row falls back to
//! the default charge inside `surplus_core::pricing::estimate_shipping`.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::DbResult;
use surplus_core::ShippingZone;

const ZONE_COLUMNS: &str = "id, state, base_charge_paise, free_shipping_threshold_paise";

/// Repository for shipping zone operations.
#[derive(Debug, Clone)]
pub struct ShippingRepository {
    pool: SqlitePool,
}

impl ShippingRepository {
    /// Creates a new ShippingRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ShippingRepository { pool }
    }

    /// Creates or replaces the zone for a state.
    pub async fn upsert_zone(
        &self,
        state: &str,
        base_charge_paise: i64,
        free_shipping_threshold_paise: i64,
    ) -> DbResult<ShippingZone> {
        let zone = ShippingZone {
            id: Uuid::new_v4().to_string(),
            state: state.trim().to_lowercase(),
            base_charge_paise,
            free_shipping_threshold_paise,
        };

        sqlx::query(
            r#"
            INSERT INTO shipping_zones (id, state, base_charge_paise, free_shipping_threshold_paise)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(state) DO UPDATE SET
                base_charge_paise = excluded.base_charge_paise,
                free_shipping_threshold_paise = excluded.free_shipping_threshold_paise
            "#,
        )
        .bind(&zone.id)
        .bind(&zone.state)
        .bind(zone.base_charge_paise)
        .bind(zone.free_shipping_threshold_paise)
        .execute(&self.pool)
        .await?;

        Ok(zone)
    }

    /// Finds the zone for a destination state, case-insensitively.
    pub async fn zone_for_state(&self, state: &str) -> DbResult<Option<ShippingZone>> {
        let zone = sqlx::query_as::<_, ShippingZone>(&format!(
            "SELECT {ZONE_COLUMNS} FROM shipping_zones WHERE state = ?1"
        ))
        .bind(state.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        Ok(zone)
    }

    /// Lists all configured zones.
    pub async fn list_zones(&self) -> DbResult<Vec<ShippingZone>> {
        let zones = sqlx::query_as::<_, ShippingZone>(&format!(
            "SELECT {ZONE_COLUMNS} FROM shipping_zones ORDER BY state"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(zones)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_zone_lookup_is_case_insensitive() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.shipping();

        repo.upsert_zone("Maharashtra", 50_000, 500_000).await.unwrap();

        let zone = repo.zone_for_state("MAHARASHTRA").await.unwrap().unwrap();
        assert_eq!(zone.state, "maharashtra");
        assert_eq!(zone.base_charge_paise, 50_000);

        assert!(repo.zone_for_state("goa").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_replaces_charges() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.shipping();

        repo.upsert_zone("karnataka", 40_000, 400_000).await.unwrap();
        repo.upsert_zone("karnataka", 45_000, 450_000).await.unwrap();

        let zones = repo.list_zones().await.unwrap();
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].base_charge_paise, 45_000);
    }
}
