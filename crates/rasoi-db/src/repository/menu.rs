//! # Menu Repository
//!
//! Menu master maintenance. Order lines copy name, rate and GST settings
//! from here at the time of ordering, so edits never touch past bills.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use rasoi_core::MenuItem;

/// Repository for menu master operations.
#[derive(Debug, Clone)]
pub struct MenuRepository {
    pool: SqlitePool,
}

impl MenuRepository {
    /// Creates a new MenuRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MenuRepository { pool }
    }

    /// Lists orderable items, sorted by name.
    pub async fn list_active(&self) -> DbResult<Vec<MenuItem>> {
        let items = sqlx::query_as::<_, MenuItem>(
            r#"
            SELECT code, name, rate, gst_category, gst_rate, active
            FROM menu_items
            WHERE active = 1
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Gets an item by code (active or not).
    ///
    /// ## Returns
    /// * `Ok(Some(MenuItem))` - Item found
    /// * `Ok(None)` - No such code
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<MenuItem>> {
        let item = sqlx::query_as::<_, MenuItem>(
            r#"
            SELECT code, name, rate, gst_category, gst_rate, active
            FROM menu_items
            WHERE code = ?1
            "#,
        )
        .bind(code.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Inserts an item or replaces the one with the same code.
    pub async fn upsert(&self, item: &MenuItem) -> DbResult<()> {
        debug!(code = %item.code, "Upserting menu item");

        sqlx::query(
            r#"
            INSERT INTO menu_items (code, name, rate, gst_category, gst_rate, active)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT (code) DO UPDATE SET
                name = excluded.name,
                rate = excluded.rate,
                gst_category = excluded.gst_category,
                gst_rate = excluded.gst_rate,
                active = excluded.active
            "#,
        )
        .bind(&item.code)
        .bind(&item.name)
        .bind(item.rate)
        .bind(item.gst_category)
        .bind(item.gst_rate)
        .bind(item.active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Takes an item off the menu without deleting its history.
    pub async fn deactivate(&self, code: &str) -> DbResult<()> {
        debug!(code = %code, "Deactivating menu item");

        let result = sqlx::query("UPDATE menu_items SET active = 0 WHERE code = ?1")
            .bind(code)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("MenuItem", code));
        }

        Ok(())
    }

    /// Counts active items (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM menu_items WHERE active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
