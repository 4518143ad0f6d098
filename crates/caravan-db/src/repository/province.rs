//! # Province Repository
//!
//! Database operations for provinces.
//!
//! ## Deletion Guard
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Province Deletion Guard                              │
//! │                                                                         │
//! │  delete(province_id)                                                   │
//! │       │                                                                 │
//! │       ├── deliveries referencing it? ──► ReferentialIntegrity          │
//! │       │                                   ("existing deliveries")       │
//! │       ├── agents assigned to it?     ──► ReferentialIntegrity          │
//! │       │                                   ("existing agents")           │
//! │       ├── customers living in it?    ──► ReferentialIntegrity          │
//! │       │                                   ("existing customers")        │
//! │       ▼                                                                 │
//! │  DELETE FROM provinces WHERE id = ?                                    │
//! │                                                                         │
//! │  The guard is application-level so the user sees WHICH dependent       │
//! │  type blocked the delete, not a raw constraint violation.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use caravan_core::{Province, ProvinceStats};

/// Repository for province database operations.
#[derive(Debug, Clone)]
pub struct ProvinceRepository {
    pool: SqlitePool,
}

impl ProvinceRepository {
    /// Creates a new ProvinceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProvinceRepository { pool }
    }

    /// Lists all provinces ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Province>> {
        let provinces = sqlx::query_as::<_, Province>(
            "SELECT id, name, created_at FROM provinces ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(provinces)
    }

    /// Gets a province by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Province))` - Province found
    /// * `Ok(None)` - Province not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Province>> {
        let province = sqlx::query_as::<_, Province>(
            "SELECT id, name, created_at FROM provinces WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(province)
    }

    /// Creates a new province.
    ///
    /// The name is the natural key: an exact-match (case-sensitive) check
    /// runs before the insert so a collision surfaces as a domain error,
    /// not a raw UNIQUE violation.
    ///
    /// ## Returns
    /// * `Ok(Province)` - Inserted province with generated id
    /// * `Err(DbError::DuplicateName)` - Name already taken
    pub async fn create(&self, name: &str) -> DbResult<Province> {
        debug!(name = %name, "Creating province");

        let existing: Option<String> =
            sqlx::query_scalar("SELECT id FROM provinces WHERE name = ?")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;

        if existing.is_some() {
            return Err(DbError::duplicate_name("Province", name));
        }

        let province = Province {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query("INSERT INTO provinces (id, name, created_at) VALUES (?, ?, ?)")
            .bind(&province.id)
            .bind(&province.name)
            .bind(province.created_at)
            .execute(&self.pool)
            .await?;

        Ok(province)
    }

    /// Renames a province.
    ///
    /// The duplicate check excludes the row's own id so saving a form
    /// without changing the name still succeeds.
    ///
    /// ## Returns
    /// Affected-row count (always 1 on success).
    pub async fn update(&self, id: &str, name: &str) -> DbResult<u64> {
        debug!(id = %id, name = %name, "Updating province");

        let conflict: Option<String> =
            sqlx::query_scalar("SELECT id FROM provinces WHERE name = ? AND id != ?")
                .bind(name)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        if conflict.is_some() {
            return Err(DbError::duplicate_name("Province", name));
        }

        let result = sqlx::query("UPDATE provinces SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Province", id));
        }

        Ok(result.rows_affected())
    }

    /// Deletes a province.
    ///
    /// Guards against dangling references: deliveries, agent assignments and
    /// customers are each checked first, and the error names whichever
    /// dependent type blocked the delete.
    pub async fn delete(&self, id: &str) -> DbResult<u64> {
        debug!(id = %id, "Deleting province");

        let deliveries: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM deliveries WHERE province_id = ?")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        if deliveries > 0 {
            return Err(DbError::referential("province", "deliveries"));
        }

        let agents: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM agent_provinces WHERE province_id = ?")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        if agents > 0 {
            return Err(DbError::referential("province", "agents"));
        }

        let customers: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM customers WHERE province_id = ?")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        if customers > 0 {
            return Err(DbError::referential("province", "customers"));
        }

        let result = sqlx::query("DELETE FROM provinces WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Province", id));
        }

        Ok(result.rows_affected())
    }

    /// Searches provinces by name (case-insensitive substring).
    ///
    /// An empty term lists everything, so the search box doubles as the
    /// unfiltered view.
    pub async fn search(&self, term: &str) -> DbResult<Vec<Province>> {
        let term = term.trim();

        debug!(term = %term, "Searching provinces");

        if term.is_empty() {
            return self.list().await;
        }

        let pattern = format!("%{}%", term);

        let provinces = sqlx::query_as::<_, Province>(
            "SELECT id, name, created_at FROM provinces WHERE name LIKE ? ORDER BY name",
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(provinces)
    }

    /// Lists provinces with delivery statistics.
    ///
    /// Provinces with no deliveries report zero counts, not NULL.
    pub async fn list_with_stats(&self) -> DbResult<Vec<ProvinceStats>> {
        let stats = sqlx::query_as::<_, ProvinceStats>(
            "SELECT \
                 p.id, \
                 p.name, \
                 p.created_at, \
                 COUNT(DISTINCT d.id) AS total_deliveries, \
                 COALESCE(SUM(di.quantity), 0) AS total_items \
             FROM provinces p \
             LEFT JOIN deliveries d ON d.province_id = p.id \
             LEFT JOIN delivery_items di ON di.delivery_id = d.id \
             GROUP BY p.id \
             ORDER BY p.name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(stats)
    }
}
