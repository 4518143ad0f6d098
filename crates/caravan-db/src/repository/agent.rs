//! # Agent Repository
//!
//! Database operations for delivery agents and their province assignments.
//!
//! ## Agent ↔ Province Assignment
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Assignment Model                                      │
//! │                                                                         │
//! │   agents ──────┐                          ┌────── provinces            │
//! │                │                          │                            │
//! │                ▼                          ▼                            │
//! │          ┌──────────────────────────────────────┐                      │
//! │          │          agent_provinces             │                      │
//! │          │  (agent_id, province_id, date)       │                      │
//! │          └──────────────────────────────────────┘                      │
//! │                                                                         │
//! │  One agent covers many provinces; one province is covered by many      │
//! │  agents. Removing an assignment is guarded by deliveries that agent    │
//! │  carried into that province.                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use caravan_core::{
    Agent, AgentOverview, AgentPerformance, AgentProvinceCount, AssignedProvince, Province,
    StatsPeriod,
};

/// Input for creating an agent.
#[derive(Debug, Clone)]
pub struct NewAgent {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub commission_rate_bps: u32,
}

/// Input for updating an agent.
#[derive(Debug, Clone)]
pub struct UpdateAgent {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub commission_rate_bps: u32,
}

/// Statistics columns shared by `list_with_stats` and `search`.
///
/// Scalar subqueries keep the sums honest: a join over both deliveries and
/// assignments would multiply each commission row by the number of assigned
/// provinces.
const OVERVIEW_COLUMNS: &str = "a.id, a.name, a.phone, a.email, a.commission_rate_bps, a.created_at, \
     (SELECT COUNT(*) FROM deliveries d WHERE d.agent_id = a.id) AS total_deliveries, \
     (SELECT COALESCE(SUM(d.commission_cents), 0) FROM deliveries d WHERE d.agent_id = a.id) AS total_commission_cents, \
     (SELECT COUNT(*) FROM agent_provinces ap WHERE ap.agent_id = a.id) AS assigned_provinces_count, \
     (SELECT GROUP_CONCAT(p.name, ', ') FROM agent_provinces ap \
         JOIN provinces p ON p.id = ap.province_id \
         WHERE ap.agent_id = a.id) AS assigned_provinces";

/// Repository for agent database operations.
#[derive(Debug, Clone)]
pub struct AgentRepository {
    pool: SqlitePool,
}

impl AgentRepository {
    /// Creates a new AgentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AgentRepository { pool }
    }

    /// Lists all agents with workload statistics, ordered by name.
    pub async fn list_with_stats(&self) -> DbResult<Vec<AgentOverview>> {
        let sql = format!("SELECT {OVERVIEW_COLUMNS} FROM agents a ORDER BY a.name");

        let agents = sqlx::query_as::<_, AgentOverview>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(agents)
    }

    /// Gets an agent by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Agent>> {
        let agent = sqlx::query_as::<_, Agent>(
            "SELECT id, name, phone, email, commission_rate_bps, created_at \
             FROM agents WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(agent)
    }

    /// Creates a new agent.
    ///
    /// ## Returns
    /// * `Ok(Agent)` - Inserted agent with generated id
    /// * `Err(DbError::DuplicateName)` - Name already taken
    pub async fn create(&self, new: &NewAgent) -> DbResult<Agent> {
        debug!(name = %new.name, "Creating agent");

        let existing: Option<String> = sqlx::query_scalar("SELECT id FROM agents WHERE name = ?")
            .bind(&new.name)
            .fetch_optional(&self.pool)
            .await?;

        if existing.is_some() {
            return Err(DbError::duplicate_name("Agent", &new.name));
        }

        let agent = Agent {
            id: Uuid::new_v4().to_string(),
            name: new.name.clone(),
            phone: new.phone.clone(),
            email: new.email.clone(),
            commission_rate_bps: new.commission_rate_bps,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO agents (id, name, phone, email, commission_rate_bps, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&agent.id)
        .bind(&agent.name)
        .bind(&agent.phone)
        .bind(&agent.email)
        .bind(agent.commission_rate_bps)
        .bind(agent.created_at)
        .execute(&self.pool)
        .await?;

        Ok(agent)
    }

    /// Updates an existing agent.
    ///
    /// Changing the commission rate here does NOT touch commissions already
    /// snapshotted onto deliveries.
    ///
    /// ## Returns
    /// Affected-row count (always 1 on success).
    pub async fn update(&self, upd: &UpdateAgent) -> DbResult<u64> {
        debug!(id = %upd.id, "Updating agent");

        let conflict: Option<String> =
            sqlx::query_scalar("SELECT id FROM agents WHERE name = ? AND id != ?")
                .bind(&upd.name)
                .bind(&upd.id)
                .fetch_optional(&self.pool)
                .await?;

        if conflict.is_some() {
            return Err(DbError::duplicate_name("Agent", &upd.name));
        }

        let result = sqlx::query(
            "UPDATE agents SET name = ?, phone = ?, email = ?, commission_rate_bps = ? \
             WHERE id = ?",
        )
        .bind(&upd.name)
        .bind(&upd.phone)
        .bind(&upd.email)
        .bind(upd.commission_rate_bps)
        .bind(&upd.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Agent", &upd.id));
        }

        Ok(result.rows_affected())
    }

    /// Deletes an agent.
    ///
    /// Guarded by deliveries; assignment rows are swept in the same
    /// transaction as the agent row.
    pub async fn delete(&self, id: &str) -> DbResult<u64> {
        debug!(id = %id, "Deleting agent");

        let deliveries: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM deliveries WHERE agent_id = ?")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        if deliveries > 0 {
            return Err(DbError::referential("agent", "deliveries"));
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM agent_provinces WHERE agent_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM agents WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Agent", id));
        }

        tx.commit().await?;

        Ok(result.rows_affected())
    }

    /// Searches agents by name, email or phone (case-insensitive substring),
    /// with the same statistics columns as [`Self::list_with_stats`].
    /// An empty term lists everything.
    pub async fn search(&self, term: &str) -> DbResult<Vec<AgentOverview>> {
        let term = term.trim();

        debug!(term = %term, "Searching agents");

        if term.is_empty() {
            return self.list_with_stats().await;
        }

        let pattern = format!("%{}%", term);
        let sql = format!(
            "SELECT {OVERVIEW_COLUMNS} FROM agents a \
             WHERE a.name LIKE ? OR a.email LIKE ? OR a.phone LIKE ? \
             ORDER BY a.name"
        );

        let agents = sqlx::query_as::<_, AgentOverview>(&sql)
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .fetch_all(&self.pool)
            .await?;

        Ok(agents)
    }

    // =========================================================================
    // Province Assignments
    // =========================================================================

    /// Lists the provinces assigned to an agent, with assignment dates.
    pub async fn provinces(&self, agent_id: &str) -> DbResult<Vec<AssignedProvince>> {
        let provinces = sqlx::query_as::<_, AssignedProvince>(
            "SELECT p.id, p.name, ap.assignment_date \
             FROM provinces p \
             INNER JOIN agent_provinces ap ON ap.province_id = p.id \
             WHERE ap.agent_id = ? \
             ORDER BY p.name",
        )
        .bind(agent_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(provinces)
    }

    /// Lists the provinces NOT yet assigned to an agent.
    ///
    /// Feeds the assignment picker in the agent form.
    pub async fn available_provinces(&self, agent_id: &str) -> DbResult<Vec<Province>> {
        let provinces = sqlx::query_as::<_, Province>(
            "SELECT p.id, p.name, p.created_at \
             FROM provinces p \
             WHERE p.id NOT IN ( \
                 SELECT province_id FROM agent_provinces WHERE agent_id = ? \
             ) \
             ORDER BY p.name",
        )
        .bind(agent_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(provinces)
    }

    /// Assigns a province to an agent, stamping the assignment date.
    ///
    /// ## Errors
    /// * `DbError::AlreadyAssigned` - the pair already exists
    pub async fn assign_province(&self, agent_id: &str, province_id: &str) -> DbResult<()> {
        debug!(agent_id = %agent_id, province_id = %province_id, "Assigning province");

        let existing: Option<String> = sqlx::query_scalar(
            "SELECT agent_id FROM agent_provinces WHERE agent_id = ? AND province_id = ?",
        )
        .bind(agent_id)
        .bind(province_id)
        .fetch_optional(&self.pool)
        .await?;

        if existing.is_some() {
            return Err(DbError::AlreadyAssigned);
        }

        sqlx::query(
            "INSERT INTO agent_provinces (agent_id, province_id, assignment_date) \
             VALUES (?, ?, ?)",
        )
        .bind(agent_id)
        .bind(province_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Removes a province assignment from an agent.
    ///
    /// Guarded: the agent must have no deliveries into that province.
    pub async fn unassign_province(&self, agent_id: &str, province_id: &str) -> DbResult<u64> {
        debug!(agent_id = %agent_id, province_id = %province_id, "Removing province assignment");

        let deliveries: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM deliveries WHERE agent_id = ? AND province_id = ?",
        )
        .bind(agent_id)
        .bind(province_id)
        .fetch_one(&self.pool)
        .await?;
        if deliveries > 0 {
            return Err(DbError::referential("province assignment", "deliveries"));
        }

        let result =
            sqlx::query("DELETE FROM agent_provinces WHERE agent_id = ? AND province_id = ?")
                .bind(agent_id)
                .bind(province_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(
                "Assignment",
                format!("{agent_id}/{province_id}"),
            ));
        }

        Ok(result.rows_affected())
    }

    /// Lists agents with their assignment counts, ordered by name.
    pub async fn list_with_province_count(&self) -> DbResult<Vec<AgentProvinceCount>> {
        let agents = sqlx::query_as::<_, AgentProvinceCount>(
            "SELECT \
                 a.id, a.name, a.phone, a.email, a.commission_rate_bps, a.created_at, \
                 (SELECT COUNT(*) FROM agent_provinces ap WHERE ap.agent_id = a.id) AS province_count \
             FROM agents a \
             ORDER BY a.name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(agents)
    }

    /// Replaces an agent's province assignments with the given set.
    ///
    /// Delete + reinsert in one transaction; either the whole new set lands
    /// or the old set survives.
    pub async fn bulk_assign_provinces(
        &self,
        agent_id: &str,
        province_ids: &[String],
    ) -> DbResult<usize> {
        debug!(agent_id = %agent_id, count = province_ids.len(), "Bulk assigning provinces");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM agent_provinces WHERE agent_id = ?")
            .bind(agent_id)
            .execute(&mut *tx)
            .await?;

        for province_id in province_ids {
            sqlx::query(
                "INSERT INTO agent_provinces (agent_id, province_id, assignment_date) \
                 VALUES (?, ?, ?)",
            )
            .bind(agent_id)
            .bind(province_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(province_ids.len())
    }

    // =========================================================================
    // Performance
    // =========================================================================

    /// Performance rollup for one agent over a trailing reporting window.
    pub async fn performance(
        &self,
        agent_id: &str,
        period: StatsPeriod,
    ) -> DbResult<AgentPerformance> {
        const COLUMNS: &str = "COUNT(*) AS delivery_count, \
             COALESCE(SUM((SELECT SUM(di.quantity) FROM delivery_items di \
                           WHERE di.delivery_id = d.id)), 0) AS item_count, \
             COALESCE(SUM(d.commission_cents), 0) AS commission_earned_cents, \
             AVG(d.commission_cents) AS avg_commission_cents, \
             MAX(d.commission_cents) AS max_commission_cents, \
             MIN(d.commission_cents) AS min_commission_cents";

        let performance = match period.trailing_days() {
            Some(days) => {
                let cutoff = Utc::now().date_naive() - Duration::days(days);
                let sql = format!(
                    "SELECT {COLUMNS} FROM deliveries d \
                     WHERE d.agent_id = ? AND d.delivery_date >= ?"
                );
                sqlx::query_as::<_, AgentPerformance>(&sql)
                    .bind(agent_id)
                    .bind(cutoff)
                    .fetch_one(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("SELECT {COLUMNS} FROM deliveries d WHERE d.agent_id = ?");
                sqlx::query_as::<_, AgentPerformance>(&sql)
                    .bind(agent_id)
                    .fetch_one(&self.pool)
                    .await?
            }
        };

        Ok(performance)
    }
}
