//! # Delivery Repository
//!
//! Database operations for deliveries and their line items - the one place
//! in Caravan that needs multi-statement atomicity.
//!
//! ## Delivery Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Delivery Creation                                 │
//! │                                                                         │
//! │  1. GENERATE TRACKING NUMBER                                           │
//! │     └── "DEL" + millisecond timestamp + 0-999 suffix                   │
//! │                                                                         │
//! │  2. TOTAL THE ITEMS                                                    │
//! │     └── total_cost = Σ(unit_cost × quantity)                           │
//! │     └── missing selling prices default to unit_cost × 1.3              │
//! │                                                                         │
//! │  3. SNAPSHOT THE COMMISSION           ┐                                │
//! │     └── total_cost × agent rate       │                                │
//! │  4. INSERT delivery header            │  ONE TRANSACTION               │
//! │  5. INSERT each line item             │  (all or nothing)              │
//! │  6. COMMIT                            ┘                                │
//! │                                                                         │
//! │  Any failure inside 3-5 rolls the whole attempt back; no header        │
//! │  without its items, no items without their header.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Commission Snapshot Pattern
//! The commission is computed from the agent's rate AT WRITE TIME and stored
//! on the delivery. Editing the agent's rate later leaves old deliveries
//! untouched - the books must not rewrite themselves.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use caravan_core::{
    CommissionRate, Delivery, DeliveryDetail, DeliveryItem, DeliveryStats, DeliveryStatus,
    DeliverySummary, Money, TRACKING_NUMBER_PREFIX,
};

// =============================================================================
// Input Types
// =============================================================================

/// A line item as submitted by the delivery form.
#[derive(Debug, Clone)]
pub struct NewDeliveryItem {
    pub item_name: String,
    pub description: Option<String>,
    pub unit_cost_cents: i64,
    /// Defaults to `unit_cost × 1.3` when omitted.
    pub selling_price_cents: Option<i64>,
    pub quantity: i64,
}

/// Input for creating a delivery with its items.
#[derive(Debug, Clone, Default)]
pub struct NewDelivery {
    pub customer_id: Option<String>,
    pub agent_id: Option<String>,
    pub province_id: Option<String>,
    /// Defaults to today.
    pub delivery_date: Option<NaiveDate>,
    /// Defaults to `pending`.
    pub status: Option<DeliveryStatus>,
    pub items: Vec<NewDeliveryItem>,
}

/// Input for updating a delivery; items are replaced wholesale.
#[derive(Debug, Clone)]
pub struct UpdateDelivery {
    pub delivery_id: String,
    pub customer_id: Option<String>,
    pub agent_id: Option<String>,
    pub province_id: Option<String>,
    pub delivery_date: Option<NaiveDate>,
    pub status: Option<DeliveryStatus>,
    pub items: Vec<NewDeliveryItem>,
}

/// What the caller gets back from a successful create.
#[derive(Debug, Clone)]
pub struct CreatedDelivery {
    pub delivery_id: String,
    pub tracking_number: String,
}

// =============================================================================
// Shared Query Fragments
// =============================================================================

/// Header columns in the order the [`Delivery`] row type expects.
const DELIVERY_COLUMNS: &str = "id, tracking_number, customer_id, agent_id, province_id, \
     commission_cents, delivery_date, status, created_at";

/// List/search/date-range rows: header + derived totals + joined names.
/// Totals come from the items on every read; they are never stored.
const SUMMARY_SELECT: &str = "SELECT \
         d.id, d.tracking_number, d.customer_id, d.agent_id, d.province_id, \
         d.commission_cents, d.delivery_date, d.status, d.created_at, \
         COALESCE(SUM(di.quantity), 0) AS total_quantity, \
         COALESCE(SUM(di.unit_cost_cents * di.quantity), 0) AS total_cost_cents, \
         COALESCE(SUM(di.selling_price_cents * di.quantity), 0) AS total_selling_cents, \
         COALESCE(SUM(di.selling_price_cents * di.quantity), 0) \
             - COALESCE(SUM(di.unit_cost_cents * di.quantity), 0) \
             - d.commission_cents AS net_profit_cents, \
         a.name AS agent_name, \
         p.name AS province_name, \
         c.name AS customer_name \
     FROM deliveries d \
     LEFT JOIN delivery_items di ON di.delivery_id = d.id \
     LEFT JOIN agents a ON a.id = d.agent_id \
     LEFT JOIN provinces p ON p.id = d.province_id \
     LEFT JOIN customers c ON c.id = d.customer_id";

const SUMMARY_TAIL: &str = "GROUP BY d.id ORDER BY d.delivery_date DESC, d.created_at DESC";

// =============================================================================
// Repository
// =============================================================================

/// Repository for delivery database operations.
#[derive(Debug, Clone)]
pub struct DeliveryRepository {
    pool: SqlitePool,
}

impl DeliveryRepository {
    /// Creates a new DeliveryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DeliveryRepository { pool }
    }

    /// Creates a delivery together with its line items, atomically.
    ///
    /// ## What This Does
    /// 1. Generates the tracking number
    /// 2. Totals the items (`Σ unit_cost × quantity`)
    /// 3. Snapshots the commission from the agent's current rate
    /// 4. Inserts the header, then every item, in one transaction
    ///
    /// Items are inserted as given; missing selling prices default to
    /// `unit_cost × 1.3`. Input validation (non-empty items, sane numbers)
    /// belongs to the command layer - this method trusts its caller and lets
    /// the schema constraints backstop it.
    pub async fn create(&self, new: &NewDelivery) -> DbResult<CreatedDelivery> {
        let id = Uuid::new_v4().to_string();
        let tracking_number = generate_tracking_number();
        let now = Utc::now();
        let delivery_date = new.delivery_date.unwrap_or_else(|| now.date_naive());
        let status = new.status.unwrap_or_default();

        debug!(
            id = %id,
            tracking_number = %tracking_number,
            items = new.items.len(),
            "Creating delivery"
        );

        let total_cost = items_total_cost(&new.items);

        let mut tx = self.pool.begin().await?;

        let commission = match new.agent_id.as_deref() {
            Some(agent_id) if total_cost.is_positive() => {
                let rate: Option<u32> =
                    sqlx::query_scalar("SELECT commission_rate_bps FROM agents WHERE id = ?")
                        .bind(agent_id)
                        .fetch_optional(&mut *tx)
                        .await?;
                match rate {
                    Some(bps) => total_cost.calculate_commission(CommissionRate::from_bps(bps)),
                    None => Money::zero(),
                }
            }
            _ => Money::zero(),
        };

        sqlx::query(
            "INSERT INTO deliveries \
             (id, tracking_number, customer_id, agent_id, province_id, \
              commission_cents, delivery_date, status, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&tracking_number)
        .bind(&new.customer_id)
        .bind(&new.agent_id)
        .bind(&new.province_id)
        .bind(commission.cents())
        .bind(delivery_date)
        .bind(status)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        insert_items(&mut tx, &id, &new.items, now).await?;

        tx.commit().await?;

        Ok(CreatedDelivery {
            delivery_id: id,
            tracking_number,
        })
    }

    /// Updates a delivery and replaces its items, atomically.
    ///
    /// ## Commission Rule
    /// - Agent supplied → recompute the snapshot from that agent's current
    ///   rate and the new item totals
    /// - No agent → read the stored snapshot back INSIDE the transaction and
    ///   carry it through the header overwrite
    ///
    /// ## Item Identity
    /// Items are deleted and reinserted wholesale (replace-all, not
    /// diff/merge); item ids do not survive an edit.
    pub async fn update(&self, upd: &UpdateDelivery) -> DbResult<u64> {
        let now = Utc::now();
        let delivery_date = upd.delivery_date.unwrap_or_else(|| now.date_naive());
        let status = upd.status.unwrap_or_default();

        debug!(id = %upd.delivery_id, items = upd.items.len(), "Updating delivery");

        let total_cost = items_total_cost(&upd.items);

        let mut tx = self.pool.begin().await?;

        let commission = match upd.agent_id.as_deref() {
            Some(agent_id) if total_cost.is_positive() => {
                let rate: Option<u32> =
                    sqlx::query_scalar("SELECT commission_rate_bps FROM agents WHERE id = ?")
                        .bind(agent_id)
                        .fetch_optional(&mut *tx)
                        .await?;
                match rate {
                    Some(bps) => total_cost.calculate_commission(CommissionRate::from_bps(bps)),
                    None => Money::zero(),
                }
            }
            _ => {
                let stored: Option<i64> =
                    sqlx::query_scalar("SELECT commission_cents FROM deliveries WHERE id = ?")
                        .bind(&upd.delivery_id)
                        .fetch_optional(&mut *tx)
                        .await?;
                Money::from_cents(stored.unwrap_or(0))
            }
        };

        let result = sqlx::query(
            "UPDATE deliveries SET \
                 customer_id = ?, agent_id = ?, province_id = ?, \
                 commission_cents = ?, delivery_date = ?, status = ? \
             WHERE id = ?",
        )
        .bind(&upd.customer_id)
        .bind(&upd.agent_id)
        .bind(&upd.province_id)
        .bind(commission.cents())
        .bind(delivery_date)
        .bind(status)
        .bind(&upd.delivery_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Delivery", &upd.delivery_id));
        }

        sqlx::query("DELETE FROM delivery_items WHERE delivery_id = ?")
            .bind(&upd.delivery_id)
            .execute(&mut *tx)
            .await?;

        insert_items(&mut tx, &upd.delivery_id, &upd.items, now).await?;

        tx.commit().await?;

        Ok(result.rows_affected())
    }

    /// Deletes a delivery and its items, atomically.
    pub async fn delete(&self, id: &str) -> DbResult<u64> {
        debug!(id = %id, "Deleting delivery");

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM delivery_items WHERE delivery_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM deliveries WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Delivery", id));
        }

        tx.commit().await?;

        Ok(result.rows_affected())
    }

    /// Sets a delivery's status.
    ///
    /// A plain field mutation, not a state machine: any status may follow
    /// any other. Status strings are validated into [`DeliveryStatus`]
    /// before they get here.
    pub async fn update_status(&self, id: &str, status: DeliveryStatus) -> DbResult<u64> {
        debug!(id = %id, status = %status, "Updating delivery status");

        let result = sqlx::query("UPDATE deliveries SET status = ? WHERE id = ?")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Delivery", id));
        }

        Ok(result.rows_affected())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Lists all deliveries with derived totals, newest first.
    pub async fn list(&self) -> DbResult<Vec<DeliverySummary>> {
        let sql = format!("{SUMMARY_SELECT} {SUMMARY_TAIL}");

        let deliveries = sqlx::query_as::<_, DeliverySummary>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(deliveries)
    }

    /// Gets a fully hydrated delivery: header, contacts, items, totals.
    ///
    /// ## Returns
    /// * `Ok(Some(DeliveryDetail))` - Delivery found
    /// * `Ok(None)` - Delivery not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<DeliveryDetail>> {
        let sql = format!("SELECT {DELIVERY_COLUMNS} FROM deliveries WHERE id = ?");
        let delivery: Option<Delivery> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(delivery) = delivery else {
            return Ok(None);
        };

        let contacts: (
            Option<String>,
            Option<String>,
            Option<String>,
            Option<u32>,
            Option<String>,
            Option<String>,
        ) = sqlx::query_as(
            "SELECT a.name, a.email, a.phone, a.commission_rate_bps, p.name, c.name \
             FROM deliveries d \
             LEFT JOIN agents a ON a.id = d.agent_id \
             LEFT JOIN provinces p ON p.id = d.province_id \
             LEFT JOIN customers c ON c.id = d.customer_id \
             WHERE d.id = ?",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        let items = self.items(id).await?;

        Ok(Some(assemble_detail(delivery, contacts, items)))
    }

    /// Gets the line items of a delivery in insertion order.
    pub async fn items(&self, delivery_id: &str) -> DbResult<Vec<DeliveryItem>> {
        let items = sqlx::query_as::<_, DeliveryItem>(
            "SELECT id, delivery_id, item_name, description, unit_cost_cents, \
                    selling_price_cents, quantity, created_at \
             FROM delivery_items \
             WHERE delivery_id = ? \
             ORDER BY created_at, id",
        )
        .bind(delivery_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Searches deliveries by tracking number, agent name or item name.
    /// An empty term lists everything.
    pub async fn search(&self, term: &str) -> DbResult<Vec<DeliverySummary>> {
        let term = term.trim();

        debug!(term = %term, "Searching deliveries");

        if term.is_empty() {
            return self.list().await;
        }

        let pattern = format!("%{}%", term);
        let sql = format!(
            "{SUMMARY_SELECT} \
             WHERE d.tracking_number LIKE ? \
                OR a.name LIKE ? \
                OR EXISTS ( \
                    SELECT 1 FROM delivery_items di2 \
                    WHERE di2.delivery_id = d.id AND di2.item_name LIKE ? \
                ) \
             {SUMMARY_TAIL}"
        );

        let deliveries = sqlx::query_as::<_, DeliverySummary>(&sql)
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .fetch_all(&self.pool)
            .await?;

        Ok(deliveries)
    }

    /// Lists deliveries whose date falls in the inclusive range.
    pub async fn by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DbResult<Vec<DeliverySummary>> {
        let sql = format!("{SUMMARY_SELECT} WHERE d.delivery_date BETWEEN ? AND ? {SUMMARY_TAIL}");

        let deliveries = sqlx::query_as::<_, DeliverySummary>(&sql)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;

        Ok(deliveries)
    }

    /// Invoice detail for a delivery.
    ///
    /// Same shape as [`Self::get_by_id`], but a missing delivery is an error
    /// here - there is nothing to print.
    pub async fn invoice_details(&self, id: &str) -> DbResult<DeliveryDetail> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Delivery", id))
    }

    /// Global delivery statistics for the dashboard.
    ///
    /// Scalar subqueries, one per figure: joining deliveries to items and
    /// summing header columns would multiply each commission by the item
    /// count. Empty tables report zeros, not NULLs.
    pub async fn stats(&self) -> DbResult<DeliveryStats> {
        let stats = sqlx::query_as::<_, DeliveryStats>(
            "SELECT \
                 (SELECT COUNT(*) FROM deliveries) AS total_deliveries, \
                 COALESCE((SELECT SUM(quantity) FROM delivery_items), 0) AS total_items, \
                 COALESCE((SELECT SUM(unit_cost_cents * quantity) FROM delivery_items), 0) \
                     AS total_item_cost_cents, \
                 COALESCE((SELECT SUM(commission_cents) FROM deliveries), 0) \
                     AS total_commission_cents, \
                 COALESCE((SELECT SUM(selling_price_cents * quantity) FROM delivery_items), 0) \
                     AS total_revenue_cents, \
                 COALESCE((SELECT SUM(selling_price_cents * quantity) FROM delivery_items), 0) \
                     - COALESCE((SELECT SUM(unit_cost_cents * quantity) FROM delivery_items), 0) \
                     - COALESCE((SELECT SUM(commission_cents) FROM deliveries), 0) \
                     AS total_profit_cents, \
                 (SELECT COUNT(*) FROM deliveries WHERE status = 'pending') \
                     AS pending_deliveries, \
                 (SELECT COUNT(*) FROM deliveries WHERE status = 'in_transit') \
                     AS in_transit_deliveries, \
                 (SELECT COUNT(*) FROM deliveries WHERE status = 'delivered') \
                     AS delivered_deliveries, \
                 (SELECT COUNT(*) FROM deliveries WHERE status = 'cancelled') \
                     AS cancelled_deliveries",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Total cost over submitted items: `Σ(unit_cost × quantity)`.
fn items_total_cost(items: &[NewDeliveryItem]) -> Money {
    items.iter().fold(Money::zero(), |acc, item| {
        acc + Money::from_cents(item.unit_cost_cents).multiply_quantity(item.quantity)
    })
}

/// Inserts the item rows for a delivery inside the caller's transaction.
async fn insert_items(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    delivery_id: &str,
    items: &[NewDeliveryItem],
    now: DateTime<Utc>,
) -> DbResult<()> {
    for item in items {
        let selling_price = match item.selling_price_cents {
            Some(cents) => Money::from_cents(cents),
            None => Money::from_cents(item.unit_cost_cents).with_default_markup(),
        };

        sqlx::query(
            "INSERT INTO delivery_items \
             (id, delivery_id, item_name, description, unit_cost_cents, \
              selling_price_cents, quantity, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(delivery_id)
        .bind(&item.item_name)
        .bind(&item.description)
        .bind(item.unit_cost_cents)
        .bind(selling_price.cents())
        .bind(item.quantity)
        .bind(now)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

/// Builds the hydrated detail view, recomputing totals from the items.
fn assemble_detail(
    delivery: Delivery,
    contacts: (
        Option<String>,
        Option<String>,
        Option<String>,
        Option<u32>,
        Option<String>,
        Option<String>,
    ),
    items: Vec<DeliveryItem>,
) -> DeliveryDetail {
    let (agent_name, agent_email, agent_phone, agent_commission_rate_bps, province_name, customer_name) =
        contacts;

    let total_quantity: i64 = items.iter().map(|i| i.quantity).sum();
    let total_cost = items
        .iter()
        .fold(Money::zero(), |acc, i| acc + i.total_cost());
    let total_selling = items
        .iter()
        .fold(Money::zero(), |acc, i| acc + i.total_revenue());
    let net_profit = total_selling - total_cost - delivery.commission();

    DeliveryDetail {
        delivery,
        agent_name,
        agent_email,
        agent_phone,
        agent_commission_rate_bps,
        province_name,
        customer_name,
        items,
        total_quantity,
        total_cost_cents: total_cost.cents(),
        total_selling_cents: total_selling.cents(),
        net_profit_cents: net_profit.cents(),
    }
}

// =============================================================================
// Tracking Numbers
// =============================================================================

static TRACKING_SEQUENCE: OnceLock<AtomicU32> = OnceLock::new();

/// Generates a tracking number: `DEL` + millisecond timestamp + 0-999 suffix.
///
/// ## Example
/// `DEL1754524800123042`
///
/// The suffix cycles through 0-999, seeded from the clock at first use, so
/// calls within the same millisecond still get distinct suffixes. Uniqueness
/// across processes is probabilistic; the UNIQUE constraint on
/// `deliveries.tracking_number` is the actual guarantee.
pub fn generate_tracking_number() -> String {
    let sequence = TRACKING_SEQUENCE.get_or_init(|| {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.subsec_nanos())
            .unwrap_or(0);
        AtomicU32::new(nanos)
    });

    let suffix = sequence.fetch_add(1, Ordering::Relaxed) % 1000;
    let millis = Utc::now().timestamp_millis();

    format!("{TRACKING_NUMBER_PREFIX}{millis}{suffix}")
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Format plus practical distinctness in one test: the suffix cycle is
    /// exactly as long as a 1000-iteration loop, so a tight loop must never
    /// repeat. (Single test so no parallel test shares the sequence.)
    #[test]
    fn test_tracking_number_format_and_distinctness() {
        let tracking = generate_tracking_number();

        assert!(tracking.starts_with(TRACKING_NUMBER_PREFIX));
        let digits = &tracking[TRACKING_NUMBER_PREFIX.len()..];
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
        // 13-digit millisecond timestamp plus a 1-3 digit suffix
        assert!(digits.len() >= 14 && digits.len() <= 16);

        let generated: std::collections::HashSet<String> =
            (0..1000).map(|_| generate_tracking_number()).collect();

        assert_eq!(generated.len(), 1000);
    }

    #[test]
    fn test_items_total_cost() {
        let items = vec![
            NewDeliveryItem {
                item_name: "Box".to_string(),
                description: None,
                unit_cost_cents: 5000,
                selling_price_cents: None,
                quantity: 2,
            },
            NewDeliveryItem {
                item_name: "Crate".to_string(),
                description: None,
                unit_cost_cents: 1000,
                selling_price_cents: Some(1500),
                quantity: 3,
            },
        ];

        assert_eq!(items_total_cost(&items).cents(), 13_000);
    }

    #[test]
    fn test_items_total_cost_empty() {
        assert!(items_total_cost(&[]).is_zero());
    }
}
