//! # Domain Types
//!
//! Core domain types used throughout Caravan.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Province     │   │     Agent       │   │    Customer     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  name (unique)  │   │  name (unique)  │   │  name           │       │
//! │  │                 │   │  commission bps │   │  province (FK)  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Delivery     │   │  DeliveryItem   │   │ DeliveryStatus  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  Pending        │       │
//! │  │  tracking_no    │   │  delivery (FK)  │   │  InTransit      │       │
//! │  │  commission     │   │  cost/price/qty │   │  Delivered      │       │
//! │  │  status         │   │                 │   │  Cancelled      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! A delivery has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - `tracking_number`: human-visible business identifier printed on invoices
//!
//! ## Derived Totals
//! A delivery's totals (`total_quantity`, `total_cost`, `total_selling_price`,
//! `net_profit`) are never stored; they are recomputed from line items on
//! every read. The one stored monetary field on the delivery itself is the
//! commission snapshot.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Commission Rate
// =============================================================================

/// Agent commission rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1500 bps = 15%. Rates arrive from the UI as percentages but are stored
/// and computed with as integers, so `12.5%` survives round-trips exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CommissionRate(u32);

impl CommissionRate {
    /// Creates a commission rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        CommissionRate(bps)
    }

    /// Creates a commission rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        CommissionRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero commission rate.
    #[inline]
    pub const fn zero() -> Self {
        CommissionRate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for CommissionRate {
    fn default() -> Self {
        CommissionRate::zero()
    }
}

// =============================================================================
// Delivery Status
// =============================================================================

/// The status of a delivery.
///
/// Wire values are stable across the whole surface:
/// `"pending" | "in_transit" | "delivered" | "cancelled"`.
///
/// Transitions are deliberately unguarded: any status may follow any other.
/// The dispatch office corrects mis-keyed statuses by simply setting the
/// right one, including `delivered → pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Registered, not yet picked up.
    Pending,
    /// On the road.
    InTransit,
    /// Arrived at the customer.
    Delivered,
    /// Called off; kept for the books.
    Cancelled,
}

impl DeliveryStatus {
    /// All allowed statuses, in lifecycle order.
    pub const ALL: [DeliveryStatus; 4] = [
        DeliveryStatus::Pending,
        DeliveryStatus::InTransit,
        DeliveryStatus::Delivered,
        DeliveryStatus::Cancelled,
    ];

    /// Parses a wire-level status string.
    ///
    /// ## Errors
    /// `CoreError::InvalidStatus` for anything outside the four-member enum,
    /// e.g. `"shipped"`.
    pub fn parse(value: &str) -> Result<Self, crate::error::CoreError> {
        match value {
            "pending" => Ok(DeliveryStatus::Pending),
            "in_transit" => Ok(DeliveryStatus::InTransit),
            "delivered" => Ok(DeliveryStatus::Delivered),
            "cancelled" => Ok(DeliveryStatus::Cancelled),
            other => Err(crate::error::CoreError::InvalidStatus {
                value: other.to_string(),
            }),
        }
    }

    /// Returns the stable wire-level string for this status.
    pub const fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::InTransit => "in_transit",
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for DeliveryStatus {
    fn default() -> Self {
        DeliveryStatus::Pending
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Province
// =============================================================================

/// A province the business delivers to.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Province {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Province name - the natural key, unique across the table.
    pub name: String,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A province row with delivery statistics attached.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ProvinceStats {
    pub id: String,
    pub name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    /// Number of deliveries destined for this province.
    pub total_deliveries: i64,
    /// Summed item quantity over those deliveries (zero when none).
    pub total_items: i64,
}

// =============================================================================
// Agent
// =============================================================================

/// A delivery agent earning commission on the goods they move.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Agent {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Agent name - the natural key, unique across the table.
    pub name: String,

    pub phone: String,

    pub email: Option<String>,

    /// Commission rate in basis points (1500 = 15%).
    pub commission_rate_bps: u32,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Agent {
    /// Returns the commission rate.
    #[inline]
    pub fn commission_rate(&self) -> CommissionRate {
        CommissionRate::from_bps(self.commission_rate_bps)
    }
}

/// An agent row with workload statistics attached.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct AgentOverview {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub commission_rate_bps: u32,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    /// Number of deliveries carried by this agent.
    pub total_deliveries: i64,
    /// Commission earned across all their deliveries (snapshot sums).
    pub total_commission_cents: i64,
    /// How many provinces they are assigned to cover.
    pub assigned_provinces_count: i64,
    /// Comma-joined assigned province names, for list display.
    pub assigned_provinces: Option<String>,
}

/// An agent row with just the assignment count.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct AgentProvinceCount {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub commission_rate_bps: u32,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub province_count: i64,
}

/// A province assigned to an agent, with the assignment date.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct AssignedProvince {
    pub id: String,
    pub name: String,
    #[ts(as = "String")]
    pub assignment_date: DateTime<Utc>,
}

/// Performance rollup for a single agent over a reporting period.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct AgentPerformance {
    pub delivery_count: i64,
    pub item_count: i64,
    pub commission_earned_cents: i64,
    pub avg_commission_cents: Option<f64>,
    pub max_commission_cents: Option<i64>,
    pub min_commission_cents: Option<i64>,
}

/// Reporting window for agent performance queries.
///
/// Unrecognized period strings fall back to all-time rather than erroring,
/// matching how the reporting screen has always treated them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatsPeriod {
    Week,
    Month,
    Year,
    AllTime,
}

impl StatsPeriod {
    /// Parses a period string (`"week"`, `"month"`, `"year"`); anything else
    /// means all-time.
    pub fn parse(value: &str) -> Self {
        match value {
            "week" => StatsPeriod::Week,
            "month" => StatsPeriod::Month,
            "year" => StatsPeriod::Year,
            _ => StatsPeriod::AllTime,
        }
    }

    /// The trailing number of days this window covers, `None` for all-time.
    pub const fn trailing_days(&self) -> Option<i64> {
        match self {
            StatsPeriod::Week => Some(7),
            StatsPeriod::Month => Some(30),
            StatsPeriod::Year => Some(365),
            StatsPeriod::AllTime => None,
        }
    }
}

impl Default for StatsPeriod {
    fn default() -> Self {
        StatsPeriod::Month
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer receiving deliveries.
///
/// Customer names are not natural keys - two customers may share a name,
/// unlike provinces and agents.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub province_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A customer row joined with the name of their home province.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CustomerRecord {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub province_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub province_name: Option<String>,
}

// =============================================================================
// Delivery
// =============================================================================

/// A delivery header row.
///
/// `commission_cents` is a snapshot: computed from the agent's rate at write
/// time and never touched again when the rate changes.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Delivery {
    pub id: String,
    pub tracking_number: String,
    pub customer_id: Option<String>,
    pub agent_id: Option<String>,
    pub province_id: Option<String>,
    pub commission_cents: i64,
    #[ts(as = "String")]
    pub delivery_date: NaiveDate,
    pub status: DeliveryStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Delivery {
    /// Returns the commission snapshot as Money.
    #[inline]
    pub fn commission(&self) -> Money {
        Money::from_cents(self.commission_cents)
    }
}

/// A line item belonging to exactly one delivery.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct DeliveryItem {
    pub id: String,
    pub delivery_id: String,
    pub item_name: String,
    pub description: Option<String>,
    pub unit_cost_cents: i64,
    pub selling_price_cents: i64,
    pub quantity: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl DeliveryItem {
    /// Line cost: `unit_cost × quantity`.
    #[inline]
    pub fn total_cost(&self) -> Money {
        Money::from_cents(self.unit_cost_cents).multiply_quantity(self.quantity)
    }

    /// Line revenue: `selling_price × quantity`.
    #[inline]
    pub fn total_revenue(&self) -> Money {
        Money::from_cents(self.selling_price_cents).multiply_quantity(self.quantity)
    }
}

/// A delivery list row: header plus derived totals and joined display names.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct DeliverySummary {
    pub id: String,
    pub tracking_number: String,
    pub customer_id: Option<String>,
    pub agent_id: Option<String>,
    pub province_id: Option<String>,
    pub commission_cents: i64,
    #[ts(as = "String")]
    pub delivery_date: NaiveDate,
    pub status: DeliveryStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub total_quantity: i64,
    pub total_cost_cents: i64,
    pub total_selling_cents: i64,
    pub net_profit_cents: i64,
    pub agent_name: Option<String>,
    pub province_name: Option<String>,
    pub customer_name: Option<String>,
}

/// A fully hydrated delivery: header, contact details, items, totals.
///
/// Totals are recomputed from the item list on every read; they are never
/// stored on the header.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DeliveryDetail {
    pub delivery: Delivery,
    pub agent_name: Option<String>,
    pub agent_email: Option<String>,
    pub agent_phone: Option<String>,
    pub agent_commission_rate_bps: Option<u32>,
    pub province_name: Option<String>,
    pub customer_name: Option<String>,
    pub items: Vec<DeliveryItem>,
    pub total_quantity: i64,
    pub total_cost_cents: i64,
    pub total_selling_cents: i64,
    pub net_profit_cents: i64,
}

/// Global delivery statistics for the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct DeliveryStats {
    pub total_deliveries: i64,
    pub total_items: i64,
    pub total_item_cost_cents: i64,
    pub total_commission_cents: i64,
    pub total_revenue_cents: i64,
    pub total_profit_cents: i64,
    pub pending_deliveries: i64,
    pub in_transit_deliveries: i64,
    pub delivered_deliveries: i64,
    pub cancelled_deliveries: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commission_rate_from_bps() {
        let rate = CommissionRate::from_bps(1500);
        assert_eq!(rate.bps(), 1500);
        assert!((rate.percentage() - 15.0).abs() < 0.001);
    }

    #[test]
    fn test_commission_rate_from_percentage() {
        let rate = CommissionRate::from_percentage(12.5);
        assert_eq!(rate.bps(), 1250);
    }

    #[test]
    fn test_status_parse_valid() {
        assert_eq!(
            DeliveryStatus::parse("pending").unwrap(),
            DeliveryStatus::Pending
        );
        assert_eq!(
            DeliveryStatus::parse("in_transit").unwrap(),
            DeliveryStatus::InTransit
        );
        assert_eq!(
            DeliveryStatus::parse("delivered").unwrap(),
            DeliveryStatus::Delivered
        );
        assert_eq!(
            DeliveryStatus::parse("cancelled").unwrap(),
            DeliveryStatus::Cancelled
        );
    }

    #[test]
    fn test_status_parse_invalid() {
        // "shipped" is not part of the enum
        assert!(DeliveryStatus::parse("shipped").is_err());
        assert!(DeliveryStatus::parse("Pending").is_err());
        assert!(DeliveryStatus::parse("").is_err());
    }

    #[test]
    fn test_status_round_trip() {
        for status in DeliveryStatus::ALL {
            assert_eq!(DeliveryStatus::parse(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn test_status_default() {
        assert_eq!(DeliveryStatus::default(), DeliveryStatus::Pending);
    }

    #[test]
    fn test_stats_period_parse() {
        assert_eq!(StatsPeriod::parse("week"), StatsPeriod::Week);
        assert_eq!(StatsPeriod::parse("month"), StatsPeriod::Month);
        assert_eq!(StatsPeriod::parse("year"), StatsPeriod::Year);
        assert_eq!(StatsPeriod::parse("quarter"), StatsPeriod::AllTime);
        assert_eq!(StatsPeriod::Week.trailing_days(), Some(7));
        assert_eq!(StatsPeriod::AllTime.trailing_days(), None);
    }

    #[test]
    fn test_item_line_math() {
        let item = DeliveryItem {
            id: "i1".to_string(),
            delivery_id: "d1".to_string(),
            item_name: "Box".to_string(),
            description: None,
            unit_cost_cents: 5000,
            selling_price_cents: 6500,
            quantity: 2,
            created_at: Utc::now(),
        };

        assert_eq!(item.total_cost().cents(), 10_000);
        assert_eq!(item.total_revenue().cents(), 13_000);
    }
}
