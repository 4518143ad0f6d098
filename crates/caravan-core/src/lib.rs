//! # caravan-core: Pure Business Logic for Caravan
//!
//! This crate is the **heart** of Caravan, a delivery-management system for a
//! small logistics business. It contains all business logic as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Caravan Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   Desktop Shell (external)                      │   │
//! │  │    Province forms ──► Agent forms ──► Delivery forms ──► Invoice│   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ IPC                                    │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    caravan-app commands                         │   │
//! │  │    add_delivery, search_agents, generate_invoice, etc.          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ caravan-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   error   │  │ validation│  │   │
//! │  │   │ Delivery  │  │   Money   │  │ CoreError │  │   rules   │  │   │
//! │  │   │  Agent    │  │ Commission│  │Validation │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   caravan-db (Database Layer)                   │   │
//! │  │          SQLite queries, migrations, repositories               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Province, Agent, Customer, Delivery, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use caravan_core::money::Money;
//! use caravan_core::types::CommissionRate;
//!
//! // Create money from cents (never from floats!)
//! let total_cost = Money::from_cents(10_000); // 100.00
//!
//! // Commission snapshot taken at delivery-creation time
//! let rate = CommissionRate::from_bps(1500); // 15%
//! let commission = total_cost.calculate_commission(rate);
//! assert_eq!(commission.cents(), 1500);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use caravan_core::Money` instead of
// `use caravan_core::money::Money`

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Prefix for externally visible delivery tracking numbers.
///
/// A tracking number is `DEL` + millisecond timestamp + a 0-999 suffix,
/// e.g. `DEL1735689600123042`. It is the customer-facing identifier, distinct
/// from the delivery's internal UUID.
pub const TRACKING_NUMBER_PREFIX: &str = "DEL";

/// Default markup applied when a line item is submitted without a selling
/// price: 3000 bps = 30% over unit cost.
pub const DEFAULT_MARKUP_BPS: u32 = 3000;

/// Upper bound for agent commission rates (10000 bps = 100%).
pub const MAX_COMMISSION_RATE_BPS: u32 = 10000;
