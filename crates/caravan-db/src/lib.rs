//! # caravan-db: Database Layer for Caravan
//!
//! This crate provides database access for the Caravan delivery-management
//! system. It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Caravan Data Flow                                │
//! │                                                                         │
//! │  Command (add_delivery)                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    caravan-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (province.rs) │    │  (embedded)  │  │   │
//! │  │   │               │    │ (agent.rs)    │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ (customer.rs) │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │    │ (delivery.rs) │    │ 002_idx.sql  │  │   │
//! │  │   │ Management    │    │               │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │                        SQLite Database (WAL)                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types, including the domain guards
//! - [`repository`] - Repository implementations (province, agent, customer,
//!   delivery)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use caravan_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/caravan.db")).await?;
//!
//! // Use repositories
//! let provinces = db.provinces().list().await?;
//! let agents = db.agents().search("ahmad").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::agent::AgentRepository;
pub use repository::customer::CustomerRepository;
pub use repository::delivery::DeliveryRepository;
pub use repository::province::ProvinceRepository;
