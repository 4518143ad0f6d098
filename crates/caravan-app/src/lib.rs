//! # Caravan Command Layer
//!
//! The request/response surface of the Caravan business core. The desktop
//! shell invokes these commands over its process boundary and renders the
//! returned envelopes; nothing in this crate draws a pixel.
//!
//! ## Module Organization
//! ```text
//! caravan_app/
//! ├── lib.rs          ◄─── You are here (context, lifecycle, tracing)
//! ├── commands/
//! │   ├── mod.rs      ◄─── Shared response envelopes
//! │   ├── province.rs ◄─── Province CRUD/search/stats commands
//! │   ├── agent.rs    ◄─── Agent CRUD, assignments, performance
//! │   ├── customer.rs ◄─── Customer CRUD/search commands
//! │   └── delivery.rs ◄─── Delivery workflow, invoices, dashboard stats
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## Request/Response Contract
//! Every command takes a plain data object and either returns a success
//! envelope (`{success: true, ...}` plus operation-specific fields) or fails
//! with an [`error::ApiError`] carrying a `code` and a human-readable
//! `message`. The shell shows the message as a toast and can branch on the
//! code.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Application Startup                               │
//! │                                                                         │
//! │  1. init_tracing() ───────────────────────────────────────────────────► │
//! │     • tracing-subscriber with env filter                                │
//! │     • Default: INFO, can be overridden with RUST_LOG                    │
//! │                                                                         │
//! │  2. AppContext::open(DbConfig::new(db_path)) ─────────────────────────► │
//! │     • SQLite pool with WAL mode                                         │
//! │     • Run pending migrations                                            │
//! │                                                                         │
//! │  3. Shell binds the command functions, passing ctx.db()                 │
//! │                                                                         │
//! │  4. AppContext::close() on shutdown                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;

use tracing::info;
use tracing_subscriber::EnvFilter;

use caravan_db::{Database, DbConfig};
use error::ApiError;

/// Application context holding the injected database handle.
///
/// There is no module-level singleton: whoever hosts the commands opens a
/// context at startup, hands `ctx.db()` to each invocation, and closes the
/// context on shutdown.
#[derive(Debug, Clone)]
pub struct AppContext {
    db: Database,
}

impl AppContext {
    /// Opens the database (creating the file and running migrations) and
    /// returns a ready context.
    pub async fn open(config: DbConfig) -> Result<Self, ApiError> {
        info!("Opening application context");
        let db = Database::new(config).await?;
        Ok(AppContext { db })
    }

    /// Returns the database handle for command invocations.
    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Closes the database pool. Commands fail after this.
    pub async fn close(&self) {
        info!("Closing application context");
        self.db.close().await;
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=caravan=trace` - Show trace for caravan crates only
/// - Default: INFO level, sqlx statement logging damped to warnings
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,caravan=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
