//! # Command Functions
//!
//! One module per entity, one async function per IPC handler. Commands
//! validate their request DTOs, delegate to the repositories, and wrap the
//! outcome in the success envelopes the shell expects.

pub mod agent;
pub mod customer;
pub mod delivery;
pub mod province;

use serde::{Deserialize, Serialize};

/// Envelope for update/delete operations: how many rows were touched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationResponse {
    pub success: bool,
    pub affected_rows: u64,
    pub message: String,
}

impl MutationResponse {
    pub fn new(affected_rows: u64, message: impl Into<String>) -> Self {
        MutationResponse {
            success: true,
            affected_rows,
            message: message.into(),
        }
    }
}
