//! # Agent Commands
//!
//! Agent CRUD plus the province-assignment workflow and performance rollups.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::commands::MutationResponse;
use crate::error::ApiError;
use caravan_core::validation::{
    validate_commission_rate_bps, validate_id, validate_name, validate_search_query,
};
use caravan_core::{
    Agent, AgentOverview, AgentPerformance, AgentProvinceCount, AssignedProvince, CommissionRate,
    Province, StatsPeriod, ValidationError,
};
use caravan_db::repository::agent::{NewAgent, UpdateAgent};
use caravan_db::Database;

#[derive(Debug, Clone, Deserialize)]
pub struct AddAgentRequest {
    pub agent_name: String,
    pub phone: String,
    pub email: Option<String>,
    /// Commission rate as a percentage (0-100), the way the form slider
    /// submits it.
    pub commission_rate: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAgentRequest {
    pub agent_id: String,
    pub agent_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub commission_rate: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignmentRequest {
    pub agent_id: String,
    pub province_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkAssignRequest {
    pub agent_id: String,
    pub province_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentCreated {
    pub success: bool,
    pub agent_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignmentResponse {
    pub success: bool,
    pub message: String,
}

/// Converts a form percentage to basis points, range-checked.
fn rate_from_percentage(pct: f64) -> Result<u32, ApiError> {
    if !(0.0..=100.0).contains(&pct) {
        return Err(ValidationError::OutOfRange {
            field: "commission_rate".to_string(),
            min: 0,
            max: 100,
        }
        .into());
    }
    let rate = CommissionRate::from_percentage(pct);
    validate_commission_rate_bps(rate.bps())?;
    Ok(rate.bps())
}

/// Lists all agents with workload statistics.
pub async fn get_agents(db: &Database) -> Result<Vec<AgentOverview>, ApiError> {
    Ok(db.agents().list_with_stats().await?)
}

/// Gets a single agent; `None` when the id is unknown.
pub async fn get_agent(db: &Database, agent_id: &str) -> Result<Option<Agent>, ApiError> {
    Ok(db.agents().get_by_id(agent_id).await?)
}

/// Adds an agent.
pub async fn add_agent(db: &Database, req: AddAgentRequest) -> Result<AgentCreated, ApiError> {
    debug!(name = %req.agent_name, "add_agent command");

    let name = validate_name("agent_name", &req.agent_name)?;
    let phone = validate_name("phone", &req.phone)?;
    let commission_rate_bps = rate_from_percentage(req.commission_rate)?;

    let agent = db
        .agents()
        .create(&NewAgent {
            name,
            phone,
            email: req.email,
            commission_rate_bps,
        })
        .await?;

    Ok(AgentCreated {
        success: true,
        agent_id: agent.id,
        message: "Agent added successfully!".to_string(),
    })
}

/// Updates an agent. Rate changes never rewrite existing delivery
/// commissions - those are snapshots.
pub async fn update_agent(
    db: &Database,
    req: UpdateAgentRequest,
) -> Result<MutationResponse, ApiError> {
    debug!(id = %req.agent_id, "update_agent command");

    let name = validate_name("agent_name", &req.agent_name)?;
    let phone = validate_name("phone", &req.phone)?;
    let commission_rate_bps = rate_from_percentage(req.commission_rate)?;

    let affected = db
        .agents()
        .update(&UpdateAgent {
            id: req.agent_id,
            name,
            phone,
            email: req.email,
            commission_rate_bps,
        })
        .await?;

    Ok(MutationResponse::new(affected, "Agent updated successfully!"))
}

/// Deletes an agent (guarded by deliveries).
pub async fn delete_agent(db: &Database, agent_id: &str) -> Result<MutationResponse, ApiError> {
    debug!(id = %agent_id, "delete_agent command");

    let affected = db.agents().delete(agent_id).await?;

    Ok(MutationResponse::new(affected, "Agent deleted successfully!"))
}

/// Searches agents by name, email or phone; an empty term lists everything.
pub async fn search_agents(db: &Database, term: &str) -> Result<Vec<AgentOverview>, ApiError> {
    let term = validate_search_query(term)?;
    Ok(db.agents().search(&term).await?)
}

/// Lists the provinces assigned to an agent.
pub async fn get_agent_provinces(
    db: &Database,
    agent_id: &str,
) -> Result<Vec<AssignedProvince>, ApiError> {
    Ok(db.agents().provinces(agent_id).await?)
}

/// Lists the provinces not yet assigned to an agent.
pub async fn get_available_provinces(
    db: &Database,
    agent_id: &str,
) -> Result<Vec<Province>, ApiError> {
    Ok(db.agents().available_provinces(agent_id).await?)
}

/// Assigns a province to an agent.
pub async fn assign_province_to_agent(
    db: &Database,
    req: AssignmentRequest,
) -> Result<AssignmentResponse, ApiError> {
    debug!(agent_id = %req.agent_id, province_id = %req.province_id, "assign_province command");

    validate_id("agent_id", &req.agent_id)?;
    validate_id("province_id", &req.province_id)?;

    db.agents()
        .assign_province(&req.agent_id, &req.province_id)
        .await?;

    Ok(AssignmentResponse {
        success: true,
        message: "Province assigned successfully!".to_string(),
    })
}

/// Removes a province assignment (guarded by that agent's deliveries into
/// the province).
pub async fn remove_province_from_agent(
    db: &Database,
    req: AssignmentRequest,
) -> Result<MutationResponse, ApiError> {
    debug!(agent_id = %req.agent_id, province_id = %req.province_id, "remove_province command");

    let affected = db
        .agents()
        .unassign_province(&req.agent_id, &req.province_id)
        .await?;

    Ok(MutationResponse::new(
        affected,
        "Province removed successfully!",
    ))
}

/// Lists agents with assignment counts.
pub async fn get_agents_with_province_count(
    db: &Database,
) -> Result<Vec<AgentProvinceCount>, ApiError> {
    Ok(db.agents().list_with_province_count().await?)
}

/// Replaces an agent's assignments with the submitted set.
pub async fn bulk_assign_provinces(
    db: &Database,
    req: BulkAssignRequest,
) -> Result<AssignmentResponse, ApiError> {
    debug!(agent_id = %req.agent_id, count = req.province_ids.len(), "bulk_assign command");

    let assigned = db
        .agents()
        .bulk_assign_provinces(&req.agent_id, &req.province_ids)
        .await?;

    Ok(AssignmentResponse {
        success: true,
        message: format!("{} provinces assigned successfully!", assigned),
    })
}

/// Performance rollup for an agent over a trailing window
/// (`"week"`, `"month"`, `"year"`; anything else is all-time).
pub async fn get_agent_stats(
    db: &Database,
    agent_id: &str,
    period: Option<String>,
) -> Result<AgentPerformance, ApiError> {
    let period = period
        .as_deref()
        .map(StatsPeriod::parse)
        .unwrap_or_default();

    Ok(db.agents().performance(agent_id, period).await?)
}
