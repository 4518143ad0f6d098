//! # Province Commands

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::commands::MutationResponse;
use crate::error::ApiError;
use caravan_core::validation::{validate_name, validate_search_query};
use caravan_core::{Province, ProvinceStats};
use caravan_db::Database;

#[derive(Debug, Clone, Deserialize)]
pub struct AddProvinceRequest {
    pub province_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProvinceRequest {
    pub province_id: String,
    pub province_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProvinceCreated {
    pub success: bool,
    pub province_id: String,
    pub message: String,
}

/// Lists all provinces ordered by name.
pub async fn get_provinces(db: &Database) -> Result<Vec<Province>, ApiError> {
    Ok(db.provinces().list().await?)
}

/// Gets a single province; `None` when the id is unknown.
pub async fn get_province(db: &Database, province_id: &str) -> Result<Option<Province>, ApiError> {
    Ok(db.provinces().get_by_id(province_id).await?)
}

/// Adds a province.
pub async fn add_province(
    db: &Database,
    req: AddProvinceRequest,
) -> Result<ProvinceCreated, ApiError> {
    debug!(name = %req.province_name, "add_province command");

    let name = validate_name("province_name", &req.province_name)?;
    let province = db.provinces().create(&name).await?;

    Ok(ProvinceCreated {
        success: true,
        province_id: province.id,
        message: "Province added successfully!".to_string(),
    })
}

/// Renames a province.
pub async fn update_province(
    db: &Database,
    req: UpdateProvinceRequest,
) -> Result<MutationResponse, ApiError> {
    debug!(id = %req.province_id, name = %req.province_name, "update_province command");

    let name = validate_name("province_name", &req.province_name)?;
    let affected = db.provinces().update(&req.province_id, &name).await?;

    Ok(MutationResponse::new(
        affected,
        "Province updated successfully!",
    ))
}

/// Deletes a province (guarded by deliveries, agents and customers).
pub async fn delete_province(
    db: &Database,
    province_id: &str,
) -> Result<MutationResponse, ApiError> {
    debug!(id = %province_id, "delete_province command");

    let affected = db.provinces().delete(province_id).await?;

    Ok(MutationResponse::new(
        affected,
        "Province deleted successfully!",
    ))
}

/// Searches provinces by name; an empty term lists everything.
pub async fn search_provinces(db: &Database, term: &str) -> Result<Vec<Province>, ApiError> {
    let term = validate_search_query(term)?;
    Ok(db.provinces().search(&term).await?)
}

/// Lists provinces with delivery statistics for the admin table.
pub async fn get_provinces_with_stats(db: &Database) -> Result<Vec<ProvinceStats>, ApiError> {
    Ok(db.provinces().list_with_stats().await?)
}
