//! # Delivery Commands
//!
//! The delivery workflow surface: transactional create/update/delete with
//! line items, status changes, searches, statistics and invoices.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::commands::MutationResponse;
use crate::error::ApiError;
use caravan_core::validation::{
    parse_date, validate_cost_cents, validate_name, validate_quantity, validate_search_query,
};
use caravan_core::{
    DeliveryDetail, DeliveryItem, DeliveryStats, DeliveryStatus, DeliverySummary, ValidationError,
};
use caravan_db::repository::delivery::{NewDelivery, NewDeliveryItem, UpdateDelivery};
use caravan_db::Database;

// =============================================================================
// Request / Response DTOs
// =============================================================================

/// A line item as submitted by the delivery form.
#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryItemInput {
    pub item_name: String,
    pub item_description: Option<String>,
    pub unit_cost_cents: i64,
    /// Omitted → defaults to `unit_cost × 1.3`.
    pub selling_price_cents: Option<i64>,
    pub quantity: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddDeliveryRequest {
    pub customer_id: Option<String>,
    pub agent_id: Option<String>,
    pub province_id: Option<String>,
    /// ISO `YYYY-MM-DD`; omitted → today.
    pub delivery_date: Option<String>,
    /// Omitted → `"pending"`.
    pub status: Option<String>,
    pub items: Vec<DeliveryItemInput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDeliveryRequest {
    pub delivery_id: String,
    pub customer_id: Option<String>,
    pub agent_id: Option<String>,
    pub province_id: Option<String>,
    pub delivery_date: Option<String>,
    pub status: Option<String>,
    pub items: Vec<DeliveryItemInput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub delivery_id: String,
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DateRangeRequest {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeliveryCreated {
    pub success: bool,
    pub delivery_id: String,
    pub tracking_number: String,
    pub message: String,
}

/// Invoice envelope: the hydrated delivery plus a generation timestamp.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceResponse {
    pub success: bool,
    pub delivery: DeliveryDetail,
    pub message: String,
    pub timestamp: String,
}

// =============================================================================
// Request Conversion
// =============================================================================

/// Validates submitted items and converts them to repository inputs.
///
/// The workflow requires at least one item - a delivery with no goods on it
/// is a data-entry mistake, not a record.
fn convert_items(items: Vec<DeliveryItemInput>) -> Result<Vec<NewDeliveryItem>, ApiError> {
    if items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        }
        .into());
    }

    let mut converted = Vec::with_capacity(items.len());
    for item in items {
        let item_name = validate_name("item_name", &item.item_name)?;
        validate_cost_cents("unit_cost_cents", item.unit_cost_cents)?;
        if let Some(selling) = item.selling_price_cents {
            validate_cost_cents("selling_price_cents", selling)?;
        }
        validate_quantity(item.quantity)?;

        converted.push(NewDeliveryItem {
            item_name,
            description: item.item_description,
            unit_cost_cents: item.unit_cost_cents,
            selling_price_cents: item.selling_price_cents,
            quantity: item.quantity,
        });
    }

    Ok(converted)
}

/// Parses the optional wire date and status fields.
fn parse_header_fields(
    delivery_date: Option<&str>,
    status: Option<&str>,
) -> Result<(Option<chrono::NaiveDate>, Option<DeliveryStatus>), ApiError> {
    let date = delivery_date
        .map(|d| parse_date("delivery_date", d))
        .transpose()?;
    let status = status.map(DeliveryStatus::parse).transpose()?;
    Ok((date, status))
}

// =============================================================================
// Commands
// =============================================================================

/// Lists all deliveries with derived totals, newest first.
pub async fn get_deliveries(db: &Database) -> Result<Vec<DeliverySummary>, ApiError> {
    Ok(db.deliveries().list().await?)
}

/// Gets a fully hydrated delivery; `None` when the id is unknown.
pub async fn get_delivery(
    db: &Database,
    delivery_id: &str,
) -> Result<Option<DeliveryDetail>, ApiError> {
    Ok(db.deliveries().get_by_id(delivery_id).await?)
}

/// Creates a delivery with its items, atomically.
pub async fn add_delivery(
    db: &Database,
    req: AddDeliveryRequest,
) -> Result<DeliveryCreated, ApiError> {
    debug!(items = req.items.len(), "add_delivery command");

    let items = convert_items(req.items)?;
    let (delivery_date, status) = parse_header_fields(
        req.delivery_date.as_deref(),
        req.status.as_deref(),
    )?;

    let created = db
        .deliveries()
        .create(&NewDelivery {
            customer_id: req.customer_id,
            agent_id: req.agent_id,
            province_id: req.province_id,
            delivery_date,
            status,
            items,
        })
        .await?;

    info!(
        delivery_id = %created.delivery_id,
        tracking_number = %created.tracking_number,
        "Delivery created"
    );

    Ok(DeliveryCreated {
        success: true,
        delivery_id: created.delivery_id,
        tracking_number: created.tracking_number,
        message: "Delivery added successfully!".to_string(),
    })
}

/// Updates a delivery, replacing its items wholesale.
pub async fn update_delivery(
    db: &Database,
    req: UpdateDeliveryRequest,
) -> Result<MutationResponse, ApiError> {
    debug!(id = %req.delivery_id, items = req.items.len(), "update_delivery command");

    let items = convert_items(req.items)?;
    let (delivery_date, status) = parse_header_fields(
        req.delivery_date.as_deref(),
        req.status.as_deref(),
    )?;

    let affected = db
        .deliveries()
        .update(&UpdateDelivery {
            delivery_id: req.delivery_id,
            customer_id: req.customer_id,
            agent_id: req.agent_id,
            province_id: req.province_id,
            delivery_date,
            status,
            items,
        })
        .await?;

    Ok(MutationResponse::new(
        affected,
        "Delivery updated successfully!",
    ))
}

/// Deletes a delivery and its items, atomically.
pub async fn delete_delivery(
    db: &Database,
    delivery_id: &str,
) -> Result<MutationResponse, ApiError> {
    debug!(id = %delivery_id, "delete_delivery command");

    let affected = db.deliveries().delete(delivery_id).await?;

    Ok(MutationResponse::new(
        affected,
        "Delivery deleted successfully!",
    ))
}

/// Searches deliveries by tracking number, agent name or item name.
pub async fn search_deliveries(
    db: &Database,
    term: &str,
) -> Result<Vec<DeliverySummary>, ApiError> {
    let term = validate_search_query(term)?;
    Ok(db.deliveries().search(&term).await?)
}

/// Global delivery statistics for the dashboard cards.
pub async fn get_delivery_stats(db: &Database) -> Result<DeliveryStats, ApiError> {
    Ok(db.deliveries().stats().await?)
}

/// Lists the line items of a delivery.
pub async fn get_delivery_items(
    db: &Database,
    delivery_id: &str,
) -> Result<Vec<DeliveryItem>, ApiError> {
    Ok(db.deliveries().items(delivery_id).await?)
}

/// Sets a delivery's status.
///
/// The status string is validated against the four-member enum; transitions
/// themselves are unguarded.
pub async fn update_delivery_status(
    db: &Database,
    req: UpdateStatusRequest,
) -> Result<MutationResponse, ApiError> {
    debug!(id = %req.delivery_id, status = %req.status, "update_delivery_status command");

    let status = DeliveryStatus::parse(&req.status)?;
    let affected = db.deliveries().update_status(&req.delivery_id, status).await?;

    Ok(MutationResponse::new(
        affected,
        format!("Delivery status updated to {}", status),
    ))
}

/// Lists deliveries in an inclusive date range.
pub async fn get_deliveries_by_date_range(
    db: &Database,
    req: DateRangeRequest,
) -> Result<Vec<DeliverySummary>, ApiError> {
    let start = parse_date("start_date", &req.start_date)?;
    let end = parse_date("end_date", &req.end_date)?;

    Ok(db.deliveries().by_date_range(start, end).await?)
}

/// Generates the invoice envelope for a delivery.
///
/// A missing delivery is an error here - there is nothing to print.
pub async fn generate_invoice(
    db: &Database,
    delivery_id: &str,
) -> Result<InvoiceResponse, ApiError> {
    debug!(id = %delivery_id, "generate_invoice command");

    let delivery = db.deliveries().invoice_details(delivery_id).await?;

    Ok(InvoiceResponse {
        success: true,
        delivery,
        message: "Invoice generated successfully!".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}
