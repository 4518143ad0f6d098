//! # Customer Commands

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::commands::MutationResponse;
use crate::error::ApiError;
use caravan_core::validation::{validate_name, validate_search_query};
use caravan_core::{Customer, CustomerRecord};
use caravan_db::repository::customer::{NewCustomer, UpdateCustomer};
use caravan_db::Database;

#[derive(Debug, Clone, Deserialize)]
pub struct AddCustomerRequest {
    pub customer_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub province_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCustomerRequest {
    pub customer_id: String,
    pub customer_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub province_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerCreated {
    pub success: bool,
    pub customer_id: String,
    pub message: String,
}

/// Lists all customers with their home province names.
pub async fn get_customers(db: &Database) -> Result<Vec<CustomerRecord>, ApiError> {
    Ok(db.customers().list().await?)
}

/// Gets a single customer; `None` when the id is unknown.
pub async fn get_customer(db: &Database, customer_id: &str) -> Result<Option<Customer>, ApiError> {
    Ok(db.customers().get_by_id(customer_id).await?)
}

/// Adds a customer. Customer names are not unique, so there is no
/// duplicate check here.
pub async fn add_customer(
    db: &Database,
    req: AddCustomerRequest,
) -> Result<CustomerCreated, ApiError> {
    debug!(name = %req.customer_name, "add_customer command");

    let name = validate_name("customer_name", &req.customer_name)?;

    let customer = db
        .customers()
        .create(&NewCustomer {
            name,
            email: req.email,
            phone: req.phone,
            address: req.address,
            province_id: req.province_id,
        })
        .await?;

    Ok(CustomerCreated {
        success: true,
        customer_id: customer.id,
        message: "Customer added successfully!".to_string(),
    })
}

/// Updates a customer.
pub async fn update_customer(
    db: &Database,
    req: UpdateCustomerRequest,
) -> Result<MutationResponse, ApiError> {
    debug!(id = %req.customer_id, "update_customer command");

    let name = validate_name("customer_name", &req.customer_name)?;

    let affected = db
        .customers()
        .update(&UpdateCustomer {
            id: req.customer_id,
            name,
            email: req.email,
            phone: req.phone,
            address: req.address,
            province_id: req.province_id,
        })
        .await?;

    Ok(MutationResponse::new(
        affected,
        "Customer updated successfully!",
    ))
}

/// Deletes a customer (guarded by deliveries).
pub async fn delete_customer(
    db: &Database,
    customer_id: &str,
) -> Result<MutationResponse, ApiError> {
    debug!(id = %customer_id, "delete_customer command");

    let affected = db.customers().delete(customer_id).await?;

    Ok(MutationResponse::new(
        affected,
        "Customer deleted successfully!",
    ))
}

/// Searches customers by name, email or phone; an empty term lists everyone.
pub async fn search_customers(db: &Database, term: &str) -> Result<Vec<CustomerRecord>, ApiError> {
    let term = validate_search_query(term)?;
    Ok(db.customers().search(&term).await?)
}
