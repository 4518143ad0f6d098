//! # Customer Repository
//!
//! Database operations for customers.
//!
//! Unlike provinces and agents, a customer's name is NOT a natural key -
//! two customers may share a name, so there is no duplicate check on create.
//! Deletion is still guarded by deliveries.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use caravan_core::{Customer, CustomerRecord};

/// Input for creating a customer.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub province_id: Option<String>,
}

/// Input for updating a customer.
#[derive(Debug, Clone)]
pub struct UpdateCustomer {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub province_id: Option<String>,
}

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Lists all customers with their home province name, ordered by name.
    pub async fn list(&self) -> DbResult<Vec<CustomerRecord>> {
        let customers = sqlx::query_as::<_, CustomerRecord>(
            "SELECT \
                 c.id, c.name, c.email, c.phone, c.address, c.province_id, c.created_at, \
                 p.name AS province_name \
             FROM customers c \
             LEFT JOIN provinces p ON p.id = c.province_id \
             ORDER BY c.name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Gets a customer by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT id, name, email, phone, address, province_id, created_at \
             FROM customers WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Creates a new customer.
    pub async fn create(&self, new: &NewCustomer) -> DbResult<Customer> {
        debug!(name = %new.name, "Creating customer");

        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: new.name.clone(),
            email: new.email.clone(),
            phone: new.phone.clone(),
            address: new.address.clone(),
            province_id: new.province_id.clone(),
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO customers (id, name, email, phone, address, province_id, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(&customer.province_id)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Updates an existing customer.
    ///
    /// ## Returns
    /// Affected-row count (always 1 on success).
    pub async fn update(&self, upd: &UpdateCustomer) -> DbResult<u64> {
        debug!(id = %upd.id, "Updating customer");

        let result = sqlx::query(
            "UPDATE customers SET name = ?, email = ?, phone = ?, address = ?, province_id = ? \
             WHERE id = ?",
        )
        .bind(&upd.name)
        .bind(&upd.email)
        .bind(&upd.phone)
        .bind(&upd.address)
        .bind(&upd.province_id)
        .bind(&upd.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", &upd.id));
        }

        Ok(result.rows_affected())
    }

    /// Deletes a customer, guarded by deliveries referencing them.
    pub async fn delete(&self, id: &str) -> DbResult<u64> {
        debug!(id = %id, "Deleting customer");

        let deliveries: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM deliveries WHERE customer_id = ?")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        if deliveries > 0 {
            return Err(DbError::referential("customer", "deliveries"));
        }

        let result = sqlx::query("DELETE FROM customers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(result.rows_affected())
    }

    /// Searches customers by name, email or phone (case-insensitive
    /// substring). An empty term lists everything.
    pub async fn search(&self, term: &str) -> DbResult<Vec<CustomerRecord>> {
        let term = term.trim();

        debug!(term = %term, "Searching customers");

        if term.is_empty() {
            return self.list().await;
        }

        let pattern = format!("%{}%", term);

        let customers = sqlx::query_as::<_, CustomerRecord>(
            "SELECT \
                 c.id, c.name, c.email, c.phone, c.address, c.province_id, c.created_at, \
                 p.name AS province_name \
             FROM customers c \
             LEFT JOIN provinces p ON p.id = c.province_id \
             WHERE c.name LIKE ? OR c.email LIKE ? OR c.phone LIKE ? \
             ORDER BY c.name",
        )
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }
}
