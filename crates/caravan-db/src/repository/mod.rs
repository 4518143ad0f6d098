//! # Repository Implementations
//!
//! One repository per entity:
//!
//! - [`province`] - Province CRUD, search, delivery statistics
//! - [`agent`] - Agent CRUD, search, province assignments, performance rollups
//! - [`customer`] - Customer CRUD and search
//! - [`delivery`] - The delivery workflow: transactional create/update/delete
//!   with line items, commission snapshots, invoices and dashboard statistics
//!
//! Repositories hold a cloned pool handle and issue only parameterized
//! statements. The two application-level guards (duplicate natural keys,
//! referential deletion checks) live here, in front of the SQL.

pub mod agent;
pub mod customer;
pub mod delivery;
pub mod province;
