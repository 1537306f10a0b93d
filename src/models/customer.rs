//! Customer model

use serde::{Deserialize, Serialize};

pub type CustomerId = i64;

/// A customer who books appointments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerEntity {
    pub id: CustomerId,
    /// External handle (chat id, phone number)
    pub identity: String,
    pub name: String,
}

/// Register customer request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCustomer {
    pub identity: String,
    pub name: String,
}
