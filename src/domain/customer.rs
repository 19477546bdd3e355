use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type CustomerId = i64;

/// A customer identified by CPF. The CPF is validated before the
/// customer is ever persisted and is immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Surrogate id assigned by storage (0 until saved)
    pub id: CustomerId,
    /// 11-digit national identifier, unique
    pub cpf: String,
    /// Address for transaction confirmation emails
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// Create a new customer. The id is assigned by the repository.
    pub fn new(cpf: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: 0,
            cpf: cpf.into(),
            email: email.into(),
            created_at: Utc::now(),
        }
    }
}
