use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type CompanyId = i64;

/// A company account identified by CNPJ. The balance is mutated
/// exclusively by the transaction operation and must never go negative
/// as a result of a withdrawal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    /// Surrogate id assigned by storage (0 until saved)
    pub id: CompanyId,
    /// 14-digit national identifier, unique
    pub cnpj: String,
    pub balance: Decimal,
    /// Company-specific static rate used in fee computation
    pub admin_fee_rate: Decimal,
    /// Endpoint for post-transaction callbacks, if the company registered one
    pub webhook_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Company {
    /// Create a new company. The id is assigned by the repository.
    pub fn new(cnpj: impl Into<String>, balance: Decimal, admin_fee_rate: Decimal) -> Self {
        Self {
            id: 0,
            cnpj: cnpj.into(),
            balance,
            admin_fee_rate,
            webhook_url: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_webhook_url(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }
}
