use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CompanyId, CustomerId};

pub type TransactionId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Money moves into the company balance ("deposito")
    #[serde(rename = "deposito")]
    Deposit,
    /// Money moves out of the company balance ("saque")
    #[serde(rename = "saque")]
    Withdrawal,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposito",
            TransactionKind::Withdrawal => "saque",
        }
    }

    /// Parse the wire tag, case-insensitively. Unrecognized tags are
    /// rejected at the boundary rather than carried as free strings.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "deposito" => Some(TransactionKind::Deposit),
            "saque" => Some(TransactionKind::Withdrawal),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A committed money movement between a customer and a company.
/// Transactions are immutable once persisted; `amount` is the net
/// amount after fee deduction, the value actually applied to the
/// company balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Surrogate id assigned by storage (0 until saved)
    pub id: TransactionId,
    pub customer_id: CustomerId,
    pub company_id: CompanyId,
    /// Net amount: requested amount minus fee
    pub amount: Decimal,
    pub kind: TransactionKind,
    /// Caller-supplied system fee, if any. An omitted fee contributes
    /// nothing to the fee sum.
    pub system_fee: Option<Decimal>,
    /// Commit time, set when the transaction is recorded
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        customer_id: CustomerId,
        company_id: CompanyId,
        amount: Decimal,
        kind: TransactionKind,
        system_fee: Option<Decimal>,
    ) -> Self {
        Self {
            id: 0,
            customer_id,
            company_id,
            amount,
            kind,
            system_fee,
            created_at: Utc::now(),
        }
    }
}

/// Total fee for a transaction: 2% of the company's stored
/// administrative fee rate, plus the caller's system fee when present.
pub fn compute_fee(admin_fee_rate: Decimal, system_fee: Option<Decimal>) -> Decimal {
    let admin_share = admin_fee_rate * Decimal::new(2, 2);
    admin_share + system_fee.unwrap_or(Decimal::ZERO)
}
