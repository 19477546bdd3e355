// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::str::FromStr;

use anyhow::Result;
use caixa::application::LedgerService;
use caixa::notification::Notifier;
use rust_decimal::Decimal;
use tempfile::TempDir;

/// A valid CPF (correct check digits)
pub const CPF: &str = "12345678909";
/// A second valid CPF
pub const CPF_2: &str = "52998224725";
/// A valid CNPJ (correct check digits)
pub const CNPJ: &str = "11222333000181";

/// Helper to create a test service with a temporary database and
/// notifications disabled
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(db_path.to_str().unwrap(), Notifier::disabled()).await?;
    Ok((service, temp_dir))
}

/// Helper to parse a decimal literal
pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}
