mod common;

use anyhow::Result;
use caixa::application::{AppError, ErrorCategory, LedgerService};
use caixa::cli::{Cli, Commands};
use caixa::notification::Notifier;
use common::{CNPJ, CPF};
use tempfile::TempDir;

/// An initialized database the CLI can connect to.
async fn init_database() -> Result<(String, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let db_path = db_path.to_str().unwrap().to_string();
    LedgerService::init(&db_path, Notifier::disabled()).await?;
    Ok((db_path, temp_dir))
}

#[tokio::test]
async fn test_unknown_transaction_kind_is_invalid_input() -> Result<()> {
    let (db_path, _temp) = init_database().await?;

    let cli = Cli {
        database: db_path,
        command: Commands::Transact {
            amount: "100.00".to_string(),
            cpf: CPF.to_string(),
            cnpj: CNPJ.to_string(),
            kind: "transferencia".to_string(),
            system_fee: None,
        },
    };

    let err = cli.run().await.unwrap_err();
    let app_err = err.downcast::<AppError>()?;
    assert!(matches!(app_err, AppError::InvalidTransactionKind(_)));
    assert_eq!(app_err.category(), ErrorCategory::InvalidInput);

    Ok(())
}

#[tokio::test]
async fn test_transaction_listing_rejects_both_filters() -> Result<()> {
    let (db_path, _temp) = init_database().await?;

    let cli = Cli {
        database: db_path,
        command: Commands::Transactions {
            cpf: Some(CPF.to_string()),
            cnpj: Some(CNPJ.to_string()),
        },
    };

    let err = cli.run().await.unwrap_err();
    assert!(err.to_string().contains("not both"));

    Ok(())
}
