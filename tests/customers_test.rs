mod common;

use anyhow::Result;
use caixa::application::{AppError, ErrorCategory};
use common::{test_service, CPF, CPF_2};

#[tokio::test]
async fn test_register_and_fetch_customer() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let customer = service.register_customer(CPF, "cliente@example.com").await?;
    assert!(customer.id > 0);
    assert_eq!(customer.cpf, CPF);
    assert_eq!(customer.email, "cliente@example.com");

    let fetched = service.get_customer(CPF).await?;
    assert_eq!(fetched.id, customer.id);
    assert_eq!(fetched.cpf, CPF);

    Ok(())
}

#[tokio::test]
async fn test_register_customer_strips_punctuation() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let customer = service
        .register_customer("529.982.247-25", "cliente@example.com")
        .await?;
    assert_eq!(customer.cpf, CPF_2);

    // Lookup works with either form
    assert_eq!(service.get_customer(CPF_2).await?.id, customer.id);
    assert_eq!(service.get_customer("529.982.247-25").await?.id, customer.id);

    Ok(())
}

#[tokio::test]
async fn test_register_customer_rejects_invalid_cpf() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let err = service
        .register_customer("11111111111", "cliente@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidCpf(_)));
    assert_eq!(err.category(), ErrorCategory::InvalidInput);

    let err = service
        .register_customer("123", "cliente@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidCpf(_)));

    // Nothing was persisted
    assert!(service.list_customers().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_register_customer_rejects_duplicate() -> Result<()> {
    let (service, _temp) = test_service().await?;

    service.register_customer(CPF, "a@example.com").await?;
    let err = service
        .register_customer("123.456.789-09", "b@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::CustomerAlreadyExists(_)));

    Ok(())
}

#[tokio::test]
async fn test_get_unknown_customer_is_not_found() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let err = service.get_customer(CPF).await.unwrap_err();
    assert!(matches!(err, AppError::CustomerNotFound(_)));
    assert_eq!(err.category(), ErrorCategory::NotFound);

    Ok(())
}

#[tokio::test]
async fn test_list_customers() -> Result<()> {
    let (service, _temp) = test_service().await?;

    service.register_customer(CPF, "a@example.com").await?;
    service.register_customer(CPF_2, "b@example.com").await?;

    let customers = service.list_customers().await?;
    assert_eq!(customers.len(), 2);

    Ok(())
}
