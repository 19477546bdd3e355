mod common;

use anyhow::Result;
use caixa::application::LedgerService;
use caixa::config::NotificationConfig;
use caixa::domain::TransactionKind;
use caixa::notification::Notifier;
use common::{dec, CNPJ, CPF};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Accept one HTTP request, answer 200, and hand the raw request back.
async fn capture_one_request(listener: TcpListener) -> Result<String> {
    let (mut socket, _) = listener.accept().await?;
    let mut request = Vec::new();
    let mut chunk = [0u8; 1024];
    // The callback body is a single JSON object, so the request is
    // complete once the closing brace arrives
    loop {
        let n = socket.read(&mut chunk).await?;
        request.extend_from_slice(&chunk[..n]);
        if n == 0 || request.ends_with(b"}") {
            break;
        }
    }
    socket
        .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\n\r\n")
        .await?;
    Ok(String::from_utf8_lossy(&request).into_owned())
}

#[tokio::test]
async fn test_webhook_callback_delivered_before_receipt_returns() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let server = tokio::spawn(capture_one_request(listener));

    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let notifier = Notifier::from_config(&NotificationConfig::from_env())?;
    let service = LedgerService::init(db_path.to_str().unwrap(), notifier).await?;

    service.register_customer(CPF, "cliente@example.com").await?;
    service
        .register_company(
            CNPJ,
            dec("1000.00"),
            dec("50.00"),
            Some(format!("http://{}/callback", addr)),
        )
        .await?;

    let receipt = service
        .execute_transaction(CPF, CNPJ, dec("500.00"), TransactionKind::Deposit, None)
        .await?;

    // The callback is sent before execute_transaction returns, so the
    // server task has already seen the request
    let request = server.await??;
    assert!(request.starts_with("POST /callback"));
    assert!(request.contains(&format!("\"transaction_id\":{}", receipt.transaction.id)));
    assert!(request.contains(&format!("\"cpf_cliente\":\"{}\"", CPF)));
    assert!(request.contains(&format!("\"cnpj_empresa\":\"{}\"", CNPJ)));
    assert!(request.contains("\"tipo\":\"deposito\""));
    assert!(request.contains("\"valor\":\"499.00\""));

    Ok(())
}

#[tokio::test]
async fn test_transaction_commits_even_when_callback_endpoint_is_down() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let notifier = Notifier::from_config(&NotificationConfig::from_env())?;
    let service = LedgerService::init(db_path.to_str().unwrap(), notifier).await?;

    service.register_customer(CPF, "cliente@example.com").await?;
    // Nothing listens here; the callback fails and is swallowed
    service
        .register_company(
            CNPJ,
            dec("1000.00"),
            dec("0"),
            Some("http://127.0.0.1:9/callback".to_string()),
        )
        .await?;

    let receipt = service
        .execute_transaction(CPF, CNPJ, dec("100.00"), TransactionKind::Deposit, None)
        .await?;

    assert_eq!(receipt.new_balance, dec("1100.00"));
    assert_eq!(service.get_company(CNPJ).await?.balance, dec("1100.00"));
    assert_eq!(service.list_transactions().await?.len(), 1);

    Ok(())
}
