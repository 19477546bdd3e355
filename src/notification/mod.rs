use std::time::Duration;

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Serialize;

use crate::config::NotificationConfig;
use crate::domain::{Company, Customer, Transaction, TransactionKind};

const EMAIL_SUBJECT: &str = "Transação realizada com sucesso";
const EMAIL_BODY: &str = "Sua transação foi realizada com sucesso!";

/// Wire representation of a committed transaction, POSTed to the
/// company's registered webhook endpoint.
#[derive(Debug, Serialize)]
struct CallbackPayload<'a> {
    transaction_id: i64,
    cpf_cliente: &'a str,
    cnpj_empresa: &'a str,
    valor: String,
    tipo: TransactionKind,
    data_hora: String,
}

/// Best-effort delivery of post-transaction notifications: an HTTP
/// callback to the company and a confirmation email to the customer.
///
/// Failures are logged and swallowed: a delivery failure must never
/// undo a committed transaction. Every outbound call is bounded by a
/// timeout so a slow third party cannot stall the sender.
pub struct Notifier {
    http: Option<reqwest::Client>,
    mailer: Option<AsyncSmtpTransport<Tokio1Executor>>,
    mail_from: Option<Mailbox>,
    timeout: Duration,
}

impl Notifier {
    /// Build a notifier from configuration. SMTP settings are optional;
    /// without them the email channel is disabled.
    pub fn from_config(config: &NotificationConfig) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        let (mailer, mail_from) = match (&config.smtp, &config.mail_from) {
            (Some(smtp), Some(from)) => {
                let mut builder =
                    AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)?
                        .port(smtp.port)
                        .timeout(Some(timeout));
                if let Some((user, pass)) = &smtp.credentials {
                    builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
                }
                (Some(builder.build()), Some(from.parse::<Mailbox>()?))
            }
            _ => (None, None),
        };

        Ok(Self {
            http: Some(http),
            mailer,
            mail_from,
            timeout,
        })
    }

    /// A notifier with both channels disabled. Used in tests and when
    /// running without any notification configuration.
    pub fn disabled() -> Self {
        Self {
            http: None,
            mailer: None,
            mail_from: None,
            timeout: Duration::from_secs(5),
        }
    }

    /// Deliver both notifications for a committed transaction. Never
    /// fails; every problem is logged at warn.
    pub async fn notify(&self, company: &Company, customer: &Customer, transaction: &Transaction) {
        self.send_callback(company, customer, transaction).await;
        self.send_email(customer).await;
    }

    /// POST the transaction representation to the company's webhook
    /// endpoint, if one is registered.
    async fn send_callback(
        &self,
        company: &Company,
        customer: &Customer,
        transaction: &Transaction,
    ) {
        let (Some(http), Some(url)) = (&self.http, &company.webhook_url) else {
            return;
        };

        let payload = CallbackPayload {
            transaction_id: transaction.id,
            cpf_cliente: &customer.cpf,
            cnpj_empresa: &company.cnpj,
            valor: transaction.amount.to_string(),
            tipo: transaction.kind,
            data_hora: transaction.created_at.to_rfc3339(),
        };

        match http.post(url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::debug!(url = %url, "callback delivered");
            }
            Ok(response) => {
                tracing::warn!(url = %url, status = %response.status(), "callback rejected");
            }
            Err(err) => {
                tracing::warn!(url = %url, error = %err, "callback failed");
            }
        }
    }

    /// Send the fixed confirmation email to the customer, if SMTP is
    /// configured.
    async fn send_email(&self, customer: &Customer) {
        let (Some(mailer), Some(from)) = (&self.mailer, &self.mail_from) else {
            return;
        };

        let to: Mailbox = match customer.email.parse() {
            Ok(mailbox) => mailbox,
            Err(err) => {
                tracing::warn!(email = %customer.email, error = %err, "invalid recipient address");
                return;
            }
        };

        let message = match Message::builder()
            .from(from.clone())
            .to(to)
            .subject(EMAIL_SUBJECT)
            .body(EMAIL_BODY.to_string())
        {
            Ok(message) => message,
            Err(err) => {
                tracing::warn!(error = %err, "failed to build confirmation email");
                return;
            }
        };

        // lettre's own timeout covers the SMTP conversation; the outer
        // one guards connection setup as well.
        match tokio::time::timeout(self.timeout, mailer.send(message)).await {
            Ok(Ok(_)) => {
                tracing::debug!(email = %customer.email, "confirmation email sent");
            }
            Ok(Err(err)) => {
                tracing::warn!(email = %customer.email, error = %err, "confirmation email failed");
            }
            Err(_) => {
                tracing::warn!(email = %customer.email, "confirmation email timed out");
            }
        }
    }
}
