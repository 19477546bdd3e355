use std::env;

/// SMTP relay settings for the confirmation email channel.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub credentials: Option<(String, String)>,
}

/// Notification settings, loaded from environment variables. Every
/// setting is optional: without SMTP settings the email channel is
/// disabled, and callbacks only go to companies that registered a
/// webhook URL.
///
/// Variables: `CAIXA_SMTP_HOST`, `CAIXA_SMTP_PORT` (default 587),
/// `CAIXA_SMTP_USERNAME`, `CAIXA_SMTP_PASSWORD`, `CAIXA_MAIL_FROM`,
/// `CAIXA_NOTIFY_TIMEOUT_SECS` (default 5).
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub smtp: Option<SmtpConfig>,
    pub mail_from: Option<String>,
    /// Upper bound on each outbound notification call
    pub timeout_secs: u64,
}

impl NotificationConfig {
    pub fn from_env() -> Self {
        let smtp = env::var("CAIXA_SMTP_HOST").ok().map(|host| {
            let port = env::var("CAIXA_SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(587);
            let credentials = match (
                env::var("CAIXA_SMTP_USERNAME"),
                env::var("CAIXA_SMTP_PASSWORD"),
            ) {
                (Ok(user), Ok(pass)) => Some((user, pass)),
                _ => None,
            };
            SmtpConfig {
                host,
                port,
                credentials,
            }
        });

        let mail_from = env::var("CAIXA_MAIL_FROM").ok();

        let timeout_secs = env::var("CAIXA_NOTIFY_TIMEOUT_SECS")
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(5);

        Self {
            smtp,
            mail_from,
            timeout_secs,
        }
    }
}
