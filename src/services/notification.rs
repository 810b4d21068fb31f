// src/services/notification.rs

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;

use crate::models::ledger::PointsType;

/// Falhas de envio. Nunca chegam ao cliente HTTP, só ao log.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Endereço de e-mail inválido: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Falha ao montar a mensagem: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("Falha no transporte SMTP: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotificationError>;
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

/// Envio real via SMTP (TLS implícito, como o relay do Gmail na porta 465).
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    pub fn new(config: &SmtpConfig) -> Result<Self, NotificationError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
            .port(config.port)
            .credentials(Credentials::new(config.user.clone(), config.password.clone()))
            .build();
        let from = config.user.parse::<Mailbox>()?;

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotificationError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse::<Mailbox>()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        self.transport.send(message).await?;
        Ok(())
    }
}

/// Usado quando não há SMTP configurado: só registra no log.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotificationError> {
        tracing::info!(%to, %subject, %body, "📧 Notificação (sem SMTP configurado)");
        Ok(())
    }
}

/// Assunto e corpo do e-mail enviado após uma movimentação de pontos.
pub fn reward_message(kind: PointsType, points: i64, available: i64) -> (&'static str, String) {
    match kind {
        PointsType::Add => (
            "Rewards Added",
            format!(
                "{} reward points are credited to your account. Total available reward points are: {}.",
                points, available
            ),
        ),
        PointsType::Redeem => (
            "Rewards Redeemed",
            format!(
                "{} reward points are redeemed from your account. Total available reward points are: {}.",
                points, available
            ),
        ),
    }
}
