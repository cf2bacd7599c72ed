//! Emailing finished strips to guests.
//!
//! Delivery is best effort: every accepted address gets one detached send
//! task. Failures are logged and never retried or shown on screen.

use lettre::message::header::{ContentType, ContentTypeErr};
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::extension::ClientId;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Handle;

use crate::config::MailConfig;

/// Decides which typed addresses are worth mailing.
#[derive(Debug, Clone)]
pub struct EmailPolicy {
    excluded_domain: String,
    null_address: String,
}

impl EmailPolicy {
    pub fn new(excluded_domain: impl Into<String>, null_address: impl Into<String>) -> Self {
        Self {
            excluded_domain: excluded_domain.into(),
            null_address: null_address.into(),
        }
    }

    pub fn from_config(config: &MailConfig) -> Self {
        Self::new(&config.excluded_domain, &config.null_address)
    }

    /// Return the cleaned address if a strip should be sent to it.
    ///
    /// Rejects empty input, the opt-out address, anything ending in the
    /// excluded domain, and text that is not a mailbox address.
    pub fn accept(&self, address: &str) -> Option<String> {
        let address = address.trim();
        if address.is_empty() || address == self.null_address {
            return None;
        }
        if !self.excluded_domain.is_empty() && address.ends_with(&self.excluded_domain) {
            return None;
        }
        if address.parse::<lettre::Address>().is_err() {
            return None;
        }
        Some(address.to_string())
    }
}

/// Hands a finished strip to the outbound mail path.
///
/// Implementations must return immediately; the booth never waits on delivery.
pub trait StripMailer {
    fn dispatch(&self, address: String, strip: PathBuf);
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Invalid address '{address}': {source}")]
    Address {
        address: String,
        source: lettre::address::AddressError,
    },

    #[error("Failed to read attachment '{}': {source}", path.display())]
    Attachment {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid content type: {0}")]
    ContentType(#[from] ContentTypeErr),

    #[error("Failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

fn mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse().map_err(|e| MailError::Address {
        address: address.to_string(),
        source: e,
    })
}

fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        _ => "image/jpeg",
    }
}

/// Build the multipart message: a short plain-text note plus the strip attached.
pub fn build_message(
    config: &MailConfig,
    to: &str,
    strip: &Path,
    strip_bytes: Vec<u8>,
) -> Result<Message, MailError> {
    let filename = strip
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "strip.jpg".to_string());
    let content_type = ContentType::parse(content_type_for(strip))?;

    let message = Message::builder()
        .from(mailbox(&config.from)?)
        .to(mailbox(to)?)
        .subject(config.subject.clone())
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(config.body.clone()))
                .singlepart(Attachment::new(filename).body(strip_bytes, content_type)),
        )?;
    Ok(message)
}

/// Sends strips over authenticated SMTP with STARTTLS on a tokio runtime.
#[derive(Clone)]
pub struct MailDispatcher {
    config: Arc<MailConfig>,
    password: Option<String>,
    runtime: Handle,
}

impl std::fmt::Debug for MailDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailDispatcher")
            .field("host", &self.config.host)
            .field("has_password", &self.password.is_some())
            .finish_non_exhaustive()
    }
}

impl MailDispatcher {
    pub fn new(config: MailConfig, password: Option<String>, runtime: Handle) -> Self {
        if password.is_none() {
            log::warn!("SMTP password not set; strips will be sent unauthenticated");
        }
        Self {
            config: Arc::new(config),
            password,
            runtime,
        }
    }

    fn transport(
        config: &MailConfig,
        password: Option<&str>,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, MailError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .hello_name(ClientId::Domain(config.client_name.clone()));
        if let Some(port) = config.port {
            builder = builder.port(port);
        }
        if let Some(password) = password {
            builder = builder.credentials(Credentials::new(
                config.username().to_string(),
                password.to_string(),
            ));
        }
        Ok(builder.build())
    }

    /// Read the strip, build the message and send it. One attempt only.
    pub async fn send_strip(
        config: &MailConfig,
        password: Option<&str>,
        to: &str,
        strip: &Path,
    ) -> Result<(), MailError> {
        let bytes = tokio::fs::read(strip)
            .await
            .map_err(|e| MailError::Attachment {
                path: strip.to_path_buf(),
                source: e,
            })?;
        let message = build_message(config, to, strip, bytes)?;
        let transport = Self::transport(config, password)?;
        transport.send(message).await?;
        Ok(())
    }
}

impl StripMailer for MailDispatcher {
    fn dispatch(&self, address: String, strip: PathBuf) {
        let config = Arc::clone(&self.config);
        let password = self.password.clone();

        // Detached: the JoinHandle is dropped and nobody awaits the outcome.
        drop(self.runtime.spawn(async move {
            let start = Instant::now();
            log::info!("Sending {} to {}", strip.display(), address);
            match Self::send_strip(&config, password.as_deref(), &address, &strip).await {
                Ok(()) => log::info!(
                    "Email to {} sent in {:.2}s ({})",
                    address,
                    start.elapsed().as_secs_f64(),
                    strip.display()
                ),
                Err(e) => log::error!("Email to {} failed: {}", address, e),
            }
        }));
    }
}
