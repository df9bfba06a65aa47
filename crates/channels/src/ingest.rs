//! Ingest source: payloads pushed in over HTTP.
//!
//! The gateway hands raw request bodies to [`IngestSource::accept`], which
//! checks the optional HMAC signature and the payload schema. Accepted
//! payloads are either run inline by the caller or queued with
//! [`IngestSource::inject`] for the background dispatcher.

use async_trait::async_trait;
use goalflow_core::error::{ChannelError, PayloadError};
use goalflow_core::source::PayloadSource;
use goalflow_core::Payload;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tokio::sync::mpsc;
use tracing::{info, warn};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the `sha256=<hex>` body signature.
pub const SIGNATURE_HEADER: &str = "X-Signature";

/// Why an inbound push was refused.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Missing or invalid signature")]
    InvalidSignature,

    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error(transparent)]
    Channel(#[from] ChannelError),
}

/// HTTP push source.
pub struct IngestSource {
    shared_secret: Option<String>,
    inject_tx: tokio::sync::Mutex<Option<mpsc::Sender<Payload>>>,
}

impl IngestSource {
    /// `shared_secret`: when set (and non-empty), every push must be signed.
    pub fn new(shared_secret: Option<String>) -> Self {
        Self {
            shared_secret: shared_secret.filter(|s| !s.is_empty()),
            inject_tx: tokio::sync::Mutex::new(None),
        }
    }

    pub fn requires_signature(&self) -> bool {
        self.shared_secret.is_some()
    }

    /// Validate an HMAC-SHA256 signature against the shared secret.
    ///
    /// Accepts `sha256=<hex_digest>` or a bare hex digest. Comparison is
    /// constant-time.
    pub fn validate_signature(&self, body: &[u8], signature: Option<&str>) -> bool {
        let Some(secret) = &self.shared_secret else {
            return true;
        };
        let Some(signature) = signature else {
            return false;
        };

        let sig_hex = signature.strip_prefix("sha256=").unwrap_or(signature);
        let Ok(provided) = hex::decode(sig_hex.trim()) else {
            return false;
        };
        let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
            return false;
        };
        mac.update(body);
        mac.verify_slice(&provided).is_ok()
    }

    /// Check signature and schema of a raw push.
    pub fn accept(&self, body: &[u8], signature: Option<&str>) -> Result<Payload, IngestError> {
        if !self.validate_signature(body, signature) {
            warn!(source = "ingest", "Rejected push with bad signature");
            return Err(IngestError::InvalidSignature);
        }
        let text = String::from_utf8_lossy(body);
        Payload::from_json(&text).map_err(|e| {
            warn!(source = "ingest", "Discarding invalid payload: {e}");
            IngestError::Payload(e)
        })
    }

    /// Queue an accepted payload for the background dispatcher.
    pub async fn inject(&self, payload: Payload) -> Result<(), ChannelError> {
        // Clone the sender so a full queue does not hold the lock.
        let tx = self
            .inject_tx
            .lock()
            .await
            .clone()
            .ok_or_else(|| ChannelError::NotStarted("ingest".into()))?;
        tx.send(payload)
            .await
            .map_err(|_| ChannelError::ConnectionLost("Payload queue closed".into()))
    }
}

#[async_trait]
impl PayloadSource for IngestSource {
    fn name(&self) -> &str {
        "ingest"
    }

    async fn start(&self) -> Result<mpsc::Receiver<Payload>, ChannelError> {
        let mut guard = self.inject_tx.lock().await;
        if guard.is_some() {
            return Err(ChannelError::AlreadyStarted("ingest".into()));
        }
        info!("Ingest source starting");
        let (tx, rx) = mpsc::channel(64);
        *guard = Some(tx);
        Ok(rx)
    }

    async fn stop(&self) -> Result<(), ChannelError> {
        self.inject_tx.lock().await.take();
        Ok(())
    }
}

/// Compute the `sha256=<hex>` signature for `body` (used by clients and tests).
pub fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(body);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}
