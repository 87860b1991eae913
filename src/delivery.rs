//! The delivery-channel collaborator contract.
//!
//! pagepack does not know (or care) where archives end up — a chat
//! transport, an upload endpoint, a local directory. The job hands finished
//! artefacts to a [`DeliveryChannel`] and the host application decides what
//! "sending" means. The trait is async because real channels are network
//! I/O, and `Send + Sync` because the job holds it across worker boundaries.
//!
//! Ordering contract: the job calls `send_file` strictly in ascending
//! archive-part order, and a job that fails before the delivery phase never
//! calls it at all.

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Error reported by a delivery channel implementation.
///
/// Channels are external collaborators, so their failures are opaque to the
/// library — one message string is all the job needs to abandon delivery.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct DeliveryError {
    pub message: String,
}

impl DeliveryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Where the job sends progress notices and finished archives.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// Send a human-readable status message (progress notice, failure notice).
    async fn send_text(&self, text: &str) -> Result<(), DeliveryError>;

    /// Send one archive file with its caption.
    ///
    /// `path` lives in the job's working directory and is only valid for the
    /// duration of this call — implementations that need the file afterwards
    /// must copy it.
    async fn send_file(&self, path: &Path, caption: &str) -> Result<(), DeliveryError>;
}

/// A channel that drops everything. Useful when the caller only wants the
/// returned [`crate::output::JobOutput`] and no notifications.
pub struct NullDelivery;

#[async_trait]
impl DeliveryChannel for NullDelivery {
    async fn send_text(&self, _text: &str) -> Result<(), DeliveryError> {
        Ok(())
    }

    async fn send_file(&self, _path: &Path, _caption: &str) -> Result<(), DeliveryError> {
        Ok(())
    }
}
