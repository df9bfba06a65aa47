//! Payload sources for GoalFlow.
//!
//! Each source turns a transport into a stream of validated payloads.
//!
//! Available sources:
//! - **Line**: JSON lines from stdin or any async reader
//! - **Ingest**: HTTP pushes, with optional HMAC signatures

pub mod ingest;
pub mod stdin;

use goalflow_core::Payload;
use tracing::warn;

pub use ingest::{IngestError, IngestSource, SIGNATURE_HEADER};
pub use stdin::{LineSource, StdinSource};

/// Validate one raw message, logging and dropping it when invalid.
pub fn decode_payload(source: &str, raw: &str) -> Option<Payload> {
    match Payload::from_json(raw) {
        Ok(payload) => Some(payload),
        Err(e) => {
            warn!(source, "Discarding invalid payload: {e}");
            None
        }
    }
}
