//! Payload source trait: the abstraction over inbound delivery.
//!
//! A source turns some transport (stdin lines, HTTP pushes, a broker
//! subscription) into a stream of validated [`Payload`]s. Validation
//! happens inside the source: anything that fails the schema is logged and
//! dropped, so the pipeline only ever sees well-formed payloads.

use async_trait::async_trait;
use tokio::sync::mpsc;
use crate::error::ChannelError;
use crate::payload::Payload;

#[async_trait]
pub trait PayloadSource: Send + Sync {
    /// Human-readable source name (e.g., "stdin", "ingest").
    fn name(&self) -> &str;

    /// Start delivering payloads. The receiver closes when the source ends.
    async fn start(&self) -> std::result::Result<mpsc::Receiver<Payload>, ChannelError>;

    /// Stop the source gracefully.
    async fn stop(&self) -> std::result::Result<(), ChannelError> {
        Ok(())
    }
}
