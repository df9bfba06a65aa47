//! Line-delimited JSON source: one payload per line.
//!
//! Used by `goalflow listen` to read payloads from stdin, so any producer
//! (a broker bridge, `tail -f`, a test script) can be piped in.

use async_trait::async_trait;
use goalflow_core::error::ChannelError;
use goalflow_core::source::PayloadSource;
use goalflow_core::Payload;
use tokio::io::{self, AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};

/// Reads JSON payloads line by line from any async reader.
pub struct LineSource<R> {
    name: String,
    reader: Mutex<Option<R>>,
}

/// A [`LineSource`] over the process's stdin.
pub type StdinSource = LineSource<io::Stdin>;

impl StdinSource {
    pub fn stdin() -> Self {
        Self::new("stdin", io::stdin())
    }
}

impl<R> LineSource<R>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    pub fn new(name: impl Into<String>, reader: R) -> Self {
        Self {
            name: name.into(),
            reader: Mutex::new(Some(reader)),
        }
    }
}

#[async_trait]
impl<R> PayloadSource for LineSource<R>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self) -> Result<mpsc::Receiver<Payload>, ChannelError> {
        let reader = self
            .reader
            .lock()
            .await
            .take()
            .ok_or_else(|| ChannelError::AlreadyStarted(self.name.clone()))?;

        let (tx, rx) = mpsc::channel(32);
        let name = self.name.clone();
        info!(source = %name, "Payload source started");

        tokio::spawn(async move {
            let mut reader = BufReader::new(reader);
            let mut buf = Vec::new();
            let mut line_no = 0usize;

            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf).await {
                    Ok(0) => break, // EOF
                    Ok(_) => {
                        line_no += 1;
                        // Undecodable bytes become U+FFFD and fail schema checks below.
                        let text = String::from_utf8_lossy(&buf);
                        let line = text.trim();
                        if line.is_empty() {
                            continue;
                        }
                        let Some(payload) = crate::decode_payload(&name, line) else {
                            debug!(source = %name, line_no, "Skipped invalid line");
                            continue;
                        };
                        if tx.send(payload).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(source = %name, "Read failed, stopping source: {e}");
                        break;
                    }
                }
            }
            info!(source = %name, lines = line_no, "Payload source finished");
        });

        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn source(input: &str) -> LineSource<Cursor<Vec<u8>>> {
        LineSource::new("test", Cursor::new(input.as_bytes().to_vec()))
    }

    #[tokio::test]
    async fn yields_valid_payloads_in_order() {
        let input = concat!(
            r#"{"type":"EVENT","action":"AIR_TRACK_UPDATE","userId":"u1"}"#,
            "\n\n",
            r#"{"type":"EVENT","action":"SENSOR_GAP","userId":"u2","data":{"zone":"B"}}"#,
            "\n",
        );
        let mut rx = source(input).start().await.unwrap();

        let first = rx.recv().await.unwrap();
        assert_eq!(first.action(), "AIR_TRACK_UPDATE");
        let second = rx.recv().await.unwrap();
        assert_eq!(second.data()["zone"], "B");
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn invalid_lines_are_discarded() {
        let input = concat!(
            "not json\n",
            r#"{"type":"EVENT","action":"X"}"#,
            "\n",
            r#"{"type":"EVENT","action":"X","userId":"u1","data":[1]}"#,
            "\n",
            r#"{"type":"EVENT","action":"KEEP","userId":"u1"}"#,
            "\n",
        );
        let mut rx = source(input).start().await.unwrap();
        assert_eq!(rx.recv().await.unwrap().action(), "KEEP");
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn non_utf8_line_is_discarded_not_fatal() {
        let mut input = b"\xff\xfe garbage\n".to_vec();
        input.extend_from_slice(br#"{"type":"EVENT","action":"KEEP","userId":"u1"}"#);
        input.push(b'\n');
        let mut rx = LineSource::new("test", Cursor::new(input)).start().await.unwrap();

        assert_eq!(rx.recv().await.unwrap().action(), "KEEP");
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn last_line_without_newline_is_read() {
        let mut rx = source(r#"{"type":"EVENT","action":"TAIL","userId":"u1"}"#)
            .start()
            .await
            .unwrap();
        assert_eq!(rx.recv().await.unwrap().action(), "TAIL");
    }

    #[tokio::test]
    async fn second_start_is_rejected() {
        let src = source("");
        let _rx = src.start().await.unwrap();
        assert!(matches!(
            src.start().await,
            Err(ChannelError::AlreadyStarted(_))
        ));
    }

    #[test]
    fn source_name() {
        assert_eq!(StdinSource::stdin().name(), "stdin");
    }
}
