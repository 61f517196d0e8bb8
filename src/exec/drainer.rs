// src/exec/drainer.rs

//! Output drainers: one per child stream, each appending raw chunks to its
//! own [`OutputBuffer`].

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::task::OutputBuffer;

/// Which child stream a drainer reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl StreamKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StreamKind::Stdout => "stdout",
            StreamKind::Stderr => "stderr",
        }
    }
}

#[derive(Debug)]
pub struct Drainer<R> {
    task_id: String,
    kind: StreamKind,
    reader: R,
    buffer: OutputBuffer,
    chunk_size: usize,
    drain_timeout: Duration,
    cancel: CancellationToken,
}

impl<R> Drainer<R>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    pub fn new(
        task_id: impl Into<String>,
        kind: StreamKind,
        reader: R,
        buffer: OutputBuffer,
        chunk_size: usize,
        drain_timeout: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            kind,
            reader,
            buffer,
            chunk_size: chunk_size.max(1),
            drain_timeout,
            cancel,
        }
    }

    /// Read chunks until the stream closes, fails, or the token is cancelled.
    ///
    /// End of stream appends one empty chunk and stops. Cancellation switches
    /// to a single best-effort drain bounded by `drain_timeout`; whatever
    /// does not arrive in time is dropped. Never returns an error.
    pub async fn run(mut self) {
        let mut chunk = vec![0u8; self.chunk_size];

        loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    self.final_drain().await;
                    return;
                }

                res = self.reader.read(&mut chunk) => match res {
                    Ok(0) => {
                        self.buffer.append(Vec::new());
                        debug!(task_id = %self.task_id, stream = self.kind.as_str(), "stream closed");
                        return;
                    }
                    Ok(n) => {
                        trace!(task_id = %self.task_id, stream = self.kind.as_str(), bytes = n, "chunk read");
                        self.buffer.append(chunk[..n].to_vec());
                    }
                    Err(e) => {
                        debug!(
                            task_id = %self.task_id,
                            stream = self.kind.as_str(),
                            error = %e,
                            "stream read failed; stopping drainer"
                        );
                        return;
                    }
                },
            }
        }
    }

    async fn final_drain(&mut self) {
        let mut rest = Vec::new();
        let outcome = timeout(self.drain_timeout, self.reader.read_to_end(&mut rest)).await;

        match outcome {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                debug!(task_id = %self.task_id, stream = self.kind.as_str(), error = %e, "final drain read failed");
            }
            Err(_) => {
                debug!(task_id = %self.task_id, stream = self.kind.as_str(), "final drain timed out");
            }
        }

        if rest.is_empty() {
            trace!(task_id = %self.task_id, stream = self.kind.as_str(), "no data left");
        } else {
            debug!(task_id = %self.task_id, stream = self.kind.as_str(), bytes = rest.len(), "drained trailing output");
            self.buffer.append(rest);
        }
    }
}
