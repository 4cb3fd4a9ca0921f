//! Streaming relay of upstream response bodies.
//!
//! [`Relay`] turns an upstream body into a lazy stream of `Bytes` chunks, each
//! at most `chunk_size` long. It never holds more than one upstream frame, ends
//! at upstream EOF and cannot be restarted. The transport drains it into the
//! client connection; dropping it early (client gone) drops the upstream body
//! and with it the upstream connection.

use std::pin::Pin;
use std::task::{ready, Context, Poll};

use axum::body::{Body, BodyDataStream, Bytes};
use futures_util::{Stream, StreamExt};
use tracing::Span;

use crate::observability::metrics;

/// Producer side of the upstream → client body relay.
pub struct Relay {
    inner: BodyDataStream,
    pending: Bytes,
    chunk_size: usize,
    relayed: u64,
    finished: bool,
    span: Span,
}

impl Relay {
    /// Wrap `body`, emitting chunks of at most `chunk_size` bytes.
    ///
    /// A zero `chunk_size` is treated as one.
    pub fn new(body: Body, chunk_size: usize) -> Self {
        Self {
            inner: body.into_data_stream(),
            pending: Bytes::new(),
            chunk_size: chunk_size.max(1),
            relayed: 0,
            finished: false,
            span: Span::current(),
        }
    }

    /// Bytes handed to the consumer so far.
    pub fn relayed(&self) -> u64 {
        self.relayed
    }
}

impl Stream for Relay {
    type Item = Result<Bytes, axum::Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        loop {
            if !this.pending.is_empty() {
                let len = this.pending.len().min(this.chunk_size);
                let chunk = this.pending.split_to(len);
                this.relayed += len as u64;
                return Poll::Ready(Some(Ok(chunk)));
            }

            if this.finished {
                return Poll::Ready(None);
            }

            match ready!(this.inner.poll_next_unpin(cx)) {
                Some(Ok(frame)) => this.pending = frame,
                Some(Err(e)) => {
                    this.finished = true;
                    this.span.in_scope(|| {
                        tracing::error!(
                            relayed_bytes = this.relayed,
                            error = %e,
                            "Upstream body failed mid-stream"
                        );
                    });
                    metrics::record_upstream_error();
                    return Poll::Ready(Some(Err(e)));
                }
                None => {
                    this.finished = true;
                    this.span.in_scope(|| {
                        tracing::debug!(relayed_bytes = this.relayed, "Upstream body complete");
                    });
                }
            }
        }
    }
}

impl Drop for Relay {
    fn drop(&mut self) {
        if !self.finished {
            self.span.in_scope(|| {
                tracing::debug!(
                    relayed_bytes = self.relayed,
                    "Client went away mid-relay, releasing upstream"
                );
            });
        }
    }
}
