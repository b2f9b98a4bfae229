//! Paced frame emission for the streaming encodings.
//!
//! A spawned task walks the payload line by line, sleeps the configured
//! interval, encodes the line and hands it to the response body through a
//! channel. Each frame reaches hyper as its own chunk and is written out
//! before the next one is produced.
//!
//! The response head is held until the first frame exists, so the status
//! line and frame 1 leave together and frame `i` follows the first response
//! byte by `(i - 1)` intervals.

use std::convert::Infallible;
use std::time::Duration;

use axum::body::Body;
use bytes::Bytes;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

use crate::encoding::{ResponseType, StreamEncoder};
use crate::observability::metrics;

/// Non-empty `\n`-separated lines of `payload`, in order.
pub fn frames(payload: &[u8]) -> impl Iterator<Item = &[u8]> {
    payload.split(|b| *b == b'\n').filter(|line| !line.is_empty())
}

/// Start streaming `payload` through `encoder` and return the response body
/// once its first frame is ready.
pub async fn spawn_frame_stream<E>(
    encoder: E,
    response_type: ResponseType,
    payload: Bytes,
    interval: Duration,
) -> Body
where
    E: StreamEncoder,
{
    let (body_tx, mut body_rx) = mpsc::channel::<Result<Bytes, Infallible>>(1);

    tokio::spawn(async move {
        let mut sent = 0usize;

        for line in frames(&payload) {
            tokio::time::sleep(interval).await;

            let frame = match encoder.encode_frame(line) {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::error!(
                        response_type = response_type.as_str(),
                        frame = sent + 1,
                        error = %e,
                        "Failed to encode frame, closing stream"
                    );
                    return;
                }
            };

            if body_tx.send(Ok(frame)).await.is_err() {
                tracing::warn!(
                    response_type = response_type.as_str(),
                    frames_sent = sent,
                    "Client disconnected mid-stream"
                );
                return;
            }

            sent += 1;
            metrics::record_frame(response_type);
            tracing::debug!(response_type = response_type.as_str(), frame = sent, "Frame sent");
        }

        if let Some(terminal) = encoder.terminal_frame() {
            match terminal {
                Ok(frame) => {
                    if body_tx.send(Ok(frame)).await.is_err() {
                        tracing::warn!(
                            response_type = response_type.as_str(),
                            frames_sent = sent,
                            "Client disconnected before terminal frame"
                        );
                        return;
                    }
                    metrics::record_frame(response_type);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to encode terminal frame");
                    return;
                }
            }
        }

        tracing::debug!(
            response_type = response_type.as_str(),
            frames_sent = sent,
            "Stream complete"
        );
    });

    // None when the payload produced no frame at all.
    let first = body_rx.recv().await;
    let rest = ReceiverStream::new(body_rx);

    Body::from_stream(tokio_stream::iter(first).chain(rest))
}
