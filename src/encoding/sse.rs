//! Server-Sent Events framing.

use bytes::{BufMut, Bytes, BytesMut};

use crate::encoding::eventstream::FrameError;
use crate::encoding::StreamEncoder;

pub const CONTENT_TYPE: &str = "text/event-stream";

/// Emits each payload line as `data: <line>\n\n`.
///
/// No `[DONE]` sentinel is appended; callers decide end-of-stream semantics.
#[derive(Debug, Clone, Copy, Default)]
pub struct SseEncoder;

impl StreamEncoder for SseEncoder {
    fn content_type(&self) -> &'static str {
        CONTENT_TYPE
    }

    fn encode_frame(&self, line: &[u8]) -> Result<Bytes, FrameError> {
        let mut frame = BytesMut::with_capacity(line.len() + 8);
        frame.put_slice(b"data: ");
        frame.put_slice(line);
        frame.put_slice(b"\n\n");
        Ok(frame.freeze())
    }
}
