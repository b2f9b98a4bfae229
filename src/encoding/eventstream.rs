//! AWS event-stream binary message codec.
//!
//! ```text
//! ┌──────────────┬───────────────┬─────────────┬─────────┬─────────┬─────────────┐
//! │ total_len u32│ headers_len u32│ prelude_crc │ headers │ payload │ message_crc │
//! └──────────────┴───────────────┴─────────────┴─────────┴─────────┴─────────────┘
//! header := name_len u8 | name | type u8 | value
//! ```
//!
//! All integers are big-endian. Both checksums are CRC32 (IEEE): the first
//! covers the 8-byte prelude, the second everything before it.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

use crate::encoding::StreamEncoder;

pub const CONTENT_TYPE: &str = "application/vnd.amazon.eventstream";

/// Header carrying the event kind.
pub const EVENT_TYPE: &str = "event-type";

/// Payload of the terminal `event-type=end` message.
pub const END_PAYLOAD: &[u8] = b"this-is-end";

const PRELUDE_LEN: usize = 8;
const PRELUDE_AND_CRC_LEN: usize = PRELUDE_LEN + 4;
const MIN_MESSAGE_LEN: usize = PRELUDE_AND_CRC_LEN + 4;
const MAX_MESSAGE_LEN: usize = 16 * 1024 * 1024;
const MAX_HEADERS_LEN: usize = 128 * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("prelude checksum mismatch: computed {computed:#010x}, message says {declared:#010x}")]
    PreludeChecksum { computed: u32, declared: u32 },

    #[error("message checksum mismatch: computed {computed:#010x}, message says {declared:#010x}")]
    MessageChecksum { computed: u32, declared: u32 },

    #[error("message length {0} outside allowed range")]
    InvalidLength(usize),

    #[error("headers section of {0} bytes exceeds limit")]
    HeadersTooLarge(usize),

    #[error("header name of {0} bytes exceeds 255")]
    HeaderNameTooLong(usize),

    #[error("header value of {0} bytes exceeds 65535")]
    HeaderValueTooLong(usize),

    #[error("unknown header value type {0}")]
    UnknownHeaderType(u8),

    #[error("header section truncated")]
    TruncatedHeader,

    #[error("header text is not valid UTF-8")]
    InvalidUtf8,
}

/// Typed header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    Bool(bool),
    Byte(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    ByteArray(Bytes),
    String(String),
    /// Milliseconds since the Unix epoch.
    Timestamp(i64),
    Uuid([u8; 16]),
}

impl HeaderValue {
    fn type_tag(&self) -> u8 {
        match self {
            HeaderValue::Bool(true) => 0,
            HeaderValue::Bool(false) => 1,
            HeaderValue::Byte(_) => 2,
            HeaderValue::Int16(_) => 3,
            HeaderValue::Int32(_) => 4,
            HeaderValue::Int64(_) => 5,
            HeaderValue::ByteArray(_) => 6,
            HeaderValue::String(_) => 7,
            HeaderValue::Timestamp(_) => 8,
            HeaderValue::Uuid(_) => 9,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HeaderValue::String(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: HeaderValue,
}

impl Header {
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: HeaderValue::String(value.into()),
        }
    }
}

/// One event-stream message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub headers: Vec<Header>,
    pub payload: Bytes,
}

impl Message {
    /// Message with a single `event-type` string header.
    pub fn event(event_type: &str, payload: impl Into<Bytes>) -> Self {
        Self {
            headers: vec![Header::string(EVENT_TYPE, event_type)],
            payload: payload.into(),
        }
    }

    /// Value of the `event-type` header, if it is a string.
    pub fn event_type(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name == EVENT_TYPE)
            .and_then(|h| h.value.as_str())
    }

    /// Serialize into the binary wire layout.
    pub fn encode(&self) -> Result<Bytes, FrameError> {
        let mut headers = BytesMut::new();
        for header in &self.headers {
            encode_header(header, &mut headers)?;
        }
        if headers.len() > MAX_HEADERS_LEN {
            return Err(FrameError::HeadersTooLarge(headers.len()));
        }

        let total_len = MIN_MESSAGE_LEN + headers.len() + self.payload.len();
        if total_len > MAX_MESSAGE_LEN {
            return Err(FrameError::InvalidLength(total_len));
        }

        let mut buf = BytesMut::with_capacity(total_len);
        buf.put_u32(total_len as u32);
        buf.put_u32(headers.len() as u32);
        let prelude_crc = crc32fast::hash(&buf[..PRELUDE_LEN]);
        buf.put_u32(prelude_crc);
        buf.put_slice(&headers);
        buf.put_slice(&self.payload);
        let message_crc = crc32fast::hash(&buf);
        buf.put_u32(message_crc);

        Ok(buf.freeze())
    }

    /// Decode one message from the front of `buf`.
    ///
    /// Returns `Ok(None)` when `buf` does not yet hold a full message, and the
    /// number of bytes consumed otherwise.
    pub fn decode(buf: &[u8]) -> Result<Option<(Message, usize)>, FrameError> {
        if buf.len() < PRELUDE_AND_CRC_LEN {
            return Ok(None);
        }

        let mut prelude = &buf[..PRELUDE_AND_CRC_LEN];
        let total_len = prelude.get_u32() as usize;
        let headers_len = prelude.get_u32() as usize;
        let declared_prelude_crc = prelude.get_u32();

        let computed = crc32fast::hash(&buf[..PRELUDE_LEN]);
        if computed != declared_prelude_crc {
            return Err(FrameError::PreludeChecksum {
                computed,
                declared: declared_prelude_crc,
            });
        }
        if !(MIN_MESSAGE_LEN..=MAX_MESSAGE_LEN).contains(&total_len)
            || headers_len > total_len - MIN_MESSAGE_LEN
        {
            return Err(FrameError::InvalidLength(total_len));
        }
        if buf.len() < total_len {
            return Ok(None);
        }

        let body_end = total_len - 4;
        let declared_message_crc = (&buf[body_end..total_len]).get_u32();
        let computed = crc32fast::hash(&buf[..body_end]);
        if computed != declared_message_crc {
            return Err(FrameError::MessageChecksum {
                computed,
                declared: declared_message_crc,
            });
        }

        let headers_end = PRELUDE_AND_CRC_LEN + headers_len;
        let mut header_bytes = &buf[PRELUDE_AND_CRC_LEN..headers_end];
        let mut headers = Vec::new();
        while header_bytes.has_remaining() {
            headers.push(decode_header(&mut header_bytes)?);
        }

        let payload = Bytes::copy_from_slice(&buf[headers_end..body_end]);
        Ok(Some((Message { headers, payload }, total_len)))
    }
}

fn encode_header(header: &Header, buf: &mut BytesMut) -> Result<(), FrameError> {
    let name = header.name.as_bytes();
    if name.len() > u8::MAX as usize {
        return Err(FrameError::HeaderNameTooLong(name.len()));
    }
    buf.put_u8(name.len() as u8);
    buf.put_slice(name);
    buf.put_u8(header.value.type_tag());

    match &header.value {
        HeaderValue::Bool(_) => {}
        HeaderValue::Byte(v) => buf.put_i8(*v),
        HeaderValue::Int16(v) => buf.put_i16(*v),
        HeaderValue::Int32(v) => buf.put_i32(*v),
        HeaderValue::Int64(v) | HeaderValue::Timestamp(v) => buf.put_i64(*v),
        HeaderValue::ByteArray(v) => put_sized(buf, v)?,
        HeaderValue::String(v) => put_sized(buf, v.as_bytes())?,
        HeaderValue::Uuid(v) => buf.put_slice(v),
    }
    Ok(())
}

fn put_sized(buf: &mut BytesMut, value: &[u8]) -> Result<(), FrameError> {
    if value.len() > u16::MAX as usize {
        return Err(FrameError::HeaderValueTooLong(value.len()));
    }
    buf.put_u16(value.len() as u16);
    buf.put_slice(value);
    Ok(())
}

fn decode_header(buf: &mut &[u8]) -> Result<Header, FrameError> {
    let name_len = take_u8(buf)? as usize;
    let name = String::from_utf8(take(buf, name_len)?.to_vec()).map_err(|_| FrameError::InvalidUtf8)?;

    let value = match take_u8(buf)? {
        0 => HeaderValue::Bool(true),
        1 => HeaderValue::Bool(false),
        2 => HeaderValue::Byte(take(buf, 1)?.get_i8()),
        3 => HeaderValue::Int16(take(buf, 2)?.get_i16()),
        4 => HeaderValue::Int32(take(buf, 4)?.get_i32()),
        5 => HeaderValue::Int64(take(buf, 8)?.get_i64()),
        6 => {
            let len = take(buf, 2)?.get_u16() as usize;
            HeaderValue::ByteArray(Bytes::copy_from_slice(take(buf, len)?))
        }
        7 => {
            let len = take(buf, 2)?.get_u16() as usize;
            let text = take(buf, len)?.to_vec();
            HeaderValue::String(String::from_utf8(text).map_err(|_| FrameError::InvalidUtf8)?)
        }
        8 => HeaderValue::Timestamp(take(buf, 8)?.get_i64()),
        9 => {
            let mut uuid = [0u8; 16];
            uuid.copy_from_slice(take(buf, 16)?);
            HeaderValue::Uuid(uuid)
        }
        other => return Err(FrameError::UnknownHeaderType(other)),
    };

    Ok(Header { name, value })
}

fn take_u8(buf: &mut &[u8]) -> Result<u8, FrameError> {
    Ok(take(buf, 1)?[0])
}

fn take<'a>(buf: &mut &'a [u8], len: usize) -> Result<&'a [u8], FrameError> {
    if buf.len() < len {
        return Err(FrameError::TruncatedHeader);
    }
    let (head, rest) = buf.split_at(len);
    *buf = rest;
    Ok(head)
}

/// Encodes each payload line as an `event-type=content` message and closes
/// the stream with one `event-type=end` message.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventStreamEncoder;

impl StreamEncoder for EventStreamEncoder {
    fn content_type(&self) -> &'static str {
        CONTENT_TYPE
    }

    fn encode_frame(&self, line: &[u8]) -> Result<Bytes, FrameError> {
        Message::event("content", Bytes::copy_from_slice(line)).encode()
    }

    fn terminal_frame(&self) -> Option<Result<Bytes, FrameError>> {
        Some(Message::event("end", Bytes::from_static(END_PAYLOAD)).encode())
    }
}
