//! Binary codec for encoding and decoding OSC 1.0 messages.
//!
//! Wire format:
//! ```text
//! [address ... \0 pad][,typetags ... \0 pad][arg0][arg1]...
//! ```
//! Strings (the address, the type-tag list, and every `s` argument) are
//! NUL-terminated and padded with NULs to a 4-byte boundary, so a string
//! always occupies `len + 1 ..= len + 4` bytes. Integer arguments are 4-byte
//! big-endian. There is no length prefix: the transport's datagram framing
//! delimits messages.
//!
//! Only the type tags the serialosc dialect uses are supported: `i` (int32)
//! and `s` (string). [`crate::OscArg::Byte`] values are written with tag `i`.
//! OSC bundles (`#bundle` packets) are rejected; serialosc sends plain
//! messages.

use thiserror::Error;

use crate::protocol::message::{OscArg, OscMessage};

/// Leading bytes of an OSC bundle packet.
const BUNDLE_MAGIC: &[u8] = b"#bundle\0";

/// Errors that can occur during message encoding or decoding.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// The address string does not begin with `/`.
    #[error("OSC address {address:?} does not begin with '/'")]
    InvalidAddress { address: String },

    /// The byte slice ends before the announced content does.
    #[error("insufficient data: need at least {needed} bytes, got {available}")]
    InsufficientData { needed: usize, available: usize },

    /// A string field runs to the end of the buffer without a NUL terminator.
    #[error("string starting at offset {offset} has no NUL terminator")]
    UnterminatedString { offset: usize },

    /// A string field is not valid UTF-8.
    #[error("string at offset {offset} is not valid UTF-8")]
    InvalidUtf8 { offset: usize },

    /// The type-tag list does not start with `,`.
    #[error("type tag list starts with 0x{found:02X}, expected ','")]
    MalformedTypeTags { found: u8 },

    /// A type tag other than `i` or `s` was encountered.
    #[error("unsupported OSC type tag {0:?}")]
    UnsupportedTypeTag(char),

    /// The packet is an OSC bundle, which this codec does not speak.
    #[error("OSC bundles are not supported")]
    BundlesUnsupported,

    /// An outgoing string contains an interior NUL byte and cannot be framed.
    #[error("outgoing string {text:?} contains a NUL byte")]
    NulInString { text: String },
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes an [`OscMessage`] into OSC 1.0 wire bytes.
///
/// # Errors
///
/// Returns [`ProtocolError::NulInString`] if the address or a string argument
/// contains an interior NUL byte.
///
/// # Examples
///
/// ```rust
/// use monome_core::{encode_message, OscArg, OscMessage};
///
/// let msg = OscMessage::with_args("/sys/port", vec![OscArg::Int(8000)]).unwrap();
/// let bytes = encode_message(&msg).unwrap();
/// assert_eq!(bytes.len() % 4, 0);
/// ```
pub fn encode_message(message: &OscMessage) -> Result<Vec<u8>, ProtocolError> {
    let mut tags = String::with_capacity(message.args().len() + 1);
    tags.push(',');
    for arg in message.args() {
        tags.push(match arg {
            OscArg::Int(_) | OscArg::Byte(_) => 'i',
            OscArg::Str(_) => 's',
        });
    }

    let mut buf = Vec::with_capacity(
        padded_len(message.address().len()) + padded_len(tags.len()) + message.args().len() * 4,
    );
    write_padded_str(&mut buf, message.address())?;
    write_padded_str(&mut buf, &tags)?;
    for arg in message.args() {
        match arg {
            OscArg::Int(v) => buf.extend_from_slice(&v.to_be_bytes()),
            OscArg::Byte(b) => buf.extend_from_slice(&i32::from(*b).to_be_bytes()),
            OscArg::Str(s) => write_padded_str(&mut buf, s)?,
        }
    }
    Ok(buf)
}

/// Decodes one [`OscMessage`] from the beginning of `bytes`.
///
/// Returns the decoded message and the number of bytes consumed, so a caller
/// reading from a stream-like source can advance its cursor. Trailing bytes
/// beyond the message are left untouched. A packet that ends right after the
/// address (no type-tag list) decodes as a message with no arguments; some
/// older OSC senders omit the empty tag list.
///
/// # Errors
///
/// Returns [`ProtocolError`] if the bytes are malformed.
///
/// # Examples
///
/// ```rust
/// use monome_core::decode_message;
///
/// let bytes = b"/sys/size\0\0\0,ii\0\x00\x00\x00\x10\x00\x00\x00\x08";
/// let (msg, consumed) = decode_message(bytes).unwrap();
/// assert_eq!(msg.address(), "/sys/size");
/// assert_eq!(msg.int_arg(0), Some(16));
/// assert_eq!(msg.int_arg(1), Some(8));
/// assert_eq!(consumed, bytes.len());
/// ```
pub fn decode_message(bytes: &[u8]) -> Result<(OscMessage, usize), ProtocolError> {
    if bytes.is_empty() {
        return Err(ProtocolError::InsufficientData {
            needed: 4,
            available: 0,
        });
    }
    if bytes.starts_with(BUNDLE_MAGIC) {
        return Err(ProtocolError::BundlesUnsupported);
    }

    let (address, mut offset) = read_padded_str(bytes, 0)?;
    if !address.starts_with('/') {
        return Err(ProtocolError::InvalidAddress { address });
    }

    let mut args = Vec::new();
    if offset < bytes.len() {
        if bytes[offset] != b',' {
            return Err(ProtocolError::MalformedTypeTags {
                found: bytes[offset],
            });
        }
        let (tags, next) = read_padded_str(bytes, offset)?;
        offset = next;
        for tag in tags.chars().skip(1) {
            match tag {
                'i' => {
                    let (value, next) = read_i32(bytes, offset)?;
                    args.push(OscArg::Int(value));
                    offset = next;
                }
                's' => {
                    let (text, next) = read_padded_str(bytes, offset)?;
                    args.push(OscArg::Str(text));
                    offset = next;
                }
                other => return Err(ProtocolError::UnsupportedTypeTag(other)),
            }
        }
    }

    let message = OscMessage::with_args(address, args)?;
    Ok((message, offset))
}

// ── Field helpers ─────────────────────────────────────────────────────────────

/// Total on-wire size of a string of `content_len` bytes: terminator plus
/// padding to the next 4-byte boundary, always at least one NUL.
fn padded_len(content_len: usize) -> usize {
    content_len + (4 - content_len % 4)
}

fn write_padded_str(buf: &mut Vec<u8>, s: &str) -> Result<(), ProtocolError> {
    if s.bytes().any(|b| b == 0) {
        return Err(ProtocolError::NulInString {
            text: s.to_string(),
        });
    }
    buf.extend_from_slice(s.as_bytes());
    let pad = 4 - s.len() % 4;
    buf.extend_from_slice(&[0u8; 4][..pad]);
    Ok(())
}

fn read_padded_str(bytes: &[u8], start: usize) -> Result<(String, usize), ProtocolError> {
    let nul = bytes[start..]
        .iter()
        .position(|&b| b == 0)
        .ok_or(ProtocolError::UnterminatedString { offset: start })?;
    let content = &bytes[start..start + nul];
    let text = std::str::from_utf8(content)
        .map_err(|_| ProtocolError::InvalidUtf8 { offset: start })?
        .to_string();
    let next = start + padded_len(nul);
    if next > bytes.len() {
        return Err(ProtocolError::InsufficientData {
            needed: next,
            available: bytes.len(),
        });
    }
    Ok((text, next))
}

fn read_i32(bytes: &[u8], start: usize) -> Result<(i32, usize), ProtocolError> {
    let end = start + 4;
    if bytes.len() < end {
        return Err(ProtocolError::InsufficientData {
            needed: end,
            available: bytes.len(),
        });
    }
    let value = i32::from_be_bytes([
        bytes[start],
        bytes[start + 1],
        bytes[start + 2],
        bytes[start + 3],
    ]);
    Ok((value, end))
}
