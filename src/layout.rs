//! Field Layouts
//!
//! Textual description of a message as a sequence of fields, used by the
//! `wirebuf` binary to drive the codec.
//!
//! # Syntax
//!
//! ```text
//! u8:7          single byte
//! u32:1000      32-bit integer (decimal, or 0x-prefixed hex)
//! str:abc       length-prefixed string from UTF-8 text
//! hex:00ff10    length-prefixed string from hex bytes
//! ```
//!
//! A decode layout lists only kinds: `u8,u32,str`.

use std::fmt;
use thiserror::Error;

use crate::buffer::{Buffer, LENGTH_PREFIX};
use crate::config::WirebufConfig;
use crate::diagnostics::LogChannel;
use crate::error::BufferError;

/// Layout errors.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("unknown field kind '{0}' (expected u8, u32 or str)")]
    UnknownKind(String),

    #[error("malformed field '{0}' (expected kind:value)")]
    Malformed(String),

    #[error("invalid {kind} value '{value}'")]
    InvalidNumber { kind: FieldKind, value: String },

    #[error("invalid hex payload: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("encoded message of {0} bytes exceeds the 32-bit range")]
    TooLarge(usize),

    #[error(transparent)]
    Buffer(#[from] BufferError),
}

/// Result type for layout operations.
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Kind of a field, without its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    U8,
    U32,
    Str,
}

impl FieldKind {
    /// Parse a kind name (`u8`, `u32`, `str`).
    pub fn parse(name: &str) -> LayoutResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "u8" => Ok(FieldKind::U8),
            "u32" => Ok(FieldKind::U32),
            "str" | "string" => Ok(FieldKind::Str),
            other => Err(LayoutError::UnknownKind(other.to_string())),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::U8 => write!(f, "u8"),
            FieldKind::U32 => write!(f, "u32"),
            FieldKind::Str => write!(f, "str"),
        }
    }
}

/// Parse a comma-separated list of kinds.
pub fn parse_kinds(layout: &str) -> LayoutResult<Vec<FieldKind>> {
    layout
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(FieldKind::parse)
        .collect()
}

/// A field with its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    U8(u8),
    U32(u32),
    Str(Vec<u8>),
}

impl Field {
    /// Parse a `kind:value` token.
    pub fn parse(token: &str) -> LayoutResult<Self> {
        let (kind, value) = token
            .split_once(':')
            .ok_or_else(|| LayoutError::Malformed(token.to_string()))?;

        match kind.trim().to_ascii_lowercase().as_str() {
            "hex" => Ok(Field::Str(hex::decode(value)?)),
            _ => match FieldKind::parse(kind)? {
                FieldKind::U8 => parse_number(value)
                    .and_then(|n| u8::try_from(n).ok())
                    .map(Field::U8)
                    .ok_or_else(|| invalid(FieldKind::U8, value)),
                FieldKind::U32 => parse_number(value)
                    .map(Field::U32)
                    .ok_or_else(|| invalid(FieldKind::U32, value)),
                FieldKind::Str => Ok(Field::Str(value.as_bytes().to_vec())),
            },
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Field::U8(_) => FieldKind::U8,
            Field::U32(_) => FieldKind::U32,
            Field::Str(_) => FieldKind::Str,
        }
    }

    /// Bytes this field occupies once encoded.
    pub fn encoded_len(&self) -> usize {
        match self {
            Field::U8(_) => 1,
            Field::U32(_) => 4,
            Field::Str(data) => LENGTH_PREFIX + data.len(),
        }
    }

    /// Append this field to the buffer.
    pub fn write_to(&self, buf: &mut Buffer) -> Result<(), BufferError> {
        match self {
            Field::U8(v) => buf.write_u8(*v),
            Field::U32(v) => buf.write_u32(*v),
            Field::Str(data) => buf.write_string(data),
        }
    }

    /// Read one field of the given kind from the buffer.
    pub fn read_from(kind: FieldKind, buf: &mut Buffer) -> Result<Self, BufferError> {
        match kind {
            FieldKind::U8 => buf.read_u8().map(Field::U8),
            FieldKind::U32 => buf.read_u32().map(Field::U32),
            FieldKind::Str => buf.read_string().map(Field::Str),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::U8(v) => write!(f, "u8 {}", v),
            Field::U32(v) => write!(f, "u32 {}", v),
            Field::Str(data) => match std::str::from_utf8(data) {
                Ok(text) => write!(f, "str {:?}", text),
                Err(_) => write!(f, "str hex:{}", hex::encode(data)),
            },
        }
    }
}

fn parse_number(value: &str) -> Option<u32> {
    let value = value.trim();
    match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(digits) => u32::from_str_radix(digits, 16).ok(),
        None => value.parse().ok(),
    }
}

fn invalid(kind: FieldKind, value: &str) -> LayoutError {
    LayoutError::InvalidNumber {
        kind,
        value: value.to_string(),
    }
}

/// Exact encoded size of a sequence of fields.
pub fn encoded_len(fields: &[Field]) -> usize {
    fields.iter().map(Field::encoded_len).sum()
}

/// Encode fields into a buffer sized exactly for them.
pub fn encode(fields: &[Field], config: &WirebufConfig) -> LayoutResult<Vec<u8>> {
    let len = encoded_len(fields);
    let capacity = u32::try_from(len).map_err(|_| LayoutError::TooLarge(len))?;

    let mut buf = config.create_buffer(capacity)?;
    for field in fields {
        field.write_to(&mut buf)?;
    }
    Ok(buf.into_bytes())
}

/// Result of decoding a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// Fields in layout order
    pub fields: Vec<Field>,
    /// Bytes left unread after the last field
    pub trailing: usize,
}

/// Decode `bytes` as the given sequence of kinds on the configured channel.
pub fn decode(
    bytes: Vec<u8>,
    kinds: &[FieldKind],
    config: &WirebufConfig,
) -> LayoutResult<Decoded> {
    decode_with(bytes, kinds, config.diagnostics.channel())
}

/// Decode `bytes` as the given sequence of kinds, reporting to `log`.
///
/// Bytes left after the last field are reported as a warning.
pub fn decode_with(bytes: Vec<u8>, kinds: &[FieldKind], log: LogChannel) -> LayoutResult<Decoded> {
    let mut buf = Buffer::from_bytes(bytes, log)?;
    let fields = kinds
        .iter()
        .map(|&kind| Field::read_from(kind, &mut buf))
        .collect::<Result<Vec<_>, _>>()?;

    let trailing = buf.remaining();
    if trailing > 0 {
        buf.log_channel().warning(&format!(
            "message has {} bytes left after the last field",
            trailing
        ));
    }
    Ok(Decoded { fields, trailing })
}
