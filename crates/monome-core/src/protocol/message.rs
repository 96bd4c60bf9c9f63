//! The addressed-message type shared by the inbound and outbound paths.
//!
//! An [`OscMessage`] is a slash-delimited UTF-8 address plus an ordered list
//! of typed arguments. Messages are immutable once constructed: the router
//! hands the same value to every listener, and a command is encoded exactly
//! as it was built.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::codec::ProtocolError;

/// One typed argument of an [`OscMessage`].
///
/// Only the three kinds the serialosc dialect uses are modeled. `Byte` exists
/// for LED mask payloads (rows, columns, ring levels); it is an 8-bit value
/// at the API surface but travels as an int32 on the wire, which is what
/// serialosc devices expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OscArg {
    /// 32-bit signed integer (OSC type tag `i`).
    Int(i32),
    /// UTF-8 string (OSC type tag `s`).
    Str(String),
    /// 8-bit mask/level payload, encoded as an int32 (OSC type tag `i`).
    Byte(u8),
}

impl OscArg {
    /// Integer view of this argument: `Int` as-is, `Byte` widened, `Str` none.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            OscArg::Int(v) => Some(*v),
            OscArg::Byte(b) => Some(i32::from(*b)),
            OscArg::Str(_) => None,
        }
    }

    /// String view of this argument, if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            OscArg::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for OscArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OscArg::Int(v) => write!(f, "{v}"),
            OscArg::Str(s) => write!(f, "{s:?}"),
            OscArg::Byte(b) => write!(f, "{b}"),
        }
    }
}

/// An addressed protocol message: address string plus ordered typed args.
///
/// The address always begins with `/`; the validating constructors are the
/// only way to build one, so every `OscMessage` in the system upholds that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OscMessage {
    address: String,
    args: Vec<OscArg>,
}

impl OscMessage {
    /// Creates a message with no arguments.
    ///
    /// Returns [`ProtocolError::InvalidAddress`] unless the address starts
    /// with `/`.
    pub fn new(address: impl Into<String>) -> Result<Self, ProtocolError> {
        Self::with_args(address, Vec::new())
    }

    /// Creates a message with the given argument list.
    pub fn with_args(
        address: impl Into<String>,
        args: Vec<OscArg>,
    ) -> Result<Self, ProtocolError> {
        let address = address.into();
        if !address.starts_with('/') {
            return Err(ProtocolError::InvalidAddress { address });
        }
        Ok(Self { address, args })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn args(&self) -> &[OscArg] {
        &self.args
    }

    /// Argument at `index`, if present.
    pub fn arg(&self, index: usize) -> Option<&OscArg> {
        self.args.get(index)
    }

    /// Integer argument at `index` (`Int` or widened `Byte`).
    pub fn int_arg(&self, index: usize) -> Option<i32> {
        self.args.get(index).and_then(OscArg::as_int)
    }

    /// String argument at `index`.
    pub fn str_arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).and_then(OscArg::as_str)
    }
}

impl fmt::Display for OscMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_slash_address() {
        let msg = OscMessage::new("/sys/info").unwrap();

        assert_eq!(msg.address(), "/sys/info");
        assert!(msg.args().is_empty());
    }

    #[test]
    fn test_new_rejects_address_without_leading_slash() {
        let err = OscMessage::new("sys/info").unwrap_err();

        assert!(matches!(err, ProtocolError::InvalidAddress { .. }));
    }

    #[test]
    fn test_with_args_preserves_argument_order() {
        let msg = OscMessage::with_args(
            "/monome/grid/led/set",
            vec![OscArg::Int(3), OscArg::Int(4), OscArg::Int(1)],
        )
        .unwrap();

        assert_eq!(msg.args().len(), 3);
        assert_eq!(msg.int_arg(0), Some(3));
        assert_eq!(msg.int_arg(1), Some(4));
        assert_eq!(msg.int_arg(2), Some(1));
    }

    #[test]
    fn test_int_arg_widens_byte_and_rejects_string() {
        let msg = OscMessage::with_args(
            "/monome/grid/led/row",
            vec![OscArg::Byte(255), OscArg::Str("x".to_string())],
        )
        .unwrap();

        assert_eq!(msg.int_arg(0), Some(255));
        assert_eq!(msg.int_arg(1), None);
        assert_eq!(msg.str_arg(1), Some("x"));
    }

    #[test]
    fn test_str_arg_out_of_range_is_none() {
        let msg = OscMessage::new("/sys/prefix").unwrap();

        assert_eq!(msg.str_arg(0), None);
        assert_eq!(msg.arg(5), None);
    }

    #[test]
    fn test_display_shows_address_and_args() {
        let msg = OscMessage::with_args(
            "/sys/prefix",
            vec![OscArg::Str("/app".to_string())],
        )
        .unwrap();

        assert_eq!(msg.to_string(), "/sys/prefix \"/app\"");
    }
}
