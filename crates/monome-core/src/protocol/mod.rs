//! Protocol module containing the message type, the OSC 1.0 binary codec,
//! the wire address tables, and inbound-message classification.

pub mod addresses;
pub mod codec;
pub mod inbound;
pub mod message;

pub use codec::{decode_message, encode_message, ProtocolError};
pub use inbound::{classify, DeviceEvent, Inbound, MalformedMessage, SystemReport};
pub use message::{OscArg, OscMessage};
