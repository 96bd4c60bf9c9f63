//! Classification of inbound messages into typed system reports and device
//! events.
//!
//! The router's dispatch rules live here, free of any I/O so they can be
//! tested exhaustively:
//!
//! 1. An address exactly equal to one of the `/sys/*` reports is a
//!    [`SystemReport`].
//! 2. Otherwise, an address *ending with* one of the four event suffixes is a
//!    [`DeviceEvent`] (the device prefixes event addresses with whatever
//!    prefix it currently holds, so only the tail is meaningful).
//! 3. Anything else is [`Inbound::Unknown`] — not an error; future protocol
//!    extensions are expected to show up here.
//!
//! A message whose address is recognized but whose arguments have the wrong
//! count or kinds is a [`MalformedMessage`]. Callers drop those without
//! stopping delivery.

use thiserror::Error;

use crate::protocol::addresses::{
    EV_ENC_DELTA, EV_ENC_KEY, EV_GRID_KEY, EV_TILT, SYS_HOST, SYS_ID, SYS_PORT, SYS_PREFIX,
    SYS_SIZE,
};
use crate::protocol::message::{OscArg, OscMessage};

/// A `/sys/*` self-description or configuration echo from the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemReport {
    /// Grid dimensions.
    Size { x: i32, y: i32 },
    /// Device identity string.
    Id(String),
    /// The event destination port the device currently holds.
    Port(i32),
    /// The event address prefix the device currently applies.
    Prefix(String),
    /// The event destination host the device currently holds.
    Host(String),
}

/// A physical input event from the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceEvent {
    /// Grid button down (`state == 1`) or up (`state == 0`).
    Press { x: i32, y: i32, state: i32 },
    /// Accelerometer sample from one tilt sensor.
    Tilt { sensor: i32, x: i32, y: i32, z: i32 },
    /// Encoder rotation; `delta` is signed ticks.
    EncoderDelta { encoder: i32, delta: i32 },
    /// Encoder push down/up.
    EncoderPress { encoder: i32, state: i32 },
}

/// The result of classifying one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    System(SystemReport),
    Event(DeviceEvent),
    /// Recognized by nobody; ignored by the router.
    Unknown,
}

/// A recognized address carrying the wrong argument list.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MalformedMessage {
    #[error("{address} expects {expected} arguments, got {got}")]
    ArgCount {
        address: String,
        expected: usize,
        got: usize,
    },

    #[error("{address} argument {index} has the wrong kind")]
    ArgKind { address: String, index: usize },
}

/// Classifies `message` per the rules in the module docs.
///
/// # Errors
///
/// Returns [`MalformedMessage`] when the address is recognized but the
/// argument list does not have the exact expected count and kinds.
pub fn classify(message: &OscMessage) -> Result<Inbound, MalformedMessage> {
    let address = message.address();

    match address {
        SYS_SIZE => {
            require_args(message, 2)?;
            return Ok(Inbound::System(SystemReport::Size {
                x: int_at(message, 0)?,
                y: int_at(message, 1)?,
            }));
        }
        SYS_ID => {
            require_args(message, 1)?;
            return Ok(Inbound::System(SystemReport::Id(str_at(message, 0)?)));
        }
        SYS_PORT => {
            require_args(message, 1)?;
            return Ok(Inbound::System(SystemReport::Port(int_at(message, 0)?)));
        }
        SYS_PREFIX => {
            require_args(message, 1)?;
            return Ok(Inbound::System(SystemReport::Prefix(str_at(message, 0)?)));
        }
        SYS_HOST => {
            require_args(message, 1)?;
            return Ok(Inbound::System(SystemReport::Host(str_at(message, 0)?)));
        }
        _ => {}
    }

    if address.ends_with(EV_GRID_KEY) {
        require_args(message, 3)?;
        return Ok(Inbound::Event(DeviceEvent::Press {
            x: int_at(message, 0)?,
            y: int_at(message, 1)?,
            state: int_at(message, 2)?,
        }));
    }
    if address.ends_with(EV_ENC_DELTA) {
        require_args(message, 2)?;
        return Ok(Inbound::Event(DeviceEvent::EncoderDelta {
            encoder: int_at(message, 0)?,
            delta: int_at(message, 1)?,
        }));
    }
    if address.ends_with(EV_ENC_KEY) {
        require_args(message, 2)?;
        return Ok(Inbound::Event(DeviceEvent::EncoderPress {
            encoder: int_at(message, 0)?,
            state: int_at(message, 1)?,
        }));
    }
    if address.ends_with(EV_TILT) {
        require_args(message, 4)?;
        return Ok(Inbound::Event(DeviceEvent::Tilt {
            sensor: int_at(message, 0)?,
            x: int_at(message, 1)?,
            y: int_at(message, 2)?,
            z: int_at(message, 3)?,
        }));
    }

    Ok(Inbound::Unknown)
}

fn require_args(message: &OscMessage, expected: usize) -> Result<(), MalformedMessage> {
    let got = message.args().len();
    if got != expected {
        return Err(MalformedMessage::ArgCount {
            address: message.address().to_string(),
            expected,
            got,
        });
    }
    Ok(())
}

fn int_at(message: &OscMessage, index: usize) -> Result<i32, MalformedMessage> {
    message
        .int_arg(index)
        .ok_or_else(|| MalformedMessage::ArgKind {
            address: message.address().to_string(),
            index,
        })
}

fn str_at(message: &OscMessage, index: usize) -> Result<String, MalformedMessage> {
    match message.arg(index) {
        Some(OscArg::Str(s)) => Ok(s.clone()),
        _ => Err(MalformedMessage::ArgKind {
            address: message.address().to_string(),
            index,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(address: &str, values: &[i32]) -> OscMessage {
        OscMessage::with_args(address, values.iter().copied().map(OscArg::Int).collect()).unwrap()
    }

    fn string(address: &str, value: &str) -> OscMessage {
        OscMessage::with_args(address, vec![OscArg::Str(value.to_string())]).unwrap()
    }

    #[test]
    fn test_classify_size_report() {
        let result = classify(&ints("/sys/size", &[16, 8])).unwrap();

        assert_eq!(result, Inbound::System(SystemReport::Size { x: 16, y: 8 }));
    }

    #[test]
    fn test_classify_id_port_prefix_host_reports() {
        assert_eq!(
            classify(&string("/sys/id", "m0001754")).unwrap(),
            Inbound::System(SystemReport::Id("m0001754".to_string()))
        );
        assert_eq!(
            classify(&ints("/sys/port", &[8000])).unwrap(),
            Inbound::System(SystemReport::Port(8000))
        );
        assert_eq!(
            classify(&string("/sys/prefix", "/monome")).unwrap(),
            Inbound::System(SystemReport::Prefix("/monome".to_string()))
        );
        assert_eq!(
            classify(&string("/sys/host", "127.0.0.1")).unwrap(),
            Inbound::System(SystemReport::Host("127.0.0.1".to_string()))
        );
    }

    #[test]
    fn test_classify_grid_key_under_any_prefix() {
        let shallow = classify(&ints("/app/grid/key", &[3, 4, 1])).unwrap();
        let deep = classify(&ints("/very/deep/prefix/grid/key", &[0, 0, 0])).unwrap();

        assert_eq!(
            shallow,
            Inbound::Event(DeviceEvent::Press { x: 3, y: 4, state: 1 })
        );
        assert_eq!(
            deep,
            Inbound::Event(DeviceEvent::Press { x: 0, y: 0, state: 0 })
        );
    }

    #[test]
    fn test_classify_tilt_enc_delta_and_enc_key() {
        assert_eq!(
            classify(&ints("/monome/tilt", &[0, 12, -3, 255])).unwrap(),
            Inbound::Event(DeviceEvent::Tilt {
                sensor: 0,
                x: 12,
                y: -3,
                z: 255
            })
        );
        assert_eq!(
            classify(&ints("/monome/enc/delta", &[1, -2])).unwrap(),
            Inbound::Event(DeviceEvent::EncoderDelta {
                encoder: 1,
                delta: -2
            })
        );
        assert_eq!(
            classify(&ints("/monome/enc/key", &[2, 1])).unwrap(),
            Inbound::Event(DeviceEvent::EncoderPress {
                encoder: 2,
                state: 1
            })
        );
    }

    #[test]
    fn test_classify_unknown_address_is_not_an_error() {
        let result = classify(&ints("/sys/rotation", &[90])).unwrap();

        assert_eq!(result, Inbound::Unknown);
    }

    #[test]
    fn test_classify_rejects_wrong_argument_count() {
        // Grid key missing its state argument.
        let err = classify(&ints("/app/grid/key", &[3, 4])).unwrap_err();

        assert_eq!(
            err,
            MalformedMessage::ArgCount {
                address: "/app/grid/key".to_string(),
                expected: 3,
                got: 2
            }
        );
    }

    #[test]
    fn test_classify_rejects_extra_arguments() {
        let err = classify(&ints("/sys/port", &[8000, 1])).unwrap_err();

        assert!(matches!(err, MalformedMessage::ArgCount { .. }));
    }

    #[test]
    fn test_classify_rejects_wrong_argument_kind() {
        let msg = OscMessage::with_args(
            "/sys/size",
            vec![OscArg::Str("16".to_string()), OscArg::Int(8)],
        )
        .unwrap();

        let err = classify(&msg).unwrap_err();

        assert_eq!(
            err,
            MalformedMessage::ArgKind {
                address: "/sys/size".to_string(),
                index: 0
            }
        );
    }

    #[test]
    fn test_classify_rejects_int_where_string_expected() {
        let err = classify(&ints("/sys/prefix", &[7])).unwrap_err();

        assert_eq!(
            err,
            MalformedMessage::ArgKind {
                address: "/sys/prefix".to_string(),
                index: 0
            }
        );
    }

    #[test]
    fn test_sys_family_is_matched_exactly_not_by_suffix() {
        // A prefixed address that happens to contain /sys/size is not a report.
        let result = classify(&ints("/app/sys/size", &[16, 8])).unwrap();

        assert_eq!(result, Inbound::Unknown);
    }
}
