//! UVC control type definitions
//!
//! This module defines the static address of a control, the data a device
//! reports about it (capabilities and numeric range), and the transport-level
//! error conditions a control transfer can end in.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Cache key for one control on one device
///
/// Two controls never share a `(unit, selector)` pair, so this is the identity
/// used for memoizing per-control discovery data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControlKey {
    /// Entity id of the owning terminal or unit
    pub unit: u8,
    /// Control selector within the unit
    pub selector: u8,
}

/// Byte width of a control's value on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Width {
    /// 1 byte
    Byte,
    /// 2 bytes, little-endian
    Word,
    /// 4 bytes, little-endian
    DoubleWord,
}

impl Width {
    /// Number of bytes transferred for a value of this width
    pub const fn len(self) -> usize {
        match self {
            Width::Byte => 1,
            Width::Word => 2,
            Width::DoubleWord => 4,
        }
    }
}

/// Whether a control's wire value is two's-complement signed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signedness {
    Unsigned,
    Signed,
}

/// How a boolean control maps onto its native value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlagEncoding {
    /// 0 = off, anything else = on
    Boolean,
    /// Auto-exposure mode bitmap (manual 0x01, auto 0x02, shutter priority
    /// 0x04, aperture priority 0x08)
    AutoExposureMode,
}

impl FlagEncoding {
    const AE_MANUAL: i64 = 0x01;
    const AE_AUTO: i64 = 0x02;
    const AE_APERTURE_PRIORITY: i64 = 0x08;

    /// Native value written for the given flag state
    pub fn encode(self, enabled: bool) -> i64 {
        match (self, enabled) {
            (FlagEncoding::Boolean, true) => 1,
            (FlagEncoding::Boolean, false) => 0,
            (FlagEncoding::AutoExposureMode, true) => Self::AE_APERTURE_PRIORITY,
            (FlagEncoding::AutoExposureMode, false) => Self::AE_MANUAL,
        }
    }

    /// Flag state for a native value read from the device
    pub fn decode(self, raw: i64) -> bool {
        match self {
            FlagEncoding::Boolean => raw != 0,
            FlagEncoding::AutoExposureMode => {
                raw & (Self::AE_AUTO | Self::AE_APERTURE_PRIORITY) != 0
            }
        }
    }
}

/// What kind of external value a control exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlKind {
    /// Numeric control mapped to a normalized float in `[0.0, 1.0]`
    Value,
    /// On/off toggle that bypasses range mapping
    Flag(FlagEncoding),
}

/// Static address and wire format of one control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlRef {
    /// Entity id of the owning terminal or unit
    pub unit: u8,
    /// Control selector within the unit
    pub selector: u8,
    /// Wire width of the control's value
    pub width: Width,
    /// Signedness of the control's value
    pub signedness: Signedness,
    /// External value kind
    pub kind: ControlKind,
}

impl ControlRef {
    pub fn key(&self) -> ControlKey {
        ControlKey {
            unit: self.unit,
            selector: self.selector,
        }
    }

    /// Wire length as sent in `wLength`
    pub fn length(&self) -> u16 {
        self.width.len() as u16
    }
}

/// Device-reported bounds of a numeric control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub min: i64,
    pub max: i64,
    /// Step size between adjacent settable values
    pub res: i64,
}

impl Range {
    pub fn new(min: i64, max: i64, res: i64) -> Self {
        Self { min, max, res }
    }

    /// A range with no room to map into (`max <= min`)
    pub fn is_degenerate(&self) -> bool {
        self.max <= self.min
    }

    /// Step size, never less than one
    ///
    /// Devices occasionally report a resolution of zero for controls they
    /// treat as continuous.
    pub fn step(&self) -> i64 {
        self.res.max(1)
    }

    /// Distance between the bounds
    pub fn span(&self) -> i64 {
        self.max - self.min
    }
}

/// Operations a control supports, decoded from a `GET_INFO` response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Capabilities {
    pub supports_get: bool,
    pub supports_set: bool,
    /// Control is currently locked out by an automatic mode
    pub disabled_by_auto: bool,
    pub supports_autoupdate: bool,
    pub asynchronous: bool,
}

impl Capabilities {
    const GET: u8 = 1 << 0;
    const SET: u8 = 1 << 1;
    const DISABLED: u8 = 1 << 2;
    const AUTOUPDATE: u8 = 1 << 3;
    const ASYNC: u8 = 1 << 4;

    /// Decode the `GET_INFO` bitmap
    pub fn from_info(info: u8) -> Self {
        Self {
            supports_get: info & Self::GET != 0,
            supports_set: info & Self::SET != 0,
            disabled_by_auto: info & Self::DISABLED != 0,
            supports_autoupdate: info & Self::AUTOUPDATE != 0,
            asynchronous: info & Self::ASYNC != 0,
        }
    }

    /// Re-encode as a `GET_INFO` bitmap
    pub fn to_info(self) -> u8 {
        let mut info = 0;
        if self.supports_get {
            info |= Self::GET;
        }
        if self.supports_set {
            info |= Self::SET;
        }
        if self.disabled_by_auto {
            info |= Self::DISABLED;
        }
        if self.supports_autoupdate {
            info |= Self::AUTOUPDATE;
        }
        if self.asynchronous {
            info |= Self::ASYNC;
        }
        info
    }
}

/// USB error codes
///
/// Maps libusb errors to a transport-independent form so the control layer
/// never depends on a particular USB backend.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum UsbError {
    /// Transfer timed out
    #[error("transfer timed out")]
    Timeout,
    /// Control request stalled (device rejected the request)
    #[error("request stalled")]
    Pipe,
    /// Device was disconnected
    #[error("device disconnected")]
    NoDevice,
    /// Device or entity not found
    #[error("not found")]
    NotFound,
    /// Device or interface is busy
    #[error("resource busy")]
    Busy,
    /// Device returned more data than requested
    #[error("buffer overflow")]
    Overflow,
    /// I/O error
    #[error("I/O error")]
    Io,
    /// Invalid parameter
    #[error("invalid parameter")]
    InvalidParam,
    /// Access denied (permissions)
    #[error("access denied")]
    Access,
    /// Device returned fewer bytes than the control's width
    #[error("short transfer: expected {expected} bytes, got {actual}")]
    ShortTransfer { expected: usize, actual: usize },
    /// Other error with message
    #[error("{message}")]
    Other { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_from_info() {
        let caps = Capabilities::from_info(0x03);
        assert!(caps.supports_get);
        assert!(caps.supports_set);
        assert!(!caps.disabled_by_auto);
        assert!(!caps.supports_autoupdate);
        assert!(!caps.asynchronous);

        let caps = Capabilities::from_info(0x1d);
        assert!(caps.supports_get);
        assert!(!caps.supports_set);
        assert!(caps.disabled_by_auto);
        assert!(caps.supports_autoupdate);
        assert!(caps.asynchronous);
    }

    #[test]
    fn test_capabilities_ignore_reserved_bits() {
        assert_eq!(Capabilities::from_info(0xe1), Capabilities::from_info(0x01));
        assert_eq!(Capabilities::from_info(0xe1).to_info(), 0x01);
    }

    #[test]
    fn test_auto_exposure_encoding() {
        let enc = FlagEncoding::AutoExposureMode;
        assert_eq!(enc.encode(true), 0x08);
        assert_eq!(enc.encode(false), 0x01);
        assert!(enc.decode(0x08));
        assert!(enc.decode(0x02));
        assert!(!enc.decode(0x01));
        assert!(!enc.decode(0x04));
    }

    #[test]
    fn test_boolean_encoding() {
        let enc = FlagEncoding::Boolean;
        assert_eq!(enc.encode(true), 1);
        assert_eq!(enc.encode(false), 0);
        assert!(enc.decode(1));
        assert!(enc.decode(0xff));
        assert!(!enc.decode(0));
    }

    #[test]
    fn test_range_step_never_zero() {
        assert_eq!(Range::new(0, 10, 0).step(), 1);
        assert_eq!(Range::new(0, 10, -3).step(), 1);
        assert_eq!(Range::new(0, 10, 2).step(), 2);
    }

    #[test]
    fn test_range_degenerate() {
        assert!(Range::new(5, 5, 1).is_degenerate());
        assert!(Range::new(6, 5, 1).is_degenerate());
        assert!(!Range::new(-64, 64, 1).is_degenerate());
    }

    #[test]
    fn test_usb_error_display() {
        let err = UsbError::ShortTransfer {
            expected: 2,
            actual: 1,
        };
        assert_eq!(err.to_string(), "short transfer: expected 2 bytes, got 1");
        assert_eq!(UsbError::Timeout.to_string(), "transfer timed out");
    }
}
