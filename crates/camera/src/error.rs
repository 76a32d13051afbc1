//! Camera control error types

use crate::usb::DeviceSelector;
use protocol::{Control, ProtocolError, RequestCode, UsbError};
use std::fmt;
use thiserror::Error;

/// Operation a control was asked to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Get,
    Set,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Get => f.write_str("get"),
            Operation::Set => f.write_str("set"),
        }
    }
}

/// External value kind a control expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Normalized,
    Flag,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Normalized => f.write_str("normalized value"),
            ValueKind::Flag => f.write_str("on/off flag"),
        }
    }
}

/// Errors from opening a camera or operating its controls
#[derive(Debug, Error)]
pub enum CameraError {
    /// No attached device matches the selector and exposes a video control
    /// interface
    #[error("No UVC device found matching {0}")]
    DeviceNotFound(DeviceSelector),

    /// The OS refused access to the device
    #[error("Permission denied opening USB device")]
    PermissionDenied,

    /// The device has no video control interface (class 14, subclass 1)
    #[error("Device has no UVC video control interface")]
    InterfaceMismatch,

    /// The video control interface is held by another driver or process
    #[error("Video control interface {interface} is busy")]
    InterfaceBusy { interface: u8 },

    /// The control lacks the capability; detected before any transfer
    #[error("{control} does not support {operation}")]
    Unsupported {
        control: Control,
        operation: Operation,
    },

    /// The control transfer failed or timed out
    #[error("{request} failed for {control}: {error}")]
    TransferFailed {
        control: Control,
        request: RequestCode,
        error: UsbError,
    },

    /// A value of the wrong kind was passed or requested for this control
    #[error("{control} takes a {expected}")]
    ValueKind {
        control: Control,
        expected: ValueKind,
    },

    /// A raw value cannot be encoded in the control's wire format
    #[error("Cannot encode value for {control}: {source}")]
    Encode {
        control: Control,
        #[source]
        source: ProtocolError,
    },

    /// Device enumeration or open failed at the USB layer
    #[error("USB enumeration failed: {0}")]
    Enumeration(UsbError),
}

impl CameraError {
    /// True for a failure reported by the device or transport, as opposed to
    /// one detected locally
    pub fn is_transfer_failure(&self) -> bool {
        matches!(self, CameraError::TransferFailed { .. })
    }
}

pub type Result<T> = std::result::Result<T, CameraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_display() {
        let err = CameraError::Unsupported {
            control: Control::WhiteBalance,
            operation: Operation::Set,
        };
        assert_eq!(err.to_string(), "white-balance does not support set");
    }

    #[test]
    fn test_transfer_failed_display() {
        let err = CameraError::TransferFailed {
            control: Control::Exposure,
            request: RequestCode::GetMax,
            error: UsbError::Timeout,
        };
        assert_eq!(
            err.to_string(),
            "GET_MAX failed for exposure: transfer timed out"
        );
        assert!(err.is_transfer_failure());
    }

    #[test]
    fn test_device_not_found_display() {
        let err = CameraError::DeviceNotFound(DeviceSelector::Ids {
            vendor_id: 0x05ac,
            product_id: 0x1111,
        });
        assert_eq!(err.to_string(), "No UVC device found matching 05ac:1111");
        assert!(!err.is_transfer_failure());
    }
}
