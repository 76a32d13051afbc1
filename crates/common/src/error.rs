//! Shared error type

use protocol::UsbError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("USB error: {0}")]
    Usb(#[from] UsbError),

    /// Invalid log filter, or a subscriber was already installed
    #[error("Logging setup failed: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usb_error_conversion() {
        let err: Error = UsbError::Timeout.into();
        assert_eq!(err.to_string(), "USB error: transfer timed out");
    }

    #[test]
    fn test_logging_error_message() {
        let err = Error::Logging("Invalid log filter: bad".to_string());
        assert_eq!(err.to_string(), "Logging setup failed: Invalid log filter: bad");
    }
}
