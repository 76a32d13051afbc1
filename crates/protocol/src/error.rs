//! Protocol error types

use crate::types::Width;
use thiserror::Error;

/// Errors decoding or encoding control values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Buffer shorter than the declared value width
    #[error("Buffer too small: needed {needed}, got {available}")]
    BufferTooSmall { needed: usize, available: usize },

    /// Value does not fit in the control's wire format
    #[error("Value {value} does not fit in a {width:?} field")]
    ValueOutOfRange { value: i64, width: Width },
}

/// Type alias for protocol results
pub type Result<T> = std::result::Result<T, ProtocolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProtocolError::BufferTooSmall {
            needed: 4,
            available: 2,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Buffer too small"));
        assert!(msg.contains("needed 4"));
    }

    #[test]
    fn test_value_out_of_range_display() {
        let err = ProtocolError::ValueOutOfRange {
            value: 300,
            width: Width::Byte,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("300"));
        assert!(msg.contains("Byte"));
    }
}
