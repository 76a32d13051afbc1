//! Protocol library for uvc-control
//!
//! This crate defines the USB Video Class control vocabulary: request codes and
//! setup headers, the static control registry, the little-endian value codec,
//! class-specific descriptor parsing, and the [`ControlTransport`] seam that a
//! USB backend implements. It performs no I/O.
//!
//! # Example
//!
//! ```
//! use protocol::{Control, ControlRequest, ControlTable, RequestCode};
//!
//! let table = ControlTable::default();
//! let brightness = table.resolve(Control::Brightness);
//!
//! let request = ControlRequest::new(
//!     RequestCode::GetCur,
//!     brightness.unit,
//!     brightness.selector,
//!     0,
//!     brightness.length(),
//! );
//! assert_eq!(request.request_type, 0xa1);
//! assert_eq!(request.value, 0x0200);
//! assert_eq!(request.index, 0x0200);
//! ```

pub mod codec;
pub mod descriptor;
pub mod error;
pub mod registry;
pub mod request;
pub mod transport;
pub mod types;

pub use codec::{decode_value, encode_value};
pub use descriptor::{DiscoveredUnits, VIDEO_CLASS, VIDEO_CONTROL_SUBCLASS, parse_units};
pub use error::{ProtocolError, Result};
pub use registry::{Control, ControlTable, UnitIds, UnknownControl};
pub use request::{ControlRequest, Direction, REQUEST_TYPE_GET, REQUEST_TYPE_SET, RequestCode};
pub use transport::ControlTransport;
pub use types::{
    Capabilities, ControlKey, ControlKind, ControlRef, FlagEncoding, Range, Signedness, UsbError,
    Width,
};
