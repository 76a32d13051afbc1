//! UVC camera controls
//!
//! Opens a USB Video Class camera's video control interface and exposes
//! exposure, gain, brightness, contrast, saturation, sharpness, white balance
//! and the two auto modes. Numeric controls read and write as floats in
//! `[0.0, 1.0]` mapped onto the range the device reports; capabilities and
//! ranges are queried once and cached for the life of the handle.
//!
//! ```no_run
//! use camera::CameraControl;
//!
//! # fn main() -> camera::Result<()> {
//! let mut cam = CameraControl::open_by_ids(0x046d, 0x0825)?;
//! if cam.can_set_auto_exposure() {
//!     cam.set_auto_exposure(false)?;
//! }
//! cam.set_exposure(0.25)?;
//! println!("gain = {:.2}", cam.gain()?);
//! # Ok(())
//! # }
//! ```
//!
//! Any [`ControlTransport`] can stand in for the USB device, which is how
//! the tests drive the facade.

pub mod cache;
pub mod control;
pub mod error;
pub mod interface;
pub mod mapper;
pub mod usb;

pub use control::{CameraControl, ControlValue, UsbCamera};
pub use error::{CameraError, Operation, Result, ValueKind};
pub use mapper::{to_native, to_normalized};
pub use protocol::{Capabilities, Control, ControlTable, ControlTransport, Range, UnitIds};
pub use usb::{DeviceSelector, OpenOptions, UvcDevice, UvcDeviceInfo, list_cameras, list_devices};
