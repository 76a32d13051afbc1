//! USB backend
//!
//! Locates cameras with rusb, claims the video control interface and carries
//! control requests over the default endpoint.

pub mod device;
pub mod discovery;
pub mod transfers;

pub use device::{DEFAULT_TIMEOUT, OpenOptions, UvcDevice};
pub use discovery::{
    Candidate, ControlInterfaceDesc, DeviceSelector, UvcDeviceInfo, control_interface,
    find_device, list_cameras, list_devices, location_id, pick,
};
pub use transfers::map_rusb_error;
