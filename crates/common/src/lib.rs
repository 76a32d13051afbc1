//! Common utilities for uvc-control
//!
//! This crate provides functionality shared between the camera library and
//! the command-line front end: logging setup, error handling, and a scriptable
//! mock UVC device for exercising the control layer without hardware.

pub mod error;
pub mod logging;
pub mod test_utils;

pub use error::{Error, Result};
pub use logging::{parse_filter, setup_logging};
