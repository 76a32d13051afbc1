//! Control transfer seam
//!
//! The only contact point with a USB backend. Implementations execute one
//! synchronous control transfer on the default endpoint and report failures
//! as [`UsbError`].

use crate::request::ControlRequest;
use crate::types::UsbError;

/// Synchronous executor for UVC control requests
pub trait ControlTransport {
    /// Execute an IN request, filling `buf` and returning the number of bytes
    /// the device sent
    fn read_control(&mut self, request: &ControlRequest, buf: &mut [u8]) -> Result<usize, UsbError>;

    /// Execute an OUT request with `data` as the data phase, returning the
    /// number of bytes written
    fn write_control(&mut self, request: &ControlRequest, data: &[u8]) -> Result<usize, UsbError>;
}

impl<T: ControlTransport + ?Sized> ControlTransport for Box<T> {
    fn read_control(&mut self, request: &ControlRequest, buf: &mut [u8]) -> Result<usize, UsbError> {
        (**self).read_control(request, buf)
    }

    fn write_control(&mut self, request: &ControlRequest, data: &[u8]) -> Result<usize, UsbError> {
        (**self).write_control(request, data)
    }
}
