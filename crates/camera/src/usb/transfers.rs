//! Control transfers over rusb
//!
//! Wires [`UvcDevice`] into [`ControlTransport`]: each request becomes one
//! synchronous control transfer on the default endpoint.

use crate::usb::device::UvcDevice;
use protocol::{ControlRequest, ControlTransport, UsbError};
use rusb::UsbContext;
use tracing::trace;

impl<C: UsbContext> ControlTransport for UvcDevice<C> {
    fn read_control(
        &mut self,
        request: &ControlRequest,
        buf: &mut [u8],
    ) -> Result<usize, UsbError> {
        let handle = self.handle().map_err(map_rusb_error)?;
        let len = handle
            .read_control(
                request.request_type,
                request.request as u8,
                request.value,
                request.index,
                buf,
                self.timeout,
            )
            .map_err(map_rusb_error)?;

        trace!(
            "IN  bRequest={:#04x} wValue={:#06x} wIndex={:#06x}: {:02x?}",
            request.request as u8,
            request.value,
            request.index,
            &buf[..len]
        );
        Ok(len)
    }

    fn write_control(&mut self, request: &ControlRequest, data: &[u8]) -> Result<usize, UsbError> {
        trace!(
            "OUT bRequest={:#04x} wValue={:#06x} wIndex={:#06x}: {:02x?}",
            request.request as u8,
            request.value,
            request.index,
            data
        );

        let handle = self.handle().map_err(map_rusb_error)?;
        handle
            .write_control(
                request.request_type,
                request.request as u8,
                request.value,
                request.index,
                data,
                self.timeout,
            )
            .map_err(map_rusb_error)
    }
}

/// Map rusb error to protocol UsbError
pub fn map_rusb_error(err: rusb::Error) -> UsbError {
    match err {
        rusb::Error::Timeout => UsbError::Timeout,
        rusb::Error::Pipe => UsbError::Pipe,
        rusb::Error::NoDevice => UsbError::NoDevice,
        rusb::Error::NotFound => UsbError::NotFound,
        rusb::Error::Busy => UsbError::Busy,
        rusb::Error::Overflow => UsbError::Overflow,
        rusb::Error::Io => UsbError::Io,
        rusb::Error::InvalidParam => UsbError::InvalidParam,
        rusb::Error::Access => UsbError::Access,
        _ => UsbError::Other {
            message: err.to_string(),
        },
    }
}
