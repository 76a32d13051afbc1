//! Control request execution
//!
//! Turns "request X of control Y" into exactly one control transfer on the
//! video control interface and decodes the reply. No retries: a failed
//! transfer is returned to the caller as-is.

use crate::error::{CameraError, Result};
use protocol::{
    Capabilities, Control, ControlRef, ControlRequest, ControlTransport, RequestCode, Signedness,
    UsbError, Width, decode_value, encode_value,
};
use tracing::{debug, warn};

/// A [`ControlTransport`] bound to one video control interface number
#[derive(Debug)]
pub struct ControlInterface<T> {
    transport: T,
    number: u8,
}

impl<T: ControlTransport> ControlInterface<T> {
    pub fn new(transport: T, number: u8) -> Self {
        Self { transport, number }
    }

    /// Interface number placed in the low byte of wIndex
    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Issue `GET_INFO` and decode the capability bitmap
    pub fn info(&mut self, control: Control, control_ref: &ControlRef) -> Result<Capabilities> {
        let raw = self.read(
            control,
            control_ref,
            RequestCode::GetInfo,
            Width::Byte,
            Signedness::Unsigned,
        )?;
        Ok(Capabilities::from_info(raw as u8))
    }

    /// Issue a value-returning GET request (`GET_CUR`, `GET_MIN`, ...)
    pub fn get(
        &mut self,
        control: Control,
        control_ref: &ControlRef,
        request: RequestCode,
    ) -> Result<i64> {
        self.read(
            control,
            control_ref,
            request,
            control_ref.width,
            control_ref.signedness,
        )
    }

    /// Issue `SET_CUR` with a native value
    ///
    /// The value is encoded before the transfer; one that does not fit the
    /// control's width never reaches the device.
    pub fn set_cur(&mut self, control: Control, control_ref: &ControlRef, value: i64) -> Result<()> {
        let data = encode_value(value, control_ref.width, control_ref.signedness)
            .map_err(|source| CameraError::Encode { control, source })?;
        let request = self.request(RequestCode::SetCur, control_ref, control_ref.width);

        debug!(
            "{} {}: value={}, wValue={:#06x}, wIndex={:#06x}",
            request.request, control, value, request.value, request.index
        );

        let len = self
            .transport
            .write_control(&request, &data)
            .map_err(|error| transfer_failed(control, RequestCode::SetCur, error))?;

        if len != data.len() {
            return Err(transfer_failed(
                control,
                RequestCode::SetCur,
                UsbError::ShortTransfer {
                    expected: data.len(),
                    actual: len,
                },
            ));
        }
        Ok(())
    }

    fn read(
        &mut self,
        control: Control,
        control_ref: &ControlRef,
        code: RequestCode,
        width: Width,
        signedness: Signedness,
    ) -> Result<i64> {
        let request = self.request(code, control_ref, width);
        let mut buf = [0u8; 4];
        let buf = &mut buf[..width.len()];

        let len = self
            .transport
            .read_control(&request, buf)
            .map_err(|error| transfer_failed(control, code, error))?;

        if len < width.len() {
            return Err(transfer_failed(
                control,
                code,
                UsbError::ShortTransfer {
                    expected: width.len(),
                    actual: len,
                },
            ));
        }

        let value = decode_value(buf, width, signedness).map_err(|e| {
            transfer_failed(
                control,
                code,
                UsbError::Other {
                    message: e.to_string(),
                },
            )
        })?;

        debug!(
            "{} {}: wValue={:#06x}, wIndex={:#06x} -> {}",
            code, control, request.value, request.index, value
        );
        Ok(value)
    }

    fn request(&self, code: RequestCode, control_ref: &ControlRef, width: Width) -> ControlRequest {
        ControlRequest::new(
            code,
            control_ref.unit,
            control_ref.selector,
            self.number,
            width.len() as u16,
        )
    }
}

fn transfer_failed(control: Control, request: RequestCode, error: UsbError) -> CameraError {
    warn!("{} failed for {}: {}", request, control, error);
    CameraError::TransferFailed {
        control,
        request,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::test_utils::MockUvcDevice;
    use protocol::ControlTable;

    fn interface() -> ControlInterface<MockUvcDevice> {
        ControlInterface::new(MockUvcDevice::webcam(), 0)
    }

    #[test]
    fn test_info_is_one_byte() {
        let mut iface = interface();
        let r = ControlTable::default().resolve(Control::Exposure);
        let caps = iface.info(Control::Exposure, &r).unwrap();

        assert!(caps.supports_get && caps.supports_set);
        let sent = iface.transport().requests()[0];
        assert_eq!(sent.request, RequestCode::GetInfo);
        assert_eq!(sent.length, 1);
    }

    #[test]
    fn test_get_uses_control_width() {
        let mut iface = interface();
        let r = ControlTable::default().resolve(Control::Exposure);
        assert_eq!(iface.get(Control::Exposure, &r, RequestCode::GetMax).unwrap(), 2047);
        assert_eq!(iface.transport().requests()[0].length, 4);
    }

    #[test]
    fn test_get_sign_extends_brightness() {
        let mut iface = interface();
        let r = ControlTable::default().resolve(Control::Brightness);
        assert_eq!(iface.get(Control::Brightness, &r, RequestCode::GetMin).unwrap(), -64);
    }

    #[test]
    fn test_short_read_is_transfer_failure() {
        let mut iface = interface();
        iface.transport_mut().respond_short(RequestCode::GetCur, 1);
        let r = ControlTable::default().resolve(Control::Gain);

        let err = iface.get(Control::Gain, &r, RequestCode::GetCur).unwrap_err();
        assert!(matches!(
            err,
            CameraError::TransferFailed {
                error: UsbError::ShortTransfer {
                    expected: 2,
                    actual: 1
                },
                ..
            }
        ));
    }

    #[test]
    fn test_set_cur_writes_little_endian() {
        let mut iface = interface();
        let r = ControlTable::default().resolve(Control::WhiteBalance);
        iface.set_cur(Control::WhiteBalance, &r, 5000).unwrap();
        assert_eq!(iface.transport().current(r.key()), Some(5000));
    }

    #[test]
    fn test_short_write_is_transfer_failure() {
        let mut iface = interface();
        iface.transport_mut().respond_short(RequestCode::SetCur, 0);
        let r = ControlTable::default().resolve(Control::Gain);

        let err = iface.set_cur(Control::Gain, &r, 40).unwrap_err();
        assert!(matches!(
            err,
            CameraError::TransferFailed {
                request: RequestCode::SetCur,
                error: UsbError::ShortTransfer {
                    expected: 2,
                    actual: 0
                },
                ..
            }
        ));
        assert_ne!(iface.transport().current(r.key()), Some(40));
    }

    #[test]
    fn test_set_cur_rejects_unencodable_without_transfer() {
        let mut iface = interface();
        let r = ControlTable::default().resolve(Control::Gain);
        let err = iface.set_cur(Control::Gain, &r, 70_000).unwrap_err();

        assert!(matches!(err, CameraError::Encode { .. }));
        assert_eq!(iface.transport().total(), 0);
    }

    #[test]
    fn test_transport_error_surfaces_immediately() {
        let mut iface = interface();
        iface.transport_mut().fail(RequestCode::GetCur, UsbError::Timeout);
        let r = ControlTable::default().resolve(Control::Gain);

        let err = iface.get(Control::Gain, &r, RequestCode::GetCur).unwrap_err();
        assert!(matches!(
            err,
            CameraError::TransferFailed {
                request: RequestCode::GetCur,
                error: UsbError::Timeout,
                ..
            }
        ));
        assert_eq!(iface.transport().count(RequestCode::GetCur), 1);
    }
}
