//! Test utilities for uvc-control
//!
//! Provides a scriptable in-memory UVC device that implements
//! [`ControlTransport`], so the control layer can be exercised without
//! hardware. Every request is recorded for call-count assertions.
//!
//! # Example
//!
//! ```
//! use common::test_utils::MockUvcDevice;
//! use protocol::{Control, ControlRequest, ControlTable, ControlTransport, RequestCode};
//!
//! let mut device = MockUvcDevice::webcam();
//! let gain = ControlTable::default().resolve(Control::Gain);
//! let request = ControlRequest::new(RequestCode::GetInfo, gain.unit, gain.selector, 0, 1);
//!
//! let mut buf = [0u8; 1];
//! device.read_control(&request, &mut buf).unwrap();
//! assert_eq!(buf[0] & 0x03, 0x03);
//! assert_eq!(device.count(RequestCode::GetInfo), 1);
//! ```

use protocol::{
    Control, ControlKey, ControlRef, ControlRequest, ControlTable, ControlTransport, RequestCode,
    Signedness, UsbError, Width, decode_value, encode_value,
};
use std::collections::HashMap;

/// GET_INFO value of a control supporting GET and SET
pub const INFO_GET_SET: u8 = 0x03;
/// GET_INFO value of a read-only control
pub const INFO_GET_ONLY: u8 = 0x01;

/// Scripted state of one control on a [`MockUvcDevice`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockControl {
    pub info: u8,
    pub min: i64,
    pub max: i64,
    pub res: i64,
    pub def: i64,
    pub cur: i64,
    pub width: Width,
    pub signedness: Signedness,
}

impl MockControl {
    /// A 2-byte unsigned read/write control starting at its default
    pub fn value(min: i64, max: i64, res: i64, def: i64) -> Self {
        Self {
            info: INFO_GET_SET,
            min,
            max,
            res,
            def,
            cur: def,
            width: Width::Word,
            signedness: Signedness::Unsigned,
        }
    }

    /// A 1-byte read/write toggle
    pub fn flag(def: i64) -> Self {
        Self {
            info: INFO_GET_SET,
            min: 0,
            max: 1,
            res: 1,
            def,
            cur: def,
            width: Width::Byte,
            signedness: Signedness::Unsigned,
        }
    }

    pub fn with_info(mut self, info: u8) -> Self {
        self.info = info;
        self
    }

    pub fn with_current(mut self, cur: i64) -> Self {
        self.cur = cur;
        self
    }

    pub fn with_format(mut self, width: Width, signedness: Signedness) -> Self {
        self.width = width;
        self.signedness = signedness;
        self
    }

    /// Match the wire format declared by a registry entry
    pub fn formatted_as(self, control_ref: &ControlRef) -> Self {
        self.with_format(control_ref.width, control_ref.signedness)
    }

    fn supports_get(&self) -> bool {
        self.info & 0x01 != 0
    }

    fn supports_set(&self) -> bool {
        self.info & 0x02 != 0
    }
}

/// In-memory UVC device answering control requests on one interface
#[derive(Debug, Default)]
pub struct MockUvcDevice {
    interface: u8,
    controls: HashMap<ControlKey, MockControl>,
    requests: Vec<ControlRequest>,
    failures: HashMap<RequestCode, UsbError>,
    short_responses: HashMap<RequestCode, usize>,
}

impl MockUvcDevice {
    /// An empty device; every request stalls until controls are added
    pub fn new(interface: u8) -> Self {
        Self {
            interface,
            ..Self::default()
        }
    }

    /// A device modelled on a typical USB webcam, with all nine managed
    /// controls at the default unit ids on interface 0
    pub fn webcam() -> Self {
        let table = ControlTable::default();
        let mut device = Self::new(0);

        for (control, control_ref) in table.iter() {
            let mock = match control {
                Control::AutoExposure => MockControl::flag(0x08).with_info(INFO_GET_SET),
                Control::Exposure => MockControl::value(3, 2047, 1, 250),
                Control::Brightness => MockControl::value(-64, 64, 1, 0),
                Control::Contrast => MockControl::value(0, 255, 1, 128),
                Control::Gain => MockControl::value(0, 255, 1, 0),
                Control::Saturation => MockControl::value(0, 255, 1, 128),
                Control::Sharpness => MockControl::value(0, 255, 1, 128),
                Control::WhiteBalance => MockControl::value(2000, 6500, 10, 4000),
                Control::AutoWhiteBalance => MockControl::flag(1),
            };
            device.insert(control_ref.key(), mock.formatted_as(&control_ref));
        }

        device
    }

    pub fn with_control(mut self, key: ControlKey, control: MockControl) -> Self {
        self.insert(key, control);
        self
    }

    pub fn insert(&mut self, key: ControlKey, control: MockControl) {
        self.controls.insert(key, control);
    }

    pub fn remove(&mut self, key: ControlKey) -> Option<MockControl> {
        self.controls.remove(&key)
    }

    pub fn control_mut(&mut self, key: ControlKey) -> Option<&mut MockControl> {
        self.controls.get_mut(&key)
    }

    /// Fail every request of this kind with `error` until cleared
    pub fn fail(&mut self, request: RequestCode, error: UsbError) {
        self.failures.insert(request, error);
    }

    pub fn clear_failure(&mut self, request: RequestCode) {
        self.failures.remove(&request);
    }

    /// Answer requests of this kind with only `len` bytes, or for `SET_CUR`
    /// report only `len` bytes written and drop the value
    pub fn respond_short(&mut self, request: RequestCode, len: usize) {
        self.short_responses.insert(request, len);
    }

    /// Current native value of a control
    pub fn current(&self, key: ControlKey) -> Option<i64> {
        self.controls.get(&key).map(|c| c.cur)
    }

    pub fn set_current(&mut self, key: ControlKey, value: i64) {
        if let Some(control) = self.controls.get_mut(&key) {
            control.cur = value;
        }
    }

    /// Every request received, in order
    pub fn requests(&self) -> &[ControlRequest] {
        &self.requests
    }

    /// Number of requests of one kind
    pub fn count(&self, request: RequestCode) -> usize {
        self.requests.iter().filter(|r| r.request == request).count()
    }

    /// Number of requests of one kind addressed to one control
    pub fn count_for(&self, key: ControlKey, request: RequestCode) -> usize {
        self.requests
            .iter()
            .filter(|r| r.request == request && r.unit() == key.unit && r.selector() == key.selector)
            .count()
    }

    pub fn total(&self) -> usize {
        self.requests.len()
    }

    pub fn clear_requests(&mut self) {
        self.requests.clear();
    }

    fn lookup(&self, request: &ControlRequest) -> Result<&MockControl, UsbError> {
        if request.interface() != self.interface {
            return Err(UsbError::InvalidParam);
        }
        let key = ControlKey {
            unit: request.unit(),
            selector: request.selector(),
        };
        self.controls.get(&key).ok_or(UsbError::Pipe)
    }

    fn response(&self, request: &ControlRequest) -> Result<Vec<u8>, UsbError> {
        let control = self.lookup(request)?;

        let value = match request.request {
            RequestCode::GetInfo => return Ok(vec![control.info]),
            RequestCode::GetLen => return Ok((control.width.len() as u16).to_le_bytes().to_vec()),
            RequestCode::GetCur if !control.supports_get() => return Err(UsbError::Pipe),
            RequestCode::GetCur => control.cur,
            RequestCode::GetMin => control.min,
            RequestCode::GetMax => control.max,
            RequestCode::GetRes => control.res,
            RequestCode::GetDef => control.def,
            RequestCode::SetCur => return Err(UsbError::InvalidParam),
        };

        encode_value(value, control.width, control.signedness).map_err(|e| UsbError::Other {
            message: e.to_string(),
        })
    }
}

impl ControlTransport for MockUvcDevice {
    fn read_control(&mut self, request: &ControlRequest, buf: &mut [u8]) -> Result<usize, UsbError> {
        self.requests.push(*request);
        if let Some(error) = self.failures.get(&request.request) {
            return Err(error.clone());
        }

        let mut data = self.response(request)?;
        if let Some(len) = self.short_responses.get(&request.request) {
            data.truncate(*len);
        }
        if data.len() > buf.len() {
            return Err(UsbError::Overflow);
        }

        buf[..data.len()].copy_from_slice(&data);
        Ok(data.len())
    }

    fn write_control(&mut self, request: &ControlRequest, data: &[u8]) -> Result<usize, UsbError> {
        self.requests.push(*request);
        if let Some(error) = self.failures.get(&request.request) {
            return Err(error.clone());
        }
        if request.request != RequestCode::SetCur {
            return Err(UsbError::InvalidParam);
        }
        if let Some(len) = self.short_responses.get(&request.request) {
            return Ok((*len).min(data.len()));
        }

        let control = self.lookup(request)?;
        if !control.supports_set() {
            return Err(UsbError::Pipe);
        }
        let value = decode_value(data, control.width, control.signedness).map_err(|e| {
            UsbError::Other {
                message: e.to_string(),
            }
        })?;

        let key = ControlKey {
            unit: request.unit(),
            selector: request.selector(),
        };
        self.set_current(key, value);
        Ok(data.len())
    }
}

/// Build the 8-byte setup packet a request is sent as
pub fn setup_packet(request: &ControlRequest) -> [u8; 8] {
    let value = request.value.to_le_bytes();
    let index = request.index.to_le_bytes();
    let length = request.length.to_le_bytes();
    [
        request.request_type,
        request.request as u8,
        value[0],
        value[1],
        index[0],
        index[1],
        length[0],
        length[1],
    ]
}

/// Class-specific VideoControl descriptors for a camera terminal and a
/// processing unit with the given ids
pub fn create_mock_video_control_extra(camera_terminal: u8, processing_unit: u8) -> Vec<u8> {
    vec![
        // VC interface header
        0x0d, 0x24, 0x01, 0x00, 0x01, 0x33, 0x00, 0x00, 0x6c, 0xdc, 0x02, 0x01, 0x01,
        // Camera input terminal (wTerminalType 0x0201)
        0x12, 0x24, 0x02, camera_terminal, 0x01, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x03, 0x2a, 0x02, 0x00,
        // Processing unit sourced from the camera terminal
        0x0b, 0x24, 0x05, processing_unit, camera_terminal, 0x00, 0x40, 0x02, 0x5b, 0x17, 0x00,
    ]
}
