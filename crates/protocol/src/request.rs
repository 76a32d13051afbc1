//! UVC class-specific control requests
//!
//! Builds the 8-byte setup header for a request addressed to one control of
//! one entity on the VideoControl interface.

use serde::{Deserialize, Serialize};
use std::fmt;

/// bmRequestType for SET requests: host-to-device, class, interface recipient
pub const REQUEST_TYPE_SET: u8 = 0x21;
/// bmRequestType for GET requests: device-to-host, class, interface recipient
pub const REQUEST_TYPE_GET: u8 = 0xa1;

/// UVC request codes (bRequest)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum RequestCode {
    SetCur = 0x01,
    GetCur = 0x81,
    GetMin = 0x82,
    GetMax = 0x83,
    GetRes = 0x84,
    GetLen = 0x85,
    GetInfo = 0x86,
    GetDef = 0x87,
}

impl RequestCode {
    pub const ALL: [RequestCode; 8] = [
        RequestCode::SetCur,
        RequestCode::GetCur,
        RequestCode::GetMin,
        RequestCode::GetMax,
        RequestCode::GetRes,
        RequestCode::GetLen,
        RequestCode::GetInfo,
        RequestCode::GetDef,
    ];

    pub fn from_u8(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|r| *r as u8 == code)
    }

    /// GET requests have bit 7 set
    pub fn is_get(self) -> bool {
        (self as u8) & 0x80 != 0
    }

    pub fn direction(self) -> Direction {
        if self.is_get() {
            Direction::In
        } else {
            Direction::Out
        }
    }
}

impl fmt::Display for RequestCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestCode::SetCur => "SET_CUR",
            RequestCode::GetCur => "GET_CUR",
            RequestCode::GetMin => "GET_MIN",
            RequestCode::GetMax => "GET_MAX",
            RequestCode::GetRes => "GET_RES",
            RequestCode::GetLen => "GET_LEN",
            RequestCode::GetInfo => "GET_INFO",
            RequestCode::GetDef => "GET_DEF",
        };
        f.write_str(name)
    }
}

/// Data phase direction of a control request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Device to host
    In,
    /// Host to device
    Out,
}

/// Setup header of one UVC control request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlRequest {
    /// Request type byte (bmRequestType)
    pub request_type: u8,
    /// Request code (bRequest)
    pub request: RequestCode,
    /// Control selector in the high byte (wValue)
    pub value: u16,
    /// Entity id in the high byte, interface number in the low byte (wIndex)
    pub index: u16,
    /// Data phase length (wLength)
    pub length: u16,
}

impl ControlRequest {
    pub fn new(request: RequestCode, unit: u8, selector: u8, interface: u8, length: u16) -> Self {
        let request_type = if request.is_get() {
            REQUEST_TYPE_GET
        } else {
            REQUEST_TYPE_SET
        };

        Self {
            request_type,
            request,
            value: u16::from(selector) << 8,
            index: (u16::from(unit) << 8) | u16::from(interface),
            length,
        }
    }

    pub fn direction(&self) -> Direction {
        self.request.direction()
    }

    pub fn selector(&self) -> u8 {
        (self.value >> 8) as u8
    }

    pub fn unit(&self) -> u8 {
        (self.index >> 8) as u8
    }

    pub fn interface(&self) -> u8 {
        (self.index & 0xff) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_code_direction() {
        assert_eq!(RequestCode::SetCur.direction(), Direction::Out);
        for code in RequestCode::ALL.into_iter().filter(|c| *c != RequestCode::SetCur) {
            assert_eq!(code.direction(), Direction::In, "{}", code);
        }
    }

    #[test]
    fn test_request_code_from_u8() {
        assert_eq!(RequestCode::from_u8(0x86), Some(RequestCode::GetInfo));
        assert_eq!(RequestCode::from_u8(0x01), Some(RequestCode::SetCur));
        assert_eq!(RequestCode::from_u8(0x88), None);
    }

    #[test]
    fn test_get_request_header() {
        // GET_CUR of processing unit 2, brightness (0x02), interface 0
        let req = ControlRequest::new(RequestCode::GetCur, 2, 0x02, 0, 2);
        assert_eq!(req.request_type, 0xa1);
        assert_eq!(req.request as u8, 0x81);
        assert_eq!(req.value, 0x0200);
        assert_eq!(req.index, 0x0200);
        assert_eq!(req.length, 2);
    }

    #[test]
    fn test_set_request_header() {
        // SET_CUR of camera terminal 1, exposure time absolute (0x04), interface 3
        let req = ControlRequest::new(RequestCode::SetCur, 1, 0x04, 3, 4);
        assert_eq!(req.request_type, 0x21);
        assert_eq!(req.value, 0x0400);
        assert_eq!(req.index, 0x0103);
        assert_eq!(req.unit(), 1);
        assert_eq!(req.selector(), 0x04);
        assert_eq!(req.interface(), 3);
    }

    #[test]
    fn test_request_code_display() {
        assert_eq!(RequestCode::GetInfo.to_string(), "GET_INFO");
        assert_eq!(RequestCode::SetCur.to_string(), "SET_CUR");
    }
}
