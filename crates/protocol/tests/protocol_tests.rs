//! Integration tests for UVC request addressing and value formats
//!
//! Tests every registry entry against the request header it produces,
//! verifying unit/selector placement, lengths, and signed decoding.

use protocol::{
    Capabilities, Control, ControlKind, ControlRequest, ControlTable, Range, RequestCode,
    Signedness, UnitIds, Width, decode_value, encode_value,
};

mod request_addressing {
    use super::*;

    #[test]
    fn test_every_control_addresses_its_unit() {
        let table = ControlTable::default();

        for (control, control_ref) in table.iter() {
            let req = ControlRequest::new(
                RequestCode::GetCur,
                control_ref.unit,
                control_ref.selector,
                0,
                control_ref.length(),
            );
            assert_eq!(req.unit(), control_ref.unit, "{}", control);
            assert_eq!(req.selector(), control_ref.selector, "{}", control);
            assert_eq!(req.interface(), 0, "{}", control);
            assert_eq!(usize::from(req.length), control_ref.width.len(), "{}", control);
        }
    }

    #[test]
    fn test_exposure_set_header() {
        let table = ControlTable::default();
        let exposure = table.resolve(Control::Exposure);
        let req = ControlRequest::new(
            RequestCode::SetCur,
            exposure.unit,
            exposure.selector,
            0,
            exposure.length(),
        );

        assert_eq!(req.request_type, 0x21);
        assert_eq!(req.request as u8, 0x01);
        assert_eq!(req.value, 0x0400);
        assert_eq!(req.index, 0x0100);
        assert_eq!(req.length, 4);
    }

    #[test]
    fn test_white_balance_on_nonzero_interface() {
        let table = ControlTable::new(UnitIds {
            camera_terminal: 1,
            processing_unit: 3,
        });
        let wb = table.resolve(Control::WhiteBalance);
        let req = ControlRequest::new(RequestCode::GetMax, wb.unit, wb.selector, 2, wb.length());

        assert_eq!(req.request_type, 0xa1);
        assert_eq!(req.value, 0x0a00);
        assert_eq!(req.index, 0x0302);
    }
}

mod value_formats {
    use super::*;

    #[test]
    fn test_control_widths() {
        let table = ControlTable::default();
        assert_eq!(table.resolve(Control::Exposure).width, Width::DoubleWord);
        assert_eq!(table.resolve(Control::AutoExposure).width, Width::Byte);
        assert_eq!(table.resolve(Control::AutoWhiteBalance).width, Width::Byte);
        for control in [
            Control::Brightness,
            Control::Contrast,
            Control::Gain,
            Control::Saturation,
            Control::Sharpness,
            Control::WhiteBalance,
        ] {
            assert_eq!(table.resolve(control).width, Width::Word, "{}", control);
        }
    }

    #[test]
    fn test_only_brightness_is_signed() {
        let table = ControlTable::default();
        for (control, control_ref) in table.iter() {
            let expected = if control == Control::Brightness {
                Signedness::Signed
            } else {
                Signedness::Unsigned
            };
            assert_eq!(control_ref.signedness, expected, "{}", control);
        }
    }

    #[test]
    fn test_brightness_range_decodes_negative_minimum() {
        let table = ControlTable::default();
        let brightness = table.resolve(Control::Brightness);

        let min = decode_value(&[0xc0, 0xff], brightness.width, brightness.signedness).unwrap();
        let max = decode_value(&[0x40, 0x00], brightness.width, brightness.signedness).unwrap();
        let range = Range::new(min, max, 1);

        assert_eq!(range.min, -64);
        assert_eq!(range.max, 64);
        assert_eq!(range.span(), 128);
    }

    #[test]
    fn test_exposure_encodes_little_endian() {
        let table = ControlTable::default();
        let exposure = table.resolve(Control::Exposure);
        let bytes = encode_value(0x0001_0203, exposure.width, exposure.signedness).unwrap();
        assert_eq!(bytes, vec![0x03, 0x02, 0x01, 0x00]);
    }

    #[test]
    fn test_flag_controls_skip_range_mapping() {
        let table = ControlTable::default();
        let flags: Vec<_> = table
            .iter()
            .filter(|(_, r)| matches!(r.kind, ControlKind::Flag(_)))
            .map(|(c, _)| c)
            .collect();
        assert_eq!(flags, vec![Control::AutoExposure, Control::AutoWhiteBalance]);
    }
}

mod serialization {
    use super::*;

    #[test]
    fn test_capabilities_json() {
        let caps = Capabilities::from_info(0x03);
        let json = serde_json::to_string(&caps).unwrap();
        assert!(json.contains("\"supports_get\":true"));
        assert!(json.contains("\"supports_set\":true"));
        assert!(json.contains("\"asynchronous\":false"));
    }

    #[test]
    fn test_control_json_is_kebab_case() {
        let json = serde_json::to_string(&Control::AutoWhiteBalance).unwrap();
        assert_eq!(json, "\"auto-white-balance\"");
        let parsed: Control = serde_json::from_str("\"white-balance\"").unwrap();
        assert_eq!(parsed, Control::WhiteBalance);
    }
}
