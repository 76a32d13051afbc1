//! Integration tests for configuration file layout
//!
//! Checks that documented uvc-ctl configuration files parse as TOML with the
//! expected sections and value types.

mod config_layout {
    const MINIMAL_CONFIG: &str = r#"
[general]
log_level = "warn"
"#;

    const FULL_CONFIG: &str = r#"
[general]
log_level = "debug"

[device]
vendor_id = "0x046d"
product_id = "0x0825"
location_id = "0x14100000"

[usb]
timeout_ms = 1000
detach_kernel_driver = true
camera_terminal_id = 1
processing_unit_id = 3
"#;

    fn hex(value: &toml::Value) -> u32 {
        let s = value.as_str().unwrap();
        u32::from_str_radix(s.trim_start_matches("0x"), 16).unwrap()
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: toml::Value = toml::from_str(MINIMAL_CONFIG).unwrap();

        let general = config.get("general").unwrap();
        assert_eq!(general.get("log_level").unwrap().as_str().unwrap(), "warn");
        assert!(config.get("device").is_none());
        assert!(config.get("usb").is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let config: toml::Value = toml::from_str(FULL_CONFIG).unwrap();

        let device = config.get("device").unwrap();
        assert_eq!(hex(device.get("vendor_id").unwrap()), 0x046d);
        assert_eq!(hex(device.get("product_id").unwrap()), 0x0825);
        assert_eq!(hex(device.get("location_id").unwrap()), 0x1410_0000);

        let usb = config.get("usb").unwrap();
        assert_eq!(usb.get("timeout_ms").unwrap().as_integer().unwrap(), 1000);
        assert!(usb.get("detach_kernel_driver").unwrap().as_bool().unwrap());
        assert_eq!(usb.get("camera_terminal_id").unwrap().as_integer().unwrap(), 1);
        assert_eq!(usb.get("processing_unit_id").unwrap().as_integer().unwrap(), 3);
    }

    #[test]
    fn test_ids_are_strings_not_integers() {
        let config: toml::Value = toml::from_str(FULL_CONFIG).unwrap();
        let device = config.get("device").unwrap();
        assert!(device.get("vendor_id").unwrap().is_str());
        assert!(device.get("vendor_id").unwrap().as_integer().is_none());
    }

    #[test]
    fn test_unit_ids_fit_in_a_byte() {
        let config: toml::Value = toml::from_str(FULL_CONFIG).unwrap();
        let usb = config.get("usb").unwrap();
        for key in ["camera_terminal_id", "processing_unit_id"] {
            let id = usb.get(key).unwrap().as_integer().unwrap();
            assert!(u8::try_from(id).is_ok(), "{} = {}", key, id);
        }
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let result: Result<toml::Value, _> = toml::from_str("[device\nvendor_id = 0x");
        assert!(result.is_err());
    }
}
