//! Control registry
//!
//! Maps each semantic camera control to the terminal/unit, selector and wire
//! format fixed by the USB Video Class specification. Only the entity ids
//! vary between devices; everything else is constant.

use crate::types::{ControlKind, ControlRef, FlagEncoding, Signedness, Width};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Camera terminal control selectors (UVC 1.1 table A-12)
pub mod camera_terminal {
    pub const AE_MODE_CONTROL: u8 = 0x02;
    pub const EXPOSURE_TIME_ABSOLUTE_CONTROL: u8 = 0x04;
}

/// Processing unit control selectors (UVC 1.1 table A-13)
pub mod processing_unit {
    pub const BRIGHTNESS_CONTROL: u8 = 0x02;
    pub const CONTRAST_CONTROL: u8 = 0x03;
    pub const GAIN_CONTROL: u8 = 0x04;
    pub const SATURATION_CONTROL: u8 = 0x07;
    pub const SHARPNESS_CONTROL: u8 = 0x08;
    pub const WHITE_BALANCE_TEMPERATURE_CONTROL: u8 = 0x0a;
    pub const WHITE_BALANCE_TEMPERATURE_AUTO_CONTROL: u8 = 0x0b;
}

/// Semantic camera controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Control {
    AutoExposure,
    Exposure,
    Gain,
    Brightness,
    Contrast,
    Saturation,
    Sharpness,
    AutoWhiteBalance,
    WhiteBalance,
}

impl Control {
    pub const ALL: [Control; 9] = [
        Control::AutoExposure,
        Control::Exposure,
        Control::Gain,
        Control::Brightness,
        Control::Contrast,
        Control::Saturation,
        Control::Sharpness,
        Control::AutoWhiteBalance,
        Control::WhiteBalance,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Control::AutoExposure => "auto-exposure",
            Control::Exposure => "exposure",
            Control::Gain => "gain",
            Control::Brightness => "brightness",
            Control::Contrast => "contrast",
            Control::Saturation => "saturation",
            Control::Sharpness => "sharpness",
            Control::AutoWhiteBalance => "auto-white-balance",
            Control::WhiteBalance => "white-balance",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown control name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown control '{0}'")]
pub struct UnknownControl(pub String);

impl FromStr for Control {
    type Err = UnknownControl;

    /// Accepts the kebab-case name, with `_` or ` ` also allowed as separators
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', ' '], "-");
        Control::ALL
            .into_iter()
            .find(|c| c.name() == normalized)
            .ok_or_else(|| UnknownControl(s.to_string()))
    }
}

/// Entity ids of the two units that own the managed controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitIds {
    /// Camera input terminal
    pub camera_terminal: u8,
    /// Processing unit
    pub processing_unit: u8,
}

impl Default for UnitIds {
    fn default() -> Self {
        Self {
            camera_terminal: 0x01,
            processing_unit: 0x02,
        }
    }
}

/// All control addresses for one device, built once and read-only after
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlTable {
    units: UnitIds,
    refs: [ControlRef; 9],
}

impl ControlTable {
    pub fn new(units: UnitIds) -> Self {
        let refs = Control::ALL.map(|control| Self::build(control, units));
        Self { units, refs }
    }

    fn build(control: Control, units: UnitIds) -> ControlRef {
        use camera_terminal as ct;
        use processing_unit as pu;

        let value = |unit, selector, width, signedness| ControlRef {
            unit,
            selector,
            width,
            signedness,
            kind: ControlKind::Value,
        };
        let flag = |unit, selector, encoding| ControlRef {
            unit,
            selector,
            width: Width::Byte,
            signedness: Signedness::Unsigned,
            kind: ControlKind::Flag(encoding),
        };

        let ct_id = units.camera_terminal;
        let pu_id = units.processing_unit;

        match control {
            Control::AutoExposure => {
                flag(ct_id, ct::AE_MODE_CONTROL, FlagEncoding::AutoExposureMode)
            }
            Control::Exposure => value(
                ct_id,
                ct::EXPOSURE_TIME_ABSOLUTE_CONTROL,
                Width::DoubleWord,
                Signedness::Unsigned,
            ),
            Control::Brightness => value(
                pu_id,
                pu::BRIGHTNESS_CONTROL,
                Width::Word,
                Signedness::Signed,
            ),
            Control::Contrast => value(
                pu_id,
                pu::CONTRAST_CONTROL,
                Width::Word,
                Signedness::Unsigned,
            ),
            Control::Gain => value(pu_id, pu::GAIN_CONTROL, Width::Word, Signedness::Unsigned),
            Control::Saturation => value(
                pu_id,
                pu::SATURATION_CONTROL,
                Width::Word,
                Signedness::Unsigned,
            ),
            Control::Sharpness => value(
                pu_id,
                pu::SHARPNESS_CONTROL,
                Width::Word,
                Signedness::Unsigned,
            ),
            Control::WhiteBalance => value(
                pu_id,
                pu::WHITE_BALANCE_TEMPERATURE_CONTROL,
                Width::Word,
                Signedness::Unsigned,
            ),
            Control::AutoWhiteBalance => flag(
                pu_id,
                pu::WHITE_BALANCE_TEMPERATURE_AUTO_CONTROL,
                FlagEncoding::Boolean,
            ),
        }
    }

    /// Address of a control; every control has an entry
    pub fn resolve(&self, control: Control) -> ControlRef {
        self.refs[control.index()]
    }

    pub fn units(&self) -> UnitIds {
        self.units
    }

    pub fn iter(&self) -> impl Iterator<Item = (Control, ControlRef)> + '_ {
        Control::ALL.into_iter().zip(self.refs.iter().copied())
    }
}

impl Default for ControlTable {
    fn default() -> Self {
        Self::new(UnitIds::default())
    }
}
