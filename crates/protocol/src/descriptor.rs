//! Class-specific VideoControl descriptor parsing
//!
//! The VideoControl interface descriptor is followed by class-specific
//! descriptors describing the device topology. Only the camera input terminal
//! and the processing unit matter here: their entity ids address every
//! managed control.

use crate::registry::UnitIds;

/// USB class code of video devices
pub const VIDEO_CLASS: u8 = 0x0e;
/// Interface subclass of the VideoControl interface
pub const VIDEO_CONTROL_SUBCLASS: u8 = 0x01;

const CS_INTERFACE: u8 = 0x24;
const VC_INPUT_TERMINAL: u8 = 0x02;
const VC_PROCESSING_UNIT: u8 = 0x05;
const ITT_CAMERA: u16 = 0x0201;

/// Entity ids found in a VideoControl interface's class-specific descriptors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiscoveredUnits {
    pub camera_terminal: Option<u8>,
    pub processing_unit: Option<u8>,
}

impl DiscoveredUnits {
    /// Fill in anything not discovered from `fallback`
    pub fn or(self, fallback: UnitIds) -> UnitIds {
        UnitIds {
            camera_terminal: self.camera_terminal.unwrap_or(fallback.camera_terminal),
            processing_unit: self.processing_unit.unwrap_or(fallback.processing_unit),
        }
    }
}

/// Walk the descriptor chain in `extra` and pick out the first camera
/// terminal and the first processing unit
///
/// Truncated or malformed trailing descriptors end the walk; whatever was
/// found before them is kept.
pub fn parse_units(extra: &[u8]) -> DiscoveredUnits {
    let mut found = DiscoveredUnits::default();
    let mut rest = extra;

    while rest.len() >= 3 {
        let length = rest[0] as usize;
        if length < 3 || length > rest.len() {
            break;
        }
        let (desc, tail) = rest.split_at(length);
        rest = tail;

        if desc[1] != CS_INTERFACE {
            continue;
        }

        match desc[2] {
            VC_INPUT_TERMINAL if desc.len() >= 6 && found.camera_terminal.is_none() => {
                let terminal_type = u16::from_le_bytes([desc[4], desc[5]]);
                if terminal_type == ITT_CAMERA {
                    found.camera_terminal = Some(desc[3]);
                }
            }
            VC_PROCESSING_UNIT if desc.len() >= 4 && found.processing_unit.is_none() => {
                found.processing_unit = Some(desc[3]);
            }
            _ => {}
        }
    }

    found
}
