//! Camera control facade
//!
//! The public API over one open video control interface. Every control goes
//! through the same path: resolve its address in the [`ControlTable`], make
//! sure its capabilities (and, for numeric controls, its range) are cached,
//! then issue a single `GET_CUR` or `SET_CUR`.
//!
//! Operations take `&mut self`: the cache is populated with a
//! check-then-insert sequence, so callers sharing one camera across threads
//! must wrap it in a lock.

use crate::cache::ControlCache;
use crate::error::{CameraError, Operation, Result, ValueKind};
use crate::interface::ControlInterface;
use crate::mapper::{to_native, to_normalized};
use crate::usb::{DeviceSelector, OpenOptions, UvcDevice, find_device, map_rusb_error};
use protocol::{
    Capabilities, Control, ControlKind, ControlTable, ControlTransport, Range, RequestCode,
};
use tracing::{debug, info, warn};

/// Caller-facing value of a control
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlValue {
    /// Numeric control position in `[0.0, 1.0]`
    Normalized(f64),
    /// Toggle state
    Flag(bool),
}

impl ControlValue {
    fn kind(self) -> ValueKind {
        match self {
            ControlValue::Normalized(_) => ValueKind::Normalized,
            ControlValue::Flag(_) => ValueKind::Flag,
        }
    }
}

fn expected_kind(kind: ControlKind) -> ValueKind {
    match kind {
        ControlKind::Value => ValueKind::Normalized,
        ControlKind::Flag(_) => ValueKind::Flag,
    }
}

/// Semantic control surface of one UVC camera
#[derive(Debug)]
pub struct CameraControl<T: ControlTransport> {
    interface: ControlInterface<T>,
    table: ControlTable,
    cache: ControlCache,
}

/// A [`CameraControl`] over a real USB device
pub type UsbCamera = CameraControl<UvcDevice<rusb::Context>>;

impl CameraControl<UvcDevice<rusb::Context>> {
    /// Locate a camera and open its video control interface
    ///
    /// Fails with [`CameraError::DeviceNotFound`] when nothing attached
    /// matches `selector` and exposes a video control interface.
    pub fn open(selector: &DeviceSelector, options: &OpenOptions) -> Result<Self> {
        let context =
            rusb::Context::new().map_err(|e| CameraError::Enumeration(map_rusb_error(e)))?;
        let device = find_device(&context, selector)?;
        let device = UvcDevice::open(device, options)?;

        let units = options.resolve_units(device.units());
        let interface = device.interface_number();
        info!(
            "Opened {} (interface {}, camera terminal {}, processing unit {})",
            selector, interface, units.camera_terminal, units.processing_unit
        );

        Ok(Self::with_transport(
            device,
            interface,
            ControlTable::new(units),
        ))
    }

    pub fn open_by_ids(vendor_id: u16, product_id: u16) -> Result<Self> {
        Self::open(
            &DeviceSelector::Ids {
                vendor_id,
                product_id,
            },
            &OpenOptions::default(),
        )
    }

    pub fn open_by_location(location_id: u32) -> Result<Self> {
        Self::open(
            &DeviceSelector::Location(location_id),
            &OpenOptions::default(),
        )
    }
}

impl<T: ControlTransport> CameraControl<T> {
    /// Build a facade over an already-open transport
    pub fn with_transport(transport: T, interface: u8, table: ControlTable) -> Self {
        Self {
            interface: ControlInterface::new(transport, interface),
            table,
            cache: ControlCache::new(),
        }
    }

    pub fn table(&self) -> &ControlTable {
        &self.table
    }

    pub fn transport(&self) -> &T {
        self.interface.transport()
    }

    pub fn transport_mut(&mut self) -> &mut T {
        self.interface.transport_mut()
    }

    pub fn into_transport(self) -> T {
        self.interface.into_transport()
    }

    /// Capabilities of a control, queried with `GET_INFO` at most once
    pub fn capabilities(&mut self, control: Control) -> Result<Capabilities> {
        let control_ref = self.table.resolve(control);
        let interface = &mut self.interface;
        self.cache.capabilities(control_ref.key(), || {
            let caps = interface.info(control, &control_ref)?;
            debug!("{} capabilities: {:?}", control, caps);
            Ok(caps)
        })
    }

    /// Whether the control can be read
    ///
    /// A failed capability query reports `false`; it is not cached, so a
    /// later call asks the device again.
    pub fn can_get(&mut self, control: Control) -> bool {
        match self.capabilities(control) {
            Ok(caps) => caps.supports_get,
            Err(e) => {
                debug!("Treating {} as unreadable: {}", control, e);
                false
            }
        }
    }

    /// Whether the control can be written
    pub fn can_set(&mut self, control: Control) -> bool {
        match self.capabilities(control) {
            Ok(caps) => caps.supports_set,
            Err(e) => {
                debug!("Treating {} as unwritable: {}", control, e);
                false
            }
        }
    }

    /// Device range of a numeric control, queried at most once
    ///
    /// Requires the control to be readable.
    pub fn range(&mut self, control: Control) -> Result<Range> {
        let control_ref = self.table.resolve(control);
        if control_ref.kind != ControlKind::Value {
            return Err(CameraError::ValueKind {
                control,
                expected: ValueKind::Flag,
            });
        }
        self.require(control, Operation::Get)?;

        let interface = &mut self.interface;
        self.cache.range(control_ref.key(), || {
            let min = interface.get(control, &control_ref, RequestCode::GetMin)?;
            let max = interface.get(control, &control_ref, RequestCode::GetMax)?;
            let res = interface.get(control, &control_ref, RequestCode::GetRes)?;
            let range = Range::new(min, max, res);

            if range.is_degenerate() {
                warn!(
                    "{} reports a degenerate range [{}, {}]; values will read as 0.0",
                    control, min, max
                );
            }
            debug!("{} range: [{}, {}] step {}", control, min, max, res);
            Ok(range)
        })
    }

    /// Read a control in its external convention
    pub fn get(&mut self, control: Control) -> Result<ControlValue> {
        self.require(control, Operation::Get)?;
        let control_ref = self.table.resolve(control);

        match control_ref.kind {
            ControlKind::Flag(encoding) => {
                let raw = self
                    .interface
                    .get(control, &control_ref, RequestCode::GetCur)?;
                Ok(ControlValue::Flag(encoding.decode(raw)))
            }
            ControlKind::Value => {
                let range = self.range(control)?;
                let raw = self
                    .interface
                    .get(control, &control_ref, RequestCode::GetCur)?;
                Ok(ControlValue::Normalized(to_normalized(raw, &range)))
            }
        }
    }

    /// Write a control in its external convention
    ///
    /// Normalized values outside `[0.0, 1.0]` are clamped.
    pub fn set(&mut self, control: Control, value: ControlValue) -> Result<()> {
        let control_ref = self.table.resolve(control);
        let expected = expected_kind(control_ref.kind);
        if value.kind() != expected {
            return Err(CameraError::ValueKind { control, expected });
        }
        self.require(control, Operation::Set)?;

        let raw = match (control_ref.kind, value) {
            (ControlKind::Flag(encoding), ControlValue::Flag(enabled)) => encoding.encode(enabled),
            (ControlKind::Value, ControlValue::Normalized(normalized)) => {
                let range = self.range(control)?;
                to_native(normalized, &range)
            }
            _ => return Err(CameraError::ValueKind { control, expected }),
        };

        self.interface.set_cur(control, &control_ref, raw)
    }

    /// Read a numeric control as a normalized float
    pub fn get_value(&mut self, control: Control) -> Result<f64> {
        match self.get(control)? {
            ControlValue::Normalized(value) => Ok(value),
            ControlValue::Flag(_) => Err(CameraError::ValueKind {
                control,
                expected: ValueKind::Flag,
            }),
        }
    }

    pub fn set_value(&mut self, control: Control, value: f64) -> Result<()> {
        self.set(control, ControlValue::Normalized(value))
    }

    /// Read a toggle control
    pub fn get_flag(&mut self, control: Control) -> Result<bool> {
        match self.get(control)? {
            ControlValue::Flag(enabled) => Ok(enabled),
            ControlValue::Normalized(_) => Err(CameraError::ValueKind {
                control,
                expected: ValueKind::Normalized,
            }),
        }
    }

    pub fn set_flag(&mut self, control: Control, enabled: bool) -> Result<()> {
        self.set(control, ControlValue::Flag(enabled))
    }

    /// Read the native value of a control without range mapping
    pub fn get_raw(&mut self, control: Control) -> Result<i64> {
        self.require(control, Operation::Get)?;
        let control_ref = self.table.resolve(control);
        self.interface
            .get(control, &control_ref, RequestCode::GetCur)
    }

    /// Write a native value without range mapping
    pub fn set_raw(&mut self, control: Control, value: i64) -> Result<()> {
        self.require(control, Operation::Set)?;
        let control_ref = self.table.resolve(control);
        self.interface.set_cur(control, &control_ref, value)
    }

    /// Device default of a control, via `GET_DEF`
    pub fn default_value(&mut self, control: Control) -> Result<ControlValue> {
        self.require(control, Operation::Get)?;
        let control_ref = self.table.resolve(control);

        match control_ref.kind {
            ControlKind::Flag(encoding) => {
                let raw = self
                    .interface
                    .get(control, &control_ref, RequestCode::GetDef)?;
                Ok(ControlValue::Flag(encoding.decode(raw)))
            }
            ControlKind::Value => {
                let range = self.range(control)?;
                let raw = self
                    .interface
                    .get(control, &control_ref, RequestCode::GetDef)?;
                Ok(ControlValue::Normalized(to_normalized(raw, &range)))
            }
        }
    }

    /// Write the device default back to a control
    pub fn reset(&mut self, control: Control) -> Result<()> {
        self.require(control, Operation::Set)?;
        let control_ref = self.table.resolve(control);
        let raw = self
            .interface
            .get(control, &control_ref, RequestCode::GetDef)?;
        debug!("Resetting {} to {}", control, raw);
        self.interface.set_cur(control, &control_ref, raw)
    }

    fn require(&mut self, control: Control, operation: Operation) -> Result<Capabilities> {
        let caps = self.capabilities(control)?;
        let supported = match operation {
            Operation::Get => caps.supports_get,
            Operation::Set => caps.supports_set,
        };
        if !supported {
            return Err(CameraError::Unsupported { control, operation });
        }
        Ok(caps)
    }
}

macro_rules! value_accessors {
    ($($control:ident: $can_get:ident, $can_set:ident, $get:ident, $set:ident;)*) => {
        impl<T: ControlTransport> CameraControl<T> {
            $(
                pub fn $can_get(&mut self) -> bool {
                    self.can_get(Control::$control)
                }

                pub fn $can_set(&mut self) -> bool {
                    self.can_set(Control::$control)
                }

                pub fn $get(&mut self) -> Result<f64> {
                    self.get_value(Control::$control)
                }

                pub fn $set(&mut self, value: f64) -> Result<()> {
                    self.set_value(Control::$control, value)
                }
            )*
        }
    };
}

macro_rules! flag_accessors {
    ($($control:ident: $can_get:ident, $can_set:ident, $get:ident, $set:ident;)*) => {
        impl<T: ControlTransport> CameraControl<T> {
            $(
                pub fn $can_get(&mut self) -> bool {
                    self.can_get(Control::$control)
                }

                pub fn $can_set(&mut self) -> bool {
                    self.can_set(Control::$control)
                }

                pub fn $get(&mut self) -> Result<bool> {
                    self.get_flag(Control::$control)
                }

                pub fn $set(&mut self, enabled: bool) -> Result<()> {
                    self.set_flag(Control::$control, enabled)
                }
            )*
        }
    };
}

value_accessors! {
    Exposure: can_get_exposure, can_set_exposure, exposure, set_exposure;
    Gain: can_get_gain, can_set_gain, gain, set_gain;
    Brightness: can_get_brightness, can_set_brightness, brightness, set_brightness;
    Contrast: can_get_contrast, can_set_contrast, contrast, set_contrast;
    Saturation: can_get_saturation, can_set_saturation, saturation, set_saturation;
    Sharpness: can_get_sharpness, can_set_sharpness, sharpness, set_sharpness;
    WhiteBalance: can_get_white_balance, can_set_white_balance, white_balance, set_white_balance;
}

flag_accessors! {
    AutoExposure: can_get_auto_exposure, can_set_auto_exposure, auto_exposure, set_auto_exposure;
    AutoWhiteBalance: can_get_auto_white_balance, can_set_auto_white_balance, auto_white_balance, set_auto_white_balance;
}
