//! UVC device handle
//!
//! Owns an open [`rusb::DeviceHandle`] with the video control interface
//! claimed. The interface is released (and a detached kernel driver handed
//! back) on [`UvcDevice::close`] or drop.

use crate::error::{CameraError, Result};
use crate::usb::discovery::control_interface;
use crate::usb::transfers::map_rusb_error;
use protocol::{DiscoveredUnits, UnitIds};
use rusb::{Device, DeviceHandle, UsbContext};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Control transfer timeout used unless overridden
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Options applied when opening a camera
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    /// Timeout for every control transfer
    pub timeout: Duration,
    /// Detach an active kernel driver (uvcvideo) before claiming
    pub detach_kernel_driver: bool,
    /// Camera terminal id to address instead of the one found in the
    /// descriptors
    pub camera_terminal: Option<u8>,
    /// Processing unit id to address instead of the one found in the
    /// descriptors
    pub processing_unit: Option<u8>,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            detach_kernel_driver: false,
            camera_terminal: None,
            processing_unit: None,
        }
    }
}

impl OpenOptions {
    /// Apply the per-unit overrides on top of `discovered`
    ///
    /// Each id is overridden on its own; an unset override keeps the
    /// discovered id.
    pub fn resolve_units(&self, discovered: UnitIds) -> UnitIds {
        UnitIds {
            camera_terminal: self.camera_terminal.unwrap_or(discovered.camera_terminal),
            processing_unit: self.processing_unit.unwrap_or(discovered.processing_unit),
        }
    }
}

/// An open camera with its video control interface claimed
pub struct UvcDevice<C: UsbContext> {
    device: Device<C>,
    handle: Option<DeviceHandle<C>>,
    interface_number: u8,
    units: DiscoveredUnits,
    pub(crate) timeout: Duration,
    detached_kernel_driver: bool,
}

impl<C: UsbContext> UvcDevice<C> {
    /// Open `device` and claim its video control interface
    ///
    /// Without `detach_kernel_driver`, a camera bound to uvcvideo usually
    /// fails here with [`CameraError::InterfaceBusy`] on Linux.
    pub fn open(device: Device<C>, options: &OpenOptions) -> Result<Self> {
        let control = match control_interface(&device) {
            Ok(Some(control)) => control,
            Ok(None) => return Err(CameraError::InterfaceMismatch),
            Err(e) => {
                warn!("Failed to read config descriptor: {}", e);
                return Err(CameraError::Enumeration(map_rusb_error(e)));
            }
        };
        let interface_number = control.number;

        let mut handle = device.open().map_err(|e| {
            warn!("Failed to open device: {}", e);
            match e {
                rusb::Error::Access => CameraError::PermissionDenied,
                _ => CameraError::Enumeration(map_rusb_error(e)),
            }
        })?;

        debug!(
            "Opened device at bus={}, addr={}",
            device.bus_number(),
            device.address()
        );

        let mut detached_kernel_driver = false;
        if options.detach_kernel_driver {
            match handle.kernel_driver_active(interface_number) {
                Ok(true) => {
                    debug!(
                        "Detaching kernel driver from interface {}",
                        interface_number
                    );
                    match handle.detach_kernel_driver(interface_number) {
                        Ok(()) => detached_kernel_driver = true,
                        Err(e) => warn!(
                            "Failed to detach kernel driver from interface {}: {}",
                            interface_number, e
                        ),
                    }
                }
                Ok(false) => {
                    debug!("No kernel driver active on interface {}", interface_number);
                }
                Err(e) => {
                    debug!(
                        "Could not check kernel driver status for interface {}: {}",
                        interface_number, e
                    );
                }
            }
        }

        if let Err(e) = handle.claim_interface(interface_number) {
            warn!("Failed to claim interface {}: {}", interface_number, e);
            if detached_kernel_driver {
                if let Err(e) = handle.attach_kernel_driver(interface_number) {
                    warn!(
                        "Could not reattach kernel driver to interface {}: {}",
                        interface_number, e
                    );
                }
            }
            return Err(match e {
                rusb::Error::Busy => CameraError::InterfaceBusy {
                    interface: interface_number,
                },
                rusb::Error::Access => CameraError::PermissionDenied,
                _ => CameraError::Enumeration(map_rusb_error(e)),
            });
        }

        info!(
            "Claimed video control interface {} on bus={}, addr={}",
            interface_number,
            device.bus_number(),
            device.address()
        );

        Ok(Self {
            device,
            handle: Some(handle),
            interface_number,
            units: control.units,
            timeout: options.timeout,
            detached_kernel_driver,
        })
    }

    /// Video control interface number
    pub fn interface_number(&self) -> u8 {
        self.interface_number
    }

    /// Unit ids found in the class-specific descriptors, with the common
    /// defaults filling whatever was missing
    pub fn units(&self) -> UnitIds {
        self.units.or(UnitIds::default())
    }

    pub fn discovered_units(&self) -> DiscoveredUnits {
        self.units
    }

    pub fn bus_number(&self) -> u8 {
        self.device.bus_number()
    }

    pub fn address(&self) -> u8 {
        self.device.address()
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    pub(crate) fn handle(&self) -> std::result::Result<&DeviceHandle<C>, rusb::Error> {
        self.handle.as_ref().ok_or(rusb::Error::NoDevice)
    }

    /// Release the interface and restore the kernel driver
    ///
    /// Safe to call more than once.
    pub fn close(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            if let Err(e) = handle.release_interface(self.interface_number) {
                warn!(
                    "Failed to release interface {}: {}",
                    self.interface_number, e
                );
            }

            if self.detached_kernel_driver {
                match handle.attach_kernel_driver(self.interface_number) {
                    Ok(()) => debug!(
                        "Reattached kernel driver to interface {}",
                        self.interface_number
                    ),
                    Err(e) => warn!(
                        "Could not reattach kernel driver to interface {}: {}",
                        self.interface_number, e
                    ),
                }
                self.detached_kernel_driver = false;
            }

            debug!(
                "Closed device at bus={}, addr={}",
                self.device.bus_number(),
                self.device.address()
            );
        }
    }
}

impl<C: UsbContext> Drop for UvcDevice<C> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<C: UsbContext> fmt::Debug for UvcDevice<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UvcDevice")
            .field("bus_number", &self.device.bus_number())
            .field("address", &self.device.address())
            .field("interface_number", &self.interface_number)
            .field("units", &self.units)
            .field("timeout", &self.timeout)
            .field("open", &self.handle.is_some())
            .finish()
    }
}
