//! Device discovery
//!
//! Resolves a camera by vendor/product id or by location id, and lists the
//! attached devices that expose a UVC video control interface.

use crate::error::{CameraError, Result};
use crate::usb::transfers::map_rusb_error;
use protocol::{DiscoveredUnits, VIDEO_CLASS, VIDEO_CONTROL_SUBCLASS, parse_units};
use rusb::{ConfigDescriptor, Device, DeviceHandle, UsbContext};
use std::fmt;
use tracing::{debug, warn};

/// How the caller identifies the camera to open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceSelector {
    Ids { vendor_id: u16, product_id: u16 },
    /// Bus/port path packed as `bus << 24 | port[i] << (20 - 4 * i)`
    Location(u32),
}

impl DeviceSelector {
    pub fn matches(&self, vendor_id: u16, product_id: u16, location_id: u32) -> bool {
        match *self {
            DeviceSelector::Ids {
                vendor_id: vid,
                product_id: pid,
            } => vid == vendor_id && pid == product_id,
            DeviceSelector::Location(location) => location == location_id,
        }
    }
}

impl fmt::Display for DeviceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceSelector::Ids {
                vendor_id,
                product_id,
            } => write!(f, "{:04x}:{:04x}", vendor_id, product_id),
            DeviceSelector::Location(location) => write!(f, "location {:#010x}", location),
        }
    }
}

/// Pack a bus number and hub port path into a location id
///
/// Each port takes one nibble below the bus byte; paths deeper than six
/// hubs are truncated.
pub fn location_id(bus: u8, ports: &[u8]) -> u32 {
    ports
        .iter()
        .take(6)
        .enumerate()
        .fold(u32::from(bus) << 24, |acc, (i, port)| {
            acc | (u32::from(port & 0x0f) << (20 - 4 * i))
        })
}

/// Video control interface of a device's active configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlInterfaceDesc {
    pub number: u8,
    pub units: DiscoveredUnits,
}

/// Find the interface with class 14 / subclass 1
pub fn control_interface<C: UsbContext>(
    device: &Device<C>,
) -> std::result::Result<Option<ControlInterfaceDesc>, rusb::Error> {
    let config = device
        .active_config_descriptor()
        .or_else(|_| device.config_descriptor(0))?;
    Ok(find_control_interface(&config))
}

fn find_control_interface(config: &ConfigDescriptor) -> Option<ControlInterfaceDesc> {
    for interface in config.interfaces() {
        for desc in interface.descriptors() {
            if desc.class_code() == VIDEO_CLASS && desc.sub_class_code() == VIDEO_CONTROL_SUBCLASS {
                return Some(ControlInterfaceDesc {
                    number: desc.interface_number(),
                    units: parse_units(desc.extra()),
                });
            }
        }
    }
    None
}

/// Identity of one enumerated device, as seen by the selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub vendor_id: u16,
    pub product_id: u16,
    pub location_id: u32,
    pub has_control_interface: bool,
}

/// Index of the first candidate matching `selector` that has a video
/// control interface
pub fn pick(candidates: &[Candidate], selector: &DeviceSelector) -> Result<usize> {
    candidates
        .iter()
        .position(|c| {
            c.has_control_interface && selector.matches(c.vendor_id, c.product_id, c.location_id)
        })
        .ok_or(CameraError::DeviceNotFound(*selector))
}

fn candidate<C: UsbContext>(device: &Device<C>) -> Option<Candidate> {
    let descriptor = match device.device_descriptor() {
        Ok(d) => d,
        Err(e) => {
            debug!(
                "Skipping device at bus={}, addr={}: {}",
                device.bus_number(),
                device.address(),
                e
            );
            return None;
        }
    };
    let ports = device.port_numbers().unwrap_or_default();
    let has_control_interface = matches!(control_interface(device), Ok(Some(_)));

    Some(Candidate {
        vendor_id: descriptor.vendor_id(),
        product_id: descriptor.product_id(),
        location_id: location_id(device.bus_number(), &ports),
        has_control_interface,
    })
}

/// Resolve `selector` to an attached device
pub fn find_device<C: UsbContext>(context: &C, selector: &DeviceSelector) -> Result<Device<C>> {
    let devices = context
        .devices()
        .map_err(|e| CameraError::Enumeration(map_rusb_error(e)))?;

    let mut found: Vec<(Device<C>, Candidate)> = devices
        .iter()
        .filter_map(|device| candidate(&device).map(|c| (device, c)))
        .collect();
    let candidates: Vec<Candidate> = found.iter().map(|(_, c)| *c).collect();

    match pick(&candidates, selector) {
        Ok(index) => {
            let (device, c) = found.swap_remove(index);
            debug!(
                "Resolved {} to bus={}, addr={}, location={:#010x}",
                selector,
                device.bus_number(),
                device.address(),
                c.location_id
            );
            Ok(device)
        }
        Err(e) => {
            if candidates
                .iter()
                .any(|c| selector.matches(c.vendor_id, c.product_id, c.location_id))
            {
                warn!("Device matching {} has no video control interface", selector);
            }
            Err(e)
        }
    }
}

/// Summary of an attached UVC camera
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UvcDeviceInfo {
    pub vendor_id: u16,
    pub product_id: u16,
    pub bus_number: u8,
    pub address: u8,
    pub location_id: u32,
    pub interface_number: u8,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
}

/// List attached devices exposing a video control interface
///
/// String descriptors are read only if the device can be opened.
pub fn list_devices<C: UsbContext>(context: &C) -> Result<Vec<UvcDeviceInfo>> {
    let devices = context
        .devices()
        .map_err(|e| CameraError::Enumeration(map_rusb_error(e)))?;

    let mut cameras = Vec::new();
    for device in devices.iter() {
        let Ok(Some(control)) = control_interface(&device) else {
            continue;
        };
        let Ok(descriptor) = device.device_descriptor() else {
            continue;
        };

        let (manufacturer, product) = match device.open() {
            Ok(handle) => read_strings(&handle, &descriptor),
            Err(e) => {
                debug!(
                    "Cannot open {:04x}:{:04x} for strings: {}",
                    descriptor.vendor_id(),
                    descriptor.product_id(),
                    e
                );
                (None, None)
            }
        };
        let ports = device.port_numbers().unwrap_or_default();

        cameras.push(UvcDeviceInfo {
            vendor_id: descriptor.vendor_id(),
            product_id: descriptor.product_id(),
            bus_number: device.bus_number(),
            address: device.address(),
            location_id: location_id(device.bus_number(), &ports),
            interface_number: control.number,
            manufacturer,
            product,
        });
    }

    debug!("Found {} UVC device(s)", cameras.len());
    Ok(cameras)
}

/// [`list_devices`] on a fresh libusb context
pub fn list_cameras() -> Result<Vec<UvcDeviceInfo>> {
    let context = rusb::Context::new().map_err(|e| CameraError::Enumeration(map_rusb_error(e)))?;
    list_devices(&context)
}

fn read_strings<C: UsbContext>(
    handle: &DeviceHandle<C>,
    descriptor: &rusb::DeviceDescriptor,
) -> (Option<String>, Option<String>) {
    let manufacturer = descriptor
        .manufacturer_string_index()
        .and_then(|idx| handle.read_string_descriptor_ascii(idx).ok());
    let product = descriptor
        .product_string_index()
        .and_then(|idx| handle.read_string_descriptor_ascii(idx).ok());
    (manufacturer, product)
}
