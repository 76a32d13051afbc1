//! uvc-ctl
//!
//! Command-line front end for reading and adjusting the image controls of a
//! USB Video Class camera.

mod config;

use anyhow::{Context, Result, anyhow, bail};
use camera::{
    CameraControl, Control, ControlTransport, ControlValue, DeviceSelector, UsbCamera,
    list_cameras, to_normalized,
};
use clap::{Parser, Subcommand};
use common::setup_logging;
use config::{CliConfig, parse_hex_u16, parse_hex_u32};
use protocol::{Capabilities, ControlKind, Range};
use serde::Serialize;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "uvc-ctl")]
#[command(author, version, about = "Read and adjust UVC camera controls")]
#[command(long_about = "
Reads and writes exposure, gain, brightness, contrast, saturation, sharpness,
white balance and the auto exposure / auto white balance toggles of a USB
Video Class camera. Numeric controls are shown and set as 0.0-1.0 across the
range the camera reports, or as native values with --raw.

EXAMPLES:
    # List attached cameras
    uvc-ctl list

    # Show every control of a specific camera
    uvc-ctl --vid 0x046d --pid 0x0825 info

    # Switch to manual exposure and set it to a quarter of its range
    uvc-ctl set auto-exposure off
    uvc-ctl set exposure 0.25

    # Write a native value
    uvc-ctl set brightness -10 --raw

CONFIGURATION:
    Settings are read from the path given with --config, else from
    ~/.config/uvc-ctl/config.toml. Command-line options take precedence.
")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "PATH", global = true)]
    config: Option<std::path::PathBuf>,

    /// Vendor id of the camera (e.g. 0x046d)
    #[arg(long, value_name = "HEX", value_parser = parse_hex_u16, requires = "pid", global = true)]
    vid: Option<u16>,

    /// Product id of the camera (e.g. 0x0825)
    #[arg(long, value_name = "HEX", value_parser = parse_hex_u16, requires = "vid", global = true)]
    pid: Option<u16>,

    /// Location id of the camera (e.g. 0x14100000)
    #[arg(long, value_name = "HEX", value_parser = parse_hex_u32, conflicts_with_all = ["vid", "pid"], global = true)]
    location: Option<u32>,

    /// Detach the kernel driver from the control interface while open
    #[arg(long, global = true)]
    detach: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List attached UVC cameras
    List,

    /// Show capabilities, range and value of every control
    Info {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Read one control
    Get {
        control: Control,
        /// Print the native value instead of 0.0-1.0
        #[arg(long)]
        raw: bool,
    },

    /// Write one control (0.0-1.0, or on/off for toggles)
    Set {
        control: Control,
        #[arg(allow_hyphen_values = true)]
        value: String,
        /// Interpret the value as a native integer
        #[arg(long)]
        raw: bool,
    },

    /// Restore a control to the camera's default
    Reset { control: Control },

    /// Save default configuration to default location and exit
    SaveConfig,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Command::SaveConfig = args.command {
        let config = CliConfig::default();
        let path = CliConfig::default_path();
        config.save(&path).context("Failed to save configuration")?;
        println!("Configuration saved to: {}", path.display());
        return Ok(());
    }

    let config = if let Some(ref path) = args.config {
        CliConfig::load(Some(path.clone())).context("Failed to load configuration")?
    } else {
        CliConfig::load_or_default()
    };

    let log_level = args
        .log_level
        .as_deref()
        .unwrap_or(&config.general.log_level);
    setup_logging(log_level).context("Failed to setup logging")?;

    debug!("uvc-ctl v{}", env!("CARGO_PKG_VERSION"));

    match &args.command {
        Command::List => list_mode(),
        Command::Info { json } => {
            let mut cam = open_camera(&args, &config)?;
            info_mode(&mut cam, *json)
        }
        Command::Get { control, raw } => {
            let mut cam = open_camera(&args, &config)?;
            if *raw {
                println!("{}", cam.get_raw(*control)?);
            } else {
                println!("{}", format_value(cam.get(*control)?));
            }
            Ok(())
        }
        Command::Set {
            control,
            value,
            raw,
        } => {
            let mut cam = open_camera(&args, &config)?;
            if *raw {
                let native: i64 = value
                    .parse()
                    .with_context(|| format!("'{}' is not an integer", value))?;
                cam.set_raw(*control, native)?;
            } else {
                let parsed = parse_value(&cam, *control, value)?;
                cam.set(*control, parsed)?;
            }
            info!("Set {} to {}", control, value);
            Ok(())
        }
        Command::Reset { control } => {
            let mut cam = open_camera(&args, &config)?;
            cam.reset(*control)?;
            info!("Reset {} to its default", control);
            Ok(())
        }
        Command::SaveConfig => Ok(()),
    }
}

/// Resolve the camera from arguments, then config, then the first attached
fn open_camera(args: &Args, config: &CliConfig) -> Result<UsbCamera> {
    let selector = match (args.location, args.vid, args.pid) {
        (Some(location), _, _) => DeviceSelector::Location(location),
        (None, Some(vendor_id), Some(product_id)) => DeviceSelector::Ids {
            vendor_id,
            product_id,
        },
        _ => match config.selector()? {
            Some(selector) => selector,
            None => {
                let first = list_cameras()?
                    .into_iter()
                    .next()
                    .ok_or_else(|| anyhow!("No UVC cameras found"))?;
                info!(
                    "No camera selected, using {:04x}:{:04x}",
                    first.vendor_id, first.product_id
                );
                DeviceSelector::Location(first.location_id)
            }
        },
    };

    let mut options = config.open_options();
    options.detach_kernel_driver |= args.detach;

    CameraControl::open(&selector, &options)
        .with_context(|| format!("Failed to open camera {}", selector))
}

fn list_mode() -> Result<()> {
    let cameras = list_cameras()?;

    if cameras.is_empty() {
        println!("No UVC cameras found.");
        return Ok(());
    }

    println!("Found {} UVC camera(s):\n", cameras.len());
    for camera in cameras {
        println!(
            "  {:04x}:{:04x} - {} {}",
            camera.vendor_id,
            camera.product_id,
            camera
                .manufacturer
                .as_deref()
                .unwrap_or("Unknown Manufacturer"),
            camera.product.as_deref().unwrap_or("Unknown Product")
        );
        println!(
            "      Bus {:03} Device {:03} Location {:#010x} Interface {}",
            camera.bus_number, camera.address, camera.location_id, camera.interface_number
        );
        println!();
    }
    Ok(())
}

/// One row of `info` output
#[derive(Debug, Serialize)]
struct ControlReport {
    control: Control,
    #[serde(skip_serializing_if = "Option::is_none")]
    capabilities: Option<Capabilities>,
    #[serde(skip_serializing_if = "Option::is_none")]
    range: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn report<T: ControlTransport>(cam: &mut CameraControl<T>, control: Control) -> ControlReport {
    let mut row = ControlReport {
        control,
        capabilities: None,
        range: None,
        raw: None,
        value: None,
        error: None,
    };

    let caps = match cam.capabilities(control) {
        Ok(caps) => caps,
        Err(e) => {
            row.error = Some(e.to_string());
            return row;
        }
    };
    row.capabilities = Some(caps);
    if !caps.supports_get {
        return row;
    }

    if let Err(e) = read_into(cam, control, &mut row) {
        row.error = Some(e.to_string());
    }
    row
}

fn read_into<T: ControlTransport>(
    cam: &mut CameraControl<T>,
    control: Control,
    row: &mut ControlReport,
) -> camera::Result<()> {
    let kind = cam.table().resolve(control).kind;
    let range = match kind {
        ControlKind::Value => Some(cam.range(control)?),
        ControlKind::Flag(_) => None,
    };
    let raw = cam.get_raw(control)?;

    row.range = range;
    row.raw = Some(raw);
    row.value = Some(match (kind, range) {
        (ControlKind::Flag(encoding), _) => serde_json::json!(encoding.decode(raw)),
        (ControlKind::Value, Some(range)) => serde_json::json!(to_normalized(raw, &range)),
        (ControlKind::Value, None) => serde_json::Value::Null,
    });
    Ok(())
}

fn info_mode(cam: &mut UsbCamera, json: bool) -> Result<()> {
    let rows: Vec<ControlReport> = Control::ALL.iter().map(|c| report(cam, *c)).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!(
        "{:<20} {:<4} {:<18} {:>8} {:>8}",
        "CONTROL", "MODE", "RANGE", "RAW", "VALUE"
    );
    for row in rows {
        let mode = match row.capabilities {
            Some(caps) => format!(
                "{}{}",
                if caps.supports_get { "r" } else { "-" },
                if caps.supports_set { "w" } else { "-" }
            ),
            None => "??".to_string(),
        };
        let range = row
            .range
            .map(|r| format!("[{}, {}] /{}", r.min, r.max, r.res))
            .unwrap_or_default();
        let raw = row.raw.map(|r| r.to_string()).unwrap_or_default();
        let value = match row.value {
            Some(serde_json::Value::Bool(true)) => "on".to_string(),
            Some(serde_json::Value::Bool(false)) => "off".to_string(),
            Some(serde_json::Value::Number(n)) => {
                format!("{:.3}", n.as_f64().unwrap_or_default())
            }
            _ => String::new(),
        };

        println!(
            "{:<20} {:<4} {:<18} {:>8} {:>8}",
            row.control.name(),
            mode,
            range,
            raw,
            value
        );
        if let Some(error) = row.error {
            println!("    {}", error);
        }
    }
    Ok(())
}

fn format_value(value: ControlValue) -> String {
    match value {
        ControlValue::Normalized(v) => format!("{:.4}", v),
        ControlValue::Flag(true) => "on".to_string(),
        ControlValue::Flag(false) => "off".to_string(),
    }
}

fn parse_value(cam: &UsbCamera, control: Control, value: &str) -> Result<ControlValue> {
    match cam.table().resolve(control).kind {
        ControlKind::Flag(_) => match value.to_ascii_lowercase().as_str() {
            "on" | "true" | "1" | "yes" => Ok(ControlValue::Flag(true)),
            "off" | "false" | "0" | "no" => Ok(ControlValue::Flag(false)),
            _ => bail!("{} takes on or off, got '{}'", control, value),
        },
        ControlKind::Value => {
            let v: f64 = value
                .parse()
                .with_context(|| format!("'{}' is not a number", value))?;
            if !(0.0..=1.0).contains(&v) {
                bail!("{} takes a value between 0.0 and 1.0, got {}", control, v);
            }
            Ok(ControlValue::Normalized(v))
        }
    }
}
