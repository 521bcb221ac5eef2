use anyhow::{Result, anyhow};
use candle_core::Device;

/// Pick the compute device from the `model.device` setting: `cpu`, `metal`
/// or `auto` (Metal when compiled in and available, else CPU).
pub fn select_device(requested: &str) -> Result<Device> {
    let device = match requested.to_ascii_lowercase().as_str() {
        "cpu" => Device::Cpu,
        "metal" => metal().ok_or_else(|| anyhow!("Metal device requested but not available in this build"))?,
        "auto" | "" => metal().unwrap_or(Device::Cpu),
        other => return Err(anyhow!("Unknown model.device '{}': expected auto, cpu or metal", other)),
    };
    tracing::info!("Device: {}", if device.is_metal() { "Metal (MPS)" } else { "CPU" });
    Ok(device)
}

#[cfg(feature = "metal")]
fn metal() -> Option<Device> { Device::new_metal(0).ok() }

#[cfg(not(feature = "metal"))]
fn metal() -> Option<Device> { None }
