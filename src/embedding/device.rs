use candle_core::Device;
use tracing::{info, warn};

/// Picks the first accelerator compiled in and present, else the CPU.
///
/// Accelerator errors are logged and the next option is tried.
pub fn select_device() -> Device {
    #[cfg_attr(not(any(feature = "metal", feature = "cuda")), allow(unused_mut))]
    let mut failures: Vec<String> = Vec::new();

    #[cfg(feature = "metal")]
    match Device::new_metal(0) {
        Ok(device) => {
            info!("Encoding on Metal");
            return device;
        }
        Err(e) => {
            warn!(error = %e, "Metal device unavailable");
            failures.push(format!("metal: {e}"));
        }
    }

    #[cfg(feature = "cuda")]
    match Device::new_cuda(0) {
        Ok(device) => {
            info!("Encoding on CUDA");
            return device;
        }
        Err(e) => {
            warn!(error = %e, "CUDA device unavailable");
            failures.push(format!("cuda: {e}"));
        }
    }

    if failures.is_empty() {
        info!("Encoding on CPU (no GPU backend compiled)");
    } else {
        warn!(reason = %failures.join("; "), "Falling back to CPU device");
    }
    Device::Cpu
}

/// Short label for logs and `/ready`.
pub fn device_label(device: &Device) -> &'static str {
    match device {
        Device::Cpu => "cpu",
        Device::Cuda(_) => "cuda",
        Device::Metal(_) => "metal",
    }
}
