use candle_core::Device;
use tracing::info;

/// Accelerator for the sentence encoder when one was compiled in and answers,
/// CPU otherwise. `EMBED_FORCE_CPU=1` skips the probe.
pub fn select_device() -> Device {
    if std::env::var("EMBED_FORCE_CPU").is_ok_and(|v| v == "1") {
        info!("embedding on CPU (forced)");
        return Device::Cpu;
    }
    #[cfg(feature = "metal")]
    {
        match Device::new_metal(0) {
            Ok(dev) => {
                info!("embedding on Metal");
                return dev;
            }
            Err(e) => tracing::warn!(error = %e, "Metal device unavailable"),
        }
    }
    #[cfg(feature = "cuda")]
    {
        match Device::new_cuda(0) {
            Ok(dev) => {
                info!("embedding on CUDA");
                return dev;
            }
            Err(e) => tracing::warn!(error = %e, "CUDA device unavailable"),
        }
    }
    info!("embedding on CPU");
    Device::Cpu
}
