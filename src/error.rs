//! Error types for constel.
//!
//! Construction-time parameter validation, GPU initialization, and
//! event-loop failures each get their own enum. All of them fail fast:
//! no partial state is ever committed before an error is returned.

use std::fmt;

/// Errors from validating field or linker parameters.
///
/// Every variant is an invalid argument caught at construction time.
/// The caller may reconstruct with corrected parameters; nothing was
/// allocated or mutated on the failing path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Particle count must be at least 1.
    ZeroParticleCount,
    /// Bounding extent must be positive.
    NonPositiveExtent(f32),
    /// Maximum particle size must be positive.
    NonPositiveSizeMax(f32),
    /// Palette must contain at least one color.
    EmptyPalette,
    /// Link distance threshold must be positive.
    NonPositiveThreshold(f32),
    /// Link scan prefix must cover at least one particle.
    ZeroScanLimit,
    /// Segment buffer must hold at least one segment.
    ZeroSegmentCapacity,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroParticleCount => {
                write!(f, "particle count must be at least 1")
            }
            ConfigError::NonPositiveExtent(v) => {
                write!(f, "bounding extent must be positive, got {}", v)
            }
            ConfigError::NonPositiveSizeMax(v) => {
                write!(f, "maximum particle size must be positive, got {}", v)
            }
            ConfigError::EmptyPalette => {
                write!(f, "palette must contain at least one color")
            }
            ConfigError::NonPositiveThreshold(v) => {
                write!(f, "link threshold must be positive, got {}", v)
            }
            ConfigError::ZeroScanLimit => {
                write!(f, "link scan limit must be at least 1")
            }
            ConfigError::ZeroSegmentCapacity => {
                write!(f, "segment capacity must be at least 1")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors that can occur during GPU initialization.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(f, "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            GpuError::NoAdapter => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors that can occur when running a backdrop window.
#[derive(Debug)]
pub enum BackdropError {
    /// Invalid field or linker parameters.
    Config(ConfigError),
    /// Failed to create event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
}

impl fmt::Display for BackdropError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackdropError::Config(e) => write!(f, "Invalid configuration: {}", e),
            BackdropError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            BackdropError::Window(e) => write!(f, "Failed to create window: {}", e),
            BackdropError::Gpu(e) => write!(f, "GPU error: {}", e),
        }
    }
}

impl std::error::Error for BackdropError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BackdropError::Config(e) => Some(e),
            BackdropError::EventLoop(e) => Some(e),
            BackdropError::Window(e) => Some(e),
            BackdropError::Gpu(e) => Some(e),
        }
    }
}

impl From<ConfigError> for BackdropError {
    fn from(e: ConfigError) -> Self {
        BackdropError::Config(e)
    }
}

impl From<winit::error::EventLoopError> for BackdropError {
    fn from(e: winit::error::EventLoopError) -> Self {
        BackdropError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for BackdropError {
    fn from(e: winit::error::OsError) -> Self {
        BackdropError::Window(e)
    }
}

impl From<GpuError> for BackdropError {
    fn from(e: GpuError) -> Self {
        BackdropError::Gpu(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let msg = ConfigError::NonPositiveThreshold(-1.5).to_string();
        assert!(msg.contains("-1.5"));
        assert!(ConfigError::EmptyPalette.to_string().contains("palette"));
    }

    #[test]
    fn test_backdrop_error_wraps_config() {
        let err: BackdropError = ConfigError::ZeroScanLimit.into();
        assert!(matches!(err, BackdropError::Config(ConfigError::ZeroScanLimit)));
    }
}
