//! Error types for plexus.
//!
//! This module provides error types for field configuration, GPU
//! initialization, and running the windowed host.

use std::fmt;

/// Errors raised while building or re-initializing a particle field.
///
/// All of these are fatal for the operation that produced them: a field is
/// never constructed in a half-configured state.
#[derive(Debug)]
pub enum ConfigError {
    /// The drawing surface is missing or has a zero dimension.
    ZeroSurface { width: u32, height: u32 },
    /// Connection distance must be a finite positive number.
    InvalidConnectionDistance(f32),
    /// Grid cell size must be a finite positive number.
    InvalidCellSize(f32),
    /// Quad-tree nodes must hold at least one point.
    ZeroCapacity,
    /// Pointer radius bounds are inverted or negative.
    InvalidPointerRadius { min: f32, max: f32 },
    /// An opacity value lies outside `[0, 1]`.
    InvalidOpacity(f32),
    /// Repel distance must be positive and no larger than the connection distance.
    InvalidRepelDistance { distance: f32, connection_distance: f32 },
    /// A size, speed or factor is negative, NaN or infinite.
    InvalidParameter { name: &'static str, value: f32 },
    /// An explicit particle count above [`MAX_PARTICLES`](crate::config::MAX_PARTICLES).
    TooManyParticles(usize),
    /// Failed to read a configuration file.
    Io(std::io::Error),
    /// Failed to parse a configuration file.
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroSurface { width, height } => write!(
                f,
                "Drawing surface unavailable: {}x{} has no drawable area",
                width, height
            ),
            ConfigError::InvalidConnectionDistance(d) => {
                write!(f, "Connection distance must be positive, got {}", d)
            }
            ConfigError::InvalidCellSize(s) => write!(f, "Grid cell size must be positive, got {}", s),
            ConfigError::ZeroCapacity => write!(f, "Quad-tree capacity must be at least 1"),
            ConfigError::InvalidPointerRadius { min, max } => write!(
                f,
                "Pointer radius bounds are invalid: min {} max {}",
                min, max
            ),
            ConfigError::InvalidOpacity(o) => write!(f, "Opacity must lie in [0, 1], got {}", o),
            ConfigError::InvalidRepelDistance {
                distance,
                connection_distance,
            } => write!(
                f,
                "Repel distance {} must be positive and at most the connection distance {}",
                distance, connection_distance
            ),
            ConfigError::InvalidParameter { name, value } => {
                write!(f, "{} must be a finite non-negative number, got {}", name, value)
            }
            ConfigError::TooManyParticles(n) => write!(
                f,
                "Particle count {} exceeds the limit of {}",
                n,
                crate::config::MAX_PARTICLES
            ),
            ConfigError::Io(e) => write!(f, "Failed to read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "Failed to parse config file: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

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

/// Errors that can occur when running the windowed host or exporting frames.
#[derive(Debug)]
pub enum RunError {
    /// Failed to create event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
    /// The field could not be configured.
    Config(ConfigError),
    /// Failed to encode or write an image.
    Image(image::ImageError),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            RunError::Window(e) => write!(f, "Failed to create window: {}", e),
            RunError::Gpu(e) => write!(f, "GPU error: {}", e),
            RunError::Config(e) => write!(f, "Configuration error: {}", e),
            RunError::Image(e) => write!(f, "Image export failed: {}", e),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunError::EventLoop(e) => Some(e),
            RunError::Window(e) => Some(e),
            RunError::Gpu(e) => Some(e),
            RunError::Config(e) => Some(e),
            RunError::Image(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for RunError {
    fn from(e: winit::error::EventLoopError) -> Self {
        RunError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for RunError {
    fn from(e: winit::error::OsError) -> Self {
        RunError::Window(e)
    }
}

impl From<GpuError> for RunError {
    fn from(e: GpuError) -> Self {
        RunError::Gpu(e)
    }
}

impl From<ConfigError> for RunError {
    fn from(e: ConfigError) -> Self {
        RunError::Config(e)
    }
}

impl From<image::ImageError> for RunError {
    fn from(e: image::ImageError) -> Self {
        RunError::Image(e)
    }
}
