//! Error type for everything that can fail while bringing a hex field up.
//!
//! Only construction can fail. Once a [`HexField`](crate::HexField) exists, every
//! per-frame operation is total: grid generation, matrix construction and the
//! proximity lift never return errors, and surface hiccups just skip a frame.

use thiserror::Error;

/// Fatal construction-time failures.
#[derive(Error, Debug)]
pub enum HexError {
    /// The window surface could not be created.
    #[error("failed to create rendering surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    /// No GPU adapter can present to the window.
    #[error("no compatible GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    /// The adapter refused to hand out a device.
    #[error("failed to create GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    /// Shader compilation or pipeline linking failed validation.
    #[error("shader compilation failed: {0}")]
    Shader(String),
    /// The OS refused to create the window.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// The event loop could not start or exited abnormally.
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}
