//! Window and event-loop host for a [`HexField`].

use std::sync::Arc;

use glam::Vec2;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::config::HexConfig;
use crate::error::HexError;
use crate::field::HexField;
use crate::gpu::GpuContext;

/// Run a hex field in a window with the default configuration.
///
/// Blocks until the window is closed.
///
/// # Example
/// ```no_run
/// hexfield::run().unwrap();
/// ```
pub fn run() -> Result<(), HexError> {
    run_with_config(HexConfig::default())
}

/// Run a hex field in a window with custom configuration.
///
/// # Example
/// ```no_run
/// use hexfield::HexConfig;
///
/// hexfield::run_with_config(
///     HexConfig::new().title("Honeycomb").size(1280, 720).shadow_pass(true),
/// )
/// .unwrap();
/// ```
pub fn run_with_config(config: HexConfig) -> Result<(), HexError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = HexApp::Pending { config };
    event_loop.run_app(&mut app)?;
    Ok(())
}

enum HexApp {
    Pending {
        config: HexConfig,
    },
    Running {
        window: Arc<Window>,
        gpu: GpuContext,
        field: HexField,
    },
    /// GPU setup failed. The window stays open but nothing is drawn.
    Inert {
        _window: Arc<Window>,
    },
}

impl HexApp {
    fn start(window: Arc<Window>, config: &HexConfig) -> Result<Self, HexError> {
        let gpu = GpuContext::new(window.clone())?;
        let field = HexField::new(&gpu, config.clone())?;
        Ok(HexApp::Running { window, gpu, field })
    }
}

impl ApplicationHandler for HexApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let HexApp::Pending { config } = self else {
            return;
        };

        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("{}", HexError::from(e));
                event_loop.exit();
                return;
            }
        };

        *self = match HexApp::start(window.clone(), config) {
            Ok(running) => {
                window.request_redraw();
                running
            }
            Err(e) => {
                log::error!("hex field unavailable: {e}");
                HexApp::Inert { _window: window }
            }
        };
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let WindowEvent::CloseRequested = event {
            event_loop.exit();
            return;
        }

        let HexApp::Running { window, gpu, field } = self else {
            return;
        };

        match event {
            WindowEvent::Resized(size) => {
                field.resize(gpu, size.width, size.height);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let inner = window.inner_size();
                field.pointer_moved(
                    Vec2::new(position.x as f32, position.y as f32),
                    Vec2::new(inner.width as f32, inner.height as f32),
                );
            }
            WindowEvent::CursorLeft { .. } => {
                field.pointer_left();
            }
            WindowEvent::RedrawRequested => {
                field.render(gpu);
                window.request_redraw();
            }
            _ => {}
        }
    }
}
