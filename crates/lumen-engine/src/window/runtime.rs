use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowId};

use crate::backend::{BackgroundParams, Device, Presented, WindowBackend};
use crate::config::WindowConfig;
use crate::core::{EventQueue, LoopEvent};
use crate::device::{read_texture_rgba, Gpu, GpuFrame, GpuInit, SurfaceErrorAction};
use crate::error::{BackendError, BackendResult};
use crate::input::platform::winit::translate_window_event;
use crate::input::{InputFrame, InputState, PointerState};
use crate::render::{BackgroundRenderer, CanvasList, CanvasRenderer, RenderCtx, RenderTarget};

/// Pumps allowed while waiting for the platform to hand out the window.
const STARTUP_PUMPS: usize = 200;

/// Longest wait for events while there is no surface to present to.
const IDLE_PUMP: Duration = Duration::from_millis(16);

/// Pump timeout for the current surface size.
///
/// Presentation paces the loop while the window is drawable; a minimised
/// window never presents, so the pump has to wait instead.
fn pump_timeout(width: u32, height: u32) -> Duration {
    if width == 0 || height == 0 {
        IDLE_PUMP
    } else {
        Duration::ZERO
    }
}

/// winit window plus the wgpu device presenting into it.
///
/// The event loop is pumped once per tick instead of owning the thread, so the
/// presentation loop keeps control of frame order.
pub struct NativeWindow {
    // Field order is drop order: GPU objects go before the window and loop.
    background: BackgroundRenderer,
    canvas: CanvasRenderer,
    frame: Option<GpuFrame>,
    last_frame: Option<wgpu::Texture>,
    gpu: Gpu,
    handler: Handler,
    event_loop: EventLoop<()>,
}

/// `ApplicationHandler` side: window creation and event translation.
struct Handler {
    config: WindowConfig,
    window: Option<Arc<Window>>,
    creation_error: Option<winit::error::OsError>,
    input: InputState,
    input_frame: InputFrame,
    pending: Vec<LoopEvent>,
    resized: Option<PhysicalSize<u32>>,
}

impl NativeWindow {
    /// Creates the window and the device. Blocks until both exist.
    pub fn new(config: &WindowConfig) -> Result<Self> {
        let mut event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut handler = Handler {
            config: config.clone(),
            window: None,
            creation_error: None,
            input: InputState::default(),
            input_frame: InputFrame::default(),
            pending: Vec::new(),
            resized: None,
        };

        for _ in 0..STARTUP_PUMPS {
            if handler.window.is_some() {
                break;
            }
            if let Some(err) = handler.creation_error.take() {
                return Err(err).context("failed to create window");
            }
            if let PumpStatus::Exit(code) =
                event_loop.pump_app_events(Some(Duration::from_millis(5)), &mut handler)
            {
                anyhow::bail!("event loop exited during startup (code {code})");
            }
        }
        let window = handler
            .window
            .clone()
            .context("platform did not create the window")?;

        let gpu_init = GpuInit {
            vsync: config.vsync,
            ..GpuInit::default()
        };
        let gpu = pollster::block_on(Gpu::new(window, gpu_init))
            .context("GPU initialization failed for window")?;

        log::info!("window \"{}\" ready on {}", config.title, gpu.adapter_name());

        Ok(Self {
            background: BackgroundRenderer::new(),
            canvas: CanvasRenderer::new(),
            frame: None,
            last_frame: None,
            gpu,
            handler,
            event_loop,
        })
    }

    pub fn gpu(&self) -> &Gpu {
        &self.gpu
    }

    pub fn device(&self) -> &wgpu::Device {
        self.gpu.device()
    }

    pub fn queue(&self) -> &wgpu::Queue {
        self.gpu.queue()
    }

    /// Draws `list` into the open window target. No-op for a skipped frame.
    pub fn draw_canvas(&mut self, list: &CanvasList) -> BackendResult<()> {
        let Some(frame) = self.frame.as_mut() else {
            return Ok(());
        };
        let ctx = RenderCtx::new(self.gpu.device(), self.gpu.queue(), self.gpu.surface_format());
        let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
        self.canvas.render(&ctx, &mut target, list);
        Ok(())
    }

    fn apply_resize(&mut self) {
        if let Some(size) = self.handler.resized.take() {
            // A frame acquired at the old size must not be presented.
            self.frame = None;
            self.gpu.resize(size);
        }
    }

    /// Keeps a copy of the surface so it can be read back after present.
    fn keep_last_frame(&mut self) {
        if !self.gpu.surface_readable() {
            return;
        }
        let Some(frame) = self.frame.as_mut() else { return };
        let source = &frame.surface_texture.texture;

        let stale = self.last_frame.as_ref().is_none_or(|t| {
            t.width() != source.width() || t.height() != source.height() || t.format() != source.format()
        });
        if stale {
            self.last_frame = Some(self.gpu.device().create_texture(&wgpu::TextureDescriptor {
                label: Some("lumen last frame"),
                size: source.size(),
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: source.format(),
                usage: wgpu::TextureUsages::COPY_DST | wgpu::TextureUsages::COPY_SRC,
                view_formats: &[],
            }));
        }
        let Some(last) = self.last_frame.as_ref() else { return };

        frame
            .encoder
            .copy_texture_to_texture(source.as_image_copy(), last.as_image_copy(), source.size());
    }
}

impl Device for NativeWindow {
    type Compute = wgpu::CommandEncoder;
    type Texture = wgpu::TextureView;

    fn create_compute(&self) -> Self::Compute {
        self.gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("lumen compute encoder"),
            })
    }

    fn submit_compute(&self, compute: Self::Compute) {
        self.gpu.queue().submit(std::iter::once(compute.finish()));
    }
}

impl WindowBackend for NativeWindow {
    fn pixel_size(&self) -> (u32, u32) {
        let size = self.gpu.size();
        (size.width, size.height)
    }

    fn pump_events(&mut self, events: &mut EventQueue) {
        self.handler.input_frame.clear();
        let size = self.gpu.size();
        let timeout = pump_timeout(size.width, size.height);
        let status = self
            .event_loop
            .pump_app_events(Some(timeout), &mut self.handler);
        events.extend(self.handler.pending.drain(..));
        events.extend(self.handler.input_frame.keys_pressed.iter().copied().map(LoopEvent::Key));
        if let PumpStatus::Exit(_) = status {
            events.push(LoopEvent::CloseRequested);
        }
        self.apply_resize();
    }

    fn pointer(&self) -> PointerState {
        self.handler.input.pointer()
    }

    fn canvas_scale(&self) -> f32 {
        self.handler
            .window
            .as_ref()
            .map_or(1.0, |w| w.scale_factor() as f32)
    }

    fn begin_frame(&mut self) -> bool {
        if self.gpu.is_lost() {
            return false;
        }
        self.frame = None;

        // One retry after a reconfigure; anything transient skips the frame.
        for _ in 0..2 {
            match self.gpu.begin_frame() {
                Ok(frame) => {
                    self.frame = Some(frame);
                    return true;
                }
                Err(err) => match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Reconfigured => continue,
                    SurfaceErrorAction::SkipFrame => {
                        log::debug!("surface not ready; skipping frame");
                        return true;
                    }
                    SurfaceErrorAction::Fatal => {
                        log::error!("surface acquisition failed fatally");
                        return false;
                    }
                },
            }
        }
        true
    }

    fn begin_target(&mut self) -> BackendResult<()> {
        let Some(frame) = self.frame.as_mut() else {
            return Ok(());
        };
        let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
        target.clear_pass("lumen target clear", wgpu::Color::BLACK);
        Ok(())
    }

    fn draw_background(&mut self, params: &BackgroundParams) -> BackendResult<()> {
        let Some(frame) = self.frame.as_mut() else {
            return Ok(());
        };
        let ctx = RenderCtx::new(self.gpu.device(), self.gpu.queue(), self.gpu.surface_format());
        let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
        self.background.render(&ctx, &mut target, params);
        Ok(())
    }

    fn end_target(&mut self) -> BackendResult<()> {
        self.keep_last_frame();
        Ok(())
    }

    fn present(&mut self) -> Presented {
        let frame = self.frame.take();
        let shown = frame.is_some();
        if let Some(frame) = frame {
            self.gpu.submit(frame);
        }
        match (self.gpu.is_lost(), shown) {
            (true, _) => Presented::Failed,
            (false, true) => Presented::Shown,
            (false, false) => Presented::Skipped,
        }
    }

    fn check(&mut self) -> bool {
        !self.gpu.is_lost()
    }

    fn capture_screenshot(&mut self, path: &Path) -> BackendResult<()> {
        let texture = self
            .last_frame
            .as_ref()
            .ok_or_else(|| BackendError::Device("no readable frame has been presented".into()))?;
        let image = read_texture_rgba(self.gpu.device(), self.gpu.queue(), texture)?;
        image
            .save(path)
            .map_err(|err| BackendError::Other(anyhow::Error::new(err).context(format!("saving {}", path.display()))))?;
        Ok(())
    }

    fn finish(&mut self) {
        self.frame = None;
        self.gpu.wait_idle();
        if let Some(window) = self.handler.window.as_ref() {
            window.set_visible(false);
        }
    }
}

impl ApplicationHandler for Handler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Poll);
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));

        match event_loop.create_window(attrs) {
            Ok(window) => self.window = Some(Arc::new(window)),
            Err(err) => self.creation_error = Some(err),
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if let Some(ev) = translate_window_event(&self.input, &event) {
            self.input.apply_event(&mut self.input_frame, ev);
        }

        match event {
            WindowEvent::CloseRequested => self.pending.push(LoopEvent::CloseRequested),
            WindowEvent::Resized(size) => {
                self.resized = Some(size);
                self.pending.push(LoopEvent::WindowResized {
                    width: size.width,
                    height: size.height,
                });
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(window) = self.window.as_ref() {
                    self.resized = Some(window.inner_size());
                }
            }
            _ => {}
        }
    }
}
