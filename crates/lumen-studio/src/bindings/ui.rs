use lumen_engine::backend::UiBackend;
use lumen_engine::core::{EventQueue, LoopEvent, UiEvent};
use lumen_engine::error::BackendResult;
use lumen_engine::overlay::ButtonMask;
use lumen_engine::render::{CanvasImage, CanvasList};
use lumen_engine::window::NativeWindow;

use crate::ui::Panel;

pub use crate::ui::WidgetIds;

#[derive(Debug, Copy, Clone, PartialEq)]
struct MouseSample {
    x: f32,
    y: f32,
    buttons: ButtonMask,
}

/// Overlay binding: one dialog over the composited scene.
pub struct StudioUi {
    panel: Panel,
    viewport: [f32; 2],
    mouse: Option<MouseSample>,
    scale: f32,
    background: Option<CanvasImage>,
    canvas: CanvasList,
    events: Vec<UiEvent>,
}

impl StudioUi {
    pub fn new(title: impl Into<String>, color: [f32; 3]) -> Self {
        Self {
            panel: Panel::new(title, WidgetIds::default(), color),
            viewport: [0.0, 0.0],
            mouse: None,
            scale: 1.0,
            background: None,
            canvas: CanvasList::default(),
            events: Vec::new(),
        }
    }

    pub fn ids(&self) -> WidgetIds {
        self.panel.ids()
    }

    fn build_canvas(&mut self) {
        self.canvas.clear();
        self.canvas.viewport = self.viewport;
        self.canvas.image = self.background.clone();
        self.panel.rasterize(&mut self.canvas);
    }
}

impl UiBackend<NativeWindow> for StudioUi {
    fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = [width, height];
    }

    fn set_mouse(&mut self, x: f32, y: f32, buttons: ButtonMask) {
        self.mouse = Some(MouseSample { x, y, buttons });
    }

    fn set_background(&mut self, texture: wgpu::TextureView, scale: [f32; 2], flip_y: bool) {
        self.background = Some(CanvasImage {
            view: texture,
            scale,
            flip_y,
        });
    }

    fn update(&mut self, scale: f32) -> bool {
        if scale != self.scale {
            log::debug!("ui canvas scale {} -> {}", self.scale, scale);
            self.scale = scale;
        }
        let mut changed = self.panel.layout(self.viewport);
        // The pointer sample is consumed by the first pass only.
        if let Some(mouse) = self.mouse.take() {
            self.panel.input(mouse.x, mouse.y, mouse.buttons, &mut self.events);
            changed |= self.panel.layout(self.viewport);
        }
        changed
    }

    fn rasterize(&mut self, _device: &NativeWindow) -> BackendResult<()> {
        self.build_canvas();
        Ok(())
    }

    fn draw_canvas(&mut self, device: &mut NativeWindow) -> BackendResult<()> {
        device.draw_canvas(&self.canvas)
    }

    fn drain_events(&mut self, events: &mut EventQueue) {
        events.extend(self.events.drain(..).map(LoopEvent::Ui));
    }
}
