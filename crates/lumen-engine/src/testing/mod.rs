//! Instrumented bindings for orchestration tests.
//!
//! Every mock records its calls into a shared `Journal`, so tests can assert
//! on the exact interleaving of window, scene, render and UI work.

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::backend::{
    BackgroundParams, Device, FrameTargets, Presented, RenderBackend, SceneBackend, UiBackend, WindowBackend,
};
use crate::core::{EventQueue, LoopEvent, UiEvent};
use crate::error::{BackendError, BackendResult};
use crate::input::PointerState;
use crate::overlay::ButtonMask;
use crate::pipeline::Stage;
use crate::scene::{MaterialId, Scene};
use crate::streaming::{AsyncContext, StreamSource};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    PumpEvents,
    BeginFrame,
    BeginTarget,
    DrawBackground { color: [f32; 4] },
    EndTarget,
    Present,
    Check,
    Finish,
    Screenshot(PathBuf),

    CreateCompute(u32),
    SubmitCompute(u32),

    CommitScene { dirty: usize },
    SceneUpdate,
    SceneDispatch(u32),
    SceneFlush,
    SceneTerminate,
    SceneClear,

    RenderUpdate,
    CreateTargets { width: u32, height: u32 },
    DispatchSpatial(u32),
    DispatchObjects(u32),
    DispatchRenderer(u32),
    RenderFlush,
    TargetsFlush,
    DrawDeferred,
    DispatchLight(u32),
    DispatchOccluder(u32),
    DispatchLuminance(u32),
    DispatchComposite(u32),

    UiBackground { texture: u32, flip_y: bool },
    UiViewport { width: f32, height: f32 },
    UiMouse { x: f32, y: f32, buttons: ButtonMask },
    UiUpdate,
    UiRasterize,
    UiDrawCanvas,

    Dropped(&'static str),
}

impl Call {
    /// Compute or draw stage this call belongs to, if any.
    pub fn gpu_stage(&self) -> Option<Stage> {
        Some(match self {
            Call::SceneDispatch(_) => Stage::SceneCompute,
            Call::DispatchSpatial(_) => Stage::SpatialCompute,
            Call::DispatchObjects(_) => Stage::ObjectCompute,
            Call::DispatchRenderer(_) => Stage::RendererCompute,
            Call::DrawDeferred => Stage::DeferredDraw,
            Call::DispatchLight(_) => Stage::LightCompute,
            Call::DispatchOccluder(_) => Stage::OccluderCompute,
            Call::DispatchLuminance(_) => Stage::LuminanceCompute,
            Call::DispatchComposite(_) => Stage::CompositeCompute,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<Call>>>);

impl Journal {
    pub fn push(&self, call: Call) {
        self.0.borrow_mut().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn count(&self, call: &Call) -> usize {
        self.0.borrow().iter().filter(|c| *c == call).count()
    }

    pub fn count_matching(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.0.borrow().iter().filter(|c| pred(c)).count()
    }

    pub fn position(&self, call: &Call) -> Option<usize> {
        self.0.borrow().iter().position(|c| c == call)
    }
}

// ── device ────────────────────────────────────────────────────────────────

pub struct MockDevice {
    journal: Journal,
    next_compute: Cell<u32>,
}

impl MockDevice {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            next_compute: Cell::new(0),
        }
    }
}

impl Device for MockDevice {
    type Compute = u32;
    type Texture = u32;

    fn create_compute(&self) -> u32 {
        let id = self.next_compute.get();
        self.next_compute.set(id + 1);
        self.journal.push(Call::CreateCompute(id));
        id
    }

    fn submit_compute(&self, compute: u32) {
        self.journal.push(Call::SubmitCompute(compute));
    }
}

// ── window ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum Scripted {
    Resize(u32, u32),
    Event(LoopEvent),
}

pub struct MockWindow {
    device: MockDevice,
    journal: Journal,
    pub size: (u32, u32),
    pub pointer: PointerState,
    pub begin_ok: bool,
    pub present: Presented,
    pub check_fails_at: Option<u64>,
    script: Vec<(u64, Scripted)>,
    pumps: u64,
    checks: u64,
}

impl MockWindow {
    pub fn new(journal: Journal, size: (u32, u32)) -> Self {
        Self {
            device: MockDevice::new(journal.clone()),
            journal,
            size,
            pointer: PointerState::default(),
            begin_ok: true,
            present: Presented::Shown,
            check_fails_at: None,
            script: Vec::new(),
            pumps: 0,
            checks: 0,
        }
    }

    /// Applies `action` during the `pump`-th call to `pump_events` (0-based).
    pub fn at(mut self, pump: u64, action: Scripted) -> Self {
        self.script.push((pump, action));
        self
    }
}

impl Device for MockWindow {
    type Compute = u32;
    type Texture = u32;

    fn create_compute(&self) -> u32 {
        self.device.create_compute()
    }

    fn submit_compute(&self, compute: u32) {
        self.device.submit_compute(compute)
    }
}

impl WindowBackend for MockWindow {
    fn pixel_size(&self) -> (u32, u32) {
        self.size
    }

    fn pump_events(&mut self, events: &mut EventQueue) {
        self.journal.push(Call::PumpEvents);
        let pump = self.pumps;
        self.pumps += 1;
        for (_, action) in self.script.iter().filter(|(at, _)| *at == pump) {
            match action {
                Scripted::Resize(w, h) => {
                    self.size = (*w, *h);
                    events.push(LoopEvent::WindowResized { width: *w, height: *h });
                }
                Scripted::Event(ev) => events.push(ev.clone()),
            }
        }
    }

    fn pointer(&self) -> PointerState {
        self.pointer
    }

    fn canvas_scale(&self) -> f32 {
        1.0
    }

    fn begin_frame(&mut self) -> bool {
        self.journal.push(Call::BeginFrame);
        self.begin_ok
    }

    fn begin_target(&mut self) -> BackendResult<()> {
        self.journal.push(Call::BeginTarget);
        Ok(())
    }

    fn draw_background(&mut self, params: &BackgroundParams) -> BackendResult<()> {
        self.journal.push(Call::DrawBackground { color: params.color });
        Ok(())
    }

    fn end_target(&mut self) -> BackendResult<()> {
        self.journal.push(Call::EndTarget);
        Ok(())
    }

    fn present(&mut self) -> Presented {
        self.journal.push(Call::Present);
        self.present
    }

    fn check(&mut self) -> bool {
        self.journal.push(Call::Check);
        let n = self.checks;
        self.checks += 1;
        self.check_fails_at != Some(n)
    }

    fn capture_screenshot(&mut self, path: &Path) -> BackendResult<()> {
        self.journal.push(Call::Screenshot(path.to_path_buf()));
        Ok(())
    }

    fn finish(&mut self) {
        self.journal.push(Call::Finish);
    }
}

impl Drop for MockWindow {
    fn drop(&mut self) {
        self.journal.push(Call::Dropped("window"));
    }
}

// ── scene ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MockStream {
    pub calls: AtomicU64,
    pub terminated: AtomicBool,
}

impl StreamSource for MockStream {
    fn process(&self, _async_ctx: &mut AsyncContext) -> BackendResult<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(false)
    }

    fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }
}

pub struct MockScene {
    journal: Journal,
    stream: Arc<MockStream>,
    pub fail_commit: bool,
    pub fail_update: bool,
}

impl MockScene {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            stream: Arc::new(MockStream::default()),
            fail_commit: false,
            fail_update: false,
        }
    }

    pub fn stream(&self) -> Arc<MockStream> {
        self.stream.clone()
    }
}

impl<D: Device<Compute = u32>> SceneBackend<D> for MockScene {
    fn stream_source(&self) -> Arc<dyn StreamSource> {
        self.stream.clone()
    }

    fn commit_scene(
        &mut self,
        _device: &D,
        _scene: &Scene,
        dirty: &[MaterialId],
        _async_ctx: &mut AsyncContext,
    ) -> BackendResult<()> {
        self.journal.push(Call::CommitScene { dirty: dirty.len() });
        if self.fail_commit {
            return Err(BackendError::Update("scene commit rejected".into()));
        }
        Ok(())
    }

    fn update(&mut self, _device: &D, _async_ctx: &mut AsyncContext) -> BackendResult<()> {
        self.journal.push(Call::SceneUpdate);
        if self.fail_update {
            return Err(BackendError::Update("manager update rejected".into()));
        }
        Ok(())
    }

    fn dispatch(&mut self, _device: &D, compute: &mut u32, _scene: &Scene) {
        self.journal.push(Call::SceneDispatch(*compute));
    }

    fn flush(&mut self, _device: &D) {
        self.journal.push(Call::SceneFlush);
    }

    fn terminate(&mut self) {
        self.stream.terminated.store(true, Ordering::SeqCst);
        self.journal.push(Call::SceneTerminate);
    }

    fn clear(&mut self) {
        self.journal.push(Call::SceneClear);
    }
}

impl Drop for MockScene {
    fn drop(&mut self) {
        self.journal.push(Call::Dropped("scene backend"));
    }
}

// ── render ────────────────────────────────────────────────────────────────

pub struct MockTargets {
    journal: Journal,
    size: (u32, u32),
    texture: u32,
}

impl<D: Device<Texture = u32>> FrameTargets<D> for MockTargets {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn flush(&mut self, _device: &D) {
        self.journal.push(Call::TargetsFlush);
    }

    fn composite_texture(&self) -> u32 {
        self.texture
    }
}

impl Drop for MockTargets {
    fn drop(&mut self) {
        self.journal.push(Call::Dropped("targets"));
    }
}

pub struct MockRender {
    journal: Journal,
    pub fail_create: bool,
    pub flipped: bool,
    created: u32,
}

impl MockRender {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            fail_create: false,
            flipped: false,
            created: 0,
        }
    }
}

impl<D: Device<Compute = u32, Texture = u32>> RenderBackend<D> for MockRender {
    type Targets = MockTargets;

    fn update(&mut self) {
        self.journal.push(Call::RenderUpdate);
    }

    fn create_targets(&mut self, _device: &D, width: u32, height: u32) -> BackendResult<MockTargets> {
        self.journal.push(Call::CreateTargets { width, height });
        if self.fail_create {
            return Err(BackendError::Creation {
                what: "frame targets",
                reason: "out of memory".into(),
            });
        }
        self.created += 1;
        Ok(MockTargets {
            journal: self.journal.clone(),
            size: (width, height),
            texture: 100 + self.created,
        })
    }

    fn dispatch_spatial(&mut self, compute: &mut u32, _targets: &mut MockTargets, _scene: &Scene) {
        self.journal.push(Call::DispatchSpatial(*compute));
    }

    fn dispatch_objects(&mut self, compute: &mut u32, _targets: &mut MockTargets, _scene: &Scene) {
        self.journal.push(Call::DispatchObjects(*compute));
    }

    fn dispatch_renderer(&mut self, compute: &mut u32, _targets: &mut MockTargets, _scene: &Scene) {
        self.journal.push(Call::DispatchRenderer(*compute));
    }

    fn flush(&mut self, _device: &D) {
        self.journal.push(Call::RenderFlush);
    }

    fn draw_deferred(&mut self, _device: &D, _targets: &mut MockTargets) {
        self.journal.push(Call::DrawDeferred);
    }

    fn dispatch_light(&mut self, _device: &D, compute: &mut u32, _targets: &mut MockTargets) {
        self.journal.push(Call::DispatchLight(*compute));
    }

    fn dispatch_occluder(&mut self, _device: &D, compute: &mut u32, _targets: &mut MockTargets) {
        self.journal.push(Call::DispatchOccluder(*compute));
    }

    fn dispatch_luminance(&mut self, _device: &D, compute: &mut u32, _targets: &mut MockTargets) {
        self.journal.push(Call::DispatchLuminance(*compute));
    }

    fn dispatch_composite(&mut self, _device: &D, compute: &mut u32, _targets: &mut MockTargets) {
        self.journal.push(Call::DispatchComposite(*compute));
    }

    fn is_target_flipped(&self) -> bool {
        self.flipped
    }
}

impl Drop for MockRender {
    fn drop(&mut self) {
        self.journal.push(Call::Dropped("render"));
    }
}

// ── ui ────────────────────────────────────────────────────────────────────

/// UI root whose layout needs `settle` extra passes after every viewport change.
pub struct MockUi {
    journal: Journal,
    settle: u32,
    remaining: u32,
    viewport: (f32, f32),
    mouse: (f32, f32),
    pub pending: Vec<UiEvent>,
}

impl MockUi {
    pub fn new(journal: Journal, settle: u32) -> Self {
        Self {
            journal,
            settle,
            remaining: settle,
            viewport: (0.0, 0.0),
            mouse: (0.0, 0.0),
            pending: Vec::new(),
        }
    }

    pub fn layout(&self) -> (f32, f32, f32, f32) {
        (self.viewport.0, self.viewport.1, self.mouse.0, self.mouse.1)
    }
}

impl<D: Device<Texture = u32>> UiBackend<D> for MockUi {
    fn set_viewport(&mut self, width: f32, height: f32) {
        self.journal.push(Call::UiViewport { width, height });
        self.viewport = (width, height);
        self.remaining = self.settle;
    }

    fn set_mouse(&mut self, x: f32, y: f32, buttons: ButtonMask) {
        self.journal.push(Call::UiMouse { x, y, buttons });
        self.mouse = (x, y);
    }

    fn set_background(&mut self, texture: u32, _scale: [f32; 2], flip_y: bool) {
        self.journal.push(Call::UiBackground { texture, flip_y });
    }

    fn update(&mut self, _scale: f32) -> bool {
        self.journal.push(Call::UiUpdate);
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }

    fn rasterize(&mut self, _device: &D) -> BackendResult<()> {
        self.journal.push(Call::UiRasterize);
        Ok(())
    }

    fn draw_canvas(&mut self, _device: &mut D) -> BackendResult<()> {
        self.journal.push(Call::UiDrawCanvas);
        Ok(())
    }

    fn drain_events(&mut self, events: &mut EventQueue) {
        events.extend(self.pending.drain(..).map(LoopEvent::Ui));
    }
}

impl Drop for MockUi {
    fn drop(&mut self) {
        self.journal.push(Call::Dropped("ui"));
    }
}
