use std::path::PathBuf;

use crate::backend::{
    BackgroundParams, FrameTargets, Presented, RenderBackend, SceneBackend, UiBackend, WindowBackend,
};
use crate::config::EngineConfig;
use crate::error::{FrameError, SetupError};
use crate::overlay::{OverlayFrame, UiOverlay};
use crate::pipeline::{Backends, CadenceBinding, DispatchPipeline, FrameInput, Stage};
use crate::scene::Scene;
use crate::streaming::{AsyncContext, Streamer, StreamerReport, TerminationFlag};
use crate::time::{CadenceTimer, Clock, FrameClock};

use super::{App, AppControl, EventQueue, LoopCtx};

/// Bindings and scene handed to the loop at construction.
pub struct LoopParts<W, S, R, U> {
    pub window: W,
    pub scene_backend: S,
    pub render: R,
    pub ui: U,
    pub scene: Scene,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

#[derive(Debug)]
pub enum StopReason {
    /// Close, Escape or an application `Exit`.
    Requested,
    /// The window could not begin a frame.
    NotRenderable,
    /// `max_frames` frames were presented.
    FrameLimit,
    Failed(FrameError),
}

#[derive(Debug)]
pub struct ShutdownReport {
    pub reason: StopReason,
    pub frames: u64,
    /// Tasks run by the final synchronous flush of the frame context.
    pub flushed_tasks: usize,
    pub streamer: StreamerReport,
}

/// Single per-refresh driver.
///
/// Owns every binding. Fields are declared in teardown order so that dropping
/// an unfinished loop still stops streaming first and releases the window last.
pub struct PresentationLoop<W, S, R, U, A>
where
    W: WindowBackend,
    S: SceneBackend<W>,
    R: RenderBackend<W>,
    U: UiBackend<W>,
    A: App,
{
    streamer: Option<Streamer>,
    scene: Scene,
    pipeline: DispatchPipeline<R::Targets>,
    render: R,
    scene_backend: S,
    ui: U,
    window: W,

    app: A,
    flag: TerminationFlag,
    frame_async: AsyncContext,
    overlay: UiOverlay,
    clock: Box<dyn Clock>,
    frame_clock: FrameClock,
    events: EventQueue,
    background: BackgroundParams,
    screenshot: Option<PathBuf>,
    max_frames: Option<u64>,
    presented: u64,
    stop: Option<StopReason>,
}

impl<W, S, R, U, A> PresentationLoop<W, S, R, U, A>
where
    W: WindowBackend,
    S: SceneBackend<W>,
    R: RenderBackend<W>,
    U: UiBackend<W>,
    A: App,
{
    /// Validates the configuration and starts the streaming thread. Nothing
    /// runs if any step fails.
    pub fn new(
        config: &EngineConfig,
        parts: LoopParts<W, S, R, U>,
        app: A,
        clock: Box<dyn Clock>,
    ) -> Result<Self, SetupError> {
        config.validate()?;

        let LoopParts {
            window,
            scene_backend,
            render,
            ui,
            scene,
        } = parts;

        let flag = TerminationFlag::new();
        let streamer = Streamer::spawn(
            scene_backend.stream_source(),
            AsyncContext::new("stream"),
            flag.clone(),
            &config.streamer,
        )?;

        let cadence = CadenceTimer::from_hz(config.cadence_hz, clock.seconds());
        log::info!(
            "presentation loop ready: cadence {} Hz, {} layout passes max",
            config.cadence_hz,
            config.overlay.max_layout_passes
        );

        Ok(Self {
            streamer: Some(streamer),
            scene,
            pipeline: DispatchPipeline::new(cadence),
            render,
            scene_backend,
            ui,
            window,
            app,
            flag,
            frame_async: AsyncContext::new("frame"),
            overlay: UiOverlay::new(&config.overlay),
            clock,
            frame_clock: FrameClock::new(),
            events: EventQueue::new(),
            background: BackgroundParams::default(),
            screenshot: None,
            max_frames: config.max_frames,
            presented: 0,
            stop: None,
        })
    }

    pub fn with_cadence_binding(mut self, binding: CadenceBinding) -> Self {
        self.pipeline.set_cadence_binding(Some(binding));
        self
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut W {
        &mut self.window
    }

    pub fn pipeline(&self) -> &DispatchPipeline<R::Targets> {
        &self.pipeline
    }

    pub fn background(&self) -> &BackgroundParams {
        &self.background
    }

    pub fn frames_presented(&self) -> u64 {
        self.presented
    }

    pub fn stop_reason(&self) -> Option<&StopReason> {
        self.stop.as_ref()
    }

    /// One refresh: events, dispatch, overlay, target pass, present, check.
    pub fn tick(&mut self) -> LoopState {
        if self.stop.is_some() {
            return LoopState::Stopped;
        }
        match self.frame() {
            Ok(None) => LoopState::Running,
            Ok(Some(reason)) => self.halt(reason),
            Err(err) => {
                log::error!("frame {} aborted: {err}", self.pipeline.frames());
                self.halt(StopReason::Failed(err))
            }
        }
    }

    /// Ticks until stopped, then shuts down.
    pub fn run(mut self) -> ShutdownReport {
        while self.tick() == LoopState::Running {}
        self.shutdown()
    }

    fn halt(&mut self, reason: StopReason) -> LoopState {
        log::info!("presentation loop stopping: {:?}", reason);
        self.stop = Some(reason);
        LoopState::Stopped
    }

    fn frame(&mut self) -> Result<Option<StopReason>, FrameError> {
        self.window.pump_events(&mut self.events);
        let time = self.frame_clock.tick(self.clock.as_ref());

        let mut exit = false;
        for event in self.events.drain() {
            let mut ctx = LoopCtx {
                time,
                background: &mut self.background,
                screenshot: &mut self.screenshot,
            };
            if self.app.on_event(&event, &mut ctx) == AppControl::Exit {
                exit = true;
            }
        }
        if exit {
            return Ok(Some(StopReason::Requested));
        }

        let window_size = self.window.pixel_size();
        if window_size.0 == 0 || window_size.1 == 0 {
            log::trace!("window has no drawable area, skipping frame");
            return Ok(None);
        }

        Stage::Begin.enter();
        if !self.window.begin_frame() {
            return Ok(Some(StopReason::NotRenderable));
        }

        let outcome = self.pipeline.run_frame(
            Backends {
                device: &self.window,
                scene: &mut self.scene_backend,
                render: &mut self.render,
            },
            &mut self.scene,
            &mut self.frame_async,
            FrameInput {
                time: time.now,
                window_size,
            },
            &mut self.events,
        )?;
        self.frame_async.pump(usize::MAX);

        let mut ctx = LoopCtx {
            time,
            background: &mut self.background,
            screenshot: &mut self.screenshot,
        };
        let exit = self.app.on_frame(&outcome, &mut ctx) == AppControl::Exit;

        Stage::Overlay.enter();
        let composite = self
            .pipeline
            .targets()
            .map(|t| t.composite_texture())
            .ok_or(FrameError::Rejected {
                stage: Stage::Overlay,
            })?;
        self.overlay
            .composite(
                &mut self.ui,
                &self.window,
                OverlayFrame {
                    window_size,
                    pointer: self.window.pointer(),
                    canvas_scale: self.window.canvas_scale(),
                    composite,
                    flip_y: self.render.is_target_flipped(),
                },
            )
            .map_err(FrameError::at(Stage::Overlay))?;
        self.ui.drain_events(&mut self.events);

        Stage::TargetPass.enter();
        self.background.animate(time.now as f32);
        self.window
            .begin_target()
            .map_err(FrameError::at(Stage::TargetPass))?;
        self.window
            .draw_background(&self.background)
            .map_err(FrameError::at(Stage::TargetPass))?;
        self.ui
            .draw_canvas(&mut self.window)
            .map_err(FrameError::at(Stage::TargetPass))?;
        self.window
            .end_target()
            .map_err(FrameError::at(Stage::TargetPass))?;

        Stage::Present.enter();
        let shown = match self.window.present() {
            Presented::Shown => true,
            Presented::Skipped => false,
            Presented::Failed => {
                return Err(FrameError::Rejected {
                    stage: Stage::Present,
                });
            }
        };

        // A pending screenshot waits for a frame that was actually shown.
        if shown {
            self.presented += 1;
            if let Some(path) = self.screenshot.take() {
                match self.window.capture_screenshot(&path) {
                    Ok(()) => log::info!("screenshot saved to {}", path.display()),
                    Err(err) => log::warn!("screenshot failed: {err}"),
                }
            }
        }

        Stage::DeviceCheck.enter();
        if !self.window.check() {
            return Err(FrameError::Rejected {
                stage: Stage::DeviceCheck,
            });
        }

        if exit {
            return Ok(Some(StopReason::Requested));
        }
        if self.max_frames.is_some_and(|max| self.presented >= max) {
            return Ok(Some(StopReason::FrameLimit));
        }
        Ok(None)
    }

    /// Stops streaming, flushes pending work and releases everything in
    /// reverse dependency order; the window goes last.
    pub fn shutdown(self) -> ShutdownReport {
        let PresentationLoop {
            streamer,
            mut scene,
            mut pipeline,
            render,
            mut scene_backend,
            ui,
            mut window,
            app,
            flag,
            mut frame_async,
            presented,
            stop,
            ..
        } = self;

        flag.set();
        scene_backend.terminate();

        scene.clear();
        scene_backend.clear();
        if let Err(err) = scene_backend.update(&window, &mut frame_async) {
            log::warn!("final scene update failed: {err}");
        }
        let flushed_tasks = frame_async.flush();
        window.finish();

        let streamer = streamer.map(Streamer::join).unwrap_or_default();

        drop(scene);
        drop(pipeline.release_targets());
        drop(pipeline);
        drop(render);
        drop(scene_backend);
        drop(ui);
        drop(app);
        drop(window);

        log::info!("done after {} frame(s)", presented);
        ShutdownReport {
            reason: stop.unwrap_or(StopReason::Requested),
            frames: presented,
            flushed_tasks,
            streamer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LoopEvent, UiEvent, WidgetId, SCREENSHOT_PATH};
    use crate::config::StreamerConfig;
    use crate::input::Key;
    use crate::pipeline::FrameOutcome;
    use crate::testing::{Call, Journal, MockRender, MockScene, MockStream, MockUi, MockWindow, Scripted};
    use crate::time::ManualClock;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    #[derive(Default)]
    struct Recorder {
        events: Vec<LoopEvent>,
        exit_after_frame: Option<u64>,
    }

    impl App for Recorder {
        fn on_event(&mut self, event: &LoopEvent, ctx: &mut LoopCtx<'_>) -> AppControl {
            self.events.push(event.clone());
            if let LoopEvent::Ui(UiEvent::SliderChanged { value, .. }) = event {
                ctx.background.color[0] = *value;
            }
            crate::core::default_event_handling(event, ctx)
        }

        fn on_frame(&mut self, outcome: &FrameOutcome, _ctx: &mut LoopCtx<'_>) -> AppControl {
            if self.exit_after_frame == Some(outcome.frame_index) {
                AppControl::Exit
            } else {
                AppControl::Continue
            }
        }
    }

    type TestLoop = PresentationLoop<MockWindow, MockScene, MockRender, MockUi, Recorder>;

    struct Rig {
        journal: Journal,
        clock: ManualClock,
        stream: Arc<MockStream>,
    }

    fn config(max_frames: Option<u64>) -> EngineConfig {
        EngineConfig {
            max_frames,
            streamer: StreamerConfig {
                backoff_us: 100,
                thread_name: "test-stream".into(),
            },
            ..EngineConfig::default()
        }
    }

    fn build(
        config: &EngineConfig,
        window: impl FnOnce(Journal) -> MockWindow,
        app: Recorder,
    ) -> (TestLoop, Rig) {
        let journal = Journal::default();
        let clock = ManualClock::new(0.0);
        let scene_backend = MockScene::new(journal.clone());
        let stream = scene_backend.stream();
        let parts = LoopParts {
            window: window(journal.clone()),
            scene_backend,
            render: MockRender::new(journal.clone()),
            ui: MockUi::new(journal.clone(), 1),
            scene: Scene::new(),
        };
        let lp = PresentationLoop::new(config, parts, app, Box::new(clock.clone())).unwrap();
        (lp, Rig { journal, clock, stream })
    }

    fn tick_n(lp: &mut TestLoop, rig: &Rig, n: usize) {
        for _ in 0..n {
            assert_eq!(lp.tick(), LoopState::Running);
            rig.clock.advance(1.0 / 60.0);
        }
    }

    // ── per-tick sequence ─────────────────────────────────────────────────

    #[test]
    fn tick_runs_stages_in_order() {
        let (mut lp, rig) = build(&config(None), |j| MockWindow::new(j, (640, 360)), Recorder::default());
        tick_n(&mut lp, &rig, 1);

        let calls = rig.journal.calls();
        let order = [
            Call::PumpEvents,
            Call::BeginFrame,
            Call::RenderUpdate,
            Call::CreateTargets { width: 640, height: 360 },
            Call::DispatchComposite(1),
            Call::UiBackground { texture: 101, flip_y: false },
            Call::UiRasterize,
            Call::BeginTarget,
            Call::DrawBackground { color: [1.0; 4] },
            Call::UiDrawCanvas,
            Call::EndTarget,
            Call::Present,
            Call::Check,
        ];
        let positions: Vec<usize> = order
            .iter()
            .map(|c| calls.iter().position(|x| x == c).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{calls:?}");
        assert_eq!(lp.frames_presented(), 1);
        lp.shutdown();
    }

    #[test]
    fn frame_limit_stops_cleanly() {
        let (lp, rig) = build(&config(Some(3)), |j| MockWindow::new(j, (64, 64)), Recorder::default());
        let report = lp.run();
        assert!(matches!(report.reason, StopReason::FrameLimit));
        assert_eq!(report.frames, 3);
        assert_eq!(rig.journal.count(&Call::Present), 3);
    }

    // ── stop requests ─────────────────────────────────────────────────────

    #[test]
    fn close_request_stops_before_the_next_frame() {
        let (mut lp, rig) = build(
            &config(None),
            |j| MockWindow::new(j, (64, 64)).at(2, Scripted::Event(LoopEvent::CloseRequested)),
            Recorder::default(),
        );
        tick_n(&mut lp, &rig, 2);
        assert_eq!(lp.tick(), LoopState::Stopped);
        assert!(matches!(lp.stop_reason(), Some(StopReason::Requested)));
        assert_eq!(rig.journal.count(&Call::BeginFrame), 2);
        assert_eq!(lp.tick(), LoopState::Stopped);
        assert_eq!(rig.journal.count(&Call::PumpEvents), 3);
        lp.shutdown();
    }

    #[test]
    fn app_exit_finishes_the_current_frame() {
        let app = Recorder {
            exit_after_frame: Some(1),
            ..Recorder::default()
        };
        let (lp, rig) = build(&config(None), |j| MockWindow::new(j, (64, 64)), app);
        let report = lp.run();
        assert!(matches!(report.reason, StopReason::Requested));
        assert_eq!(report.frames, 2);
        assert_eq!(rig.journal.count(&Call::Check), 2);
    }

    #[test]
    fn escape_key_stops() {
        let (lp, _rig) = build(
            &config(Some(100)),
            |j| MockWindow::new(j, (64, 64)).at(4, Scripted::Event(LoopEvent::Key(Key::Escape))),
            Recorder::default(),
        );
        let report = lp.run();
        assert!(matches!(report.reason, StopReason::Requested));
        assert_eq!(report.frames, 4);
    }

    // ── failures ──────────────────────────────────────────────────────────

    #[test]
    fn not_renderable_window_stops_without_dispatch() {
        let (lp, rig) = build(
            &config(None),
            |j| {
                let mut w = MockWindow::new(j, (64, 64));
                w.begin_ok = false;
                w
            },
            Recorder::default(),
        );
        let report = lp.run();
        assert!(matches!(report.reason, StopReason::NotRenderable));
        assert_eq!(rig.journal.count(&Call::RenderUpdate), 0);
    }

    #[test]
    fn present_failure_is_fatal_and_skips_device_check() {
        let (lp, rig) = build(
            &config(None),
            |j| {
                let mut w = MockWindow::new(j, (64, 64));
                w.present = Presented::Failed;
                w
            },
            Recorder::default(),
        );
        let report = lp.run();
        match report.reason {
            StopReason::Failed(err) => assert_eq!(err.stage(), Stage::Present),
            other => panic!("unexpected stop: {other:?}"),
        }
        assert_eq!(rig.journal.count(&Call::Check), 0);
        assert_eq!(report.frames, 0);
    }

    #[test]
    fn device_check_failure_is_fatal() {
        let (lp, _rig) = build(
            &config(None),
            |j| {
                let mut w = MockWindow::new(j, (64, 64));
                w.check_fails_at = Some(5);
                w
            },
            Recorder::default(),
        );
        let report = lp.run();
        match report.reason {
            StopReason::Failed(err) => assert_eq!(err.stage(), Stage::DeviceCheck),
            other => panic!("unexpected stop: {other:?}"),
        }
        assert_eq!(report.frames, 6);
    }

    #[test]
    fn invalid_config_fails_setup() {
        let journal = Journal::default();
        let scene_backend = MockScene::new(journal.clone());
        let stream = scene_backend.stream();
        let parts = LoopParts {
            window: MockWindow::new(journal.clone(), (64, 64)),
            scene_backend,
            render: MockRender::new(journal.clone()),
            ui: MockUi::new(journal.clone(), 0),
            scene: Scene::new(),
        };
        let config = EngineConfig {
            cadence_hz: 0.0,
            ..EngineConfig::default()
        };
        let result = TestLoop::new(&config, parts, Recorder::default(), Box::new(ManualClock::new(0.0)));
        assert!(matches!(result, Err(SetupError::Config(_))));
        std::thread::sleep(std::time::Duration::from_millis(2));
        assert_eq!(stream.calls.load(Ordering::SeqCst), 0);
    }

    // ── window size ───────────────────────────────────────────────────────

    #[test]
    fn resize_between_frames_ten_and_eleven_is_reported_once() {
        let (mut lp, rig) = build(
            &config(None),
            |j| MockWindow::new(j, (800, 600)).at(11, Scripted::Resize(1024, 768)),
            Recorder::default(),
        );
        for frame in 0..20 {
            tick_n(&mut lp, &rig, 1);
            let expected = if frame <= 10 { (800, 600) } else { (1024, 768) };
            assert_eq!(lp.pipeline().resources().size(), expected, "frame {frame}");
        }
        let report = lp.shutdown();
        assert_eq!(report.frames, 20);

        assert_eq!(
            rig.journal.count_matching(|c| matches!(c, Call::CreateTargets { .. })),
            2
        );
        assert_eq!(
            rig.journal.count(&Call::UiViewport { width: 960.0, height: 720.0 }),
            20
        );
    }

    #[test]
    fn app_sees_frame_resized_exactly_once() {
        struct Counting(Vec<LoopEvent>);
        impl App for Counting {
            fn on_event(&mut self, event: &LoopEvent, ctx: &mut LoopCtx<'_>) -> AppControl {
                self.0.push(event.clone());
                crate::core::default_event_handling(event, ctx)
            }
            fn on_frame(&mut self, outcome: &FrameOutcome, _ctx: &mut LoopCtx<'_>) -> AppControl {
                if outcome.frame_index == 19 {
                    let resized = self
                        .0
                        .iter()
                        .filter(|e| matches!(e, LoopEvent::FrameResized { .. }))
                        .count();
                    assert_eq!(resized, 1);
                    return AppControl::Exit;
                }
                AppControl::Continue
            }
        }

        let journal = Journal::default();
        let parts = LoopParts {
            window: MockWindow::new(journal.clone(), (800, 600)).at(11, Scripted::Resize(1024, 768)),
            scene_backend: MockScene::new(journal.clone()),
            render: MockRender::new(journal.clone()),
            ui: MockUi::new(journal.clone(), 0),
            scene: Scene::new(),
        };
        let lp = PresentationLoop::new(&config(None), parts, Counting(Vec::new()), Box::new(ManualClock::new(0.0)))
            .unwrap();
        let report = lp.run();
        assert!(matches!(report.reason, StopReason::Requested));
        assert_eq!(report.frames, 20);
    }

    #[test]
    fn minimised_window_skips_frames_without_stopping() {
        let (mut lp, rig) = build(
            &config(None),
            |j| {
                MockWindow::new(j, (64, 64))
                    .at(1, Scripted::Resize(0, 0))
                    .at(3, Scripted::Resize(64, 64))
            },
            Recorder::default(),
        );
        tick_n(&mut lp, &rig, 4);
        assert_eq!(rig.journal.count(&Call::BeginFrame), 2);
        assert_eq!(lp.frames_presented(), 2);
        assert_eq!(
            rig.journal.count_matching(|c| matches!(c, Call::CreateTargets { .. })),
            1
        );
        lp.shutdown();
    }

    // ── events ────────────────────────────────────────────────────────────

    #[test]
    fn f12_captures_after_present() {
        let (mut lp, rig) = build(
            &config(None),
            |j| MockWindow::new(j, (64, 64)).at(1, Scripted::Event(LoopEvent::Key(Key::F12))),
            Recorder::default(),
        );
        tick_n(&mut lp, &rig, 3);

        let shot = Call::Screenshot(SCREENSHOT_PATH.into());
        assert_eq!(rig.journal.count(&shot), 1);
        let calls = rig.journal.calls();
        let shot_at = calls.iter().position(|c| *c == shot).unwrap();
        assert_eq!(calls[shot_at - 1], Call::Present);
        assert_eq!(calls[shot_at + 1], Call::Check);
        lp.shutdown();
    }

    #[test]
    fn skipped_presents_are_not_counted_and_keep_screenshot_pending() {
        let (mut lp, rig) = build(
            &config(Some(2)),
            |j| {
                let mut w = MockWindow::new(j, (64, 64)).at(0, Scripted::Event(LoopEvent::Key(Key::F12)));
                w.present = Presented::Skipped;
                w
            },
            Recorder::default(),
        );
        tick_n(&mut lp, &rig, 3);
        let shot = Call::Screenshot(SCREENSHOT_PATH.into());
        assert_eq!(lp.frames_presented(), 0);
        assert_eq!(rig.journal.count(&Call::Present), 3);
        assert_eq!(rig.journal.count(&shot), 0);

        lp.window_mut().present = Presented::Shown;
        tick_n(&mut lp, &rig, 1);
        assert_eq!(lp.frames_presented(), 1);
        assert_eq!(rig.journal.count(&shot), 1);
        lp.shutdown();
    }

    #[test]
    fn ui_events_reach_the_app_on_the_next_tick() {
        let (mut lp, rig) = build(&config(None), |j| MockWindow::new(j, (64, 64)), Recorder::default());
        tick_n(&mut lp, &rig, 1);

        lp.ui.pending.push(UiEvent::SliderChanged { id: WidgetId(1), value: 0.25 });
        tick_n(&mut lp, &rig, 1);
        assert!(lp.app.events.is_empty());
        assert_eq!(lp.background().color[0], 1.0);

        tick_n(&mut lp, &rig, 1);
        assert_eq!(
            lp.app.events,
            vec![LoopEvent::Ui(UiEvent::SliderChanged { id: WidgetId(1), value: 0.25 })]
        );
        assert_eq!(lp.background().color[0], 0.25);
        assert_eq!(
            rig.journal.count(&Call::DrawBackground { color: [0.25, 1.0, 1.0, 1.0] }),
            1
        );
        lp.shutdown();
    }

    // ── shutdown ──────────────────────────────────────────────────────────

    #[test]
    fn shutdown_terminates_flushes_then_releases_in_order() {
        let (mut lp, rig) = build(&config(None), |j| MockWindow::new(j, (64, 64)), Recorder::default());
        tick_n(&mut lp, &rig, 3);

        let ran = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = ran.clone();
        lp.frame_async.spawn(move || flag.store(true, Ordering::SeqCst));

        rig.journal.clear();
        let report = lp.shutdown();

        assert!(ran.load(Ordering::SeqCst));
        assert_eq!(report.flushed_tasks, 1);
        assert_eq!(
            rig.journal.calls(),
            vec![
                Call::SceneTerminate,
                Call::SceneClear,
                Call::SceneUpdate,
                Call::Finish,
                Call::Dropped("targets"),
                Call::Dropped("render"),
                Call::Dropped("scene backend"),
                Call::Dropped("ui"),
                Call::Dropped("window"),
            ]
        );

        let calls = rig.stream.calls.load(Ordering::SeqCst);
        assert_eq!(report.streamer.iterations, calls);
        std::thread::sleep(std::time::Duration::from_millis(3));
        assert_eq!(rig.stream.calls.load(Ordering::SeqCst), calls);
    }
}
