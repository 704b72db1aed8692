use std::path::PathBuf;

use crate::backend::BackgroundParams;
use crate::input::Key;
use crate::pipeline::FrameOutcome;
use crate::time::FrameTime;

use super::LoopEvent;

/// Where F12 screenshots are written.
pub const SCREENSHOT_PATH: &str = "screenshot.png";

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Per-callback context.
pub struct LoopCtx<'a> {
    pub time: FrameTime,
    /// Uniforms of the background primitive drawn this frame.
    pub background: &'a mut BackgroundParams,
    pub(crate) screenshot: &'a mut Option<PathBuf>,
}

impl<'a> LoopCtx<'a> {
    pub fn new(
        time: FrameTime,
        background: &'a mut BackgroundParams,
        screenshot: &'a mut Option<PathBuf>,
    ) -> Self {
        Self {
            time,
            background,
            screenshot,
        }
    }

    /// Captures the next presented frame to `path`.
    pub fn request_screenshot(&mut self, path: impl Into<PathBuf>) {
        *self.screenshot = Some(path.into());
    }
}

/// Application contract implemented by higher layers.
pub trait App {
    /// Called for every queued event, before the frame begins.
    fn on_event(&mut self, event: &LoopEvent, ctx: &mut LoopCtx<'_>) -> AppControl {
        default_event_handling(event, ctx)
    }

    /// Called after the dispatch pipeline, before the window target is drawn.
    fn on_frame(&mut self, outcome: &FrameOutcome, ctx: &mut LoopCtx<'_>) -> AppControl {
        let _ = (outcome, ctx);
        AppControl::Continue
    }
}

/// Close and Escape stop the loop; F12 saves a screenshot.
pub fn default_event_handling(event: &LoopEvent, ctx: &mut LoopCtx<'_>) -> AppControl {
    match event {
        LoopEvent::CloseRequested | LoopEvent::Key(Key::Escape) => AppControl::Exit,
        LoopEvent::Key(Key::F12) => {
            ctx.request_screenshot(SCREENSHOT_PATH);
            AppControl::Continue
        }
        _ => AppControl::Continue,
    }
}
