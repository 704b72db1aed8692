use lumen_engine::core::{default_event_handling, App, AppControl, LoopCtx, LoopEvent, UiEvent};
use lumen_engine::pipeline::FrameOutcome;

use crate::bindings::WidgetIds;

/// Routes dialog events onto the background uniforms.
pub struct StudioApp {
    ids: WidgetIds,
    clicks: u32,
}

impl StudioApp {
    pub fn new(ids: WidgetIds) -> Self {
        Self { ids, clicks: 0 }
    }

    fn on_ui(&mut self, event: &UiEvent, ctx: &mut LoopCtx<'_>) {
        match *event {
            UiEvent::Clicked { id } if id == self.ids.button => {
                self.clicks += 1;
                log::info!("Button clicked ({} total)", self.clicks);
            }
            UiEvent::SliderChanged { id, value } => {
                let channel = [self.ids.red, self.ids.green, self.ids.blue]
                    .iter()
                    .position(|&c| c == id);
                match channel {
                    Some(channel) => ctx.background.color[channel] = value,
                    None => log::debug!("slider {:?} has no binding", id),
                }
            }
            UiEvent::DialogMoved { x, y, width, height } => {
                log::debug!("dialog moved to ({x}, {y}) size {width}x{height}");
            }
            UiEvent::Clicked { id } => log::debug!("click on unbound widget {:?}", id),
        }
    }
}

impl App for StudioApp {
    fn on_event(&mut self, event: &LoopEvent, ctx: &mut LoopCtx<'_>) -> AppControl {
        match event {
            LoopEvent::Ui(ui) => {
                self.on_ui(ui, ctx);
                AppControl::Continue
            }
            LoopEvent::FrameResized { width, height } => {
                log::debug!("frame targets now {}x{}", width, height);
                AppControl::Continue
            }
            other => default_event_handling(other, ctx),
        }
    }

    fn on_frame(&mut self, outcome: &FrameOutcome, _ctx: &mut LoopCtx<'_>) -> AppControl {
        if let Some(tick) = outcome.cadence {
            log::trace!("frame {}: texture refresh {:?}", outcome.frame_index, tick);
        }
        AppControl::Continue
    }
}
