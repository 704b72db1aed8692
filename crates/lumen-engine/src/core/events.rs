use std::collections::VecDeque;

use crate::input::Key;

/// Identifier a UI binding assigns to an interactive widget.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct WidgetId(pub u32);

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Clicked { id: WidgetId },
    SliderChanged { id: WidgetId, value: f32 },
    DialogMoved { x: f32, y: f32, width: f32, height: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoopEvent {
    CloseRequested,
    /// Key press; repeats are not reported.
    Key(Key),
    WindowResized { width: u32, height: u32 },
    /// Frame resources were recreated at a new size.
    FrameResized { width: u32, height: u32 },
    Ui(UiEvent),
}

/// FIFO of loop events, drained once per tick.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<LoopEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: LoopEvent) {
        self.events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = LoopEvent> + '_ {
        self.events.drain(..)
    }
}

impl Extend<LoopEvent> for EventQueue {
    fn extend<I: IntoIterator<Item = LoopEvent>>(&mut self, iter: I) {
        self.events.extend(iter);
    }
}
