use lumen_engine::core::{UiEvent, WidgetId};
use lumen_engine::overlay::ButtonMask;
use lumen_engine::render::CanvasList;

use super::font;

/// Axis-aligned rectangle in canvas units.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.x + self.w && py >= self.y && py < self.y + self.h
    }

    fn origin(&self) -> [f32; 2] {
        [self.x, self.y]
    }

    fn size(&self) -> [f32; 2] {
        [self.w, self.h]
    }
}

/// Ids of the interactive widgets.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct WidgetIds {
    pub button: WidgetId,
    pub red: WidgetId,
    pub green: WidgetId,
    pub blue: WidgetId,
}

impl Default for WidgetIds {
    fn default() -> Self {
        Self {
            button: WidgetId(1),
            red: WidgetId(2),
            green: WidgetId(3),
            blue: WidgetId(4),
        }
    }
}

const DIALOG_SIZE: [f32; 2] = [240.0, 180.0];
const MARGIN: f32 = 8.0;
const SPACING: f32 = 8.0;
const TITLE_HEIGHT: f32 = 24.0;
const BUTTON_HEIGHT: f32 = 24.0;
const BUTTON_GAP: f32 = 16.0;
const SLIDER_HEIGHT: f32 = 20.0;
const LABEL_WIDTH: f32 = 56.0;
const THUMB_WIDTH: f32 = 8.0;
const TEXT_SCALE: f32 = 2.0;

struct Slider {
    id: WidgetId,
    label: &'static str,
    value: f32,
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum Drag {
    None,
    Dialog { dx: f32, dy: f32 },
    Button,
    Slider(usize),
}

#[derive(Debug, Clone, PartialEq, Default)]
struct Layout {
    dialog: Rect,
    title: Rect,
    button: Rect,
    sliders: Vec<Rect>,
}

/// Dialog with a title, one button and three 0..1 sliders.
pub struct Panel {
    title: String,
    ids: WidgetIds,
    position: Option<[f32; 2]>,
    button_label: &'static str,
    sliders: Vec<Slider>,
    drag: Drag,
    hovered_button: bool,
    held: ButtonMask,
    viewport: [f32; 2],
    layout: Layout,
}

impl Panel {
    pub fn new(title: impl Into<String>, ids: WidgetIds, color: [f32; 3]) -> Self {
        let slider = |id, label, value| Slider { id, label, value };
        Self {
            title: title.into(),
            ids,
            position: None,
            button_label: "Button",
            sliders: vec![
                slider(ids.red, "R", color[0]),
                slider(ids.green, "G", color[1]),
                slider(ids.blue, "B", color[2]),
            ],
            drag: Drag::None,
            hovered_button: false,
            held: ButtonMask::empty(),
            viewport: [0.0, 0.0],
            layout: Layout::default(),
        }
    }

    pub fn ids(&self) -> WidgetIds {
        self.ids
    }

    pub fn dialog_rect(&self) -> Rect {
        self.layout.dialog
    }

    pub fn slider_value(&self, id: WidgetId) -> Option<f32> {
        self.sliders.iter().find(|s| s.id == id).map(|s| s.value)
    }

    /// Recomputes geometry for `viewport`. Returns true when it changed.
    pub fn layout(&mut self, viewport: [f32; 2]) -> bool {
        let [w, h] = DIALOG_SIZE;
        self.viewport = viewport;
        let centered = [(viewport[0] - w) * 0.5, (viewport[1] - h) * 0.5];
        let [x, y] = self.clamp_origin(self.position.unwrap_or(centered));

        let inner_x = x + MARGIN;
        let inner_w = w - 2.0 * MARGIN;
        let button_y = y + TITLE_HEIGHT + SPACING;
        let mut row_y = button_y + BUTTON_HEIGHT + BUTTON_GAP;

        let sliders = (0..self.sliders.len())
            .map(|_| {
                let rect = Rect::new(inner_x, row_y, inner_w, SLIDER_HEIGHT);
                row_y += SLIDER_HEIGHT + SPACING;
                rect
            })
            .collect();

        let layout = Layout {
            dialog: Rect::new(x, y, w, h),
            title: Rect::new(x, y, w, TITLE_HEIGHT),
            button: Rect::new(inner_x, button_y, inner_w, BUTTON_HEIGHT),
            sliders,
        };
        let changed = layout != self.layout;
        self.layout = layout;
        changed
    }

    /// Applies one pointer sample against the current layout.
    pub fn input(&mut self, x: f32, y: f32, buttons: ButtonMask, events: &mut Vec<UiEvent>) {
        let down = buttons.contains(ButtonMask::LEFT);
        let was_down = self.held.contains(ButtonMask::LEFT);
        self.held = buttons;
        self.hovered_button = self.layout.button.contains(x, y);

        if down && !was_down {
            self.drag = self.hit(x, y);
        }

        match self.drag {
            Drag::Slider(index) if down => self.drag_slider(index, x, events),
            Drag::Dialog { dx, dy } if down => {
                let d = self.layout.dialog;
                let next = self.clamp_origin([x - dx, y - dy]);
                if next != self.position.unwrap_or([d.x, d.y]) {
                    self.position = Some(next);
                    events.push(UiEvent::DialogMoved {
                        x: next[0],
                        y: next[1],
                        width: d.w,
                        height: d.h,
                    });
                }
            }
            Drag::Button if !down => {
                if self.hovered_button {
                    events.push(UiEvent::Clicked { id: self.ids.button });
                }
            }
            _ => {}
        }

        if !down {
            self.drag = Drag::None;
        }
    }

    fn clamp_origin(&self, [x, y]: [f32; 2]) -> [f32; 2] {
        let [w, h] = DIALOG_SIZE;
        [
            x.clamp(0.0, (self.viewport[0] - w).max(0.0)),
            y.clamp(0.0, (self.viewport[1] - h).max(0.0)),
        ]
    }

    fn hit(&self, x: f32, y: f32) -> Drag {
        if let Some(index) = self.layout.sliders.iter().position(|r| Self::track(r).contains(x, y)) {
            return Drag::Slider(index);
        }
        if self.layout.button.contains(x, y) {
            return Drag::Button;
        }
        if self.layout.title.contains(x, y) {
            let d = self.layout.dialog;
            return Drag::Dialog { dx: x - d.x, dy: y - d.y };
        }
        Drag::None
    }

    fn track(row: &Rect) -> Rect {
        Rect::new(row.x + LABEL_WIDTH, row.y, row.w - LABEL_WIDTH, row.h)
    }

    fn drag_slider(&mut self, index: usize, x: f32, events: &mut Vec<UiEvent>) {
        let (Some(row), Some(slider)) = (self.layout.sliders.get(index), self.sliders.get_mut(index)) else {
            return;
        };
        let track = Self::track(row);
        let value = ((x - track.x) / track.w.max(1.0)).clamp(0.0, 1.0);
        // Two displayed digits.
        let value = (value * 100.0).round() / 100.0;
        if value != slider.value {
            slider.value = value;
            events.push(UiEvent::SliderChanged { id: slider.id, value });
        }
    }

    /// Appends the dialog to `list` in paint order.
    pub fn rasterize(&self, list: &mut CanvasList) {
        const PANEL: [f32; 4] = [0.08, 0.09, 0.11, 0.85];
        const TITLE: [f32; 4] = [0.16, 0.18, 0.24, 0.95];
        const TEXT: [f32; 4] = [0.92, 0.93, 0.95, 1.0];
        const TRACK: [f32; 4] = [0.2, 0.22, 0.28, 1.0];

        let l = &self.layout;
        list.push_rect(l.dialog.origin(), l.dialog.size(), PANEL);
        list.push_rect(l.title.origin(), l.title.size(), TITLE);
        Self::centered_text(list, l.title, &self.title, TEXT);

        let button = match (self.drag, self.hovered_button) {
            (Drag::Button, true) => [0.18, 0.42, 0.75, 1.0],
            (_, true) => [0.28, 0.32, 0.42, 1.0],
            _ => [0.22, 0.25, 0.33, 1.0],
        };
        list.push_rect(l.button.origin(), l.button.size(), button);
        Self::centered_text(list, l.button, self.button_label, TEXT);

        let fills = [[0.85, 0.25, 0.25, 1.0], [0.3, 0.8, 0.35, 1.0], [0.3, 0.45, 0.9, 1.0]];
        for ((row, slider), fill) in l.sliders.iter().zip(&self.sliders).zip(fills) {
            let label = format!("{} {:.2}", slider.label, slider.value);
            let text_y = row.y + (row.h - font::text_height(TEXT_SCALE)) * 0.5;
            font::push_text(list, [row.x, text_y], TEXT_SCALE, TEXT, &label);

            let track = Self::track(row);
            let bar = Rect::new(track.x, track.y + track.h * 0.5 - 2.0, track.w, 4.0);
            list.push_rect(bar.origin(), bar.size(), TRACK);
            list.push_rect(bar.origin(), [bar.w * slider.value, bar.h], fill);

            let thumb_x = track.x + (track.w - THUMB_WIDTH) * slider.value;
            list.push_rect([thumb_x, track.y], [THUMB_WIDTH, track.h], TEXT);
        }
    }

    fn centered_text(list: &mut CanvasList, rect: Rect, text: &str, color: [f32; 4]) {
        let w = font::text_width(text, TEXT_SCALE);
        let h = font::text_height(TEXT_SCALE);
        let origin = [rect.x + (rect.w - w) * 0.5, rect.y + (rect.h - h) * 0.5];
        font::push_text(list, origin, TEXT_SCALE, color, text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: [f32; 2] = [960.0, 720.0];

    fn panel() -> Panel {
        let mut panel = Panel::new("lumen", WidgetIds::default(), [1.0, 1.0, 1.0]);
        panel.layout(VIEWPORT);
        panel
    }

    fn click(panel: &mut Panel, x: f32, y: f32) -> Vec<UiEvent> {
        let mut events = Vec::new();
        panel.input(x, y, ButtonMask::LEFT, &mut events);
        panel.input(x, y, ButtonMask::empty(), &mut events);
        events
    }

    // ── layout ────────────────────────────────────────────────────────────

    #[test]
    fn dialog_starts_centered_and_fits() {
        let panel = panel();
        let d = panel.dialog_rect();
        assert_eq!(d, Rect::new(360.0, 270.0, 240.0, 180.0));
        let last = panel.layout.sliders[2];
        assert!(last.y + last.h <= d.y + d.h);
    }

    #[test]
    fn layout_reports_change_once() {
        let mut panel = panel();
        assert!(!panel.layout(VIEWPORT));
        assert!(panel.layout([1280.0, 720.0]));
        assert!(!panel.layout([1280.0, 720.0]));
    }

    // ── interaction ───────────────────────────────────────────────────────

    #[test]
    fn button_click_fires_on_release_inside() {
        let mut panel = panel();
        let b = panel.layout.button;
        let events = click(&mut panel, b.x + 4.0, b.y + 4.0);
        assert_eq!(events, vec![UiEvent::Clicked { id: WidgetId(1) }]);
    }

    #[test]
    fn button_release_outside_does_not_click() {
        let mut panel = panel();
        let b = panel.layout.button;
        let mut events = Vec::new();
        panel.input(b.x + 4.0, b.y + 4.0, ButtonMask::LEFT, &mut events);
        panel.input(0.0, 0.0, ButtonMask::LEFT, &mut events);
        panel.input(0.0, 0.0, ButtonMask::empty(), &mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn slider_press_sets_value_from_pointer() {
        let mut panel = panel();
        let row = panel.layout.sliders[1];
        let track = Panel::track(&row);
        let events = click(&mut panel, track.x + track.w * 0.25, row.y + 2.0);
        assert_eq!(
            events,
            vec![UiEvent::SliderChanged {
                id: WidgetId(3),
                value: 0.25
            }]
        );
        assert_eq!(panel.slider_value(WidgetId(3)), Some(0.25));
    }

    #[test]
    fn slider_drag_clamps_and_skips_repeats() {
        let mut panel = panel();
        let row = panel.layout.sliders[0];
        let track = Panel::track(&row);
        let mut events = Vec::new();
        panel.input(track.x + 1.0, row.y + 2.0, ButtonMask::LEFT, &mut events);
        panel.input(-50.0, row.y + 2.0, ButtonMask::LEFT, &mut events);
        panel.input(-80.0, row.y + 2.0, ButtonMask::LEFT, &mut events);
        assert_eq!(
            events.last(),
            Some(&UiEvent::SliderChanged {
                id: WidgetId(2),
                value: 0.0
            })
        );
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn title_drag_moves_dialog() {
        let mut panel = panel();
        let mut events = Vec::new();
        panel.input(370.0, 280.0, ButtonMask::LEFT, &mut events);
        panel.input(390.0, 300.0, ButtonMask::LEFT, &mut events);
        assert_eq!(
            events,
            vec![UiEvent::DialogMoved {
                x: 380.0,
                y: 290.0,
                width: 240.0,
                height: 180.0
            }]
        );
        assert!(panel.layout(VIEWPORT));
        assert_eq!(panel.dialog_rect().x, 380.0);
    }

    #[test]
    fn dialog_drag_stops_at_viewport_edge() {
        let mut panel = panel();
        let mut events = Vec::new();
        panel.input(370.0, 280.0, ButtonMask::LEFT, &mut events);
        panel.input(-100.0, 280.0, ButtonMask::LEFT, &mut events);
        panel.input(-200.0, 280.0, ButtonMask::LEFT, &mut events);
        assert_eq!(events.len(), 1);
        panel.layout(VIEWPORT);
        assert_eq!(panel.dialog_rect().x, 0.0);
    }

    #[test]
    fn held_button_entering_widget_is_not_a_press() {
        let mut panel = panel();
        let b = panel.layout.button;
        let mut events = Vec::new();
        panel.input(0.0, 0.0, ButtonMask::LEFT, &mut events);
        panel.input(b.x + 4.0, b.y + 4.0, ButtonMask::LEFT, &mut events);
        panel.input(b.x + 4.0, b.y + 4.0, ButtonMask::empty(), &mut events);
        assert!(events.is_empty());
    }

    // ── rasterize ─────────────────────────────────────────────────────────

    #[test]
    fn rasterize_paints_dialog_first() {
        let panel = panel();
        let mut list = CanvasList::default();
        panel.rasterize(&mut list);
        assert_eq!(list.rects[0].origin, [360.0, 270.0]);
        assert_eq!(list.rects[0].size, [240.0, 180.0]);
        assert!(list.rects.len() > 20);
    }
}
