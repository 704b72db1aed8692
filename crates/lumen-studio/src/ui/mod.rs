//! Demo dialog: widget model, layout, interaction and rasterisation.

pub mod font;
mod panel;

pub use panel::{Panel, WidgetIds};
