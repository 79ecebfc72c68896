mod canvas;
mod context;
mod dirty;

pub use canvas::{DrawCommand, LayerEffect, PaintCanvas, RecordingCanvas, SvgCanvas};
pub use context::{PaintConfiguration, PaintContext, PaintMode};
pub use dirty::{DirtyList, DirtyMatcher};
