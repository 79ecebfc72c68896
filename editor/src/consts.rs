// UNDO
pub const DEFAULT_MAX_UNDO_STEPS: usize = 20;

// SELECTION
/// Distance in scene units by which duplicates are shifted from their originals.
pub const CLONE_SHIFT: f64 = 10.;
pub const NUDGE_AMOUNT: f64 = 1.;
/// Edge length of element editor handles in device pixels.
pub const HANDLE_SIZE: f64 = 8.;
/// Rubber band selections smaller than this (device pixels) count as a plain click.
pub const DRAG_THRESHOLD: f64 = 1.;

// CLIPBOARD
pub const NODES_MIME_TYPE: &str = "application/x-quill-nodes+json";

// VIEWPORT
pub const VIEWPORT_ZOOM_STEP: f64 = 2.;
pub const VIEWPORT_ZOOM_SCALE_MIN: f64 = 0.01;
pub const VIEWPORT_ZOOM_SCALE_MAX: f64 = 256.;

// ELEMENT EDITORS
/// Resizing never shrinks an element below this extent (scene units), which would make its transform degenerate.
pub const MIN_RESIZE_EXTENT: f64 = 1e-3;
