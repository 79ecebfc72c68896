// GRID
/// Minimum on-screen distance between two grid lines, in device pixels.
pub const GRID_MIN_CELL_SPACE: f64 = 10.;
pub const GRID_LINE_OPACITY: f32 = 0.125;

// GUIDES
/// Extra length of shape box guide lines beyond the snapped shape.
pub const GUIDE_MARGIN: f64 = 20.;
/// Target points closer than this to the snapped point are not drawn.
pub const GUIDE_TARGET_MIN_DISTANCE: f64 = 2.;

// DIRTY LIST
/// Two dirty rectangles are united when the union wastes less than this many square pixels.
pub const DIRTY_MERGE_EPSILON: f64 = 50. * 50.;

// SCENE DEFAULTS
pub const DEFAULT_PAGE_WIDTH: f64 = 800.;
pub const DEFAULT_PAGE_HEIGHT: f64 = 600.;
pub const DEFAULT_GRID_SIZE: f64 = 10.;
pub const DEFAULT_SNAP_DISTANCE: f64 = 5.;
pub const DEFAULT_PICK_DISTANCE: f64 = 3.;

// PAINT
/// Width of outlines painted in outline mode, in device pixels.
pub const OUTLINE_WIDTH: f64 = 1.;
