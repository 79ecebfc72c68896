/// Determinants with an absolute value below this are treated as singular.
pub const DETERMINANT_EPSILON: f64 = 1e-12;

/// Tolerance used when comparing transform coefficients against the identity.
pub const IDENTITY_EPSILON: f64 = 1e-9;

/// Maximum distance between a curve and its flattened polyline.
pub const FLATTEN_TOLERANCE: f64 = 0.1;

/// Length of the cubic control handles approximating a quarter circle of radius 1.
pub const CIRCLE_KAPPA: f64 = 0.552_284_749_830_793_4;

/// Segments shorter than this are dropped when building offset polylines.
pub const MIN_SEGMENT_LENGTH: f64 = 1e-9;

/// Inside corners whose miter point lies further than this many radii from the corner are beveled instead.
pub const MITER_LIMIT: f64 = 10.;
