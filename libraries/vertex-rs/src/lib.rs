//! Vertex sources and the geometry around them: rectangles, affine transforms, curve flattening, exact bounds,
//! hit-testing and offsetting of vector paths.
//!
//! Every path is consumed through the pull based [`VertexSource`] trait so decorators like [`VertexTransformer`]
//! and [`VertexOffsetter`] can be stacked without materializing intermediate paths.

pub mod consts;
mod error;
mod flattener;
mod info;
mod offsetter;
mod rect;
mod shapes;
mod transform;
mod transformer;
mod vertex;

pub use error::GeometryError;
pub use flattener::{flatten_contours, CurveFlattener, Polyline};
pub use info::{hit_test, vertex_bounds, HitTestOptions, VertexHit, VertexHitKind};
pub use offsetter::VertexOffsetter;
pub use rect::{Rect, RectSide};
pub use shapes::{ellipse_vertices, push_corner, rectangle_vertices, rounded_polygon_vertices, CornerShape};
pub use transform::Transform;
pub use transformer::VertexTransformer;
pub use vertex::{to_bez_path, Vertex, VertexCommand, VertexContainer, VertexSource};
