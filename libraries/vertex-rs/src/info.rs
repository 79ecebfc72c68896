use crate::consts::FLATTEN_TOLERANCE;
use crate::rect::Rect;
use crate::vertex::{dvec, point, to_bez_path, VertexSource};

use glam::DVec2;
use kurbo::{ParamCurveExtrema, ParamCurveNearest, PathEl, Shape};

fn from_kurbo_rect(rect: kurbo::Rect) -> Rect {
	Rect::from_points(DVec2::new(rect.x0, rect.y0), DVec2::new(rect.x1, rect.y1))
}

/// Exact axis-aligned bounds of a source, taking curve extrema into account.
///
/// Returns `None` for a source without any vertex.
pub fn vertex_bounds<S: VertexSource + ?Sized>(source: &mut S) -> Option<Rect> {
	let path = to_bez_path(source);
	let segment_bounds = path.segments().map(|segment| from_kurbo_rect(ParamCurveExtrema::bounding_box(&segment))).reduce(|a, b| a.united(&b));
	let move_points = path.elements().iter().filter_map(|element| match element {
		PathEl::MoveTo(point) => Some(dvec(*point)),
		_ => None,
	});
	Rect::union_of(segment_bounds, Rect::bounding(move_points))
}

/// Parameters of a hit test against a vertex source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitTestOptions {
	/// Extra distance around the outline that still counts as a hit.
	pub tolerance: f64,
	/// Whether the enclosed area counts as a hit (non-zero winding).
	pub fill: bool,
	/// Width of the painted outline, half of which lies on either side of the path.
	pub outline_width: f64,
}

impl Default for HitTestOptions {
	fn default() -> Self {
		Self {
			tolerance: 0.,
			fill: true,
			outline_width: 0.,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexHitKind {
	Outline,
	Area,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexHit {
	pub kind: VertexHitKind,
	/// Distance between the tested point and the nearest point of the outline.
	pub distance: f64,
	/// Index of the nearest segment in path order.
	pub segment: usize,
	/// Curve parameter of the nearest point on that segment.
	pub t: f64,
}

/// Tests `position` against the outline and, if requested, the area of a source.
///
/// Outline hits take precedence over area hits.
pub fn hit_test<S: VertexSource + ?Sized>(source: &mut S, position: DVec2, options: HitTestOptions) -> Option<VertexHit> {
	let path = to_bez_path(source);
	let target = point(position);

	let nearest = path
		.segments()
		.enumerate()
		.map(|(index, segment)| (index, segment.nearest(target, FLATTEN_TOLERANCE / 10.)))
		.min_by(|(_, a), (_, b)| a.distance_sq.total_cmp(&b.distance_sq));
	let (segment, distance, t) = match nearest {
		Some((index, nearest)) => (index, nearest.distance_sq.sqrt(), nearest.t),
		None => return None,
	};

	if distance <= options.tolerance + options.outline_width / 2. {
		return Some(VertexHit {
			kind: VertexHitKind::Outline,
			distance,
			segment,
			t,
		});
	}
	if options.fill && Shape::winding(&path, target) != 0 {
		return Some(VertexHit {
			kind: VertexHitKind::Area,
			distance,
			segment,
			t,
		});
	}
	None
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::shapes::rectangle_vertices;
	use crate::vertex::VertexContainer;

	#[test]
	fn bounds_include_curve_extrema() {
		let mut container = VertexContainer::new();
		container.move_to(DVec2::ZERO);
		container.curve_to(DVec2::new(10., 0.), DVec2::new(5., 10.));
		let bounds = vertex_bounds(&mut container).unwrap();
		assert!((bounds.max.y - 5.).abs() < 1e-9);
		assert_eq!(bounds.min, DVec2::ZERO);
	}

	#[test]
	fn bounds_of_lonely_move() {
		let mut container = VertexContainer::new();
		assert_eq!(vertex_bounds(&mut container), None);
		container.move_to(DVec2::new(3., 4.));
		assert_eq!(vertex_bounds(&mut container), Some(Rect::from_points(DVec2::new(3., 4.), DVec2::new(3., 4.))));
	}

	#[test]
	fn hit_outline_and_area() {
		let mut square = rectangle_vertices(&Rect::new(0., 0., 10., 10.), 0.);
		let options = HitTestOptions { tolerance: 1., ..Default::default() };

		let edge = hit_test(&mut square, DVec2::new(10.5, 5.), options).unwrap();
		assert_eq!(edge.kind, VertexHitKind::Outline);
		assert!((edge.distance - 0.5).abs() < 1e-6);

		let inside = hit_test(&mut square, DVec2::new(5., 5.), options).unwrap();
		assert_eq!(inside.kind, VertexHitKind::Area);

		assert_eq!(hit_test(&mut square, DVec2::new(20., 5.), options), None);
		assert_eq!(hit_test(&mut square, DVec2::new(5., 5.), HitTestOptions { fill: false, ..options }), None);
	}

	#[test]
	fn outline_width_widens_hits() {
		let mut square = rectangle_vertices(&Rect::new(0., 0., 10., 10.), 0.);
		let options = HitTestOptions {
			tolerance: 0.,
			fill: false,
			outline_width: 4.,
		};
		assert!(hit_test(&mut square, DVec2::new(11.5, 5.), options).is_some());
		assert!(hit_test(&mut square, DVec2::new(12.5, 5.), options).is_none());
	}
}
