use crate::consts::CIRCLE_KAPPA;
use crate::rect::Rect;
use crate::vertex::VertexContainer;

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// How a corner with a non-zero radius is cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CornerShape {
	#[default]
	Rounded,
	/// A concave quarter circle centered on the corner.
	Inset,
	Bevel,
}

/// Emits a corner at `corner` between the edges coming from `previous` and going to `next`.
///
/// The radius is measured along both edges and clamped to half of the shorter one.
/// The first corner of a contour starts it with a `Move`, later ones connect with a `Line`.
pub fn push_corner(container: &mut VertexContainer, previous: DVec2, corner: DVec2, next: DVec2, radius: f64, shape: CornerShape, first: bool) {
	let incoming = corner - previous;
	let outgoing = next - corner;
	let radius = radius.min(incoming.length() / 2.).min(outgoing.length() / 2.);
	if radius <= 0. {
		if first {
			container.move_to(corner);
		} else {
			container.line_to(corner);
		}
		return;
	}

	let incoming = incoming.normalize();
	let outgoing = outgoing.normalize();
	let start = corner - incoming * radius;
	let end = corner + outgoing * radius;
	if first {
		container.move_to(start);
	} else {
		container.line_to(start);
	}

	let handle = radius * CIRCLE_KAPPA;
	match shape {
		CornerShape::Rounded => container.cubic_to(end, start + incoming * handle, end - outgoing * handle),
		CornerShape::Inset => container.cubic_to(end, start + outgoing * handle, end - incoming * handle),
		CornerShape::Bevel => container.line_to(end),
	}
}

/// Vertices of a closed polygon whose corners are cut with the given radii.
pub fn rounded_polygon_vertices(corners: &[(DVec2, f64, CornerShape)]) -> VertexContainer {
	let mut container = VertexContainer::with_capacity(corners.len() * 4 + 1);
	let count = corners.len();
	for (index, &(corner, radius, shape)) in corners.iter().enumerate() {
		let previous = corners[(index + count - 1) % count].0;
		let next = corners[(index + 1) % count].0;
		push_corner(&mut container, previous, corner, next, radius, shape, index == 0);
	}
	if !container.is_empty() {
		container.close();
	}
	container
}

/// A closed rectangle, clockwise in a y-down frame, starting at the top-left corner.
pub fn rectangle_vertices(rect: &Rect, radius: f64) -> VertexContainer {
	let corners = rect.corners().map(|corner| (corner, radius, CornerShape::Rounded));
	rounded_polygon_vertices(&corners)
}

/// A closed ellipse made of four cubic arcs, starting at the rightmost point.
pub fn ellipse_vertices(center: DVec2, radii: DVec2) -> VertexContainer {
	let handle = radii * CIRCLE_KAPPA;
	let right = center + DVec2::new(radii.x, 0.);
	let bottom = center + DVec2::new(0., radii.y);
	let left = center - DVec2::new(radii.x, 0.);
	let top = center - DVec2::new(0., radii.y);

	let mut container = VertexContainer::with_capacity(14);
	container.move_to(right);
	container.cubic_to(bottom, right + DVec2::new(0., handle.y), bottom + DVec2::new(handle.x, 0.));
	container.cubic_to(left, bottom - DVec2::new(handle.x, 0.), left + DVec2::new(0., handle.y));
	container.cubic_to(top, left - DVec2::new(0., handle.y), top - DVec2::new(handle.x, 0.));
	container.cubic_to(right, top + DVec2::new(handle.x, 0.), right - DVec2::new(0., handle.y));
	container.close();
	container
}
