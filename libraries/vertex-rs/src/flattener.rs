use crate::consts::FLATTEN_TOLERANCE;
use crate::vertex::{dvec, to_bez_path, Vertex, VertexContainer, VertexSource};

use glam::DVec2;
use kurbo::PathEl;

/// A contour approximated by straight segments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polyline {
	pub points: Vec<DVec2>,
	pub closed: bool,
}

impl Polyline {
	/// Signed shoelace area. Positive for counter-clockwise winding in a y-up frame.
	pub fn signed_area(&self) -> f64 {
		let count = self.points.len();
		if count < 3 {
			return 0.;
		}
		let twice_area: f64 = (0..count)
			.map(|index| {
				let a = self.points[index];
				let b = self.points[(index + 1) % count];
				a.x * b.y - b.x * a.y
			})
			.sum();
		twice_area / 2.
	}

	/// Removes points closer than `min_length` to their predecessor, including the wrap around of closed contours.
	pub fn dedup(&mut self, min_length: f64) {
		self.points.dedup_by(|current, previous| current.distance(*previous) < min_length);
		if self.closed {
			while self.points.len() > 1 && self.points[0].distance(self.points[self.points.len() - 1]) < min_length {
				self.points.pop();
			}
		}
	}
}

/// Flattens a whole source into polylines, one per contour.
pub fn flatten_contours<S: VertexSource + ?Sized>(source: &mut S, tolerance: f64) -> Vec<Polyline> {
	let path = to_bez_path(source);
	let mut contours = Vec::new();
	let mut current = Polyline::default();
	kurbo::flatten(path.iter(), tolerance, |element| match element {
		PathEl::MoveTo(point) => {
			if !current.points.is_empty() {
				contours.push(std::mem::take(&mut current));
			}
			current.points.push(dvec(point));
		}
		PathEl::LineTo(point) => current.points.push(dvec(point)),
		PathEl::ClosePath => {
			current.closed = true;
			contours.push(std::mem::take(&mut current));
		}
		PathEl::QuadTo(..) | PathEl::CurveTo(..) => {}
	});
	if !current.points.is_empty() {
		contours.push(current);
	}
	contours
}

/// Replaces the curves of the decorated source with line segments within a tolerance.
///
/// The flattened vertices are computed whenever the source is rewound to its start.
pub struct CurveFlattener<S> {
	source: S,
	tolerance: f64,
	flattened: VertexContainer,
}

impl<S: VertexSource> CurveFlattener<S> {
	pub fn new(source: S) -> Self {
		Self::with_tolerance(source, FLATTEN_TOLERANCE)
	}

	pub fn with_tolerance(source: S, tolerance: f64) -> Self {
		Self {
			source,
			tolerance,
			flattened: VertexContainer::new(),
		}
	}

	fn flatten(&mut self) {
		self.flattened.clear();
		for contour in flatten_contours(&mut self.source, self.tolerance) {
			let mut points = contour.points.iter();
			if let Some(first) = points.next() {
				self.flattened.move_to(*first);
			}
			points.for_each(|point| self.flattened.line_to(*point));
			if contour.closed {
				self.flattened.close();
			}
		}
	}
}

impl<S: VertexSource> VertexSource for CurveFlattener<S> {
	fn rewind_vertices(&mut self, index: usize) -> bool {
		if index == 0 {
			self.flatten();
		}
		self.flattened.rewind_vertices(index)
	}

	fn read_vertex(&mut self, vertex: &mut Vertex) -> bool {
		self.flattened.read_vertex(vertex)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::vertex::VertexCommand;

	#[test]
	fn flattened_curve_has_only_lines() {
		let mut container = VertexContainer::new();
		container.move_to(DVec2::ZERO);
		container.cubic_to(DVec2::new(100., 0.), DVec2::new(0., 100.), DVec2::new(100., 100.));
		container.close();

		let mut flattener = CurveFlattener::new(container);
		let flattened = VertexContainer::from_source(&mut flattener);
		assert!(flattened.len() > 4);
		assert_eq!(flattened.vertices()[0].command, VertexCommand::Move);
		assert_eq!(flattened.vertices().last().map(|vertex| vertex.command), Some(VertexCommand::Close));
		assert!(flattened.vertices()[1..flattened.len() - 1].iter().all(|vertex| vertex.command == VertexCommand::Line));
	}

	#[test]
	fn contours_split_on_move() {
		let mut container = VertexContainer::new();
		container.move_to(DVec2::ZERO);
		container.line_to(DVec2::new(10., 0.));
		container.line_to(DVec2::new(10., 10.));
		container.close();
		container.move_to(DVec2::new(20., 0.));
		container.line_to(DVec2::new(30., 0.));

		let contours = flatten_contours(&mut container, FLATTEN_TOLERANCE);
		assert_eq!(contours.len(), 2);
		assert!(contours[0].closed);
		assert!(!contours[1].closed);
		assert_eq!(contours[1].points, vec![DVec2::new(20., 0.), DVec2::new(30., 0.)]);
	}

	#[test]
	fn shoelace_sign_and_dedup() {
		let mut square = Polyline {
			points: vec![DVec2::ZERO, DVec2::new(10., 0.), DVec2::new(10., 0.), DVec2::new(10., 10.), DVec2::new(0., 10.), DVec2::ZERO],
			closed: true,
		};
		square.dedup(1e-9);
		assert_eq!(square.points.len(), 4);
		assert_eq!(square.signed_area(), 100.);
		square.points.reverse();
		assert_eq!(square.signed_area(), -100.);
	}
}
