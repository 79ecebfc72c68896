use crate::consts::{FLATTEN_TOLERANCE, MIN_SEGMENT_LENGTH, MITER_LIMIT};
use crate::flattener::flatten_contours;
use crate::vertex::{Vertex, VertexContainer, VertexSource};

use glam::DVec2;
use std::f64::consts::PI;

const PARALLEL_EPSILON: f64 = 1e-9;
const MIN_TOLERANCE: f64 = FLATTEN_TOLERANCE * 1e-3;

/// Produces inset and/or outset contours of the decorated source at a fixed distance.
///
/// Curves are flattened first. Outside corners receive round joins, inside corners are mitered and open contours get
/// round caps (they only have an outset). Points where the offset folds over itself are removed and a contour that
/// collapses entirely is dropped. Outset contours are read before inset contours.
///
/// A radius of zero or less, no requested side, or a source without a single non-degenerate segment passes the source
/// through unchanged.
pub struct VertexOffsetter<S> {
	source: S,
	radius: f64,
	inset: bool,
	outset: bool,
	tolerance: f64,
	output: Option<VertexContainer>,
	computed: bool,
}

impl<S: VertexSource> VertexOffsetter<S> {
	pub fn new(source: S, radius: f64, inset: bool, outset: bool) -> Self {
		Self {
			source,
			radius,
			inset,
			outset,
			tolerance: FLATTEN_TOLERANCE,
			output: None,
			computed: false,
		}
	}

	/// Maximum distance between flattened curves and round joins and the exact offset. Clamped to a small positive value.
	#[must_use]
	pub fn with_tolerance(mut self, tolerance: f64) -> Self {
		self.tolerance = tolerance.max(MIN_TOLERANCE);
		self.computed = false;
		self
	}

	/// Whether the last computation fell back to reading the source unchanged.
	pub fn is_identity(&self) -> bool {
		self.output.is_none()
	}

	fn compute(&mut self) {
		self.computed = true;
		self.output = None;
		if self.radius <= 0. || !(self.inset || self.outset) {
			return;
		}

		let mut contours = flatten_contours(&mut self.source, self.tolerance);
		contours.iter_mut().for_each(|contour| contour.dedup(MIN_SEGMENT_LENGTH));
		contours.retain(|contour| contour.points.len() >= 2);
		if contours.is_empty() {
			log::trace!("Offset source has no usable segment, passing it through");
			return;
		}

		let mut outsets = Vec::new();
		let mut insets = Vec::new();
		for contour in &contours {
			if contour.closed && contour.points.len() >= 3 {
				let outward = if contour.signed_area() > 0. { -1. } else { 1. };
				if self.outset {
					outsets.extend(clean_offset(offset_ring(&contour.points, self.radius, outward, self.tolerance), &contour.points, self.radius));
				}
				if self.inset {
					let inset = clean_offset(offset_ring(&contour.points, self.radius, -outward, self.tolerance), &contour.points, self.radius);
					if inset.is_none() {
						log::trace!("Inset of a contour with {} points collapsed", contour.points.len());
					}
					insets.extend(inset);
				}
			} else if self.outset {
				let mut ring = contour.points.clone();
				ring.extend(contour.points[1..contour.points.len() - 1].iter().rev());
				outsets.extend(clean_offset(offset_ring(&ring, self.radius, 1., self.tolerance), &ring, self.radius));
			}
		}

		let mut output = VertexContainer::new();
		for polygon in outsets.iter().chain(insets.iter()) {
			let mut points = polygon.iter();
			let Some(first) = points.next() else { continue };
			output.move_to(*first);
			points.for_each(|point| output.line_to(*point));
			output.close();
		}
		self.output = Some(output);
	}
}

impl<S: VertexSource> VertexSource for VertexOffsetter<S> {
	fn rewind_vertices(&mut self, index: usize) -> bool {
		if index == 0 || !self.computed {
			self.compute();
		}
		match &mut self.output {
			Some(output) => output.rewind_vertices(index),
			None => self.source.rewind_vertices(index),
		}
	}

	fn read_vertex(&mut self, vertex: &mut Vertex) -> bool {
		match &mut self.output {
			Some(output) => output.read_vertex(vertex),
			None => self.source.read_vertex(vertex),
		}
	}
}

/// Drops offset points that ended up closer than `radius` to the original ring, which happens where the offset
/// folds over itself. Returns `None` once fewer than three points remain.
fn clean_offset(offset: Vec<DVec2>, ring: &[DVec2], radius: f64) -> Option<Vec<DVec2>> {
	let threshold = radius * (1. - 1e-6) - MIN_SEGMENT_LENGTH;
	let count = ring.len();
	let cleaned: Vec<_> = offset
		.into_iter()
		.filter(|&point| (0..count).all(|index| segment_distance(point, ring[index], ring[(index + 1) % count]) >= threshold))
		.collect();
	(cleaned.len() >= 3).then_some(cleaned)
}

fn segment_distance(point: DVec2, start: DVec2, end: DVec2) -> f64 {
	let segment = end - start;
	let length_squared = segment.length_squared();
	if length_squared == 0. {
		return point.distance(start);
	}
	let t = ((point - start).dot(segment) / length_squared).clamp(0., 1.);
	point.distance(start + segment * t)
}

/// Offsets a closed ring of points towards `side` (`1.` for the left hand side of the travel direction, `-1.` for the right).
fn offset_ring(points: &[DVec2], radius: f64, side: f64, tolerance: f64) -> Vec<DVec2> {
	let count = points.len();
	let mut result = Vec::with_capacity(count * 2);
	for index in 0..count {
		let corner = points[index];
		let previous = points[(index + count - 1) % count];
		let next = points[(index + 1) % count];
		let incoming = (corner - previous).normalize_or_zero();
		let outgoing = (next - corner).normalize_or_zero();
		push_join(&mut result, corner, incoming, outgoing, radius, side, tolerance);
	}
	result
}

fn push_join(result: &mut Vec<DVec2>, corner: DVec2, incoming: DVec2, outgoing: DVec2, radius: f64, side: f64, tolerance: f64) {
	let incoming_normal = incoming.perp() * side;
	let outgoing_normal = outgoing.perp() * side;
	let start = corner + incoming_normal * radius;
	let end = corner + outgoing_normal * radius;

	let cross = incoming.perp_dot(outgoing);
	let parallel = cross.abs() < PARALLEL_EPSILON;
	let reversal = parallel && incoming.dot(outgoing) < 0.;

	if parallel && !reversal {
		result.push(start);
	} else if reversal || side * cross < 0. {
		let sweep = if reversal { -side * PI } else { incoming_normal.perp_dot(outgoing_normal).atan2(incoming_normal.dot(outgoing_normal)) };
		let step = if tolerance < radius { 2. * (1. - tolerance / radius).acos() } else { PI / 2. };
		let steps = (sweep.abs() / step).ceil().max(1.) as usize;
		result.push(start);
		for index in 1..steps {
			let angle = sweep * index as f64 / steps as f64;
			result.push(corner + DVec2::from_angle(angle).rotate(incoming_normal) * radius);
		}
		result.push(end);
	} else {
		let along = (end - start).perp_dot(outgoing) / incoming.perp_dot(outgoing);
		let miter = start + incoming * along;
		if miter.distance(corner) > radius * MITER_LIMIT {
			result.push(start);
			result.push(end);
		} else {
			result.push(miter);
		}
	}
}
