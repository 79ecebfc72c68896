use crate::error::GeometryError;

use glam::DVec2;
use kurbo::{BezPath, PathEl, Point};
use serde::{Deserialize, Serialize};

/// The closed set of path drawing commands.
///
/// A `Curve` (quadratic) vertex holds the end point and is followed by one control vertex.
/// A `Curve2` (cubic) vertex holds the end point and is followed by two control vertices.
/// Control vertices carry the same command tag as the curve they belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum VertexCommand {
	#[default]
	Move = 0,
	Line = 1,
	Curve = 2,
	Curve2 = 3,
	Close = 4,
}

impl VertexCommand {
	/// Number of control vertices following the vertex holding the end point.
	pub fn control_count(self) -> usize {
		match self {
			VertexCommand::Curve => 1,
			VertexCommand::Curve2 => 2,
			_ => 0,
		}
	}
}

impl TryFrom<u8> for VertexCommand {
	type Error = GeometryError;

	fn try_from(tag: u8) -> Result<Self, Self::Error> {
		match tag {
			0 => Ok(VertexCommand::Move),
			1 => Ok(VertexCommand::Line),
			2 => Ok(VertexCommand::Curve),
			3 => Ok(VertexCommand::Curve2),
			4 => Ok(VertexCommand::Close),
			_ => Err(GeometryError::UnknownCommand(tag)),
		}
	}
}

/// A single command with its coordinates. Callers own the instance and sources only fill it in.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vertex {
	pub command: VertexCommand,
	pub x: f64,
	pub y: f64,
}

impl Vertex {
	pub fn new(command: VertexCommand, x: f64, y: f64) -> Self {
		Self { command, x, y }
	}

	pub fn at(command: VertexCommand, position: DVec2) -> Self {
		Self::new(command, position.x, position.y)
	}

	pub fn close() -> Self {
		Self::new(VertexCommand::Close, 0., 0.)
	}

	pub fn position(&self) -> DVec2 {
		DVec2::new(self.x, self.y)
	}

	pub fn set_position(&mut self, position: DVec2) {
		self.x = position.x;
		self.y = position.y;
	}
}

/// A pull based, rewindable sequence of vertices.
///
/// The consumer drives the iteration: [`VertexSource::rewind_vertices`] positions the cursor and
/// [`VertexSource::read_vertex`] fills the caller's vertex and advances until the source is exhausted.
pub trait VertexSource {
	/// Moves the read cursor to `index`, returning whether at least one vertex can be read from there.
	fn rewind_vertices(&mut self, index: usize) -> bool;

	/// Fills `vertex` with the next vertex, returning `false` at the end of the source.
	fn read_vertex(&mut self, vertex: &mut Vertex) -> bool;
}

impl<S: VertexSource + ?Sized> VertexSource for &mut S {
	fn rewind_vertices(&mut self, index: usize) -> bool {
		(**self).rewind_vertices(index)
	}

	fn read_vertex(&mut self, vertex: &mut Vertex) -> bool {
		(**self).read_vertex(vertex)
	}
}

impl<S: VertexSource + ?Sized> VertexSource for Box<S> {
	fn rewind_vertices(&mut self, index: usize) -> bool {
		(**self).rewind_vertices(index)
	}

	fn read_vertex(&mut self, vertex: &mut Vertex) -> bool {
		(**self).read_vertex(vertex)
	}
}

/// An owned list of vertices which is itself a vertex source.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VertexContainer {
	vertices: Vec<Vertex>,
	#[serde(skip)]
	cursor: usize,
}

impl VertexContainer {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_capacity(capacity: usize) -> Self {
		Self {
			vertices: Vec::with_capacity(capacity),
			cursor: 0,
		}
	}

	/// Reads `source` from its first vertex to exhaustion.
	pub fn from_source<S: VertexSource + ?Sized>(source: &mut S) -> Self {
		let mut container = Self::new();
		container.append_source(source);
		container
	}

	pub fn from_bez_path(path: &BezPath) -> Self {
		let mut container = Self::new();
		container.append_bez_path(path);
		container
	}

	pub fn append_source<S: VertexSource + ?Sized>(&mut self, source: &mut S) {
		if !source.rewind_vertices(0) {
			return;
		}
		let mut vertex = Vertex::default();
		while source.read_vertex(&mut vertex) {
			self.vertices.push(vertex);
		}
	}

	pub fn append_bez_path(&mut self, path: &BezPath) {
		for element in path.elements() {
			match *element {
				PathEl::MoveTo(p) => self.move_to(dvec(p)),
				PathEl::LineTo(p) => self.line_to(dvec(p)),
				PathEl::QuadTo(c, p) => self.curve_to(dvec(p), dvec(c)),
				PathEl::CurveTo(c1, c2, p) => self.cubic_to(dvec(p), dvec(c1), dvec(c2)),
				PathEl::ClosePath => self.close(),
			}
		}
	}

	pub fn add_vertex(&mut self, command: VertexCommand, x: f64, y: f64) {
		self.vertices.push(Vertex::new(command, x, y));
	}

	pub fn move_to(&mut self, point: DVec2) {
		self.vertices.push(Vertex::at(VertexCommand::Move, point));
	}

	pub fn line_to(&mut self, point: DVec2) {
		self.vertices.push(Vertex::at(VertexCommand::Line, point));
	}

	/// Quadratic curve to `end` using `control`.
	pub fn curve_to(&mut self, end: DVec2, control: DVec2) {
		self.vertices.push(Vertex::at(VertexCommand::Curve, end));
		self.vertices.push(Vertex::at(VertexCommand::Curve, control));
	}

	/// Cubic curve to `end` using the two controls.
	pub fn cubic_to(&mut self, end: DVec2, control1: DVec2, control2: DVec2) {
		self.vertices.push(Vertex::at(VertexCommand::Curve2, end));
		self.vertices.push(Vertex::at(VertexCommand::Curve2, control1));
		self.vertices.push(Vertex::at(VertexCommand::Curve2, control2));
	}

	pub fn close(&mut self) {
		self.vertices.push(Vertex::close());
	}

	pub fn vertices(&self) -> &[Vertex] {
		&self.vertices
	}

	pub fn len(&self) -> usize {
		self.vertices.len()
	}

	pub fn is_empty(&self) -> bool {
		self.vertices.is_empty()
	}

	/// Whether there is at least one contour and every contour ends with a `Close`.
	pub fn is_closed(&self) -> bool {
		let mut contours = 0;
		let mut open = false;
		for vertex in &self.vertices {
			match vertex.command {
				VertexCommand::Move => {
					if open {
						return false;
					}
					open = true;
					contours += 1;
				}
				VertexCommand::Close => open = false,
				_ => {}
			}
		}
		contours > 0 && !open
	}

	pub fn clear(&mut self) {
		self.vertices.clear();
		self.cursor = 0;
	}
}

impl VertexSource for VertexContainer {
	fn rewind_vertices(&mut self, index: usize) -> bool {
		self.cursor = index;
		index < self.vertices.len()
	}

	fn read_vertex(&mut self, vertex: &mut Vertex) -> bool {
		let Some(next) = self.vertices.get(self.cursor) else { return false };
		*vertex = *next;
		self.cursor += 1;
		true
	}
}

impl FromIterator<Vertex> for VertexContainer {
	fn from_iter<T: IntoIterator<Item = Vertex>>(iter: T) -> Self {
		Self {
			vertices: iter.into_iter().collect(),
			cursor: 0,
		}
	}
}

pub(crate) fn point(vector: DVec2) -> Point {
	Point::new(vector.x, vector.y)
}

pub(crate) fn dvec(point: Point) -> DVec2 {
	DVec2::new(point.x, point.y)
}

/// Reads a whole source into a kurbo path, grouping curve vertices with their controls.
///
/// Drawing commands before the first `Move` start a contour at their own position.
pub fn to_bez_path<S: VertexSource + ?Sized>(source: &mut S) -> BezPath {
	let mut path = BezPath::new();
	if !source.rewind_vertices(0) {
		return path;
	}

	let mut vertex = Vertex::default();
	let mut control = Vertex::default();
	let mut has_current = false;
	while source.read_vertex(&mut vertex) {
		let end = point(vertex.position());
		if !has_current && !matches!(vertex.command, VertexCommand::Move | VertexCommand::Close) {
			path.move_to(end);
			has_current = true;
			continue;
		}
		match vertex.command {
			VertexCommand::Move => {
				path.move_to(end);
				has_current = true;
			}
			VertexCommand::Line => path.line_to(end),
			VertexCommand::Curve => {
				if source.read_vertex(&mut control) {
					path.quad_to(point(control.position()), end);
				} else {
					log::trace!("Quadratic curve without control vertex, drawing a line instead");
					path.line_to(end);
				}
			}
			VertexCommand::Curve2 => {
				let mut control2 = Vertex::default();
				if source.read_vertex(&mut control) && source.read_vertex(&mut control2) {
					path.curve_to(point(control.position()), point(control2.position()), end);
				} else {
					log::trace!("Cubic curve without both control vertices, drawing a line instead");
					path.line_to(end);
				}
			}
			VertexCommand::Close => {
				if has_current {
					path.close_path();
				}
				has_current = false;
			}
		}
	}
	path
}
