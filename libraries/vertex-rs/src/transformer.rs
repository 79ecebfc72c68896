use crate::transform::Transform;
use crate::vertex::{Vertex, VertexCommand, VertexSource};

/// Applies a [`Transform`] to every vertex of the decorated source as it is read.
pub struct VertexTransformer<S> {
	source: S,
	transform: Transform,
}

impl<S: VertexSource> VertexTransformer<S> {
	pub fn new(source: S, transform: Transform) -> Self {
		Self { source, transform }
	}

	pub fn transform(&self) -> Transform {
		self.transform
	}

	pub fn set_transform(&mut self, transform: Transform) {
		self.transform = transform;
	}

	pub fn into_inner(self) -> S {
		self.source
	}
}

impl<S: VertexSource> VertexSource for VertexTransformer<S> {
	fn rewind_vertices(&mut self, index: usize) -> bool {
		self.source.rewind_vertices(index)
	}

	fn read_vertex(&mut self, vertex: &mut Vertex) -> bool {
		if !self.source.read_vertex(vertex) {
			return false;
		}
		match vertex.command {
			VertexCommand::Move | VertexCommand::Line | VertexCommand::Curve | VertexCommand::Curve2 => {
				vertex.set_position(self.transform.map_point(vertex.position()));
			}
			VertexCommand::Close => {}
		}
		true
	}
}
