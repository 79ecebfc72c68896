use thiserror::Error;

/// Errors raised by the geometry primitives.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum GeometryError {
	#[error("The transform can not be inverted (determinant {determinant})")]
	DegenerateTransform { determinant: f64 },

	#[error("Unknown vertex command tag {0}")]
	UnknownCommand(u8),
}
