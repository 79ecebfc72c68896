use crate::node::{NodeId, NodeKind};

use thiserror::Error;
use vertex_rs::GeometryError;

/// A mutation that would violate the structure of the scene tree. The tree is left unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StructureError {
	#[error("Node {0} is already part of the scene")]
	AlreadyAttached(NodeId),

	#[error("Node {child} is not a child of {parent}")]
	NotAChild { parent: NodeId, child: NodeId },

	#[error("A {child:?} can not be inserted into a {parent:?}")]
	InvalidParent { child: NodeKind, parent: NodeKind },

	#[error("Node {0} can not be removed from its parent")]
	RemovalDenied(NodeId),

	#[error("Node {0} can not be moved into itself or one of its descendants")]
	CyclicInsertion(NodeId),
}

/// The error type used by the scene graph.
#[derive(Debug, Error)]
pub enum DocumentError {
	#[error("Node {0} does not exist")]
	NodeNotFound(NodeId),

	#[error(transparent)]
	Structure(#[from] StructureError),

	#[error("Node {node} is a {actual:?} but a {expected:?} is required")]
	UnexpectedKind { node: NodeId, expected: NodeKind, actual: NodeKind },

	#[error("A {kind:?} has no property named {name:?}")]
	UnknownProperty { kind: NodeKind, name: String },

	#[error("Invalid value for property {name:?}: {reason}")]
	InvalidPropertyValue { name: String, reason: String },

	#[error("Got {names} property names but {values} values")]
	PropertyCountMismatch { names: usize, values: usize },

	#[error("Failed to (de)serialize nodes: {0}")]
	Serialization(#[from] serde_json::Error),

	#[error(transparent)]
	Geometry(#[from] GeometryError),
}
