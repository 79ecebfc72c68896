use crate::properties::{PropertyMap, PropertyValue};

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use vertex_rs::Rect;

/// Stable identity of a node inside a [`crate::Scene`]. Identifiers are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// The type tag of a node. It decides which properties exist and where the node may live in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
	Scene,
	Page,
	Layer,
	Group,
	Path,
	Rectangle,
	Ellipse,
	/// Container holding the style attributes of an element, in render order.
	Attributes,
	Fill,
	Stroke,
	Blur,
	Shadow,
	/// Vector effect painting an inset and/or outset of the element's geometry.
	Offset,
}

impl NodeKind {
	/// Nodes with geometry and paint behavior.
	pub fn is_element(self) -> bool {
		!matches!(self, NodeKind::Attributes) && !self.is_attribute()
	}

	/// Elements living inside layers.
	pub fn is_item(self) -> bool {
		matches!(self, NodeKind::Group | NodeKind::Path | NodeKind::Rectangle | NodeKind::Ellipse)
	}

	pub fn is_shape(self) -> bool {
		matches!(self, NodeKind::Path | NodeKind::Rectangle | NodeKind::Ellipse)
	}

	pub fn is_attribute(self) -> bool {
		matches!(self, NodeKind::Fill | NodeKind::Stroke | NodeKind::Blur | NodeKind::Shadow | NodeKind::Offset)
	}

	/// Elements which may own an attributes container.
	pub fn is_stylable(self) -> bool {
		self.is_item()
	}

	/// Whether a node of this kind may be inserted into a parent of kind `parent`.
	pub fn validate_insertion(self, parent: NodeKind) -> bool {
		match self {
			NodeKind::Scene => false,
			NodeKind::Page => parent == NodeKind::Scene,
			NodeKind::Layer => matches!(parent, NodeKind::Page | NodeKind::Layer),
			NodeKind::Group | NodeKind::Path | NodeKind::Rectangle | NodeKind::Ellipse => matches!(parent, NodeKind::Layer | NodeKind::Group),
			NodeKind::Attributes => parent.is_stylable(),
			NodeKind::Fill | NodeKind::Stroke | NodeKind::Blur | NodeKind::Shadow | NodeKind::Offset => parent == NodeKind::Attributes,
		}
	}

	/// Whether a node of this kind may be removed from its parent.
	pub fn validate_removal(self) -> bool {
		!matches!(self, NodeKind::Scene | NodeKind::Attributes)
	}
}

bitflags! {
	/// State flags of a node. Only [`NodeFlags::PERSISTENT`] flags are part of the document.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
	pub struct NodeFlags: u8 {
		const SELECTED = 0b0000_0001;
		const HIGHLIGHTED = 0b0000_0010;
		const ACTIVE = 0b0000_0100;
		const HIDDEN = 0b0000_1000;
		const LOCKED = 0b0001_0000;
	}
}

impl NodeFlags {
	pub const PERSISTENT: NodeFlags = NodeFlags::HIDDEN.union(NodeFlags::LOCKED);
}

/// A node stored in the scene arena.
#[derive(Debug, Clone)]
pub struct Node {
	pub(crate) id: NodeId,
	pub(crate) kind: NodeKind,
	pub(crate) parent: Option<NodeId>,
	pub(crate) children: Vec<NodeId>,
	pub(crate) flags: NodeFlags,
	pub(crate) properties: PropertyMap,
	pub(crate) geometry_bbox: Cell<Option<Option<Rect>>>,
	pub(crate) paint_bbox: Cell<Option<Option<Rect>>>,
}

impl Node {
	pub(crate) fn new(id: NodeId, kind: NodeKind, flags: NodeFlags, properties: PropertyMap) -> Self {
		Self {
			id,
			kind,
			parent: None,
			children: Vec::new(),
			flags,
			properties,
			geometry_bbox: Cell::new(None),
			paint_bbox: Cell::new(None),
		}
	}

	pub fn id(&self) -> NodeId {
		self.id
	}

	pub fn kind(&self) -> NodeKind {
		self.kind
	}

	pub fn parent(&self) -> Option<NodeId> {
		self.parent
	}

	pub fn children(&self) -> &[NodeId] {
		&self.children
	}

	pub fn flags(&self) -> NodeFlags {
		self.flags
	}

	pub fn has_flag(&self, flag: NodeFlags) -> bool {
		self.flags.contains(flag)
	}

	pub fn properties(&self) -> &PropertyMap {
		&self.properties
	}

	pub fn property(&self, name: &str) -> Option<&PropertyValue> {
		self.properties.get(name)
	}

	pub(crate) fn invalidate_geometry(&self) {
		self.geometry_bbox.set(None);
		self.paint_bbox.set(None);
	}

	pub(crate) fn invalidate_paint(&self) {
		self.paint_bbox.set(None);
	}
}
