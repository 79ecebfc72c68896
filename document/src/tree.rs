use crate::error::{DocumentError, StructureError};
use crate::node::{NodeFlags, NodeId, NodeKind};
use crate::properties::{default_properties, property_def, PathAnchor, PropertyMap, PropertyValue};
use crate::Color;

use glam::DVec2;
use serde::{Deserialize, Serialize};
use vertex_rs::Transform;

/// An owned node subtree living outside of a scene.
///
/// This is both the unit of insertion and removal and the serialization record of a node:
/// `{ "type": kind, "properties": {...}, "flags": ..., "children": [...] }`.
/// Identifiers are kept while a subtree is detached so that reinserting it restores the same ids, but they are never serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeTree {
	#[serde(skip)]
	pub(crate) id: Option<NodeId>,
	#[serde(rename = "type")]
	pub kind: NodeKind,
	#[serde(default)]
	pub properties: PropertyMap,
	#[serde(default, skip_serializing_if = "NodeFlags::is_empty")]
	pub flags: NodeFlags,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub children: Vec<NodeTree>,
}

impl NodeTree {
	/// A detached node of `kind` with default properties.
	pub fn new(kind: NodeKind) -> Self {
		Self {
			id: None,
			kind,
			properties: default_properties(kind),
			flags: NodeFlags::empty(),
			children: Vec::new(),
		}
	}

	pub fn id(&self) -> Option<NodeId> {
		self.id
	}

	/// Sets a property, validating it against the schema of the node kind.
	pub fn set(&mut self, name: &str, value: impl Into<PropertyValue>) -> Result<(), DocumentError> {
		let value = value.into();
		let def = property_def(self.kind, name).ok_or_else(|| DocumentError::UnknownProperty {
			kind: self.kind,
			name: name.to_string(),
		})?;
		def.validate(&value).map_err(|reason| DocumentError::InvalidPropertyValue { name: name.to_string(), reason })?;
		self.properties.insert(name.to_string(), value);
		Ok(())
	}

	/// Builder flavor of [`NodeTree::set`].
	pub fn with(mut self, name: &str, value: impl Into<PropertyValue>) -> Result<Self, DocumentError> {
		self.set(name, value)?;
		Ok(self)
	}

	#[must_use]
	pub fn with_child(mut self, child: NodeTree) -> Self {
		self.children.push(child);
		self
	}

	/// Appends `attribute` to the attributes container of this node, creating the container when missing.
	#[must_use]
	pub fn with_attribute(mut self, attribute: NodeTree) -> Self {
		match self.children.iter_mut().find(|child| child.kind == NodeKind::Attributes) {
			Some(attributes) => attributes.children.push(attribute),
			None => self.children.push(NodeTree::new(NodeKind::Attributes).with_child(attribute)),
		}
		self
	}

	pub fn property(&self, name: &str) -> Option<&PropertyValue> {
		self.properties.get(name)
	}

	/// Number of nodes in this subtree, including itself.
	pub fn node_count(&self) -> usize {
		1 + self.children.iter().map(NodeTree::node_count).sum::<usize>()
	}

	/// Identifiers of this subtree in pre-order. Nodes without an id are skipped.
	pub fn ids(&self) -> Vec<NodeId> {
		let mut ids = Vec::new();
		self.visit(&mut |tree| ids.extend(tree.id));
		ids
	}

	fn visit(&self, visitor: &mut impl FnMut(&NodeTree)) {
		visitor(self);
		self.children.iter().for_each(|child| child.visit(visitor));
	}

	/// Drops all identifiers, so the subtree is inserted as new nodes.
	#[must_use]
	pub fn without_ids(mut self) -> Self {
		self.strip_ids();
		self
	}

	fn strip_ids(&mut self) {
		self.id = None;
		self.children.iter_mut().for_each(NodeTree::strip_ids);
	}

	/// Drops transient flags such as the selection from the whole subtree.
	pub(crate) fn retain_persistent_flags(&mut self) {
		self.flags &= NodeFlags::PERSISTENT;
		self.children.iter_mut().for_each(NodeTree::retain_persistent_flags);
	}

	/// Checks the internal structure and all property values of the subtree and fills in missing properties with their defaults.
	pub fn normalize(&mut self) -> Result<(), DocumentError> {
		for (name, value) in &self.properties {
			let def = property_def(self.kind, name).ok_or_else(|| DocumentError::UnknownProperty {
				kind: self.kind,
				name: name.clone(),
			})?;
			def.validate(value).map_err(|reason| DocumentError::InvalidPropertyValue { name: name.clone(), reason })?;
		}
		for (name, value) in default_properties(self.kind) {
			self.properties.entry(name).or_insert(value);
		}

		let mut has_attributes = false;
		for child in &mut self.children {
			if !child.kind.validate_insertion(self.kind) || (child.kind == NodeKind::Attributes && has_attributes) {
				return Err(StructureError::InvalidParent {
					child: child.kind,
					parent: self.kind,
				}
				.into());
			}
			has_attributes |= child.kind == NodeKind::Attributes;
			child.normalize()?;
		}
		Ok(())
	}

	/// Attribute nodes of this subtree's attributes container, in render order.
	pub fn attributes(&self) -> impl Iterator<Item = &NodeTree> {
		self.children.iter().filter(|child| child.kind == NodeKind::Attributes).flat_map(|attributes| attributes.children.iter())
	}

	pub fn to_json(&self) -> Result<String, DocumentError> {
		Ok(serde_json::to_string(self)?)
	}

	/// Parses and normalizes a single serialized node.
	pub fn from_json(json: &str) -> Result<Self, DocumentError> {
		let mut tree: NodeTree = serde_json::from_str(json)?;
		tree.normalize()?;
		Ok(tree)
	}

	/// Serializes several subtrees into one payload, as used for the clipboard.
	pub fn list_to_json(trees: &[NodeTree]) -> Result<String, DocumentError> {
		Ok(serde_json::to_string(trees)?)
	}

	pub fn list_from_json(json: &str) -> Result<Vec<NodeTree>, DocumentError> {
		let mut trees: Vec<NodeTree> = serde_json::from_str(json)?;
		trees.iter_mut().try_for_each(NodeTree::normalize)?;
		Ok(trees)
	}
}

/// Convenience constructors for common elements.
impl NodeTree {
	pub fn page(x: f64, y: f64, width: f64, height: f64) -> Result<Self, DocumentError> {
		NodeTree::new(NodeKind::Page).with("x", x)?.with("y", y)?.with("width", width)?.with("height", height)
	}

	pub fn layer(name: &str) -> Result<Self, DocumentError> {
		NodeTree::new(NodeKind::Layer).with("name", name)
	}

	pub fn group(children: Vec<NodeTree>) -> Self {
		let mut group = NodeTree::new(NodeKind::Group);
		group.children = children;
		group
	}

	pub fn rectangle(x: f64, y: f64, width: f64, height: f64) -> Result<Self, DocumentError> {
		NodeTree::new(NodeKind::Rectangle).with("x", x)?.with("y", y)?.with("width", width)?.with("height", height)
	}

	pub fn ellipse(center: DVec2, radii: DVec2) -> Result<Self, DocumentError> {
		NodeTree::new(NodeKind::Ellipse).with("cx", center.x)?.with("cy", center.y)?.with("rx", radii.x)?.with("ry", radii.y)
	}

	pub fn path(anchors: Vec<PathAnchor>, closed: bool) -> Result<Self, DocumentError> {
		NodeTree::new(NodeKind::Path).with("anchors", anchors)?.with("closed", closed)
	}

	pub fn fill(color: Color) -> Result<Self, DocumentError> {
		NodeTree::new(NodeKind::Fill).with("color", color)
	}

	pub fn stroke(color: Color, width: f64) -> Result<Self, DocumentError> {
		NodeTree::new(NodeKind::Stroke).with("color", color)?.with("width", width)
	}

	pub fn with_transform(self, transform: Transform) -> Result<Self, DocumentError> {
		self.with("transform", transform)
	}
}
