use crate::error::{DocumentError, StructureError};
use crate::events::{NodeEvent, ObserverId, SceneObserver};
use crate::journal::Change;
use crate::node::{Node, NodeFlags, NodeId, NodeKind};
use crate::properties::{default_properties, property_def, PropertyImpact, PropertyValue};
use crate::tree::NodeTree;
use crate::Color;

use rustc_hash::FxHashMap;
use vertex_rs::{Rect, Transform};

/// The document: an arena of nodes rooted at a single scene node.
///
/// Every mutation goes through the methods of this type, which validate the request first, so that a failed call leaves the tree untouched,
/// then notify observers, record the change when journaling and keep the cached bounding boxes and repaint areas up to date.
pub struct Scene {
	nodes: FxHashMap<NodeId, Node>,
	root: NodeId,
	next_id: u64,
	active_page: Option<NodeId>,
	active_layer: Option<NodeId>,
	observers: Vec<(ObserverId, Box<dyn SceneObserver>)>,
	next_observer_id: u64,
	journal: Option<Vec<Change>>,
	invalidations: Vec<Rect>,
}

impl Default for Scene {
	fn default() -> Self {
		Self::new()
	}
}

impl Scene {
	/// An empty scene holding only the root node.
	pub fn new() -> Self {
		let root = NodeId(0);
		let mut nodes = FxHashMap::default();
		nodes.insert(root, Node::new(root, NodeKind::Scene, NodeFlags::empty(), default_properties(NodeKind::Scene)));
		Self {
			nodes,
			root,
			next_id: 1,
			active_page: None,
			active_layer: None,
			observers: Vec::new(),
			next_observer_id: 0,
			journal: None,
			invalidations: Vec::new(),
		}
	}

	/// A scene with one page of the given size at the origin holding one layer, both active.
	pub fn with_page(width: f64, height: f64) -> Result<Self, DocumentError> {
		let mut scene = Self::new();
		let page = NodeTree::page(0., 0., width, height)?.with_child(NodeTree::layer("Layer 1")?);
		scene.append_child(scene.root, page)?;
		Ok(scene)
	}

	pub fn root(&self) -> NodeId {
		self.root
	}

	pub fn contains(&self, id: NodeId) -> bool {
		self.nodes.contains_key(&id)
	}

	pub fn node(&self, id: NodeId) -> Option<&Node> {
		self.nodes.get(&id)
	}

	/// Like [`Scene::node`] but failing with [`DocumentError::NodeNotFound`].
	pub fn get(&self, id: NodeId) -> Result<&Node, DocumentError> {
		self.nodes.get(&id).ok_or(DocumentError::NodeNotFound(id))
	}

	fn get_mut(&mut self, id: NodeId) -> Result<&mut Node, DocumentError> {
		self.nodes.get_mut(&id).ok_or(DocumentError::NodeNotFound(id))
	}

	pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
		self.node(id).map(Node::kind)
	}

	pub fn parent(&self, id: NodeId) -> Option<NodeId> {
		self.node(id).and_then(Node::parent)
	}

	pub fn children(&self, id: NodeId) -> &[NodeId] {
		self.node(id).map(Node::children).unwrap_or_default()
	}

	pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
		self.children(id).first().copied()
	}

	pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
		self.children(id).last().copied()
	}

	pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
		self.parent(id).and_then(|parent| self.children(parent).iter().position(|&child| child == id))
	}

	pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
		let parent = self.parent(id)?;
		let index = self.index_in_parent(id)?;
		self.children(parent).get(index + 1).copied()
	}

	pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
		let parent = self.parent(id)?;
		let index = self.index_in_parent(id)?;
		index.checked_sub(1).and_then(|index| self.children(parent).get(index).copied())
	}

	/// Ancestors of `id` from its parent up to the root.
	pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
		std::iter::successors(self.parent(id), move |&id| self.parent(id))
	}

	pub fn is_ancestor_of(&self, ancestor: NodeId, id: NodeId) -> bool {
		self.ancestors(id).any(|candidate| candidate == ancestor)
	}

	/// All nodes below `id` in pre-order, not including `id`.
	pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
		let mut result = Vec::new();
		let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
		while let Some(current) = stack.pop() {
			result.push(current);
			stack.extend(self.children(current).iter().rev());
		}
		result
	}

	/// Nearest ancestor-or-self of the given kind.
	pub fn closest(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
		std::iter::once(id).chain(self.ancestors(id)).find(|&candidate| self.kind(candidate) == Some(kind))
	}

	/// The item directly below a layer that contains `id`, which is what selection operates on.
	pub fn top_level_item(&self, id: NodeId) -> Option<NodeId> {
		std::iter::once(id)
			.chain(self.ancestors(id))
			.find(|&candidate| self.kind(candidate).is_some_and(NodeKind::is_item) && self.kind_of_parent(candidate) == Some(NodeKind::Layer))
	}

	fn kind_of_parent(&self, id: NodeId) -> Option<NodeKind> {
		self.parent(id).and_then(|parent| self.kind(parent))
	}

	pub fn pages(&self) -> Vec<NodeId> {
		self.children_of_kind(self.root, NodeKind::Page)
	}

	/// Layers directly below `parent`, which is a page or a layer.
	pub fn layers(&self, parent: NodeId) -> Vec<NodeId> {
		self.children_of_kind(parent, NodeKind::Layer)
	}

	fn children_of_kind(&self, parent: NodeId, kind: NodeKind) -> Vec<NodeId> {
		self.children(parent).iter().copied().filter(|&child| self.kind(child) == Some(kind)).collect()
	}

	/// The attributes container of a stylable node.
	pub fn attributes_of(&self, id: NodeId) -> Option<NodeId> {
		self.children(id).iter().copied().find(|&child| self.kind(child) == Some(NodeKind::Attributes))
	}

	/// Attribute nodes of `id` in render order.
	pub fn attribute_nodes(&self, id: NodeId) -> &[NodeId] {
		self.attributes_of(id).map(|attributes| self.children(attributes)).unwrap_or_default()
	}

	pub fn has_flag(&self, id: NodeId, flag: NodeFlags) -> bool {
		self.node(id).is_some_and(|node| node.has_flag(flag))
	}

	/// Whether `id` or any of its ancestors carries `flag`.
	pub fn has_inherited_flag(&self, id: NodeId, flag: NodeFlags) -> bool {
		std::iter::once(id).chain(self.ancestors(id)).any(|candidate| self.has_flag(candidate, flag))
	}

	/// All nodes currently carrying `flag`, in document order.
	pub fn flagged(&self, flag: NodeFlags) -> Vec<NodeId> {
		std::iter::once(self.root).chain(self.descendants(self.root)).filter(|&id| self.has_flag(id, flag)).collect()
	}

	pub fn property(&self, id: NodeId, name: &str) -> Option<&PropertyValue> {
		self.node(id).and_then(|node| node.property(name))
	}

	pub fn number(&self, id: NodeId, name: &str) -> f64 {
		self.property(id, name).and_then(PropertyValue::as_number).unwrap_or_default()
	}

	pub fn boolean(&self, id: NodeId, name: &str) -> bool {
		self.property(id, name).and_then(PropertyValue::as_bool).unwrap_or_default()
	}

	pub fn text(&self, id: NodeId, name: &str) -> &str {
		self.property(id, name).and_then(PropertyValue::as_text).unwrap_or_default()
	}

	pub fn color(&self, id: NodeId, name: &str) -> Color {
		self.property(id, name).and_then(PropertyValue::as_color).unwrap_or(Color::BLACK)
	}

	pub fn transform(&self, id: NodeId, name: &str) -> Transform {
		self.property(id, name).and_then(PropertyValue::as_transform).unwrap_or_default()
	}

	// Structure

	pub fn append_child(&mut self, parent: NodeId, tree: NodeTree) -> Result<NodeId, DocumentError> {
		self.insert_child(parent, tree, None)
	}

	/// Inserts `tree` below `parent`, before the child `before` or last when `None`, and returns the id of its root.
	///
	/// Nodes of the subtree without an id get a fresh one; ids carried over from a previous removal are kept.
	pub fn insert_child(&mut self, parent: NodeId, mut tree: NodeTree, before: Option<NodeId>) -> Result<NodeId, DocumentError> {
		let parent_kind = self.get(parent)?.kind;
		if let Some(before) = before {
			if self.get(before)?.parent != Some(parent) {
				return Err(StructureError::NotAChild { parent, child: before }.into());
			}
		}
		if !tree.kind.validate_insertion(parent_kind) || (tree.kind == NodeKind::Attributes && self.attributes_of(parent).is_some()) {
			return Err(StructureError::InvalidParent { child: tree.kind, parent: parent_kind }.into());
		}
		if let Some(id) = tree.ids().into_iter().find(|id| self.nodes.contains_key(id)) {
			return Err(StructureError::AlreadyAttached(id).into());
		}
		tree.normalize()?;
		tree.retain_persistent_flags();

		let child = self.assign_ids(&mut tree);
		let is_element = tree.kind.is_element();
		let contains_page = tree.kind == NodeKind::Page;
		let contains_layer = contains_page || tree.kind == NodeKind::Layer;
		log::trace!("Inserting {:?} {child} into {parent}", tree.kind);

		self.notify(NodeEvent::BeforeChildInsert { parent, child });
		if !is_element {
			self.queue_repaint(parent);
		}
		if let Some(journal) = &mut self.journal {
			journal.push(Change::Insert {
				parent,
				child,
				before,
				tree: tree.clone(),
			});
		}

		self.attach(parent, tree);
		let siblings = &mut self.get_mut(parent)?.children;
		let index = before.and_then(|before| siblings.iter().position(|&sibling| sibling == before)).unwrap_or(siblings.len());
		siblings.insert(index, child);

		self.invalidate_upwards(parent, is_element);
		self.queue_repaint(child);
		if contains_page && self.active_page.is_none() {
			self.set_active_page(child)?;
		}
		if contains_layer && self.active_layer.is_none() {
			self.activate_first_layer()?;
		}
		self.notify(NodeEvent::AfterChildInsert { parent, child });
		Ok(child)
	}

	fn assign_ids(&mut self, tree: &mut NodeTree) -> NodeId {
		let id = match tree.id {
			Some(id) => id,
			None => {
				let id = NodeId(self.next_id);
				tree.id = Some(id);
				id
			}
		};
		self.next_id = self.next_id.max(id.0 + 1);
		for child in &mut tree.children {
			self.assign_ids(child);
		}
		id
	}

	fn attach(&mut self, parent: NodeId, tree: NodeTree) -> NodeId {
		let NodeTree { id, kind, properties, flags, children } = tree;
		let id = id.unwrap_or_else(|| {
			self.next_id += 1;
			NodeId(self.next_id - 1)
		});
		let mut node = Node::new(id, kind, flags, properties);
		node.parent = Some(parent);
		self.nodes.insert(id, node);
		for child in children {
			let child = self.attach(id, child);
			if let Some(node) = self.nodes.get_mut(&id) {
				node.children.push(child);
			}
		}
		id
	}

	/// Removes `child` and its subtree from `parent` and hands the detached subtree back, ids included.
	pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeTree, DocumentError> {
		let node = self.get(child)?;
		if node.parent != Some(parent) {
			return Err(StructureError::NotAChild { parent, child }.into());
		}
		if !node.kind.validate_removal() {
			return Err(StructureError::RemovalDenied(child).into());
		}
		let is_element = node.kind.is_element();
		let before = self.next_sibling(child);
		log::trace!("Removing {:?} {child} from {parent}", node.kind);

		self.notify(NodeEvent::BeforeChildRemove { parent, child });
		self.queue_repaint(child);

		let removed = std::iter::once(child).chain(self.descendants(child)).collect::<Vec<_>>();
		let tree = self.detach(child).ok_or(DocumentError::NodeNotFound(child))?;
		self.get_mut(parent)?.children.retain(|&sibling| sibling != child);
		if let Some(journal) = &mut self.journal {
			journal.push(Change::Remove {
				parent,
				child,
				before,
				tree: tree.clone(),
			});
		}

		self.invalidate_upwards(parent, is_element);
		if !is_element {
			self.queue_repaint(parent);
		}
		if self.active_page.is_some_and(|page| removed.contains(&page)) {
			self.active_page = None;
			if let Some(&page) = self.pages().first() {
				self.set_active_page(page)?;
			}
		}
		if self.active_layer.is_some_and(|layer| removed.contains(&layer)) {
			self.active_layer = None;
			self.activate_first_layer()?;
		}
		self.notify(NodeEvent::AfterChildRemove { parent, child });
		Ok(tree)
	}

	fn detach(&mut self, id: NodeId) -> Option<NodeTree> {
		let node = self.nodes.remove(&id)?;
		let children = node.children.iter().filter_map(|&child| self.detach(child)).collect();
		Some(NodeTree {
			id: Some(id),
			kind: node.kind,
			properties: node.properties,
			flags: node.flags & NodeFlags::PERSISTENT,
			children,
		})
	}

	/// Moves `id` below `parent`, before `before` or last. Validated up front, so a failing move changes nothing.
	pub fn move_node(&mut self, id: NodeId, parent: NodeId, before: Option<NodeId>) -> Result<(), DocumentError> {
		let node = self.get(id)?;
		let kind = node.kind;
		let old_parent = node.parent.ok_or(StructureError::RemovalDenied(id))?;
		if !kind.validate_removal() {
			return Err(StructureError::RemovalDenied(id).into());
		}
		let parent_kind = self.get(parent)?.kind;
		if id == parent || self.is_ancestor_of(id, parent) {
			return Err(StructureError::CyclicInsertion(id).into());
		}
		if !kind.validate_insertion(parent_kind) {
			return Err(StructureError::InvalidParent { child: kind, parent: parent_kind }.into());
		}
		if let Some(before) = before {
			if before == id || self.get(before)?.parent != Some(parent) {
				return Err(StructureError::NotAChild { parent, child: before }.into());
			}
		}
		if old_parent == parent && self.next_sibling(id) == before {
			return Ok(());
		}

		let tree = self.remove_child(old_parent, id)?;
		self.insert_child(parent, tree, before)?;
		Ok(())
	}

	/// A detached copy of the subtree at `id`, keeping ids and persistent flags.
	pub fn store(&self, id: NodeId) -> Result<NodeTree, DocumentError> {
		Ok(self.store_node(self.get(id)?))
	}

	fn store_node(&self, node: &Node) -> NodeTree {
		NodeTree {
			id: Some(node.id),
			kind: node.kind,
			properties: node.properties.clone(),
			flags: node.flags & NodeFlags::PERSISTENT,
			children: node.children.iter().filter_map(|child| self.nodes.get(child)).map(|child| self.store_node(child)).collect(),
		}
	}

	// Properties

	pub fn set_property(&mut self, id: NodeId, name: &str, value: impl Into<PropertyValue>) -> Result<bool, DocumentError> {
		self.set_properties(id, &[name], vec![value.into()])
	}

	/// Assigns several properties at once.
	///
	/// All values are validated before anything is assigned. Returns whether anything changed: values equal to the current
	/// ones are skipped, and when nothing is left no event is emitted.
	pub fn set_properties(&mut self, id: NodeId, names: &[&str], values: Vec<PropertyValue>) -> Result<bool, DocumentError> {
		if names.len() != values.len() {
			return Err(DocumentError::PropertyCountMismatch {
				names: names.len(),
				values: values.len(),
			});
		}
		let node = self.get(id)?;
		let mut impacts = Vec::with_capacity(names.len());
		for (name, value) in names.iter().zip(&values) {
			let def = property_def(node.kind, name).ok_or_else(|| DocumentError::UnknownProperty {
				kind: node.kind,
				name: name.to_string(),
			})?;
			def.validate(value).map_err(|reason| DocumentError::InvalidPropertyValue { name: name.to_string(), reason })?;
			impacts.push(def.impact);
		}

		let mut changed_names = Vec::new();
		let mut changed_values = Vec::new();
		let mut previous = Vec::new();
		let mut impact = PropertyImpact::None;
		for ((name, value), def_impact) in names.iter().zip(values).zip(impacts) {
			let current = node.property(name);
			if current == Some(&value) {
				continue;
			}
			previous.push(current.cloned().unwrap_or_else(|| value.clone()));
			changed_names.push(name.to_string());
			changed_values.push(value);
			impact = match (impact, def_impact) {
				(PropertyImpact::Geometry, _) | (_, PropertyImpact::Geometry) => PropertyImpact::Geometry,
				(PropertyImpact::Paint, _) | (_, PropertyImpact::Paint) => PropertyImpact::Paint,
				(PropertyImpact::Visual, _) | (_, PropertyImpact::Visual) => PropertyImpact::Visual,
				_ => PropertyImpact::None,
			};
		}
		if changed_names.is_empty() {
			return Ok(false);
		}

		self.notify(NodeEvent::BeforePropertiesChange {
			node: id,
			properties: changed_names.clone(),
			values: changed_values.clone(),
		});
		if impact != PropertyImpact::None {
			self.queue_repaint(id);
		}

		let node = self.get_mut(id)?;
		for (name, value) in changed_names.iter().zip(&changed_values) {
			node.properties.insert(name.clone(), value.clone());
		}
		match impact {
			PropertyImpact::Geometry => self.invalidate_upwards(id, true),
			PropertyImpact::Paint => self.invalidate_upwards(id, false),
			PropertyImpact::Visual | PropertyImpact::None => {}
		}
		if impact != PropertyImpact::None {
			self.queue_repaint(id);
		}
		if let Some(journal) = &mut self.journal {
			journal.push(Change::Properties {
				node: id,
				names: changed_names.clone(),
				previous: previous.clone(),
				values: changed_values,
			});
		}

		self.notify(NodeEvent::AfterPropertiesChange {
			node: id,
			properties: changed_names,
			previous,
		});
		Ok(true)
	}

	// Flags

	/// Sets or clears `flag` on `id`, returning whether the flags changed.
	pub fn set_flag(&mut self, id: NodeId, flag: NodeFlags, set: bool) -> Result<bool, DocumentError> {
		if self.get(id)?.has_flag(flag) == set && (set || !self.get(id)?.flags.intersects(flag)) {
			return Ok(false);
		}
		let affects_geometry = flag.intersects(NodeFlags::HIDDEN);
		let visual = flag.intersects(NodeFlags::HIDDEN | NodeFlags::SELECTED | NodeFlags::HIGHLIGHTED);

		self.notify(NodeEvent::BeforeFlagChange { node: id, flag, set });
		if visual {
			self.queue_repaint(id);
		}
		self.get_mut(id)?.flags.set(flag, set);
		if affects_geometry {
			self.invalidate_upwards(id, true);
		}
		if visual {
			self.queue_repaint(id);
		}
		let persistent = flag & NodeFlags::PERSISTENT;
		if let Some(journal) = self.journal.as_mut().filter(|_| !persistent.is_empty()) {
			journal.push(Change::Flag { node: id, flag: persistent, set });
		}
		self.notify(NodeEvent::AfterFlagChange { node: id, flag, set });
		Ok(true)
	}

	// Active page and layer

	pub fn active_page(&self) -> Option<NodeId> {
		self.active_page
	}

	pub fn active_layer(&self) -> Option<NodeId> {
		self.active_layer
	}

	fn expect_kind(&self, id: NodeId, expected: NodeKind) -> Result<(), DocumentError> {
		let actual = self.get(id)?.kind;
		if actual != expected {
			return Err(DocumentError::UnexpectedKind { node: id, expected, actual });
		}
		Ok(())
	}

	/// Makes `page` the active page. The active layer moves to the first layer of the page unless it already belongs to it.
	pub fn set_active_page(&mut self, page: NodeId) -> Result<(), DocumentError> {
		self.expect_kind(page, NodeKind::Page)?;
		if let Some(previous) = self.active_page.filter(|&previous| previous != page && self.contains(previous)) {
			self.set_flag(previous, NodeFlags::ACTIVE, false)?;
		}
		self.active_page = Some(page);
		self.set_flag(page, NodeFlags::ACTIVE, true)?;
		if !self.active_layer.is_some_and(|layer| self.is_ancestor_of(page, layer)) {
			if let Some(layer) = self.active_layer.take().filter(|&layer| self.contains(layer)) {
				self.set_flag(layer, NodeFlags::ACTIVE, false)?;
			}
			self.activate_first_layer()?;
		}
		Ok(())
	}

	/// Makes `layer` the active layer, activating its page as well.
	pub fn set_active_layer(&mut self, layer: NodeId) -> Result<(), DocumentError> {
		self.expect_kind(layer, NodeKind::Layer)?;
		if let Some(page) = self.closest(layer, NodeKind::Page) {
			if self.active_page != Some(page) {
				if let Some(previous) = self.active_page.filter(|&previous| self.contains(previous)) {
					self.set_flag(previous, NodeFlags::ACTIVE, false)?;
				}
				self.active_page = Some(page);
				self.set_flag(page, NodeFlags::ACTIVE, true)?;
			}
		}
		if let Some(previous) = self.active_layer.filter(|&previous| previous != layer && self.contains(previous)) {
			self.set_flag(previous, NodeFlags::ACTIVE, false)?;
		}
		self.active_layer = Some(layer);
		self.set_flag(layer, NodeFlags::ACTIVE, true)?;
		Ok(())
	}

	fn activate_first_layer(&mut self) -> Result<(), DocumentError> {
		let Some(page) = self.active_page else { return Ok(()) };
		match self.layers(page).first() {
			Some(&layer) => self.set_active_layer(layer),
			None => Ok(()),
		}
	}

	// Observers

	pub fn add_observer(&mut self, observer: Box<dyn SceneObserver>) -> ObserverId {
		let id = ObserverId(self.next_observer_id);
		self.next_observer_id += 1;
		self.observers.push((id, observer));
		id
	}

	pub fn remove_observer(&mut self, id: ObserverId) -> Option<Box<dyn SceneObserver>> {
		let index = self.observers.iter().position(|(observer, _)| *observer == id)?;
		Some(self.observers.remove(index).1)
	}

	fn notify(&mut self, event: NodeEvent) {
		if self.observers.is_empty() {
			return;
		}
		let mut observers = std::mem::take(&mut self.observers);
		for (_, observer) in &mut observers {
			observer.handle_event(self, &event);
		}
		self.observers = observers;
	}

	// Journal

	/// Starts collecting every mutation as a [`Change`]. Restarting discards what was collected so far.
	pub fn begin_recording(&mut self) {
		if self.journal.is_some() {
			log::warn!("Restarting a change recording that was never ended");
		}
		self.journal = Some(Vec::new());
	}

	pub fn end_recording(&mut self) -> Vec<Change> {
		self.journal.take().unwrap_or_default()
	}

	pub fn is_recording(&self) -> bool {
		self.journal.is_some()
	}

	/// Performs a recorded change again.
	pub fn apply_change(&mut self, change: &Change) -> Result<(), DocumentError> {
		match change {
			Change::Insert { parent, before, tree, .. } => self.insert_child(*parent, tree.clone(), *before).map(|_| ()),
			Change::Remove { parent, child, .. } => self.remove_child(*parent, *child).map(|_| ()),
			Change::Properties { node, names, values, .. } => {
				let names = names.iter().map(String::as_str).collect::<Vec<_>>();
				self.set_properties(*node, &names, values.clone()).map(|_| ())
			}
			Change::Flag { node, flag, set } => self.set_flag(*node, *flag, *set).map(|_| ()),
		}
	}

	/// Undoes a recorded change. Changes must be reverted newest first.
	pub fn revert_change(&mut self, change: &Change) -> Result<(), DocumentError> {
		match change {
			Change::Insert { parent, child, .. } => self.remove_child(*parent, *child).map(|_| ()),
			Change::Remove { parent, before, tree, .. } => self.insert_child(*parent, tree.clone(), *before).map(|_| ()),
			Change::Properties { node, names, previous, .. } => {
				let names = names.iter().map(String::as_str).collect::<Vec<_>>();
				self.set_properties(*node, &names, previous.clone()).map(|_| ())
			}
			Change::Flag { node, flag, set } => self.set_flag(*node, *flag, !*set).map(|_| ()),
		}
	}

	// Invalidation

	/// Drops the cached bounding boxes of `id` and its ancestors.
	///
	/// Attribute nodes only ever affect the paint box of the element owning them.
	fn invalidate_upwards(&self, id: NodeId, geometry: bool) {
		let mut geometry = geometry;
		let mut current = Some(id);
		while let Some(node) = current.and_then(|id| self.nodes.get(&id)) {
			if !node.kind.is_element() {
				geometry = false;
			} else if geometry {
				node.invalidate_geometry();
			} else {
				node.invalidate_paint();
			}
			current = node.parent;
		}
	}

	/// Queues the current paint area of the element showing `id` for repainting.
	fn queue_repaint(&mut self, id: NodeId) {
		let element = std::iter::once(id).chain(self.ancestors(id)).find(|&candidate| self.kind(candidate).is_some_and(NodeKind::is_element));
		if let Some(area) = element.and_then(|element| self.scene_paint_bbox(element)) {
			self.invalidations.push(area);
		}
	}

	/// Requests a repaint of `area` in scene coordinates.
	pub fn invalidate_area(&mut self, area: Rect) {
		self.invalidations.push(area);
	}

	/// Takes the scene areas that need repainting since the last call.
	pub fn take_invalidations(&mut self) -> Vec<Rect> {
		std::mem::take(&mut self.invalidations)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::events::EventLog;
	use crate::properties::PathAnchor;

	use glam::DVec2;
	use pretty_assertions::assert_eq;
	use std::cell::RefCell;
	use std::rc::Rc;

	fn scene_with_rectangle() -> (Scene, NodeId, NodeId) {
		let _ = env_logger::builder().is_test(true).try_init();
		let mut scene = Scene::with_page(800., 600.).unwrap();
		let layer = scene.active_layer().unwrap();
		let rectangle = scene.append_child(layer, NodeTree::rectangle(10., 10., 100., 50.).unwrap()).unwrap();
		(scene, layer, rectangle)
	}

	#[derive(Clone, Default)]
	struct SharedLog(Rc<RefCell<Vec<NodeEvent>>>);

	impl SceneObserver for SharedLog {
		fn handle_event(&mut self, _scene: &Scene, event: &NodeEvent) {
			self.0.borrow_mut().push(event.clone());
		}
	}

	#[test]
	fn new_document_activates_page_and_layer() {
		let scene = Scene::with_page(800., 600.).unwrap();
		let page = scene.active_page().unwrap();
		let layer = scene.active_layer().unwrap();
		assert_eq!(scene.pages(), vec![page]);
		assert_eq!(scene.parent(layer), Some(page));
		assert!(scene.has_flag(page, NodeFlags::ACTIVE));
		assert!(scene.has_flag(layer, NodeFlags::ACTIVE));
	}

	#[test]
	fn navigation() {
		let (mut scene, layer, first) = scene_with_rectangle();
		let second = scene.append_child(layer, NodeTree::ellipse(DVec2::ZERO, DVec2::ONE).unwrap()).unwrap();
		let third = scene.insert_child(layer, NodeTree::group(vec![]), Some(second)).unwrap();
		assert_eq!(scene.children(layer), &[first, third, second]);
		assert_eq!(scene.next_sibling(first), Some(third));
		assert_eq!(scene.previous_sibling(second), Some(third));
		assert_eq!(scene.previous_sibling(first), None);
		assert_eq!(scene.first_child(layer), Some(first));
		assert_eq!(scene.last_child(layer), Some(second));
		assert!(scene.is_ancestor_of(scene.root(), second));
		assert_eq!(scene.top_level_item(second), Some(second));
		assert_eq!(scene.closest(second, NodeKind::Page), scene.active_page());
	}

	#[test]
	fn ids_are_never_reused() {
		let (mut scene, layer, rectangle) = scene_with_rectangle();
		scene.remove_child(layer, rectangle).unwrap();
		let next = scene.append_child(layer, NodeTree::rectangle(0., 0., 1., 1.).unwrap()).unwrap();
		assert!(next.0 > rectangle.0);
	}

	#[test]
	fn removal_and_reinsertion_keep_ids() {
		let (mut scene, layer, rectangle) = scene_with_rectangle();
		let tree = scene.remove_child(layer, rectangle).unwrap();
		assert!(!scene.contains(rectangle));
		assert_eq!(tree.id(), Some(rectangle));
		assert_eq!(scene.append_child(layer, tree).unwrap(), rectangle);
	}

	#[test]
	fn structure_errors_leave_the_tree_unchanged() {
		let (mut scene, layer, rectangle) = scene_with_rectangle();
		let before = scene.store(scene.root()).unwrap();
		let page = scene.active_page().unwrap();

		let result = scene.append_child(rectangle, NodeTree::rectangle(0., 0., 1., 1.).unwrap());
		assert!(matches!(result, Err(DocumentError::Structure(StructureError::InvalidParent { .. }))));

		let result = scene.append_child(page, NodeTree::rectangle(0., 0., 1., 1.).unwrap());
		assert!(matches!(result, Err(DocumentError::Structure(StructureError::InvalidParent { .. }))));

		let result = scene.remove_child(page, rectangle);
		assert!(matches!(result, Err(DocumentError::Structure(StructureError::NotAChild { .. }))));

		let result = scene.remove_child(NodeId(0), NodeId(0));
		assert!(matches!(result, Err(DocumentError::Structure(_))));

		let copy = scene.store(rectangle).unwrap();
		let result = scene.append_child(layer, copy);
		assert!(matches!(result, Err(DocumentError::Structure(StructureError::AlreadyAttached(_)))));

		let group = scene.append_child(layer, NodeTree::group(vec![])).unwrap();
		let result = scene.move_node(layer, group, None);
		assert!(result.is_err());
		let result = scene.move_node(group, group, None);
		assert!(matches!(result, Err(DocumentError::Structure(StructureError::CyclicInsertion(_)))));
		scene.remove_child(layer, group).unwrap();

		assert_eq!(scene.store(scene.root()).unwrap(), before);
	}

	#[test]
	fn second_attributes_container_is_rejected() {
		let (mut scene, _, rectangle) = scene_with_rectangle();
		scene.append_child(rectangle, NodeTree::new(NodeKind::Attributes)).unwrap();
		let result = scene.append_child(rectangle, NodeTree::new(NodeKind::Attributes));
		assert!(matches!(result, Err(DocumentError::Structure(StructureError::InvalidParent { .. }))));
		let attributes = scene.attributes_of(rectangle).unwrap();
		assert!(matches!(scene.remove_child(rectangle, attributes), Err(DocumentError::Structure(StructureError::RemovalDenied(_)))));
	}

	#[test]
	fn property_batches_are_atomic() {
		let (mut scene, _, rectangle) = scene_with_rectangle();
		let log = SharedLog::default();
		scene.add_observer(Box::new(log.clone()));

		let result = scene.set_properties(rectangle, &["width", "height"], vec![20.0.into(), (-1.0).into()]);
		assert!(matches!(result, Err(DocumentError::InvalidPropertyValue { .. })));
		assert_eq!(scene.number(rectangle, "width"), 100.);

		let result = scene.set_properties(rectangle, &["width", "bogus"], vec![20.0.into(), 1.0.into()]);
		assert!(matches!(result, Err(DocumentError::UnknownProperty { .. })));
		let result = scene.set_properties(rectangle, &["width"], vec![]);
		assert!(matches!(result, Err(DocumentError::PropertyCountMismatch { names: 1, values: 0 })));
		assert!(log.0.borrow().is_empty());

		assert!(scene.set_properties(rectangle, &["width", "height"], vec![20.0.into(), 50.0.into()]).unwrap());
		let events = log.0.borrow();
		assert_eq!(
			*events,
			vec![
				NodeEvent::BeforePropertiesChange {
					node: rectangle,
					properties: vec!["width".to_string()],
					values: vec![20.0.into()],
				},
				NodeEvent::AfterPropertiesChange {
					node: rectangle,
					properties: vec!["width".to_string()],
					previous: vec![100.0.into()],
				},
			]
		);
	}

	#[test]
	fn unchanged_values_emit_nothing() {
		let (mut scene, _, rectangle) = scene_with_rectangle();
		let log = SharedLog::default();
		scene.add_observer(Box::new(log.clone()));
		assert!(!scene.set_property(rectangle, "width", 100.).unwrap());
		assert!(!scene.set_flag(rectangle, NodeFlags::HIDDEN, false).unwrap());
		assert!(log.0.borrow().is_empty());
	}

	#[test]
	fn observers_see_structural_events_in_order() {
		let mut scene = Scene::with_page(100., 100.).unwrap();
		let layer = scene.active_layer().unwrap();
		let id = scene.add_observer(Box::new(EventLog::default()));
		let child = scene.append_child(layer, NodeTree::rectangle(0., 0., 5., 5.).unwrap()).unwrap();
		scene.remove_child(layer, child).unwrap();

		let log = SharedLog::default();
		let removed = scene.remove_observer(id);
		assert!(removed.is_some());
		scene.add_observer(Box::new(log.clone()));
		let child = scene.append_child(layer, NodeTree::rectangle(0., 0., 5., 5.).unwrap()).unwrap();
		assert_eq!(
			*log.0.borrow(),
			vec![NodeEvent::BeforeChildInsert { parent: layer, child }, NodeEvent::AfterChildInsert { parent: layer, child }]
		);
	}

	#[test]
	fn observers_can_read_the_scene() {
		let (mut scene, _, rectangle) = scene_with_rectangle();
		let seen = Rc::new(RefCell::new(Vec::new()));
		let sink = seen.clone();
		scene.add_observer(Box::new(move |scene: &Scene, event: &NodeEvent| {
			sink.borrow_mut().push(scene.number(event.node(), "width"));
		}));
		scene.set_property(rectangle, "width", 7.).unwrap();
		assert_eq!(*seen.borrow(), vec![100., 7.]);
	}

	#[test]
	fn journal_reverts_and_reapplies() {
		let (mut scene, layer, rectangle) = scene_with_rectangle();
		let initial = scene.store(scene.root()).unwrap();

		scene.begin_recording();
		scene.set_property(rectangle, "x", 40.).unwrap();
		let path = scene
			.append_child(layer, NodeTree::path(vec![PathAnchor::new(DVec2::ZERO), PathAnchor::new(DVec2::X)], false).unwrap())
			.unwrap();
		scene.set_flag(path, NodeFlags::LOCKED, true).unwrap();
		scene.set_flag(path, NodeFlags::SELECTED, true).unwrap();
		scene.remove_child(layer, rectangle).unwrap();
		let changes = scene.end_recording();
		assert!(!scene.is_recording());
		assert_eq!(changes.len(), 4);
		let modified = scene.store(scene.root()).unwrap();

		for change in changes.iter().rev() {
			scene.revert_change(change).unwrap();
		}
		assert_eq!(scene.store(scene.root()).unwrap(), initial);

		for change in &changes {
			scene.apply_change(change).unwrap();
		}
		assert_eq!(scene.store(scene.root()).unwrap(), modified);
	}

	#[test]
	fn removing_the_active_layer_picks_another() {
		let mut scene = Scene::with_page(100., 100.).unwrap();
		let page = scene.active_page().unwrap();
		let first = scene.active_layer().unwrap();
		let second = scene.append_child(page, NodeTree::layer("Layer 2").unwrap()).unwrap();
		scene.set_active_layer(second).unwrap();
		assert!(!scene.has_flag(first, NodeFlags::ACTIVE));
		scene.remove_child(page, second).unwrap();
		assert_eq!(scene.active_layer(), Some(first));
		assert!(scene.has_flag(first, NodeFlags::ACTIVE));
		assert!(matches!(scene.set_active_layer(page), Err(DocumentError::UnexpectedKind { .. })));
	}

	#[test]
	fn move_node_reorders() {
		let (mut scene, layer, first) = scene_with_rectangle();
		let second = scene.append_child(layer, NodeTree::rectangle(0., 0., 1., 1.).unwrap()).unwrap();
		scene.move_node(second, layer, Some(first)).unwrap();
		assert_eq!(scene.children(layer), &[second, first]);
		let group = scene.append_child(layer, NodeTree::group(vec![])).unwrap();
		scene.move_node(first, group, None).unwrap();
		assert_eq!(scene.children(group), &[first]);
		assert_eq!(scene.top_level_item(first), Some(group));
	}

	#[test]
	fn mutations_queue_repaints() {
		let (mut scene, _, rectangle) = scene_with_rectangle();
		scene.take_invalidations();
		scene.set_property(rectangle, "x", 200.).unwrap();
		let areas = scene.take_invalidations();
		assert_eq!(areas, vec![Rect::new(10., 10., 100., 50.), Rect::new(200., 10., 100., 50.)]);
		scene.set_property(rectangle, "name", "Box").unwrap();
		assert!(scene.take_invalidations().is_empty());
	}
}
