use crate::clipboard::Clipboard;
use crate::element_editor::{element_editor_for, transform_in_scene, HandleKind};
use crate::error::EditorError;
use crate::options::EditorOptions;
use crate::tools::Tool;

use quill_document::guides::{DetailMode, Guides};
use quill_document::paint::{PaintCanvas, PaintContext};
use quill_document::{Change, DocumentError, NodeFlags, NodeId, NodeTree, Scene, View};

use glam::DVec2;
use std::collections::VecDeque;
use vertex_rs::{Rect, Transform};

/// A committed transaction: the journal of changes plus the selection around it.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoState {
	pub name: String,
	changes: Vec<Change>,
	selection_before: Vec<NodeId>,
	selection_after: Vec<NodeId>,
}

impl UndoState {
	pub fn changes(&self) -> &[Change] {
		&self.changes
	}

	/// Two states merge when they carry the same name and each changes the same properties of the same node once.
	fn is_mergeable_with(&self, later: &UndoState) -> bool {
		match (self.changes.as_slice(), later.changes.as_slice()) {
			([change], [later_change]) => self.name == later.name && change.is_mergeable_with(later_change),
			_ => false,
		}
	}

	fn merge(&mut self, later: UndoState) {
		if let (Some(change), Some(later_change)) = (self.changes.first_mut(), later.changes.into_iter().next()) {
			change.merge(later_change);
		}
		self.selection_after = later.selection_after;
	}
}

#[derive(Debug, Clone)]
struct Transaction {
	selection_before: Vec<NodeId>,
}

/// Interactive editing of one scene: selection, transactions with undo and redo, and the operations tools build on.
///
/// Every editor owns its own scene and undo history, so several documents can be edited side by side.
pub struct Editor {
	scene: Scene,
	guides: Guides,
	options: EditorOptions,
	selection: Vec<NodeId>,
	transaction: Option<Transaction>,
	undo_states: VecDeque<UndoState>,
	redo_states: Vec<UndoState>,
	annotation_area: Option<Rect>,
}

impl Editor {
	pub fn new(scene: Scene) -> Self {
		Self::with_options(scene, EditorOptions::default())
	}

	pub fn with_options(scene: Scene, options: EditorOptions) -> Self {
		Self {
			scene,
			guides: Guides::new(),
			options,
			selection: Vec::new(),
			transaction: None,
			undo_states: VecDeque::new(),
			redo_states: Vec::new(),
			annotation_area: None,
		}
	}

	pub fn scene(&self) -> &Scene {
		&self.scene
	}

	/// Direct access to the scene. Changes made outside of a transaction can not be undone.
	pub fn scene_mut(&mut self) -> &mut Scene {
		&mut self.scene
	}

	pub fn guides(&self) -> &Guides {
		&self.guides
	}

	pub fn guides_mut(&mut self) -> &mut Guides {
		&mut self.guides
	}

	pub fn options(&self) -> &EditorOptions {
		&self.options
	}

	pub fn set_options(&mut self, options: EditorOptions) {
		self.options = options;
		self.trim_undo_states();
	}

	// Transactions

	pub fn is_in_transaction(&self) -> bool {
		self.transaction.is_some()
	}

	/// Starts journaling scene changes. Transactions do not nest.
	pub fn begin_transaction(&mut self) -> Result<(), EditorError> {
		if self.transaction.is_some() {
			return Err(EditorError::TransactionAlreadyOpen);
		}
		log::debug!("Beginning transaction");
		self.transaction = Some(Transaction {
			selection_before: self.selection.clone(),
		});
		self.scene.begin_recording();
		Ok(())
	}

	/// Ends the open transaction and stores its changes as an undo state named `name`.
	///
	/// Returns whether a state was stored: transactions that changed nothing leave the history alone.
	pub fn commit_transaction(&mut self, name: &str) -> Result<bool, EditorError> {
		let transaction = self.transaction.take().ok_or(EditorError::NoTransactionInProgress)?;
		let changes = self.scene.end_recording();
		self.prune_selection();
		if changes.is_empty() {
			log::debug!("Transaction {name:?} changed nothing");
			return Ok(false);
		}
		log::debug!("Committing transaction {name:?} with {} changes", changes.len());
		self.push_state(UndoState {
			name: name.to_string(),
			changes,
			selection_before: transaction.selection_before,
			selection_after: self.selection.clone(),
		});
		Ok(true)
	}

	/// Ends the open transaction by reverting everything it changed.
	pub fn rollback_transaction(&mut self) -> Result<(), EditorError> {
		let transaction = self.transaction.take().ok_or(EditorError::NoTransactionInProgress)?;
		let changes = self.scene.end_recording();
		log::debug!("Rolling back {} changes", changes.len());
		for change in changes.iter().rev() {
			self.scene.revert_change(change)?;
		}
		self.load_selection(&transaction.selection_before)
	}

	/// Runs `f` in a transaction named `name`. The transaction is committed whether or not `f` fails, and `f`'s error is returned.
	pub fn run_transaction<R>(&mut self, name: &str, f: impl FnOnce(&mut Self) -> Result<R, EditorError>) -> Result<R, EditorError> {
		self.begin_transaction()?;
		let result = f(self);
		let committed = self.commit_transaction(name);
		match result {
			Ok(value) => committed.map(|_| value),
			Err(error) => {
				if let Err(commit_error) = committed {
					log::warn!("{}", commit_error);
				}
				log::warn!("Transaction {name:?} failed: {error}");
				Err(error)
			}
		}
	}

	/// Joins the open transaction, or runs `f` in a new one.
	fn transact<R>(&mut self, name: &str, f: impl FnOnce(&mut Self) -> Result<R, EditorError>) -> Result<R, EditorError> {
		if self.transaction.is_some() { f(self) } else { self.run_transaction(name, f) }
	}

	fn push_state(&mut self, state: UndoState) {
		self.redo_states.clear();
		if self.options.smart_undo_property_merge {
			if let Some(last) = self.undo_states.back_mut() {
				if last.is_mergeable_with(&state) {
					log::trace!("Merging undo state {:?}", state.name);
					last.merge(state);
					return;
				}
			}
		}
		self.undo_states.push_back(state);
		self.trim_undo_states();
	}

	fn trim_undo_states(&mut self) {
		while self.undo_states.len() > self.options.max_undo_steps {
			self.undo_states.pop_front();
		}
	}

	// Undo and redo

	pub fn has_undo_state(&self) -> bool {
		!self.undo_states.is_empty()
	}

	pub fn has_redo_state(&self) -> bool {
		!self.redo_states.is_empty()
	}

	pub fn undo_states(&self) -> impl Iterator<Item = &UndoState> {
		self.undo_states.iter()
	}

	pub fn undo_name(&self) -> Option<&str> {
		self.undo_states.back().map(|state| state.name.as_str())
	}

	pub fn redo_name(&self) -> Option<&str> {
		self.redo_states.last().map(|state| state.name.as_str())
	}

	pub fn undo(&mut self) -> Result<(), EditorError> {
		if self.transaction.is_some() {
			return Err(EditorError::TransactionAlreadyOpen);
		}
		let state = self.undo_states.pop_back().ok_or(EditorError::NoUndoState)?;
		log::debug!("Undoing {:?}", state.name);
		for change in state.changes.iter().rev() {
			self.scene.revert_change(change)?;
		}
		self.load_selection(&state.selection_before)?;
		self.redo_states.push(state);
		Ok(())
	}

	pub fn redo(&mut self) -> Result<(), EditorError> {
		if self.transaction.is_some() {
			return Err(EditorError::TransactionAlreadyOpen);
		}
		let state = self.redo_states.pop().ok_or(EditorError::NoRedoState)?;
		log::debug!("Redoing {:?}", state.name);
		for change in &state.changes {
			self.scene.apply_change(change)?;
		}
		self.load_selection(&state.selection_after)?;
		self.undo_states.push_back(state);
		Ok(())
	}

	// Selection

	pub fn selection(&self) -> &[NodeId] {
		&self.selection
	}

	pub fn is_selected(&self, id: NodeId) -> bool {
		self.selection.contains(&id)
	}

	/// Adds items to the selection. Nodes that are not items are skipped.
	pub fn select(&mut self, ids: &[NodeId]) -> Result<(), EditorError> {
		for &id in ids {
			let kind = self.scene.get(id)?.kind();
			if !kind.is_item() {
				log::warn!("Node {id} is a {kind:?} and can not be selected");
				continue;
			}
			if !self.selection.contains(&id) {
				self.scene.set_flag(id, NodeFlags::SELECTED, true)?;
				self.selection.push(id);
			}
		}
		Ok(())
	}

	pub fn deselect(&mut self, ids: &[NodeId]) -> Result<(), EditorError> {
		for &id in ids {
			if let Some(index) = self.selection.iter().position(|&selected| selected == id) {
				self.selection.remove(index);
				if self.scene.contains(id) {
					self.scene.set_flag(id, NodeFlags::SELECTED, false)?;
				}
			}
		}
		Ok(())
	}

	pub fn clear_selection(&mut self) -> Result<(), EditorError> {
		let selection = self.selection.clone();
		self.deselect(&selection)
	}

	/// Replaces the selection with `ids`, or flips the selected state of each of them when `toggle` is set.
	pub fn update_selection(&mut self, toggle: bool, ids: &[NodeId]) -> Result<(), EditorError> {
		if !toggle {
			self.clear_selection()?;
			return self.select(ids);
		}
		for &id in ids {
			if self.is_selected(id) {
				self.deselect(&[id])?;
			} else {
				self.select(&[id])?;
			}
		}
		Ok(())
	}

	/// Selects every visible and unlocked top level item of the active page.
	pub fn select_all(&mut self) -> Result<(), EditorError> {
		let Some(page) = self.scene.active_page() else { return Ok(()) };
		let items: Vec<NodeId> = self
			.scene
			.descendants(page)
			.into_iter()
			.filter(|&id| self.scene.top_level_item(id) == Some(id))
			.filter(|&id| !self.scene.has_inherited_flag(id, NodeFlags::HIDDEN) && !self.scene.has_inherited_flag(id, NodeFlags::LOCKED))
			.collect();
		self.update_selection(false, &items)
	}

	/// Scene bounding box of the selection.
	pub fn selection_bbox(&self) -> Option<Rect> {
		self.selection.iter().fold(None, |bbox, &id| Rect::union_of(bbox, self.scene.scene_geometry_bbox(id)))
	}

	fn load_selection(&mut self, ids: &[NodeId]) -> Result<(), EditorError> {
		self.clear_selection()?;
		let existing: Vec<NodeId> = ids.iter().copied().filter(|&id| self.scene.contains(id)).collect();
		self.select(&existing)
	}

	fn prune_selection(&mut self) {
		self.selection.retain(|&id| self.scene.contains(id));
	}

	/// Selected nodes that can be changed: unlocked and not inside another selected node.
	fn editable_selection(&self) -> Vec<NodeId> {
		self.selection
			.iter()
			.copied()
			.filter(|&id| self.scene.contains(id) && !self.scene.has_inherited_flag(id, NodeFlags::LOCKED))
			.filter(|&id| !self.selection.iter().any(|&other| other != id && self.scene.is_ancestor_of(other, id)))
			.collect()
	}

	/// The selectable item at `position` (scene coordinates), topmost first.
	pub fn item_at(&self, position: DVec2, tolerance: f64) -> Option<NodeId> {
		self.scene.hit_test(position, tolerance).into_iter().find_map(|hit| self.scene.top_level_item(hit.element))
	}

	// Operations

	/// Appends `trees` to the active layer and selects them.
	pub fn insert_elements(&mut self, trees: Vec<NodeTree>) -> Result<Vec<NodeId>, EditorError> {
		self.insert_into_active_layer("Insert Element(s)", trees)
	}

	fn insert_into_active_layer(&mut self, name: &str, trees: Vec<NodeTree>) -> Result<Vec<NodeId>, EditorError> {
		let layer = self.scene.active_layer().ok_or(EditorError::NoActiveLayer)?;
		self.transact(name, |editor| {
			let ids = trees.into_iter().map(|tree| editor.scene.append_child(layer, tree)).collect::<Result<Vec<_>, DocumentError>>()?;
			editor.update_selection(false, &ids)?;
			Ok(ids)
		})
	}

	/// Removes the selected items, leaving locked ones in place. Returns how many were removed.
	pub fn delete_selection(&mut self) -> Result<usize, EditorError> {
		let targets = self.editable_selection();
		if targets.is_empty() {
			return Ok(0);
		}
		self.transact("Delete Selection", |editor| {
			editor.deselect(&targets)?;
			for &id in &targets {
				let parent = editor.scene.parent(id).ok_or(DocumentError::NodeNotFound(id))?;
				editor.scene.remove_child(parent, id)?;
			}
			Ok(targets.len())
		})
	}

	/// Applies `transform`, given in scene coordinates, to every editable selected item.
	pub fn transform_selection(&mut self, transform: Transform) -> Result<(), EditorError> {
		let targets = self.editable_selection();
		if targets.is_empty() || transform.is_identity() {
			return Ok(());
		}
		self.transact("Transform Selection", |editor| {
			for &id in &targets {
				transform_in_scene(&mut editor.scene, id, &transform)?;
			}
			Ok(())
		})
	}

	/// Adjusts `delta` so that `bbox` moved by it snaps to the guides. The selection is not snapped to.
	pub fn snap_translation(&mut self, bbox: Rect, delta: DVec2) -> DVec2 {
		let exclusions = self.selection.clone();
		self.guides.use_exclusions(&self.scene, &exclusions);
		self.guides.begin_map();
		let mapped = self.guides.map_rect(&self.scene, bbox.translated(delta));
		self.guides.finish_map();
		mapped.min - bbox.min
	}

	/// Snaps a scene position to the guides, ignoring the `exclusions`.
	pub fn snap_point(&mut self, point: DVec2, exclusions: &[NodeId]) -> DVec2 {
		self.guides.use_exclusions(&self.scene, exclusions);
		self.guides.begin_map();
		let mapped = self.guides.map_point(&self.scene, point, DetailMode::All);
		self.guides.finish_map();
		mapped
	}

	/// Removes the guide lines shown by the last snap.
	pub fn clear_guide_visuals(&mut self) {
		self.guides.begin_map();
		self.guides.finish_map();
	}

	/// Moves the selection by `delta`, snapped to the guides when `snap` is set. Returns the applied translation.
	pub fn move_selection(&mut self, delta: DVec2, snap: bool) -> Result<DVec2, EditorError> {
		let Some(bbox) = self.selection_bbox() else { return Ok(DVec2::ZERO) };
		let delta = if snap { self.snap_translation(bbox, delta) } else { delta };
		if delta == DVec2::ZERO {
			return Ok(delta);
		}
		self.transact("Move Selection", |editor| editor.transform_selection(Transform::from_translation(delta)))?;
		Ok(delta)
	}

	/// Nudges the selection by `steps` times the nudge distance.
	pub fn nudge_selection(&mut self, steps: DVec2) -> Result<DVec2, EditorError> {
		self.move_selection(steps * self.options.nudge_distance, false)
	}

	/// Inserts shifted copies of the selected items next to their originals and selects the copies.
	pub fn duplicate_selection(&mut self) -> Result<Vec<NodeId>, EditorError> {
		let targets = self.editable_selection();
		if targets.is_empty() {
			return Ok(Vec::new());
		}
		let shift = DVec2::splat(self.options.clone_shift);
		self.transact("Duplicate Selection", |editor| {
			let mut clones = Vec::with_capacity(targets.len());
			for &id in &targets {
				let parent = editor.scene.parent(id).ok_or(DocumentError::NodeNotFound(id))?;
				let tree = editor.scene.store(id)?.without_ids();
				clones.push(editor.scene.append_child(parent, tree)?);
			}
			editor.update_selection(false, &clones)?;
			editor.transform_selection(Transform::from_translation(shift))?;
			Ok(clones)
		})
	}

	/// Puts the selected items on the clipboard. Returns how many were copied.
	pub fn copy_selection(&self, clipboard: &mut dyn Clipboard) -> Result<usize, EditorError> {
		let targets: Vec<NodeId> = self
			.selection
			.iter()
			.copied()
			.filter(|&id| !self.selection.iter().any(|&other| other != id && self.scene.is_ancestor_of(other, id)))
			.collect();
		if targets.is_empty() {
			return Ok(0);
		}
		let trees = targets.iter().map(|&id| self.scene.store(id).map(NodeTree::without_ids)).collect::<Result<Vec<_>, _>>()?;
		clipboard.set_content(&self.options.clipboard_mime_type, NodeTree::list_to_json(&trees)?);
		Ok(trees.len())
	}

	pub fn cut_selection(&mut self, clipboard: &mut dyn Clipboard) -> Result<usize, EditorError> {
		if self.copy_selection(clipboard)? == 0 {
			return Ok(0);
		}
		self.transact("Cut Selection", |editor| editor.delete_selection())
	}

	/// Inserts the items on the clipboard into the active layer and selects them.
	pub fn paste(&mut self, clipboard: &dyn Clipboard) -> Result<Vec<NodeId>, EditorError> {
		let mime_type = &self.options.clipboard_mime_type;
		let content = clipboard.content(mime_type).ok_or_else(|| EditorError::EmptyClipboard(mime_type.clone()))?;
		let trees = NodeTree::list_from_json(&content)?;
		if trees.is_empty() {
			return Err(EditorError::EmptyClipboard(mime_type.clone()));
		}
		self.insert_into_active_layer("Paste", trees)
	}

	/// Hides or shows nodes. Hidden nodes leave the selection.
	pub fn set_hidden(&mut self, ids: &[NodeId], hidden: bool) -> Result<(), EditorError> {
		self.transact(if hidden { "Hide" } else { "Show" }, |editor| {
			for &id in ids {
				editor.scene.set_flag(id, NodeFlags::HIDDEN, hidden)?;
			}
			if hidden {
				editor.deselect(ids)?;
			}
			Ok(())
		})
	}

	pub fn set_locked(&mut self, ids: &[NodeId], locked: bool) -> Result<(), EditorError> {
		self.transact(if locked { "Lock" } else { "Unlock" }, |editor| {
			for &id in ids {
				editor.scene.set_flag(id, NodeFlags::LOCKED, locked)?;
			}
			Ok(())
		})
	}

	// Element editors

	/// The handle of a selected element at `position` (scene coordinates).
	pub fn handle_at(&self, position: DVec2, tolerance: f64) -> Option<(NodeId, HandleKind)> {
		self.editable_selection().into_iter().rev().find_map(|id| {
			let editor = element_editor_for(self.scene.kind(id)?)?;
			editor.hit_test_handle(&self.scene, id, position, tolerance).map(|handle| (id, handle.kind))
		})
	}

	/// Drags a handle of `element` to `position` (scene coordinates), snapped to the guides when `snap` is set.
	pub fn drag_handle(&mut self, element: NodeId, handle: HandleKind, position: DVec2, snap: bool) -> Result<bool, EditorError> {
		let kind = self.scene.get(element)?.kind();
		let Some(element_editor) = element_editor_for(kind) else { return Ok(false) };
		let position = if snap { self.snap_point(position, &[element]) } else { position };
		self.transact("Edit Element", |editor| Ok(element_editor.drag_handle(&mut editor.scene, element, handle, position)?))
	}

	// Painting

	/// Collects pending invalidations into `view`, including the area of selection annotations that moved.
	pub fn update_view(&mut self, view: &mut View) {
		view.update(&mut self.scene, &mut self.guides);
		let area = self.annotation_area(view.transform());
		if area != self.annotation_area {
			for area in [self.annotation_area, area].into_iter().flatten() {
				view.invalidate_view_area(area);
			}
			self.annotation_area = area;
		}
	}

	/// Device area covered by the selection annotations under the view `transform`.
	fn annotation_area(&self, transform: Transform) -> Option<Rect> {
		let margin = self.options.handle_size / 2. + 1.;
		self.selection
			.iter()
			.filter_map(|&id| match self.scene.kind(id).and_then(element_editor_for) {
				Some(editor) => editor.bounds(&self.scene, id),
				None => self.scene.scene_geometry_bbox(id),
			})
			.map(|bounds| transform.map_rect(&bounds).expanded_uniform(margin))
			.reduce(|united, bounds| united.united(&bounds))
	}

	/// Paints the selection outlines and the element editor handles. The context transform maps scene coordinates to device space.
	pub fn paint_annotations(&self, context: &mut PaintContext) {
		let color = self.options.selection_color;
		for &id in &self.selection {
			match self.scene.kind(id).and_then(element_editor_for) {
				Some(editor) => editor.paint(&self.scene, id, self.options.handle_size, color, context),
				None => self.scene.paint_outline(id, color, context),
			}
		}
	}

	/// Repaints the dirty areas of `view` with the scene, the annotations, the feedback of `tool` and the guides.
	pub fn paint(&self, view: &mut View, canvas: &mut dyn PaintCanvas, tool: Option<&dyn Tool>) -> Vec<Rect> {
		view.paint_with(&self.scene, &self.guides, canvas, |context| {
			self.paint_annotations(context);
			if let Some(tool) = tool {
				tool.paint(self, context);
			}
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::clipboard::MemoryClipboard;

	use quill_document::paint::RecordingCanvas;
	use quill_document::Color;
	use pretty_assertions::assert_eq;

	fn editor() -> Editor {
		let _ = env_logger::builder().is_test(true).try_init();
		Editor::new(Scene::with_page(500., 500.).unwrap())
	}

	fn rectangle(x: f64, y: f64) -> NodeTree {
		NodeTree::rectangle(x, y, 20., 20.).unwrap().with_attribute(NodeTree::fill(Color::BLACK).unwrap())
	}

	fn layer_children(editor: &Editor) -> Vec<NodeId> {
		editor.scene().children(editor.scene().active_layer().unwrap()).to_vec()
	}

	fn x_of(editor: &Editor, id: NodeId) -> f64 {
		editor.scene().scene_geometry_bbox(id).unwrap().min.x
	}

	#[test]
	fn undo_and_redo_restore_the_scene_and_the_selection() {
		let mut editor = editor();
		let before = editor.scene().store(editor.scene().root()).unwrap();

		let ids = editor.insert_elements(vec![rectangle(10., 10.), rectangle(50., 50.)]).unwrap();
		assert_eq!(editor.selection(), ids.as_slice());
		assert_eq!(editor.undo_name(), Some("Insert Element(s)"));
		let after = editor.scene().store(editor.scene().root()).unwrap();

		editor.undo().unwrap();
		assert_eq!(editor.scene().store(editor.scene().root()).unwrap(), before);
		assert!(editor.selection().is_empty());
		assert_eq!(editor.redo_name(), Some("Insert Element(s)"));

		editor.redo().unwrap();
		assert_eq!(editor.scene().store(editor.scene().root()).unwrap(), after);
		assert_eq!(editor.selection(), ids.as_slice());
		assert!(ids.iter().all(|&id| editor.scene().has_flag(id, NodeFlags::SELECTED)));

		assert!(matches!(editor.redo(), Err(EditorError::NoRedoState)));
	}

	#[test]
	fn transactions_do_not_nest() {
		let mut editor = editor();
		editor.begin_transaction().unwrap();
		assert!(matches!(editor.begin_transaction(), Err(EditorError::TransactionAlreadyOpen)));
		assert!(matches!(editor.undo(), Err(EditorError::TransactionAlreadyOpen)));
		assert!(!editor.commit_transaction("Nothing").unwrap());
		assert!(matches!(editor.commit_transaction("Nothing"), Err(EditorError::NoTransactionInProgress)));
		assert!(matches!(editor.rollback_transaction(), Err(EditorError::NoTransactionInProgress)));
		assert!(!editor.has_undo_state());
	}

	#[test]
	fn failing_transactions_are_still_committed() {
		let mut editor = editor();
		let layer = editor.scene().active_layer().unwrap();
		let result: Result<(), EditorError> = editor.run_transaction("Broken", |editor| {
			editor.scene_mut().append_child(layer, rectangle(0., 0.))?;
			Err(EditorError::from("failed halfway"))
		});
		assert!(matches!(result, Err(EditorError::InvalidOperation(_))));
		assert!(!editor.is_in_transaction());
		assert_eq!(editor.undo_name(), Some("Broken"));
		editor.undo().unwrap();
		assert!(layer_children(&editor).is_empty());
	}

	#[test]
	fn rollback_reverts_the_open_transaction() {
		let mut editor = editor();
		let id = editor.insert_elements(vec![rectangle(10., 10.)]).unwrap()[0];
		editor.begin_transaction().unwrap();
		editor.move_selection(DVec2::new(5., 0.), false).unwrap();
		editor.delete_selection().unwrap();
		editor.rollback_transaction().unwrap();
		assert_eq!(layer_children(&editor), vec![id]);
		assert_eq!(x_of(&editor, id), 10.);
		assert_eq!(editor.selection(), &[id]);
		assert_eq!(editor.undo_states().count(), 1);
	}

	#[test]
	fn consecutive_moves_merge_into_one_state() {
		let mut editor = editor();
		let id = editor.insert_elements(vec![rectangle(10., 10.)]).unwrap()[0];
		for _ in 0..3 {
			editor.move_selection(DVec2::new(5., 0.), false).unwrap();
		}
		assert_eq!(editor.undo_states().count(), 2);
		assert_eq!(x_of(&editor, id), 25.);
		editor.undo().unwrap();
		assert_eq!(x_of(&editor, id), 10.);

		let mut options = editor.options().clone();
		options.smart_undo_property_merge = false;
		editor.set_options(options);
		editor.redo().unwrap();
		editor.move_selection(DVec2::new(5., 0.), false).unwrap();
		editor.move_selection(DVec2::new(5., 0.), false).unwrap();
		assert_eq!(editor.undo_states().count(), 4);
	}

	#[test]
	fn the_oldest_states_are_dropped() {
		let mut editor = Editor::with_options(
			Scene::with_page(500., 500.).unwrap(),
			EditorOptions {
				max_undo_steps: 3,
				..Default::default()
			},
		);
		for index in 0..5 {
			editor.insert_elements(vec![rectangle(index as f64 * 30., 0.)]).unwrap();
		}
		assert_eq!(editor.undo_states().count(), 3);
		for _ in 0..3 {
			editor.undo().unwrap();
		}
		assert!(matches!(editor.undo(), Err(EditorError::NoUndoState)));
		assert_eq!(layer_children(&editor).len(), 2);
	}

	#[test]
	fn committing_clears_the_redo_states() {
		let mut editor = editor();
		editor.insert_elements(vec![rectangle(10., 10.)]).unwrap();
		editor.undo().unwrap();
		assert!(editor.has_redo_state());
		editor.insert_elements(vec![rectangle(50., 10.)]).unwrap();
		assert!(!editor.has_redo_state());
	}

	#[test]
	fn selection_updates() {
		let mut editor = editor();
		let ids = editor.insert_elements(vec![rectangle(10., 10.), rectangle(50., 50.), rectangle(100., 100.)]).unwrap();
		editor.update_selection(false, &ids[..1]).unwrap();
		assert_eq!(editor.selection(), &ids[..1]);

		editor.update_selection(true, &ids[..2]).unwrap();
		assert_eq!(editor.selection(), &[ids[1]]);
		assert!(!editor.scene().has_flag(ids[0], NodeFlags::SELECTED));

		let layer = editor.scene().active_layer().unwrap();
		editor.select(&[layer]).unwrap();
		assert_eq!(editor.selection(), &[ids[1]]);

		editor.set_locked(&ids[2..], true).unwrap();
		editor.select_all().unwrap();
		assert_eq!(editor.selection(), &ids[..2]);
		assert_eq!(editor.selection_bbox(), Some(Rect::new(10., 10., 60., 60.)));

		editor.clear_selection().unwrap();
		assert_eq!(editor.selection_bbox(), None);
		assert!(editor.scene().flagged(NodeFlags::SELECTED).is_empty());
	}

	#[test]
	fn locked_items_survive_deletion() {
		let mut editor = editor();
		let ids = editor.insert_elements(vec![rectangle(10., 10.), rectangle(50., 50.)]).unwrap();
		editor.set_locked(&ids[..1], true).unwrap();
		assert_eq!(editor.delete_selection().unwrap(), 1);
		assert_eq!(layer_children(&editor), vec![ids[0]]);
		assert_eq!(editor.undo_name(), Some("Delete Selection"));

		editor.undo().unwrap();
		assert_eq!(layer_children(&editor), ids);
		assert_eq!(editor.selection(), ids.as_slice());
	}

	#[test]
	fn inserting_needs_an_active_layer() {
		let mut editor = Editor::new(Scene::new());
		assert!(matches!(editor.insert_elements(vec![rectangle(0., 0.)]), Err(EditorError::NoActiveLayer)));
	}

	#[test]
	fn moving_snaps_to_other_items() {
		let mut editor = editor();
		let ids = editor.insert_elements(vec![rectangle(100., 100.), rectangle(200., 300.)]).unwrap();
		editor.update_selection(false, &ids[1..]).unwrap();
		// Lands at 123, three units from the right edge of the first item
		let applied = editor.move_selection(DVec2::new(-77., 0.), true).unwrap();
		assert_eq!(applied, DVec2::new(-80., 0.));
		assert_eq!(x_of(&editor, ids[1]), 120.);
		assert!(!editor.guides().visuals().is_empty());
		editor.clear_guide_visuals();
		assert!(editor.guides().visuals().is_empty());
	}

	#[test]
	fn duplicates_are_shifted_and_selected() {
		let mut editor = editor();
		let id = editor.insert_elements(vec![rectangle(10., 10.)]).unwrap()[0];
		let clones = editor.duplicate_selection().unwrap();
		assert_eq!(clones.len(), 1);
		assert_eq!(layer_children(&editor), vec![id, clones[0]]);
		assert_eq!(editor.selection(), clones.as_slice());
		assert_eq!(editor.scene().scene_geometry_bbox(clones[0]), Some(Rect::new(20., 20., 20., 20.)));
		assert_eq!(editor.undo_name(), Some("Duplicate Selection"));
		editor.undo().unwrap();
		assert_eq!(layer_children(&editor), vec![id]);
		assert_eq!(editor.selection(), &[id]);
	}

	#[test]
	fn clipboard_round_trip() {
		let mut editor = editor();
		let mut clipboard = MemoryClipboard::new();
		assert!(matches!(editor.paste(&clipboard), Err(EditorError::EmptyClipboard(_))));

		let id = editor.insert_elements(vec![rectangle(10., 10.)]).unwrap()[0];
		assert_eq!(editor.cut_selection(&mut clipboard).unwrap(), 1);
		assert!(layer_children(&editor).is_empty());
		assert_eq!(editor.undo_name(), Some("Cut Selection"));

		let pasted = editor.paste(&clipboard).unwrap();
		assert_eq!(pasted.len(), 1);
		assert_ne!(pasted[0], id);
		assert_eq!(editor.selection(), pasted.as_slice());
		assert_eq!(editor.scene().scene_geometry_bbox(pasted[0]), Some(Rect::new(10., 10., 20., 20.)));

		let again = editor.paste(&clipboard).unwrap();
		assert_eq!(layer_children(&editor), vec![pasted[0], again[0]]);
		assert_eq!(editor.undo_name(), Some("Paste"));
	}

	#[test]
	fn hiding_deselects_and_can_be_undone() {
		let mut editor = editor();
		let id = editor.insert_elements(vec![rectangle(10., 10.)]).unwrap()[0];
		editor.set_hidden(&[id], true).unwrap();
		assert!(editor.selection().is_empty());
		assert_eq!(editor.item_at(DVec2::new(15., 15.), 1.), None);
		editor.undo().unwrap();
		assert!(!editor.scene().has_flag(id, NodeFlags::HIDDEN));
		assert_eq!(editor.item_at(DVec2::new(15., 15.), 1.), Some(id));
	}

	#[test]
	fn handles_of_the_selection_can_be_dragged() {
		let mut editor = editor();
		let id = editor.insert_elements(vec![rectangle(10., 10.)]).unwrap()[0];
		let (element, handle) = editor.handle_at(DVec2::new(31., 29.), 2.).unwrap();
		assert_eq!(element, id);
		assert!(editor.drag_handle(element, handle, DVec2::new(50., 50.), false).unwrap());
		assert_eq!(editor.scene().scene_geometry_bbox(id), Some(Rect::new(10., 10., 40., 40.)));
		assert_eq!(editor.undo_name(), Some("Edit Element"));
	}

	#[test]
	fn annotations_are_painted_for_the_selection() {
		let mut editor = editor();
		let mut view = View::new(DVec2::new(500., 500.));
		editor.insert_elements(vec![rectangle(10., 10.)]).unwrap();
		editor.update_view(&mut view);

		let mut canvas = RecordingCanvas::new();
		editor.paint(&mut view, &mut canvas, None);
		let handle_fills = canvas.fills().filter(|&(_, color)| color == Color::SELECTION).count();
		assert_eq!(handle_fills, 8);

		// Deselecting repaints where the handles were
		editor.clear_selection().unwrap();
		editor.update_view(&mut view);
		let mut canvas = RecordingCanvas::new();
		let painted = editor.paint(&mut view, &mut canvas, None);
		assert!(painted.iter().any(|area| area.contains_rect(&Rect::new(5., 5., 30., 30.))));
		assert_eq!(canvas.fills().filter(|&(_, color)| color == Color::SELECTION).count(), 0);
	}
}
