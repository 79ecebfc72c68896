use super::{scene_distance, ModifierKeys, PointerEvent, Tool, ToolType};
use crate::consts::DRAG_THRESHOLD;
use crate::editor::Editor;
use crate::element_editor::HandleKind;
use crate::error::EditorError;

use quill_document::paint::PaintContext;
use quill_document::{NodeId, View};

use glam::DVec2;
use vertex_rs::{rectangle_vertices, Rect, Transform};

/// Selects items, moves the selection and drags element handles.
#[derive(Debug, Default)]
pub struct PointerTool {
	fsm_state: PointerToolFsmState,
	data: PointerToolData,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
enum PointerToolFsmState {
	#[default]
	Ready,
	Dragging,
	HandleDragging,
	Selecting,
}

#[derive(Clone, Debug, Default)]
struct PointerToolData {
	drag_start: DVec2,
	start_bbox: Option<Rect>,
	/// Translation applied to the selection so far in this drag.
	applied: DVec2,
	handle: Option<(NodeId, HandleKind)>,
	band_start: DVec2,
	/// Rubber band in device coordinates.
	band: Option<Rect>,
}

#[derive(Clone, Copy, Debug)]
enum PointerToolEvent {
	DragStart(PointerEvent),
	PointerMove(PointerEvent),
	DragStop(PointerEvent),
	Abort,
}

fn invalidate_band(view: &mut View, band: Option<Rect>) {
	if let Some(band) = band {
		view.invalidate_view_area(band.expanded_uniform(1.));
	}
}

impl PointerToolFsmState {
	fn transition(self, event: PointerToolEvent, editor: &mut Editor, view: &mut View, data: &mut PointerToolData) -> Result<Self, EditorError> {
		use PointerToolEvent::*;
		use PointerToolFsmState::*;

		let state = match (self, event) {
			(Ready, DragStart(event)) => {
				let position = view.view_to_scene(event.position);
				let handle_tolerance = scene_distance(view, editor.options().handle_size / 2.);
				if let Some(handle) = editor.handle_at(position, handle_tolerance) {
					editor.begin_transaction()?;
					data.handle = Some(handle);
					return Ok(HandleDragging);
				}

				let toggle = event.modifiers.contains(ModifierKeys::SHIFT);
				let pick_distance = scene_distance(view, editor.scene().settings().pick_distance);
				match editor.item_at(position, pick_distance) {
					Some(item) if toggle => {
						editor.update_selection(true, &[item])?;
						Ready
					}
					Some(item) => {
						if !editor.is_selected(item) {
							editor.update_selection(false, &[item])?;
						}
						editor.begin_transaction()?;
						data.drag_start = position;
						data.start_bbox = editor.selection_bbox();
						data.applied = DVec2::ZERO;
						Dragging
					}
					None => {
						if !toggle {
							editor.clear_selection()?;
						}
						data.band_start = event.position;
						data.band = None;
						Selecting
					}
				}
			}
			(Dragging, PointerMove(event)) => {
				if let Some(bbox) = data.start_bbox {
					let mut offset = view.view_to_scene(event.position) - data.drag_start;
					if event.snapping() {
						editor.guides_mut().set_scale(view.zoom());
						offset = editor.snap_translation(bbox, offset);
					}
					let step = offset - data.applied;
					if step != DVec2::ZERO {
						editor.transform_selection(Transform::from_translation(step))?;
						data.applied = offset;
					}
				}
				Dragging
			}
			(Dragging, DragStop(_)) => {
				editor.clear_guide_visuals();
				editor.commit_transaction("Move Selection")?;
				Ready
			}
			(HandleDragging, PointerMove(event)) => {
				if let Some((element, handle)) = data.handle {
					editor.guides_mut().set_scale(view.zoom());
					editor.drag_handle(element, handle, view.view_to_scene(event.position), event.snapping())?;
				}
				HandleDragging
			}
			(HandleDragging, DragStop(_)) => {
				data.handle = None;
				editor.clear_guide_visuals();
				editor.commit_transaction("Edit Element")?;
				Ready
			}
			(Dragging | HandleDragging, Abort) => {
				data.handle = None;
				editor.clear_guide_visuals();
				editor.rollback_transaction()?;
				Ready
			}
			(Selecting, PointerMove(event)) => {
				invalidate_band(view, data.band);
				data.band = Some(Rect::from_points(data.band_start, event.position));
				invalidate_band(view, data.band);
				Selecting
			}
			(Selecting, DragStop(event)) => {
				invalidate_band(view, data.band.take());
				let band = Rect::from_points(data.band_start, event.position);
				if band.width().max(band.height()) > DRAG_THRESHOLD {
					let area = view.transform().inverted_or_identity().map_rect(&band);
					let items = editor.scene().items_in_area(area, true);
					editor.update_selection(event.modifiers.contains(ModifierKeys::SHIFT), &items)?;
				}
				Ready
			}
			(Selecting, Abort) => {
				invalidate_band(view, data.band.take());
				Ready
			}
			(state, _) => state,
		};
		Ok(state)
	}
}

impl PointerTool {
	fn handle_event(&mut self, event: PointerToolEvent, editor: &mut Editor, view: &mut View) -> Result<(), EditorError> {
		self.fsm_state = self.fsm_state.transition(event, editor, view, &mut self.data)?;
		Ok(())
	}
}

impl Tool for PointerTool {
	fn tool_type(&self) -> ToolType {
		ToolType::Pointer
	}

	fn pointer_down(&mut self, editor: &mut Editor, view: &mut View, event: PointerEvent) -> Result<(), EditorError> {
		self.handle_event(PointerToolEvent::DragStart(event), editor, view)
	}

	fn pointer_move(&mut self, editor: &mut Editor, view: &mut View, event: PointerEvent) -> Result<(), EditorError> {
		self.handle_event(PointerToolEvent::PointerMove(event), editor, view)
	}

	fn pointer_up(&mut self, editor: &mut Editor, view: &mut View, event: PointerEvent) -> Result<(), EditorError> {
		self.handle_event(PointerToolEvent::DragStop(event), editor, view)
	}

	fn cancel(&mut self, editor: &mut Editor, view: &mut View) -> Result<(), EditorError> {
		self.handle_event(PointerToolEvent::Abort, editor, view)
	}

	fn paint(&self, editor: &Editor, context: &mut PaintContext) {
		if let (PointerToolFsmState::Selecting, Some(band)) = (self.fsm_state, self.data.band) {
			context.canvas().stroke_vertices(&mut rectangle_vertices(&band, 0.), 1., editor.options().selection_color);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use quill_document::paint::RecordingCanvas;
	use quill_document::{Color, NodeTree, Scene};
	use pretty_assertions::assert_eq;

	const NO_SNAP: ModifierKeys = ModifierKeys::META_OR_COMMAND;

	fn setup() -> (Editor, View, Vec<NodeId>) {
		let mut editor = Editor::new(Scene::with_page(500., 500.).unwrap());
		let square = |x: f64, y: f64| NodeTree::rectangle(x, y, 20., 20.).unwrap().with_attribute(NodeTree::fill(Color::BLACK).unwrap());
		let ids = editor.insert_elements(vec![square(100., 100.), square(150., 150.)]).unwrap();
		editor.clear_selection().unwrap();
		(editor, View::new(DVec2::new(500., 500.)), ids)
	}

	fn click(tool: &mut PointerTool, editor: &mut Editor, view: &mut View, position: DVec2, modifiers: ModifierKeys) {
		let event = PointerEvent::new(position, modifiers);
		tool.pointer_down(editor, view, event).unwrap();
		tool.pointer_up(editor, view, event).unwrap();
	}

	#[test]
	fn clicking_selects_and_shift_toggles() {
		let (mut editor, mut view, ids) = setup();
		let mut tool = PointerTool::default();

		click(&mut tool, &mut editor, &mut view, DVec2::new(110., 110.), ModifierKeys::empty());
		assert_eq!(editor.selection(), &ids[..1]);
		click(&mut tool, &mut editor, &mut view, DVec2::new(160., 160.), ModifierKeys::SHIFT);
		assert_eq!(editor.selection(), ids.as_slice());
		click(&mut tool, &mut editor, &mut view, DVec2::new(110., 110.), ModifierKeys::SHIFT);
		assert_eq!(editor.selection(), &ids[1..]);
		click(&mut tool, &mut editor, &mut view, DVec2::new(400., 400.), ModifierKeys::empty());
		assert!(editor.selection().is_empty());
		// Clicks leave no undo states behind
		assert_eq!(editor.undo_name(), Some("Insert Element(s)"));
	}

	#[test]
	fn dragging_moves_the_selection_in_one_undo_state() {
		let (mut editor, mut view, ids) = setup();
		let mut tool = PointerTool::default();

		tool.pointer_down(&mut editor, &mut view, PointerEvent::new(DVec2::new(110., 110.), NO_SNAP)).unwrap();
		tool.pointer_move(&mut editor, &mut view, PointerEvent::new(DVec2::new(120., 110.), NO_SNAP)).unwrap();
		tool.pointer_move(&mut editor, &mut view, PointerEvent::new(DVec2::new(140., 115.), NO_SNAP)).unwrap();
		tool.pointer_up(&mut editor, &mut view, PointerEvent::new(DVec2::new(140., 115.), NO_SNAP)).unwrap();

		assert_eq!(editor.scene().scene_geometry_bbox(ids[0]), Some(Rect::new(130., 105., 20., 20.)));
		assert_eq!(editor.undo_name(), Some("Move Selection"));
		editor.undo().unwrap();
		assert_eq!(editor.scene().scene_geometry_bbox(ids[0]), Some(Rect::new(100., 100., 20., 20.)));
		assert_eq!(editor.undo_name(), Some("Insert Element(s)"));
	}

	#[test]
	fn cancelling_a_drag_restores_the_positions() {
		let (mut editor, mut view, ids) = setup();
		let mut tool = PointerTool::default();
		tool.pointer_down(&mut editor, &mut view, PointerEvent::new(DVec2::new(110., 110.), NO_SNAP)).unwrap();
		tool.pointer_move(&mut editor, &mut view, PointerEvent::new(DVec2::new(300., 300.), NO_SNAP)).unwrap();
		tool.cancel(&mut editor, &mut view).unwrap();
		assert!(!editor.is_in_transaction());
		assert_eq!(editor.scene().scene_geometry_bbox(ids[0]), Some(Rect::new(100., 100., 20., 20.)));
	}

	#[test]
	fn rubber_band_selects_contained_items() {
		let (mut editor, mut view, ids) = setup();
		let mut tool = PointerTool::default();
		tool.pointer_down(&mut editor, &mut view, PointerEvent::new(DVec2::new(300., 300.), NO_SNAP)).unwrap();
		tool.pointer_move(&mut editor, &mut view, PointerEvent::new(DVec2::new(90., 90.), NO_SNAP)).unwrap();

		let mut canvas = RecordingCanvas::new();
		editor.paint(&mut view, &mut canvas, Some(&tool));
		assert_eq!(canvas.strokes().filter(|&(_, _, color)| color == Color::SELECTION).count(), 1);

		tool.pointer_up(&mut editor, &mut view, PointerEvent::new(DVec2::new(90., 90.), NO_SNAP)).unwrap();
		assert_eq!(editor.selection(), ids.as_slice());

		// A band that only touches an item does not select it
		tool.pointer_down(&mut editor, &mut view, PointerEvent::new(DVec2::new(300., 300.), NO_SNAP)).unwrap();
		tool.pointer_up(&mut editor, &mut view, PointerEvent::new(DVec2::new(160., 160.), NO_SNAP)).unwrap();
		assert!(editor.selection().is_empty());
	}

	#[test]
	fn dragging_a_handle_resizes() {
		let (mut editor, mut view, ids) = setup();
		editor.select(&ids[..1]).unwrap();
		let mut tool = PointerTool::default();
		tool.pointer_down(&mut editor, &mut view, PointerEvent::new(DVec2::new(121., 121.), NO_SNAP)).unwrap();
		tool.pointer_move(&mut editor, &mut view, PointerEvent::new(DVec2::new(140., 140.), NO_SNAP)).unwrap();
		tool.pointer_up(&mut editor, &mut view, PointerEvent::new(DVec2::new(140., 140.), NO_SNAP)).unwrap();
		assert_eq!(editor.scene().scene_geometry_bbox(ids[0]), Some(Rect::new(100., 100., 40., 40.)));
		assert_eq!(editor.undo_name(), Some("Edit Element"));
	}
}
