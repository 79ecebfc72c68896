use super::{snapped_position, PointerEvent, Tool, ToolType};
use crate::editor::Editor;
use crate::error::EditorError;

use quill_document::{Color, DocumentError, NodeId, NodeTree, PathAnchor, PropertyValue, View};

/// Draws paths by clicking anchors. Clicking the first anchor again closes the path.
#[derive(Debug, Default)]
pub struct PenTool {
	fsm_state: PenToolFsmState,
	data: PenToolData,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
enum PenToolFsmState {
	#[default]
	Ready,
	Drawing,
}

#[derive(Clone, Debug, Default)]
struct PenToolData {
	path: Option<NodeId>,
}

#[derive(Clone, Copy, Debug)]
enum PenToolEvent {
	Click(PointerEvent),
	/// Ends the path where it is: kept when it has a segment, discarded otherwise.
	Finish,
}

const TRANSACTION_NAME: &str = "Draw Path";

fn anchors(editor: &Editor, path: NodeId) -> Vec<PathAnchor> {
	editor.scene().property(path, "anchors").and_then(PropertyValue::as_anchors).unwrap_or_default().to_vec()
}

impl PenToolFsmState {
	fn transition(self, event: PenToolEvent, editor: &mut Editor, view: &mut View, data: &mut PenToolData) -> Result<Self, EditorError> {
		use PenToolEvent::*;
		use PenToolFsmState::*;

		let state = match (self, event) {
			(Ready, Click(event)) => {
				let position = snapped_position(editor, view, &event, &[]);
				let tree = NodeTree::path(vec![PathAnchor::new(position)], false)?.with_attribute(NodeTree::stroke(Color::BLACK, 1.)?);
				editor.begin_transaction()?;
				match editor.insert_elements(vec![tree]) {
					Ok(ids) => data.path = ids.first().copied(),
					Err(error) => {
						editor.rollback_transaction()?;
						return Err(error);
					}
				}
				Drawing
			}
			(Drawing, Click(event)) => {
				let Some(path) = data.path else { return Ok(Ready) };
				let mut anchors = anchors(editor, path);
				let transform = editor.scene().world_transform(path);

				let closes = anchors.len() >= 3
					&& anchors
						.first()
						.is_some_and(|first| view.scene_to_view(transform.map_point(first.position)).distance(event.position) <= editor.options().handle_size / 2.);
				if closes {
					editor.scene_mut().set_property(path, "closed", true)?;
					data.path = None;
					editor.clear_guide_visuals();
					editor.commit_transaction(TRANSACTION_NAME)?;
					return Ok(Ready);
				}

				let position = snapped_position(editor, view, &event, &[path]);
				let local = transform.checked_inverse().map_err(DocumentError::from)?.map_point(position);
				anchors.push(PathAnchor::new(local));
				editor.scene_mut().set_property(path, "anchors", anchors)?;
				Drawing
			}
			(Drawing, Finish) => {
				let segments = data.path.map(|path| anchors(editor, path).len()).unwrap_or_default();
				data.path = None;
				editor.clear_guide_visuals();
				if segments >= 2 {
					editor.commit_transaction(TRANSACTION_NAME)?;
				} else {
					editor.rollback_transaction()?;
				}
				Ready
			}
			(state, _) => state,
		};
		Ok(state)
	}
}

impl PenTool {
	fn handle_event(&mut self, event: PenToolEvent, editor: &mut Editor, view: &mut View) -> Result<(), EditorError> {
		self.fsm_state = self.fsm_state.transition(event, editor, view, &mut self.data)?;
		Ok(())
	}
}

impl Tool for PenTool {
	fn tool_type(&self) -> ToolType {
		ToolType::Pen
	}

	fn pointer_down(&mut self, editor: &mut Editor, view: &mut View, event: PointerEvent) -> Result<(), EditorError> {
		self.handle_event(PenToolEvent::Click(event), editor, view)
	}

	fn pointer_move(&mut self, _editor: &mut Editor, _view: &mut View, _event: PointerEvent) -> Result<(), EditorError> {
		Ok(())
	}

	fn pointer_up(&mut self, _editor: &mut Editor, _view: &mut View, _event: PointerEvent) -> Result<(), EditorError> {
		Ok(())
	}

	/// Finishes the path being drawn instead of discarding it.
	fn cancel(&mut self, editor: &mut Editor, view: &mut View) -> Result<(), EditorError> {
		self.handle_event(PenToolEvent::Finish, editor, view)
	}
}
