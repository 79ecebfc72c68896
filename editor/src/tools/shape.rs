use super::{snapped_position, ModifierKeys, PointerEvent, Tool, ToolType};
use crate::editor::Editor;
use crate::error::EditorError;

use quill_document::{Color, DocumentError, NodeId, NodeTree, Scene, View};

use glam::DVec2;
use vertex_rs::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
	Rectangle,
	Ellipse,
}

impl ShapeKind {
	fn transaction_name(self) -> &'static str {
		match self {
			ShapeKind::Rectangle => "Draw Rectangle",
			ShapeKind::Ellipse => "Draw Ellipse",
		}
	}

	fn tree(self, position: DVec2) -> Result<NodeTree, DocumentError> {
		let tree = match self {
			ShapeKind::Rectangle => NodeTree::rectangle(position.x, position.y, 0., 0.)?,
			ShapeKind::Ellipse => NodeTree::ellipse(position, DVec2::ZERO)?,
		};
		Ok(tree.with_attribute(NodeTree::fill(Color::WHITE)?).with_attribute(NodeTree::stroke(Color::BLACK, 1.)?))
	}

	/// Fits the shape of `id` into `rect`.
	fn set_geometry(self, scene: &mut Scene, id: NodeId, rect: Rect) -> Result<bool, DocumentError> {
		match self {
			ShapeKind::Rectangle => scene.set_properties(id, &["x", "y", "width", "height"], vec![rect.x().into(), rect.y().into(), rect.width().into(), rect.height().into()]),
			ShapeKind::Ellipse => {
				let center = rect.center();
				let radii = rect.size() / 2.;
				scene.set_properties(id, &["cx", "cy", "rx", "ry"], vec![center.x.into(), center.y.into(), radii.x.into(), radii.y.into()])
			}
		}
	}
}

/// The rectangle spanned by a drag. Shift keeps it square and alt grows it around the start.
fn drag_rect(start: DVec2, current: DVec2, modifiers: ModifierKeys) -> Rect {
	let mut delta = current - start;
	if modifiers.contains(ModifierKeys::SHIFT) {
		let side = delta.x.abs().max(delta.y.abs());
		delta = DVec2::new(side.copysign(delta.x), side.copysign(delta.y));
	}
	if modifiers.contains(ModifierKeys::ALT) {
		Rect::from_points(start - delta, start + delta)
	} else {
		Rect::from_points(start, start + delta)
	}
}

/// Draws rectangles or ellipses by dragging.
#[derive(Debug)]
pub struct ShapeTool {
	kind: ShapeKind,
	fsm_state: ShapeToolFsmState,
	data: ShapeToolData,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
enum ShapeToolFsmState {
	#[default]
	Ready,
	Drawing,
}

#[derive(Clone, Debug, Default)]
struct ShapeToolData {
	start: DVec2,
	element: Option<NodeId>,
}

#[derive(Clone, Copy, Debug)]
enum ShapeToolEvent {
	DragStart(PointerEvent),
	Resize(PointerEvent),
	DragStop(PointerEvent),
	Abort,
}

impl ShapeToolData {
	fn resize(&self, kind: ShapeKind, editor: &mut Editor, view: &View, event: &PointerEvent) -> Result<(), EditorError> {
		let Some(element) = self.element else { return Ok(()) };
		let current = snapped_position(editor, view, event, &[element]);
		kind.set_geometry(editor.scene_mut(), element, drag_rect(self.start, current, event.modifiers))?;
		Ok(())
	}
}

impl ShapeToolFsmState {
	fn transition(self, event: ShapeToolEvent, kind: ShapeKind, editor: &mut Editor, view: &mut View, data: &mut ShapeToolData) -> Result<Self, EditorError> {
		use ShapeToolEvent::*;
		use ShapeToolFsmState::*;

		let state = match (self, event) {
			(Ready, DragStart(event)) => {
				data.start = snapped_position(editor, view, &event, &[]);
				let tree = kind.tree(data.start)?;
				editor.begin_transaction()?;
				match editor.insert_elements(vec![tree]) {
					Ok(ids) => data.element = ids.first().copied(),
					Err(error) => {
						editor.rollback_transaction()?;
						return Err(error);
					}
				}
				Drawing
			}
			(Drawing, Resize(event)) => {
				data.resize(kind, editor, view, &event)?;
				Drawing
			}
			(Drawing, DragStop(event)) => {
				data.resize(kind, editor, view, &event)?;
				editor.clear_guide_visuals();
				let empty = data.element.and_then(|id| editor.scene().scene_geometry_bbox(id)).is_none_or(|bbox| bbox.is_empty());
				data.element = None;
				if empty {
					log::debug!("Discarding a shape without area");
					editor.rollback_transaction()?;
				} else {
					editor.commit_transaction(kind.transaction_name())?;
				}
				Ready
			}
			(Drawing, Abort) => {
				data.element = None;
				editor.clear_guide_visuals();
				editor.rollback_transaction()?;
				Ready
			}
			(state, _) => state,
		};
		Ok(state)
	}
}

impl ShapeTool {
	pub fn new(kind: ShapeKind) -> Self {
		Self {
			kind,
			fsm_state: ShapeToolFsmState::default(),
			data: ShapeToolData::default(),
		}
	}

	fn handle_event(&mut self, event: ShapeToolEvent, editor: &mut Editor, view: &mut View) -> Result<(), EditorError> {
		self.fsm_state = self.fsm_state.transition(event, self.kind, editor, view, &mut self.data)?;
		Ok(())
	}
}

impl Tool for ShapeTool {
	fn tool_type(&self) -> ToolType {
		match self.kind {
			ShapeKind::Rectangle => ToolType::Rectangle,
			ShapeKind::Ellipse => ToolType::Ellipse,
		}
	}

	fn pointer_down(&mut self, editor: &mut Editor, view: &mut View, event: PointerEvent) -> Result<(), EditorError> {
		self.handle_event(ShapeToolEvent::DragStart(event), editor, view)
	}

	fn pointer_move(&mut self, editor: &mut Editor, view: &mut View, event: PointerEvent) -> Result<(), EditorError> {
		self.handle_event(ShapeToolEvent::Resize(event), editor, view)
	}

	fn pointer_up(&mut self, editor: &mut Editor, view: &mut View, event: PointerEvent) -> Result<(), EditorError> {
		self.handle_event(ShapeToolEvent::DragStop(event), editor, view)
	}

	fn cancel(&mut self, editor: &mut Editor, view: &mut View) -> Result<(), EditorError> {
		self.handle_event(ShapeToolEvent::Abort, editor, view)
	}
}
