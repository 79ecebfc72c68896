use super::{ModifierKeys, PointerEvent, Tool, ToolType};
use crate::consts::{DRAG_THRESHOLD, VIEWPORT_ZOOM_SCALE_MAX, VIEWPORT_ZOOM_SCALE_MIN, VIEWPORT_ZOOM_STEP};
use crate::editor::Editor;
use crate::error::EditorError;

use quill_document::View;

use glam::DVec2;
use vertex_rs::Rect;

/// Scrolls the view by dragging.
#[derive(Debug, Default)]
pub struct PanTool {
	fsm_state: NavigateToolFsmState,
	last: DVec2,
}

/// Zooms in on click, out on alt click, and onto the dragged area.
#[derive(Debug, Default)]
pub struct ZoomTool {
	fsm_state: NavigateToolFsmState,
	start: DVec2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
enum NavigateToolFsmState {
	#[default]
	Ready,
	Dragging,
}

impl Tool for PanTool {
	fn tool_type(&self) -> ToolType {
		ToolType::Pan
	}

	fn pointer_down(&mut self, _editor: &mut Editor, _view: &mut View, event: PointerEvent) -> Result<(), EditorError> {
		self.last = event.position;
		self.fsm_state = NavigateToolFsmState::Dragging;
		Ok(())
	}

	fn pointer_move(&mut self, _editor: &mut Editor, view: &mut View, event: PointerEvent) -> Result<(), EditorError> {
		if self.fsm_state == NavigateToolFsmState::Dragging {
			view.scroll(event.position - self.last);
			self.last = event.position;
		}
		Ok(())
	}

	fn pointer_up(&mut self, editor: &mut Editor, view: &mut View, event: PointerEvent) -> Result<(), EditorError> {
		self.pointer_move(editor, view, event)?;
		self.fsm_state = NavigateToolFsmState::Ready;
		Ok(())
	}

	fn cancel(&mut self, _editor: &mut Editor, _view: &mut View) -> Result<(), EditorError> {
		self.fsm_state = NavigateToolFsmState::Ready;
		Ok(())
	}
}

impl Tool for ZoomTool {
	fn tool_type(&self) -> ToolType {
		ToolType::Zoom
	}

	fn pointer_down(&mut self, _editor: &mut Editor, _view: &mut View, event: PointerEvent) -> Result<(), EditorError> {
		self.start = event.position;
		self.fsm_state = NavigateToolFsmState::Dragging;
		Ok(())
	}

	fn pointer_move(&mut self, _editor: &mut Editor, _view: &mut View, _event: PointerEvent) -> Result<(), EditorError> {
		Ok(())
	}

	fn pointer_up(&mut self, _editor: &mut Editor, view: &mut View, event: PointerEvent) -> Result<(), EditorError> {
		if self.fsm_state != NavigateToolFsmState::Dragging {
			return Ok(());
		}
		self.fsm_state = NavigateToolFsmState::Ready;

		let band = Rect::from_points(self.start, event.position);
		if band.width().max(band.height()) > DRAG_THRESHOLD {
			view.zoom_to_area(view.transform().inverted_or_identity().map_rect(&band));
		} else {
			let factor = if event.modifiers.contains(ModifierKeys::ALT) { 1. / VIEWPORT_ZOOM_STEP } else { VIEWPORT_ZOOM_STEP };
			let zoom = (view.zoom() * factor).clamp(VIEWPORT_ZOOM_SCALE_MIN, VIEWPORT_ZOOM_SCALE_MAX);
			view.zoom_at(zoom, event.position);
		}
		Ok(())
	}

	fn cancel(&mut self, _editor: &mut Editor, _view: &mut View) -> Result<(), EditorError> {
		self.fsm_state = NavigateToolFsmState::Ready;
		Ok(())
	}
}
