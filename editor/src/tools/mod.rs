mod navigate;
mod pen;
mod pointer;
mod shape;

pub use navigate::{PanTool, ZoomTool};
pub use pen::PenTool;
pub use pointer::PointerTool;
pub use shape::{ShapeKind, ShapeTool};

use crate::editor::Editor;
use crate::error::EditorError;

use quill_document::paint::PaintContext;
use quill_document::{NodeId, View};

use bitflags::bitflags;
use glam::DVec2;
use serde::{Deserialize, Serialize};

bitflags! {
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
	#[repr(transparent)]
	pub struct ModifierKeys: u8 {
		const SHIFT           = 0b0000_0001;
		const ALT             = 0b0000_0010;
		const CONTROL         = 0b0000_0100;
		const META_OR_COMMAND = 0b0000_1000;
	}
}

/// A pointer event in device coordinates of the view it happened in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
	pub position: DVec2,
	pub modifiers: ModifierKeys,
}

impl PointerEvent {
	pub fn new(position: DVec2, modifiers: ModifierKeys) -> Self {
		Self { position, modifiers }
	}

	/// Holding meta (command) temporarily disables snapping.
	pub fn snapping(&self) -> bool {
		!self.modifiers.contains(ModifierKeys::META_OR_COMMAND)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolType {
	Pointer,
	Rectangle,
	Ellipse,
	Pen,
	Pan,
	Zoom,
}

/// An interactive tool driven by pointer events of one view.
pub trait Tool {
	fn tool_type(&self) -> ToolType;

	fn pointer_down(&mut self, editor: &mut Editor, view: &mut View, event: PointerEvent) -> Result<(), EditorError>;

	fn pointer_move(&mut self, editor: &mut Editor, view: &mut View, event: PointerEvent) -> Result<(), EditorError>;

	fn pointer_up(&mut self, editor: &mut Editor, view: &mut View, event: PointerEvent) -> Result<(), EditorError>;

	/// Aborts the current interaction.
	fn cancel(&mut self, _editor: &mut Editor, _view: &mut View) -> Result<(), EditorError> {
		Ok(())
	}

	/// Paints interaction feedback on top of the scene. The context transform maps scene coordinates to device space.
	fn paint(&self, _editor: &Editor, _context: &mut PaintContext) {}
}

pub fn tool_for(tool_type: ToolType) -> Box<dyn Tool> {
	match tool_type {
		ToolType::Pointer => Box::new(PointerTool::default()),
		ToolType::Rectangle => Box::new(ShapeTool::new(ShapeKind::Rectangle)),
		ToolType::Ellipse => Box::new(ShapeTool::new(ShapeKind::Ellipse)),
		ToolType::Pen => Box::new(PenTool::default()),
		ToolType::Pan => Box::new(PanTool::default()),
		ToolType::Zoom => Box::new(ZoomTool::default()),
	}
}

/// Scene position of `event`, snapped to the guides unless snapping is disabled.
fn snapped_position(editor: &mut Editor, view: &View, event: &PointerEvent, exclusions: &[NodeId]) -> DVec2 {
	let position = view.view_to_scene(event.position);
	if !event.snapping() {
		return position;
	}
	editor.guides_mut().set_scale(view.zoom());
	editor.snap_point(position, exclusions)
}

/// Converts a distance in device pixels to scene units.
fn scene_distance(view: &View, pixels: f64) -> f64 {
	let zoom = view.zoom();
	if zoom > 0. { pixels / zoom } else { pixels }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn meta_disables_snapping() {
		assert!(PointerEvent::new(DVec2::ZERO, ModifierKeys::SHIFT | ModifierKeys::ALT).snapping());
		assert!(!PointerEvent::new(DVec2::ZERO, ModifierKeys::META_OR_COMMAND).snapping());
	}

	#[test]
	fn tools_report_their_type() {
		for tool_type in [ToolType::Pointer, ToolType::Rectangle, ToolType::Ellipse, ToolType::Pen, ToolType::Pan, ToolType::Zoom] {
			assert_eq!(tool_for(tool_type).tool_type(), tool_type);
		}
	}
}
