use crate::consts::{CLONE_SHIFT, DEFAULT_MAX_UNDO_STEPS, HANDLE_SIZE, NODES_MIME_TYPE, NUDGE_AMOUNT};
use crate::error::EditorError;

use quill_document::paint::PaintConfiguration;
use quill_document::Color;

use serde::{Deserialize, Serialize};

/// User preferences of an editor. Hosts persist them as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorOptions {
	/// Number of undo states kept before the oldest ones are dropped.
	pub max_undo_steps: usize,
	/// Folds consecutive edits of the same properties of one node into a single undo state.
	pub smart_undo_property_merge: bool,
	pub nudge_distance: f64,
	pub clone_shift: f64,
	pub handle_size: f64,
	pub selection_color: Color,
	pub highlight_color: Color,
	pub guide_color: Color,
	pub clipboard_mime_type: String,
}

impl Default for EditorOptions {
	fn default() -> Self {
		Self {
			max_undo_steps: DEFAULT_MAX_UNDO_STEPS,
			smart_undo_property_merge: true,
			nudge_distance: NUDGE_AMOUNT,
			clone_shift: CLONE_SHIFT,
			handle_size: HANDLE_SIZE,
			selection_color: Color::SELECTION,
			highlight_color: Color::HIGHLIGHT,
			guide_color: Color::GUIDE,
			clipboard_mime_type: NODES_MIME_TYPE.to_string(),
		}
	}
}

impl EditorOptions {
	/// Reads options from JSON. Missing fields keep their defaults.
	pub fn from_json(json: &str) -> Result<Self, EditorError> {
		Ok(serde_json::from_str(json)?)
	}

	pub fn to_json(&self) -> Result<String, EditorError> {
		Ok(serde_json::to_string_pretty(self)?)
	}

	/// The paint configuration of a view showing this editor's document.
	pub fn paint_configuration(&self) -> PaintConfiguration {
		PaintConfiguration {
			selection_color: self.selection_color,
			highlight_color: self.highlight_color,
			guide_color: self.guide_color,
			..Default::default()
		}
	}
}
