use super::canvas::{LayerEffect, PaintCanvas};
use super::dirty::DirtyMatcher;
use crate::consts::OUTLINE_WIDTH;
use crate::Color;

use vertex_rs::{rectangle_vertices, Rect, Transform, VertexSource, VertexTransformer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaintMode {
	#[default]
	Full,
	/// Skips expensive effects such as blur while interacting.
	Fast,
	/// Wireframe rendering of the geometry only.
	Outline,
	/// Final output: no annotations, selection or guides.
	Output,
}

/// Settings of a paint pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PaintConfiguration {
	pub paint_mode: PaintMode,
	/// Device area outside of which nothing needs painting.
	pub clip_area: Option<Rect>,
	pub annotations: bool,
	pub guides: bool,
	pub selection_color: Color,
	pub highlight_color: Color,
	pub guide_color: Color,
}

impl Default for PaintConfiguration {
	fn default() -> Self {
		Self {
			paint_mode: PaintMode::Full,
			clip_area: None,
			annotations: true,
			guides: true,
			selection_color: Color::SELECTION,
			highlight_color: Color::HIGHLIGHT,
			guide_color: Color::GUIDE,
		}
	}
}

/// State threaded through one paint pass.
///
/// The transform stack maps the coordinate space of whatever is currently painted to device space.
/// All state pushed onto the context is scoped to a closure so that pushes and pops always pair up.
pub struct PaintContext<'a> {
	canvas: &'a mut dyn PaintCanvas,
	configuration: &'a PaintConfiguration,
	dirty_matcher: Option<&'a DirtyMatcher>,
	transforms: Vec<Transform>,
	outline_colors: Vec<Color>,
}

impl<'a> PaintContext<'a> {
	pub fn new(canvas: &'a mut dyn PaintCanvas, configuration: &'a PaintConfiguration, transform: Transform) -> Self {
		Self {
			canvas,
			configuration,
			dirty_matcher: None,
			transforms: vec![transform],
			outline_colors: Vec::new(),
		}
	}

	/// Restricts painting to the areas of `dirty_matcher`, given in device coordinates.
	#[must_use]
	pub fn with_dirty_matcher(mut self, dirty_matcher: Option<&'a DirtyMatcher>) -> Self {
		self.dirty_matcher = dirty_matcher;
		self
	}

	pub fn configuration(&self) -> &PaintConfiguration {
		self.configuration
	}

	pub fn dirty_matcher(&self) -> Option<&DirtyMatcher> {
		self.dirty_matcher
	}

	pub fn transform(&self) -> Transform {
		self.transforms.last().copied().unwrap_or_default()
	}

	pub fn is_outline(&self) -> bool {
		self.configuration.paint_mode == PaintMode::Outline
	}

	pub fn is_fast(&self) -> bool {
		self.configuration.paint_mode == PaintMode::Fast
	}

	pub fn is_annotating(&self) -> bool {
		self.configuration.annotations && self.configuration.paint_mode != PaintMode::Output
	}

	/// Color of outlines, black unless overridden by an enclosing [`PaintContext::with_outline_color`].
	pub fn outline_color(&self) -> Color {
		self.outline_colors.last().copied().unwrap_or(Color::BLACK)
	}

	/// Whether anything with the local bounding box `bbox` would end up on screen in this pass.
	pub fn is_paintable(&self, bbox: Option<Rect>) -> bool {
		let Some(bbox) = bbox.filter(|bbox| bbox.width() >= 0. && bbox.height() >= 0.) else {
			return false;
		};
		let device = self.transform().map_rect(&bbox);
		if self.configuration.clip_area.is_some_and(|clip| !clip.intersects(&device)) {
			return false;
		}
		self.dirty_matcher.is_none_or(|matcher| matcher.is_dirty(&device))
	}

	/// Runs `paint` with `transform` applied before the current transform.
	pub fn with_transform<R>(&mut self, transform: Transform, paint: impl FnOnce(&mut Self) -> R) -> R {
		let combined = transform.compose(&self.transform());
		self.transforms.push(combined);
		let result = paint(self);
		self.transforms.pop();
		result
	}

	pub fn with_outline_color<R>(&mut self, color: Color, paint: impl FnOnce(&mut Self) -> R) -> R {
		self.outline_colors.push(color);
		let result = paint(self);
		self.outline_colors.pop();
		result
	}

	/// Paints into a layer with an effect given in local coordinates.
	pub fn with_layer<R>(&mut self, effect: LayerEffect, paint: impl FnOnce(&mut Self) -> R) -> R {
		let transform = self.transform();
		let scale = transform.scale_factor();
		let effect = match effect {
			LayerEffect::Blur { radius } => LayerEffect::Blur { radius: radius * scale },
			LayerEffect::Shadow { offset, blur, color } => LayerEffect::Shadow {
				offset: transform.map_vector(offset),
				blur: blur * scale,
				color,
			},
			LayerEffect::Clip { area } => LayerEffect::Clip { area: transform.map_rect(&area) },
		};
		self.canvas.begin_layer(effect);
		let result = paint(self);
		self.canvas.end_layer();
		result
	}

	/// Nests one layer per effect, the first effect outermost.
	pub fn with_layers<R>(&mut self, effects: &[LayerEffect], paint: impl FnOnce(&mut Self) -> R) -> R {
		match effects.split_first() {
			Some((&first, rest)) => self.with_layer(first, |context| context.with_layers(rest, paint)),
			None => paint(self),
		}
	}

	pub fn fill_vertices(&mut self, source: &mut dyn VertexSource, color: Color) {
		let mut transformed = VertexTransformer::new(source, self.transform());
		self.canvas.fill_vertices(&mut transformed, color);
	}

	/// Strokes with a width given in local units.
	pub fn stroke_vertices(&mut self, source: &mut dyn VertexSource, width: f64, color: Color) {
		let transform = self.transform();
		let mut transformed = VertexTransformer::new(source, transform);
		self.canvas.stroke_vertices(&mut transformed, width * transform.scale_factor(), color);
	}

	/// Strokes with a constant device width, as used for outlines and annotations.
	pub fn stroke_hairline(&mut self, source: &mut dyn VertexSource, color: Color) {
		let mut transformed = VertexTransformer::new(source, self.transform());
		self.canvas.stroke_vertices(&mut transformed, OUTLINE_WIDTH, color);
	}

	pub fn fill_rect(&mut self, rect: Rect, color: Color) {
		self.fill_vertices(&mut rectangle_vertices(&rect, 0.), color);
	}

	/// Paints directly in device coordinates, bypassing the transform stack.
	pub fn canvas(&mut self) -> &mut dyn PaintCanvas {
		&mut *self.canvas
	}
}
