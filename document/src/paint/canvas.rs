use crate::Color;

use glam::DVec2;
use std::fmt::Write;
use vertex_rs::{rectangle_vertices, to_bez_path, Rect, VertexContainer, VertexSource};

/// Effect applied to everything painted between [`PaintCanvas::begin_layer`] and [`PaintCanvas::end_layer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayerEffect {
	Blur { radius: f64 },
	Shadow { offset: DVec2, blur: f64, color: Color },
	Clip { area: Rect },
}

/// Paint target. Geometry handed to a canvas is already in device coordinates.
pub trait PaintCanvas {
	fn fill_vertices(&mut self, source: &mut dyn VertexSource, color: Color);

	fn stroke_vertices(&mut self, source: &mut dyn VertexSource, width: f64, color: Color);

	fn begin_layer(&mut self, effect: LayerEffect);

	fn end_layer(&mut self);

	fn fill_rect(&mut self, rect: Rect, color: Color) {
		self.fill_vertices(&mut rectangle_vertices(&rect, 0.), color);
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
	Fill { vertices: VertexContainer, color: Color },
	Stroke { vertices: VertexContainer, width: f64, color: Color },
	BeginLayer(LayerEffect),
	EndLayer,
}

/// Canvas remembering what was drawn, used by hosts that replay the commands and by tests.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
	pub commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn clear(&mut self) {
		self.commands.clear();
	}

	pub fn fills(&self) -> impl Iterator<Item = (&VertexContainer, Color)> {
		self.commands.iter().filter_map(|command| match command {
			DrawCommand::Fill { vertices, color } => Some((vertices, *color)),
			_ => None,
		})
	}

	pub fn strokes(&self) -> impl Iterator<Item = (&VertexContainer, f64, Color)> {
		self.commands.iter().filter_map(|command| match command {
			DrawCommand::Stroke { vertices, width, color } => Some((vertices, *width, *color)),
			_ => None,
		})
	}
}

impl PaintCanvas for RecordingCanvas {
	fn fill_vertices(&mut self, source: &mut dyn VertexSource, color: Color) {
		let vertices = VertexContainer::from_source(source);
		self.commands.push(DrawCommand::Fill { vertices, color });
	}

	fn stroke_vertices(&mut self, source: &mut dyn VertexSource, width: f64, color: Color) {
		let vertices = VertexContainer::from_source(source);
		self.commands.push(DrawCommand::Stroke { vertices, width, color });
	}

	fn begin_layer(&mut self, effect: LayerEffect) {
		self.commands.push(DrawCommand::BeginLayer(effect));
	}

	fn end_layer(&mut self) {
		self.commands.push(DrawCommand::EndLayer);
	}
}

/// Canvas rendering to SVG markup.
#[derive(Debug, Clone)]
pub struct SvgCanvas {
	size: DVec2,
	content: String,
	clip_count: usize,
}

impl SvgCanvas {
	pub fn new(size: DVec2) -> Self {
		Self {
			size,
			content: String::new(),
			clip_count: 0,
		}
	}

	/// The rendered document.
	pub fn finish(self) -> String {
		format!(
			r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">{}</svg>"#,
			self.size.x, self.size.y, self.size.x, self.size.y, self.content
		)
	}

	fn path_data(source: &mut dyn VertexSource) -> String {
		to_bez_path(source).to_svg()
	}
}

impl PaintCanvas for SvgCanvas {
	fn fill_vertices(&mut self, source: &mut dyn VertexSource, color: Color) {
		let _ = write!(self.content, r##"<path d="{}" fill="#{}"/>"##, Self::path_data(source), color.to_rgba_hex());
	}

	fn stroke_vertices(&mut self, source: &mut dyn VertexSource, width: f64, color: Color) {
		let _ = write!(
			self.content,
			r##"<path d="{}" fill="none" stroke="#{}" stroke-width="{width}"/>"##,
			Self::path_data(source),
			color.to_rgba_hex()
		);
	}

	fn begin_layer(&mut self, effect: LayerEffect) {
		let _ = match effect {
			LayerEffect::Blur { radius } => write!(self.content, r#"<g style="filter: blur({radius}px)">"#),
			LayerEffect::Shadow { offset, blur, color } => write!(
				self.content,
				r##"<g style="filter: drop-shadow({}px {}px {blur}px #{})">"##,
				offset.x,
				offset.y,
				color.to_rgba_hex()
			),
			LayerEffect::Clip { area } => {
				self.clip_count += 1;
				write!(
					self.content,
					r#"<clipPath id="clip{}"><rect x="{}" y="{}" width="{}" height="{}"/></clipPath><g clip-path="url(#clip{})">"#,
					self.clip_count,
					area.x(),
					area.y(),
					area.width(),
					area.height(),
					self.clip_count
				)
			}
		};
	}

	fn end_layer(&mut self) {
		self.content.push_str("</g>");
	}
}
