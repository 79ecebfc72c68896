//! Snapping guides.
//!
//! A [`Guide`] maps a candidate position to preferred coordinates per axis. [`Guides`] asks its guides in priority order and takes the
//! first answer per axis, collecting visual hints (lines) along the way while a mapping session is open.

mod grid;
mod page;
mod shape_box;
mod unit;

pub use grid::GridGuide;
pub use page::PageGuide;
pub use shape_box::ShapeBoxGuide;
pub use unit::UnitGuide;

use crate::consts::GUIDE_TARGET_MIN_DISTANCE;
use crate::node::NodeId;
use crate::paint::PaintContext;
use crate::scene::Scene;

use glam::DVec2;
use vertex_rs::{Rect, VertexContainer};

/// What a guide shows for a snapped axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GuideVisual {
	/// A line in scene coordinates.
	Line([DVec2; 2]),
	/// A point the mapped position was aligned with, connected to it by a line when painted.
	Target(DVec2),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisMapping {
	pub value: f64,
	/// Distance between the input coordinate and `value`.
	pub delta: f64,
	pub visual: Option<GuideVisual>,
}

impl AxisMapping {
	pub fn new(value: f64, input: f64) -> Self {
		Self {
			value,
			delta: (input - value).abs(),
			visual: None,
		}
	}

	#[must_use]
	pub fn with_visual(mut self, visual: GuideVisual) -> Self {
		self.visual = Some(visual);
		self
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GuideMapping {
	pub x: Option<AxisMapping>,
	pub y: Option<AxisMapping>,
}

impl GuideMapping {
	/// `None` when neither axis snapped.
	pub fn into_option(self) -> Option<Self> {
		(self.x.is_some() || self.y.is_some()).then_some(self)
	}
}

/// Which guides take part in a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailMode {
	#[default]
	All,
	/// Only fine grained guides such as the grid, e.g. while placing path anchors.
	DetailOnly,
	/// No guide at all.
	None,
}

/// Parameters shared by all guides during one mapping.
#[derive(Clone, Copy)]
pub struct MapContext<'a> {
	pub scene: &'a Scene,
	/// Snap tolerance in scene units.
	pub snap_distance: f64,
	/// Whether guide lines extend past the snapped shapes.
	pub use_margin: bool,
}

pub trait Guide {
	fn map(&self, context: &MapContext, position: DVec2) -> Option<GuideMapping>;

	fn is_detail(&self) -> bool {
		false
	}

	fn is_mapping_allowed(&self, detail: DetailMode) -> bool {
		match detail {
			DetailMode::All => true,
			DetailMode::DetailOnly => self.is_detail(),
			DetailMode::None => false,
		}
	}

	/// Ignores `exclusions` as snap targets until [`Guide::clean_exclusions`].
	fn use_exclusions(&mut self, _scene: &Scene, _exclusions: &[NodeId]) {}

	fn clean_exclusions(&mut self) {}

	fn paint(&self, _scene: &Scene, _context: &mut PaintContext) {}
}

/// The guides of one editor, in priority order.
pub struct Guides {
	guides: Vec<Box<dyn Guide>>,
	counter: usize,
	visuals: Vec<[DVec2; 2]>,
	area: Option<Rect>,
	invalidations: Vec<Rect>,
	enabled: bool,
	scale: f64,
}

impl Default for Guides {
	fn default() -> Self {
		Self::with_guides(vec![Box::new(ShapeBoxGuide::default()), Box::new(PageGuide::default()), Box::new(GridGuide), Box::new(UnitGuide)])
	}
}

impl Guides {
	/// Shape boxes first, then pages, then the grid and finally units.
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_guides(guides: Vec<Box<dyn Guide>>) -> Self {
		Self {
			guides,
			counter: 0,
			visuals: Vec::new(),
			area: None,
			invalidations: Vec::new(),
			enabled: true,
			scale: 1.,
		}
	}

	pub fn is_enabled(&self) -> bool {
		self.enabled
	}

	/// Disabled guides map every position to itself.
	pub fn set_enabled(&mut self, enabled: bool) {
		self.enabled = enabled;
	}

	/// The view zoom, used to turn the pixel snap distance of the scene into scene units.
	pub fn set_scale(&mut self, scale: f64) {
		if scale > 0. {
			self.scale = scale;
		}
	}

	pub fn visuals(&self) -> &[[DVec2; 2]] {
		&self.visuals
	}

	pub fn use_exclusions(&mut self, scene: &Scene, exclusions: &[NodeId]) {
		for guide in &mut self.guides {
			guide.use_exclusions(scene, exclusions);
		}
	}

	fn context<'a>(&self, scene: &'a Scene, use_margin: bool) -> MapContext<'a> {
		MapContext {
			scene,
			snap_distance: scene.settings().snap_distance / self.scale,
			use_margin,
		}
	}

	fn is_allowed(&self, guide: &dyn Guide, detail: DetailMode) -> bool {
		self.enabled && guide.is_mapping_allowed(detail)
	}

	/// Starts a mapping session, which collects visuals until the matching [`Guides::finish_map`].
	pub fn begin_map(&mut self) {
		if self.counter == 0 {
			self.visuals.clear();
			if let Some(area) = self.area.take() {
				self.invalidations.push(area);
			}
		}
		self.counter += 1;
	}

	pub fn finish_map(&mut self) {
		if self.counter == 0 {
			log::warn!("finish_map called without begin_map");
			return;
		}
		self.counter -= 1;
		if self.counter > 0 {
			return;
		}
		let points = self.visuals.iter().flatten().copied();
		if let Some(area) = Rect::bounding(points) {
			let area = area.expanded_uniform(1.);
			self.area = Some(area);
			self.invalidations.push(area);
		}
		for guide in &mut self.guides {
			guide.clean_exclusions();
		}
	}

	fn push_visual(&mut self, line: [DVec2; 2]) {
		if self.counter > 0 {
			self.visuals.push(line);
		}
	}

	/// Maps `point` with the first guide answering for each axis.
	pub fn map_point(&mut self, scene: &Scene, point: DVec2, detail: DetailMode) -> DVec2 {
		let context = self.context(scene, true);
		let mut x = None;
		let mut y = None;
		for guide in &self.guides {
			if x.is_some() && y.is_some() {
				break;
			}
			if !self.is_allowed(guide.as_ref(), detail) {
				continue;
			}
			let Some(mapping) = guide.map(&context, point) else { continue };
			x = x.or(mapping.x);
			y = y.or(mapping.y);
		}

		let result = DVec2::new(x.map_or(point.x, |x| x.value), y.map_or(point.y, |y| y.value));
		for visual in [x, y].into_iter().flatten().filter_map(|mapping| mapping.visual) {
			match visual {
				GuideVisual::Line(line) => self.push_visual(line),
				GuideVisual::Target(target) => {
					if (result - target).abs().max_element() >= GUIDE_TARGET_MIN_DISTANCE {
						self.push_visual([result, target]);
					}
				}
			}
		}
		result
	}

	/// Moves `rect` so that one of its pivots (top left, bottom right, center) snaps.
	///
	/// Per axis, the first guide snapping any pivot wins, and among the pivots it snaps the closest one.
	pub fn map_rect(&mut self, scene: &Scene, rect: Rect) -> Rect {
		let context = self.context(scene, false);
		let pivots = [rect.min, rect.max, rect.center()];

		// (guide index, pivot index, mapping)
		let mut x: Option<(usize, usize, AxisMapping)> = None;
		let mut y: Option<(usize, usize, AxisMapping)> = None;
		for (index, guide) in self.guides.iter().enumerate() {
			if x.is_some() && y.is_some() {
				break;
			}
			if !self.is_allowed(guide.as_ref(), DetailMode::All) {
				continue;
			}
			for (pivot_index, &pivot) in pivots.iter().enumerate() {
				let Some(mapping) = guide.map(&context, pivot) else { continue };
				for (best, candidate) in [(&mut x, mapping.x), (&mut y, mapping.y)] {
					let Some(candidate) = candidate else { continue };
					if best.is_none_or(|(best_index, _, best_mapping)| best_index == index && candidate.delta < best_mapping.delta) {
						*best = Some((index, pivot_index, candidate));
					}
				}
			}
		}

		let delta = DVec2::new(
			x.map_or(0., |(_, pivot, mapping)| mapping.value - pivots[pivot].x),
			y.map_or(0., |(_, pivot, mapping)| mapping.value - pivots[pivot].y),
		);
		if delta == DVec2::ZERO {
			return rect;
		}
		let result = rect.translated(delta);
		if self.counter > 0 {
			self.collect_rect_visuals(&context, result);
		}
		result
	}

	/// Gathers the visuals of every guide that is exactly aligned with a pivot of the already snapped `rect`.
	fn collect_rect_visuals(&mut self, context: &MapContext, rect: Rect) {
		const ALIGNED: f64 = 1e-9;
		let pivots = [rect.min, rect.max, rect.center()];
		let mut lines = Vec::new();
		let mut x_guide = None;
		let mut y_guide = None;
		for (index, guide) in self.guides.iter().enumerate() {
			if x_guide.is_some() && y_guide.is_some() {
				break;
			}
			if !self.is_allowed(guide.as_ref(), DetailMode::All) {
				continue;
			}
			for pivot in pivots {
				let Some(mapping) = guide.map(context, pivot) else { continue };
				if let Some(mapping) = mapping.x.filter(|mapping| mapping.delta < ALIGNED && x_guide.is_none_or(|guide| guide == index)) {
					x_guide = Some(index);
					match mapping.visual {
						Some(GuideVisual::Line([start, end])) => lines.push([DVec2::new(start.x, start.y.min(rect.min.y)), DVec2::new(end.x, end.y.max(rect.max.y))]),
						Some(GuideVisual::Target(target)) => {
							let from = DVec2::new(mapping.value, pivot.y);
							if (from - target).abs().max_element() >= GUIDE_TARGET_MIN_DISTANCE {
								lines.push([from, target]);
							}
						}
						None => {}
					}
				}
				if let Some(mapping) = mapping.y.filter(|mapping| mapping.delta < ALIGNED && y_guide.is_none_or(|guide| guide == index)) {
					y_guide = Some(index);
					match mapping.visual {
						Some(GuideVisual::Line([start, end])) => lines.push([DVec2::new(start.x.min(rect.min.x), start.y), DVec2::new(end.x.max(rect.max.x), end.y)]),
						Some(GuideVisual::Target(target)) => {
							let from = DVec2::new(pivot.x, mapping.value);
							if (from - target).abs().max_element() >= GUIDE_TARGET_MIN_DISTANCE {
								lines.push([from, target]);
							}
						}
						None => {}
					}
				}
			}
		}
		self.visuals.extend(lines);
	}

	/// Paints what the guides show permanently (the grid) and the visuals of the current mapping session.
	pub fn paint(&self, scene: &Scene, context: &mut PaintContext) {
		if !context.configuration().guides {
			return;
		}
		for guide in &self.guides {
			guide.paint(scene, context);
		}

		let transform = context.transform();
		let color = context.configuration().guide_color;
		for [start, end] in &self.visuals {
			let mut line = VertexContainer::new();
			line.move_to(transform.map_point(*start).floor() + 0.5);
			line.line_to(transform.map_point(*end).floor() + 0.5);
			context.canvas().stroke_vertices(&mut line, 1., color);
		}
	}

	/// Takes the scene areas whose guide visuals need repainting.
	pub fn take_invalidations(&mut self) -> Vec<Rect> {
		std::mem::take(&mut self.invalidations)
	}
}
