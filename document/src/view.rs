use crate::guides::Guides;
use crate::paint::{DirtyList, LayerEffect, PaintCanvas, PaintConfiguration, PaintContext};
use crate::scene::Scene;

use glam::DVec2;
use vertex_rs::{Rect, Transform};

/// A window onto a scene: the scene to device transform, the device size and the areas waiting for a repaint.
#[derive(Debug, Clone)]
pub struct View {
	transform: Transform,
	size: DVec2,
	dirty_list: DirtyList,
	configuration: PaintConfiguration,
}

impl View {
	pub fn new(size: DVec2) -> Self {
		let mut view = Self {
			transform: Transform::IDENTITY,
			size,
			dirty_list: DirtyList::new(),
			configuration: PaintConfiguration::default(),
		};
		view.set_size(size);
		view
	}

	pub fn size(&self) -> DVec2 {
		self.size
	}

	pub fn set_size(&mut self, size: DVec2) {
		self.size = size.max(DVec2::ZERO);
		self.dirty_list.set_area(Some(self.view_rect()));
		self.invalidate_all();
	}

	fn view_rect(&self) -> Rect {
		Rect::new(0., 0., self.size.x, self.size.y)
	}

	/// Maps scene coordinates to device coordinates.
	pub fn transform(&self) -> Transform {
		self.transform
	}

	pub fn set_transform(&mut self, transform: Transform) {
		if transform.checked_inverse().is_err() {
			log::warn!("Ignoring a view transform that can not be inverted");
			return;
		}
		if transform != self.transform {
			self.transform = transform;
			self.invalidate_all();
		}
	}

	pub fn configuration(&self) -> &PaintConfiguration {
		&self.configuration
	}

	pub fn set_configuration(&mut self, configuration: PaintConfiguration) {
		self.configuration = configuration;
		self.invalidate_all();
	}

	pub fn zoom(&self) -> f64 {
		self.transform.scale_factor()
	}

	/// Zooms to `zoom` while keeping the scene point below the device position `center` in place.
	pub fn zoom_at(&mut self, zoom: f64, center: DVec2) {
		let current = self.zoom();
		if zoom <= 0. || current <= 0. {
			return;
		}
		let factor = zoom / current;
		let transform = self
			.transform
			.compose(&Transform::from_translation(-center))
			.compose(&Transform::from_scale(DVec2::splat(factor)))
			.compose(&Transform::from_translation(center));
		self.set_transform(transform);
	}

	/// Moves the scene content by `delta` device pixels.
	pub fn scroll(&mut self, delta: DVec2) {
		self.set_transform(self.transform.translated(delta));
	}

	/// Fits `area` (scene coordinates) into the view, centered.
	pub fn zoom_to_area(&mut self, area: Rect) {
		if area.is_empty() || self.size.min_element() <= 0. {
			return;
		}
		let zoom = (self.size / area.size()).min_element();
		let offset = self.size / 2. - area.center() * zoom;
		self.set_transform(Transform::from_scale(DVec2::splat(zoom)).translated(offset));
	}

	pub fn view_to_scene(&self, point: DVec2) -> DVec2 {
		self.transform.inverted_or_identity().map_point(point)
	}

	pub fn scene_to_view(&self, point: DVec2) -> DVec2 {
		self.transform.map_point(point)
	}

	pub fn visible_scene_area(&self) -> Rect {
		self.transform.inverted_or_identity().map_rect(&self.view_rect())
	}

	/// Marks a device area for repainting. Returns whether the dirty region grew.
	pub fn invalidate_view_area(&mut self, area: Rect) -> bool {
		self.dirty_list.dirty(area)
	}

	/// Marks a scene area for repainting, widened by a pixel to cover antialiasing.
	pub fn invalidate_scene_area(&mut self, area: Rect) -> bool {
		let area = self.transform.map_rect(&area).expanded_uniform(1.);
		self.dirty_list.dirty(area)
	}

	pub fn invalidate_all(&mut self) {
		self.dirty_list.reset();
		let rect = self.view_rect();
		self.dirty_list.dirty(rect);
	}

	pub fn has_dirty_areas(&self) -> bool {
		!self.dirty_list.is_empty()
	}

	/// Collects what the scene and the guides invalidated since the last update.
	pub fn update(&mut self, scene: &mut Scene, guides: &mut Guides) {
		guides.set_scale(self.zoom());
		for area in scene.take_invalidations().into_iter().chain(guides.take_invalidations()) {
			self.invalidate_scene_area(area);
		}
	}

	/// Repaints the dirty areas onto `canvas` and returns them (device coordinates), empty when nothing was dirty.
	///
	/// Hosts clear the returned areas before replaying what was painted.
	pub fn paint(&mut self, scene: &Scene, guides: &Guides, canvas: &mut dyn PaintCanvas) -> Vec<Rect> {
		self.paint_with(scene, guides, canvas, |_| {})
	}

	/// Like [`View::paint`], with `annotate` painting on top of the scene and below the guides when annotations are enabled.
	pub fn paint_with(&mut self, scene: &Scene, guides: &Guides, canvas: &mut dyn PaintCanvas, annotate: impl FnOnce(&mut PaintContext)) -> Vec<Rect> {
		let Some(mut matcher) = self.dirty_list.flush() else { return Vec::new() };
		let view_rect = self.view_rect();
		matcher.clip(view_rect);
		let Some(united) = matcher.united_area() else { return Vec::new() };
		log::trace!("Painting {} dirty areas within {united:?}", matcher.dirty_rectangles().len());

		let configuration = PaintConfiguration {
			clip_area: Some(view_rect),
			..self.configuration.clone()
		};
		let mut context = PaintContext::new(canvas, &configuration, self.transform).with_dirty_matcher(Some(&matcher));
		context.canvas().begin_layer(LayerEffect::Clip { area: united });
		scene.paint(&mut context);
		if context.is_annotating() {
			annotate(&mut context);
		}
		guides.paint(scene, &mut context);
		context.canvas().end_layer();

		matcher.dirty_rectangles().to_vec()
	}
}
