use crate::node::{Node, NodeFlags, NodeId, NodeKind};
use crate::paint::{LayerEffect, PaintContext};
use crate::properties::{PathAnchor, PropertyValue};
use crate::scene::Scene;
use crate::Color;

use glam::DVec2;
use vertex_rs::{
	ellipse_vertices, hit_test, push_corner, rectangle_vertices, rounded_polygon_vertices, vertex_bounds, HitTestOptions, Rect, Transform, VertexContainer, VertexHit, VertexOffsetter,
	VertexTransformer,
};

/// An element found below a position, see [`Scene::hit_test`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementHit {
	pub element: NodeId,
	pub hit: VertexHit,
}

/// How a stroke is placed relative to the outline it follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeAlignment {
	Center,
	Inside,
	Outside,
}

impl StrokeAlignment {
	fn from_tag(tag: &str) -> Self {
		match tag {
			"inside" => StrokeAlignment::Inside,
			"outside" => StrokeAlignment::Outside,
			_ => StrokeAlignment::Center,
		}
	}

	/// The alignment actually painted. Open outlines have no inside, so they are always stroked centered.
	fn for_outline(tag: &str, closed: bool) -> Self {
		if closed { Self::from_tag(tag) } else { StrokeAlignment::Center }
	}
}

fn offset_sides(tag: &str) -> (bool, bool) {
	match tag {
		"inset" => (true, false),
		"both" => (true, true),
		_ => (false, true),
	}
}

/// Vertices of a path through `anchors`. Anchors without handles are joined by lines and cut by their corner radius.
pub fn path_vertices(anchors: &[PathAnchor], closed: bool) -> VertexContainer {
	let mut container = VertexContainer::new();
	let Some(first) = anchors.first() else { return container };

	if !anchors.iter().any(PathAnchor::has_handles) {
		if closed && anchors.len() > 2 {
			let corners = anchors.iter().map(|anchor| (anchor.position, anchor.radius, anchor.corner)).collect::<Vec<_>>();
			return rounded_polygon_vertices(&corners);
		}
		container.move_to(first.position);
		for window in anchors.windows(3) {
			let [previous, corner, next] = window else { continue };
			push_corner(&mut container, previous.position, corner.position, next.position, corner.radius, corner.corner, false);
		}
		if let Some(last) = anchors.last().filter(|_| anchors.len() > 1) {
			container.line_to(last.position);
		}
		if closed {
			container.close();
		}
		return container;
	}

	container.move_to(first.position);
	let segment = |container: &mut VertexContainer, from: &PathAnchor, to: &PathAnchor| match (from.handle_out, to.handle_in) {
		(None, None) => container.line_to(to.position),
		(handle_out, handle_in) => container.cubic_to(to.position, handle_out.unwrap_or(from.position), handle_in.unwrap_or(to.position)),
	};
	for pair in anchors.windows(2) {
		segment(&mut container, &pair[0], &pair[1]);
	}
	if closed {
		if let Some(last) = anchors.last() {
			segment(&mut container, last, first);
		}
		container.close();
	}
	container
}

/// Element geometry, bounding boxes, hit testing and painting.
///
/// Geometry and paint bounding boxes are given in the coordinate space of the element's parent: the element's own transform is applied.
impl Scene {
	pub fn page_rect(&self, page: NodeId) -> Rect {
		Rect::new(self.number(page, "x"), self.number(page, "y"), self.number(page, "width"), self.number(page, "height"))
	}

	/// The schema value of a property when the node does not carry it.
	pub fn property_or_default(&self, id: NodeId, name: &str) -> Option<PropertyValue> {
		let kind = self.kind(id)?;
		self.property(id, name).cloned().or_else(|| crate::properties::property_def(kind, name).map(|def| def.default.value()))
	}

	/// The transform of an element's own content, identity for kinds without one.
	pub fn element_transform(&self, id: NodeId) -> Transform {
		self.transform(id, "transform")
	}

	/// Maps the parent space of `id` to scene coordinates.
	pub fn parent_to_scene(&self, id: NodeId) -> Transform {
		self.ancestors(id).fold(Transform::IDENTITY, |transform, ancestor| transform.compose(&self.element_transform(ancestor)))
	}

	/// Maps the local space of `id`, including its own transform, to scene coordinates.
	pub fn world_transform(&self, id: NodeId) -> Transform {
		self.element_transform(id).compose(&self.parent_to_scene(id))
	}

	/// Shape vertices without the element transform.
	pub fn local_shape_vertices(&self, id: NodeId) -> Option<VertexContainer> {
		let vertices = match self.kind(id)? {
			NodeKind::Rectangle => {
				let rect = Rect::new(self.number(id, "x"), self.number(id, "y"), self.number(id, "width"), self.number(id, "height"));
				rectangle_vertices(&rect, self.number(id, "radius"))
			}
			NodeKind::Ellipse => ellipse_vertices(DVec2::new(self.number(id, "cx"), self.number(id, "cy")), DVec2::new(self.number(id, "rx"), self.number(id, "ry"))),
			NodeKind::Path => {
				let anchors = self.property(id, "anchors").and_then(PropertyValue::as_anchors).unwrap_or_default();
				path_vertices(anchors, self.boolean(id, "closed"))
			}
			_ => return None,
		};
		Some(vertices)
	}

	/// Shape vertices in the parent space of the shape.
	pub fn shape_vertices(&self, id: NodeId) -> Option<VertexContainer> {
		let vertices = self.local_shape_vertices(id)?;
		let transform = self.element_transform(id);
		if transform.is_identity() {
			return Some(vertices);
		}
		Some(VertexContainer::from_source(&mut VertexTransformer::new(vertices, transform)))
	}

	pub fn geometry_bbox(&self, id: NodeId) -> Option<Rect> {
		let node = self.node(id)?;
		if let Some(cached) = node.geometry_bbox.get() {
			return cached;
		}
		let bbox = self.compute_geometry_bbox(node);
		node.geometry_bbox.set(Some(bbox));
		bbox
	}

	pub fn paint_bbox(&self, id: NodeId) -> Option<Rect> {
		let node = self.node(id)?;
		if let Some(cached) = node.paint_bbox.get() {
			return cached;
		}
		let bbox = self.compute_paint_bbox(node);
		node.paint_bbox.set(Some(bbox));
		bbox
	}

	fn visible_children(&self, node: &Node) -> impl Iterator<Item = NodeId> {
		node.children.iter().copied().filter(|&child| self.node(child).is_some_and(|child| child.kind.is_element() && !child.has_flag(NodeFlags::HIDDEN)))
	}

	pub(crate) fn compute_geometry_bbox(&self, node: &Node) -> Option<Rect> {
		match node.kind {
			NodeKind::Scene | NodeKind::Layer => self.visible_children(node).filter_map(|child| self.geometry_bbox(child)).reduce(|a, b| a.united(&b)),
			NodeKind::Page => Some(self.page_rect(node.id)),
			NodeKind::Group => {
				let bbox = self.visible_children(node).filter_map(|child| self.geometry_bbox(child)).reduce(|a, b| a.united(&b))?;
				Some(self.element_transform(node.id).map_rect(&bbox))
			}
			NodeKind::Path | NodeKind::Rectangle | NodeKind::Ellipse => self.shape_vertices(node.id).and_then(|mut vertices| vertex_bounds(&mut vertices)),
			_ => None,
		}
	}

	pub(crate) fn compute_paint_bbox(&self, node: &Node) -> Option<Rect> {
		if node.has_flag(NodeFlags::HIDDEN) {
			return None;
		}
		let children = || self.visible_children(node).filter_map(|child| self.paint_bbox(child)).reduce(|a, b| a.united(&b));
		match node.kind {
			NodeKind::Scene | NodeKind::Layer => children(),
			NodeKind::Page => Rect::union_of(Some(self.page_rect(node.id)), children()),
			NodeKind::Group => {
				let bbox = self.element_transform(node.id).map_rect(&children()?);
				Some(self.pad_for_style(node.id, bbox))
			}
			NodeKind::Path | NodeKind::Rectangle | NodeKind::Ellipse => self.geometry_bbox(node.id).map(|bbox| self.pad_for_style(node.id, bbox)),
			_ => None,
		}
	}

	fn visible_attributes(&self, id: NodeId) -> impl Iterator<Item = (NodeId, NodeKind)> {
		self.attribute_nodes(id).iter().filter_map(|&attribute| {
			let node = self.node(attribute)?;
			(!node.has_flag(NodeFlags::HIDDEN)).then_some((attribute, node.kind))
		})
	}

	/// Grows `bbox` by what the style attributes of `id` paint outside of the geometry, in render order.
	fn pad_for_style(&self, id: NodeId, bbox: Rect) -> Rect {
		// Offsets only ever produce closed rings.
		let mut closed = self.local_shape_vertices(id).is_none_or(|vertices| vertices.is_closed());
		self.visible_attributes(id).fold(bbox, |bbox, (attribute, kind)| match kind {
			NodeKind::Stroke => {
				let width = self.number(attribute, "width");
				match StrokeAlignment::for_outline(self.text(attribute, "alignment"), closed) {
					StrokeAlignment::Center => bbox.expanded_uniform(width / 2.),
					StrokeAlignment::Outside => bbox.expanded_uniform(width),
					StrokeAlignment::Inside => bbox,
				}
			}
			NodeKind::Offset => {
				let radius = self.number(attribute, "radius");
				let (inset, outset) = offset_sides(self.text(attribute, "side"));
				if radius > 0. && (inset || outset) {
					closed = true;
				}
				if outset { bbox.expanded_uniform(radius) } else { bbox }
			}
			NodeKind::Blur => bbox.expanded_uniform(self.number(attribute, "radius")),
			NodeKind::Shadow => {
				let offset = DVec2::new(self.number(attribute, "x"), self.number(attribute, "y"));
				bbox.united(&bbox.translated(offset).expanded_uniform(self.number(attribute, "blur")))
			}
			_ => bbox,
		})
	}

	pub fn scene_geometry_bbox(&self, id: NodeId) -> Option<Rect> {
		self.geometry_bbox(id).map(|bbox| self.parent_to_scene(id).map_rect(&bbox))
	}

	pub fn scene_paint_bbox(&self, id: NodeId) -> Option<Rect> {
		self.paint_bbox(id).map(|bbox| self.parent_to_scene(id).map_rect(&bbox))
	}

	/// Visible, unlocked shapes below `position` (scene coordinates), topmost first.
	pub fn hit_test(&self, position: DVec2, tolerance: f64) -> Vec<ElementHit> {
		let mut hits = Vec::new();
		self.hit_test_node(self.root(), position, tolerance, &mut hits);
		hits
	}

	fn hit_test_node(&self, id: NodeId, position: DVec2, tolerance: f64, hits: &mut Vec<ElementHit>) {
		let Some(node) = self.node(id) else { return };
		if node.has_flag(NodeFlags::HIDDEN) || node.has_flag(NodeFlags::LOCKED) || !node.kind.is_element() {
			return;
		}
		match node.kind {
			NodeKind::Scene | NodeKind::Page | NodeKind::Layer => {
				for &child in node.children.iter().rev() {
					self.hit_test_node(child, position, tolerance, hits);
				}
			}
			NodeKind::Group => {
				let transform = self.element_transform(id);
				let inverse = match transform.checked_inverse() {
					Ok(inverse) => inverse,
					Err(error) => {
						log::warn!("Skipping group {id} in hit test: {error}");
						return;
					}
				};
				let local = inverse.map_point(position);
				let tolerance = tolerance / transform.scale_factor();
				for &child in node.children.iter().rev() {
					self.hit_test_node(child, local, tolerance, hits);
				}
			}
			_ => {
				if !self.paint_bbox(id).is_some_and(|bbox| bbox.expanded_uniform(tolerance).contains_point(position)) {
					return;
				}
				let Some(mut vertices) = self.shape_vertices(id) else { return };
				let mut options = HitTestOptions {
					tolerance,
					fill: false,
					outline_width: 0.,
				};
				for (attribute, kind) in self.visible_attributes(id) {
					match kind {
						NodeKind::Fill => options.fill = true,
						NodeKind::Stroke => options.outline_width = options.outline_width.max(self.number(attribute, "width")),
						_ => {}
					}
				}
				if let Some(hit) = hit_test(&mut vertices, position, options) {
					hits.push(ElementHit { element: id, hit });
				}
			}
		}
	}

	/// Top level items of the active page whose scene geometry lies in `area`, or touches it when `contained` is false.
	pub fn items_in_area(&self, area: Rect, contained: bool) -> Vec<NodeId> {
		let Some(page) = self.active_page() else { return Vec::new() };
		self.descendants(page)
			.into_iter()
			.filter(|&id| self.top_level_item(id) == Some(id))
			.filter(|&id| !self.has_inherited_flag(id, NodeFlags::HIDDEN) && !self.has_inherited_flag(id, NodeFlags::LOCKED))
			.filter(|&id| {
				self.scene_geometry_bbox(id)
					.is_some_and(|bbox| if contained { area.contains_rect(&bbox) } else { area.intersects(&bbox) })
			})
			.collect()
	}

	/// Paints the whole scene. The context transform must map scene coordinates to device space.
	pub fn paint(&self, context: &mut PaintContext) {
		self.paint_node(self.root(), context);
	}

	/// Paints `id`, given a context whose transform maps the parent space of `id` to device space.
	pub fn paint_node(&self, id: NodeId, context: &mut PaintContext) {
		let Some(node) = self.node(id) else { return };
		if node.has_flag(NodeFlags::HIDDEN) || !node.kind.is_element() || !context.is_paintable(self.paint_bbox(id)) {
			return;
		}
		match node.kind {
			NodeKind::Scene => self.paint_children(node, context),
			NodeKind::Page => {
				let mut vertices = rectangle_vertices(&self.page_rect(id), 0.);
				if context.is_outline() {
					let color = context.outline_color();
					context.stroke_hairline(&mut vertices, color);
				} else {
					context.fill_vertices(&mut vertices, self.color(id, "color"));
				}
				self.paint_children(node, context);
			}
			NodeKind::Layer => {
				if self.boolean(id, "outline") {
					context.with_outline_color(self.color(id, "color"), |context| self.paint_children(node, context));
				} else {
					self.paint_children(node, context);
				}
			}
			NodeKind::Group => {
				let effects = self.layer_effects(id, context);
				context.with_layers(&effects, |context| context.with_transform(self.element_transform(id), |context| self.paint_children(node, context)));
			}
			_ => self.paint_shape(id, context),
		}
	}

	fn paint_children(&self, node: &Node, context: &mut PaintContext) {
		for &child in &node.children {
			self.paint_node(child, context);
		}
	}

	fn layer_effects(&self, id: NodeId, context: &PaintContext) -> Vec<LayerEffect> {
		if context.is_outline() || context.is_fast() {
			return Vec::new();
		}
		self.visible_attributes(id)
			.filter_map(|(attribute, kind)| match kind {
				NodeKind::Blur => Some(LayerEffect::Blur { radius: self.number(attribute, "radius") }),
				NodeKind::Shadow => Some(LayerEffect::Shadow {
					offset: DVec2::new(self.number(attribute, "x"), self.number(attribute, "y")),
					blur: self.number(attribute, "blur"),
					color: self.color(attribute, "color"),
				}),
				_ => None,
			})
			.collect()
	}

	/// Paints the base geometry through the style attributes in order. Offsets replace the geometry seen by later attributes.
	fn paint_shape(&self, id: NodeId, context: &mut PaintContext) {
		let Some(mut geometry) = self.shape_vertices(id) else { return };
		if context.is_outline() {
			let color = context.outline_color();
			context.stroke_hairline(&mut geometry, color);
			return;
		}

		let effects = self.layer_effects(id, context);
		context.with_layers(&effects, |context| {
			for (attribute, kind) in self.visible_attributes(id) {
				match kind {
					NodeKind::Fill => {
						let color = self.color(attribute, "color").with_opacity(self.number(attribute, "opacity"));
						context.fill_vertices(&mut geometry, color);
					}
					NodeKind::Stroke => {
						let width = self.number(attribute, "width");
						let color = self.color(attribute, "color").with_opacity(self.number(attribute, "opacity"));
						let (inset, outset) = match StrokeAlignment::for_outline(self.text(attribute, "alignment"), geometry.is_closed()) {
							StrokeAlignment::Center => (false, false),
							StrokeAlignment::Inside => (true, false),
							StrokeAlignment::Outside => (false, true),
						};
						if inset || outset {
							let mut shifted = VertexOffsetter::new(&mut geometry, width / 2., inset, outset);
							context.stroke_vertices(&mut shifted, width, color);
						} else {
							context.stroke_vertices(&mut geometry, width, color);
						}
					}
					NodeKind::Offset => {
						let (inset, outset) = offset_sides(self.text(attribute, "side"));
						let mut offsetter = VertexOffsetter::new(geometry, self.number(attribute, "radius"), inset, outset);
						geometry = VertexContainer::from_source(&mut offsetter);
					}
					_ => {}
				}
			}
		});
	}

	/// Draws the outline of `id` with a hairline in `color`, as used for selection and highlight annotations.
	pub fn paint_outline(&self, id: NodeId, color: Color, context: &mut PaintContext) {
		let transform = self.parent_to_scene(id);
		context.with_transform(transform, |context| match self.kind(id) {
			Some(NodeKind::Group) => {
				if let Some(bbox) = self.geometry_bbox(id) {
					context.stroke_hairline(&mut rectangle_vertices(&bbox, 0.), color);
				}
			}
			Some(kind) if kind.is_shape() => {
				if let Some(mut vertices) = self.shape_vertices(id) {
					context.stroke_hairline(&mut vertices, color);
				}
			}
			_ => {}
		});
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::paint::{DirtyList, DrawCommand, PaintConfiguration, PaintMode, RecordingCanvas};
	use crate::tree::NodeTree;

	use pretty_assertions::assert_eq;
	use std::f64::consts::FRAC_PI_2;

	const EPSILON: f64 = 1e-6;

	fn assert_rect_eq(actual: Option<Rect>, expected: Rect) {
		let actual = actual.unwrap_or_else(|| panic!("expected {expected:?}, got nothing"));
		assert!(actual.min.abs_diff_eq(expected.min, EPSILON) && actual.max.abs_diff_eq(expected.max, EPSILON), "{actual:?} != {expected:?}");
	}

	fn scene() -> (Scene, NodeId) {
		let scene = Scene::with_page(800., 600.).unwrap();
		let layer = scene.active_layer().unwrap();
		(scene, layer)
	}

	fn filled_rectangle(x: f64, y: f64, width: f64, height: f64) -> NodeTree {
		NodeTree::rectangle(x, y, width, height).unwrap().with_attribute(NodeTree::fill(Color::BLACK).unwrap())
	}

	/// Recomputes every bounding box below `id` without looking at the caches.
	fn uncached_paint_bbox(scene: &Scene, id: NodeId) -> Option<Rect> {
		for child in scene.descendants(id) {
			if let Some(node) = scene.node(child) {
				node.invalidate_geometry();
			}
		}
		scene.node(id).and_then(|node| {
			node.invalidate_geometry();
			scene.compute_paint_bbox(node)
		})
	}

	#[test]
	fn path_vertices_follow_anchors() {
		let anchors = [PathAnchor::new(DVec2::ZERO), PathAnchor::new(DVec2::new(10., 0.)), PathAnchor::new(DVec2::new(10., 10.))];
		let open = path_vertices(&anchors, false);
		assert_eq!(open.len(), 3);
		let closed = path_vertices(&anchors, true);
		assert_eq!(closed.len(), 4);

		let curved = [PathAnchor::new(DVec2::ZERO).with_handles(None, Some(DVec2::new(0., 10.))), PathAnchor::new(DVec2::new(10., 0.))];
		let mut curved = path_vertices(&curved, false);
		let bounds = vertex_bounds(&mut curved).unwrap();
		assert!(bounds.max.y > 0.);
		assert!(path_vertices(&[], true).is_empty());
	}

	#[test]
	fn geometry_bbox_applies_transforms() {
		let (mut scene, layer) = scene();
		let rectangle = scene
			.append_child(layer, NodeTree::rectangle(0., 0., 20., 10.).unwrap().with_transform(Transform::from_angle(FRAC_PI_2)).unwrap())
			.unwrap();
		assert_rect_eq(scene.geometry_bbox(rectangle), Rect::new(-10., 0., 10., 20.));

		let group = scene
			.append_child(
				layer,
				NodeTree::group(vec![NodeTree::rectangle(0., 0., 10., 10.).unwrap()])
					.with_transform(Transform::from_translation(DVec2::new(100., 50.)))
					.unwrap(),
			)
			.unwrap();
		assert_rect_eq(scene.geometry_bbox(group), Rect::new(100., 50., 10., 10.));
		let child = scene.first_child(group).unwrap();
		assert_rect_eq(scene.scene_geometry_bbox(child), Rect::new(100., 50., 10., 10.));
		assert_eq!(scene.world_transform(child), Transform::from_translation(DVec2::new(100., 50.)));
		assert_rect_eq(scene.geometry_bbox(layer), Rect::new(-10., 0., 120., 60.));
	}

	#[test]
	fn paint_bbox_includes_style_attributes() {
		let (mut scene, layer) = scene();
		let tree = NodeTree::rectangle(0., 0., 10., 10.)
			.unwrap()
			.with_attribute(NodeTree::stroke(Color::BLACK, 4.).unwrap())
			.with_attribute(NodeTree::new(NodeKind::Blur).with("radius", 3.).unwrap());
		let rectangle = scene.append_child(layer, tree).unwrap();
		assert_rect_eq(scene.paint_bbox(rectangle), Rect::new(-5., -5., 20., 20.));

		let stroke = scene.attribute_nodes(rectangle)[0];
		scene.set_property(stroke, "alignment", "inside").unwrap();
		assert_rect_eq(scene.paint_bbox(rectangle), Rect::new(-3., -3., 16., 16.));

		let shadow = scene.append_child(scene.attributes_of(rectangle).unwrap(), NodeTree::new(NodeKind::Shadow)).unwrap();
		scene.set_properties(shadow, &["x", "y", "blur"], vec![20.0.into(), 0.0.into(), 0.0.into()]).unwrap();
		assert_rect_eq(scene.paint_bbox(rectangle), Rect::new(-3., -3., 36., 16.));
		assert_rect_eq(scene.geometry_bbox(rectangle), Rect::new(0., 0., 10., 10.));
	}

	#[test]
	fn cached_bboxes_match_recomputation() {
		let (mut scene, layer) = scene();
		let group = scene.append_child(layer, NodeTree::group(vec![filled_rectangle(0., 0., 10., 10.)])).unwrap();
		let rectangle = scene.first_child(group).unwrap();
		let other = scene.append_child(layer, NodeTree::ellipse(DVec2::new(50., 50.), DVec2::new(5., 5.)).unwrap()).unwrap();
		let root = scene.root();
		let page = scene.active_page().unwrap();
		scene.set_property(page, "width", 10.).unwrap();
		scene.set_property(page, "height", 10.).unwrap();

		let initial = scene.paint_bbox(root);
		assert_eq!(initial, uncached_paint_bbox(&scene, root));

		scene.set_property(rectangle, "width", 200.).unwrap();
		assert_rect_eq(scene.paint_bbox(root), Rect::new(0., 0., 200., 55.));
		scene.set_property(group, "transform", Transform::from_translation(DVec2::new(-5., 0.))).unwrap();
		let cached = scene.paint_bbox(root);
		assert_eq!(cached, uncached_paint_bbox(&scene, root));

		scene.set_flag(other, NodeFlags::HIDDEN, true).unwrap();
		assert_rect_eq(scene.paint_bbox(layer), Rect::new(-5., 0., 200., 10.));
		assert_eq!(scene.paint_bbox(other), None);
		scene.remove_child(layer, group).unwrap();
		assert_eq!(scene.paint_bbox(layer), None);
		assert_eq!(scene.paint_bbox(root), uncached_paint_bbox(&scene, root));
	}

	#[test]
	fn hit_test_orders_topmost_first_and_skips_locked() {
		let (mut scene, layer) = scene();
		let bottom = scene.append_child(layer, filled_rectangle(0., 0., 100., 100.)).unwrap();
		let top = scene.append_child(layer, filled_rectangle(50., 50., 100., 100.)).unwrap();
		let outline_only = scene.append_child(layer, NodeTree::rectangle(60., 60., 10., 10.).unwrap()).unwrap();

		let hits = scene.hit_test(DVec2::new(75., 75.), 1.);
		assert_eq!(hits.iter().map(|hit| hit.element).collect::<Vec<_>>(), vec![top, bottom]);

		let hits = scene.hit_test(DVec2::new(70.5, 65.), 1.);
		assert_eq!(hits[0].element, outline_only);

		scene.set_flag(top, NodeFlags::LOCKED, true).unwrap();
		scene.set_flag(outline_only, NodeFlags::HIDDEN, true).unwrap();
		let hits = scene.hit_test(DVec2::new(75., 75.), 1.);
		assert_eq!(hits.iter().map(|hit| hit.element).collect::<Vec<_>>(), vec![bottom]);
		assert!(scene.hit_test(DVec2::new(400., 400.), 1.).is_empty());
	}

	#[test]
	fn hit_test_inside_transformed_groups() {
		let (mut scene, layer) = scene();
		let group = NodeTree::group(vec![filled_rectangle(0., 0., 10., 10.)]).with_transform(Transform::from_scale(DVec2::splat(10.))).unwrap();
		let group = scene.append_child(layer, group).unwrap();
		let rectangle = scene.first_child(group).unwrap();
		let hits = scene.hit_test(DVec2::new(50., 50.), 1.);
		assert_eq!(hits.len(), 1);
		assert_eq!(hits[0].element, rectangle);
		assert_eq!(scene.top_level_item(rectangle), Some(group));

		scene.set_property(group, "transform", Transform::from_scale(DVec2::ZERO)).unwrap();
		assert!(scene.hit_test(DVec2::new(0., 0.), 1.).is_empty());
	}

	#[test]
	fn items_in_area() {
		let (mut scene, layer) = scene();
		let inside = scene.append_child(layer, filled_rectangle(10., 10., 10., 10.)).unwrap();
		let crossing = scene.append_child(layer, filled_rectangle(90., 10., 20., 10.)).unwrap();
		let area = Rect::new(0., 0., 100., 100.);
		assert_eq!(scene.items_in_area(area, true), vec![inside]);
		assert_eq!(scene.items_in_area(area, false), vec![inside, crossing]);
	}

	#[test]
	fn paint_emits_style_in_order() {
		let (mut scene, layer) = scene();
		let tree = filled_rectangle(0., 0., 10., 10.)
			.with_attribute(NodeTree::new(NodeKind::Offset).with("radius", 2.).unwrap())
			.with_attribute(NodeTree::stroke(Color::WHITE, 1.).unwrap());
		scene.append_child(layer, tree).unwrap();

		let mut canvas = RecordingCanvas::new();
		let configuration = PaintConfiguration::default();
		scene.paint(&mut PaintContext::new(&mut canvas, &configuration, Transform::IDENTITY));

		let fills = canvas.fills().collect::<Vec<_>>();
		assert_eq!(fills.len(), 2, "page and rectangle");
		let (stroked, width, color) = canvas.strokes().next().unwrap();
		assert!((width - 1.).abs() < EPSILON);
		assert_eq!(color, Color::WHITE);
		let mut stroked = stroked.clone();
		assert_rect_eq(vertex_bounds(&mut stroked), Rect::new(-2., -2., 14., 14.));
	}

	fn painted_stroke(scene: &Scene) -> Rect {
		let mut canvas = RecordingCanvas::new();
		let configuration = PaintConfiguration::default();
		scene.paint(&mut PaintContext::new(&mut canvas, &configuration, Transform::IDENTITY));
		let (stroked, _, _) = canvas.strokes().next().expect("one stroke");
		let mut stroked = stroked.clone();
		assert!(!stroked.is_empty());
		vertex_bounds(&mut stroked).expect("stroked vertices have bounds")
	}

	#[test]
	fn aligned_strokes_follow_closed_outlines() {
		let (mut scene, layer) = scene();
		let rectangle = scene.append_child(layer, NodeTree::rectangle(0., 0., 10., 10.).unwrap().with_attribute(NodeTree::stroke(Color::BLACK, 2.).unwrap())).unwrap();
		let stroke = scene.attribute_nodes(rectangle)[0];

		assert_rect_eq(Some(painted_stroke(&scene)), Rect::new(0., 0., 10., 10.));
		scene.set_property(stroke, "alignment", "inside").unwrap();
		assert_rect_eq(Some(painted_stroke(&scene)), Rect::new(1., 1., 8., 8.));
		assert_rect_eq(scene.paint_bbox(rectangle), Rect::new(0., 0., 10., 10.));
		scene.set_property(stroke, "alignment", "outside").unwrap();
		assert_rect_eq(Some(painted_stroke(&scene)), Rect::new(-1., -1., 12., 12.));
		assert_rect_eq(scene.paint_bbox(rectangle), Rect::new(-2., -2., 14., 14.));
	}

	#[test]
	fn open_paths_are_stroked_centered() {
		let (mut scene, layer) = scene();
		let anchors = vec![PathAnchor::new(DVec2::new(10., 10.)), PathAnchor::new(DVec2::new(100., 10.))];
		let path = scene.append_child(layer, NodeTree::path(anchors, false).unwrap().with_attribute(NodeTree::stroke(Color::BLACK, 4.).unwrap())).unwrap();
		let stroke = scene.attribute_nodes(path)[0];

		for alignment in ["center", "inside", "outside"] {
			scene.set_property(stroke, "alignment", alignment).unwrap();
			assert_rect_eq(Some(painted_stroke(&scene)), Rect::new(10., 10., 90., 0.));
			assert_rect_eq(scene.paint_bbox(path), Rect::new(8., 8., 94., 4.));
		}
	}

	#[test]
	fn paint_skips_clean_and_hidden_branches() {
		let (mut scene, layer) = scene();
		scene.append_child(layer, filled_rectangle(10., 10., 10., 10.)).unwrap();
		let far = scene.append_child(layer, filled_rectangle(500., 500., 10., 10.)).unwrap();
		let hidden = scene.append_child(layer, filled_rectangle(12., 12., 2., 2.)).unwrap();
		scene.set_flag(hidden, NodeFlags::HIDDEN, true).unwrap();

		let mut dirty = DirtyList::new();
		dirty.dirty(Rect::new(0., 0., 50., 50.));
		let matcher = dirty.flush();
		let mut canvas = RecordingCanvas::new();
		let configuration = PaintConfiguration::default();
		scene.paint(&mut PaintContext::new(&mut canvas, &configuration, Transform::IDENTITY).with_dirty_matcher(matcher.as_ref()));
		assert_eq!(canvas.fills().count(), 2, "page and the rectangle inside the dirty area");

		scene.set_properties(far, &["x", "y"], vec![20.0.into(), 20.0.into()]).unwrap();
		canvas.clear();
		scene.paint(&mut PaintContext::new(&mut canvas, &configuration, Transform::IDENTITY).with_dirty_matcher(matcher.as_ref()));
		assert_eq!(canvas.fills().count(), 3);
	}

	#[test]
	fn outline_mode_uses_layer_outline_color() {
		let (mut scene, layer) = scene();
		scene.set_property(layer, "outline", true).unwrap();
		scene.set_property(layer, "color", Color::GUIDE).unwrap();
		scene.append_child(layer, filled_rectangle(10., 10., 10., 10.).with_attribute(NodeTree::new(NodeKind::Blur))).unwrap();

		let mut canvas = RecordingCanvas::new();
		let configuration = PaintConfiguration {
			paint_mode: PaintMode::Outline,
			..Default::default()
		};
		scene.paint(&mut PaintContext::new(&mut canvas, &configuration, Transform::IDENTITY));
		assert_eq!(canvas.fills().count(), 0);
		let colors = canvas.strokes().map(|(_, _, color)| color).collect::<Vec<_>>();
		assert_eq!(colors, vec![Color::BLACK, Color::GUIDE]);
		assert!(!canvas.commands.iter().any(|command| matches!(command, DrawCommand::BeginLayer(_))));
	}

	#[test]
	fn effects_wrap_the_shape() {
		let (mut scene, layer) = scene();
		scene.append_child(layer, filled_rectangle(10., 10., 10., 10.).with_attribute(NodeTree::new(NodeKind::Blur))).unwrap();
		let mut canvas = RecordingCanvas::new();
		let configuration = PaintConfiguration::default();
		scene.paint(&mut PaintContext::new(&mut canvas, &configuration, Transform::IDENTITY));
		let tail = &canvas.commands[canvas.commands.len() - 3..];
		assert!(matches!(tail[0], DrawCommand::BeginLayer(LayerEffect::Blur { .. })));
		assert!(matches!(tail[1], DrawCommand::Fill { .. }));
		assert_eq!(tail[2], DrawCommand::EndLayer);
	}

	#[test]
	fn property_defaults_come_from_the_schema() {
		let (scene, layer) = scene();
		assert_eq!(scene.property_or_default(layer, "outline"), Some(PropertyValue::Bool(false)));
		assert_eq!(scene.property_or_default(layer, "bogus"), None);
	}
}
