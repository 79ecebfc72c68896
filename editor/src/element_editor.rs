use crate::consts::MIN_RESIZE_EXTENT;

use quill_document::paint::PaintContext;
use quill_document::{Color, DocumentError, NodeId, NodeKind, PathAnchor, PropertyValue, Scene};

use glam::DVec2;
use vertex_rs::{Rect, RectSide, Transform};

/// Applies `transform`, given in scene coordinates, on top of the current transform of `id`.
pub fn transform_in_scene(scene: &mut Scene, id: NodeId, transform: &Transform) -> Result<bool, DocumentError> {
	let parent_to_scene = scene.parent_to_scene(id);
	let scene_to_parent = parent_to_scene.checked_inverse()?;
	let updated = scene.element_transform(id).compose(&parent_to_scene).compose(transform).compose(&scene_to_parent);
	scene.set_property(id, "transform", updated)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
	/// Scales the element around the opposite side of its bounding box.
	Resize(RectSide),
	/// Moves the anchor at this index of a path.
	Anchor(usize),
}

/// A draggable handle, positioned in scene coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
	pub kind: HandleKind,
	pub position: DVec2,
}

/// Editing affordances shown for a selected element.
pub trait ElementEditor {
	fn handles(&self, scene: &Scene, element: NodeId) -> Vec<Handle>;

	/// Moves the handle of kind `handle` to `position` (scene coordinates). Returns whether the element changed.
	fn drag_handle(&self, scene: &mut Scene, element: NodeId, handle: HandleKind, position: DVec2) -> Result<bool, DocumentError>;

	/// The topmost handle within `tolerance` (scene units, per axis) of `position`.
	fn hit_test_handle(&self, scene: &Scene, element: NodeId, position: DVec2, tolerance: f64) -> Option<Handle> {
		self.handles(scene, element)
			.into_iter()
			.rev()
			.find(|handle| (handle.position - position).abs().max_element() <= tolerance)
	}

	/// Paints the element outline and its handles as squares of `handle_size` device pixels.
	fn paint(&self, scene: &Scene, element: NodeId, handle_size: f64, color: Color, context: &mut PaintContext) {
		scene.paint_outline(element, color, context);
		let transform = context.transform();
		for handle in self.handles(scene, element) {
			let center = transform.map_point(handle.position).floor() + 0.5;
			let square = Rect::from_points(center - handle_size / 2., center + handle_size / 2.);
			context.canvas().fill_rect(square, color);
			context.canvas().fill_rect(square.expanded_uniform(-1.), Color::WHITE);
		}
	}

	/// Scene area covered by the element and its handles.
	fn bounds(&self, scene: &Scene, element: NodeId) -> Option<Rect> {
		let handles = Rect::bounding(self.handles(scene, element).into_iter().map(|handle| handle.position));
		Rect::union_of(scene.scene_geometry_bbox(element), handles)
	}
}

/// The editor for elements of `kind`, if they can be edited at all.
pub fn element_editor_for(kind: NodeKind) -> Option<Box<dyn ElementEditor>> {
	match kind {
		NodeKind::Path => Some(Box::new(PathEditor)),
		NodeKind::Group | NodeKind::Rectangle | NodeKind::Ellipse => Some(Box::new(BoxEditor)),
		_ => None,
	}
}

/// Eight resize handles on the scene bounding box.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoxEditor;

fn opposite(side: RectSide) -> RectSide {
	match side {
		RectSide::TopLeft => RectSide::BottomRight,
		RectSide::Top => RectSide::Bottom,
		RectSide::TopRight => RectSide::BottomLeft,
		RectSide::Right => RectSide::Left,
		RectSide::BottomRight => RectSide::TopLeft,
		RectSide::Bottom => RectSide::Top,
		RectSide::BottomLeft => RectSide::TopRight,
		RectSide::Left => RectSide::Right,
		RectSide::Center => RectSide::Center,
	}
}

/// Which axes a handle on `side` resizes.
fn resized_axes(side: RectSide) -> (bool, bool) {
	match side {
		RectSide::Top | RectSide::Bottom => (false, true),
		RectSide::Left | RectSide::Right => (true, false),
		RectSide::Center => (false, false),
		_ => (true, true),
	}
}

impl ElementEditor for BoxEditor {
	fn handles(&self, scene: &Scene, element: NodeId) -> Vec<Handle> {
		let Some(bbox) = scene.scene_geometry_bbox(element) else { return Vec::new() };
		RectSide::ALL
			.into_iter()
			.filter(|&side| side != RectSide::Center)
			.map(|side| Handle {
				kind: HandleKind::Resize(side),
				position: bbox.side(side),
			})
			.collect()
	}

	fn drag_handle(&self, scene: &mut Scene, element: NodeId, handle: HandleKind, position: DVec2) -> Result<bool, DocumentError> {
		let HandleKind::Resize(side) = handle else { return Ok(false) };
		let Some(bbox) = scene.scene_geometry_bbox(element) else { return Ok(false) };
		let pivot = bbox.side(opposite(side));
		let extent = bbox.side(side) - pivot;
		let target = position - pivot;

		let axis = |resized: bool, extent: f64, target: f64| {
			if !resized || extent.abs() < MIN_RESIZE_EXTENT || target.abs() < MIN_RESIZE_EXTENT {
				1.
			} else {
				target / extent
			}
		};
		let (resize_x, resize_y) = resized_axes(side);
		let scale = DVec2::new(axis(resize_x, extent.x, target.x), axis(resize_y, extent.y, target.y));
		if scale == DVec2::ONE {
			return Ok(false);
		}

		let transform = Transform::from_translation(-pivot).scaled(scale).translated(pivot);
		transform_in_scene(scene, element, &transform)
	}
}

/// One handle per path anchor.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathEditor;

fn anchors(scene: &Scene, element: NodeId) -> &[PathAnchor] {
	scene.property(element, "anchors").and_then(PropertyValue::as_anchors).unwrap_or_default()
}

impl ElementEditor for PathEditor {
	fn handles(&self, scene: &Scene, element: NodeId) -> Vec<Handle> {
		let transform = scene.world_transform(element);
		anchors(scene, element)
			.iter()
			.enumerate()
			.map(|(index, anchor)| Handle {
				kind: HandleKind::Anchor(index),
				position: transform.map_point(anchor.position),
			})
			.collect()
	}

	fn drag_handle(&self, scene: &mut Scene, element: NodeId, handle: HandleKind, position: DVec2) -> Result<bool, DocumentError> {
		let HandleKind::Anchor(index) = handle else { return Ok(false) };
		let local = scene.world_transform(element).checked_inverse()?.map_point(position);
		let mut anchors = anchors(scene, element).to_vec();
		let Some(anchor) = anchors.get_mut(index) else { return Ok(false) };

		// Handles travel with their anchor
		*anchor = anchor.transformed(&Transform::from_translation(local - anchor.position));
		scene.set_property(element, "anchors", anchors)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use quill_document::paint::{PaintConfiguration, RecordingCanvas};
	use quill_document::NodeTree;

	use pretty_assertions::assert_eq;

	fn scene_with(tree: NodeTree) -> (Scene, NodeId) {
		let mut scene = Scene::with_page(500., 500.).unwrap();
		let layer = scene.active_layer().unwrap();
		let id = scene.append_child(layer, tree).unwrap();
		(scene, id)
	}

	fn assert_rect_eq(actual: Option<Rect>, expected: Rect) {
		let actual = actual.unwrap();
		assert!((actual.min - expected.min).abs().max_element() < 1e-9 && (actual.max - expected.max).abs().max_element() < 1e-9, "{actual:?} != {expected:?}");
	}

	#[test]
	fn box_handles_surround_the_bbox() {
		let (scene, id) = scene_with(NodeTree::rectangle(10., 20., 100., 50.).unwrap());
		let handles = BoxEditor.handles(&scene, id);
		assert_eq!(handles.len(), 8);
		assert_eq!(handles[0], Handle { kind: HandleKind::Resize(RectSide::TopLeft), position: DVec2::new(10., 20.) });
		assert_eq!(handles[4], Handle { kind: HandleKind::Resize(RectSide::BottomRight), position: DVec2::new(110., 70.) });

		let hit = BoxEditor.hit_test_handle(&scene, id, DVec2::new(112., 68.), 3.);
		assert_eq!(hit.map(|handle| handle.kind), Some(HandleKind::Resize(RectSide::BottomRight)));
		assert_eq!(BoxEditor.hit_test_handle(&scene, id, DVec2::new(60., 45.), 3.), None);
	}

	#[test]
	fn resizing_scales_around_the_opposite_side() {
		let (mut scene, id) = scene_with(NodeTree::rectangle(0., 0., 100., 50.).unwrap());
		assert!(BoxEditor.drag_handle(&mut scene, id, HandleKind::Resize(RectSide::BottomRight), DVec2::new(200., 100.)).unwrap());
		assert_rect_eq(scene.scene_geometry_bbox(id), Rect::new(0., 0., 200., 100.));

		assert!(BoxEditor.drag_handle(&mut scene, id, HandleKind::Resize(RectSide::Left), DVec2::new(-200., 70.)).unwrap());
		assert_rect_eq(scene.scene_geometry_bbox(id), Rect::new(-200., 0., 400., 100.));
	}

	#[test]
	fn resizing_never_collapses_an_element() {
		let (mut scene, id) = scene_with(NodeTree::rectangle(0., 0., 100., 50.).unwrap());
		assert!(!BoxEditor.drag_handle(&mut scene, id, HandleKind::Resize(RectSide::Right), DVec2::new(0., 25.)).unwrap());
		assert!(!BoxEditor.drag_handle(&mut scene, id, HandleKind::Anchor(0), DVec2::new(0., 25.)).unwrap());
		assert_rect_eq(scene.scene_geometry_bbox(id), Rect::new(0., 0., 100., 50.));
	}

	#[test]
	fn anchors_move_in_local_space() {
		let anchors = vec![
			PathAnchor::new(DVec2::new(0., 0.)).with_handles(None, Some(DVec2::new(5., 0.))),
			PathAnchor::new(DVec2::new(10., 10.)),
		];
		let tree = NodeTree::path(anchors, false).unwrap().with_transform(Transform::from_translation(DVec2::new(100., 0.))).unwrap();
		let (mut scene, id) = scene_with(tree);

		let handles = PathEditor.handles(&scene, id);
		assert_eq!(handles[1], Handle { kind: HandleKind::Anchor(1), position: DVec2::new(110., 10.) });

		assert!(PathEditor.drag_handle(&mut scene, id, HandleKind::Anchor(0), DVec2::new(100., 20.)).unwrap());
		let moved = scene.property(id, "anchors").and_then(PropertyValue::as_anchors).unwrap()[0];
		assert_eq!(moved.position, DVec2::new(0., 20.));
		assert_eq!(moved.handle_out, Some(DVec2::new(5., 20.)));
		assert!(!PathEditor.drag_handle(&mut scene, id, HandleKind::Anchor(7), DVec2::ZERO).unwrap());
	}

	#[test]
	fn editors_by_kind() {
		assert!(element_editor_for(NodeKind::Rectangle).is_some());
		assert!(element_editor_for(NodeKind::Group).is_some());
		assert!(element_editor_for(NodeKind::Path).is_some());
		assert!(element_editor_for(NodeKind::Layer).is_none());
		assert!(element_editor_for(NodeKind::Fill).is_none());
	}

	#[test]
	fn painting_draws_the_outline_and_every_handle() {
		let (scene, id) = scene_with(NodeTree::rectangle(10., 10., 100., 50.).unwrap());
		let mut canvas = RecordingCanvas::new();
		let configuration = PaintConfiguration::default();
		let mut context = PaintContext::new(&mut canvas, &configuration, Transform::IDENTITY);
		BoxEditor.paint(&scene, id, 8., Color::SELECTION, &mut context);
		assert_eq!(canvas.strokes().count(), 1);
		assert_eq!(canvas.fills().count(), 16);
		assert_rect_eq(BoxEditor.bounds(&scene, id), Rect::new(10., 10., 100., 50.));
	}
}
