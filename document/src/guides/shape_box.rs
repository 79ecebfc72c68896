use super::{AxisMapping, Guide, GuideMapping, GuideVisual, MapContext};
use crate::consts::GUIDE_MARGIN;
use crate::node::{NodeFlags, NodeId};
use crate::scene::Scene;

use glam::DVec2;
use vertex_rs::Rect;

/// Snaps to the corners and centers of the top level items on the active page.
#[derive(Debug, Clone, Default)]
pub struct ShapeBoxGuide {
	exclusions: Vec<NodeId>,
}

/// Extent of a guide line covering the box from `min` to `max`, reaching out to `position` when it lies outside.
fn span(position: f64, min: f64, max: f64, margin: f64) -> (f64, f64) {
	if position <= min {
		(position - margin, max + margin)
	} else if position < max {
		(min - margin, max + margin)
	} else {
		(min - margin, position + margin)
	}
}

/// Keeps the closest candidate. A candidate aligned with the current one extends its line instead.
fn consider(best: &mut Option<AxisMapping>, candidate: AxisMapping, snap: f64) {
	if let Some(current) = best.as_mut() {
		if candidate.delta < current.delta {
			*current = candidate;
		} else if candidate.delta == current.delta && candidate.value == current.value {
			if let (Some(GuideVisual::Line([start, end])), Some(GuideVisual::Line([other_start, other_end]))) = (&mut current.visual, candidate.visual) {
				*start = start.min(other_start);
				*end = end.max(other_end);
			}
		}
	} else if candidate.delta <= snap {
		*best = Some(candidate);
	}
}

impl ShapeBoxGuide {
	fn boxes(&self, scene: &Scene) -> Vec<Rect> {
		let Some(page) = scene.active_page() else { return Vec::new() };
		scene
			.layers(page)
			.into_iter()
			.filter(|&layer| !scene.has_flag(layer, NodeFlags::HIDDEN))
			.flat_map(|layer| scene.children(layer).iter().copied())
			.filter(|&item| !scene.has_flag(item, NodeFlags::HIDDEN) && !self.exclusions.iter().any(|&excluded| excluded == item || scene.is_ancestor_of(excluded, item)))
			.filter_map(|item| scene.scene_geometry_bbox(item))
			.collect()
	}
}

impl Guide for ShapeBoxGuide {
	fn map(&self, context: &MapContext, position: DVec2) -> Option<GuideMapping> {
		let snap = context.snap_distance;
		let margin = if context.use_margin { GUIDE_MARGIN } else { 0. };
		let mut x: Option<AxisMapping> = None;
		let mut y: Option<AxisMapping> = None;

		for bounds in self.boxes(context.scene) {
			for pivot in [bounds.min, bounds.max, bounds.center()] {
				let (top, bottom) = span(position.y, bounds.min.y, bounds.max.y, margin);
				let vertical = [DVec2::new(pivot.x, top), DVec2::new(pivot.x, bottom)];
				consider(&mut x, AxisMapping::new(pivot.x, position.x).with_visual(GuideVisual::Line(vertical)), snap);

				let (left, right) = span(position.x, bounds.min.x, bounds.max.x, margin);
				let horizontal = [DVec2::new(left, pivot.y), DVec2::new(right, pivot.y)];
				consider(&mut y, AxisMapping::new(pivot.y, position.y).with_visual(GuideVisual::Line(horizontal)), snap);
			}
		}

		GuideMapping { x, y }.into_option()
	}

	fn use_exclusions(&mut self, _scene: &Scene, exclusions: &[NodeId]) {
		self.exclusions = exclusions.to_vec();
	}

	fn clean_exclusions(&mut self) {
		self.exclusions.clear();
	}
}
