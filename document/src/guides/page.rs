use super::{AxisMapping, Guide, GuideMapping, GuideVisual, MapContext};
use crate::node::{NodeFlags, NodeId, NodeKind};
use crate::scene::Scene;

use glam::DVec2;

/// Snaps to the edges and the center of pages.
#[derive(Debug, Clone, Default)]
pub struct PageGuide {
	exclusions: Vec<NodeId>,
}

impl PageGuide {
	fn candidates(&self, scene: &Scene) -> Vec<NodeId> {
		let pages: Vec<NodeId> = if scene.settings().single_page {
			scene.active_page().into_iter().collect()
		} else {
			scene.pages().into_iter().filter(|&page| !scene.has_flag(page, NodeFlags::HIDDEN)).collect()
		};
		pages.into_iter().filter(|page| !self.exclusions.contains(page)).collect()
	}
}

impl Guide for PageGuide {
	fn map(&self, context: &MapContext, position: DVec2) -> Option<GuideMapping> {
		let scene = context.scene;
		let snap = context.snap_distance;
		let mut x = None;
		let mut y = None;

		for page in self.candidates(scene) {
			if x.is_some() && y.is_some() {
				break;
			}
			let bounds = scene.page_rect(page);
			if bounds.is_empty() {
				continue;
			}
			let center = bounds.center();
			// The first pivot within reach wins, in this order
			for (pivot, is_center) in [(bounds.min, false), (bounds.max, false), (center, true)] {
				if x.is_none() && (position.x - pivot.x).abs() <= snap {
					let mut mapping = AxisMapping::new(pivot.x, position.x);
					if is_center {
						mapping = mapping.with_visual(GuideVisual::Line([DVec2::new(pivot.x, bounds.min.y), DVec2::new(pivot.x, bounds.max.y)]));
					}
					x = Some(mapping);
				}
				if y.is_none() && (position.y - pivot.y).abs() <= snap {
					let mut mapping = AxisMapping::new(pivot.y, position.y);
					if is_center {
						mapping = mapping.with_visual(GuideVisual::Line([DVec2::new(bounds.min.x, pivot.y), DVec2::new(bounds.max.x, pivot.y)]));
					}
					y = Some(mapping);
				}
			}
		}

		GuideMapping { x, y }.into_option()
	}

	fn use_exclusions(&mut self, scene: &Scene, exclusions: &[NodeId]) {
		self.exclusions = exclusions.iter().copied().filter(|&id| scene.kind(id) == Some(NodeKind::Page)).collect();
	}

	fn clean_exclusions(&mut self) {
		self.exclusions.clear();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::tree::NodeTree;

	use pretty_assertions::assert_eq;

	fn map(guide: &PageGuide, scene: &Scene, position: DVec2) -> Option<GuideMapping> {
		guide.map(&MapContext { scene, snap_distance: 5., use_margin: true }, position)
	}

	#[test]
	fn edges_come_before_the_center() {
		let scene = Scene::with_page(10., 10.).unwrap();
		let mapping = map(&PageGuide::default(), &scene, DVec2::new(4., 20.)).unwrap();
		// The center at 5 is closer but the top left edge is within reach and checked first
		assert_eq!(mapping.x, Some(AxisMapping::new(0., 4.)));
		assert_eq!(mapping.y, None);
	}

	#[test]
	fn only_the_center_shows_a_line() {
		let scene = Scene::with_page(100., 60.).unwrap();
		let mapping = map(&PageGuide::default(), &scene, DVec2::new(48., 58.)).unwrap();
		assert_eq!(
			mapping.x,
			Some(AxisMapping::new(50., 48.).with_visual(GuideVisual::Line([DVec2::new(50., 0.), DVec2::new(50., 60.)])))
		);
		assert_eq!(mapping.y, Some(AxisMapping::new(60., 58.)));
		assert_eq!(map(&PageGuide::default(), &scene, DVec2::new(30., 20.)), None);
	}

	#[test]
	fn single_page_mode_uses_the_active_page() {
		let mut scene = Scene::with_page(100., 100.).unwrap();
		let root = scene.root();
		let second = scene.append_child(root, NodeTree::page(200., 0., 100., 100.).unwrap()).unwrap();
		let guide = PageGuide::default();
		assert_eq!(map(&guide, &scene, DVec2::new(202., 50.)).and_then(|mapping| mapping.x).map(|x| x.value), Some(200.));

		scene.set_property(root, "singlePage", true).unwrap();
		assert_eq!(map(&guide, &scene, DVec2::new(202., 50.)).and_then(|mapping| mapping.x), None);
		scene.set_active_page(second).unwrap();
		assert_eq!(map(&guide, &scene, DVec2::new(202., 50.)).and_then(|mapping| mapping.x).map(|x| x.value), Some(200.));
	}

	#[test]
	fn excluded_pages_are_ignored() {
		let scene = Scene::with_page(100., 100.).unwrap();
		let page = scene.active_page().unwrap();
		let layer = scene.active_layer().unwrap();
		let mut guide = PageGuide::default();
		guide.use_exclusions(&scene, &[page, layer]);
		assert_eq!(guide.exclusions, vec![page]);
		assert_eq!(map(&guide, &scene, DVec2::new(1., 1.)), None);
		guide.clean_exclusions();
		assert!(map(&guide, &scene, DVec2::new(1., 1.)).is_some());
	}
}
