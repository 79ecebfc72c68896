use super::{AxisMapping, Guide, GuideMapping, MapContext};
use crate::settings::UnitSnap;

use glam::DVec2;

/// Rounds positions to whole or half document units.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitGuide;

impl Guide for UnitGuide {
	fn map(&self, context: &MapContext, position: DVec2) -> Option<GuideMapping> {
		let settings = context.scene.settings();
		let step = match settings.unit_snap {
			UnitSnap::Off => return None,
			UnitSnap::Full => settings.unit.pixels(),
			UnitSnap::Half => settings.unit.pixels() / 2.,
		};
		let axis = |value: f64| AxisMapping::new((value / step).round() * step, value);
		Some(GuideMapping {
			x: Some(axis(position.x)),
			y: Some(axis(position.y)),
		})
	}

	fn is_detail(&self) -> bool {
		true
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::scene::Scene;

	fn mapped(unit: &str, snap: &str, position: DVec2) -> Option<DVec2> {
		let mut scene = Scene::new();
		let root = scene.root();
		scene.set_properties(root, &["unit", "unitSnap"], vec![unit.into(), snap.into()]).unwrap();
		let mapping = UnitGuide.map(&MapContext { scene: &scene, snap_distance: 5., use_margin: false }, position)?;
		Some(DVec2::new(mapping.x?.value, mapping.y?.value))
	}

	#[test]
	fn rounds_to_units() {
		assert_eq!(mapped("px", "off", DVec2::new(1.3, 2.6)), None);
		assert_eq!(mapped("px", "full", DVec2::new(1.3, 2.6)), Some(DVec2::new(1., 3.)));
		assert_eq!(mapped("px", "half", DVec2::new(1.3, 2.6)), Some(DVec2::new(1.5, 2.5)));
		assert_eq!(mapped("in", "full", DVec2::new(100., 150.)), Some(DVec2::new(96., 192.)));
		assert_eq!(mapped("in", "half", DVec2::new(100., 150.)), Some(DVec2::new(96., 144.)));
	}
}
