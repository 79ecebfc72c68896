use crate::node::NodeKind;
use crate::scene::Scene;

use glam::DVec2;

/// Measurement unit of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Unit {
	#[default]
	Px,
	Pt,
	Mm,
	Cm,
	In,
}

impl Unit {
	pub fn from_tag(tag: &str) -> Option<Unit> {
		match tag {
			"px" => Some(Unit::Px),
			"pt" => Some(Unit::Pt),
			"mm" => Some(Unit::Mm),
			"cm" => Some(Unit::Cm),
			"in" => Some(Unit::In),
			_ => None,
		}
	}

	pub fn tag(self) -> &'static str {
		match self {
			Unit::Px => "px",
			Unit::Pt => "pt",
			Unit::Mm => "mm",
			Unit::Cm => "cm",
			Unit::In => "in",
		}
	}

	/// Scene units (pixels at 96 dpi) per unit.
	pub fn pixels(self) -> f64 {
		match self {
			Unit::Px => 1.,
			Unit::Pt => 96. / 72.,
			Unit::Mm => 96. / 25.4,
			Unit::Cm => 96. / 2.54,
			Unit::In => 96.,
		}
	}
}

/// Rounding applied by the unit guide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitSnap {
	#[default]
	Off,
	Full,
	Half,
}

impl UnitSnap {
	pub fn from_tag(tag: &str) -> Option<UnitSnap> {
		match tag {
			"off" => Some(UnitSnap::Off),
			"full" => Some(UnitSnap::Full),
			"half" => Some(UnitSnap::Half),
			_ => None,
		}
	}

	pub fn tag(self) -> &'static str {
		match self {
			UnitSnap::Off => "off",
			UnitSnap::Full => "full",
			UnitSnap::Half => "half",
		}
	}
}

/// Typed snapshot of the document settings stored as properties on the scene root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneSettings {
	pub unit: Unit,
	pub grid_size: DVec2,
	pub grid_active: bool,
	pub snap_distance: f64,
	pub pick_distance: f64,
	pub single_page: bool,
	pub unit_snap: UnitSnap,
}

impl Scene {
	pub fn settings(&self) -> SceneSettings {
		let root = self.root();
		debug_assert_eq!(self.kind(root), Some(NodeKind::Scene));
		SceneSettings {
			unit: Unit::from_tag(self.text(root, "unit")).unwrap_or_default(),
			grid_size: DVec2::new(self.number(root, "gridSizeX"), self.number(root, "gridSizeY")),
			grid_active: self.boolean(root, "gridActive"),
			snap_distance: self.number(root, "snapDistance"),
			pick_distance: self.number(root, "pickDistance"),
			single_page: self.boolean(root, "singlePage"),
			unit_snap: UnitSnap::from_tag(self.text(root, "unitSnap")).unwrap_or_default(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults() {
		let scene = Scene::new();
		let settings = scene.settings();
		assert_eq!(settings.unit, Unit::Px);
		assert_eq!(settings.grid_size, DVec2::splat(crate::consts::DEFAULT_GRID_SIZE));
		assert!(!settings.grid_active);
		assert_eq!(settings.unit_snap, UnitSnap::Off);
	}

	#[test]
	fn settings_follow_root_properties() {
		let mut scene = Scene::new();
		let root = scene.root();
		scene.set_properties(root, &["unit", "unitSnap", "gridActive"], vec!["mm".into(), "half".into(), true.into()]).unwrap();
		let settings = scene.settings();
		assert_eq!(settings.unit, Unit::Mm);
		assert_eq!(settings.unit_snap, UnitSnap::Half);
		assert!(settings.grid_active);
		assert!((Unit::In.pixels() - 96.).abs() < 1e-12);
	}
}
