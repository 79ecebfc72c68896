use super::{AxisMapping, Guide, GuideMapping, MapContext};
use crate::consts::{GRID_LINE_OPACITY, GRID_MIN_CELL_SPACE};
use crate::paint::PaintContext;
use crate::scene::Scene;
use crate::Color;

use glam::DVec2;
use vertex_rs::Rect;

/// Snaps to the document grid and paints it.
#[derive(Debug, Clone, Copy, Default)]
pub struct GridGuide;

impl GridGuide {
	/// On-screen distance between painted grid lines for the nominal `grid_size` at `scale`.
	///
	/// Cells smaller than [`GRID_MIN_CELL_SPACE`] pixels are multiplied by a whole number so lines never get too dense.
	pub fn effective_cell_size(grid_size: DVec2, scale: f64) -> DVec2 {
		let axis = |size: f64| {
			let size = size * scale;
			if size > 0. && size < GRID_MIN_CELL_SPACE {
				size * (1. + (GRID_MIN_CELL_SPACE / size).floor())
			} else {
				size
			}
		};
		DVec2::new(axis(grid_size.x), axis(grid_size.y))
	}
}

impl Guide for GridGuide {
	fn map(&self, context: &MapContext, position: DVec2) -> Option<GuideMapping> {
		let settings = context.scene.settings();
		if !settings.grid_active {
			return None;
		}
		let size = settings.grid_size;
		let axis = |value: f64, size: f64| (size > 0.).then(|| AxisMapping::new((value / size).round() * size, value));
		GuideMapping {
			x: axis(position.x, size.x),
			y: axis(position.y, size.y),
		}
		.into_option()
	}

	fn is_detail(&self) -> bool {
		true
	}

	fn paint(&self, scene: &Scene, context: &mut PaintContext) {
		let settings = scene.settings();
		if !settings.grid_active || settings.grid_size.min_element() <= 0. {
			return;
		}
		let transform = context.transform();
		let scale = transform.scale_factor();
		if scale <= 0. {
			return;
		}
		let inverse = match transform.checked_inverse() {
			Ok(inverse) => inverse,
			Err(error) => {
				log::warn!("Grid not painted: {error}");
				return;
			}
		};
		let cell = Self::effective_cell_size(settings.grid_size, scale);
		let scene_cell = cell / scale;

		let areas: Vec<Rect> = match (context.dirty_matcher(), context.configuration().clip_area) {
			(Some(matcher), _) => matcher.dirty_rectangles().to_vec(),
			(None, Some(clip)) => vec![clip],
			(None, None) => return,
		};
		let color = Color::BLACK.with_opacity(GRID_LINE_OPACITY as f64);
		for area in areas {
			let scene_area = inverse.map_rect(&area);
			let start = transform.map_point((scene_area.min / scene_cell).ceil() * scene_cell).floor();

			let mut x = start.x;
			while x < area.max.x {
				context.canvas().fill_rect(Rect::new(x.round(), area.min.y, 1., area.height()), color);
				x += cell.x;
			}
			let mut y = start.y;
			while y < area.max.y {
				context.canvas().fill_rect(Rect::new(area.min.x, y.round(), area.width(), 1.), color);
				y += cell.y;
			}
		}
	}
}
