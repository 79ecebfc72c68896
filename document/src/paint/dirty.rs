use crate::consts::DIRTY_MERGE_EPSILON;

use glam::DVec2;
use vertex_rs::{Rect, Transform};

/// Collects the device areas that need repainting, coalescing them as they come in.
///
/// Two areas are unified when their enclosing rectangle is no larger than both areas plus [`DIRTY_MERGE_EPSILON`].
/// Otherwise the parts of a new area that are already covered by an overlapping one are trimmed away.
#[derive(Debug, Clone, Default)]
pub struct DirtyList {
	area: Option<Rect>,
	dirties: Vec<Rect>,
}

impl DirtyList {
	pub fn new() -> Self {
		Self::default()
	}

	/// Restricts dirty areas to `area`. Anything outside of it is ignored.
	pub fn set_area(&mut self, area: Option<Rect>) {
		self.area = area;
	}

	pub fn area(&self) -> Option<Rect> {
		self.area
	}

	pub fn is_empty(&self) -> bool {
		self.dirties.is_empty()
	}

	/// Adds a dirty area, snapped outwards to whole pixels.
	///
	/// Returns false when the area did not grow the dirty region, either because it was already covered or because it lies outside of the active area.
	pub fn dirty(&mut self, rect: Rect) -> bool {
		let rect = Rect::from_box([rect.min.floor(), rect.max.ceil()]);
		let rect = match self.area {
			Some(area) => match area.intersected(&rect) {
				Some(clipped) => clipped,
				None => return false,
			},
			None => rect,
		};
		if rect.is_empty() {
			return false;
		}
		self.add(rect.min, rect.max)
	}

	fn add(&mut self, mut min: DVec2, mut max: DVec2) -> bool {
		// Lossless combinations first, starting over whenever a rectangle was trimmed
		let mut index = 0;
		while index < self.dirties.len() {
			let current = self.dirties[index];
			let (cmin, cmax) = (current.min, current.max);
			let spans_x = min.x >= cmin.x && max.x <= cmax.x;
			let spans_y = min.y >= cmin.y && max.y <= cmax.y;
			let covers_x = cmin.x >= min.x && cmax.x <= max.x;
			let covers_y = cmin.y >= min.y && cmax.y <= max.y;

			if spans_x && spans_y {
				return false;
			} else if covers_x && covers_y {
				self.dirties.remove(index);
				continue;
			} else if spans_y && min.x >= cmin.x && min.x < cmax.x {
				min.x = cmax.x;
			} else if spans_y && max.x > cmin.x && max.x <= cmax.x {
				max.x = cmin.x;
			} else if spans_x && min.y >= cmin.y && min.y < cmax.y {
				min.y = cmax.y;
			} else if spans_x && max.y > cmin.y && max.y <= cmax.y {
				max.y = cmin.y;
			} else if covers_y && cmin.x >= min.x && cmin.x < max.x {
				self.dirties[index].min.x = max.x;
			} else if covers_y && cmax.x > min.x && cmax.x <= max.x {
				self.dirties[index].max.x = min.x;
			} else if covers_x && cmin.y >= min.y && cmin.y < max.y {
				self.dirties[index].min.y = max.y;
			} else if covers_x && cmax.y > min.y && cmax.y <= max.y {
				self.dirties[index].max.y = min.y;
			} else {
				index += 1;
				continue;
			}
			index = 0;
		}

		// Then the lossy union with a close enough neighbour
		let rect = Rect::from_box([min, max]);
		if !rect.is_empty() {
			let merge = self.dirties.iter().position(|current| {
				let union = current.united(&rect);
				!current.is_empty() && union.area() < rect.area() + current.area() + DIRTY_MERGE_EPSILON
			});
			if let Some(merge) = merge {
				let union = self.dirties.remove(merge).united(&rect);
				return self.add(union.min, union.max);
			}
		}

		self.dirties.push(rect);
		true
	}

	/// Hands out the collected areas as a matcher and empties the list. Returns `None` when nothing is dirty.
	pub fn flush(&mut self) -> Option<DirtyMatcher> {
		let rects: Vec<Rect> = self.dirties.drain(..).filter(|rect| !rect.is_empty()).collect();
		let united_area = rects.iter().copied().reduce(|united, rect| united.united(&rect))?;
		Some(DirtyMatcher { rects, united_area: Some(united_area) })
	}

	pub fn reset(&mut self) {
		self.dirties.clear();
	}
}

/// The consolidated dirty areas of one paint pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DirtyMatcher {
	rects: Vec<Rect>,
	united_area: Option<Rect>,
}

impl DirtyMatcher {
	pub fn is_dirty(&self, test: &Rect) -> bool {
		if self.united_area.is_some_and(|united| !united.intersects(test)) {
			return false;
		}
		self.rects.iter().any(|rect| rect.intersects(test))
	}

	pub fn transform(&mut self, transform: &Transform) {
		self.united_area = self.united_area.map(|united| transform.map_rect(&united));
		for rect in &mut self.rects {
			*rect = transform.map_rect(rect);
		}
	}

	/// Clips all areas to `clip_area`, or makes it the only dirty area when there is none.
	pub fn clip(&mut self, clip_area: Rect) {
		if self.rects.is_empty() {
			self.united_area = Some(clip_area);
			self.rects = vec![clip_area];
			return;
		}
		self.united_area = self.united_area.and_then(|united| clip_area.intersected(&united));
		self.rects = self.rects.iter().filter_map(|rect| clip_area.intersected(rect)).collect();
	}

	pub fn dirty_rectangles(&self) -> &[Rect] {
		&self.rects
	}

	pub fn united_area(&self) -> Option<Rect> {
		self.united_area
	}
}
