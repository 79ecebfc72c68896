use glam::DVec2;
use serde::{Deserialize, Serialize};

/// One of the nine pivot positions of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RectSide {
	TopLeft,
	Top,
	TopRight,
	Right,
	BottomRight,
	Bottom,
	BottomLeft,
	Left,
	Center,
}

impl RectSide {
	pub const ALL: [RectSide; 9] = [
		RectSide::TopLeft,
		RectSide::Top,
		RectSide::TopRight,
		RectSide::Right,
		RectSide::BottomRight,
		RectSide::Bottom,
		RectSide::BottomLeft,
		RectSide::Left,
		RectSide::Center,
	];
}

/// An axis-aligned rectangle stored as its minimum and maximum corners.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
	pub min: DVec2,
	pub max: DVec2,
}

impl Rect {
	pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
		Self::from_points(DVec2::new(x, y), DVec2::new(x + width, y + height))
	}

	/// Builds the smallest rectangle containing both points, in any order.
	pub fn from_points(a: DVec2, b: DVec2) -> Self {
		Self { min: a.min(b), max: a.max(b) }
	}

	/// Converts the `[min, max]` pair representation used by bounding box helpers.
	pub fn from_box(bounds: [DVec2; 2]) -> Self {
		Self::from_points(bounds[0], bounds[1])
	}

	pub fn to_box(self) -> [DVec2; 2] {
		[self.min, self.max]
	}

	/// Smallest rectangle containing every point, `None` when the iterator is empty.
	pub fn bounding(points: impl IntoIterator<Item = DVec2>) -> Option<Self> {
		points.into_iter().fold(None, |bounds: Option<Rect>, point| match bounds {
			Some(bounds) => Some(Rect {
				min: bounds.min.min(point),
				max: bounds.max.max(point),
			}),
			None => Some(Rect { min: point, max: point }),
		})
	}

	pub fn x(&self) -> f64 {
		self.min.x
	}

	pub fn y(&self) -> f64 {
		self.min.y
	}

	pub fn width(&self) -> f64 {
		self.max.x - self.min.x
	}

	pub fn height(&self) -> f64 {
		self.max.y - self.min.y
	}

	pub fn size(&self) -> DVec2 {
		self.max - self.min
	}

	pub fn area(&self) -> f64 {
		self.width() * self.height()
	}

	pub fn center(&self) -> DVec2 {
		(self.min + self.max) / 2.
	}

	/// A rectangle is empty when it has no extent along either axis.
	pub fn is_empty(&self) -> bool {
		self.width() <= 0. || self.height() <= 0.
	}

	pub fn side(&self, side: RectSide) -> DVec2 {
		let center = self.center();
		match side {
			RectSide::TopLeft => self.min,
			RectSide::Top => DVec2::new(center.x, self.min.y),
			RectSide::TopRight => DVec2::new(self.max.x, self.min.y),
			RectSide::Right => DVec2::new(self.max.x, center.y),
			RectSide::BottomRight => self.max,
			RectSide::Bottom => DVec2::new(center.x, self.max.y),
			RectSide::BottomLeft => DVec2::new(self.min.x, self.max.y),
			RectSide::Left => DVec2::new(self.min.x, center.y),
			RectSide::Center => center,
		}
	}

	pub fn corners(&self) -> [DVec2; 4] {
		[self.min, DVec2::new(self.max.x, self.min.y), self.max, DVec2::new(self.min.x, self.max.y)]
	}

	pub fn contains_point(&self, point: DVec2) -> bool {
		point.cmpge(self.min).all() && point.cmple(self.max).all()
	}

	pub fn contains_rect(&self, other: &Rect) -> bool {
		other.min.cmpge(self.min).all() && other.max.cmple(self.max).all()
	}

	/// Touching edges count as intersecting.
	pub fn intersects(&self, other: &Rect) -> bool {
		self.min.x <= other.max.x && other.min.x <= self.max.x && self.min.y <= other.max.y && other.min.y <= self.max.y
	}

	pub fn united(&self, other: &Rect) -> Rect {
		Rect {
			min: self.min.min(other.min),
			max: self.max.max(other.max),
		}
	}

	/// Unites two optional rectangles, treating `None` as the empty set.
	pub fn union_of(a: Option<Rect>, b: Option<Rect>) -> Option<Rect> {
		match (a, b) {
			(Some(a), Some(b)) => Some(a.united(&b)),
			(a, None) => a,
			(None, b) => b,
		}
	}

	/// The overlapping area of both rectangles, `None` when they are disjoint.
	pub fn intersected(&self, other: &Rect) -> Option<Rect> {
		let min = self.min.max(other.min);
		let max = self.max.min(other.max);
		(min.x <= max.x && min.y <= max.y).then_some(Rect { min, max })
	}

	pub fn expanded(&self, left: f64, top: f64, right: f64, bottom: f64) -> Rect {
		Rect::from_points(self.min - DVec2::new(left, top), self.max + DVec2::new(right, bottom))
	}

	pub fn expanded_uniform(&self, amount: f64) -> Rect {
		self.expanded(amount, amount, amount, amount)
	}

	pub fn translated(&self, delta: DVec2) -> Rect {
		Rect {
			min: self.min + delta,
			max: self.max + delta,
		}
	}

	/// Snaps the rectangle outwards to whole units.
	pub fn to_aligned(&self) -> Rect {
		Rect {
			min: self.min.floor(),
			max: self.max.ceil(),
		}
	}
}
