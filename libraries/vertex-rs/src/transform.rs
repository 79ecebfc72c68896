use crate::consts::{DETERMINANT_EPSILON, IDENTITY_EPSILON};
use crate::error::GeometryError;
use crate::rect::Rect;

use glam::{DAffine2, DVec2};
use serde::{Deserialize, Serialize};

/// A 2D affine transform.
///
/// The six coefficients map a point `(x, y)` to `(sx * x + shx * y + tx, shy * x + sy * y + ty)`.
/// Every operation is pure and returns a new value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transform(DAffine2);

impl Transform {
	pub const IDENTITY: Transform = Transform(DAffine2::IDENTITY);

	pub fn new(sx: f64, shy: f64, shx: f64, sy: f64, tx: f64, ty: f64) -> Self {
		Self(DAffine2::from_cols_array(&[sx, shy, shx, sy, tx, ty]))
	}

	pub fn from_translation(delta: DVec2) -> Self {
		Self(DAffine2::from_translation(delta))
	}

	pub fn from_scale(scale: DVec2) -> Self {
		Self(DAffine2::from_scale(scale))
	}

	pub fn from_angle(angle: f64) -> Self {
		Self(DAffine2::from_angle(angle))
	}

	/// The coefficients in `[sx, shy, shx, sy, tx, ty]` order.
	pub fn coefficients(&self) -> [f64; 6] {
		self.0.to_cols_array()
	}

	pub fn affine(&self) -> DAffine2 {
		self.0
	}

	pub fn translation(&self) -> DVec2 {
		self.0.translation
	}

	pub fn determinant(&self) -> f64 {
		self.0.matrix2.determinant()
	}

	pub fn is_identity(&self) -> bool {
		self.coefficients().iter().zip(DAffine2::IDENTITY.to_cols_array()).all(|(a, b)| (a - b).abs() < IDENTITY_EPSILON)
	}

	/// Applies `self` first and `other` second.
	#[must_use]
	pub fn compose(&self, other: &Transform) -> Transform {
		Transform(other.0 * self.0)
	}

	/// The inverse transform, failing when the determinant is too close to zero for the inverse to be meaningful.
	pub fn checked_inverse(&self) -> Result<Transform, GeometryError> {
		let determinant = self.determinant();
		if !determinant.is_finite() || determinant.abs() < DETERMINANT_EPSILON {
			return Err(GeometryError::DegenerateTransform { determinant });
		}
		Ok(Transform(self.0.inverse()))
	}

	/// The inverse transform, or the identity for a degenerate one.
	#[must_use]
	pub fn inverted_or_identity(&self) -> Transform {
		self.checked_inverse().unwrap_or_else(|error| {
			log::warn!("{error}");
			Transform::IDENTITY
		})
	}

	#[must_use]
	pub fn rotated(&self, angle: f64) -> Transform {
		self.compose(&Transform::from_angle(angle))
	}

	/// Rotates around `center` instead of the origin.
	#[must_use]
	pub fn rotated_around(&self, angle: f64, center: DVec2) -> Transform {
		self.translated(-center).rotated(angle).translated(center)
	}

	#[must_use]
	pub fn translated(&self, delta: DVec2) -> Transform {
		self.compose(&Transform::from_translation(delta))
	}

	#[must_use]
	pub fn scaled(&self, scale: DVec2) -> Transform {
		self.compose(&Transform::from_scale(scale))
	}

	/// Uniform scale approximation used to size strokes and tolerances under this transform.
	pub fn scale_factor(&self) -> f64 {
		let [sx, shy, shx, sy, _, _] = self.coefficients();
		let x = std::f64::consts::FRAC_1_SQRT_2 * (sx + shx);
		let y = std::f64::consts::FRAC_1_SQRT_2 * (shy + sy);
		(x * x + y * y).sqrt()
	}

	pub fn map_point(&self, point: DVec2) -> DVec2 {
		self.0.transform_point2(point)
	}

	/// Maps a direction, ignoring the translation.
	pub fn map_vector(&self, vector: DVec2) -> DVec2 {
		self.0.transform_vector2(vector)
	}

	/// Axis-aligned bounds of the four transformed corners.
	pub fn map_rect(&self, rect: &Rect) -> Rect {
		let corners = rect.corners().map(|corner| self.map_point(corner));
		Rect::bounding(corners).unwrap_or(*rect)
	}
}

impl From<DAffine2> for Transform {
	fn from(affine: DAffine2) -> Self {
		Self(affine)
	}
}

impl From<Transform> for DAffine2 {
	fn from(transform: Transform) -> Self {
		transform.0
	}
}
