use serde::{Deserialize, Serialize};

/// Straight (not premultiplied) RGBA color with components in `0..=1`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Color {
	red: f32,
	green: f32,
	blue: f32,
	alpha: f32,
}

impl Color {
	pub const BLACK: Color = Color::from_rgbaf32_unchecked(0., 0., 0., 1.);
	pub const WHITE: Color = Color::from_rgbaf32_unchecked(1., 1., 1., 1.);
	pub const TRANSPARENT: Color = Color::from_rgbaf32_unchecked(0., 0., 0., 0.);
	pub const SELECTION: Color = Color::from_rgbaf32_unchecked(0., 0.66, 1., 1.);
	pub const HIGHLIGHT: Color = Color::from_rgbaf32_unchecked(0., 0.9, 0.9, 1.);
	pub const GUIDE: Color = Color::from_rgbaf32_unchecked(1., 0., 0.8, 1.);

	/// Returns `None` when a component lies outside of `0..=1`.
	pub fn from_rgbaf32(red: f32, green: f32, blue: f32, alpha: f32) -> Option<Color> {
		let components = [red, green, blue, alpha];
		components.iter().all(|component| (0. ..=1.).contains(component)).then_some(Color { red, green, blue, alpha })
	}

	pub const fn from_rgbaf32_unchecked(red: f32, green: f32, blue: f32, alpha: f32) -> Color {
		Color { red, green, blue, alpha }
	}

	pub fn from_rgba8(red: u8, green: u8, blue: u8, alpha: u8) -> Color {
		let map = |value: u8| value as f32 / 255.;
		Color::from_rgbaf32_unchecked(map(red), map(green), map(blue), map(alpha))
	}

	pub fn r(&self) -> f32 {
		self.red
	}

	pub fn g(&self) -> f32 {
		self.green
	}

	pub fn b(&self) -> f32 {
		self.blue
	}

	pub fn a(&self) -> f32 {
		self.alpha
	}

	pub fn is_valid(&self) -> bool {
		[self.red, self.green, self.blue, self.alpha].iter().all(|component| (0. ..=1.).contains(component))
	}

	/// The same color with its alpha multiplied by `opacity`.
	#[must_use]
	pub fn with_opacity(&self, opacity: f64) -> Color {
		Color {
			alpha: (self.alpha * opacity as f32).clamp(0., 1.),
			..*self
		}
	}

	/// Hex notation without the leading `#`, e.g. `ff0000ff`.
	pub fn to_rgba_hex(&self) -> String {
		let map = |value: f32| (value.clamp(0., 1.) * 255.).round() as u8;
		format!("{:02x}{:02x}{:02x}{:02x}", map(self.red), map(self.green), map(self.blue), map(self.alpha))
	}
}
