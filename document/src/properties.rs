use crate::color::Color;
use crate::consts::*;
use crate::node::NodeKind;

use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use vertex_rs::{CornerShape, Transform};

pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// A point of a path with optional absolute bezier handles and a corner cut applied when it has no handles.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PathAnchor {
	pub position: DVec2,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub handle_in: Option<DVec2>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub handle_out: Option<DVec2>,
	#[serde(default)]
	pub corner: CornerShape,
	#[serde(default)]
	pub radius: f64,
}

impl PathAnchor {
	pub fn new(position: DVec2) -> Self {
		Self { position, ..Default::default() }
	}

	#[must_use]
	pub fn with_corner(mut self, corner: CornerShape, radius: f64) -> Self {
		self.corner = corner;
		self.radius = radius;
		self
	}

	#[must_use]
	pub fn with_handles(mut self, handle_in: Option<DVec2>, handle_out: Option<DVec2>) -> Self {
		self.handle_in = handle_in;
		self.handle_out = handle_out;
		self
	}

	pub fn has_handles(&self) -> bool {
		self.handle_in.is_some() || self.handle_out.is_some()
	}

	/// The anchor with all of its points mapped by `transform`.
	pub fn transformed(&self, transform: &Transform) -> Self {
		Self {
			position: transform.map_point(self.position),
			handle_in: self.handle_in.map(|handle| transform.map_point(handle)),
			handle_out: self.handle_out.map(|handle| transform.map_point(handle)),
			..*self
		}
	}
}

/// A typed property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
	Bool(bool),
	Number(f64),
	Text(String),
	Color(Color),
	Transform(Transform),
	Anchors(Vec<PathAnchor>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
	Bool,
	Number,
	Text,
	Color,
	Transform,
	Anchors,
}

impl PropertyValue {
	pub fn kind(&self) -> ValueKind {
		match self {
			PropertyValue::Bool(_) => ValueKind::Bool,
			PropertyValue::Number(_) => ValueKind::Number,
			PropertyValue::Text(_) => ValueKind::Text,
			PropertyValue::Color(_) => ValueKind::Color,
			PropertyValue::Transform(_) => ValueKind::Transform,
			PropertyValue::Anchors(_) => ValueKind::Anchors,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			PropertyValue::Bool(value) => Some(*value),
			_ => None,
		}
	}

	pub fn as_number(&self) -> Option<f64> {
		match self {
			PropertyValue::Number(value) => Some(*value),
			_ => None,
		}
	}

	pub fn as_text(&self) -> Option<&str> {
		match self {
			PropertyValue::Text(value) => Some(value),
			_ => None,
		}
	}

	pub fn as_color(&self) -> Option<Color> {
		match self {
			PropertyValue::Color(value) => Some(*value),
			_ => None,
		}
	}

	pub fn as_transform(&self) -> Option<Transform> {
		match self {
			PropertyValue::Transform(value) => Some(*value),
			_ => None,
		}
	}

	pub fn as_anchors(&self) -> Option<&[PathAnchor]> {
		match self {
			PropertyValue::Anchors(value) => Some(value),
			_ => None,
		}
	}
}

impl From<bool> for PropertyValue {
	fn from(value: bool) -> Self {
		PropertyValue::Bool(value)
	}
}

impl From<f64> for PropertyValue {
	fn from(value: f64) -> Self {
		PropertyValue::Number(value)
	}
}

impl From<&str> for PropertyValue {
	fn from(value: &str) -> Self {
		PropertyValue::Text(value.to_string())
	}
}

impl From<String> for PropertyValue {
	fn from(value: String) -> Self {
		PropertyValue::Text(value)
	}
}

impl From<Color> for PropertyValue {
	fn from(value: Color) -> Self {
		PropertyValue::Color(value)
	}
}

impl From<Transform> for PropertyValue {
	fn from(value: Transform) -> Self {
		PropertyValue::Transform(value)
	}
}

impl From<Vec<PathAnchor>> for PropertyValue {
	fn from(value: Vec<PathAnchor>) -> Self {
		PropertyValue::Anchors(value)
	}
}

/// What a change of the property invalidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyImpact {
	/// Metadata without visual effect.
	None,
	/// Repaint of the current paint area only.
	Visual,
	/// The paint bounding box, but not the geometry.
	Paint,
	/// The geometry and paint bounding boxes.
	Geometry,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constraint {
	Any,
	NonNegative,
	Positive,
	UnitInterval,
	OneOf(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyDefault {
	Bool(bool),
	Number(f64),
	Text(&'static str),
	Color(Color),
	Identity,
	NoAnchors,
}

impl PropertyDefault {
	pub fn value(&self) -> PropertyValue {
		match *self {
			PropertyDefault::Bool(value) => PropertyValue::Bool(value),
			PropertyDefault::Number(value) => PropertyValue::Number(value),
			PropertyDefault::Text(value) => PropertyValue::Text(value.to_string()),
			PropertyDefault::Color(value) => PropertyValue::Color(value),
			PropertyDefault::Identity => PropertyValue::Transform(Transform::IDENTITY),
			PropertyDefault::NoAnchors => PropertyValue::Anchors(Vec::new()),
		}
	}

	fn kind(&self) -> ValueKind {
		match self {
			PropertyDefault::Bool(_) => ValueKind::Bool,
			PropertyDefault::Number(_) => ValueKind::Number,
			PropertyDefault::Text(_) => ValueKind::Text,
			PropertyDefault::Color(_) => ValueKind::Color,
			PropertyDefault::Identity => ValueKind::Transform,
			PropertyDefault::NoAnchors => ValueKind::Anchors,
		}
	}
}

/// Declaration of a property of a node kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertyDef {
	pub name: &'static str,
	pub default: PropertyDefault,
	pub constraint: Constraint,
	pub impact: PropertyImpact,
}

impl PropertyDef {
	const fn new(name: &'static str, default: PropertyDefault, constraint: Constraint, impact: PropertyImpact) -> Self {
		Self { name, default, constraint, impact }
	}

	pub fn kind(&self) -> ValueKind {
		self.default.kind()
	}

	/// Checks type and constraint of a candidate value, returning the reason of a rejection.
	pub fn validate(&self, value: &PropertyValue) -> Result<(), String> {
		if value.kind() != self.kind() {
			return Err(format!("expected a {:?} but got a {:?}", self.kind(), value.kind()));
		}
		if let PropertyValue::Number(number) = value {
			if !number.is_finite() {
				return Err(format!("{number} is not a finite number"));
			}
		}
		if let PropertyValue::Color(color) = value {
			if !color.is_valid() {
				return Err(format!("{color:?} has components outside of 0..=1"));
			}
		}
		let valid = match (self.constraint, value) {
			(Constraint::Any, _) => true,
			(Constraint::NonNegative, PropertyValue::Number(number)) => *number >= 0.,
			(Constraint::Positive, PropertyValue::Number(number)) => *number > 0.,
			(Constraint::UnitInterval, PropertyValue::Number(number)) => (0. ..=1.).contains(number),
			(Constraint::OneOf(options), PropertyValue::Text(text)) => options.contains(&text.as_str()),
			_ => true,
		};
		if valid { Ok(()) } else { Err(format!("{value:?} violates {:?}", self.constraint)) }
	}
}

use Constraint::*;
use PropertyImpact as Impact;

const UNITS: &[&str] = &["px", "pt", "mm", "cm", "in"];
const UNIT_SNAP_MODES: &[&str] = &["off", "full", "half"];
const STROKE_ALIGNMENTS: &[&str] = &["center", "inside", "outside"];
const OFFSET_SIDES: &[&str] = &["outset", "inset", "both"];

const SCENE_PROPERTIES: &[PropertyDef] = &[
	PropertyDef::new("unit", PropertyDefault::Text("px"), OneOf(UNITS), Impact::None),
	PropertyDef::new("gridSizeX", PropertyDefault::Number(DEFAULT_GRID_SIZE), Positive, Impact::None),
	PropertyDef::new("gridSizeY", PropertyDefault::Number(DEFAULT_GRID_SIZE), Positive, Impact::None),
	PropertyDef::new("gridActive", PropertyDefault::Bool(false), Any, Impact::None),
	PropertyDef::new("snapDistance", PropertyDefault::Number(DEFAULT_SNAP_DISTANCE), NonNegative, Impact::None),
	PropertyDef::new("pickDistance", PropertyDefault::Number(DEFAULT_PICK_DISTANCE), NonNegative, Impact::None),
	PropertyDef::new("singlePage", PropertyDefault::Bool(false), Any, Impact::None),
	PropertyDef::new("unitSnap", PropertyDefault::Text("off"), OneOf(UNIT_SNAP_MODES), Impact::None),
];

const PAGE_PROPERTIES: &[PropertyDef] = &[
	PropertyDef::new("name", PropertyDefault::Text("Page"), Any, Impact::None),
	PropertyDef::new("x", PropertyDefault::Number(0.), Any, Impact::Geometry),
	PropertyDef::new("y", PropertyDefault::Number(0.), Any, Impact::Geometry),
	PropertyDef::new("width", PropertyDefault::Number(DEFAULT_PAGE_WIDTH), Positive, Impact::Geometry),
	PropertyDef::new("height", PropertyDefault::Number(DEFAULT_PAGE_HEIGHT), Positive, Impact::Geometry),
	PropertyDef::new("color", PropertyDefault::Color(Color::WHITE), Any, Impact::Visual),
];

const LAYER_PROPERTIES: &[PropertyDef] = &[
	PropertyDef::new("name", PropertyDefault::Text("Layer"), Any, Impact::None),
	PropertyDef::new("color", PropertyDefault::Color(Color::SELECTION), Any, Impact::Visual),
	PropertyDef::new("outline", PropertyDefault::Bool(false), Any, Impact::Visual),
];

const GROUP_PROPERTIES: &[PropertyDef] = &[
	PropertyDef::new("name", PropertyDefault::Text("Group"), Any, Impact::None),
	PropertyDef::new("transform", PropertyDefault::Identity, Any, Impact::Geometry),
];

const PATH_PROPERTIES: &[PropertyDef] = &[
	PropertyDef::new("name", PropertyDefault::Text("Path"), Any, Impact::None),
	PropertyDef::new("transform", PropertyDefault::Identity, Any, Impact::Geometry),
	PropertyDef::new("anchors", PropertyDefault::NoAnchors, Any, Impact::Geometry),
	PropertyDef::new("closed", PropertyDefault::Bool(false), Any, Impact::Geometry),
];

const RECTANGLE_PROPERTIES: &[PropertyDef] = &[
	PropertyDef::new("name", PropertyDefault::Text("Rectangle"), Any, Impact::None),
	PropertyDef::new("transform", PropertyDefault::Identity, Any, Impact::Geometry),
	PropertyDef::new("x", PropertyDefault::Number(0.), Any, Impact::Geometry),
	PropertyDef::new("y", PropertyDefault::Number(0.), Any, Impact::Geometry),
	PropertyDef::new("width", PropertyDefault::Number(0.), NonNegative, Impact::Geometry),
	PropertyDef::new("height", PropertyDefault::Number(0.), NonNegative, Impact::Geometry),
	PropertyDef::new("radius", PropertyDefault::Number(0.), NonNegative, Impact::Geometry),
];

const ELLIPSE_PROPERTIES: &[PropertyDef] = &[
	PropertyDef::new("name", PropertyDefault::Text("Ellipse"), Any, Impact::None),
	PropertyDef::new("transform", PropertyDefault::Identity, Any, Impact::Geometry),
	PropertyDef::new("cx", PropertyDefault::Number(0.), Any, Impact::Geometry),
	PropertyDef::new("cy", PropertyDefault::Number(0.), Any, Impact::Geometry),
	PropertyDef::new("rx", PropertyDefault::Number(0.), NonNegative, Impact::Geometry),
	PropertyDef::new("ry", PropertyDefault::Number(0.), NonNegative, Impact::Geometry),
];

const FILL_PROPERTIES: &[PropertyDef] = &[
	PropertyDef::new("color", PropertyDefault::Color(Color::BLACK), Any, Impact::Visual),
	PropertyDef::new("opacity", PropertyDefault::Number(1.), UnitInterval, Impact::Visual),
];

const STROKE_PROPERTIES: &[PropertyDef] = &[
	PropertyDef::new("color", PropertyDefault::Color(Color::BLACK), Any, Impact::Visual),
	PropertyDef::new("opacity", PropertyDefault::Number(1.), UnitInterval, Impact::Visual),
	PropertyDef::new("width", PropertyDefault::Number(1.), NonNegative, Impact::Paint),
	PropertyDef::new("alignment", PropertyDefault::Text("center"), OneOf(STROKE_ALIGNMENTS), Impact::Paint),
];

const BLUR_PROPERTIES: &[PropertyDef] = &[PropertyDef::new("radius", PropertyDefault::Number(4.), NonNegative, Impact::Paint)];

const SHADOW_PROPERTIES: &[PropertyDef] = &[
	PropertyDef::new("x", PropertyDefault::Number(5.), Any, Impact::Paint),
	PropertyDef::new("y", PropertyDefault::Number(5.), Any, Impact::Paint),
	PropertyDef::new("blur", PropertyDefault::Number(5.), NonNegative, Impact::Paint),
	PropertyDef::new("color", PropertyDefault::Color(Color::from_rgbaf32_unchecked(0., 0., 0., 0.5)), Any, Impact::Visual),
];

const OFFSET_PROPERTIES: &[PropertyDef] = &[
	PropertyDef::new("radius", PropertyDefault::Number(5.), NonNegative, Impact::Paint),
	PropertyDef::new("side", PropertyDefault::Text("outset"), OneOf(OFFSET_SIDES), Impact::Paint),
];

/// All properties a node of `kind` carries.
pub fn schema(kind: NodeKind) -> &'static [PropertyDef] {
	match kind {
		NodeKind::Scene => SCENE_PROPERTIES,
		NodeKind::Page => PAGE_PROPERTIES,
		NodeKind::Layer => LAYER_PROPERTIES,
		NodeKind::Group => GROUP_PROPERTIES,
		NodeKind::Path => PATH_PROPERTIES,
		NodeKind::Rectangle => RECTANGLE_PROPERTIES,
		NodeKind::Ellipse => ELLIPSE_PROPERTIES,
		NodeKind::Attributes => &[],
		NodeKind::Fill => FILL_PROPERTIES,
		NodeKind::Stroke => STROKE_PROPERTIES,
		NodeKind::Blur => BLUR_PROPERTIES,
		NodeKind::Shadow => SHADOW_PROPERTIES,
		NodeKind::Offset => OFFSET_PROPERTIES,
	}
}

pub fn property_def(kind: NodeKind, name: &str) -> Option<&'static PropertyDef> {
	schema(kind).iter().find(|def| def.name == name)
}

/// A property map holding the default of every property of `kind`.
pub fn default_properties(kind: NodeKind) -> PropertyMap {
	schema(kind).iter().map(|def| (def.name.to_string(), def.default.value())).collect()
}
