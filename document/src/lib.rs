//! The Quill document model: an arena backed scene graph of pages, layers and vector elements, with typed properties,
//! change observers and a change journal, element geometry and painting, and snapping guides.

pub mod color;
pub mod consts;
pub mod element;
pub mod error;
pub mod events;
pub mod guides;
pub mod journal;
pub mod node;
pub mod paint;
pub mod properties;
pub mod scene;
pub mod settings;
pub mod tree;
pub mod view;

pub use color::Color;
pub use element::{ElementHit, StrokeAlignment};
pub use error::{DocumentError, StructureError};
pub use events::{NodeEvent, ObserverId, SceneObserver};
pub use journal::Change;
pub use node::{Node, NodeFlags, NodeId, NodeKind};
pub use properties::{PathAnchor, PropertyMap, PropertyValue};
pub use scene::Scene;
pub use settings::{SceneSettings, Unit, UnitSnap};
pub use tree::NodeTree;
pub use view::View;
