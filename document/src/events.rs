use crate::node::{NodeFlags, NodeId};
use crate::properties::PropertyValue;
use crate::scene::Scene;

/// Notifications emitted synchronously around every mutation of a scene.
///
/// `Before*` events are delivered while the tree is still in its previous state, `After*` events once the mutation completed.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeEvent {
	BeforeChildInsert { parent: NodeId, child: NodeId },
	AfterChildInsert { parent: NodeId, child: NodeId },
	BeforeChildRemove { parent: NodeId, child: NodeId },
	AfterChildRemove { parent: NodeId, child: NodeId },
	BeforePropertiesChange { node: NodeId, properties: Vec<String>, values: Vec<PropertyValue> },
	AfterPropertiesChange { node: NodeId, properties: Vec<String>, previous: Vec<PropertyValue> },
	BeforeFlagChange { node: NodeId, flag: NodeFlags, set: bool },
	AfterFlagChange { node: NodeId, flag: NodeFlags, set: bool },
}

impl NodeEvent {
	/// The node the event is about: the child for structural events.
	pub fn node(&self) -> NodeId {
		match self {
			NodeEvent::BeforeChildInsert { child, .. } | NodeEvent::AfterChildInsert { child, .. } | NodeEvent::BeforeChildRemove { child, .. } | NodeEvent::AfterChildRemove { child, .. } => *child,
			NodeEvent::BeforePropertiesChange { node, .. } | NodeEvent::AfterPropertiesChange { node, .. } | NodeEvent::BeforeFlagChange { node, .. } | NodeEvent::AfterFlagChange { node, .. } => *node,
		}
	}
}

/// Receives the events of a scene it was registered with.
pub trait SceneObserver {
	fn handle_event(&mut self, scene: &Scene, event: &NodeEvent);
}

/// Handle returned when registering an observer, used to unregister it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub(crate) u64);

/// Observer keeping a copy of every event, mostly useful in tests and for debugging.
#[derive(Debug, Default)]
pub struct EventLog {
	pub events: Vec<NodeEvent>,
}

impl SceneObserver for EventLog {
	fn handle_event(&mut self, _scene: &Scene, event: &NodeEvent) {
		self.events.push(event.clone());
	}
}

impl<F: FnMut(&Scene, &NodeEvent)> SceneObserver for F {
	fn handle_event(&mut self, scene: &Scene, event: &NodeEvent) {
		self(scene, event)
	}
}
