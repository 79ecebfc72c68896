use crate::node::{NodeFlags, NodeId};
use crate::properties::PropertyValue;
use crate::tree::NodeTree;

/// One invertible mutation recorded while a scene is journaling.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
	/// `tree`, rooted at `child`, was inserted into `parent` before `before` (appended when `None`).
	Insert { parent: NodeId, child: NodeId, before: Option<NodeId>, tree: NodeTree },
	/// `tree`, rooted at `child`, was removed from `parent`, where it was placed before `before`.
	Remove { parent: NodeId, child: NodeId, before: Option<NodeId>, tree: NodeTree },
	Properties {
		node: NodeId,
		names: Vec<String>,
		previous: Vec<PropertyValue>,
		values: Vec<PropertyValue>,
	},
	Flag { node: NodeId, flag: NodeFlags, set: bool },
}

impl Change {
	/// Whether `self` and `other` change the same set of properties on the same node, so that they may be merged.
	pub fn is_mergeable_with(&self, other: &Change) -> bool {
		match (self, other) {
			(Change::Properties { node, names, .. }, Change::Properties { node: other_node, names: other_names, .. }) => node == other_node && names == other_names,
			_ => false,
		}
	}

	/// Folds a later property change into this one, keeping the oldest previous values.
	pub fn merge(&mut self, later: Change) {
		if let (Change::Properties { values, .. }, Change::Properties { values: later_values, .. }) = (self, later) {
			*values = later_values;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn properties(node: u64, names: &[&str], previous: f64, value: f64) -> Change {
		Change::Properties {
			node: NodeId(node),
			names: names.iter().map(|name| name.to_string()).collect(),
			previous: vec![PropertyValue::Number(previous); names.len()],
			values: vec![PropertyValue::Number(value); names.len()],
		}
	}

	#[test]
	fn merge_keeps_oldest_previous_values() {
		let mut first = properties(1, &["x"], 0., 5.);
		let second = properties(1, &["x"], 5., 9.);
		assert!(first.is_mergeable_with(&second));
		first.merge(second);
		assert_eq!(first, properties(1, &["x"], 0., 9.));
	}

	#[test]
	fn only_matching_property_changes_merge() {
		let change = properties(1, &["x"], 0., 5.);
		assert!(!change.is_mergeable_with(&properties(2, &["x"], 0., 5.)));
		assert!(!change.is_mergeable_with(&properties(1, &["x", "y"], 0., 5.)));
		assert!(!change.is_mergeable_with(&Change::Flag {
			node: NodeId(1),
			flag: NodeFlags::HIDDEN,
			set: true
		}));
	}
}
