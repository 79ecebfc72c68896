use std::collections::BTreeMap;

/// Host clipboard, an opaque store of payloads keyed by MIME type.
pub trait Clipboard {
	/// Replaces the whole clipboard content with `content` of type `mime_type`.
	fn set_content(&mut self, mime_type: &str, content: String);

	fn content(&self, mime_type: &str) -> Option<String>;

	fn mime_types(&self) -> Vec<String>;
}

/// In-process clipboard used when the host provides none, and by tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
	entries: BTreeMap<String, String>,
}

impl MemoryClipboard {
	pub fn new() -> Self {
		Self::default()
	}
}

impl Clipboard for MemoryClipboard {
	fn set_content(&mut self, mime_type: &str, content: String) {
		self.entries.clear();
		self.entries.insert(mime_type.to_string(), content);
	}

	fn content(&self, mime_type: &str) -> Option<String> {
		self.entries.get(mime_type).cloned()
	}

	fn mime_types(&self) -> Vec<String> {
		self.entries.keys().cloned().collect()
	}
}
