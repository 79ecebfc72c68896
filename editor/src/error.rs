use quill_document::DocumentError;

use thiserror::Error;

/// The error type used by the Quill editor.
#[derive(Debug, Error)]
pub enum EditorError {
	#[error("Failed to execute operation:\n{0}")]
	InvalidOperation(String),

	#[error("A commit or rollback was requested but no transaction was in progress")]
	NoTransactionInProgress,

	#[error("A transaction is already in progress")]
	TransactionAlreadyOpen,

	#[error("There is nothing to undo")]
	NoUndoState,

	#[error("There is nothing to redo")]
	NoRedoState,

	#[error("The clipboard holds no content of type {0}")]
	EmptyClipboard(String),

	#[error("There is no active layer to insert elements into")]
	NoActiveLayer,

	#[error(transparent)]
	Document(#[from] DocumentError),

	#[error("Failed to (de)serialize:\n{0}")]
	Serialization(String),
}

macro_rules! derive_from {
	($type:ty, $kind:ident) => {
		impl From<$type> for EditorError {
			fn from(error: $type) -> Self {
				EditorError::$kind(format!("{}", error))
			}
		}
	};
}

derive_from!(&str, InvalidOperation);
derive_from!(String, InvalidOperation);
derive_from!(serde_json::Error, Serialization);
