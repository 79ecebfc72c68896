//! Interactive editing for Quill documents: selection, transactions with undo and redo, clipboard operations,
//! element editors and pointer driven tools.

pub mod clipboard;
pub mod consts;
pub mod editor;
pub mod element_editor;
pub mod error;
pub mod options;
pub mod tools;

#[doc(inline)]
pub use clipboard::{Clipboard, MemoryClipboard};
#[doc(inline)]
pub use editor::{Editor, UndoState};
#[doc(inline)]
pub use element_editor::{element_editor_for, ElementEditor, Handle, HandleKind};
#[doc(inline)]
pub use error::EditorError;
#[doc(inline)]
pub use options::EditorOptions;
#[doc(inline)]
pub use tools::{tool_for, ModifierKeys, PointerEvent, Tool, ToolType};
