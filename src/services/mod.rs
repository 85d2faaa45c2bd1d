//! Copy services.

pub mod clipboard;
pub mod extractor;
pub mod platform;

pub use clipboard::{ClipboardCapability, ClipboardWriter};
pub use extractor::extract_text;
pub use platform::{ArboardClipboard, SystemCopyCommand};
