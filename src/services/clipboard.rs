//! Clipboard operations.
//!
//! A copy goes through at most two tiers. The clipboard capability is tried
//! first; if it is missing or rejects the write, the text is staged in an
//! off-screen scratch field, selected, and handed to the copy command. The
//! scratch field is removed again on every path.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::models::document::{self, Document, ElementId, SharedDocument};
use crate::models::{CopyError, CopyOutcome};

/// Asynchronous, permission-gated clipboard write.
#[async_trait]
pub trait ClipboardCapability: Send + Sync {
    fn name(&self) -> &str;

    async fn write_text(&self, text: &str) -> Result<()>;
}

/// Synchronous command that copies the document's current selection.
///
/// Returns `Ok(false)` when the host declines without an error, for example
/// when nothing is focused and selected.
pub trait CopyCommand: Send + Sync {
    fn name(&self) -> &str;

    fn copy_selection(&self, document: &Document) -> Result<bool>;
}

/// Places text on the clipboard and reports a [`CopyOutcome`].
pub struct ClipboardWriter {
    document: SharedDocument,
    primary: Option<Arc<dyn ClipboardCapability>>,
    command: Arc<dyn CopyCommand>,
}

impl ClipboardWriter {
    pub fn new(
        document: SharedDocument,
        primary: Option<Arc<dyn ClipboardCapability>>,
        command: Arc<dyn CopyCommand>,
    ) -> Self {
        Self {
            document,
            primary,
            command,
        }
    }

    /// Whether the clipboard capability is available at all.
    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    /// Copy `text`, or fail with "Nothing to copy" when there is none.
    ///
    /// An empty string is a real request and goes through both tiers.
    pub async fn copy(&self, text: Option<&str>) -> CopyOutcome {
        let Some(text) = text else {
            debug!("copy requested without text");
            return CopyError::NoInput.into();
        };

        if let Some(primary) = &self.primary {
            match primary.write_text(text).await {
                Ok(()) => {
                    debug!(capability = primary.name(), bytes = text.len(), "copied to clipboard");
                    return CopyOutcome::Success;
                }
                Err(e) => {
                    let err = CopyError::PrimaryCapability(format!("{:#}", e));
                    warn!(capability = primary.name(), error = %err, "falling back to copy command");
                }
            }
        }

        self.copy_with_command(text)
    }

    /// Fallback tier. Holds the document lock throughout, so concurrent
    /// fallbacks never interleave their focus and selection changes.
    fn copy_with_command(&self, text: &str) -> CopyOutcome {
        let mut document = document::lock(&self.document);
        let previous_focus = document.focused();

        let scratch = document.create_scratch_field(text);
        let result = match document.append(scratch) {
            Ok(id) => {
                let result = stage_and_copy(&mut document, id, self.command.as_ref());
                document.remove(id);
                result
            }
            Err(e) => Err(e.into()),
        };

        if let Some(id) = previous_focus {
            if document.focus(id).is_err() {
                debug!("previously focused element is gone");
            }
        }

        match result {
            Ok(true) => {
                debug!(command = self.command.name(), bytes = text.len(), "copied with command");
                CopyOutcome::Success
            }
            Ok(false) => {
                warn!(command = self.command.name(), "copy command reported failure");
                CopyError::FallbackCommandRejected.into()
            }
            Err(e) => {
                let message = format!("{:#}", e);
                warn!(command = self.command.name(), error = %message, "copy command failed");
                CopyError::FallbackException(message).into()
            }
        }
    }
}

fn stage_and_copy(document: &mut Document, id: ElementId, command: &dyn CopyCommand) -> Result<bool> {
    document.focus(id)?;
    document.select_all(id)?;
    command.copy_selection(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::Placement;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakeClipboard {
        fail: bool,
        calls: AtomicUsize,
        written: Mutex<Vec<String>>,
    }

    impl FakeClipboard {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                fail,
                calls: AtomicUsize::new(0),
                written: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ClipboardCapability for FakeClipboard {
        fn name(&self) -> &str {
            "fake"
        }

        async fn write_text(&self, text: &str) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(anyhow!("permission denied"));
            }
            self.written.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    #[derive(Clone, Copy)]
    enum Behavior {
        Copy,
        Decline,
        Fail(&'static str),
    }

    /// What the command saw when it ran.
    #[derive(Debug, PartialEq)]
    struct Seen {
        selected: Option<String>,
        off_screen: usize,
    }

    struct FakeCommand {
        behavior: Behavior,
        seen: Mutex<Vec<Seen>>,
    }

    impl FakeCommand {
        fn new(behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn runs(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    impl CopyCommand for FakeCommand {
        fn name(&self) -> &str {
            "fake-command"
        }

        fn copy_selection(&self, document: &Document) -> Result<bool> {
            self.seen.lock().unwrap().push(Seen {
                selected: document.selected_text().map(str::to_string),
                off_screen: document
                    .elements()
                    .filter(|e| e.placement() == Placement::OffScreen)
                    .count(),
            });
            match self.behavior {
                Behavior::Copy => Ok(true),
                Behavior::Decline => Ok(false),
                Behavior::Fail(message) => Err(anyhow!(message)),
            }
        }
    }

    fn page() -> SharedDocument {
        let mut doc = Document::new();
        let field = doc.create_field("code", "Code", "fn main() {}");
        let panel = doc.create_panel("answer", "Answer", Some("42".to_string()));
        doc.append(field).unwrap();
        doc.append(panel).unwrap();
        Arc::new(Mutex::new(doc))
    }

    fn writer(
        document: &SharedDocument,
        primary: Option<Arc<FakeClipboard>>,
        command: &Arc<FakeCommand>,
    ) -> ClipboardWriter {
        ClipboardWriter::new(
            document.clone(),
            primary.map(|p| p as Arc<dyn ClipboardCapability>),
            command.clone(),
        )
    }

    fn off_screen_count(document: &SharedDocument) -> usize {
        document::lock(document)
            .elements()
            .filter(|e| e.placement() == Placement::OffScreen)
            .count()
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let doc = page();
        let clipboard = FakeClipboard::new(false);
        let command = FakeCommand::new(Behavior::Copy);
        let writer = writer(&doc, Some(clipboard.clone()), &command);

        assert_eq!(writer.copy(Some("hello")).await, CopyOutcome::Success);
        assert_eq!(*clipboard.written.lock().unwrap(), vec!["hello".to_string()]);
        assert_eq!(command.runs(), 0);
        assert_eq!(document::lock(&doc).len(), 2);
    }

    #[tokio::test]
    async fn test_missing_primary_uses_fallback_and_cleans_up() {
        let doc = page();
        let command = FakeCommand::new(Behavior::Copy);
        let writer = writer(&doc, None, &command);

        assert!(!writer.has_primary());
        assert_eq!(writer.copy(Some("hello")).await, CopyOutcome::Success);
        assert_eq!(
            *command.seen.lock().unwrap(),
            vec![Seen {
                selected: Some("hello".to_string()),
                off_screen: 1,
            }]
        );
        assert_eq!(off_screen_count(&doc), 0);
        assert_eq!(document::lock(&doc).len(), 2);
    }

    #[tokio::test]
    async fn test_primary_rejection_falls_through_silently() {
        let doc = page();
        let clipboard = FakeClipboard::new(true);
        let command = FakeCommand::new(Behavior::Copy);
        let writer = writer(&doc, Some(clipboard.clone()), &command);

        assert_eq!(writer.copy(Some("hello")).await, CopyOutcome::Success);
        assert_eq!(clipboard.calls.load(Ordering::SeqCst), 1);
        assert_eq!(command.runs(), 1);
    }

    #[tokio::test]
    async fn test_declined_command_reports_unsuccessful() {
        let doc = page();
        let command = FakeCommand::new(Behavior::Decline);
        let writer = writer(&doc, Some(FakeClipboard::new(true)), &command);

        let outcome = writer.copy(Some("hello")).await;
        assert_eq!(outcome.message(), Some("Copy command unsuccessful"));
        assert_eq!(off_screen_count(&doc), 0);
    }

    #[tokio::test]
    async fn test_command_error_message_is_surfaced() {
        let doc = page();
        let command = FakeCommand::new(Behavior::Fail("No copy command available"));
        let writer = writer(&doc, None, &command);

        let outcome = writer.copy(Some("hello")).await;
        assert_eq!(outcome.message(), Some("No copy command available"));
        assert_eq!(off_screen_count(&doc), 0);
    }

    #[tokio::test]
    async fn test_command_error_without_message_uses_generic_text() {
        let doc = page();
        let command = FakeCommand::new(Behavior::Fail(""));
        let writer = writer(&doc, None, &command);

        let outcome = writer.copy(Some("hello")).await;
        assert_eq!(outcome.message(), Some("Copy failed"));
    }

    #[tokio::test]
    async fn test_no_input_touches_nothing() {
        let doc = page();
        let clipboard = FakeClipboard::new(false);
        let command = FakeCommand::new(Behavior::Copy);
        let writer = writer(&doc, Some(clipboard.clone()), &command);

        let outcome = writer.copy(None).await;
        assert_eq!(outcome.message(), Some("Nothing to copy"));
        assert_eq!(clipboard.calls.load(Ordering::SeqCst), 0);
        assert_eq!(command.runs(), 0);
        assert_eq!(document::lock(&doc).len(), 2);
    }

    #[tokio::test]
    async fn test_empty_string_is_a_real_request() {
        let doc = page();
        let command = FakeCommand::new(Behavior::Copy);
        let writer = writer(&doc, None, &command);

        assert_eq!(writer.copy(Some("")).await, CopyOutcome::Success);
        assert_eq!(command.seen.lock().unwrap()[0].selected.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_outcomes_are_never_empty_failures() {
        for behavior in [Behavior::Copy, Behavior::Decline, Behavior::Fail("boom"), Behavior::Fail("")] {
            let doc = page();
            let command = FakeCommand::new(behavior);
            let writer = writer(&doc, None, &command);
            for text in ["", "hello", "multi\nline"] {
                match writer.copy(Some(text)).await {
                    CopyOutcome::Success => {}
                    CopyOutcome::Failure { message } => assert!(!message.is_empty()),
                }
            }
            assert_eq!(off_screen_count(&doc), 0);
        }
    }

    #[tokio::test]
    async fn test_same_input_same_outcome() {
        let doc = page();
        let command = FakeCommand::new(Behavior::Decline);
        let writer = writer(&doc, Some(FakeClipboard::new(true)), &command);

        let first = writer.copy(Some("again")).await;
        let second = writer.copy(Some("again")).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_fallback_restores_focus() {
        let doc = page();
        let code = {
            let mut d = document::lock(&doc);
            let id = d.find("code").unwrap().id();
            d.focus(id).unwrap();
            id
        };
        let command = FakeCommand::new(Behavior::Copy);
        let writer = writer(&doc, None, &command);

        writer.copy(Some("hello")).await;
        assert_eq!(document::lock(&doc).focused(), Some(code));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_overlapping_fallbacks_are_serialized() {
        let doc = page();
        let command = FakeCommand::new(Behavior::Copy);
        let writer = Arc::new(writer(&doc, Some(FakeClipboard::new(true)), &command));

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let writer = writer.clone();
                tokio::spawn(async move { writer.copy(Some(&format!("copy {}", i))).await })
            })
            .collect();
        for task in tasks {
            assert_eq!(task.await.unwrap(), CopyOutcome::Success);
        }

        let seen = command.seen.lock().unwrap();
        assert_eq!(seen.len(), 16);
        assert!(seen.iter().all(|s| s.off_screen == 1));
        let mut copied: Vec<_> = seen.iter().filter_map(|s| s.selected.clone()).collect();
        copied.sort();
        let mut expected: Vec<_> = (0..16).map(|i| format!("copy {}", i)).collect();
        expected.sort();
        assert_eq!(copied, expected);
        drop(seen);

        assert_eq!(off_screen_count(&doc), 0);
        assert_eq!(document::lock(&doc).len(), 2);
    }
}
