//! The four text sources on the copy screen and how "copy all" joins them.

/// A copyable source on the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Question,
    Context,
    Code,
    Answer,
}

impl SourceKind {
    /// All sources in display and join order.
    pub const ALL: [SourceKind; 4] = [
        SourceKind::Question,
        SourceKind::Context,
        SourceKind::Code,
        SourceKind::Answer,
    ];

    /// Element name in the document.
    pub fn element_name(self) -> &'static str {
        match self {
            SourceKind::Question => "question",
            SourceKind::Context => "context",
            SourceKind::Code => "code",
            SourceKind::Answer => "answer",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SourceKind::Question => "Question",
            SourceKind::Context => "Context",
            SourceKind::Code => "Code",
            SourceKind::Answer => "Answer",
        }
    }

    /// Whether the source is a user-editable field rather than a panel.
    pub fn is_editable(self) -> bool {
        !matches!(self, SourceKind::Answer)
    }
}

/// Join the non-empty sources for "copy all".
///
/// Code is prefixed with `Code:` on its own line. Returns `None` when every
/// part is empty, which the caller reports as "nothing to copy".
pub fn combine_sources<'a, I>(parts: I) -> Option<String>
where
    I: IntoIterator<Item = (SourceKind, &'a str)>,
{
    let sections: Vec<String> = parts
        .into_iter()
        .filter(|(_, text)| !text.is_empty())
        .map(|(kind, text)| match kind {
            SourceKind::Code => format!("Code:\n{}", text),
            _ => text.to_string(),
        })
        .collect();

    if sections.is_empty() {
        None
    } else {
        Some(sections.join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_combine_skips_empty_sources() {
        let combined = combine_sources([
            (SourceKind::Question, "Why does this panic?"),
            (SourceKind::Context, ""),
            (SourceKind::Code, "let x: u8 = 256;"),
            (SourceKind::Answer, ""),
        ]);
        assert_eq!(
            combined.as_deref(),
            Some("Why does this panic?\n\nCode:\nlet x: u8 = 256;")
        );
    }

    #[test]
    fn test_combine_all_empty_is_none() {
        let parts = SourceKind::ALL.map(|kind| (kind, ""));
        assert_eq!(combine_sources(parts), None);
    }

    #[test]
    fn test_combine_keeps_whitespace_only_parts() {
        let combined = combine_sources([(SourceKind::Context, " "), (SourceKind::Answer, "ok")]);
        assert_eq!(combined.as_deref(), Some(" \n\nok"));
    }

    #[test]
    fn test_element_names_are_unique() {
        let names: HashSet<_> = SourceKind::ALL.iter().map(|k| k.element_name()).collect();
        assert_eq!(names.len(), SourceKind::ALL.len());
        assert!(!SourceKind::Answer.is_editable());
        assert!(SourceKind::Code.is_editable());
    }
}
