//! Reads the current text of an element.

use crate::models::{Document, ElementKind};

/// Current text of the element named `source`.
///
/// Fields yield their live value, panels their rendered text. A missing
/// element or a panel with nothing rendered yields an empty string.
pub fn extract_text(document: &Document, source: &str) -> String {
    let Some(element) = document.find(source) else {
        return String::new();
    };

    match element.kind() {
        ElementKind::Field { value, .. } => value.clone(),
        ElementKind::Panel { text } => text.clone().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_yields_value() {
        let mut doc = Document::new();
        let field = doc.create_field("greeting", "Greeting", "hello");
        doc.append(field).unwrap();
        assert_eq!(extract_text(&doc, "greeting"), "hello");
    }

    #[test]
    fn test_field_yields_live_value_not_default() {
        let mut doc = Document::new();
        let field = doc.create_field("greeting", "Greeting", "hello");
        doc.append(field).unwrap();
        doc.find_mut("greeting").unwrap().value_mut().unwrap().push_str(", world");

        assert_eq!(extract_text(&doc, "greeting"), "hello, world");
    }

    #[test]
    fn test_panel_yields_rendered_text() {
        let mut doc = Document::new();
        let panel = doc.create_panel("out", "Out", Some("world".to_string()));
        doc.append(panel).unwrap();
        assert_eq!(extract_text(&doc, "out"), "world");

        doc.find_mut("out").unwrap().set_rendered_text(None);
        assert_eq!(extract_text(&doc, "out"), "");
    }

    #[test]
    fn test_missing_element_yields_empty_string() {
        let doc = Document::new();
        assert_eq!(extract_text(&doc, "nope"), "");
        assert_eq!(extract_text(&doc, ""), "");
    }

    #[test]
    fn test_reads_again_on_every_call() {
        let mut doc = Document::new();
        let field = doc.create_field("f", "F", "a");
        doc.append(field).unwrap();
        assert_eq!(extract_text(&doc, "f"), "a");

        *doc.find_mut("f").unwrap().value_mut().unwrap() = "b".to_string();
        assert_eq!(extract_text(&doc, "f"), "b");
    }
}
