//! In-memory UI tree backing the copy screen.
//!
//! Holds the fields and panels the user sees, plus which element has focus
//! and what is selected. The clipboard fallback borrows this tree to stage a
//! temporary off-screen field, so every mutation keeps focus and selection
//! consistent with the set of attached elements.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// Document shared between the screen and the clipboard writer.
pub type SharedDocument = Arc<Mutex<Document>>;

/// Lock a shared document, recovering from a poisoned lock.
pub fn lock(document: &Mutex<Document>) -> MutexGuard<'_, Document> {
    document.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Stable handle to an element, valid while it stays attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(u64);

/// Where an element is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Visible,
    /// Attached but outside the viewport; never drawn.
    OffScreen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    /// Text input. `value` is the live contents.
    Field {
        value: String,
        default_value: String,
        read_only: bool,
    },
    /// Non-editable container. `text` is `None` until something is rendered.
    Panel { text: Option<String> },
}

/// A single node of the document.
#[derive(Debug, Clone)]
pub struct Element {
    id: ElementId,
    name: String,
    label: String,
    kind: ElementKind,
    placement: Placement,
}

impl Element {
    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Whether the element is an input-like field (read-only fields included).
    pub fn is_field(&self) -> bool {
        matches!(self.kind, ElementKind::Field { .. })
    }

    /// Whether the user can type into the element.
    pub fn is_editable(&self) -> bool {
        matches!(self.kind, ElementKind::Field { read_only: false, .. })
    }

    /// Live value of a field.
    pub fn value(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Field { value, .. } => Some(value),
            ElementKind::Panel { .. } => None,
        }
    }

    /// Mutable value of an editable field.
    pub fn value_mut(&mut self) -> Option<&mut String> {
        match &mut self.kind {
            ElementKind::Field {
                value,
                read_only: false,
                ..
            } => Some(value),
            _ => None,
        }
    }

    /// Rendered text of a panel, if any has been rendered.
    pub fn rendered_text(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Panel { text } => text.as_deref(),
            ElementKind::Field { .. } => None,
        }
    }
}

/// Errors raised by invalid tree operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("an element named '{0}' is already attached")]
    DuplicateName(String),
    #[error("element is already attached")]
    AlreadyAttached,
    #[error("element is not attached to the document")]
    Detached,
    #[error("element '{0}' cannot take focus")]
    NotFocusable(String),
}

/// Byte range selected inside a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub element: ElementId,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Default)]
pub struct Document {
    elements: Vec<Element>,
    next_id: u64,
    focused: Option<ElementId>,
    selection: Option<Selection>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self, name: &str, label: &str, kind: ElementKind, placement: Placement) -> Element {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        Element {
            id,
            name: name.to_string(),
            label: label.to_string(),
            kind,
            placement,
        }
    }

    /// Create a detached editable field.
    pub fn create_field(&mut self, name: &str, label: &str, value: &str) -> Element {
        let kind = ElementKind::Field {
            value: value.to_string(),
            default_value: value.to_string(),
            read_only: false,
        };
        self.allocate(name, label, kind, Placement::Visible)
    }

    /// Create a detached panel.
    pub fn create_panel(&mut self, name: &str, label: &str, text: Option<String>) -> Element {
        self.allocate(name, label, ElementKind::Panel { text }, Placement::Visible)
    }

    /// Create a detached, nameless, editable field laid out off-screen.
    pub fn create_scratch_field(&mut self, value: &str) -> Element {
        let kind = ElementKind::Field {
            value: value.to_string(),
            default_value: value.to_string(),
            read_only: false,
        };
        self.allocate("", "", kind, Placement::OffScreen)
    }

    /// Attach an element at the end of the document.
    ///
    /// Named elements must be unique; nameless ones may repeat.
    pub fn append(&mut self, element: Element) -> Result<ElementId, DocumentError> {
        if self.contains(element.id) {
            return Err(DocumentError::AlreadyAttached);
        }
        if !element.name.is_empty() && self.find(&element.name).is_some() {
            return Err(DocumentError::DuplicateName(element.name));
        }
        let id = element.id;
        self.elements.push(element);
        Ok(id)
    }

    /// Detach an element, dropping focus and selection that pointed at it.
    pub fn remove(&mut self, id: ElementId) -> Option<Element> {
        let index = self.elements.iter().position(|e| e.id == id)?;
        if self.focused == Some(id) {
            self.focused = None;
        }
        if self.selection.is_some_and(|s| s.element == id) {
            self.selection = None;
        }
        Some(self.elements.remove(index))
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.iter().any(|e| e.id == id)
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Look up an attached element by name.
    pub fn find(&self, name: &str) -> Option<&Element> {
        if name.is_empty() {
            return None;
        }
        self.elements.iter().find(|e| e.name == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Element> {
        if name.is_empty() {
            return None;
        }
        self.elements.iter_mut().find(|e| e.name == name)
    }

    /// All attached elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    /// Attached elements that are laid out inside the viewport.
    pub fn visible(&self) -> impl Iterator<Item = &Element> {
        self.elements().filter(|e| e.placement() == Placement::Visible)
    }

    pub fn focused(&self) -> Option<ElementId> {
        self.focused
    }

    /// Give input focus to a field. Moving focus clears the selection.
    pub fn focus(&mut self, id: ElementId) -> Result<(), DocumentError> {
        let element = self.get(id).ok_or(DocumentError::Detached)?;
        if !element.is_field() {
            return Err(DocumentError::NotFocusable(element.name.clone()));
        }
        if self.focused != Some(id) {
            self.selection = None;
        }
        self.focused = Some(id);
        Ok(())
    }

    pub fn blur(&mut self) {
        self.focused = None;
        self.selection = None;
    }

    /// Select the whole value of a field.
    pub fn select_all(&mut self, id: ElementId) -> Result<(), DocumentError> {
        let element = self.get(id).ok_or(DocumentError::Detached)?;
        let value = element
            .value()
            .ok_or_else(|| DocumentError::NotFocusable(element.name.clone()))?;
        self.selection = Some(Selection {
            element: id,
            start: 0,
            end: value.len(),
        });
        Ok(())
    }

    /// Text of the current selection, provided its field still has focus.
    pub fn selected_text(&self) -> Option<&str> {
        let selection = self.selection?;
        if self.focused != Some(selection.element) {
            return None;
        }
        self.get(selection.element)?
            .value()?
            .get(selection.start..selection.end)
    }
}

#[cfg(test)]
impl Element {
    /// Replace the rendered text of a panel. No-op for fields.
    pub fn set_rendered_text(&mut self, new_text: Option<String>) {
        if let ElementKind::Panel { text } = &mut self.kind {
            *text = new_text;
        }
    }
}

#[cfg(test)]
impl Document {
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }
}
