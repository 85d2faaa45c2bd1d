//! Copy screen - the four sources, their copy buttons and "copy all".

use anyhow::Result;
use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use ratatui_garnish::{shadow::HalfShadow, GarnishableWidget, Padding};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::models::document::{self, Document, SharedDocument};
use crate::models::{combine_sources, CopyOutcome, SourceKind};
use crate::services::{extract_text, ClipboardWriter};

use super::{Screen, ScreenAction};

const IDLE_LABEL: &str = "Copy";
const COPIED_LABEL: &str = "Copied!";
const FAILED_LABEL: &str = "Failed";

/// Build the page: three editable fields and the answer panel.
pub fn build_page(answer: Option<String>) -> Result<Document> {
    let mut doc = Document::new();
    for kind in SourceKind::ALL {
        let element = if kind.is_editable() {
            doc.create_field(kind.element_name(), kind.label(), "")
        } else {
            doc.create_panel(kind.element_name(), kind.label(), answer.clone())
        };
        doc.append(element)?;
    }
    Ok(doc)
}

/// Something a copy button acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyTarget {
    Source(SourceKind),
    All,
}

impl CopyTarget {
    fn describe(self) -> &'static str {
        match self {
            CopyTarget::Source(kind) => kind.label(),
            CopyTarget::All => "all sources",
        }
    }
}

/// Temporary button label after a copy.
#[derive(Debug, Clone, Copy)]
struct Feedback {
    target: CopyTarget,
    label: &'static str,
    until: Instant,
}

/// Screen for editing sources and copying them.
pub struct CopyPanelScreen {
    document: SharedDocument,
    writer: Arc<ClipboardWriter>,
    feedback_duration: Duration,

    // UI state
    focus: CopyTarget,
    feedback: Option<Feedback>,
}

impl CopyPanelScreen {
    /// Create a new copy screen.
    pub fn new(document: SharedDocument, writer: Arc<ClipboardWriter>, feedback_duration: Duration) -> Self {
        let screen = Self {
            document,
            writer,
            feedback_duration,
            focus: CopyTarget::Source(SourceKind::ALL[0]),
            feedback: None,
        };
        screen.sync_document_focus();
        screen
    }

    /// Status line shown at start-up.
    pub fn startup_notice(&self) -> String {
        if self.writer.has_primary() {
            "Ready".to_string()
        } else {
            "Clipboard access unavailable, copying with the fallback command".to_string()
        }
    }

    /// Label of a target's copy button at `now`.
    pub fn button_label(&self, target: CopyTarget, now: Instant) -> &'static str {
        match self.feedback {
            Some(f) if f.target == target && now < f.until => f.label,
            _ => IDLE_LABEL,
        }
    }

    /// Drop expired feedback.
    pub fn tick(&mut self, now: Instant) {
        if self.feedback.is_some_and(|f| now >= f.until) {
            self.feedback = None;
        }
    }

    fn focus_order() -> Vec<CopyTarget> {
        SourceKind::ALL
            .iter()
            .map(|&kind| CopyTarget::Source(kind))
            .chain(std::iter::once(CopyTarget::All))
            .collect()
    }

    fn move_focus(&mut self, forward: bool) {
        let order = Self::focus_order();
        let current = order.iter().position(|&t| t == self.focus).unwrap_or(0);
        let next = if forward {
            (current + 1) % order.len()
        } else {
            (current + order.len() - 1) % order.len()
        };
        self.focus = order[next];
        self.sync_document_focus();
    }

    /// Mirror the screen focus into the document: editable fields take
    /// input focus, everything else blurs.
    fn sync_document_focus(&self) {
        let mut doc = document::lock(&self.document);
        let id = match self.focus {
            CopyTarget::Source(kind) => doc
                .find(kind.element_name())
                .filter(|e| e.is_editable())
                .map(|e| e.id()),
            CopyTarget::All => None,
        };
        match id {
            Some(id) => {
                if doc.focus(id).is_err() {
                    doc.blur();
                }
            }
            None => doc.blur(),
        }
    }

    /// Apply `edit` to the focused editable field, if any.
    fn edit_focused(&self, edit: impl FnOnce(&mut String)) {
        let CopyTarget::Source(kind) = self.focus else {
            return;
        };
        let mut doc = document::lock(&self.document);
        if let Some(value) = doc
            .find_mut(kind.element_name())
            .and_then(|e| e.value_mut())
        {
            edit(value);
        }
    }

    /// Text for a single source. `None` when the element is not on the page.
    fn source_text(&self, kind: SourceKind) -> Option<String> {
        let doc = document::lock(&self.document);
        doc.find(kind.element_name())
            .map(|_| extract_text(&doc, kind.element_name()))
    }

    /// Joined text of all non-empty sources.
    fn combined_text(&self) -> Option<String> {
        let texts: Vec<(SourceKind, String)> = {
            let doc = document::lock(&self.document);
            SourceKind::ALL
                .iter()
                .map(|&kind| (kind, extract_text(&doc, kind.element_name())))
                .collect()
        };
        combine_sources(texts.iter().map(|(kind, text)| (*kind, text.as_str())))
    }

    async fn copy(&mut self, target: CopyTarget) -> ScreenAction {
        let text = match target {
            CopyTarget::Source(kind) => self.source_text(kind),
            CopyTarget::All => self.combined_text(),
        };
        let outcome = self.writer.copy(text.as_deref()).await;
        self.report(target, &outcome, Instant::now())
    }

    fn report(&mut self, target: CopyTarget, outcome: &CopyOutcome, now: Instant) -> ScreenAction {
        let (label, message) = if outcome.is_success() {
            (COPIED_LABEL, format!("Copied {}", target.describe()))
        } else {
            let reason = outcome.message().unwrap_or("unknown error");
            (FAILED_LABEL, format!("Copy failed: {}", reason))
        };
        self.feedback = Some(Feedback {
            target,
            label,
            until: now + self.feedback_duration,
        });
        ScreenAction::StatusMessage(message)
    }

    fn border_style(&self, target: CopyTarget) -> Style {
        if self.focus == target {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    }
}

#[async_trait]
impl Screen for CopyPanelScreen {
    fn draw(&mut self, f: &mut Frame, area: Rect) {
        let now = Instant::now();
        self.tick(now);

        // Snapshot what is on screen so the lock is not held while rendering
        let visible: Vec<(Option<SourceKind>, String, Option<String>, bool)> = {
            let doc = document::lock(&self.document);
            doc.visible()
                .map(|e| {
                    let kind = SourceKind::ALL
                        .iter()
                        .copied()
                        .find(|k| k.element_name() == e.name());
                    let text = e
                        .value()
                        .map(str::to_string)
                        .or_else(|| e.rendered_text().map(str::to_string));
                    (kind, e.label().to_string(), text, e.is_field())
                })
                .collect()
        };

        let mut constraints: Vec<Constraint> = visible
            .iter()
            .map(|(kind, ..)| match kind {
                Some(SourceKind::Question) => Constraint::Length(3),
                _ => Constraint::Min(4),
            })
            .collect();
        constraints.push(Constraint::Length(3));

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        for (i, (kind, label, text, is_field)) in visible.into_iter().enumerate() {
            let target = kind.map(CopyTarget::Source);
            let focused = target == Some(self.focus);
            let button = target
                .map(|t| format!(" [{}]", self.button_label(t, now)))
                .unwrap_or_default();

            let block = Block::default()
                .borders(Borders::ALL)
                .title(format!("{}{}", label, button))
                .border_style(match target {
                    Some(t) => self.border_style(t),
                    None => Style::default().fg(Color::DarkGray),
                });

            let body: Text = match text {
                Some(text) if is_field && focused => Line::from(vec![
                    Span::raw(text),
                    Span::styled("▏", Style::default().fg(Color::Cyan)),
                ])
                .into(),
                Some(text) => Text::from(text),
                None => Text::styled(
                    "(nothing rendered)",
                    Style::default().fg(Color::DarkGray),
                ),
            };

            let paragraph = Paragraph::new(body)
                .block(block)
                .wrap(Wrap { trim: false });

            // Add shadow effect when focused
            if focused {
                let garnished = paragraph
                    .garnish(Padding::horizontal(1))
                    .garnish(HalfShadow::default());
                f.render_widget(garnished, chunks[i]);
            } else {
                f.render_widget(paragraph, chunks[i]);
            }
        }

        let all_label = self.button_label(CopyTarget::All, now);
        let button = Paragraph::new(Line::from(vec![
            Span::styled(
                "Copy all",
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(all_label, Style::default().fg(Color::Gray)),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(self.border_style(CopyTarget::All)),
        );
        let last = chunks.len() - 1;
        f.render_widget(button, chunks[last]);
    }

    async fn handle_key(&mut self, key: KeyEvent) -> ScreenAction {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Tab => {
                self.move_focus(true);
                ScreenAction::None
            }
            KeyCode::BackTab => {
                self.move_focus(false);
                ScreenAction::None
            }
            KeyCode::Char('y') if ctrl => self.copy(self.focus).await,
            KeyCode::Char('a') if ctrl => self.copy(CopyTarget::All).await,
            KeyCode::Enter => match self.focus {
                CopyTarget::Source(kind) if kind.is_editable() => {
                    self.edit_focused(|value| value.push('\n'));
                    ScreenAction::None
                }
                target => self.copy(target).await,
            },
            KeyCode::Backspace => {
                self.edit_focused(|value| {
                    value.pop();
                });
                ScreenAction::None
            }
            KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                self.edit_focused(|value| value.push(c));
                ScreenAction::None
            }
            _ => ScreenAction::None,
        }
    }
}
