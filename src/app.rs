//! Main application state and event loop.

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::info;

use crate::config::Config;
use crate::screens::copy_panel::build_page;
use crate::screens::{CopyPanelScreen, Screen, ScreenAction};
use crate::services::{ArboardClipboard, ClipboardCapability, ClipboardWriter, SystemCopyCommand};

/// Application state.
pub struct App {
    config: Arc<Config>,
    should_quit: bool,

    // Screens
    copy_screen: CopyPanelScreen,

    // Status bar info
    status_message: String,
}

impl App {
    /// Create a new application instance.
    ///
    /// `answer` is the text shown in the read-only answer panel.
    pub fn new(config: Config, answer: Option<String>) -> Result<Self> {
        let config = Arc::new(config);

        // Initialize services
        let document = Arc::new(Mutex::new(build_page(answer)?));
        let primary: Option<Arc<dyn ClipboardCapability>> = if config.clipboard.primary {
            ArboardClipboard::detect().map(|c| Arc::new(c) as Arc<dyn ClipboardCapability>)
        } else {
            None
        };
        let command = Arc::new(SystemCopyCommand::new(config.clipboard.fallback_command.clone()));
        info!(
            primary = primary.is_some(),
            fallback = %command_name(&config),
            "clipboard initialized"
        );
        let writer = Arc::new(ClipboardWriter::new(document.clone(), primary, command));

        // Initialize screens
        let copy_screen =
            CopyPanelScreen::new(document, writer, config.display.feedback_duration());
        let status_message = copy_screen.startup_notice();

        Ok(Self {
            config,
            should_quit: false,
            copy_screen,
            status_message,
        })
    }

    /// Run the application.
    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Main event loop
        let result = self.event_loop(&mut terminal).await;

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    /// Main event loop.
    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        loop {
            // Draw UI
            terminal.draw(|f| self.draw(f))?;

            // Poll for events with timeout, so "Copied!" labels can revert
            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    match (key.modifiers, key.code) {
                        (KeyModifiers::CONTROL, KeyCode::Char('c'))
                        | (KeyModifiers::CONTROL, KeyCode::Char('q'))
                        | (_, KeyCode::Esc) => {
                            self.should_quit = true;
                        }
                        _ => {
                            if let ScreenAction::StatusMessage(msg) =
                                self.copy_screen.handle_key(key).await
                            {
                                self.status_message = msg;
                            }
                        }
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Draw the UI.
    fn draw(&mut self, f: &mut ratatui::Frame) {
        use ratatui::layout::{Constraint, Direction, Layout};
        use ratatui::style::{Color, Modifier, Style};
        use ratatui::text::{Line, Span};
        use ratatui::widgets::{Block, Borders, Paragraph};

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title bar
                Constraint::Min(0),    // Main content
                Constraint::Length(1), // Status bar
            ])
            .split(f.area());

        let title = Paragraph::new(Line::from(Span::styled(
            "Type into a field, copy it with Ctrl+Y",
            Style::default().fg(Color::Gray),
        )))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(
                    self.config.display.title.as_str(),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )),
        );
        f.render_widget(title, chunks[0]);

        // Main content area
        self.copy_screen.draw(f, chunks[1]);

        // Status bar
        let status = Paragraph::new(Line::from(vec![
            Span::raw(" "),
            Span::styled(&self.status_message, Style::default().fg(Color::Gray)),
            Span::raw(" │ "),
            Span::styled("Tab", Style::default().fg(Color::DarkGray)),
            Span::styled(" Next", Style::default().fg(Color::Gray)),
            Span::raw(" │ "),
            Span::styled("^Y", Style::default().fg(Color::DarkGray)),
            Span::styled(" Copy", Style::default().fg(Color::Gray)),
            Span::raw(" │ "),
            Span::styled("^A", Style::default().fg(Color::DarkGray)),
            Span::styled(" Copy all", Style::default().fg(Color::Gray)),
            Span::raw(" │ "),
            Span::styled("Esc", Style::default().fg(Color::DarkGray)),
            Span::styled(" Quit", Style::default().fg(Color::Gray)),
        ]));
        f.render_widget(status, chunks[2]);
    }
}

fn command_name(config: &Config) -> String {
    config
        .clipboard
        .fallback_command
        .as_ref()
        .map(|argv| argv.join(" "))
        .unwrap_or_else(|| "platform default".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_name() {
        let mut config = Config::default();
        assert_eq!(command_name(&config), "platform default");

        config.clipboard.fallback_command = Some(vec!["xclip".into(), "-selection".into(), "clipboard".into()]);
        assert_eq!(command_name(&config), "xclip -selection clipboard");
    }

    #[test]
    fn test_disabled_primary_announces_fallback() {
        let mut config = Config::default();
        config.clipboard.primary = false;
        let app = App::new(config, Some("42".to_string())).unwrap();
        assert_eq!(
            app.status_message,
            "Clipboard access unavailable, copying with the fallback command"
        );
    }
}
