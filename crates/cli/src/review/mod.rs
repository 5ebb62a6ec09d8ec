//! Interactive review of a reconciliation batch.
//!
//! One screen per record: the document on the left, its ranked matches on
//! the right, the pending file name at the bottom. All state changes go
//! through `ReconSession`; this module only maps keys to session calls.

use std::io::stdout;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use retitle_recon::{ConfirmOutcome, ReconSession, ReconciliationRecord};

use crate::util;

/// How the operator left the review screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewExit {
    /// Last record confirmed; the session is ready to finalize.
    Finalize,
    /// Operator quit before finishing.
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Browse,
    /// Editing a copy of the session's edit buffer.
    Edit(String),
}

pub(crate) struct ReviewApp<'a> {
    session: &'a mut ReconSession,
    /// Highlighted row in the current record's match list
    highlight: usize,
    mode: Mode,
    show_help: bool,
    /// One-line feedback shown in the status bar
    message: Option<String>,
    exit: Option<ReviewExit>,
}

impl<'a> ReviewApp<'a> {
    pub(crate) fn new(session: &'a mut ReconSession, notice: Option<String>) -> Self {
        Self {
            session,
            highlight: 0,
            mode: Mode::Browse,
            show_help: false,
            message: notice,
            exit: None,
        }
    }

    pub(crate) fn exit(&self) -> Option<ReviewExit> {
        self.exit
    }

    fn current(&self) -> Option<&ReconciliationRecord> {
        self.session.current()
    }

    fn match_count(&self) -> usize {
        self.current().map(|r| r.matches.len()).unwrap_or(0)
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.exit = Some(ReviewExit::Quit);
            return;
        }
        if self.show_help {
            // Any key dismisses help
            self.show_help = false;
            return;
        }
        match self.mode {
            Mode::Browse => self.handle_browse_key(key),
            Mode::Edit(_) => self.handle_edit_key(key),
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) {
        let result = match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.exit = Some(ReviewExit::Quit);
                Ok(())
            }
            KeyCode::Char('?') => {
                self.show_help = true;
                Ok(())
            }
            KeyCode::Left | KeyCode::Char('p') => {
                self.highlight = 0;
                self.session.previous()
            }
            KeyCode::Right | KeyCode::Char('n') => {
                self.highlight = 0;
                self.session.next()
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.highlight = self.highlight.saturating_sub(1);
                Ok(())
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.highlight + 1 < self.match_count() {
                    self.highlight += 1;
                }
                Ok(())
            }
            KeyCode::Char(' ') => self.toggle_highlighted(),
            KeyCode::Char('e') => {
                self.mode = Mode::Edit(self.session.edit_buffer().to_string());
                Ok(())
            }
            KeyCode::Char('o') => self.session.use_original_name(),
            KeyCode::Char('t') => self.session.use_metadata_title(),
            KeyCode::Enter => self.confirm(),
            _ => Ok(()),
        };
        if let Err(e) = result {
            self.message = Some(e.to_string());
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        let Mode::Edit(input) = &mut self.mode else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.mode = Mode::Browse,
            KeyCode::Enter => {
                let value = std::mem::take(input);
                self.mode = Mode::Browse;
                if let Err(e) = self.session.set_edit_buffer(value) {
                    self.message = Some(e.to_string());
                }
            }
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Char(c) => input.push(c),
            _ => {}
        }
    }

    fn toggle_highlighted(&mut self) -> Result<(), retitle_recon::ReconError> {
        if self.match_count() == 0 {
            return Ok(());
        }
        let selected = self.session.toggle_match(self.highlight)?;
        self.message = Some(if selected { "selected".into() } else { "deselected".into() });
        Ok(())
    }

    fn confirm(&mut self) -> Result<(), retitle_recon::ReconError> {
        match self.session.confirm()? {
            ConfirmOutcome::Committed => {
                let confirmed = self
                    .current()
                    .map(|r| {
                        if r.is_failed() {
                            format!("{} cannot be renamed; skipped", r.source.raw_name)
                        } else {
                            format!("confirmed \"{}\"", r.final_name)
                        }
                    })
                    .unwrap_or_default();
                self.message = Some(confirmed);
            }
            ConfirmOutcome::ReadyToFinalize => self.exit = Some(ReviewExit::Finalize),
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------------

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(6),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(area);

        self.draw_title(frame, chunks[0]);
        let body = Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(chunks[1]);
        self.draw_document(frame, body[0]);
        self.draw_matches(frame, body[1]);
        self.draw_name_input(frame, chunks[2]);
        self.draw_status(frame, chunks[3]);

        if self.show_help {
            self.draw_help(frame, area);
        }
    }

    fn draw_title(&self, frame: &mut Frame, area: Rect) {
        let position = if self.session.is_empty() {
            "no documents".to_string()
        } else {
            format!("document {}/{}", self.session.cursor() + 1, self.session.len())
        };
        let title = format!(
            " retitle: {} | cutoff {} | {} failed ",
            position,
            self.session.policy().cutoff,
            self.session.failures().len()
        );
        let para = Paragraph::new(Line::from(Span::styled(
            title,
            Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD),
        )))
        .style(Style::default().bg(Color::Cyan));
        frame.render_widget(para, area);
    }

    fn draw_document(&self, frame: &mut Frame, area: Rect) {
        let label = Style::default().fg(Color::DarkGray);
        let mut lines = Vec::new();
        if let Some(record) = self.current() {
            let title = if record.source.raw_title.is_empty() {
                "(none)"
            } else {
                record.source.raw_title.as_str()
            };
            lines.push(Line::from(Span::styled("Original filename", label)));
            lines.push(Line::from(record.source.raw_name.clone()));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Metadata title", label)));
            lines.push(Line::from(title.to_string()));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Confirmed name", label)));
            lines.push(Line::from(record.final_name.clone()));
            if let Some(reason) = &record.failure {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    format!("Failed: {}", reason),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )));
            }
        }
        let block = Block::default().borders(Borders::ALL).title(" Document ");
        frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
    }

    fn draw_matches(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title(" Similar names ");
        let Some(record) = self.current() else {
            frame.render_widget(block, area);
            return;
        };
        if record.matches.is_empty() {
            let msg = if record.is_failed() {
                "(document could not be read)"
            } else {
                "No similar filenames found in reference list."
            };
            let para = Paragraph::new(Span::styled(msg, Style::default().fg(Color::Yellow)))
                .block(block);
            frame.render_widget(para, area);
            return;
        }

        // "[x] " + name + " " + bar(10) + " " + "100%"
        let name_width = (area.width as usize).saturating_sub(2 + 4 + 1 + 10 + 1 + 4).max(8);
        let lines: Vec<Line> = record
            .matches
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let mark = if record.is_selected(&m.reference_name) { "[x]" } else { "[ ]" };
                let text = format!(
                    "{} {} {} {:>3}%",
                    mark,
                    util::pad_right(&m.reference_name, name_width),
                    util::score_bar(m.score),
                    m.score
                );
                let style = if i == self.highlight {
                    Style::default().fg(Color::Black).bg(Color::White).add_modifier(Modifier::BOLD)
                } else if record.is_selected(&m.reference_name) {
                    Style::default().fg(Color::Magenta)
                } else {
                    Style::default().fg(Color::Gray)
                };
                Line::from(Span::styled(text, style))
            })
            .collect();
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_name_input(&self, frame: &mut Frame, area: Rect) {
        let (text, title, style) = match &self.mode {
            Mode::Edit(input) => (
                format!("{}_", input),
                " New filename (Enter apply, Esc cancel) ",
                Style::default().fg(Color::Yellow),
            ),
            Mode::Browse => (
                self.session.edit_buffer().to_string(),
                " New filename ",
                Style::default().fg(Color::White),
            ),
        };
        let block = Block::default().borders(Borders::ALL).title(title).border_style(style);
        frame.render_widget(Paragraph::new(text).block(block), area);
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let confirm_label = if self.session.is_last() { "finish" } else { "confirm" };
        let right = format!("Enter: {}  ?: help ", confirm_label);
        let left = format!(" {}", self.message.as_deref().unwrap_or(""));
        let width = area.width as usize;
        let left = util::truncate_display(&left, width.saturating_sub(util::display_width(&right)));
        let padding =
            width.saturating_sub(util::display_width(&left) + util::display_width(&right));
        let status = format!("{}{:pad$}{}", left, "", right, pad = padding);

        let para = Paragraph::new(Line::from(Span::styled(
            status,
            Style::default().fg(Color::Black).bg(Color::DarkGray),
        )))
        .style(Style::default().bg(Color::DarkGray));
        frame.render_widget(para, area);
    }

    fn draw_help(&self, frame: &mut Frame, area: Rect) {
        let help_lines = [
            "",
            "  Records",
            "  -------",
            "  Left  / p         Previous document",
            "  Right / n         Next document",
            "  Enter             Confirm name",
            "",
            "  Matches",
            "  -------",
            "  Up / Down         Highlight match",
            "  Space             Select / deselect",
            "",
            "  Name",
            "  ----",
            "  e                 Edit name",
            "  o                 Use original filename",
            "  t                 Use metadata title",
            "",
            "  q / Esc           Quit without saving",
            "  ?                 Toggle this help",
            "",
        ];
        let help_width: u16 = 44;
        let help_height: u16 = help_lines.len() as u16 + 2;
        let x = area.width.saturating_sub(help_width) / 2;
        let y = area.height.saturating_sub(help_height) / 2;
        let popup = Rect::new(
            area.x + x,
            area.y + y,
            help_width.min(area.width),
            help_height.min(area.height),
        );

        let lines: Vec<Line> = help_lines
            .iter()
            .map(|s| Line::from(Span::styled(*s, Style::default().fg(Color::White))))
            .collect();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Keybindings ")
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .style(Style::default().bg(Color::Black));

        frame.render_widget(Clear, popup);
        frame.render_widget(Paragraph::new(lines).block(block), popup);
    }
}

/// Run the review screen until the operator finishes or quits.
/// `notice` is shown in the status bar on entry (e.g. a failed output attempt).
pub fn run(session: &mut ReconSession, notice: Option<String>) -> Result<ReviewExit, String> {
    terminal::enable_raw_mode().map_err(|e| format!("failed to enable raw mode: {}", e))?;
    stdout()
        .execute(EnterAlternateScreen)
        .map_err(|e| format!("failed to enter alternate screen: {}", e))?;

    struct Cleanup;
    impl Drop for Cleanup {
        fn drop(&mut self) {
            let _ = stdout().execute(LeaveAlternateScreen);
            let _ = terminal::disable_raw_mode();
        }
    }
    let _cleanup = Cleanup;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| format!("failed to create terminal: {}", e))?;
    let mut app = ReviewApp::new(session, notice);

    loop {
        terminal
            .draw(|frame| app.draw(frame))
            .map_err(|e| format!("draw error: {}", e))?;

        if event::poll(Duration::from_millis(100))
            .map_err(|e| format!("event poll error: {}", e))?
        {
            if let Event::Key(key) = event::read().map_err(|e| format!("event read error: {}", e))? {
                app.handle_key(key);
            }
        }

        if let Some(exit) = app.exit() {
            return Ok(exit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use retitle_recon::{
        DocumentError, MatchPolicy, ReferenceCorpus, SessionState, SourceFile, TitleStore,
    };

    /// Content is the title; "!" marks an unreadable document.
    struct PlainStore;

    impl TitleStore for PlainStore {
        fn read_title(&self, content: &[u8]) -> Result<String, DocumentError> {
            match content {
                b"!" => Err(DocumentError::Read("broken".into())),
                _ => Ok(String::from_utf8_lossy(content).into_owned()),
            }
        }

        fn write_title(&self, content: &[u8], _title: &str) -> Result<Vec<u8>, DocumentError> {
            Ok(content.to_vec())
        }
    }

    fn session(files: &[(&str, &str)]) -> ReconSession {
        let files = files
            .iter()
            .map(|(name, title)| SourceFile::new(*name, title.as_bytes().to_vec()))
            .collect();
        let corpus: ReferenceCorpus =
            ["annual_report_2023", "annual_report_2022", "ar2023_en_book", "code_of_conduct"]
                .into_iter()
                .collect();
        let mut s = ReconSession::open(files, corpus, MatchPolicy::default(), &PlainStore);
        s.initialize().unwrap();
        s
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut ReviewApp, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn navigation_is_clamped() {
        let mut s = session(&[("a.pdf", ""), ("b.pdf", "")]);
        let mut app = ReviewApp::new(&mut s, None);
        app.handle_key(key(KeyCode::Left));
        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Char('n')));
        assert_eq!(app.session.cursor(), 1);
        app.handle_key(key(KeyCode::Char('p')));
        assert_eq!(app.session.cursor(), 0);
    }

    #[test]
    fn space_toggles_highlighted_match() {
        let mut s = session(&[("Annual_Report_2023.pdf", "")]);
        let mut app = ReviewApp::new(&mut s, None);
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(app.current().unwrap().selected, vec!["annual_report_2022".to_string()]);
        app.handle_key(key(KeyCode::Char(' ')));
        assert!(app.current().unwrap().selected.is_empty());
    }

    #[test]
    fn highlight_stops_at_last_match() {
        let mut s = session(&[("Annual_Report_2023.pdf", "")]);
        let mut app = ReviewApp::new(&mut s, None);
        for _ in 0..10 {
            app.handle_key(key(KeyCode::Down));
        }
        assert_eq!(app.highlight, app.match_count() - 1);
    }

    #[test]
    fn edit_then_confirm_commits_name() {
        let mut s = session(&[("a.pdf", ""), ("b.pdf", "")]);
        let mut app = ReviewApp::new(&mut s, None);
        app.handle_key(key(KeyCode::Char('e')));
        app.handle_key(key(KeyCode::Backspace));
        type_text(&mut app, "quarterly");
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.mode, Mode::Browse);
        assert_eq!(app.session.edit_buffer(), "quarterly");

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.exit(), None);
        assert_eq!(app.session.records()[0].final_name, "quarterly");
        assert_eq!(app.session.cursor(), 0);
    }

    #[test]
    fn escape_discards_edit() {
        let mut s = session(&[("a.pdf", "")]);
        let mut app = ReviewApp::new(&mut s, None);
        app.handle_key(key(KeyCode::Char('e')));
        type_text(&mut app, "zzz");
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.mode, Mode::Browse);
        assert_eq!(app.session.edit_buffer(), "a");
        assert_eq!(app.exit(), None);
    }

    #[test]
    fn title_and_original_shortcuts() {
        let mut s = session(&[("a.pdf", "Board Minutes")]);
        let mut app = ReviewApp::new(&mut s, None);
        app.handle_key(key(KeyCode::Char('t')));
        assert_eq!(app.session.edit_buffer(), "Board Minutes");
        app.handle_key(key(KeyCode::Char('o')));
        assert_eq!(app.session.edit_buffer(), "a");
    }

    #[test]
    fn confirming_last_record_requests_finalize() {
        let mut s = session(&[("a.pdf", "")]);
        let mut app = ReviewApp::new(&mut s, None);
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.exit(), Some(ReviewExit::Finalize));
        assert_eq!(s.state(), SessionState::Finalizing);
    }

    #[test]
    fn quit_keys() {
        let mut s = session(&[("a.pdf", "")]);
        let mut app = ReviewApp::new(&mut s, None);
        app.handle_key(key(KeyCode::Char('?')));
        app.handle_key(key(KeyCode::Char('q')));
        assert_eq!(app.exit(), None, "first key only dismisses help");
        app.handle_key(key(KeyCode::Char('q')));
        assert_eq!(app.exit(), Some(ReviewExit::Quit));

        let mut app = ReviewApp::new(&mut s, None);
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(app.exit(), Some(ReviewExit::Quit));
    }

    #[test]
    fn draw_shows_record_and_matches() {
        let mut s = session(&[("Annual_Report_2023.pdf", "FY23"), ("broken.pdf", "!")]);
        let app = ReviewApp::new(&mut s, Some("output generation failed".into()));
        let mut terminal = Terminal::new(TestBackend::new(110, 24)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();

        let screen: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains("document 1/2"));
        assert!(screen.contains("Annual_Report_2023.pdf"));
        assert!(screen.contains("FY23"));
        assert!(screen.contains("annual_report_2022"));
        assert!(screen.contains("94%"));
        assert!(screen.contains("output generation failed"));
    }

    #[test]
    fn failed_record_is_flagged() {
        let mut s = session(&[("broken.pdf", "!")]);
        let app = ReviewApp::new(&mut s, None);
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains("could not be read"));
    }
}
