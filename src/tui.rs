// src/tui.rs
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
    Terminal,
};
use crossterm::event::{
    self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crate::app::{App, KeyDisposition};
use crate::session::{Author, Message};
use std::io;
use std::time::Duration;

pub struct Tui {
    terminal: Terminal<ratatui::backend::CrosstermBackend<io::Stdout>>,
}

/// Transcript scroll position, in wrapped rows from the top.
#[derive(Debug, Default)]
struct ViewState {
    scroll: u16,
    seen_revision: u64,
    follow_newest: bool,
}

impl ViewState {
    fn following() -> Self {
        ViewState { follow_newest: true, ..Default::default() }
    }

    /// Any change to the session snaps the view back to the newest message.
    fn observe(&mut self, revision: u64) {
        if revision != self.seen_revision {
            self.seen_revision = revision;
            self.follow_newest = true;
        }
    }

    fn scroll_up(&mut self, rows: u16) {
        self.follow_newest = false;
        self.scroll = self.scroll.saturating_sub(rows);
    }

    fn scroll_down(&mut self, rows: u16) {
        self.scroll = self.scroll.saturating_add(rows);
    }

    /// Reaching the bottom, by following or by scrolling, keeps following.
    fn clamp(&mut self, max_scroll: u16) {
        if self.follow_newest || self.scroll >= max_scroll {
            self.scroll = max_scroll;
            self.follow_newest = true;
        }
    }
}

/// Draft split into display rows, plus where the cursor lands inside the pane.
#[derive(Debug)]
struct InputLayout {
    rows: Vec<String>,
    scroll: u16,
    cursor: (u16, u16),
}

impl Tui {
    pub fn new() -> io::Result<Self> {
        let stdout = io::stdout();
        let backend = ratatui::backend::CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }

    fn message_lines(msg: &Message) -> Vec<Line<'static>> {
        let (who, color) = match msg.author {
            Author::User => ("You", Color::Cyan),
            Author::Assistant => ("Line Drive", Color::Green),
        };
        let time = msg.timestamp.with_timezone(&chrono::Local).format("%H:%M").to_string();

        let mut lines = vec![Line::from(vec![
            Span::styled(time, Style::default().fg(Color::DarkGray)),
            Span::raw("  "),
            Span::styled(format!("{}:", who), Style::default().fg(color).add_modifier(Modifier::BOLD)),
        ])];
        lines.extend(msg.text.split('\n').map(|l| Line::from(l.to_string())));
        lines.push(Line::default());
        lines
    }

    fn transcript_lines(app: &App) -> Vec<Line<'static>> {
        let mut lines: Vec<Line> = app.messages().iter().flat_map(Self::message_lines).collect();
        if app.is_pending() {
            lines.push(Line::from(Span::styled(
                "Thinking...",
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }
        lines
    }

    /// Rows the text takes once word-wrapped at `width`, matching what `Paragraph` renders.
    fn wrapped_height(text: &Text, width: u16) -> u16 {
        let rows = Paragraph::new(text.clone()).wrap(Wrap { trim: false }).line_count(width);
        u16::try_from(rows).unwrap_or(u16::MAX)
    }

    /// Hard-wraps at `width` columns so the cursor position is exact.
    fn hard_wrap(text: &str, width: u16) -> Vec<String> {
        let width = usize::from(width.max(1));
        let mut rows = Vec::new();
        for line in text.split('\n') {
            let mut row = String::new();
            let mut row_width = 0;
            for c in line.chars() {
                let w = Span::raw(c.to_string()).width();
                if row_width + w > width && !row.is_empty() {
                    rows.push(std::mem::take(&mut row));
                    row_width = 0;
                }
                row.push(c);
                row_width += w;
            }
            rows.push(row);
        }
        rows
    }

    fn layout_input(draft: &str, width: u16, height: u16) -> InputLayout {
        let mut rows = Self::hard_wrap(draft, width);
        let last_width = rows.last().map_or(0, |r| Line::from(r.as_str()).width()) as u16;
        let col = if last_width >= width {
            // full row: the cursor continues on the next one
            rows.push(String::new());
            0
        } else {
            last_width
        };
        let cursor_row = rows.len().saturating_sub(1) as u16;
        let scroll = (rows.len() as u16).saturating_sub(height.max(1));
        InputLayout { rows, scroll, cursor: (col, cursor_row - scroll) }
    }

    fn draw(f: &mut Frame, app: &App, view: &mut ViewState) {
        let main_chunks = Layout::default().direction(Direction::Vertical).margin(1)
            .constraints([Constraint::Min(5), Constraint::Length(5)].as_ref())
            .split(f.area());

        let text = Text::from(Self::transcript_lines(app));
        let messages_block = Block::default().borders(Borders::ALL).title("Line Drive AI");
        let inner = messages_block.inner(main_chunks[0]);
        view.clamp(Self::wrapped_height(&text, inner.width).saturating_sub(inner.height));
        let messages_paragraph = Paragraph::new(text)
            .block(messages_block)
            .wrap(Wrap { trim: false })
            .scroll((view.scroll, 0));
        f.render_widget(messages_paragraph, main_chunks[0]);

        let (title, style) = if app.is_pending() {
            ("Waiting for answer...", Style::default().fg(Color::DarkGray))
        } else {
            ("Enter to send, Shift+Enter for newline, Esc to quit", Style::default().fg(Color::White))
        };
        let input_block = Block::default().borders(Borders::ALL).title(title);
        let input_inner = input_block.inner(main_chunks[1]);
        let input = Self::layout_input(app.draft(), input_inner.width, input_inner.height);
        let input_lines: Vec<Line> = input.rows.into_iter().map(Line::from).collect();
        let input_paragraph = Paragraph::new(Text::from(input_lines))
            .style(style)
            .block(input_block)
            .scroll((input.scroll, 0));
        f.render_widget(input_paragraph, main_chunks[1]);

        if !app.is_pending() && input_inner.width > 0 && input_inner.height > 0 {
            let (col, row) = input.cursor;
            f.set_cursor_position((input_inner.x + col, input_inner.y + row));
        }
    }

    /// Applies one key press. Returns true when the user asked to quit.
    fn handle_key(app: &mut App, view: &mut ViewState, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc => return true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Enter => {
                let shift_held = key.modifiers.contains(KeyModifiers::SHIFT);
                if app.on_key_commit(KeyCode::Enter, shift_held) == KeyDisposition::PassThrough {
                    let draft = format!("{}\n", app.draft());
                    app.update_draft(draft);
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                let draft = format!("{}{}", app.draft(), c);
                app.update_draft(draft);
            }
            KeyCode::Backspace => {
                let mut draft = app.draft().to_string();
                draft.pop();
                app.update_draft(draft);
            }
            KeyCode::Up => view.scroll_up(1),
            KeyCode::PageUp => view.scroll_up(10),
            KeyCode::Down => view.scroll_down(1),
            KeyCode::PageDown => view.scroll_down(10),
            _ => {}
        }
        false
    }

    pub async fn run_loop(&mut self, app: &mut App) -> io::Result<()> {
        crossterm::terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
        // Shift+Enter is only distinguishable from Enter with enhanced key reporting
        let enhanced_keys = crossterm::terminal::supports_keyboard_enhancement().unwrap_or(false);
        if enhanced_keys {
            crossterm::execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
            )?;
        }
        log::info!("TUI run loop started (enhanced keys: {}).", enhanced_keys);

        let result = self.event_loop(app).await;

        if enhanced_keys {
            crossterm::execute!(self.terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
        }
        crossterm::terminal::disable_raw_mode()?;
        crossterm::execute!(self.terminal.backend_mut(), crossterm::terminal::LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        result
    }

    async fn event_loop(&mut self, app: &mut App) -> io::Result<()> {
        let mut view = ViewState::following();

        loop {
            app.poll_settled();
            view.observe(app.revision());

            self.terminal.draw(|f| Self::draw(f, app, &mut view))?;

            if !crossterm::event::poll(Duration::from_millis(100))? {
                // let the answer task make progress between ticks
                tokio::task::yield_now().await;
                continue;
            }
            let CrosstermEvent::Key(key) = event::read()? else { continue };
            if key.kind == KeyEventKind::Press && Self::handle_key(app, &mut view, key) {
                break;
            }
        }
        log::info!("Exiting TUI loop.");
        Ok(())
    }
}
