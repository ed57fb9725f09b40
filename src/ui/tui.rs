// SPDX-License-Identifier: MIT
// Interactive terminal front-end.
//
// Renders the three views side by side: the task list on the left, the
// creation form and (when visible) the edit panel on the right. Keyboard
// input runs on a blocking reader thread; HTTP responses arrive as UiEvents.
// Both feed one select loop so all state changes happen in a single place.
//
// Keys:
//   list   — ↑/↓ or j/k move, Enter/e edit, n new task, r reload, q quit
//   create — Tab next field, Enter submit, Esc back to list
//   edit   — Tab next field, Enter save, Ctrl-D delete, Esc cancel

use anyhow::{Context as _, Result};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table, TableState};
use ratatui::{Frame, Terminal};
use std::io::Stdout;
use tokio::sync::mpsc;

use crate::client::TaskClient;
use crate::config::AppConfig;
use crate::ui::{App, UiEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Description,
    Status,
}

/// Which pane owns keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    List,
    Create(Field),
    Edit(Field),
}

/// Text buffers backing the two forms. The view controllers hold records;
/// these hold the in-progress keystrokes until submit.
#[derive(Default)]
struct FormBuffers {
    create_title: String,
    create_description: String,
    edit_title: String,
    edit_description: String,
    edit_status: String,
}

struct Tui {
    app: App,
    focus: Focus,
    buffers: FormBuffers,
    table_state: TableState,
}

/// Entry point for `taskpad ui`.
pub async fn run_tui(config: &AppConfig) -> Result<()> {
    let client = TaskClient::new(config.server_url.clone());
    let (app, ui_rx) = App::with_channel(client);

    enable_raw_mode().context("could not enable raw terminal mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = Tui::new(app).run(&mut terminal, ui_rx).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

impl Tui {
    fn new(app: App) -> Self {
        Self {
            app,
            focus: Focus::List,
            buffers: FormBuffers::default(),
            table_state: TableState::default(),
        }
    }

    async fn run(
        mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
        mut ui_rx: mpsc::UnboundedReceiver<UiEvent>,
    ) -> Result<()> {
        // Blocking reader thread: crossterm events → channel.
        let (input_tx, mut input_rx) = mpsc::unbounded_channel();
        std::thread::spawn(move || loop {
            match crossterm::event::read() {
                Ok(event) => {
                    if input_tx.send(event).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        });

        // Initial load runs once automatically.
        self.app.reload_list();
        terminal.draw(|f| self.draw(f))?;

        loop {
            tokio::select! {
                Some(event) = ui_rx.recv() => self.on_ui_event(event),
                Some(input) = input_rx.recv() => {
                    if self.on_input(input) {
                        return Ok(());
                    }
                }
                else => return Ok(()),
            }
            terminal.draw(|f| self.draw(f))?;
        }
    }

    // ─── Event handling ───────────────────────────────────────────────────────

    fn on_ui_event(&mut self, event: UiEvent) {
        let is_task_loaded = matches!(event, UiEvent::TaskLoaded { .. });
        let is_create_finished = matches!(event, UiEvent::CreateFinished { .. });

        self.app.handle(event);

        // Editor became visible: mirror the loaded record into the buffers.
        if is_task_loaded && self.app.edit.visible {
            self.buffers.edit_title = self.app.edit.task.text("title").to_owned();
            self.buffers.edit_description = self.app.edit.task.text("description").to_owned();
            self.buffers.edit_status = self.app.edit.task.text("status").to_owned();
            self.focus = Focus::Edit(Field::Title);
        }

        // Draft accepted: clear the form.
        if is_create_finished && self.app.create.draft.is_empty() && self.app.create.errors.is_empty()
        {
            self.buffers.create_title.clear();
            self.buffers.create_description.clear();
        }

        // Panel closed underneath us (saved or deleted) — drop focus back.
        if matches!(self.focus, Focus::Edit(_)) && !self.app.edit.visible && !self.app.edit.busy {
            self.focus = Focus::List;
        }

        self.table_state.select(if self.app.list.tasks.is_empty() {
            None
        } else {
            Some(self.app.list.selected)
        });
    }

    /// Returns `true` when the user quit.
    fn on_input(&mut self, event: Event) -> bool {
        let Event::Key(key) = event else {
            return false;
        };
        if key.kind != KeyEventKind::Press {
            return false;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }

        match self.focus {
            Focus::List => self.on_list_key(key),
            Focus::Create(field) => {
                self.on_create_key(key, field);
                false
            }
            Focus::Edit(field) => {
                self.on_edit_key(key, field);
                false
            }
        }
    }

    fn on_list_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('r') => self.app.reload_list(),
            KeyCode::Char('n') => self.focus = Focus::Create(Field::Title),
            KeyCode::Up | KeyCode::Char('k') => {
                self.app.list.select_prev();
                self.sync_cursor();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.app.list.select_next();
                self.sync_cursor();
            }
            KeyCode::Enter | KeyCode::Char('e') => {
                if let Some(id) = self.app.list.selected_id() {
                    self.app.open_editor(id);
                }
            }
            _ => {}
        }
        false
    }

    fn on_create_key(&mut self, key: KeyEvent, field: Field) {
        match key.code {
            KeyCode::Esc => self.focus = Focus::List,
            KeyCode::Tab => {
                self.focus = Focus::Create(match field {
                    Field::Title => Field::Description,
                    _ => Field::Title,
                });
            }
            KeyCode::Enter => {
                // Empty fields are left out of the draft so the server
                // reports them as missing rather than too short.
                let draft = &mut self.app.create.draft;
                draft.clear();
                if !self.buffers.create_title.is_empty() {
                    draft.set("title", self.buffers.create_title.clone());
                }
                if !self.buffers.create_description.is_empty() {
                    draft.set("description", self.buffers.create_description.clone());
                }
                self.app.submit_create();
            }
            KeyCode::Backspace => {
                self.create_buffer(field).pop();
            }
            KeyCode::Char(c) => {
                self.create_buffer(field).push(c);
            }
            _ => {}
        }
    }

    fn on_edit_key(&mut self, key: KeyEvent, field: Field) {
        if key.code == KeyCode::Char('d') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.app.delete_current();
            return;
        }
        match key.code {
            KeyCode::Esc => {
                self.app.cancel_edit();
                self.focus = Focus::List;
            }
            KeyCode::Tab => {
                self.focus = Focus::Edit(match field {
                    Field::Title => Field::Description,
                    Field::Description => Field::Status,
                    Field::Status => Field::Title,
                });
            }
            KeyCode::Enter => {
                let task = &mut self.app.edit.task;
                task.set("title", self.buffers.edit_title.clone());
                task.set("description", self.buffers.edit_description.clone());
                task.set("status", self.buffers.edit_status.clone());
                self.app.submit_edit();
            }
            KeyCode::Backspace => {
                self.edit_buffer(field).pop();
            }
            KeyCode::Char(c) => {
                self.edit_buffer(field).push(c);
            }
            _ => {}
        }
    }

    fn create_buffer(&mut self, field: Field) -> &mut String {
        match field {
            Field::Description => &mut self.buffers.create_description,
            _ => &mut self.buffers.create_title,
        }
    }

    fn edit_buffer(&mut self, field: Field) -> &mut String {
        match field {
            Field::Title => &mut self.buffers.edit_title,
            Field::Description => &mut self.buffers.edit_description,
            Field::Status => &mut self.buffers.edit_status,
        }
    }

    fn sync_cursor(&mut self) {
        if !self.app.list.tasks.is_empty() {
            self.table_state.select(Some(self.app.list.selected));
        }
    }

    // ─── Rendering ────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut Frame) {
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(1)])
            .split(frame.area());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(outer[0]);

        self.draw_list(frame, columns[0]);

        if self.app.edit.visible {
            let right = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(7), Constraint::Min(8)])
                .split(columns[1]);
            self.draw_create(frame, right[0]);
            self.draw_edit(frame, right[1]);
        } else {
            self.draw_create(frame, columns[1]);
        }

        self.draw_status_line(frame, outer[1]);
    }

    fn draw_list(&mut self, frame: &mut Frame, area: Rect) {
        let title = if self.app.list.loading {
            " Tasks (loading…) "
        } else {
            " Tasks "
        };

        let rows: Vec<Row> = self
            .app
            .list
            .tasks
            .iter()
            .map(|t| {
                Row::new(vec![
                    t.id().map(|id| id.to_string()).unwrap_or_default(),
                    t.text("title").to_owned(),
                    t.text("status").to_owned(),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(6),
                Constraint::Min(20),
                Constraint::Length(12),
            ],
        )
        .header(Row::new(vec!["ID", "Title", "Status"]).style(Style::default().add_modifier(Modifier::BOLD)))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(self.pane_style(matches!(self.focus, Focus::List))),
        );

        frame.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn draw_create(&self, frame: &mut Frame, area: Rect) {
        let focused_field = match self.focus {
            Focus::Create(f) => Some(f),
            _ => None,
        };

        let mut lines = Vec::new();
        push_field_lines(
            &mut lines,
            "Title",
            &self.buffers.create_title,
            focused_field == Some(Field::Title),
            self.app.create.errors.get("title"),
        );
        push_field_lines(
            &mut lines,
            "Description",
            &self.buffers.create_description,
            focused_field == Some(Field::Description),
            self.app.create.errors.get("description"),
        );
        if self.app.create.submitting {
            lines.push(Line::from(Span::styled(
                "submitting…",
                Style::default().fg(Color::Yellow),
            )));
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" New task ")
            .border_style(self.pane_style(focused_field.is_some()));
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_edit(&self, frame: &mut Frame, area: Rect) {
        let focused_field = match self.focus {
            Focus::Edit(f) => Some(f),
            _ => None,
        };

        let id = self.app.edit.task.id().unwrap_or_default();
        let mut lines = Vec::new();
        push_field_lines(
            &mut lines,
            "Title",
            &self.buffers.edit_title,
            focused_field == Some(Field::Title),
            self.app.edit.errors.get("title"),
        );
        push_field_lines(
            &mut lines,
            "Description",
            &self.buffers.edit_description,
            focused_field == Some(Field::Description),
            self.app.edit.errors.get("description"),
        );
        push_field_lines(
            &mut lines,
            "Status",
            &self.buffers.edit_status,
            focused_field == Some(Field::Status),
            self.app.edit.errors.get("status"),
        );
        if self.app.edit.busy {
            lines.push(Line::from(Span::styled(
                "working…",
                Style::default().fg(Color::Yellow),
            )));
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" Edit task {id} "))
            .border_style(self.pane_style(focused_field.is_some()));
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_status_line(&self, frame: &mut Frame, area: Rect) {
        let line = if let Some(err) = &self.app.last_error {
            Line::from(Span::styled(
                err.clone(),
                Style::default().fg(Color::Red),
            ))
        } else {
            let hint = match self.focus {
                Focus::List => "↑/↓ move · Enter edit · n new · r reload · q quit",
                Focus::Create(_) => "Tab next field · Enter submit · Esc back",
                Focus::Edit(_) => "Tab next field · Enter save · Ctrl-D delete · Esc cancel",
            };
            Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray)))
        };
        frame.render_widget(Paragraph::new(line), area);
    }

    fn pane_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        }
    }
}

fn push_field_lines(
    lines: &mut Vec<Line<'static>>,
    label: &str,
    value: &str,
    focused: bool,
    error: Option<&String>,
) {
    let marker = if focused { "▸ " } else { "  " };
    let style = if focused {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    lines.push(Line::from(Span::styled(
        format!("{marker}{label}: {value}"),
        style,
    )));
    if let Some(message) = error {
        lines.push(Line::from(Span::styled(
            format!("    {message}"),
            Style::default().fg(Color::Red),
        )));
    }
}
