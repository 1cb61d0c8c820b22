//! Main application logic for the terminal user interface.
//!
//! `App` turns key presses into controller calls and draws the list view.
//! Key handling is synchronous and returns an [`Intent`] when a request must
//! go to the server; the event loop shows a busy line, redraws, and awaits
//! the controller before reading the next key, so at most one request is in
//! flight at a time.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap},
    Frame, Terminal,
};

use crate::api::TaskApi;
use crate::controller::{Outcome, TaskListController};
use crate::fields::{Filter, Theme};
use crate::prefs::PreferenceStore;
use crate::task::{Task, TaskId};
use crate::tui::{
    colors::{Palette, ACCENT, AMBER, COMPLETED_TEXT, DANGER, SLATE, SUCCESS},
    enums::{AppState, Intent},
    input::InputField,
    utils::centered_rect,
};
use crate::view::{checkbox, project, ListView, RowView};

/// Terminal front-end over a [`TaskListController`].
pub struct App<A: TaskApi, P: PreferenceStore> {
    controller: TaskListController<A, P>,
    state: AppState,
    list_state: TableState,
    add_input: InputField,
    edit_input: InputField,
    status_message: String,
    busy: Option<&'static str>,
}

impl<A: TaskApi, P: PreferenceStore> App<A, P> {
    pub fn new(controller: TaskListController<A, P>) -> Self {
        App {
            controller,
            state: AppState::TaskList,
            list_state: TableState::default(),
            add_input: InputField::new(),
            edit_input: InputField::new(),
            status_message: String::new(),
            busy: None,
        }
    }

    pub fn controller(&self) -> &TaskListController<A, P> {
        &self.controller
    }

    /// Load preferences and the first page of tasks.
    pub async fn start(&mut self) {
        self.controller.initialize().await;
        self.clamp_selection();
    }

    fn selected_task(&self) -> Option<&Task> {
        let idx = self.list_state.selected()?;
        self.controller.filtered_tasks().get(idx).copied()
    }

    fn selected_id(&self) -> Option<TaskId> {
        self.selected_task().map(|t| t.id.clone())
    }

    /// Keep the selection inside the visible rows.
    fn clamp_selection(&mut self) {
        let len = self.controller.filtered_tasks().len();
        match self.list_state.selected() {
            _ if len == 0 => self.list_state.select(None),
            Some(i) if i >= len => self.list_state.select(Some(len - 1)),
            None => self.list_state.select(Some(0)),
            Some(_) => {}
        }
    }

    fn move_selection(&mut self, down: bool) {
        let len = self.controller.filtered_tasks().len();
        if len == 0 {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0);
        let next = if down {
            (current + 1).min(len - 1)
        } else {
            current.saturating_sub(1)
        };
        self.list_state.select(Some(next));
    }

    fn set_filter(&mut self, filter: Filter) {
        self.controller.set_filter(filter);
        self.list_state.select(None);
        self.clamp_selection();
        self.status_message = format!("Showing {} tasks", filter.label().to_lowercase());
    }

    fn toggle_theme(&mut self) {
        let theme = self.controller.theme().toggled();
        self.controller.set_theme(theme);
        self.status_message = match theme {
            Theme::Dark => "Dark mode on".to_string(),
            Theme::Light => "Light mode on".to_string(),
        };
    }

    /// Handle one key press. Returns the request to send, if any.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Intent> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Intent::Quit);
        }
        // An open alert swallows the key that dismisses it.
        if self.controller.alert().is_some() {
            self.controller.dismiss_alert();
            return None;
        }
        self.status_message.clear();

        match self.state {
            AppState::TaskList => self.handle_task_list_key(key.code),
            AppState::AddTask => self.handle_add_key(key.code),
            AppState::EditTask => self.handle_edit_key(key.code),
            AppState::Confirm => self.handle_confirm_key(key.code),
            AppState::Help => {
                self.state = AppState::TaskList;
                None
            }
        }
    }

    fn handle_task_list_key(&mut self, code: KeyCode) -> Option<Intent> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Some(Intent::Quit),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(false),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(true),
            KeyCode::Char(' ') | KeyCode::Char('c') => return self.selected_id().map(Intent::Toggle),
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(task) = self.selected_task().cloned() {
                    self.controller.start_edit(&task.id, &task.title);
                    self.edit_input = InputField::with_value(&task.title);
                    self.state = AppState::EditTask;
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.selected_id() {
                    self.controller.request_delete(&id);
                    self.state = AppState::Confirm;
                }
            }
            KeyCode::Char('a') | KeyCode::Char('i') => self.state = AppState::AddTask,
            KeyCode::Tab | KeyCode::Char('f') => self.set_filter(self.controller.filter().next()),
            KeyCode::Char('1') => self.set_filter(Filter::All),
            KeyCode::Char('2') => self.set_filter(Filter::Completed),
            KeyCode::Char('3') => self.set_filter(Filter::Pending),
            KeyCode::Char('t') => self.toggle_theme(),
            KeyCode::Char('r') => return Some(Intent::Refresh),
            KeyCode::Char('h') | KeyCode::Char('?') | KeyCode::F(1) => self.state = AppState::Help,
            _ => {}
        }
        None
    }

    fn handle_add_key(&mut self, code: KeyCode) -> Option<Intent> {
        match code {
            KeyCode::Enter => return Some(Intent::Add),
            KeyCode::Esc => self.state = AppState::TaskList,
            other => edit_field(&mut self.add_input, other),
        }
        self.controller.set_draft(&self.add_input.value);
        None
    }

    fn handle_edit_key(&mut self, code: KeyCode) -> Option<Intent> {
        match code {
            KeyCode::Enter => return Some(Intent::SaveEdit),
            KeyCode::Esc => {
                self.controller.cancel_edit();
                self.state = AppState::TaskList;
            }
            other => {
                edit_field(&mut self.edit_input, other);
                self.controller.set_edit_draft(&self.edit_input.value);
            }
        }
        None
    }

    fn handle_confirm_key(&mut self, code: KeyCode) -> Option<Intent> {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                self.state = AppState::TaskList;
                Some(Intent::ConfirmDelete)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.controller.cancel_delete();
                self.state = AppState::TaskList;
                None
            }
            _ => None,
        }
    }

    /// Send the request behind `intent` and fold the result into UI state.
    pub async fn perform(&mut self, intent: &Intent) {
        match intent {
            Intent::Refresh => {
                if self.controller.refresh().await == Outcome::Applied {
                    self.status_message = format!("Loaded {} tasks", self.controller.tasks().len());
                }
            }
            Intent::Add => {
                let title = self.add_input.value.clone();
                match self.controller.add_task(&title).await {
                    Outcome::Applied => {
                        self.add_input = InputField::new();
                        self.status_message = "Task added".to_string();
                    }
                    Outcome::Skipped => self.status_message = "Type a task title first".to_string(),
                    Outcome::Failed => {}
                }
            }
            Intent::Toggle(id) => {
                if self.controller.toggle_completion(id).await == Outcome::Applied {
                    self.status_message = "Task updated".to_string();
                }
            }
            Intent::SaveEdit => match self.controller.save_edit().await {
                Outcome::Applied => {
                    self.state = AppState::TaskList;
                    self.status_message = "Task saved".to_string();
                }
                Outcome::Skipped => self.status_message = "Title cannot be empty".to_string(),
                Outcome::Failed => {}
            },
            Intent::ConfirmDelete => {
                if self.controller.confirm_delete().await == Outcome::Applied {
                    self.status_message = "Task deleted".to_string();
                }
            }
            Intent::Quit => {}
        }
        self.clamp_selection();
    }

    fn render_header(&self, f: &mut Frame, area: Rect, palette: &Palette) {
        let mode = match self.controller.theme() {
            Theme::Light => "☀ Light",
            Theme::Dark => "☾ Dark",
        };
        let header = Paragraph::new(Line::from(vec![
            Span::styled("To-Do List", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("   "),
            Span::styled(mode, Style::default().fg(palette.footer).add_modifier(Modifier::ITALIC)),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.card_border)),
        )
        .alignment(Alignment::Center);
        f.render_widget(header, area);
    }

    fn render_add_input(&self, f: &mut Frame, area: Rect, palette: &Palette) {
        let focused = self.state == AppState::AddTask;
        let border = if focused { ACCENT } else { palette.input_border };
        let draft = self.controller.draft();
        let content = if draft.is_empty() && !focused {
            Line::from(Span::styled("Add a new task... (press 'a')", Style::default().fg(palette.footer)))
        } else {
            Line::from(draft)
        };
        let input = Paragraph::new(content)
            .style(Style::default().bg(palette.input_bg).fg(palette.text))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("New Task")
                    .border_style(Style::default().fg(border)),
            );
        f.render_widget(input, area);

        if focused {
            let (before, _) = self.add_input.split_at_cursor();
            let x = area.x + 1 + before.chars().count() as u16;
            f.set_cursor_position(Position::new(x.min(area.right().saturating_sub(2)), area.y + 1));
        }
    }

    fn render_filters(&self, f: &mut Frame, area: Rect, palette: &Palette) {
        let current = self.controller.filter();
        let selected = Filter::ALL.iter().position(|&x| x == current).unwrap_or(0);
        let tabs = Tabs::new(Filter::ALL.iter().map(|x| x.label()))
            .select(selected)
            .style(Style::default().fg(SLATE))
            .highlight_style(
                Style::default()
                    .bg(palette.active_tab)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
            .divider(" | ");
        f.render_widget(tabs, area);
    }

    fn render_list(&mut self, f: &mut Frame, area: Rect, palette: &Palette) {
        let view = project(&self.controller);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.card_border))
            .title(format!(
                "Tasks ({}/{}) - Press 'h' for help",
                view.len(),
                self.controller.tasks().len()
            ));

        let ListView::Rows(rows) = &view else {
            let text = view.placeholder().unwrap_or_default();
            let placeholder = Paragraph::new(text)
                .style(Style::default().fg(palette.text))
                .alignment(Alignment::Center)
                .block(block);
            f.render_widget(placeholder, area);
            return;
        };

        let rows: Vec<Row> = rows
            .iter()
            .map(|row| match row {
                RowView::Display { task } => {
                    let title_style = if task.completed {
                        Style::default().fg(COMPLETED_TEXT).add_modifier(Modifier::CROSSED_OUT)
                    } else {
                        Style::default().fg(palette.text)
                    };
                    Row::new(vec![
                        Cell::from(checkbox(task)).style(checkbox_style(task)),
                        Cell::from(Span::styled(task.title.clone(), title_style)),
                        Cell::from(Line::from(vec![
                            Span::styled("e Edit", Style::default().fg(AMBER)),
                            Span::raw("  "),
                            Span::styled("d Remove", Style::default().fg(DANGER)),
                        ])),
                    ])
                }
                RowView::Editing { task, .. } => {
                    let (before, after) = self.edit_input.split_at_cursor();
                    Row::new(vec![
                        Cell::from(checkbox(task)).style(checkbox_style(task)),
                        Cell::from(Line::from(vec![
                            Span::raw(before.to_string()),
                            Span::styled("▏", Style::default().fg(ACCENT)),
                            Span::raw(after.to_string()),
                        ]))
                        .style(Style::default().bg(palette.input_bg).fg(palette.text)),
                        Cell::from(Line::from(vec![
                            Span::styled("⏎ Save", Style::default().fg(SUCCESS)),
                            Span::raw("  "),
                            Span::styled("Esc Cancel", Style::default().fg(SLATE)),
                        ])),
                    ])
                }
            })
            .collect();

        let widths = [Constraint::Length(3), Constraint::Min(20), Constraint::Length(16)];
        let table = Table::new(rows, widths)
            .block(block)
            .style(Style::default().bg(palette.card_bg))
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, area, &mut self.list_state);
    }

    fn render_footer(&self, f: &mut Frame, area: Rect, palette: &Palette) {
        let footer = Paragraph::new("Task Manager App © 2023")
            .style(Style::default().fg(palette.footer))
            .alignment(Alignment::Center);
        f.render_widget(footer, area);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let status_text = if let Some(busy) = self.busy {
            busy.to_string()
        } else if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            match self.state {
                AppState::TaskList => {
                    let synced = self
                        .controller
                        .last_synced()
                        .map(|t| format!(" | Synced {}", t.format("%H:%M:%S")))
                        .unwrap_or_default();
                    format!(
                        "Tasks: {} | a Add  Space Toggle  e Edit  d Delete  f Filter  t Theme  r Refresh  q Quit{}",
                        self.controller.filtered_tasks().len(),
                        synced
                    )
                }
                AppState::AddTask => "Add Task | Enter to add, Esc to leave".to_string(),
                AppState::EditTask => "Edit Task | Enter to save, Esc to cancel".to_string(),
                AppState::Help => "Help".to_string(),
                AppState::Confirm => "Confirm Delete".to_string(),
            }
        };

        let status = Paragraph::new(status_text)
            .style(Style::default().bg(ACCENT).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    fn render_confirm(&self, f: &mut Frame, area: Rect) {
        let title = self
            .controller
            .pending_delete()
            .and_then(|id| self.controller.find(id))
            .map(|t| t.title.as_str())
            .unwrap_or("");

        let area = centered_rect(50, 30, area);
        f.render_widget(Clear, area);

        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Are you sure you want to delete this task?",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(title),
            Line::from(""),
            Line::from("Press 'y' to delete, 'n' to cancel"),
        ];
        let paragraph = Paragraph::new(text)
            .block(
                Block::default()
                    .title("Confirm Delete")
                    .borders(Borders::ALL)
                    .style(Style::default().bg(DANGER).fg(Color::White)),
            )
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_alert(&self, f: &mut Frame, area: Rect, palette: &Palette) {
        let Some(alert) = self.controller.alert() else {
            return;
        };
        let area = centered_rect(50, 30, area);
        f.render_widget(Clear, area);

        let text = vec![
            Line::from(""),
            Line::from(alert.message.as_str()),
            Line::from(""),
            Line::from(Span::styled("Press any key to dismiss", Style::default().fg(palette.footer))),
        ];
        let paragraph = Paragraph::new(text)
            .block(
                Block::default()
                    .title(alert.title.as_str())
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(DANGER))
                    .style(Style::default().bg(palette.card_bg).fg(palette.text)),
            )
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_help(&self, f: &mut Frame, area: Rect, palette: &Palette) {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let help_text = vec![
            Line::from(Span::styled("Task List:", bold)),
            Line::from("  ↑/↓, k/j      Move selection"),
            Line::from("  Space/c       Toggle completion"),
            Line::from("  a             Add a new task"),
            Line::from("  e/Enter       Edit the selected task"),
            Line::from("  d/Del         Delete the selected task"),
            Line::from("  f/Tab         Cycle filter (All → Completed → Pending)"),
            Line::from("  1/2/3         Show all / completed / pending"),
            Line::from("  t             Toggle dark mode"),
            Line::from("  r             Reload tasks from the server"),
            Line::from("  h/?/F1        Show this help"),
            Line::from("  q/Esc/Ctrl+C  Quit"),
            Line::from(""),
            Line::from(Span::styled("Editing:", bold)),
            Line::from("  Enter         Save"),
            Line::from("  Esc           Cancel"),
        ];

        let area = centered_rect(70, 70, area);
        f.render_widget(Clear, area);
        let paragraph = Paragraph::new(help_text)
            .style(Style::default().bg(palette.card_bg).fg(palette.text))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Help - Press any key to return"),
            )
            .wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
    }

    /// Draw the whole screen.
    fn render(&mut self, f: &mut Frame) {
        let palette = Palette::for_theme(self.controller.theme());
        f.render_widget(
            Block::default().style(Style::default().bg(palette.background).fg(palette.text)),
            f.area(),
        );

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // header
                Constraint::Length(3), // add input
                Constraint::Length(1), // filter tabs
                Constraint::Min(3),    // task list
                Constraint::Length(1), // footer
                Constraint::Length(1), // status bar
            ])
            .split(f.area());

        self.render_header(f, chunks[0], &palette);
        self.render_add_input(f, chunks[1], &palette);
        self.render_filters(f, chunks[2], &palette);
        self.render_list(f, chunks[3], &palette);
        self.render_footer(f, chunks[4], &palette);
        self.render_status_bar(f, chunks[5]);

        match self.state {
            AppState::Help => self.render_help(f, f.area(), &palette),
            AppState::Confirm => self.render_confirm(f, f.area()),
            _ => {}
        }
        self.render_alert(f, f.area(), &palette);
    }

    /// Main event loop: draw, read a key, perform any request, repeat.
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        self.busy = Some(Intent::Refresh.busy_label());
        terminal.draw(|f| self.render(f))?;
        self.start().await;
        self.busy = None;

        loop {
            terminal.draw(|f| self.render(f))?;

            if !event::poll(Duration::from_millis(50))? {
                continue;
            }
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match self.handle_key(key) {
                Some(Intent::Quit) => break,
                Some(intent) => {
                    self.busy = Some(intent.busy_label());
                    terminal.draw(|f| self.render(f))?;
                    self.perform(&intent).await;
                    self.busy = None;
                }
                None => {}
            }
        }
        Ok(())
    }
}

fn checkbox_style(task: &Task) -> Style {
    if task.completed {
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(SLATE)
    }
}

/// Apply a cursor or editing key to an input field.
fn edit_field(input: &mut InputField, code: KeyCode) {
    match code {
        KeyCode::Char(c) => input.handle_char(c),
        KeyCode::Backspace => input.handle_backspace(),
        KeyCode::Delete => input.handle_delete(),
        KeyCode::Left => input.move_cursor_left(),
        KeyCode::Right => input.move_cursor_right(),
        KeyCode::Home => input.move_home(),
        KeyCode::End => input.move_end(),
        _ => {}
    }
}
