//! Interactive board.
//!
//! The render loop owns the terminal and redraws from a fresh [`View`] every
//! tick. Board operations are spawned onto the runtime so a slow node never
//! freezes input; their results come back through the board's published
//! state and the event feed.

use crate::errors::TerminalResult;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use taskboard_client::events::EventDispatcher;
use taskboard_client::view::EMPTY_BOARD_MESSAGE;
use taskboard_client::{select_view, BoardEvent, TaskBoard, View};
use taskboard_core::TaskId;

const ACTIVITY_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActivityType {
    Connected,
    Sync,
    Mutation,
    Error,
}

struct ActivityEntry {
    timestamp: chrono::DateTime<chrono::Utc>,
    message: String,
    event_type: ActivityType,
}

/// Bounded feed of board events, newest last.
#[derive(Clone, Default)]
pub struct ActivityLog {
    entries: Arc<Mutex<VecDeque<ActivityEntry>>>,
}

impl ActivityLog {
    fn push(&self, message: String, event_type: ActivityType) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push_back(ActivityEntry {
                timestamp: chrono::Utc::now(),
                message,
                event_type,
            });
            while entries.len() > ACTIVITY_LIMIT {
                entries.pop_front();
            }
        }
    }

    pub fn record(&self, event: &BoardEvent) {
        let (message, event_type) = match event {
            BoardEvent::Connected {
                account,
                contract,
                network_id,
            } => (
                format!(
                    "Connected {} to {} (network {})",
                    account.short(),
                    contract.short(),
                    network_id
                ),
                ActivityType::Connected,
            ),
            BoardEvent::SyncStarted => ("Sync started".to_string(), ActivityType::Sync),
            BoardEvent::SyncCompleted { task_count } => (
                format!("Sync completed ({} tasks)", task_count),
                ActivityType::Sync,
            ),
            BoardEvent::SyncFailed { message } => {
                (format!("Sync failed: {}", message), ActivityType::Error)
            }
            BoardEvent::MutationSubmitted { kind, task } => (
                match task {
                    Some(id) => format!("Submitting {} of task {}", kind, id),
                    None => format!("Submitting {}", kind),
                },
                ActivityType::Mutation,
            ),
            BoardEvent::MutationConfirmed { kind, tx_hash } => {
                let hash = tx_hash.to_string();
                (
                    format!("{} mined in {}...", kind, &hash[..10.min(hash.len())]),
                    ActivityType::Mutation,
                )
            }
            BoardEvent::MutationFailed { kind, message } => {
                (format!("{} failed: {}", kind, message), ActivityType::Error)
            }
        };
        self.push(message, event_type);
    }

    pub fn attach(&self, events: &EventDispatcher) -> TerminalResult<()> {
        let log = self.clone();
        events.register_callback(move |event| log.record(event))?;
        Ok(())
    }

    pub fn messages(&self) -> Vec<String> {
        self.entries
            .lock()
            .map(|entries| entries.iter().map(|e| e.message.clone()).collect())
            .unwrap_or_default()
    }
}

/// Which input receives keystrokes on the board view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Tasks,
    Draft,
}

/// What a keystroke asks the board to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    EditAddress(String),
    SubmitAddress,
    EditDraft(String),
    Create(String),
    Toggle(TaskId),
    Delete(TaskId),
    Reload,
    DismissError,
}

#[derive(Default)]
pub struct App {
    pub selected: usize,
    pub focus: Focus,
    pub activity: ActivityLog,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    fn clamp_selection(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    /// Translate a key press against the view currently on screen.
    pub fn handle_key(&mut self, view: &View, key: KeyEvent) -> Option<Action> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Action::Quit);
        }

        match view {
            View::Loading => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
                _ => None,
            },
            View::Error { fatal, .. } => match key.code {
                KeyCode::Char('q') => Some(Action::Quit),
                KeyCode::Esc | KeyCode::Enter if !fatal => Some(Action::DismissError),
                _ => None,
            },
            View::AddressEntry { input } => match key.code {
                KeyCode::Esc => Some(Action::Quit),
                KeyCode::Enter => Some(Action::SubmitAddress),
                KeyCode::Backspace => {
                    let mut input = input.clone();
                    input.pop();
                    Some(Action::EditAddress(input))
                }
                KeyCode::Char(c) => Some(Action::EditAddress(format!("{}{}", input, c))),
                _ => None,
            },
            View::TaskBoard {
                draft,
                rows,
                can_add,
                is_submitting,
                ..
            } => {
                self.clamp_selection(rows.len());
                match self.focus {
                    Focus::Draft => match key.code {
                        KeyCode::Esc | KeyCode::Tab => {
                            self.focus = Focus::Tasks;
                            None
                        }
                        KeyCode::Enter if *can_add => Some(Action::Create(draft.clone())),
                        KeyCode::Backspace => {
                            let mut draft = draft.clone();
                            draft.pop();
                            Some(Action::EditDraft(draft))
                        }
                        KeyCode::Char(c) => Some(Action::EditDraft(format!("{}{}", draft, c))),
                        _ => None,
                    },
                    Focus::Tasks => {
                        // Nothing that writes or reloads is offered while a write is pending
                        let selected = rows
                            .get(self.selected)
                            .map(|r| r.key)
                            .filter(|_| !*is_submitting);
                        match key.code {
                            KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
                            KeyCode::Tab | KeyCode::Char('n') => {
                                self.focus = Focus::Draft;
                                None
                            }
                            KeyCode::Char('j') | KeyCode::Down => {
                                self.selected = (self.selected + 1).min(rows.len().saturating_sub(1));
                                None
                            }
                            KeyCode::Char('k') | KeyCode::Up => {
                                self.selected = self.selected.saturating_sub(1);
                                None
                            }
                            KeyCode::Char(' ') | KeyCode::Enter => selected.map(Action::Toggle),
                            KeyCode::Char('d') => selected.map(Action::Delete),
                            KeyCode::Char('r') if !*is_submitting => Some(Action::Reload),
                            _ => None,
                        }
                    }
                }
            }
        }
    }

    /// Apply an action. Network work is spawned; its failures already land
    /// in the board's error state, so they are only logged here.
    pub fn apply(&mut self, board: &Arc<TaskBoard>, action: Action) {
        match action {
            Action::Quit => {}
            Action::EditAddress(input) => board.set_address_input(&input),
            Action::EditDraft(draft) => board.set_draft(&draft),
            Action::DismissError => {
                board.dismiss_error();
            }
            Action::SubmitAddress => spawn_op(board, "submit address", |b| async move {
                b.submit_address().await
            }),
            Action::Reload => spawn_op(board, "reload", |b| async move { b.reload().await }),
            Action::Create(content) => spawn_op(board, "create", move |b| async move {
                b.create_task(&content).await
            }),
            Action::Toggle(id) => spawn_op(board, "toggle", move |b| async move {
                b.toggle_task(id).await
            }),
            Action::Delete(id) => spawn_op(board, "delete", move |b| async move {
                b.delete_task(id).await
            }),
        }
    }

    pub fn render(&mut self, f: &mut Frame, view: &View) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title bar
                Constraint::Min(5),    // Content
                Constraint::Length(7), // Activity log
                Constraint::Length(1), // Help
            ])
            .split(f.size());

        let title = Paragraph::new("Task Board")
            .block(Block::default().borders(Borders::ALL).style(Style::default().fg(Color::Cyan)))
            .alignment(Alignment::Center);
        f.render_widget(title, chunks[0]);

        match view {
            View::Loading => render_loading(f, chunks[1]),
            View::Error { message, fatal } => render_error(f, chunks[1], message, *fatal),
            View::AddressEntry { input } => render_address_entry(f, chunks[1], input),
            View::TaskBoard { .. } => self.render_board(f, chunks[1], view),
        }

        render_activity_log(f, chunks[2], &self.activity);

        let help = Paragraph::new(help_text(view, self.focus)).style(Style::default().fg(Color::DarkGray));
        f.render_widget(help, chunks[3]);
    }

    fn render_board(&mut self, f: &mut Frame, area: Rect, view: &View) {
        let View::TaskBoard {
            account,
            draft,
            rows,
            is_submitting,
            ..
        } = view
        else {
            return;
        };
        self.clamp_selection(rows.len());

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let draft_title = if *is_submitting {
            "New task (submitting...)"
        } else {
            "New task"
        };
        let draft_style = if self.focus == Focus::Draft {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let draft_input = Paragraph::new(draft.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .title(draft_title)
                .border_style(draft_style),
        );
        f.render_widget(draft_input, chunks[0]);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Tasks ({}) - account {}", rows.len(), account));

        if rows.is_empty() {
            let empty = Paragraph::new(EMPTY_BOARD_MESSAGE)
                .block(block)
                .style(Style::default().fg(Color::DarkGray));
            f.render_widget(empty, chunks[1]);
            return;
        }

        let items: Vec<ListItem> = rows
            .iter()
            .map(|row| {
                let mark = if row.completed { "[x] " } else { "[ ] " };
                let style = if row.strikethrough {
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(vec![
                    Span::raw(mark),
                    Span::styled(row.content.clone(), style),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let mut list_state = ListState::default();
        if self.focus == Focus::Tasks {
            list_state.select(Some(self.selected));
        }
        f.render_stateful_widget(list, chunks[1], &mut list_state);
    }
}

fn spawn_op<F, Fut>(board: &Arc<TaskBoard>, label: &'static str, op: F)
where
    F: FnOnce(Arc<TaskBoard>) -> Fut,
    Fut: std::future::Future<Output = taskboard_client::ClientResult<()>> + Send + 'static,
{
    let fut = op(board.clone());
    tokio::spawn(async move {
        if let Err(e) = fut.await {
            tracing::warn!("{} failed: {}", label, e);
        }
    });
}

fn render_loading(f: &mut Frame, area: Rect) {
    let loading = Paragraph::new("Loading tasks...")
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
    f.render_widget(loading, area);
}

fn render_error(f: &mut Frame, area: Rect, message: &str, fatal: bool) {
    let hint = if fatal {
        "Press q to quit."
    } else {
        "Press Esc to go back."
    };
    let lines = vec![
        Line::from(Span::styled(message.to_string(), Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))),
    ];
    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Error"))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_address_entry(f: &mut Frame, area: Rect, input: &str) {
    let lines = vec![
        Line::from("Enter the address of the task list contract:"),
        Line::from(""),
        Line::from(vec![
            Span::styled(input.to_string(), Style::default().fg(Color::Yellow)),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ]),
    ];
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Contract address"),
    );
    f.render_widget(paragraph, area);
}

fn render_activity_log(f: &mut Frame, area: Rect, activity: &ActivityLog) {
    let block = Block::default().borders(Borders::ALL).title("Activity Log");
    let lines: Vec<Line> = match activity.entries.lock() {
        Ok(entries) => entries
            .iter()
            .rev()
            .map(|entry| {
                let color = match entry.event_type {
                    ActivityType::Connected => Color::Green,
                    ActivityType::Sync => Color::Cyan,
                    ActivityType::Mutation => Color::Yellow,
                    ActivityType::Error => Color::Red,
                };
                Line::from(vec![
                    Span::styled(
                        entry.timestamp.format("%H:%M:%S").to_string(),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::raw(" "),
                    Span::styled(entry.message.clone(), Style::default().fg(color)),
                ])
            })
            .collect(),
        Err(_) => Vec::new(),
    };
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn help_text(view: &View, focus: Focus) -> &'static str {
    match view {
        View::Loading => "[q: quit]",
        View::Error { fatal: true, .. } => "[q: quit]",
        View::Error { .. } => "[esc: dismiss] [q: quit]",
        View::AddressEntry { .. } => "[enter: connect] [esc: quit]",
        View::TaskBoard { .. } => match focus {
            Focus::Draft => "[enter: add] [tab/esc: back to list]",
            Focus::Tasks => "[j/k: navigate] [space: toggle] [d: delete] [n: new] [r: reload] [q: quit]",
        },
    }
}

/// Run the interactive board until the user quits.
pub async fn run(board: Arc<TaskBoard>, preset_contract: Option<String>) -> TerminalResult<()> {
    let mut app = App::new();
    app.activity.attach(&board.events())?;

    if board.check_provider().is_ok() {
        if let Some(address) = preset_contract {
            app.apply(&board, Action::EditAddress(address));
            app.apply(&board, Action::SubmitAddress);
        }
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let res = run_app(&mut terminal, &mut app, &board).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    board: &Arc<TaskBoard>,
) -> TerminalResult<()> {
    let events = board.events();
    loop {
        events.process_events()?;
        let view = select_view(&board.snapshot());
        terminal.draw(|f| app.render(f, &view))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match app.handle_key(&view, key) {
                        Some(Action::Quit) => return Ok(()),
                        Some(action) => app.apply(board, action),
                        None => {}
                    }
                }
            }
        }
        // Let spawned operations make progress on a current-thread runtime
        tokio::task::yield_now().await;
    }
}
