use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;
use tokio::runtime::Handle;

use crate::api::ApiService;
use crate::form::FormField;
use crate::format::display_date;
use crate::input::InputField;
use crate::models::TaskDto;
use crate::request::{Generation, RequestState};
use crate::routes::{Navigator, Route};
use crate::view::{Effect, TaskDetailView, TaskListView, TaskRow, ViewId};

const TICK: Duration = Duration::from_millis(100);

/// Results coming back from the network tasks.
#[derive(Debug)]
pub enum ApiEvent {
    TasksLoaded(Generation, Result<Vec<TaskDto>, String>),
    TaskCreated(Result<TaskDto, String>),
    TaskLoaded {
        id: String,
        view: ViewId,
        generation: Generation,
        result: Result<TaskDto, String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Form(FormField),
    List,
}

pub struct App {
    pub date_format: String,
    pub navigator: Navigator,
    pub list: TaskListView,
    pub detail: Option<TaskDetailView>,
    pub focus: Focus,
    pub task_list_state: ListState,
    pub should_quit: bool,
    effects: Vec<Effect>,
    last_view: ViewId,
}

impl App {
    pub fn new(date_format: impl Into<String>) -> Self {
        let mut app = App {
            date_format: date_format.into(),
            navigator: Navigator::default(),
            list: TaskListView::default(),
            detail: None,
            focus: Focus::Form(FormField::Title),
            task_list_state: ListState::default(),
            should_quit: false,
            effects: Vec::new(),
            last_view: 0,
        };
        let effect = app.list.mount();
        app.effects.push(effect);
        app
    }

    /// Requests queued by state changes since the last call.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn navigate(&mut self, route: Route) {
        if let Route::TaskDetail { id } = &route {
            self.last_view += 1;
            let mut detail = TaskDetailView::new(id.clone(), self.last_view);
            self.effects.push(detail.mount());
            self.detail = Some(detail);
        }
        self.navigator.push(route);
    }

    pub fn back(&mut self) {
        if self.navigator.back() && !matches!(self.navigator.current(), Route::TaskDetail { .. }) {
            self.detail = None;
        }
    }

    pub fn refetch(&mut self) {
        match self.navigator.current() {
            Route::TaskDetail { .. } => {
                if let Some(detail) = &mut self.detail {
                    self.effects.push(detail.mount());
                }
            }
            _ => {
                let effect = self.list.refetch();
                self.effects.push(effect);
            }
        }
    }

    pub fn submit(&mut self) {
        if let Some(effect) = self.list.submit() {
            self.effects.push(effect);
        }
    }

    pub fn apply(&mut self, event: ApiEvent) {
        match event {
            ApiEvent::TasksLoaded(generation, result) => {
                self.list.tasks_loaded(generation, result);
                self.clamp_selection();
            }
            ApiEvent::TaskCreated(result) => {
                if let Some(effect) = self.list.task_created(result) {
                    self.effects.push(effect);
                }
            }
            ApiEvent::TaskLoaded {
                id,
                view,
                generation,
                result,
            } => match &mut self.detail {
                Some(detail) if detail.view == view => detail.task_loaded(generation, result),
                _ => log::debug!("dropping task {} response for closed detail view", id),
            },
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.list.tasks().len();
        match self.task_list_state.selected() {
            _ if len == 0 => self.task_list_state.select(None),
            Some(i) if i >= len => self.task_list_state.select(Some(len - 1)),
            None if self.focus == Focus::List => self.task_list_state.select(Some(0)),
            _ => {}
        }
    }

    pub fn next_item(&mut self) {
        let len = self.list.tasks().len();
        if len == 0 {
            return;
        }
        let i = match self.task_list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.task_list_state.select(Some(i));
    }

    pub fn previous_item(&mut self) {
        let len = self.list.tasks().len();
        if len == 0 {
            return;
        }
        let i = match self.task_list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.task_list_state.select(Some(i));
    }

    pub fn next_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Form(field) => match field.next() {
                Some(next) => Focus::Form(next),
                None => Focus::List,
            },
            Focus::List => Focus::Form(FormField::Title),
        };
        self.clamp_selection();
    }

    pub fn previous_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Form(field) => match field.previous() {
                Some(previous) => Focus::Form(previous),
                None => Focus::List,
            },
            Focus::List => Focus::Form(FormField::Submit),
        };
        self.clamp_selection();
    }

    fn open_selected_task(&mut self) {
        let route = self
            .task_list_state
            .selected()
            .and_then(|i| self.list.tasks().get(i))
            .map(|task| Route::task(&task.id));
        if let Some(route) = route {
            self.navigate(route);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c'))
        {
            self.should_quit = true;
            return;
        }
        if key.code == KeyCode::F(5) {
            self.refetch();
            return;
        }

        match self.navigator.current().clone() {
            Route::TaskList => match self.focus {
                Focus::Form(field) => self.handle_form_key(field, key),
                Focus::List => self.handle_list_key(key),
            },
            Route::TaskDetail { .. } | Route::About => match key.code {
                KeyCode::Esc | KeyCode::Backspace | KeyCode::Left => self.back(),
                KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Char('r') => self.refetch(),
                _ => {}
            },
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('r') => self.refetch(),
            KeyCode::Char('a') => self.navigate(Route::About),
            KeyCode::Down | KeyCode::Char('j') => self.next_item(),
            KeyCode::Up | KeyCode::Char('k') => self.previous_item(),
            KeyCode::Enter => self.open_selected_task(),
            KeyCode::Tab => self.next_focus(),
            KeyCode::BackTab => self.previous_focus(),
            _ => {}
        }
    }

    fn handle_form_key(&mut self, field: FormField, key: KeyEvent) {
        match key.code {
            KeyCode::Tab | KeyCode::Down => return self.next_focus(),
            KeyCode::BackTab | KeyCode::Up => return self.previous_focus(),
            KeyCode::Enter => return self.submit(),
            _ => {}
        }

        match field {
            FormField::Priority => match key.code {
                KeyCode::Right | KeyCode::Char(' ') => {
                    self.list.form.priority = self.list.form.priority.next();
                }
                KeyCode::Left => {
                    self.list.form.priority = self.list.form.priority.previous();
                }
                _ => {}
            },
            FormField::Submit => {
                if key.code == KeyCode::Char(' ') {
                    self.submit();
                }
            }
            _ => {
                if let Some(input) = self.list.form.field_mut(field) {
                    edit_input(input, key);
                }
            }
        }
    }
}

fn edit_input(input: &mut InputField, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => input.insert_char(c),
        KeyCode::Backspace => input.delete_char(),
        KeyCode::Delete => input.delete_forward(),
        KeyCode::Left => input.move_cursor_left(),
        KeyCode::Right => input.move_cursor_right(),
        KeyCode::Home => input.move_to_start(),
        KeyCode::End => input.move_to_end(),
        _ => {}
    }
}

/// Runs one effect on the runtime and reports back through `tx`.
fn dispatch(effect: Effect, api: &ApiService, runtime: &Handle, tx: &Sender<ApiEvent>) {
    let api = api.clone();
    let tx = tx.clone();
    runtime.spawn(async move {
        let event = match effect {
            Effect::FetchTasks(generation) => {
                let result = api.list_tasks().await.map_err(|e| e.to_string());
                ApiEvent::TasksLoaded(generation, result)
            }
            Effect::CreateTask(payload) => {
                let result = api.create_task(&payload).await.map_err(|e| e.to_string());
                ApiEvent::TaskCreated(result)
            }
            Effect::FetchTask {
                id,
                view,
                generation,
            } => {
                let result = api.get_task(&id).await.map_err(|e| e.to_string());
                ApiEvent::TaskLoaded {
                    id,
                    view,
                    generation,
                    result,
                }
            }
        };
        // the UI may already have exited
        let _ = tx.send(event);
    });
}

pub fn run_tui(
    api: ApiService,
    runtime: Handle,
    date_format: &str,
    start: Option<Route>,
) -> Result<()> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(date_format);
    if let Some(route) = start.filter(|r| *r != Route::TaskList) {
        app.navigate(route);
    }
    let res = run_app(&mut terminal, &mut app, &api, &runtime);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        log::error!("tui exited with error: {:?}", err);
    }

    res.context("terminal UI failed")
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    api: &ApiService,
    runtime: &Handle,
) -> io::Result<()> {
    let (tx, rx): (Sender<ApiEvent>, Receiver<ApiEvent>) = mpsc::channel();

    loop {
        for effect in app.take_effects() {
            dispatch(effect, api, runtime, &tx);
        }

        terminal.draw(|f| ui(f, app))?;

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        while let Ok(event) = rx.try_recv() {
            app.apply(event);
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

fn ui(f: &mut Frame, app: &mut App) {
    let area = f.area();
    match app.navigator.current().clone() {
        Route::TaskList => render_task_list(f, app, area),
        Route::TaskDetail { id } => render_task_detail(f, app, &id, area),
        Route::About => render_about(f, area),
    }
}

fn input_line<'a>(label: &'a str, input: &'a InputField, focused: bool, hint: &'a str) -> Line<'a> {
    let label_style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    let mut spans = vec![Span::styled(format!("{:<13}", label), label_style)];

    if focused {
        let (before, at, after) = input.split_at_cursor();
        spans.push(Span::raw(before));
        spans.push(Span::styled(
            at.map(String::from).unwrap_or_else(|| " ".to_string()),
            Style::default().bg(Color::Cyan).fg(Color::Black),
        ));
        spans.push(Span::raw(after));
    } else if input.is_empty() {
        spans.push(Span::styled(hint, Style::default().fg(Color::DarkGray)));
    } else {
        spans.push(Span::raw(input.value()));
    }
    Line::from(spans)
}

fn render_form(f: &mut Frame, app: &App, area: Rect) {
    let form = &app.list.form;
    let focused = |field: FormField| app.focus == Focus::Form(field);

    let priority_style = if focused(FormField::Priority) {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };

    let button_style = if !app.list.submit_enabled() {
        Style::default().fg(Color::DarkGray)
    } else if focused(FormField::Submit) {
        Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Blue)
    };

    let button_label = if app.list.create_state().is_loading() {
        "[ Adding... ]"
    } else {
        "[ Add Task ]"
    };

    let mut lines = vec![
        input_line("Title", &form.title, focused(FormField::Title), "Task title"),
        input_line("Date", &form.date, focused(FormField::Date), "YYYY-MM-DD"),
        input_line(
            "Description",
            &form.description,
            focused(FormField::Description),
            "Description (optional)",
        ),
        Line::from(vec![
            Span::styled(format!("{:<13}", "Priority"), priority_style),
            Span::raw(format!("< {} >", form.priority.label())),
        ]),
        Line::from(Span::styled(button_label, button_style)),
    ];

    if let Some(err) = &app.list.form_error {
        lines.push(Line::from(Span::styled(err.to_string(), Style::default().fg(Color::Red))));
    }

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("New Task"));
    f.render_widget(paragraph, area);
}

fn task_item(row: &TaskRow) -> ListItem<'static> {
    let title_style = if row.done {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED)
    };

    let mut spans = vec![Span::styled(row.title.clone(), title_style)];
    if let Some(badge) = &row.badge {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            format!(" {} ", badge),
            Style::default().bg(Color::Gray).fg(Color::Black),
        ));
    }
    if let Some(date) = &row.date {
        spans.push(Span::styled(format!("  {}", date), Style::default().fg(Color::DarkGray)));
    }

    let item = ListItem::new(Line::from(spans));
    if row.done {
        item.style(Style::default().add_modifier(Modifier::CROSSED_OUT))
    } else {
        item
    }
}

fn render_task_list(f: &mut Frame, app: &mut App, area: Rect) {
    let error_height = if app.list.error().is_some() { 1 } else { 0 };
    let form_height = if app.list.form_error.is_some() { 8 } else { 7 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(form_height),
            Constraint::Length(error_height),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    f.render_widget(
        Paragraph::new(Span::styled(
            "Task Lists",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        chunks[0],
    );

    render_form(f, app, chunks[1]);

    if let Some(message) = app.list.error() {
        f.render_widget(
            Paragraph::new(Span::styled(message.to_string(), Style::default().fg(Color::Red))),
            chunks[2],
        );
    }

    let list_title = match app.list.tasks_state() {
        RequestState::Success(tasks) if app.list.is_fetching() => {
            format!("Tasks ({}, refreshing)", tasks.len())
        }
        RequestState::Success(tasks) => format!("Tasks ({})", tasks.len()),
        _ => "Tasks".to_string(),
    };
    let list_block = Block::default().borders(Borders::ALL).title(list_title);

    if app.list.is_loading() {
        f.render_widget(Paragraph::new("Loading...").block(list_block), chunks[3]);
    } else {
        let items: Vec<ListItem> = app
            .list
            .rows(&app.date_format)
            .iter()
            .map(task_item)
            .collect();

        let highlight = if app.focus == Focus::List {
            Style::default().bg(Color::LightGreen).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let tasks_list = List::new(items)
            .block(list_block)
            .highlight_style(highlight)
            .highlight_symbol(">> ");

        f.render_stateful_widget(tasks_list, chunks[3], &mut app.task_list_state);
    }

    f.render_widget(
        Paragraph::new(Span::styled(
            "About the Project",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED),
        ))
        .alignment(Alignment::Center),
        chunks[4],
    );

    let help = match app.focus {
        Focus::Form(_) => "Tab: next field • Enter: add task • F5: refresh • Ctrl+Q: quit",
        Focus::List => "↑/↓: navigate • Enter: open • r: refresh • a: about • q: quit",
    };
    f.render_widget(
        Paragraph::new(Span::styled(help, Style::default().fg(Color::DarkGray))),
        chunks[5],
    );
}

fn render_task_detail(f: &mut Frame, app: &App, id: &str, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Task {} - Esc: back", id));

    let Some(detail) = &app.detail else {
        f.render_widget(Paragraph::new("Task not loaded").block(block), area);
        return;
    };

    let mut lines: Vec<Line> = Vec::new();
    if let Some(message) = detail.error() {
        lines.push(Line::from(Span::styled(message.to_string(), Style::default().fg(Color::Red))));
        lines.push(Line::from(""));
    }

    if detail.is_loading() {
        lines.push(Line::from("Loading..."));
    } else if let Some(task) = detail.task() {
        let title_style = if task.is_done {
            Style::default().add_modifier(Modifier::CROSSED_OUT | Modifier::BOLD).fg(Color::DarkGray)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        lines.push(Line::from(Span::styled(task.title.clone(), title_style)));
        lines.push(Line::from(""));
        lines.push(Line::from(format!(
            "Priority:    {}",
            task.priority.map(|p| p.badge()).unwrap_or_else(|| "-".to_string())
        )));
        lines.push(Line::from(format!(
            "Date:        {}",
            task.shown_date()
                .map(|d| display_date(d, &app.date_format))
                .unwrap_or_else(|| "-".to_string())
        )));
        lines.push(Line::from(format!(
            "Status:      {}",
            if task.is_done { "Done" } else { "Open" }
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(
            task.description.clone().unwrap_or_else(|| "No description".to_string()),
        ));
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn render_about(f: &mut Frame, area: Rect) {
    let text = format!(
        "taskdesk {}\n\nA terminal client for the task list API.\n\nCreate tasks from the form, browse them in the list and open one to see its details.\n\nEsc: back",
        env!("CARGO_PKG_VERSION")
    );
    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("About the Project"))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}
