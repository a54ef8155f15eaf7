//! Interactive dashboard application loop.
//!
//! Navigation is a two-state machine: the dashboard (overview and timeline
//! tabs) and the detail view of one selected task. Selecting a row enters
//! detail; backing out - or the selected task disappearing from the table -
//! returns to the dashboard.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::config::Config;
use crate::error::Result;
use crate::journal::{LogEntry, LogStore};
use crate::store::TaskStore;
use crate::task::Task;

use super::model;
use super::view;

const EVENT_POLL_MS: u64 = 120;

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum DashboardTab {
    Overview,
    Timeline,
}

/// The two navigation states
#[derive(Clone, PartialEq, Eq)]
pub(crate) enum View {
    Dashboard,
    /// Holds the project id, not an index: deletions invalidate it cleanly
    Detail { project_id: String },
}

pub struct AppState {
    pub(crate) tasks: Vec<Task>,
    pub(crate) journal: Vec<LogEntry>,
    pub(crate) filtered: Vec<usize>,
    pub(crate) selected: Option<usize>,
    pub(crate) filter: String,
    pub(crate) filter_active: bool,
    pub(crate) tab: DashboardTab,
    pub(crate) view: View,
    pub(crate) subtask_cursor: usize,
    pub(crate) status_message: Option<String>,
    store: TaskStore,
    log_store: LogStore,
    #[allow(dead_code)]
    config: Config,
}

impl AppState {
    fn new(store: TaskStore, log_store: LogStore, config: Config) -> Self {
        let mut app = Self {
            tasks: Vec::new(),
            journal: Vec::new(),
            filtered: Vec::new(),
            selected: None,
            filter: String::new(),
            filter_active: false,
            tab: DashboardTab::Overview,
            view: View::Dashboard,
            subtask_cursor: 0,
            status_message: None,
            store,
            log_store,
            config,
        };
        app.reload();
        app
    }

    /// Re-read both stores and reconcile selection and navigation
    pub(crate) fn reload(&mut self) {
        let previous_id = self.selected_task().map(|task| task.project_id.clone());
        self.tasks = self.store.load();
        self.journal = self.log_store.load();
        self.apply_filter(previous_id);

        // automatic fallback: a detail view whose task vanished goes back
        // to the dashboard
        if let View::Detail { project_id } = &self.view {
            if self.index_of(project_id).is_none() {
                self.view = View::Dashboard;
            }
        }
    }

    pub(crate) fn index_of(&self, project_id: &str) -> Option<usize> {
        self.tasks
            .iter()
            .position(|task| task.project_id == project_id)
    }

    pub(crate) fn selected_task(&self) -> Option<&Task> {
        self.selected.and_then(|index| self.tasks.get(index))
    }

    pub(crate) fn detail_task(&self) -> Option<&Task> {
        match &self.view {
            View::Detail { project_id } => {
                self.index_of(project_id).and_then(|index| self.tasks.get(index))
            }
            View::Dashboard => None,
        }
    }

    pub(crate) fn apply_filter(&mut self, previous_id: Option<String>) {
        self.filtered = model::filter_task_indices(&self.tasks, &self.filter);
        self.selected = model::select_by_id(&self.tasks, &self.filtered, previous_id.as_deref());
    }

    fn move_selection(&mut self, delta: isize) {
        if self.filtered.is_empty() {
            self.selected = None;
            return;
        }
        let current = self
            .selected
            .and_then(|index| self.filtered.iter().position(|&candidate| candidate == index))
            .unwrap_or(0);
        let max = self.filtered.len().saturating_sub(1);
        let next = (current as isize + delta).clamp(0, max as isize) as usize;
        self.selected = Some(self.filtered[next]);
    }

    fn enter_detail(&mut self) {
        let Some(project_id) = self.selected_task().map(|task| task.project_id.clone()) else {
            return;
        };
        self.view = View::Detail { project_id };
        self.subtask_cursor = 0;
    }

    fn move_subtask_cursor(&mut self, delta: isize) {
        let Some(task) = self.detail_task() else {
            return;
        };
        if task.subtasks.is_empty() {
            self.subtask_cursor = 0;
            return;
        }
        let max = task.subtasks.len() - 1;
        self.subtask_cursor =
            (self.subtask_cursor as isize + delta).clamp(0, max as isize) as usize;
    }

    /// Toggle the sub-task under the cursor, recompute on change, persist,
    /// and re-read the table
    fn toggle_subtask(&mut self) {
        let View::Detail { project_id } = self.view.clone() else {
            return;
        };
        let Some(index) = self.index_of(&project_id) else {
            return;
        };
        let cursor = self.subtask_cursor;
        {
            let task = &mut self.tasks[index];
            let Some(sub) = task.subtasks.get_mut(cursor) else {
                return;
            };
            sub.done = !sub.done;
            task.recompute_progress();
        }
        match self.store.save(&self.tasks) {
            Ok(()) => self.status_message = None,
            Err(err) => self.status_message = Some(format!("save failed: {err}")),
        }
        self.reload();
    }

    pub(crate) fn footer_hint(&self) -> String {
        if self.filter_active {
            return "type to filter  backspace delete  enter done  esc clear".to_string();
        }
        match self.view {
            View::Dashboard => {
                "j/k move  / filter  tab view  enter details  r reload  q quit".to_string()
            }
            View::Detail { .. } => {
                "j/k move  space toggle sub-task  esc back  q quit".to_string()
            }
        }
    }
}

pub fn run(store: TaskStore, log_store: LogStore, config: Config) -> Result<()> {
    let mut app = AppState::new(store, log_store, config);
    run_terminal(&mut app)
}

fn run_terminal(app: &mut AppState) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    let mut dirty = true;
    loop {
        if dirty {
            terminal.draw(|frame| view::render(frame, app))?;
            dirty = false;
        }

        if event::poll(Duration::from_millis(EVENT_POLL_MS))? {
            match event::read()? {
                Event::Key(key) => {
                    if handle_key(app, key) {
                        break;
                    }
                    dirty = true;
                }
                Event::Resize(_, _) => {
                    dirty = true;
                }
                _ => {}
            }
        }
    }
    Ok(())
}

/// Returns true when the app should quit
fn handle_key(app: &mut AppState, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    // automatic fallback: a detail view whose task is gone drops back to
    // the dashboard before the key is interpreted
    if let View::Detail { project_id } = &app.view {
        if app.index_of(project_id).is_none() {
            app.view = View::Dashboard;
        }
    }

    if app.filter_active {
        match key.code {
            KeyCode::Esc => {
                app.filter.clear();
                app.filter_active = false;
                let previous = app.selected_task().map(|task| task.project_id.clone());
                app.apply_filter(previous);
            }
            KeyCode::Enter => app.filter_active = false,
            KeyCode::Backspace => {
                app.filter.pop();
                let previous = app.selected_task().map(|task| task.project_id.clone());
                app.apply_filter(previous);
            }
            KeyCode::Char(ch) => {
                app.filter.push(ch);
                let previous = app.selected_task().map(|task| task.project_id.clone());
                app.apply_filter(previous);
            }
            _ => {}
        }
        return false;
    }

    match &app.view {
        View::Dashboard => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('j') | KeyCode::Down => app.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => app.move_selection(-1),
            KeyCode::Char('/') => app.filter_active = true,
            KeyCode::Tab => {
                app.tab = match app.tab {
                    DashboardTab::Overview => DashboardTab::Timeline,
                    DashboardTab::Timeline => DashboardTab::Overview,
                };
            }
            KeyCode::Char('1') => app.tab = DashboardTab::Overview,
            KeyCode::Char('2') => app.tab = DashboardTab::Timeline,
            KeyCode::Enter => app.enter_detail(),
            KeyCode::Char('r') => app.reload(),
            _ => {}
        },
        View::Detail { .. } => match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Esc | KeyCode::Char('b') => app.view = View::Dashboard,
            KeyCode::Char('j') | KeyCode::Down => app.move_subtask_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => app.move_subtask_cursor(-1),
            KeyCode::Char(' ') => app.toggle_subtask(),
            KeyCode::Char('r') => app.reload(),
            _ => {}
        },
    }
    false
}
