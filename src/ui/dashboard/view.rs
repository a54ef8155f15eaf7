use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::report;
use crate::task::{self, Task, TaskStatus, DATE_FORMAT};

use super::app::{AppState, DashboardTab, View};
use super::model;

const COLOR_TEXT: Color = Color::Rgb(234, 236, 239);
const COLOR_MUTED: Color = Color::Rgb(160, 165, 172);
const COLOR_INFO: Color = Color::Rgb(116, 198, 219);
const COLOR_WARNING: Color = Color::Rgb(244, 200, 98);
const COLOR_ERROR: Color = Color::Rgb(255, 107, 107);
const COLOR_SUCCESS: Color = Color::Rgb(126, 210, 146);
const COLOR_ACCENT: Color = Color::Rgb(122, 170, 255);
const COLOR_BORDER: Color = Color::Rgb(92, 126, 166);

pub fn render(frame: &mut Frame, app: &mut AppState) {
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(area);

    render_header(frame, app, chunks[0]);
    match &app.view {
        View::Dashboard => match app.tab {
            DashboardTab::Overview => render_overview(frame, app, chunks[1]),
            DashboardTab::Timeline => render_timeline(frame, app, chunks[1]),
        },
        View::Detail { .. } => render_detail(frame, app, chunks[1]),
    }
    render_footer(frame, app, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &AppState, area: Rect) {
    let summary = task::stats(&app.tasks);
    let mut spans = vec![
        Span::styled(
            " tempo ",
            Style::default()
                .fg(COLOR_ACCENT)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(
                "tasks: {}  in progress: {}  high importance: {}  mean progress: {}%",
                summary.total, summary.in_progress, summary.high_importance, summary.mean_progress
            ),
            Style::default().fg(COLOR_TEXT),
        ),
    ];
    if !app.filter.is_empty() || app.filter_active {
        spans.push(Span::styled(
            format!("   filter: {}", app.filter),
            Style::default().fg(COLOR_INFO),
        ));
    }

    let mut lines = vec![Line::from(spans)];
    if let Some(message) = &app.status_message {
        lines.push(Line::from(Span::styled(
            format!(" {message}"),
            Style::default().fg(COLOR_ERROR),
        )));
    } else {
        let tab = match (app.view.clone(), app.tab) {
            (View::Detail { .. }, _) => "detail",
            (_, DashboardTab::Overview) => "overview",
            (_, DashboardTab::Timeline) => "timeline",
        };
        lines.push(Line::from(Span::styled(
            format!(" view: {tab}"),
            Style::default().fg(COLOR_MUTED),
        )));
    }
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_footer(frame: &mut Frame, app: &AppState, area: Rect) {
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            format!(" {}", app.footer_hint()),
            Style::default().fg(COLOR_MUTED),
        ))),
        area,
    );
}

fn status_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Done => COLOR_SUCCESS,
        TaskStatus::InProgress => COLOR_ACCENT,
        TaskStatus::Paused => COLOR_WARNING,
        TaskStatus::NotStarted => COLOR_MUTED,
    }
}

fn render_overview(frame: &mut Frame, app: &AppState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)].as_ref())
        .split(area);
    render_task_list(frame, app, chunks[0]);
    render_quadrants(frame, app, chunks[1]);
}

fn render_task_list(frame: &mut Frame, app: &AppState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(COLOR_BORDER))
        .title(format!("Tasks ({})", app.filtered.len()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.filtered.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "no tasks match",
                Style::default().fg(COLOR_MUTED),
            )),
            inner,
        );
        return;
    }

    let visible = inner.height as usize;
    let selected_pos = app
        .selected
        .and_then(|index| app.filtered.iter().position(|&candidate| candidate == index))
        .unwrap_or(0);
    let top = selected_pos.saturating_sub(visible.saturating_sub(1));

    let mut lines = Vec::new();
    for &index in app.filtered.iter().skip(top).take(visible) {
        let task = &app.tasks[index];
        let selected = app.selected == Some(index);
        let marker = if selected { "> " } else { "  " };
        let base = if selected {
            Style::default().fg(COLOR_TEXT).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(COLOR_TEXT)
        };
        lines.push(Line::from(vec![
            Span::styled(marker, Style::default().fg(COLOR_ACCENT)),
            Span::styled(format!("{:<10} ", task.project_id), base.fg(COLOR_INFO)),
            Span::styled(format!("{:<28} ", clip(&task.name, 28)), base),
            Span::styled(
                format!("{:<12} ", task.status),
                Style::default().fg(status_color(task.status)),
            ),
            Span::styled(progress_cell(task.progress), base.fg(COLOR_MUTED)),
        ]));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn progress_cell(progress: u8) -> String {
    let filled = usize::from(progress) / 10;
    format!("{:>3}% {}{}", progress, "#".repeat(filled), "-".repeat(10 - filled))
}

fn render_quadrants(frame: &mut Frame, app: &AppState, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(rows[0]);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(rows[1]);

    let buckets = model::quadrant_buckets(&app.tasks, &app.filtered);
    let cells = [top[0], top[1], bottom[0], bottom[1]];
    let colors = [COLOR_ERROR, COLOR_INFO, COLOR_WARNING, COLOR_SUCCESS];

    for (((quadrant, members), cell), color) in buckets.iter().zip(cells).zip(colors) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .title(format!("{} ({})", quadrant.label(), members.len()));
        let inner = block.inner(cell);
        frame.render_widget(block, cell);

        let lines: Vec<Line> = members
            .iter()
            .take(inner.height as usize)
            .map(|&index| {
                let task = &app.tasks[index];
                Line::from(Span::styled(
                    format!("{} {}", task.project_id, clip(&task.name, 20)),
                    Style::default().fg(COLOR_TEXT),
                ))
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

fn render_timeline(frame: &mut Frame, app: &AppState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(COLOR_BORDER))
        .title("Timeline");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(bounds) = model::timeline_bounds(&app.tasks, &app.filtered) else {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "no tasks match",
                Style::default().fg(COLOR_MUTED),
            )),
            inner,
        );
        return;
    };

    let label_width = 24u16;
    let bar_width = inner.width.saturating_sub(label_width + 2).max(10);

    let mut lines = vec![Line::from(vec![
        Span::styled(format!("{:<width$}", "", width = label_width as usize + 2), Style::default()),
        Span::styled(
            format!(
                "{} .. {}",
                bounds.0.format(DATE_FORMAT),
                bounds.1.format(DATE_FORMAT)
            ),
            Style::default().fg(COLOR_MUTED),
        ),
    ])];

    for &index in app
        .filtered
        .iter()
        .take(inner.height.saturating_sub(1) as usize)
    {
        let task = &app.tasks[index];
        let (offset, len) = model::timeline_bar(task, bounds, bar_width);
        let selected = app.selected == Some(index);
        let name_style = if selected {
            Style::default().fg(COLOR_TEXT).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(COLOR_TEXT)
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:<width$} ", clip(&task.name, 22), width = label_width as usize),
                name_style,
            ),
            Span::raw(" ".repeat(offset as usize)),
            Span::styled(
                "█".repeat(len as usize),
                Style::default().fg(status_color(task.status)),
            ),
        ]));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_detail(frame: &mut Frame, app: &AppState, area: Rect) {
    let Some(task) = app.detail_task() else {
        // the key handler drops back to the dashboard on the next event
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)].as_ref())
        .split(area);

    render_detail_main(frame, app, task, chunks[0]);
    render_detail_journal(frame, app, task, chunks[1]);
}

fn render_detail_main(frame: &mut Frame, app: &AppState, task: &Task, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(COLOR_BORDER))
        .title(format!("{} {}", task.project_id, clip(&task.name, 40)));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = vec![
        Line::from(vec![
            Span::styled("category ", Style::default().fg(COLOR_MUTED)),
            Span::styled(task.category.clone(), Style::default().fg(COLOR_TEXT)),
            Span::styled("   status ", Style::default().fg(COLOR_MUTED)),
            Span::styled(
                task.status.to_string(),
                Style::default().fg(status_color(task.status)),
            ),
            Span::styled("   progress ", Style::default().fg(COLOR_MUTED)),
            Span::styled(format!("{}%", task.progress), Style::default().fg(COLOR_TEXT)),
        ]),
        Line::from(vec![
            Span::styled("importance ", Style::default().fg(COLOR_MUTED)),
            Span::styled(task.importance.to_string(), Style::default().fg(COLOR_TEXT)),
            Span::styled("   urgency ", Style::default().fg(COLOR_MUTED)),
            Span::styled(task.urgency.to_string(), Style::default().fg(COLOR_TEXT)),
            Span::styled("   quadrant ", Style::default().fg(COLOR_MUTED)),
            Span::styled(
                task::quadrant(task).label(),
                Style::default().fg(COLOR_INFO),
            ),
        ]),
        Line::from(Span::styled(
            format!(
                "{} -> {}",
                task.start_date.format(DATE_FORMAT),
                task.due_date.format(DATE_FORMAT)
            ),
            Style::default().fg(COLOR_MUTED),
        )),
        Line::default(),
    ];

    if task.subtasks.is_empty() {
        lines.push(Line::from(Span::styled(
            "no sub-tasks",
            Style::default().fg(COLOR_MUTED),
        )));
    } else {
        let total = task.total_weight();
        let weight_style = if total == 100 {
            Style::default().fg(COLOR_SUCCESS)
        } else {
            Style::default().fg(COLOR_WARNING)
        };
        lines.push(Line::from(vec![
            Span::styled("Sub-tasks ", Style::default().fg(COLOR_TEXT)),
            Span::styled(format!("({total}% total weight)"), weight_style),
        ]));
        for (position, sub) in task.subtasks.iter().enumerate() {
            let cursor = if position == app.subtask_cursor { "> " } else { "  " };
            let mark = if sub.done { "[x]" } else { "[ ]" };
            let style = if sub.done {
                Style::default().fg(COLOR_SUCCESS)
            } else {
                Style::default().fg(COLOR_TEXT)
            };
            lines.push(Line::from(vec![
                Span::styled(cursor, Style::default().fg(COLOR_ACCENT)),
                Span::styled(
                    format!("{mark} {:<28} {:>3}%", clip(&sub.name, 28), sub.weight),
                    style,
                ),
            ]));
        }
    }

    if !task.notes.is_empty() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!("notes: {}", task.notes),
            Style::default().fg(COLOR_MUTED),
        )));
    }
    if !task.notebook.is_empty() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "Notebook",
            Style::default().fg(COLOR_TEXT),
        )));
        for text in task.notebook.lines() {
            lines.push(Line::from(Span::styled(
                format!("  {text}"),
                Style::default().fg(COLOR_MUTED),
            )));
        }
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn render_detail_journal(frame: &mut Frame, app: &AppState, task: &Task, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(COLOR_BORDER))
        .title("Journal");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let series = report::trend(&app.journal, &task.name);
    let mut lines = Vec::new();

    if let Some((_, cumulative)) = series.last() {
        lines.push(Line::from(Span::styled(
            format!("logged progress to date: +{cumulative}%"),
            Style::default().fg(COLOR_INFO),
        )));
        lines.push(Line::default());
    }

    let mut history: Vec<_> = app
        .journal
        .iter()
        .filter(|entry| entry.project == task.name)
        .collect();
    history.sort_by_key(|entry| std::cmp::Reverse(entry.date));

    if history.is_empty() {
        lines.push(Line::from(Span::styled(
            "no journal entries",
            Style::default().fg(COLOR_MUTED),
        )));
    } else {
        for entry in history
            .iter()
            .take(inner.height.saturating_sub(2) as usize)
        {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{} ", entry.date.format(DATE_FORMAT)),
                    Style::default().fg(COLOR_MUTED),
                ),
                Span::styled(
                    format!("+{:<3} ", entry.progress_delta),
                    Style::default().fg(COLOR_SUCCESS),
                ),
                Span::styled(clip(&entry.content, 40), Style::default().fg(COLOR_TEXT)),
            ]));
        }
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn clip(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        value.to_string()
    } else {
        let mut out: String = value.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
