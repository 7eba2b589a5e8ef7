use ratatui::widgets::{Block, Borders, Cell, Row, Table, TableState, Scrollbar, ScrollbarState, ScrollbarOrientation};
use ratatui::style::{Style, Modifier};
use ratatui::Frame;
use ratatui::layout::{Rect, Constraint, Layout, Direction};
use crate::models::Task;
use crate::status::TaskStatus;
use crate::Config;
use crate::tui::widgets::color::{parse_color, get_contrast_text_color};

const HEADERS: [&str; 7] = ["#", "Description", "Category", "Date", "Time", "Status", "Completed At"];

/// Cell text for one row; numbering starts at 1
pub fn row_cells(index: usize, task: &Task) -> [String; 7] {
    // Pending rows leave status blank, as the task list always has
    let status = if task.completed { task.status.to_string() } else { String::new() };
    let completed_at = task
        .completed_at
        .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_default();

    [
        (index + 1).to_string(),
        task.description.clone(),
        task.category.clone(),
        task.date.clone(),
        task.time.clone(),
        status,
        completed_at,
    ]
}

pub fn render_task_table(
    f: &mut Frame,
    area: Rect,
    title: &str,
    tasks: &[&Task],
    table_state: &mut TableState,
    config: &Config,
) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = if active_theme.highlight_fg.is_empty() {
        get_contrast_text_color(highlight_bg)
    } else {
        parse_color(&active_theme.highlight_fg)
    };
    let on_time = parse_color(&active_theme.on_time);
    let late = parse_color(&active_theme.late);

    let header = Row::new(HEADERS.iter().map(|h| Cell::from(*h)))
        .style(Style::default().fg(fg_color).add_modifier(Modifier::BOLD))
        .bottom_margin(0);

    let rows: Vec<Row> = tasks
        .iter()
        .enumerate()
        .map(|(index, task)| {
            let status_style = match task.status {
                TaskStatus::CompletedOnTime => Style::default().fg(on_time),
                TaskStatus::CompletedLate => Style::default().fg(late),
                TaskStatus::Incomplete => Style::default(),
            };
            let cells = row_cells(index, task);
            Row::new(cells.into_iter().enumerate().map(|(column, text)| {
                if column == 5 {
                    Cell::from(text).style(status_style)
                } else {
                    Cell::from(text)
                }
            }))
        })
        .collect();

    // Split area to reserve space for scrollbar
    let areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);
    let table_area = areas[0];
    let scrollbar_area = areas[1];

    let widths = [
        Constraint::Length(4),
        Constraint::Fill(3),
        Constraint::Fill(1),
        Constraint::Length(10),
        Constraint::Length(8),
        Constraint::Length(17),
        Constraint::Length(20),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(format!("{} ({})", title, tasks.len())))
        .style(Style::default().fg(fg_color))
        .row_highlight_style(Style::default().fg(highlight_fg).bg(highlight_bg))
        .column_spacing(1);

    f.render_stateful_widget(table, table_area, table_state);

    if tasks.is_empty() {
        return;
    }

    // Header row plus two borders are not scrollable content
    let visible_rows = table_area.height.saturating_sub(3) as usize;
    if tasks.len() > visible_rows && scrollbar_area.width > 0 && table_area.height > 3 {
        let scrollbar_inner_area = Rect::new(
            scrollbar_area.x,
            table_area.y + 2,
            scrollbar_area.width,
            table_area.height.saturating_sub(3),
        );

        let mut scrollbar_state = ScrollbarState::new(tasks.len())
            .viewport_content_length(visible_rows)
            .position(table_state.selected().unwrap_or(0));

        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"))
            .track_symbol(Some("│"))
            .thumb_symbol("█");

        f.render_stateful_widget(scrollbar, scrollbar_inner_area, &mut scrollbar_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewTask;
    use chrono::{TimeZone, Utc};

    fn task() -> Task {
        Task::new(
            "1".to_string(),
            NewTask {
                description: "Write report".to_string(),
                category: "work".to_string(),
                date: "2024-01-01".to_string(),
                time: "09:00".to_string(),
            },
        )
    }

    #[test]
    fn pending_row_has_blank_status() {
        let cells = row_cells(0, &task());
        assert_eq!(cells[0], "1");
        assert_eq!(cells[1], "Write report");
        assert_eq!(cells[5], "");
        assert_eq!(cells[6], "");
    }

    #[test]
    fn completed_row_shows_status_and_time() {
        let mut t = task();
        t.completed = true;
        t.completed_at = Some(Utc.with_ymd_and_hms(2024, 1, 1, 8, 30, 0).unwrap());
        t.refresh_status();

        let cells = row_cells(2, &t);
        assert_eq!(cells[0], "3");
        assert_eq!(cells[5], "Completed on time");
        assert_eq!(cells[6], "2024-01-01 08:30 UTC");
    }
}
