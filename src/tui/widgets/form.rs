use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::style::{Style, Modifier};
use ratatui::Frame;
use ratatui::layout::{Rect, Constraint, Layout, Direction};
use crate::Config;
use crate::tui::app::{TaskForm, TaskField};
use crate::tui::widgets::color::{parse_color, get_contrast_text_color};

/// Title of the form block: adding and editing share one form
pub fn form_title(form: &TaskForm) -> &'static str {
    if form.editing_id.is_some() { "Edit Task" } else { "Add Task" }
}

/// Render the four single-line task fields and place the cursor in the active one
pub fn render_task_form(f: &mut Frame, area: Rect, form: &mut TaskForm, config: &Config) {
    if area.width < 4 || area.height < 4 {
        return;
    }

    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = if active_theme.highlight_fg.is_empty() {
        get_contrast_text_color(highlight_bg)
    } else {
        parse_color(&active_theme.highlight_fg)
    };
    let highlight_style = Style::default().bg(highlight_bg).fg(highlight_fg);
    let inactive_field_style = Style::default().fg(fg_color).add_modifier(Modifier::DIM);

    let outer = Block::default()
        .borders(Borders::ALL)
        .title(form_title(form))
        .style(Style::default().fg(fg_color));
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    // Each field is a bordered box: top border, content line, bottom border
    let field_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(inner);

    let mut cursor = None;
    for (field, field_area) in TaskField::ORDER.iter().zip(field_areas.iter()) {
        let is_active = form.current_field == *field;
        let style = if is_active { highlight_style } else { inactive_field_style };

        let editor = match field {
            TaskField::Description => &mut form.description,
            TaskField::Category => &mut form.category,
            TaskField::Date => &mut form.date,
            TaskField::Time => &mut form.time,
        };
        editor.update_horizontal_scroll(field_area.width as usize);

        let paragraph = Paragraph::new(editor.visible_text(field_area.width as usize))
            .style(style)
            .block(Block::default().borders(Borders::ALL).title(field.label()));
        f.render_widget(paragraph, *field_area);

        if is_active {
            cursor = editor.get_cursor_screen_pos(*field_area);
        }
    }

    if let Some((x, y)) = cursor {
        f.set_cursor_position((x, y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewTask;
    use crate::models::Task;

    #[test]
    fn title_follows_form_purpose() {
        assert_eq!(form_title(&TaskForm::new()), "Add Task");

        let task = Task::new("abc".to_string(), NewTask::default());
        assert_eq!(form_title(&TaskForm::for_task(&task)), "Edit Task");
    }
}
