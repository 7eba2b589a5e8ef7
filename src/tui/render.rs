use ratatui::Frame;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::style::{Style, Modifier};
use crate::tui::{App, Layout, Mode};
use crate::tui::widgets::{
    tabs::render_tabs,
    task_table::render_task_table,
    status_bar::render_status_bar,
    help::render_help,
    form::render_task_form,
    color::parse_color,
    confirm_delete::render_confirm_delete,
    filter_modal::render_filter_modal,
};
use crate::utils::{format_key_binding_for_display as key, truncate_with_ellipsis};

pub fn render(f: &mut Frame, app: &mut App, layout: &Layout) {
    let active_theme = app.config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title("OnTrack")
        .title_alignment(ratatui::layout::Alignment::Center)
        .style(Style::default().fg(fg_color).bg(bg_color));
    f.render_widget(outer_block, f.area());

    render_tabs(f, layout.tabs_area, app.ui.current_tab, &app.board, &app.config);

    // The form replaces the table while open; popups draw over the table
    match (app.ui.mode, app.form.as_mut()) {
        (Mode::Form, Some(form)) => render_task_form(f, layout.main_area, form, &app.config),
        _ => {
            let tasks = app.board.view(app.ui.current_tab);
            let title = app.ui.current_tab.title();
            render_task_table(f, layout.main_area, title, &tasks, &mut app.ui.table_state, &app.config);
        }
    }

    let info = info_line(app);
    let info = Paragraph::new(truncate_with_ellipsis(&info, layout.info_area.width as usize))
        .style(Style::default().fg(fg_color).add_modifier(Modifier::DIM));
    f.render_widget(info, layout.info_area);

    match app.ui.mode {
        Mode::Help => render_help(f, f.area(), &app.config),
        Mode::Filter => render_filter_modal(f, f.area(), &mut app.filter_editor, &app.config),
        Mode::ConfirmDelete => {
            if let Some(ref task) = app.delete_confirmation {
                render_confirm_delete(f, f.area(), task, app.delete_modal_selection, &app.config);
            }
        }
        Mode::View | Mode::Form => {}
    }

    let key_hints = get_key_hints(app);
    render_status_bar(f, layout.status_area, app.status.as_ref(), &key_hints, &app.config);
}

/// Server the client talks to and the active category filter
pub fn info_line(app: &App) -> String {
    let category = app.board.category().unwrap_or("all categories");
    format!("Server: {} • Category: {}", app.client.base_url(), category)
}

pub fn get_key_hints(app: &App) -> Vec<String> {
    let kb = &app.config.key_bindings;
    match app.ui.mode {
        Mode::Help => vec![format!("Esc or {}: Exit help", key(&kb.help))],
        Mode::Form => vec![
            "Tab: Next field".to_string(),
            "Shift+Tab: Previous field".to_string(),
            format!("{}: Save", key(&kb.save)),
            "Esc: Cancel".to_string(),
        ],
        Mode::Filter => vec!["Enter: Apply filter".to_string(), "Esc: Cancel".to_string()],
        Mode::ConfirmDelete => vec![
            "↑/↓: Choose".to_string(),
            "Enter: Confirm".to_string(),
            "Esc: Cancel".to_string(),
        ],
        Mode::View => vec![
            format!("{}: Quit", key(&kb.quit)),
            format!("{}: New", key(&kb.new)),
            format!("{}: Edit", key(&kb.edit)),
            format!("{}: Complete", key(&kb.complete)),
            format!("{}: Delete", key(&kb.delete)),
            format!("{}: Filter", key(&kb.filter)),
            format!("{}: Refresh", key(&kb.refresh)),
            format!("{}: Help", key(&kb.help)),
        ],
    }
}
