use ratatui::widgets::{Block, Borders, Paragraph, Clear};
use ratatui::style::Style;
use ratatui::Frame;
use ratatui::layout::{Rect, Alignment, Constraint, Layout, Direction};
use crate::Config;
use crate::tui::widgets::editor::Editor;
use crate::tui::widgets::popup_area;
use crate::tui::widgets::color::{parse_color, get_contrast_text_color};

/// Category filter prompt; an empty value clears the filter
pub fn render_filter_modal(f: &mut Frame, area: Rect, editor: &mut Editor, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = get_contrast_text_color(highlight_bg);

    let popup_area = popup_area(area, 50, 30);
    f.render_widget(Clear, popup_area);

    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title("Filter by Category")
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(fg_color).bg(bg_color));
    let inner_area = outer_block.inner(popup_area);
    f.render_widget(outer_block, popup_area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Category field
            Constraint::Min(1),    // Instructions
        ])
        .split(inner_area);

    let field_area = vertical[0];
    editor.update_horizontal_scroll(field_area.width as usize);
    let field = Paragraph::new(editor.visible_text(field_area.width as usize))
        .style(Style::default().fg(highlight_fg).bg(highlight_bg))
        .block(Block::default().borders(Borders::ALL).title("Category"));
    f.render_widget(field, field_area);

    let instructions = Paragraph::new("Enter: Apply • Leave empty to show every category • Esc: Cancel")
        .style(Style::default().fg(fg_color).bg(bg_color))
        .wrap(ratatui::widgets::Wrap { trim: true });
    f.render_widget(instructions, vertical[1]);

    if let Some((x, y)) = editor.get_cursor_screen_pos(field_area) {
        f.set_cursor_position((x, y));
    }
}
