use ratatui::widgets::{Block, Borders, Paragraph, Clear};
use ratatui::style::Style;
use ratatui::Frame;
use ratatui::layout::{Rect, Alignment};
use crate::Config;
use crate::tui::widgets::popup_area;
use crate::tui::widgets::color::parse_color;
use crate::utils::format_key_binding_for_display as key;

pub fn render_help(f: &mut Frame, area: Rect, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);

    let popup_area = popup_area(area, 60, 70);
    f.render_widget(Clear, popup_area);

    let paragraph = Paragraph::new(build_help_text(config))
        .block(Block::default()
            .borders(Borders::ALL)
            .title("Help - Key Bindings")
            .title_alignment(Alignment::Center)
            .style(Style::default().fg(fg_color).bg(bg_color)))
        .style(Style::default().fg(fg_color).bg(bg_color))
        .wrap(ratatui::widgets::Wrap { trim: true });

    f.render_widget(paragraph, popup_area);
}

pub fn build_help_text(config: &Config) -> String {
    let kb = &config.key_bindings;
    let mut text = String::new();

    text.push_str("Navigation:\n");
    text.push_str(&format!("  {} / {}: Switch tabs\n", key(&kb.tab_left), key(&kb.tab_right)));
    text.push_str(&format!(
        "  {} / {} / {}: Pending / Completed / All\n",
        key(&kb.tab_1),
        key(&kb.tab_2),
        key(&kb.tab_3)
    ));
    text.push_str(&format!("  {} / {}: Move selection up/down\n", key(&kb.list_up), key(&kb.list_down)));
    text.push('\n');

    text.push_str("Tasks:\n");
    text.push_str(&format!("  {}: Add task\n", key(&kb.new)));
    text.push_str(&format!("  {}: Edit selected task\n", key(&kb.edit)));
    text.push_str(&format!("  {}: Mark selected task completed\n", key(&kb.complete)));
    text.push_str(&format!("  {}: Delete selected task\n", key(&kb.delete)));
    text.push_str(&format!("  {}: Filter by category\n", key(&kb.filter)));
    text.push_str(&format!("  {}: Reload from server\n", key(&kb.refresh)));
    text.push('\n');

    text.push_str("Task Form:\n");
    text.push_str("  Tab / Shift+Tab: Next / previous field\n");
    text.push_str(&format!("  {} or Enter on the last field: Save\n", key(&kb.save)));
    text.push_str("  Esc: Cancel without saving\n");
    text.push('\n');

    text.push_str("General:\n");
    text.push_str(&format!("  {}: Quit\n", key(&kb.quit)));
    text.push_str(&format!("  {}: Show/hide help\n", key(&kb.help)));

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_lists_configured_bindings() {
        let mut config = Config::default();
        config.key_bindings.complete = "x".to_string();
        let text = build_help_text(&config);
        assert!(text.contains("x: Mark selected task completed"));
        assert!(text.contains("Filter by category"));
    }
}
