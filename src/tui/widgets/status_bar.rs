use ratatui::widgets::Paragraph;
use ratatui::style::{Style, Modifier};
use ratatui::Frame;
use ratatui::layout::Rect;
use crate::Config;
use crate::tui::app::{MessageKind, StatusMessage};
use crate::tui::widgets::color::{parse_color, get_contrast_text_color};
use crate::utils::truncate_with_ellipsis;

const SEPARATOR: &str = " • ";

/// Join as many hints as fit in `max_width`, ending with "..." when some are dropped
pub fn fit_key_hints(key_hints: &[String], max_width: usize) -> String {
    let mut hints_text = String::new();
    for (i, hint) in key_hints.iter().enumerate() {
        let addition = if i == 0 { hint.clone() } else { format!("{}{}", SEPARATOR, hint) };
        let would_be_len = hints_text.chars().count() + addition.chars().count();

        if would_be_len > max_width {
            if i == 0 {
                return truncate_with_ellipsis(hint, max_width);
            }
            let current_len = hints_text.chars().count();
            if current_len + 3 > max_width {
                hints_text = hints_text.chars().take(max_width.saturating_sub(3)).collect();
            }
            hints_text.push_str("...");
            break;
        }
        hints_text.push_str(&addition);
    }
    hints_text
}

pub fn render_status_bar(
    f: &mut Frame,
    area: Rect,
    message: Option<&StatusMessage>,
    key_hints: &[String],
    config: &Config,
) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let max_width = area.width as usize;

    let (content, style) = match message {
        Some(msg) => {
            // Failures use the theme's "late" color so they stand out from confirmations
            let msg_bg = match msg.kind {
                MessageKind::Info => parse_color(&active_theme.highlight_bg),
                MessageKind::Error => parse_color(&active_theme.late),
            };
            let msg_fg = get_contrast_text_color(msg_bg);
            (
                truncate_with_ellipsis(&msg.text, max_width),
                Style::default().fg(msg_fg).bg(msg_bg).add_modifier(Modifier::BOLD),
            )
        }
        None => (fit_key_hints(key_hints, max_width), Style::default().fg(fg_color).bg(bg_color)),
    };

    let paragraph = Paragraph::new(content).style(style);
    f.render_widget(paragraph, area);
}
