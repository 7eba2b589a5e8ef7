use ratatui::layout::{Rect, Layout as RatLayout, Direction, Constraint};

pub struct Layout {
    pub inner_area: Rect,  // Area inside the outer border
    pub tabs_area: Rect,
    pub main_area: Rect,
    pub info_area: Rect,
    pub status_area: Rect,
}

impl Layout {
    /// Minimum terminal dimensions required for the application
    /// Height: tabs + table header and one row with borders + info line + status line
    pub const MIN_WIDTH: u16 = 40;
    pub const MIN_HEIGHT: u16 = 8;

    pub fn calculate(size: Rect) -> Self {
        let width = size.width.max(Self::MIN_WIDTH + 2);
        let height = size.height.max(Self::MIN_HEIGHT + 2);
        let size = Rect::new(size.x, size.y, width, height);

        // Inside the outer border: 1 char on each side
        let inner_area = Rect::new(
            size.x + 1,
            size.y + 1,
            size.width.saturating_sub(2),
            size.height.saturating_sub(2),
        );

        let vertical = RatLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Tabs
                Constraint::Min(1),    // Task table or form
                Constraint::Length(1), // Server and filter info
                Constraint::Length(1), // Status
            ])
            .split(inner_area);

        Self {
            inner_area,
            tabs_area: vertical[0],
            main_area: vertical[1],
            info_area: vertical[2],
            status_area: vertical[3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_inside_the_border() {
        let layout = Layout::calculate(Rect::new(0, 0, 80, 24));
        assert_eq!(layout.inner_area, Rect::new(1, 1, 78, 22));
        assert_eq!(layout.tabs_area.height, 1);
        assert_eq!(layout.main_area.height, 19);
        assert_eq!(layout.status_area.y, 22);
    }

    #[test]
    fn tiny_terminal_is_padded_to_minimum() {
        let layout = Layout::calculate(Rect::new(0, 0, 10, 3));
        assert_eq!(layout.inner_area.width, Layout::MIN_WIDTH);
        assert_eq!(layout.inner_area.height, Layout::MIN_HEIGHT);
    }
}
