use ratatui::layout::{Constraint, Direction, Layout as RatatuiLayout, Rect};

/// Layout helper for consistent screen layouts
pub struct Layout;

impl Layout {
    /// Rows taken by the header block
    pub const HEADER_ROWS: u16 = 3;

    /// Rows taken by the status bar
    pub const STATUS_ROWS: u16 = 1;

    /// Top and bottom border of the log block
    pub const LOG_BORDER_ROWS: u16 = 2;

    /// Create the main layout with header, content, and status bar
    pub fn main(area: Rect) -> (Rect, Rect, Rect) {
        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(Self::HEADER_ROWS), // Header
                Constraint::Min(1),                    // Content
                Constraint::Length(Self::STATUS_ROWS), // Status bar
            ])
            .split(area);

        (chunks[0], chunks[1], chunks[2])
    }

    /// Number of log rows available on a terminal `height` rows tall
    ///
    /// This is the viewport height the store should be resized to.
    pub fn log_rows(height: u16) -> usize {
        let chrome = Self::HEADER_ROWS + Self::STATUS_ROWS + Self::LOG_BORDER_ROWS;
        usize::from(height.saturating_sub(chrome)).max(1)
    }

    /// A rectangle of at most `width` x `height` centered in `area`
    pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
        let width = width.min(area.width.saturating_sub(4));
        let height = height.min(area.height.saturating_sub(4));
        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height.saturating_sub(height) / 2;
        Rect::new(x, y, width, height)
    }
}
