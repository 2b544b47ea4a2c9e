use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};

use crate::ui::Theme;

/// Status bar showing keyboard shortcuts on the left and store state on the right
pub struct StatusBar<'a> {
    hints: Vec<(&'a str, &'a str)>,
    right_text: Option<String>,
    warning: Option<String>,
}

impl<'a> StatusBar<'a> {
    pub fn new() -> Self {
        Self {
            hints: Vec::new(),
            right_text: None,
            warning: None,
        }
    }

    /// Add keyboard hints as (key, description) pairs
    pub fn hints<I>(mut self, hints: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.hints = hints.into_iter().collect();
        self
    }

    /// Set text to display on the right side
    pub fn right<S: Into<String>>(mut self, text: S) -> Self {
        self.right_text = Some(text.into());
        self
    }

    /// Emphasised text shown just before the right side
    pub fn warning<S: Into<String>>(mut self, text: S) -> Self {
        self.warning = Some(text.into());
        self
    }
}

impl Default for StatusBar<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Fill background
        buf.set_style(area, Theme::status_bar());

        // Build hints
        let mut spans = Vec::new();
        for (i, (key, desc)) in self.hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" ", Theme::status_bar()));
            }
            spans.push(Span::styled(format!("[{}]", key), Theme::status_bar_key()));
            spans.push(Span::styled(desc.to_string(), Theme::status_bar()));
        }

        let line = Line::from(spans);
        let line_width = line.width() as u16;

        // Right side: optional warning followed by the status text
        let mut right_spans = Vec::new();
        if let Some(warning) = self.warning {
            right_spans.push(Span::styled(warning, Theme::status_bar_warning()));
            right_spans.push(Span::styled(" ", Theme::status_bar()));
        }
        if let Some(right) = self.right_text {
            right_spans.push(Span::styled(right, Theme::status_bar()));
        }
        let right_line = Line::from(right_spans);
        let right_width = right_line.width() as u16;

        // Status wins over hints when space is short
        if right_width > 0 && right_width + 2 <= area.width {
            let right_x = area.x + area.width - right_width - 1;
            buf.set_line(right_x, area.y, &right_line, right_width);
            let hint_room = right_x.saturating_sub(area.x + 2);
            if line_width <= hint_room {
                buf.set_line(area.x + 1, area.y, &line, hint_room);
            }
        } else {
            buf.set_line(area.x + 1, area.y, &line, area.width.saturating_sub(2));
        }
    }
}

/// Default hints for the log viewer
pub fn viewer_hints() -> Vec<(&'static str, &'static str)> {
    vec![
        ("↑↓", "Move"),
        ("t", "Time"),
        ("s", "Source"),
        ("r", "Reload"),
        ("?", "Help"),
        ("q", "Quit"),
    ]
}
