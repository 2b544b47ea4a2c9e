use ratatui::{
    Frame,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::ui::Layout;

/// Help overlay showing keybindings
pub struct HelpOverlay;

impl HelpOverlay {
    pub fn render(frame: &mut Frame) {
        let popup_area = Layout::centered(frame.area(), 44, 22);

        // Clear the background
        frame.render_widget(Clear, popup_area);

        let help_text = vec![
            Line::from(Span::styled(
                "Keybindings",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![Span::styled(
                "Navigation",
                Style::default().fg(Color::Yellow),
            )]),
            Self::key_line("j/↓", "Next line"),
            Self::key_line("k/↑", "Previous line"),
            Self::key_line("PgDn/^d", "Page down"),
            Self::key_line("PgUp/^u", "Page up"),
            Self::key_line("g/Home", "First line"),
            Self::key_line("G/End", "Last line"),
            Line::from(""),
            Line::from(vec![Span::styled(
                "Display",
                Style::default().fg(Color::Yellow),
            )]),
            Self::key_line("t", "Toggle time column"),
            Self::key_line("s", "Toggle source column"),
            Line::from(""),
            Line::from(vec![Span::styled(
                "Actions",
                Style::default().fg(Color::Yellow),
            )]),
            Self::key_line("r", "Reload files now"),
            Self::key_line("?", "Toggle this help"),
            Self::key_line("Esc/q", "Quit"),
        ];

        let help_widget = Paragraph::new(help_text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(Span::styled(
                    " Help ",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )),
        );

        frame.render_widget(help_widget, popup_area);
    }

    fn key_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
        Line::from(vec![
            Span::styled(format!("  {:>8}", key), Style::default().fg(Color::Green)),
            Span::styled(format!("  {}", desc), Style::default().fg(Color::White)),
        ])
    }
}
