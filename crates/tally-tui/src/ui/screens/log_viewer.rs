use chrono::{DateTime, Utc};
use ratatui::{
    Frame,
    layout::{Alignment, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};
use unicode_width::UnicodeWidthChar;

use tally_types::{LogLine, ViewportSnapshot};

use crate::app::{AppState, UiState};
use crate::ui::components::{StatusBar, viewer_hints};
use crate::ui::{Highlighter, Layout, Theme, truncate_spans};

/// Widest the source column is allowed to grow
const MAX_SOURCE_WIDTH: usize = 24;

/// Log viewer screen
pub struct LogViewerScreen;

impl LogViewerScreen {
    pub fn render(
        frame: &mut Frame,
        state: &AppState,
        snapshot: &ViewportSnapshot,
        highlighter: &Highlighter,
        now: DateTime<Utc>,
    ) {
        let (header, content, status) = Layout::main(frame.area());

        Self::render_header(frame, header, state, snapshot);
        if snapshot.is_empty() {
            Self::render_empty(frame, content, state, snapshot);
        } else {
            Self::render_logs(frame, content, &state.ui_state, snapshot, highlighter);
        }
        Self::render_status_bar(frame, status, snapshot, now);
    }

    fn render_header(frame: &mut Frame, area: Rect, state: &AppState, snapshot: &ViewportSnapshot) {
        let (reload_label, reload_style) = if snapshot.status.live_reload {
            ("● live", Style::default().fg(Theme::SUCCESS))
        } else {
            ("○ static", Theme::text_dim())
        };

        let title = Line::from(vec![
            Span::styled("tally", Theme::title()),
            Span::styled(" │ ", Theme::text_dim()),
            Span::styled(state.root.display().to_string(), Theme::text_highlight()),
            Span::styled(" │ ", Theme::text_dim()),
            Span::styled(format!("*{}", state.suffix), Theme::text()),
            Span::styled(" │ ", Theme::text_dim()),
            Span::styled(format!("{} files", snapshot.status.files), Theme::text()),
            Span::styled(" │ ", Theme::text_dim()),
            Span::styled(reload_label, reload_style),
        ]);

        let header = Paragraph::new(title).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border()),
        );

        frame.render_widget(header, area);
    }

    fn render_empty(frame: &mut Frame, area: Rect, state: &AppState, snapshot: &ViewportSnapshot) {
        let detail = if state.single_file {
            format!("{} has no content", state.root.display())
        } else {
            format!(
                "Nothing ending in '{}' with content under {}",
                state.suffix,
                state.root.display()
            )
        };
        let mut text = vec![
            Line::from(""),
            Line::from(Span::styled("No log lines", Theme::text_highlight())),
            Line::from(""),
            Line::from(Span::styled(detail, Theme::text_dim())),
        ];
        if let Some(err) = &snapshot.status.last_error {
            text.push(Line::from(""));
            text.push(Line::from(Span::styled(err.clone(), Theme::error())));
        }

        let empty = Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border())
                .title(Span::styled(" Lines ", Theme::title())),
        );

        frame.render_widget(empty, area);
    }

    fn render_logs(
        frame: &mut Frame,
        area: Rect,
        ui: &UiState,
        snapshot: &ViewportSnapshot,
        highlighter: &Highlighter,
    ) {
        let inner_height = area.height.saturating_sub(2) as usize;
        let show_scrollbar = snapshot.total > inner_height;
        let inner_width =
            area.width.saturating_sub(if show_scrollbar { 3 } else { 2 }) as usize;

        let visible = &snapshot.lines[..snapshot.lines.len().min(inner_height)];
        let source_width = if ui.show_sources {
            visible
                .iter()
                .map(|l| display_width(&l.source_name()))
                .max()
                .unwrap_or(0)
                .min(MAX_SOURCE_WIDTH)
        } else {
            0
        };

        let lines: Vec<Line> = visible
            .iter()
            .enumerate()
            .map(|(i, line)| {
                format_row(
                    line,
                    snapshot.selected == Some(i),
                    ui,
                    source_width,
                    inner_width,
                    highlighter,
                )
            })
            .collect();

        let title = match snapshot.selected_line {
            Some(selected) => format!(" Lines {}/{} ", selected + 1, snapshot.total),
            None => format!(" Lines ({}) ", snapshot.total),
        };

        let logs_widget = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border())
                .title(Span::styled(title, Theme::title())),
        );

        frame.render_widget(logs_widget, area);

        if show_scrollbar {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("▲"))
                .end_symbol(Some("▼"));

            let max_scroll = snapshot.total.saturating_sub(inner_height);
            let mut scrollbar_state = ScrollbarState::default()
                .content_length(max_scroll)
                .position(snapshot.scroll_offset.min(max_scroll));

            frame.render_stateful_widget(
                scrollbar,
                area.inner(Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scrollbar_state,
            );
        }
    }

    fn render_status_bar(frame: &mut Frame, area: Rect, snapshot: &ViewportSnapshot, now: DateTime<Utc>) {
        let mut bar = StatusBar::new()
            .hints(viewer_hints())
            .right(status_text(snapshot, now));

        if snapshot.status.last_error.is_some() {
            bar = bar.warning("⚠ reload failed");
        } else if !snapshot.status.live_reload {
            bar = bar.warning("not watching");
        }

        frame.render_widget(bar, area);
    }
}

/// Build the display row for one line
///
/// Columns: marker, optional time of day, optional source name, then the
/// highlighted line text cut to the remaining width.
fn format_row(
    line: &LogLine,
    selected: bool,
    ui: &UiState,
    source_width: usize,
    width: usize,
    highlighter: &Highlighter,
) -> Line<'static> {
    let mut spans = vec![
        Span::styled(
            line.marker().symbol(),
            Style::default()
                .fg(line.marker().color())
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
    ];

    if ui.show_timestamps {
        let time = if line.has_timestamp() {
            line.timestamp().format("%H:%M:%S").to_string()
        } else {
            "--:--:--".to_string()
        };
        spans.push(Span::styled(time, Theme::text_dim()));
        spans.push(Span::raw(" "));
    }

    if ui.show_sources && source_width > 0 {
        let name = line.source_name();
        spans.push(Span::styled(
            fit_width(&name, source_width),
            Style::default().fg(source_color(&name)),
        ));
        spans.push(Span::styled(" │ ", Theme::text_dim()));
    }

    let prefix_width: usize = spans.iter().map(Span::width).sum();
    let body = highlighter.spans(line.raw(), Style::default().fg(line.color()));
    spans.extend(truncate_spans(body, width.saturating_sub(prefix_width)));

    let row = Line::from(spans);
    if selected {
        row.style(Theme::row_selected())
    } else {
        row
    }
}

/// Right-hand status text: files, lines, skipped, position and reload age
fn status_text(snapshot: &ViewportSnapshot, now: DateTime<Utc>) -> String {
    let status = &snapshot.status;
    let mut parts = vec![
        format!("{} files", status.files),
        format!("{} lines", snapshot.total),
    ];
    if status.skipped > 0 {
        parts.push(format!("{} skipped", status.skipped));
    }
    if let Some(selected) = snapshot.selected_line {
        parts.push(format!("{}/{}", selected + 1, snapshot.total));
    }
    if let Some(loaded_at) = status.loaded_at {
        parts.push(format!("reloaded {}", format_age(now, loaded_at)));
    }
    parts.join(" │ ")
}

fn format_age(now: DateTime<Utc>, then: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds().max(0);
    match secs {
        0 => "just now".to_string(),
        1..=59 => format!("{}s ago", secs),
        60..=3599 => format!("{}m ago", secs / 60),
        _ => format!("{}h ago", secs / 3600),
    }
}

fn display_width(s: &str) -> usize {
    s.chars().map(|c| c.width().unwrap_or(0)).sum()
}

/// Pad or cut `s` to exactly `width` columns
fn fit_width(s: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.extend(std::iter::repeat_n(' ', width - used));
    out
}

/// Get a consistent color for a source file name
fn source_color(name: &str) -> Color {
    let hash: u32 = name.bytes().fold(0u32, |acc, b| acc.wrapping_add(b as u32));

    let colors = [
        Color::Cyan,
        Color::Magenta,
        Color::Blue,
        Color::Green,
        Color::LightCyan,
        Color::LightMagenta,
        Color::LightBlue,
        Color::LightGreen,
    ];

    colors[(hash as usize) % colors.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ratatui::{Terminal, backend::TestBackend, buffer::Buffer};
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use tally_types::{StatusMarker, StoreStatus};

    fn log_line(source: &str, raw: &str, ts: Option<DateTime<Utc>>, marker: StatusMarker) -> LogLine {
        let source: Arc<Path> = Arc::from(PathBuf::from(source));
        LogLine::new(source, raw.to_string(), ts, marker, 0)
    }

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn screen_text(buf: &Buffer) -> String {
        let area = buf.area;
        let mut out = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_format_row_columns() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 9, 5, 7).unwrap();
        let line = log_line("/var/log/app.log", "hello", Some(ts), StatusMarker::Notable);
        let ui = UiState::default();
        let row = format_row(&line, false, &ui, 8, 80, &Highlighter::new());
        assert_eq!(text(&row), "? 09:05:07 app.log  │ hello");
    }

    #[test]
    fn test_format_row_without_timestamp_or_sources() {
        let line = log_line("a.log", "plain", None, StatusMarker::Normal);
        let mut ui = UiState::default();
        let row = format_row(&line, false, &ui, 5, 80, &Highlighter::new());
        assert!(text(&row).starts_with("  --:--:-- a.log │ "));

        ui.show_timestamps = false;
        ui.show_sources = false;
        let row = format_row(&line, true, &ui, 5, 80, &Highlighter::new());
        assert_eq!(text(&row), "  plain");
        assert_eq!(row.style, Theme::row_selected());
    }

    #[test]
    fn test_format_row_truncates_to_width() {
        let line = log_line("a.log", "abcdefghijklmnopqrstuvwxyz", None, StatusMarker::Normal);
        let ui = UiState {
            show_timestamps: false,
            show_sources: false,
            ..UiState::default()
        };
        let row = format_row(&line, false, &ui, 0, 10, &Highlighter::new());
        assert_eq!(text(&row), "  abcdefg…");
        assert_eq!(row.width(), 10);
    }

    #[test]
    fn test_status_text() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let snapshot = ViewportSnapshot {
            total: 40,
            selected_line: Some(9),
            status: StoreStatus {
                files: 3,
                skipped: 1,
                loaded_at: Some(now - chrono::Duration::seconds(12)),
                ..StoreStatus::default()
            },
            ..ViewportSnapshot::default()
        };
        assert_eq!(
            status_text(&snapshot, now),
            "3 files │ 40 lines │ 1 skipped │ 10/40 │ reloaded 12s ago"
        );
    }

    #[test]
    fn test_format_age() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(format_age(now, now), "just now");
        assert_eq!(format_age(now, now - chrono::Duration::seconds(125)), "2m ago");
        assert_eq!(format_age(now, now - chrono::Duration::hours(3)), "3h ago");
        // Clock skew never shows a negative age
        assert_eq!(format_age(now, now + chrono::Duration::seconds(5)), "just now");
    }

    #[test]
    fn test_fit_width() {
        assert_eq!(fit_width("app.log", 9), "app.log  ");
        assert_eq!(fit_width("verylongname.log", 4), "very");
        assert_eq!(fit_width("日本.log", 3), "日 ");
    }

    #[test]
    fn test_render_empty_state() {
        let backend = TestBackend::new(70, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        let state = AppState::new(PathBuf::from("/srv/logs"), ".log");
        let snapshot = ViewportSnapshot::default();

        terminal
            .draw(|frame| {
                LogViewerScreen::render(frame, &state, &snapshot, &Highlighter::new(), Utc::now())
            })
            .unwrap();

        let screen = screen_text(terminal.backend().buffer());
        assert!(screen.contains("No log lines"));
        assert!(screen.contains("Nothing ending in '.log'"));
        assert!(screen.contains("/srv/logs"));
    }

    #[test]
    fn test_render_empty_single_file() {
        let backend = TestBackend::new(70, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut state = AppState::new(PathBuf::from("/var/log/syslog"), ".log");
        state.single_file = true;

        terminal
            .draw(|frame| {
                LogViewerScreen::render(
                    frame,
                    &state,
                    &ViewportSnapshot::default(),
                    &Highlighter::new(),
                    Utc::now(),
                )
            })
            .unwrap();

        let screen = screen_text(terminal.backend().buffer());
        assert!(screen.contains("/var/log/syslog has no content"));
        assert!(!screen.contains("Nothing ending in"));
    }

    #[test]
    fn test_time_column_agrees_with_highlighted_access_time() {
        let ts = Utc.with_ymd_and_hms(2000, 10, 10, 20, 55, 36).unwrap();
        let line = log_line(
            "access.log",
            "[10/Oct/2000:13:55:36 -0700] GET",
            Some(ts),
            StatusMarker::Normal,
        );
        let ui = UiState {
            show_sources: false,
            ..UiState::default()
        };
        let row = format_row(&line, false, &ui, 0, 80, &Highlighter::new());
        assert_eq!(text(&row), "  20:55:36 [20:55:36] GET");
    }

    #[test]
    fn test_render_visible_slice() {
        let backend = TestBackend::new(70, 10);
        let mut terminal = Terminal::new(backend).unwrap();
        let state = AppState::new(PathBuf::from("logs"), ".log");
        let lines: Vec<_> = ["first entry", "second entry", "third entry"]
            .iter()
            .map(|raw| Arc::new(log_line("a.log", raw, None, StatusMarker::Normal)))
            .collect();
        let snapshot = ViewportSnapshot {
            lines,
            selected: Some(2),
            selected_line: Some(2),
            scroll_offset: 0,
            viewport_height: 4,
            total: 3,
            status: StoreStatus::default(),
        };

        terminal
            .draw(|frame| {
                LogViewerScreen::render(frame, &state, &snapshot, &Highlighter::new(), Utc::now())
            })
            .unwrap();

        let screen = screen_text(terminal.backend().buffer());
        assert!(screen.contains("first entry"));
        assert!(screen.contains("third entry"));
        assert!(screen.contains(" Lines 3/3 "));
    }
}
