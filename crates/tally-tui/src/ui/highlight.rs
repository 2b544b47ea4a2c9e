use chrono::{DateTime, Utc};
use ratatui::{
    style::{Modifier, Style},
    text::Span,
};
use regex::Regex;
use unicode_width::UnicodeWidthChar;

use crate::ui::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Token {
    /// Access-log timestamp, shown as its UTC time of day
    Time,
    /// IPv4 address, shown as its last octet
    Address,
    Method,
    Status,
}

impl Token {
    fn style(self, base: Style) -> Style {
        match self {
            Self::Time => base.fg(Theme::TOKEN_TIME),
            Self::Address => base.fg(Theme::TOKEN_ADDRESS),
            Self::Method => base.fg(Theme::TOKEN_METHOD).add_modifier(Modifier::BOLD),
            Self::Status => base.fg(Theme::TOKEN_STATUS).add_modifier(Modifier::BOLD),
        }
    }
}

struct Rule {
    token: Token,
    pattern: Regex,
}

/// Splits a raw line into styled spans for display.
///
/// Access-log timestamps are condensed to a UTC `HH:MM:SS`, matching the time
/// column, and IPv4 addresses to
/// `...<last octet>`; HTTP methods and 4xx/5xx codes are emphasised. Display
/// only: the stored line is never altered.
pub struct Highlighter {
    rules: Vec<Rule>,
}

impl Highlighter {
    pub fn new() -> Self {
        let rule = |token, pattern: &str| Rule {
            token,
            pattern: Regex::new(pattern).expect("built-in highlight pattern"),
        };

        Self {
            rules: vec![
                rule(Token::Time, r"\d{2}/[A-Za-z]{3}/\d{4}:(\d{2}:\d{2}:\d{2}) [+-]\d{4}"),
                rule(Token::Address, r"\b(?:\d{1,3}\.){3}(\d{1,3})\b"),
                rule(Token::Method, r"\b(?:GET|POST|PUT|DELETE|PATCH|OPTIONS|HEAD)\b"),
                rule(Token::Status, r"\b[45]\d{2}\b"),
            ],
        }
    }

    pub fn spans(&self, raw: &str, base: Style) -> Vec<Span<'static>> {
        // (start, end, rule index, replacement text)
        let mut found: Vec<(usize, usize, usize, String)> = Vec::new();

        for (idx, rule) in self.rules.iter().enumerate() {
            for caps in rule.pattern.captures_iter(raw) {
                let Some(whole) = caps.get(0) else { continue };
                let shown = match rule.token {
                    Token::Time => utc_time_of_day(whole.as_str()).unwrap_or_else(|| {
                        caps.get(1).map_or(whole.as_str(), |m| m.as_str()).to_string()
                    }),
                    Token::Address => {
                        format!("...{}", caps.get(1).map_or("", |m| m.as_str()))
                    }
                    Token::Method | Token::Status => whole.as_str().to_string(),
                };
                found.push((whole.start(), whole.end(), idx, shown));
            }
        }

        // Earliest match wins; ties go to the rule listed first
        found.sort_by_key(|&(start, _, idx, _)| (start, idx));

        let mut spans = Vec::new();
        let mut cursor = 0;
        for (start, end, idx, shown) in found {
            if start < cursor {
                continue;
            }
            if start > cursor {
                spans.push(Span::styled(raw[cursor..start].to_string(), base));
            }
            spans.push(Span::styled(shown, self.rules[idx].token.style(base)));
            cursor = end;
        }
        if cursor < raw.len() {
            spans.push(Span::styled(raw[cursor..].to_string(), base));
        }

        spans
    }
}

/// `10/Oct/2000:13:55:36 -0700` as `20:55:36`
fn utc_time_of_day(text: &str) -> Option<String> {
    DateTime::parse_from_str(text, "%d/%b/%Y:%H:%M:%S %z")
        .ok()
        .map(|ts| ts.with_timezone(&Utc).format("%H:%M:%S").to_string())
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

/// Cut spans to at most `width` terminal columns, ending with an ellipsis
/// when anything was dropped
pub fn truncate_spans(spans: Vec<Span<'static>>, width: usize) -> Vec<Span<'static>> {
    let total: usize = spans.iter().map(Span::width).sum();
    if total <= width {
        return spans;
    }
    if width == 0 {
        return Vec::new();
    }

    let budget = width - 1;
    let mut used = 0;
    let mut out = Vec::new();

    for span in spans {
        let w = span.width();
        if used + w <= budget {
            used += w;
            out.push(span);
            continue;
        }

        let mut cut = String::new();
        for ch in span.content.chars() {
            let cw = ch.width().unwrap_or(0);
            if used + cw > budget {
                break;
            }
            used += cw;
            cut.push(ch);
        }
        if !cut.is_empty() {
            out.push(Span::styled(cut, span.style));
        }
        break;
    }

    out.push(Span::styled("…", Theme::text_dim()));
    out
}
