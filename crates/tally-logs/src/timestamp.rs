use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;

/// Parses a matched substring into a point in time
type ParseFn = fn(&str) -> Option<DateTime<Utc>>;

/// A timestamp shape paired with the one format used to parse it
pub struct Recognizer {
    name: &'static str,
    pattern: Regex,
    parse: ParseFn,
}

impl Recognizer {
    /// Build a recognizer. If the pattern has a capture group, group 1 is the
    /// text handed to `parse`; otherwise the whole match is.
    pub fn new(name: &'static str, pattern: &str, parse: ParseFn) -> Result<Self, regex::Error> {
        Ok(Self {
            name,
            pattern: Regex::new(pattern)?,
            parse,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Locate this shape in `raw`; `None` if the shape does not occur at all,
    /// `Some(None)` if it occurs but does not parse.
    fn recognize(&self, raw: &str) -> Option<Option<DateTime<Utc>>> {
        let caps = self.pattern.captures(raw)?;
        let text = caps.get(1).or_else(|| caps.get(0))?.as_str();
        Some((self.parse)(text))
    }
}

/// Locates and parses an embedded timestamp using an ordered table of recognizers
///
/// The first recognizer whose pattern occurs anywhere in the line decides the
/// outcome: a malformed match yields no timestamp rather than falling through
/// to later recognizers.
pub struct TimestampExtractor {
    recognizers: Vec<Recognizer>,
}

impl TimestampExtractor {
    /// Extractor for common log shapes, in priority order: bracketed access-log,
    /// ISO-8601 with zone, ISO-8601 without zone (read as UTC), and `ctime`.
    pub fn new() -> Self {
        let recognizers = vec![
            Recognizer::new(
                "access-log",
                r"\[(\d{2}/[A-Za-z]{3}/\d{4}:\d{2}:\d{2}:\d{2} [+-]\d{4})\]",
                parse_access_log,
            ),
            Recognizer::new(
                "iso8601",
                r"\d{4}-\d{2}-\d{2}[Tt]\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:[Zz]|[+-]\d{2}:?\d{2})",
                parse_iso_zoned,
            ),
            Recognizer::new(
                "iso8601-local",
                r"\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(?:\.\d+)?",
                parse_iso_local,
            ),
            Recognizer::new(
                "ctime",
                r"\b[A-Z][a-z]{2} [A-Z][a-z]{2} +\d{1,2} \d{2}:\d{2}:\d{2} \d{4}\b",
                parse_ctime,
            ),
        ];

        Self {
            recognizers: recognizers
                .into_iter()
                .collect::<Result<_, _>>()
                .expect("built-in timestamp patterns are valid"),
        }
    }

    /// Append a recognizer with the lowest priority
    pub fn with_recognizer(mut self, recognizer: Recognizer) -> Self {
        self.recognizers.push(recognizer);
        self
    }

    /// Names of the recognizers in priority order
    pub fn recognizer_names(&self) -> Vec<&'static str> {
        self.recognizers.iter().map(Recognizer::name).collect()
    }

    /// Extract the timestamp from a raw line, if one is recognized
    pub fn extract(&self, raw: &str) -> Option<DateTime<Utc>> {
        self.recognizers
            .iter()
            .find_map(|r| r.recognize(raw))
            .flatten()
    }
}

impl Default for TimestampExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// `10/Oct/2000:13:55:36 -0700`
fn parse_access_log(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(text, "%d/%b/%Y:%H:%M:%S %z")
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

/// `2024-01-15T10:30:00.123Z`, `2024-01-15T10:30:00+02:00`, `2024-01-15T10:30:00+0200`
fn parse_iso_zoned(text: &str) -> Option<DateTime<Utc>> {
    // `\d` also matches non-ASCII digits
    if !text.is_ascii() {
        return None;
    }
    let mut normalized = text.to_ascii_uppercase();
    // RFC 3339 wants `+hh:mm`
    if !normalized.ends_with('Z') && !normalized[..normalized.len() - 2].ends_with(':') {
        normalized.insert(normalized.len() - 2, ':');
    }
    DateTime::parse_from_rfc3339(&normalized)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

/// `2024-01-15 10:30:00` or `2024-01-15T10:30:00.5`
fn parse_iso_local(text: &str) -> Option<DateTime<Utc>> {
    let normalized = text.replacen(' ', "T", 1);
    NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|ts| ts.and_utc())
}

/// `Mon Jan  2 15:04:05 2006`
fn parse_ctime(text: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text, "%a %b %d %H:%M:%S %Y")
        .ok()
        .map(|ts| ts.and_utc())
}
