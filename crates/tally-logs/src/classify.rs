use regex::Regex;

use tally_types::StatusMarker;

/// Score for a line mentioning "error" without a failing request
pub const SCORE_ERROR_TOKEN: u8 = 50;
/// Score for a request line answered with a 4xx status
pub const SCORE_CLIENT_ERROR: u8 = 80;
/// Score for a request line answered with a 5xx status
pub const SCORE_SERVER_ERROR: u8 = 100;

/// Derives a status marker and an emphasis score from raw line text
pub struct LineClassifier {
    error_token: Regex,
    request_status: Regex,
}

impl LineClassifier {
    pub fn new() -> Self {
        Self {
            error_token: Regex::new(r"\berror\b").expect("error token pattern is valid"),
            // `GET /x HTTP/1.1" 404` with or without the opening quote
            request_status: Regex::new(
                r#""?(?:GET|POST|PUT|DELETE|PATCH|OPTIONS|HEAD) [^"]* HTTP/\d(?:\.\d)?" (\d{3})\b"#,
            )
            .expect("request line pattern is valid"),
        }
    }

    /// Classify a raw line
    pub fn classify(&self, raw: &str) -> (StatusMarker, u8) {
        let mut score = 0;

        if self.error_token.is_match(&raw.to_lowercase()) {
            score = SCORE_ERROR_TOKEN;
        }

        if let Some(status) = self.request_status(raw) {
            match status {
                400..=499 => score = score.max(SCORE_CLIENT_ERROR),
                500..=599 => score = score.max(SCORE_SERVER_ERROR),
                _ => {}
            }
        }

        let marker = if score > 0 {
            StatusMarker::Notable
        } else {
            StatusMarker::Normal
        };

        (marker, score)
    }

    /// Status code following the first HTTP request line, if any
    fn request_status(&self, raw: &str) -> Option<u16> {
        self.request_status
            .captures(raw)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_line_status() {
        let c = LineClassifier::new();
        assert_eq!(
            c.classify(r#"GET /x HTTP/1.1" 404 512"#).0,
            StatusMarker::Notable
        );
        assert_eq!(
            c.classify(r#"GET /x HTTP/1.1" 200 512"#).0,
            StatusMarker::Normal
        );
    }

    #[test]
    fn test_access_log_line() {
        let c = LineClassifier::new();
        let line = r#"10.0.0.7 - - [10/Oct/2000:13:55:36 -0700] "POST /api/login HTTP/1.0" 503 12"#;
        assert_eq!(c.classify(line), (StatusMarker::Notable, SCORE_SERVER_ERROR));
    }

    #[test]
    fn test_error_token_is_case_insensitive_word() {
        let c = LineClassifier::new();
        assert_eq!(
            c.classify("2024-01-01T00:00:00Z ERROR: disk full"),
            (StatusMarker::Notable, SCORE_ERROR_TOKEN)
        );
        assert_eq!(c.classify("no errors here").0, StatusMarker::Normal);
        assert_eq!(c.classify("terror").0, StatusMarker::Normal);
    }

    #[test]
    fn test_bare_number_is_not_a_status() {
        let c = LineClassifier::new();
        assert_eq!(c.classify("processed 404 items"), (StatusMarker::Normal, 0));
    }

    #[test]
    fn test_http_failures_outrank_error_token() {
        let c = LineClassifier::new();
        let (_, plain) = c.classify("all good");
        let (_, token) = c.classify("an error occurred");
        let (_, client) = c.classify(r#""GET /missing HTTP/1.1" 404 0"#);
        let (_, server) = c.classify(r#""GET /boom HTTP/2" 500 0"#);
        assert!(plain < token);
        assert!(token < client);
        assert!(client < server);
    }
}
