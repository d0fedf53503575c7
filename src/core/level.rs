//! Per-line severity and embedded JSON detection.

use serde::Serialize;

/// Severity guessed from keywords in a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Default,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Case-insensitive keyword scan; the most severe keyword wins.
    pub fn classify(line: &str) -> Self {
        let lower = line.to_lowercase();
        if ["error", "fail", "fatal", "exception"]
            .iter()
            .any(|k| lower.contains(k))
        {
            LogLevel::Error
        } else if lower.contains("warn") {
            LogLevel::Warn
        } else if lower.contains("info") {
            LogLevel::Info
        } else {
            LogLevel::Default
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Default => write!(f, "default"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// The span from the first `{` to the last `}` in `line`, if any.
pub fn json_span(line: &str) -> Option<&str> {
    let start = line.find('{')?;
    let end = line.rfind('}')?;
    (end > start).then(|| &line[start..=end])
}

/// Pretty-printed JSON embedded in `line`, when the span parses.
pub fn pretty_json(line: &str) -> Option<String> {
    let span = json_span(line)?;
    let value: serde_json::Value = serde_json::from_str(span).ok()?;
    serde_json::to_string_pretty(&value).ok()
}
