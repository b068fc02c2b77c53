//! Formatting of lines written to the shared log.

use std::fmt;

use chrono::{Local, NaiveDateTime};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// One line of job output tagged with its source.
///
/// Rendered as `<timestamp> <[tag] padded to 10> <body>\n`, with a `*`
/// after the tag when the line went through the fallback sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine<'a> {
    pub timestamp: NaiveDateTime,
    pub tag: &'a str,
    pub body: &'a str,
    pub delayed: bool,
}

impl<'a> LogLine<'a> {
    /// Line stamped with the current local time.
    pub fn now(tag: &'a str, body: &'a str, delayed: bool) -> Self {
        Self {
            timestamp: Local::now().naive_local(),
            tag,
            body,
            delayed,
        }
    }
}

impl fmt::Display for LogLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = format!(
            "[{}]{}",
            self.tag.trim(),
            if self.delayed { "*" } else { "" }
        );
        writeln!(
            f,
            "{} {:<10} {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            tag,
            self.body
        )
    }
}
