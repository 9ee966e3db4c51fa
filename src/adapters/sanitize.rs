//! Log redaction for session secrets and contact details.
//!
//! Formatted log lines pass through [`SanitizingMakeWriter`] before they
//! reach the sink. Redacted:
//! - Session cookies (`session=...`, `Cookie:` / `Set-Cookie:` headers)
//! - Login codes (`"code": "123456"`, `code=123456`)
//! - Bearer tokens
//! - E-mail addresses
//!
//! Input is capped at `DIETDASH_SANITIZE_MAX_BYTES` (default 16 KiB) per
//! call; anything beyond is dropped and marked `[TRUNCATED]`.

use std::sync::OnceLock;

use regex::{Regex, RegexSet};
use tracing_subscriber::fmt::MakeWriter;

const DEFAULT_SANITIZE_MAX_BYTES: usize = 16 * 1024;

static RULES: OnceLock<Rules> = OnceLock::new();

struct Rule {
    regex: Regex,
    replacement: &'static str,
}

struct Rules {
    any: RegexSet,
    rules: Vec<Rule>,
}

fn rules() -> &'static Rules {
    RULES.get_or_init(|| {
        let table: [(&str, &str); 6] = [
            (
                r"(?i)\b(?:set-)?cookie:\s*[^\r\n]+",
                "Cookie: [REDACTED-COOKIE]",
            ),
            (
                r"(?i)\bsession=[A-Za-z0-9._~%+/=-]+",
                "session=[REDACTED-SESSION]",
            ),
            (
                r#"(?i)"code"\s*:\s*"?\d{4,8}"?"#,
                r#""code": "[REDACTED-CODE]""#,
            ),
            (r"(?i)\bcode=\d{4,8}\b", "code=[REDACTED-CODE]"),
            (
                r"(?i)\bbearer\s+[A-Za-z0-9._~+/-]+=*",
                "Bearer [REDACTED-TOKEN]",
            ),
            (
                r"(?i)\b[a-z0-9][a-z0-9._%+-]{0,63}@(?:[a-z0-9-]{1,63}\.)+[a-z]{2,}\b",
                "[REDACTED-EMAIL]",
            ),
        ];

        // Patterns are literals above; a failure here is a programming error.
        let any = RegexSet::new(table.iter().map(|(p, _)| *p)).expect("Valid regex set");
        let rules = table
            .iter()
            .map(|(pattern, replacement)| Rule {
                regex: Regex::new(pattern).expect("Valid regex"),
                replacement: *replacement,
            })
            .collect();

        Rules { any, rules }
    })
}

fn max_sanitize_bytes() -> usize {
    std::env::var("DIETDASH_SANITIZE_MAX_BYTES")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(DEFAULT_SANITIZE_MAX_BYTES)
}

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }

    let mut end = max_bytes;
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

/// Redact secrets and contact details from `input`.
#[must_use]
pub fn sanitize(input: &str) -> String {
    sanitize_with_limit(input, max_sanitize_bytes())
}

fn sanitize_with_limit(input: &str, max_bytes: usize) -> String {
    let rules = rules();
    let (prefix, truncated) = truncate_to_char_boundary(input, max_bytes);

    let mut result = prefix.to_string();
    for idx in rules.any.matches(prefix).into_iter() {
        let rule = &rules.rules[idx];
        result = rule.regex.replace_all(&result, rule.replacement).into_owned();
    }

    if truncated {
        result.push_str(" [TRUNCATED]");
    }
    result
}

/// `MakeWriter` wrapper that sanitizes each formatted line before writing.
#[derive(Debug, Clone)]
pub struct SanitizingMakeWriter<M> {
    inner: M,
}

impl<M> SanitizingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

/// Line-buffering writer produced by [`SanitizingMakeWriter`].
pub struct SanitizingWriter<W: std::io::Write> {
    inner: W,
    buffer: Vec<u8>,
}

impl<W: std::io::Write> SanitizingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
        }
    }

    fn write_sanitized(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        let text = String::from_utf8_lossy(bytes);
        self.inner.write_all(sanitize(&text).as_bytes())
    }

    fn flush_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.write_sanitized(&line)?;
        }
        Ok(())
    }
}

impl<W: std::io::Write> std::io::Write for SanitizingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        // A single line without newline must not grow without bound.
        if self.buffer.len() > max_sanitize_bytes().saturating_mul(2) {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
            self.inner.write_all(b"\n")?;
            return Ok(buf.len());
        }

        self.flush_lines()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_lines()?;
        if !self.buffer.is_empty() {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
        }
        self.inner.flush()
    }
}

impl<W: std::io::Write> Drop for SanitizingWriter<W> {
    fn drop(&mut self) {
        let _ = std::io::Write::flush(self);
    }
}

impl<'a, M> MakeWriter<'a> for SanitizingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = SanitizingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SanitizingWriter::new(self.inner.make_writer())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_redacts_session_cookie() {
        let sanitized = sanitize("Set-Cookie: session=eyJ1c2VyX2lkIjo0fQ.Zx1; HttpOnly; Path=/");
        assert!(sanitized.contains("[REDACTED-COOKIE]"));
        assert!(!sanitized.contains("eyJ1c2Vy"));

        let sanitized = sanitize("request carried session=abc123.def");
        assert_eq!(sanitized, "request carried session=[REDACTED-SESSION]");
    }

    #[test]
    fn test_redacts_login_code() {
        let sanitized = sanitize(r#"POST /patient-login {"name": "Ana", "code": "482913"}"#);
        assert!(sanitized.contains("[REDACTED-CODE]"));
        assert!(!sanitized.contains("482913"));

        assert_eq!(sanitize("code=482913"), "code=[REDACTED-CODE]");
    }

    #[test]
    fn test_redacts_bearer_and_email() {
        let sanitized = sanitize("Authorization: Bearer abc.def.ghi for ana@example.org");
        assert!(sanitized.contains("Bearer [REDACTED-TOKEN]"));
        assert!(sanitized.contains("[REDACTED-EMAIL]"));
        assert!(!sanitized.contains("ana@example.org"));
    }

    #[test]
    fn test_plain_lines_pass_through() {
        let line = "GET /history failed (attempt 1/3): HTTP 503; retrying in 250ms";
        assert_eq!(sanitize(line), line);
    }

    #[test]
    fn test_truncates_on_char_boundary() {
        let sanitized = sanitize_with_limit("ééééé", 3);
        assert_eq!(sanitized, "é [TRUNCATED]");
    }

    #[test]
    fn test_writer_sanitizes_per_line() {
        let mut out = Vec::new();
        {
            let mut writer = SanitizingWriter::new(&mut out);
            writer.write_all(b"login code=123456\nplain ").expect("Write");
            writer.write_all(b"line\n").expect("Write");
        }

        let text = String::from_utf8(out).expect("UTF-8");
        assert_eq!(text, "login code=[REDACTED-CODE]\nplain line\n");
    }
}
