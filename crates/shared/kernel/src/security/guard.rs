use hb_domain::config::CallConfig;
use regex::RegexSet;
use serde_json::Value as Json;
use std::borrow::Cow;

#[hb_derive::hb_error]
pub enum GuardError {
    #[error("Payload too large{}: {message}", format_context(.context))]
    Oversized { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Malformed payload{}: {message}", format_context(.context))]
    Malformed { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Rejected payload{}: {message}", format_context(.context))]
    Injection { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Guard pattern error{}: {source}", format_context(.context))]
    Pattern { source: regex::Error, context: Option<Cow<'static, str>> },
}

/// Labelled patterns, matched against every string and key in a payload.
const PATTERNS: &[(&str, &str)] = &[
    ("path traversal", r"\.\.[/\\]"),
    ("encoded path traversal", r"(?i)%2e%2e|%252e"),
    ("null byte", r"\x00|(?i)%00"),
    (
        "command chaining",
        r"(?i)(;|&&|\|\|?)\s*(rm|del|format|shutdown|curl|wget|powershell|cmd|sh|bash)\b",
    ),
    ("command substitution", r"\$\(|`[^`]*`"),
    ("script tag", r"(?i)<\s*script\b"),
    ("script uri", r"(?i)\bjavascript\s*:"),
    ("dynamic evaluation", r"(?i)\b(eval|exec)\s*\("),
    ("interpreter escape", r"(?i)__import__|\bos\.system\b|\bsubprocess\."),
];

/// Validates raw call payloads before anything else touches them.
///
/// Checks run in a fixed order: size first (on the raw bytes), then JSON parsing, then a scan of
/// every string for injection patterns. Matching input is rejected, never rewritten.
#[derive(Debug, Clone)]
pub struct PayloadGuard {
    max_bytes: usize,
    excerpt_chars: usize,
    patterns: RegexSet,
}

impl PayloadGuard {
    pub fn new(max_bytes: usize, excerpt_chars: usize) -> Result<Self, GuardError> {
        let patterns =
            RegexSet::new(PATTERNS.iter().map(|(_, p)| *p)).context("Compiling guard patterns")?;
        Ok(Self { max_bytes, excerpt_chars, patterns })
    }

    pub fn from_config(config: &CallConfig) -> Result<Self, GuardError> {
        Self::new(config.max_payload_bytes, config.log_excerpt_chars)
    }

    #[must_use]
    pub const fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Size, parse and scan `raw` in that order. Blank input parses as an empty object.
    pub fn inspect(&self, raw: &str) -> Result<Json, GuardError> {
        self.check_size(raw)?;
        let value = self.parse(raw)?;
        self.scan(&value)?;
        Ok(value)
    }

    pub fn check_size(&self, raw: &str) -> Result<(), GuardError> {
        if raw.len() > self.max_bytes {
            return Err(GuardError::Oversized {
                message: format!("{} bytes exceeds the {} byte limit", raw.len(), self.max_bytes)
                    .into(),
                context: None,
            });
        }
        Ok(())
    }

    pub fn parse(&self, raw: &str) -> Result<Json, GuardError> {
        if raw.trim().is_empty() {
            return Ok(Json::Object(serde_json::Map::new()));
        }
        serde_json::from_str(raw).map_err(|e| {
            let shown = excerpt(raw, self.excerpt_chars);
            tracing::debug!(error = %e, excerpt = %shown, "Rejecting malformed payload");
            GuardError::Malformed {
                message: format!("{e} near '{shown}'").into(),
                context: None,
            }
        })
    }

    /// Walks the parsed payload, object keys included.
    pub fn scan(&self, value: &Json) -> Result<(), GuardError> {
        match value {
            Json::String(s) => self.scan_str(s),
            Json::Array(items) => items.iter().try_for_each(|item| self.scan(item)),
            Json::Object(map) => map.iter().try_for_each(|(key, item)| {
                self.scan_str(key)?;
                self.scan(item)
            }),
            Json::Null | Json::Bool(_) | Json::Number(_) => Ok(()),
        }
    }

    fn scan_str(&self, s: &str) -> Result<(), GuardError> {
        let Some(index) = self.patterns.matches(s).iter().next() else {
            return Ok(());
        };
        let label = PATTERNS.get(index).map_or("suspicious input", |(label, _)| label);
        let shown = excerpt(s, self.excerpt_chars);
        tracing::warn!(pattern = label, excerpt = %shown, "Rejecting payload");
        Err(GuardError::Injection {
            message: format!("{label} detected in '{shown}'").into(),
            context: None,
        })
    }

    #[must_use]
    pub fn excerpt<'a>(&self, raw: &'a str) -> Cow<'a, str> {
        excerpt(raw, self.excerpt_chars)
    }
}

/// First `max_chars` characters of `raw`, marked when truncated. Never splits a code point.
#[must_use]
pub fn excerpt(raw: &str, max_chars: usize) -> Cow<'_, str> {
    match raw.char_indices().nth(max_chars) {
        Some((cut, _)) => Cow::Owned(format!("{}...", &raw[..cut])),
        None => Cow::Borrowed(raw),
    }
}
