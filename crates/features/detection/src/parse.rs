use crate::error::DetectionError;
use hb_domain::HostVersion;
use regex::Regex;
use std::sync::LazyLock;

/// A four digit release year optionally followed by dotted components, e.g. `2024` or `2024.2.1`.
static RELEASE_TOKEN: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"(?:^|\D)(\d{4})((?:\.\d+){0,3})(?:\D|$)"));

/// Parsed release token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedVersion {
    pub version: HostVersion,
    /// The matched token, e.g. `"2024.2.1"`.
    pub display: String,
}

/// Extracts the first release-year token from `text`.
///
/// Years above the newest known release map to [`HostVersion::Future`]. Text without a year
/// token, or with a year below the oldest release, maps to [`HostVersion::Unknown`].
pub fn parse_version(text: &str) -> Result<ParsedVersion, DetectionError> {
    let pattern = RELEASE_TOKEN.as_ref().map_err(|e| DetectionError::Pattern {
        source: e.clone(),
        context: Some("Release token".into()),
    })?;

    let Some(caps) = pattern.captures(text) else {
        return Ok(ParsedVersion { version: HostVersion::Unknown, display: text.trim().to_owned() });
    };

    let year_token = caps.get(1).map_or("", |m| m.as_str());
    let suffix = caps.get(2).map_or("", |m| m.as_str());
    let version = year_token.parse::<u32>().map_or(HostVersion::Unknown, HostVersion::from_year);

    Ok(ParsedVersion { version, display: format!("{year_token}{suffix}") })
}

/// Like [`parse_version`] but rejects results that cannot identify a host.
pub fn parse_plausible(text: &str) -> Result<ParsedVersion, DetectionError> {
    let parsed = parse_version(text)?;
    if parsed.version == HostVersion::Unknown {
        return Err(DetectionError::Implausible {
            message: format!("no supported release year in '{}'", text.trim()).into(),
            context: None,
        });
    }
    Ok(parsed)
}
