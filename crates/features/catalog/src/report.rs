use crate::resolver::FeatureResolver;
use hb_domain::{HostVersion, VersionInfo};
use serde::Serialize;
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IssueCategory {
    /// No adapter can be built for the detected version.
    Compatibility,
    Installation,
    Support,
    Features,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompatibilityIssue {
    pub severity: Severity,
    pub category: IssueCategory,
    pub message: String,
}

/// Environment health derived from a detection result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityReport {
    pub version: HostVersion,
    pub display: String,
    pub issues: Vec<CompatibilityIssue>,
    pub enabled_features: Vec<String>,
}

impl CompatibilityReport {
    /// Evaluates `info` against the resolver.
    ///
    /// An `Unknown` version yields exactly one critical compatibility issue and nothing else.
    #[must_use]
    pub fn evaluate(info: &VersionInfo, resolver: &FeatureResolver) -> Self {
        let mut report = Self {
            version: info.version,
            display: info.display.clone(),
            issues: Vec::new(),
            enabled_features: Vec::new(),
        };

        if info.version == HostVersion::Unknown {
            report.push(
                Severity::Critical,
                IssueCategory::Compatibility,
                format!("No supported {} installation detected", info.product),
            );
            return report;
        }

        if !info.is_valid_installation {
            report.push(
                Severity::Critical,
                IssueCategory::Installation,
                format!("{} {} installation is incomplete or missing", info.product, info.display),
            );
        }

        match info.version {
            HostVersion::Future => report.push(
                Severity::Warning,
                IssueCategory::Support,
                format!(
                    "{} {} is newer than {}; features run as experimental",
                    info.product,
                    info.display,
                    HostVersion::NEWEST
                ),
            ),
            v if v == HostVersion::OLDEST => report.push(
                Severity::Warning,
                IssueCategory::Support,
                format!("{} {v} is the oldest supported release and nears end of support", info.product),
            ),
            _ => {},
        }

        report.enabled_features = resolver.enabled_features(info.version);
        report.push(
            Severity::Info,
            IssueCategory::Features,
            format!("{} features enabled on {}", report.enabled_features.len(), info.version),
        );

        report
    }

    fn push(&mut self, severity: Severity, category: IssueCategory, message: String) {
        self.issues.push(CompatibilityIssue { severity, category, message });
    }

    pub fn issues_with(&self, severity: Severity) -> impl Iterator<Item = &CompatibilityIssue> {
        self.issues.iter().filter(move |i| i.severity == severity)
    }

    #[must_use]
    pub fn critical_count(&self) -> usize {
        self.issues_with(Severity::Critical).count()
    }

    /// No critical issues.
    #[must_use]
    pub fn is_compatible(&self) -> bool {
        self.critical_count() == 0
    }
}
