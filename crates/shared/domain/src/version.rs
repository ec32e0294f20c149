//! Host version vocabulary.
//!
//! Host releases are identified by their release year. The set of releases this bridge knows
//! about is closed; anything else degrades to one of two escape members:
//!
//! * [`HostVersion::Unknown`] for undetected, unparseable, or too-old releases.
//! * [`HostVersion::Future`] for releases newer than [`HostVersion::NEWEST`].
//!
//! The total order is `Unknown < V2021 < V2022 < V2023 < V2024 < V2025 < Future`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use strum_macros::{Display, EnumIter, IntoStaticStr};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    IntoStaticStr,
)]
pub enum HostVersion {
    #[default]
    #[serde(rename = "unknown")]
    #[strum(serialize = "unknown")]
    Unknown,
    #[serde(rename = "2021")]
    #[strum(serialize = "2021")]
    V2021,
    #[serde(rename = "2022")]
    #[strum(serialize = "2022")]
    V2022,
    #[serde(rename = "2023")]
    #[strum(serialize = "2023")]
    V2023,
    #[serde(rename = "2024")]
    #[strum(serialize = "2024")]
    V2024,
    #[serde(rename = "2025")]
    #[strum(serialize = "2025")]
    V2025,
    #[serde(rename = "future")]
    #[strum(serialize = "future")]
    Future,
}

impl HostVersion {
    pub const OLDEST: Self = Self::V2021;
    pub const NEWEST: Self = Self::V2025;

    /// Every release this build recognises, oldest first.
    pub const KNOWN: [Self; 5] = [Self::V2021, Self::V2022, Self::V2023, Self::V2024, Self::V2025];

    /// Every member including the escape members, in total order.
    pub const ALL: [Self; 7] = [
        Self::Unknown,
        Self::V2021,
        Self::V2022,
        Self::V2023,
        Self::V2024,
        Self::V2025,
        Self::Future,
    ];

    /// Maps a release year onto the closed set.
    ///
    /// Years above the newest known release become [`HostVersion::Future`]; years below the
    /// oldest become [`HostVersion::Unknown`].
    #[must_use]
    pub const fn from_year(year: u32) -> Self {
        match year {
            2021 => Self::V2021,
            2022 => Self::V2022,
            2023 => Self::V2023,
            2024 => Self::V2024,
            2025 => Self::V2025,
            y if y > 2025 => Self::Future,
            _ => Self::Unknown,
        }
    }

    /// Release year for known members.
    #[must_use]
    pub const fn year(self) -> Option<u32> {
        match self {
            Self::V2021 => Some(2021),
            Self::V2022 => Some(2022),
            Self::V2023 => Some(2023),
            Self::V2024 => Some(2024),
            Self::V2025 => Some(2025),
            Self::Unknown | Self::Future => None,
        }
    }

    #[must_use]
    pub const fn is_known(self) -> bool {
        self.year().is_some()
    }

    /// Known releases and [`HostVersion::Future`] can host an adapter; `Unknown` cannot.
    #[must_use]
    pub const fn is_supported(self) -> bool {
        !matches!(self, Self::Unknown)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Which detection strategy produced a [`VersionInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DetectionSource {
    Environment,
    Registry,
    Process,
    Filesystem,
    #[default]
    None,
}

/// Result of host detection. Shared behind an `Arc` and never mutated once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub version: HostVersion,
    /// Human readable version string as reported by the probe (e.g. `"2024.2.1"`).
    pub display: String,
    pub product: String,
    pub install_path: Option<PathBuf>,
    pub is_valid_installation: bool,
    /// Build metadata such as a build number, if the probe exposed one.
    pub build: Option<String>,
    pub source: DetectionSource,
}

impl VersionInfo {
    /// The value returned when every detection strategy came up empty.
    #[must_use]
    pub fn unknown(product: impl Into<String>) -> Self {
        Self {
            version: HostVersion::Unknown,
            display: "unknown".to_owned(),
            product: product.into(),
            install_path: None,
            is_valid_installation: false,
            build: None,
            source: DetectionSource::None,
        }
    }

    /// A valid installation record for `version`, mostly useful in tests and overrides.
    #[must_use]
    pub fn known(version: HostVersion, product: impl Into<String>, source: DetectionSource) -> Self {
        Self {
            version,
            display: version.as_str().to_owned(),
            product: product.into(),
            install_path: None,
            is_valid_installation: version.is_supported(),
            build: None,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_places_escape_members_at_the_ends() {
        assert!(HostVersion::Unknown < HostVersion::OLDEST);
        assert!(HostVersion::NEWEST < HostVersion::Future);
        let mut sorted = HostVersion::ALL;
        sorted.sort();
        assert_eq!(sorted, HostVersion::ALL);
    }

    #[test]
    fn years_map_onto_closed_set() {
        assert_eq!(HostVersion::from_year(2023), HostVersion::V2023);
        assert_eq!(HostVersion::from_year(2031), HostVersion::Future);
        assert_eq!(HostVersion::from_year(2019), HostVersion::Unknown);
        assert_eq!(HostVersion::V2024.year(), Some(2024));
        assert_eq!(HostVersion::Future.year(), None);
    }

    #[test]
    fn display_matches_serde() {
        assert_eq!(HostVersion::V2022.to_string(), "2022");
        assert_eq!(HostVersion::Future.as_str(), "future");
    }
}
