use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ProvisionError;

/// API group serving `HorizontalPodAutoscaler`.
pub const AUTOSCALING_GROUP: &str = "autoscaling";

/// Versions of the `autoscaling` API group that have carried HPAs.
///
/// Variants are declared oldest first, so `Ord` sorts by preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AutoscalingVersion {
    #[serde(rename = "v1")]
    V1,
    #[serde(rename = "v2beta1")]
    V2beta1,
    #[serde(rename = "v2beta2")]
    V2beta2,
    #[serde(rename = "v2")]
    V2,
}

impl AutoscalingVersion {
    pub const ALL: [AutoscalingVersion; 4] = [Self::V1, Self::V2beta1, Self::V2beta2, Self::V2];

    /// Path segment as it appears in `/apis/autoscaling/{version}`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2beta1 => "v2beta1",
            Self::V2beta2 => "v2beta2",
            Self::V2 => "v2",
        }
    }

    /// `v2beta1` was removed in Kubernetes 1.25, `v2beta2` in 1.26.
    pub const fn is_deprecated(self) -> bool {
        matches!(self, Self::V2beta1 | Self::V2beta2)
    }

    /// Whether the version expresses thresholds as a `metrics` list.
    pub const fn has_metrics_list(self) -> bool {
        !matches!(self, Self::V1)
    }

    /// Picks the newest version from what the server advertises.
    ///
    /// Unknown version strings are ignored.
    pub fn newest_served<S: AsRef<str>>(served: &[S]) -> Option<Self> {
        served
            .iter()
            .filter_map(|v| v.as_ref().parse::<Self>().ok())
            .max()
    }
}

impl fmt::Display for AutoscalingVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AutoscalingVersion {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let version = s.strip_prefix("autoscaling/").unwrap_or(s);
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == version)
            .ok_or_else(|| ProvisionError::UnsupportedVersion {
                version: version.to_string(),
                message: "not a known autoscaling API version".to_string(),
            })
    }
}

/// How the driver chooses the autoscaling API version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "mode", content = "version")]
pub enum VersionSelection {
    /// Submit with exactly this version, whether or not the server serves it.
    Pinned(AutoscalingVersion),
    /// Ask the server which versions it serves and submit with the newest served version.
    Newest,
}

impl Default for VersionSelection {
    fn default() -> Self {
        Self::Pinned(AutoscalingVersion::V2beta1)
    }
}
