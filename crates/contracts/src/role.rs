//! Stereo role of a camera inside a rig.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role a camera plays in a stereo rig.
///
/// The reference camera is the origin of the stereo baseline; the secondary
/// camera carries the baseline offset in its camera info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraRole {
    /// Left camera, baseline origin
    Reference,
    /// Right camera, offset by the configured baseline
    Secondary,
}

impl CameraRole {
    /// Namespace suffix appended to topics and frame ids
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Reference => "/left",
            Self::Secondary => "/right",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reference => "reference",
            Self::Secondary => "secondary",
        }
    }
}

/// Name keywords that select a role, in priority order.
///
/// Matching is a case-sensitive substring test; the first keyword found in a
/// camera name wins.
pub const ROLE_KEYWORDS: [(&str, CameraRole); 2] = [
    ("left", CameraRole::Reference),
    ("right", CameraRole::Secondary),
];

impl fmt::Display for CameraRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffixes() {
        assert_eq!(CameraRole::Reference.suffix(), "/left");
        assert_eq!(CameraRole::Secondary.suffix(), "/right");
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&CameraRole::Secondary).unwrap();
        assert_eq!(json, "\"secondary\"");
    }
}
