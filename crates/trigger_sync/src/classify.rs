//! Camera role classification by name.
//!
//! Case-sensitive substring match against an ordered keyword table; the
//! first keyword found wins, so a name containing both "left" and "right"
//! is a reference camera.

pub use contracts::ROLE_KEYWORDS;

use contracts::CameraRole;

/// Classify a single camera name. `None` if no keyword matches.
pub fn classify(name: &str) -> Option<CameraRole> {
    ROLE_KEYWORDS
        .iter()
        .find(|(keyword, _)| name.contains(keyword))
        .map(|&(_, role)| role)
}

/// Classify a sequence of names, preserving order
pub fn classify_all<'a, I>(names: I) -> Vec<Option<CameraRole>>
where
    I: IntoIterator<Item = &'a str>,
{
    names.into_iter().map(classify).collect()
}

/// Baseline a camera is loaded with.
///
/// Only the secondary camera carries the configured baseline.
pub fn baseline_for(role: Option<CameraRole>, configured: Option<f64>) -> f64 {
    match role {
        Some(CameraRole::Secondary) => configured.unwrap_or(0.0),
        Some(CameraRole::Reference) | None => 0.0,
    }
}
