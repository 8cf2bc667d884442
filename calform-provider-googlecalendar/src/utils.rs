//! Utility functions for value normalization and conversion

use log::warn;

use crate::api::{ConferenceData, ConferenceSolution, ConferenceSolutionKey, EntryPoint};

pub const TRANSPARENT: &str = "transparent";
pub const OPAQUE: &str = "opaque";

const MEET_SOLUTION_TYPE: &str = "hangoutsMeet";
const MEET_HOST: &str = "meet.google.com";

/// Convert `show_as_available` to the API transparency value
pub fn bool_to_transparency(show_as_available: bool) -> &'static str {
    if show_as_available { TRANSPARENT } else { OPAQUE }
}

/// Convert API transparency to `show_as_available`
///
/// Absent or empty transparency is the API default (opaque).
pub fn transparency_to_bool(transparency: Option<&str>) -> bool {
    match transparency {
        Some(TRANSPARENT) => true,
        Some(OPAQUE) | Some("") | None => false,
        Some(other) => {
            warn!("unknown transparency value {:?}, treating as opaque", other);
            false
        }
    }
}

/// Build Hangouts Meet conference data for a meet id
///
/// Returns `None` for an empty id.
pub fn meet_conference(meet_id: &str) -> Option<ConferenceData> {
    if meet_id.is_empty() {
        return None;
    }

    Some(ConferenceData {
        conference_solution: Some(ConferenceSolution {
            key: Some(ConferenceSolutionKey {
                solution_type: Some(MEET_SOLUTION_TYPE.to_string()),
            }),
            ..ConferenceSolution::default()
        }),
        entry_points: vec![EntryPoint {
            entry_point_type: Some("video".to_string()),
            uri: Some(format!("https://{}/{}", MEET_HOST, meet_id)),
            label: Some(format!("{}/{}", MEET_HOST, meet_id)),
            ..EntryPoint::default()
        }],
        ..ConferenceData::default()
    })
}

/// Meet id from the last path segment of the first entry point URI
pub fn meet_id_from_conference(conference: &ConferenceData) -> Option<String> {
    let uri = conference.entry_points.first()?.uri.as_deref()?;
    let segment = uri.trim_end_matches('/').rsplit('/').next()?;
    non_empty(segment)
}

/// `None` for empty text
pub fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
