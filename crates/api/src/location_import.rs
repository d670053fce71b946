// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Location hierarchy import from the states JSON format.
//!
//! The file maps each state to its districts, and each district to its
//! mandals. Mandals become towns in the hierarchy:
//!
//! ```json
//! { "States": { "Telangana": { "Districts": [
//!     { "District_Name": "Hyderabad", "Mandals": ["Secunderabad"] }
//! ] } } }
//! ```

use bookdrive_domain::{DomainError, LocationPath, LocationTree};
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur while reading a location file.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocationImportError {
    /// The content is not valid JSON or does not have the expected shape.
    #[error("Location file is not valid: {0}")]
    InvalidJson(String),

    /// The file contains no states.
    #[error("Location file lists no states")]
    NoStates,

    /// A name in the file cannot be used as a location.
    #[error("Invalid location under '{parent}': {reason}")]
    InvalidLocation {
        /// The enclosing location, or `States` at the top level.
        parent: String,
        /// Why the name was rejected.
        reason: String,
    },
}

#[derive(Debug, Deserialize)]
struct LocationFile {
    #[serde(rename = "States")]
    states: BTreeMap<String, StateEntry>,
}

#[derive(Debug, Deserialize)]
struct StateEntry {
    #[serde(rename = "Districts", default)]
    districts: Vec<DistrictEntry>,
}

#[derive(Debug, Deserialize)]
struct DistrictEntry {
    #[serde(rename = "District_Name")]
    district_name: String,
    #[serde(rename = "Mandals", default)]
    mandals: Vec<String>,
}

fn invalid(parent: &str, err: &DomainError) -> LocationImportError {
    LocationImportError::InvalidLocation {
        parent: parent.to_string(),
        reason: err.to_string(),
    }
}

/// Parses a location file into the paths it names.
///
/// Every state, district, and town appears as its own path, parents
/// before children, so the result can be merged into a tree in order.
///
/// # Errors
///
/// Returns an error if the JSON is malformed, lists no states, or
/// contains an unusable name.
pub fn parse_location_json(json_content: &str) -> Result<Vec<LocationPath>, LocationImportError> {
    let file: LocationFile = serde_json::from_str(json_content)
        .map_err(|e| LocationImportError::InvalidJson(e.to_string()))?;
    if file.states.is_empty() {
        return Err(LocationImportError::NoStates);
    }

    let mut paths: Vec<LocationPath> = Vec::new();
    for (state_name, state) in &file.states {
        let state_path: LocationPath = LocationPath::from_parts(state_name, None, None, None)
            .map_err(|e| invalid("States", &e))?;
        for district in &state.districts {
            let district_path: LocationPath =
                LocationPath::from_parts(state_name, Some(&district.district_name), None, None)
                    .map_err(|e| invalid(state_name, &e))?;
            for mandal in &district.mandals {
                let town_path: LocationPath = LocationPath::from_parts(
                    state_name,
                    Some(&district.district_name),
                    Some(mandal),
                    None,
                )
                .map_err(|e| invalid(&district_path.to_string(), &e))?;
                paths.push(town_path);
            }
            paths.push(district_path);
        }
        paths.push(state_path);
    }
    // Parents must precede children for an in-order merge
    paths.sort_by_key(|p| p.level());
    Ok(paths)
}

/// Builds a fresh location tree from a location file.
///
/// # Errors
///
/// Returns an error if the file cannot be parsed.
pub fn load_location_tree(json_content: &str) -> Result<LocationTree, LocationImportError> {
    let mut tree: LocationTree = LocationTree::new();
    for path in parse_location_json(json_content)? {
        tree.merge(&path)
            .map_err(|e| invalid(path.state_name(), &e))?;
    }
    Ok(tree)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bookdrive_domain::LocationCounts;

    const SAMPLE: &str = r#"{
        "States": {
            "Telangana": {
                "Districts": [
                    { "District_Name": "Hyderabad", "Mandals": ["Secunderabad", "Ameerpet"] },
                    { "District_Name": "Warangal", "Mandals": [] }
                ]
            },
            "Goa": {}
        }
    }"#;

    #[test]
    fn test_parse_flattens_states_districts_and_mandals() {
        let paths: Vec<LocationPath> = parse_location_json(SAMPLE).unwrap();
        assert_eq!(paths.len(), 6);
        assert!(paths.contains(&LocationPath::town("Telangana", "Hyderabad", "Ameerpet")));
        assert!(paths.contains(&LocationPath::district("Telangana", "Warangal")));
        assert!(paths.contains(&LocationPath::state("Goa")));
    }

    #[test]
    fn test_parse_orders_parents_first() {
        let paths: Vec<LocationPath> = parse_location_json(SAMPLE).unwrap();
        let levels: Vec<_> = paths.iter().map(LocationPath::level).collect();
        let mut sorted: Vec<_> = levels.clone();
        sorted.sort();
        assert_eq!(levels, sorted);
    }

    #[test]
    fn test_load_builds_tree() {
        let tree: LocationTree = load_location_tree(SAMPLE).unwrap();
        let counts: LocationCounts = tree.counts();
        assert_eq!(counts.states, 2);
        assert_eq!(counts.districts, 2);
        assert_eq!(counts.towns, 2);
        assert_eq!(counts.centers, 0);
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        let result: Result<Vec<LocationPath>, LocationImportError> =
            parse_location_json("{\"States\": [");
        assert!(matches!(result, Err(LocationImportError::InvalidJson(_))));
    }

    #[test]
    fn test_empty_states_is_rejected() {
        assert_eq!(
            parse_location_json(r#"{"States": {}}"#),
            Err(LocationImportError::NoStates)
        );
    }

    #[test]
    fn test_slash_in_name_is_rejected() {
        let json: &str = r#"{"States": {"A/B": {}}}"#;
        assert!(matches!(
            parse_location_json(json),
            Err(LocationImportError::InvalidLocation { .. })
        ));
    }
}
