// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The State → District → Town → Center location hierarchy.

use crate::error::DomainError;
use crate::types::Address;
use crate::validation::validate_location_name;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A level of the location hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LocationLevel {
    /// Top level.
    State,
    /// Child of a state.
    District,
    /// Child of a district (a mandal).
    Town,
    /// Leaf level.
    Center,
}

impl LocationLevel {
    /// Converts this level to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::State => "State",
            Self::District => "District",
            Self::Town => "Town",
            Self::Center => "Center",
        }
    }
}

impl std::fmt::Display for LocationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A path naming one node of the hierarchy.
///
/// Lower levels are only present when every level above them is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationPath {
    state: String,
    district: Option<String>,
    town: Option<String>,
    center: Option<String>,
}

impl LocationPath {
    /// Builds a path from optional components.
    ///
    /// # Errors
    ///
    /// Returns an error if a name is empty or a level is given without
    /// the level above it.
    pub fn from_parts(
        state: &str,
        district: Option<&str>,
        town: Option<&str>,
        center: Option<&str>,
    ) -> Result<Self, DomainError> {
        let clean = |value: Option<&str>| -> Option<String> {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        let path: Self = Self {
            state: state.trim().to_string(),
            district: clean(district),
            town: clean(town),
            center: clean(center),
        };

        validate_location_name(&path.state)?;
        for part in [&path.district, &path.town, &path.center]
            .into_iter()
            .flatten()
        {
            validate_location_name(part)?;
        }
        if path.town.is_some() && path.district.is_none() {
            return Err(DomainError::InvalidLocationName(String::from(
                "a town requires a district",
            )));
        }
        if path.center.is_some() && path.town.is_none() {
            return Err(DomainError::InvalidLocationName(String::from(
                "a center requires a town",
            )));
        }
        Ok(path)
    }

    /// Path to a state.
    #[must_use]
    pub fn state(state: &str) -> Self {
        Self {
            state: state.trim().to_string(),
            district: None,
            town: None,
            center: None,
        }
    }

    /// Path to a district.
    #[must_use]
    pub fn district(state: &str, district: &str) -> Self {
        Self {
            district: Some(district.trim().to_string()),
            ..Self::state(state)
        }
    }

    /// Path to a town.
    #[must_use]
    pub fn town(state: &str, district: &str, town: &str) -> Self {
        Self {
            town: Some(town.trim().to_string()),
            ..Self::district(state, district)
        }
    }

    /// Path to a center.
    #[must_use]
    pub fn center(state: &str, district: &str, town: &str, center: &str) -> Self {
        Self {
            center: Some(center.trim().to_string()),
            ..Self::town(state, district, town)
        }
    }

    /// Returns the level this path names.
    #[must_use]
    pub const fn level(&self) -> LocationLevel {
        if self.center.is_some() {
            LocationLevel::Center
        } else if self.town.is_some() {
            LocationLevel::Town
        } else if self.district.is_some() {
            LocationLevel::District
        } else {
            LocationLevel::State
        }
    }

    /// Returns the name of the node itself.
    #[must_use]
    pub fn name(&self) -> &str {
        self.center
            .as_deref()
            .or(self.town.as_deref())
            .or(self.district.as_deref())
            .unwrap_or(&self.state)
    }

    /// Returns the state component.
    #[must_use]
    pub fn state_name(&self) -> &str {
        &self.state
    }

    /// Returns the district component.
    #[must_use]
    pub fn district_name(&self) -> Option<&str> {
        self.district.as_deref()
    }

    /// Returns the town component.
    #[must_use]
    pub fn town_name(&self) -> Option<&str> {
        self.town.as_deref()
    }

    /// Returns the center component.
    #[must_use]
    pub fn center_name(&self) -> Option<&str> {
        self.center.as_deref()
    }

    /// Returns the same path with the node itself renamed.
    #[must_use]
    pub fn renamed(&self, new_name: &str) -> Self {
        let mut path: Self = self.clone();
        let new_name: String = new_name.trim().to_string();
        match self.level() {
            LocationLevel::State => path.state = new_name,
            LocationLevel::District => path.district = Some(new_name),
            LocationLevel::Town => path.town = Some(new_name),
            LocationLevel::Center => path.center = Some(new_name),
        }
        path
    }

    /// Returns whether an address lies at or below this node.
    #[must_use]
    pub fn contains_address(&self, address: &Address) -> bool {
        if address.state != self.state {
            return false;
        }
        if let Some(district) = &self.district
            && &address.district != district
        {
            return false;
        }
        if self.town.is_some() && address.town != self.town {
            return false;
        }
        if self.center.is_some() && address.center != self.center {
            return false;
        }
        true
    }

    /// Rewrites an address that lies at or below this node to use `new_name`.
    ///
    /// Returns whether the address changed.
    pub fn rename_in_address(&self, address: &mut Address, new_name: &str) -> bool {
        if !self.contains_address(address) {
            return false;
        }
        let new_name: String = new_name.trim().to_string();
        match self.level() {
            LocationLevel::State => address.state = new_name,
            LocationLevel::District => address.district = new_name,
            LocationLevel::Town => address.town = Some(new_name),
            LocationLevel::Center => address.center = Some(new_name),
        }
        true
    }
}

impl std::fmt::Display for LocationPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.state)?;
        for part in [&self.district, &self.town, &self.center]
            .into_iter()
            .flatten()
        {
            write!(f, " / {part}")?;
        }
        Ok(())
    }
}

type CenterSet = BTreeSet<String>;
type TownMap = BTreeMap<String, CenterSet>;
type DistrictMap = BTreeMap<String, TownMap>;

/// Node counts for each level of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocationCounts {
    /// Number of states.
    pub states: usize,
    /// Number of districts.
    pub districts: usize,
    /// Number of towns.
    pub towns: usize,
    /// Number of centers.
    pub centers: usize,
}

/// The location hierarchy. Names are unique within their parent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LocationTree {
    states: BTreeMap<String, DistrictMap>,
}

impl LocationTree {
    /// Creates an empty tree.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            states: BTreeMap::new(),
        }
    }

    /// Returns whether the node exists.
    #[must_use]
    pub fn contains(&self, path: &LocationPath) -> bool {
        let Some(districts) = self.states.get(&path.state) else {
            return false;
        };
        let Some(district) = &path.district else {
            return true;
        };
        let Some(towns) = districts.get(district) else {
            return false;
        };
        let Some(town) = &path.town else {
            return true;
        };
        let Some(centers) = towns.get(town) else {
            return false;
        };
        path.center.as_ref().is_none_or(|c| centers.contains(c))
    }

    /// Lists the children of a node, or the states when `parent` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent does not exist.
    pub fn children(&self, parent: Option<&LocationPath>) -> Result<Vec<String>, DomainError> {
        let Some(parent) = parent else {
            return Ok(self.states.keys().cloned().collect());
        };
        let not_found = || DomainError::LocationNotFound {
            path: parent.to_string(),
        };
        let districts: &DistrictMap = self.states.get(&parent.state).ok_or_else(not_found)?;
        let Some(district) = &parent.district else {
            return Ok(districts.keys().cloned().collect());
        };
        let towns: &TownMap = districts.get(district).ok_or_else(not_found)?;
        let Some(town) = &parent.town else {
            return Ok(towns.keys().cloned().collect());
        };
        let centers: &CenterSet = towns.get(town).ok_or_else(not_found)?;
        if parent.center.is_some() {
            return Ok(Vec::new());
        }
        Ok(centers.iter().cloned().collect())
    }

    /// Adds a node under an existing parent.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid, the parent is missing, or
    /// the node already exists.
    pub fn add(&mut self, path: &LocationPath) -> Result<(), DomainError> {
        validate_location_name(path.name())?;
        if self.contains(path) {
            return Err(DomainError::DuplicateLocation {
                path: path.to_string(),
            });
        }
        if !self.ensure(path)? {
            return Err(DomainError::DuplicateLocation {
                path: path.to_string(),
            });
        }
        Ok(())
    }

    /// Inserts a node if its parent exists; returns whether it was new.
    fn ensure(&mut self, path: &LocationPath) -> Result<bool, DomainError> {
        let parent_missing = |level: &str| DomainError::LocationNotFound {
            path: level.to_string(),
        };

        let Some(district) = &path.district else {
            return Ok(self
                .states
                .insert(path.state.clone(), DistrictMap::new())
                .is_none());
        };
        let districts: &mut DistrictMap = self
            .states
            .get_mut(&path.state)
            .ok_or_else(|| parent_missing(&path.state))?;

        let Some(town) = &path.town else {
            return Ok(districts
                .insert(district.clone(), TownMap::new())
                .is_none());
        };
        let towns: &mut TownMap = districts
            .get_mut(district)
            .ok_or_else(|| parent_missing(&format!("{} / {district}", path.state)))?;

        let Some(center) = &path.center else {
            return Ok(towns.insert(town.clone(), CenterSet::new()).is_none());
        };
        let centers: &mut CenterSet = towns.get_mut(town).ok_or_else(|| {
            parent_missing(&format!("{} / {district} / {town}", path.state))
        })?;
        Ok(centers.insert(center.clone()))
    }

    /// Adds every missing node along a path without failing on existing ones.
    ///
    /// Returns the number of nodes created.
    ///
    /// # Errors
    ///
    /// Returns an error if any name on the path is invalid.
    pub fn merge(&mut self, path: &LocationPath) -> Result<usize, DomainError> {
        let mut created: usize = 0;
        let mut prefixes: Vec<LocationPath> = vec![LocationPath::state(&path.state)];
        if let Some(district) = &path.district {
            prefixes.push(LocationPath::district(&path.state, district));
            if let Some(town) = &path.town {
                prefixes.push(LocationPath::town(&path.state, district, town));
                if let Some(center) = &path.center {
                    prefixes.push(LocationPath::center(&path.state, district, town, center));
                }
            }
        }
        for prefix in &prefixes {
            validate_location_name(prefix.name())?;
            if !self.contains(prefix) && self.ensure(prefix)? {
                created += 1;
            }
        }
        Ok(created)
    }

    /// Renames a node, keeping its children.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is missing, the new name is invalid, or
    /// a sibling already uses the new name.
    pub fn rename(&mut self, path: &LocationPath, new_name: &str) -> Result<LocationPath, DomainError> {
        validate_location_name(new_name)?;
        if !self.contains(path) {
            return Err(DomainError::LocationNotFound {
                path: path.to_string(),
            });
        }
        let renamed: LocationPath = path.renamed(new_name);
        if renamed == *path {
            return Ok(renamed);
        }
        if self.contains(&renamed) {
            return Err(DomainError::DuplicateLocation {
                path: renamed.to_string(),
            });
        }

        let new_name: String = renamed.name().to_string();
        let old_name: &str = path.name();
        match (&path.district, &path.town, &path.center) {
            (None, _, _) => {
                if let Some(children) = self.states.remove(old_name) {
                    self.states.insert(new_name, children);
                }
            }
            (Some(district), None, _) => {
                if let Some(districts) = self.states.get_mut(&path.state)
                    && let Some(children) = districts.remove(district)
                {
                    districts.insert(new_name, children);
                }
            }
            (Some(district), Some(town), None) => {
                if let Some(towns) = self
                    .states
                    .get_mut(&path.state)
                    .and_then(|d| d.get_mut(district))
                    && let Some(children) = towns.remove(town)
                {
                    towns.insert(new_name, children);
                }
            }
            (Some(district), Some(town), Some(center)) => {
                if let Some(centers) = self
                    .states
                    .get_mut(&path.state)
                    .and_then(|d| d.get_mut(district))
                    .and_then(|t| t.get_mut(town))
                    && centers.remove(center)
                {
                    centers.insert(new_name);
                }
            }
        }
        Ok(renamed)
    }

    /// Removes a node together with its descendants.
    ///
    /// # Errors
    ///
    /// Returns an error if the node does not exist.
    pub fn remove(&mut self, path: &LocationPath) -> Result<(), DomainError> {
        let removed: bool = match (&path.district, &path.town, &path.center) {
            (None, _, _) => self.states.remove(&path.state).is_some(),
            (Some(district), None, _) => self
                .states
                .get_mut(&path.state)
                .is_some_and(|d| d.remove(district).is_some()),
            (Some(district), Some(town), None) => self
                .states
                .get_mut(&path.state)
                .and_then(|d| d.get_mut(district))
                .is_some_and(|t| t.remove(town).is_some()),
            (Some(district), Some(town), Some(center)) => self
                .states
                .get_mut(&path.state)
                .and_then(|d| d.get_mut(district))
                .and_then(|t| t.get_mut(town))
                .is_some_and(|c| c.remove(center)),
        };
        if removed {
            Ok(())
        } else {
            Err(DomainError::LocationNotFound {
                path: path.to_string(),
            })
        }
    }

    /// Returns node counts per level.
    #[must_use]
    pub fn counts(&self) -> LocationCounts {
        let mut counts: LocationCounts = LocationCounts {
            states: self.states.len(),
            ..LocationCounts::default()
        };
        for districts in self.states.values() {
            counts.districts += districts.len();
            for towns in districts.values() {
                counts.towns += towns.len();
                counts.centers += towns.values().map(BTreeSet::len).sum::<usize>();
            }
        }
        counts
    }
}
