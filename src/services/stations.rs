// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory station collection: attribute filtering and coincident
//! position detection.

use crate::models::binding::DecodedValue;
use crate::models::station::{StationRecord, StationType};
use crate::services::lookup::CountryLookup;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Longest country name shown in the selector before truncation.
const MAX_COUNTRY_NAME_LEN: usize = 20;

/// Conjunctive exact-match attribute filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    terms: Vec<(String, DecodedValue)>,
}

impl Predicate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, attr: &str, value: impl Into<DecodedValue>) -> Self {
        self.terms.push((attr.to_string(), value.into()));
        self
    }

    /// Stations of one geometry type.
    pub fn of_type(station_type: StationType) -> Self {
        Self::new().with("type", station_type.as_str())
    }

    pub fn matches(&self, station: &StationRecord) -> bool {
        self.terms
            .iter()
            .all(|(attr, value)| station.attr(attr).as_ref() == Some(value))
    }
}

/// Entry of the country selector.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CountryOption {
    pub code: String,
    pub name: String,
}

/// Immutable set of parsed stations. Queries return new vectors.
#[derive(Debug, Clone, Default)]
pub struct Stations {
    stations: Vec<StationRecord>,
}

impl Stations {
    pub fn new(stations: Vec<StationRecord>) -> Self {
        Self { stations }
    }

    pub fn all(&self) -> &[StationRecord] {
        &self.stations
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Stations whose attributes equal every term of the predicate.
    pub fn filter_by_attr(&self, predicate: &Predicate) -> Vec<StationRecord> {
        self.stations
            .iter()
            .filter(|s| predicate.matches(s))
            .cloned()
            .collect()
    }

    /// Every filtered station that shares its exact position with at least
    /// one other filtered station, whole groups included, in order of first
    /// encounter.
    ///
    /// Positions compare by their shortest round-trip decimal rendering, so
    /// coordinates differing only in the last bits are distinct; there is no
    /// distance tolerance.
    pub fn get_duplicates(&self, predicate: &Predicate) -> Vec<StationRecord> {
        let filtered = self.filter_by_attr(predicate);

        let mut counts: HashMap<String, usize> = HashMap::new();
        for key in filtered.iter().filter_map(position_key) {
            *counts.entry(key).or_default() += 1;
        }

        filtered
            .into_iter()
            .filter(|s| position_key(s).is_some_and(|k| counts.get(&k).copied().unwrap_or(0) > 1))
            .collect()
    }

    /// Countries present among point and coverage stations, for the country
    /// selector, sorted by display name.
    pub fn country_list(&self, countries: &CountryLookup) -> Vec<CountryOption> {
        let mut seen = HashSet::new();
        let mut options: Vec<CountryOption> = self
            .stations
            .iter()
            .map(|s| s.country_code.as_str())
            .filter(|code| !code.is_empty() && seen.insert(*code))
            .map(|code| {
                let full = countries.get(code).map(String::as_str).unwrap_or(code);
                CountryOption {
                    code: code.to_string(),
                    name: truncate_name(full),
                }
            })
            .collect();

        options.sort_by(|a, b| a.name.cmp(&b.name));
        options
    }
}

/// `lon,lat` key of a point station.
fn position_key(station: &StationRecord) -> Option<String> {
    station.lon_lat().map(|(lon, lat)| format!("{},{}", lon, lat))
}

fn truncate_name(name: &str) -> String {
    if name.chars().count() > MAX_COUNTRY_NAME_LEN {
        let head: String = name.chars().take(MAX_COUNTRY_NAME_LEN - 1).collect();
        format!("{}...", head)
    } else {
        name.to_string()
    }
}
