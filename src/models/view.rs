// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Map view state and the fixed catalogues it refers to (SRIDs, base maps,
//! toggle layers).

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Supported spatial reference systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Srid {
    #[serde(rename = "3035")]
    Laea,
    #[serde(rename = "4326")]
    Wgs84,
    #[serde(rename = "3857")]
    WebMercator,
    #[serde(rename = "3006")]
    Sweref99Tm,
    #[serde(rename = "54030")]
    Robinson,
}

impl Srid {
    pub const ALL: [Srid; 5] = [
        Srid::Laea,
        Srid::Wgs84,
        Srid::WebMercator,
        Srid::Sweref99Tm,
        Srid::Robinson,
    ];

    pub fn parse(code: &str) -> Option<Srid> {
        Srid::ALL.into_iter().find(|s| s.code() == code)
    }

    pub fn code(self) -> &'static str {
        match self {
            Srid::Laea => "3035",
            Srid::Wgs84 => "4326",
            Srid::WebMercator => "3857",
            Srid::Sweref99Tm => "3006",
            Srid::Robinson => "54030",
        }
    }

    pub fn friendly_name(self) -> &'static str {
        match self {
            Srid::Laea => "LAEA Europe",
            Srid::Wgs84 => "WGS 84",
            Srid::WebMercator => "Web Mercator",
            Srid::Sweref99Tm => "SWEREF99 TM",
            Srid::Robinson => "World Robinson",
        }
    }

    /// Coordinates are in degrees rather than metres.
    pub fn is_geographic(self) -> bool {
        matches!(self, Srid::Wgs84)
    }

    /// Decimal places kept when a center in this SRID goes into a URL.
    pub fn center_precision(self) -> usize {
        if self.is_geographic() {
            5
        } else {
            0
        }
    }

    /// The country selector is not offered for the national Swedish grid.
    pub fn uses_country_selector(self) -> bool {
        self != Srid::Sweref99Tm
    }

    /// View extent `[min_x, min_y, max_x, max_y]` in SRID units.
    pub fn extent(self) -> [f64; 4] {
        match self {
            Srid::Laea => [1896628.618, 1330000.0, 7058042.778, 6827128.02],
            Srid::Wgs84 => [-180.0, -90.0, 180.0, 90.0],
            Srid::WebMercator => [-20026376.39, -20048966.10, 20026376.39, 20048966.10],
            Srid::Sweref99Tm => [190000.0, 6101648.0, 970000.0, 7689478.0],
            Srid::Robinson => [-17005833.33, -8625154.47, 17005833.33, 8625154.47],
        }
    }
}

impl std::fmt::Display for Srid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// A selectable background layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseMap {
    pub id: &'static str,
    pub label: &'static str,
    /// Available in every projection; the others only in SRID 3006.
    pub is_world_wide: bool,
}

pub const BASE_MAPS: &[BaseMap] = &[
    BaseMap { id: "physical", label: "Physical", is_world_wide: true },
    BaseMap { id: "topo", label: "Topography", is_world_wide: true },
    BaseMap { id: "ocean", label: "Ocean", is_world_wide: true },
    BaseMap { id: "imagery", label: "Imagery", is_world_wide: true },
    BaseMap { id: "shadedRelief", label: "Shaded relief", is_world_wide: true },
    BaseMap { id: "osm", label: "OpenStreetMap", is_world_wide: true },
    BaseMap { id: "countries", label: "Countries", is_world_wide: true },
    BaseMap { id: "lmTopo", label: "Lantmäteriet topography", is_world_wide: false },
    BaseMap { id: "lmTopoGray", label: "Lantmäteriet topography (gray)", is_world_wide: false },
];

/// Toggle layer ids, in the order the layer control shows them.
pub const TOGGLE_IDS: [&str; 6] = ["os", "es", "as", "overlap", "ship", "bdr"];

/// Country filter value meaning "all countries".
pub const ALL_COUNTRIES: &str = "0";

/// Per-SRID map defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSettings {
    pub srid: Srid,
    pub default_base_map: &'static str,
    pub toggle_ids: Vec<&'static str>,
}

impl MapSettings {
    pub const DEFAULT_SRID: Srid = Srid::Laea;

    pub fn for_srid(srid: Srid) -> Self {
        let default_base_map = if srid == Srid::Sweref99Tm {
            "lmTopoGray"
        } else {
            "physical"
        };
        Self {
            srid,
            default_base_map,
            toggle_ids: TOGGLE_IDS.to_vec(),
        }
    }

    /// Base maps offered in this SRID.
    pub fn base_maps(&self) -> impl Iterator<Item = &'static BaseMap> + '_ {
        BASE_MAPS
            .iter()
            .filter(move |bm| bm.is_world_wide || self.srid == Srid::Sweref99Tm)
    }

    pub fn is_known_base_map(&self, id: &str) -> bool {
        self.base_maps().any(|bm| bm.id == id)
    }

    pub fn is_known_toggle(&self, id: &str) -> bool {
        self.toggle_ids.iter().any(|t| *t == id)
    }
}

/// Structured view state mirrored in the URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct MapViewState {
    pub srid: Srid,
    pub center: Option<[f64; 2]>,
    pub zoom: Option<f64>,
    /// Fit the view to the data extent instead of using center/zoom.
    pub fit_view: bool,
    pub base_map: String,
    /// `None` means every toggle is visible; otherwise the complete set.
    pub visible_toggles: Option<Vec<String>>,
    pub country_filter: Option<Vec<String>>,
}

impl MapViewState {
    /// The default view for an SRID.
    pub fn default_for(settings: &MapSettings) -> Self {
        Self {
            srid: settings.srid,
            center: None,
            zoom: None,
            fit_view: true,
            base_map: settings.default_base_map.to_string(),
            visible_toggles: None,
            country_filter: None,
        }
    }

    pub fn is_toggle_visible(&self, id: &str) -> bool {
        match &self.visible_toggles {
            None => true,
            Some(ids) => ids.iter().any(|t| t == id),
        }
    }
}

/// A partial view update raised by user interaction.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewPatch {
    pub center: Option<[f64; 2]>,
    pub zoom: Option<f64>,
    pub base_map: Option<String>,
    pub visible_toggles: Option<Vec<String>>,
    /// `["0"]` clears the filter.
    pub country_filter: Option<Vec<String>>,
}

impl MapViewState {
    /// `(current, patch) -> next`. Fields missing from the patch keep their
    /// current value.
    pub fn apply(&self, patch: &ViewPatch) -> MapViewState {
        let country_filter = match &patch.country_filter {
            Some(codes) if codes.iter().all(|c| c == ALL_COUNTRIES) => None,
            Some(codes) => Some(codes.clone()),
            None => self.country_filter.clone(),
        };
        MapViewState {
            srid: self.srid,
            center: patch.center.or(self.center),
            zoom: patch.zoom.or(self.zoom),
            fit_view: self.fit_view && patch.center.is_none() && patch.zoom.is_none(),
            base_map: patch
                .base_map
                .clone()
                .unwrap_or_else(|| self.base_map.clone()),
            visible_toggles: patch
                .visible_toggles
                .clone()
                .or_else(|| self.visible_toggles.clone()),
            country_filter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_srid_parse() {
        assert_eq!(Srid::parse("3857"), Some(Srid::WebMercator));
        assert_eq!(Srid::parse("9999"), None);
        assert_eq!(Srid::Robinson.to_string(), "54030");
    }

    #[test]
    fn test_sweden_defaults() {
        let settings = MapSettings::for_srid(Srid::Sweref99Tm);
        assert_eq!(settings.default_base_map, "lmTopoGray");
        assert!(settings.is_known_base_map("lmTopo"));

        let settings = MapSettings::for_srid(Srid::Laea);
        assert_eq!(settings.default_base_map, "physical");
        assert!(!settings.is_known_base_map("lmTopo"));
    }

    #[test]
    fn test_apply_patch_keeps_unpatched_fields() {
        let settings = MapSettings::for_srid(Srid::WebMercator);
        let mut state = MapViewState::default_for(&settings);
        state.country_filter = Some(vec!["SE".to_string()]);

        let next = state.apply(&ViewPatch {
            zoom: Some(4.0),
            ..Default::default()
        });
        assert_eq!(next.zoom, Some(4.0));
        assert_eq!(next.country_filter, Some(vec!["SE".to_string()]));
        assert_eq!(next.base_map, "physical");
        assert!(!next.fit_view);
    }

    #[test]
    fn test_apply_patch_zero_clears_country() {
        let settings = MapSettings::for_srid(Srid::WebMercator);
        let mut state = MapViewState::default_for(&settings);
        state.country_filter = Some(vec!["SE".to_string()]);

        let next = state.apply(&ViewPatch {
            country_filter: Some(vec![ALL_COUNTRIES.to_string()]),
            ..Default::default()
        });
        assert_eq!(next.country_filter, None);
    }
}
