// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! URL query string <-> map view state.
//!
//! Recognised parameters: `srid`, `zoom`, `center`, `fitView`, `baseMap`,
//! `visibleToggles` (legacy `show`) and `countryFilter` (legacy
//! `countries`). Anything else is ignored. Invalid values fall back to
//! defaults; only an unsupported SRID is an error.

use crate::models::view::{MapSettings, MapViewState, Srid, ALL_COUNTRIES};
use crate::services::lookup::CountryLookup;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use url::form_urlencoded;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

static ZOOM_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}(\.\d*)?$").expect("valid zoom regex"));

static CENTER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?\d+(\.\d+)?,-?\d+(\.\d+)?$").expect("valid center regex")
});

/// Decimal places kept for zoom in URLs.
const ZOOM_PRECISION: usize = 2;

/// Decodes and encodes view state; validates country codes against the
/// country lookup.
#[derive(Debug, Clone, Default)]
pub struct ViewCodec {
    countries: CountryLookup,
}

impl ViewCodec {
    pub fn new(countries: CountryLookup) -> Self {
        Self { countries }
    }

    /// Decode a query string (with or without the leading `?`).
    pub fn decode(&self, query: &str) -> Result<MapViewState, ViewStateError> {
        let params = QueryParams::parse(query);
        let settings = MapSettings::for_srid(srid_param(&params)?);
        let mut state = MapViewState::default_for(&settings);

        let fit_view_requested = params
            .get("fitView")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));

        if !fit_view_requested {
            state.zoom = params
                .get("zoom")
                .filter(|z| ZOOM_PATTERN.is_match(z))
                .and_then(|z| z.parse().ok());
            state.center = params
                .get("center")
                .filter(|c| CENTER_PATTERN.is_match(c))
                .and_then(parse_center);
            state.fit_view = state.zoom.is_none() || state.center.is_none();
        }

        if let Some(base_map) = params.get("baseMap") {
            if settings.is_known_base_map(base_map) {
                state.base_map = base_map.to_string();
            } else {
                tracing::debug!(base_map, "Unknown base map, using default");
            }
        }

        if let Some(toggles) = params.get("visibleToggles").or_else(|| params.get("show")) {
            let mut visible: Vec<String> = Vec::new();
            for id in toggles.split(',').filter(|id| settings.is_known_toggle(id)) {
                if !visible.iter().any(|v| v == id) {
                    visible.push(id.to_string());
                }
            }
            state.visible_toggles = Some(visible);
        }

        if let Some(filter) = params.get("countryFilter").or_else(|| params.get("countries")) {
            state.country_filter = self.validate_countries(filter);
        }

        Ok(state)
    }

    /// All-or-nothing: one unknown code drops the whole filter.
    fn validate_countries(&self, filter: &str) -> Option<Vec<String>> {
        let codes: Vec<String> = filter
            .split(',')
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();

        if codes.is_empty() || codes.iter().all(|c| c == ALL_COUNTRIES) {
            return None;
        }
        if codes.iter().all(|c| self.countries.contains_key(c)) {
            Some(codes)
        } else {
            tracing::debug!(filter, "Country filter has unknown codes, ignoring");
            None
        }
    }

    /// Minimal query string reproducing `state`: parameters equal to their
    /// defaults are omitted, center and zoom are rounded. Empty when every
    /// parameter is at its default.
    pub fn encode(&self, state: &MapViewState) -> String {
        let settings = MapSettings::for_srid(state.srid);
        let mut params: Vec<(&str, String)> = Vec::new();

        if state.srid != MapSettings::DEFAULT_SRID {
            params.push(("srid", state.srid.code().to_string()));
        }

        if let Some([x, y]) = state.center {
            let precision = state.srid.center_precision();
            params.push((
                "center",
                format!("{},{}", round(x, precision), round(y, precision)),
            ));
        }

        if let Some(zoom) = state.zoom {
            params.push(("zoom", round(zoom, ZOOM_PRECISION).to_string()));
        }

        if state.base_map != settings.default_base_map {
            params.push(("baseMap", encode_component(&state.base_map)));
        }

        if let Some(visible) = &state.visible_toggles {
            let all_visible = settings
                .toggle_ids
                .iter()
                .all(|id| visible.iter().any(|v| v == id));
            if !all_visible {
                params.push(("visibleToggles", join_encoded(visible)));
            }
        }

        if let Some(countries) = &state.country_filter {
            params.push(("countryFilter", join_encoded(countries)));
        }

        if params.is_empty() {
            return String::new();
        }

        let joined: Vec<String> = params
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        format!("?{}", joined.join("&"))
    }
}

/// Only the SRID of a query. Needs no country lookup, so an unsupported
/// SRID can be rejected before any other work.
pub fn requested_srid(query: &str) -> Result<Srid, ViewStateError> {
    srid_param(&QueryParams::parse(query))
}

fn srid_param(params: &QueryParams) -> Result<Srid, ViewStateError> {
    match params.get("srid") {
        None => Ok(MapSettings::DEFAULT_SRID),
        Some(code) => Srid::parse(code).ok_or_else(|| ViewStateError::IllegalSrid(code.to_string())),
    }
}

/// Decoded query parameters in their original order.
#[derive(Debug, Default)]
struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    fn parse(query: &str) -> Self {
        let query = query.trim_start_matches('?');
        let pairs = form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        Self { pairs }
    }

    /// First value of a parameter, like `URLSearchParams::get`.
    fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

fn encode_component(raw: &str) -> String {
    form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

fn join_encoded(items: &[String]) -> String {
    items
        .iter()
        .map(|i| encode_component(i))
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_center(text: &str) -> Option<[f64; 2]> {
    let (x, y) = text.split_once(',')?;
    Some([x.parse().ok()?, y.parse().ok()?])
}

/// Round to `precision` decimals; negative zero renders as `0`.
fn round(value: f64, precision: usize) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor + 0.0
}

/// Supported SRIDs with example URLs, shown when a URL names an unsupported
/// SRID.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SridListing {
    pub message: String,
    pub supported: Vec<SridInfo>,
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SridInfo {
    pub srid: String,
    pub name: String,
}

impl SridListing {
    pub fn new(base_url: &str) -> Self {
        let supported: Vec<SridInfo> = Srid::ALL
            .into_iter()
            .map(|s| SridInfo {
                srid: s.code().to_string(),
                name: s.friendly_name().to_string(),
            })
            .collect();
        let described: Vec<String> = supported
            .iter()
            .map(|s| format!("{} ({})", s.srid, s.name))
            .collect();
        Self {
            message: format!(
                "Illegal SRID. Must be one of these numbers: {}.",
                described.join(", ")
            ),
            examples: Srid::ALL
                .into_iter()
                .map(|s| format!("{}?srid={}", base_url, s.code()))
                .collect(),
            supported,
        }
    }
}

/// Errors from view state decoding.
#[derive(Debug, thiserror::Error)]
pub enum ViewStateError {
    #[error("Illegal SRID: {0}")]
    IllegalSrid(String),
}
