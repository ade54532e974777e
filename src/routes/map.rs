// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Map routes: view state, layers, country selector, station table, help.

use crate::error::{AppError, Result};
use crate::models::layer::LayerDescriptor;
use crate::models::view::{MapSettings, MapViewState, Srid};
use crate::services::layers::{
    border_layer, countries_base_map_layer, filter_layers, station_toggle_layers,
};
use crate::services::parser::{StationParser, StationTable};
use crate::services::stations::CountryOption;
use crate::services::view_codec::{self, ViewStateError};
use crate::AppState;
use axum::{
    extract::{Query, RawQuery, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/view", get(get_view))
        .route("/api/layers", get(get_layers))
        .route("/api/countries", get(get_countries))
        .route("/api/stations/table", get(get_station_table))
        .route("/help", get(get_help))
}

/// Reject an unsupported SRID before touching lookups or stations.
fn check_srid(state: &AppState, query: &str) -> Result<Srid> {
    view_codec::requested_srid(query).map_err(|e| illegal_srid(state, e))
}

fn illegal_srid(state: &AppState, err: ViewStateError) -> AppError {
    match err {
        ViewStateError::IllegalSrid(requested) => {
            AppError::illegal_srid(&requested, &state.config.public_base_url)
        }
    }
}

async fn decode_view(state: &AppState, query: &str) -> Result<MapViewState> {
    check_srid(state, query)?;
    let codec = state.codec().await;
    codec.decode(query).map_err(|e| illegal_srid(state, e))
}

// ─── View State ──────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BaseMapOption {
    pub id: String,
    pub label: String,
}

/// Decoded view state plus the catalogues the map controls need.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ViewResponse {
    pub state: MapViewState,
    /// Canonical (minimal) query string for this state.
    pub query: String,
    pub srid_name: String,
    pub extent: [f64; 4],
    pub default_base_map: String,
    pub base_maps: Vec<BaseMapOption>,
    pub toggles: Vec<String>,
    pub country_selector: bool,
}

async fn get_view(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Result<Json<ViewResponse>> {
    let query = query.unwrap_or_default();
    check_srid(&state, &query)?;
    let codec = state.codec().await;
    let view = codec.decode(&query).map_err(|e| illegal_srid(&state, e))?;
    let settings = MapSettings::for_srid(view.srid);

    Ok(Json(ViewResponse {
        query: codec.encode(&view),
        srid_name: view.srid.friendly_name().to_string(),
        extent: view.srid.extent(),
        default_base_map: settings.default_base_map.to_string(),
        base_maps: settings
            .base_maps()
            .map(|bm| BaseMapOption {
                id: bm.id.to_string(),
                label: bm.label.to_string(),
            })
            .collect(),
        toggles: settings.toggle_ids.iter().map(|t| t.to_string()).collect(),
        country_selector: view.srid.uses_country_selector(),
        state: view,
    }))
}

// ─── Layers ──────────────────────────────────────────────────

#[derive(Deserialize)]
struct LayerOptions {
    #[serde(rename = "showNonLabelled")]
    show_non_labelled: Option<String>,
}

impl LayerOptions {
    /// Defaults to showing them; values other than `true`/`false` are
    /// ignored.
    fn show_non_labelled(&self) -> bool {
        !matches!(self.show_non_labelled.as_deref(), Some("false"))
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LayersResponse {
    pub view: MapViewState,
    /// False when station data could not be fetched at start-up.
    pub stations_available: bool,
    #[cfg_attr(feature = "binding-generation", ts(type = "unknown[]"))]
    pub layers: Vec<LayerDescriptor>,
}

async fn get_layers(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
    Query(options): Query<LayerOptions>,
) -> Result<Json<LayersResponse>> {
    let query = query.unwrap_or_default();
    let view = decode_view(&state, &query).await?;

    let mut layers = Vec::new();
    match state.lookup.countries_geojson().await {
        Ok(countries) => {
            layers.push(countries_base_map_layer(&countries, &view));
            layers.push(border_layer(&countries, &view));
        }
        Err(e) => tracing::warn!(error = %e, "Country borders unavailable, omitting border layers"),
    }

    let stations = match state.stations(view.srid).await {
        Ok(stations) => stations,
        Err(AppError::Lookup(e)) => {
            tracing::warn!(error = %e, "Country lookup unavailable, omitting station layers");
            None
        }
        Err(e) => return Err(e),
    };
    if let Some(stations) = &stations {
        layers.extend(station_toggle_layers(stations, &view));
    } else {
        tracing::warn!("No station data, serving border layers only");
    }

    let layers = filter_layers(
        layers,
        view.country_filter.as_deref(),
        options.show_non_labelled(),
    );

    Ok(Json(LayersResponse {
        view,
        stations_available: stations.is_some(),
        layers,
    }))
}

// ─── Country Selector ────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CountriesResponse {
    pub countries: Vec<CountryOption>,
}

/// Countries with stations. Empty in projections without a country
/// selector.
async fn get_countries(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Result<Json<CountriesResponse>> {
    let srid = check_srid(&state, &query.unwrap_or_default())?;
    if !srid.uses_country_selector() {
        return Ok(Json(CountriesResponse { countries: vec![] }));
    }

    let stations = state.stations(srid).await?.ok_or(AppError::StationsUnavailable)?;
    let lookup = state.lookup.country_lookup().await?;

    Ok(Json(CountriesResponse {
        countries: stations.country_list(&lookup),
    }))
}

// ─── Station Table ───────────────────────────────────────────

async fn get_station_table(State(state): State<Arc<AppState>>) -> Result<Json<StationTable>> {
    let rows = state
        .station_rows
        .as_ref()
        .ok_or(AppError::StationsUnavailable)?;
    let lookup = state.lookup.country_lookup().await?;
    Ok(Json(StationParser::new(lookup, None).parse_table(rows)))
}

// ─── Help ────────────────────────────────────────────────────

/// Plain-text usage: supported projections and URL parameters.
async fn get_help(State(state): State<Arc<AppState>>) -> String {
    help_text(&state.config.public_base_url)
}

pub fn help_text(base_url: &str) -> String {
    let srids: Vec<&str> = Srid::ALL.iter().map(|s| s.code()).collect();
    let default = MapSettings::DEFAULT_SRID;
    format!(
        "This map has support for these projections: {srids}. If no projection (srid) is \
         provided, it defaults to {code} - {name}.\n\
         Example: {base}?srid=54030\n\n\
         Other params that can be set in URL: zoom, center, baseMap, visibleToggles and \
         countryFilter. These are easiest set by zooming, panning in map and turning layers \
         on/off in the layer control until you are satisfied. The URL is automatically \
         updated with those parameters.\n\
         Example: {base}?srid=3857&center=468810,5860997&zoom=5.81&baseMap=ocean&visibleToggles=bdr,as,es,os,overlap&countryFilter=FR\n",
        srids = srids.join(", "),
        code = default.code(),
        name = default.friendly_name(),
        base = base_url,
    )
}
