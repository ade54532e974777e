// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use station_map::config::Config;
use station_map::models::{BindingRow, SparqlResponse};
use station_map::routes::create_router;
use station_map::services::lookup::{COUNTRIES_TOPO_KEY, COUNTRY_LOOKUP_KEY};
use station_map::services::merge_entry_and_production;
use station_map::AppState;
use std::sync::Arc;
use tower::ServiceExt;

const XSD_DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";

fn literal(value: &str) -> Value {
    json!({"type": "literal", "value": value})
}

fn double(value: &str) -> Value {
    json!({"type": "literal", "datatype": XSD_DOUBLE, "value": value})
}

fn uri(value: &str) -> Value {
    json!({"type": "uri", "value": value})
}

/// Station entry result set: two stations sharing a position in Sweden, a
/// non-labelled French ecosystem station, a French ship track and a station
/// without any location.
#[allow(dead_code)]
pub fn entry_response() -> SparqlResponse {
    serde_json::from_value(json!({
        "head": {"vars": ["s", "Id", "Name", "themeShort", "lat", "lon", "geoJson",
                          "Country", "PI_names", "Station_class", "Labeling_date"]},
        "results": {"bindings": [
            {
                "s": uri("http://meta.icos-cp.eu/resources/stationentry/AS/HTM"),
                "Id": literal("HTM"),
                "Name": literal("Hyltemossa"),
                "themeShort": literal("AS"),
                "lat": double("56.0976"),
                "lon": double("13.4189"),
                "Country": literal("SE"),
                "PI_names": literal("Smith;Adams"),
                "Station_class": literal("1"),
                "Labeling_date": literal("2018-05-31")
            },
            {
                "s": uri("http://meta.icos-cp.eu/resources/stationentry/ES/SE-Htm"),
                "Id": literal("SE-Htm"),
                "Name": literal("Hyltemossa forest"),
                "themeShort": literal("ES"),
                "lat": double("56.0976"),
                "lon": double("13.4189"),
                "Country": literal("SE"),
                "PI_names": literal("Kljun"),
                "Labeling_date": literal("2019-11-20")
            },
            {
                "s": uri("http://meta.icos-cp.eu/resources/stationentry/ES/FR-Fon"),
                "Id": literal("FR-Fon"),
                "Name": literal("Fontainebleau-Barbeau"),
                "themeShort": literal("ES"),
                "lat": double("48.4764"),
                "lon": double("2.7801"),
                "Country": literal("FR"),
                "PI_names": literal("Berveiller"),
                "Station_class": literal("Ass")
            },
            {
                "s": uri("http://meta.icos-cp.eu/resources/stationentry/OS/FRSH"),
                "Id": literal("FRSH"),
                "Name": literal("Ferry line"),
                "themeShort": literal("OS"),
                "geoJson": literal("{\"type\":\"LineString\",\"coordinates\":[[-5.0,45.0],[-1.5,46.2]]}"),
                "Country": literal("FR"),
                "PI_names": literal("Lefevre"),
                "Labeling_date": literal("2020-01-01")
            },
            {
                "s": uri("http://meta.icos-cp.eu/resources/stationentry/AS/XXX"),
                "Id": literal("XXX"),
                "Name": literal("Planned station"),
                "themeShort": literal("AS"),
                "Country": literal("DE"),
                "PI_names": literal("Nobody")
            }
        ]}
    }))
    .expect("valid entry fixture")
}

/// Production result set: only HTM is in production.
#[allow(dead_code)]
pub fn production_response() -> SparqlResponse {
    serde_json::from_value(json!({
        "head": {"vars": ["s", "ps", "Id", "Name", "lat", "lon", "Country", "prodUri"]},
        "results": {"bindings": [
            {
                "s": uri("http://meta.icos-cp.eu/resources/stationentry/AS/HTM"),
                "ps": uri("http://meta.icos-cp.eu/resources/stations/AS_HTM"),
                "Id": literal("HTM"),
                "Name": literal("Hyltemossa station"),
                "lat": double("56.0976"),
                "lon": double("13.4189"),
                "Country": literal("SE"),
                "prodUri": uri("http://meta.icos-cp.eu/resources/stations/AS_HTM")
            },
            {
                "s": uri("http://meta.icos-cp.eu/resources/stationentry/AS/GONE"),
                "Id": literal("GONE"),
                "Name": literal("Decommissioned"),
                "prodUri": uri("http://meta.icos-cp.eu/resources/stations/AS_GONE")
            }
        ]}
    }))
    .expect("valid production fixture")
}

/// Entry rows merged with production rows.
#[allow(dead_code)]
pub fn station_rows() -> Vec<BindingRow> {
    merge_entry_and_production(
        entry_response().results.bindings,
        &production_response().results.bindings,
    )
}

#[allow(dead_code)]
pub fn country_lookup_json() -> Value {
    json!({"SE": "Sweden", "FR": "France", "GB": "United Kingdom of Great Britain and Northern Ireland"})
}

#[allow(dead_code)]
pub fn countries_geojson() -> Value {
    json!({
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"iso2": "SE"},
                "geometry": {"type": "Polygon", "coordinates": [[[11.0, 55.0], [24.0, 55.0], [24.0, 69.0], [11.0, 55.0]]]}
            },
            {
                "type": "Feature",
                "properties": {"iso2": "FR"},
                "geometry": {"type": "Polygon", "coordinates": [[[-5.0, 42.0], [8.0, 42.0], [8.0, 51.0], [-5.0, 42.0]]]}
            }
        ]
    })
}

/// Test config whose lookup URLs refuse connections, so any unexpected
/// fetch fails instead of reaching the network.
#[allow(dead_code)]
pub fn offline_config() -> Config {
    Config {
        sparql_endpoint: "http://127.0.0.1:9/sparql".to_string(),
        country_lookup_url: "http://127.0.0.1:9/countries.json".to_string(),
        countries_geojson_url: "http://127.0.0.1:9/map.json".to_string(),
        public_base_url: "https://map.example/".to_string(),
        ..Config::default()
    }
}

/// Create a test app with the fixture stations and preloaded lookup
/// documents. Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    build_app(Some(station_rows()), true)
}

/// Create a test app whose start-up station fetch failed.
#[allow(dead_code)]
pub fn create_test_app_without_stations() -> (axum::Router, Arc<AppState>) {
    build_app(None, true)
}

/// Create a test app with nothing cached; any lookup fetch fails.
#[allow(dead_code)]
pub fn create_test_app_without_lookups() -> (axum::Router, Arc<AppState>) {
    build_app(Some(station_rows()), false)
}

fn build_app(rows: Option<Vec<BindingRow>>, preload: bool) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(offline_config(), rows));
    if preload {
        state.lookup.preload(COUNTRY_LOOKUP_KEY, country_lookup_json());
        state.lookup.preload(COUNTRIES_TOPO_KEY, countries_geojson());
    }
    (create_router(state.clone()), state)
}

/// GET a URI and return the status with the JSON body.
#[allow(dead_code)]
pub async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}
