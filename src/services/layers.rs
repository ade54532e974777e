// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Builds the map's layer descriptors from the station collection and the
//! country borders.

use crate::models::layer::{GeoType, LayerData, LayerDescriptor, LayerStyle, LayerType};
use crate::models::station::{Column, StationRecord, StationType, Theme};
use crate::models::view::MapViewState;
use crate::services::projection::Projection;
use crate::services::stations::{Predicate, Stations};
use geojson::{Feature, FeatureCollection};
use std::collections::HashSet;

pub const BORDERS_LAYER_ID: &str = "bdr";
pub const COUNTRIES_BASE_MAP_ID: &str = "countries";

const STATION_Z_INDEX: i32 = 100;

/// Point layer per theme, in drawing order.
const THEME_LAYERS: [(&str, Theme, &str, &str); 3] = [
    ("as", Theme::Atmosphere, "Atmosphere stations", "rgb(255,50,50)"),
    ("es", Theme::Ecosystem, "Ecosystem stations", "green"),
    ("os", Theme::Ocean, "Ocean stations", "blue"),
];

/// The station toggle layers: one point layer per theme (stations sharing
/// a position with another station excluded), the overlap layer holding
/// those, and the geo coverage layer.
pub fn station_toggle_layers(stations: &Stations, view: &MapViewState) -> Vec<LayerDescriptor> {
    let duplicates = stations.get_duplicates(&Predicate::of_type(StationType::Point));
    let duplicate_ids: HashSet<&str> = duplicates.iter().map(|d| d.id.as_str()).collect();

    let mut layers: Vec<LayerDescriptor> = THEME_LAYERS
        .iter()
        .map(|&(id, theme, label, color)| {
            let members: Vec<StationRecord> = stations
                .filter_by_attr(&Predicate::of_type(StationType::Point).with("themeShort", theme.code()))
                .into_iter()
                .filter(|s| !duplicate_ids.contains(s.id.as_str()))
                .collect();
            point_layer(id, label, view.is_toggle_visible(id), members, color)
        })
        .collect();

    layers.push(point_layer(
        "overlap",
        "Overlapping stations",
        view.is_toggle_visible("overlap"),
        duplicates.clone(),
        "rgb(248,246,26)",
    ));

    let projection = Projection::for_srid(view.srid);
    let coverage = stations.filter_by_attr(&Predicate::of_type(StationType::Geo));
    let features: Vec<Feature> = coverage
        .iter()
        .filter_map(|s| coverage_feature(s, &projection))
        .collect();

    layers.push(LayerDescriptor {
        id: "ship".to_string(),
        label: "Shipping geo coverage".to_string(),
        layer_type: LayerType::Toggle,
        visible: view.is_toggle_visible("ship"),
        geo_type: GeoType::GeoJson,
        data: LayerData::GeoJson(FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }),
        style: vec![LayerStyle::line("rgb(50,50,200)", 2.0)],
        z_index: STATION_Z_INDEX,
        interactive: true,
    });

    tracing::debug!(
        srid = %view.srid,
        stations = stations.len(),
        duplicates = duplicates.len(),
        coverage = coverage.len(),
        "Built station layers"
    );
    layers
}

fn point_layer(
    id: &str,
    label: &str,
    visible: bool,
    stations: Vec<StationRecord>,
    color: &str,
) -> LayerDescriptor {
    LayerDescriptor {
        id: id.to_string(),
        label: label.to_string(),
        layer_type: LayerType::Toggle,
        visible,
        geo_type: GeoType::Point,
        data: LayerData::Stations(stations),
        style: vec![LayerStyle::point(color)],
        z_index: STATION_Z_INDEX,
        interactive: true,
    }
}

/// Coverage station as a feature in the target SRID. LAEA coverage is
/// clipped to the grid's area first; nothing left means no feature.
fn coverage_feature(station: &StationRecord, projection: &Projection) -> Option<Feature> {
    let geometry = projection.clip_to_area_of_use(station.geo_json()?)?;
    let geometry = match projection.project_geometry(&geometry) {
        Ok(g) => g,
        Err(e) => {
            tracing::warn!(station = %station.short_name, error = %e, "Dropping coverage");
            return None;
        }
    };
    Some(Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(station.properties()),
        foreign_members: None,
    })
}

/// Country borders toggle layer.
pub fn border_layer(countries: &FeatureCollection, view: &MapViewState) -> LayerDescriptor {
    LayerDescriptor {
        id: BORDERS_LAYER_ID.to_string(),
        label: "Country borders".to_string(),
        layer_type: LayerType::Toggle,
        visible: view.is_toggle_visible(BORDERS_LAYER_ID),
        geo_type: GeoType::GeoJson,
        data: LayerData::GeoJson(project_collection(countries, view)),
        style: vec![
            LayerStyle::line("rgb(175,175,175)", 3.0),
            LayerStyle::line("rgb(50,50,50)", 1.0),
        ],
        z_index: STATION_Z_INDEX,
        interactive: false,
    }
}

/// The filled countries base map, drawn from the same borders document.
pub fn countries_base_map_layer(
    countries: &FeatureCollection,
    view: &MapViewState,
) -> LayerDescriptor {
    LayerDescriptor {
        id: COUNTRIES_BASE_MAP_ID.to_string(),
        label: "Countries".to_string(),
        layer_type: LayerType::BaseMap,
        visible: view.base_map == COUNTRIES_BASE_MAP_ID,
        geo_type: GeoType::GeoJson,
        data: LayerData::GeoJson(project_collection(countries, view)),
        style: vec![LayerStyle::area("rgb(205,170,102)", "rgb(100,100,100)")],
        z_index: STATION_Z_INDEX,
        interactive: false,
    }
}

fn project_collection(fc: &FeatureCollection, view: &MapViewState) -> FeatureCollection {
    let projection = Projection::for_srid(view.srid);
    FeatureCollection {
        bbox: None,
        features: fc
            .features
            .iter()
            .filter_map(|f| {
                match f.geometry.as_ref().map(|g| projection.project_geometry(g)).transpose() {
                    Ok(geometry) => Some(Feature {
                        geometry,
                        ..f.clone()
                    }),
                    Err(e) => {
                        tracing::warn!(error = %e, "Dropping country feature");
                        None
                    }
                }
            })
            .collect(),
        foreign_members: None,
    }
}

/// Restrict station layers to the selected countries. Without a selection
/// every station stays. With one, a station stays when its country is
/// selected and, unless `show_non_labelled`, it has a labeling date.
/// Border and base map layers are left alone.
pub fn filter_layers(
    layers: Vec<LayerDescriptor>,
    countries: Option<&[String]>,
    show_non_labelled: bool,
) -> Vec<LayerDescriptor> {
    let Some(selected) = countries else {
        return layers;
    };
    let keep = |country: &str, labelled: bool| {
        selected.iter().any(|c| c == country) && (show_non_labelled || labelled)
    };

    layers
        .into_iter()
        .map(|mut layer| {
            if !layer.holds_stations() {
                return layer;
            }
            layer.data = match layer.data {
                LayerData::Stations(stations) => LayerData::Stations(
                    stations
                        .into_iter()
                        .filter(|s| keep(&s.country_code, is_labelled(s)))
                        .collect(),
                ),
                LayerData::GeoJson(mut fc) => {
                    fc.features.retain(|f| {
                        let country = f
                            .property("country_code")
                            .and_then(|v| v.as_str())
                            .unwrap_or("");
                        let labelled = f
                            .property(Column::LabelingDate.var_name())
                            .is_some_and(|v| !v.is_null() && v.as_str() != Some(""));
                        keep(country, labelled)
                    });
                    LayerData::GeoJson(fc)
                }
            };
            layer
        })
        .collect()
}

fn is_labelled(station: &StationRecord) -> bool {
    station
        .value(Column::LabelingDate)
        .is_some_and(|v| v.is_truthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::binding::DecodedValue;
    use crate::models::station::StationGeometry;
    use crate::models::view::{MapSettings, Srid};
    use std::collections::HashMap;

    fn record(id: &str, theme: &str, country: &str, geometry: StationGeometry) -> StationRecord {
        let mut values = HashMap::new();
        values.insert(Column::ThemeShort, DecodedValue::from(theme));
        values.insert(Column::LabelingDate, DecodedValue::from(""));
        StationRecord {
            values,
            geometry,
            id: id.to_string(),
            short_name: id.to_string(),
            has_landing_page: false,
            country_code: country.to_string(),
        }
    }

    fn point(id: &str, theme: &str, country: &str, lon: f64, lat: f64) -> StationRecord {
        record(id, theme, country, StationGeometry::Point { lon, lat, point: None })
    }

    fn track(id: &str, coords: Vec<Vec<f64>>) -> StationRecord {
        record(
            id,
            "OS",
            "FR",
            StationGeometry::Geo(geojson::Geometry::new(geojson::Value::LineString(coords))),
        )
    }

    fn view(query_srid: Srid) -> MapViewState {
        MapViewState::default_for(&MapSettings::for_srid(query_srid))
    }

    fn layer<'a>(layers: &'a [LayerDescriptor], id: &str) -> &'a LayerDescriptor {
        layers.iter().find(|l| l.id == id).unwrap()
    }

    fn station_ids(layer: &LayerDescriptor) -> Vec<&str> {
        match &layer.data {
            LayerData::Stations(s) => s.iter().map(|s| s.id.as_str()).collect(),
            LayerData::GeoJson(_) => panic!("not a point layer"),
        }
    }

    fn fixture() -> Stations {
        Stations::new(vec![
            point("a1", "AS", "SE", 10.0, 60.0),
            point("e1", "ES", "SE", 10.0, 60.0),
            point("e2", "ES", "FR", 2.0, 48.0),
            point("o1", "OS", "FR", -4.0, 47.0),
            track("ship1", vec![vec![-5.0, 45.0], vec![0.0, 45.0]]),
        ])
    }

    #[test]
    fn test_duplicates_move_to_overlap_layer() {
        let layers = station_toggle_layers(&fixture(), &view(Srid::Wgs84));
        let ids: Vec<&str> = layers.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["as", "es", "os", "overlap", "ship"]);

        assert!(station_ids(layer(&layers, "as")).is_empty());
        assert_eq!(station_ids(layer(&layers, "es")), vec!["e2"]);
        assert_eq!(station_ids(layer(&layers, "os")), vec!["o1"]);
        assert_eq!(station_ids(layer(&layers, "overlap")), vec!["a1", "e1"]);
    }

    #[test]
    fn test_ship_layer_is_projected_feature_collection() {
        let layers = station_toggle_layers(&fixture(), &view(Srid::WebMercator));
        let ship = layer(&layers, "ship");
        assert_eq!(ship.geo_type, GeoType::GeoJson);

        let LayerData::GeoJson(fc) = &ship.data else {
            panic!("ship layer should be GeoJSON");
        };
        assert_eq!(fc.features.len(), 1);
        assert_eq!(
            fc.features[0].property("id").and_then(|v| v.as_str()),
            Some("ship1")
        );
        match &fc.features[0].geometry.as_ref().unwrap().value {
            geojson::Value::LineString(line) => {
                // -5 degrees in Web Mercator metres
                assert!((line[0][0] + 556597.45).abs() < 1.0);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_laea_drops_coverage_outside_area_of_use() {
        let stations = Stations::new(vec![track(
            "pacific",
            vec![vec![-150.0, 10.0], vec![-140.0, 12.0]],
        )]);
        let layers = station_toggle_layers(&stations, &view(Srid::Laea));
        assert!(layer(&layers, "ship").data.is_empty());
    }

    #[test]
    fn test_visibility_follows_view_state() {
        let mut state = view(Srid::Wgs84);
        state.visible_toggles = Some(vec!["os".to_string()]);
        let layers = station_toggle_layers(&fixture(), &state);
        for l in &layers {
            assert_eq!(l.visible, l.id == "os", "layer {}", l.id);
        }
    }

    #[test]
    fn test_filter_by_country() {
        let layers = station_toggle_layers(&fixture(), &view(Srid::Wgs84));
        let selected = vec!["FR".to_string()];
        let filtered = filter_layers(layers, Some(&selected), true);

        assert_eq!(station_ids(layer(&filtered, "es")), vec!["e2"]);
        assert!(station_ids(layer(&filtered, "overlap")).is_empty());
        assert_eq!(layer(&filtered, "ship").data.len(), 1);
    }

    #[test]
    fn test_filter_hides_non_labelled() {
        let mut labelled = point("e3", "ES", "FR", 5.0, 45.0);
        labelled
            .values
            .insert(Column::LabelingDate, DecodedValue::from("2020-01-01"));
        let mut stations = fixture().all().to_vec();
        stations.push(labelled);

        let layers = station_toggle_layers(&Stations::new(stations), &view(Srid::Wgs84));
        let selected = vec!["FR".to_string()];
        let filtered = filter_layers(layers, Some(&selected), false);

        assert_eq!(station_ids(layer(&filtered, "es")), vec!["e3"]);
        assert!(layer(&filtered, "ship").data.is_empty());
    }

    #[test]
    fn test_no_selection_keeps_everything() {
        let layers = station_toggle_layers(&fixture(), &view(Srid::Wgs84));
        let filtered = filter_layers(layers.clone(), None, false);
        assert_eq!(filtered, layers);
    }

    #[test]
    fn test_border_layer_not_filtered() {
        let borders = FeatureCollection {
            bbox: None,
            features: vec![Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::new(geojson::Value::Point(vec![
                    15.0, 60.0,
                ]))),
                id: None,
                properties: None,
                foreign_members: None,
            }],
            foreign_members: None,
        };
        let state = view(Srid::Sweref99Tm);
        let layers = vec![border_layer(&borders, &state)];
        let selected = vec!["FR".to_string()];
        let filtered = filter_layers(layers, Some(&selected), false);

        let bdr = layer(&filtered, BORDERS_LAYER_ID);
        assert!(!bdr.interactive);
        assert_eq!(bdr.data.len(), 1);
        let LayerData::GeoJson(fc) = &bdr.data else {
            panic!("border layer should be GeoJSON");
        };
        match &fc.features[0].geometry.as_ref().unwrap().value {
            geojson::Value::Point(p) => assert!((p[0] - 500000.0).abs() < 0.01),
            other => panic!("unexpected {:?}", other),
        }
    }
}
