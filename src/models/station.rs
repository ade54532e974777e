// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Station record model.

use crate::models::binding::DecodedValue;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::HashMap;

/// Query variables the station model reads.
pub mod vars {
    pub const SUBJECT: &str = "s";
    pub const PROD_URI: &str = "prodUri";
}

/// Canonical station columns, named after the query variables they come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    Name,
    Theme,
    StationClass,
    Location,
    Country,
    PiNames,
    SiteType,
    ElevationAboveSea,
    ElevationAboveGround,
    LabelingDate,
    Lat,
    Lon,
    GeoJson,
    ThemeShort,
}

impl Column {
    /// Column order used for records and tables.
    pub const ALL: [Column; 15] = [
        Column::Id,
        Column::Name,
        Column::Theme,
        Column::StationClass,
        Column::Location,
        Column::Country,
        Column::PiNames,
        Column::SiteType,
        Column::ElevationAboveSea,
        Column::ElevationAboveGround,
        Column::LabelingDate,
        Column::Lat,
        Column::Lon,
        Column::GeoJson,
        Column::ThemeShort,
    ];

    /// Query variable name.
    pub fn var_name(self) -> &'static str {
        match self {
            Column::Id => "Id",
            Column::Name => "Name",
            Column::Theme => "Theme",
            Column::StationClass => "Station_class",
            Column::Location => "Location",
            Column::Country => "Country",
            Column::PiNames => "PI_names",
            Column::SiteType => "Site_type",
            Column::ElevationAboveSea => "Elevation_above_sea",
            Column::ElevationAboveGround => "Elevation_above_ground",
            Column::LabelingDate => "Labeling_date",
            Column::Lat => "lat",
            Column::Lon => "lon",
            Column::GeoJson => "geoJson",
            Column::ThemeShort => "themeShort",
        }
    }

    pub fn from_var_name(name: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.var_name() == name)
    }

    /// Human-readable title for table headers.
    pub fn title(self) -> String {
        self.var_name().replace('_', " ")
    }
}

/// Station theme, encoded as a two-letter code in the source data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Theme {
    Atmosphere,
    Ecosystem,
    Ocean,
}

impl Theme {
    pub fn from_code(code: &str) -> Option<Theme> {
        match code {
            "AS" => Some(Theme::Atmosphere),
            "ES" => Some(Theme::Ecosystem),
            "OS" => Some(Theme::Ocean),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Theme::Atmosphere => "AS",
            Theme::Ecosystem => "ES",
            Theme::Ocean => "OS",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Atmosphere => "Atmosphere",
            Theme::Ecosystem => "Ecosystem",
            Theme::Ocean => "Ocean",
        }
    }
}

/// Geometry classification of a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationType {
    Point,
    Geo,
}

impl StationType {
    pub fn as_str(self) -> &'static str {
        match self {
            StationType::Point => "point",
            StationType::Geo => "geo",
        }
    }
}

/// Where a station is. Rows with no geographic reference never become records.
#[derive(Debug, Clone, PartialEq)]
pub enum StationGeometry {
    Point {
        lon: f64,
        lat: f64,
        /// Projected coordinate, present when the parser had a transform.
        point: Option<[f64; 2]>,
    },
    /// Spatial coverage, e.g. a ship track.
    Geo(geojson::Geometry),
}

/// A parsed station.
#[derive(Debug, Clone, PartialEq)]
pub struct StationRecord {
    pub values: HashMap<Column, DecodedValue>,
    pub geometry: StationGeometry,
    /// Production URI when one exists, else the raw station id.
    pub id: String,
    /// Last path segment of `id`.
    pub short_name: String,
    pub has_landing_page: bool,
    /// Raw country code; the `Country` column holds the display string.
    pub country_code: String,
}

impl StationRecord {
    pub fn station_type(&self) -> StationType {
        match self.geometry {
            StationGeometry::Point { .. } => StationType::Point,
            StationGeometry::Geo(_) => StationType::Geo,
        }
    }

    pub fn value(&self, column: Column) -> Option<&DecodedValue> {
        self.values.get(&column)
    }

    /// Column value as text, empty when the column is not text.
    pub fn text(&self, column: Column) -> &str {
        self.value(column).and_then(|v| v.as_str()).unwrap_or("")
    }

    /// `(lon, lat)` for point stations.
    pub fn lon_lat(&self) -> Option<(f64, f64)> {
        match self.geometry {
            StationGeometry::Point { lon, lat, .. } => Some((lon, lat)),
            StationGeometry::Geo(_) => None,
        }
    }

    pub fn point(&self) -> Option<[f64; 2]> {
        match self.geometry {
            StationGeometry::Point { point, .. } => point,
            StationGeometry::Geo(_) => None,
        }
    }

    pub fn geo_json(&self) -> Option<&geojson::Geometry> {
        match &self.geometry {
            StationGeometry::Geo(g) => Some(g),
            StationGeometry::Point { .. } => None,
        }
    }

    /// Look up an attribute by name: a column variable or one of the
    /// derived fields `type`, `id`, `Short_name`, `hasLandingPage`,
    /// `country_code`.
    pub fn attr(&self, name: &str) -> Option<DecodedValue> {
        match name {
            "type" => Some(DecodedValue::from(self.station_type().as_str())),
            "id" => Some(DecodedValue::from(self.id.as_str())),
            "Short_name" => Some(DecodedValue::from(self.short_name.as_str())),
            "hasLandingPage" => Some(DecodedValue::from(if self.has_landing_page {
                "true"
            } else {
                "false"
            })),
            "country_code" => Some(DecodedValue::from(self.country_code.as_str())),
            _ => Column::from_var_name(name).and_then(|c| self.value(c).cloned()),
        }
    }

    /// Feature properties for GeoJSON output: every column except the raw
    /// geometry plus the derived fields.
    pub fn properties(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut props = serde_json::Map::new();
        for column in Column::ALL {
            if column == Column::GeoJson {
                continue;
            }
            if let Some(v) = self.value(column) {
                props.insert(
                    column.var_name().to_string(),
                    serde_json::to_value(v).unwrap_or(serde_json::Value::Null),
                );
            }
        }
        props.insert("id".to_string(), self.id.clone().into());
        props.insert("Short_name".to_string(), self.short_name.clone().into());
        props.insert("hasLandingPage".to_string(), self.has_landing_page.into());
        props.insert("country_code".to_string(), self.country_code.clone().into());
        props
    }
}

impl Serialize for StationRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for column in Column::ALL {
            if column == Column::GeoJson {
                continue;
            }
            if let Some(v) = self.value(column) {
                map.serialize_entry(column.var_name(), v)?;
            }
        }
        map.serialize_entry("type", self.station_type().as_str())?;
        match &self.geometry {
            StationGeometry::Point { point, .. } => {
                if let Some(p) = point {
                    map.serialize_entry("point", p)?;
                }
            }
            StationGeometry::Geo(geometry) => map.serialize_entry("geoJson", geometry)?,
        }
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("Short_name", &self.short_name)?;
        map.serialize_entry("hasLandingPage", &self.has_landing_page)?;
        map.serialize_entry("country_code", &self.country_code)?;
        map.end()
    }
}
