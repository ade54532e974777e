// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Station record parser: merged SPARQL rows to station records.

use crate::models::binding::{decode, BindingRow, DecodedValue};
use crate::models::station::{vars, Column, StationGeometry, StationRecord, Theme};
use crate::services::lookup::CountryLookup;
use crate::services::projection::{ProjectionError, TransformPointFn};
use geojson::GeoJson;
use serde::Serialize;
use std::collections::HashMap;

/// Parses merged station rows into records.
#[derive(Clone)]
pub struct StationParser {
    countries: CountryLookup,
    transform: Option<TransformPointFn>,
    strict: bool,
}

/// Station rows as display strings, for table views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl StationParser {
    /// Rows with malformed coverage or an unprojectable point are skipped.
    pub fn new(countries: CountryLookup, transform: Option<TransformPointFn>) -> Self {
        Self {
            countries,
            transform,
            strict: false,
        }
    }

    /// Rows with malformed coverage or an unprojectable point fail the
    /// whole parse.
    pub fn strict(countries: CountryLookup, transform: Option<TransformPointFn>) -> Self {
        Self {
            strict: true,
            ..Self::new(countries, transform)
        }
    }

    /// Parse rows into station records, preserving row order. Rows without a
    /// usable geographic reference are dropped.
    pub fn parse(&self, rows: &[BindingRow]) -> Result<Vec<StationRecord>, ParseError> {
        let mut stations = Vec::with_capacity(rows.len());

        for row in rows {
            if !has_geo_reference(row) {
                continue;
            }

            let values: HashMap<Column, DecodedValue> = Column::ALL
                .into_iter()
                .map(|col| (col, self.column_value(col, row)))
                .collect();

            let geometry = match self.classify(&values) {
                Ok(Some(geometry)) => geometry,
                Ok(None) => continue,
                Err(err) => {
                    let station = raw_value(row, Column::Id.var_name()).to_string();
                    tracing::warn!(station = %station, error = %err, "Skipping station");
                    if self.strict {
                        return Err(err.into_parse_error(station));
                    }
                    continue;
                }
            };

            let id = match row.get(vars::PROD_URI) {
                Some(prod) => prod.value.clone(),
                None => raw_value(row, Column::Id.var_name()).to_string(),
            };
            let short_name = id.rsplit('/').next().unwrap_or_default().to_string();

            stations.push(StationRecord {
                has_landing_page: id.starts_with("http"),
                country_code: raw_value(row, Column::Country.var_name()).to_string(),
                short_name,
                id,
                values,
                geometry,
            });
        }

        tracing::debug!(rows = rows.len(), stations = stations.len(), "Parsed stations");
        Ok(stations)
    }

    /// Every row as display strings, with the column modifiers applied.
    pub fn parse_table(&self, rows: &[BindingRow]) -> StationTable {
        let table_rows: Vec<Vec<String>> = rows
            .iter()
            .map(|row| {
                Column::ALL
                    .into_iter()
                    .map(|col| {
                        let raw = raw_value(row, col.var_name());
                        self.modify(col, raw, row)
                            .unwrap_or_else(|| raw.to_string())
                    })
                    .collect()
            })
            .collect();

        StationTable {
            columns: Column::ALL.into_iter().map(Column::title).collect(),
            rows: table_rows,
        }
    }

    fn column_value(&self, col: Column, row: &BindingRow) -> DecodedValue {
        match self.modify(col, raw_value(row, col.var_name()), row) {
            Some(modified) => DecodedValue::Text(modified),
            None => decode(row.get(col.var_name())),
        }
    }

    /// Column-specific display transforms. `None` means no modifier is
    /// registered and the binding decoder applies.
    fn modify(&self, col: Column, raw: &str, row: &BindingRow) -> Option<String> {
        match col {
            Column::Theme => {
                let code = raw_value(row, Column::ThemeShort.var_name());
                Some(
                    Theme::from_code(code)
                        .map(|t| t.label().to_string())
                        .unwrap_or_else(|| "?".to_string()),
                )
            }
            Column::Country => {
                // Codes missing from the lookup render as "undefined (XX)".
                let name = self
                    .countries
                    .get(raw)
                    .map(String::as_str)
                    .unwrap_or("undefined");
                Some(format!("{} ({})", name, raw))
            }
            Column::PiNames => {
                let mut names: Vec<&str> = raw.split(';').collect();
                names.sort_unstable();
                Some(names.join("<br>"))
            }
            Column::StationClass => Some(if raw == "Ass" {
                "Associated".to_string()
            } else {
                raw.to_string()
            }),
            Column::SiteType => Some(raw.to_lowercase()),
            Column::Id => Some(match row.get(vars::PROD_URI) {
                Some(prod) => format!(r#"<a target="_blank" href="{}">{}</a>"#, prod.value, raw),
                None => raw.to_string(),
            }),
            _ => None,
        }
    }

    /// Point when both coordinates are numeric, coverage when a geometry is
    /// present, nothing otherwise.
    fn classify(
        &self,
        values: &HashMap<Column, DecodedValue>,
    ) -> Result<Option<StationGeometry>, RowError> {
        let coordinate = |col: Column| values.get(&col).and_then(DecodedValue::as_coordinate);

        if let (Some(lat), Some(lon)) = (coordinate(Column::Lat), coordinate(Column::Lon)) {
            let point = match &self.transform {
                Some(transform) => Some(transform(lon, lat)?),
                None => None,
            };
            return Ok(Some(StationGeometry::Point { lon, lat, point }));
        }

        match values.get(&Column::GeoJson).and_then(DecodedValue::as_str) {
            Some(text) if !text.is_empty() => parse_geometry(text)
                .map(|g| Some(StationGeometry::Geo(g)))
                .map_err(RowError::Geometry),
            _ => Ok(None),
        }
    }
}

/// Parse a coverage document. Features and collections are reduced to their
/// geometry.
fn parse_geometry(text: &str) -> Result<geojson::Geometry, String> {
    let geojson: GeoJson = text.parse().map_err(|e: geojson::Error| e.to_string())?;
    match geojson {
        GeoJson::Geometry(g) => Ok(g),
        GeoJson::Feature(f) => f
            .geometry
            .ok_or_else(|| "feature without geometry".to_string()),
        GeoJson::FeatureCollection(fc) => Ok(geojson::Geometry::new(
            geojson::Value::GeometryCollection(
                fc.features.into_iter().filter_map(|f| f.geometry).collect(),
            ),
        )),
    }
}

/// Rows need coordinates or a non-empty coverage cell.
fn has_geo_reference(row: &BindingRow) -> bool {
    let lat = row.get(Column::Lat.var_name());
    let lon = row.get(Column::Lon.var_name());
    let geo = row.get(Column::GeoJson.var_name());
    lat.is_some() || lon.is_some() || geo.is_some_and(|g| !g.value.is_empty())
}

fn raw_value<'a>(row: &'a BindingRow, var: &str) -> &'a str {
    row.get(var).map(|b| b.value.as_str()).unwrap_or("")
}

/// Why a single row was rejected.
#[derive(Debug, thiserror::Error)]
enum RowError {
    #[error("malformed geo coverage: {0}")]
    Geometry(String),

    #[error(transparent)]
    Projection(#[from] ProjectionError),
}

impl RowError {
    fn into_parse_error(self, station: String) -> ParseError {
        match self {
            RowError::Geometry(reason) => ParseError::MalformedGeometry { station, reason },
            RowError::Projection(source) => ParseError::Projection { station, source },
        }
    }
}

/// Errors from station parsing.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Malformed geo coverage for station {station}: {reason}")]
    MalformedGeometry { station: String, reason: String },

    #[error("Cannot project station {station}: {source}")]
    Projection {
        station: String,
        #[source]
        source: ProjectionError,
    },
}
