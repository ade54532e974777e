// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Layer descriptors handed to the map front end.

use crate::models::station::StationRecord;
use geojson::FeatureCollection;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LayerType {
    Toggle,
    BaseMap,
}

/// How the layer's data is to be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoType {
    Point,
    GeoJson,
}

/// Layer payload. The variant always agrees with the descriptor's
/// [`GeoType`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LayerData {
    Stations(Vec<StationRecord>),
    GeoJson(FeatureCollection),
}

impl LayerData {
    pub fn len(&self) -> usize {
        match self {
            LayerData::Stations(s) => s.len(),
            LayerData::GeoJson(fc) => fc.features.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One draw pass. Point layers use `radius` and `fill_color`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    pub stroke_color: String,
    pub stroke_width: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
}

impl LayerStyle {
    /// Filled circle with a thin black outline.
    pub fn point(fill_color: &str) -> Self {
        Self {
            fill_color: Some(fill_color.to_string()),
            stroke_color: "black".to_string(),
            stroke_width: 1.0,
            radius: Some(4.0),
        }
    }

    pub fn line(color: &str, width: f64) -> Self {
        Self {
            fill_color: None,
            stroke_color: color.to_string(),
            stroke_width: width,
            radius: None,
        }
    }

    pub fn area(fill_color: &str, stroke_color: &str) -> Self {
        Self {
            fill_color: Some(fill_color.to_string()),
            stroke_color: stroke_color.to_string(),
            stroke_width: 1.0,
            radius: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerDescriptor {
    pub id: String,
    pub label: String,
    pub layer_type: LayerType,
    pub visible: bool,
    pub geo_type: GeoType,
    pub data: LayerData,
    /// Draw passes, bottom first.
    pub style: Vec<LayerStyle>,
    pub z_index: i32,
    pub interactive: bool,
}

impl LayerDescriptor {
    /// Layers whose features the country filter applies to.
    pub fn holds_stations(&self) -> bool {
        self.layer_type == LayerType::Toggle && self.interactive
    }
}
