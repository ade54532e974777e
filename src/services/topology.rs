// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Minimal TopoJSON reader: turns one named object of a topology into a
//! GeoJSON feature collection (the country borders document is TopoJSON).

use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub struct Topology {
    #[serde(default)]
    transform: Option<Transform>,
    arcs: Vec<Vec<[f64; 2]>>,
    objects: HashMap<String, TopoGeometry>,
}

#[derive(Debug, Deserialize)]
struct Transform {
    scale: [f64; 2],
    translate: [f64; 2],
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum TopoGeometry {
    GeometryCollection {
        geometries: Vec<TopoGeometry>,
        #[serde(default)]
        properties: Option<serde_json::Map<String, serde_json::Value>>,
    },
    Point {
        coordinates: [f64; 2],
        #[serde(default)]
        properties: Option<serde_json::Map<String, serde_json::Value>>,
    },
    MultiPoint {
        coordinates: Vec<[f64; 2]>,
        #[serde(default)]
        properties: Option<serde_json::Map<String, serde_json::Value>>,
    },
    LineString {
        arcs: Vec<i64>,
        #[serde(default)]
        properties: Option<serde_json::Map<String, serde_json::Value>>,
    },
    MultiLineString {
        arcs: Vec<Vec<i64>>,
        #[serde(default)]
        properties: Option<serde_json::Map<String, serde_json::Value>>,
    },
    Polygon {
        arcs: Vec<Vec<i64>>,
        #[serde(default)]
        properties: Option<serde_json::Map<String, serde_json::Value>>,
    },
    MultiPolygon {
        arcs: Vec<Vec<Vec<i64>>>,
        #[serde(default)]
        properties: Option<serde_json::Map<String, serde_json::Value>>,
    },
    #[serde(other)]
    Null,
}

impl Topology {
    /// Features of the named object. A geometry collection yields one
    /// feature per member.
    pub fn to_feature_collection(&self, object: &str) -> Result<FeatureCollection, TopologyError> {
        let obj = self
            .objects
            .get(object)
            .ok_or_else(|| TopologyError::MissingObject(object.to_string()))?;

        let members: Vec<&TopoGeometry> = match obj {
            TopoGeometry::GeometryCollection { geometries, .. } => geometries.iter().collect(),
            other => vec![other],
        };

        let mut features = Vec::with_capacity(members.len());
        for member in members {
            features.push(Feature {
                bbox: None,
                geometry: self.geometry(member)?,
                id: None,
                properties: member.properties().cloned(),
                foreign_members: None,
            });
        }

        Ok(FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        })
    }

    fn geometry(&self, geom: &TopoGeometry) -> Result<Option<Geometry>, TopologyError> {
        let value = match geom {
            TopoGeometry::Null => return Ok(None),
            TopoGeometry::Point { coordinates, .. } => Value::Point(self.position(*coordinates)),
            TopoGeometry::MultiPoint { coordinates, .. } => {
                Value::MultiPoint(coordinates.iter().map(|c| self.position(*c)).collect())
            }
            TopoGeometry::LineString { arcs, .. } => Value::LineString(self.line(arcs)?),
            TopoGeometry::MultiLineString { arcs, .. } => Value::MultiLineString(
                arcs.iter().map(|l| self.line(l)).collect::<Result<_, _>>()?,
            ),
            TopoGeometry::Polygon { arcs, .. } => Value::Polygon(self.rings(arcs)?),
            TopoGeometry::MultiPolygon { arcs, .. } => Value::MultiPolygon(
                arcs.iter().map(|p| self.rings(p)).collect::<Result<_, _>>()?,
            ),
            TopoGeometry::GeometryCollection { geometries, .. } => {
                let mut members = Vec::with_capacity(geometries.len());
                for g in geometries {
                    if let Some(geometry) = self.geometry(g)? {
                        members.push(geometry);
                    }
                }
                Value::GeometryCollection(members)
            }
        };
        Ok(Some(Geometry::new(value)))
    }

    fn rings(&self, rings: &[Vec<i64>]) -> Result<Vec<Vec<Vec<f64>>>, TopologyError> {
        rings.iter().map(|r| self.line(r)).collect()
    }

    /// Stitch arcs into one coordinate sequence; shared end points are not
    /// repeated. Negative indices (`!i`) are arcs traversed in reverse.
    fn line(&self, arc_indices: &[i64]) -> Result<Vec<Vec<f64>>, TopologyError> {
        let mut coords: Vec<Vec<f64>> = Vec::new();
        for &index in arc_indices {
            let (arc_idx, reversed) = if index < 0 {
                ((!index) as usize, true)
            } else {
                (index as usize, false)
            };
            let mut arc = self.decode_arc(arc_idx)?;
            if reversed {
                arc.reverse();
            }
            if !coords.is_empty() && !arc.is_empty() {
                arc.remove(0);
            }
            coords.extend(arc);
        }
        Ok(coords)
    }

    fn decode_arc(&self, idx: usize) -> Result<Vec<Vec<f64>>, TopologyError> {
        let arc = self.arcs.get(idx).ok_or(TopologyError::MissingArc(idx))?;
        let Some(transform) = &self.transform else {
            return Ok(arc.iter().map(|p| vec![p[0], p[1]]).collect());
        };

        // Quantized arcs are delta-encoded.
        let (mut x, mut y) = (0.0, 0.0);
        Ok(arc
            .iter()
            .map(|p| {
                x += p[0];
                y += p[1];
                vec![
                    x * transform.scale[0] + transform.translate[0],
                    y * transform.scale[1] + transform.translate[1],
                ]
            })
            .collect())
    }

    fn position(&self, p: [f64; 2]) -> Vec<f64> {
        match &self.transform {
            Some(t) => vec![
                p[0] * t.scale[0] + t.translate[0],
                p[1] * t.scale[1] + t.translate[1],
            ],
            None => vec![p[0], p[1]],
        }
    }
}

impl TopoGeometry {
    fn properties(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
        match self {
            TopoGeometry::GeometryCollection { properties, .. }
            | TopoGeometry::Point { properties, .. }
            | TopoGeometry::MultiPoint { properties, .. }
            | TopoGeometry::LineString { properties, .. }
            | TopoGeometry::MultiLineString { properties, .. }
            | TopoGeometry::Polygon { properties, .. }
            | TopoGeometry::MultiPolygon { properties, .. } => properties.as_ref(),
            TopoGeometry::Null => None,
        }
    }
}

/// Errors reading a topology.
#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    #[error("Topology has no object named {0}")]
    MissingObject(String),

    #[error("Topology references missing arc {0}")]
    MissingArc(usize),
}
