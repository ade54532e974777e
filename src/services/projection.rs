// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Forward projections from WGS84 longitude/latitude into the supported map
//! SRIDs, and reprojection of GeoJSON coverage geometries.

use crate::models::view::Srid;
use geo::{BooleanOps, Contains, Coord, MultiLineString, MultiPolygon, Rect};
use proj::{Proj, ProjCreateError, ProjError};
use std::cell::RefCell;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::f64::consts::FRAC_PI_4;
use std::sync::Arc;

/// `(lon, lat) -> [x, y]` point transform injected into the station parser.
pub type TransformPointFn = Arc<dyn Fn(f64, f64) -> Result<[f64; 2], ProjectionError> + Send + Sync>;

const SOURCE_CRS: &str = "EPSG:4326";

const EARTH_RADIUS: f64 = 6378137.0;

/// Web Mercator is undefined at the poles; latitudes are clamped here.
const MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_6;

/// Geographic area of use of EPSG:3035, `[min_lon, min_lat, max_lon, max_lat]`.
const LAEA_AREA_OF_USE: [f64; 4] = [-35.58, 24.6, 44.83, 84.73];

thread_local! {
    // PROJ contexts are per thread; one WGS84 -> target transform per SRID
    static TRANSFORMS: RefCell<HashMap<Srid, Proj>> = RefCell::new(HashMap::new());
}

/// Target CRS for SRIDs projected through PROJ. Lon/lat and Web Mercator
/// are computed directly.
fn proj_crs(srid: Srid) -> Option<&'static str> {
    match srid {
        Srid::Wgs84 | Srid::WebMercator => None,
        Srid::Laea => Some("EPSG:3035"),
        Srid::Sweref99Tm => Some("EPSG:3006"),
        Srid::Robinson => Some("ESRI:54030"),
    }
}

fn proj_convert(srid: Srid, target: &str, lon: f64, lat: f64) -> Result<[f64; 2], ProjectionError> {
    TRANSFORMS.with(|cell| {
        let mut transforms = cell.borrow_mut();
        let proj = match transforms.entry(srid) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                // new_known_crs normalises axis order to lon/lat and east/north
                let proj = Proj::new_known_crs(SOURCE_CRS, target, None)
                    .map_err(|source| ProjectionError::Create { srid, source })?;
                entry.insert(proj)
            }
        };
        let (x, y) = proj
            .convert((lon, lat))
            .map_err(|source| ProjectionError::Convert { srid, lon, lat, source })?;
        if x.is_finite() && y.is_finite() {
            Ok([x, y])
        } else {
            Err(ProjectionError::OutOfDomain { srid, lon, lat })
        }
    })
}

/// A forward projection for one SRID.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    srid: Srid,
}

impl Projection {
    pub fn for_srid(srid: Srid) -> Self {
        Self { srid }
    }

    /// Project WGS84 degrees into this SRID.
    pub fn project(&self, lon: f64, lat: f64) -> Result<[f64; 2], ProjectionError> {
        match (self.srid, proj_crs(self.srid)) {
            (Srid::WebMercator, _) => Ok(web_mercator(lon, lat)),
            (srid, Some(target)) => proj_convert(srid, target, lon, lat),
            (_, None) => Ok([lon, lat]),
        }
    }

    pub fn transform_fn(&self) -> TransformPointFn {
        let projection = *self;
        Arc::new(move |lon, lat| projection.project(lon, lat))
    }

    /// Reproject every position of a GeoJSON geometry.
    pub fn project_geometry(
        &self,
        geometry: &geojson::Geometry,
    ) -> Result<geojson::Geometry, ProjectionError> {
        let mut projected = geometry.clone();
        projected.bbox = None;
        projected.value = self.project_value(&geometry.value)?;
        Ok(projected)
    }

    fn project_value(&self, value: &geojson::Value) -> Result<geojson::Value, ProjectionError> {
        use geojson::Value;

        let pos = |p: &Vec<f64>| self.project_position(p);
        let line = |l: &Vec<Vec<f64>>| l.iter().map(pos).collect::<Result<Vec<_>, _>>();
        let rings = |r: &Vec<Vec<Vec<f64>>>| r.iter().map(line).collect::<Result<Vec<_>, _>>();

        Ok(match value {
            Value::Point(p) => Value::Point(pos(p)?),
            Value::MultiPoint(ps) => Value::MultiPoint(line(ps)?),
            Value::LineString(l) => Value::LineString(line(l)?),
            Value::MultiLineString(ls) => Value::MultiLineString(rings(ls)?),
            Value::Polygon(r) => Value::Polygon(rings(r)?),
            Value::MultiPolygon(ps) => {
                Value::MultiPolygon(ps.iter().map(rings).collect::<Result<_, _>>()?)
            }
            Value::GeometryCollection(gs) => Value::GeometryCollection(
                gs.iter()
                    .map(|g| self.project_geometry(g))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }

    fn project_position(&self, position: &Vec<f64>) -> Result<Vec<f64>, ProjectionError> {
        match position.as_slice() {
            [lon, lat, rest @ ..] => {
                let [x, y] = self.project(*lon, *lat)?;
                let mut out = vec![x, y];
                out.extend_from_slice(rest);
                Ok(out)
            }
            _ => Ok(position.clone()),
        }
    }

    /// Clip a coverage geometry (in WGS84) to the projection's area of use.
    /// Only the LAEA Europe grid has a bounded area; other SRIDs return the
    /// geometry unchanged. Returns `None` when nothing remains.
    pub fn clip_to_area_of_use(&self, geometry: &geojson::Geometry) -> Option<geojson::Geometry> {
        if self.srid != Srid::Laea {
            return Some(geometry.clone());
        }

        let [min_x, min_y, max_x, max_y] = LAEA_AREA_OF_USE;
        let bbox = Rect::new(Coord { x: min_x, y: min_y }, Coord { x: max_x, y: max_y });

        let geom: geo::Geometry<f64> = match geometry.value.clone().try_into() {
            Ok(g) => g,
            Err(e) => {
                tracing::warn!(error = %e, "Cannot clip coverage geometry, keeping as is");
                return Some(geometry.clone());
            }
        };

        let clipped: Option<geo::Geometry<f64>> = match geom {
            geo::Geometry::LineString(ls) => {
                non_empty_lines(bbox.to_polygon().clip(&MultiLineString::new(vec![ls]), false))
            }
            geo::Geometry::MultiLineString(mls) => {
                non_empty_lines(bbox.to_polygon().clip(&mls, false))
            }
            geo::Geometry::Polygon(p) => {
                non_empty_polygons(bbox.to_polygon().intersection(&p))
            }
            geo::Geometry::MultiPolygon(mp) => {
                non_empty_polygons(MultiPolygon::new(vec![bbox.to_polygon()]).intersection(&mp))
            }
            geo::Geometry::Point(p) => bbox.contains(&p).then_some(geo::Geometry::Point(p)),
            other => Some(other),
        };

        clipped.map(|g| geojson::Geometry::new(geojson::Value::from(&g)))
    }
}

fn non_empty_lines(mls: MultiLineString<f64>) -> Option<geo::Geometry<f64>> {
    (!mls.0.is_empty()).then_some(geo::Geometry::MultiLineString(mls))
}

fn non_empty_polygons(mp: MultiPolygon<f64>) -> Option<geo::Geometry<f64>> {
    (!mp.0.is_empty()).then_some(geo::Geometry::MultiPolygon(mp))
}

/// Spherical Web Mercator (EPSG:3857).
fn web_mercator(lon: f64, lat: f64) -> [f64; 2] {
    let lat = lat.clamp(-MERCATOR_MAX_LAT, MERCATOR_MAX_LAT);
    let x = EARTH_RADIUS * lon.to_radians();
    let y = EARTH_RADIUS * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    [x, y]
}

/// Errors from projecting coordinates.
#[derive(Debug, thiserror::Error)]
pub enum ProjectionError {
    #[error("Cannot create transform to SRID {srid}: {source}")]
    Create {
        srid: Srid,
        #[source]
        source: ProjCreateError,
    },

    #[error("Cannot project ({lon}, {lat}) to SRID {srid}: {source}")]
    Convert {
        srid: Srid,
        lon: f64,
        lat: f64,
        #[source]
        source: ProjError,
    },

    #[error("({lon}, {lat}) is outside the domain of SRID {srid}")]
    OutOfDomain { srid: Srid, lon: f64, lat: f64 },
}
