// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Station map: environmental monitoring stations on a shareable map.
//!
//! This crate provides the station data pipeline (SPARQL bindings to
//! station records, entry/production merge, duplicate detection), the
//! map layer builder and the URL view-state codec, served as a JSON API.

pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use dashmap::DashMap;
use error::AppError;
use models::{BindingRow, Srid};
use services::{HttpJsonFetcher, LookupCache, Projection, StationParser, Stations, ViewCodec};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub lookup: LookupCache<HttpJsonFetcher>,
    /// Merged entry/production rows; `None` when the start-up fetch failed.
    pub station_rows: Option<Vec<BindingRow>>,
    /// Parsed stations per SRID, built on first use.
    stations_by_srid: DashMap<Srid, Arc<Stations>>,
}

impl AppState {
    pub fn new(config: Config, station_rows: Option<Vec<BindingRow>>) -> Self {
        let lookup = LookupCache::new(
            HttpJsonFetcher::new(),
            config.country_lookup_url.clone(),
            config.countries_geojson_url.clone(),
        );
        Self {
            config,
            lookup,
            station_rows,
            stations_by_srid: DashMap::new(),
        }
    }

    /// View codec validating against the current country lookup. Without
    /// the lookup no country code validates, so any country filter is
    /// dropped and the rest of the view still decodes.
    pub async fn codec(&self) -> ViewCodec {
        match self.lookup.country_lookup().await {
            Ok(countries) => ViewCodec::new(countries),
            Err(e) => {
                tracing::warn!(error = %e, "Country lookup unavailable, ignoring country filter");
                ViewCodec::default()
            }
        }
    }

    pub fn has_parsed_stations(&self, srid: Srid) -> bool {
        self.stations_by_srid.contains_key(&srid)
    }

    /// Stations with points projected into `srid`, or `None` without
    /// station data.
    pub async fn stations(&self, srid: Srid) -> Result<Option<Arc<Stations>>, AppError> {
        let Some(rows) = &self.station_rows else {
            return Ok(None);
        };
        if let Some(cached) = self.stations_by_srid.get(&srid) {
            return Ok(Some(cached.value().clone()));
        }

        let countries = self.lookup.country_lookup().await?;
        let transform = Projection::for_srid(srid).transform_fn();
        let records = StationParser::new(countries, Some(transform)).parse(rows)?;
        let stations = Arc::new(Stations::new(records));

        tracing::info!(srid = %srid, count = stations.len(), "Parsed stations for projection");
        self.stations_by_srid.insert(srid, stations.clone());
        Ok(Some(stations))
    }
}
