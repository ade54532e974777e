// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session-scoped cache for the two static lookup documents: the country
//! code lookup and the country borders.

use crate::services::topology::{Topology, TopologyError};
use dashmap::DashMap;
use geojson::FeatureCollection;
use std::collections::HashMap;
use std::future::Future;

/// ISO country code to country name.
pub type CountryLookup = HashMap<String, String>;

/// Session key for the country lookup document.
pub const COUNTRY_LOOKUP_KEY: &str = "countryLookup";
/// Session key for the (converted) country borders document.
pub const COUNTRIES_TOPO_KEY: &str = "countriesTopo";

/// Name of the topology object holding the country shapes.
const TOPOLOGY_OBJECT: &str = "map";

/// Fetches a JSON document.
pub trait JsonFetcher: Send + Sync {
    fn get_json(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<serde_json::Value, LookupError>> + Send;
}

/// JSON fetcher over HTTP.
#[derive(Clone, Default)]
pub struct HttpJsonFetcher {
    http: reqwest::Client,
}

impl HttpJsonFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JsonFetcher for HttpJsonFetcher {
    async fn get_json(&self, url: &str) -> Result<serde_json::Value, LookupError> {
        let response = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| LookupError::Fetch(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(LookupError::Fetch(format!("HTTP {} from {}", status, url)));
        }

        response
            .json()
            .await
            .map_err(|e| LookupError::Fetch(e.to_string()))
    }
}

/// Write-once cache around the lookup documents. A cached document is
/// served without touching the network; a failed fetch caches nothing.
pub struct LookupCache<F> {
    fetcher: F,
    country_lookup_url: String,
    countries_url: String,
    session: DashMap<&'static str, serde_json::Value>,
}

impl<F: JsonFetcher> LookupCache<F> {
    pub fn new(fetcher: F, country_lookup_url: String, countries_url: String) -> Self {
        Self {
            fetcher,
            country_lookup_url,
            countries_url,
            session: DashMap::new(),
        }
    }

    /// Store a document under a session key without fetching.
    pub fn preload(&self, key: &'static str, value: serde_json::Value) {
        self.session.insert(key, value);
    }

    pub fn is_cached(&self, key: &str) -> bool {
        self.session.contains_key(key)
    }

    /// Country code to name lookup.
    pub async fn country_lookup(&self) -> Result<CountryLookup, LookupError> {
        let value = self
            .cached_or_fetch(COUNTRY_LOOKUP_KEY, &self.country_lookup_url, Ok)
            .await?;
        serde_json::from_value(value).map_err(|e| LookupError::Malformed(e.to_string()))
    }

    /// Country borders as GeoJSON. TopoJSON documents are converted before
    /// being cached.
    pub async fn countries_geojson(&self) -> Result<FeatureCollection, LookupError> {
        let value = self
            .cached_or_fetch(COUNTRIES_TOPO_KEY, &self.countries_url, topology_to_geojson)
            .await?;
        serde_json::from_value(value).map_err(|e| LookupError::Malformed(e.to_string()))
    }

    async fn cached_or_fetch(
        &self,
        key: &'static str,
        url: &str,
        convert: impl FnOnce(serde_json::Value) -> Result<serde_json::Value, LookupError>,
    ) -> Result<serde_json::Value, LookupError> {
        if let Some(hit) = self.session.get(key) {
            tracing::debug!(key, "Lookup cache hit");
            return Ok(hit.value().clone());
        }

        tracing::info!(key, url, "Fetching lookup document");
        let value = convert(self.fetcher.get_json(url).await?)?;
        self.session.insert(key, value.clone());
        Ok(value)
    }
}

fn topology_to_geojson(doc: serde_json::Value) -> Result<serde_json::Value, LookupError> {
    if doc.get("type").and_then(|t| t.as_str()) != Some("Topology") {
        return Ok(doc);
    }
    let topology: Topology =
        serde_json::from_value(doc).map_err(|e| LookupError::Malformed(e.to_string()))?;
    let collection = topology.to_feature_collection(TOPOLOGY_OBJECT)?;
    serde_json::to_value(&collection).map_err(|e| LookupError::Malformed(e.to_string()))
}

/// Errors from lookup document fetches.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("Failed to fetch lookup document: {0}")]
    Fetch(String),

    #[error("Malformed lookup document: {0}")]
    Malformed(String),

    #[error(transparent)]
    Topology(#[from] TopologyError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct CountingFetcher {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl JsonFetcher for CountingFetcher {
        async fn get_json(&self, url: &str) -> Result<serde_json::Value, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(LookupError::Fetch("offline".to_string()));
            }
            if url.ends_with("countries.json") {
                Ok(json!({"SE": "Sweden", "FR": "France"}))
            } else {
                Ok(json!({
                    "type": "Topology",
                    "arcs": [[[0, 0], [1, 0], [1, 1], [0, 0]]],
                    "objects": {"map": {"type": "GeometryCollection", "geometries": [
                        {"type": "Polygon", "arcs": [[0]], "properties": {"iso2": "SE"}}
                    ]}}
                }))
            }
        }
    }

    fn cache(fetcher: CountingFetcher) -> LookupCache<CountingFetcher> {
        LookupCache::new(
            fetcher,
            "https://static.example/countries.json".to_string(),
            "https://static.example/map.json".to_string(),
        )
    }

    #[tokio::test]
    async fn test_second_call_is_served_from_cache() {
        let fetcher = CountingFetcher::default();
        let calls = fetcher.calls.clone();
        let cache = cache(fetcher);

        let first = cache.country_lookup().await.unwrap();
        let second = cache.country_lookup().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.get("SE").map(String::as_str), Some("Sweden"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_topology_converted_and_cached() {
        let fetcher = CountingFetcher::default();
        let calls = fetcher.calls.clone();
        let cache = cache(fetcher);

        let fc = cache.countries_geojson().await.unwrap();
        assert_eq!(fc.features.len(), 1);
        assert!(cache.is_cached(COUNTRIES_TOPO_KEY));

        cache.countries_geojson().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let cache = cache(CountingFetcher {
            fail: true,
            ..Default::default()
        });
        assert!(cache.country_lookup().await.is_err());
        assert!(!cache.is_cached(COUNTRY_LOOKUP_KEY));
    }

    #[tokio::test]
    async fn test_preloaded_document_skips_fetch() {
        let fetcher = CountingFetcher {
            fail: true,
            ..Default::default()
        };
        let calls = fetcher.calls.clone();
        let cache = cache(fetcher);
        cache.preload(COUNTRY_LOOKUP_KEY, json!({"DE": "Germany"}));

        let lookup = cache.country_lookup().await.unwrap();
        assert_eq!(lookup.get("DE").map(String::as_str), Some("Germany"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
