// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use std::env;

pub const DEFAULT_SPARQL_ENDPOINT: &str = "https://meta.icos-cp.eu/sparql";
pub const DEFAULT_COUNTRY_LOOKUP_URL: &str =
    "https://static.icos-cp.eu/constant/misc/countries.json";
pub const DEFAULT_COUNTRIES_GEOJSON_URL: &str =
    "https://static.icos-cp.eu/js/topojson/map-2.5k.json";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// SPARQL endpoint for the station queries
    pub sparql_endpoint: String,
    /// Country code to name lookup document
    pub country_lookup_url: String,
    /// Country borders (TopoJSON or GeoJSON)
    pub countries_geojson_url: String,
    /// Public URL of the map page, used in example links
    pub public_base_url: String,
    /// Frontend origin allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            sparql_endpoint: DEFAULT_SPARQL_ENDPOINT.to_string(),
            country_lookup_url: DEFAULT_COUNTRY_LOOKUP_URL.to_string(),
            countries_geojson_url: DEFAULT_COUNTRIES_GEOJSON_URL.to_string(),
            public_base_url: "http://localhost:8080/".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
        }
    }
}

impl Config {
    /// Load configuration from environment variables. Every variable has a
    /// default; URLs that are set must be absolute http(s) URLs.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            sparql_endpoint: url_var("SPARQL_ENDPOINT", DEFAULT_SPARQL_ENDPOINT)?,
            country_lookup_url: url_var("COUNTRY_LOOKUP_URL", DEFAULT_COUNTRY_LOOKUP_URL)?,
            countries_geojson_url: url_var(
                "COUNTRIES_GEOJSON_URL",
                DEFAULT_COUNTRIES_GEOJSON_URL,
            )?,
            public_base_url: url_var("PUBLIC_BASE_URL", "http://localhost:8080/")?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
        })
    }
}

fn url_var(name: &'static str, default: &str) -> Result<String, ConfigError> {
    let value = env::var(name)
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|_| default.to_string());
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(value)
    } else {
        Err(ConfigError::InvalidUrl(name, value))
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not an http(s) URL: {1}")]
    InvalidUrl(&'static str, String),
}
