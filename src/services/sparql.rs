// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SPARQL endpoint client and the two station queries.
//!
//! Stations live in two graphs: the station-entry (provisional) dataset that
//! lists every station, and the production dataset with curated metadata for
//! stations that have gone into production. Both are fetched in parallel and
//! merged on the entry subject `?s`.

use crate::error::AppError;
use crate::models::binding::{BindingRow, SparqlResponse};
use crate::services::merge::merge_entry_and_production;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CACHE_CONTROL, CONTENT_TYPE};

/// Station entries with labeling status.
pub const ENTRY_QUERY: &str = r#"PREFIX cpst: <http://meta.icos-cp.eu/ontologies/stationentry/>
SELECT *
FROM <http://meta.icos-cp.eu/resources/stationentry/>
FROM NAMED <http://meta.icos-cp.eu/resources/stationlabeling/>
WHERE {
	{
		select ?s (GROUP_CONCAT(?piLname; separator=";") AS ?PI_names)
		where{ ?s cpst:hasPi/cpst:hasLastName ?piLname }
		group by ?s
	}
	?s a ?owlClass .
	BIND(REPLACE(str(?owlClass),"http://meta.icos-cp.eu/ontologies/stationentry/", "") AS ?themeShort)
	?s cpst:hasShortName ?Id .
	?s cpst:hasLongName ?Name .
	OPTIONAL{?s cpst:hasLat ?lat . ?s cpst:hasLon ?lon }
	OPTIONAL{?s cpst:hasSpatialReference ?geoJson }
	OPTIONAL{?s cpst:hasCountry ?Country }
	OPTIONAL{?s cpst:hasSiteType ?Site_type }
	OPTIONAL{?s cpst:hasElevationAboveSea ?Elevation_above_sea }
	OPTIONAL{?s cpst:hasStationClass ?Station_class }
	OPTIONAL{
		GRAPH <http://meta.icos-cp.eu/resources/stationlabeling/> {
			?s cpst:hasAppStatusDate ?labelDt .
			?s cpst:hasApplicationStatus "STEP3APPROVED"^^xsd:string .
			BIND(SUBSTR(str(?labelDt), 1, 10) AS ?Labeling_date)
		}
	}
}"#;

/// Production counterparts of station entries; binds `?prodUri`.
pub const PRODUCTION_QUERY: &str = r#"prefix cpmeta: <http://meta.icos-cp.eu/ontologies/cpmeta/>
prefix cpst: <http://meta.icos-cp.eu/ontologies/stationentry/>
prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#>
SELECT *
FROM <http://meta.icos-cp.eu/resources/icos/>
FROM <http://meta.icos-cp.eu/resources/cpmeta/>
FROM <http://meta.icos-cp.eu/resources/stationentry/>
WHERE{
	{
		select ?s ?ps (GROUP_CONCAT(?lname; separator=";") AS ?PI_names) where {
			?s cpst:hasProductionCounterpart ?psStr .
			bind(iri(?psStr) as ?ps)
			?memb cpmeta:atOrganization ?ps ; cpmeta:hasRole <http://meta.icos-cp.eu/resources/roles/PI> .
			filter not exists {?memb cpmeta:hasEndTime []}
			?pers cpmeta:hasMembership ?memb ; cpmeta:hasLastName ?lname .
		}
		group by ?s ?ps
	}
	?ps cpmeta:hasStationId ?Id ; cpmeta:hasName ?Name .
	OPTIONAL{ ?ps cpmeta:hasElevation ?Elevation_above_sea }
	OPTIONAL{ ?ps cpmeta:hasLatitude ?lat}
	OPTIONAL{ ?ps cpmeta:hasLongitude ?lon}
	OPTIONAL{ ?ps cpmeta:hasEcosystemType/rdfs:label ?Site_type }
	OPTIONAL{ ?ps cpmeta:hasSpatialCoverage/cpmeta:asGeoJSON ?geoJson}
	OPTIONAL{ ?ps cpmeta:countryCode ?Country}
	OPTIONAL{ ?ps cpmeta:hasStationClass  ?Station_class}
	BIND(?ps as ?prodUri)
}"#;

/// Lets the endpoint serve a cached result of any age it chooses.
const CACHED_RESULTS_MAX_AGE: &str = "max-age=1000000";

/// SPARQL endpoint client.
#[derive(Clone)]
pub struct SparqlClient {
    http: reqwest::Client,
    endpoint: String,
}

impl SparqlClient {
    pub fn new(endpoint: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST a query and decode the JSON result set.
    pub async fn query(&self, text: &str, accept_cached: bool) -> Result<SparqlResponse, AppError> {
        let response = self
            .http
            .post(&self.endpoint)
            .headers(request_headers(accept_cached))
            .body(text.to_string())
            .send()
            .await
            .map_err(|e| AppError::Sparql(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Sparql(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Sparql(format!("JSON parse error: {}", e)))
    }

    /// Run both station queries concurrently and merge the results. Either
    /// failing fails the whole fetch.
    pub async fn fetch_station_rows(&self) -> Result<Vec<BindingRow>, AppError> {
        tracing::info!(endpoint = %self.endpoint, "Fetching station rows");

        let (entry, production) = tokio::try_join!(
            self.query(ENTRY_QUERY, true),
            self.query(PRODUCTION_QUERY, true)
        )?;

        tracing::info!(
            entry = entry.results.bindings.len(),
            production = production.results.bindings.len(),
            "Fetched station rows"
        );

        Ok(merge_entry_and_production(
            entry.results.bindings,
            &production.results.bindings,
        ))
    }
}

fn request_headers(accept_cached: bool) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    if accept_cached {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static(CACHED_RESULTS_MAX_AGE));
    }
    headers
}
