// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - station pipeline, projections and view state.

pub mod layers;
pub mod lookup;
pub mod merge;
pub mod parser;
pub mod projection;
pub mod sparql;
pub mod stations;
pub mod topology;
pub mod url_sync;
pub mod view_codec;

pub use lookup::{CountryLookup, HttpJsonFetcher, JsonFetcher, LookupCache, LookupError};
pub use merge::merge_entry_and_production;
pub use parser::{ParseError, StationParser, StationTable};
pub use projection::{Projection, ProjectionError, TransformPointFn};
pub use sparql::SparqlClient;
pub use stations::{CountryOption, Predicate, Stations};
pub use url_sync::{HistorySink, UrlSync};
pub use view_codec::{SridListing, ViewCodec, ViewStateError};
