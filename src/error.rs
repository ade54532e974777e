// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use crate::services::lookup::LookupError;
use crate::services::parser::ParseError;
use crate::services::view_codec::SridListing;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Terminal: the map cannot be drawn in an unknown projection.
    #[error("Illegal SRID: {requested}")]
    IllegalSrid {
        requested: String,
        listing: Box<SridListing>,
    },

    #[error("Station data unavailable")]
    StationsUnavailable,

    #[error("SPARQL endpoint error: {0}")]
    Sparql(String),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl AppError {
    pub fn illegal_srid(requested: &str, base_url: &str) -> Self {
        AppError::IllegalSrid {
            requested: requested.to_string(),
            listing: Box::new(SridListing::new(base_url)),
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::IllegalSrid { requested, listing } => {
                tracing::info!(srid = %requested, "Rejected illegal SRID");
                (
                    StatusCode::BAD_REQUEST,
                    "illegal_srid",
                    serde_json::to_value(listing).ok(),
                )
            }
            AppError::StationsUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "stations_unavailable", None)
            }
            AppError::Sparql(msg) => {
                tracing::error!(error = %msg, "SPARQL error");
                (
                    StatusCode::BAD_GATEWAY,
                    "sparql_error",
                    Some(msg.clone().into()),
                )
            }
            AppError::Lookup(err) => {
                tracing::error!(error = %err, "Lookup document error");
                (
                    StatusCode::BAD_GATEWAY,
                    "lookup_error",
                    Some(err.to_string().into()),
                )
            }
            AppError::Parse(err) => {
                tracing::error!(error = %err, "Station parse error");
                (
                    StatusCode::BAD_GATEWAY,
                    "parse_error",
                    Some(err.to_string().into()),
                )
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
