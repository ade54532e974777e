// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Keeps the address bar in step with the view state.

use crate::models::view::{MapViewState, ViewPatch};
use crate::services::view_codec::{ViewCodec, ViewStateError};

/// Browser history. Pushing a URL is the only side effect of syncing.
pub trait HistorySink {
    fn push_state(&mut self, query: &str);
}

/// Single-writer owner of the current view state.
#[derive(Debug)]
pub struct UrlSync {
    codec: ViewCodec,
    state: MapViewState,
    query: String,
    /// Set by a history navigation; the next map move is its echo.
    ignore_next_move: bool,
}

impl UrlSync {
    pub fn new(codec: ViewCodec, state: MapViewState, current_query: &str) -> Self {
        Self {
            codec,
            state,
            query: normalize(current_query),
            ignore_next_move: false,
        }
    }

    pub fn state(&self) -> &MapViewState {
        &self.state
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Apply a patch and push the new query if it differs from the current
    /// one. Returns the pushed query.
    pub fn update(&mut self, patch: &ViewPatch, history: &mut impl HistorySink) -> Option<String> {
        self.state = self.state.apply(patch);
        let query = self.codec.encode(&self.state);
        if query == self.query {
            return None;
        }

        tracing::debug!(query = %query, "Pushing view state");
        history.push_state(&query);
        self.query = query.clone();
        Some(query)
    }

    /// The user navigated history: adopt the URL's state and swallow the
    /// move event the map fires when it repositions.
    pub fn on_popstate(&mut self, query: &str) -> Result<&MapViewState, ViewStateError> {
        self.state = self.codec.decode(query)?;
        self.query = normalize(query);
        self.ignore_next_move = true;
        Ok(&self.state)
    }

    /// Map finished panning or zooming.
    pub fn on_move_end(
        &mut self,
        center: [f64; 2],
        zoom: f64,
        history: &mut impl HistorySink,
    ) -> Option<String> {
        if std::mem::take(&mut self.ignore_next_move) {
            tracing::debug!("Ignoring move caused by history navigation");
            return None;
        }
        self.update(
            &ViewPatch {
                center: Some(center),
                zoom: Some(zoom),
                ..Default::default()
            },
            history,
        )
    }
}

/// `""` and `"?"` are the same empty query.
fn normalize(query: &str) -> String {
    if query.is_empty() || query == "?" {
        String::new()
    } else if query.starts_with('?') {
        query.to_string()
    } else {
        format!("?{}", query)
    }
}
