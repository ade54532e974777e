// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Left join of station-entry rows with production rows.

use crate::models::binding::BindingRow;
use crate::models::station::vars;
use std::collections::HashMap;

/// Merge production rows over entry rows sharing the same subject `s`.
///
/// Entry rows define which stations exist: an entry row without a production
/// counterpart passes through unchanged, and production rows without an entry
/// row are dropped. On key collisions the production value wins.
pub fn merge_entry_and_production(
    entry_rows: Vec<BindingRow>,
    production_rows: &[BindingRow],
) -> Vec<BindingRow> {
    let production: HashMap<&str, &BindingRow> = production_rows
        .iter()
        .filter_map(|row| row.get(vars::SUBJECT).map(|s| (s.value.as_str(), row)))
        .collect();

    let merged: Vec<BindingRow> = entry_rows
        .into_iter()
        .map(|mut row| {
            let counterpart = row
                .get(vars::SUBJECT)
                .and_then(|s| production.get(s.value.as_str()));
            if let Some(prod) = counterpart {
                row.extend(prod.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            row
        })
        .collect();

    tracing::debug!(
        entry = merged.len(),
        production = production_rows.len(),
        "Merged station rows"
    );
    merged
}
