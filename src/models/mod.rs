// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod binding;
pub mod layer;
pub mod station;
pub mod view;

pub use binding::{BindingRow, DecodedValue, RawBinding, SparqlResponse};
pub use layer::{GeoType, LayerData, LayerDescriptor, LayerStyle, LayerType};
pub use station::{Column, StationGeometry, StationRecord, StationType, Theme};
pub use view::{MapSettings, MapViewState, Srid, ViewPatch};
