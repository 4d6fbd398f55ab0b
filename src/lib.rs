//! raincli
//!
//! Library for turning the CSV export of a published rainfall and mushroom-growth spreadsheet
//! into a clean, dated table of stations, and for selecting, coloring and describing those
//! stations for a map widget.
//!

//
// Public API
//
pub use crate::{
    color::{ColorScale, Palette, Rgb},
    columns::{Columns, Field, Labels},
    error::RaincliError,
    filter::{DateRange, FilterOutcome, SliderBounds, StationFilter},
    history::StationHistory,
    ingest::{ingest, refresh, Freshness},
    marker::{build_layer, LayerOptions, MapLayer, Marker, MarkerStyle},
    normalize::{normalize, normalize_header, parse_date, parse_decimal, NormalizeReport},
    obs_record::{ElementValues, ObsRecord, StationView},
    popup::{escape_html, format_value, legend_html, popup_html},
    rain_db::{RainDB, RainElement, RainPopulateInterface, RainQueryInterface, SnapshotInfo},
    snapshot::Snapshot,
};

//
// Private implementation.
//
mod color;
mod columns;
mod error;
mod filter;
mod history;
mod ingest;
mod marker;
mod normalize;
mod obs_record;
mod popup;
mod rain_db;
mod snapshot;
