//! Build the marker layer handed to a map widget.

use crate::{
    color::{ColorScale, Palette},
    columns::{Field, Labels},
    filter::{SliderBounds, StationFilter},
    obs_record::StationView,
    popup::{legend_html, popup_html},
};
use serde::Serialize;

/// How stations are drawn.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MarkerStyle {
    /// Flat circle markers, radius in pixels.
    Circle { radius: f64 },
    /// Extruded columns for a 3-D map, radius in meters, height = value * `elevation_scale`.
    Column { radius: f64, elevation_scale: f64 },
}

impl MarkerStyle {
    pub const CIRCLE_RADIUS: f64 = 6.0;
    pub const COLUMN_RADIUS: f64 = 2500.0;
    pub const COLUMN_ELEVATION_SCALE: f64 = 100.0;

    pub fn circle() -> Self {
        MarkerStyle::Circle {
            radius: Self::CIRCLE_RADIUS,
        }
    }

    pub fn column() -> Self {
        MarkerStyle::Column {
            radius: Self::COLUMN_RADIUS,
            elevation_scale: Self::COLUMN_ELEVATION_SCALE,
        }
    }
}

impl Default for MarkerStyle {
    fn default() -> Self {
        MarkerStyle::circle()
    }
}

/// One station on the map.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Marker {
    pub station: String,
    pub lat: f64,
    pub lon: f64,
    pub value: f64,
    pub color: String,
    pub radius: f64,
    pub fill_opacity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
    pub popup: String,
}

/// Everything a map widget needs to draw one element.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MapLayer {
    pub element: String,
    pub label: String,
    pub palette: String,
    pub style: MarkerStyle,
    /// Stations with a value for the element.
    pub total: usize,
    /// Stations passing the filter.
    pub shown: usize,
    pub bounds: Option<SliderBounds>,
    pub threshold: Option<f64>,
    pub center: [f64; 2],
    pub zoom: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend_html: Option<String>,
    pub markers: Vec<Marker>,
}

impl MapLayer {
    /// One line status, like the sidebar note of the dashboard.
    pub fn summary(&self) -> String {
        format!("Showing {} of {} stations.", self.shown, self.total)
    }
}

/// View and drawing options.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerOptions {
    pub palette: Palette,
    pub style: MarkerStyle,
    pub center: [f64; 2],
    pub zoom: u8,
    pub fill_opacity: f64,
}

impl Default for LayerOptions {
    fn default() -> Self {
        LayerOptions {
            palette: Palette::default(),
            style: MarkerStyle::default(),
            center: [43.5, 11.0],
            zoom: 8,
            fill_opacity: 0.9,
        }
    }
}

/// Filter the stations and turn the survivors into colored markers with popups.
///
/// The color scale spans every station with a value, not only the ones shown, so colors do not
/// shift as the threshold moves.
pub fn build_layer(
    views: Vec<StationView>,
    filter: &StationFilter,
    labels: &Labels,
    options: &LayerOptions,
) -> MapLayer {
    let element = filter.element;

    let scale = ColorScale::from_values(
        views.iter().filter_map(|v| v.value(element)),
        options.palette,
    );

    let outcome = filter.apply(views);

    let markers: Vec<Marker> = match scale {
        Some(scale) => outcome
            .shown
            .iter()
            .filter_map(|view| {
                let value = view.value(element)?;
                let (radius, elevation) = match options.style {
                    MarkerStyle::Circle { radius } => (radius, None),
                    MarkerStyle::Column {
                        radius,
                        elevation_scale,
                    } => (radius, Some(value * elevation_scale)),
                };

                Some(Marker {
                    station: view.station.clone(),
                    lat: view.lat,
                    lon: view.lon,
                    value,
                    color: scale.color_for(value).to_hex(),
                    radius,
                    fill_opacity: options.fill_opacity,
                    elevation,
                    popup: popup_html(view, labels),
                })
            })
            .collect(),
        None => vec![],
    };

    if markers.is_empty() {
        tracing::warn!("no station matches the selected filters");
    }

    let label = labels.label(Field::from(element)).to_owned();
    let legend_html = match (scale, outcome.bounds) {
        (Some(scale), Some(bounds)) => Some(legend_html(&label, &scale, &bounds)),
        _ => None,
    };

    MapLayer {
        element: element.to_string(),
        label,
        palette: options.palette.to_string(),
        style: options.style,
        total: outcome.total,
        shown: markers.len(),
        bounds: outcome.bounds,
        threshold: outcome.threshold,
        center: options.center,
        zoom: options.zoom,
        legend_html,
        markers,
    }
}
