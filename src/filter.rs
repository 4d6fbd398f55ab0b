//! Slider style thresholds and date ranges applied to the stations of a snapshot.

use crate::{obs_record::StationView, RainElement, RaincliError};
use chrono::NaiveDate;
use itertools::{Itertools, MinMaxResult};
use serde::Serialize;
use std::error::Error;

/// Inclusive range of observation dates, either end may be open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self, Box<dyn Error>> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(Box::new(RaincliError::new(format!(
                    "Invalid date range: {} is after {}",
                    start, end
                ))));
            }
        }

        Ok(DateRange { start, end })
    }

    /// The unbounded range.
    pub fn all() -> Self {
        DateRange::default()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map(|start| date >= start).unwrap_or(true)
            && self.end.map(|end| date <= end).unwrap_or(true)
    }
}

/// Whole number bounds of a slider over one element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SliderBounds {
    pub min: i64,
    pub max: i64,
}

impl SliderBounds {
    /// Bounds over every station with a value for `element`, `None` if none has one.
    ///
    /// Both ends are truncated toward zero.
    pub fn from_views(views: &[StationView], element: RainElement) -> Option<Self> {
        match views.iter().filter_map(|v| v.value(element)).minmax() {
            MinMaxResult::NoElements => None,
            MinMaxResult::OneElement(val) => Some(SliderBounds {
                min: val.trunc() as i64,
                max: val.trunc() as i64,
            }),
            MinMaxResult::MinMax(lo, hi) => Some(SliderBounds {
                min: lo.trunc() as i64,
                max: hi.trunc() as i64,
            }),
        }
    }
}

/// Selects the stations to show on the map.
#[derive(Clone, Debug, PartialEq)]
pub struct StationFilter {
    /// Element the map is colored by, stations without a value for it are never shown.
    pub element: RainElement,
    /// Minimum value of `element`. Defaults to the lower slider bound.
    pub threshold: Option<f64>,
    /// Further minimum values on other elements.
    pub extra: Vec<(RainElement, f64)>,
}

/// Result of applying a `StationFilter`.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterOutcome {
    pub shown: Vec<StationView>,
    /// Stations that have a value for the filter element.
    pub total: usize,
    pub bounds: Option<SliderBounds>,
    /// The threshold actually applied.
    pub threshold: Option<f64>,
}

impl StationFilter {
    pub fn new(element: RainElement) -> Self {
        StationFilter {
            element,
            threshold: None,
            extra: vec![],
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn with_extra(mut self, element: RainElement, threshold: f64) -> Self {
        self.extra.push((element, threshold));
        self
    }

    pub fn apply(&self, views: Vec<StationView>) -> FilterOutcome {
        let candidates: Vec<StationView> = views
            .into_iter()
            .filter(|v| v.value(self.element).is_some())
            .collect();

        let total = candidates.len();
        let bounds = SliderBounds::from_views(&candidates, self.element);
        let threshold = self
            .threshold
            .or_else(|| bounds.map(|b| b.min as f64));

        let shown: Vec<StationView> = candidates
            .into_iter()
            .filter(|v| match (v.value(self.element), threshold) {
                (Some(val), Some(threshold)) => val >= threshold,
                (Some(_), None) => true,
                (None, _) => false,
            })
            .filter(|v| {
                self.extra
                    .iter()
                    .all(|&(element, min)| v.value(element).map(|val| val >= min).unwrap_or(false))
            })
            .collect();

        tracing::debug!(
            "filter on {} >= {:?}: showing {} of {} stations",
            self.element,
            threshold,
            shown.len(),
            total
        );

        FilterOutcome {
            shown,
            total,
            bounds,
            threshold,
        }
    }
}
