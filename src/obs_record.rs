use crate::RainElement;
use chrono::NaiveDate;

/// Values of every element for a single reading, missing values are `None`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ElementValues {
    values: [Option<f64>; RainElement::NUM_VARIANTS],
}

impl ElementValues {
    pub fn get(&self, element: RainElement) -> Option<f64> {
        self.values[element.into_index()]
    }

    pub fn set(&mut self, element: RainElement, value: Option<f64>) {
        self.values[element.into_index()] = value;
    }

    /// True if no element has a value.
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    pub(crate) fn as_slice(&self) -> &[Option<f64>] {
        &self.values
    }
}

/// Records produced by cleaning a snapshot, ready to be stored.
#[derive(Clone, Debug, PartialEq)]
pub enum ObsRecord {
    Location {
        station: String,
        comune: Option<String>,
        lat: f64,
        lon: f64,
        altitude: Option<f64>,
        legend: Option<String>,
    },
    Reading {
        station: String,
        obs_date: NaiveDate,
        values: ElementValues,
    },
}

/// A station joined with one of its readings, usually the latest in a date range.
#[derive(Clone, Debug, PartialEq)]
pub struct StationView {
    pub station: String,
    pub comune: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub altitude: Option<f64>,
    pub legend: Option<String>,
    pub obs_date: NaiveDate,
    pub values: ElementValues,
}

impl StationView {
    pub fn value(&self, element: RainElement) -> Option<f64> {
        self.values.get(element)
    }
}

impl ObsRecord {
    pub fn station(&self) -> &str {
        match self {
            ObsRecord::Location { station, .. } => station,
            ObsRecord::Reading { station, .. } => station,
        }
    }
}
