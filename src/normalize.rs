//! Clean a raw snapshot into typed station records.

use crate::{
    columns::{Columns, Field, Labels},
    obs_record::{ElementValues, ObsRecord},
    snapshot::Snapshot,
    RainElement, RaincliError,
};
use chrono::NaiveDate;
use std::{collections::HashSet, error::Error};

/// Counts collected while cleaning a snapshot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NormalizeReport {
    /// Non-blank rows in the snapshot.
    pub rows_total: usize,
    /// Readings kept after dropping bad and duplicate rows.
    pub rows_kept: usize,
    /// Rows without a station name or usable coordinates.
    pub missing_required: usize,
    /// Rows repeating an already seen (station, date) pair.
    pub duplicates: usize,
    /// Distinct stations kept.
    pub stations: usize,
    /// Header text of every column that was found.
    pub labels: Labels,
}

/// Trim, collapse runs of whitespace, and uppercase a header.
pub fn normalize_header(header: &str) -> String {
    header
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
        .to_uppercase()
}

/// Parse a number written with either a decimal comma or a decimal point.
///
/// When both separators are present the last one is the decimal separator and the other one is
/// taken as a thousands separator, so `1.234,5` and `1,234.5` are both 1234.5. A space or
/// no-break space is only accepted between digit groups of three, as in `1 234,5`.
pub fn parse_decimal(text: &str) -> Option<f64> {
    let chars: Vec<char> = text.trim().chars().collect();
    let cleaned: String = chars
        .iter()
        .enumerate()
        .filter(|&(i, &c)| !(is_group_space(c) && separates_groups(&chars, i)))
        .map(|(_, &c)| c)
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) => cleaned.replace(',', "."),
        (None, _) => cleaned,
    };

    normalized.parse::<f64>().ok().filter(|val| val.is_finite())
}

fn is_group_space(c: char) -> bool {
    c == ' ' || c == '\u{a0}' || c == '\u{202f}'
}

/// A digit before `i` and exactly three digits after it.
fn separates_groups(chars: &[char], i: usize) -> bool {
    let digit_before = i > 0 && chars[i - 1].is_ascii_digit();
    let group_after = chars
        .get(i + 1..i + 4)
        .map(|group| group.iter().all(char::is_ascii_digit))
        .unwrap_or(false);
    let group_ends = chars.get(i + 4).map(|c| !c.is_ascii_digit()).unwrap_or(true);

    digit_before && group_after && group_ends
}

/// Parse the date formats found in the sheet. A trailing time of day is ignored.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    const FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d", "%Y/%m/%d"];

    let date_part = text.split_whitespace().next()?;
    let date_part = date_part.split('T').next()?;

    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

/// Clean the snapshot into station locations and daily readings.
///
/// Readings without a date column, or with an unreadable date, are assigned `fallback_date`.
pub fn normalize(
    snapshot: &Snapshot,
    columns: &Columns,
    fallback_date: NaiveDate,
) -> Result<(Vec<ObsRecord>, NormalizeReport), Box<dyn Error>> {
    let mut report = NormalizeReport::default();

    let find = |field: Field| snapshot.column_index(columns.aliases(field));

    let (station_idx, lon_idx, lat_idx) =
        match (find(Field::Station), find(Field::Longitude), find(Field::Latitude)) {
            (Some(s), Some(x), Some(y)) => (s, x, y),
            (s, x, y) => {
                let missing: Vec<&str> = [(s, Field::Station), (x, Field::Longitude), (y, Field::Latitude)]
                    .iter()
                    .filter(|(idx, _)| idx.is_none())
                    .map(|(_, field)| field.default_headers()[0])
                    .collect();
                return Err(Box::new(RaincliError::new(format!(
                    "Snapshot is missing required column(s): {}",
                    missing.join(", ")
                ))));
            }
        };

    let comune_idx = find(Field::Comune);
    let altitude_idx = find(Field::Altitude);
    let legend_idx = find(Field::Legend);
    let date_idx = find(Field::Date);
    let element_idxs: Vec<Option<usize>> = RainElement::ALL
        .iter()
        .map(|&element| find(Field::from(element)))
        .collect();

    {
        use strum::IntoEnumIterator;
        for field in Field::iter() {
            if let Some(idx) = find(field) {
                report.labels.insert(field, snapshot.headers()[idx].clone());
            } else if field.element().is_some() {
                tracing::warn!("no column for {} in snapshot", field.default_headers()[0]);
            }
        }
    }

    let mut records = vec![];
    let mut seen_stations: HashSet<String> = HashSet::new();
    let mut seen_readings: HashSet<(String, NaiveDate)> = HashSet::new();

    for row in snapshot.rows() {
        report.rows_total += 1;

        let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i)).and_then(Option::as_deref);

        let station = match cell(Some(station_idx)) {
            Some(station) => station.to_owned(),
            None => {
                report.missing_required += 1;
                continue;
            }
        };

        let lat = cell(Some(lat_idx))
            .and_then(parse_decimal)
            .filter(|lat| (-90.0..=90.0).contains(lat));
        let lon = cell(Some(lon_idx))
            .and_then(parse_decimal)
            .filter(|lon| (-180.0..=180.0).contains(lon));
        let (lat, lon) = match (lat, lon) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => {
                tracing::debug!("dropping row for {}, unusable coordinates", station);
                report.missing_required += 1;
                continue;
            }
        };

        let obs_date = cell(date_idx)
            .and_then(parse_date)
            .unwrap_or(fallback_date);

        if !seen_readings.insert((station.clone(), obs_date)) {
            report.duplicates += 1;
            continue;
        }

        if seen_stations.insert(station.clone()) {
            records.push(ObsRecord::Location {
                station: station.clone(),
                comune: cell(comune_idx).map(str::to_owned),
                lat,
                lon,
                altitude: cell(altitude_idx).and_then(parse_decimal),
                legend: cell(legend_idx).map(str::to_owned),
            });
        }

        let mut values = ElementValues::default();
        for (&element, &idx) in RainElement::ALL.iter().zip(element_idxs.iter()) {
            values.set(element, cell(idx).and_then(parse_decimal));
        }

        records.push(ObsRecord::Reading {
            station,
            obs_date,
            values,
        });
        report.rows_kept += 1;
    }

    report.stations = seen_stations.len();

    tracing::info!(
        "normalized {} rows: {} readings kept for {} stations, {} missing required fields, {} duplicates",
        report.rows_total,
        report.rows_kept,
        report.stations,
        report.missing_required,
        report.duplicates
    );

    Ok((records, report))
}
