use super::{RainDB, RainElement};
use crate::{
    columns::{Field, Labels},
    filter::DateRange,
    history::StationHistory,
    obs_record::{ElementValues, StationView},
    RaincliError,
};
use chrono::NaiveDate;
use rusqlite::{params, Row, Statement, NO_PARAMS};
use std::{error::Error, str::FromStr};

/// This struct creates and caches several statements for querying the database.
pub struct RainQueryInterface<'a> {
    station_views_statement: Statement<'a>,
    history_statement: Statement<'a>,
    stations_statement: Statement<'a>,
    station_exists_statement: Statement<'a>,
    labels_statement: Statement<'a>,
}

impl<'a> RainQueryInterface<'a> {
    /// Initialize the interface.
    pub fn initialize(rain_db: &'a RainDB) -> Result<Self, Box<dyn Error>> {
        let conn = &rain_db.conn;

        let station_views_statement = conn.prepare(include_str!("sql/station_views.sql"))?;
        let history_statement = conn.prepare(include_str!("sql/history.sql"))?;
        let stations_statement = conn.prepare(include_str!("sql/stations.sql"))?;
        let station_exists_statement = conn.prepare(include_str!("sql/station_exists.sql"))?;
        let labels_statement = conn.prepare(include_str!("sql/labels.sql"))?;

        Ok(Self {
            station_views_statement,
            history_statement,
            stations_statement,
            station_exists_statement,
            labels_statement,
        })
    }

    /// Header text for each field, as stored with the snapshot.
    pub fn labels(&mut self) -> Result<Labels, Box<dyn Error>> {
        let pairs: Vec<(String, String)> = self
            .labels_statement
            .query_map(NO_PARAMS, |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<_, _>>()?;

        let mut labels = Labels::default();
        for (field, header) in pairs {
            match Field::from_str(&field) {
                Ok(field) => labels.insert(field, header),
                Err(_) => tracing::warn!("ignoring label for unknown field {}", field),
            }
        }

        Ok(labels)
    }

    /// Every station with its latest reading inside `range`, sorted by station name.
    ///
    /// Stations without a reading in the range are left out.
    pub fn station_views(&mut self, range: &DateRange) -> Result<Vec<StationView>, Box<dyn Error>> {
        let mut views: Vec<StationView> = self
            .station_views_statement
            .query_map(params![range.start, range.end], |row| {
                Ok(StationView {
                    station: row.get(0)?,
                    comune: row.get(1)?,
                    lat: row.get(2)?,
                    lon: row.get(3)?,
                    altitude: row.get(4)?,
                    legend: row.get(5)?,
                    obs_date: row.get(6)?,
                    values: values_from_row(row, 7)?,
                })
            })?
            .collect::<Result<_, _>>()?;

        // Rows come newest first within a station, keep the first of each.
        views.dedup_by(|next, prev| next.station == prev.station);

        Ok(views)
    }

    /// All readings for one station inside `range`, oldest first.
    pub fn history(
        &mut self,
        station: &str,
        range: &DateRange,
    ) -> Result<StationHistory, Box<dyn Error>> {
        let count: i64 = self
            .station_exists_statement
            .query_row(params![station], |row| row.get(0))?;
        if count == 0 {
            return Err(Box::new(RaincliError::new(format!(
                "Unknown station: {}",
                station
            ))));
        }

        let rows: Vec<(NaiveDate, ElementValues)> = self
            .history_statement
            .query_map(params![station, range.start, range.end], |row| {
                Ok((row.get(0)?, values_from_row(row, 1)?))
            })?
            .collect::<Result<_, _>>()?;

        Ok(StationHistory::new(station.to_owned(), rows))
    }

    /// Names of all stations in the snapshot.
    pub fn stations(&mut self) -> Result<Vec<String>, Box<dyn Error>> {
        let stations: Vec<String> = self
            .stations_statement
            .query_map(NO_PARAMS, |row| row.get(0))?
            .collect::<Result<_, _>>()?;

        Ok(stations)
    }
}

/// Read the element columns, in `RainElement::ALL` order, starting at `offset`.
fn values_from_row(row: &Row, offset: usize) -> Result<ElementValues, rusqlite::Error> {
    let mut values = ElementValues::default();
    for (i, &element) in RainElement::ALL.iter().enumerate() {
        let val: Option<f64> = row.get(offset + i)?;
        values.set(element, val);
    }

    Ok(values)
}
