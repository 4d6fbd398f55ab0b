use super::{RainDB, SnapshotInfo};
use crate::{columns::Labels, obs_record::ObsRecord};
use rusqlite::{params, Statement, NO_PARAMS};
use std::error::Error;

/// Replaces the stored snapshot with a new one.
///
/// Everything from `initialize` to `finish` runs in a single transaction, so a failed load leaves
/// the previous snapshot in place. Dropping the interface without calling `finish` rolls back.
pub struct RainPopulateInterface<'a, 'b: 'a> {
    rain_db: &'b RainDB,
    add_station_query: Statement<'a>,
    add_reading_query: Statement<'a>,
    add_label_query: Statement<'a>,
    set_meta_query: Statement<'a>,
    write_buffer: Vec<ObsRecord>,
    finished: bool,
}

impl<'a, 'b> RainPopulateInterface<'a, 'b> {
    const BUFSIZE: usize = 4096;

    pub fn initialize(rain_db: &'b RainDB) -> Result<Self, Box<dyn Error>> {
        let conn = &rain_db.conn;
        let add_station_query = conn.prepare(include_str!("sql/add_station.sql"))?;
        let add_reading_query = conn.prepare(include_str!("sql/add_reading.sql"))?;
        let add_label_query = conn.prepare(include_str!("sql/add_label.sql"))?;
        let set_meta_query = conn.prepare(include_str!("sql/set_meta.sql"))?;

        conn.execute("BEGIN TRANSACTION", NO_PARAMS)?;
        if let Err(err) = conn.execute_batch(include_str!("sql/clear.sql")) {
            conn.execute("ROLLBACK TRANSACTION", NO_PARAMS)?;
            return Err(err.into());
        }

        Ok(RainPopulateInterface {
            rain_db,
            add_station_query,
            add_reading_query,
            add_label_query,
            set_meta_query,
            write_buffer: Vec::with_capacity(RainPopulateInterface::BUFSIZE),
            finished: false,
        })
    }

    #[inline]
    pub fn add(&mut self, record: ObsRecord) -> Result<(), Box<dyn Error>> {
        debug_assert!(self.write_buffer.len() <= RainPopulateInterface::BUFSIZE);
        self.write_buffer.push(record);

        if self.write_buffer.len() == RainPopulateInterface::BUFSIZE {
            self.flush()?;
        }

        Ok(())
    }

    /// Store the header text the snapshot used for each field.
    pub fn set_labels(&mut self, labels: &Labels) -> Result<(), Box<dyn Error>> {
        for (field, header) in labels.iter() {
            self.add_label_query
                .execute(params![field.to_string(), header])?;
        }

        Ok(())
    }

    /// Write the snapshot metadata and commit.
    pub fn finish(mut self, info: &SnapshotInfo) -> Result<(), Box<dyn Error>> {
        self.flush()?;

        self.set_meta_query.execute(params![
            info.loaded_at,
            info.source,
            info.rows_total as i64,
            info.rows_kept as i64
        ])?;

        self.rain_db
            .conn
            .execute("COMMIT TRANSACTION", NO_PARAMS)?;
        self.finished = true;

        Ok(())
    }

    #[inline]
    fn flush(&mut self) -> Result<(), Box<dyn Error>> {
        use crate::obs_record::ObsRecord::*;

        for record in self.write_buffer.drain(..) {
            match record {
                Location {
                    station,
                    comune,
                    lat,
                    lon,
                    altitude,
                    legend,
                } => self
                    .add_station_query
                    .execute(params![station, comune, lat, lon, altitude, legend])
                    .map(|_| ())?,
                Reading {
                    station,
                    obs_date,
                    values,
                } => {
                    let vals = values.as_slice();
                    self.add_reading_query
                        .execute(params![
                            station, obs_date, vals[0], vals[1], vals[2], vals[3], vals[4], vals[5]
                        ])
                        .map(|_| ())?
                }
            }
        }

        Ok(())
    }
}

impl<'a, 'b> Drop for RainPopulateInterface<'a, 'b> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }

        tracing::warn!("snapshot load did not finish, rolling back");
        if let Err(err) = self
            .rain_db
            .conn
            .execute("ROLLBACK TRANSACTION", NO_PARAMS)
        {
            tracing::error!("rollback failed: {}", err);
        }
    }
}
