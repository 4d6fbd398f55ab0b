use crate::{
    columns::Columns,
    normalize::{normalize, NormalizeReport},
    rain_db::{RainDB, RainPopulateInterface, SnapshotInfo},
    snapshot::Snapshot,
    RaincliError,
};
use chrono::{DateTime, Duration, Utc};
use std::error::Error;

/// Clean `snapshot` and store it in place of the current one.
///
/// Readings without a usable date are dated on the UTC day of `loaded_at`. `progress` is called
/// with the number of records stored so far.
pub fn ingest<F>(
    rain_db: &RainDB,
    snapshot: &Snapshot,
    columns: &Columns,
    source: &str,
    loaded_at: DateTime<Utc>,
    mut progress: F,
) -> Result<NormalizeReport, Box<dyn Error>>
where
    F: FnMut(usize, usize),
{
    let (records, report) = normalize(snapshot, columns, loaded_at.naive_utc().date())?;

    let total = records.len();
    let mut populate = RainPopulateInterface::initialize(rain_db)?;
    populate.set_labels(&report.labels)?;

    for (num, record) in records.into_iter().enumerate() {
        populate.add(record)?;
        progress(num + 1, total);
    }

    populate.finish(&SnapshotInfo {
        loaded_at,
        source: source.to_owned(),
        rows_total: report.rows_total,
        rows_kept: report.rows_kept,
    })?;

    tracing::info!("stored snapshot from {}", source);

    Ok(report)
}

/// What `refresh` found, or did, with the stored snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Freshness {
    /// Younger than the time-to-live, left alone.
    Fresh,
    /// Stale, and replaced by `reload`.
    Reloaded,
    /// Stale, but there was nothing to reload it from.
    Stale,
}

/// Make sure the stored snapshot is no older than `ttl`.
///
/// When it is stale `reload` is asked to store a new one and returns `None` if it has no source
/// to load from. Serving stale data is only logged, having no snapshot at all is an error.
pub fn refresh<F>(
    rain_db: &RainDB,
    now: DateTime<Utc>,
    ttl: Duration,
    reload: F,
) -> Result<Freshness, Box<dyn Error>>
where
    F: FnOnce(&RainDB) -> Result<Option<NormalizeReport>, Box<dyn Error>>,
{
    if !rain_db.is_stale(now, ttl)? {
        return Ok(Freshness::Fresh);
    }

    if let Some(report) = reload(rain_db)? {
        tracing::info!(
            "reloaded stale snapshot, {} readings from {} rows",
            report.rows_kept,
            report.rows_total
        );
        return Ok(Freshness::Reloaded);
    }

    match rain_db.snapshot_info()? {
        Some(info) => {
            tracing::warn!(
                "snapshot loaded at {} is stale and there is no source to reload it",
                info.loaded_at
            );
            Ok(Freshness::Stale)
        }
        None => {
            Err(RaincliError::new("No snapshot stored, run 'ingest' or pass --source.").into())
        }
    }
}
