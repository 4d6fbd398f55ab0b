use crate::RaincliError;
use chrono::{DateTime, Duration, Utc};
use rusqlite::{Connection, OpenFlags, OptionalExtension, NO_PARAMS};
use std::{
    error::Error,
    fs::{create_dir_all, remove_file},
    path::{Path, PathBuf},
};

mod populate;
mod query;
mod rain_element;

pub use populate::RainPopulateInterface;
pub use query::RainQueryInterface;
pub use rain_element::RainElement;

/// The local copy of the latest spreadsheet snapshot.
pub struct RainDB {
    conn: Connection,
}

/// Bookkeeping about the snapshot currently stored.
#[derive(Clone, Debug, PartialEq)]
pub struct SnapshotInfo {
    pub loaded_at: DateTime<Utc>,
    pub source: String,
    pub rows_total: usize,
    pub rows_kept: usize,
}

impl RainDB {
    pub const RAIN_DIR: &'static str = "rain";
    pub const RAIN_DB: &'static str = "rain.db";

    /// How long a snapshot is considered current.
    pub const DEFAULT_TTL_SECONDS: i64 = 3600;

    /// A time-to-live of `secs` seconds, rejecting negative or out of range values.
    pub fn ttl_from_seconds(secs: i64) -> Result<Duration, Box<dyn Error>> {
        // Duration::seconds panics past i64::MAX milliseconds.
        if secs < 0 || secs > i64::MAX / 1000 {
            return Err(Box::new(RaincliError::new(format!(
                "Invalid time-to-live: {} seconds",
                secs
            ))));
        }

        Ok(Duration::seconds(secs))
    }

    pub fn path_to_rain_db(root: &Path) -> PathBuf {
        root.join(Self::RAIN_DIR).join(Self::RAIN_DB)
    }

    pub fn connect_or_create(root: &Path) -> Result<Self, Box<dyn Error>> {
        let rain_path = root.join(Self::RAIN_DIR);
        if !rain_path.is_dir() {
            create_dir_all(&rain_path)?;
        }

        let db_file = rain_path.join(Self::RAIN_DB);

        // Create and set up the database
        let conn = Connection::open_with_flags(
            db_file,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )?;

        // Create the tables if they don't exist.
        conn.execute_batch(include_str!("rain_db/sql/create.sql"))?;

        Ok(RainDB { conn })
    }

    /// Remove the database file, if there is one.
    pub fn delete_rain_db(root: &Path) -> Result<(), Box<dyn Error>> {
        let db_file = Self::path_to_rain_db(root);
        if db_file.is_file() {
            remove_file(&db_file)?;
            tracing::info!("removed {}", db_file.display());
        }

        Ok(())
    }

    pub fn snapshot_info(&self) -> Result<Option<SnapshotInfo>, Box<dyn Error>> {
        let info = self
            .conn
            .query_row(include_str!("rain_db/sql/get_meta.sql"), NO_PARAMS, |row| {
                let rows_total: i64 = row.get(2)?;
                let rows_kept: i64 = row.get(3)?;

                Ok(SnapshotInfo {
                    loaded_at: row.get(0)?,
                    source: row.get(1)?,
                    rows_total: rows_total as usize,
                    rows_kept: rows_kept as usize,
                })
            })
            .optional()?;

        Ok(info)
    }

    /// A missing snapshot is always stale.
    pub fn is_stale(&self, now: DateTime<Utc>, ttl: Duration) -> Result<bool, Box<dyn Error>> {
        let stale = match self.snapshot_info()? {
            Some(info) => now - info.loaded_at >= ttl,
            None => true,
        };

        Ok(stale)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    fn tmp_root(name: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("raincli_db_{}_{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&p);
        p
    }

    #[test]
    fn test_new_db_is_stale() {
        let root = tmp_root("stale");
        let db = RainDB::connect_or_create(&root).unwrap();

        assert!(RainDB::path_to_rain_db(&root).is_file());
        assert_eq!(db.snapshot_info().unwrap(), None);
        assert!(db
            .is_stale(Utc.with_ymd_and_hms(2024, 10, 1, 12, 0, 0).unwrap(), Duration::hours(1))
            .unwrap());
    }

    #[test]
    fn test_delete() {
        let root = tmp_root("delete");
        {
            let _db = RainDB::connect_or_create(&root).unwrap();
        }
        RainDB::delete_rain_db(&root).unwrap();
        assert!(!RainDB::path_to_rain_db(&root).exists());

        // Deleting twice is fine.
        RainDB::delete_rain_db(&root).unwrap();
    }

    #[test]
    fn test_ttl_from_seconds() {
        assert_eq!(RainDB::ttl_from_seconds(3600).unwrap(), Duration::hours(1));
        assert_eq!(RainDB::ttl_from_seconds(0).unwrap(), Duration::zero());
        assert!(RainDB::ttl_from_seconds(i64::MAX / 1000).is_ok());

        assert!(RainDB::ttl_from_seconds(-1).is_err());
        assert!(RainDB::ttl_from_seconds(i64::MAX / 1000 + 1).is_err());
        assert!(RainDB::ttl_from_seconds(i64::MAX).is_err());
    }
}
