use crate::CmdLineArgs;
use chrono::Utc;
use pbr::ProgressBar;
use raincli::{refresh, NormalizeReport, RainDB, RaincliError, Snapshot};
use std::{
    error::Error,
    io::{self, Stderr},
    path::Path,
};

/// Load the snapshot named by `--source` unconditionally.
pub(crate) fn ingest(args: &CmdLineArgs) -> Result<(), Box<dyn Error>> {
    let rain_db = RainDB::connect_or_create(&args.root)?;
    let report = load(args, &rain_db)?;

    println!(
        "Stored {} readings for {} stations from {} rows.",
        report.rows_kept, report.stations, report.rows_total
    );
    if report.missing_required > 0 {
        println!(
            "Skipped {} rows without a station name or usable coordinates.",
            report.missing_required
        );
    }
    if report.duplicates > 0 {
        println!("Skipped {} duplicate rows.", report.duplicates);
    }

    Ok(())
}

/// Open the store, reloading the snapshot first if it has outlived the time-to-live.
pub(crate) fn open_fresh(args: &CmdLineArgs) -> Result<RainDB, Box<dyn Error>> {
    let rain_db = RainDB::connect_or_create(&args.root)?;

    refresh(&rain_db, Utc::now(), args.ttl, |rain_db| match args.source {
        Some(_) => load(args, rain_db).map(Some),
        None => Ok(None),
    })?;

    Ok(rain_db)
}

fn load(args: &CmdLineArgs, rain_db: &RainDB) -> Result<NormalizeReport, Box<dyn Error>> {
    let source = args
        .source
        .as_deref()
        .ok_or_else(|| RaincliError::new("No --source given to load the snapshot from."))?;

    let snapshot = if source == "-" {
        Snapshot::from_reader(io::stdin())?
    } else {
        Snapshot::from_path(Path::new(source))?
    };

    let mut pb: Option<ProgressBar<Stderr>> = None;
    let report = raincli::ingest(
        rain_db,
        &snapshot,
        &args.columns,
        source,
        Utc::now(),
        |num, total| {
            let pb = pb.get_or_insert_with(|| {
                let mut pb = ProgressBar::on(io::stderr(), total as u64);
                pb.message("Storing ");
                pb
            });
            pb.set(num as u64);
        },
    )?;

    if let Some(mut pb) = pb {
        pb.finish();
    }

    Ok(report)
}
