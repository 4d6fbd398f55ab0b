use chrono::{Duration, NaiveDate, TimeZone, Utc};
use raincli::{
    build_layer, ingest, refresh, Columns, DateRange, ElementValues, Field, Freshness, Labels,
    LayerOptions, NormalizeReport, ObsRecord, RainDB, RainElement, RainPopulateInterface,
    RainQueryInterface, Snapshot, StationFilter,
};
use std::{
    error::Error,
    fs,
    path::{Path, PathBuf},
};

const SHEET: &str = "\
STAZIONE,COMUNE,ALTITUDINE,LEGENDA,DATA,Piogge entro 5 gg,Piogge entro 10 gg,SBALZO TERMICO MIGLIORE,X,Y
Abetone,Abetone Cutigliano,1340,buona,01/10/2024,\"4,0\",\"10,5\",8,\"10,66\",\"44,14\"
Abetone,Abetone Cutigliano,1340,buona,02/10/2024,\"22,5\",\"30,0\",9,\"10,66\",\"44,14\"
Abetone,Abetone Cutigliano,1340,buona,02/10/2024,99,99,9,\"10,66\",\"44,14\"
Pracchia,Pistoia,616,scarsa,01/10/2024,\"12,0\",\"14,0\",#N/D,\"10,91\",\"44,05\"
Pracchia,Pistoia,616,scarsa,02/10/2024,#N/D,\"14,0\",5,\"10,91\",\"44,05\"
Vallombrosa,Reggello,958,discreta,02/10/2024,\"40,0\",\"41,0\",7,\"11,56\",\"43,73\"
Senza Coordinate,Boh,100,,02/10/2024,5,5,5,,
";

fn tmp_root(name: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("raincli_e2e_{}_{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&p);
    fs::create_dir_all(&p).unwrap();
    p
}

fn loaded_at() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 10, 2, 9, 0, 0).unwrap()
}

const NEWER: &str = "STAZIONE,Piogge entro 5 gg,X,Y\nCamaldoli,\"7,5\",11.81,43.80\n";

fn store(
    db: &RainDB,
    sheet: &str,
    source: &str,
    at: chrono::DateTime<Utc>,
) -> Result<NormalizeReport, Box<dyn Error>> {
    let snapshot = Snapshot::from_reader(sheet.as_bytes())?;
    ingest(db, &snapshot, &Columns::default(), source, at, |_, _| {})
}

fn load(root: &Path, sheet: &str) -> RainDB {
    let db = RainDB::connect_or_create(root).unwrap();
    let snapshot = Snapshot::from_reader(sheet.as_bytes()).unwrap();

    let mut calls = 0;
    let report = ingest(
        &db,
        &snapshot,
        &Columns::default(),
        "sheet.csv",
        loaded_at(),
        |_, _| calls += 1,
    )
    .unwrap();

    assert!(calls > 0);
    assert!(report.rows_kept > 0);
    db
}

#[test]
fn ingest_records_snapshot_info() {
    let root = tmp_root("info");
    let db = load(&root, SHEET);

    let info = db.snapshot_info().unwrap().unwrap();
    assert_eq!(info.source, "sheet.csv");
    assert_eq!(info.loaded_at, loaded_at());
    assert_eq!(info.rows_total, 7);
    assert_eq!(info.rows_kept, 5);

    assert!(!db.is_stale(loaded_at() + Duration::minutes(59), Duration::hours(1)).unwrap());
    assert!(db.is_stale(loaded_at() + Duration::minutes(60), Duration::hours(1)).unwrap());
}

#[test]
fn latest_reading_per_station_drives_the_map() {
    let root = tmp_root("map");
    let db = load(&root, SHEET);
    let mut query = RainQueryInterface::initialize(&db).unwrap();

    let labels = query.labels().unwrap();
    let views = query.station_views(&DateRange::all()).unwrap();

    let names: Vec<&str> = views.iter().map(|v| v.station.as_str()).collect();
    assert_eq!(names, vec!["Abetone", "Pracchia", "Vallombrosa"]);

    // Latest reading, first of the duplicates kept
    assert_eq!(views[0].value(RainElement::Rain5Days), Some(22.5));
    assert_eq!(views[0].obs_date, NaiveDate::from_ymd_opt(2024, 10, 2).unwrap());
    // Latest Pracchia reading has no 5 day rain
    assert_eq!(views[1].value(RainElement::Rain5Days), None);

    let filter = StationFilter::new(RainElement::Rain5Days).with_threshold(30.0);
    let layer = build_layer(views, &filter, &labels, &LayerOptions::default());

    assert_eq!(layer.total, 2);
    assert_eq!(layer.shown, 1);
    assert_eq!(layer.label, "Piogge entro 5 gg");
    assert_eq!(layer.markers[0].station, "Vallombrosa");
    assert_eq!(layer.markers[0].color, "#08306b");
    assert_eq!(layer.markers[0].lat, 43.73);
    assert!(layer.markers[0]
        .popup
        .contains("<b>Piogge entro 5 gg</b>: 40<br>"));
    assert!(layer.markers[0].popup.contains("<b>DATA</b>: 02/10/2024<br>"));
}

#[test]
fn date_range_selects_older_readings() {
    let root = tmp_root("range");
    let db = load(&root, SHEET);
    let mut query = RainQueryInterface::initialize(&db).unwrap();

    let first_day = NaiveDate::from_ymd_opt(2024, 10, 1).unwrap();
    let range = DateRange::new(Some(first_day), Some(first_day)).unwrap();
    let views = query.station_views(&range).unwrap();

    let picked: Vec<(&str, Option<f64>)> = views
        .iter()
        .map(|v| (v.station.as_str(), v.value(RainElement::Rain5Days)))
        .collect();
    assert_eq!(picked, vec![("Abetone", Some(4.0)), ("Pracchia", Some(12.0))]);

    let outcome = StationFilter::new(RainElement::Rain5Days).apply(views);
    assert_eq!(outcome.threshold, Some(4.0));
    assert_eq!(outcome.shown.len(), 2);
}

#[test]
fn station_history_is_ordered() {
    let root = tmp_root("history");
    let db = load(&root, SHEET);
    let mut query = RainQueryInterface::initialize(&db).unwrap();

    let hist = query.history("Pracchia", &DateRange::all()).unwrap();
    assert_eq!(hist.rows().len(), 2);
    assert_eq!(
        hist.series(RainElement::Rain10Days),
        vec![
            (NaiveDate::from_ymd_opt(2024, 10, 1).unwrap(), 14.0),
            (NaiveDate::from_ymd_opt(2024, 10, 2).unwrap(), 14.0),
        ]
    );
    assert_eq!(hist.series(RainElement::ThermalSwing).len(), 1);

    assert!(query.history("Nowhere", &DateRange::all()).is_err());
    assert_eq!(
        query.stations().unwrap(),
        vec!["Abetone", "Pracchia", "Vallombrosa"]
    );
}

#[test]
fn reloading_replaces_the_snapshot() {
    let root = tmp_root("reload");
    {
        let _db = load(&root, SHEET);
    }

    let db = load(&root, NEWER);
    let mut query = RainQueryInterface::initialize(&db).unwrap();

    assert_eq!(query.stations().unwrap(), vec!["Camaldoli"]);

    // No date column, the reading is dated on the load day.
    let views = query.station_views(&DateRange::all()).unwrap();
    assert_eq!(views[0].obs_date, NaiveDate::from_ymd_opt(2024, 10, 2).unwrap());

    // Labels from the previous sheet are gone.
    let labels = query.labels().unwrap();
    assert!(!labels.has(raincli::Field::Date));
}

#[test]
fn failed_load_keeps_the_previous_snapshot() {
    let root = tmp_root("failed");
    let db = load(&root, SHEET);

    let bad = Snapshot::from_reader("STAZIONE,X\nCamaldoli,11.81\n".as_bytes()).unwrap();
    let res = ingest(&db, &bad, &Columns::default(), "bad.csv", Utc::now(), |_, _| {});
    assert!(res.is_err());

    let mut query = RainQueryInterface::initialize(&db).unwrap();
    assert_eq!(query.stations().unwrap().len(), 3);
    assert_eq!(db.snapshot_info().unwrap().unwrap().source, "sheet.csv");
}

#[test]
fn abandoned_load_rolls_back() {
    let root = tmp_root("abandoned");
    let db = load(&root, SHEET);

    {
        let mut populate = RainPopulateInterface::initialize(&db).unwrap();

        let mut labels = Labels::default();
        labels.insert(Field::Station, "NOME".to_owned());
        populate.set_labels(&labels).unwrap();

        populate
            .add(ObsRecord::Location {
                station: "Camaldoli".to_owned(),
                comune: None,
                lat: 43.80,
                lon: 11.81,
                altitude: None,
                legend: None,
            })
            .unwrap();
        let mut values = ElementValues::default();
        values.set(RainElement::Rain5Days, Some(7.5));
        populate
            .add(ObsRecord::Reading {
                station: "Camaldoli".to_owned(),
                obs_date: NaiveDate::from_ymd_opt(2024, 10, 3).unwrap(),
                values,
            })
            .unwrap();

        // Dropped without finish.
    }

    let mut query = RainQueryInterface::initialize(&db).unwrap();
    assert_eq!(
        query.stations().unwrap(),
        vec!["Abetone", "Pracchia", "Vallombrosa"]
    );

    let labels = query.labels().unwrap();
    assert_eq!(labels.label(Field::Station), "STAZIONE");
    assert!(labels.has(Field::Date));

    let info = db.snapshot_info().unwrap().unwrap();
    assert_eq!(info.source, "sheet.csv");
    assert_eq!(info.loaded_at, loaded_at());
}

#[test]
fn fresh_snapshot_is_not_reloaded() {
    let root = tmp_root("fresh");
    let db = load(&root, SHEET);

    let now = loaded_at() + Duration::minutes(30);
    let freshness = refresh(&db, now, Duration::hours(1), |_| {
        panic!("a fresh snapshot must not be reloaded")
    })
    .unwrap();

    assert_eq!(freshness, Freshness::Fresh);
    assert_eq!(db.snapshot_info().unwrap().unwrap().source, "sheet.csv");
}

#[test]
fn stale_snapshot_is_reloaded_from_its_source() {
    let root = tmp_root("stale_reload");
    let db = load(&root, SHEET);

    let now = loaded_at() + Duration::hours(2);
    let freshness = refresh(&db, now, Duration::hours(1), |db| {
        store(db, NEWER, "newer.csv", now).map(Some)
    })
    .unwrap();

    assert_eq!(freshness, Freshness::Reloaded);

    let info = db.snapshot_info().unwrap().unwrap();
    assert_eq!(info.source, "newer.csv");
    assert_eq!(info.loaded_at, now);
    assert!(!db.is_stale(now, Duration::hours(1)).unwrap());

    let mut query = RainQueryInterface::initialize(&db).unwrap();
    assert_eq!(query.stations().unwrap(), vec!["Camaldoli"]);
}

#[test]
fn stale_snapshot_without_a_source_is_served() {
    let root = tmp_root("stale_kept");
    let db = load(&root, SHEET);

    let now = loaded_at() + Duration::hours(2);
    let freshness = refresh(&db, now, Duration::hours(1), |_| Ok(None)).unwrap();

    assert_eq!(freshness, Freshness::Stale);
    assert_eq!(db.snapshot_info().unwrap().unwrap().source, "sheet.csv");

    let mut query = RainQueryInterface::initialize(&db).unwrap();
    assert_eq!(query.stations().unwrap().len(), 3);
}

#[test]
fn empty_store_needs_a_source() {
    let root = tmp_root("empty");
    let db = RainDB::connect_or_create(&root).unwrap();

    let res = refresh(&db, loaded_at(), Duration::hours(1), |_| Ok(None));
    assert!(res.is_err());
    assert_eq!(db.snapshot_info().unwrap(), None);

    let freshness = refresh(&db, loaded_at(), Duration::hours(1), |db| {
        store(db, SHEET, "sheet.csv", loaded_at()).map(Some)
    })
    .unwrap();
    assert_eq!(freshness, Freshness::Reloaded);
    assert_eq!(db.snapshot_info().unwrap().unwrap().rows_kept, 5);
}
