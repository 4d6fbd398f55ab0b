//! raincli
//!
//! Load the CSV export of the rainfall spreadsheet into a local store, then select stations by
//! rainfall thresholds and dates and write them out as colored markers, tables, and summaries.
mod loader;
mod report;

use chrono::{Duration, NaiveDate};
use raincli::{
    parse_date, parse_decimal, Columns, DateRange, Field, LayerOptions, MarkerStyle, Palette,
    RainDB, RainElement, RaincliError, StationFilter,
};
use std::{error::Error, path::PathBuf, str::FromStr};
use strum::IntoEnumIterator;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {}", e);

        let mut err = &*e;

        while let Some(cause) = err.source() {
            eprintln!("caused by: {}", cause);
            err = cause;
        }

        ::std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = parse_args()?;

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    match args.operation.as_ref() {
        "ingest" => loader::ingest(&args),
        "map" => report::map(&args),
        "summary" => report::summary(&args),
        "history" => report::history(&args),
        "stations" => report::stations(&args),
        "reset" => reset(&args),
        _ => Err(RaincliError::new("Unknown operation.").into()),
    }
}

#[derive(Debug)]
pub(crate) struct CmdLineArgs {
    root: PathBuf,
    source: Option<String>,
    operation: String,
    ttl: Duration,
    columns: Columns,
    filter: StationFilter,
    range: DateRange,
    station: Option<String>,
    layer: LayerOptions,
    output: Option<PathBuf>,
    verbose: bool,
}

fn parse_args() -> Result<CmdLineArgs, Box<dyn Error>> {
    let elements: Vec<&str> = RainElement::iter()
        .map(RainElement::into_column_name)
        .collect();
    let palettes: Vec<String> = Palette::iter().map(|p| p.to_string()).collect();
    let palettes: Vec<&str> = palettes.iter().map(String::as_str).collect();
    let default_ttl = RainDB::DEFAULT_TTL_SECONDS.to_string();

    let app = clap::App::new("raincli")
        .author("Ryan <rnleach@users.noreply.github.com>")
        .version(clap::crate_version!())
        .about("Rainfall station snapshots for maps.")
        .arg(
            clap::Arg::with_name("operation")
                .index(1)
                .takes_value(true)
                .required(true)
                .possible_values(&["ingest", "map", "summary", "history", "stations", "reset"])
                .help("What to do with the snapshot store.")
                .long_help(concat!(
                    "'ingest' loads the CSV export named by --source into the store. 'map' writes",
                    " the marker layer as JSON, reloading the snapshot first if it is older than",
                    " --ttl. 'summary' prints slider bounds and counts, 'history' prints one",
                    " station's readings, 'stations' lists station names, and 'reset' deletes",
                    " the store."
                )),
        )
        .arg(
            clap::Arg::with_name("root")
                .short("r")
                .long("root")
                .takes_value(true)
                .env("RAINCLI_ROOT")
                .help("Set the root of the store.")
                .long_help("Directory holding the snapshot store. Defaults to ~/raincli.")
                .global(true),
        )
        .arg(
            clap::Arg::with_name("source")
                .short("s")
                .long("source")
                .takes_value(true)
                .env("RAINCLI_SOURCE")
                .help("CSV export of the spreadsheet, '-' for stdin."),
        )
        .arg(
            clap::Arg::with_name("ttl")
                .long("ttl")
                .takes_value(true)
                .default_value(&default_ttl)
                .help("Seconds before a stored snapshot is reloaded from --source."),
        )
        .arg(
            clap::Arg::with_name("column")
                .long("column")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .help("Extra header alias for a field, as FIELD=HEADER.")
                .long_help(concat!(
                    "Extra header alias for a field, as FIELD=HEADER, for sheets with renamed",
                    " columns. Fields are station, comune, lon, lat, altitude, legend, date,",
                    " and the element names."
                )),
        )
        .arg(
            clap::Arg::with_name("element")
                .short("e")
                .long("element")
                .takes_value(true)
                .possible_values(&elements)
                .default_value("rain_5d")
                .help("Element the stations are filtered and colored by."),
        )
        .arg(
            clap::Arg::with_name("min")
                .long("min")
                .takes_value(true)
                .help("Show stations with element >= this value, defaults to the smallest."),
        )
        .arg(
            clap::Arg::with_name("threshold")
                .short("t")
                .long("threshold")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .help("Additional minimum on another element, as ELEMENT=VALUE."),
        )
        .arg(
            clap::Arg::with_name("from")
                .long("from")
                .takes_value(true)
                .help("First observation date to consider (dd/mm/yyyy or yyyy-mm-dd)."),
        )
        .arg(
            clap::Arg::with_name("to")
                .long("to")
                .takes_value(true)
                .help("Last observation date to consider (dd/mm/yyyy or yyyy-mm-dd)."),
        )
        .arg(
            clap::Arg::with_name("station")
                .long("station")
                .takes_value(true)
                .required_if("operation", "history")
                .help("Station name for the history operation."),
        )
        .arg(
            clap::Arg::with_name("palette")
                .short("p")
                .long("palette")
                .takes_value(true)
                .possible_values(&palettes)
                .default_value("blues")
                .help("Color palette for the markers."),
        )
        .arg(
            clap::Arg::with_name("style")
                .long("style")
                .takes_value(true)
                .possible_values(&["circle", "column"])
                .default_value("circle")
                .help("Flat circle markers or extruded columns for a 3-D map."),
        )
        .arg(
            clap::Arg::with_name("column-scale")
                .long("column-scale")
                .takes_value(true)
                .help("Column height per unit of the element, for --style column."),
        )
        .arg(
            clap::Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .help("Write output to this file instead of stdout."),
        )
        .arg(
            clap::Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Log progress details to stderr."),
        );

    let matches = app.get_matches();

    let root = matches
        .value_of("root")
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|hd| hd.join("raincli")))
        .ok_or_else(|| RaincliError::new("Invalid root, use --root."))?;

    let operation: String = matches
        .value_of("operation")
        .map(str::to_owned)
        .ok_or_else(|| RaincliError::new("Missing operation."))?;

    let ttl: i64 = matches.value_of("ttl").unwrap_or(&default_ttl[..]).parse()?;

    let mut columns = Columns::default();
    for pair in matches.values_of("column").into_iter().flatten() {
        let (field, header) = split_pair(pair)?;
        let field = Field::from_str(&field.to_lowercase())
            .map_err(|_| RaincliError::new(format!("Unknown field: {}", field)))?;
        columns = columns.with_alias(field, header);
    }

    let element = parse_element(matches.value_of("element").unwrap_or("rain_5d"))?;
    let mut filter = StationFilter::new(element);
    if let Some(min) = matches.value_of("min") {
        filter = filter.with_threshold(parse_number(min)?);
    }
    for pair in matches.values_of("threshold").into_iter().flatten() {
        let (element, value) = split_pair(pair)?;
        filter = filter.with_extra(parse_element(element)?, parse_number(value)?);
    }

    let range = DateRange::new(
        matches.value_of("from").map(parse_cli_date).transpose()?,
        matches.value_of("to").map(parse_cli_date).transpose()?,
    )?;

    let palette = Palette::from_str(&matches.value_of("palette").unwrap_or("blues").to_lowercase())
        .map_err(|_| RaincliError::new("Unknown palette."))?;

    let style = match matches.value_of("style") {
        Some("column") => match matches.value_of("column-scale") {
            Some(scale) => MarkerStyle::Column {
                radius: MarkerStyle::COLUMN_RADIUS,
                elevation_scale: parse_number(scale)?,
            },
            None => MarkerStyle::column(),
        },
        _ => MarkerStyle::circle(),
    };

    Ok(CmdLineArgs {
        root,
        source: matches.value_of("source").map(str::to_owned),
        operation,
        ttl: RainDB::ttl_from_seconds(ttl)?,
        columns,
        filter,
        range,
        station: matches.value_of("station").map(str::to_owned),
        layer: LayerOptions {
            palette,
            style,
            ..LayerOptions::default()
        },
        output: matches.value_of("output").map(PathBuf::from),
        verbose: matches.is_present("verbose"),
    })
}

fn split_pair(pair: &str) -> Result<(&str, &str), RaincliError> {
    let mut parts = pair.splitn(2, '=');
    match (parts.next(), parts.next()) {
        (Some(key), Some(val)) if !key.trim().is_empty() && !val.trim().is_empty() => {
            Ok((key.trim(), val.trim()))
        }
        _ => Err(RaincliError::new(format!("Expected KEY=VALUE, got '{}'", pair))),
    }
}

fn parse_element(text: &str) -> Result<RainElement, RaincliError> {
    RainElement::from_str(&text.to_lowercase())
        .map_err(|_| RaincliError::new(format!("Unknown element: {}", text)))
}

fn parse_number(text: &str) -> Result<f64, RaincliError> {
    parse_decimal(text).ok_or_else(|| RaincliError::new(format!("Not a number: {}", text)))
}

fn parse_cli_date(text: &str) -> Result<NaiveDate, RaincliError> {
    parse_date(text).ok_or_else(|| RaincliError::new(format!("Not a date: {}", text)))
}

fn reset(args: &CmdLineArgs) -> Result<(), Box<dyn Error>> {
    RainDB::delete_rain_db(&args.root)
}
