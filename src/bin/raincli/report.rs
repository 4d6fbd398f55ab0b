use crate::{loader::open_fresh, CmdLineArgs};
use raincli::{build_layer, format_value, Field, RainQueryInterface, RaincliError};
use std::{
    error::Error,
    fs::File,
    io::{self, BufWriter, Write},
};

fn open_output(args: &CmdLineArgs) -> Result<Box<dyn Write>, Box<dyn Error>> {
    let output: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout())),
    };

    Ok(output)
}

/// Write the marker layer as JSON.
pub(crate) fn map(args: &CmdLineArgs) -> Result<(), Box<dyn Error>> {
    let rain_db = open_fresh(args)?;
    let mut query = RainQueryInterface::initialize(&rain_db)?;

    let labels = query.labels()?;
    let views = query.station_views(&args.range)?;
    let layer = build_layer(views, &args.filter, &labels, &args.layer);

    eprintln!("{}", layer.summary());
    if layer.markers.is_empty() {
        eprintln!("No station matches the selected filters.");
    }

    let mut output = open_output(args)?;
    serde_json::to_writer_pretty(&mut output, &layer)?;
    writeln!(output)?;
    output.flush()?;

    Ok(())
}

/// Print the snapshot status, the slider bounds, and how many stations pass the filters.
pub(crate) fn summary(args: &CmdLineArgs) -> Result<(), Box<dyn Error>> {
    let rain_db = open_fresh(args)?;

    if let Some(info) = rain_db.snapshot_info()? {
        println!(
            "Snapshot: {} loaded {}, {} readings from {} rows.",
            info.source,
            info.loaded_at.format("%Y-%m-%d %H:%M UTC"),
            info.rows_kept,
            info.rows_total
        );
    }

    let mut query = RainQueryInterface::initialize(&rain_db)?;
    let labels = query.labels()?;
    let views = query.station_views(&args.range)?;
    let outcome = args.filter.apply(views);

    let element = args.filter.element;
    println!(
        "Element: {} ({})",
        labels.label(Field::from(element)),
        element
    );

    match outcome.bounds {
        Some(bounds) => println!("Slider: {} to {}", bounds.min, bounds.max),
        None => println!("Slider: no values"),
    }
    if let Some(threshold) = outcome.threshold {
        println!("Threshold: >= {}", format_value(threshold));
    }
    for (element, min) in &args.filter.extra {
        println!(
            "Threshold: {} >= {}",
            labels.label(Field::from(*element)),
            format_value(*min)
        );
    }

    println!(
        "Showing {} of {} stations.",
        outcome.shown.len(),
        outcome.total
    );

    Ok(())
}

/// Print the readings of one station.
pub(crate) fn history(args: &CmdLineArgs) -> Result<(), Box<dyn Error>> {
    let station = args
        .station
        .as_deref()
        .ok_or_else(|| RaincliError::new("The history operation needs --station."))?;

    let rain_db = open_fresh(args)?;
    let mut query = RainQueryInterface::initialize(&rain_db)?;

    let labels = query.labels()?;
    let hist = query.history(station, &args.range)?;
    if hist.is_empty() {
        eprintln!("No readings for {} in the selected dates.", station);
    }

    let mut output = open_output(args)?;
    hist.write_table(&mut output, &labels)?;
    output.flush()?;

    Ok(())
}

/// List the station names.
pub(crate) fn stations(args: &CmdLineArgs) -> Result<(), Box<dyn Error>> {
    let rain_db = open_fresh(args)?;
    let mut query = RainQueryInterface::initialize(&rain_db)?;

    for station in query.stations()? {
        println!("{}", station);
    }

    Ok(())
}
