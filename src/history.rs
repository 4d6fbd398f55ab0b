use crate::{
    columns::{Field, Labels},
    obs_record::ElementValues,
    popup::format_value,
    RainElement,
};
use chrono::NaiveDate;
use itertools::Itertools;
use std::io::{self, Write};

/// Daily readings of one station, oldest first.
#[derive(Clone, Debug, PartialEq)]
pub struct StationHistory {
    station: String,
    rows: Vec<(NaiveDate, ElementValues)>,
}

impl StationHistory {
    pub fn new(station: String, rows: Vec<(NaiveDate, ElementValues)>) -> Self {
        debug_assert!(rows.windows(2).all(|w| w[0].0 <= w[1].0));

        StationHistory { station, rows }
    }

    pub fn station(&self) -> &str {
        &self.station
    }

    pub fn rows(&self) -> &[(NaiveDate, ElementValues)] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The dated values of one element, skipping days without a value.
    pub fn series(&self, element: RainElement) -> Vec<(NaiveDate, f64)> {
        self.rows
            .iter()
            .filter_map(|(date, vals)| vals.get(element).map(|val| (*date, val)))
            .collect()
    }

    pub fn latest(&self) -> Option<&(NaiveDate, ElementValues)> {
        self.rows.last()
    }

    /// Write a tab separated table, one line per day, `-` for missing values.
    pub fn write_table<W: Write>(&self, mut output: W, labels: &Labels) -> io::Result<()> {
        writeln!(output, "# {}", self.station)?;
        writeln!(
            output,
            "{}\t{}",
            labels.label(Field::Date),
            RainElement::ALL
                .iter()
                .map(|&element| labels.label(Field::from(element)))
                .join("\t")
        )?;

        for (date, vals) in &self.rows {
            writeln!(
                output,
                "{}\t{}",
                date.format("%d/%m/%Y"),
                RainElement::ALL
                    .iter()
                    .map(|&element| vals
                        .get(element)
                        .map(format_value)
                        .unwrap_or_else(|| "-".to_owned()))
                    .join("\t")
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample() -> StationHistory {
        let mut first = ElementValues::default();
        first.set(RainElement::Rain5Days, Some(12.5));
        first.set(RainElement::MonthlyRain, Some(80.0));

        let mut second = ElementValues::default();
        second.set(RainElement::MonthlyRain, Some(81.25));

        StationHistory::new(
            "Abetone".to_owned(),
            vec![
                (NaiveDate::from_ymd_opt(2024, 10, 1).unwrap(), first),
                (NaiveDate::from_ymd_opt(2024, 10, 2).unwrap(), second),
            ],
        )
    }

    #[test]
    fn test_series_skips_missing() {
        let hist = sample();

        assert_eq!(
            hist.series(RainElement::Rain5Days),
            vec![(NaiveDate::from_ymd_opt(2024, 10, 1).unwrap(), 12.5)]
        );
        assert_eq!(hist.series(RainElement::MonthlyRain).len(), 2);
        assert!(hist.series(RainElement::PorciniAverage).is_empty());
        assert_eq!(
            hist.latest().map(|(date, _)| *date),
            NaiveDate::from_ymd_opt(2024, 10, 2)
        );
    }

    #[test]
    fn test_write_table() {
        let mut buf: Vec<u8> = vec![];
        sample().write_table(&mut buf, &Labels::default()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "# Abetone");
        assert!(lines[1].starts_with("DATA\tPIOGGE ENTRO 5 GG\tPIOGGE ENTRO 10 GG"));
        assert_eq!(lines[2], "01/10/2024\t12.5\t-\t80\t-\t-\t-");
        assert_eq!(lines[3], "02/10/2024\t-\t-\t81.25\t-\t-\t-");
    }
}
