//! Load the CSV export of the published spreadsheet into a plain table of optional strings.

use crate::{normalize::normalize_header, RaincliError};
use csv::ReaderBuilder;
use std::{error::Error, fs::File, io::Read, path::Path};

/// A raw table as exported from the spreadsheet, before any cleaning or type coercion.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Snapshot {
    /// Cell contents treated as missing values.
    pub const NA_VALUES: &'static [&'static str] = &[
        "#N/D", "#N/A", "#NA", "N/A", "n/a", "NA", "NaN", "nan", "NULL", "null", "#VALUE!",
        "#DIV/0!", "#REF!",
    ];

    pub fn from_path(path: &Path) -> Result<Self, Box<dyn Error>> {
        let f = File::open(path)?;
        Self::from_reader(f)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Box<dyn Error>> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()?
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let h = if i == 0 { h.trim_start_matches('\u{feff}') } else { h };
                h.trim().to_owned()
            })
            .collect();

        if headers.iter().all(String::is_empty) {
            return Err(Box::new(RaincliError::new("Snapshot has no header row")));
        }

        let mut rows = vec![];
        for record in rdr.records() {
            let record = record?;

            let mut row: Vec<Option<String>> = record.iter().map(clean_cell).collect();
            row.resize(headers.len(), None);

            if row.iter().all(Option::is_none) {
                continue;
            }

            rows.push(row);
        }

        tracing::debug!("loaded snapshot: {} columns, {} rows", headers.len(), rows.len());

        Ok(Snapshot { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Find the first alias present in the headers. Aliases must already be normalized.
    pub fn column_index<S: AsRef<str>>(&self, aliases: &[S]) -> Option<usize> {
        let normalized: Vec<String> = self.headers.iter().map(|h| normalize_header(h)).collect();

        aliases
            .iter()
            .find_map(|alias| normalized.iter().position(|h| h == alias.as_ref()))
    }
}

fn clean_cell(cell: &str) -> Option<String> {
    let cell = cell.trim();
    if cell.is_empty() || Snapshot::NA_VALUES.contains(&cell) {
        None
    } else {
        Some(cell.to_owned())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SHEET: &str = "\u{feff}STAZIONE , Piogge entro 5 gg,X,Y\n\
                         Abetone,\"12,5\",10.66,44.14\n\
                         Cutigliano,#N/D,10.75,44.10\n\
                         ,,,\n\
                         Pracchia,  3  ,10.91\n";

    #[test]
    fn test_headers_are_trimmed() {
        let snap = Snapshot::from_reader(SHEET.as_bytes()).unwrap();
        assert_eq!(snap.headers(), &["STAZIONE", "Piogge entro 5 gg", "X", "Y"]);
    }

    #[test]
    fn test_na_and_blank_rows() {
        let snap = Snapshot::from_reader(SHEET.as_bytes()).unwrap();

        // The all-blank line is skipped
        assert_eq!(snap.len(), 3);
        assert_eq!(snap.rows()[0][1].as_deref(), Some("12,5"));
        assert_eq!(snap.rows()[1][1], None);

        // Short rows are padded, cells are trimmed
        assert_eq!(snap.rows()[2][1].as_deref(), Some("3"));
        assert_eq!(snap.rows()[2][3], None);
    }

    #[test]
    fn test_column_index_is_case_insensitive() {
        let snap = Snapshot::from_reader(SHEET.as_bytes()).unwrap();
        assert_eq!(snap.column_index(&["PIOGGE ENTRO 5 GG"]), Some(1));
        assert_eq!(snap.column_index(&["LAT", "Y"]), Some(3));
        assert_eq!(snap.column_index(&["DATA"]), None);
    }

    #[test]
    fn test_empty_input_is_an_error() {
        assert!(Snapshot::from_reader("".as_bytes()).is_err());

        let snap = Snapshot::from_reader("STAZIONE,X,Y\n".as_bytes()).unwrap();
        assert!(snap.is_empty());
    }
}
