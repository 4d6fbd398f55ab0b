//! Logical columns of the published sheet and the header text they go by.
//!
//! The sheet has been re-published several times with renamed headers, so every field accepts a
//! list of aliases. Matching is done on the normalized header (see
//! [`normalize_header`](crate::normalize_header)).

use crate::{normalize::normalize_header, RainElement};
use std::collections::HashMap;
use strum::{Display, EnumIter, EnumString};

/// Every column the pipeline knows how to use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, EnumString, Display)]
pub enum Field {
    #[strum(serialize = "station")]
    Station,
    #[strum(serialize = "comune")]
    Comune,
    #[strum(serialize = "lon")]
    Longitude,
    #[strum(serialize = "lat")]
    Latitude,
    #[strum(serialize = "altitude")]
    Altitude,
    #[strum(serialize = "legend")]
    Legend,
    #[strum(serialize = "date")]
    Date,
    #[strum(serialize = "rain_5d")]
    Rain5Days,
    #[strum(serialize = "rain_10d")]
    Rain10Days,
    #[strum(serialize = "rain_month")]
    MonthlyRain,
    #[strum(serialize = "rain_residual")]
    ResidualRain,
    #[strum(serialize = "thermal_swing")]
    ThermalSwing,
    #[strum(serialize = "porcini_avg")]
    PorciniAverage,
}

impl Field {
    /// Fields listed in a popup, in display order. The station name is the popup title.
    pub const POPUP_ORDER: [Field; 9] = [
        Field::Comune,
        Field::Altitude,
        Field::Legend,
        Field::ThermalSwing,
        Field::ResidualRain,
        Field::Rain5Days,
        Field::Rain10Days,
        Field::MonthlyRain,
        Field::PorciniAverage,
    ];

    pub fn element(self) -> Option<RainElement> {
        use Field::*;

        match self {
            Rain5Days => Some(RainElement::Rain5Days),
            Rain10Days => Some(RainElement::Rain10Days),
            MonthlyRain => Some(RainElement::MonthlyRain),
            ResidualRain => Some(RainElement::ResidualRain),
            ThermalSwing => Some(RainElement::ThermalSwing),
            PorciniAverage => Some(RainElement::PorciniAverage),
            Station | Comune | Longitude | Latitude | Altitude | Legend | Date => None,
        }
    }

    /// Headers used by the published versions of the sheet, the first one is the current name.
    pub fn default_headers(self) -> &'static [&'static str] {
        use Field::*;

        match self {
            Station => &["STAZIONE", "NOME STAZIONE"],
            Comune => &["COMUNE"],
            Longitude => &["X", "LONGITUDINE", "LON", "LONGITUDE"],
            Latitude => &["Y", "LATITUDINE", "LAT", "LATITUDE"],
            Altitude => &["ALTITUDINE", "QUOTA", "ALTITUDINE (M)"],
            Legend => &["LEGENDA"],
            Date => &["DATA", "DATE", "GIORNO"],
            Rain5Days => &["PIOGGE ENTRO 5 GG", "PIOGGIA 5 GG", "PIOGGE 5 GG"],
            Rain10Days => &["PIOGGE ENTRO 10 GG", "PIOGGIA 10 GG", "PIOGGE 10 GG"],
            MonthlyRain => &["TOTALE PIOGGE MENSILI", "PIOGGE MENSILI"],
            ResidualRain => &["PIOGGE RESIDUA", "PIOGGIA RESIDUA", "PIOGGE RESIDUE"],
            ThermalSwing => &["SBALZO TERMICO MIGLIORE", "SBALZO TERMICO"],
            PorciniAverage => &["MEDIA PORCINI CALDO BASE", "MEDIA PORCINI"],
        }
    }
}

impl From<RainElement> for Field {
    fn from(element: RainElement) -> Self {
        match element {
            RainElement::Rain5Days => Field::Rain5Days,
            RainElement::Rain10Days => Field::Rain10Days,
            RainElement::MonthlyRain => Field::MonthlyRain,
            RainElement::ResidualRain => Field::ResidualRain,
            RainElement::ThermalSwing => Field::ThermalSwing,
            RainElement::PorciniAverage => Field::PorciniAverage,
        }
    }
}

/// Header aliases for every field.
#[derive(Clone, Debug)]
pub struct Columns {
    aliases: HashMap<Field, Vec<String>>,
}

impl Default for Columns {
    fn default() -> Self {
        use strum::IntoEnumIterator;

        let aliases = Field::iter()
            .map(|field| {
                let headers = field
                    .default_headers()
                    .iter()
                    .map(|h| normalize_header(h))
                    .collect();
                (field, headers)
            })
            .collect();

        Columns { aliases }
    }
}

impl Columns {
    /// Add an alias for a field. User supplied aliases take precedence over the defaults.
    pub fn with_alias(mut self, field: Field, header: &str) -> Self {
        let header = normalize_header(header);
        let list = self.aliases.entry(field).or_insert_with(Vec::new);
        list.retain(|h| h != &header);
        list.insert(0, header);
        self
    }

    pub fn aliases(&self, field: Field) -> &[String] {
        self.aliases
            .get(&field)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Header text shown for each field, as it appeared in the loaded sheet.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Labels {
    headers: HashMap<Field, String>,
}

impl Labels {
    pub fn insert(&mut self, field: Field, header: String) {
        self.headers.insert(field, header);
    }

    /// True if the sheet had a column for `field`.
    pub fn has(&self, field: Field) -> bool {
        self.headers.contains_key(&field)
    }

    /// The stored header, or the current default name if the sheet did not have the column.
    pub fn label(&self, field: Field) -> &str {
        self.headers
            .get(&field)
            .map(String::as_str)
            .unwrap_or_else(|| field.default_headers()[0])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Field, &String)> {
        self.headers.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_element_fields_map_back() {
        for element in RainElement::iter() {
            assert_eq!(Field::from(element).element(), Some(element));
            assert_eq!(Field::from(element).to_string(), element.to_string());
        }
        assert_eq!(Field::Station.element(), None);
    }

    #[test]
    fn test_user_alias_goes_first() {
        let cols = Columns::default().with_alias(Field::Rain5Days, "  pioggia   cinque giorni ");
        assert_eq!(cols.aliases(Field::Rain5Days)[0], "PIOGGIA CINQUE GIORNI");
        assert!(cols
            .aliases(Field::Rain5Days)
            .iter()
            .any(|h| h == "PIOGGE ENTRO 5 GG"));
    }

    #[test]
    fn test_labels_fall_back_to_defaults() {
        let mut labels = Labels::default();
        assert_eq!(labels.label(Field::Rain5Days), "PIOGGE ENTRO 5 GG");
        labels.insert(Field::Rain5Days, "Piogge entro 5 gg".to_owned());
        assert_eq!(labels.label(Field::Rain5Days), "Piogge entro 5 gg");
    }
}
