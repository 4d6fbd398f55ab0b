use strum::{Display, EnumIter, EnumString};

/// Elements carried by every reading in the snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, EnumString, Display)]
pub enum RainElement {
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

impl RainElement {
    pub const NUM_VARIANTS: usize = 6;

    /// Readings columns, in the order the queries select them.
    pub(crate) const ALL: [RainElement; RainElement::NUM_VARIANTS] = [
        RainElement::Rain5Days,
        RainElement::Rain10Days,
        RainElement::MonthlyRain,
        RainElement::ResidualRain,
        RainElement::ThermalSwing,
        RainElement::PorciniAverage,
    ];

    pub(crate) fn into_index(self) -> usize {
        self as usize
    }

    pub fn into_column_name(self) -> &'static str {
        use RainElement::*;

        match self {
            Rain5Days => "rain_5d",
            Rain10Days => "rain_10d",
            MonthlyRain => "rain_month",
            ResidualRain => "rain_residual",
            ThermalSwing => "thermal_swing",
            PorciniAverage => "porcini_avg",
        }
    }
}

impl Default for RainElement {
    fn default() -> Self {
        RainElement::Rain5Days
    }
}
