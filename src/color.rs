use itertools::{Itertools, MinMaxResult};
use strum::{Display, EnumIter, EnumString};

/// A 24 bit color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.to_hex())
    }
}

/// Sequential palettes (ColorBrewer 9-class, viridis sampled at 9 points).
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, EnumString, Display)]
pub enum Palette {
    #[strum(serialize = "blues")]
    Blues,
    #[strum(serialize = "greens")]
    Greens,
    #[strum(serialize = "ylorrd")]
    YlOrRd,
    #[strum(serialize = "viridis")]
    Viridis,
}

impl Default for Palette {
    fn default() -> Self {
        Palette::Blues
    }
}

impl Palette {
    const BLUES: [Rgb; 9] = [
        Rgb::new(0xf7, 0xfb, 0xff),
        Rgb::new(0xde, 0xeb, 0xf7),
        Rgb::new(0xc6, 0xdb, 0xef),
        Rgb::new(0x9e, 0xca, 0xe1),
        Rgb::new(0x6b, 0xae, 0xd6),
        Rgb::new(0x42, 0x92, 0xc6),
        Rgb::new(0x21, 0x71, 0xb5),
        Rgb::new(0x08, 0x51, 0x9c),
        Rgb::new(0x08, 0x30, 0x6b),
    ];
    const GREENS: [Rgb; 9] = [
        Rgb::new(0xf7, 0xfc, 0xf5),
        Rgb::new(0xe5, 0xf5, 0xe0),
        Rgb::new(0xc7, 0xe9, 0xc0),
        Rgb::new(0xa1, 0xd9, 0x9b),
        Rgb::new(0x74, 0xc4, 0x76),
        Rgb::new(0x41, 0xab, 0x5d),
        Rgb::new(0x23, 0x8b, 0x45),
        Rgb::new(0x00, 0x6d, 0x2c),
        Rgb::new(0x00, 0x44, 0x1b),
    ];
    const YLORRD: [Rgb; 9] = [
        Rgb::new(0xff, 0xff, 0xcc),
        Rgb::new(0xff, 0xed, 0xa0),
        Rgb::new(0xfe, 0xd9, 0x76),
        Rgb::new(0xfe, 0xb2, 0x4c),
        Rgb::new(0xfd, 0x8d, 0x3c),
        Rgb::new(0xfc, 0x4e, 0x2a),
        Rgb::new(0xe3, 0x1a, 0x1c),
        Rgb::new(0xbd, 0x00, 0x26),
        Rgb::new(0x80, 0x00, 0x26),
    ];
    const VIRIDIS: [Rgb; 9] = [
        Rgb::new(0x44, 0x01, 0x54),
        Rgb::new(0x47, 0x2d, 0x7b),
        Rgb::new(0x3b, 0x52, 0x8b),
        Rgb::new(0x2c, 0x72, 0x8e),
        Rgb::new(0x21, 0x91, 0x8c),
        Rgb::new(0x28, 0xae, 0x80),
        Rgb::new(0x5e, 0xc9, 0x62),
        Rgb::new(0xad, 0xdc, 0x30),
        Rgb::new(0xfd, 0xe7, 0x25),
    ];

    fn stops(self) -> &'static [Rgb] {
        use Palette::*;

        match self {
            Blues => &Palette::BLUES,
            Greens => &Palette::GREENS,
            YlOrRd => &Palette::YLORRD,
            Viridis => &Palette::VIRIDIS,
        }
    }

    /// Color at position `t` in [0, 1], linearly interpolated between neighbouring stops.
    pub fn interpolate(self, t: f64) -> Rgb {
        let stops = self.stops();
        let t = if t.is_nan() { 0.0 } else { t.max(0.0).min(1.0) };

        let pos = t * (stops.len() - 1) as f64;
        let idx = (pos.floor() as usize).min(stops.len() - 2);
        let frac = pos - idx as f64;

        let (lo, hi) = (stops[idx], stops[idx + 1]);
        let lerp = |a: u8, b: u8| -> u8 {
            (f64::from(a) + (f64::from(b) - f64::from(a)) * frac).round() as u8
        };

        Rgb::new(lerp(lo.r, hi.r), lerp(lo.g, hi.g), lerp(lo.b, hi.b))
    }
}

/// Linear normalization of values onto a palette.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorScale {
    vmin: f64,
    vmax: f64,
    palette: Palette,
}

impl ColorScale {
    pub fn new(vmin: f64, vmax: f64, palette: Palette) -> Self {
        Self {
            vmin,
            vmax,
            palette,
        }
    }

    /// Scale spanning the smallest and largest of `values`, `None` if there are none.
    pub fn from_values<I>(values: I, palette: Palette) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        match values.into_iter().filter(|v| !v.is_nan()).minmax() {
            MinMaxResult::NoElements => None,
            MinMaxResult::OneElement(v) => Some(Self::new(v, v, palette)),
            MinMaxResult::MinMax(lo, hi) => Some(Self::new(lo, hi, palette)),
        }
    }

    pub fn vmin(&self) -> f64 {
        self.vmin
    }

    pub fn vmax(&self) -> f64 {
        self.vmax
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    /// Map `value` into [0, 1]. A degenerate range maps everything to 0.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.vmax - self.vmin;
        if !(span > 0.0) {
            return 0.0;
        }

        ((value - self.vmin) / span).max(0.0).min(1.0)
    }

    pub fn color_for(&self, value: f64) -> Rgb {
        self.palette.interpolate(self.normalize(value))
    }
}
