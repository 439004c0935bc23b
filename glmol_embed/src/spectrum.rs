//! Mapping of per-residue numeric values to colors.
//!
//! Values are normalized to `[0, 1]` either against explicit
//! [`Thresholds`] or against the observed range, clamped and then
//! sampled from a [`ColorRamp`]. Every value produces exactly one
//! `#rrggbb` color in input order.

use crate::error::EmbedError;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpectrumError {
    #[error("unknown palette '{0}'")]
    UnknownPalette(String),

    #[error("can't parse color '{0}'")]
    InvalidColor(String),

    #[error("color ramp needs at least one color")]
    EmptyRamp,

    #[error("color stop positions must be increasing within [0,1]")]
    StopOrder,
}

/// RGB color with channels in `[0, 1]`
pub type Rgb = [f32; 3];

//===============================
// Color ramp
//===============================

#[derive(Debug, Clone, PartialEq)]
struct ColorStop {
    pos: f32,
    rgb: Rgb,
}

/// Piecewise-linear color gradient over `[0, 1]`
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRamp {
    stops: Vec<ColorStop>,
}

impl ColorRamp {
    /// Evenly spaced colors, the first one at `t=0` and the last at `t=1`
    pub fn from_colors(colors: &[Rgb]) -> Result<Self, SpectrumError> {
        let n = colors.len();
        if n == 0 {
            return Err(SpectrumError::EmptyRamp);
        }
        let stops = colors
            .iter()
            .enumerate()
            .map(|(i, c)| ColorStop {
                pos: if n == 1 { 0.0 } else { i as f32 / (n - 1) as f32 },
                rgb: *c,
            })
            .collect();
        Ok(Self { stops })
    }

    /// Colors at explicit positions, which must be non-decreasing within `[0, 1]`
    pub fn from_stops(stops: &[(f32, Rgb)]) -> Result<Self, SpectrumError> {
        if stops.is_empty() {
            return Err(SpectrumError::EmptyRamp);
        }
        let ordered = stops.windows(2).all(|w| w[0].0 <= w[1].0);
        let bounded = stops.iter().all(|(p, _)| (0.0..=1.0).contains(p));
        if !ordered || !bounded {
            return Err(SpectrumError::StopOrder);
        }
        Ok(Self {
            stops: stops
                .iter()
                .map(|(pos, rgb)| ColorStop { pos: *pos, rgb: *rgb })
                .collect(),
        })
    }

    /// Parses colors given as hex codes or names
    pub fn from_color_names<S: AsRef<str>>(colors: &[S]) -> Result<Self, SpectrumError> {
        let rgb = colors
            .iter()
            .map(|c| parse_color(c.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_colors(&rgb)
    }

    /// Interpolate the ramp at position `t`, clamped to [0, 1].
    pub fn sample(&self, t: f32) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let first = &self.stops[0];
        let last = &self.stops[self.stops.len() - 1];
        if t <= first.pos {
            return first.rgb;
        }
        if t >= last.pos {
            return last.rgb;
        }
        // There is always a segment containing t here
        let i = self
            .stops
            .windows(2)
            .position(|w| t <= w[1].pos)
            .unwrap_or(self.stops.len() - 2);
        let a = &self.stops[i];
        let b = &self.stops[i + 1];
        let width = b.pos - a.pos;
        if width <= 0.0 {
            return b.rgb;
        }
        let frac = (t - a.pos) / width;
        [
            a.rgb[0] + (b.rgb[0] - a.rgb[0]) * frac,
            a.rgb[1] + (b.rgb[1] - a.rgb[1]) * frac,
            a.rgb[2] + (b.rgb[2] - a.rgb[2]) * frac,
        ]
    }

    /// Per-channel (min, max) over all stops.
    /// Every sampled color lies inside these bounds.
    pub fn channel_bounds(&self) -> [(f32, f32); 3] {
        let mut b = [(f32::MAX, f32::MIN); 3];
        for s in &self.stops {
            for (ch, v) in b.iter_mut().zip(s.rgb) {
                ch.0 = ch.0.min(v);
                ch.1 = ch.1.max(v);
            }
        }
        b
    }

    /// Named palette
    pub fn palette(name: &str) -> Result<Self, SpectrumError> {
        let stops: &[(f32, &str)] = match name.to_ascii_lowercase().as_str() {
            "viridis" => &[
                (0.0, "#440154"),
                (0.125, "#482878"),
                (0.25, "#3e4989"),
                (0.375, "#31688e"),
                (0.5, "#26828e"),
                (0.625, "#1f9e89"),
                (0.75, "#35b779"),
                (0.875, "#6ece58"),
                (1.0, "#fde725"),
            ],
            "jet" => &[
                (0.0, "#00007f"),
                (0.125, "#0000ff"),
                (0.375, "#00ffff"),
                (0.625, "#ffff00"),
                (0.875, "#ff0000"),
                (1.0, "#7f0000"),
            ],
            "coolwarm" => &[(0.0, "#3b4cc0"), (0.5, "#dddcdc"), (1.0, "#b40426")],
            "greys" => &[(0.0, "#ffffff"), (1.0, "#000000")],
            "hot" => &[
                (0.0, "#0a0000"),
                (0.365, "#ff0000"),
                (0.746, "#ffff00"),
                (1.0, "#ffffff"),
            ],
            "rdylgn" => &[
                (0.0, "#a50026"),
                (0.25, "#f46d43"),
                (0.5, "#ffffbf"),
                (0.75, "#66bd63"),
                (1.0, "#006837"),
            ],
            _ => return Err(SpectrumError::UnknownPalette(name.to_owned())),
        };
        let stops = stops
            .iter()
            .map(|(p, c)| parse_color(c).map(|rgb| (*p, rgb)))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_stops(&stops)
    }
}

//===============================
// Gradient definition
//===============================

/// How a spectrum gradient is specified by the user
#[derive(Debug, Clone, PartialEq)]
pub enum Gradient {
    /// Named palette, see [`ColorRamp::palette`]
    Named(String),
    /// Evenly spaced list of color names or hex codes
    Colors(Vec<String>),
    /// Ready to use ramp
    Ramp(ColorRamp),
}

impl Default for Gradient {
    fn default() -> Self {
        Gradient::Named("viridis".into())
    }
}

impl Gradient {
    pub fn ramp(&self) -> Result<ColorRamp, SpectrumError> {
        match self {
            Gradient::Named(name) => ColorRamp::palette(name),
            Gradient::Colors(colors) => ColorRamp::from_color_names(colors),
            Gradient::Ramp(r) => Ok(r.clone()),
        }
    }
}

impl From<ColorRamp> for Gradient {
    fn from(r: ColorRamp) -> Self {
        Gradient::Ramp(r)
    }
}

//===============================
// Colors
//===============================

static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#?([0-9a-fA-F]{6}|[0-9a-fA-F]{3})$").unwrap()
});

const NAMED_COLORS: &[(&str, &str)] = &[
    ("black", "000000"),
    ("white", "ffffff"),
    ("red", "ff0000"),
    ("green", "008000"),
    ("lime", "00ff00"),
    ("blue", "0000ff"),
    ("navy", "000080"),
    ("yellow", "ffff00"),
    ("cyan", "00ffff"),
    ("magenta", "ff00ff"),
    ("orange", "ffa500"),
    ("purple", "800080"),
    ("pink", "ffc0cb"),
    ("brown", "a52a2a"),
    ("gray", "808080"),
    ("grey", "808080"),
];

/// Parses `#rrggbb`, `rrggbb`, `#rgb` or a basic CSS color name
pub fn parse_color(s: &str) -> Result<Rgb, SpectrumError> {
    let s = s.trim();
    let lower = s.to_ascii_lowercase();
    let hex = match NAMED_COLORS.iter().find(|(n, _)| *n == lower) {
        Some((_, h)) => (*h).to_owned(),
        None => {
            let caps = HEX_COLOR
                .captures(s)
                .ok_or_else(|| SpectrumError::InvalidColor(s.to_owned()))?;
            let h = caps[1].to_owned();
            if h.len() == 3 {
                h.chars().flat_map(|c| [c, c]).collect()
            } else {
                h
            }
        }
    };
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .map(|v| v as f32 / 255.0)
            .map_err(|_| SpectrumError::InvalidColor(s.to_owned()))
    };
    Ok([channel(0)?, channel(2)?, channel(4)?])
}

/// Formats color as `#rrggbb`
pub fn to_hex(rgb: Rgb) -> String {
    let ch = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!("#{:02x}{:02x}{:02x}", ch(rgb[0]), ch(rgb[1]), ch(rgb[2]))
}

//===============================
// Normalization
//===============================

/// Explicit normalization bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    min: f64,
    max: f64,
}

impl Thresholds {
    pub fn new(min: f64, max: f64) -> Result<Self, EmbedError> {
        if min.is_finite() && max.is_finite() && min <= max {
            Ok(Self { min, max })
        } else {
            Err(EmbedError::InvalidThresholds(vec![min, max]))
        }
    }

    /// Thresholds from a list which must be exactly a `(min, max)` pair
    pub fn from_slice(v: &[f64]) -> Result<Self, EmbedError> {
        match v {
            [min, max] => Self::new(*min, *max),
            _ => Err(EmbedError::InvalidThresholds(v.to_vec())),
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

/// Explicit thresholds if given, otherwise the observed range of finite scores
pub fn normalization_bounds(scores: &[f64], thresholds: Option<Thresholds>) -> Option<(f64, f64)> {
    if let Some(t) = thresholds {
        return Some((t.min, t.max));
    }
    scores
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Linear map into [0,1] clamped at both ends.
/// Degenerate bounds and NaN give zero.
pub fn normalize(score: f64, (min, max): (f64, f64)) -> f32 {
    let range = max - min;
    if score.is_nan() || range <= 0.0 {
        return 0.0;
    }
    ((score - min) / range).clamp(0.0, 1.0) as f32
}

/// One hex color per score, in input order
pub fn map_scores(scores: &[f64], ramp: &ColorRamp, thresholds: Option<Thresholds>) -> Vec<String> {
    let Some(bounds) = normalization_bounds(scores, thresholds) else {
        return scores.iter().map(|_| to_hex(ramp.sample(0.0))).collect();
    };
    scores
        .iter()
        .map(|&s| to_hex(ramp.sample(normalize(s, bounds))))
        .collect()
}

//##############################
//#  Tests
//##############################

#[cfg(test)]
mod tests {
    use super::*;

    fn blue_red() -> ColorRamp {
        ColorRamp::from_color_names(&["blue", "red"]).unwrap()
    }

    #[test]
    fn parse_colors() {
        assert_eq!(parse_color("#ff0000").unwrap(), [1.0, 0.0, 0.0]);
        assert_eq!(parse_color("00ff00").unwrap(), [0.0, 1.0, 0.0]);
        assert_eq!(parse_color("#00f").unwrap(), [0.0, 0.0, 1.0]);
        assert_eq!(parse_color("White").unwrap(), [1.0, 1.0, 1.0]);
        assert!(parse_color("notacolor").is_err());
        assert!(parse_color("#12345").is_err());
    }

    #[test]
    fn hex_format() {
        assert_eq!(to_hex([1.0, 0.5, 0.0]), "#ff8000");
        assert_eq!(to_hex([2.0, -1.0, 0.0]), "#ff0000");
    }

    #[test]
    fn sample_clamps_and_interpolates() {
        let r = blue_red();
        assert_eq!(r.sample(-1.0), [0.0, 0.0, 1.0]);
        assert_eq!(r.sample(2.0), [1.0, 0.0, 0.0]);
        assert_eq!(r.sample(0.5), [0.5, 0.0, 0.5]);
    }

    #[test]
    fn observed_bounds() {
        let colors = map_scores(&[0.0, 5.0, 10.0], &blue_red(), None);
        assert_eq!(colors, vec!["#0000ff", "#800080", "#ff0000"]);
    }

    #[test]
    fn threshold_clamping() {
        let t = Thresholds::new(2.0, 4.0).unwrap();
        let colors = map_scores(&[0.0, 3.0, 100.0], &blue_red(), Some(t));
        assert_eq!(colors, vec!["#0000ff", "#800080", "#ff0000"]);
    }

    #[test]
    fn degenerate_input() {
        assert!(map_scores(&[], &blue_red(), None).is_empty());
        let colors = map_scores(&[3.0, 3.0], &blue_red(), None);
        assert_eq!(colors, vec!["#0000ff", "#0000ff"]);
        let colors = map_scores(&[f64::NAN, 1.0, 2.0], &blue_red(), None);
        assert_eq!(colors[0], "#0000ff");
        assert_eq!(colors[2], "#ff0000");
    }

    #[test]
    fn thresholds_validation() {
        assert!(Thresholds::new(1.0, 0.0).is_err());
        assert!(Thresholds::new(f64::NAN, 0.0).is_err());
        assert_eq!(
            Thresholds::from_slice(&[1.0]),
            Err(EmbedError::InvalidThresholds(vec![1.0]))
        );
        assert!(Thresholds::from_slice(&[0.0, 1.0, 2.0]).is_err());
        assert!(Thresholds::from_slice(&[0.0, 0.0]).is_ok());
    }

    #[test]
    fn palettes() {
        for name in ["viridis", "jet", "coolwarm", "greys", "hot", "RdYlGn"] {
            let r = ColorRamp::palette(name).unwrap();
            assert_eq!(r.sample(0.0), r.stops[0].rgb);
        }
        assert_eq!(
            ColorRamp::palette("nope"),
            Err(SpectrumError::UnknownPalette("nope".into()))
        );
        assert_eq!(to_hex(ColorRamp::palette("greys").unwrap().sample(1.0)), "#000000");
    }

    #[test]
    fn stops_must_be_ordered() {
        let bad = [(0.5, [0.0; 3]), (0.2, [1.0; 3])];
        assert_eq!(ColorRamp::from_stops(&bad), Err(SpectrumError::StopOrder));
        assert_eq!(ColorRamp::from_colors(&[]), Err(SpectrumError::EmptyRamp));
    }
}
