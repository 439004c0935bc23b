use crate::{
    embed::Embed,
    error::EmbedError,
    selector::{Selector, SubSelector},
    spectrum::{map_scores, Gradient, Thresholds},
};
use log::debug;
use std::{fmt::Display, ops::Add};

//##############################
//#  Representation types
//##############################

/// Drawing style with a selection of its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReprType {
    Ribbon,
    Stick,
    Line,
    Sphere,
    Sheet,
    Helix,
}

impl ReprType {
    pub fn keyword(&self) -> &'static str {
        match self {
            ReprType::Ribbon => "ribbon",
            ReprType::Stick => "stick",
            ReprType::Line => "line",
            ReprType::Sphere => "sphere",
            ReprType::Sheet => "sheet",
            ReprType::Helix => "helix",
        }
    }

    /// Styles reset by [`Modifier::Clear`]
    pub const CLEARED: [ReprType; 4] = [
        ReprType::Ribbon,
        ReprType::Stick,
        ReprType::Line,
        ReprType::Sphere,
    ];
}

impl Display for ReprType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

pub const COLOR_KEYWORD: &str = "color";
pub const BGCOLOR_KEYWORD: &str = "bgcolor";

//##############################
//#  Residue spectrum
//##############################

/// Colors every residue according to a numeric residue property
#[derive(Debug, Clone, PartialEq)]
pub struct ResidueSpectrum {
    property: String,
    gradient: Gradient,
    sub_selector: Option<SubSelector>,
    thresholds: Option<Thresholds>,
}

impl ResidueSpectrum {
    /// Spectrum over the named property with the default palette
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            gradient: Default::default(),
            sub_selector: None,
            thresholds: None,
        }
    }

    pub fn with_gradient(mut self, gradient: impl Into<Gradient>) -> Self {
        self.gradient = gradient.into();
        self
    }

    pub fn with_palette(self, name: impl Into<String>) -> Self {
        self.with_gradient(Gradient::Named(name.into()))
    }

    pub fn with_colors<S: ToString>(self, colors: impl IntoIterator<Item = S>) -> Self {
        self.with_gradient(Gradient::Colors(
            colors.into_iter().map(|c| c.to_string()).collect(),
        ))
    }

    pub fn with_sub_selector(mut self, sub: SubSelector) -> Self {
        self.sub_selector = Some(sub);
        self
    }

    pub fn with_thresholds(mut self, min: f64, max: f64) -> Result<Self, EmbedError> {
        self.thresholds = Some(Thresholds::new(min, max)?);
        Ok(self)
    }

    /// Thresholds given as a list, which has to be a `(min, max)` pair
    pub fn with_threshold_list(mut self, v: &[f64]) -> Result<Self, EmbedError> {
        self.thresholds = Some(Thresholds::from_slice(v)?);
        Ok(self)
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn thresholds(&self) -> Option<Thresholds> {
        self.thresholds
    }

    /// One `color:residue` entry per residue, in residue order
    pub fn color_entries(&self, embed: &Embed) -> Result<Vec<String>, EmbedError> {
        let prop = embed
            .residue_property(&self.property)
            .ok_or_else(|| EmbedError::MissingProperty {
                name: self.property.clone(),
                available: embed.residue_property_names(),
            })?;

        let ramp = self.gradient.ramp()?;
        let colors = map_scores(prop.values(), &ramp, self.thresholds);

        Ok(prop
            .residue_numbers()
            .zip(colors)
            .map(|(resid, c)| match self.sub_selector {
                Some(sub) => format!("{c}:residue {resid}; {sub}"),
                None => format!("{c}:residue {resid}"),
            })
            .collect())
    }
}

impl From<ResidueSpectrum> for Modifier {
    fn from(s: ResidueSpectrum) -> Self {
        Modifier::ResidueSpectrum(s)
    }
}

//##############################
//#  Modifiers
//##############################

/// Composable operation on the representation of an [`Embed`].
///
/// Modifiers are stateless and could be applied any number of times
/// to any number of embeds. Adding two modifiers gives a flat
/// [`Composite`](Modifier::Composite) applied left to right:
///
/// ```
/// # use glmol_embed::prelude::*;
/// let m = Modifier::clear() + Modifier::ribbon(Selector::all()) + Modifier::background_color("000000");
/// assert_eq!(m.children().len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Modifier {
    /// Resets ribbon, stick, line and sphere
    Clear,
    /// Draws `repr` over the selector. `None` resets this style only.
    Simple {
        repr: ReprType,
        selector: Option<Selector>,
    },
    /// Whole-scene background color
    BackgroundColor(String),
    Color {
        color: String,
        selector: Selector,
    },
    ResidueSpectrum(ResidueSpectrum),
    Composite(Vec<Modifier>),
}

impl Modifier {
    pub fn clear() -> Self {
        Modifier::Clear
    }

    pub fn simple(repr: ReprType, selector: impl Into<Option<Selector>>) -> Self {
        Modifier::Simple {
            repr,
            selector: selector.into(),
        }
    }

    /// Resets a single style
    pub fn clear_repr(repr: ReprType) -> Self {
        Self::simple(repr, None)
    }

    pub fn ribbon(selector: impl Into<Selector>) -> Self {
        Self::simple(ReprType::Ribbon, Some(selector.into()))
    }

    pub fn stick(selector: impl Into<Selector>) -> Self {
        Self::simple(ReprType::Stick, Some(selector.into()))
    }

    pub fn line(selector: impl Into<Selector>) -> Self {
        Self::simple(ReprType::Line, Some(selector.into()))
    }

    pub fn sphere(selector: impl Into<Selector>) -> Self {
        Self::simple(ReprType::Sphere, Some(selector.into()))
    }

    pub fn sheet(selector: impl Into<Selector>) -> Self {
        Self::simple(ReprType::Sheet, Some(selector.into()))
    }

    pub fn helix(selector: impl Into<Selector>) -> Self {
        Self::simple(ReprType::Helix, Some(selector.into()))
    }

    pub fn background_color(color: impl Into<String>) -> Self {
        Modifier::BackgroundColor(color.into())
    }

    pub fn color(color: impl Into<String>, selector: impl Into<Selector>) -> Self {
        Modifier::Color {
            color: color.into(),
            selector: selector.into(),
        }
    }

    /// Flat composite of the given modifiers
    pub fn composite(modifiers: impl IntoIterator<Item = Modifier>) -> Self {
        Modifier::Composite(
            modifiers
                .into_iter()
                .flat_map(Modifier::into_children)
                .collect(),
        )
    }

    fn into_children(self) -> Vec<Modifier> {
        match self {
            Modifier::Composite(v) => v.into_iter().flat_map(Modifier::into_children).collect(),
            m => vec![m],
        }
    }

    /// Child modifiers in application order. Non-composites are their own only child.
    pub fn children(&self) -> &[Modifier] {
        match self {
            Modifier::Composite(v) => v.as_slice(),
            m => std::slice::from_ref(m),
        }
    }

    /// Mutates the representation of the embed.
    ///
    /// Failing modifiers don't touch the embed, except for composites
    /// whose children before the failing one stay applied. Use
    /// [`Embed::apply`] to get all-or-nothing behavior.
    pub fn apply_to_embed(&self, embed: &mut Embed) -> Result<(), EmbedError> {
        match self {
            Modifier::Clear => {
                for t in ReprType::CLEARED {
                    embed.clear_repr_entries(t.keyword());
                }
            }

            Modifier::Simple { repr, selector } => match selector {
                None => embed.clear_repr_entries(repr.keyword()),
                Some(sel) => {
                    embed.add_repr_entry(repr.keyword(), sel.selector_string())?;
                }
            },

            Modifier::BackgroundColor(color) => {
                embed.add_repr_entry(BGCOLOR_KEYWORD, checked_color(color)?)?;
            }

            Modifier::Color { color, selector } => {
                let color = checked_color(color)?;
                embed.add_repr_entry(
                    COLOR_KEYWORD,
                    format!("{color}:{}", selector.selector_string()),
                )?;
            }

            Modifier::ResidueSpectrum(spectrum) => {
                let entries = spectrum.color_entries(embed)?;
                debug!(
                    "spectrum over '{}' gives {} color entries",
                    spectrum.property(),
                    entries.len()
                );
                embed.add_repr_entry(COLOR_KEYWORD, entries)?;
            }

            Modifier::Composite(children) => {
                for m in children {
                    m.apply_to_embed(embed)?;
                }
            }
        }
        Ok(())
    }
}

/// Color has to be a single token: a hex value or a color name
fn checked_color(color: &str) -> Result<&str, EmbedError> {
    if !color.is_empty() && color.chars().all(|c| c.is_ascii_alphanumeric() || c == '#') {
        Ok(color)
    } else {
        Err(EmbedError::InvalidColor(color.to_owned()))
    }
}

impl Add for Modifier {
    type Output = Modifier;

    fn add(self, rhs: Modifier) -> Self::Output {
        let mut children = self.into_children();
        children.extend(rhs.into_children());
        Modifier::Composite(children)
    }
}

impl From<Vec<Modifier>> for Modifier {
    fn from(v: Vec<Modifier>) -> Self {
        Modifier::composite(v)
    }
}

//##############################
//#  Tests
//##############################
