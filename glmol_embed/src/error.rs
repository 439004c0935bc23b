use thiserror::Error;

use crate::{script::ScriptError, spectrum::SpectrumError};
//############################################################
//#  Error enums
//############################################################

/// Error related to construction and rendering of selectors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SelectorError {
    #[error("range selection needs both bounds, got start={0:?} end={1:?}")]
    MissingRangeBound(Option<i32>, Option<i32>),

    #[error("range selection needs exactly two bounds, got {0} values")]
    RangeShape(usize),

    #[error("selection for '{0}' is empty")]
    EmptySelection(&'static str),

    #[error("selection value '{1}' for '{0}' contains whitespace or separator characters")]
    MalformedValue(&'static str, String),

    #[error("'all' selector doesn't take a selection value")]
    ValueForAll,

    #[error("can't parse selector '{0}': {1}")]
    Syntax(String, String),
}

/// Error produced while applying modifiers to an embed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EmbedError {
    #[error(transparent)]
    InvalidSelection(#[from] SelectorError),

    #[error("unable to load residue property '{name}', available properties: {available:?}")]
    MissingProperty {
        name: String,
        available: Vec<String>,
    },

    #[error("'{0}' is not a valid color value")]
    InvalidColor(String),

    #[error("invalid representation entry '{0}:{1}'")]
    InvalidEntry(String, String),

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error("'{0}' is not a representation modifier")]
    InvalidModifier(String),

    #[error("thresholds must be a (min, max) pair with min <= max, got {0:?}")]
    InvalidThresholds(Vec<f64>),

    #[error("residue numbering has {numbers} entries for {values} values")]
    NumberingMismatch { numbers: usize, values: usize },

    #[error("sequential numbering from {first} overflows for {values} values")]
    NumberingOverflow { first: i32, values: usize },

    #[error(transparent)]
    Spectrum(#[from] SpectrumError),
}
