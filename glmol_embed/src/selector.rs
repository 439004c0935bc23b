use crate::error::SelectorError;
use itertools::Itertools;
use std::{fmt::Display, ops::Add, str::FromStr};

//##############################
//#  Selector kinds
//##############################

/// Kind of the base atom-set query understood by the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorKind {
    All,
    Chain,
    ChainNumber,
    Residue,
    ResidueNumber,
    Atom,
}

impl SelectorKind {
    /// Keyword used for this kind in the representation script
    pub fn keyword(&self) -> &'static str {
        match self {
            SelectorKind::All => "all",
            SelectorKind::Chain => "chain",
            SelectorKind::ChainNumber => "chain_number",
            SelectorKind::Residue => "resi",
            SelectorKind::ResidueNumber => "residue_number",
            SelectorKind::Atom => "atomi",
        }
    }
}

/// Refinement applied after a base selector.
/// Sub-selectors have no identity of their own beyond the keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubSelector {
    Carbon,
    Heavyatom,
    Backbone,
}

impl SubSelector {
    pub fn keyword(&self) -> &'static str {
        match self {
            SubSelector::Carbon => "elem C",
            SubSelector::Heavyatom => "heavy",
            SubSelector::Backbone => "bb",
        }
    }
}

impl Display for SubSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

//##############################
//#  Selection values
//##############################

/// Value of a non-`all` selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionValue {
    /// Single identifier
    Single(String),
    /// Inclusive numeric range
    Range(i32, i32),
    /// Discrete set of identifiers
    Set(Vec<String>),
}

impl SelectionValue {
    pub fn single(v: impl ToString) -> Self {
        SelectionValue::Single(v.to_string())
    }

    pub fn set<T: ToString>(values: impl IntoIterator<Item = T>) -> Self {
        SelectionValue::Set(values.into_iter().map(|v| v.to_string()).collect())
    }

    /// Creates an inclusive range. Both bounds have to be present.
    pub fn range(
        start: impl Into<Option<i32>>,
        end: impl Into<Option<i32>>,
    ) -> Result<Self, SelectorError> {
        match (start.into(), end.into()) {
            (Some(b), Some(e)) => Ok(SelectionValue::Range(b, e)),
            (b, e) => Err(SelectorError::MissingRangeBound(b, e)),
        }
    }

    /// Creates a range from a list of bounds, which must contain exactly two values.
    pub fn range_from_slice(bounds: &[i32]) -> Result<Self, SelectorError> {
        match bounds {
            [b, e] => Ok(SelectionValue::Range(*b, *e)),
            _ => Err(SelectorError::RangeShape(bounds.len())),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            SelectionValue::Single(s) => s.is_empty(),
            SelectionValue::Range(..) => false,
            SelectionValue::Set(v) => v.is_empty() || v.iter().any(|s| s.is_empty()),
        }
    }

    /// Every identifier is a single script token
    fn is_well_formed(&self) -> bool {
        let token = |s: &String| s.chars().all(is_value_char);
        match self {
            SelectionValue::Single(s) => token(s),
            SelectionValue::Range(..) => true,
            SelectionValue::Set(v) => v.iter().all(token),
        }
    }
}

/// Characters allowed inside of a selection value.
/// Whitespace and the script separators `,` `;` `:` are not.
fn is_value_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, ',' | ';' | ':')
}

impl Display for SelectionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionValue::Single(s) => write!(f, "{s}"),
            SelectionValue::Range(b, e) => write!(f, "{b}-{e}"),
            SelectionValue::Set(v) => write!(f, "{}", v.iter().join(",")),
        }
    }
}

//##############################
//#  Selector
//##############################

/// Atom-set query with an ordered chain of sub-selectors.
///
/// Selectors are values: composing with a sub-selector via `+`
/// returns a new selector and leaves the original intact, so the same
/// selector may be reused across many modifiers.
///
/// ```
/// # use glmol_embed::prelude::*;
/// let base = Selector::residue_number_range(5, 10);
/// let sel = &base + SubSelector::Backbone + SubSelector::Carbon;
/// assert_eq!(sel.selector_string(), "residue_number 5-10; bb; elem C");
/// assert_eq!(base.selector_string(), "residue_number 5-10");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    kind: SelectorKind,
    value: Option<SelectionValue>,
    subselectors: Vec<SubSelector>,
}

impl Selector {
    /// Selects everything
    pub fn all() -> Self {
        Self {
            kind: SelectorKind::All,
            value: None,
            subselectors: vec![],
        }
    }

    /// Creates a validated selector of given kind.
    /// `All` takes no value, all other kinds need a non-empty one
    /// made of tokens without whitespace or script separators.
    pub fn new(
        kind: SelectorKind,
        value: impl Into<Option<SelectionValue>>,
    ) -> Result<Self, SelectorError> {
        let value = value.into();
        match (kind, &value) {
            (SelectorKind::All, None) => {}
            (SelectorKind::All, Some(_)) => return Err(SelectorError::ValueForAll),
            (k, None) => return Err(SelectorError::EmptySelection(k.keyword())),
            (k, Some(v)) if v.is_empty() => {
                return Err(SelectorError::EmptySelection(k.keyword()))
            }
            (k, Some(v)) if !v.is_well_formed() => {
                return Err(SelectorError::MalformedValue(k.keyword(), v.to_string()))
            }
            _ => {}
        }
        Ok(Self {
            kind,
            value,
            subselectors: vec![],
        })
    }

    pub fn chain(id: impl ToString) -> Result<Self, SelectorError> {
        Self::new(SelectorKind::Chain, SelectionValue::single(id))
    }

    pub fn chain_number(n: impl ToString) -> Result<Self, SelectorError> {
        Self::new(SelectorKind::ChainNumber, SelectionValue::single(n))
    }

    pub fn residue(id: impl ToString) -> Result<Self, SelectorError> {
        Self::new(SelectorKind::Residue, SelectionValue::single(id))
    }

    pub fn residue_number(n: impl ToString) -> Result<Self, SelectorError> {
        Self::new(SelectorKind::ResidueNumber, SelectionValue::single(n))
    }

    pub fn atom(index: impl ToString) -> Result<Self, SelectorError> {
        Self::new(SelectorKind::Atom, SelectionValue::single(index))
    }

    /// Inclusive residue number range. Ranges can't be empty, so this never fails.
    pub fn residue_number_range(start: i32, end: i32) -> Self {
        Self::range_of(SelectorKind::ResidueNumber, start, end)
    }

    /// Inclusive atom index range
    pub fn atom_range(start: i32, end: i32) -> Self {
        Self::range_of(SelectorKind::Atom, start, end)
    }

    /// Inclusive range of arbitrary kind. For `All` the range is ignored.
    pub fn range_of(kind: SelectorKind, start: i32, end: i32) -> Self {
        if kind == SelectorKind::All {
            return Self::all();
        }
        Self {
            kind,
            value: Some(SelectionValue::Range(start, end)),
            subselectors: vec![],
        }
    }

    pub fn kind(&self) -> SelectorKind {
        self.kind
    }

    pub fn value(&self) -> Option<&SelectionValue> {
        self.value.as_ref()
    }

    pub fn subselectors(&self) -> &[SubSelector] {
        &self.subselectors
    }

    /// Base part of the selector without sub-selectors
    pub fn base_string(&self) -> String {
        match &self.value {
            None => self.kind.keyword().to_owned(),
            Some(v) => format!("{} {v}", self.kind.keyword()),
        }
    }

    /// Full selection string: `base; sub1; sub2`
    pub fn selector_string(&self) -> String {
        std::iter::once(self.base_string())
            .chain(self.subselectors.iter().map(|s| s.keyword().to_owned()))
            .join("; ")
    }
}

impl Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.selector_string())
    }
}

impl Default for Selector {
    fn default() -> Self {
        Self::all()
    }
}

impl Add<SubSelector> for Selector {
    type Output = Selector;

    fn add(mut self, sub: SubSelector) -> Self::Output {
        self.subselectors.push(sub);
        self
    }
}

impl Add<SubSelector> for &Selector {
    type Output = Selector;

    fn add(self, sub: SubSelector) -> Self::Output {
        self.clone() + sub
    }
}

/// Bare sub-selector means "sub-selector applied to everything"
impl From<SubSelector> for Selector {
    fn from(sub: SubSelector) -> Self {
        Selector::all() + sub
    }
}

impl FromStr for SubSelector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::script::parse_sub_selector(s)
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::script::parse_selector(s)
    }
}

//##############################
//#  Tests
//##############################
