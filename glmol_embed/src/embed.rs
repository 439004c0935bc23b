use crate::{
    error::EmbedError,
    modifier::Modifier,
    pdb,
    script::parse_script,
};
use log::debug;
use rustc_hash::FxHashMap;

//===============================
// Selection payload
//===============================

/// Payload appended to a representation entry.
/// Normalizes scalar and plural inputs coming from different call sites.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    Single(String),
    Many(Vec<String>),
    #[default]
    Empty,
}

impl From<&str> for Selection {
    fn from(s: &str) -> Self {
        s.to_owned().into()
    }
}

impl From<String> for Selection {
    fn from(s: String) -> Self {
        if s.is_empty() {
            Selection::Empty
        } else {
            Selection::Single(s)
        }
    }
}

impl From<&String> for Selection {
    fn from(s: &String) -> Self {
        s.as_str().into()
    }
}

impl From<Vec<String>> for Selection {
    fn from(v: Vec<String>) -> Self {
        if v.is_empty() {
            Selection::Empty
        } else {
            Selection::Many(v)
        }
    }
}

impl From<Vec<&str>> for Selection {
    fn from(v: Vec<&str>) -> Self {
        v.into_iter().map(str::to_owned).collect::<Vec<_>>().into()
    }
}

impl<T: Into<Selection>> From<Option<T>> for Selection {
    fn from(v: Option<T>) -> Self {
        v.map_or(Selection::Empty, Into::into)
    }
}

//===============================
// Ordered representation entries
//===============================

/// Ordered multimap from representation type to selection strings.
/// Key insertion order defines layering in the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReprEntries {
    entries: Vec<(String, Vec<String>)>,
}

impl ReprEntries {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn get(&self, repr_type: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(t, _)| t == repr_type)
            .map(|(_, v)| v.as_slice())
    }

    fn get_or_insert(&mut self, repr_type: &str) -> &mut Vec<String> {
        let pos = match self.entries.iter().position(|(t, _)| t == repr_type) {
            Some(i) => i,
            None => {
                self.entries.push((repr_type.to_owned(), vec![]));
                self.entries.len() - 1
            }
        };
        &mut self.entries[pos].1
    }

    /// Appends selections. The type has to be a keyword and every
    /// selection a single script line, otherwise nothing is appended.
    pub(crate) fn push(&mut self, repr_type: &str, selection: Selection) -> Result<(), EmbedError> {
        let keyword = !repr_type.is_empty()
            && repr_type.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        let invalid = |s: &String| !keyword || s.contains(['\n', '\r']);
        let bad = match &selection {
            Selection::Single(s) => invalid(s).then(|| s.clone()),
            Selection::Many(v) => v.iter().find(|s| invalid(s)).cloned(),
            Selection::Empty => None,
        };
        if let Some(s) = bad {
            return Err(EmbedError::InvalidEntry(repr_type.to_owned(), s));
        }

        match selection {
            Selection::Single(s) => self.get_or_insert(repr_type).push(s),
            Selection::Many(v) => self.get_or_insert(repr_type).extend(v),
            Selection::Empty => {}
        }
        Ok(())
    }

    /// Resets the type to an empty list. The key keeps its position.
    pub(crate) fn clear(&mut self, repr_type: &str) {
        self.get_or_insert(repr_type).clear();
    }

    /// Non-empty `(type, selections)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(t, v)| (t.as_str(), v.as_slice()))
    }

    /// Total number of selection strings
    pub fn len(&self) -> usize {
        self.entries.iter().map(|(_, v)| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//===============================
// Residue properties
//===============================

/// Maps residue positions to residue identifiers used in selections
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResidueNumbering {
    /// Contiguous numbering starting from `first`
    Sequential { first: i32 },
    /// Explicit identifier for every position, e.g. PDB author numbering
    Explicit(Vec<i32>),
}

impl Default for ResidueNumbering {
    fn default() -> Self {
        ResidueNumbering::Sequential { first: 1 }
    }
}

impl ResidueNumbering {
    /// Residue identifier for the 0-based position
    pub fn number(&self, index: usize) -> Option<i32> {
        match self {
            ResidueNumbering::Sequential { first } => {
                i32::try_from(index).ok().and_then(|i| first.checked_add(i))
            }
            ResidueNumbering::Explicit(v) => v.get(index).copied(),
        }
    }

    /// Number of positions covered, `None` if unbounded
    pub fn len(&self) -> Option<usize> {
        match self {
            ResidueNumbering::Sequential { .. } => None,
            ResidueNumbering::Explicit(v) => Some(v.len()),
        }
    }
}

/// Per-residue numeric property together with residue identities
#[derive(Debug, Clone, PartialEq)]
pub struct ResidueProperty {
    values: Vec<f64>,
    numbering: ResidueNumbering,
}

impl ResidueProperty {
    /// Property for residues numbered from 1
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            numbering: Default::default(),
        }
    }

    /// Sets residue identities. Every value has to get a number.
    pub fn with_numbering(mut self, numbering: ResidueNumbering) -> Result<Self, EmbedError> {
        let values = self.values.len();
        match numbering {
            ResidueNumbering::Explicit(ref v) if v.len() != values => {
                return Err(EmbedError::NumberingMismatch {
                    numbers: v.len(),
                    values,
                });
            }
            ResidueNumbering::Sequential { first }
                if values > 0 && numbering.number(values - 1).is_none() =>
            {
                return Err(EmbedError::NumberingOverflow { first, values });
            }
            _ => {}
        }
        self.numbering = numbering;
        Ok(self)
    }

    /// Property from explicit `(residue number, value)` pairs
    pub fn from_pairs(pairs: impl IntoIterator<Item = (i32, f64)>) -> Self {
        let (numbers, values): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();
        Self {
            values,
            numbering: ResidueNumbering::Explicit(numbers),
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn numbering(&self) -> &ResidueNumbering {
        &self.numbering
    }

    /// Residue identifiers in the same order as values
    pub fn residue_numbers(&self) -> impl Iterator<Item = i32> + '_ {
        (0..self.values.len()).map_while(|i| self.numbering.number(i))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

//===============================
// Embed
//===============================

/// One molecule with its representation.
///
/// The embed is created from atom data and optional initial entries,
/// then changed only by applying [modifiers](Modifier) or by
/// [`add_repr_entry`](Embed::add_repr_entry).
///
/// ```
/// # use glmol_embed::prelude::*;
/// let mut embed = Embed::new("ATOM ...");
/// embed
///     .apply(&Modifier::ribbon(Selector::all()))?
///     .apply(&Modifier::helix(Selector::residue_number_range(5, 10)))?;
/// assert_eq!(embed.repr_string(), "ribbon:all\nhelix:residue_number 5-10");
/// # Ok::<(), EmbedError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Embed {
    atom_data: String,
    repr_entries: ReprEntries,
    residue_properties: FxHashMap<String, ResidueProperty>,
}

impl Embed {
    pub fn new(atom_data: impl Into<String>) -> Self {
        Self {
            atom_data: atom_data.into(),
            ..Default::default()
        }
    }

    /// Creates an embed with initial representation entries
    pub fn with_entries<K, S>(
        atom_data: impl Into<String>,
        entries: impl IntoIterator<Item = (K, S)>,
    ) -> Result<Self, EmbedError>
    where
        K: AsRef<str>,
        S: Into<Selection>,
    {
        let mut embed = Self::new(atom_data);
        for (t, s) in entries {
            embed.add_repr_entry(t.as_ref(), s)?;
        }
        Ok(embed)
    }

    /// Creates an embed from raw PDB text keeping only the records the viewer needs
    pub fn from_pdb_text(text: &str) -> Self {
        Self::new(pdb::filter_records(text))
    }

    /// Creates an embed with entries loaded from a representation script
    pub fn from_repr_script(
        atom_data: impl Into<String>,
        script: &str,
    ) -> Result<Self, EmbedError> {
        Self::with_entries(atom_data, parse_script(script)?)
    }

    pub fn atom_data(&self) -> &str {
        &self.atom_data
    }

    pub fn repr_entries(&self) -> &ReprEntries {
        &self.repr_entries
    }

    /// Appends a single selection or extends with many. Empty input is a no-op.
    /// Fails if the type is not a keyword or a selection spans several lines.
    pub fn add_repr_entry(
        &mut self,
        repr_type: &str,
        selection: impl Into<Selection>,
    ) -> Result<&mut Self, EmbedError> {
        self.repr_entries.push(repr_type, selection.into())?;
        Ok(self)
    }

    pub(crate) fn clear_repr_entries(&mut self, repr_type: &str) {
        self.repr_entries.clear(repr_type);
    }

    /// Representation script consumed by the viewer: one `type:selection` per line
    pub fn repr_string(&self) -> String {
        let mut lines = vec![];
        for (t, selections) in self.repr_entries.iter() {
            for s in selections {
                lines.push(format!("{t}:{s}"));
            }
        }
        lines.join("\n")
    }

    //---------------------------
    // Residue properties
    //---------------------------

    pub fn add_residue_property(&mut self, name: impl Into<String>, prop: ResidueProperty) {
        let _ = self.residue_properties.insert(name.into(), prop);
    }

    pub fn with_residue_property(mut self, name: impl Into<String>, prop: ResidueProperty) -> Self {
        self.add_residue_property(name, prop);
        self
    }

    pub fn residue_property(&self, name: &str) -> Option<&ResidueProperty> {
        self.residue_properties.get(name)
    }

    /// Names of available residue properties, sorted
    pub fn residue_property_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.residue_properties.keys().cloned().collect();
        names.sort();
        names
    }

    //---------------------------
    // Modifier application
    //---------------------------

    /// Applies the modifier in place.
    /// If it fails the representation is left as it was before the call.
    pub fn apply(&mut self, modifier: &Modifier) -> Result<&mut Self, EmbedError> {
        debug!("applying {modifier:?}");
        let saved = self.repr_entries.clone();
        if let Err(e) = modifier.apply_to_embed(self) {
            self.repr_entries = saved;
            return Err(e);
        }
        Ok(self)
    }

    /// Applies modifiers in sequence. Stops at the first failure,
    /// leaving the modifiers applied before it in place.
    pub fn apply_all<'a>(
        &mut self,
        modifiers: impl IntoIterator<Item = &'a Modifier>,
    ) -> Result<&mut Self, EmbedError> {
        for m in modifiers {
            self.apply(m)?;
        }
        Ok(self)
    }

    /// Returns a modified copy leaving `self` untouched
    pub fn with_modifier(&self, modifier: &Modifier) -> Result<Self, EmbedError> {
        let mut embed = self.clone();
        embed.apply(modifier)?;
        Ok(embed)
    }
}

//##############################
//#  Tests
//##############################
