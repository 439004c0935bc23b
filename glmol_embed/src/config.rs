//! Scene files.
//!
//! A scene is a TOML document naming the structure, initial representation
//! entries, residue properties and an ordered list of modifiers:
//!
//! ```toml
//! pdb = "1sfc.pdb"
//! secondary_structure = "LLHHHHLLEEEL"
//! first_residue = 2
//! repr = [["line", "all; heavy"]]
//!
//! [properties.bfactor]
//! values = [0.1, 0.5, 0.9]
//!
//! [[modifiers]]
//! type = "spectrum"
//! property = "bfactor"
//! palette = "coolwarm"
//! ```

use crate::{
    display::structure_display,
    embed::{Embed, ResidueNumbering, ResidueProperty},
    error::{EmbedError, SelectorError},
    modifier::{Modifier, ReprType, ResidueSpectrum},
    pdb::{self, PdbError},
    selector::{Selector, SubSelector},
};
use log::{info, warn};
use serde::Deserialize;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    str::FromStr,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("can't read scene file '{0}'")]
    Io(PathBuf, #[source] std::io::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Embed(#[from] EmbedError),

    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error(transparent)]
    Pdb(#[from] PdbError),

    #[error("modifier '{0}' needs field '{1}'")]
    MissingField(String, &'static str),

    #[error("modifier '{0}' takes either '{1}' or '{2}', not both")]
    ConflictingFields(String, &'static str, &'static str),

    #[error("structure '{0}' can't be downloaded without the 'fetch' feature")]
    FetchDisabled(String),
}

//===============================
// Scene tables
//===============================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneConfig {
    /// Local pdb file, relative to the scene file
    pub pdb: Option<PathBuf>,
    /// RCSB id downloaded if no local file is given
    pub pdb_id: Option<String>,
    /// Per-residue labels, `H` helix, `E` sheet
    pub secondary_structure: Option<String>,
    pub numbering: Option<Vec<i32>>,
    pub first_residue: Option<i32>,
    #[serde(default)]
    pub repr: Vec<(String, String)>,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyConfig>,
    #[serde(default)]
    pub modifiers: Vec<ModifierConfig>,

    #[serde(skip)]
    base_dir: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyConfig {
    pub values: Vec<f64>,
    pub numbering: Option<Vec<i32>>,
    pub first_residue: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModifierConfig {
    #[serde(rename = "type")]
    pub kind: String,
    pub selector: Option<String>,
    pub color: Option<String>,
    pub property: Option<String>,
    pub palette: Option<String>,
    pub colors: Option<Vec<String>>,
    pub sub_selector: Option<String>,
    pub thresholds: Option<Vec<f64>>,
}

fn numbering_from(explicit: &Option<Vec<i32>>, first: Option<i32>) -> ResidueNumbering {
    match (explicit, first) {
        (Some(v), _) => ResidueNumbering::Explicit(v.clone()),
        (None, Some(first)) => ResidueNumbering::Sequential { first },
        (None, None) => ResidueNumbering::default(),
    }
}

impl PropertyConfig {
    pub fn to_property(&self) -> Result<ResidueProperty, EmbedError> {
        ResidueProperty::new(self.values.clone())
            .with_numbering(numbering_from(&self.numbering, self.first_residue))
    }
}

impl ModifierConfig {
    fn required<'a, T>(&self, v: &'a Option<T>, field: &'static str) -> Result<&'a T, ConfigError> {
        v.as_ref()
            .ok_or_else(|| ConfigError::MissingField(self.kind.clone(), field))
    }

    fn selector(&self) -> Result<Option<Selector>, ConfigError> {
        Ok(self
            .selector
            .as_deref()
            .map(str::parse::<Selector>)
            .transpose()?)
    }

    fn spectrum(&self) -> Result<ResidueSpectrum, ConfigError> {
        let mut s = ResidueSpectrum::new(self.required(&self.property, "property")?);
        if self.palette.is_some() && self.colors.is_some() {
            return Err(ConfigError::ConflictingFields(
                self.kind.clone(),
                "palette",
                "colors",
            ));
        }
        if let Some(palette) = &self.palette {
            s = s.with_palette(palette);
        }
        if let Some(colors) = &self.colors {
            s = s.with_colors(colors);
        }
        if let Some(sub) = &self.sub_selector {
            s = s.with_sub_selector(sub.parse::<SubSelector>()?);
        }
        if let Some(t) = &self.thresholds {
            s = s.with_threshold_list(t)?;
        }
        Ok(s)
    }
}

fn repr_type(kind: &str) -> Option<ReprType> {
    [
        ReprType::Ribbon,
        ReprType::Stick,
        ReprType::Line,
        ReprType::Sphere,
        ReprType::Sheet,
        ReprType::Helix,
    ]
    .into_iter()
    .find(|t| t.keyword() == kind)
}

impl TryFrom<&ModifierConfig> for Modifier {
    type Error = ConfigError;

    fn try_from(c: &ModifierConfig) -> Result<Self, Self::Error> {
        if let Some(repr) = repr_type(&c.kind) {
            // Without a selector the style is cleared
            return Ok(Modifier::simple(repr, c.selector()?));
        }
        match c.kind.as_str() {
            "clear" => Ok(Modifier::clear()),
            "bgcolor" => Ok(Modifier::background_color(c.required(&c.color, "color")?)),
            "color" => Ok(Modifier::color(
                c.required(&c.color, "color")?,
                c.selector()?.unwrap_or_default(),
            )),
            "spectrum" => Ok(c.spectrum()?.into()),
            _ => Err(EmbedError::InvalidModifier(c.kind.clone()).into()),
        }
    }
}

//===============================
// Loading
//===============================

/// Relative paths in a scene parsed from text are resolved against the current directory
impl FromStr for SceneConfig {
    type Err = ConfigError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(text)?)
    }
}

impl SceneConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_owned(), e))?;
        let mut conf = Self::from_str(&text)?;
        conf.base_dir = path.parent().map(Path::to_owned).unwrap_or_default();
        info!("Loaded scene '{}'", path.display());
        Ok(conf)
    }

    pub fn numbering(&self) -> ResidueNumbering {
        numbering_from(&self.numbering, self.first_residue)
    }

    pub fn modifiers(&self) -> Result<Vec<Modifier>, ConfigError> {
        self.modifiers.iter().map(Modifier::try_from).collect()
    }

    fn atom_data(&self) -> Result<String, ConfigError> {
        if let Some(p) = &self.pdb {
            return Ok(pdb::read_pdb_file(self.base_dir.join(p))?);
        }
        match &self.pdb_id {
            #[cfg(feature = "fetch")]
            Some(id) => Ok(pdb::fetch_pdb(id)?),
            #[cfg(not(feature = "fetch"))]
            Some(id) => Err(ConfigError::FetchDisabled(id.clone())),
            None => {
                warn!("scene has no structure, embedding empty atom data");
                Ok(String::new())
            }
        }
    }

    /// Loads the structure and builds the scene.
    /// Modifiers are applied in file order.
    pub fn build_embed(&self) -> Result<Embed, ConfigError> {
        let atom_data = self.atom_data()?;
        let repr = self.repr.iter().map(|(t, s)| (t.as_str(), s.as_str()));

        let mut embed = match &self.secondary_structure {
            Some(labels) => {
                let numbering = self.numbering();
                structure_display(atom_data, Some((labels.as_str(), &numbering)), repr)?
            }
            None => Embed::with_entries(atom_data, repr)?,
        };

        for (name, p) in &self.properties {
            embed.add_residue_property(name, p.to_property()?);
        }

        embed.apply_all(&self.modifiers()?)?;
        Ok(embed)
    }
}

//##############################
//#  Tests
//##############################
