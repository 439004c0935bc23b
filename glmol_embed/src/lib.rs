//! Representation language for embedding the GLmol viewer.
//!
//! A scene is an [`Embed`](embed::Embed): filtered PDB records plus
//! representation entries which are built by applying composable
//! [`Modifier`](modifier::Modifier)s. The scene is serialized into the
//! script understood by the viewer, a notebook display payload or a
//! standalone html page.

pub mod error;
pub mod selector;
mod script;
pub mod embed;
pub mod modifier;
pub mod spectrum;
pub mod secondary_structure;
pub mod pdb;
pub mod bundle;
pub mod render;
pub mod display;
pub mod config;

pub use script::{parse_script, ScriptError};

pub mod prelude {
    pub use crate::error::*;
    pub use crate::selector::*;
    pub use crate::script::{parse_script, ScriptError};
    pub use crate::embed::*;
    pub use crate::modifier::*;
    pub use crate::spectrum::*;
    pub use crate::secondary_structure::*;
    pub use crate::pdb::*;
    pub use crate::bundle::*;
    pub use crate::render::*;
    pub use crate::display::*;
    pub use crate::config::*;
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
