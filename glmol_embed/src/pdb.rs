use log::{info, warn};
use regex::Regex;
use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};
use thiserror::Error;

/// Record types passed to the viewer, everything else is dropped
pub const KEPT_RECORDS: [&str; 4] = ["ATOM", "TER", "HELIX", "SHEET"];

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("can't read pdb file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("'{0}' is not a valid PDB id")]
    InvalidId(String),

    #[cfg(feature = "fetch")]
    #[error("can't download structure '{0}'")]
    Fetch(String, #[source] ureq::Error),
}

/// Keeps only `ATOM`, `TER`, `HELIX` and `SHEET` lines.
/// Columns are not interpreted.
pub fn filter_records(text: &str) -> String {
    let lines: Vec<&str> = text
        .lines()
        .filter(|l| KEPT_RECORDS.iter().any(|r| l.starts_with(r)))
        .collect();
    if !lines.iter().any(|l| l.starts_with("ATOM")) {
        warn!("no ATOM records in pdb data");
    }
    lines.join("\n")
}

/// Reads a local pdb file and filters its records
pub fn read_pdb_file(path: impl AsRef<Path>) -> Result<String, PdbError> {
    let path = path.as_ref();
    let text =
        std::fs::read_to_string(path).map_err(|e| PdbError::Read(path.to_owned(), e))?;
    info!("Loaded pdb file '{}'", path.display());
    Ok(filter_records(&text))
}

static PDB_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9][A-Za-z0-9]{3}$").unwrap());

pub fn validate_pdb_id(id: &str) -> Result<(), PdbError> {
    if PDB_ID.is_match(id) {
        Ok(())
    } else {
        Err(PdbError::InvalidId(id.to_owned()))
    }
}

/// Download location of the structure in PDB format
pub fn rcsb_url(id: &str) -> String {
    format!("https://files.rcsb.org/download/{}.pdb", id.to_uppercase())
}

/// Downloads the structure from RCSB and filters its records
#[cfg(feature = "fetch")]
pub fn fetch_pdb(id: &str) -> Result<String, PdbError> {
    validate_pdb_id(id)?;
    let url = rcsb_url(id);
    info!("Downloading {} from RCSB...", id.to_uppercase());
    let text = ureq::get(&url)
        .call()
        .and_then(|r| r.into_body().read_to_string())
        .map_err(|e| PdbError::Fetch(id.to_owned(), e))?;
    Ok(filter_records(&text))
}

//##############################
//#  Tests
//##############################
