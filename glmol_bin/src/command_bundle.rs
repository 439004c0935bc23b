use anyhow::{Context, Result};
use glmol_embed::prelude::*;
use log::info;
use std::path::{Path, PathBuf};

pub(super) fn command_bundle(
    files: &[PathBuf],
    beautify: bool,
    compress: bool,
    outfile: Option<&Path>,
    src_dir: &Path,
) -> Result<()> {
    let targets = if files.is_empty() {
        default_sources(src_dir)
    } else {
        files.to_vec()
    };

    let filter = match (beautify, compress) {
        (true, _) => Some(JsFilter::Beautify),
        (_, true) => Some(JsFilter::Compress),
        _ => None,
    };

    for t in &targets {
        info!("\t{}", t.display());
    }
    let lib = render_js(&targets, filter.as_ref()).with_context(|| "can't render viewer library")?;

    match outfile {
        Some(out) => {
            info!("Writing library to '{}'...", out.display());
            std::fs::write(out, lib.as_str())
                .with_context(|| format!("can't write '{}'", out.display()))?;
        }
        None => print!("{lib}"),
    }
    Ok(())
}
