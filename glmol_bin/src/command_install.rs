use anyhow::{Context, Result};
use glmol_embed::prelude::*;
use log::info;
use std::path::Path;

pub(super) fn command_install(profile_dir: &Path, src_dir: &Path) -> Result<()> {
    let lib = render_js(&default_sources(src_dir), None)
        .with_context(|| format!("can't render viewer library from '{}'", src_dir.display()))?;
    let url = install_library(profile_dir, &lib)?;
    info!("Library script url: {url}");
    Ok(())
}
