use anyhow::{Context, Result};
use glmol_embed::prelude::*;
use log::info;
use std::path::Path;

fn load_scene(scene: &Path) -> Result<Embed> {
    let embed = SceneConfig::from_file(scene)?
        .build_embed()
        .with_context(|| format!("can't build scene '{}'", scene.display()))?;
    info!(
        "Scene has {} atom records and {} representation entries of {} types",
        embed.atom_data().lines().count(),
        embed.repr_entries().len(),
        embed.repr_entries().iter().count()
    );
    Ok(embed)
}

pub(super) fn command_html(
    scene: &Path,
    outfile: &Path,
    src_dir: &Path,
    lib: Option<&Path>,
) -> Result<()> {
    let embed = load_scene(scene)?;

    let lib = match lib {
        Some(f) => ViewerLibrary::new(
            std::fs::read_to_string(f)
                .with_context(|| format!("can't read library '{}'", f.display()))?,
        ),
        None => render_js(&default_sources(src_dir), None)?,
    };

    info!("Writing html page to '{}'...", outfile.display());
    std::fs::write(outfile, embed.dump_html(&lib)?)
        .with_context(|| format!("can't write '{}'", outfile.display()))?;
    Ok(())
}

pub(super) fn command_repr(scene: &Path) -> Result<()> {
    let embed = load_scene(scene)?;
    println!("{}", embed.repr_string());
    Ok(())
}
