use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod command_bundle;
mod command_html;
mod command_install;

use command_bundle::command_bundle;
use command_html::{command_html, command_repr};
use command_install::command_install;

/// Default location of the viewer sources
const SRC_DIR: &str = "GLmol/src/js";

/// GLmol embedding utility
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cmd {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Renders the viewer library from javascript sources
    Bundle {
        /// Included files, the bundled sources by default
        files: Vec<PathBuf>,
        /// Produce beautified output
        #[arg(short, long, conflicts_with = "compress")]
        beautify: bool,
        /// Produce compressed output
        #[arg(short, long)]
        compress: bool,
        /// Output file, printed to stdout if not given
        #[arg(short, long)]
        outfile: Option<PathBuf>,
        /// Directory with viewer sources
        #[arg(long, default_value = SRC_DIR)]
        src_dir: PathBuf,
    },

    /// Renders the viewer library and installs it into the profile static directory
    Install {
        /// Profile directory of the notebook host
        #[arg(short, long, required = true)]
        profile_dir: PathBuf,
        /// Directory with viewer sources
        #[arg(long, default_value = SRC_DIR)]
        src_dir: PathBuf,
    },

    /// Writes a standalone html page for the scene
    Html {
        /// Scene file
        #[arg(short, required = true)]
        scene: PathBuf,
        /// Output html file
        #[arg(short, default_value = "scene.html")]
        outfile: PathBuf,
        /// Directory with viewer sources
        #[arg(long, default_value = SRC_DIR)]
        src_dir: PathBuf,
        /// Already rendered library to inline instead of bundling the sources
        #[arg(long, conflicts_with = "src_dir")]
        lib: Option<PathBuf>,
    },

    /// Prints the representation script of the scene
    Repr {
        /// Scene file
        #[arg(short, required = true)]
        scene: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::builder()
        .format_timestamp(None)
        .format_indent(Some(8))
        .filter_level(log::LevelFilter::Info)
        .init();

    let cmd = Cmd::parse();

    // Greeting goes to stderr, stdout may carry the library or the script
    greeting();

    match &cmd.command {
        Commands::Bundle {
            files,
            beautify,
            compress,
            outfile,
            src_dir,
        } => {
            eprintln!("▶ Action: bundle",);
            command_bundle(files, *beautify, *compress, outfile.as_deref(), src_dir)?;
        }
        Commands::Install {
            profile_dir,
            src_dir,
        } => {
            eprintln!("▶ Action: install",);
            command_install(profile_dir, src_dir)?;
        }
        Commands::Html {
            scene,
            outfile,
            src_dir,
            lib,
        } => {
            eprintln!("▶ Action: html",);
            command_html(scene, outfile, src_dir, lib.as_deref())?;
        }
        Commands::Repr { scene } => {
            eprintln!("▶ Action: repr",);
            command_repr(scene)?;
        }
    }
    Ok(())
}

fn greeting() {
    use comfy_table::modifiers::UTF8_ROUND_CORNERS;
    use comfy_table::presets::UTF8_FULL;
    use comfy_table::{Attribute, Cell, Table};

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .add_row(vec![
            Cell::new("glmol - GLmol viewer embedding").add_attributes(vec![Attribute::Bold])
        ])
        .add_row(vec![format!(
            "{}\n{}",
            env!("CARGO_PKG_HOMEPAGE"),
            env!("CARGO_PKG_AUTHORS")
        )])
        .add_row(vec![format!("glmol_embed version: {}", glmol_embed::VERSION)])
        .add_row(vec![format!(
            "Utility: {}, Version: {}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        )]);
    eprintln!("{table}");
}
