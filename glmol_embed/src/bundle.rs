//! Bundling of the GLmol viewer library.
//!
//! The viewer is shipped as several javascript sources which are
//! concatenated, optionally passed through an external minifier and wrapped
//! into a closure exporting `window.GLmol`.

use log::info;
use rustc_hash::{FxHashMap, FxHasher};
use std::{
    fmt::Display,
    hash::{Hash, Hasher},
    io::Write,
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
};
use thiserror::Error;

/// Sources of the viewer in concatenation order
pub const SOURCE_LIBRARY_NAMES: [&str; 3] = ["csscolorparser.js", "three.js", "GLmol.js"];

/// Install location relative to the profile directory
pub const INSTALL_DIR: &str = "static/glmol";
pub const INSTALL_NAME: &str = "GLmol.full.devel.js";

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("can't read library source '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("can't run js filter '{0}'")]
    Filter(String, #[source] std::io::Error),

    #[error("js filter '{0}' exited with {1}")]
    FilterStatus(String, ExitStatus),

    #[error("js filter output is not valid utf-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("can't install library into '{0}'")]
    Install(PathBuf, #[source] std::io::Error),
}

/// Default source paths inside `src_dir`
pub fn default_sources(src_dir: impl AsRef<Path>) -> Vec<PathBuf> {
    SOURCE_LIBRARY_NAMES
        .iter()
        .map(|n| src_dir.as_ref().join(n))
        .collect()
}

/// External filter the concatenated source is piped through
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JsFilter {
    Beautify,
    Compress,
    /// Arbitrary command reading source on stdin and writing it to stdout
    Custom(Vec<String>),
}

impl JsFilter {
    pub fn command(&self) -> Vec<String> {
        match self {
            Self::Beautify => vec!["uglifyjs".into(), "-b".into(), "indent-level=4".into()],
            Self::Compress => vec!["uglifyjs".into(), "-c".into()],
            Self::Custom(cmd) => cmd.clone(),
        }
    }

    fn run(&self, source: &str) -> Result<String, BundleError> {
        let cmd = self.command();
        let cmd_str = cmd.join(" ");
        let Some((prog, args)) = cmd.split_first() else {
            return Err(BundleError::Filter(
                cmd_str,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
            ));
        };

        info!("Running js filter '{cmd_str}'...");
        let mut child = Command::new(prog)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| BundleError::Filter(cmd_str.clone(), e))?;

        // Stdin is fed from a separate thread, otherwise a filter that
        // fills its stdout pipe before reading all input would block us
        let stdin = child.stdin.take();
        let output = std::thread::scope(|s| {
            s.spawn(move || match stdin {
                Some(mut stdin) => stdin.write_all(source.as_bytes()),
                None => Ok(()),
            });
            child.wait_with_output()
        })
        .map_err(|e| BundleError::Filter(cmd_str.clone(), e))?;

        if !output.status.success() {
            return Err(BundleError::FilterStatus(cmd_str, output.status));
        }
        Ok(String::from_utf8(output.stdout)?)
    }
}

/// Rendered viewer library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerLibrary(String);

impl ViewerLibrary {
    /// Wraps already rendered library text
    pub fn new(source: impl Into<String>) -> Self {
        Self(source.into())
    }

    /// Wraps raw javascript into the closure exporting `window.GLmol`
    pub fn wrap(source_js: &str) -> Self {
        Self(format!(
            "\n(function (window, undefined) {{\n\n{source_js}\n\nwindow.GLmol = GLmol;\n\n}}(window));\n"
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ViewerLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn read_sources(targets: &[PathBuf]) -> Result<String, BundleError> {
    let mut source = String::new();
    for t in targets {
        let s = std::fs::read_to_string(t).map_err(|e| BundleError::Read(t.clone(), e))?;
        source.push_str(&s);
    }
    Ok(source)
}

fn render_source(source: &str, filter: Option<&JsFilter>) -> Result<ViewerLibrary, BundleError> {
    match filter {
        Some(f) => Ok(ViewerLibrary::wrap(&f.run(source)?)),
        None => Ok(ViewerLibrary::wrap(source)),
    }
}

/// Concatenates `targets`, pipes them through `filter` if given and wraps the result
pub fn render_js(targets: &[PathBuf], filter: Option<&JsFilter>) -> Result<ViewerLibrary, BundleError> {
    info!("Rendering viewer library from {} sources", targets.len());
    render_source(&read_sources(targets)?, filter)
}

/// Memoized library renders keyed by source contents and filter.
/// Owned by the caller, nothing is cached globally.
#[derive(Debug, Default)]
pub struct LibraryCache {
    libs: FxHashMap<u64, ViewerLibrary>,
}

impl LibraryCache {
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns cached library or renders a new one.
    /// Sources are always re-read so edits on disk invalidate the entry.
    pub fn get_or_render(
        &mut self,
        targets: &[PathBuf],
        filter: Option<&JsFilter>,
    ) -> Result<&ViewerLibrary, BundleError> {
        let source = read_sources(targets)?;
        let mut hasher = FxHasher::default();
        source.hash(&mut hasher);
        filter.hash(&mut hasher);
        let key = hasher.finish();

        if !self.libs.contains_key(&key) {
            let lib = render_source(&source, filter)?;
            self.libs.insert(key, lib);
        }
        // Inserted above if it was missing
        Ok(&self.libs[&key])
    }

    pub fn len(&self) -> usize {
        self.libs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.libs.is_empty()
    }

    pub fn clear(&mut self) {
        self.libs.clear();
    }
}

/// Writes the library into `<profile_dir>/static/glmol/GLmol.full.devel.js`,
/// replacing the previously installed one.
/// Returns the script url relative to the profile static root.
pub fn install_library(profile_dir: impl AsRef<Path>, lib: &ViewerLibrary) -> Result<String, BundleError> {
    let base_dir = profile_dir.as_ref().join(INSTALL_DIR);
    if base_dir.exists() {
        info!("Removing existing glmol: {}", base_dir.display());
        std::fs::remove_dir_all(&base_dir).map_err(|e| BundleError::Install(base_dir.clone(), e))?;
    }
    std::fs::create_dir_all(&base_dir).map_err(|e| BundleError::Install(base_dir.clone(), e))?;

    let output_file = base_dir.join(INSTALL_NAME);
    info!("Writing glmol: {}", output_file.display());
    std::fs::write(&output_file, lib.as_str()).map_err(|e| BundleError::Install(output_file, e))?;

    Ok(format!("{INSTALL_DIR}/{INSTALL_NAME}"))
}

//##############################
//#  Tests
//##############################

#[cfg(test)]
mod tests {
    use super::*;

    /// Temporary directory removed when dropped
    struct ScratchDir(PathBuf);

    impl std::ops::Deref for ScratchDir {
        type Target = Path;
        fn deref(&self) -> &Path {
            &self.0
        }
    }

    impl AsRef<Path> for ScratchDir {
        fn as_ref(&self) -> &Path {
            &self.0
        }
    }

    impl Drop for ScratchDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    fn scratch_dir(name: &str) -> ScratchDir {
        let dir = std::env::temp_dir().join(format!("glmol_bundle_{name}_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        ScratchDir(dir)
    }

    #[test]
    fn scratch_dir_is_removed() {
        let dir = scratch_dir("drop");
        let path = dir.to_path_buf();
        std::fs::write(dir.join("a.js"), "").unwrap();
        drop(dir);
        assert!(!path.exists());
    }

    fn write_sources(dir: &Path) -> Vec<PathBuf> {
        for n in SOURCE_LIBRARY_NAMES {
            std::fs::write(dir.join(n), format!("// {n}\n")).unwrap();
        }
        default_sources(dir)
    }

    #[test]
    fn concatenates_in_order() {
        let dir = scratch_dir("concat");
        let lib = render_js(&write_sources(&dir), None).unwrap();
        let s = lib.as_str();
        let a = s.find("csscolorparser.js").unwrap();
        let b = s.find("three.js").unwrap();
        let c = s.find("GLmol.js").unwrap();
        assert!(a < b && b < c);
        assert!(s.starts_with("\n(function (window, undefined) {\n\n// csscolorparser.js\n"));
        assert!(s.ends_with("window.GLmol = GLmol;\n\n}(window));\n"));
    }

    #[test]
    fn missing_source() {
        let dir = scratch_dir("missing");
        let r = render_js(&[dir.join("nope.js")], None);
        assert!(matches!(r, Err(BundleError::Read(..))));
    }

    #[test]
    fn filter_commands() {
        assert_eq!(JsFilter::Beautify.command(), ["uglifyjs", "-b", "indent-level=4"]);
        assert_eq!(JsFilter::Compress.command(), ["uglifyjs", "-c"]);
    }

    #[test]
    fn pipe_through_filter() {
        let dir = scratch_dir("filter");
        let targets = write_sources(&dir);
        let filter = JsFilter::Custom(vec!["cat".into()]);
        let piped = render_js(&targets, Some(&filter)).unwrap();
        assert_eq!(piped, render_js(&targets, None).unwrap());

        let bad = JsFilter::Custom(vec!["false".into()]);
        assert!(matches!(
            render_js(&targets, Some(&bad)),
            Err(BundleError::FilterStatus(..))
        ));
    }

    #[test]
    fn cache_keys_on_contents() {
        let dir = scratch_dir("cache");
        let targets = write_sources(&dir);
        let mut cache = LibraryCache::new();
        cache.get_or_render(&targets, None).unwrap();
        cache.get_or_render(&targets, None).unwrap();
        assert_eq!(cache.len(), 1);

        std::fs::write(&targets[0], "// changed\n").unwrap();
        let lib = cache.get_or_render(&targets, None).unwrap();
        assert!(lib.as_str().contains("// changed"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn install_replaces_previous() {
        let dir = scratch_dir("install");
        let stale = dir.join(INSTALL_DIR).join("stale.js");
        std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
        std::fs::write(&stale, "old").unwrap();

        let url = install_library(&dir, &ViewerLibrary::wrap("var GLmol = 1;")).unwrap();
        assert_eq!(url, "static/glmol/GLmol.full.devel.js");
        assert!(!stale.exists());
        let written = std::fs::read_to_string(dir.join(&url)).unwrap();
        assert!(written.contains("var GLmol = 1;"));
    }
}
