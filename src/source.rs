use anyhow::{Context, Result, bail};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

pub(crate) const DEFAULT_REPOSITORY: &str = "https://gitlab.gnome.org/World/Phosh/squeekboard.git";
pub(crate) const DEFAULT_LAYOUTS_SUBDIR: &str = "data/keyboards";

/// Provides raw layout definitions by their path relative to the layouts root
pub(crate) trait LayoutSource {
    fn read(&self, rel_path: &str) -> Result<String>;
}

pub(crate) struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl LayoutSource for DirectorySource {
    fn read(&self, rel_path: &str) -> Result<String> {
        let path = self.root.join(rel_path);
        if !path.is_file() {
            bail!("could not find input file {}", path.display());
        }
        fs::read_to_string(&path).with_context(|| format!("could not read {}", path.display()))
    }
}

/// Shallow checkout of a layout repository, removed again when dropped
pub(crate) struct GitSource {
    _checkout: TempDir,
    layouts: DirectorySource,
}

impl GitSource {
    pub fn checkout(url: &str, layouts_subdir: &Path) -> Result<Self> {
        let checkout = tempfile::tempdir()?;
        info!("Cloning {url}");

        let status = Command::new("git")
            .args(["clone", "--quiet", "--depth", "1", url])
            .arg(checkout.path())
            .status()
            .context("Failed to run git")?;
        if !status.success() {
            bail!("git clone of {url} failed ({status})");
        }

        let layouts = DirectorySource::new(checkout.path().join(layouts_subdir));
        Ok(Self {
            _checkout: checkout,
            layouts,
        })
    }
}

impl LayoutSource for GitSource {
    fn read(&self, rel_path: &str) -> Result<String> {
        self.layouts.read(rel_path)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    /// In-memory source for tests
    pub(crate) struct MemorySource(pub HashMap<String, String>);

    impl LayoutSource for MemorySource {
        fn read(&self, rel_path: &str) -> Result<String> {
            match self.0.get(rel_path) {
                Some(content) => Ok(content.clone()),
                None => bail!("could not find input file {rel_path}"),
            }
        }
    }

    #[test]
    fn test_directory_source_reads_nested_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("terminal")).unwrap();
        fs::write(dir.path().join("terminal/us.yaml"), "views: {}\n").unwrap();

        let source = DirectorySource::new(dir.path());
        assert_eq!(source.read("terminal/us.yaml").unwrap(), "views: {}\n");
    }

    #[test]
    fn test_directory_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectorySource::new(dir.path());

        let err = source.read("us.yaml").unwrap_err();
        assert!(err.to_string().contains("could not find input file"));
    }
}
