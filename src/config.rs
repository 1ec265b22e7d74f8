use crate::assembler::TransformOptions;
use crate::cli::Cli;
use crate::source::{DEFAULT_LAYOUTS_SUBDIR, DEFAULT_REPOSITORY};
use anyhow::{Context, Result, bail};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_SHIFT_KEYCAP: &str = "Shift";

/// A layout to convert: input path relative to the layouts root and display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct LayoutSpec {
    pub input: String,
    pub name: String,
}

/// Contents of the optional config file. Every field can be overridden from
/// the command line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    pub layouts: Vec<LayoutSpec>,
    pub extra_top_row_base: Option<String>,
    pub extra_top_row_upper: Option<String>,
    pub shift_keycap: Option<String>,
    pub surround_space_with_arrows: bool,
    pub generate_scancodes: bool,
    pub layouts_dir: Option<PathBuf>,
    pub repository_url: Option<String>,
    pub layouts_subdir: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SourceLocation {
    Directory(PathBuf),
    Repository { url: String, layouts_subdir: PathBuf },
}

/// Fully resolved options for one run
#[derive(Debug, Clone)]
pub(crate) struct Options {
    pub layouts: Vec<LayoutSpec>,
    pub transform: TransformOptions,
    pub shift_keycap: String,
    pub source: SourceLocation,
    pub output: PathBuf,
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sq2lv").join("config.yml"))
}

pub(crate) fn load_config(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Could not read config file {}", path.display()))?;
    let config = if path.extension().is_some_and(|ext| ext == "toml") {
        toml::from_str(&content)
            .with_context(|| format!("Could not parse config file {}", path.display()))?
    } else {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Could not parse config file {}", path.display()))?
    };
    Ok(config)
}

fn non_empty(row: Option<String>) -> Option<String> {
    row.filter(|row| !row.trim().is_empty())
}

/// Merge command-line arguments over the config file into run options.
pub(crate) fn resolve(cli: Cli, config: Config) -> Result<Options> {
    if cli.inputs.len() != cli.names.len() {
        bail!(
            "--input was given {} times but --name {} times",
            cli.inputs.len(),
            cli.names.len()
        );
    }
    let layouts = if cli.inputs.is_empty() {
        config.layouts
    } else {
        cli.inputs
            .into_iter()
            .zip(cli.names)
            .map(|(input, name)| LayoutSpec { input, name })
            .collect()
    };
    if layouts.is_empty() {
        bail!("No layouts given, use --input and --name");
    }

    let output = match cli.output.or(config.output) {
        Some(output) if output.is_dir() => output,
        _ => bail!("Error: no valid output directory specified"),
    };

    let source = match cli.layouts_dir {
        Some(dir) => SourceLocation::Directory(dir),
        None => match (cli.repository, config.layouts_dir) {
            (None, Some(dir)) => SourceLocation::Directory(dir),
            (url, _) => SourceLocation::Repository {
                url: url
                    .or(config.repository_url)
                    .unwrap_or_else(|| DEFAULT_REPOSITORY.to_owned()),
                layouts_subdir: config
                    .layouts_subdir
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_LAYOUTS_SUBDIR)),
            },
        },
    };

    let transform = TransformOptions {
        extra_top_row_base: non_empty(cli.extra_top_row_base.or(config.extra_top_row_base)),
        extra_top_row_upper: non_empty(cli.extra_top_row_upper.or(config.extra_top_row_upper)),
        arrows_around_space: cli.surround_space_with_arrows || config.surround_space_with_arrows,
        scancodes: cli.generate_scancodes || config.generate_scancodes,
    };

    let shift_keycap = cli
        .shift_keycap
        .or(config.shift_keycap)
        .filter(|caption| !caption.is_empty())
        .unwrap_or_else(|| DEFAULT_SHIFT_KEYCAP.to_owned());

    Ok(Options {
        layouts,
        transform,
        shift_keycap,
        source,
        output,
    })
}

/// Resolve run options from the command line and, if present, the config file.
pub(crate) fn config(cli: Cli) -> Result<Options> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => match default_config_path().filter(|path| path.is_file()) {
            Some(path) => load_config(&path)?,
            None => Config::default(),
        },
    };

    let options = resolve(cli, config)?;
    debug!("Options: {:#?}", options);

    Ok(options)
}
