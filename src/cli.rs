use clap::Parser;
use std::path::PathBuf;

/// Convert squeekboard layouts to LVGL-compatible C code.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub(crate) struct Cli {
    /// Layout to convert, as a YAML path relative to the layouts directory. Repeatable.
    #[arg(long = "input", value_name = "FILE")]
    pub inputs: Vec<String>,

    /// Display name for the layout. Needed once for every --input.
    #[arg(long = "name", value_name = "NAME")]
    pub names: Vec<String>,

    /// Additional key row at the top of the base layer
    #[arg(long, value_name = "ROW")]
    pub extra_top_row_base: Option<String>,

    /// Additional key row at the top of the upper layer
    #[arg(long, value_name = "ROW")]
    pub extra_top_row_upper: Option<String>,

    /// Caption for the Shift key [default: Shift]
    #[arg(long, value_name = "CAPTION")]
    pub shift_keycap: Option<String>,

    /// Insert left / right arrows before / after the space key
    #[arg(long)]
    pub surround_space_with_arrows: bool,

    /// Also generate scancode tables (US layout only)
    #[arg(long)]
    pub generate_scancodes: bool,

    /// Read layouts from a local squeekboard layouts directory instead of cloning
    #[arg(long, value_name = "DIR", conflicts_with = "repository")]
    pub layouts_dir: Option<PathBuf>,

    /// Repository to clone layouts from
    #[arg(long, value_name = "URL")]
    pub repository: Option<String>,

    /// Config file [default: <config dir>/sq2lv/config.yml if present]
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output directory for the generated files
    #[arg(long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}
