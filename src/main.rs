mod assembler;
mod attributes;
mod cli;
mod config;
mod emit;
mod keys;
mod layout;
mod scancodes;
mod source;
mod view;

use crate::{
    cli::Cli,
    config::{SourceLocation, config},
    source::{DirectorySource, GitSource, LayoutSource},
};
use anyhow::Result;
use clap::Parser;
use env_logger::Env;

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let options = config(Cli::parse())?;

    let source: Box<dyn LayoutSource> = match &options.source {
        SourceLocation::Directory(dir) => Box::new(DirectorySource::new(dir)),
        SourceLocation::Repository { url, layouts_subdir } => {
            Box::new(GitSource::checkout(url, layouts_subdir)?)
        }
    };

    let run = assembler::run(source.as_ref(), &options.layouts, &options.transform)?;
    emit::write_files(&options.output, &run, &options.shift_keycap)?;

    Ok(())
}
