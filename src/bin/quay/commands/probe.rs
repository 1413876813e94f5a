//! `quay probe` command

use anyhow::{anyhow, Context, Result};
use tempfile::TempDir;

use super::{print_list, resolve_compiler};
use crate::cli::{IdentityArgs, ProbeArgs, ProbeCommands};
use quay::compilers::{probe, Compiler, GnuLike};

pub fn execute(args: ProbeArgs) -> Result<()> {
    match args.command {
        ProbeCommands::Sanity { identity } => sanity(&identity),
        ProbeCommands::IncludeDirs {
            identity,
            lang,
            json,
        } => include_dirs(&identity, lang.as_deref(), json),
        ProbeCommands::SearchDirs {
            identity,
            name,
            json,
        } => search_dirs(&identity, &name, json),
    }
}

fn sanity(identity: &IdentityArgs) -> Result<()> {
    let compiler = resolve_compiler(identity)?;
    let work_dir = TempDir::new().context("failed to create probe directory")?;

    probe::sanity_check(compiler.as_ref(), work_dir.path())?;

    println!("{} ({}) works", compiler.name_string(), compiler.identity());
    Ok(())
}

fn gnu_like(compiler: &dyn Compiler) -> Result<&dyn GnuLike> {
    compiler.as_gnu_like().ok_or_else(|| {
        anyhow!(
            "{} does not have a GNU-style driver\n\
             help: This probe works with gcc and gdc only",
            compiler.identity()
        )
    })
}

fn include_dirs(identity: &IdentityArgs, lang: Option<&str>, json: bool) -> Result<()> {
    let compiler = resolve_compiler(identity)?;
    let driver = gnu_like(compiler.as_ref())?;

    let dirs = match lang {
        Some(lang) => probe::default_include_dirs(driver.exelist(), lang)?,
        None => driver.default_include_dirs()?,
    };

    print_list(&dirs, json)
}

fn search_dirs(identity: &IdentityArgs, name: &str, json: bool) -> Result<()> {
    let compiler = resolve_compiler(identity)?;
    let driver = gnu_like(compiler.as_ref())?;

    let dirs: Vec<String> = driver
        .compiler_dirs(name)?
        .iter()
        .map(|d| d.display().to_string())
        .collect();

    print_list(&dirs, json)
}
