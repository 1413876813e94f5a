//! Command implementations

pub mod absolutize;
pub mod args;
pub mod features;
pub mod probe;
pub mod translate;

use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::cli::IdentityArgs;
use quay::compilers::{compiler_for, Compiler, CompilerFamily, CompilerIdentity};
use quay::util::config::{
    global_toolchain_config_path, load_toolchain_config, project_toolchain_config_path,
};
use quay::util::process::find_d_compiler;

/// Build the compiler described by the command line and toolchain config.
///
/// Precedence: command-line flags (and `DC` for the executable), then the
/// project config, then the global config. Without a family the family is
/// guessed from the executable name, and without either the first D
/// compiler found in PATH is used.
pub fn resolve_compiler(args: &IdentityArgs) -> Result<Box<dyn Compiler>> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;
    let config = load_toolchain_config(
        global_toolchain_config_path().as_deref(),
        &project_toolchain_config_path(&cwd),
    );
    let settings = config.compiler;

    let mut exe = args.exe.clone().or(settings.exe);
    let family = match args.family.or(settings.family) {
        Some(family) => family,
        None => {
            if exe.is_none() {
                exe = find_d_compiler();
            }
            match exe.as_deref().and_then(family_from_exe) {
                Some(family) => family,
                None => bail!(
                    "could not determine the compiler family\n\
                     help: Pass --family, or set `family` in .quay/toolchain.toml"
                ),
            }
        }
    };

    let version = match args.compiler_version.clone().or(settings.version) {
        Some(version) => version,
        None => {
            tracing::debug!("no compiler version given, version-gated options are off");
            "0".to_string()
        }
    };

    let mut identity = CompilerIdentity::new(family, version);
    if let Some(arch) = args.arch.or(settings.arch) {
        identity = identity.with_arch(arch);
    }
    if let Some(host) = args.host.or(settings.host) {
        identity = identity.with_host(host);
    }

    let program = match exe {
        Some(exe) => exe.display().to_string(),
        None => family.default_exe().to_string(),
    };
    let mut exelist = vec![program];
    exelist.extend(settings.args);

    tracing::debug!("using {} ({})", identity, exelist.join(" "));
    Ok(compiler_for(identity, exelist))
}

/// Guess the family from an executable name such as `ldc2`,
/// `x86_64-linux-gnu-gdc` or `gdc-12`.
fn family_from_exe(exe: &Path) -> Option<CompilerFamily> {
    let stem = exe.file_stem()?.to_string_lossy().to_lowercase();
    if let Ok(family) = stem.parse() {
        return Some(family);
    }
    stem.rsplit('-')
        .chain(stem.split('-'))
        .find_map(|part| part.parse().ok())
}

/// Print an argument vector, space-separated or as a JSON array.
pub fn print_args(args: &[String], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(args)?);
    } else {
        println!("{}", args.join(" "));
    }
    Ok(())
}

/// Print one entry per line, or a JSON array.
pub fn print_list(items: &[String], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(items)?);
    } else {
        for item in items {
            println!("{}", item);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_from_exe() {
        assert_eq!(family_from_exe(Path::new("/usr/bin/ldc2")), Some(CompilerFamily::Ldc));
        assert_eq!(family_from_exe(Path::new("dmd.exe")), Some(CompilerFamily::Dmd));
        assert_eq!(
            family_from_exe(Path::new("x86_64-linux-gnu-gdc")),
            Some(CompilerFamily::Gdc)
        );
        assert_eq!(family_from_exe(Path::new("gdc-12")), Some(CompilerFamily::Gdc));
        assert_eq!(family_from_exe(Path::new("cc")), Some(CompilerFamily::Gnu));
        assert_eq!(family_from_exe(Path::new("tcc")), None);
    }
}
