//! Toolchain configuration files.
//!
//! Two locations are read:
//! - Global: `~/.quay/toolchain.toml` - user-wide defaults
//! - Project: `.quay/toolchain.toml` - project-specific overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::compilers::{CompilerFamily, HostPlatform, TargetArch};

/// Toolchain configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Compiler settings
    pub compiler: CompilerSettings,
}

/// Settings describing the D (or C) compiler to generate arguments for.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerSettings {
    /// Compiler executable (e.g., /usr/bin/ldc2)
    pub exe: Option<PathBuf>,

    /// Compiler family (gcc, gdc, ldc, dmd)
    pub family: Option<CompilerFamily>,

    /// Compiler version (e.g., 1.30.0)
    pub version: Option<String>,

    /// Target architecture
    pub arch: Option<TargetArch>,

    /// Host platform the compiler runs on
    pub host: Option<HostPlatform>,

    /// Fixed arguments passed after the executable on every invocation
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolchainConfig {
    /// Load toolchain configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read toolchain config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse toolchain config: {}", path.display()))
    }

    /// Load toolchain configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!(
                    "Failed to load toolchain config from {}: {:#}",
                    path.display(),
                    e
                );
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Check if any compiler settings are configured.
    pub fn has_overrides(&self) -> bool {
        let c = &self.compiler;
        c.exe.is_some()
            || c.family.is_some()
            || c.version.is_some()
            || c.arch.is_some()
            || c.host.is_some()
            || !c.args.is_empty()
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: ToolchainConfig) {
        let other = other.compiler;
        if other.exe.is_some() {
            self.compiler.exe = other.exe;
        }
        if other.family.is_some() {
            self.compiler.family = other.family;
        }
        if other.version.is_some() {
            self.compiler.version = other.version;
        }
        if other.arch.is_some() {
            self.compiler.arch = other.arch;
        }
        if other.host.is_some() {
            self.compiler.host = other.host;
        }
        if !other.args.is_empty() {
            self.compiler.args = other.args;
        }
    }
}

/// Load merged toolchain configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.quay/toolchain.toml)
/// 2. Global config (~/.quay/toolchain.toml)
/// 3. Defaults
pub fn load_toolchain_config(global_path: Option<&Path>, project_path: &Path) -> ToolchainConfig {
    let mut config = ToolchainConfig::default();

    if let Some(global_path) = global_path {
        config.merge(ToolchainConfig::load_or_default(global_path));
    }

    config.merge(ToolchainConfig::load_or_default(project_path));

    config
}

/// Get the global quay config directory (~/.quay).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".quay"))
}

/// Get the global toolchain config path (~/.quay/toolchain.toml).
pub fn global_toolchain_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("toolchain.toml"))
}

/// Get the project toolchain config path (.quay/toolchain.toml).
pub fn project_toolchain_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".quay").join("toolchain.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_toolchain_config_default() {
        let config = ToolchainConfig::default();
        assert!(config.compiler.exe.is_none());
        assert!(config.compiler.family.is_none());
        assert!(config.compiler.args.is_empty());
        assert!(!config.has_overrides());
    }

    #[test]
    fn test_toolchain_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("toolchain.toml");

        std::fs::write(
            &config_path,
            r#"
[compiler]
exe = "/usr/bin/ldc2"
family = "ldc"
version = "1.30.0"
arch = "x86_64"
host = "windows"
args = ["-mtriple=x86_64-windows-msvc"]
"#,
        )
        .unwrap();

        let config = ToolchainConfig::load(&config_path).unwrap();
        assert_eq!(config.compiler.exe, Some(PathBuf::from("/usr/bin/ldc2")));
        assert_eq!(config.compiler.family, Some(CompilerFamily::Ldc));
        assert_eq!(config.compiler.version.as_deref(), Some("1.30.0"));
        assert_eq!(config.compiler.arch, Some(TargetArch::X86_64));
        assert_eq!(config.compiler.host, Some(HostPlatform::Windows));
        assert_eq!(config.compiler.args, vec!["-mtriple=x86_64-windows-msvc"]);
        assert!(config.has_overrides());
    }

    #[test]
    fn test_family_aliases_in_config() {
        let config: ToolchainConfig = toml::from_str("[compiler]\nfamily = \"ldc2\"\n").unwrap();
        assert_eq!(config.compiler.family, Some(CompilerFamily::Ldc));
    }

    #[test]
    fn test_invalid_config_falls_back_to_default() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("toolchain.toml");
        std::fs::write(&config_path, "[compiler]\nfamily = \"msvc\"\n").unwrap();

        assert!(ToolchainConfig::load(&config_path).is_err());
        assert!(!ToolchainConfig::load_or_default(&config_path).has_overrides());
    }

    #[test]
    fn test_toolchain_config_merge() {
        let mut base = ToolchainConfig::default();
        base.compiler.exe = Some(PathBuf::from("/usr/bin/dmd"));
        base.compiler.version = Some("2.100.0".to_string());
        base.compiler.args = vec!["-m64".to_string()];

        let mut override_cfg = ToolchainConfig::default();
        override_cfg.compiler.exe = Some(PathBuf::from("/opt/ldc/bin/ldc2"));
        override_cfg.compiler.args = vec!["-mcpu=native".to_string()];

        base.merge(override_cfg);

        assert_eq!(base.compiler.exe, Some(PathBuf::from("/opt/ldc/bin/ldc2")));
        // Not overridden
        assert_eq!(base.compiler.version.as_deref(), Some("2.100.0"));
        // Replaced, not appended
        assert_eq!(base.compiler.args, vec!["-mcpu=native"]);
    }

    #[test]
    fn test_load_toolchain_config_precedence() {
        let tmp = TempDir::new().unwrap();
        let global_path = tmp.path().join("global.toml");
        let project_path = tmp.path().join("project.toml");

        std::fs::write(
            &global_path,
            r#"
[compiler]
family = "dmd"
version = "2.100.0"
"#,
        )
        .unwrap();

        std::fs::write(
            &project_path,
            r#"
[compiler]
family = "gdc"
"#,
        )
        .unwrap();

        let config = load_toolchain_config(Some(&global_path), &project_path);

        assert_eq!(config.compiler.family, Some(CompilerFamily::Gdc));
        assert_eq!(config.compiler.version.as_deref(), Some("2.100.0"));
    }

    #[test]
    fn test_missing_files_give_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_toolchain_config(None, &project_toolchain_config_path(tmp.path()));
        assert!(!config.has_overrides());
    }
}
