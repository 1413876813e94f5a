//! GNU-style drivers: GCC itself and the shared `GnuLike` behaviour.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::error::Result;
use super::{probe, Compiler, CompilerIdentity, WarnLevel};

/// Source language of a GCC C-family driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GnuLanguage {
    C,
    Cpp,
}

impl GnuLanguage {
    /// Language name as passed to `-x`.
    pub fn as_str(&self) -> &'static str {
        match self {
            GnuLanguage::C => "c",
            GnuLanguage::Cpp => "c++",
        }
    }
}

/// Behaviour shared by every compiler with a GNU command line.
pub trait GnuLike: Compiler {
    /// Language name the driver understands with `-x`.
    fn language_name(&self) -> &str;

    /// Ask the compiler for its built-in include search list.
    fn default_include_dirs(&self) -> Result<Vec<String>> {
        probe::default_include_dirs(self.exelist(), self.language_name())
    }

    /// Directories from `--print-search-dirs`, e.g. `libraries` or `programs`.
    fn compiler_dirs(&self, name: &str) -> Result<Vec<PathBuf>> {
        let output = probe::search_dirs(self.exelist())?;
        Ok(probe::compiler_dirs(&output, name, self.identity().host))
    }

    fn pch_suffix(&self) -> &str {
        "gch"
    }

    fn openmp_flags(&self) -> Vec<String> {
        vec!["-fopenmp".to_string()]
    }

    fn lto_compile_args(&self) -> Vec<String> {
        vec!["-flto".to_string()]
    }

    fn profile_generate_args(&self) -> Vec<String> {
        vec!["-fprofile-generate".to_string()]
    }

    fn profile_use_args(&self) -> Vec<String> {
        vec!["-fprofile-use".to_string(), "-fprofile-correction".to_string()]
    }

    /// Subsystem selection for Windows GUI applications.
    fn gui_app_args(&self, gui: bool) -> Vec<String> {
        if !self.identity().host.is_windows() {
            return Vec::new();
        }
        let arg = if gui { "-mwindows" } else { "-mconsole" };
        vec![arg.to_string()]
    }

    /// Module definition files go on the link line like an object file,
    /// and only on Windows.
    fn vs_module_defs_args(&self, defsfile: &str) -> Vec<String> {
        if self.identity().host.is_windows() {
            vec![defsfile.to_string()]
        } else {
            Vec::new()
        }
    }

    /// Split a shared library path into its directory and the path itself.
    fn split_shlib_to_parts(&self, fname: &str) -> (String, String) {
        let dir = Path::new(fname)
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        (dir, fname.to_string())
    }
}

/// GCC driving C or C++.
#[derive(Debug, Clone)]
pub struct GnuCCompiler {
    identity: CompilerIdentity,
    exelist: Vec<String>,
    language: GnuLanguage,
    defines: BTreeMap<String, String>,
}

impl GnuCCompiler {
    pub fn new(identity: CompilerIdentity, exelist: Vec<String>, language: GnuLanguage) -> Self {
        GnuCCompiler {
            identity,
            exelist,
            language,
            defines: BTreeMap::new(),
        }
    }

    /// Attach the compiler's predefined macros (`gcc -dM -E`).
    pub fn with_defines(mut self, defines: BTreeMap<String, String>) -> Self {
        self.defines = defines;
        self
    }

    pub fn language(&self) -> GnuLanguage {
        self.language
    }

    pub fn has_builtin_define(&self, define: &str) -> bool {
        self.defines.contains_key(define)
    }

    pub fn get_builtin_define(&self, define: &str) -> Option<&str> {
        self.defines.get(define).map(String::as_str)
    }
}

impl Compiler for GnuCCompiler {
    fn identity(&self) -> &CompilerIdentity {
        &self.identity
    }

    fn exelist(&self) -> &[String] {
        &self.exelist
    }

    fn warn_args(&self, level: WarnLevel) -> Vec<String> {
        let mut base = vec!["-Wall", "-Winvalid-pch"];
        if self.language == GnuLanguage::Cpp {
            base.push("-Wnon-virtual-dtor");
        }

        let extra: &[&str] = match level {
            WarnLevel::Zero => return Vec::new(),
            WarnLevel::One => &[],
            WarnLevel::Two => &["-Wextra"],
            WarnLevel::Three => &["-Wextra", "-Wpedantic"],
        };
        base.extend_from_slice(extra);

        // -Wpedantic appeared in GCC 4.8.
        let old = self.identity.version_matches("<4.8.0");
        base.into_iter()
            .map(|a| {
                if old && a == "-Wpedantic" {
                    "-pedantic".to_string()
                } else {
                    a.to_string()
                }
            })
            .collect()
    }

    fn as_gnu_like(&self) -> Option<&dyn GnuLike> {
        Some(self)
    }
}

impl GnuLike for GnuCCompiler {
    fn language_name(&self) -> &str {
        self.language.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compilers::{CompilerFamily, HostPlatform};

    fn gcc(version: &str, language: GnuLanguage) -> GnuCCompiler {
        let id = CompilerIdentity::new(CompilerFamily::Gnu, version).with_host(HostPlatform::Other);
        GnuCCompiler::new(id, vec!["gcc".to_string()], language)
    }

    #[test]
    fn test_warn_levels() {
        let cc = gcc("9.3.0", GnuLanguage::C);
        assert!(cc.warn_args(WarnLevel::Zero).is_empty());
        assert_eq!(cc.warn_args(WarnLevel::One), vec!["-Wall", "-Winvalid-pch"]);
        assert_eq!(
            cc.warn_args(WarnLevel::Three),
            vec!["-Wall", "-Winvalid-pch", "-Wextra", "-Wpedantic"]
        );

        let cxx = gcc("9.3.0", GnuLanguage::Cpp);
        assert_eq!(
            cxx.warn_args(WarnLevel::Two),
            vec!["-Wall", "-Winvalid-pch", "-Wnon-virtual-dtor", "-Wextra"]
        );
    }

    #[test]
    fn test_old_gcc_spells_pedantic_differently() {
        let cc = gcc("4.7.2", GnuLanguage::C);
        assert_eq!(
            cc.warn_args(WarnLevel::Three),
            vec!["-Wall", "-Winvalid-pch", "-Wextra", "-pedantic"]
        );
    }

    #[test]
    fn test_gnu_defaults() {
        let cc = gcc("9.3.0", GnuLanguage::C);
        assert_eq!(cc.output_args("a.o"), vec!["-o", "a.o"]);
        assert_eq!(cc.include_args("/inc", true), vec!["-isystem/inc"]);
        assert_eq!(cc.include_args("inc", false), vec!["-Iinc"]);
        assert_eq!(cc.coverage_args().unwrap(), vec!["--coverage"]);
        assert_eq!(
            cc.dependency_gen_args("a.o", "a.o.d").unwrap(),
            vec!["-MD", "-MQ", "a.o", "-MF", "a.o.d"]
        );
        assert_eq!(cc.depfile_for_object("a.o"), "a.o.d");
        assert_eq!(cc.pch_suffix(), "gch");
        assert_eq!(cc.profile_use_args(), vec!["-fprofile-use", "-fprofile-correction"]);
    }

    #[test]
    fn test_windows_only_link_args() {
        let cc = gcc("9.3.0", GnuLanguage::C);
        assert!(cc.gui_app_args(true).is_empty());
        assert!(cc.vs_module_defs_args("foo.def").is_empty());

        let id = CompilerIdentity::new(CompilerFamily::Gnu, "9.3.0").with_host(HostPlatform::Windows);
        let mingw = GnuCCompiler::new(id, vec!["gcc".to_string()], GnuLanguage::C);
        assert_eq!(mingw.gui_app_args(true), vec!["-mwindows"]);
        assert_eq!(mingw.gui_app_args(false), vec!["-mconsole"]);
        assert_eq!(mingw.vs_module_defs_args("foo.def"), vec!["foo.def"]);
    }

    #[test]
    fn test_builtin_defines() {
        let mut defines = BTreeMap::new();
        defines.insert("__GNUC__".to_string(), "9".to_string());
        let cc = gcc("9.3.0", GnuLanguage::C).with_defines(defines);
        assert!(cc.has_builtin_define("__GNUC__"));
        assert_eq!(cc.get_builtin_define("__GNUC__"), Some("9"));
        assert_eq!(cc.get_builtin_define("__clang__"), None);
    }

    #[test]
    fn test_split_shlib_to_parts() {
        let cc = gcc("9.3.0", GnuLanguage::C);
        assert_eq!(
            cc.split_shlib_to_parts("lib/libfoo.so"),
            ("lib".to_string(), "lib/libfoo.so".to_string())
        );
        assert_eq!(
            cc.split_shlib_to_parts("libfoo.so"),
            (String::new(), "libfoo.so".to_string())
        );
    }
}
