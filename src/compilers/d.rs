//! D compilers: gdc, ldc2 and dmd.
//!
//! gdc is a GCC front end and shares the GNU command line. ldc2 and dmd
//! share the dmd-style command line (`-of=`, `-I=`, `-L=`) and need
//! GNU-style dependency arguments translated before use.

use super::error::{CompilerError, Result};
use super::flags;
use super::gnu::GnuLike;
use super::translate::ArgumentTranslator;
use super::{BuildType, Compiler, CompilerIdentity, CrtSelection, TargetArch, WarnLevel};

/// `-m32`/`-m64` on Windows, where the compilers otherwise follow the OS
/// rather than the MSVC toolchain in use.
fn windows_arch_args(identity: &CompilerIdentity) -> Vec<String> {
    if !identity.host.is_windows() {
        return Vec::new();
    }
    let arg = match identity.arch {
        TargetArch::X86_64 => "-m64",
        _ => "-m32",
    };
    vec![arg.to_string()]
}

/// C runtime arguments for ldc2 and dmd.
fn crt_args(identity: &CompilerIdentity, crt: CrtSelection, buildtype: BuildType) -> Result<Vec<String>> {
    if !identity.host.is_windows() {
        return Ok(Vec::new());
    }

    if let Some(args) = flags::mscrt_args(crt) {
        return Ok(args);
    }

    let resolved = match buildtype {
        BuildType::Plain => return Ok(Vec::new()),
        BuildType::Debug => CrtSelection::Mdd,
        BuildType::DebugOptimized | BuildType::Release | BuildType::MinSize => CrtSelection::Md,
        BuildType::Custom => {
            return Err(CompilerError::MalformedArgument(
                "requested C runtime based on buildtype, but buildtype is \"custom\"".to_string(),
            ))
        }
    };
    Ok(flags::mscrt_args(resolved).unwrap_or_default())
}

fn non_plain(buildtype: BuildType, args: Vec<String>) -> Vec<String> {
    if buildtype == BuildType::Plain {
        Vec::new()
    } else {
        args
    }
}

/// The GNU D compiler.
#[derive(Debug, Clone)]
pub struct GdcCompiler {
    identity: CompilerIdentity,
    exelist: Vec<String>,
}

impl GdcCompiler {
    pub fn new(identity: CompilerIdentity, exelist: Vec<String>) -> Self {
        GdcCompiler { identity, exelist }
    }
}

impl Compiler for GdcCompiler {
    fn identity(&self) -> &CompilerIdentity {
        &self.identity
    }

    fn exelist(&self) -> &[String] {
        &self.exelist
    }

    fn warn_args(&self, level: WarnLevel) -> Vec<String> {
        let args: &[&str] = match level {
            WarnLevel::Zero => &[],
            WarnLevel::One => &["-Wall", "-Wdeprecated"],
            WarnLevel::Two => &["-Wall", "-Wdeprecated", "-Wextra"],
            WarnLevel::Three => &["-Wall", "-Wdeprecated", "-Wextra", "-Wpedantic"],
        };
        args.iter().map(|a| a.to_string()).collect()
    }

    fn target_arch_args(&self) -> Vec<String> {
        windows_arch_args(&self.identity)
    }

    fn buildtype_linker_args(&self, buildtype: BuildType) -> Vec<String> {
        non_plain(buildtype, self.target_arch_args())
    }

    fn depfile_suffix(&self) -> &str {
        "deps"
    }

    fn as_gnu_like(&self) -> Option<&dyn GnuLike> {
        Some(self)
    }
}

impl GnuLike for GdcCompiler {
    fn language_name(&self) -> &str {
        "d"
    }
}

/// The LLVM D compiler, ldc2.
#[derive(Debug, Clone)]
pub struct LdcCompiler {
    identity: CompilerIdentity,
    exelist: Vec<String>,
}

impl LdcCompiler {
    pub fn new(identity: CompilerIdentity, exelist: Vec<String>) -> Self {
        LdcCompiler { identity, exelist }
    }
}

impl Compiler for LdcCompiler {
    fn identity(&self) -> &CompilerIdentity {
        &self.identity
    }

    fn exelist(&self) -> &[String] {
        &self.exelist
    }

    fn output_args(&self, target: &str) -> Vec<String> {
        vec![format!("-of={}", target)]
    }

    fn include_args(&self, path: &str, _is_system: bool) -> Vec<String> {
        vec![format!("-I={}", path)]
    }

    fn warn_args(&self, level: WarnLevel) -> Vec<String> {
        match level {
            WarnLevel::Two | WarnLevel::Three => vec!["-wi".to_string(), "-dw".to_string()],
            WarnLevel::One => vec!["-wi".to_string()],
            WarnLevel::Zero => Vec::new(),
        }
    }

    fn werror_args(&self) -> Vec<String> {
        vec!["-w".to_string()]
    }

    fn target_arch_args(&self) -> Vec<String> {
        windows_arch_args(&self.identity)
    }

    fn buildtype_args(&self, buildtype: BuildType) -> Vec<String> {
        let mut args = non_plain(buildtype, self.target_arch_args());
        args.extend(flags::buildtype_args(self.family(), buildtype));
        args
    }

    fn buildtype_linker_args(&self, buildtype: BuildType) -> Vec<String> {
        non_plain(buildtype, self.target_arch_args())
    }

    fn crt_link_args(&self, crt: CrtSelection, buildtype: BuildType) -> Result<Vec<String>> {
        crt_args(&self.identity, crt, buildtype)
    }

    fn depfile_suffix(&self) -> &str {
        "deps"
    }

    fn native_translator(&self) -> Option<ArgumentTranslator> {
        ArgumentTranslator::new(self.family())
    }
}

/// The reference D compiler, dmd.
#[derive(Debug, Clone)]
pub struct DmdCompiler {
    identity: CompilerIdentity,
    exelist: Vec<String>,
}

impl DmdCompiler {
    pub fn new(identity: CompilerIdentity, exelist: Vec<String>) -> Self {
        DmdCompiler { identity, exelist }
    }

    /// Phobos import library matching the target architecture on Windows.
    fn windows_phobos(&self) -> &'static str {
        match self.identity.arch {
            TargetArch::X86_64 => "phobos64.lib",
            TargetArch::X86Mscoff => "phobos32mscoff.lib",
            _ => "phobos.lib",
        }
    }
}

impl Compiler for DmdCompiler {
    fn identity(&self) -> &CompilerIdentity {
        &self.identity
    }

    fn exelist(&self) -> &[String] {
        &self.exelist
    }

    fn output_args(&self, target: &str) -> Vec<String> {
        vec![format!("-of={}", target)]
    }

    fn include_args(&self, path: &str, _is_system: bool) -> Vec<String> {
        vec![format!("-I={}", path)]
    }

    fn warn_args(&self, _level: WarnLevel) -> Vec<String> {
        vec!["-wi".to_string()]
    }

    fn werror_args(&self) -> Vec<String> {
        vec!["-w".to_string()]
    }

    // dmd defaults to 32-bit OMF on Windows, even on 64-bit hosts.
    fn target_arch_args(&self) -> Vec<String> {
        if !self.identity.host.is_windows() {
            return Vec::new();
        }
        let arg = match self.identity.arch {
            TargetArch::X86_64 => "-m64",
            TargetArch::X86Mscoff => "-m32mscoff",
            _ => "-m32",
        };
        vec![arg.to_string()]
    }

    fn buildtype_args(&self, buildtype: BuildType) -> Vec<String> {
        let mut args = non_plain(buildtype, self.target_arch_args());
        args.extend(flags::buildtype_args(self.family(), buildtype));
        args
    }

    fn buildtype_linker_args(&self, buildtype: BuildType) -> Vec<String> {
        non_plain(buildtype, self.target_arch_args())
    }

    fn crt_compile_args(&self, crt: CrtSelection, buildtype: BuildType) -> Result<Vec<String>> {
        crt_args(&self.identity, crt, buildtype)
    }

    /// dmd pulls in the D runtime only when it sees `main`, so static D
    /// libraries need Phobos named explicitly on Windows.
    fn std_exe_link_args(&self) -> Vec<String> {
        if self.identity.host.is_windows() {
            vec![self.windows_phobos().to_string()]
        } else {
            Vec::new()
        }
    }

    fn std_shared_lib_link_args(&self) -> Vec<String> {
        let libname = if self.identity.host.is_windows() {
            self.windows_phobos()
        } else {
            "libphobos2.so"
        };
        vec!["-shared".to_string(), format!("-defaultlib={}", libname)]
    }

    fn depfile_suffix(&self) -> &str {
        "deps"
    }

    fn native_translator(&self) -> Option<ArgumentTranslator> {
        ArgumentTranslator::new(self.family())
    }
}
