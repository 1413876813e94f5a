//! Compiler abstraction for GNU-compatible and D compilers.
//!
//! This module provides a unified interface for generating compiler
//! argument vectors across compiler families (GCC, GDC, LDC, DMD).
//!
//! The family is fixed when a compiler is constructed from its
//! [`CompilerIdentity`]; every table lookup and capability check is keyed
//! by that tag. Families that speak a non-GNU dialect additionally expose
//! an [`ArgumentTranslator`] for flags authored for GNU tools.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod d;
pub mod error;
pub mod features;
pub mod flags;
pub mod gnu;
pub mod paths;
pub mod policy;
pub mod probe;
pub mod translate;
pub mod version;

pub use d::{DmdCompiler, GdcCompiler, LdcCompiler};
pub use error::{CompilerError, Result};
pub use features::{FeatureArgBuilder, FeatureRequest, FeatureValue, ImportDir};
pub use flags::{AbstractOption, ColorMode, OptimizationLevel, PositionIndependence, Visibility};
pub use gnu::{GnuCCompiler, GnuLanguage, GnuLike};
pub use paths::PathNormalizer;
pub use policy::{Capability, Support};
pub use translate::ArgumentTranslator;

/// Error returned when parsing one of the identity enums from a string.
#[derive(Debug, Clone)]
pub struct ParseIdentityError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

impl fmt::Display for ParseIdentityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid {} '{}', valid values: {}",
            self.kind, self.value, self.expected
        )
    }
}

impl std::error::Error for ParseIdentityError {}

/// The command-line dialect family of a compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompilerFamily {
    /// GCC and GCC-compatible C/C++ drivers
    #[serde(rename = "gcc", alias = "gnu")]
    Gnu,
    /// GNU D compiler (GCC front end)
    #[serde(rename = "gdc")]
    Gdc,
    /// LLVM D compiler (ldc2)
    #[serde(rename = "ldc", alias = "ldc2", alias = "llvm")]
    Ldc,
    /// Reference D compiler
    #[serde(rename = "dmd")]
    Dmd,
}

impl CompilerFamily {
    /// Get the family name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompilerFamily::Gnu => "gcc",
            CompilerFamily::Gdc => "gdc",
            CompilerFamily::Ldc => "ldc",
            CompilerFamily::Dmd => "dmd",
        }
    }

    /// Default executable name for this family.
    pub fn default_exe(&self) -> &'static str {
        match self {
            CompilerFamily::Gnu => "gcc",
            CompilerFamily::Gdc => "gdc",
            CompilerFamily::Ldc => "ldc2",
            CompilerFamily::Dmd => "dmd",
        }
    }

    /// Whether this family compiles D sources.
    pub fn is_d(&self) -> bool {
        !matches!(self, CompilerFamily::Gnu)
    }

    /// Whether this family accepts GNU-style arguments natively.
    pub fn is_gnu_dialect(&self) -> bool {
        matches!(self, CompilerFamily::Gnu | CompilerFamily::Gdc)
    }
}

impl fmt::Display for CompilerFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CompilerFamily {
    type Err = ParseIdentityError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gcc" | "gnu" | "cc" => Ok(CompilerFamily::Gnu),
            "gdc" => Ok(CompilerFamily::Gdc),
            "ldc" | "ldc2" | "llvm" => Ok(CompilerFamily::Ldc),
            "dmd" => Ok(CompilerFamily::Dmd),
            _ => Err(ParseIdentityError {
                kind: "compiler family",
                value: s.to_string(),
                expected: "gcc, gdc, ldc, dmd",
            }),
        }
    }
}

/// Target CPU architecture, as far as argument generation cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetArch {
    X86,
    X86_64,
    /// 32-bit x86 using the MS-COFF object format (dmd on Windows)
    X86Mscoff,
    Aarch64,
    Arm,
    Other,
}

impl TargetArch {
    /// Architecture of the running host.
    pub fn host() -> Self {
        match std::env::consts::ARCH {
            "x86" => TargetArch::X86,
            "x86_64" => TargetArch::X86_64,
            "aarch64" => TargetArch::Aarch64,
            "arm" => TargetArch::Arm,
            _ => TargetArch::Other,
        }
    }

    /// Get the architecture name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetArch::X86 => "x86",
            TargetArch::X86_64 => "x86_64",
            TargetArch::X86Mscoff => "x86_mscoff",
            TargetArch::Aarch64 => "aarch64",
            TargetArch::Arm => "arm",
            TargetArch::Other => "other",
        }
    }
}

impl fmt::Display for TargetArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TargetArch {
    type Err = ParseIdentityError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "x86" | "i386" | "i686" => Ok(TargetArch::X86),
            "x86_64" | "amd64" => Ok(TargetArch::X86_64),
            "x86_mscoff" => Ok(TargetArch::X86Mscoff),
            "aarch64" | "arm64" => Ok(TargetArch::Aarch64),
            "arm" => Ok(TargetArch::Arm),
            "other" => Ok(TargetArch::Other),
            _ => Err(ParseIdentityError {
                kind: "target architecture",
                value: s.to_string(),
                expected: "x86, x86_64, x86_mscoff, aarch64, arm, other",
            }),
        }
    }
}

/// Platform the compiler runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostPlatform {
    Windows,
    Osx,
    Other,
}

impl HostPlatform {
    /// Detect the running platform.
    pub fn host() -> Self {
        if cfg!(target_os = "windows") {
            HostPlatform::Windows
        } else if cfg!(target_os = "macos") {
            HostPlatform::Osx
        } else {
            HostPlatform::Other
        }
    }

    /// Get the platform name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            HostPlatform::Windows => "windows",
            HostPlatform::Osx => "osx",
            HostPlatform::Other => "other",
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, HostPlatform::Windows)
    }

    pub fn is_osx(&self) -> bool {
        matches!(self, HostPlatform::Osx)
    }
}

impl fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HostPlatform {
    type Err = ParseIdentityError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "windows" => Ok(HostPlatform::Windows),
            "osx" | "macos" | "darwin" => Ok(HostPlatform::Osx),
            "other" | "linux" | "unix" => Ok(HostPlatform::Other),
            _ => Err(ParseIdentityError {
                kind: "host platform",
                value: s.to_string(),
                expected: "windows, osx, other",
            }),
        }
    }
}

/// Normalized compiler identity.
///
/// Produced by toolchain detection and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompilerIdentity {
    /// Command-line dialect family
    pub family: CompilerFamily,
    /// Version string as reported by the compiler (e.g. "1.30.0", "2.086.1")
    pub version: String,
    /// Target architecture
    pub arch: TargetArch,
    /// Host platform
    pub host: HostPlatform,
}

impl CompilerIdentity {
    /// Create an identity targeting the running host.
    pub fn new(family: CompilerFamily, version: impl Into<String>) -> Self {
        CompilerIdentity {
            family,
            version: version.into(),
            arch: TargetArch::host(),
            host: HostPlatform::host(),
        }
    }

    /// Set the target architecture.
    pub fn with_arch(mut self, arch: TargetArch) -> Self {
        self.arch = arch;
        self
    }

    /// Set the host platform.
    pub fn with_host(mut self, host: HostPlatform) -> Self {
        self.host = host;
        self
    }

    /// Check the version against a semver requirement such as `>=4.9.0`.
    pub fn version_matches(&self, req: &str) -> bool {
        version::version_compare(&self.version, req)
    }
}

impl fmt::Display for CompilerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.family, self.version)
    }
}

/// Build type of the current configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildType {
    Plain,
    Debug,
    DebugOptimized,
    Release,
    MinSize,
    Custom,
}

impl BuildType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Plain => "plain",
            BuildType::Debug => "debug",
            BuildType::DebugOptimized => "debugoptimized",
            BuildType::Release => "release",
            BuildType::MinSize => "minsize",
            BuildType::Custom => "custom",
        }
    }
}

impl FromStr for BuildType {
    type Err = ParseIdentityError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "plain" => Ok(BuildType::Plain),
            "debug" => Ok(BuildType::Debug),
            "debugoptimized" => Ok(BuildType::DebugOptimized),
            "release" => Ok(BuildType::Release),
            "minsize" => Ok(BuildType::MinSize),
            "custom" => Ok(BuildType::Custom),
            _ => Err(ParseIdentityError {
                kind: "build type",
                value: s.to_string(),
                expected: "plain, debug, debugoptimized, release, minsize, custom",
            }),
        }
    }
}

/// Microsoft C runtime selection (Windows only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrtSelection {
    None,
    Md,
    Mdd,
    Mt,
    Mtd,
    /// Derive the runtime from the build type
    FromBuildtype,
}

impl FromStr for CrtSelection {
    type Err = ParseIdentityError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "none" => Ok(CrtSelection::None),
            "md" => Ok(CrtSelection::Md),
            "mdd" => Ok(CrtSelection::Mdd),
            "mt" => Ok(CrtSelection::Mt),
            "mtd" => Ok(CrtSelection::Mtd),
            "from_buildtype" => Ok(CrtSelection::FromBuildtype),
            _ => Err(ParseIdentityError {
                kind: "C runtime",
                value: s.to_string(),
                expected: "none, md, mdd, mt, mtd, from_buildtype",
            }),
        }
    }
}

/// Warning level, `0` (none) through `3` (everything).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WarnLevel {
    Zero,
    One,
    Two,
    Three,
}

impl FromStr for WarnLevel {
    type Err = ParseIdentityError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "0" => Ok(WarnLevel::Zero),
            "1" => Ok(WarnLevel::One),
            "2" => Ok(WarnLevel::Two),
            "3" => Ok(WarnLevel::Three),
            _ => Err(ParseIdentityError {
                kind: "warning level",
                value: s.to_string(),
                expected: "0, 1, 2, 3",
            }),
        }
    }
}

/// Trait for compiler implementations.
///
/// Each compiler knows how to spell build intents for its own dialect.
/// Option lookups go through [`policy::gate`], so a family only has to
/// override what its command line does differently.
pub trait Compiler: Send + Sync {
    /// Get the normalized identity.
    fn identity(&self) -> &CompilerIdentity;

    /// Get the command used to invoke the compiler (program plus fixed args).
    fn exelist(&self) -> &[String];

    /// Get the compiler family.
    fn family(&self) -> CompilerFamily {
        self.identity().family
    }

    /// Human-readable compiler name for messages.
    fn name_string(&self) -> String {
        self.exelist().join(" ")
    }

    /// Arguments for an abstract option, gated by version and platform.
    fn option_args(&self, option: &AbstractOption) -> Result<Vec<String>> {
        policy::gate(self.identity(), option)
    }

    /// Optimization arguments for a level.
    fn optimization_args(&self, level: OptimizationLevel) -> Result<Vec<String>> {
        self.option_args(&AbstractOption::Optimization(level))
    }

    /// Debug-info arguments.
    fn debug_args(&self, is_debug: bool) -> Result<Vec<String>> {
        self.option_args(&AbstractOption::Debug(is_debug))
    }

    /// Position-independent code arguments.
    fn pic_args(&self) -> Result<Vec<String>> {
        self.option_args(&AbstractOption::PositionIndependence(
            PositionIndependence::Code,
        ))
    }

    /// Position-independent executable arguments.
    fn pie_args(&self) -> Result<Vec<String>> {
        self.option_args(&AbstractOption::PositionIndependence(
            PositionIndependence::Executable,
        ))
    }

    /// Diagnostic color arguments.
    fn colorout_args(&self, mode: ColorMode) -> Result<Vec<String>> {
        self.option_args(&AbstractOption::Color(mode))
    }

    /// Coverage instrumentation arguments.
    fn coverage_args(&self) -> Result<Vec<String>> {
        self.option_args(&AbstractOption::Coverage)
    }

    /// Makefile-style dependency file arguments.
    fn dependency_gen_args(&self, target: &str, depfile: &str) -> Result<Vec<String>> {
        self.option_args(&AbstractOption::DependencyFile {
            target: target.to_string(),
            file: depfile.to_string(),
        })
    }

    /// Symbol visibility arguments.
    fn symbol_visibility_args(&self, visibility: Visibility) -> Result<Vec<String>> {
        self.option_args(&AbstractOption::Visibility(visibility))
    }

    /// Sanitizer arguments.
    fn sanitizer_args(&self, value: &str) -> Result<Vec<String>> {
        self.option_args(&AbstractOption::Sanitizer(value.to_string()))
    }

    /// Instruction-set extension arguments.
    fn instruction_set_args(&self, name: &str) -> Result<Vec<String>> {
        self.option_args(&AbstractOption::InstructionSet(name.to_string()))
    }

    /// Arguments naming the output file.
    fn output_args(&self, target: &str) -> Vec<String> {
        vec!["-o".to_string(), target.to_string()]
    }

    /// Arguments naming the linker output file.
    fn linker_output_args(&self, target: &str) -> Vec<String> {
        self.output_args(target)
    }

    /// Compile without linking.
    fn compile_only_args(&self) -> Vec<String> {
        vec!["-c".to_string()]
    }

    /// Run the preprocessor only.
    fn preprocess_only_args(&self) -> Vec<String> {
        vec!["-E".to_string()]
    }

    /// Include-directory arguments.
    fn include_args(&self, path: &str, is_system: bool) -> Vec<String> {
        if is_system {
            vec![format!("-isystem{}", path)]
        } else {
            vec![format!("-I{}", path)]
        }
    }

    /// Warning arguments for a level.
    fn warn_args(&self, level: WarnLevel) -> Vec<String>;

    /// Treat warnings as errors.
    fn werror_args(&self) -> Vec<String> {
        vec!["-Werror".to_string()]
    }

    /// Arguments selecting the target architecture.
    fn target_arch_args(&self) -> Vec<String> {
        Vec::new()
    }

    /// Compile arguments implied by the build type.
    fn buildtype_args(&self, buildtype: BuildType) -> Vec<String> {
        flags::buildtype_args(self.family(), buildtype)
    }

    /// Link arguments implied by the build type.
    fn buildtype_linker_args(&self, _buildtype: BuildType) -> Vec<String> {
        Vec::new()
    }

    /// C runtime arguments for the compile step.
    fn crt_compile_args(&self, _crt: CrtSelection, _buildtype: BuildType) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    /// C runtime arguments for the link step.
    fn crt_link_args(&self, _crt: CrtSelection, _buildtype: BuildType) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    /// Extra arguments every executable link needs.
    fn std_exe_link_args(&self) -> Vec<String> {
        Vec::new()
    }

    /// Arguments to link a shared library.
    fn std_shared_lib_link_args(&self) -> Vec<String> {
        vec!["-shared".to_string()]
    }

    /// Arguments to emit a Windows import library.
    fn import_library_args(&self, implibname: &str) -> Vec<String> {
        vec![format!("-Wl,--out-implib={}", implibname)]
    }

    /// Arguments needed to link against the thread library.
    fn thread_link_flags(&self) -> Vec<String> {
        vec!["-pthread".to_string()]
    }

    /// Suffix of generated dependency files.
    fn depfile_suffix(&self) -> &str {
        "d"
    }

    /// Dependency file path for an object file.
    fn depfile_for_object(&self, objfile: &str) -> String {
        format!("{}.{}", objfile, self.depfile_suffix())
    }

    /// Runtime library search path arguments.
    ///
    /// The build rpath is padded with `X` up to the length of the install
    /// rpath so the install step can rewrite it in place.
    fn build_rpath_args(
        &self,
        build_dir: &Path,
        rpath_paths: &[String],
        build_rpath: &str,
        install_rpath: &str,
    ) -> Vec<String> {
        if self.identity().host.is_windows() {
            return Vec::new();
        }
        if rpath_paths.is_empty() && install_rpath.is_empty() {
            return Vec::new();
        }

        let mut paths = rpath_paths
            .iter()
            .map(|p| build_dir.join(p).to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(":");
        if !build_rpath.is_empty() {
            paths.push(':');
            paths.push_str(build_rpath);
        }
        if paths.len() < install_rpath.len() {
            let padding = "X".repeat(install_rpath.len() - paths.len());
            if paths.is_empty() {
                paths = padding;
            } else {
                paths = format!("{}:{}", paths, padding);
            }
        }

        vec![format!("-Wl,-rpath,{}", paths)]
    }

    /// Feature arguments (unittest, debug/version identifiers, import dirs).
    ///
    /// Recognized keys are removed from `request`.
    fn feature_args(&self, request: &mut FeatureRequest, build_to_src: &Path) -> Result<Vec<String>> {
        FeatureArgBuilder::new(self.identity()).build(request, build_to_src)
    }

    /// Rewrite path-bearing arguments to absolute paths under `build_dir`.
    fn absolute_path_args(&self, args: &[String], build_dir: &Path) -> Vec<String> {
        PathNormalizer::for_family(self.family()).absolutize(args, build_dir)
    }

    /// Translator for GNU-style arguments, if this compiler needs one.
    fn native_translator(&self) -> Option<ArgumentTranslator> {
        None
    }

    /// GNU driver behaviour, for compilers that have a GNU command line.
    fn as_gnu_like(&self) -> Option<&dyn GnuLike> {
        None
    }

    /// Convert GNU-style arguments (e.g. from pkg-config) to this compiler's dialect.
    fn unix_args_to_native(&self, args: &[String]) -> Vec<String> {
        match self.native_translator() {
            Some(translator) => translator.to_native_dialect(args, self.identity().host),
            None => args.to_vec(),
        }
    }
}

/// Construct the compiler implementation for an identity.
///
/// `exelist` is the program followed by any fixed arguments it always needs.
pub fn compiler_for(identity: CompilerIdentity, exelist: Vec<String>) -> Box<dyn Compiler> {
    match identity.family {
        CompilerFamily::Gnu => Box::new(GnuCCompiler::new(identity, exelist, GnuLanguage::C)),
        CompilerFamily::Gdc => Box::new(GdcCompiler::new(identity, exelist)),
        CompilerFamily::Ldc => Box::new(LdcCompiler::new(identity, exelist)),
        CompilerFamily::Dmd => Box::new(DmdCompiler::new(identity, exelist)),
    }
}
