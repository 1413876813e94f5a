//! Static flag tables.
//!
//! Maps abstract options onto the literal flags of each compiler family.
//! The tables are plain constant data; [`lookup`] never consults the
//! compiler version or the platform, that is the job of
//! [`policy`](super::policy).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::policy::Capability;
use super::{BuildType, CompilerFamily, CrtSelection, ParseIdentityError};

/// Optimization level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptimizationLevel {
    #[serde(rename = "0")]
    Zero,
    /// Optimize for debugging experience
    #[serde(rename = "g")]
    Debug,
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    /// Optimize for size
    #[serde(rename = "s")]
    Size,
}

impl OptimizationLevel {
    pub const ALL: [OptimizationLevel; 6] = [
        OptimizationLevel::Zero,
        OptimizationLevel::Debug,
        OptimizationLevel::One,
        OptimizationLevel::Two,
        OptimizationLevel::Three,
        OptimizationLevel::Size,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OptimizationLevel::Zero => "0",
            OptimizationLevel::Debug => "g",
            OptimizationLevel::One => "1",
            OptimizationLevel::Two => "2",
            OptimizationLevel::Three => "3",
            OptimizationLevel::Size => "s",
        }
    }
}

impl FromStr for OptimizationLevel {
    type Err = ParseIdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OptimizationLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| ParseIdentityError {
                kind: "optimization level",
                value: s.to_string(),
                expected: "0, g, 1, 2, 3, s",
            })
    }
}

/// Symbol visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// No explicit visibility flag
    #[serde(rename = "")]
    Unset,
    Default,
    Internal,
    Hidden,
    Protected,
    /// Hidden, plus hidden inline functions
    InlinesHidden,
}

impl FromStr for Visibility {
    type Err = ParseIdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(Visibility::Unset),
            "default" => Ok(Visibility::Default),
            "internal" => Ok(Visibility::Internal),
            "hidden" => Ok(Visibility::Hidden),
            "protected" => Ok(Visibility::Protected),
            "inlineshidden" => Ok(Visibility::InlinesHidden),
            _ => Err(ParseIdentityError {
                kind: "visibility",
                value: s.to_string(),
                expected: "default, internal, hidden, protected, inlineshidden",
            }),
        }
    }
}

/// Diagnostic color mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorMode::Auto => "auto",
            ColorMode::Always => "always",
            ColorMode::Never => "never",
        }
    }
}

impl FromStr for ColorMode {
    type Err = ParseIdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(ColorMode::Auto),
            "always" => Ok(ColorMode::Always),
            "never" => Ok(ColorMode::Never),
            _ => Err(ParseIdentityError {
                kind: "color mode",
                value: s.to_string(),
                expected: "auto, always, never",
            }),
        }
    }
}

/// Position-independent code generation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionIndependence {
    /// Position-independent code, for shared libraries
    Code,
    /// Position-independent executable
    Executable,
}

/// A toolchain-independent build option.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AbstractOption {
    Optimization(OptimizationLevel),
    Debug(bool),
    Visibility(Visibility),
    InstructionSet(String),
    Sanitizer(String),
    Color(ColorMode),
    PositionIndependence(PositionIndependence),
    Coverage,
    /// Makefile-style dependency output for `target`, written to `file`
    DependencyFile { target: String, file: String },
}

impl AbstractOption {
    /// The capability this option needs.
    pub fn capability(&self) -> Capability {
        match self {
            AbstractOption::Optimization(_) => Capability::Optimization,
            AbstractOption::Debug(_) => Capability::Debug,
            AbstractOption::Visibility(_) => Capability::Visibility,
            AbstractOption::InstructionSet(_) => Capability::InstructionSet,
            AbstractOption::Sanitizer(_) => Capability::Sanitizer,
            AbstractOption::Color(_) => Capability::ColorOutput,
            AbstractOption::PositionIndependence(PositionIndependence::Code) => Capability::Pic,
            AbstractOption::PositionIndependence(PositionIndependence::Executable) => {
                Capability::Pie
            }
            AbstractOption::Coverage => Capability::Coverage,
            AbstractOption::DependencyFile { .. } => Capability::DependencyGen,
        }
    }
}

impl fmt::Display for AbstractOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbstractOption::InstructionSet(name) => write!(f, "instruction set `{}`", name),
            AbstractOption::Sanitizer(value) => write!(f, "sanitizer `{}`", value),
            other => write!(f, "{}", other.capability()),
        }
    }
}

/// D language feature flags for one family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DFeatureArgs {
    pub unittest: Option<&'static str>,
    pub debug: Option<&'static str>,
    pub version: Option<&'static str>,
    pub import_dir: Option<&'static str>,
}

pub const GDC_FEATURE_ARGS: DFeatureArgs = DFeatureArgs {
    unittest: Some("-funittest"),
    debug: Some("-fdebug"),
    version: Some("-fversion"),
    import_dir: Some("-J"),
};

pub const LDC_FEATURE_ARGS: DFeatureArgs = DFeatureArgs {
    unittest: Some("-unittest"),
    debug: Some("-d-debug"),
    version: Some("-d-version"),
    import_dir: Some("-J"),
};

pub const DMD_FEATURE_ARGS: DFeatureArgs = DFeatureArgs {
    unittest: Some("-unittest"),
    debug: Some("-debug"),
    version: Some("-version"),
    import_dir: Some("-J"),
};

/// Feature flag table for a family, if it has one.
pub fn d_feature_args(family: CompilerFamily) -> Option<&'static DFeatureArgs> {
    match family {
        CompilerFamily::Gnu => None,
        CompilerFamily::Gdc => Some(&GDC_FEATURE_ARGS),
        CompilerFamily::Ldc => Some(&LDC_FEATURE_ARGS),
        CompilerFamily::Dmd => Some(&DMD_FEATURE_ARGS),
    }
}

/// x86/ARM instruction-set extensions understood by GNU-style drivers.
pub const GNULIKE_INSTRUCTION_SET_ARGS: &[(&str, &[&str])] = &[
    ("mmx", &["-mmmx"]),
    ("sse", &["-msse"]),
    ("sse2", &["-msse2"]),
    ("sse3", &["-msse3"]),
    ("ssse3", &["-mssse3"]),
    ("sse41", &["-msse4.1"]),
    ("sse42", &["-msse4.2"]),
    ("avx", &["-mavx"]),
    ("avx2", &["-mavx2"]),
    ("neon", &["-mfpu=neon"]),
];

fn gnu_optimization_args(level: OptimizationLevel) -> &'static [&'static str] {
    match level {
        OptimizationLevel::Zero => &[],
        OptimizationLevel::Debug => &["-Og"],
        OptimizationLevel::One => &["-O1"],
        OptimizationLevel::Two => &["-O2"],
        OptimizationLevel::Three => &["-O3"],
        OptimizationLevel::Size => &["-Os"],
    }
}

fn ldc_optimization_args(level: OptimizationLevel) -> &'static [&'static str] {
    match level {
        OptimizationLevel::Zero | OptimizationLevel::Debug => &[],
        OptimizationLevel::One => &["-O1"],
        OptimizationLevel::Two => &["-O2"],
        OptimizationLevel::Three => &["-O3"],
        OptimizationLevel::Size => &["-Os"],
    }
}

// dmd has a single optimization switch.
fn dmd_optimization_args(level: OptimizationLevel) -> &'static [&'static str] {
    match level {
        OptimizationLevel::Zero | OptimizationLevel::Debug => &[],
        OptimizationLevel::One
        | OptimizationLevel::Two
        | OptimizationLevel::Three
        | OptimizationLevel::Size => &["-O"],
    }
}

fn debug_args(family: CompilerFamily, is_debug: bool) -> &'static [&'static str] {
    if !is_debug {
        return &[];
    }
    match family {
        CompilerFamily::Gnu | CompilerFamily::Gdc => &["-g"],
        CompilerFamily::Ldc => &["-g", "-d-debug"],
        CompilerFamily::Dmd => &["-g", "-debug"],
    }
}

fn gnu_symbol_visibility_args(visibility: Visibility) -> &'static [&'static str] {
    match visibility {
        Visibility::Unset => &[],
        Visibility::Default => &["-fvisibility=default"],
        Visibility::Internal => &["-fvisibility=internal"],
        Visibility::Hidden => &["-fvisibility=hidden"],
        Visibility::Protected => &["-fvisibility=protected"],
        Visibility::InlinesHidden => &["-fvisibility=hidden", "-fvisibility-inlines-hidden"],
    }
}

fn gnu_color_args(mode: ColorMode) -> &'static [&'static str] {
    match mode {
        ColorMode::Auto => &["-fdiagnostics-color=auto"],
        ColorMode::Always => &["-fdiagnostics-color=always"],
        ColorMode::Never => &["-fdiagnostics-color=never"],
    }
}

fn gnu_sanitizer_args(value: &str) -> Vec<String> {
    if value == "none" {
        return Vec::new();
    }
    let mut args = vec![format!("-fsanitize={}", value)];
    // Also covers combined values such as `address,undefined`.
    if value.contains("address") {
        args.push("-fno-omit-frame-pointer".to_string());
    }
    args
}

/// Look up the flags for an option.
///
/// Returns `None` when the family has no entry for the option. Version and
/// platform gating is not applied here.
pub fn lookup(family: CompilerFamily, option: &AbstractOption) -> Option<Vec<String>> {
    use CompilerFamily::*;

    let args: &[&str] = match (family, option) {
        (Gnu | Gdc, AbstractOption::Optimization(level)) => gnu_optimization_args(*level),
        (Ldc, AbstractOption::Optimization(level)) => ldc_optimization_args(*level),
        (Dmd, AbstractOption::Optimization(level)) => dmd_optimization_args(*level),

        (_, AbstractOption::Debug(is_debug)) => debug_args(family, *is_debug),

        (Gnu | Gdc, AbstractOption::Visibility(v)) => gnu_symbol_visibility_args(*v),

        (Gnu | Gdc, AbstractOption::InstructionSet(name)) => GNULIKE_INSTRUCTION_SET_ARGS
            .iter()
            .find(|(key, _)| *key == name.as_str())
            .map(|(_, args)| *args)?,

        (Gnu | Gdc, AbstractOption::Sanitizer(value)) => return Some(gnu_sanitizer_args(value)),

        (Gnu | Gdc, AbstractOption::Color(mode)) => gnu_color_args(*mode),
        (Ldc, AbstractOption::Color(mode)) => match mode {
            ColorMode::Always => &["-enable-color"],
            _ => &[],
        },
        (Dmd, AbstractOption::Color(mode)) => match mode {
            ColorMode::Always => &["-color=on"],
            _ => &[],
        },

        (Ldc, AbstractOption::PositionIndependence(PositionIndependence::Code)) => {
            &["-relocation-model=pic"]
        }
        (_, AbstractOption::PositionIndependence(PositionIndependence::Code)) => &["-fPIC"],
        (Gnu | Gdc, AbstractOption::PositionIndependence(PositionIndependence::Executable)) => {
            &["-fPIE"]
        }

        (Gnu, AbstractOption::Coverage) => &["--coverage"],
        (Ldc | Dmd, AbstractOption::Coverage) => &["-cov"],

        (Gnu | Gdc, AbstractOption::DependencyFile { target, file }) => {
            return Some(vec![
                "-MD".to_string(),
                "-MQ".to_string(),
                target.clone(),
                "-MF".to_string(),
                file.clone(),
            ]);
        }

        _ => return None,
    };

    Some(to_args(args))
}

/// Compile arguments implied by a build type.
pub fn buildtype_args(family: CompilerFamily, buildtype: BuildType) -> Vec<String> {
    let args: &[&str] = match (family, buildtype) {
        (CompilerFamily::Gdc, BuildType::DebugOptimized) => &["-finline-functions"],
        (CompilerFamily::Gdc, BuildType::Release) => &["-frelease", "-finline-functions"],
        (CompilerFamily::Ldc, BuildType::DebugOptimized) => {
            &["-enable-inlining", "-Hkeep-all-bodies"]
        }
        (CompilerFamily::Ldc, BuildType::Release) => {
            &["-release", "-enable-inlining", "-Hkeep-all-bodies"]
        }
        (CompilerFamily::Dmd, BuildType::DebugOptimized) => &["-inline"],
        (CompilerFamily::Dmd, BuildType::Release) => &["-release", "-inline"],
        _ => &[],
    };
    to_args(args)
}

/// `-mscrtlib=` arguments for an explicit C runtime selection.
///
/// Returns `None` for [`CrtSelection::FromBuildtype`], which has to be
/// resolved against the build type first.
pub fn mscrt_args(crt: CrtSelection) -> Option<Vec<String>> {
    let arg = match crt {
        CrtSelection::None => "-mscrtlib=",
        CrtSelection::Md => "-mscrtlib=msvcrt",
        CrtSelection::Mdd => "-mscrtlib=msvcrtd",
        CrtSelection::Mt => "-mscrtlib=libcmt",
        CrtSelection::Mtd => "-mscrtlib=libcmtd",
        CrtSelection::FromBuildtype => return None,
    };
    Some(vec![arg.to_string()])
}

fn to_args(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| a.to_string()).collect()
}
