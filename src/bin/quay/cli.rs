//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use quay::compilers::{
    BuildType, ColorMode, CompilerFamily, CrtSelection, HostPlatform, OptimizationLevel,
    TargetArch, Visibility, WarnLevel,
};

/// quay - compiler argument translation for GNU and D toolchains
#[derive(Parser)]
#[command(name = "quay")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the compiler arguments for a set of build options
    Args(ArgsArgs),

    /// Convert a JSON feature request into compiler arguments
    Features(FeaturesArgs),

    /// Rewrite GNU-style arguments into the compiler's own dialect
    Translate(TranslateArgs),

    /// Make include and library search paths absolute
    Absolutize(AbsolutizeArgs),

    /// Run the compiler to check it or query its defaults
    Probe(ProbeArgs),
}

/// Which compiler to generate arguments for.
///
/// Anything not given here is read from `.quay/toolchain.toml` and then
/// `~/.quay/toolchain.toml`.
#[derive(Args, Debug, Clone, Default)]
pub struct IdentityArgs {
    /// Compiler family (gcc, gdc, ldc, dmd)
    #[arg(long)]
    pub family: Option<CompilerFamily>,

    /// Compiler version (e.g. 1.30.0)
    #[arg(long)]
    pub compiler_version: Option<String>,

    /// Target architecture (x86, x86_64, x86_mscoff, aarch64, arm, other)
    #[arg(long)]
    pub arch: Option<TargetArch>,

    /// Host platform (windows, osx, other)
    #[arg(long)]
    pub host: Option<HostPlatform>,

    /// Compiler executable
    #[arg(long, env = "DC")]
    pub exe: Option<PathBuf>,
}

#[derive(Args)]
pub struct ArgsArgs {
    #[command(flatten)]
    pub identity: IdentityArgs,

    /// Optimization level (0, g, 1, 2, 3, s)
    #[arg(long)]
    pub optimization: Option<OptimizationLevel>,

    /// Generate debug info
    #[arg(long)]
    pub debug: bool,

    /// Position-independent code
    #[arg(long)]
    pub pic: bool,

    /// Position-independent executable
    #[arg(long)]
    pub pie: bool,

    /// Symbol visibility (default, internal, hidden, protected, inlineshidden)
    #[arg(long)]
    pub visibility: Option<Visibility>,

    /// Instruction-set extension (e.g. sse41, avx2, neon)
    #[arg(long)]
    pub instruction_set: Option<String>,

    /// Sanitizer value (e.g. address, address,undefined)
    #[arg(long)]
    pub sanitize: Option<String>,

    /// Diagnostic colors (auto, always, never)
    #[arg(long)]
    pub color: Option<ColorMode>,

    /// Coverage instrumentation
    #[arg(long)]
    pub coverage: bool,

    /// Warning level (0-3)
    #[arg(long)]
    pub warn_level: Option<WarnLevel>,

    /// Treat warnings as errors
    #[arg(long)]
    pub werror: bool,

    /// Build type (plain, debug, debugoptimized, release, minsize, custom)
    #[arg(long, default_value = "debug")]
    pub buildtype: BuildType,

    /// MS C runtime (none, md, mdd, mt, mtd, from_buildtype)
    #[arg(long)]
    pub crt: Option<CrtSelection>,

    /// Include directory (repeatable)
    #[arg(short = 'I', long = "include")]
    pub include: Vec<String>,

    /// Output file
    #[arg(short, long)]
    pub output: Option<String>,

    /// Print link-step arguments instead of compile-step arguments
    #[arg(long)]
    pub link: bool,

    /// Emit a JSON array
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct FeaturesArgs {
    #[command(flatten)]
    pub identity: IdentityArgs,

    /// Feature request as JSON, e.g. '{"unittest": true, "versions": ["X", 2]}'
    pub request: String,

    /// Path from the build directory to the source root
    #[arg(long, default_value = ".")]
    pub build_to_src: PathBuf,

    /// Emit a JSON array
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct TranslateArgs {
    #[command(flatten)]
    pub identity: IdentityArgs,

    /// Emit a JSON array
    #[arg(long)]
    pub json: bool,

    /// GNU-style arguments, e.g. from pkg-config
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(Args)]
pub struct AbsolutizeArgs {
    #[command(flatten)]
    pub identity: IdentityArgs,

    /// Build directory the paths are relative to
    #[arg(long)]
    pub build_dir: PathBuf,

    /// Emit a JSON array
    #[arg(long)]
    pub json: bool,

    /// Arguments to rewrite
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(Args)]
pub struct ProbeArgs {
    #[command(subcommand)]
    pub command: ProbeCommands,
}

#[derive(Subcommand)]
pub enum ProbeCommands {
    /// Compile and run a trivial program
    Sanity {
        #[command(flatten)]
        identity: IdentityArgs,
    },

    /// Print the built-in include directories of a GNU-style driver
    IncludeDirs {
        #[command(flatten)]
        identity: IdentityArgs,

        /// Language passed to -x (defaults to the compiler's language)
        #[arg(long)]
        lang: Option<String>,

        /// Emit a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Print a directory list from --print-search-dirs
    SearchDirs {
        #[command(flatten)]
        identity: IdentityArgs,

        /// Which list to print (libraries, programs)
        #[arg(long, default_value = "libraries")]
        name: String,

        /// Emit a JSON array
        #[arg(long)]
        json: bool,
    },
}
