//! Capability policy - which options a compiler can honour.
//!
//! Capabilities are facts about a family at a given version on a given
//! host. An unsupported capability is either a soft gate (the option is
//! silently dropped, e.g. color diagnostics on an old GCC) or a hard gate
//! (the request fails with [`CompilerError::UnsupportedFeature`]).

use std::fmt;

use super::error::{CompilerError, Result};
use super::flags::{self, AbstractOption};
use super::{CompilerFamily, CompilerIdentity};

/// A capability an option or feature request depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Optimization,
    Debug,
    Visibility,
    InstructionSet,
    Sanitizer,
    ColorOutput,
    Pic,
    Pie,
    Coverage,
    DependencyGen,
    Unittest,
    DebugIdentifiers,
    VersionIdentifiers,
    ImportDirs,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Optimization => "optimization",
            Capability::Debug => "debug info",
            Capability::Visibility => "symbol visibility",
            Capability::InstructionSet => "instruction set selection",
            Capability::Sanitizer => "sanitizers",
            Capability::ColorOutput => "colored diagnostics",
            Capability::Pic => "position-independent code",
            Capability::Pie => "position-independent executables",
            Capability::Coverage => "coverage",
            Capability::DependencyGen => "dependency file generation",
            Capability::Unittest => "the \"unittest\" feature",
            Capability::DebugIdentifiers => "conditional debug identifiers",
            Capability::VersionIdentifiers => "conditional version identifiers",
            Capability::ImportDirs => "the \"string import directories\" feature",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a compiler supports a capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Support {
    /// Flags come from the table
    Supported,
    /// Not available; requests degrade to no flags
    Soft,
    /// Not available; requests fail
    Hard,
}

/// Decide how `identity` supports `capability`.
pub fn support(identity: &CompilerIdentity, capability: Capability) -> Support {
    use CompilerFamily::*;

    let family = identity.family;
    match capability {
        Capability::Optimization | Capability::Debug => Support::Supported,

        Capability::Visibility | Capability::Sanitizer => match family {
            Gnu | Gdc => Support::Supported,
            Ldc | Dmd => Support::Soft,
        },

        Capability::InstructionSet => match family {
            Gnu | Gdc => Support::Supported,
            Ldc | Dmd => Support::Hard,
        },

        // -fdiagnostics-color appeared in GCC 4.9.
        Capability::ColorOutput => match family {
            Gnu | Gdc if !identity.version_matches(">=4.9.0") => Support::Soft,
            _ => Support::Supported,
        },

        // PIC is always on for Windows (and macOS for C); the flag is
        // rejected or ignored there. ldc2 spells it as a codegen option
        // and accepts it everywhere.
        Capability::Pic => {
            if identity.host.is_windows() && family != Ldc {
                Support::Soft
            } else if identity.host.is_osx() && family == Gnu {
                Support::Soft
            } else {
                Support::Supported
            }
        }

        Capability::Pie => match family {
            Gnu | Gdc => Support::Supported,
            Ldc | Dmd => Support::Hard,
        },

        Capability::Coverage => match family {
            Gdc => Support::Hard,
            _ => Support::Supported,
        },

        // gdc had broken dependency output before 7.1; ldc2 and dmd do not
        // emit Makefile-compatible dependency info at all.
        Capability::DependencyGen => match family {
            Gnu => Support::Supported,
            Gdc if identity.version_matches(">=7.1") => Support::Supported,
            Gdc | Ldc | Dmd => Support::Soft,
        },

        Capability::Unittest
        | Capability::DebugIdentifiers
        | Capability::VersionIdentifiers
        | Capability::ImportDirs => {
            let Some(table) = flags::d_feature_args(family) else {
                return Support::Hard;
            };
            let flag = match capability {
                Capability::Unittest => table.unittest,
                Capability::DebugIdentifiers => table.debug,
                Capability::VersionIdentifiers => table.version,
                _ => table.import_dir,
            };
            if flag.is_some() {
                Support::Supported
            } else {
                Support::Hard
            }
        }
    }
}

/// Check whether `identity` fully supports `capability`.
pub fn is_supported(identity: &CompilerIdentity, capability: Capability) -> bool {
    support(identity, capability) == Support::Supported
}

/// Resolve an option to flags, honouring soft and hard gates.
pub fn gate(identity: &CompilerIdentity, option: &AbstractOption) -> Result<Vec<String>> {
    match support(identity, option.capability()) {
        Support::Supported => flags::lookup(identity.family, option)
            .ok_or_else(|| CompilerError::unsupported(identity, option)),
        Support::Soft => {
            tracing::debug!("{} does not support {}, ignoring", identity, option);
            Ok(Vec::new())
        }
        Support::Hard => Err(CompilerError::unsupported(identity, option)),
    }
}
