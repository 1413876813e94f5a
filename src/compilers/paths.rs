//! Absolutizing path-bearing arguments.

use std::path::Path;

use super::CompilerFamily;
use crate::util::fs::normalize_lexically;

const GNU_PATH_PREFIXES: &[&str] = &["-I", "-L"];

// The ldc2/dmd spellings, including linker flags forwarded via -L.
const D_PATH_PREFIXES: &[&str] = &["-I=", "-L-L", "-L=-L", "-Wl,-L"];

/// Rewrites include and library search arguments to absolute paths.
#[derive(Debug, Clone, Copy)]
pub struct PathNormalizer {
    prefixes: &'static [&'static str],
}

impl PathNormalizer {
    pub fn for_family(family: CompilerFamily) -> Self {
        let prefixes = match family {
            CompilerFamily::Gnu | CompilerFamily::Gdc => GNU_PATH_PREFIXES,
            CompilerFamily::Ldc | CompilerFamily::Dmd => D_PATH_PREFIXES,
        };
        PathNormalizer { prefixes }
    }

    /// Rewrite every argument starting with a path prefix so that its path
    /// is `build_dir` joined with the original path, lexically normalized.
    ///
    /// Absolute paths stay where they are. Other arguments are untouched.
    pub fn absolutize<I, S>(&self, args: I, build_dir: &Path) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        args.into_iter()
            .map(|arg| {
                let arg = arg.as_ref();
                for prefix in self.prefixes {
                    if let Some(rest) = arg.strip_prefix(prefix) {
                        let path = normalize_lexically(&build_dir.join(rest));
                        return format!("{}{}", prefix, path.display());
                    }
                }
                arg.to_string()
            })
            .collect()
    }
}
