//! GNU-style argument translation for ldc2 and dmd.
//!
//! Dependency metadata (pkg-config files, mostly) is written for GNU
//! drivers. ldc2 and dmd accept linker arguments only through `-L=`, spell
//! include paths as `-I=`, and handle threads, stack protection and
//! preprocessor defines on their own. This module rewrites such arguments
//! token by token, left to right.
//!
//! Rules, first match wins for each token:
//!
//! 1. platform rewrites (Windows import libraries and C runtime, macOS
//!    install names)
//! 2. drop `-pthread`, `-fstack-protector*` and `-D*`
//! 3. unwrap `-Wl,a,b` into `-L=a -L=b`
//! 4. keep ldc2 link-control options (`-link-defaultlib*`, `-linker*`, ...)
//! 5. wrap `-lNAME` as `-L=-lNAME`
//! 6. rewrite `-isystem` to the native include flag
//! 7. guess whether `-L/...` names a search directory or a static archive
//! 8. wrap bare `*.a` / `*.lib` files as `-L=file`
//! 9. pass anything else through
//!
//! Rule 7 decides by file extension alone, so an archive without the usual
//! suffix is treated as a directory. Tools downstream rely on this exact
//! behaviour.

use super::{CompilerFamily, HostPlatform};

/// Prefixes that ldc2 treats as its own link-control options.
///
/// `-link-defaultlib-shared` does not name a library; it changes how the
/// D runtime is linked. `-linker=` selects the linker.
const LINK_CONTROL_PREFIXES: &[&str] = &[
    "-link-defaultlib",
    "-linker",
    "-link-internally",
    "-linkonce-templates",
    "-lib",
];

const STATIC_LIB_SUFFIXES: &[&str] = &[".a", ".lib"];

/// Rewrites GNU-style arguments into the dialect of a non-GNU D compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgumentTranslator {
    family: CompilerFamily,
}

impl ArgumentTranslator {
    /// Create a translator for `family`.
    ///
    /// Returns `None` for families that already speak the GNU dialect.
    pub fn new(family: CompilerFamily) -> Option<Self> {
        if family.is_gnu_dialect() {
            None
        } else {
            Some(ArgumentTranslator { family })
        }
    }

    /// The family this translator emits arguments for.
    pub fn family(&self) -> CompilerFamily {
        self.family
    }

    /// Translate a GNU-style argument vector.
    ///
    /// Token order is preserved and unmatched tokens pass through.
    pub fn to_native_dialect<I, S>(&self, args: I, host: HostPlatform) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = Vec::new();

        for arg in args {
            let arg = arg.as_ref();

            let os_args = match host {
                HostPlatform::Windows => self.translate_for_windows(arg),
                HostPlatform::Osx => translate_for_osx(arg),
                HostPlatform::Other => Vec::new(),
            };
            if !os_args.is_empty() {
                out.extend(os_args);
                continue;
            }

            if arg == "-pthread" || arg.starts_with("-fstack-protector") || arg.starts_with("-D") {
                tracing::trace!("dropping `{}`", arg);
                continue;
            }

            if let Some(rest) = arg.strip_prefix("-Wl,") {
                out.extend(rest.split(',').map(|la| format!("-L={}", la.trim())));
            } else if LINK_CONTROL_PREFIXES.iter().any(|p| arg.starts_with(p)) {
                out.push(arg.to_string());
            } else if arg.starts_with("-l") {
                out.push(format!("-L={}", arg));
            } else if arg.starts_with("-isystem") {
                // -isystem and -I are not equivalent; this covers the
                // common pkg-config cases only.
                match arg.strip_prefix("-isystem=") {
                    Some(path) => out.push(format!("-I={}", path)),
                    None => out.push("-I".to_string()),
                }
            } else if arg.starts_with("-L/") || arg.starts_with("-L./") {
                // A bare -L can't always be prefixed with -L=, the user may
                // already mean "pass this to the linker". Guess whether it
                // is a search path or a static library file.
                if is_static_lib_name(arg) {
                    out.push(format!("-L={}", &arg[2..]));
                } else {
                    out.push(format!("-L={}", arg));
                }
            } else if !arg.starts_with('-') && is_static_lib_name(arg) {
                out.push(format!("-L={}", arg));
            } else {
                out.push(arg.to_string());
            }
        }

        out
    }

    fn translate_for_windows(&self, arg: &str) -> Vec<String> {
        let mut args = Vec::new();

        if let Some(rest) = arg.strip_prefix("-Wl,") {
            for la in rest.split(',') {
                if let Some(implib) = la.strip_prefix("--out-implib=") {
                    args.push(format!("-L=/IMPLIB:{}", implib.trim()));
                }
            }
        } else if let Some(crt) = arg.strip_prefix("-mscrtlib=") {
            args.push(arg.to_string());
            let crt = crt.to_lowercase();
            if self.family == CompilerFamily::Ldc {
                // ldc2 links libcmt by default; other runtimes must exclude it.
                if crt != "libcmt" {
                    args.push("-L=/NODEFAULTLIB:libcmt".to_string());
                    args.push("-L=/NODEFAULTLIB:libvcruntime".to_string());
                }

                // printf family definitions moved out of msvcrt in VS2017.
                if crt.starts_with("msvcrt") {
                    args.push("-L=/DEFAULTLIB:legacy_stdio_definitions.lib".to_string());
                }
            }
        }

        args
    }
}

fn translate_for_osx(arg: &str) -> Vec<String> {
    if arg.starts_with("-install_name") {
        vec![format!("-L={}", arg)]
    } else {
        Vec::new()
    }
}

fn is_static_lib_name(arg: &str) -> bool {
    STATIC_LIB_SUFFIXES.iter().any(|s| arg.ends_with(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ldc() -> ArgumentTranslator {
        ArgumentTranslator::new(CompilerFamily::Ldc).unwrap()
    }

    fn dmd() -> ArgumentTranslator {
        ArgumentTranslator::new(CompilerFamily::Dmd).unwrap()
    }

    fn linux(t: ArgumentTranslator, args: &[&str]) -> Vec<String> {
        t.to_native_dialect(args, HostPlatform::Other)
    }

    #[test]
    fn test_gnu_families_need_no_translator() {
        assert!(ArgumentTranslator::new(CompilerFamily::Gnu).is_none());
        assert!(ArgumentTranslator::new(CompilerFamily::Gdc).is_none());
    }

    #[test]
    fn test_short_lib_flag_is_wrapped() {
        assert_eq!(linux(ldc(), &["-lfoo"]), vec!["-L=-lfoo"]);
        assert_eq!(
            dmd().to_native_dialect(["-lfoo"], HostPlatform::Windows),
            vec!["-L=-lfoo"]
        );
    }

    #[test]
    fn test_drops_thread_stack_protector_and_defines() {
        let args = linux(
            ldc(),
            &["-pthread", "-fstack-protector-strong", "-DFOO=1", "-lz"],
        );
        assert_eq!(args, vec!["-L=-lz"]);
    }

    #[test]
    fn test_linker_passthrough_is_split() {
        let args = linux(dmd(), &["-Wl,--as-needed, -rpath,/opt/lib"]);
        assert_eq!(args, vec!["-L=--as-needed", "-L=-rpath", "-L=/opt/lib"]);
    }

    #[test]
    fn test_link_control_options_pass_verbatim() {
        let args = linux(
            ldc(),
            &["-link-defaultlib-shared", "-linker=lld", "-link-internally", "-lib"],
        );
        assert_eq!(
            args,
            vec!["-link-defaultlib-shared", "-linker=lld", "-link-internally", "-lib"]
        );
    }

    #[test]
    fn test_isystem() {
        assert_eq!(linux(ldc(), &["-isystem=/usr/include/glib"]), vec!["-I=/usr/include/glib"]);
        assert_eq!(linux(ldc(), &["-isystem/usr/include"]), vec!["-I"]);
    }

    #[test]
    fn test_library_path_heuristic() {
        assert_eq!(linux(ldc(), &["-L/usr/lib"]), vec!["-L=-L/usr/lib"]);
        assert_eq!(linux(ldc(), &["-L./build"]), vec!["-L=-L./build"]);
        assert_eq!(linux(ldc(), &["-L/usr/lib/libfoo.a"]), vec!["-L=/usr/lib/libfoo.a"]);
        assert_eq!(linux(ldc(), &["-L./foo.lib"]), vec!["-L=./foo.lib"]);
        // Archives without a known suffix are taken for directories.
        assert_eq!(linux(ldc(), &["-L/usr/lib/libfoo.so"]), vec!["-L=-L/usr/lib/libfoo.so"]);
    }

    #[test]
    fn test_bare_static_library_is_wrapped() {
        assert_eq!(linux(ldc(), &["static.a"]), vec!["-L=static.a"]);
        assert_eq!(linux(dmd(), &["path/to/foo.lib"]), vec!["-L=path/to/foo.lib"]);
    }

    #[test]
    fn test_unmatched_tokens_pass_through_in_order() {
        let args = linux(ldc(), &["-O2", "main.d", "-lfoo", "-version=X", "-L-rpath"]);
        assert_eq!(args, vec!["-O2", "main.d", "-L=-lfoo", "-version=X", "-L-rpath"]);
    }

    #[test]
    fn test_windows_import_library() {
        let args = ldc().to_native_dialect(["-Wl,--out-implib=x.lib"], HostPlatform::Windows);
        assert_eq!(args, vec!["-L=/IMPLIB:x.lib"]);

        // Without an import library the generic unwrap applies.
        let args = ldc().to_native_dialect(["-Wl,--as-needed"], HostPlatform::Windows);
        assert_eq!(args, vec!["-L=--as-needed"]);
    }

    #[test]
    fn test_windows_crt_exclusions_for_ldc() {
        let args = ldc().to_native_dialect(["-mscrtlib=msvcrt"], HostPlatform::Windows);
        assert_eq!(
            args,
            vec![
                "-mscrtlib=msvcrt",
                "-L=/NODEFAULTLIB:libcmt",
                "-L=/NODEFAULTLIB:libvcruntime",
                "-L=/DEFAULTLIB:legacy_stdio_definitions.lib",
            ]
        );

        let args = ldc().to_native_dialect(["-mscrtlib=LIBCMT"], HostPlatform::Windows);
        assert_eq!(args, vec!["-mscrtlib=LIBCMT"]);

        let args = dmd().to_native_dialect(["-mscrtlib=msvcrt"], HostPlatform::Windows);
        assert_eq!(args, vec!["-mscrtlib=msvcrt"]);
    }

    #[test]
    fn test_crt_flag_untouched_off_windows() {
        assert_eq!(linux(ldc(), &["-mscrtlib=msvcrt"]), vec!["-mscrtlib=msvcrt"]);
    }

    #[test]
    fn test_osx_install_name() {
        let args = dmd().to_native_dialect(["-install_name", "-lfoo"], HostPlatform::Osx);
        assert_eq!(args, vec!["-L=-install_name", "-L=-lfoo"]);
    }

    #[test]
    fn test_translation_is_deterministic() {
        let input = ["-Wl,-z,relro", "-lm", "libx.a", "-I/usr/include"];
        assert_eq!(linux(ldc(), &input), linux(ldc(), &input));
        assert_eq!(
            linux(ldc(), &input),
            vec!["-L=-z", "-L=relro", "-L=-lm", "-L=libx.a", "-I/usr/include"]
        );
    }
}
