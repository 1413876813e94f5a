//! Toolchain probes.
//!
//! These are the only operations that run the compiler: a sanity check
//! that builds and runs a trivial program, and discovery of the built-in
//! include and library search directories of GNU-style drivers.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use super::error::{CompilerError, Result};
use super::{Compiler, HostPlatform};
use crate::util::process::ProcessBuilder;

const QUOTE_SEARCH_START: &str = "#include \"...\" search starts here:";
const ANGLE_SEARCH_START: &str = "#include <...> search starts here:";
const SEARCH_END: &str = "End of search list.";

// clang separates Windows search paths with `:` as well.
static WINDOWS_SEARCH_SEP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":([^/\\])").unwrap());

fn exelist_builder(exelist: &[String]) -> Result<ProcessBuilder> {
    ProcessBuilder::from_exelist(exelist)
        .ok_or_else(|| CompilerError::MalformedArgument("empty compiler command".to_string()))
}

fn spawn_error(pb: &ProcessBuilder, err: anyhow::Error) -> CompilerError {
    CompilerError::Spawn {
        command: pb.display_command(),
        message: format!("{:#}", err),
    }
}

/// Compile and run a trivial program in `work_dir`.
///
/// Fails with [`CompilerError::ToolchainBroken`] if the compiler cannot
/// produce a program or the program does not run successfully. The
/// compiler's own diagnostics are appended to the reason.
pub fn sanity_check(compiler: &dyn Compiler, work_dir: &Path) -> Result<()> {
    // The compiler runs inside work_dir, so every path handed to it must
    // be absolute.
    let work_dir = std::path::absolute(work_dir)?;
    let work_dir = work_dir.as_path();

    let (kind, source_name, source) = if compiler.family().is_d() {
        ("D compiler", "sanity.d", "void main() { }")
    } else {
        ("C compiler", "sanity.c", "int main(void) { return 0; }\n")
    };

    let source_path = work_dir.join(source_name);
    std::fs::write(&source_path, source)?;

    let mut output_path = work_dir.join("dtest");
    if compiler.identity().host.is_windows() {
        output_path.set_extension("exe");
    }
    let output_name = output_path.to_string_lossy().into_owned();

    let name = compiler.name_string();
    let pb = exelist_builder(compiler.exelist())?
        .args(compiler.output_args(&output_name))
        .args(compiler.target_arch_args())
        .arg(&source_path)
        .cwd(work_dir);

    let diagnostics = match pb.exec() {
        Ok(output) if output.status.success() => None,
        Ok(output) => Some(String::from_utf8_lossy(&output.stderr).trim_end().to_string()),
        Err(e) => Some(format!("{:#}", e)),
    };
    if let Some(diagnostics) = diagnostics {
        let mut reason = format!("{} can not compile programs", kind);
        if !diagnostics.is_empty() {
            reason.push('\n');
            reason.push_str(&diagnostics);
        }
        return Err(CompilerError::broken(name, reason));
    }

    let ran = match ProcessBuilder::new(&output_path).cwd(work_dir).status() {
        Ok(status) => status.success(),
        Err(e) => {
            tracing::debug!("sanity check program failed to start: {:#}", e);
            false
        }
    };
    if !ran {
        return Err(CompilerError::broken(
            name,
            format!("Executables created by {} are not runnable", kind),
        ));
    }

    Ok(())
}

/// Built-in include directories of a GNU-style driver for `language`.
///
/// Runs `<exe> -x<language> -E -v -` and parses the search list it prints
/// on stderr. The exit status is not checked.
pub fn default_include_dirs(exelist: &[String], language: &str) -> Result<Vec<String>> {
    let language = if language == "cpp" { "c++" } else { language };

    let pb = exelist_builder(exelist)?
        .arg(format!("-x{}", language))
        .args(["-E", "-v", "-"])
        .env("LC_ALL", "C");

    let output = pb.exec().map_err(|e| spawn_error(&pb, e))?;
    let stderr = String::from_utf8_lossy(&output.stderr);

    Ok(collect_include_dirs(&stderr, &pb.display_command()))
}

/// Parse the include search list, warning once if it is empty.
pub fn collect_include_dirs(stderr: &str, command: &str) -> Vec<String> {
    let paths = parse_include_search_list(stderr);
    if paths.is_empty() {
        tracing::warn!("No include directory found parsing \"{}\" output", command);
    }
    paths
}

/// Extract the paths between the search list markers of `-v` output.
///
/// Each path line starts with a single space, which is dropped.
pub fn parse_include_search_list(stderr: &str) -> Vec<String> {
    enum State {
        Outside,
        Quoted,
        Angle,
    }

    let mut state = State::Outside;
    let mut paths = Vec::new();

    for line in stderr.split('\n') {
        match state {
            State::Outside => {
                if line == QUOTE_SEARCH_START {
                    state = State::Quoted;
                }
            }
            State::Quoted => {
                if line == ANGLE_SEARCH_START {
                    state = State::Angle;
                } else {
                    paths.push(line.chars().skip(1).collect());
                }
            }
            State::Angle => {
                if line == SEARCH_END {
                    break;
                }
                paths.push(line.chars().skip(1).collect());
            }
        }
    }

    paths
}

/// Output of `<exe> --print-search-dirs`.
pub fn search_dirs(exelist: &[String]) -> Result<String> {
    let pb = exelist_builder(exelist)?.arg("--print-search-dirs");
    let output = pb.exec().map_err(|e| spawn_error(&pb, e))?;
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Existing directories listed on the `name:` line of search-dir output.
pub fn compiler_dirs(output: &str, name: &str, host: HostPlatform) -> Vec<PathBuf> {
    let prefix = format!("{}:", name);
    for line in output.split('\n') {
        if line.starts_with(&prefix) {
            let pathstr = line.split_once('=').map(|(_, rest)| rest).unwrap_or_default();
            return fetch_real_dirs(pathstr, host);
        }
    }
    Vec::new()
}

/// Split a search path on the separator the driver uses on `host`.
///
/// clang prints `:` between Windows paths (`C:\a:C:\b`), which is
/// repaired to `;` first. Empty entries are dropped.
pub fn split_search_path(pathstr: &str, host: HostPlatform) -> Vec<String> {
    let (pathstr, sep) = if host.is_windows() {
        let repaired = WINDOWS_SEARCH_SEP.replace_all(pathstr, ";${1}").into_owned();
        (repaired, ';')
    } else {
        (pathstr.to_string(), ':')
    };

    pathstr
        .split(sep)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

// GCC prints paths like /usr/lib/gcc/x86_64-linux-gnu/8/../../../../lib.
// On a merged /usr the resolved form loses the /lib spelling, so both
// spellings are kept.
fn fetch_real_dirs(pathstr: &str, host: HostPlatform) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for p in split_search_path(pathstr, host) {
        let path = PathBuf::from(&p);
        if !path.exists() {
            continue;
        }
        if !result.contains(&path) {
            result.push(path.clone());
        }
        if let Ok(resolved) = path.canonicalize() {
            if !result.contains(&resolved) {
                result.push(resolved);
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compilers::CompilerFamily;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use tempfile::TempDir;
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    // Path lines carry the single leading space gcc prints.
    const GCC_VERBOSE: &str = concat!(
        "Using built-in specs.\n",
        "ignoring nonexistent directory \"/usr/local/include/x86_64-linux-gnu\"\n",
        "#include \"...\" search starts here:\n",
        " /opt/quoted\n",
        "#include <...> search starts here:\n",
        " /usr/lib/gcc/x86_64-linux-gnu/9/include\n",
        " /usr/local/include\n",
        " /usr/include\n",
        "End of search list.\n",
        " /not/a/path\n",
    );

    const GCC_INCLUDE_DIRS: [&str; 4] = [
        "/opt/quoted",
        "/usr/lib/gcc/x86_64-linux-gnu/9/include",
        "/usr/local/include",
        "/usr/include",
    ];

    struct WarnCounter(Arc<AtomicUsize>);

    impl<S: Subscriber> Layer<S> for WarnCounter {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn count_warnings<T>(f: impl FnOnce() -> T) -> (T, usize) {
        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarnCounter(count.clone()));
        let value = tracing::subscriber::with_default(subscriber, f);
        (value, count.load(Ordering::SeqCst))
    }

    #[test]
    fn test_parse_include_search_list() {
        assert!(GCC_VERBOSE.contains("\n /opt/quoted\n"));
        assert_eq!(parse_include_search_list(GCC_VERBOSE), GCC_INCLUDE_DIRS);
    }

    #[test]
    fn test_empty_search_list_warns_once() {
        let (paths, warnings) = count_warnings(|| collect_include_dirs("gcc: fatal error\n", "gcc -xc -E -v -"));
        assert!(paths.is_empty());
        assert_eq!(warnings, 1);

        let (paths, warnings) = count_warnings(|| collect_include_dirs(GCC_VERBOSE, "gcc -xc -E -v -"));
        assert_eq!(paths, GCC_INCLUDE_DIRS);
        assert_eq!(warnings, 0);
    }

    #[test]
    fn test_split_search_path() {
        assert_eq!(
            split_search_path("/usr/lib::/lib", HostPlatform::Other),
            vec!["/usr/lib", "/lib"]
        );
        assert_eq!(
            split_search_path("C:\\a:C:\\b;D:/c", HostPlatform::Windows),
            vec!["C:\\a", "C:\\b", "D:/c"]
        );
    }

    #[test]
    fn test_compiler_dirs_keeps_existing_dirs() {
        let tmp = TempDir::new().unwrap();
        let lib = tmp.path().join("lib");
        std::fs::create_dir(&lib).unwrap();
        let dotted = tmp.path().join("lib/../lib");

        let output = format!(
            "install: /usr/lib/gcc/\nprograms: =/nonexistent\nlibraries: ={}:{}:/nonexistent/quay:{}\n",
            lib.display(),
            dotted.display(),
            lib.display()
        );
        let dirs = compiler_dirs(&output, "libraries", HostPlatform::Other);
        let resolved = lib.canonicalize().unwrap();

        assert_eq!(dirs[0], lib);
        assert!(dirs.contains(&dotted));
        assert!(dirs.contains(&resolved));
        // No duplicates
        let mut unique = dirs.clone();
        unique.dedup();
        assert_eq!(unique.len(), dirs.len());

        assert!(compiler_dirs(&output, "programs", HostPlatform::Other).is_empty());
        assert!(compiler_dirs(&output, "missing", HostPlatform::Other).is_empty());
    }

    #[test]
    fn test_empty_exelist_is_malformed() {
        assert!(matches!(
            search_dirs(&[]),
            Err(CompilerError::MalformedArgument(_))
        ));
    }

    #[test]
    fn test_missing_compiler_is_a_spawn_error() {
        let exelist = vec!["/nonexistent/quay-gcc".to_string()];
        assert!(matches!(
            default_include_dirs(&exelist, "c"),
            Err(CompilerError::Spawn { .. })
        ));
    }

    #[cfg(unix)]
    mod fake_compiler {
        use super::*;
        use crate::compilers::{compiler_for, CompilerIdentity};
        use std::os::unix::fs::PermissionsExt;

        // Accepts `-o FILE` and `-of=FILE`, writes a program exiting with
        // @STATUS@ there.
        const FAKE_COMPILER: &str = r#"#!/bin/sh
out=""
while [ $# -gt 0 ]; do
  case "$1" in
    -o) shift; out="$1" ;;
    -of=*) out="${1#-of=}" ;;
  esac
  shift
done
[ -n "$out" ] || exit 1
printf '#!/bin/sh\nexit @STATUS@\n' > "$out"
chmod +x "$out"
"#;

        fn write_script(dir: &Path, name: &str, contents: &str) -> String {
            let path = dir.join(name);
            std::fs::write(&path, contents).unwrap();
            let mut perms = std::fs::metadata(&path).unwrap().permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&path, perms).unwrap();
            path.to_string_lossy().into_owned()
        }

        fn check(family: CompilerFamily, exe: String, work_dir: &Path) -> Result<()> {
            let identity = CompilerIdentity::new(family, "1.30.0").with_host(HostPlatform::Other);
            let compiler = compiler_for(identity, vec![exe]);
            sanity_check(compiler.as_ref(), work_dir)
        }

        #[test]
        fn test_sanity_check_passes() {
            let tools = TempDir::new().unwrap();
            let work = TempDir::new().unwrap();
            let exe = write_script(tools.path(), "fake-ldc2", &FAKE_COMPILER.replace("@STATUS@", "0"));

            check(CompilerFamily::Ldc, exe.clone(), work.path()).unwrap();
            assert!(work.path().join("sanity.d").exists());
            assert!(work.path().join("dtest").exists());

            check(CompilerFamily::Gnu, exe, work.path()).unwrap();
            assert!(work.path().join("sanity.c").exists());
        }

        #[test]
        fn test_sanity_check_compile_failure() {
            let work = TempDir::new().unwrap();
            let err = check(CompilerFamily::Dmd, "/bin/false".to_string(), work.path()).unwrap_err();
            assert!(matches!(err, CompilerError::ToolchainBroken { .. }));
            assert!(err.to_string().contains("can not compile programs"));

            let err = check(CompilerFamily::Dmd, "/nonexistent/dmd".to_string(), work.path()).unwrap_err();
            assert!(err.to_string().contains("can not compile programs"));
        }

        #[test]
        fn test_sanity_check_reports_compiler_output() {
            let tools = TempDir::new().unwrap();
            let work = TempDir::new().unwrap();
            let exe = write_script(
                tools.path(),
                "broken-dmd",
                "#!/bin/sh\necho 'sanity.d(1): Error: object.d not found' >&2\nexit 1\n",
            );

            let err = check(CompilerFamily::Dmd, exe, work.path()).unwrap_err();
            let message = err.to_string();
            assert!(message.contains("D compiler can not compile programs"));
            assert!(message.contains("sanity.d(1): Error: object.d not found"));
        }

        #[test]
        fn test_sanity_check_relative_work_dir() {
            let tools = TempDir::new().unwrap();
            let exe = write_script(tools.path(), "fake-ldc2", &FAKE_COMPILER.replace("@STATUS@", "0"));

            let work = TempDir::new_in(".").unwrap();
            let relative = Path::new(".").join(work.path().file_name().unwrap());

            check(CompilerFamily::Ldc, exe, &relative).unwrap();
            assert!(work.path().join("sanity.d").exists());
            assert!(work.path().join("dtest").exists());
        }

        #[test]
        fn test_sanity_check_run_failure() {
            let tools = TempDir::new().unwrap();
            let work = TempDir::new().unwrap();
            let exe = write_script(tools.path(), "fake-gdc", &FAKE_COMPILER.replace("@STATUS@", "3"));

            let err = check(CompilerFamily::Gdc, exe, work.path()).unwrap_err();
            assert!(matches!(err, CompilerError::ToolchainBroken { .. }));
            assert!(err.to_string().contains("are not runnable"));
        }

        #[test]
        fn test_default_include_dirs_from_fake_driver() {
            let tools = TempDir::new().unwrap();
            let script = format!(
                "#!/bin/sh\n[ \"$1\" = \"-xc++\" ] || exit 1\n[ \"$LC_ALL\" = \"C\" ] || exit 1\ncat >&2 <<'EOF'\n{}EOF\n",
                GCC_VERBOSE
            );
            let exe = write_script(tools.path(), "fake-g++", &script);

            let dirs = default_include_dirs(&[exe.clone()], "cpp").unwrap();
            assert_eq!(dirs, GCC_INCLUDE_DIRS);

            // A driver rejecting the language prints nothing useful.
            let (dirs, warnings) = count_warnings(|| default_include_dirs(&[exe], "d").unwrap());
            assert!(dirs.is_empty());
            assert_eq!(warnings, 1);
        }

        #[test]
        fn test_search_dirs_from_fake_driver() {
            let tools = TempDir::new().unwrap();
            let script = format!(
                "#!/bin/sh\n[ \"$1\" = \"--print-search-dirs\" ] || exit 1\necho 'programs: =/nonexistent'\necho 'libraries: ={}'\n",
                tools.path().display()
            );
            let exe = write_script(tools.path(), "fake-gcc", &script);

            let output = search_dirs(&[exe]).unwrap();
            let dirs = compiler_dirs(&output, "libraries", HostPlatform::Other);
            assert_eq!(dirs[0], tools.path());
        }
    }
}
