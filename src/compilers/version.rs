//! Version comparison for compiler version strings.
//!
//! Compilers report versions that are not always valid semver: `4.9`,
//! `2.086.1` (leading zeros), `10.2.1-6ubuntu1`. These are normalized to
//! their leading numeric components before comparing with `semver`.

use semver::{Version, VersionReq};

/// Parse a compiler version leniently.
///
/// Takes up to three leading dot-separated numeric components, padding
/// missing ones with zero. Anything after the numeric prefix is ignored.
pub fn parse_lenient(raw: &str) -> Option<Version> {
    let raw = raw.trim().trim_start_matches('v');
    let numeric: &str = raw
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .map(|end| &raw[..end])
        .unwrap_or(raw);

    let mut parts = numeric
        .split('.')
        .take(3)
        .map(|p| p.parse::<u64>().ok());

    let major = parts.next().flatten()?;
    let minor = parts.next().flatten().unwrap_or(0);
    let patch = parts.next().flatten().unwrap_or(0);

    Some(Version::new(major, minor, patch))
}

/// Check whether `version` satisfies `req` (e.g. `>=4.9.0`).
///
/// Unparseable versions or requirements never match.
pub fn version_compare(version: &str, req: &str) -> bool {
    let Ok(req) = VersionReq::parse(req) else {
        tracing::debug!("invalid version requirement `{}`", req);
        return false;
    };
    match parse_lenient(version) {
        Some(v) => req.matches(&v),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lenient() {
        assert_eq!(parse_lenient("4.9"), Some(Version::new(4, 9, 0)));
        assert_eq!(parse_lenient("2.086.1"), Some(Version::new(2, 86, 1)));
        assert_eq!(parse_lenient("10.2.1-6ubuntu1"), Some(Version::new(10, 2, 1)));
        assert_eq!(parse_lenient("v1.30.0"), Some(Version::new(1, 30, 0)));
        assert_eq!(parse_lenient("7"), Some(Version::new(7, 0, 0)));
        assert_eq!(parse_lenient("unknown"), None);
    }

    #[test]
    fn test_version_compare() {
        assert!(version_compare("4.9.0", ">=4.9.0"));
        assert!(version_compare("8.3", ">=4.9"));
        assert!(!version_compare("4.8.5", ">=4.9.0"));
        assert!(!version_compare("7.0.1", ">=7.1"));
        assert!(version_compare("7.1.0", ">=7.1"));
        assert!(version_compare("4.7.2", "<4.8.0"));
        assert!(!version_compare("garbage", ">=1.0.0"));
    }
}
