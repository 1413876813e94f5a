//! D feature arguments: unittest mode, conditional debug and version
//! identifiers, and string import directories.
//!
//! A [`FeatureRequest`] is consumed key by key. Whatever is left once all
//! known keys have been handled is reported as unknown.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::{CompilerError, Result};
use super::flags;
use super::policy::Capability;
use super::{CompilerFamily, CompilerIdentity};

/// A string import directory description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDir {
    /// Base directory, relative to the source root
    pub curdir: String,
    /// Subdirectories of `curdir`, in order
    #[serde(default)]
    pub incdirs: Vec<String>,
}

impl ImportDir {
    pub fn new(curdir: impl Into<String>, incdirs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        ImportDir {
            curdir: curdir.into(),
            incdirs: incdirs.into_iter().map(Into::into).collect(),
        }
    }

    /// Effective directories, one per subdirectory.
    ///
    /// An empty or `.` subdirectory stands for the base itself, avoiding a
    /// trailing `/.`.
    pub fn expanded(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.incdirs.iter().map(move |idir| {
            if idir.is_empty() || idir == "." {
                PathBuf::from(&self.curdir)
            } else {
                Path::new(&self.curdir).join(idir)
            }
        })
    }
}

/// Value of a feature request entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Bool(bool),
    Int(i64),
    Str(String),
    ImportDir(ImportDir),
    List(Vec<FeatureValue>),
}

impl From<bool> for FeatureValue {
    fn from(v: bool) -> Self {
        FeatureValue::Bool(v)
    }
}

impl From<i64> for FeatureValue {
    fn from(v: i64) -> Self {
        FeatureValue::Int(v)
    }
}

impl From<&str> for FeatureValue {
    fn from(v: &str) -> Self {
        FeatureValue::Str(v.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(v: String) -> Self {
        FeatureValue::Str(v)
    }
}

impl From<ImportDir> for FeatureValue {
    fn from(v: ImportDir) -> Self {
        FeatureValue::ImportDir(v)
    }
}

impl<T: Into<FeatureValue>> From<Vec<T>> for FeatureValue {
    fn from(v: Vec<T>) -> Self {
        FeatureValue::List(v.into_iter().map(Into::into).collect())
    }
}

impl FeatureValue {
    fn kind(&self) -> &'static str {
        match self {
            FeatureValue::Bool(_) => "boolean",
            FeatureValue::Int(_) => "integer",
            FeatureValue::Str(_) => "string",
            FeatureValue::ImportDir(_) => "import directory",
            FeatureValue::List(_) => "list",
        }
    }

    /// A single value or the elements of a list.
    fn into_items(self) -> Vec<FeatureValue> {
        match self {
            FeatureValue::List(items) => items,
            other => vec![other],
        }
    }
}

/// Feature keyword arguments for a D target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureRequest {
    entries: BTreeMap<String, FeatureValue>,
}

impl FeatureRequest {
    pub fn new() -> Self {
        FeatureRequest::default()
    }

    /// Add an entry.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FeatureValue>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Insert an entry, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FeatureValue>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Remove and return an entry.
    pub fn take(&mut self, key: &str) -> Option<FeatureValue> {
        self.entries.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remaining keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// Builds feature arguments for one compiler.
#[derive(Debug, Clone)]
pub struct FeatureArgBuilder {
    family: CompilerFamily,
    compiler: String,
}

impl FeatureArgBuilder {
    pub fn new(identity: &CompilerIdentity) -> Self {
        FeatureArgBuilder {
            family: identity.family,
            compiler: identity.to_string(),
        }
    }

    /// Convert a feature request into arguments.
    ///
    /// Keys are consumed in the order `unittest`, `debug`, `versions`,
    /// `import_dirs`. `build_to_src` is the path from the build directory
    /// to the source root; import directories are resolved against it.
    pub fn build(&self, request: &mut FeatureRequest, build_to_src: &Path) -> Result<Vec<String>> {
        let table = flags::d_feature_args(self.family);
        let mut res = Vec::new();

        if let Some(value) = request.take("unittest") {
            let flag = self.flag(Capability::Unittest, table.and_then(|t| t.unittest))?;
            match value {
                FeatureValue::Bool(true) => res.push(flag.to_string()),
                FeatureValue::Bool(false) => {}
                other => {
                    return Err(CompilerError::MalformedArgument(format!(
                        "`unittest` must be a boolean, got {}",
                        other.kind()
                    )))
                }
            }
        }

        if let Some(value) = request.take("debug") {
            let flag = self.flag(Capability::DebugIdentifiers, table.and_then(|t| t.debug))?;
            res.extend(conditional_args(flag, "debug", value)?);
        }

        if let Some(value) = request.take("versions") {
            let flag = self.flag(Capability::VersionIdentifiers, table.and_then(|t| t.version))?;
            res.extend(conditional_args(flag, "versions", value)?);
        }

        if let Some(value) = request.take("import_dirs") {
            let flag = self.flag(Capability::ImportDirs, table.and_then(|t| t.import_dir))?;
            for item in value.into_items() {
                let idir = match item {
                    FeatureValue::ImportDir(idir) => idir,
                    other => {
                        return Err(CompilerError::MalformedArgument(format!(
                            "`import_dirs` entries must be import directories, got {}",
                            other.kind()
                        )))
                    }
                };
                for expdir in idir.expanded() {
                    let srctreedir = build_to_src.join(expdir);
                    res.push(format!("{}{}", flag, srctreedir.display()));
                }
            }
        }

        if !request.is_empty() {
            return Err(CompilerError::UnknownFeature {
                keys: request.keys().map(str::to_string).collect(),
            });
        }

        Ok(res)
    }

    fn flag(&self, capability: Capability, flag: Option<&'static str>) -> Result<&'static str> {
        flag.ok_or_else(|| CompilerError::unsupported(&self.compiler, capability))
    }
}

/// `FLAG=identifier` for every identifier, then `FLAG=level` once for the
/// highest numeric level.
fn conditional_args(flag: &str, key: &str, value: FeatureValue) -> Result<Vec<String>> {
    let mut args = Vec::new();
    let mut level: i64 = -1;

    for item in value.into_items() {
        match item {
            FeatureValue::Int(n) => level = level.max(n),
            FeatureValue::Str(s) if is_digits(&s) => {
                let n = s.parse::<i64>().map_err(|_| {
                    CompilerError::MalformedArgument(format!("`{}` level `{}` is out of range", key, s))
                })?;
                level = level.max(n);
            }
            FeatureValue::Str(s) => args.push(format!("{}={}", flag, s)),
            other => {
                return Err(CompilerError::MalformedArgument(format!(
                    "`{}` values must be integers or strings, got {}",
                    key,
                    other.kind()
                )))
            }
        }
    }

    if level >= 0 {
        args.push(format!("{}={}", flag, level));
    }

    Ok(args)
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
