//! package.json loading.
//!
//! The manifest is modelled as a typed record where every field is optional.
//! Fields are deserialized leniently: a value of the wrong JSON type is
//! treated exactly like a missing one, so a hand-edited manifest never fails
//! a build just because an unrelated field has an unexpected shape.

use indexmap::{IndexMap, IndexSet};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::entry::normalize;
use crate::error::ManifestError;

/// File name read from the working directory.
pub const MANIFEST_FILE: &str = "package.json";

/// The subset of package.json that drives a build.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub license: Option<String>,
    #[serde(default, deserialize_with = "lenient::author")]
    pub author: Option<String>,

    #[serde(default, deserialize_with = "lenient::string")]
    pub main: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub module: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub types: Option<String>,
    #[serde(default, deserialize_with = "lenient::bin")]
    pub bin: Option<Bin>,
    #[serde(default, deserialize_with = "lenient::object")]
    pub exports: Option<Exports>,

    #[serde(default, deserialize_with = "lenient::string_map")]
    pub dependencies: IndexMap<String, String>,
    #[serde(default, deserialize_with = "lenient::string_map")]
    pub dev_dependencies: IndexMap<String, String>,
    #[serde(default, deserialize_with = "lenient::string_map")]
    pub peer_dependencies: IndexMap<String, String>,
    #[serde(default, deserialize_with = "lenient::string_map")]
    pub optional_dependencies: IndexMap<String, String>,
}

/// The `bin` field in either of its npm forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bin {
    /// `"bin": "dist/cli.js"`
    Single(String),
    /// `"bin": { "tool": "dist/cli.js" }`
    Map(IndexMap<String, String>),
}

/// Conditional export paths. Only the conditions Bobun builds are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExportConditions {
    #[serde(default, deserialize_with = "lenient::string")]
    pub import: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub require: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub types: Option<String>,
}

/// The `exports` object, with conditions at the top level and/or under `"."`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Exports {
    #[serde(flatten)]
    pub conditions: ExportConditions,
    #[serde(rename = ".", default, deserialize_with = "lenient::object")]
    pub root: Option<ExportConditions>,
}

impl PackageManifest {
    /// Read `<cwd>/package.json`.
    pub async fn load(cwd: &Path) -> Result<Self, ManifestError> {
        let path = Self::path_in(cwd);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ManifestError::NotFound(path));
            }
            Err(e) => return Err(ManifestError::Io(e)),
        };

        Self::parse(&content, &path)
    }

    /// Parse manifest text. `path` is only used for error messages.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ManifestError> {
        let invalid = |source| ManifestError::InvalidJson {
            path: path.to_path_buf(),
            source,
        };

        let value: Value = serde_json::from_str(content).map_err(invalid)?;
        if !value.is_object() {
            return Err(ManifestError::NotAnObject(path.to_path_buf()));
        }

        Self::deserialize(value).map_err(invalid)
    }

    /// Package names that must stay external `import`s.
    ///
    /// Union of the keys of all four dependency maps, in first-seen order.
    pub fn externals(&self) -> Vec<String> {
        let all: IndexSet<&String> = self
            .dependencies
            .keys()
            .chain(self.dev_dependencies.keys())
            .chain(self.peer_dependencies.keys())
            .chain(self.optional_dependencies.keys())
            .collect();

        all.into_iter().cloned().collect()
    }

    /// Raw `bin` paths in declaration order.
    pub fn bin_paths(&self) -> Vec<&str> {
        match &self.bin {
            None => Vec::new(),
            Some(Bin::Single(path)) => vec![path.as_str()],
            Some(Bin::Map(map)) => map.values().map(String::as_str).collect(),
        }
    }

    /// Normalized paths of every `bin` target.
    pub fn bin_targets(&self) -> IndexSet<String> {
        self.bin_paths()
            .into_iter()
            .filter_map(normalize)
            .collect()
    }

    /// Manifest location for a working directory.
    pub fn path_in(cwd: &Path) -> PathBuf {
        cwd.join(MANIFEST_FILE)
    }
}

/// Deserializers that turn wrongly-typed values into "absent".
mod lenient {
    use super::Bin;
    use indexmap::IndexMap;
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::{Map, Value};

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => Some(s),
            _ => None,
        })
    }

    pub fn string_map<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<IndexMap<String, String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Object(map) => strings_only(map),
            _ => IndexMap::new(),
        })
    }

    pub fn object<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match Value::deserialize(d)? {
            value @ Value::Object(_) => T::deserialize(value).ok(),
            _ => None,
        })
    }

    pub fn bin<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Bin>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(path) => Some(Bin::Single(path)),
            Value::Object(map) => Some(Bin::Map(strings_only(map))),
            _ => None,
        })
    }

    /// `"Jane"` or `{ "name": "Jane", "email": "jane@example.com" }`.
    pub fn author<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => Some(s),
            Value::Object(map) => {
                let name = map.get("name").and_then(Value::as_str);
                let email = map.get("email").and_then(Value::as_str);
                match (name, email) {
                    (Some(name), Some(email)) => Some(format!("{name} <{email}>")),
                    (Some(name), None) => Some(name.to_string()),
                    _ => None,
                }
            }
            _ => None,
        })
    }

    fn strings_only(map: Map<String, Value>) -> IndexMap<String, String> {
        map.into_iter()
            .filter_map(|(k, v)| match v {
                Value::String(s) => Some((k, s)),
                _ => None,
            })
            .collect()
    }
}
