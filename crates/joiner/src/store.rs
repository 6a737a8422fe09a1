//! Read-only store of package declarations, loaded once at startup.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::debug;

use crate::error::BuildError;
use crate::package::PackageDeclaration;

/// Maps package names to their declarations, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageStore {
    packages: IndexMap<String, PackageDeclaration>,
    source: Option<PathBuf>,
}

impl PackageStore {
    /// A store over already parsed declarations.
    pub fn new(packages: IndexMap<String, PackageDeclaration>) -> Self {
        Self {
            packages,
            source: None,
        }
    }

    /// Parse a JSON package document.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let entries: IndexMap<String, serde_json::Value> =
            serde_json::from_str(content).context("Invalid JSON package document")?;
        Self::from_entries(entries, serde_json::from_value)
    }

    /// Parse a TOML package document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let entries: IndexMap<String, toml::Value> =
            toml::from_str(content).context("Invalid TOML package document")?;
        Self::from_entries(entries, |value| value.try_into())
    }

    /// Decide the shape of every entry, naming the package that fits none.
    fn from_entries<V, E>(
        entries: IndexMap<String, V>,
        convert: impl Fn(V) -> Result<PackageDeclaration, E>,
    ) -> Result<Self>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let packages: IndexMap<_, _> = entries
            .into_iter()
            .map(|(name, value)| {
                let decl = convert(value)
                    .with_context(|| format!("Invalid declaration for package `{name}`"))?;
                Ok((name, decl))
            })
            .collect::<Result<_>>()?;
        Ok(Self::new(packages))
    }

    /// Load a package document, choosing the format from the extension (`.toml`, else JSON).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Reading the package document {:?}", path);

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read package document: {:?}", path))?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let mut store = if is_toml {
            Self::from_toml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
        .with_context(|| format!("Failed to parse package document: {:?}", path))?;

        debug!("Loaded {} package(s) from {:?}", store.len(), path);
        store.source = Some(path.to_path_buf());
        Ok(store)
    }

    /// Look up a package by name.
    pub fn lookup(&self, name: &str) -> Result<&PackageDeclaration, BuildError> {
        self.packages
            .get(name)
            .ok_or_else(|| BuildError::ConfigurationMissing {
                name: name.to_owned(),
            })
    }

    /// Package names in document order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    /// Number of declared packages.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Whether the document declares no packages.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// The file this store was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}
