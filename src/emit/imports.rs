//! Import tracking for foreign packages referenced by generated code.
//!
//! Descriptors name packages, not import paths. A referenced package is importable when the header already imports
//! it, when the caller declared its path, or when it is a standard-library package whose path is known here.

use std::collections::BTreeSet;

use crate::config::GeneratorConfig;
use crate::normalize::assumed_package_name;

/// Standard-library packages by name. Only unambiguous names are listed.
const STANDARD_PACKAGES: &[(&str, &str)] = &[
    ("atomic", "sync/atomic"),
    ("bufio", "bufio"),
    ("bytes", "bytes"),
    ("context", "context"),
    ("fmt", "fmt"),
    ("http", "net/http"),
    ("io", "io"),
    ("json", "encoding/json"),
    ("net", "net"),
    ("os", "os"),
    ("regexp", "regexp"),
    ("slog", "log/slog"),
    ("sql", "database/sql"),
    ("strconv", "strconv"),
    ("strings", "strings"),
    ("sync", "sync"),
    ("time", "time"),
    ("url", "net/url"),
];

/// Import path of a standard-library package, by package name.
pub fn standard_path(name: &str) -> Option<&'static str> {
    STANDARD_PACKAGES
        .iter()
        .find(|(package, _)| *package == name)
        .map(|(_, path)| *path)
}

/// Where the import for a referenced package comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportSource<'a> {
    /// The fixed header block already imports it.
    Header,
    /// Declared by the caller.
    Declared(&'a str),
    Standard(&'static str),
}

/// Foreign packages referenced while rendering, in name order.
#[derive(Debug, Default)]
pub struct ImportTracker {
    referenced: BTreeSet<String>,
}

impl ImportTracker {
    /// Record a reference to `package`.
    pub fn note(&mut self, package: &str) {
        if !self.referenced.contains(package) {
            self.referenced.insert(package.to_string());
        }
    }

    pub fn referenced(&self) -> impl Iterator<Item = &str> {
        self.referenced.iter().map(String::as_str)
    }

    /// How `package` gets imported, or `None` when nothing says where it lives.
    pub fn source<'c>(config: &'c GeneratorConfig, package: &str) -> Option<ImportSource<'c>> {
        let in_header = matches!(package, "log" | "errors") || (package == "sync" && config.is_synchronized());
        if in_header {
            return Some(ImportSource::Header);
        }
        config
            .import_path(package)
            .map(ImportSource::Declared)
            .or_else(|| standard_path(package).map(ImportSource::Standard))
    }

    /// Referenced packages nothing can import.
    pub fn unresolved<'t>(&'t self, config: &GeneratorConfig) -> Vec<&'t str> {
        self.referenced()
            .filter(|package| Self::source(config, package).is_none())
            .collect()
    }

    /// Import specs (`"path"` or `name "path"`) to add to the header, sorted by path.
    pub fn specs(&self, config: &GeneratorConfig) -> Vec<String> {
        let mut specs: Vec<(&str, String)> = self
            .referenced()
            .filter_map(|package| {
                let path = match Self::source(config, package)? {
                    ImportSource::Header => return None,
                    ImportSource::Declared(path) => path,
                    ImportSource::Standard(path) => path,
                };
                let spec = if assumed_package_name(path) == package {
                    format!("\"{}\"", path)
                } else {
                    format!("{} \"{}\"", package, path)
                };
                Some((path, spec))
            })
            .collect();
        specs.sort();
        specs.into_iter().map(|(_, spec)| spec).collect()
    }
}
