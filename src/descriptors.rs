//! Descriptor documents: the JSON boundary between type discovery and generation.
//!
//! A discovery tool walks the Go sources and writes one document describing the container target, its factories
//! and the interfaces to mock. Every section is optional.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use dicon_model::{FuncDescriptor, InterfaceDescriptor};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error loading a descriptor document.
#[derive(Debug, Error, Diagnostic)]
pub enum DescriptorError {
    #[error("failed to read descriptors from {}: {source}", path.display())]
    #[diagnostic(code(dicon::descriptors::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid descriptor document {}: {source}", path.display())]
    #[diagnostic(code(dicon::descriptors::parse))]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The container section: the public interface and the factories behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSpec {
    pub interface: InterfaceDescriptor,
    #[serde(default)]
    pub factories: Vec<FuncDescriptor>,
}

/// One descriptor document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorDocument {
    /// Emitting package; defaults to the container interface's (or first mock target's) package
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<ContainerSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mocks: Vec<InterfaceDescriptor>,
    /// Import path of each foreign package the descriptors reference, keyed by package name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub imports: BTreeMap<String, String>,
}

impl DescriptorDocument {
    pub fn from_json(path: &Path, text: &str) -> Result<Self, DescriptorError> {
        serde_json::from_str(text).map_err(|source| DescriptorError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, DescriptorError> {
        let text = std::fs::read_to_string(path).map_err(|source| DescriptorError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let doc = Self::from_json(path, &text)?;
        tracing::debug!(
            has_container = doc.container.is_some(),
            mocks = doc.mocks.len(),
            "loaded descriptor document"
        );
        Ok(doc)
    }
}
