#![forbid(unsafe_code)]
//! dicon: dependency-injection container and mock generator for Go
//!
//! Takes descriptors of Go interfaces and factory functions (see the `dicon_model` crate) and emits Go source:
//! a lazily-initialized, memoizing container that resolves the factory dependency graph, and mock structs whose
//! behaviour is swapped in through function fields.
//!
//! ## Pipeline
//!
//! descriptors → [`container::emit_container`] / [`mock::emit_mocks`] (into one [`emit::EmissionContext`]) →
//! [`normalize::SourceNormalizer`] → [`output::Destination`]
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod cli;
pub mod config;
pub mod container;
pub mod descriptors;
pub mod emit;
pub mod errors;
pub mod graph;
pub mod mock;
pub mod normalize;
pub mod output;

pub use config::{BindingMode, GeneratorConfig, Synchronization};
pub use container::emit_container;
pub use descriptors::{ContainerSpec, DescriptorDocument, DescriptorError};
pub use emit::EmissionContext;
pub use errors::{GenerateError, GenerateResult};
pub use mock::emit_mocks;
pub use normalize::{BuiltinNormalizer, ExternalNormalizer, NormalizeError, PassthroughNormalizer, SourceNormalizer};
pub use output::{Destination, OutputError, write_out};

pub use dicon_model as model;
