//! Define generation-time errors.
//!
//! These are failures of the generator on its own input. They are distinct from the errors the *generated* Go code
//! reports when it runs (cache mismatch, dependency resolution, construction), which only exist as emitted text.
//!
//! ## Notes
//!
//! - Every variant aborts the run before any text for the affected declaration reaches the buffer.
//! - Codes are stable (`dicon::...`) so tooling can match on them.

use miette::Diagnostic;
use thiserror::Error;

/// Error raised while generating Go source.
#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum GenerateError {
    #[error("factory `{factory}` must return (instance, error) but returns {found} value(s): ({returns})")]
    #[diagnostic(
        code(dicon::signature::arity),
        help("every factory must have the signature `func NewName(deps...) (T, error)`")
    )]
    ReturnArity {
        factory: String,
        found: usize,
        returns: String,
    },

    #[error("factory `{factory}` must return error as its second value but returns `{found}`")]
    #[diagnostic(code(dicon::signature::error_return))]
    ErrorReturn { factory: String, found: String },

    #[error("`{name}` is not a valid Go identifier (used as {role})")]
    #[diagnostic(code(dicon::identifier))]
    InvalidIdentifier { name: String, role: &'static str },

    #[error("factory `{name}` is declared more than once")]
    #[diagnostic(
        code(dicon::factory::duplicate),
        help("factory names become resolver methods and cache keys and must be unique")
    )]
    DuplicateFactory { name: String },

    #[error("`{name}` would clash with {existing} in the generated code")]
    #[diagnostic(
        code(dicon::identifier::collision),
        help("rename the factory, interface or method; generated struct fields, methods and types share one namespace")
    )]
    NameCollision { name: String, existing: String },

    #[error("type `{produced}` is produced by both `{first}` and `{second}`")]
    #[diagnostic(
        code(dicon::binding::ambiguous),
        help("a container binds exactly one factory per produced type")
    )]
    DuplicateProducer {
        produced: String,
        first: String,
        second: String,
    },

    #[error("factory `{factory}` depends on `{dependency}` but no factory produces it")]
    #[diagnostic(
        code(dicon::binding::missing),
        help("add a factory returning the dependency and an error, or use lenient binding")
    )]
    MissingFactory { factory: String, dependency: String },

    #[error("dependency cycle detected: {}", path.join(" -> "))]
    #[diagnostic(
        code(dicon::binding::cycle),
        help("the generated resolvers would recurse forever; break the cycle")
    )]
    DependencyCycle { path: Vec<String> },

    #[error("generated code refers to package `{package}` but its import path is unknown")]
    #[diagnostic(
        code(dicon::imports::unresolved),
        help("declare it under \"imports\" in the descriptor document, or normalize with `--normalizer goimports`")
    )]
    UnresolvedImport { package: String },

    #[error("emission context already targets package `{current}`, cannot emit for package `{requested}`")]
    #[diagnostic(code(dicon::context::package))]
    PackageMismatch { current: String, requested: String },
}

/// Result type for generation.
pub type GenerateResult<T> = Result<T, GenerateError>;
