//! Source normalization.
//!
//! Generators write a fixed import block and simple layout; a normalizer turns that raw buffer into the final file:
//! it prunes imports the file does not use, canonicalizes whitespace and reports syntax errors in the generated
//! text. The generator never validates its own output beyond this stage.
//!
//! - `builtin` - in-process normalizer, no Go toolchain required
//! - `external` - pipes the buffer through `goimports` or `gofmt`

mod builtin;
mod external;

use std::path::Path;

use miette::Diagnostic;
use thiserror::Error;

pub(crate) use builtin::assumed_package_name;
pub use builtin::BuiltinNormalizer;
pub use external::ExternalNormalizer;

/// Error reported by a normalizer.
#[derive(Debug, Error, Diagnostic)]
pub enum NormalizeError {
    #[error("syntax error on line {line}: {message}")]
    #[diagnostic(code(dicon::normalize::syntax))]
    Syntax { line: usize, message: String },

    #[error("failed to run `{program}`: {source}")]
    #[diagnostic(code(dicon::normalize::spawn), help("check that the tool is installed and on PATH"))]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` exited with {status}: {stderr}")]
    #[diagnostic(code(dicon::normalize::tool))]
    Tool {
        program: String,
        status: String,
        stderr: String,
    },
}

/// Post-processing stage between the emission buffer and the output file.
pub trait SourceNormalizer {
    /// Short name for logs and error messages.
    fn name(&self) -> &str;

    /// Normalize `source`, which is destined for `filename`.
    fn normalize(&self, filename: &Path, source: &str) -> Result<String, NormalizeError>;

    /// Whether the normalizer adds missing imports on its own (only `goimports` does).
    fn resolves_imports(&self) -> bool {
        false
    }
}

/// Returns the buffer unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughNormalizer;

impl SourceNormalizer for PassthroughNormalizer {
    fn name(&self) -> &str {
        "none"
    }

    fn normalize(&self, _filename: &Path, source: &str) -> Result<String, NormalizeError> {
        Ok(source.to_string())
    }
}
