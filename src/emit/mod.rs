//! Emission buffer for generated Go source.
//!
//! - `writer` - indentation-aware text buffer
//! - `context` - per-run state (buffer + emitting package + config) shared by the emitters
//! - `imports` - foreign packages referenced by the emitted code and where their imports come from

mod context;
mod imports;
mod writer;

pub use context::{ERRORS_IMPORT, EmissionContext};
pub use writer::SourceWriter;
