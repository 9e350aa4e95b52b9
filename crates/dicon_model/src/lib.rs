//! Describe the Go surface that the dicon generators consume.
//!
//! A type-discovery tool extracts interfaces and factory signatures from a Go codebase and hands them over as the
//! values defined here. Generators only ever read them.
//!
//! ## Notes
//!
//! - This is a pure model crate: **no IO**, no global state, no emitter-specific types.
//! - Rendering a type reference depends on which package is emitting it (see [`TypeDescriptor::render`]).

pub mod func;
pub mod go_keywords;
pub mod interface;
pub mod types;

pub use func::{FuncDescriptor, SignatureError};
pub use interface::{InterfaceDescriptor, MethodDescriptor};
pub use types::{TypeDescriptor, TypeKey, Wrapper};

/// Return the qualifier prefix (`pkg.` or empty) for a reference to `home` made from `consumer`.
///
/// Predeclared types have no home package and are never qualified.
pub fn qualifier(home: Option<&str>, consumer: &str) -> String {
    match home {
        Some(pkg) if !pkg.is_empty() && pkg != consumer => format!("{}.", pkg),
        _ => String::new(),
    }
}
