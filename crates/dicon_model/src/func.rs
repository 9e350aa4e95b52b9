//! Factory functions wired into a generated container.

use serde::{Deserialize, Serialize};

use crate::types::TypeDescriptor;

/// A factory `New<Name>(deps...) (T, error)`.
///
/// `name` doubles as the container's cache key and resolver method name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuncDescriptor {
    pub name: String,
    pub package: String,
    /// Dependencies, in declaration order
    #[serde(default)]
    pub arguments: Vec<TypeDescriptor>,
    /// Must be `(instance, error)`
    #[serde(default)]
    pub returns: Vec<TypeDescriptor>,
}

/// Why a factory signature cannot be wired into a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// Not exactly two return values.
    Arity { found: usize },
    /// Second return value is not `error`.
    NotError { found: TypeDescriptor },
}

impl std::fmt::Display for SignatureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignatureError::Arity { found } => {
                write!(f, "must be (instance, error) signature but returns {} value(s)", found)
            }
            SignatureError::NotError { found } => {
                write!(f, "second return value must be error but is {}", found.name)
            }
        }
    }
}

impl std::error::Error for SignatureError {}

impl FuncDescriptor {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
            arguments: Vec::new(),
            returns: Vec::new(),
        }
    }

    /// Append a dependency.
    pub fn arg(mut self, ty: TypeDescriptor) -> Self {
        self.arguments.push(ty);
        self
    }

    /// Append a return value.
    pub fn ret(mut self, ty: TypeDescriptor) -> Self {
        self.returns.push(ty);
        self
    }

    /// Shorthand for the canonical `(produced, error)` return pair.
    pub fn produces(self, ty: TypeDescriptor) -> Self {
        self.ret(ty).ret(TypeDescriptor::error())
    }

    /// The Go symbol of the constructor, `New<Name>`.
    pub fn constructor_symbol(&self) -> String {
        format!("New{}", self.name)
    }

    /// The instance type, if the signature has one.
    pub fn produced_type(&self) -> Option<&TypeDescriptor> {
        self.returns.first()
    }

    /// Check the `(instance, error)` contract and return the instance type.
    pub fn check_signature(&self) -> Result<&TypeDescriptor, SignatureError> {
        match self.returns.as_slice() {
            [instance, err] if err.is_error() => Ok(instance),
            [_, err] => Err(SignatureError::NotError { found: err.clone() }),
            other => Err(SignatureError::Arity { found: other.len() }),
        }
    }
}
