//! Type references used as arguments and return values.

use serde::{Deserialize, Serialize};

use crate::qualifier;

/// A type constructor applied in front of a named type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Wrapper {
    /// `*T`
    Pointer,
    /// `[]T`
    Slice,
}

impl Wrapper {
    pub fn as_str(self) -> &'static str {
        match self {
            Wrapper::Pointer => "*",
            Wrapper::Slice => "[]",
        }
    }
}

/// One Go type reference, e.g. `*app.DB`, `[]string` or `error`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Bare type name (`DB`, `error`, `string`)
    pub name: String,
    /// Package the type is declared in; `None` for predeclared types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    /// Wrappers applied outside-in (`[Slice, Pointer]` renders as `[]*T`)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wrappers: Vec<Wrapper>,
}

/// Identity of a named type, ignoring wrappers.
///
/// `*DB` and `DB` from the same package share one key, which is what lets an argument of type `*DB` bind to the
/// factory producing `*DB`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey {
    pub package: Option<String>,
    pub name: String,
}

impl std::fmt::Display for TypeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.package {
            Some(pkg) if !pkg.is_empty() => write!(f, "{}.{}", pkg, self.name),
            _ => write!(f, "{}", self.name),
        }
    }
}

impl TypeDescriptor {
    /// A type declared in `package`.
    pub fn named(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: Some(package.into()),
            wrappers: Vec::new(),
        }
    }

    /// A predeclared type (`error`, `string`, `int`, ...).
    pub fn builtin(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: None,
            wrappers: Vec::new(),
        }
    }

    /// The predeclared `error` type.
    pub fn error() -> Self {
        Self::builtin("error")
    }

    /// Wrap this type in a pointer.
    pub fn pointer(mut self) -> Self {
        self.wrappers.insert(0, Wrapper::Pointer);
        self
    }

    /// Wrap this type in a slice.
    pub fn slice(mut self) -> Self {
        self.wrappers.insert(0, Wrapper::Slice);
        self
    }

    /// The bare name, without wrappers or package.
    pub fn simple_name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> TypeKey {
        TypeKey {
            package: self.package.clone().filter(|p| !p.is_empty()),
            name: self.name.clone(),
        }
    }

    /// Whether this is exactly the predeclared `error` type.
    pub fn is_error(&self) -> bool {
        self.package.as_deref().is_none_or(str::is_empty) && self.wrappers.is_empty() && self.name == "error"
    }

    /// Render the reference as seen from code in `consumer`.
    ///
    /// Bare when the home package is `consumer` (or absent), `pkg.Name` otherwise. Pure: the same inputs always
    /// produce the same text.
    pub fn render(&self, consumer: &str) -> String {
        let mut out = String::new();
        for w in &self.wrappers {
            out.push_str(w.as_str());
        }
        out.push_str(&qualifier(self.package.as_deref(), consumer));
        out.push_str(&self.name);
        out
    }
}
