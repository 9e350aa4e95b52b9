//! Interface surfaces: the container's public type and mock targets.

use serde::{Deserialize, Serialize};

use crate::types::TypeDescriptor;

/// One method of an interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    #[serde(default)]
    pub arguments: Vec<TypeDescriptor>,
    #[serde(default)]
    pub returns: Vec<TypeDescriptor>,
}

impl MethodDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
            returns: Vec::new(),
        }
    }

    pub fn arg(mut self, ty: TypeDescriptor) -> Self {
        self.arguments.push(ty);
        self
    }

    pub fn ret(mut self, ty: TypeDescriptor) -> Self {
        self.returns.push(ty);
        self
    }
}

/// A named interface declared in `package`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceDescriptor {
    pub name: String,
    pub package: String,
    #[serde(default)]
    pub methods: Vec<MethodDescriptor>,
}

impl InterfaceDescriptor {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
            methods: Vec::new(),
        }
    }

    pub fn method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    /// The interface itself as a type reference.
    pub fn as_type(&self) -> TypeDescriptor {
        TypeDescriptor::named(self.package.clone(), self.name.clone())
    }
}
