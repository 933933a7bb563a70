//! Declarative request for one synthetic field.

use crate::error::SpecError;
use crate::modifiers::Modifiers;
use crate::types::TypeRef;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    name: String,
    ty: TypeRef,
    modifiers: Modifiers,
}

impl FieldSpec {
    /// Validate and build a spec. The name must be a non-keyword Rust identifier.
    pub fn new(name: impl Into<String>, ty: TypeRef, modifiers: Modifiers) -> Result<Self, SpecError> {
        let name = name.into();
        if name.is_empty() {
            return Err(SpecError::EmptyName);
        }
        if syn::parse_str::<syn::Ident>(&name).is_err() {
            return Err(SpecError::InvalidIdentifier(name));
        }
        Ok(Self { name, ty, modifiers })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }
}
