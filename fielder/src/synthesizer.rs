//! Builds field declarations from [`FieldSpec`]s.

use crate::error::SynthesisError;
use crate::spec::FieldSpec;
use crate::tree::FieldDecl;
use crate::types::{TypeResolver, resolve_type_ref};

/// Pure factory for synthesized members. Never touches the tree.
pub struct Synthesizer<'r> {
    resolver: &'r dyn TypeResolver,
}

impl<'r> Synthesizer<'r> {
    pub fn new(resolver: &'r dyn TypeResolver) -> Self {
        Self { resolver }
    }

    /// Resolve the requested type and build `<modifiers> <name>: <SimpleName>`
    /// with no initializer.
    pub fn synthesize(&self, spec: &FieldSpec) -> Result<FieldDecl, SynthesisError> {
        let element = resolve_type_ref(self.resolver, spec.ty()).map_err(|source| SynthesisError::Unresolved {
            field: spec.name().to_string(),
            source,
        })?;

        Ok(FieldDecl {
            name: spec.name().to_string(),
            ty: element.simple_name,
            modifiers: spec.modifiers(),
            synthetic: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolveError;
    use crate::modifiers::Modifiers;
    use crate::types::{TypeRef, TypeTable};

    #[test]
    fn test_uses_simple_type_name() {
        let table = TypeTable::new();
        let spec = FieldSpec::new(
            "stamp",
            TypeRef::unresolved("std::time::Instant"),
            Modifiers::PROTECTED | Modifiers::FINAL,
        )
        .unwrap();

        let field = Synthesizer::new(&table).synthesize(&spec).unwrap();
        assert_eq!(
            field,
            FieldDecl {
                name: "stamp".into(),
                ty: "Instant".into(),
                modifiers: Modifiers::PROTECTED | Modifiers::FINAL,
                synthetic: true,
            }
        );
    }

    #[test]
    fn test_unresolvable_type() {
        let table = TypeTable::new();
        let spec = FieldSpec::new("ghost", TypeRef::unresolved("Phantom"), Modifiers::PUBLIC).unwrap();

        let err = Synthesizer::new(&table).synthesize(&spec).unwrap_err();
        assert!(matches!(
            err,
            SynthesisError::Unresolved {
                source: ResolveError::Unknown(_),
                ..
            }
        ));
        assert!(err.to_string().contains("ghost"));
    }
}
