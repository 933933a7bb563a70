//! Two-phase type resolution.
//!
//! A type written at an annotation site is held as [`TypeRef::Unresolved`].
//! Asking such a reference for its element eagerly always fails with
//! [`MirroredType`], whose payload carries the pending [`TypeToken`]. The
//! only way to obtain a [`TypeElement`] is [`resolve_type_ref`], which takes
//! that failure path and hands the token to a [`TypeResolver`].

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use syn::{PathArguments, Type};

use crate::error::ResolveError;
use crate::tree::SyntaxTree;

/// A type as written at the annotation site, e.g. `std::time::Instant`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TypeToken(String);

impl TypeToken {
    pub fn new(text: impl Into<String>) -> Self {
        let text: String = text.into();
        let joined = text.split_whitespace().collect::<Vec<_>>().join(" ");
        Self(joined.replace(" :: ", "::").replace(":: ", "::"))
    }

    pub fn from_type(ty: &Type) -> Self {
        Self::new(quote::quote!(#ty).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A concrete named type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeElement {
    pub qualified_name: String,
    pub simple_name: String,
}

impl TypeElement {
    pub fn new(qualified_name: impl Into<String>) -> Self {
        let qualified_name = qualified_name.into();
        let simple_name = qualified_name
            .rsplit("::")
            .next()
            .unwrap_or(&qualified_name)
            .to_string();
        Self {
            qualified_name,
            simple_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Unresolved(TypeToken),
    Resolved(TypeElement),
}

/// Raised by eager access to an unresolved [`TypeRef`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirroredType {
    pub token: TypeToken,
}

impl TypeRef {
    pub fn unresolved(text: impl Into<String>) -> Self {
        TypeRef::Unresolved(TypeToken::new(text))
    }

    /// Eager access. Fails for every unresolved reference.
    pub fn element(&self) -> Result<&TypeElement, MirroredType> {
        match self {
            TypeRef::Resolved(element) => Ok(element),
            TypeRef::Unresolved(token) => Err(MirroredType { token: token.clone() }),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Unresolved(token) => token.fmt(f),
            TypeRef::Resolved(element) => f.write_str(&element.qualified_name),
        }
    }
}

/// Host type system lookup for pending references.
pub trait TypeResolver {
    fn resolve(&self, token: &TypeToken) -> Result<TypeElement, ResolveError>;
}

/// Resolve through the mirrored-type channel.
pub fn resolve_type_ref(resolver: &dyn TypeResolver, ty: &TypeRef) -> Result<TypeElement, ResolveError> {
    match ty.element() {
        Ok(element) => Ok(element.clone()),
        Err(MirroredType { token }) => resolver.resolve(&token),
    }
}

const PRIMITIVES: &[&str] = &[
    "bool", "char", "str", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128", "usize",
    "f32", "f64",
];

const PRELUDE: &[&str] = &["String", "Vec", "Option", "Result", "Box"];

/// Name table for one source unit.
///
/// Single-segment names resolve when they are primitives, prelude types,
/// types declared in the unit, or imported with `use`. Multi-segment paths
/// are taken as already qualified.
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    known: HashSet<String>,
}

impl TypeTable {
    pub fn new() -> Self {
        let mut table = Self::default();
        table.known.extend(PRIMITIVES.iter().chain(PRELUDE).map(|name| name.to_string()));
        table
    }

    /// Table seeded with every type declared in `tree`.
    pub fn for_tree(tree: &SyntaxTree) -> Self {
        let mut table = Self::new();
        for (_, decl) in tree.types() {
            table.declare(decl.name.clone());
        }
        table
    }

    pub fn declare(&mut self, name: impl Into<String>) {
        self.known.insert(name.into());
    }

    /// Register every name brought into scope by a `use` tree.
    pub fn import(&mut self, tree: &syn::UseTree) {
        match tree {
            syn::UseTree::Path(path) => self.import(&path.tree),
            syn::UseTree::Name(name) => self.declare(name.ident.to_string()),
            syn::UseTree::Rename(rename) => self.declare(rename.rename.to_string()),
            syn::UseTree::Group(group) => group.items.iter().for_each(|item| self.import(item)),
            syn::UseTree::Glob(_) => {}
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.known.contains(name)
    }
}

impl TypeResolver for TypeTable {
    fn resolve(&self, token: &TypeToken) -> Result<TypeElement, ResolveError> {
        let ty: Type = syn::parse_str(token.as_str()).map_err(|_| ResolveError::NotAPath(token.clone()))?;
        let Type::Path(type_path) = ty else {
            return Err(ResolveError::NotAPath(token.clone()));
        };
        if type_path.qself.is_some() {
            return Err(ResolveError::NotAPath(token.clone()));
        }
        let segments = &type_path.path.segments;
        if segments.iter().any(|segment| !matches!(segment.arguments, PathArguments::None)) {
            return Err(ResolveError::NotConcrete(token.clone()));
        }

        let names: Vec<String> = segments.iter().map(|segment| segment.ident.to_string()).collect();
        match names.as_slice() {
            [single] if !self.contains(single) => Err(ResolveError::Unknown(token.clone())),
            _ => Ok(TypeElement::new(names.join("::"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::DeclKind;

    #[test]
    fn test_eager_access_always_mirrors() {
        let pending = TypeRef::unresolved("std::time::Instant");
        let err = pending.element().unwrap_err();
        assert_eq!(err.token.as_str(), "std::time::Instant");
    }

    #[test]
    fn test_resolves_through_payload() {
        let table = TypeTable::new();
        let element = resolve_type_ref(&table, &TypeRef::unresolved("std :: time :: Instant")).unwrap();
        assert_eq!(element.simple_name, "Instant");
        assert_eq!(element.qualified_name, "std::time::Instant");
    }

    #[test]
    fn test_resolved_reference_skips_resolver() {
        let table = TypeTable::default();
        let resolved = TypeRef::Resolved(TypeElement::new("Widget"));
        assert_eq!(resolve_type_ref(&table, &resolved).unwrap().simple_name, "Widget");
    }

    #[test]
    fn test_unknown_and_generic_types_fail() {
        let table = TypeTable::new();
        assert!(matches!(table.resolve(&TypeToken::new("Missing")), Err(ResolveError::Unknown(_))));
        assert!(matches!(
            table.resolve(&TypeToken::new("Vec<u8>")),
            Err(ResolveError::NotConcrete(_))
        ));
        assert!(matches!(table.resolve(&TypeToken::new("&str")), Err(ResolveError::NotAPath(_))));
    }

    #[test]
    fn test_declared_and_imported_names() {
        let mut tree = SyntaxTree::new();
        tree.add_type("Engine", DeclKind::Class);
        let mut table = TypeTable::for_tree(&tree);
        let import: syn::ItemUse = syn::parse_quote!(use std::time::{Duration, Instant as Moment};);
        table.import(&import.tree);

        assert!(table.resolve(&TypeToken::new("Engine")).is_ok());
        assert!(table.resolve(&TypeToken::new("Duration")).is_ok());
        assert!(table.resolve(&TypeToken::new("Moment")).is_ok());
        assert!(table.resolve(&TypeToken::new("Instant")).is_err());
    }
}
