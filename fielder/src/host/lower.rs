//! Lowering a `syn` item list into the syntax arena.
//!
//! Every struct, enum, union and trait becomes a type node. Named struct
//! fields become field nodes; zero-or-more-argument constructors are
//! collected from inherent impls returning `Self`, `impl Default`, and
//! `#[derive(Default)]`. Inline modules are lowered recursively, each one a
//! separate scope for `impl` lookup.

use std::collections::HashMap;

use proc_macro2::Span;
use quote::ToTokens;
use syn::spanned::Spanned;
use syn::{Attribute, Fields, FnArg, ImplItem, Item, ItemImpl, ReturnType, Type, Visibility};

use crate::coordinator::Target;
use crate::modifiers::Modifiers;
use crate::tree::{ConstructorDecl, DeclKind, FieldDecl, Location, NodeId, SyntaxTree};
use crate::types::TypeTable;

use super::attrs::read_specs;

/// Result of lowering one source unit.
#[derive(Debug, Default)]
pub struct LoweredUnit {
    pub tree: SyntaxTree,
    pub batch: Vec<Target>,
    pub types: TypeTable,
    /// Annotation problems, attached to the annotated type.
    pub annotation_errors: Vec<(NodeId, syn::Error)>,
    /// Struct nodes in traversal order; emission walks items the same way.
    pub(crate) struct_nodes: Vec<NodeId>,
    /// Original position of each lowered field inside its struct.
    pub(crate) field_slots: HashMap<NodeId, usize>,
    pub(crate) spans: HashMap<NodeId, Span>,
}

pub fn lower(items: &[Item]) -> LoweredUnit {
    let mut unit = LoweredUnit::default();
    let mut imports = Vec::new();
    lower_scope(items, &mut unit, &mut imports);

    let mut types = TypeTable::for_tree(&unit.tree);
    for import in imports {
        types.import(&import);
    }
    unit.types = types;
    unit
}

fn lower_scope(items: &[Item], unit: &mut LoweredUnit, imports: &mut Vec<syn::UseTree>) {
    let mut scope: HashMap<String, NodeId> = HashMap::new();

    for item in items {
        match item {
            Item::Struct(item) => {
                let kind = match &item.fields {
                    Fields::Named(_) => DeclKind::Class,
                    Fields::Unnamed(_) => DeclKind::TupleStruct,
                    Fields::Unit => DeclKind::UnitStruct,
                };
                let node = declare(unit, &mut scope, &item.ident, kind, &item.attrs);
                unit.struct_nodes.push(node);

                if let Fields::Named(named) = &item.fields {
                    for (slot, field) in named.named.iter().enumerate() {
                        let Some(ident) = &field.ident else { continue };
                        let decl = FieldDecl {
                            name: ident.to_string(),
                            ty: field.ty.to_token_stream().to_string(),
                            modifiers: modifiers_of(&field.vis),
                            synthetic: false,
                        };
                        if let Ok(id) = unit.tree.push_field(node, decl) {
                            record_span(unit, id, ident.span());
                            unit.field_slots.insert(id, slot);
                        }
                    }
                }

                if derives_default(&item.attrs) {
                    add_constructor(unit, node, "default", 0, item.ident.span());
                }
            }
            Item::Enum(item) => {
                declare(unit, &mut scope, &item.ident, DeclKind::Enum, &item.attrs);
            }
            Item::Union(item) => {
                declare(unit, &mut scope, &item.ident, DeclKind::Union, &item.attrs);
            }
            Item::Trait(item) => {
                declare(unit, &mut scope, &item.ident, DeclKind::Trait, &item.attrs);
            }
            Item::Use(item) => imports.push(item.tree.clone()),
            Item::Mod(item) => {
                if let Some((_, content)) = &item.content {
                    lower_scope(content, unit, imports);
                }
            }
            _ => {}
        }
    }

    for item in items {
        if let Item::Impl(item) = item {
            lower_impl(item, &scope, unit);
        }
    }
}

fn declare(
    unit: &mut LoweredUnit,
    scope: &mut HashMap<String, NodeId>,
    ident: &syn::Ident,
    kind: DeclKind,
    attrs: &[Attribute],
) -> NodeId {
    let node = unit.tree.add_type(ident.to_string(), kind);
    record_span(unit, node, ident.span());
    scope.insert(ident.to_string(), node);

    let mut specs = Vec::new();
    for spec in read_specs(attrs) {
        match spec {
            Ok(spec) => specs.push(spec),
            Err(err) => unit.annotation_errors.push((node, err)),
        }
    }
    if !specs.is_empty() {
        unit.batch.push(Target::new(node, specs));
    }
    node
}

fn lower_impl(item: &ItemImpl, scope: &HashMap<String, NodeId>, unit: &mut LoweredUnit) {
    let Some(self_name) = simple_type_name(&item.self_ty) else {
        return;
    };
    let Some(&node) = scope.get(&self_name) else {
        return;
    };

    if let Some((_, trait_path, _)) = &item.trait_ {
        if trait_path.segments.last().is_some_and(|segment| segment.ident == "Default") {
            add_constructor(unit, node, "default", 0, item.self_ty.span());
        }
        return;
    }

    for impl_item in &item.items {
        let ImplItem::Fn(function) = impl_item else { continue };
        let sig = &function.sig;
        if sig.inputs.iter().any(|arg| matches!(arg, FnArg::Receiver(_))) {
            continue;
        }
        let returns_self = match &sig.output {
            ReturnType::Type(_, ty) => {
                simple_type_name(ty).is_some_and(|name| name == "Self" || name == self_name)
            }
            ReturnType::Default => false,
        };
        if returns_self {
            add_constructor(unit, node, &sig.ident.to_string(), sig.inputs.len(), sig.ident.span());
        }
    }
}

fn add_constructor(unit: &mut LoweredUnit, owner: NodeId, name: &str, params: usize, span: Span) {
    let ctor = ConstructorDecl {
        name: name.to_string(),
        params,
    };
    if let Ok(id) = unit.tree.push_constructor(owner, ctor) {
        record_span(unit, id, span);
    }
}

fn record_span(unit: &mut LoweredUnit, node: NodeId, span: Span) {
    let start = span.start();
    if start.line > 0 {
        let _ = unit.tree.set_location(
            node,
            Location {
                line: start.line,
                column: start.column + 1,
            },
        );
    }
    unit.spans.insert(node, span);
}

/// Last path segment of a plain type path (`Car`, `crate::Car`, `Car<T>`).
pub(crate) fn simple_type_name(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(path) if path.qself.is_none() => path.path.segments.last().map(|segment| segment.ident.to_string()),
        Type::Group(group) => simple_type_name(&group.elem),
        Type::Paren(paren) => simple_type_name(&paren.elem),
        _ => None,
    }
}

fn modifiers_of(vis: &Visibility) -> Modifiers {
    match vis {
        Visibility::Public(_) => Modifiers::PUBLIC,
        Visibility::Restricted(_) => Modifiers::PROTECTED,
        Visibility::Inherited => Modifiers::NONE,
    }
}

fn derives_default(attrs: &[Attribute]) -> bool {
    attrs.iter().filter(|attr| attr.path().is_ident("derive")).any(|attr| {
        attr.parse_args_with(syn::punctuated::Punctuated::<syn::Path, syn::Token![,]>::parse_terminated)
            .is_ok_and(|paths| {
                paths
                    .iter()
                    .any(|path| path.segments.last().is_some_and(|segment| segment.ident == "Default"))
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lower_src(src: &str) -> LoweredUnit {
        let file = syn::parse_file(src).unwrap();
        lower(&file.items)
    }

    #[test]
    fn test_kinds_and_fields() {
        let unit = lower_src(
            r#"
            pub struct Item { pub name: String, pub(crate) code: u32, secret: bool }
            pub struct Pair(u8, u8);
            pub struct Marker;
            pub enum Kind { Product }
            pub trait Shape {}
            "#,
        );
        let kinds: Vec<_> = unit.tree.types().map(|(_, decl)| decl.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DeclKind::Class,
                DeclKind::TupleStruct,
                DeclKind::UnitStruct,
                DeclKind::Enum,
                DeclKind::Trait
            ]
        );

        let item = unit.struct_nodes[0];
        let fields: Vec<_> = unit.tree.fields(item).map(|(_, f)| (f.name.clone(), f.modifiers)).collect();
        assert_eq!(
            fields,
            vec![
                ("name".to_string(), Modifiers::PUBLIC),
                ("code".to_string(), Modifiers::PROTECTED),
                ("secret".to_string(), Modifiers::NONE),
            ]
        );
        assert!(unit.batch.is_empty());
    }

    #[test]
    fn test_constructor_sources() {
        let unit = lower_src(
            r#"
            struct A { x: u8 }
            impl A {
                fn new() -> Self { A { x: 0 } }
                fn with(x: u8) -> A { A { x } }
                fn get(&self) -> u8 { self.x }
                fn helper() -> u8 { 1 }
            }
            #[derive(Debug, Default)]
            struct B { y: u8 }
            struct C { z: u8 }
            impl std::default::Default for C { fn default() -> Self { C { z: 1 } } }
            "#,
        );
        let params = |index: usize| -> Vec<usize> {
            unit.tree
                .constructors(unit.struct_nodes[index])
                .map(|(_, ctor)| ctor.params)
                .collect()
        };
        assert_eq!(params(0), vec![0, 1]);
        assert_eq!(params(1), vec![0]);
        assert_eq!(params(2), vec![0]);
    }

    #[test]
    fn test_impls_resolve_within_their_module() {
        let unit = lower_src(
            r#"
            mod inner {
                pub struct Item { pub name: String }
            }
            impl Item { pub fn new() -> Self { todo!() } }
            "#,
        );
        assert_eq!(unit.tree.constructors(unit.struct_nodes[0]).count(), 0);
    }

    #[test]
    fn test_annotations_become_targets_and_errors() {
        let unit = lower_src(
            r#"
            use std::time::Instant;

            #[fielder(name = "value", ty = i64)]
            #[add_fields(field(name = "", ty = u8))]
            struct Item {}
            "#,
        );
        assert_eq!(unit.batch.len(), 1);
        assert_eq!(unit.batch[0].specs.len(), 1);
        assert_eq!(unit.annotation_errors.len(), 1);
        assert!(unit.types.contains("Instant"));
        assert!(unit.types.contains("Item"));
    }
}
