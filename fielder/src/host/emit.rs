//! Writing the mutated arena back into `syn` items.

use std::collections::HashMap;

use proc_macro2::Span;
use quote::format_ident;
use syn::punctuated::Punctuated;
use syn::visit_mut::{self, VisitMut};
use syn::{
    ExprStruct, Field, FieldMutability, FieldValue, Fields, Ident, Item, ItemImpl, ItemMod, Member, PatRest, PatStruct, Type,
    Visibility,
};

use crate::coordinator::RoundSummary;
use crate::modifiers::Modifiers;
use crate::tree::FieldDecl;

use super::attrs::strip_annotations;
use super::lower::LoweredUnit;

/// Rebuild the fields of every struct that received injections, patch struct
/// literals and patterns of those types, and strip fielder annotations.
///
/// Returns the number of annotations stripped.
pub fn emit(items: &mut [Item], unit: &LoweredUnit, summary: &RoundSummary) -> usize {
    let mut emitter = Emitter {
        unit,
        summary,
        cursor: 0,
        stripped: 0,
    };
    emitter.scope(items);
    emitter.stripped
}

struct Emitter<'a> {
    unit: &'a LoweredUnit,
    summary: &'a RoundSummary,
    /// Index into `unit.struct_nodes`; items are walked in lowering order.
    cursor: usize,
    stripped: usize,
}

impl Emitter<'_> {
    /// Emit one scope. Returns the injected field names keyed by the type
    /// path as written from this scope (`Car`, `models::Car`).
    fn scope(&mut self, items: &mut [Item]) -> HashMap<String, Vec<String>> {
        let mut injected: HashMap<String, Vec<String>> = HashMap::new();

        for item in items.iter_mut() {
            match item {
                Item::Struct(item) => {
                    self.stripped += strip_annotations(&mut item.attrs);
                    let Some(&node) = self.unit.struct_nodes.get(self.cursor) else { continue };
                    self.cursor += 1;

                    let names: Vec<String> = self
                        .summary
                        .injected_into(node)
                        .filter_map(|field| self.unit.tree.field(field))
                        .map(|field| field.name.clone())
                        .collect();
                    if names.is_empty() {
                        continue;
                    }

                    if let Fields::Named(named) = &mut item.fields {
                        let original: Vec<Field> = named.named.iter().cloned().collect();
                        let mut rebuilt = Punctuated::new();
                        for (id, decl) in self.unit.tree.fields(node) {
                            match self.unit.field_slots.get(&id).and_then(|slot| original.get(*slot)) {
                                Some(field) => rebuilt.push(field.clone()),
                                None => rebuilt.push(synthesized_field(decl)),
                            }
                        }
                        named.named = rebuilt;
                        injected.insert(item.ident.to_string(), names);
                    }
                }
                Item::Enum(item) => self.stripped += strip_annotations(&mut item.attrs),
                Item::Union(item) => self.stripped += strip_annotations(&mut item.attrs),
                Item::Trait(item) => self.stripped += strip_annotations(&mut item.attrs),
                Item::Mod(item) => {
                    let module = item.ident.to_string();
                    if let Some((_, content)) = &mut item.content {
                        for (path, names) in self.scope(content) {
                            injected.insert(format!("{module}::{path}"), names);
                        }
                    }
                }
                _ => {}
            }
        }

        if !injected.is_empty() {
            let mut patcher = LiteralPatcher {
                injected: &injected,
                self_ty: None,
            };
            for item in items.iter_mut() {
                patcher.visit_item_mut(item);
            }
        }
        injected
    }
}

fn synthesized_field(decl: &FieldDecl) -> Field {
    let ty_ident = ident(&decl.ty);
    Field {
        attrs: Vec::new(),
        vis: visibility(decl.modifiers),
        mutability: FieldMutability::None,
        ident: Some(ident(&decl.name)),
        colon_token: Some(Default::default()),
        ty: Type::Path(syn::TypePath {
            qself: None,
            path: ty_ident.into(),
        }),
    }
}

/// Rust projection of the modifier bitset. Storage flags have no field-level
/// counterpart and are dropped here.
pub fn visibility(modifiers: Modifiers) -> Visibility {
    if modifiers.contains(Modifiers::PUBLIC) {
        syn::parse_quote!(pub)
    } else if modifiers.contains(Modifiers::PROTECTED) {
        syn::parse_quote!(pub(crate))
    } else {
        Visibility::Inherited
    }
}

fn ident(name: &str) -> Ident {
    syn::parse_str(name).unwrap_or_else(|_| format_ident!("{}", name, span = Span::call_site()))
}

/// Adds `field: Default::default()` to literals of injected types that do
/// not already name the field and have no `..base`, and `..` to patterns
/// that would otherwise miss a field.
struct LiteralPatcher<'a> {
    injected: &'a HashMap<String, Vec<String>>,
    self_ty: Option<String>,
}

impl LiteralPatcher<'_> {
    fn target(&self, path: &syn::Path) -> Option<&Vec<String>> {
        if path.leading_colon.is_some() {
            return None;
        }
        let mut segments: Vec<String> = path.segments.iter().map(|segment| segment.ident.to_string()).collect();
        if segments.first().is_some_and(|first| first == "self") {
            segments.remove(0);
        }
        if segments.len() == 1 && segments[0] == "Self" {
            segments[0] = self.self_ty.clone()?;
        }
        self.injected.get(&segments.join("::"))
    }
}

fn names_member(members: impl IntoIterator<Item = Member>, name: &str) -> bool {
    members
        .into_iter()
        .any(|member| matches!(&member, Member::Named(existing) if existing == name))
}

fn type_path(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(path) if path.qself.is_none() => Some(
            path.path
                .segments
                .iter()
                .map(|segment| segment.ident.to_string())
                .collect::<Vec<_>>()
                .join("::"),
        ),
        _ => None,
    }
}

impl VisitMut for LiteralPatcher<'_> {
    fn visit_item_impl_mut(&mut self, node: &mut ItemImpl) {
        let previous = std::mem::replace(&mut self.self_ty, type_path(&node.self_ty));
        visit_mut::visit_item_impl_mut(self, node);
        self.self_ty = previous;
    }

    // Inner modules are their own scope.
    fn visit_item_mod_mut(&mut self, _node: &mut ItemMod) {}

    fn visit_expr_struct_mut(&mut self, node: &mut ExprStruct) {
        visit_mut::visit_expr_struct_mut(self, node);
        if node.dot2_token.is_some() || node.qself.is_some() {
            return;
        }
        let Some(names) = self.target(&node.path).cloned() else {
            return;
        };
        for name in names {
            let members = node.fields.iter().map(|value| value.member.clone());
            if !names_member(members, &name) {
                let field = ident(&name);
                let value: FieldValue = syn::parse_quote!(#field: ::core::default::Default::default());
                node.fields.push(value);
            }
        }
    }

    fn visit_pat_struct_mut(&mut self, node: &mut PatStruct) {
        visit_mut::visit_pat_struct_mut(self, node);
        if node.rest.is_some() || node.qself.is_some() {
            return;
        }
        let Some(names) = self.target(&node.path) else {
            return;
        };
        let missing = names.iter().any(|name| {
            let members = node.fields.iter().map(|field| field.member.clone());
            !names_member(members, name)
        });
        if missing {
            if !node.fields.empty_or_trailing() {
                node.fields.push_punct(Default::default());
            }
            node.rest = Some(PatRest {
                attrs: Vec::new(),
                dot2_token: Default::default(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_projection() {
        assert!(matches!(visibility(Modifiers::PUBLIC | Modifiers::FINAL), Visibility::Public(_)));
        assert!(matches!(visibility(Modifiers::PROTECTED), Visibility::Restricted(_)));
        assert!(matches!(visibility(Modifiers::PRIVATE), Visibility::Inherited));
        assert!(matches!(visibility(Modifiers::NONE), Visibility::Inherited));
    }

    #[test]
    fn test_synthesized_field_tokens() {
        let field = synthesized_field(&FieldDecl {
            name: "r#type".into(),
            ty: "String".into(),
            modifiers: Modifiers::PUBLIC,
            synthetic: true,
        });
        let tokens = quote::quote!(#field).to_string();
        assert_eq!(tokens, "pub r#type : String");
    }
}
