//! Reading `#[fielder(...)]` and `#[add_fields(...)]` annotations.

use proc_macro2::Span;
use syn::meta::ParseNestedMeta;
use syn::spanned::Spanned;
use syn::{Attribute, BinOp, Error, Expr, Lit, LitStr, Result, Type};

use crate::modifiers::Modifiers;
use crate::spec::FieldSpec;
use crate::types::{TypeRef, TypeToken};

/// Single-field annotation; the field is public unless told otherwise.
pub const FIELDER: &str = "fielder";
/// Multi-field annotation: `#[add_fields(field(...), field(...))]`.
pub const ADD_FIELDS: &str = "add_fields";

pub fn is_annotation(attr: &Attribute) -> bool {
    attr.path().is_ident(FIELDER) || attr.path().is_ident(ADD_FIELDS)
}

/// Drop every fielder annotation from `attrs`, returning how many went.
pub fn strip_annotations(attrs: &mut Vec<Attribute>) -> usize {
    let before = attrs.len();
    attrs.retain(|attr| !is_annotation(attr));
    before - attrs.len()
}

/// Read all field requests on an item, in declaration order.
///
/// A malformed attribute yields one error; a well-formed attribute yields one
/// entry per requested field, each validated on its own.
pub fn read_specs(attrs: &[Attribute]) -> Vec<Result<FieldSpec>> {
    let mut specs = Vec::new();
    for attr in attrs {
        if attr.path().is_ident(FIELDER) {
            match parse_single(attr) {
                Ok(raw) => specs.push(raw.finish(Modifiers::PUBLIC)),
                Err(err) => specs.push(Err(err)),
            }
        } else if attr.path().is_ident(ADD_FIELDS) {
            match parse_multi(attr) {
                Ok(raws) => specs.extend(raws.into_iter().map(|raw| raw.finish(Modifiers::NONE))),
                Err(err) => specs.push(Err(err)),
            }
        }
    }
    specs
}

/// Properties of one field request before validation.
struct RawField {
    span: Span,
    name: Option<LitStr>,
    ty: Option<(TypeToken, Span)>,
    modifiers: Option<Expr>,
}

impl RawField {
    fn new(span: Span) -> Self {
        Self {
            span,
            name: None,
            ty: None,
            modifiers: None,
        }
    }

    fn parse_property(&mut self, meta: &ParseNestedMeta) -> Result<()> {
        if meta.path.is_ident("name") {
            self.name = Some(meta.value()?.parse()?);
            return Ok(());
        }

        if meta.path.is_ident("ty") || meta.path.is_ident("type") {
            let value = meta.value()?;
            self.ty = Some(if value.peek(LitStr) {
                let lit: LitStr = value.parse()?;
                (TypeToken::new(lit.value()), lit.span())
            } else {
                let ty: Type = value.parse()?;
                (TypeToken::from_type(&ty), ty.span())
            });
            return Ok(());
        }

        if meta.path.is_ident("modifiers") || meta.path.is_ident("modifier") {
            self.modifiers = Some(meta.value()?.parse()?);
            return Ok(());
        }

        Err(meta.error("unsupported property; expected `name`, `ty` or `modifiers`"))
    }

    fn finish(self, default_modifiers: Modifiers) -> Result<FieldSpec> {
        let name = self
            .name
            .ok_or_else(|| Error::new(self.span, "missing `name = \"...\"`"))?;
        let (token, ty_span) = self.ty.ok_or_else(|| Error::new(self.span, "missing `ty = ...`"))?;

        let modifiers = match &self.modifiers {
            Some(expr) => {
                let bits = modifier_bits(expr)?;
                Modifiers::from_bits(bits).map_err(|err| Error::new(expr.span(), err))?
            }
            None => default_modifiers,
        };
        if modifiers.contains(Modifiers::STATIC) {
            let span = self.modifiers.as_ref().map_or(ty_span, |expr| expr.span());
            return Err(Error::new(span, "`static` fields cannot be expressed as struct fields"));
        }

        FieldSpec::new(name.value(), TypeRef::Unresolved(token), modifiers).map_err(|err| Error::new(name.span(), err))
    }
}

fn parse_single(attr: &Attribute) -> Result<RawField> {
    let mut raw = RawField::new(attr.span());
    attr.parse_nested_meta(|meta| raw.parse_property(&meta))?;
    Ok(raw)
}

fn parse_multi(attr: &Attribute) -> Result<Vec<RawField>> {
    let mut raws = Vec::new();
    attr.parse_nested_meta(|meta| {
        if !meta.path.is_ident("field") {
            return Err(meta.error("expected `field(name = ..., ty = ..., modifiers = ...)`"));
        }
        let mut raw = RawField::new(meta.path.span());
        meta.parse_nested_meta(|inner| raw.parse_property(&inner))?;
        raws.push(raw);
        Ok(())
    })?;
    Ok(raws)
}

/// Evaluate `9`, `1 | 8`, `(1 | 8)` or `"public static"` to raw bits.
fn modifier_bits(expr: &Expr) -> Result<u64> {
    match expr {
        Expr::Lit(lit) => match &lit.lit {
            Lit::Int(int) => int.base10_parse(),
            Lit::Str(text) => Modifiers::parse_keywords(&text.value())
                .map(Modifiers::bits)
                .map_err(|err| Error::new(text.span(), err)),
            other => Err(Error::new(other.span(), "expected an integer or a keyword string")),
        },
        Expr::Binary(binary) if matches!(binary.op, BinOp::BitOr(_)) => {
            Ok(modifier_bits(&binary.left)? | modifier_bits(&binary.right)?)
        }
        Expr::Paren(paren) => modifier_bits(&paren.expr),
        Expr::Group(group) => modifier_bits(&group.expr),
        other => Err(Error::new(other.span(), "expected an integer or a keyword string")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn item(tokens: syn::ItemStruct) -> Vec<Result<FieldSpec>> {
        read_specs(&tokens.attrs)
    }

    #[test]
    fn test_single_field_defaults_to_public() {
        let specs = item(parse_quote! {
            #[fielder(name = "value", ty = i64)]
            struct Item {}
        });
        let spec = specs[0].as_ref().unwrap();
        assert_eq!(spec.name(), "value");
        assert_eq!(spec.modifiers(), Modifiers::PUBLIC);
        assert_eq!(spec.ty(), &TypeRef::unresolved("i64"));
    }

    #[test]
    fn test_multi_field_list() {
        let specs = item(parse_quote! {
            #[add_fields(
                field(name = "model", ty = String, modifiers = 1),
                field(name = "stamp", ty = "std::time::Instant", modifiers = "protected final"),
                field(name = "color", ty = String),
            )]
            struct Car {}
        });
        let specs: Vec<FieldSpec> = specs.into_iter().map(|s| s.unwrap()).collect();
        assert_eq!(specs.len(), 3);
        assert_eq!(specs[1].ty(), &TypeRef::unresolved("std::time::Instant"));
        assert_eq!(specs[1].modifiers(), Modifiers::PROTECTED | Modifiers::FINAL);
        assert_eq!(specs[2].modifiers(), Modifiers::NONE);
    }

    #[test]
    fn test_bad_entries_fail_individually() {
        let specs = item(parse_quote! {
            #[add_fields(
                field(name = "ok", ty = u8, modifiers = 1 | 16),
                field(name = "9lives", ty = u8),
                field(name = "both", ty = u8, modifiers = 3),
                field(name = "shared", ty = u8, modifiers = 9),
            )]
            struct Cat {}
        });
        assert_eq!(specs.len(), 4);
        assert!(specs[0].is_ok());
        assert!(specs[1].as_ref().unwrap_err().to_string().contains("9lives"));
        assert!(specs[2].is_err());
        assert!(specs[3].as_ref().unwrap_err().to_string().contains("static"));
    }

    #[test]
    fn test_malformed_attribute_is_one_error() {
        let specs = item(parse_quote! {
            #[add_fields(column(name = "x"))]
            struct Broken {}
        });
        assert_eq!(specs.len(), 1);
        assert!(specs[0].is_err());
    }

    #[test]
    fn test_strip_annotations() {
        let mut tokens: syn::ItemStruct = parse_quote! {
            #[derive(Default)]
            #[fielder(name = "value", ty = i64)]
            #[add_fields(field(name = "x", ty = u8))]
            struct Item {}
        };
        assert_eq!(strip_annotations(&mut tokens.attrs), 2);
        assert_eq!(tokens.attrs.len(), 1);
        assert!(tokens.attrs[0].path().is_ident("derive"));
    }
}
