use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{format_ident, quote, quote_spanned};
use syn::spanned::Spanned;
use syn::{Error, ItemMod, LitStr, parse_macro_input};

use fielder::{InsertionPolicy, Injector, Round, Severity, SourceHost};

/// Inject annotated fields into the structs of an inline module.
///
/// Structs inside the module request fields with `#[fielder(...)]` or
/// `#[add_fields(field(...), ...)]`. Rejected requests surface as compiler
/// warnings (duplicates, non-struct items) or errors (missing zero-argument
/// constructor, unknown types, malformed annotations).
///
/// # Example
///
/// ```text
/// #[fielder_macros::inject]
/// mod models {
///     #[fielder(name = "id", ty = u64)]
///     #[derive(Default)]
///     pub struct User {
///         pub name: String,
///     }
/// }
///
/// // Generated:
/// // pub struct User { pub id: u64, pub name: String }
/// ```
///
/// `#[inject(insertion = "declaration-order")]` keeps injected fields in
/// annotation order instead of prepending each one.
#[proc_macro_attribute]
pub fn inject(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut policy = InsertionPolicy::default();
    let parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("insertion") {
            let value: LitStr = meta.value()?.parse()?;
            policy = value.value().parse().map_err(|err: String| Error::new(value.span(), err))?;
            Ok(())
        } else {
            Err(meta.error("unsupported inject argument; expected `insertion`"))
        }
    });
    parse_macro_input!(attr with parser);
    let module = parse_macro_input!(item as ItemMod);

    match expand(module, policy) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(mut module: ItemMod, policy: InsertionPolicy) -> syn::Result<TokenStream2> {
    let span = module.span();
    let Some((_, items)) = module.content.as_mut() else {
        return Err(Error::new(
            span,
            "#[inject] needs an inline module body: `mod name { ... }`",
        ));
    };

    let round = Injector::new(SourceHost::ProcMacro).policy(policy).inject_items(items);
    let diagnostics = emit_diagnostics(&round);

    Ok(quote! {
        #module
        #diagnostics
    })
}

/// Errors become `compile_error!`; warnings ride on a deprecated constant so
/// they show up as regular compiler warnings at the annotated item.
fn emit_diagnostics(round: &Round) -> TokenStream2 {
    let mut errors: Option<Error> = None;
    let mut warnings = Vec::new();

    for (index, diagnostic) in round.diagnostics().enumerate() {
        let span = diagnostic
            .node
            .and_then(|node| round.span(node))
            .unwrap_or_else(Span::call_site);

        match diagnostic.severity {
            Severity::Error => {
                let err = Error::new(span, &diagnostic.message);
                match &mut errors {
                    Some(existing) => existing.combine(err),
                    None => errors = Some(err),
                }
            }
            Severity::Warning => {
                let name = format_ident!("fielder_warning_{}", index);
                let note = &diagnostic.message;
                warnings.push(quote_spanned! {span=>
                    const _: () = {
                        #[deprecated(note = #note)]
                        #[allow(non_upper_case_globals)]
                        const #name: () = ();
                        #name
                    };
                });
            }
            Severity::Note => {}
        }
    }

    let errors = errors.map(|err| err.to_compile_error());
    quote! {
        #errors
        #(#warnings)*
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn expand_str(module: ItemMod) -> String {
        expand(module, InsertionPolicy::Prepend).unwrap().to_string()
    }

    #[test]
    fn test_injects_into_inline_module() {
        let output = expand_str(parse_quote! {
            mod models {
                #[fielder(name = "id", ty = u64)]
                #[derive(Default)]
                pub struct User { pub name: String }
            }
        });
        assert!(output.contains("pub id : u64"), "{output}");
        assert!(!output.contains("fielder ("), "{output}");
        assert!(!output.contains("compile_error"), "{output}");
    }

    #[test]
    fn test_out_of_line_module_is_rejected() {
        let err = expand(parse_quote!(mod models;), InsertionPolicy::Prepend).unwrap_err();
        assert!(err.to_string().contains("inline module"));
    }

    #[test]
    fn test_errors_and_warnings_are_emitted() {
        let output = expand_str(parse_quote! {
            mod models {
                #[fielder(name = "id", ty = u64)]
                pub struct Loose { pub name: String }

                #[fielder(name = "id", ty = u64)]
                pub enum Kind { A }
            }
        });
        assert_eq!(output.matches("compile_error").count(), 1, "{output}");
        assert!(output.contains("zero-argument constructor"), "{output}");
        assert!(output.contains("deprecated"), "{output}");
        assert!(output.contains("fielder_warning_"), "{output}");
    }
}
