/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

mod kv_parser;
mod list_parser;

use proc_macro2::{Delimiter, Ident, TokenStream, TokenTree};
use quote::{format_ident, quote, ToTokens};

use crate::ParseResult;

pub(crate) use kv_parser::{KvParser, KvValue};
pub(crate) use list_parser::ListParser;

pub fn ident(s: &str) -> Ident {
    format_ident!("{}", s)
}

pub fn error_fn<T: ToTokens>(msg: impl AsRef<str>, tokens: T) -> venial::Error {
    venial::Error::new_at_tokens(tokens, msg.as_ref())
}

macro_rules! error {
    ($tokens:expr, $format_string:literal $($rest:tt)*) => {
        $crate::util::error_fn(format!($format_string $($rest)*), $tokens)
    };
}

macro_rules! bail {
    ($tokens:expr, $format_string:literal $($rest:tt)*) => {
        Err($crate::util::error!($tokens, $format_string $($rest)*))
    };
}

pub(crate) use bail;
pub(crate) use error;

/// Error at a raw span, for places where no tokens are at hand (e.g. a closing delimiter).
pub fn error_at(span: proc_macro2::Span, msg: impl AsRef<str>) -> venial::Error {
    venial::Error::new_at_span(span, msg.as_ref())
}

/// Re-parses an attribute macro invocation `#[self_name(meta)] input` as one item, so the attribute can be read with [`KvParser`].
pub fn venial_parse_meta(
    meta: &TokenStream,
    self_name: Ident,
    input: &TokenStream,
) -> ParseResult<venial::Item> {
    let input = quote! {
        #[#self_name(#meta)]
        #input
    };

    venial::parse_item(input)
}

pub(crate) fn is_punct(tt: &TokenTree, c: char) -> bool {
    match tt {
        TokenTree::Punct(punct) => punct.as_char() == c,
        _ => false,
    }
}

pub(crate) fn delimiter_opening_char(delimiter: Delimiter) -> char {
    match delimiter {
        Delimiter::Parenthesis => '(',
        Delimiter::Brace => '{',
        Delimiter::Bracket => '[',
        Delimiter::None => 'Ø',
    }
}

pub(crate) fn path_is_single(path: &[TokenTree], expected: &str) -> bool {
    path.len() == 1 && path[0].to_string() == expected
}

/// Whether the last identifier in `tokens` is `expected`: `&crate::framework::TestContext` ends with `TestContext`.
pub(crate) fn path_ends_with(tokens: &[TokenTree], expected: &str) -> bool {
    tokens
        .iter()
        .rev()
        .find_map(|tt| match tt {
            TokenTree::Ident(ident) => Some(ident),
            _ => None,
        })
        .is_some_and(|ident| ident == expected)
}

/// Whether the type's outermost path segment is `expected`, ignoring generic arguments: `Base<Node>` ends with `Base`.
pub(crate) fn type_is_named(ty: &venial::TypeExpr, expected: &str) -> bool {
    extract_typename(ty).is_some_and(|segment| segment.ident == expected)
}

/// Gets the right-most type name in the path.
pub(crate) fn extract_typename(ty: &venial::TypeExpr) -> Option<venial::PathSegment> {
    match ty.as_path() {
        Some(mut path) => path.segments.pop(),
        _ => None,
    }
}

/// Expression for the `ClassName` of a user class.
pub fn class_name_obj(class: &impl ToTokens) -> TokenStream {
    let class = class.to_token_stream();
    quote! { <#class as ::godot::obj::GodotClass>::class_name() }
}

/// `(A, B, C,)` tuple type for a list of parameter types; `()` if there are none.
pub fn make_params_tuple_type(param_types: &[venial::TypeExpr]) -> TokenStream {
    quote! { (#(#param_types,)*) }
}

/// Interface traits are named `I` + class name: `INode` is accepted, a plain `Node` is not.
fn is_interface_trait_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next() == Some('I') && chars.next().is_some_and(|c| c.is_ascii_uppercase())
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Validation for trait/impl

/// Validates that the declaration is of the form `impl I... for SomeType`. Returns the class and the trait path.
pub(crate) fn validate_trait_impl_virtual(
    original_impl: &venial::Impl,
    attr: &str,
) -> ParseResult<(Ident, venial::TypeExpr)> {
    let Some(trait_ty) = original_impl.trait_ty.as_ref() else {
        return bail!(original_impl, "#[{attr}] expected a trait impl");
    };

    let is_interface = extract_typename(trait_ty)
        .is_some_and(|segment| is_interface_trait_name(&segment.ident.to_string()));

    if !is_interface {
        return bail!(
            original_impl,
            "#[{attr}] for trait impls requires an interface trait, e.g. `INode` or `IRefCounted`"
        );
    }

    let class_name = validate_self(original_impl, attr)?;
    Ok((class_name, trait_ty.clone()))
}

pub(crate) fn validate_self(original_impl: &venial::Impl, attr: &str) -> ParseResult<Ident> {
    if let Some(params) = original_impl.impl_generic_params.as_ref() {
        return bail!(params, "#[{attr}] does currently not support generic parameters");
    }

    let Some(segment) = extract_typename(&original_impl.self_ty) else {
        return bail!(
            original_impl,
            "#[{attr}] requires Self type to be a simple path"
        );
    };

    if segment.generic_args.is_some() {
        return bail!(
            original_impl,
            "#[{attr}] does currently not support generic arguments"
        );
    }

    Ok(segment.ident)
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interface_trait_names() {
        assert!(is_interface_trait_name("INode"));
        assert!(is_interface_trait_name("IRefCounted"));
        assert!(!is_interface_trait_name("Node"));
        assert!(!is_interface_trait_name("Iterator"));
        assert!(!is_interface_trait_name("I"));
    }

    #[test]
    fn type_names_ignore_generics() {
        let ty = venial::TypeExpr {
            tokens: quote! { Base<Node> }.into_iter().collect(),
        };

        assert!(type_is_named(&ty, "Base"));
        assert!(!type_is_named(&ty, "Node"));
    }
}
