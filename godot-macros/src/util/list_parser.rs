/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::collections::VecDeque;

use proc_macro2::{Delimiter, Span, TokenStream, TokenTree};

use super::{bail, delimiter_opening_char, error_at, is_punct, KvParser, KvValue};
use crate::ParseResult;

/// Parses `key = (elem1, elem2, ...)` as an ordered list of expressions, unlike [`KvParser`] which treats its input as a set.
pub(crate) struct ListParser {
    elems: VecDeque<KvValue>,
    /// Usually the closing parenthesis; errors about missing elements point here.
    span_close: Span,
}

impl ListParser {
    /// Takes `key` out of `parser`. A key without value counts as an empty list.
    pub fn new_from_kv(
        parser: &mut KvParser,
        key: &str,
        delimiter: Delimiter,
    ) -> ParseResult<Option<Self>> {
        let mut tokens = match parser.handle_any_entry(key) {
            None => return Ok(None),
            Some((key, None)) => {
                return Ok(Some(Self {
                    elems: VecDeque::new(),
                    span_close: key.span(),
                }))
            }
            Some((_key, Some(value))) => value.into_tokens(),
        };

        if tokens.len() > 1 {
            return bail!(&tokens[1], "unexpected tokens after list");
        }

        Self::new_from_tree(tokens.remove(0), delimiter).map(Some)
    }

    /// Splits a delimited group at top-level commas. A single trailing comma is allowed.
    pub fn new_from_tree(tree: TokenTree, delimiter: Delimiter) -> ParseResult<Self> {
        let TokenTree::Group(group) = tree else {
            return bail!(tree, "expected list of items");
        };

        if group.delimiter() != delimiter {
            let expected = delimiter_opening_char(delimiter);
            let got = delimiter_opening_char(group.delimiter());
            return Err(error_at(
                group.span_open(),
                format!("expected `{expected}`, got `{got}`"),
            ));
        }

        let trees: Vec<TokenTree> = group.stream().into_iter().collect();
        let mut elems = VecDeque::new();

        for chunk in trees.split(|tree| is_punct(tree, ',')) {
            if chunk.is_empty() {
                continue;
            }
            elems.push_back(KvValue::new(chunk.to_vec()));
        }

        // `(a,,b)` or `(,)`: more separators than elements allow.
        let separators = trees.iter().filter(|tree| is_punct(tree, ',')).count();
        let trailing = trees.last().is_some_and(|tree| is_punct(tree, ','));
        let allowed = elems.len().saturating_sub(1) + usize::from(trailing && !elems.is_empty());
        if separators > allowed {
            return Err(error_at(group.span(), "expected expression, found `,`"));
        }

        Ok(Self {
            elems,
            span_close: group.span_close(),
        })
    }

    /// Takes the next element, which must exist.
    pub fn next_expr(&mut self) -> ParseResult<TokenStream> {
        match self.elems.pop_front() {
            Some(elem) => Ok(elem.expr()),
            None => Err(error_at(self.span_close, "expected expression")),
        }
    }

    /// Takes the next element if there is one.
    pub fn try_next_expr(&mut self) -> Option<TokenStream> {
        self.elems.pop_front().map(KvValue::expr)
    }

    /// Ensures all elements have been consumed.
    pub fn finish(&mut self) -> ParseResult<()> {
        match self.elems.pop_front() {
            Some(elem) => {
                let stream = elem.expr();
                bail!(&stream, "unexpected value `{stream}`")
            }
            None => Ok(()),
        }
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;

    fn list(tokens: TokenStream) -> ParseResult<ListParser> {
        let tree = quote! { (#tokens) }.into_iter().next().unwrap();
        ListParser::new_from_tree(tree, Delimiter::Parenthesis)
    }

    #[test]
    fn splits_top_level_commas() {
        let mut parser = list(quote! { 0, f(1, 2), -3.5 }).unwrap();

        assert_eq!(parser.next_expr().unwrap().to_string(), "0");
        assert_eq!(parser.next_expr().unwrap().to_string(), "f (1 , 2)");
        assert_eq!(parser.try_next_expr().unwrap().to_string(), "- 3.5");
        assert!(parser.try_next_expr().is_none());
        assert!(parser.next_expr().is_err());
        assert!(parser.finish().is_ok());
    }

    #[test]
    fn trailing_comma_allowed() {
        let mut parser = list(quote! { 0, 100, }).unwrap();
        assert_eq!(parser.next_expr().unwrap().to_string(), "0");
        assert_eq!(parser.next_expr().unwrap().to_string(), "100");
        assert!(parser.finish().is_ok());
    }

    #[test]
    fn empty_elements_rejected() {
        assert!(list(quote! { 0,, 100 }).is_err());
        assert!(list(quote! { , }).is_err());
    }

    #[test]
    fn leftover_elements_rejected() {
        let mut parser = list(quote! { 1, 2 }).unwrap();
        parser.next_expr().unwrap();
        assert!(parser.finish().is_err());
    }

    #[test]
    fn wrong_delimiter() {
        let tree = quote! { [1, 2] }.into_iter().next().unwrap();
        assert!(ListParser::new_from_tree(tree, Delimiter::Parenthesis).is_err());
    }
}
