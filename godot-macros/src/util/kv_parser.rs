/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::collections::HashMap;

use proc_macro2::{Delimiter, Ident, Span, TokenStream, TokenTree};
use quote::ToTokens;

use super::{bail, error, error_at, ident, is_punct, path_is_single, ListParser};
use crate::ParseResult;

pub(crate) type KvMap = HashMap<Ident, Option<KvValue>>;

/// Parses attributes like `#[attr(key, key2 = value, key3 = (a, b))]` into a set of keys, each with an optional value.
///
/// Every key must be consumed by one of the `handle_*` methods; [`finish()`](Self::finish) reports the rest as unrecognized.
pub(crate) struct KvParser {
    map: KvMap,
}

impl KvParser {
    /// Like [`parse()`](Self::parse), but the attribute must be present. `context` locates the error otherwise.
    pub fn parse_required(
        attributes: &[venial::Attribute],
        expected: &str,
        context: impl ToTokens,
    ) -> ParseResult<Self> {
        match Self::parse(attributes, expected)? {
            Some(parser) => Ok(parser),
            None => bail!(context, "expected attribute #[{expected}], but not present"),
        }
    }

    /// Looks for a single `#[expected]` attribute. Returns `Ok(None)` if there is none.
    pub fn parse(attributes: &[venial::Attribute], expected: &str) -> ParseResult<Option<Self>> {
        let mut found: Option<Self> = None;

        for attr in attributes {
            if !path_is_single(&attr.path, expected) {
                continue;
            }

            if found.is_some() {
                return bail!(attr, "only a single #[{expected}] attribute allowed");
            }

            found = Some(Self {
                map: ParserState::parse(expected, &attr.value)?,
            });
        }

        Ok(found)
    }

    /// Removes `key`, returning the key ident (with its span) and the value, if any.
    pub fn handle_any_entry(&mut self, key: &str) -> Option<(Ident, Option<KvValue>)> {
        self.map.remove_entry(&ident(key))
    }

    /// Handles a key without value, e.g. `#[class(init)]`. Returns whether it is present.
    pub fn handle_alone(&mut self, key: &str) -> ParseResult<bool> {
        match self.handle_any_entry(key) {
            None => Ok(false),
            Some((_key, None)) => Ok(true),
            Some((_key, Some(value))) => {
                bail!(&value.tokens[0], "key `{key}` should not have a value")
            }
        }
    }

    /// Handles an optional `key = identifier`.
    pub fn handle_ident(&mut self, key: &str) -> ParseResult<Option<Ident>> {
        match self.handle_any_entry(key) {
            None => Ok(None),
            Some((key, None)) => bail!(key, "expected `{key}` to be followed by `= identifier`"),
            Some((_key, Some(value))) => value.ident().map(Some),
        }
    }

    /// Handles an optional `key = expression`, where the expression may be any token sequence up to the next top-level `,`.
    pub fn handle_expr(&mut self, key: &str) -> ParseResult<Option<TokenStream>> {
        match self.handle_any_entry(key) {
            None => Ok(None),
            Some((key, None)) => bail!(key, "expected `{key}` to be followed by `= expression`"),
            Some((_key, Some(value))) => Ok(Some(value.expr())),
        }
    }

    /// Handles an optional `key = (elem1, elem2, ...)`.
    pub fn handle_list(&mut self, key: &str) -> ParseResult<Option<ListParser>> {
        ListParser::new_from_kv(self, key, Delimiter::Parenthesis)
    }

    /// Checks that every key has been consumed.
    ///
    /// Not done in `Drop`: a parser may be dropped half-consumed when another error is returned first.
    pub fn finish(self) -> ParseResult<()> {
        let mut keys: Vec<&Ident> = self.map.keys().collect();
        keys.sort_by_key(|key| key.to_string());

        let mut errors = keys
            .into_iter()
            .map(|key| error!(key, "unrecognized key `{key}`"));

        let Some(mut first) = errors.next() else {
            return Ok(());
        };

        for err in errors {
            first.combine(err);
        }

        Err(first)
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub(crate) struct KvValue {
    /// Never empty.
    tokens: Vec<TokenTree>,
}

impl KvValue {
    pub(super) fn new(tokens: Vec<TokenTree>) -> Self {
        assert!(!tokens.is_empty(), "KvValue must not be empty");
        Self { tokens }
    }

    pub fn into_tokens(self) -> Vec<TokenTree> {
        self.tokens
    }

    pub fn expr(self) -> TokenStream {
        self.tokens.into_iter().collect()
    }

    pub fn ident(self) -> ParseResult<Ident> {
        if let Some(surplus) = self.tokens.get(1) {
            return bail!(surplus, "expected a single identifier, not an expression");
        }

        match &self.tokens[0] {
            TokenTree::Ident(ident) => Ok(ident.clone()),
            other => bail!(other, "expected identifier"),
        }
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

struct ParserState<'a> {
    attr_name: &'a str,
    tokens: std::slice::Iter<'a, TokenTree>,
    prev: Option<&'a TokenTree>,
    cur: Option<&'a TokenTree>,
}

impl<'a> ParserState<'a> {
    fn parse(attr_name: &'a str, attr_value: &'a venial::AttributeValue) -> ParseResult<KvMap> {
        let mut tokens = match attr_value {
            venial::AttributeValue::Equals(punct, _tokens) => {
                return bail!(punct, "expected `(` or `]`");
            }
            _ => attr_value.get_value_tokens().iter(),
        };

        let cur = tokens.next();
        let state = Self {
            attr_name,
            tokens,
            prev: None,
            cur,
        };

        state.parse_map()
    }

    fn parse_map(mut self) -> ParseResult<KvMap> {
        let mut map = KvMap::new();

        // A multi-token value before an unexpected token often means a `,` inside an expression; used for a hint.
        let mut prev_expr_complex = false;

        while let Some(cur) = self.cur {
            let TokenTree::Ident(key) = cur else {
                let hint = self.parens_hint(prev_expr_complex, "the preceding `,` is interpreted as a separator");
                return bail!(cur, "expected identifier{hint}");
            };

            self.next();
            let value = self.parse_opt_value(key, prev_expr_complex)?;

            if map.contains_key(key) {
                return bail!(key, "duplicate key `{key}`");
            }

            prev_expr_complex = value.as_ref().is_some_and(|value| value.tokens.len() > 1);
            map.insert(key.clone(), value);
        }

        Ok(map)
    }

    fn parse_opt_value(&mut self, key: &Ident, prev_expr_complex: bool) -> ParseResult<Option<KvValue>> {
        match self.cur {
            None => Ok(None),

            Some(tt) if is_punct(tt, ',') => {
                self.next();
                Ok(None)
            }

            Some(tt) if is_punct(tt, '=') => {
                self.next();
                self.parse_value().map(Some)
            }

            Some(tt) => {
                let hint = self.parens_hint(prev_expr_complex, &format!("`{key}` is interpreted as the next argument"));
                bail!(tt, "expected next argument, or `= value` following `{key}`{hint}")
            }
        }
    }

    fn parse_value(&mut self) -> ParseResult<KvValue> {
        let mut tokens = Vec::new();

        while let Some(cur) = self.cur {
            self.next();
            if is_punct(cur, ',') {
                break;
            }
            tokens.push(cur.clone());
        }

        if tokens.is_empty() {
            // Points at the `=` or at a `,` directly following it.
            return match self.prev {
                Some(prev) => bail!(prev, "expected value after `=`"),
                None => Err(error_at(Span::call_site(), "expected value after `=`")),
            };
        }

        Ok(KvValue::new(tokens))
    }

    fn parens_hint(&self, prev_expr_complex: bool, what: &str) -> String {
        if prev_expr_complex {
            let attr = self.attr_name;
            format!("\nnote: {what} to `#[{attr}]`; surround expressions containing `,` with parentheses")
        } else {
            String::new()
        }
    }

    fn next(&mut self) {
        self.prev = self.cur;
        self.cur = self.tokens.next();
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;

    fn value_string(value: &Option<KvValue>) -> Option<String> {
        value.as_ref().map(|value| value.clone().expr().to_string())
    }

    fn parse_attr(attr: TokenStream) -> ParseResult<KvParser> {
        let item = venial::parse_item(quote! {
            #attr
            fn func();
        })?;

        KvParser::parse_required(item.attributes(), "attr", quote! {})
    }

    fn parse_map(attr: TokenStream) -> KvMap {
        let parser = parse_attr(attr).expect("valid attribute");
        parser.map
    }

    #[test]
    fn keys_alone_and_with_values() {
        let map = parse_map(quote! { #[attr(init, base = Node, rename = Other,)] });

        assert_eq!(map.len(), 3);
        assert_eq!(value_string(&map[&ident("init")]), None);
        assert_eq!(value_string(&map[&ident("base")]).as_deref(), Some("Node"));
        assert_eq!(value_string(&map[&ident("rename")]).as_deref(), Some("Other"));
    }

    #[test]
    fn expressions_up_to_top_level_comma() {
        let map = parse_map(quote! {
            #[attr(
                val = -42,
                sum = 1 + 1,
                call = Vector2::new(1.0, -1.0e2),
                range = (0, 100),
                generic = (HashMap::<String, Vec<usize>>::new()),
            )]
        });

        assert_eq!(value_string(&map[&ident("val")]).as_deref(), Some("- 42"));
        assert_eq!(value_string(&map[&ident("sum")]).as_deref(), Some("1 + 1"));
        assert_eq!(
            value_string(&map[&ident("call")]).as_deref(),
            Some("Vector2 :: new (1.0 , - 1.0e2)")
        );
        assert_eq!(value_string(&map[&ident("range")]).as_deref(), Some("(0 , 100)"));
        assert!(map.contains_key(&ident("generic")));
    }

    #[test]
    fn handlers_consume_keys() {
        let mut parser = parse_attr(quote! { #[attr(init, base = Node, val = 1 + 2)] }).unwrap();

        assert!(parser.handle_alone("init").unwrap());
        assert!(!parser.handle_alone("no_init").unwrap());
        assert_eq!(parser.handle_ident("base").unwrap().unwrap(), "Node");
        assert_eq!(parser.handle_expr("val").unwrap().unwrap().to_string(), "1 + 2");

        assert!(parser.finish().is_ok());
    }

    #[test]
    fn rejects_leftover_and_malformed_keys() {
        let parser = parse_attr(quote! { #[attr(unknown)] }).unwrap();
        assert!(parser.finish().is_err());

        let mut parser = parse_attr(quote! { #[attr(init = 5)] }).unwrap();
        assert!(parser.handle_alone("init").is_err());

        let mut parser = parse_attr(quote! { #[attr(base = (a, b))] }).unwrap();
        assert!(parser.handle_ident("base").is_err());

        assert!(parse_attr(quote! { #[attr(key = )] }).is_err());
        assert!(parse_attr(quote! { #[attr(key, key)] }).is_err());
        assert!(parse_attr(quote! { #[attr(5)] }).is_err());
    }

    #[test]
    fn missing_required_attribute() {
        let item = venial::parse_item(quote! { fn func(); }).unwrap();
        assert!(KvParser::parse_required(item.attributes(), "attr", quote! {}).is_err());
        assert!(KvParser::parse(item.attributes(), "attr").unwrap().is_none());
    }
}
