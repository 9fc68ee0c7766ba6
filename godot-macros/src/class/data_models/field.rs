/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use proc_macro2::{Ident, TokenStream};

use crate::util::KvParser;
use crate::ParseResult;

pub struct Field {
    pub name: Ident,
    pub ty: venial::TypeExpr,
    /// From `#[init(val = ...)]`.
    pub default_val: Option<TokenStream>,
    pub var: bool,
    pub export: Option<FieldExport>,
}

impl Field {
    pub fn new(field: &venial::NamedField) -> Self {
        Self {
            name: field.name.clone(),
            ty: field.ty.clone(),
            default_val: None,
            var: false,
            export: None,
        }
    }

    pub fn is_property(&self) -> bool {
        self.var || self.export.is_some()
    }
}

#[derive(Default)]
pub struct Fields {
    /// All fields except `base_field`.
    pub all_fields: Vec<Field>,

    /// The field of type `Base<T>`, if any.
    pub base_field: Option<Field>,
}

impl Fields {
    pub fn properties(&self) -> impl Iterator<Item = &Field> {
        self.all_fields.iter().filter(|field| field.is_property())
    }
}

/// Arguments of `#[export]`.
#[derive(Default)]
pub struct FieldExport {
    pub range: Option<ExportRange>,
}

pub struct ExportRange {
    pub min: TokenStream,
    pub max: TokenStream,
    pub step: Option<TokenStream>,
}

impl FieldExport {
    /// Parses `#[export]` or `#[export(range = (min, max[, step]))]`.
    pub fn new_from_kv(parser: &mut KvParser) -> ParseResult<Self> {
        let range = match parser.handle_list("range")? {
            Some(mut list) => {
                let min = list.next_expr()?;
                let max = list.next_expr()?;
                let step = list.try_next_expr();
                list.finish()?;

                Some(ExportRange { min, max, step })
            }
            None => None,
        };

        Ok(Self { range })
    }
}
