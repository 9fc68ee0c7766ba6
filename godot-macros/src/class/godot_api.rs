/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use proc_macro2::TokenStream;

use crate::class::{transform_inherent_impl, transform_trait_impl};
use crate::util::{bail, KvParser};
use crate::ParseResult;

pub fn attribute_godot_api(input_item: venial::Item) -> ParseResult<TokenStream> {
    let mut decl = match input_item {
        venial::Item::Impl(decl) => decl,
        _ => bail!(
            input_item,
            "#[godot_api] can only be applied on impl blocks",
        )?,
    };

    // `venial_parse_meta` re-attached the attribute itself; it takes no arguments.
    let attrs = std::mem::take(&mut decl.attributes);
    let (own, others): (Vec<_>, Vec<_>) = attrs
        .into_iter()
        .partition(|attr| crate::util::path_is_single(&attr.path, "godot_api"));

    if let Some(parser) = KvParser::parse(&own, "godot_api")? {
        parser.finish()?;
    }
    decl.attributes = others;

    if decl.impl_generic_params.is_some() {
        bail!(
            &decl,
            "#[godot_api] currently does not support generic parameters",
        )
    } else if decl.self_ty.as_path().is_none() {
        bail!(decl, "invalid Self type for #[godot_api] impl")
    } else if decl.trait_ty.is_some() {
        transform_trait_impl(decl)
    } else {
        transform_inherent_impl(decl)
    }
}
