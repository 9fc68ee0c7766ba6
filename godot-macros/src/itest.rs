/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use proc_macro2::TokenStream;
use quote::{quote, ToTokens};

use crate::util::{bail, path_ends_with, path_is_single, KvParser};
use crate::ParseResult;

pub fn attribute_itest(input_item: venial::Item) -> ParseResult<TokenStream> {
    let func = match input_item {
        venial::Item::Function(f) => f,
        _ => return bail!(&input_item, "#[itest] can only be applied to functions"),
    };

    let mut attr = KvParser::parse_required(&func.attributes, "itest", &func.name)?;
    let skipped = attr.handle_alone("skip")?;
    let focused = attr.handle_alone("focus")?;
    attr.finish()?;

    if func.generic_params.is_some()
        || func.params.len() > 1
        || func.return_ty.is_some()
        || func.where_clause.is_some()
    {
        return bad_signature(&func);
    }

    if skipped && focused {
        return bail!(
            func.name,
            "#[itest]: keys `skip` and `focus` are mutually exclusive",
        );
    }

    let test_name = &func.name;
    let test_name_str = func.name.to_string();

    // Keep the parameter name chosen by the user, or declare an unused one.
    let param = match func.params.first() {
        Some((venial::FnParam::Typed(param), _punct)) if path_ends_with(&param.ty.tokens, "TestContext") => {
            param.to_token_stream()
        }
        Some(_) => return bad_signature(&func),
        None => quote! { __unused_context: &crate::framework::TestContext },
    };

    let body = &func.body;

    // Other attributes like #[allow] or #[cfg] stay on the function.
    let other_attributes = func
        .attributes
        .iter()
        .filter(|attr| !path_is_single(&attr.path, "itest"));

    Ok(quote! {
        #(#other_attributes)*
        pub fn #test_name(#param) {
            #body
        }

        ::godot::sys::plugin_add!(crate::framework::__GODOT_ITEST; crate::framework::RustTestCase {
            name: #test_name_str,
            skipped: #skipped,
            focused: #focused,
            file: std::file!(),
            line: std::line!(),
            function: #test_name,
        });
    })
}

fn bad_signature(func: &venial::Function) -> ParseResult<TokenStream> {
    bail!(
        func,
        "#[itest] function must have one of these signatures:\
        \n  fn {f}() {{ ... }}\
        \n  fn {f}(ctx: &TestContext) {{ ... }}",
        f = func.name,
    )
}
