/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use proc_macro2::TokenStream;
use quote::quote;

use crate::class::{
    into_signature_info, make_method_registration, make_signal_registrations, FuncDefinition,
    SignalDefinition,
};
use crate::util::{bail, path_is_single, KvParser};
use crate::{util, ParseResult};

/// Attribute on an item of an inherent impl block.
enum ItemAttr {
    Func { rename: Option<String> },
    Signal,
}

/// Codegen for `#[godot_api] impl MyType`.
pub fn transform_inherent_impl(mut impl_block: venial::Impl) -> ParseResult<TokenStream> {
    let class_name = util::validate_self(&impl_block, "godot_api")?;
    let prv = quote! { ::godot::private };

    let (funcs, signals) = process_godot_fns(&mut impl_block)?;

    let method_registrations = funcs
        .iter()
        .map(|func| make_method_registration(&class_name, func))
        .collect::<ParseResult<Vec<_>>>()?;

    let signal_registrations = make_signal_registrations(&class_name, &signals);

    Ok(quote! {
        #impl_block

        impl ::godot::obj::cap::ImplementsGodotApi for #class_name {
            fn __register_methods() {
                #( #method_registrations )*
            }

            fn __register_signals() {
                #signal_registrations
            }
        }

        ::godot::sys::plugin_add!(#prv::__GODOT_PLUGIN_REGISTRY; #prv::ClassPlugin::new::<#class_name>(
            #prv::PluginItem::InherentImpl(#prv::InherentImpl::new::<#class_name>())
        ));
    })
}

/// Collects `#[func]` and `#[signal]` items, removing their attributes. Signal declarations are removed from the block entirely.
fn process_godot_fns(
    impl_block: &mut venial::Impl,
) -> ParseResult<(Vec<FuncDefinition>, Vec<SignalDefinition>)> {
    let mut func_definitions = vec![];
    let mut signal_definitions = vec![];
    let mut removed_indexes = vec![];

    for (index, item) in impl_block.body_items.iter_mut().enumerate() {
        let venial::ImplMember::AssocFunction(function) = item else {
            continue;
        };

        let Some(attr) = extract_attributes(function)? else {
            continue;
        };

        match attr {
            ItemAttr::Func { rename } => {
                if function.body.is_none() {
                    return bail!(&function.name, "#[func] requires a function body");
                }

                func_definitions.push(FuncDefinition {
                    signature_info: into_signature_info(function)?,
                    rename,
                });
            }
            ItemAttr::Signal => {
                signal_definitions.push(SignalDefinition::parse(function)?);
                removed_indexes.push(index);
            }
        }
    }

    // Reverse order, so indexes stay valid.
    for index in removed_indexes.into_iter().rev() {
        impl_block.body_items.remove(index);
    }

    Ok((func_definitions, signal_definitions))
}

/// Parses and strips `#[func]` or `#[signal]`. At most one of them may be present.
fn extract_attributes(function: &mut venial::Function) -> ParseResult<Option<ItemAttr>> {
    let mut parsed = None;

    if let Some(mut parser) = KvParser::parse(&function.attributes, "func")? {
        let rename = parser.handle_ident("rename")?.map(|ident| ident.to_string());
        parser.finish()?;
        parsed = Some(ItemAttr::Func { rename });
    }

    if let Some(parser) = KvParser::parse(&function.attributes, "signal")? {
        parser.finish()?;
        if parsed.is_some() {
            return bail!(&function.name, "#[func] and #[signal] are mutually exclusive");
        }
        parsed = Some(ItemAttr::Signal);
    }

    if parsed.is_some() {
        function.attributes.retain(|attr| {
            !path_is_single(&attr.path, "func") && !path_is_single(&attr.path, "signal")
        });
    }

    Ok(parsed)
}
