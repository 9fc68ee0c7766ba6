/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};

use crate::class::{into_signature_info, make_virtual_callback};
use crate::{util, ParseResult};

/// Codegen for `#[godot_api] impl ISomething for MyType`.
pub fn transform_trait_impl(original_impl: venial::Impl) -> ParseResult<TokenStream> {
    let (class_name, trait_path) = util::validate_trait_impl_virtual(&original_impl, "godot_api")?;
    let prv = quote! { ::godot::private };

    let mut cap_impls = vec![];
    let mut builder_calls = vec![];
    let mut virtual_arms = vec![];

    for item in original_impl.body_items.iter() {
        let venial::ImplMember::AssocFunction(method) = item else {
            continue;
        };

        let method_name = method.name.to_string();

        if let Some(special) = make_special_method(&class_name, &trait_path, &method_name) {
            cap_impls.push(special.cap_impl);
            builder_calls.push(special.builder_call);
            continue;
        }

        // All other methods are engine virtuals, named with a leading underscore on the engine side.
        let godot_name = format!("_{method_name}");
        let signature_info = into_signature_info(method)?;
        let callback = make_virtual_callback(&class_name, &trait_path, &signature_info, &godot_name);

        virtual_arms.push(quote! {
            #godot_name => #callback,
        });
    }

    Ok(quote! {
        #original_impl

        impl #prv::You_forgot_the_attribute__godot_api for #class_name {}

        #( #cap_impls )*

        impl ::godot::obj::cap::ImplementsGodotVirtual for #class_name {
            fn __virtual_call(name: &str) -> ::godot::sys::GDExtensionClassCallVirtual {
                match name {
                    #( #virtual_arms )*
                    _ => None,
                }
            }
        }

        ::godot::sys::plugin_add!(#prv::__GODOT_PLUGIN_REGISTRY; #prv::ClassPlugin::new::<#class_name>(
            #prv::PluginItem::ITraitImpl(
                #prv::ITraitImpl::new::<#class_name>()
                    #( #builder_calls )*
            )
        ));
    })
}

/// Interface methods that are not engine virtuals, but map to dedicated class callbacks.
struct SpecialMethod {
    cap_impl: TokenStream,
    builder_call: TokenStream,
}

fn make_special_method(class_name: &Ident, trait_path: &venial::TypeExpr, method_name: &str) -> Option<SpecialMethod> {
    let method = format_ident!("{method_name}");
    let (cap_trait, cap_fn, builder) = match method_name {
        "init" => ("GodotDefault", quote! {
            fn __godot_user_init(base: ::godot::obj::Base<Self::Base>) -> Self {
                <Self as #trait_path>::#method(base)
            }
        }, "with_create"),

        "to_string" => ("GodotToString", quote! {
            fn __godot_to_string(&self) -> ::godot::builtin::GString {
                <Self as #trait_path>::#method(self)
            }
        }, "with_string"),

        "on_notification" => ("GodotNotification", quote! {
            fn __godot_notification(&mut self, what: i32) {
                <Self as #trait_path>::#method(self, what)
            }
        }, "with_on_notification"),

        "get_property" => ("GodotGet", quote! {
            fn __godot_get_property(&self, property: ::godot::builtin::StringName) -> Option<::godot::builtin::Variant> {
                <Self as #trait_path>::#method(self, property)
            }
        }, "with_get_property"),

        "set_property" => ("GodotSet", quote! {
            fn __godot_set_property(&mut self, property: ::godot::builtin::StringName, value: ::godot::builtin::Variant) -> bool {
                <Self as #trait_path>::#method(self, property, value)
            }
        }, "with_set_property"),

        "get_property_list" => ("GodotGetPropertyList", quote! {
            fn __godot_get_property_list(&mut self) -> Vec<::godot::meta::PropertyInfo> {
                <Self as #trait_path>::#method(self)
            }
        }, "with_get_property_list"),

        "property_get_revert" => ("GodotPropertyGetRevert", quote! {
            fn __godot_property_get_revert(&self, property: ::godot::builtin::StringName) -> Option<::godot::builtin::Variant> {
                <Self as #trait_path>::#method(self, property)
            }
        }, "with_property_get_revert"),

        "validate_property" => ("GodotValidateProperty", quote! {
            fn __godot_validate_property(&self, property: &mut ::godot::meta::PropertyInfo) {
                <Self as #trait_path>::#method(self, property)
            }
        }, "with_validate_property"),

        _ => return None,
    };

    let cap_trait = format_ident!("{cap_trait}");
    let builder = format_ident!("{builder}");

    Some(SpecialMethod {
        cap_impl: quote! {
            impl ::godot::obj::cap::#cap_trait for #class_name {
                #cap_fn
            }
        },
        builder_call: quote! { .#builder::<#class_name>() },
    })
}
