/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Code generation for `#[var]` and `#[export]` fields.

use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};

use crate::class::{make_method_registration, Field, FieldExport, Fields, FuncDefinition, ReceiverType, SignatureInfo};
use crate::ParseResult;

/// Generated accessor pair, through which the engine reads and writes one property.
struct Accessors {
    getter: Ident,
    setter: Ident,
}

impl Accessors {
    fn for_field(field: &Field) -> Self {
        Self {
            getter: format_ident!("get_{}", field.name),
            setter: format_ident!("set_{}", field.name),
        }
    }
}

/// Emits the hidden accessor methods and the `ImplementsGodotExports` impl registering them.
pub fn make_property_impl(class_name: &Ident, fields: &Fields) -> ParseResult<TokenStream> {
    let mut accessor_fns = Vec::new();
    let mut registrations = Vec::new();

    for field in fields.properties() {
        let Field { name, ty, .. } = field;
        let field_name = name.to_string();
        let Accessors { getter, setter } = Accessors::for_field(field);
        let via = quote! { <#ty as ::godot::meta::GodotConvert>::Via };

        accessor_fns.push(quote! {
            #[doc(hidden)]
            pub fn #getter(&self) -> #via {
                <#ty as ::godot::register::property::Var>::var_get(&self.#name)
            }

            #[doc(hidden)]
            pub fn #setter(&mut self, #name: #via) {
                <#ty as ::godot::register::property::Var>::var_set(&mut self.#name, #name)
            }
        });

        let getter_registration = make_method_registration(
            class_name,
            &FuncDefinition {
                signature_info: SignatureInfo {
                    method_name: getter.clone(),
                    receiver_type: ReceiverType::Ref,
                    param_names: vec![],
                    param_types: vec![],
                    ret_type: via.clone(),
                },
                rename: None,
            },
        )?;

        let setter_registration = make_method_registration(
            class_name,
            &FuncDefinition {
                signature_info: SignatureInfo {
                    method_name: setter.clone(),
                    receiver_type: ReceiverType::Mut,
                    param_names: vec![field_name.clone()],
                    param_types: vec![venial::TypeExpr {
                        tokens: via.clone().into_iter().collect(),
                    }],
                    ret_type: quote! { () },
                },
                rename: None,
            },
        )?;

        let property_info = make_property_info(field);
        let getter_name = getter.to_string();
        let setter_name = setter.to_string();

        registrations.push(quote! {
            #getter_registration
            #setter_registration

            ::godot::private::register_var(
                <#class_name as ::godot::obj::GodotClass>::class_name(),
                &#property_info,
                #getter_name,
                #setter_name,
            );
        });
    }

    let accessors_impl = if accessor_fns.is_empty() {
        TokenStream::new()
    } else {
        quote! {
            impl #class_name {
                #( #accessor_fns )*
            }
        }
    };

    Ok(quote! {
        #accessors_impl

        impl ::godot::obj::cap::ImplementsGodotExports for #class_name {
            fn __register_exports() {
                #( #registrations )*
            }
        }
    })
}

fn make_property_info(field: &Field) -> TokenStream {
    let ty = &field.ty;
    let name = field.name.to_string();

    match &field.export {
        None => quote! {
            ::godot::meta::PropertyInfo::new_var::<#ty>(#name)
        },

        Some(FieldExport { range: None }) => quote! {
            ::godot::meta::PropertyInfo::new_export::<#ty>(#name)
        },

        Some(FieldExport { range: Some(range) }) => {
            let min = &range.min;
            let max = &range.max;
            let step = match &range.step {
                Some(step) => quote! { Some((#step) as f64) },
                None => quote! { None },
            };

            quote! {
                ::godot::meta::PropertyInfo::new_export::<#ty>(#name).with_hint_info(
                    ::godot::private::export_info_functions::export_range((#min) as f64, (#max) as f64, #step)
                )
            }
        }
    }
}

/// Body of `UserClass::__field_revert()`: properties with an `#[init(val)]` default revert to that value.
pub fn make_field_revert(fields: &Fields) -> TokenStream {
    let arms = fields
        .properties()
        .filter_map(|field| {
            let default_val = field.default_val.as_ref()?;
            let ty = &field.ty;
            let name = field.name.to_string();

            Some(quote! {
                #name => {
                    let value: #ty = #default_val;
                    Some(::godot::meta::ToGodot::to_variant(
                        &<#ty as ::godot::register::property::Var>::var_get(&value)
                    ))
                }
            })
        })
        .collect::<Vec<_>>();

    if arms.is_empty() {
        return TokenStream::new();
    }

    quote! {
        fn __field_revert(property: &str) -> Option<::godot::builtin::Variant> {
            match property {
                #( #arms )*
                _ => None,
            }
        }
    }
}
