/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};

use crate::util::{self, bail};
use crate::ParseResult;

/// Information used for registering a Rust function with Godot.
pub struct FuncDefinition {
    pub signature_info: SignatureInfo,
    /// The name the function will be exposed as in Godot. If `None`, the Rust function name is used.
    pub rename: Option<String>,
}

impl FuncDefinition {
    pub fn godot_name(&self) -> String {
        self.rename
            .clone()
            .unwrap_or_else(|| self.signature_info.method_name.to_string())
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ReceiverType {
    Ref,
    Mut,
    Static,
}

#[derive(Debug)]
pub struct SignatureInfo {
    pub method_name: Ident,
    pub receiver_type: ReceiverType,
    /// Names as declared, used for registration metadata.
    pub param_names: Vec<String>,
    pub param_types: Vec<venial::TypeExpr>,
    pub ret_type: TokenStream,
}

impl SignatureInfo {
    pub fn params_type(&self) -> TokenStream {
        util::make_params_tuple_type(&self.param_types)
    }

    /// Identifiers used to destructure the parameter tuple; independent of user names, which may be `_`.
    fn forwarding_idents(&self) -> Vec<Ident> {
        (0..self.param_types.len())
            .map(|i| format_ident!("__arg{i}"))
            .collect()
    }
}

/// Parses receiver, parameters and return type of a method.
pub fn into_signature_info(function: &venial::Function) -> ParseResult<SignatureInfo> {
    let mut receiver_type = ReceiverType::Static;
    let mut param_names = Vec::new();
    let mut param_types = Vec::new();

    for (param, _punct) in function.params.inner.iter() {
        match param {
            venial::FnParam::Receiver(receiver) => {
                if receiver.tk_ref.is_none() {
                    return bail!(
                        receiver,
                        "methods registered with Godot take `&self` or `&mut self`, not `self`"
                    );
                }

                receiver_type = if receiver.tk_mut.is_some() {
                    ReceiverType::Mut
                } else {
                    ReceiverType::Ref
                };
            }
            venial::FnParam::Typed(typed) => {
                param_names.push(typed.name.to_string());
                param_types.push(typed.ty.clone());
            }
        }
    }

    let ret_type = match &function.return_ty {
        Some(ty) => quote! { #ty },
        None => quote! { () },
    };

    Ok(SignatureInfo {
        method_name: function.name.clone(),
        receiver_type,
        param_names,
        param_types,
        ret_type,
    })
}

/// Generates code that registers the `#[func]` method with the class. Must be placed inside a function body.
pub fn make_method_registration(
    class_name: &Ident,
    func_definition: &FuncDefinition,
) -> ParseResult<TokenStream> {
    let signature_info = &func_definition.signature_info;

    if signature_info.receiver_type == ReceiverType::Static {
        return bail!(
            &signature_info.method_name,
            "#[func] requires a `&self` or `&mut self` receiver"
        );
    }

    let method_name = &signature_info.method_name;
    let godot_name = func_definition.godot_name();
    let params_ty = signature_info.params_type();
    let ret_ty = &signature_info.ret_type;
    let param_names = &signature_info.param_names;

    let forwarding_closure = make_forwarding_closure(
        signature_info,
        quote! { #class_name::#method_name },
    );

    let registration = quote! {
        {
            use ::godot::sys;

            type Params = #params_ty;
            type Ret = #ret_ty;

            unsafe extern "C" fn varcall_fn(
                _method_data: *mut std::ffi::c_void,
                instance: sys::GDExtensionClassInstancePtr,
                args: *const sys::GDExtensionConstVariantPtr,
                arg_count: sys::GDExtensionInt,
                ret: sys::GDExtensionVariantPtr,
                err: *mut sys::GDExtensionCallError,
            ) {
                ::godot::private::callbacks::varcall::<#class_name, Params, Ret>(
                    instance,
                    args,
                    arg_count,
                    ret,
                    err,
                    #godot_name,
                    #forwarding_closure,
                );
            }

            unsafe extern "C" fn ptrcall_fn(
                _method_data: *mut std::ffi::c_void,
                instance: sys::GDExtensionClassInstancePtr,
                args: *const sys::GDExtensionConstTypePtr,
                ret: sys::GDExtensionTypePtr,
            ) {
                ::godot::private::callbacks::ptrcall::<#class_name, Params, Ret>(
                    instance,
                    args,
                    ret,
                    #godot_name,
                    #forwarding_closure,
                );
            }

            // SAFETY: both trampolines unmarshal exactly `Params` and produce `Ret`.
            let method_info = unsafe {
                ::godot::private::ClassMethodInfo::from_signature::<#class_name, Params, Ret>(
                    ::godot::builtin::StringName::from(#godot_name),
                    Some(varcall_fn),
                    Some(ptrcall_fn),
                    sys::GDEXTENSION_METHOD_FLAGS_DEFAULT,
                    &[ #( #param_names ),* ],
                    Vec::new(),
                )
            };

            method_info.register_extension_class_method();
        };
    };

    Ok(registration)
}

/// Returns an `Option<extern "C" fn>` expression, the callback for an overridden virtual method of `trait_path`.
pub fn make_virtual_callback(
    class_name: &Ident,
    trait_path: &venial::TypeExpr,
    signature_info: &SignatureInfo,
    godot_name: &str,
) -> TokenStream {
    let method_name = &signature_info.method_name;
    let params_ty = signature_info.params_type();
    let ret_ty = &signature_info.ret_type;

    let forwarding_closure = make_forwarding_closure(
        signature_info,
        quote! { <#class_name as #trait_path>::#method_name },
    );

    quote! {
        {
            use ::godot::sys;

            unsafe extern "C" fn virtual_fn(
                instance: sys::GDExtensionClassInstancePtr,
                args: *const sys::GDExtensionConstTypePtr,
                ret: sys::GDExtensionTypePtr,
            ) {
                ::godot::private::callbacks::ptrcall::<#class_name, #params_ty, #ret_ty>(
                    instance,
                    args,
                    ret,
                    #godot_name,
                    #forwarding_closure,
                );
            }

            Some(virtual_fn)
        }
    }
}

/// Closure `|storage, (args...)| path(&instance, args...)`, borrowing the instance according to the receiver.
fn make_forwarding_closure(signature_info: &SignatureInfo, call_path: TokenStream) -> TokenStream {
    let args = signature_info.forwarding_idents();

    let instance = match signature_info.receiver_type {
        ReceiverType::Mut => quote! { &mut *storage.get_mut() },
        ReceiverType::Ref | ReceiverType::Static => quote! { &*storage.get() },
    };

    quote! {
        |storage, ( #( #args, )* )| #call_path(#instance, #( #args ),*)
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_fn(tokens: TokenStream) -> venial::Function {
        match venial::parse_item(tokens) {
            Ok(venial::Item::Function(function)) => function,
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn signature_of_mut_method() {
        let function = parse_fn(quote! { fn pinged(&mut self, value: i64, _other: GString) -> bool {} });
        let sig = into_signature_info(&function).unwrap();

        assert_eq!(sig.receiver_type, ReceiverType::Mut);
        assert_eq!(sig.param_names, ["value", "_other"]);
        assert_eq!(sig.ret_type.to_string(), "bool");
        assert_eq!(sig.params_type().to_string(), "(i64 , GString ,)");
    }

    #[test]
    fn unit_return_and_static() {
        let function = parse_fn(quote! { fn make() {} });
        let sig = into_signature_info(&function).unwrap();

        assert_eq!(sig.receiver_type, ReceiverType::Static);
        assert_eq!(sig.ret_type.to_string(), "()");
        assert_eq!(sig.params_type().to_string(), "()");
    }

    #[test]
    fn by_value_self_rejected() {
        let function = parse_fn(quote! { fn consume(self) {} });
        assert!(into_signature_info(&function).is_err());
    }

    #[test]
    fn static_func_registration_rejected() {
        let function = parse_fn(quote! { fn make() -> i64 { 0 } });
        let definition = FuncDefinition {
            signature_info: into_signature_info(&function).unwrap(),
            rename: None,
        };

        assert!(make_method_registration(&util::ident("Foo"), &definition).is_err());
    }
}
