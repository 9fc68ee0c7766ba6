/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use proc_macro2::TokenStream;
use quote::quote;

use crate::util::{bail, ident, path_is_single, KvParser};
use crate::ParseResult;

pub fn attribute_gdextension(item: venial::Item) -> ParseResult<TokenStream> {
    let mut impl_decl = match item {
        venial::Item::Impl(item) => item,
        _ => return bail!(item, "#[gdextension] can only be applied to trait impls"),
    };

    let is_extension_library = impl_decl
        .trait_ty
        .as_ref()
        .and_then(crate::util::extract_typename)
        .is_some_and(|segment| segment.ident == "ExtensionLibrary");

    if !is_extension_library {
        return bail!(&impl_decl, "#[gdextension] can only be applied to `impl ExtensionLibrary`");
    }

    if impl_decl.tk_unsafe.is_none() {
        return bail!(
            &impl_decl.tk_impl,
            "`impl ExtensionLibrary` must be marked unsafe, to confirm your opt-in to godot-rust's safety model"
        );
    }

    let drained_attributes = std::mem::take(&mut impl_decl.attributes);
    let mut parser = KvParser::parse_required(&drained_attributes, "gdextension", &impl_decl)?;
    let entry_point = parser.handle_ident("entry_symbol")?;
    parser.finish()?;

    impl_decl.attributes = drained_attributes
        .into_iter()
        .filter(|attr| !path_is_single(&attr.path, "gdextension"))
        .collect();

    let entry_point = entry_point.unwrap_or_else(|| ident("gdext_rust_init"));
    let impl_ty = &impl_decl.self_ty;

    Ok(quote! {
        #impl_decl

        #[no_mangle]
        pub unsafe extern "C" fn #entry_point(
            get_proc_address: ::godot::sys::GDExtensionInterfaceGetProcAddress,
            library: ::godot::sys::GDExtensionClassLibraryPtr,
            init: *mut ::godot::sys::GDExtensionInitialization,
        ) -> ::godot::sys::GDExtensionBool {
            ::godot::init::__gdext_load_library::<#impl_ty>(
                get_proc_address,
                library,
                init
            )
        }

        const _: () = {
            // Ensures that the entry symbol matches the signature advertised in the FFI header.
            let _unused: ::godot::sys::GDExtensionInitializationFunction = Some(#entry_point);
        };

        #[cfg(target_os = "linux")]
        ::godot::sys::register_hot_reload_workaround!();
    })
}
