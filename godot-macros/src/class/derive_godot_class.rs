/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};

use crate::class::{make_field_revert, make_property_impl, Field, FieldExport, Fields};
use crate::util::{bail, ident, type_is_named, KvParser};
use crate::ParseResult;

pub fn derive_godot_class(item: venial::Item) -> ParseResult<TokenStream> {
    let class = match item {
        venial::Item::Struct(class) => class,
        _ => return bail!(item, "#[derive(GodotClass)] can only be applied on structs"),
    };

    if let Some(params) = class.generic_params.as_ref() {
        return bail!(params, "#[derive(GodotClass)] does not support generic parameters");
    }

    let struct_cfg = parse_struct_attributes(&class)?;
    let fields = parse_fields(&class, struct_cfg.init_strategy)?;

    let class_name = &class.name;
    let class_name_str = struct_cfg
        .rename
        .as_ref()
        .unwrap_or(class_name)
        .to_string();

    let base_ty = &struct_cfg.base_ty;
    let base_class = quote! { ::godot::classes::#base_ty };
    let inherits_macro = format_ident!("unsafe_inherits_transitive_{}", base_ty);
    let prv = quote! { ::godot::private };

    let godot_exports_impl = make_property_impl(class_name, &fields)?;
    let field_revert = make_field_revert(&fields);

    let godot_withbase_impl = match &fields.base_field {
        Some(Field { name, .. }) => quote! {
            impl ::godot::obj::WithBaseField for #class_name {
                fn to_gd(&self) -> ::godot::obj::Gd<Self> {
                    self.#name.to_gd().cast()
                }

                fn base_field(&self) -> &::godot::obj::Base<<Self as ::godot::obj::GodotClass>::Base> {
                    &self.#name
                }
            }
        },
        None => TokenStream::new(),
    };

    let (godot_init_impl, struct_item) = match struct_cfg.init_strategy {
        InitStrategy::Generated => (
            make_godot_init_impl(class_name, &fields),
            quote! { #prv::Struct::new::<#class_name>().with_generated::<#class_name>() },
        ),
        InitStrategy::UserDefined | InitStrategy::Absent => (
            TokenStream::new(),
            quote! { #prv::Struct::new::<#class_name>() },
        ),
    };

    Ok(quote! {
        impl ::godot::obj::GodotClass for #class_name {
            type Base = #base_class;

            // User classes register with the scene, or later if their base demands it.
            const INIT_LEVEL: ::godot::init::InitLevel =
                ::godot::init::InitLevel::Scene.at_least(<#base_class as ::godot::obj::GodotClass>::INIT_LEVEL);

            fn class_name() -> ::godot::meta::ClassName {
                ::godot::meta::ClassName::__cached(#class_name_str)
            }
        }

        // SAFETY: user classes take the memory strategy of their engine base.
        unsafe impl ::godot::obj::Bounds for #class_name {
            type Memory = <<Self as ::godot::obj::GodotClass>::Base as ::godot::obj::Bounds>::Memory;
            type Declarer = ::godot::obj::bounds::DeclUser;
        }

        impl ::godot::obj::UserClass for #class_name {
            #field_revert
        }

        #godot_init_impl
        #godot_withbase_impl
        #godot_exports_impl

        ::godot::sys::plugin_add!(#prv::__GODOT_PLUGIN_REGISTRY; #prv::ClassPlugin::new::<#class_name>(
            #prv::PluginItem::Struct(#struct_item)
        ));

        #prv::class_macros::#inherits_macro!(#class_name);
    })
}

/// Generated `GodotDefault` impl for `#[class(init)]`: every field takes its `#[init(val)]` or `Default::default()`.
fn make_godot_init_impl(class_name: &Ident, fields: &Fields) -> TokenStream {
    let base_init = match &fields.base_field {
        Some(Field { name, .. }) => quote! { #name: base, },
        None => TokenStream::new(),
    };

    let rest_init = fields.all_fields.iter().map(|field| {
        let field_name = &field.name;
        let value_expr = match &field.default_val {
            None => quote! { ::std::default::Default::default() },
            Some(default_val) => default_val.clone(),
        };
        quote! { #field_name: #value_expr, }
    });

    let discard_base = if fields.base_field.is_none() {
        quote! { let _ = base; }
    } else {
        TokenStream::new()
    };

    quote! {
        impl ::godot::obj::cap::GodotDefault for #class_name {
            fn __godot_user_init(base: ::godot::obj::Base<Self::Base>) -> Self {
                #discard_base

                Self {
                    #( #rest_init )*
                    #base_init
                }
            }
        }
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Parsing

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum InitStrategy {
    /// `#[class(init)]`
    Generated,
    /// Neither `init` nor `no_init`: the user provides `init` in the `I*` trait impl.
    UserDefined,
    /// `#[class(no_init)]`
    Absent,
}

struct ClassAttributes {
    base_ty: Ident,
    init_strategy: InitStrategy,
    rename: Option<Ident>,
}

fn parse_struct_attributes(class: &venial::Struct) -> ParseResult<ClassAttributes> {
    let mut base_ty = ident("RefCounted");
    let mut init_strategy = InitStrategy::UserDefined;
    let mut rename = None;

    if let Some(mut parser) = KvParser::parse(&class.attributes, "class")? {
        if let Some(base) = parser.handle_ident("base")? {
            base_ty = base;
        }

        let init = parser.handle_alone("init")?;
        let no_init = parser.handle_alone("no_init")?;
        init_strategy = match (init, no_init) {
            (true, true) => {
                return bail!(&class.name, "#[class(init)] and #[class(no_init)] are mutually exclusive");
            }
            (true, false) => InitStrategy::Generated,
            (false, true) => InitStrategy::Absent,
            (false, false) => InitStrategy::UserDefined,
        };

        rename = parser.handle_ident("rename")?;
        parser.finish()?;
    }

    Ok(ClassAttributes {
        base_ty,
        init_strategy,
        rename,
    })
}

fn parse_fields(class: &venial::Struct, init_strategy: InitStrategy) -> ParseResult<Fields> {
    let named_fields: Vec<&venial::NamedField> = match &class.fields {
        venial::Fields::Unit => vec![],
        venial::Fields::Tuple(_) => {
            return bail!(
                &class.fields,
                "#[derive(GodotClass)] is not supported for tuple structs",
            )
        }
        venial::Fields::Named(fields) => fields.fields.inner.iter().map(|(field, _punct)| field).collect(),
    };

    let mut fields = Fields::default();

    for named_field in named_fields {
        let mut field = Field::new(named_field);
        let is_base = type_is_named(&named_field.ty, "Base");

        if let Some(mut parser) = KvParser::parse(&named_field.attributes, "init")? {
            field.default_val = parser.handle_expr("val")?;
            parser.finish()?;

            if field.default_val.is_some() && init_strategy != InitStrategy::Generated {
                return bail!(&named_field.name, "#[init(val = ...)] requires #[class(init)]");
            }
        }

        if let Some(parser) = KvParser::parse(&named_field.attributes, "var")? {
            parser.finish()?;
            field.var = true;
        }

        if let Some(mut parser) = KvParser::parse(&named_field.attributes, "export")? {
            field.export = Some(FieldExport::new_from_kv(&mut parser)?);
            parser.finish()?;
        }

        if is_base {
            if field.is_property() || field.default_val.is_some() {
                return bail!(&named_field.name, "the `Base<T>` field cannot have #[var], #[export] or #[init]");
            }
            if fields.base_field.is_some() {
                return bail!(&named_field.name, "at most one `Base<T>` field allowed");
            }

            fields.base_field = Some(field);
        } else {
            fields.all_fields.push(field);
        }
    }

    Ok(fields)
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn derive(tokens: TokenStream) -> ParseResult<String> {
        let item = venial::parse_item(tokens)?;
        derive_godot_class(item).map(|out| out.to_string())
    }

    #[test]
    fn defaults_to_refcounted_base() {
        let out = derive(quote! {
            struct Plain {
                value: i64,
            }
        })
        .unwrap();

        assert!(out.contains(":: godot :: classes :: RefCounted"));
        assert!(out.contains("unsafe_inherits_transitive_RefCounted"));
        assert!(!out.contains("with_generated"));
    }

    #[test]
    fn export_range_and_init() {
        let out = derive(quote! {
            #[class(init, base = Node)]
            struct Bar {
                #[export(range = (0, 100))]
                #[init(val = 5.0)]
                speed: f64,
                base: Base<Node>,
            }
        })
        .unwrap();

        assert!(out.contains("export_range"));
        assert!(out.contains("with_generated"));
        assert!(out.contains("fn get_speed"));
        assert!(out.contains("fn set_speed"));
        assert!(out.contains("__field_revert"));
        assert!(out.contains("WithBaseField"));
    }

    #[test]
    fn rename_changes_registered_name() {
        let out = derive(quote! {
            #[class(init, rename = Other)]
            struct Original;
        })
        .unwrap();

        assert!(out.contains("\"Other\""));
        assert!(!out.contains("\"Original\""));
    }

    #[test]
    fn rejects_invalid_declarations() {
        assert!(derive(quote! { struct Tuple(i32); }).is_err());
        assert!(derive(quote! { enum NotStruct {} }).is_err());
        assert!(derive(quote! { struct Gen<T> { t: T } }).is_err());
        assert!(derive(quote! { #[class(init, no_init)] struct Both; }).is_err());
        assert!(derive(quote! { #[class(unknown)] struct Unknown; }).is_err());
        assert!(derive(quote! { struct NoInit { #[init(val = 1)] x: i32 } }).is_err());
        assert!(derive(quote! { #[class(init)] struct BadRange { #[export(range = (1))] x: i32 } }).is_err());
    }
}
