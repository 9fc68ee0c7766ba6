/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Procedural macros of godot-rust. Use them through the `godot` crate, which re-exports them.

mod class;
mod gdextension;
mod itest;
mod util;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;

use crate::util::ident;

// Below intra-doc link to the trait only works as HTML, not as symbol link.
/// Derive macro for [`GodotClass`](../obj/trait.GodotClass.html) on structs.
///
/// You should use this macro; manual implementations of the `GodotClass` trait are not encouraged.
///
/// This is typically used in combination with [`#[godot_api]`](attr.godot_api.html), which can implement custom functions and
/// constants, as well as override virtual methods.
///
/// # Construction
///
/// To generate a constructor that builds the object from default values, use `#[class(init)]`. Each field is initialized with
/// `Default::default()`, unless it carries `#[init(val = expr)]`:
///
/// ```no_run
/// # use godot::prelude::*;
/// #[derive(GodotClass)]
/// #[class(init, base = Node)]
/// struct MyStruct {
///     #[init(val = 42)]
///     my_field: i64,
///
///     base: Base<Node>,
/// }
/// ```
///
/// Without `init`, provide the constructor yourself in the `I*` interface impl, through `fn init(base: Base<...>) -> Self`.
/// Classes that must not be constructed by the engine use `#[class(no_init)]`.
///
/// # Inheritance
///
/// The base class is given with `#[class(base = Node)]`, and defaults to `RefCounted`. A field of type `Base<T>` gives access to
/// the engine part of the object; it is detected by its type name and initialized by the library.
///
/// # Properties and exports
///
/// `#[var]` makes a field readable and writable through the engine's property system. `#[export]` additionally shows it in the
/// editor. Number ranges are declared with `#[export(range = (min, max))]` or `#[export(range = (min, max, step))]`.
///
/// ```no_run
/// # use godot::prelude::*;
/// #[derive(GodotClass)]
/// #[class(init)]
/// struct Bar {
///     #[export(range = (0, 100))]
///     speed: f64,
/// }
/// ```
///
/// For each property, hidden accessors `get_<field>` and `set_<field>` are generated and registered as methods.
/// Properties with `#[init(val)]` revert to that value in the editor.
///
/// # Renaming
///
/// `#[class(rename = OtherName)]` registers the class under a different name than the Rust struct.
#[proc_macro_derive(GodotClass, attributes(class, var, export, init))]
pub fn derive_godot_class(input: TokenStream) -> TokenStream {
    translate(input, class::derive_godot_class)
}

/// Proc-macro attribute to be used with `impl` blocks of [`#[derive(GodotClass)]`](derive.GodotClass.html) structs.
///
/// Can be used in two ways:
/// ```no_run
/// # use godot::prelude::*;
/// #[derive(GodotClass)]
/// #[class(init, base = Node)]
/// struct MyClass {}
///
/// // 1) inherent impl block: user-defined, custom API.
/// #[godot_api]
/// impl MyClass {
///     // Methods that can be called from the engine.
///     #[func]
///     fn my_method(&self, value: i64) -> i64 { value * 2 }
///
///     // Signals are declared without body.
///     #[signal]
///     fn my_signal(value: i64);
/// }
///
/// // 2) trait impl block: implement Godot-specific APIs.
/// #[godot_api]
/// impl INode for MyClass {
///     fn ready(&mut self) { /* ... */ }
/// }
/// ```
///
/// # Methods
///
/// `#[func]` registers a method with a `&self` or `&mut self` receiver. Parameter and return types must be convertible to and
/// from `Variant`. `#[func(rename = other_name)]` registers it under a different name.
///
/// # Virtual methods
///
/// In an `impl I... for MyClass` block, every implemented method overrides the engine virtual of the same name with a leading
/// underscore: `ready` overrides `_ready`. A few methods are not virtuals, but dedicated object callbacks:
/// `init`, `to_string`, `on_notification`, `get_property`, `set_property`, `get_property_list`, `property_get_revert` and
/// `validate_property`.
#[proc_macro_attribute]
pub fn godot_api(meta: TokenStream, input: TokenStream) -> TokenStream {
    translate_meta("godot_api", meta, input, class::attribute_godot_api)
}

/// Proc-macro attribute to be used in combination with the [`ExtensionLibrary`] trait.
///
/// [`ExtensionLibrary`]: ../init/trait.ExtensionLibrary.html
///
/// Generates the entry point the engine calls when loading the library. Its symbol name is `gdext_rust_init`, unless
/// overridden with `#[gdextension(entry_symbol = custom_name)]`; it must match the `entry_symbol` in the `.gdextension` file.
///
/// On Linux, this also registers the workaround that keeps thread-local destructors from preventing hot reloads.
#[proc_macro_attribute]
pub fn gdextension(meta: TokenStream, input: TokenStream) -> TokenStream {
    translate_meta("gdextension", meta, input, gdextension::attribute_gdextension)
}

/// Registers a function as integration test, to be run by the `itest` crate's test runner.
///
/// `#[itest(skip)]` excludes the test; `#[itest(focus)]` runs only focused tests. The function takes no parameters or a
/// `&TestContext`.
#[doc(hidden)]
#[proc_macro_attribute]
pub fn itest(meta: TokenStream, input: TokenStream) -> TokenStream {
    translate_meta("itest", meta, input, itest::attribute_itest)
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Implementation

type ParseResult<T> = Result<T, venial::Error>;

/// For `#[derive(...)]` derive macros.
fn translate<F>(input: TokenStream, transform: F) -> TokenStream
where
    F: FnOnce(venial::Item) -> ParseResult<TokenStream2>,
{
    let input2 = TokenStream2::from(input);

    let result2 = venial::parse_item(input2)
        .and_then(transform)
        .unwrap_or_else(|e| e.to_compile_error());

    TokenStream::from(result2)
}

/// For `#[proc_macro_attribute]` procedural macros.
fn translate_meta<F>(
    self_name: &str,
    meta: TokenStream,
    input: TokenStream,
    transform: F,
) -> TokenStream
where
    F: FnOnce(venial::Item) -> ParseResult<TokenStream2>,
{
    let self_name = ident(self_name);
    let input2 = TokenStream2::from(input);
    let meta2 = TokenStream2::from(meta);

    let result2 = util::venial_parse_meta(&meta2, self_name, &input2)
        .and_then(transform)
        .unwrap_or_else(|e| e.to_compile_error());

    TokenStream::from(result2)
}
