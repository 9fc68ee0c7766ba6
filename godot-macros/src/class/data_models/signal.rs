/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use proc_macro2::{Ident, TokenStream};
use quote::quote;

use crate::class::{into_signature_info, ReceiverType};
use crate::util::{self, bail};
use crate::ParseResult;

/// A `#[signal]` declaration: a body-less `fn` whose parameters describe the signal arguments.
pub struct SignalDefinition {
    pub name: Ident,
    pub param_names: Vec<String>,
    pub param_types: Vec<venial::TypeExpr>,
}

impl SignalDefinition {
    pub fn parse(function: &venial::Function) -> ParseResult<Self> {
        if function.body.is_some() {
            return bail!(
                &function.name,
                "#[signal] must not have a body; declare it as `fn {}(...);`",
                function.name
            );
        }

        if function.return_ty.is_some() {
            return bail!(&function.return_ty, "#[signal] does not support return types");
        }

        let signature = into_signature_info(function)?;
        if signature.receiver_type != ReceiverType::Static {
            return bail!(&function.name, "#[signal] must not have a `self` receiver");
        }

        Ok(Self {
            name: signature.method_name,
            param_names: signature.param_names,
            param_types: signature.param_types,
        })
    }
}

/// Statements registering all signals of an impl block. Placed in `__register_signals()`.
pub fn make_signal_registrations(class_name: &Ident, signals: &[SignalDefinition]) -> TokenStream {
    let class_name_obj = util::class_name_obj(class_name);

    let registrations = signals.iter().map(|signal| {
        let name = signal.name.to_string();
        let params_ty = util::make_params_tuple_type(&signal.param_types);
        let param_names = &signal.param_names;

        quote! {
            ::godot::private::register_signal_typed::<#params_ty>(
                #class_name_obj,
                #name,
                &[ #( #param_names ),* ],
            );
        }
    });

    quote! { #( #registrations )* }
}
