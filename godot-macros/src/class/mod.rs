/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

mod derive_godot_class;
mod godot_api;

mod data_models {
    pub mod field;
    pub mod func;
    pub mod inherent_impl;
    pub mod interface_trait_impl;
    pub mod property;
    pub mod signal;
}

pub(crate) use data_models::field::*;
pub(crate) use data_models::func::*;
pub(crate) use data_models::inherent_impl::*;
pub(crate) use data_models::interface_trait_impl::*;
pub(crate) use data_models::property::*;
pub(crate) use data_models::signal::*;
pub(crate) use derive_godot_class::*;
pub(crate) use godot_api::*;
