/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Runtime checks and inspection of Godot classes.

use std::fmt;

use crate::builtin::GString;
use crate::meta::ToGodot;
use crate::obj::{Gd, GodotClass, InstanceId};

pub(crate) fn debug_string<T: GodotClass>(
    obj: &Gd<T>,
    f: &mut fmt::Formatter<'_>,
    ty: &str,
) -> fmt::Result {
    if let Some(id) = obj.instance_id_or_none() {
        let class = obj.get_class();
        debug_string_parts(f, ty, id, class, obj.maybe_refcount())
    } else {
        write!(f, "{ty} {{ freed obj }}")
    }
}

fn debug_string_parts(
    f: &mut fmt::Formatter<'_>,
    ty: &str,
    id: InstanceId,
    class: GString,
    refcount: Option<usize>,
) -> fmt::Result {
    let mut builder = f.debug_struct(ty);
    builder.field("id", &id.to_i64()).field("class", &class);

    if let Some(refcount) = refcount {
        builder.field("refc", &refcount);
    }

    builder.finish()
}

/// Engine's string conversion, which includes a user class' `to_string()` override.
pub(crate) fn display_string<T: GodotClass>(
    obj: &Gd<T>,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    if !obj.is_instance_valid() {
        return f.write_str("<Freed Object>");
    }

    let string: GString = obj.to_variant().stringify();
    fmt::Display::fmt(&string, f)
}
