/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate as sys;
use crate::{GDExtensionInterface, InterfaceError, VariantType};

type FromTypeFn = unsafe extern "C" fn(sys::GDExtensionUninitializedVariantPtr, sys::GDExtensionTypePtr);
type ToTypeFn = unsafe extern "C" fn(sys::GDExtensionUninitializedTypePtr, sys::GDExtensionVariantPtr);

/// Lifecycle operations for one builtin type, loaded once after the interface.
#[derive(Copy, Clone, Debug)]
pub struct BuiltinTypeOps {
    pub variant_type: VariantType,

    /// Writes a new Variant holding a copy of the value.
    pub from_type: FromTypeFn,

    /// Writes the value held by a Variant into uninitialized type memory.
    pub to_type: ToTypeFn,

    /// Constructor #0. Absent for types that cannot be constructed by the engine (`Object`).
    pub construct_default: sys::GDExtensionPtrConstructor,

    /// Constructor #1 (copy). Absent for the same types as the default constructor.
    pub construct_copy: sys::GDExtensionPtrConstructor,

    /// Absent for plain types whose bytes own nothing.
    pub destroy: sys::GDExtensionPtrDestructor,
}

/// Operation tables for every builtin type except `Nil`, indexed by [`VariantType::ord()`].
pub struct BuiltinTables {
    ops: Vec<BuiltinTypeOps>,
}

impl BuiltinTables {
    /// # Safety
    /// `interface` must have been loaded from the running engine.
    pub unsafe fn load(interface: &GDExtensionInterface) -> Result<Self, InterfaceError> {
        let get_from = interface.get_variant_from_type_constructor.unwrap_unchecked();
        let get_to = interface.get_variant_to_type_constructor.unwrap_unchecked();
        let get_ctor = interface.variant_get_ptr_constructor.unwrap_unchecked();
        let get_dtor = interface.variant_get_ptr_destructor.unwrap_unchecked();

        let mut ops = Vec::with_capacity(VariantType::BUILTINS.len());
        for &variant_type in VariantType::BUILTINS {
            let ty = variant_type.sys();
            let missing = |operation| InterfaceError::MissingTypeOperation {
                variant_type,
                operation,
            };

            let from_type = get_from(ty).ok_or_else(|| missing("variant_from_type"))?;
            let to_type = get_to(ty).ok_or_else(|| missing("type_from_variant"))?;

            let (construct_default, construct_copy) = if variant_type == VariantType::Object {
                (None, None)
            } else {
                let default = get_ctor(ty, 0);
                let copy = get_ctor(ty, 1);
                if default.is_none() {
                    return Err(missing("constructor #0"));
                }
                if copy.is_none() {
                    return Err(missing("constructor #1"));
                }
                (default, copy)
            };

            let destroy = if variant_type.is_plain() || variant_type == VariantType::Object {
                None
            } else {
                Some(get_dtor(ty).ok_or_else(|| missing("destructor"))?)
            };

            ops.push(BuiltinTypeOps {
                variant_type,
                from_type,
                to_type,
                construct_default,
                construct_copy,
                destroy,
            });
        }

        crate::out!("loaded lifecycle tables for {} builtin types", ops.len());
        Ok(Self { ops })
    }

    /// # Panics
    /// For `Nil`, which has no operations.
    pub fn get(&self, variant_type: VariantType) -> &BuiltinTypeOps {
        assert_ne!(
            variant_type,
            VariantType::Nil,
            "Nil has no builtin type operations"
        );

        &self.ops[variant_type.ord() - 1]
    }
}

impl BuiltinTypeOps {
    /// Default-constructs the type into `dst`.
    ///
    /// # Safety
    /// `dst` must point to uninitialized memory of the type's size.
    pub unsafe fn construct_default_into(&self, dst: sys::GDExtensionUninitializedTypePtr) {
        let ctor = self
            .construct_default
            .unwrap_or_else(|| panic!("{:?} has no default constructor", self.variant_type));
        ctor(dst, std::ptr::null());
    }

    /// Copy-constructs `src` into `dst`.
    ///
    /// # Safety
    /// `dst` must point to uninitialized memory and `src` to a valid value of the type.
    pub unsafe fn construct_copy_into(
        &self,
        dst: sys::GDExtensionUninitializedTypePtr,
        src: sys::GDExtensionConstTypePtr,
    ) {
        let ctor = self
            .construct_copy
            .unwrap_or_else(|| panic!("{:?} has no copy constructor", self.variant_type));
        let args = [src];
        ctor(dst, args.as_ptr());
    }

    /// Runs the destructor, if the type has one.
    ///
    /// # Safety
    /// `ptr` must point to a valid value of the type, which is unusable afterwards.
    pub unsafe fn destroy_at(&self, ptr: sys::GDExtensionTypePtr) {
        if let Some(dtor) = self.destroy {
            dtor(ptr);
        }
    }
}
