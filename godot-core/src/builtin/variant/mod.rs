/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use godot_ffi as sys;
use sys::{interface_fn, VariantOperator, VariantType};

use crate::builtin::GString;
use crate::meta::error::ConvertError;
use crate::meta::{FromGodot, ToGodot};

mod impls;

/// Godot variant type, able to store a variety of different types.
///
/// While Godot variants do not appear very frequently in Rust due to their lack of compile-time type-safety, they are central to
/// all sorts of dynamic APIs. For example, if you want to call a method on an object based on a string, you will need variants
/// to store arguments and return value.
///
/// Three machine words, owned by this value: dropping it runs the engine destructor, cloning it makes an engine-side copy.
// The layout must match the engine's, since `&Variant` is handed out for engine-owned variants (see `borrow_var_sys`).
#[repr(transparent)]
pub struct Variant {
    opaque: sys::OpaqueVariant,
}

impl Variant {
    /// Create an empty variant (`null` value in GDScript).
    pub fn nil() -> Self {
        // SAFETY: `variant_new_nil` initializes the variant.
        unsafe {
            Self::new_with_var_uninit(|variant_ptr| {
                interface_fn!(variant_new_nil)(variant_ptr);
            })
        }
    }

    /// Create a variant holding a non-nil value.
    ///
    /// Equivalent to [`value.to_variant()`][ToGodot::to_variant], but consumes the argument.
    pub fn from<T: ToGodot>(value: T) -> Self {
        value.to_variant()
    }

    /// ⚠️ Convert to type `T`, panicking on failure.
    ///
    /// Equivalent to [`T::from_variant(&self)`][FromGodot::from_variant].
    ///
    /// # Panics
    /// When this variant holds a different type.
    pub fn to<T: FromGodot>(&self) -> T {
        T::from_variant(self)
    }

    /// Convert to type `T`, returning `Err` on failure.
    ///
    /// A `Nil` variant converts to the zero value of value types (`0`, `false`, empty strings and containers).
    pub fn try_to<T: FromGodot>(&self) -> Result<T, ConvertError> {
        T::try_from_variant(self)
    }

    /// Checks whether the variant is empty (`null` value in GDScript).
    pub fn is_nil(&self) -> bool {
        self.get_type() == VariantType::Nil
    }

    /// Returns the type that is currently held by this variant.
    pub fn get_type(&self) -> VariantType {
        // SAFETY: the variant is initialized.
        let tag = unsafe { interface_fn!(variant_get_type)(self.var_sys()) };
        VariantType::from_sys(tag)
    }

    /// Returns the payload to the engine. Same as dropping the variant.
    pub fn destroy(self) {
        drop(self)
    }

    /// Evaluates an expression using a GDScript operator.
    ///
    /// Returns the result of the operation, or `None` if the operation is not defined for the given operand types.
    pub fn evaluate(&self, rhs: &Variant, op: VariantOperator) -> Option<Variant> {
        let mut is_valid = sys::SYS_FALSE;

        // SAFETY: the engine initializes the result, also for invalid operations.
        let result = unsafe {
            Variant::new_with_var_uninit(|variant_ptr| {
                interface_fn!(variant_evaluate)(
                    op.sys(),
                    self.var_sys(),
                    rhs.var_sys(),
                    variant_ptr,
                    &raw mut is_valid,
                )
            })
        };

        (is_valid == sys::SYS_TRUE).then_some(result)
    }

    /// Return Godot's string representation of the variant.
    ///
    /// See also `Display` impl.
    pub fn stringify(&self) -> GString {
        let mut result = GString::new();

        // SAFETY: `result` is an initialized string that the engine assigns to.
        unsafe {
            interface_fn!(variant_stringify)(self.var_sys(), result.string_sys_mut());
        }
        result
    }

    /// Return Godot's hash value for the variant.
    ///
    /// _Godot equivalent : `@GlobalScope.hash()`_
    pub fn hash(&self) -> i64 {
        // SAFETY: the variant is initialized.
        unsafe { interface_fn!(variant_hash)(self.var_sys()) }
    }

    /// Interpret the `Variant` as `bool`.
    ///
    /// Returns `false` only if the variant's current value is the default value for its type. For example:
    /// - `nil` for the nil type
    /// - `false` for bool
    /// - zero for numeric types
    /// - empty string
    /// - empty container (array, packed array, dictionary)
    /// - default-constructed other builtins (e.g. zero vector, degenerate plane, white color, ...)
    pub fn booleanize(&self) -> bool {
        // SAFETY: the variant is initialized.
        unsafe { interface_fn!(variant_booleanize)(self.var_sys()) == sys::SYS_TRUE }
    }

    // ------------------------------------------------------------------------------------------------------------------------------------------
    // FFI

    #[doc(hidden)]
    pub fn var_sys(&self) -> sys::GDExtensionConstVariantPtr {
        self.opaque.sys()
    }

    #[doc(hidden)]
    pub fn var_sys_mut(&mut self) -> sys::GDExtensionVariantPtr {
        self.opaque.sys_mut()
    }

    /// Initializes a new variant in place.
    ///
    /// # Safety
    /// `init_fn` must fully initialize the variant it receives.
    #[doc(hidden)]
    pub unsafe fn new_with_var_uninit(
        init_fn: impl FnOnce(sys::GDExtensionUninitializedVariantPtr),
    ) -> Self {
        let mut raw = std::mem::MaybeUninit::<sys::OpaqueVariant>::uninit();
        init_fn(raw.as_mut_ptr() as sys::GDExtensionUninitializedVariantPtr);

        Self {
            opaque: raw.assume_init(),
        }
    }

    /// Views a variant owned by the engine, for the duration of a call.
    ///
    /// # Safety
    /// `ptr` must point to an initialized variant that outlives `'a` and is not mutated during `'a`.
    #[doc(hidden)]
    pub unsafe fn borrow_var_sys<'a>(ptr: sys::GDExtensionConstVariantPtr) -> &'a Variant {
        &*(ptr as *const Variant)
    }

    /// Views the argument array of a varcall as variant references.
    ///
    /// # Safety
    /// `args` must point to `len` pointers to initialized variants that outlive `'a` (or may be null if `len` is 0).
    #[doc(hidden)]
    pub unsafe fn borrow_ref_slice<'a>(
        args: *const sys::GDExtensionConstVariantPtr,
        len: usize,
    ) -> &'a [&'a Variant] {
        if args.is_null() || len == 0 {
            return &[];
        }

        // A variant pointer has the layout of `&Variant`, since `Variant` is `repr(transparent)`.
        std::slice::from_raw_parts(args as *const &Variant, len)
    }

    /// Takes ownership of engine-owned variant bytes.
    pub(crate) fn from_opaque(opaque: sys::OpaqueVariant) -> Self {
        Self { opaque }
    }

    /// Gives up ownership of the bytes without running the destructor.
    pub(crate) fn into_opaque(self) -> sys::OpaqueVariant {
        let this = std::mem::ManuallyDrop::new(self);
        this.opaque
    }

    /// Bitwise view of the bytes; ownership stays with `self`.
    pub(crate) fn opaque(&self) -> sys::OpaqueVariant {
        self.opaque
    }
}

impl Clone for Variant {
    fn clone(&self) -> Self {
        // SAFETY: `variant_new_copy` initializes the new variant from a valid one.
        unsafe {
            Self::new_with_var_uninit(|variant_ptr| {
                interface_fn!(variant_new_copy)(variant_ptr, self.var_sys());
            })
        }
    }
}

impl Drop for Variant {
    fn drop(&mut self) {
        // Variants that outlive the binding only hold dead bytes.
        if !sys::is_initialized() {
            return;
        }

        // SAFETY: the variant is initialized and not used afterwards.
        unsafe {
            interface_fn!(variant_destroy)(self.var_sys_mut());
        }
    }
}

impl Default for Variant {
    fn default() -> Self {
        Self::nil()
    }
}

// Variant is not Eq because it can contain floats and other types composed of floats.
impl PartialEq for Variant {
    fn eq(&self, other: &Self) -> bool {
        self.evaluate(other, VariantOperator::Equal)
            .is_some_and(|result| result.booleanize())
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.stringify();
        write!(f, "{s}")
    }
}

impl fmt::Debug for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nil() {
            return write!(f, "Variant(Nil)");
        }

        write!(f, "Variant({:?}: {})", self.get_type(), self.stringify())
    }
}
