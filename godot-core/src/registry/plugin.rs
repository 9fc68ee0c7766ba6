/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::init::InitLevel;
use crate::meta::ClassName;
use crate::obj::{cap, GodotClass, UserClass};
use crate::registry::callbacks;
use crate::sys;

/// Piece of information that is gathered by the self-registration ("plugin") system.
///
/// You should not manually construct this struct, but rather use [`ClassPlugin::new()`].
#[derive(Clone, Debug)]
pub struct ClassPlugin {
    /// The name of the class to register plugins for.
    ///
    /// This is used to group plugins so that all class properties for a single class can be registered at the same time.
    pub(crate) class_name: ClassName,

    /// When should the class be registered with Godot.
    pub(crate) init_level: InitLevel,

    /// The actual item being registered.
    pub(crate) item: PluginItem,
}

impl ClassPlugin {
    /// Creates a new `ClassPlugin`, automatically setting the `class_name` and `init_level` to the values defined in [`GodotClass`].
    pub fn new<T: GodotClass>(item: PluginItem) -> Self {
        Self {
            class_name: T::class_name(),
            init_level: T::INIT_LEVEL,
            item,
        }
    }
}

/// Type-erased function object, holding a registration function for one class.
#[derive(Copy, Clone)]
pub struct ErasedRegisterFn {
    pub raw: fn(),
}

impl fmt::Debug for ErasedRegisterFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0>16x}", self.raw as usize)
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Plugin items

/// Represents the data part of a [`ClassPlugin`] instance.
///
/// Each enumerator represents a different item in Rust code, which is processed by an independent proc macro (for example,
/// `#[derive(GodotClass)]` on structs, or `#[godot_api]` on impl blocks).
#[derive(Clone, Debug)]
pub enum PluginItem {
    /// Class definition itself, must always be available -- created by `#[derive(GodotClass)]`.
    Struct(Struct),

    /// Collected from `#[godot_api] impl MyClass`.
    InherentImpl(InherentImpl),

    /// Collected from `#[godot_api] impl I... for MyClass`.
    ITraitImpl(ITraitImpl),
}

/// Helper function which checks that the field has not been set before.
fn set<T>(field: &mut Option<T>, value: T) {
    assert!(field.is_none(), "attempted to set field more than once");
    *field = Some(value);
}

/// The data for a class definition.
#[derive(Clone, Debug)]
pub struct Struct {
    /// The name of the base class in Godot.
    pub(crate) base_class_name: ClassName,

    /// Function that creates a new instance, from `#[class(init)]` or an `init()` in the interface impl.
    pub(crate) generated_create_fn: sys::GDExtensionClassCreateInstance,

    /// Function that registers `#[var]` and `#[export]` fields.
    pub(crate) register_properties_fn: ErasedRegisterFn,

    /// Callback to library-generated function which drops the Rust instance.
    pub(crate) free_fn: sys::GDExtensionClassFreeInstance,

    /// Reference-count callbacks; present for all classes, the engine only invokes them for ref-counted ones.
    pub(crate) reference_fn: sys::GDExtensionClassReference,
    pub(crate) unreference_fn: sys::GDExtensionClassUnreference,

    /// Virtual lookup used when no `#[godot_api] impl I... for T` block exists.
    pub(crate) default_get_virtual_fn: sys::GDExtensionClassGetVirtual,

    /// Revert callbacks for `#[init(val = ...)]` field defaults, unless the interface impl provides its own.
    pub(crate) default_can_revert_fn: sys::GDExtensionClassPropertyCanRevert,
    pub(crate) default_get_revert_fn: sys::GDExtensionClassPropertyGetRevert,
}

impl Struct {
    pub fn new<T: GodotClass + UserClass + cap::ImplementsGodotExports>() -> Self {
        Self {
            base_class_name: T::Base::class_name(),
            generated_create_fn: None,
            register_properties_fn: ErasedRegisterFn {
                raw: callbacks::register_user_properties::<T>,
            },
            free_fn: Some(callbacks::free::<T>),
            reference_fn: Some(callbacks::reference::<T>),
            unreference_fn: Some(callbacks::unreference::<T>),
            default_get_virtual_fn: Some(callbacks::default_get_virtual::<T>),
            default_can_revert_fn: Some(callbacks::field_can_revert::<T>),
            default_get_revert_fn: Some(callbacks::field_get_revert::<T>),
        }
    }

    /// Constructor generated by `#[class(init)]`.
    pub fn with_generated<T: GodotClass + cap::GodotDefault>(mut self) -> Self {
        set(&mut self.generated_create_fn, callbacks::create::<T>);
        self
    }
}

/// Stores registration functions for methods and signals.
#[derive(Clone, Debug)]
pub struct InherentImpl {
    /// Callback to library-generated function which registers functions in the `impl`.
    pub(crate) register_methods_fn: ErasedRegisterFn,

    /// Registers the `#[signal]` declarations of the block.
    pub(crate) register_signals_fn: ErasedRegisterFn,
}

impl InherentImpl {
    pub fn new<T: cap::ImplementsGodotApi>() -> Self {
        Self {
            register_methods_fn: ErasedRegisterFn {
                raw: callbacks::register_user_methods::<T>,
            },
            register_signals_fn: ErasedRegisterFn {
                raw: callbacks::register_user_signals::<T>,
            },
        }
    }
}

/// Callbacks from an `I*` interface impl, e.g. `INode` or `IRefCounted`.
#[derive(Default, Clone, Debug)]
pub struct ITraitImpl {
    /// Callback to user-defined `init()` in the interface impl.
    pub(crate) user_create_fn: sys::GDExtensionClassCreateInstance,

    /// User-defined `to_string` function.
    pub(crate) user_to_string_fn: sys::GDExtensionClassToString,

    /// User-defined `on_notification` function.
    pub(crate) user_on_notification_fn: sys::GDExtensionClassNotification2,

    /// User-defined `set` function.
    pub(crate) user_set_fn: sys::GDExtensionClassSet,

    /// User-defined `get` function.
    pub(crate) user_get_fn: sys::GDExtensionClassGet,

    /// Callback for other virtual methods specific to each class.
    pub(crate) get_virtual_fn: sys::GDExtensionClassGetVirtual,

    /// User-defined `get_property_list` function, together with the callback that frees its result.
    pub(crate) user_get_property_list_fn: sys::GDExtensionClassGetPropertyList,
    pub(crate) user_free_property_list_fn: sys::GDExtensionClassFreePropertyList2,

    /// Revert queries of the editor. Present whenever the interface impl overrides `property_get_revert`.
    pub(crate) user_property_can_revert_fn: sys::GDExtensionClassPropertyCanRevert,
    pub(crate) user_property_get_revert_fn: sys::GDExtensionClassPropertyGetRevert,

    /// Lets the user adjust how a property appears in the editor.
    pub(crate) validate_property_fn: sys::GDExtensionClassValidateProperty,
}

impl ITraitImpl {
    pub fn new<T: GodotClass + cap::ImplementsGodotVirtual>() -> Self {
        Self {
            get_virtual_fn: Some(callbacks::get_virtual::<T>),
            ..Default::default()
        }
    }

    pub fn with_create<T: GodotClass + cap::GodotDefault>(mut self) -> Self {
        set(&mut self.user_create_fn, callbacks::create::<T>);
        self
    }

    pub fn with_string<T: GodotClass + cap::GodotToString>(mut self) -> Self {
        set(&mut self.user_to_string_fn, callbacks::to_string::<T>);
        self
    }

    pub fn with_on_notification<T: GodotClass + cap::GodotNotification>(mut self) -> Self {
        set(
            &mut self.user_on_notification_fn,
            callbacks::on_notification::<T>,
        );
        self
    }

    pub fn with_get_property<T: GodotClass + cap::GodotGet>(mut self) -> Self {
        set(&mut self.user_get_fn, callbacks::get_property::<T>);
        self
    }

    pub fn with_set_property<T: GodotClass + cap::GodotSet>(mut self) -> Self {
        set(&mut self.user_set_fn, callbacks::set_property::<T>);
        self
    }

    pub fn with_get_property_list<T: GodotClass + cap::GodotGetPropertyList>(mut self) -> Self {
        set(
            &mut self.user_get_property_list_fn,
            callbacks::get_property_list::<T>,
        );
        set(
            &mut self.user_free_property_list_fn,
            callbacks::free_property_list::<T>,
        );
        self
    }

    pub fn with_property_get_revert<T: GodotClass + UserClass + cap::GodotPropertyGetRevert>(
        mut self,
    ) -> Self {
        set(
            &mut self.user_property_can_revert_fn,
            callbacks::property_can_revert::<T>,
        );
        set(
            &mut self.user_property_get_revert_fn,
            callbacks::property_get_revert::<T>,
        );
        self
    }

    pub fn with_validate_property<T: GodotClass + cap::GodotValidateProperty>(mut self) -> Self {
        set(
            &mut self.validate_property_fn,
            callbacks::validate_property::<T>,
        );
        self
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_accepts_first_value() {
        let mut field = None;
        set(&mut field, 5);
        assert_eq!(field, Some(5));
    }

    #[test]
    #[should_panic(expected = "more than once")]
    fn set_rejects_second_value() {
        let mut field = Some(1);
        set(&mut field, 2);
    }

    #[test]
    fn empty_trait_impl_has_no_callbacks() {
        let item = ITraitImpl::default();
        assert!(item.user_create_fn.is_none());
        assert!(item.get_virtual_fn.is_none());
        assert!(item.user_free_property_list_fn.is_none());
    }
}
