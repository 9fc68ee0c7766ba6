/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::cell::Cell;
use std::rc::Rc;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::marker::PhantomData;

use crate::obj::{Gd, GodotClass, InstanceId};

/// Restricted version of `Gd`, to hold the base instance inside a user's `GodotClass`.
///
/// Behaves similarly to [`Gd`][crate::obj::Gd], but is more constrained. Cannot be constructed by the user.
///
/// `Base` holds no reference: the user instance lives inside the object, so a strong pointer would keep the object alive forever.
/// It only remembers the instance ID, and creates `Gd` pointers on demand.
pub struct Base<T: GodotClass> {
    instance_id: InstanceId,

    // Set once the user instance is attached to the object. Before that, the object cannot hand out pointers to itself.
    // Shared between the user's field and the copy held by the instance storage.
    initialized: Rc<Cell<bool>>,

    _marker: PhantomData<*const T>,
}

impl<T: GodotClass> Base<T> {
    pub(crate) fn from_instance_id(instance_id: InstanceId) -> Self {
        Self {
            instance_id,
            initialized: Rc::new(Cell::new(false)),
            _marker: PhantomData,
        }
    }

    /// Second `Base` for the same object, observing the same initialization state.
    pub(crate) fn share(&self) -> Self {
        Self {
            instance_id: self.instance_id,
            initialized: Rc::clone(&self.initialized),
            _marker: PhantomData,
        }
    }

    pub(crate) fn mark_initialized(&self) {
        self.initialized.set(true);
    }

    /// Returns a [`Gd`] referencing the same object as this reference.
    ///
    /// Using this method to call methods on the base field of a Rust object is discouraged, instead use the
    /// methods from [`WithBaseField`](super::WithBaseField) when possible.
    ///
    /// # Panics
    /// When called during `init()`, before the object is fully constructed.
    #[doc(hidden)]
    pub fn to_gd(&self) -> Gd<T> {
        assert!(
            self.initialized.get(),
            "base().to_gd() called during init() of class {}; the object is not yet constructed",
            T::class_name()
        );

        Gd::from_instance_id(self.instance_id)
    }

    /// Instance ID of the object. Also available during `init()`.
    pub fn instance_id(&self) -> InstanceId {
        self.instance_id
    }
}

impl<T: GodotClass> Debug for Base<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Base")
            .field("id", &self.instance_id.to_i64())
            .field("class", &T::class_name())
            .finish()
    }
}
