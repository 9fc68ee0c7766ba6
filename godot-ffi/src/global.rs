/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lazily initialized, resettable global.
///
/// Holds process-wide caches (method binds, class records) that are filled on first use and emptied when the library is
/// deinitialized, so that a reload starts from the initializer again.
///
/// - `const` constructor, usable in `static` items.
/// - The initializer is given once, at the declaration.
/// - Access goes through a guard giving `&T` and `&mut T`.
pub struct Global<T> {
    state: Mutex<State<T>>,
    init_fn: fn() -> T,
}

enum State<T> {
    Uninit,
    Ready(T),
}

impl<T> Global<T> {
    pub const fn new(init_fn: fn() -> T) -> Self {
        Self {
            state: Mutex::new(State::Uninit),
            init_fn,
        }
    }

    /// `Global<T>` initialized with `T::default()`.
    ///
    /// Inherent rather than `Default`, since the trait method is not `const`.
    pub const fn default() -> Self
    where
        T: Default,
    {
        Self::new(T::default)
    }

    /// Blocks until the value is available, initializing it if needed.
    ///
    /// A panic in a previous holder of the guard does not poison the global; the value is handed out as it was left.
    pub fn lock(&self) -> GlobalGuard<'_, T> {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let State::Uninit = *guard {
            *guard = State::Ready((self.init_fn)());
        }

        GlobalGuard { guard }
    }

    /// Drops the current value. The next [`lock()`](Self::lock) runs the initializer again.
    ///
    /// Returns the previous value, if it had been initialized.
    pub fn reset(&self) -> Option<T> {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match std::mem::replace(&mut *guard, State::Uninit) {
            State::Ready(value) => Some(value),
            State::Uninit => None,
        }
    }

    pub fn is_initialized(&self) -> bool {
        let guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        matches!(*guard, State::Ready(_))
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Guards

/// Guard that temporarily gives access to a `Global<T>`'s inner value.
pub struct GlobalGuard<'a, T> {
    guard: MutexGuard<'a, State<T>>,
}

impl<T> Deref for GlobalGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        match &*self.guard {
            State::Ready(value) => value,
            State::Uninit => unreachable!("guard is only handed out for initialized globals"),
        }
    }
}

impl<T> DerefMut for GlobalGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match &mut *self.guard {
            State::Ready(value) => value,
            State::Uninit => unreachable!("guard is only handed out for initialized globals"),
        }
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    static MAP: Global<HashMap<i32, &'static str>> = Global::default();
    static VEC: Global<Vec<i32>> = Global::new(|| vec![1, 2, 3]);
    static RESETTABLE: Global<Vec<i32>> = Global::new(|| vec![7]);

    #[test]
    fn global_map() {
        {
            let mut map = MAP.lock();
            map.insert(2, "two");
            map.insert(3, "three");
        }

        MAP.lock().insert(1, "one");

        let map = MAP.lock();
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(&1), Some(&"one"));
        assert_eq!(map.get(&3), Some(&"three"));
    }

    #[test]
    fn global_vec() {
        VEC.lock().push(4);
        assert_eq!(*VEC.lock(), &[1, 2, 3, 4]);
    }

    #[test]
    fn reset_reinitializes() {
        assert!(!RESETTABLE.is_initialized());
        RESETTABLE.lock().push(8);

        assert_eq!(RESETTABLE.reset(), Some(vec![7, 8]));
        assert!(!RESETTABLE.is_initialized());
        assert_eq!(*RESETTABLE.lock(), &[7]);
    }
}
