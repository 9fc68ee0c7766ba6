/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Stack-resident argument buffer for pointer calls.
//!
//! The engine's pointer-call convention passes every argument as a pointer to a slot holding the value in its engine representation,
//! and expects a pointer to a return slot. A [`CallFrame`] owns those slots for the duration of one call, without heap allocation:
//! the argument tuple and the return value live inline, and a small bitmask tracks which slots were written and which of them own
//! engine resources that must be released.

use std::any::TypeId;
use std::ffi::c_void;
use std::marker::PhantomData;
use std::mem::MaybeUninit;

use crate as sys;
use crate::VariantType;

/// A value in its pointer-call representation, storable in a [`CallFrame`] slot.
///
/// # Safety
/// `write_default` must fully initialize `dst` with a value the engine may assign over, and `destroy` must release exactly the
/// resources owned by such a value (nothing, for plain types).
pub unsafe trait FrameSlot: Copy + 'static {
    /// Engine type of the slot. `Nil` for Variant slots, which hold any type.
    const VARIANT_TYPE: VariantType;

    /// Writes the engine's default value into uninitialized memory.
    ///
    /// # Safety
    /// `dst` must be valid for writes.
    unsafe fn write_default(dst: *mut Self);

    /// Releases engine resources held by the value. The bytes are garbage afterwards.
    ///
    /// # Safety
    /// `ptr` must point to an initialized value that is not used afterwards.
    unsafe fn destroy(_ptr: *mut Self) {}
}

macro_rules! impl_plain_slot {
    ($( $T:ty => $Variant:ident = $zero:expr ),* $(,)?) => {
        $(
            // SAFETY: plain values own nothing.
            unsafe impl FrameSlot for $T {
                const VARIANT_TYPE: VariantType = VariantType::$Variant;

                unsafe fn write_default(dst: *mut Self) {
                    dst.write($zero);
                }
            }
        )*
    };
}

impl_plain_slot! {
    bool => Bool = false,
    i64 => Int = 0,
    f64 => Float = 0.0,
    *mut c_void => Object = std::ptr::null_mut(),
    () => Nil = (),
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

/// Type of one argument slot, for diagnostics.
#[derive(Copy, Clone, Debug)]
pub struct SlotInfo {
    pub type_id: TypeId,
    pub type_name: &'static str,
}

/// Tuple of [`FrameSlot`]s forming the argument list of a call.
///
/// # Safety
/// `slot_ptr` and `pointers` must return the addresses of the tuple fields at the given indices.
pub unsafe trait FrameArgs: Sized + 'static {
    const LEN: usize;

    /// `[GDExtensionConstTypePtr; LEN]`.
    type Pointers: AsRef<[sys::GDExtensionConstTypePtr]>;

    fn slot_info(index: usize) -> Option<SlotInfo>;

    /// # Safety
    /// `base` must point to (possibly uninitialized) storage of `Self`.
    unsafe fn slot_ptr(base: *mut Self, index: usize) -> *mut u8;

    /// # Safety
    /// The slot at `index` must be initialized and is garbage afterwards.
    unsafe fn destroy_slot(base: *mut Self, index: usize);

    /// # Safety
    /// `base` must point to storage of `Self`.
    unsafe fn pointers(base: *const Self) -> Self::Pointers;
}

// SAFETY: no slots.
unsafe impl FrameArgs for () {
    const LEN: usize = 0;
    type Pointers = [sys::GDExtensionConstTypePtr; 0];

    fn slot_info(_index: usize) -> Option<SlotInfo> {
        None
    }

    unsafe fn slot_ptr(_base: *mut Self, _index: usize) -> *mut u8 {
        std::ptr::null_mut()
    }

    unsafe fn destroy_slot(_base: *mut Self, _index: usize) {}

    unsafe fn pointers(_base: *const Self) -> Self::Pointers {
        []
    }
}

macro_rules! impl_frame_args {
    ($len:literal; $( $T:ident : $idx:tt ),+) => {
        // SAFETY: addresses are taken field by field with `addr_of!`.
        unsafe impl<$( $T: FrameSlot ),+> FrameArgs for ($( $T, )+) {
            const LEN: usize = $len;
            type Pointers = [sys::GDExtensionConstTypePtr; $len];

            fn slot_info(index: usize) -> Option<SlotInfo> {
                match index {
                    $( $idx => Some(SlotInfo {
                        type_id: TypeId::of::<$T>(),
                        type_name: std::any::type_name::<$T>(),
                    }), )+
                    _ => None,
                }
            }

            unsafe fn slot_ptr(base: *mut Self, index: usize) -> *mut u8 {
                match index {
                    $( $idx => std::ptr::addr_of_mut!((*base).$idx) as *mut u8, )+
                    _ => std::ptr::null_mut(),
                }
            }

            unsafe fn destroy_slot(base: *mut Self, index: usize) {
                match index {
                    $( $idx => $T::destroy(std::ptr::addr_of_mut!((*base).$idx)), )+
                    _ => {}
                }
            }

            unsafe fn pointers(base: *const Self) -> Self::Pointers {
                [ $( std::ptr::addr_of!((*base).$idx) as sys::GDExtensionConstTypePtr, )+ ]
            }
        }
    };
}

impl_frame_args!(1; A0: 0);
impl_frame_args!(2; A0: 0, A1: 1);
impl_frame_args!(3; A0: 0, A1: 1, A2: 2);
impl_frame_args!(4; A0: 0, A1: 1, A2: 2, A3: 3);
impl_frame_args!(5; A0: 0, A1: 1, A2: 2, A3: 3, A4: 4);
impl_frame_args!(6; A0: 0, A1: 1, A2: 2, A3: 3, A4: 4, A5: 5);
impl_frame_args!(7; A0: 0, A1: 1, A2: 2, A3: 3, A4: 4, A5: 5, A6: 6);
impl_frame_args!(8; A0: 0, A1: 1, A2: 2, A3: 3, A4: 4, A5: 5, A6: 6, A7: 7);
impl_frame_args!(9; A0: 0, A1: 1, A2: 2, A3: 3, A4: 4, A5: 5, A6: 6, A7: 7, A8: 8);
impl_frame_args!(10; A0: 0, A1: 1, A2: 2, A3: 3, A4: 4, A5: 5, A6: 6, A7: 7, A8: 8, A9: 9);

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum RetState {
    Empty,
    Ready,
    Taken,
}

/// Marshalling buffer for one pointer call: argument slots `A` and a return slot `R`.
///
/// Slots written with [`arg_owned()`](Self::arg_owned) and an untaken return value are released by [`free()`](Self::free), which
/// also runs on drop, so cleanup happens on every exit path including unwinding.
pub struct CallFrame<A: FrameArgs, R: FrameSlot = ()> {
    args: MaybeUninit<A>,
    ret: MaybeUninit<R>,
    written: u32,
    owned: u32,
    ret_state: RetState,
    _not_send: PhantomData<*const ()>,
}

impl<A: FrameArgs, R: FrameSlot> CallFrame<A, R> {
    pub fn new() -> Self {
        assert!(A::LEN <= 32, "call frames support at most 32 arguments");

        Self {
            args: MaybeUninit::uninit(),
            ret: MaybeUninit::uninit(),
            written: 0,
            owned: 0,
            ret_state: RetState::Empty,
            _not_send: PhantomData,
        }
    }

    /// Frame with every slot written from `args`, none owned.
    pub fn with_args(args: A) -> Self {
        let mut frame = Self::new();
        frame.args.write(args);
        frame.written = Self::full_mask();
        frame
    }

    /// Copies `value` into slot `index`. The frame does not release it.
    ///
    /// # Panics
    /// If `index` is out of range or the slot holds a different type.
    pub fn arg<T: FrameSlot>(&mut self, index: usize, value: T) {
        self.write_slot(index, value, false);
    }

    /// Moves an engine-allocated transient into slot `index`; the frame destroys it in [`free()`](Self::free).
    ///
    /// # Safety
    /// `value` must own its engine resources exclusively.
    pub unsafe fn arg_owned<T: FrameSlot>(&mut self, index: usize, value: T) {
        self.write_slot(index, value, true);
    }

    pub fn is_written(&self, index: usize) -> bool {
        index < A::LEN && self.written & (1 << index) != 0
    }

    /// Pointer table whose entry `i` points to slot `i`.
    ///
    /// # Panics
    /// If any slot was never written.
    pub fn array(&self) -> A::Pointers {
        if let Some(missing) = (0..A::LEN).find(|&i| !self.is_written(i)) {
            panic!("call frame slot {missing} was never written");
        }

        // SAFETY: all slots are initialized, addresses point into `self.args`.
        unsafe { A::pointers(self.args.as_ptr()) }
    }

    /// Pointer to the return slot, holding the default value so the engine may assign into it.
    ///
    /// Null for `()` returns.
    pub fn ret_slot(&mut self) -> sys::GDExtensionTypePtr {
        if std::mem::size_of::<R>() == 0 {
            return std::ptr::null_mut();
        }

        // SAFETY: a ready return value is initialized; the slot is reinitialized right after.
        unsafe {
            if self.ret_state == RetState::Ready {
                R::destroy(self.ret.as_mut_ptr());
            }
            R::write_default(self.ret.as_mut_ptr());
        }

        self.ret_state = RetState::Ready;
        self.ret.as_mut_ptr() as sys::GDExtensionTypePtr
    }

    /// Moves the return value out. The caller owns its engine resources from now on.
    ///
    /// # Panics
    /// If [`ret_slot()`](Self::ret_slot) was not called, or the value was already taken.
    pub fn take_ret(&mut self) -> R {
        if std::mem::size_of::<R>() != 0 {
            assert_eq!(
                self.ret_state,
                RetState::Ready,
                "call frame return slot is not ready"
            );
        }

        self.ret_state = RetState::Taken;

        // SAFETY: initialized by `ret_slot()` (or zero-sized).
        unsafe { self.ret.assume_init_read() }
    }

    /// Releases owned argument slots and an untaken return value. Idempotent.
    pub fn free(&mut self) {
        let base = self.args.as_mut_ptr();
        for index in 0..A::LEN {
            if self.owned & (1 << index) != 0 {
                // SAFETY: owned slots are initialized.
                unsafe { A::destroy_slot(base, index) };
            }
        }

        self.owned = 0;
        self.written = 0;

        if self.ret_state == RetState::Ready {
            // SAFETY: ready return values are initialized.
            unsafe { R::destroy(self.ret.as_mut_ptr()) };
        }
        self.ret_state = RetState::Empty;
    }

    fn write_slot<T: FrameSlot>(&mut self, index: usize, value: T, owned: bool) {
        let Some(info) = A::slot_info(index) else {
            panic!(
                "call frame has {} slots; index {index} is out of range",
                A::LEN
            );
        };

        assert!(
            info.type_id == TypeId::of::<T>(),
            "call frame slot {index} expects `{}`, got `{}`",
            info.type_name,
            std::any::type_name::<T>()
        );

        let bit = 1u32 << index;
        let base = self.args.as_mut_ptr();

        // SAFETY: slot type checked above; an owned previous value is initialized.
        unsafe {
            if self.owned & bit != 0 {
                A::destroy_slot(base, index);
            }
            (A::slot_ptr(base, index) as *mut T).write(value);
        }

        self.written |= bit;
        if owned {
            self.owned |= bit;
        } else {
            self.owned &= !bit;
        }
    }

    fn full_mask() -> u32 {
        if A::LEN == 32 {
            u32::MAX
        } else {
            (1u32 << A::LEN) - 1
        }
    }
}

impl<A: FrameArgs, R: FrameSlot> Default for CallFrame<A, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: FrameArgs, R: FrameSlot> Drop for CallFrame<A, R> {
    fn drop(&mut self) {
        self.free();
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    thread_local! {
        static DESTROYED: RefCell<Vec<u32>> = const { RefCell::new(Vec::new()) };
    }

    #[derive(Copy, Clone, Eq, PartialEq, Debug)]
    struct Tracked(u32);

    unsafe impl FrameSlot for Tracked {
        const VARIANT_TYPE: VariantType = VariantType::String;

        unsafe fn write_default(dst: *mut Self) {
            dst.write(Tracked(0));
        }

        unsafe fn destroy(ptr: *mut Self) {
            let id = (*ptr).0;
            DESTROYED.with(|d| d.borrow_mut().push(id));
        }
    }

    fn destroyed() -> Vec<u32> {
        DESTROYED.with(|d| std::mem::take(&mut *d.borrow_mut()))
    }

    #[test]
    fn array_points_to_slots() {
        let mut frame = CallFrame::<(i64, f64, bool)>::new();
        frame.arg(0, 42i64);
        frame.arg(1, -0.5f64);
        frame.arg(2, true);

        let ptrs = frame.array();
        let ptrs = ptrs.as_ref();
        assert_eq!(ptrs.len(), 3);

        unsafe {
            assert_eq!(*(ptrs[0] as *const i64), 42);
            assert_eq!(*(ptrs[1] as *const f64), -0.5);
            assert!(*(ptrs[2] as *const bool));
        }
    }

    #[test]
    #[should_panic(expected = "slot 1 was never written")]
    fn unwritten_slot_panics() {
        let mut frame = CallFrame::<(i64, i64)>::new();
        frame.arg(0, 1i64);
        let _ = frame.array();
    }

    #[test]
    #[should_panic(expected = "expects `f64`")]
    fn wrong_slot_type_panics() {
        let mut frame = CallFrame::<(i64, f64)>::new();
        frame.arg(1, 7i64);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn slot_index_out_of_range() {
        let mut frame = CallFrame::<(i64,)>::new();
        frame.arg(1, 7i64);
    }

    #[test]
    fn only_owned_slots_are_released() {
        destroyed();
        {
            let mut frame = CallFrame::<(Tracked, Tracked)>::new();
            unsafe { frame.arg_owned(0, Tracked(7)) };
            frame.arg(1, Tracked(8));
            let _ = frame.array();
        }
        assert_eq!(destroyed(), vec![7]);
    }

    #[test]
    fn overwriting_owned_slot_releases_previous() {
        destroyed();
        let mut frame = CallFrame::<(Tracked,)>::new();
        unsafe { frame.arg_owned(0, Tracked(1)) };
        frame.arg(0, Tracked(2));
        assert_eq!(destroyed(), vec![1]);

        drop(frame);
        assert_eq!(destroyed(), Vec::<u32>::new());
    }

    #[test]
    fn untaken_return_is_released() {
        destroyed();
        {
            let mut frame = CallFrame::<(), Tracked>::new();
            let ret = frame.ret_slot();
            unsafe { *(ret as *mut Tracked) = Tracked(99) };
        }
        assert_eq!(destroyed(), vec![99]);
    }

    #[test]
    fn taken_return_belongs_to_caller() {
        destroyed();
        let mut frame = CallFrame::<(), Tracked>::new();
        let ret = frame.ret_slot();
        unsafe { *(ret as *mut Tracked) = Tracked(5) };

        assert_eq!(frame.take_ret(), Tracked(5));
        drop(frame);
        assert_eq!(destroyed(), Vec::<u32>::new());
    }

    #[test]
    #[should_panic(expected = "not ready")]
    fn take_without_slot_panics() {
        let mut frame = CallFrame::<(), i64>::new();
        frame.take_ret();
    }

    #[test]
    fn unit_return_slot_is_null() {
        let mut frame = CallFrame::<(i64,)>::with_args((3,));
        assert!(frame.ret_slot().is_null());
        frame.take_ret();
    }

    #[test]
    fn released_on_unwind() {
        destroyed();
        let result = std::panic::catch_unwind(|| {
            let mut frame = CallFrame::<(Tracked,), Tracked>::new();
            unsafe { frame.arg_owned(0, Tracked(11)) };
            frame.ret_slot();
            panic!("engine call failed");
        });

        assert!(result.is_err());
        let mut released = destroyed();
        released.sort();
        assert_eq!(released, vec![0, 11]);
    }

    #[test]
    fn free_is_idempotent() {
        destroyed();
        let mut frame = CallFrame::<(Tracked,)>::new();
        unsafe { frame.arg_owned(0, Tracked(3)) };
        frame.free();
        frame.free();
        drop(frame);
        assert_eq!(destroyed(), vec![3]);
    }
}
