/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Ownership-tracked handles to engine values.
//!
//! Raw engine bits (opaque builtin bytes, object pointers) are stored in entries of a thread-local table. Host code only ever holds a
//! [`Handle`], a `{slot index, stamp}` pair. Every entry carries an [`Ownership`] mode that decides what happens when its last holder
//! ends it:
//!
//! | Mode            | Release on last `end`                                  |
//! |-----------------|--------------------------------------------------------|
//! | `Owned`         | engine destructor of the type                          |
//! | `Shared`        | engine unreference (destroy on zero)                   |
//! | `Borrowed`      | none; also reclaimed by [`cycle()`]                    |
//! | `EngineOwned`   | none; the engine reports finalization via [`invalidate_key()`] |
//! | `HostAllocated` | bytes go back to the Rust allocator                    |
//!
//! Stamps come from a process-wide monotonic counter. A slot that is reused gets a new stamp, so handles to the previous occupant
//! never resolve again.
//!
//! Release functions run after the table borrow has ended. They may call back into the engine, which may in turn call into this
//! module (e.g. an instance free callback invalidating keys).

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, Ordering};

/// Who is responsible for releasing an entry's engine resources.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Ownership {
    /// Host observes a value it does not own.
    Borrowed,
    /// Single host holder; release runs the engine destructor.
    Owned,
    /// Refcounted object; the entry holds exactly one engine reference.
    Shared,
    /// Manually managed object; lifetime decided by the engine.
    EngineOwned,
    /// Bytes allocated by Rust and lent to the engine.
    HostAllocated,
}

impl Ownership {
    fn runs_release(self) -> bool {
        matches!(self, Self::Owned | Self::Shared | Self::HostAllocated)
    }

    fn is_shareable(self) -> bool {
        matches!(self, Self::Borrowed | Self::Shared | Self::EngineOwned)
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum EntryState {
    Live,
    Ended,
    Pinned,
}

/// Access through a handle that is no longer (or never was) valid.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum PointerError {
    /// The slot was freed or recycled since the handle was issued.
    Stale { index: u32, stamp: u64 },

    /// The entry still exists, but the engine value behind it is gone.
    Ended { index: u32 },

    /// The entry holds a value of another type.
    TypeMismatch { index: u32, expected: &'static str },

    /// Only `Borrowed`, `Shared` and `EngineOwned` entries can have several holders.
    NotShareable { mode: Ownership },

    /// The thread-local table was already destroyed (thread shutdown).
    Unavailable,
}

impl fmt::Display for PointerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stale { index, stamp } => {
                write!(f, "stale handle: slot {index} no longer holds stamp {stamp}")
            }
            Self::Ended { index } => write!(f, "handle to slot {index} has ended"),
            Self::TypeMismatch { index, expected } => {
                write!(f, "slot {index} does not hold a value of type `{expected}`")
            }
            Self::NotShareable { mode } => write!(f, "{mode:?} entries cannot be shared"),
            Self::Unavailable => write!(f, "pointer table is unavailable during thread shutdown"),
        }
    }
}

impl std::error::Error for PointerError {}

/// Engine-side release routine, receiving the entry's raw bytes.
pub type Release<T> = unsafe fn(*mut T);

/// Whether [`new_keyed()`] created an entry or joined an existing one.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Lookup {
    Inserted,
    Found,
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Handles

/// Host-side token naming one holder of a table entry.
///
/// Not `Send` (entries live in a thread-local table) and not `Clone` (each holder is accounted for); use [`share()`] for another
/// holder and [`end()`] to give it up.
pub struct Handle<T: 'static> {
    index: u32,
    stamp: u64,
    _marker: PhantomData<*const T>,
}

impl<T: 'static> Handle<T> {
    fn new(index: u32, stamp: u64) -> Self {
        Self {
            index,
            stamp,
            _marker: PhantomData,
        }
    }

    pub fn id(&self) -> HandleId {
        HandleId {
            index: self.index,
            stamp: self.stamp,
        }
    }
}

impl<T: 'static> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Handle<{}>({}#{})",
            std::any::type_name::<T>(),
            self.index,
            self.stamp
        )
    }
}

/// Copyable probe for an entry; does not count as a holder.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct HandleId {
    pub index: u32,
    pub stamp: u64,
}

/// Entry counts of the current thread's table.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct PointerStats {
    pub borrowed: usize,
    pub owned: usize,
    pub shared: usize,
    pub engine_owned: usize,
    pub host_allocated: usize,
    pub live: usize,
    pub pinned: usize,
    pub ended: usize,
}

impl PointerStats {
    pub fn total(&self) -> usize {
        self.live + self.pinned + self.ended
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Public API

/// Stores `raw` in a new entry with one holder.
#[must_use]
pub fn new<T: 'static>(raw: T, mode: Ownership, release: Option<Release<T>>) -> Handle<T> {
    with_table(|table| table.insert(raw, mode, release, None))
}

/// Like [`new()`], but deduplicates by engine pointer: a live entry registered under `key` gains one holder instead.
///
/// The caller takes an engine reference only for [`Lookup::Inserted`].
#[must_use]
pub fn new_keyed<T: 'static>(
    key: usize,
    raw: T,
    mode: Ownership,
    release: Option<Release<T>>,
) -> (Handle<T>, Lookup) {
    debug_assert!(
        matches!(
            mode,
            Ownership::Shared | Ownership::EngineOwned | Ownership::HostAllocated
        ),
        "{mode:?} entries cannot be keyed"
    );

    with_table(|table| {
        if let Some(index) = table.find_key::<T>(key) {
            let slot = &mut table.slots[index as usize];
            if let Some(entry) = slot.entry.as_mut() {
                entry.holders += 1;
            }
            return (Handle::new(index, slot.stamp), Lookup::Found);
        }

        (table.insert(raw, mode, release, Some(key)), Lookup::Inserted)
    })
}

/// Gives up one holder of the entry registered under `key`, for callbacks that only receive the engine-side pointer.
pub fn end_keyed(key: usize) -> Result<(), PointerError> {
    let (index, stamp) = TABLE
        .try_with(|table| {
            let table = table.borrow();
            let index = *table.keys.get(&key)?;
            Some((index, table.slots[index as usize].stamp))
        })
        .map_err(|_| PointerError::Unavailable)?
        .ok_or(PointerError::Stale { index: 0, stamp: 0 })?;

    let removed = TABLE
        .try_with(|table| table.borrow_mut().drop_holder(index, stamp))
        .map_err(|_| PointerError::Unavailable)??;

    if let Some(Removed {
        mut payload,
        run_release,
    }) = removed
    {
        if run_release {
            payload.release();
        }
    }

    Ok(())
}

/// Pointer to the raw value, valid until the entry is released.
pub fn get<T: 'static>(handle: &Handle<T>) -> Result<NonNull<T>, PointerError> {
    with_table(|table| {
        let entry = table.resolve_mut(handle.index, handle.stamp)?;
        if entry.state == EntryState::Ended {
            return Err(PointerError::Ended {
                index: handle.index,
            });
        }

        entry
            .payload
            .raw_ptr::<T>()
            .ok_or(PointerError::TypeMismatch {
                index: handle.index,
                expected: std::any::type_name::<T>(),
            })
    })
}

/// Gives up one holder. The last holder frees the slot and runs the mode's release.
pub fn end<T: 'static>(handle: Handle<T>) -> Result<(), PointerError> {
    let removed = TABLE
        .try_with(|table| table.borrow_mut().drop_holder(handle.index, handle.stamp))
        .map_err(|_| PointerError::Unavailable)??;

    if let Some(Removed {
        mut payload,
        run_release,
    }) = removed
    {
        if run_release {
            payload.release();
        }
        drop(payload);
    }

    Ok(())
}

/// Another holder of the same entry. Only for shareable modes.
pub fn share<T: 'static>(handle: &Handle<T>) -> Result<Handle<T>, PointerError> {
    with_table(|table| {
        let entry = table.resolve_mut(handle.index, handle.stamp)?;
        if !entry.mode.is_shareable() {
            return Err(PointerError::NotShareable { mode: entry.mode });
        }

        entry.holders += 1;
        Ok(Handle::new(handle.index, handle.stamp))
    })
}

/// Exempts a live entry from [`cycle()`].
pub fn pin<T: 'static>(handle: &Handle<T>) -> Result<(), PointerError> {
    with_table(|table| {
        let index = handle.index;
        let entry = table.resolve_mut(index, handle.stamp)?;
        match entry.state {
            EntryState::Ended => Err(PointerError::Ended { index }),
            _ => {
                entry.state = EntryState::Pinned;
                Ok(())
            }
        }
    })
}

pub fn ownership<T: 'static>(handle: &Handle<T>) -> Result<Ownership, PointerError> {
    with_table(|table| Ok(table.resolve(handle.index, handle.stamp)?.mode))
}

pub fn state<T: 'static>(handle: &Handle<T>) -> Result<EntryState, PointerError> {
    with_table(|table| Ok(table.resolve(handle.index, handle.stamp)?.state))
}

pub fn holders<T: 'static>(handle: &Handle<T>) -> Result<u32, PointerError> {
    with_table(|table| Ok(table.resolve(handle.index, handle.stamp)?.holders))
}

/// Whether the entry exists under this stamp and is not ended.
pub fn is_valid(id: HandleId) -> bool {
    TABLE
        .try_with(|table| {
            let table = table.borrow();
            matches!(table.resolve(id.index, id.stamp), Ok(entry) if entry.state != EntryState::Ended)
        })
        .unwrap_or(false)
}

/// Engine notification that the value behind `key` was finalized. The entry turns `Ended` and will not be released.
///
/// Returns whether an entry was registered under the key.
pub fn invalidate_key(key: usize) -> bool {
    TABLE
        .try_with(|table| {
            let mut table = table.borrow_mut();
            let Some(index) = table.keys.remove(&key) else {
                return false;
            };

            if let Some(entry) = table.slots[index as usize].entry.as_mut() {
                entry.state = EntryState::Ended;
                entry.key = None;
            }
            true
        })
        .unwrap_or(false)
}

/// Bumps the global epoch and reclaims every live `Borrowed` entry of this thread. Returns the new epoch.
///
/// Pinned entries and all other modes survive.
pub fn cycle() -> u64 {
    let epoch = EPOCH.fetch_add(1, Ordering::AcqRel) + 1;
    let reclaimed = with_table(|table| table.reclaim_borrowed());

    crate::out!("pointer cycle {epoch}: reclaimed {} borrowed", reclaimed.len());
    drop(reclaimed);

    epoch
}

/// Current global epoch.
pub fn epoch() -> u64 {
    EPOCH.load(Ordering::Acquire)
}

pub fn stats() -> PointerStats {
    TABLE
        .try_with(|table| table.borrow().stats())
        .unwrap_or_default()
}

/// Releases every remaining `Owned` and `Shared` entry exactly once and empties the table. Returns the number of releases run.
///
/// Outstanding handles become stale.
pub fn teardown() -> usize {
    let removed = TABLE
        .try_with(|table| table.borrow_mut().drain())
        .unwrap_or_default();

    let mut released = 0;
    for Removed {
        mut payload,
        run_release,
    } in removed
    {
        if run_release {
            payload.release();
            released += 1;
        }
    }

    crate::out!("pointer teardown: {released} releases");
    released
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Implementation

static NEXT_STAMP: AtomicU64 = AtomicU64::new(1);
static EPOCH: AtomicU64 = AtomicU64::new(0);

thread_local! {
    static TABLE: RefCell<Table> = RefCell::new(Table::default());
}

fn with_table<R>(f: impl FnOnce(&mut Table) -> R) -> R {
    TABLE.with(|table| f(&mut table.borrow_mut()))
}

trait Payload {
    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn release(&mut self);
}

impl dyn Payload {
    fn raw_ptr<T: 'static>(&mut self) -> Option<NonNull<T>> {
        self.as_any_mut()
            .downcast_mut::<Typed<T>>()
            .map(|typed| NonNull::from(&mut typed.raw))
    }

    fn holds<T: 'static>(&mut self) -> bool {
        self.as_any_mut().is::<Typed<T>>()
    }
}

struct Typed<T> {
    raw: T,
    release: Option<Release<T>>,
}

impl<T: 'static> Payload for Typed<T> {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn release(&mut self) {
        if let Some(release) = self.release.take() {
            // SAFETY: the release function was provided together with the value, and runs at most once.
            unsafe { release(&mut self.raw) };
        }
    }
}

struct Entry {
    payload: Box<dyn Payload>,
    mode: Ownership,
    state: EntryState,
    holders: u32,
    key: Option<usize>,
}

struct Slot {
    stamp: u64,
    entry: Option<Entry>,
}

struct Removed {
    payload: Box<dyn Payload>,
    run_release: bool,
}

#[derive(Default)]
struct Table {
    slots: Vec<Slot>,
    free: Vec<u32>,
    keys: HashMap<usize, u32>,
}

impl Table {
    fn insert<T: 'static>(
        &mut self,
        raw: T,
        mode: Ownership,
        release: Option<Release<T>>,
        key: Option<usize>,
    ) -> Handle<T> {
        let stamp = NEXT_STAMP.fetch_add(1, Ordering::Relaxed);
        let entry = Entry {
            payload: Box::new(Typed { raw, release }),
            mode,
            state: EntryState::Live,
            holders: 1,
            key,
        };

        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index as usize] = Slot {
                    stamp,
                    entry: Some(entry),
                };
                index
            }
            None => {
                let index = u32::try_from(self.slots.len()).expect("pointer table overflow");
                self.slots.push(Slot {
                    stamp,
                    entry: Some(entry),
                });
                index
            }
        };

        if let Some(key) = key {
            self.keys.insert(key, index);
        }

        Handle::new(index, stamp)
    }

    /// Index of a live entry of type `T` under `key`. Drops mappings that point to anything else.
    fn find_key<T: 'static>(&mut self, key: usize) -> Option<u32> {
        let index = *self.keys.get(&key)?;
        let reusable = match self.slots[index as usize].entry.as_mut() {
            Some(entry) => entry.state != EntryState::Ended && entry.payload.holds::<T>(),
            None => false,
        };

        if reusable {
            Some(index)
        } else {
            self.keys.remove(&key);
            if let Some(entry) = self.slots[index as usize].entry.as_mut() {
                entry.key = None;
            }
            None
        }
    }

    fn resolve(&self, index: u32, stamp: u64) -> Result<&Entry, PointerError> {
        match self.slots.get(index as usize) {
            Some(Slot {
                stamp: current,
                entry: Some(entry),
            }) if *current == stamp => Ok(entry),
            _ => Err(PointerError::Stale { index, stamp }),
        }
    }

    fn resolve_mut(&mut self, index: u32, stamp: u64) -> Result<&mut Entry, PointerError> {
        match self.slots.get_mut(index as usize) {
            Some(Slot {
                stamp: current,
                entry: Some(entry),
            }) if *current == stamp => Ok(entry),
            _ => Err(PointerError::Stale { index, stamp }),
        }
    }

    fn drop_holder(&mut self, index: u32, stamp: u64) -> Result<Option<Removed>, PointerError> {
        let entry = self.resolve_mut(index, stamp)?;
        entry.holders -= 1;
        if entry.holders > 0 {
            return Ok(None);
        }

        Ok(self.remove(index))
    }

    fn remove(&mut self, index: u32) -> Option<Removed> {
        let entry = self.slots[index as usize].entry.take()?;
        if let Some(key) = entry.key {
            if self.keys.get(&key) == Some(&index) {
                self.keys.remove(&key);
            }
        }
        self.free.push(index);

        Some(Removed {
            run_release: entry.state != EntryState::Ended && entry.mode.runs_release(),
            payload: entry.payload,
        })
    }

    fn reclaim_borrowed(&mut self) -> Vec<Removed> {
        let indices: Vec<u32> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| match &slot.entry {
                Some(entry)
                    if entry.mode == Ownership::Borrowed && entry.state == EntryState::Live =>
                {
                    Some(i as u32)
                }
                _ => None,
            })
            .collect();

        indices
            .into_iter()
            .filter_map(|index| self.remove(index))
            .collect()
    }

    fn drain(&mut self) -> Vec<Removed> {
        let removed = self
            .slots
            .iter_mut()
            .filter_map(|slot| slot.entry.take())
            .map(|entry| Removed {
                run_release: entry.state != EntryState::Ended
                    && matches!(entry.mode, Ownership::Owned | Ownership::Shared),
                payload: entry.payload,
            })
            .collect();

        self.slots.clear();
        self.free.clear();
        self.keys.clear();
        removed
    }

    fn stats(&self) -> PointerStats {
        let mut stats = PointerStats::default();
        for entry in self.slots.iter().filter_map(|slot| slot.entry.as_ref()) {
            match entry.mode {
                Ownership::Borrowed => stats.borrowed += 1,
                Ownership::Owned => stats.owned += 1,
                Ownership::Shared => stats.shared += 1,
                Ownership::EngineOwned => stats.engine_owned += 1,
                Ownership::HostAllocated => stats.host_allocated += 1,
            }
            match entry.state {
                EntryState::Live => stats.live += 1,
                EntryState::Pinned => stats.pinned += 1,
                EntryState::Ended => stats.ended += 1,
            }
        }
        stats
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    thread_local! {
        static RELEASED: Cell<u32> = const { Cell::new(0) };
        static LAST_RELEASED: Cell<u64> = const { Cell::new(0) };
    }

    unsafe fn count_release(raw: *mut u64) {
        RELEASED.with(|c| c.set(c.get() + 1));
        LAST_RELEASED.with(|c| c.set(*raw));
    }

    // Release that re-enters the table, like an engine free callback would.
    unsafe fn reentrant_release(raw: *mut u64) {
        invalidate_key(*raw as usize);
        let inner = new(0u8, Ownership::Owned, None);
        end(inner).unwrap();
        count_release(raw);
    }

    fn released() -> u32 {
        RELEASED.with(|c| c.replace(0))
    }

    #[test]
    fn new_get_end() {
        released();
        let h = new(7u64, Ownership::Owned, Some(count_release));
        let ptr = get(&h).unwrap();
        assert_eq!(unsafe { *ptr.as_ptr() }, 7);

        let id = h.id();
        assert!(is_valid(id));

        end(h).unwrap();
        assert_eq!(released(), 1);
        assert!(!is_valid(id));
    }

    #[test]
    fn recycled_slot_never_resolves_old_stamp() {
        let old = new(1u64, Ownership::Owned, None);
        let old_id = old.id();
        end(old).unwrap();

        let fresh = new(2u64, Ownership::Owned, None);
        assert_eq!(fresh.id().index, old_id.index, "slot should be reused");
        assert_ne!(fresh.id().stamp, old_id.stamp);
        assert!(!is_valid(old_id));
        assert!(is_valid(fresh.id()));
        end(fresh).unwrap();
    }

    #[test]
    fn surviving_holder_fails_cleanly_after_invalidation() {
        released();
        let (a, lookup) = new_keyed(0xBEEF, 0xBEEFu64, Ownership::EngineOwned, None);
        assert_eq!(lookup, Lookup::Inserted);
        let b = share(&a).unwrap();

        assert!(invalidate_key(0xBEEF));
        end(a).unwrap();

        assert_eq!(get(&b), Err(PointerError::Ended { index: b.id().index }));
        assert_eq!(state(&b), Ok(EntryState::Ended));
        end(b).unwrap();
        assert_eq!(released(), 0);
    }

    #[test]
    fn keyed_entries_deduplicate() {
        released();
        let (a, first) = new_keyed(0x1000, 5u64, Ownership::Shared, Some(count_release));
        let (b, second) = new_keyed(0x1000, 5u64, Ownership::Shared, Some(count_release));

        assert_eq!(first, Lookup::Inserted);
        assert_eq!(second, Lookup::Found);
        assert_eq!(a.id(), b.id());
        assert_eq!(holders(&a), Ok(2));

        end(a).unwrap();
        assert_eq!(released(), 0);
        end(b).unwrap();
        assert_eq!(released(), 1);

        let (c, third) = new_keyed(0x1000, 5u64, Ownership::Shared, None);
        assert_eq!(third, Lookup::Inserted);
        end(c).unwrap();
    }

    #[test]
    fn ended_key_is_replaced_by_new_object() {
        let (dead, _) = new_keyed(0x2000, 1u64, Ownership::EngineOwned, None);
        invalidate_key(0x2000);

        let (alive, lookup) = new_keyed(0x2000, 2u64, Ownership::EngineOwned, None);
        assert_eq!(lookup, Lookup::Inserted);
        assert_ne!(dead.id(), alive.id());
        assert!(!is_valid(dead.id()));
        assert!(is_valid(alive.id()));

        end(dead).unwrap();
        end(alive).unwrap();
    }

    #[test]
    fn host_allocated_ended_by_key() {
        thread_local! {
            static FREED: Cell<u32> = const { Cell::new(0) };
        }

        struct List(#[allow(dead_code)] Box<[u32]>);
        impl Drop for List {
            fn drop(&mut self) {
                FREED.with(|f| f.set(f.get() + 1));
            }
        }

        let list = List(vec![1, 2].into_boxed_slice());
        let key = list.0.as_ptr() as usize;
        let (h, _) = new_keyed(key, list, Ownership::HostAllocated, None);
        let id = h.id();
        std::mem::forget(h);

        end_keyed(key).unwrap();
        assert_eq!(FREED.with(Cell::get), 1);
        assert!(!is_valid(id));
        assert!(end_keyed(key).is_err());
    }

    #[test]
    fn owned_entries_cannot_be_shared() {
        let h = new(1u64, Ownership::Owned, None);
        assert_eq!(
            share(&h).unwrap_err(),
            PointerError::NotShareable {
                mode: Ownership::Owned
            }
        );
        end(h).unwrap();
    }

    #[test]
    fn cycle_reclaims_only_live_borrowed() {
        released();
        let borrowed = new(1u64, Ownership::Borrowed, Some(count_release));
        let pinned = new(2u64, Ownership::Borrowed, None);
        pin(&pinned).unwrap();
        let owned = new(3u64, Ownership::Owned, Some(count_release));
        let (engine, _) = new_keyed(0x3000, 4u64, Ownership::EngineOwned, None);

        let before = epoch();
        let after = cycle();
        assert!(after > before);

        assert!(matches!(get(&borrowed), Err(PointerError::Stale { .. })));
        assert!(get(&pinned).is_ok());
        assert!(get(&owned).is_ok());
        assert!(get(&engine).is_ok());
        assert_eq!(released(), 0, "borrowed entries never release");

        assert!(end(borrowed).is_err());
        end(pinned).unwrap();
        end(owned).unwrap();
        end(engine).unwrap();
        assert_eq!(released(), 1);
    }

    #[test]
    fn release_runs_outside_table_borrow() {
        released();
        let (h, _) = new_keyed(0x4000, 0x4000u64, Ownership::Shared, Some(reentrant_release));
        end(h).unwrap();
        assert_eq!(released(), 1);
        assert_eq!(LAST_RELEASED.with(Cell::get), 0x4000);
    }

    #[test]
    fn host_allocated_returns_to_allocator() {
        thread_local! {
            static DROPS: Cell<u32> = const { Cell::new(0) };
        }

        struct Buffer(#[allow(dead_code)] Vec<u8>);
        impl Drop for Buffer {
            fn drop(&mut self) {
                DROPS.with(|d| d.set(d.get() + 1));
            }
        }

        let h = new(Buffer(vec![1, 2, 3]), Ownership::HostAllocated, None);
        assert_eq!(DROPS.with(Cell::get), 0);
        end(h).unwrap();
        assert_eq!(DROPS.with(Cell::get), 1);
    }

    #[test]
    fn teardown_releases_owned_and_shared_once() {
        teardown();
        released();

        let owned = new(1u64, Ownership::Owned, Some(count_release));
        let (shared, _) = new_keyed(0x5000, 2u64, Ownership::Shared, Some(count_release));
        let extra = share(&shared).unwrap();
        let borrowed = new(3u64, Ownership::Borrowed, Some(count_release));
        let (engine, _) = new_keyed(0x6000, 4u64, Ownership::EngineOwned, Some(count_release));

        assert_eq!(teardown(), 2);
        assert_eq!(released(), 2);
        assert_eq!(stats().total(), 0);

        for h in [owned, shared, extra, borrowed, engine] {
            assert!(matches!(get(&h), Err(PointerError::Stale { .. })));
            assert!(end(h).is_err());
        }
        assert_eq!(released(), 0);
    }

    #[test]
    fn stats_track_modes_and_states() {
        teardown();
        let a = new(1u64, Ownership::Owned, None);
        let b = new(2u64, Ownership::Borrowed, None);
        pin(&b).unwrap();
        let (c, _) = new_keyed(0x7000, 3u64, Ownership::EngineOwned, None);
        invalidate_key(0x7000);

        let stats = stats();
        assert_eq!(stats.owned, 1);
        assert_eq!(stats.borrowed, 1);
        assert_eq!(stats.engine_owned, 1);
        assert_eq!(stats.live, 1);
        assert_eq!(stats.pinned, 1);
        assert_eq!(stats.ended, 1);

        for h in [a, b, c] {
            end(h).unwrap();
        }
        assert_eq!(self::stats(), PointerStats::default());
    }

    #[test]
    fn typed_access_is_checked() {
        let h = new(1u64, Ownership::Owned, None);
        let forged: Handle<u32> = Handle::new(h.id().index, h.id().stamp);
        assert!(matches!(get(&forged), Err(PointerError::TypeMismatch { .. })));
        end(h).unwrap();
    }

    mod props {
        use super::super::*;
        use proptest::prelude::*;

        #[derive(Clone, Debug)]
        enum Op {
            New,
            End(usize),
            Cycle,
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                3 => Just(Op::New),
                3 => any::<usize>().prop_map(Op::End),
                1 => Just(Op::Cycle),
            ]
        }

        proptest! {
            #[test]
            fn ended_handles_never_resolve(ops in proptest::collection::vec(op(), 1..64)) {
                teardown();
                let mut live: Vec<(Handle<u64>, Ownership)> = Vec::new();
                let mut dead: Vec<HandleId> = Vec::new();

                for (i, op) in ops.into_iter().enumerate() {
                    match op {
                        Op::New => {
                            let mode = if i % 2 == 0 { Ownership::Owned } else { Ownership::Borrowed };
                            live.push((new(i as u64, mode, None), mode));
                        }
                        Op::End(pick) if !live.is_empty() => {
                            let (h, _) = live.swap_remove(pick % live.len());
                            dead.push(h.id());
                            end(h).unwrap();
                        }
                        Op::End(_) => {}
                        Op::Cycle => {
                            cycle();
                            let (borrowed, kept): (Vec<_>, Vec<_>) =
                                live.into_iter().partition(|(_, mode)| *mode == Ownership::Borrowed);
                            dead.extend(borrowed.iter().map(|(h, _)| h.id()));
                            live = kept;
                        }
                    }

                    for id in &dead {
                        prop_assert!(!is_valid(*id));
                    }
                    for (h, _) in &live {
                        prop_assert!(get(h).is_ok());
                    }
                }

                for (h, _) in live {
                    end(h).unwrap();
                }
            }
        }
    }
}
