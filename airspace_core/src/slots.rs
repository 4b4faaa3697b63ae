// Copyright 2026 the Airspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generational slot storage for engine objects.
//!
//! Freed slots are recycled through a free list and their generation counter
//! is bumped, so handles to disposed objects fail lookup instead of aliasing
//! whatever reuses the slot.

use alloc::vec::Vec;
use core::marker::PhantomData;

use crate::id::SlotKey;

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slot storage addressed by generational keys of type `K`.
#[derive(Debug)]
pub(crate) struct Slots<K, T> {
    slots: Vec<Slot<T>>,
    free_list: Vec<u32>,
    _key: PhantomData<K>,
}

impl<K: SlotKey, T> Default for Slots<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: SlotKey, T> Slots<K, T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            _key: PhantomData,
        }
    }

    /// Stores `value` and returns its handle.
    pub(crate) fn insert(&mut self, value: T) -> K {
        if let Some(idx) = self.free_list.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.generation += 1;
            slot.value = Some(value);
            K::from_parts(idx, slot.generation)
        } else {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "engine objects never approach u32::MAX"
            )]
            let idx = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                value: Some(value),
            });
            K::from_parts(idx, 0)
        }
    }

    /// Removes and returns the value for `key`, if it is still live.
    pub(crate) fn remove(&mut self, key: K) -> Option<T> {
        let slot = self.slots.get_mut(key.idx() as usize)?;
        if slot.generation != key.generation() {
            return None;
        }
        let value = slot.value.take()?;
        self.free_list.push(key.idx());
        Some(value)
    }

    pub(crate) fn get(&self, key: K) -> Option<&T> {
        let slot = self.slots.get(key.idx() as usize)?;
        if slot.generation == key.generation() {
            slot.value.as_ref()
        } else {
            None
        }
    }

    pub(crate) fn get_mut(&mut self, key: K) -> Option<&mut T> {
        let slot = self.slots.get_mut(key.idx() as usize)?;
        if slot.generation == key.generation() {
            slot.value.as_mut()
        } else {
            None
        }
    }

    pub(crate) fn contains(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    /// Iterates live entries in slot order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (K, &T)> {
        self.slots.iter().enumerate().filter_map(|(idx, slot)| {
            let value = slot.value.as_ref()?;
            #[expect(
                clippy::cast_possible_truncation,
                reason = "engine objects never approach u32::MAX"
            )]
            let idx = idx as u32;
            Some((K::from_parts(idx, slot.generation), value))
        })
    }

    /// Collects the keys of live entries matching `pred`.
    ///
    /// Returned as an owned list so callers can mutate the storage while
    /// walking the matches.
    pub(crate) fn keys_where(&self, mut pred: impl FnMut(&T) -> bool) -> Vec<K> {
        self.iter()
            .filter_map(|(key, value)| pred(value).then_some(key))
            .collect()
    }
}
