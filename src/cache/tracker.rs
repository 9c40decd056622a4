//! # Eviction Tracker
//!
//! In-process LRU bookkeeping for the cache facade: a doubly-linked recency
//! list over a slab of slots plus an id-to-slot map. Index-based links keep
//! the structure free of raw pointers and cyclic ownership; vacated slots are
//! recycled through a free list.
//!
//! The head of the list is the most-recently-used id, the tail the next
//! eviction candidate. Each tracked entry also carries the status the id was
//! last written with, so eviction and status transitions can clean the right
//! status set without a remote read.
//!
//! Not safe for unsynchronized concurrent mutation; the facade serializes
//! access behind its per-instance lock.

use std::collections::HashMap;

/// Index into the slot arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SlotIdx(u32);

#[derive(Debug)]
struct Slot {
    id: String,
    status: String,
    prev: Option<SlotIdx>,
    next: Option<SlotIdx>,
}

/// Outcome of a [`EvictionTracker::touch`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Touch {
    /// The id was not tracked and has been inserted at the head.
    Inserted,
    /// The id was already tracked; it moved to the head and its stored
    /// status was refreshed.
    Refreshed,
}

#[derive(Debug)]
pub struct EvictionTracker {
    slots: Vec<Option<Slot>>,
    free: Vec<u32>,
    head: Option<SlotIdx>,
    tail: Option<SlotIdx>,
    index: HashMap<String, SlotIdx>,
    capacity: usize,
}

impl EvictionTracker {
    /// Create a tracker bounding the cache at `capacity` ids.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity.saturating_add(1)),
            free: Vec::new(),
            head: None,
            tail: None,
            index: HashMap::with_capacity(capacity.saturating_add(1)),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Status the id was last written with, if tracked.
    pub fn status_of(&self, id: &str) -> Option<&str> {
        let idx = *self.index.get(id)?;
        Some(self.slot(idx).status.as_str())
    }

    /// Mark `id` most-recently-used, inserting it at the head if absent.
    /// The stored status is refreshed either way.
    pub fn touch(&mut self, id: &str, status: &str) -> Touch {
        if let Some(&idx) = self.index.get(id) {
            self.unlink(idx);
            self.link_front(idx);
            self.slot_mut(idx).status = status.to_string();
            return Touch::Refreshed;
        }

        let idx = self.alloc(Slot {
            id: id.to_string(),
            status: status.to_string(),
            prev: None,
            next: None,
        });
        self.link_front(idx);
        self.index.insert(id.to_string(), idx);
        Touch::Inserted
    }

    /// Move `id` to the head without touching its stored status. A miss is
    /// a no-op: reads never re-register ids the tracker does not know about.
    pub fn promote(&mut self, id: &str) -> bool {
        let Some(&idx) = self.index.get(id) else {
            return false;
        };
        self.unlink(idx);
        self.link_front(idx);
        true
    }

    /// Detach `id` unconditionally. Returns false when it was not tracked.
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(idx) = self.index.remove(id) else {
            return false;
        };
        self.unlink(idx);
        self.release(idx);
        true
    }

    /// Pop the least-recently-used entry, but only while the tracked count
    /// exceeds capacity. Returns the evicted `(id, status)`.
    ///
    /// Capacity is checked after insertion, so a pure refresh of an existing
    /// id never triggers eviction.
    pub fn evict_if_over_capacity(&mut self) -> Option<(String, String)> {
        if self.len() <= self.capacity {
            return None;
        }
        let idx = self.tail?;
        self.unlink(idx);
        let slot = self.release(idx);
        self.index.remove(&slot.id);
        Some((slot.id, slot.status))
    }

    /// Ids ordered most- to least-recently-used.
    pub fn ids_by_recency(&self) -> Vec<&str> {
        let mut out = Vec::with_capacity(self.len());
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let slot = self.slot(idx);
            out.push(slot.id.as_str());
            cursor = slot.next;
        }
        out
    }

    fn alloc(&mut self, slot: Slot) -> SlotIdx {
        if let Some(raw) = self.free.pop() {
            self.slots[raw as usize] = Some(slot);
            SlotIdx(raw)
        } else {
            let raw = u32::try_from(self.slots.len()).expect("tracker slot arena overflow");
            self.slots.push(Some(slot));
            SlotIdx(raw)
        }
    }

    fn release(&mut self, idx: SlotIdx) -> Slot {
        let slot = self.slots[idx.0 as usize]
            .take()
            .expect("release of vacant tracker slot");
        self.free.push(idx.0);
        slot
    }

    fn link_front(&mut self, idx: SlotIdx) {
        let old_head = self.head;
        {
            let slot = self.slot_mut(idx);
            slot.prev = None;
            slot.next = old_head;
        }
        if let Some(old) = old_head {
            self.slot_mut(old).prev = Some(idx);
        } else {
            self.tail = Some(idx);
        }
        self.head = Some(idx);
    }

    fn unlink(&mut self, idx: SlotIdx) {
        let (prev, next) = {
            let slot = self.slot(idx);
            (slot.prev, slot.next)
        };
        match prev {
            Some(p) => self.slot_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slot_mut(n).prev = prev,
            None => self.tail = prev,
        }
        let slot = self.slot_mut(idx);
        slot.prev = None;
        slot.next = None;
    }

    fn slot(&self, idx: SlotIdx) -> &Slot {
        self.slots[idx.0 as usize]
            .as_ref()
            .expect("dangling tracker slot index")
    }

    fn slot_mut(&mut self, idx: SlotIdx) -> &mut Slot {
        self.slots[idx.0 as usize]
            .as_mut()
            .expect("dangling tracker slot index")
    }
}
