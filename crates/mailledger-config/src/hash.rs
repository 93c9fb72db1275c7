//! Open-hashing table with chained buckets.
//!
//! The table never resizes: capacity is fixed at creation and overflow is
//! absorbed by the bucket chains, so a badly sized table only costs lookup
//! time, never correctness.
//!
//! Entries are addressed through [`Handle`]s, which stay valid until the entry
//! is deleted. A handle to a deleted entry is detected and rejected even if its
//! slot has since been reused.
//!
//! Each table may carry one destructor, called for every entry that leaves the
//! table through [`HashTable::delete`], [`HashTable::remove`] or
//! [`HashTable::clear`]. The destructor receives a caller-supplied context
//! value so it can dispatch on the entry's type tag without the table knowing
//! anything about it.

use std::cmp::Ordering;
use std::fmt;

use bitflags::bitflags;

/// Multiplier folding the string accumulator into the bucket range.
const HASH_PRIME: u64 = 149_711;

bitflags! {
    /// Behaviour switches fixed at table creation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct HashFlags: u8 {
        /// Compare and hash string keys ignoring ASCII case.
        const CASE_INSENSITIVE = 1 << 0;
        /// Allow several entries with the same key.
        const ALLOW_DUPLICATES = 1 << 1;
    }
}

/// Owned key stored in the table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HashKey {
    /// String key.
    Str(String),
    /// Integer key.
    Int(u64),
}

impl HashKey {
    /// Borrows the key for lookups.
    #[must_use]
    pub fn as_key_ref(&self) -> KeyRef<'_> {
        match self {
            Self::Str(s) => KeyRef::Str(s),
            Self::Int(n) => KeyRef::Int(*n),
        }
    }

    /// Returns the string key, if this is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            Self::Int(_) => None,
        }
    }
}

impl fmt::Display for HashKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{s}"),
            Self::Int(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for HashKey {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for HashKey {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<u64> for HashKey {
    fn from(n: u64) -> Self {
        Self::Int(n)
    }
}

/// Borrowed key used for lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyRef<'a> {
    /// String key.
    Str(&'a str),
    /// Integer key.
    Int(u64),
}

impl<'a> From<&'a str> for KeyRef<'a> {
    fn from(s: &'a str) -> Self {
        Self::Str(s)
    }
}

impl<'a> From<&'a String> for KeyRef<'a> {
    fn from(s: &'a String) -> Self {
        Self::Str(s)
    }
}

impl From<u64> for KeyRef<'_> {
    fn from(n: u64) -> Self {
        Self::Int(n)
    }
}

impl<'a> From<&'a HashKey> for KeyRef<'a> {
    fn from(key: &'a HashKey) -> Self {
        key.as_key_ref()
    }
}

/// Stable reference to an entry in a [`HashTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    index: u32,
    generation: u32,
}

/// One stored item.
#[derive(Debug)]
pub struct HashElem<T> {
    /// Caller-defined type tag; opaque to the table.
    pub type_tag: u32,
    key: HashKey,
    /// Payload.
    pub data: T,
}

impl<T> HashElem<T> {
    /// Returns the entry's key.
    #[must_use]
    pub const fn key(&self) -> &HashKey {
        &self.key
    }
}

/// Returned when inserting a key that already exists in a unique table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Duplicate key: {0}")]
pub struct DuplicateKey(pub HashKey);

/// Per-entry destructor, given the caller's context value.
pub type Destructor<T, C> = fn(&mut HashElem<T>, &C);

struct Slot<T> {
    generation: u32,
    elem: Option<HashElem<T>>,
}

/// Cursor for [`HashTable::walk`].
///
/// A fresh (or [`reset`](Walk::reset)) cursor starts at bucket 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Walk {
    bucket: usize,
    pos: usize,
}

impl Walk {
    /// Creates a cursor positioned before the first entry.
    #[must_use]
    pub const fn new() -> Self {
        Self { bucket: 0, pos: 0 }
    }

    /// Rewinds the cursor to the start of the table.
    pub const fn reset(&mut self) {
        self.bucket = 0;
        self.pos = 0;
    }
}

/// Fixed-capacity hash table with chained buckets.
///
/// `C` is the context type handed to the destructor.
pub struct HashTable<T, C = ()> {
    flags: HashFlags,
    buckets: Vec<Vec<u32>>,
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
    destructor: Option<Destructor<T, C>>,
}

impl<T, C> fmt::Debug for HashTable<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashTable")
            .field("flags", &self.flags)
            .field("capacity", &self.buckets.len())
            .field("len", &self.len)
            .field("destructor", &self.destructor.is_some())
            .finish()
    }
}

impl<T, C> HashTable<T, C> {
    /// Creates a table with `capacity` buckets.
    ///
    /// A capacity of zero is bumped to two.
    #[must_use]
    pub fn new(capacity: usize, flags: HashFlags) -> Self {
        let capacity = if capacity == 0 { 2 } else { capacity };
        Self {
            flags,
            buckets: vec![Vec::new(); capacity],
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
            destructor: None,
        }
    }

    /// Sets the destructor invoked on every entry leaving the table.
    #[must_use]
    pub fn with_destructor(mut self, destructor: Destructor<T, C>) -> Self {
        self.destructor = Some(destructor);
        self
    }

    /// Returns the number of buckets.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the table holds no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the table's flags.
    #[must_use]
    pub const fn flags(&self) -> HashFlags {
        self.flags
    }

    /// Returns the bucket a key hashes to.
    #[must_use]
    pub fn bucket_of<'k>(&self, key: impl Into<KeyRef<'k>>) -> usize {
        let size = self.buckets.len() as u64;
        let hash = match key.into() {
            KeyRef::Str(s) => {
                let fold = self.flags.contains(HashFlags::CASE_INSENSITIVE);
                let mut h: u64 = 0;
                for b in s.bytes() {
                    let c = if fold { b.to_ascii_lowercase() } else { b };
                    h = h.wrapping_mul(7).wrapping_add(u64::from(c));
                }
                h.wrapping_mul(HASH_PRIME) % size
            }
            KeyRef::Int(n) => n % size,
        };
        // hash < size, and size came from a usize
        usize::try_from(hash).unwrap_or_default()
    }

    fn cmp_keys(&self, a: KeyRef<'_>, b: KeyRef<'_>) -> Ordering {
        match (a, b) {
            (KeyRef::Str(a), KeyRef::Str(b)) => {
                if self.flags.contains(HashFlags::CASE_INSENSITIVE) {
                    a.bytes()
                        .map(|c| c.to_ascii_lowercase())
                        .cmp(b.bytes().map(|c| c.to_ascii_lowercase()))
                } else {
                    a.cmp(b)
                }
            }
            (KeyRef::Int(a), KeyRef::Int(b)) => a.cmp(&b),
            (KeyRef::Str(_), KeyRef::Int(_)) => Ordering::Less,
            (KeyRef::Int(_), KeyRef::Str(_)) => Ordering::Greater,
        }
    }

    fn elem_at(&self, index: u32) -> Option<&HashElem<T>> {
        self.slots.get(index as usize).and_then(|s| s.elem.as_ref())
    }

    fn handle_at(&self, index: u32) -> Handle {
        let generation = self.slots.get(index as usize).map_or(0, |s| s.generation);
        Handle { index, generation }
    }

    fn alloc(&mut self, elem: HashElem<T>) -> u32 {
        if let Some(index) = self.free.pop() {
            self.slots[index as usize].elem = Some(elem);
            index
        } else {
            let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
            self.slots.push(Slot {
                generation: 0,
                elem: Some(elem),
            });
            index
        }
    }

    fn release(&mut self, index: u32) -> Option<HashElem<T>> {
        let slot = self.slots.get_mut(index as usize)?;
        let elem = slot.elem.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        self.len -= 1;
        Some(elem)
    }

    /// Inserts an entry.
    ///
    /// Unique tables keep each chain sorted by key; tables allowing duplicates
    /// put new entries at the head of the chain.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateKey`] if the key exists and duplicates are not allowed.
    pub fn insert(
        &mut self,
        key: impl Into<HashKey>,
        type_tag: u32,
        data: T,
    ) -> Result<Handle, DuplicateKey> {
        let key = key.into();
        let bucket = self.bucket_of(&key);

        let pos = if self.flags.contains(HashFlags::ALLOW_DUPLICATES) {
            0
        } else {
            let chain = &self.buckets[bucket];
            let mut pos = chain.len();
            for (i, &index) in chain.iter().enumerate() {
                let Some(existing) = self.elem_at(index) else {
                    continue;
                };
                match self.cmp_keys(existing.key.as_key_ref(), key.as_key_ref()) {
                    Ordering::Equal => return Err(DuplicateKey(key)),
                    Ordering::Greater => {
                        pos = i;
                        break;
                    }
                    Ordering::Less => {}
                }
            }
            pos
        };

        let index = self.alloc(HashElem {
            type_tag,
            key,
            data,
        });
        self.buckets[bucket].insert(pos, index);
        self.len += 1;
        Ok(self.handle_at(index))
    }

    /// Finds the first entry with this key, in chain order.
    #[must_use]
    pub fn find<'k>(&self, key: impl Into<KeyRef<'k>>) -> Option<Handle> {
        let key = key.into();
        self.buckets[self.bucket_of(key)]
            .iter()
            .copied()
            .find(|&index| {
                self.elem_at(index)
                    .is_some_and(|e| self.cmp_keys(e.key.as_key_ref(), key) == Ordering::Equal)
            })
            .map(|index| self.handle_at(index))
    }

    /// Finds every entry with this key, in chain order.
    #[must_use]
    pub fn find_all<'k>(&self, key: impl Into<KeyRef<'k>>) -> Vec<Handle> {
        let key = key.into();
        self.buckets[self.bucket_of(key)]
            .iter()
            .copied()
            .filter(|&index| {
                self.elem_at(index)
                    .is_some_and(|e| self.cmp_keys(e.key.as_key_ref(), key) == Ordering::Equal)
            })
            .map(|index| self.handle_at(index))
            .collect()
    }

    /// Returns the entry behind a handle, if it is still live.
    #[must_use]
    pub fn get(&self, handle: Handle) -> Option<&HashElem<T>> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.elem.as_ref()
    }

    /// Returns the entry behind a handle mutably, if it is still live.
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut HashElem<T>> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.elem.as_mut()
    }

    /// Deletes every entry matching `key`, or only `only` if given.
    ///
    /// The destructor runs on each removed entry with `ctx`. Siblings in the
    /// same chain keep their relative order. Returns the number removed.
    pub fn delete<'k>(&mut self, key: impl Into<KeyRef<'k>>, only: Option<Handle>, ctx: &C) -> usize {
        let key = key.into();
        let bucket = self.bucket_of(key);

        let chain = std::mem::take(&mut self.buckets[bucket]);
        let (doomed, kept): (Vec<u32>, Vec<u32>) = chain.into_iter().partition(|&index| {
            let key_matches = self
                .elem_at(index)
                .is_some_and(|e| self.cmp_keys(e.key.as_key_ref(), key) == Ordering::Equal);
            key_matches && only.is_none_or(|h| h == self.handle_at(index))
        });
        self.buckets[bucket] = kept;

        let mut removed = 0;
        for index in doomed {
            if let Some(mut elem) = self.release(index) {
                if let Some(destroy) = self.destructor {
                    destroy(&mut elem, ctx);
                }
                removed += 1;
            }
        }
        removed
    }

    /// Deletes the entry behind `handle`. Returns false if it was not live.
    pub fn remove(&mut self, handle: Handle, ctx: &C) -> bool {
        let Some(key) = self.get(handle).map(|e| e.key.clone()) else {
            return false;
        };
        self.delete(&key, Some(handle), ctx) == 1
    }

    /// Deletes every entry, running the destructor on each.
    pub fn clear(&mut self, ctx: &C) {
        for bucket in 0..self.buckets.len() {
            for index in std::mem::take(&mut self.buckets[bucket]) {
                if let Some(mut elem) = self.release(index) {
                    if let Some(destroy) = self.destructor {
                        destroy(&mut elem, ctx);
                    }
                }
            }
        }
    }

    /// Advances `cursor` and returns the next entry.
    ///
    /// Entries come out bucket by bucket, in chain order within a bucket.
    /// Returns `None` once the table is exhausted; reset the cursor to walk
    /// again.
    pub fn walk(&self, cursor: &mut Walk) -> Option<Handle> {
        while cursor.bucket < self.buckets.len() {
            let chain = &self.buckets[cursor.bucket];
            if let Some(&index) = chain.get(cursor.pos) {
                cursor.pos += 1;
                return Some(self.handle_at(index));
            }
            cursor.bucket += 1;
            cursor.pos = 0;
        }
        None
    }

    /// Iterates over all entries in walk order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &HashElem<T>)> {
        let mut cursor = Walk::new();
        std::iter::from_fn(move || {
            let handle = self.walk(&mut cursor)?;
            self.get(handle).map(|elem| (handle, elem))
        })
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use std::cell::Cell;

    use proptest::prelude::*;

    use super::*;

    fn count_destroyed(_elem: &mut HashElem<u32>, ctx: &Cell<usize>) {
        ctx.set(ctx.get() + 1);
    }

    #[test]
    fn test_zero_capacity_is_bumped() {
        let table: HashTable<u32> = HashTable::new(0, HashFlags::empty());
        assert_eq!(table.capacity(), 2);
    }

    #[test]
    fn test_insert_and_find() {
        let mut table: HashTable<u32> = HashTable::new(16, HashFlags::empty());
        let apple = table.insert("Apple", 1, 10).unwrap();
        let banana = table.insert("Banana", 2, 20).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.find("Apple"), Some(apple));
        assert_eq!(table.find("Banana"), Some(banana));
        assert_eq!(table.find("Cherry"), None);
        assert_eq!(table.get(apple).unwrap().data, 10);
        assert_eq!(table.get(banana).unwrap().type_tag, 2);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut table: HashTable<u32> = HashTable::new(16, HashFlags::empty());
        table.insert("Apple", 1, 10).unwrap();
        let err = table.insert("Apple", 1, 11).unwrap_err();
        assert_eq!(err, DuplicateKey(HashKey::from("Apple")));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_duplicates_allowed_newest_first() {
        let mut table: HashTable<u32> = HashTable::new(16, HashFlags::ALLOW_DUPLICATES);
        let first = table.insert("Apple", 1, 10).unwrap();
        let second = table.insert("Apple", 1, 11).unwrap();

        assert_eq!(table.find("Apple"), Some(second));
        assert_eq!(table.find_all("Apple"), vec![second, first]);
    }

    #[test]
    fn test_case_insensitive() {
        let mut table: HashTable<u32> = HashTable::new(16, HashFlags::CASE_INSENSITIVE);
        let h = table.insert("Apple", 1, 10).unwrap();
        assert_eq!(table.find("APPLE"), Some(h));
        assert_eq!(table.find("apple"), Some(h));
        assert!(table.insert("aPPLE", 1, 11).is_err());
    }

    #[test]
    fn test_case_sensitive_by_default() {
        let mut table: HashTable<u32> = HashTable::new(16, HashFlags::empty());
        table.insert("Apple", 1, 10).unwrap();
        assert_eq!(table.find("apple"), None);
    }

    #[test]
    fn test_integer_keys() {
        let mut table: HashTable<&str> = HashTable::new(8, HashFlags::empty());
        let h = table.insert(42_u64, 0, "answer").unwrap();
        assert_eq!(table.bucket_of(42_u64), 42 % 8);
        assert_eq!(table.find(42_u64), Some(h));
        assert_eq!(table.find(43_u64), None);
    }

    #[test]
    fn test_colliding_keys_independent() {
        let ctx = Cell::new(0);
        let mut table: HashTable<u32, Cell<usize>> =
            HashTable::new(8, HashFlags::empty()).with_destructor(count_destroyed);

        // All of these land in bucket 3.
        let keys: Vec<u64> = (0..10).map(|i| 3 + i * 8).collect();
        for &k in &keys {
            table.insert(k, 0, u32::try_from(k).unwrap()).unwrap();
        }
        assert!(keys.iter().all(|&k| table.bucket_of(k) == 3));

        for &k in &keys {
            let h = table.find(k).unwrap();
            assert_eq!(u64::from(table.get(h).unwrap().data), k);
        }

        assert_eq!(table.delete(keys[4], None, &ctx), 1);
        assert_eq!(ctx.get(), 1);
        assert_eq!(table.find(keys[4]), None);
        for (i, &k) in keys.iter().enumerate() {
            if i != 4 {
                assert!(table.find(k).is_some(), "sibling {k} lost");
            }
        }
        assert_eq!(table.len(), keys.len() - 1);
    }

    #[test]
    fn test_single_bucket_strings() {
        let mut table: HashTable<usize> = HashTable::new(1, HashFlags::empty());
        let names = ["Apple", "Banana", "Cherry", "Damson", "Elderberry"];
        for (i, name) in names.iter().enumerate() {
            table.insert(*name, 0, i).unwrap();
        }
        for (i, name) in names.iter().enumerate() {
            assert_eq!(table.get(table.find(*name).unwrap()).unwrap().data, i);
        }

        // Unique chains are kept sorted
        let walked: Vec<String> = table.iter().map(|(_, e)| e.key().to_string()).collect();
        assert_eq!(walked, names);
    }

    #[test]
    fn test_delete_with_filter() {
        let ctx = Cell::new(0);
        let mut table: HashTable<u32, Cell<usize>> =
            HashTable::new(4, HashFlags::ALLOW_DUPLICATES).with_destructor(count_destroyed);
        let first = table.insert("Apple", 0, 1).unwrap();
        let second = table.insert("Apple", 0, 2).unwrap();

        assert_eq!(table.delete("Apple", Some(first), &ctx), 1);
        assert_eq!(table.find_all("Apple"), vec![second]);

        table.insert("Apple", 0, 3).unwrap();
        assert_eq!(table.delete("Apple", None, &ctx), 2);
        assert!(table.is_empty());
        assert_eq!(ctx.get(), 3);
    }

    #[test]
    fn test_stale_handle_rejected() {
        let mut table: HashTable<u32> = HashTable::new(4, HashFlags::empty());
        let old = table.insert("Apple", 0, 1).unwrap();
        assert!(table.remove(old, &()));
        let new = table.insert("Banana", 0, 2).unwrap();

        assert!(table.get(old).is_none());
        assert!(!table.remove(old, &()));
        assert_eq!(table.get(new).unwrap().data, 2);
    }

    #[test]
    fn test_walk_bucket_order_and_restart() {
        let mut table: HashTable<u64> = HashTable::new(4, HashFlags::empty());
        for k in [6_u64, 1, 4, 3] {
            table.insert(k, 0, k).unwrap();
        }

        let mut cursor = Walk::new();
        let mut seen = Vec::new();
        while let Some(h) = table.walk(&mut cursor) {
            seen.push(table.get(h).unwrap().data);
        }
        assert_eq!(seen, vec![4, 1, 6, 3]);
        assert_eq!(table.walk(&mut cursor), None);

        cursor.reset();
        assert!(table.walk(&mut cursor).is_some());
    }

    #[test]
    fn test_clear_runs_destructor() {
        let ctx = Cell::new(0);
        let mut table: HashTable<u32, Cell<usize>> =
            HashTable::new(4, HashFlags::empty()).with_destructor(count_destroyed);
        for k in 0..5_u64 {
            table.insert(k, 0, 0).unwrap();
        }
        table.clear(&ctx);
        assert_eq!(ctx.get(), 5);
        assert!(table.is_empty());
        assert_eq!(table.iter().count(), 0);
    }

    proptest! {
        #[test]
        fn prop_every_inserted_key_is_found(keys in proptest::collection::hash_set("[a-zA-Z_]{1,12}", 1..64)) {
            let mut table: HashTable<usize> = HashTable::new(7, HashFlags::empty());
            let keys: Vec<String> = keys.into_iter().collect();
            for (i, k) in keys.iter().enumerate() {
                table.insert(k.as_str(), 0, i).unwrap();
            }
            prop_assert_eq!(table.len(), keys.len());
            for (i, k) in keys.iter().enumerate() {
                let h = table.find(k).unwrap();
                prop_assert_eq!(table.get(h).unwrap().data, i);
            }
            prop_assert_eq!(table.iter().count(), keys.len());
        }

        #[test]
        fn prop_delete_leaves_siblings(keys in proptest::collection::hash_set(0_u64..1000, 2..40), pick in any::<prop::sample::Index>()) {
            let mut table: HashTable<u64> = HashTable::new(3, HashFlags::empty());
            let keys: Vec<u64> = keys.into_iter().collect();
            for &k in &keys {
                table.insert(k, 0, k).unwrap();
            }
            let victim = keys[pick.index(keys.len())];
            prop_assert_eq!(table.delete(victim, None, &()), 1);
            for &k in &keys {
                prop_assert_eq!(table.find(k).is_some(), k != victim);
            }
        }
    }
}
