// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! GUID-keyed per-object metadata storage.

use std::sync::RwLock;

/// A 128-bit key identifying one metadata channel on an object.
///
/// Stored as two 64-bit halves; byte-oriented producers (addon ABIs hand
/// GUIDs around as 16 raw bytes) convert losslessly via
/// [`Guid::from_bytes`]. [`uuid::Uuid`] converts via `From`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Guid([u64; 2]);

impl Guid {
    /// Creates a key from its two 64-bit halves.
    pub const fn from_halves(lo: u64, hi: u64) -> Self {
        Self([lo, hi])
    }

    /// Creates a key from its 16-byte representation.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytemuck::cast(bytes))
    }

    /// Returns the 16-byte representation of this key.
    pub fn to_bytes(self) -> [u8; 16] {
        bytemuck::cast(self.0)
    }

    /// Returns the two 64-bit halves of this key.
    pub const fn halves(self) -> [u64; 2] {
        self.0
    }
}

impl From<uuid::Uuid> for Guid {
    fn from(value: uuid::Uuid) -> Self {
        Self::from_bytes(*value.as_bytes())
    }
}

/// One metadata entry: a 128-bit key mapped to a non-zero 64-bit value.
#[derive(Debug, Clone, Copy)]
struct MetadataEntry {
    key: Guid,
    value: u64,
}

/// A per-object mapping from [`Guid`] keys to 64-bit values.
///
/// The entry count is expected to stay small (a handful of addon-attached
/// tags per object), so lookup is a linear scan over a `Vec` rather than a
/// hashed index. A value of `0` means "absent": setting a key to `0`
/// erases its entry, and reading an absent key yields `0`. Mutation goes
/// through `&self` so the store can live inside shared device/queue
/// objects; a single `RwLock` guards the entry list.
#[derive(Debug, Default)]
pub struct MetadataStore {
    entries: RwLock<Vec<MetadataEntry>>,
}

impl MetadataStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `key`, or `0` if absent.
    pub fn get(&self, key: &Guid) -> u64 {
        let entries = self.entries.read().unwrap();
        entries
            .iter()
            .find(|entry| entry.key == *key)
            .map_or(0, |entry| entry.value)
    }

    /// Stores `value` under `key`.
    ///
    /// Overwrites an existing entry, or appends a new one. Setting `0`
    /// erases the entry (if any); entries with value `0` are never stored.
    pub fn set(&self, key: &Guid, value: u64) {
        let mut entries = self.entries.write().unwrap();
        if let Some(position) = entries.iter().position(|entry| entry.key == *key) {
            if value != 0 {
                entries[position].value = value;
            } else {
                entries.remove(position);
            }
        } else if value != 0 {
            entries.push(MetadataEntry { key: *key, value });
        }
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Returns `true` if no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(n: u8) -> Guid {
        Guid::from_bytes([n; 16])
    }

    #[test]
    fn absent_key_reads_zero() {
        let store = MetadataStore::new();
        assert_eq!(store.get(&key(1)), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn set_then_get_round_trips() {
        let store = MetadataStore::new();
        store.set(&key(1), 0xDEAD);
        store.set(&key(2), 0xBEEF);
        assert_eq!(store.get(&key(1)), 0xDEAD);
        assert_eq!(store.get(&key(2)), 0xBEEF);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn overwrite_keeps_single_entry_with_latest_value() {
        let store = MetadataStore::new();
        store.set(&key(1), 17);
        store.set(&key(1), 42);
        assert_eq!(store.get(&key(1)), 42);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn set_zero_erases_entry() {
        let store = MetadataStore::new();
        store.set(&key(1), 7);
        assert_eq!(store.len(), 1);
        store.set(&key(1), 0);
        assert_eq!(store.get(&key(1)), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn set_zero_on_absent_key_is_noop() {
        let store = MetadataStore::new();
        store.set(&key(9), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn guid_byte_and_half_views_agree() {
        let uuid = uuid::Uuid::new_v4();
        let from_uuid = Guid::from(uuid);
        let from_bytes = Guid::from_bytes(*uuid.as_bytes());
        assert_eq!(from_uuid, from_bytes);
        assert_eq!(from_uuid.to_bytes(), *uuid.as_bytes());

        let halved = Guid::from_halves(from_uuid.halves()[0], from_uuid.halves()[1]);
        assert_eq!(halved, from_uuid);
    }
}
