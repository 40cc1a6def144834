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

//! Handle-addressed side-data storage.
//!
//! Backends persist a bookkeeping record (resource dimensions, view
//! format, pipeline bind layout, ...) alongside every native handle they
//! hand out. Records live in a generation-checked arena and are addressed
//! through a hashed raw-handle → arena-key map, so a lookup after
//! `unregister` observes `None` instead of a dangling pointer, and a
//! fresh `register` of a recycled native handle can never alias the old
//! record. Each registry owns its records exclusively: they are created
//! on registration and dropped on unregistration, nowhere else.

use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use std::any::Any;
use std::sync::RwLock;

use crate::object::NativeHandle;

slotmap::new_key_type! {
    /// Generation-checked index of one record in a registry arena.
    pub struct RecordKey;
}

/// The closed set of object kinds the facade hands out handles for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// A buffer or texture.
    Resource,
    /// A view over (a subrange of) a resource.
    ResourceView,
    /// A texture sampler.
    Sampler,
    /// A compiled pipeline state object.
    Pipeline,
    /// A pipeline binding layout.
    PipelineLayout,
    /// A descriptor set.
    DescriptorSet,
    /// A pool descriptor sets are allocated from.
    DescriptorPool,
    /// A pool of GPU queries.
    QueryPool,
    /// A command submission queue.
    Queue,
    /// The device itself.
    Device,
}

struct RegistryInner<D> {
    records: SlotMap<RecordKey, D>,
    by_handle: FxHashMap<u64, RecordKey>,
}

/// A typed store associating one side-data record with each registered
/// native handle.
///
/// Backends keep one registry per object kind. Registering the null
/// sentinel handle, or re-registering a handle without an intervening
/// [`unregister`](Self::unregister), is a caller contract violation and
/// debug-asserted; in release builds a re-register replaces the mapping
/// and drops the superseded record.
pub struct ObjectRegistry<D> {
    inner: RwLock<RegistryInner<D>>,
}

impl<D> std::fmt::Debug for ObjectRegistry<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectRegistry")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl<D> ObjectRegistry<D> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(RegistryInner {
                records: SlotMap::with_key(),
                by_handle: FxHashMap::default(),
            }),
        }
    }

    /// Associates `record` with `handle`.
    pub fn register<H: NativeHandle>(&self, handle: H, record: D) {
        let raw = handle.as_raw();
        debug_assert!(raw != 0, "cannot register the null sentinel handle");

        let mut inner = self.inner.write().unwrap();
        let key = inner.records.insert(record);
        if let Some(stale) = inner.by_handle.insert(raw, key) {
            debug_assert!(false, "handle {raw:#x} registered twice without unregister");
            inner.records.remove(stale);
        }
    }

    /// Dissociates and returns the record for `handle`.
    ///
    /// Safe no-op returning `None` for the null sentinel or a handle that
    /// was never registered.
    pub fn unregister<H: NativeHandle>(&self, handle: H) -> Option<D> {
        let raw = handle.as_raw();
        if raw == 0 {
            return None;
        }

        let mut inner = self.inner.write().unwrap();
        let key = inner.by_handle.remove(&raw)?;
        inner.records.remove(key)
    }

    /// Runs `f` with shared access to the record for `handle`.
    ///
    /// Returns `None` if the handle is not currently registered.
    pub fn read<H: NativeHandle, R>(&self, handle: H, f: impl FnOnce(&D) -> R) -> Option<R> {
        let inner = self.inner.read().unwrap();
        let key = *inner.by_handle.get(&handle.as_raw())?;
        inner.records.get(key).map(f)
    }

    /// Runs `f` with exclusive access to the record for `handle`.
    ///
    /// Returns `None` if the handle is not currently registered.
    pub fn write<H: NativeHandle, R>(&self, handle: H, f: impl FnOnce(&mut D) -> R) -> Option<R> {
        let mut inner = self.inner.write().unwrap();
        let key = *inner.by_handle.get(&handle.as_raw())?;
        inner.records.get_mut(key).map(f)
    }

    /// Returns `true` if `handle` has a live record.
    pub fn contains<H: NativeHandle>(&self, handle: H) -> bool {
        self.inner
            .read()
            .unwrap()
            .by_handle
            .contains_key(&handle.as_raw())
    }

    /// Returns the number of live records.
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().by_handle.len()
    }

    /// Returns `true` if no records are registered.
    pub fn is_empty(&self) -> bool {
        self.inner.read().unwrap().by_handle.is_empty()
    }

    /// Removes every record and returns them, for device teardown.
    pub fn drain(&self) -> Vec<D> {
        let mut inner = self.inner.write().unwrap();
        inner.by_handle.clear();
        inner.records.drain().map(|(_, record)| record).collect()
    }
}

impl<D> Default for ObjectRegistry<D> {
    fn default() -> Self {
        Self::new()
    }
}

/// The type-erased registry variant for dynamic-dispatch paths where the
/// record type is not known at compile time.
///
/// Keys are `(kind, raw handle)` pairs and records are boxed [`Any`]
/// values; access downcasts to the caller-supplied type and returns
/// `None` on a kind/type mismatch. This trades the typed registry's
/// compile-time safety for flexibility.
#[derive(Default)]
pub struct AnyObjectRegistry {
    records: RwLock<FxHashMap<(ObjectKind, u64), Box<dyn Any + Send + Sync>>>,
}

impl std::fmt::Debug for AnyObjectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnyObjectRegistry")
            .field("len", &self.records.read().unwrap().len())
            .finish_non_exhaustive()
    }
}

impl AnyObjectRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates an already-allocated boxed record with `(kind, raw)`.
    pub fn register(&self, kind: ObjectKind, raw: u64, record: Box<dyn Any + Send + Sync>) {
        debug_assert!(raw != 0, "cannot register the null sentinel handle");
        self.records.write().unwrap().insert((kind, raw), record);
    }

    /// Dissociates and returns the boxed record for `(kind, raw)`, if any.
    pub fn unregister(&self, kind: ObjectKind, raw: u64) -> Option<Box<dyn Any + Send + Sync>> {
        if raw == 0 {
            return None;
        }
        self.records.write().unwrap().remove(&(kind, raw))
    }

    /// Runs `f` with shared access to the record for `(kind, raw)`,
    /// downcast to `T`.
    pub fn read<T: 'static, R>(
        &self,
        kind: ObjectKind,
        raw: u64,
        f: impl FnOnce(&T) -> R,
    ) -> Option<R> {
        let records = self.records.read().unwrap();
        records
            .get(&(kind, raw))
            .and_then(|record| record.downcast_ref::<T>())
            .map(f)
    }

    /// Runs `f` with exclusive access to the record for `(kind, raw)`,
    /// downcast to `T`.
    pub fn write<T: 'static, R>(
        &self,
        kind: ObjectKind,
        raw: u64,
        f: impl FnOnce(&mut T) -> R,
    ) -> Option<R> {
        let mut records = self.records.write().unwrap();
        records
            .get_mut(&(kind, raw))
            .and_then(|record| record.downcast_mut::<T>())
            .map(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct TestRecord {
        width: u32,
        height: u32,
    }

    #[test]
    fn register_then_read_returns_record_built_from_args() {
        let registry = ObjectRegistry::new();
        registry.register(
            0x10_u64,
            TestRecord {
                width: 640,
                height: 480,
            },
        );
        let dims = registry.read(0x10_u64, |r| (r.width, r.height));
        assert_eq!(dims, Some((640, 480)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unregister_then_register_observes_fresh_record() {
        let registry = ObjectRegistry::new();
        registry.register(
            0x20_u64,
            TestRecord {
                width: 1,
                height: 1,
            },
        );
        let removed = registry.unregister(0x20_u64);
        assert_eq!(
            removed,
            Some(TestRecord {
                width: 1,
                height: 1
            })
        );
        assert!(!registry.contains(0x20_u64));

        registry.register(
            0x20_u64,
            TestRecord {
                width: 2,
                height: 2,
            },
        );
        assert_eq!(registry.read(0x20_u64, |r| r.width), Some(2));
    }

    #[test]
    fn unregister_null_or_unknown_is_safe_noop() {
        let registry: ObjectRegistry<TestRecord> = ObjectRegistry::new();
        assert!(registry.unregister(0_u64).is_none());
        assert!(registry.unregister(0x99_u64).is_none());
    }

    #[test]
    fn lookup_after_unregister_returns_none() {
        let registry = ObjectRegistry::new();
        registry.register(
            0x30_u64,
            TestRecord {
                width: 8,
                height: 8,
            },
        );
        registry.unregister(0x30_u64);
        assert!(registry.read(0x30_u64, |r| r.width).is_none());
    }

    #[test]
    fn write_mutates_in_place() {
        let registry = ObjectRegistry::new();
        registry.register(
            0x40_u64,
            TestRecord {
                width: 100,
                height: 100,
            },
        );
        registry.write(0x40_u64, |r| r.width = 200);
        assert_eq!(registry.read(0x40_u64, |r| r.width), Some(200));
    }

    #[test]
    fn erased_registry_downcasts_by_kind_and_type() {
        let registry = AnyObjectRegistry::new();
        registry.register(
            ObjectKind::Resource,
            0x50,
            Box::new(TestRecord {
                width: 3,
                height: 4,
            }),
        );

        assert_eq!(
            registry.read(ObjectKind::Resource, 0x50, |r: &TestRecord| r.height),
            Some(4)
        );
        // Same raw handle under a different kind is a distinct key.
        assert!(registry
            .read(ObjectKind::Sampler, 0x50, |r: &TestRecord| r.height)
            .is_none());
        // Wrong downcast type misses instead of corrupting.
        assert!(registry
            .read(ObjectKind::Resource, 0x50, |s: &String| s.len())
            .is_none());

        let boxed = registry.unregister(ObjectKind::Resource, 0x50);
        assert!(boxed.is_some());
        assert!(registry.unregister(ObjectKind::Resource, 0x50).is_none());
    }
}
