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

//! The generic adapter that gives any native handle a uniform capability
//! surface, independent of the handle's real type.

use super::metadata::{Guid, MetadataStore};

/// A backend-defined handle type that can be viewed as a 64-bit integer.
///
/// The core never dereferences or interprets the raw value; it is only
/// handed back to the owning driver and used as a registry key. Backends
/// implement this for their native handle types (Vulkan handles, COM
/// interface pointers by address); `u64` implements it directly for
/// registry keys and tests.
pub trait NativeHandle: Copy {
    /// Returns the handle reinterpreted as a 64-bit integer.
    fn as_raw(&self) -> u64;
}

impl NativeHandle for u64 {
    fn as_raw(&self) -> u64 {
        *self
    }
}

/// The uniform capability surface of every handle-like object a backend
/// exposes: its raw native handle plus the GUID-keyed metadata channel.
///
/// Concrete device and queue types implement this by delegating to an
/// embedded [`ApiObjectWrapper`]; which further capability traits
/// ([`crate::GraphicsDevice`], [`crate::CommandQueue`]) an object kind
/// implements is an explicit, per-type choice: composition instead of a
/// dynamically discovered interface set.
pub trait ApiObject {
    /// Returns the underlying native handle as a 64-bit integer.
    ///
    /// Stable for the object's lifetime.
    fn native(&self) -> u64;

    /// Returns the metadata value stored under `key`, or `0` if absent.
    fn get_private_data(&self, key: &Guid) -> u64;

    /// Stores `value` under `key`; `0` erases the entry.
    fn set_private_data(&self, key: &Guid, value: u64);
}

/// Owns exactly one native handle and one [`MetadataStore`].
///
/// Constructed when a backend creates or import-wraps a native object and
/// destroyed when the facade destroys it. Wrapper identity is tied 1:1 to
/// its handle, so the type is deliberately neither `Clone` nor `Copy`;
/// only moves and destruction are valid lifecycle operations.
///
/// On destruction the metadata store must be empty: any remaining entry
/// means an external owner attached metadata and never removed it. That
/// precondition is checked with a debug assertion, as a developer-time
/// leak diagnostic rather than a recoverable error.
#[derive(Debug)]
pub struct ApiObjectWrapper<T: NativeHandle> {
    orig: T,
    metadata: MetadataStore,
}

impl<T: NativeHandle> ApiObjectWrapper<T> {
    /// Wraps a native handle.
    pub fn new(orig: T) -> Self {
        // A wrapped type is conceptually a handle, not an owned buffer.
        const {
            assert!(std::mem::size_of::<T>() <= std::mem::size_of::<u64>());
        }
        Self {
            orig,
            metadata: MetadataStore::new(),
        }
    }

    /// Returns the wrapped handle in its native type.
    pub fn native_object(&self) -> T {
        self.orig
    }

    /// Returns the embedded metadata store.
    pub fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }
}

impl<T: NativeHandle> ApiObject for ApiObjectWrapper<T> {
    fn native(&self) -> u64 {
        self.orig.as_raw()
    }

    fn get_private_data(&self, key: &Guid) -> u64 {
        self.metadata.get(key)
    }

    fn set_private_data(&self, key: &Guid, value: u64) {
        self.metadata.set(key, value)
    }
}

impl<T: NativeHandle> Drop for ApiObjectWrapper<T> {
    fn drop(&mut self) {
        // All metadata should have been removed before destruction, to avoid leaks
        debug_assert!(
            self.metadata.is_empty(),
            "object {:#x} destroyed with {} metadata entries still attached",
            self.orig.as_raw(),
            self.metadata.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(n: u8) -> Guid {
        Guid::from_bytes([n; 16])
    }

    #[test]
    fn native_round_trip() {
        let wrapper = ApiObjectWrapper::new(0xABCD_u64);
        assert_eq!(wrapper.native(), 0xABCD);
        assert_eq!(wrapper.native_object(), 0xABCD);
    }

    #[test]
    fn private_data_delegates_to_store() {
        let wrapper = ApiObjectWrapper::new(1_u64);
        wrapper.set_private_data(&key(3), 99);
        assert_eq!(wrapper.get_private_data(&key(3)), 99);
        // Erase so the teardown diagnostic stays quiet.
        wrapper.set_private_data(&key(3), 0);
        assert_eq!(wrapper.get_private_data(&key(3)), 0);
    }

    #[test]
    fn works_through_trait_object() {
        let wrapper = ApiObjectWrapper::new(7_u64);
        let object: &dyn ApiObject = &wrapper;
        object.set_private_data(&key(1), 5);
        assert_eq!(object.get_private_data(&key(1)), 5);
        assert_eq!(object.native(), 7);
        object.set_private_data(&key(1), 0);
    }

    #[test]
    #[should_panic(expected = "metadata entries still attached")]
    #[cfg(debug_assertions)]
    fn dropping_with_attached_metadata_trips_leak_diagnostic() {
        let wrapper = ApiObjectWrapper::new(2_u64);
        wrapper.set_private_data(&key(8), 1);
        drop(wrapper);
    }
}
