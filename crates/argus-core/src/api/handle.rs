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

//! Opaque handles for the object kinds the facade hands out.
//!
//! A handle wraps the backend's native identifier reinterpreted as a
//! 64-bit integer. The core never dereferences it; the value is only
//! meaningful to the backend that produced it. `0` is the null sentinel
//! for every kind: creation failures leave the caller without a handle
//! (`Err`), and destruction-style calls accept the sentinel as a safe
//! no-op.

macro_rules! api_handle {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        #[repr(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// The null sentinel.
            pub const NULL: Self = Self(0);

            /// Returns `true` if this is the null sentinel.
            pub const fn is_null(self) -> bool {
                self.0 == 0
            }

            /// Returns the raw 64-bit value.
            pub const fn as_raw(self) -> u64 {
                self.0
            }
        }

        impl crate::object::NativeHandle for $name {
            fn as_raw(&self) -> u64 {
                self.0
            }
        }
    };
}

api_handle! {
    /// A buffer or texture owned by a device.
    Resource
}

api_handle! {
    /// A view over (a subrange of) a [`Resource`].
    ResourceView
}

api_handle! {
    /// A texture sampler.
    Sampler
}

api_handle! {
    /// A compiled pipeline state object.
    Pipeline
}

api_handle! {
    /// A pipeline binding layout.
    PipelineLayout
}

api_handle! {
    /// A descriptor set allocated from a [`DescriptorPool`].
    DescriptorSet
}

api_handle! {
    /// A pool descriptor sets are allocated from.
    DescriptorPool
}

api_handle! {
    /// A pool of GPU queries.
    QueryPool
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::NativeHandle;

    #[test]
    fn null_sentinel_round_trip() {
        assert!(Resource::NULL.is_null());
        assert_eq!(Resource::default(), Resource::NULL);
        let handle = Resource(0x1234);
        assert!(!handle.is_null());
        assert_eq!(handle.as_raw(), 0x1234);
        assert_eq!(NativeHandle::as_raw(&handle), 0x1234);
    }
}
