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

//! # Argus Direct3D 12
//!
//! Direct3D 12 implementation of the `argus-core` capability traits,
//! built on the `windows` crate bindings.
//!
//! Where the Vulkan backend rotates descriptor *pools* and caches render
//! passes, this backend rotates shader-visible descriptor *heaps* and
//! has no render-pass cache (D3D12 has no render-pass object worth
//! caching); the registries, reverse queries and metadata channel all
//! follow the same shape. The crate only compiles
//! to something non-empty on Windows.

#[cfg(windows)]
mod conversions;
#[cfg(windows)]
mod device;
#[cfg(windows)]
mod heaps;
#[cfg(windows)]
mod objects;
#[cfg(windows)]
mod queue;

#[cfg(windows)]
pub use self::device::D3d12Device;
#[cfg(windows)]
pub use self::queue::D3d12Queue;
