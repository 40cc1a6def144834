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

//! # Argus Vulkan
//!
//! Vulkan implementation of the `argus-core` capability traits, built on
//! `ash` for the driver surface and `gpu-allocator` for device memory.
//!
//! [`VulkanDevice`] is the facade: it owns the per-kind object
//! registries, the transient descriptor-pool ring and the render-pass
//! cache, and maps every backend-agnostic descriptor onto the native
//! Vulkan create calls.

mod conversions;
mod device;
mod objects;
mod pass;
mod queue;

pub use self::device::VulkanDevice;
pub use self::pass::{
    AttachmentLoadOp, AttachmentStoreOp, RenderPassAttachment, RenderPassBegin, RenderPassDesc,
};
pub use self::queue::VulkanQueue;
