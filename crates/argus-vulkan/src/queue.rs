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

//! The Vulkan command queue object.

use argus_core::error::ResourceError;
use argus_core::object::{ApiObject, ApiObjectWrapper, Guid, NativeHandle};
use argus_core::traits::CommandQueue;
use ash::vk;
use ash::vk::Handle;

/// `VkQueue` viewed as a native handle.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RawQueue(pub vk::Queue);

impl NativeHandle for RawQueue {
    fn as_raw(&self) -> u64 {
        self.0.as_raw()
    }
}

/// One logical submission queue of a [`VulkanDevice`](crate::VulkanDevice).
///
/// Queues are created by the device from the native queue handles it was
/// constructed with; they are mutually independent and hold no locks, so
/// the caller serializes same-queue use (matching `VkQueue`'s own
/// external-synchronization rules).
pub struct VulkanQueue {
    wrapper: ApiObjectWrapper<RawQueue>,
    device: ash::Device,
    family_index: u32,
}

impl VulkanQueue {
    pub(crate) fn new(device: ash::Device, queue: vk::Queue, family_index: u32) -> Self {
        Self {
            wrapper: ApiObjectWrapper::new(RawQueue(queue)),
            device,
            family_index,
        }
    }

    /// Returns the native `VkQueue`.
    pub fn queue(&self) -> vk::Queue {
        self.wrapper.native_object().0
    }
}

impl std::fmt::Debug for VulkanQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VulkanQueue")
            .field("queue", &self.wrapper.native_object().0)
            .field("family_index", &self.family_index)
            .finish_non_exhaustive()
    }
}

impl ApiObject for VulkanQueue {
    fn native(&self) -> u64 {
        self.wrapper.native()
    }

    fn get_private_data(&self, key: &Guid) -> u64 {
        self.wrapper.get_private_data(key)
    }

    fn set_private_data(&self, key: &Guid, value: u64) {
        self.wrapper.set_private_data(key, value)
    }
}

impl CommandQueue for VulkanQueue {
    fn family_index(&self) -> u32 {
        self.family_index
    }

    fn wait_idle(&self) -> Result<(), ResourceError> {
        unsafe { self.device.queue_wait_idle(self.queue()) }
            .map_err(|err| ResourceError::BackendError(format!("vkQueueWaitIdle failed: {err}")))
    }
}
