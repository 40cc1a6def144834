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

//! The Direct3D 12 command queue object.

use std::sync::atomic::{AtomicU64, Ordering};

use argus_core::error::ResourceError;
use argus_core::object::{ApiObject, ApiObjectWrapper, Guid};
use argus_core::traits::CommandQueue;
use windows::core::Interface;
use windows::Win32::Foundation::CloseHandle;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::System::Threading::{CreateEventA, WaitForSingleObject, INFINITE};

/// One submission queue of a [`D3d12Device`](crate::D3d12Device).
///
/// `family_index` reports the native queue type (direct/compute/copy) in
/// lieu of Vulkan's queue families. Same-queue use from multiple threads
/// is externally serialized by the caller.
pub struct D3d12Queue {
    wrapper: ApiObjectWrapper<u64>,
    queue: ID3D12CommandQueue,
    fence: ID3D12Fence,
    fence_value: AtomicU64,
    queue_type: D3D12_COMMAND_LIST_TYPE,
}

// ID3D12CommandQueue and ID3D12Fence are free-threaded interfaces.
unsafe impl Send for D3d12Queue {}
unsafe impl Sync for D3d12Queue {}

impl D3d12Queue {
    pub(crate) fn new(
        device: &ID3D12Device,
        queue: ID3D12CommandQueue,
    ) -> Result<Self, ResourceError> {
        let queue_type = unsafe { queue.GetDesc() }.Type;
        let fence: ID3D12Fence = unsafe { device.CreateFence(0, D3D12_FENCE_FLAG_NONE) }
            .map_err(|err| ResourceError::BackendError(err.to_string()))?;
        Ok(Self {
            wrapper: ApiObjectWrapper::new(queue.as_raw() as u64),
            queue,
            fence,
            fence_value: AtomicU64::new(0),
            queue_type,
        })
    }

    /// Returns the native `ID3D12CommandQueue`.
    pub fn queue(&self) -> &ID3D12CommandQueue {
        &self.queue
    }
}

impl std::fmt::Debug for D3d12Queue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("D3d12Queue")
            .field("queue", &self.wrapper.native())
            .field("queue_type", &self.queue_type.0)
            .finish_non_exhaustive()
    }
}

impl ApiObject for D3d12Queue {
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

impl CommandQueue for D3d12Queue {
    fn family_index(&self) -> u32 {
        self.queue_type.0 as u32
    }

    fn wait_idle(&self) -> Result<(), ResourceError> {
        let value = self.fence_value.fetch_add(1, Ordering::SeqCst) + 1;
        unsafe { self.queue.Signal(&self.fence, value) }
            .map_err(|err| ResourceError::BackendError(err.to_string()))?;
        if unsafe { self.fence.GetCompletedValue() } < value {
            let event = unsafe { CreateEventA(None, false, false, windows::core::PCSTR::null()) }
                .map_err(|err| ResourceError::BackendError(err.to_string()))?;
            let wait = unsafe {
                self.fence
                    .SetEventOnCompletion(value, event)
                    .map(|()| WaitForSingleObject(event, INFINITE))
            };
            unsafe {
                let _ = CloseHandle(event);
            }
            wait.map_err(|err| ResourceError::BackendError(err.to_string()))?;
        }
        Ok(())
    }
}
