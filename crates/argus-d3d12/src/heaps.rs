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

//! Descriptor heap management.
//!
//! D3D12 views and samplers are not objects but slots in descriptor
//! heaps; a view "handle" in this backend is the CPU descriptor address
//! of its slot. [`DescriptorHeapArena`] hands out slot ranges from one
//! heap with a bump cursor plus a free list, covering both the CPU-only
//! staging heaps (one slot per view) and the shader-visible heaps that
//! descriptor sets are carved out of.

use argus_core::error::ResourceError;
use argus_core::registry::ObjectKind;
use windows::Win32::Graphics::Direct3D12::*;

pub struct DescriptorHeapArena {
    heap: ID3D12DescriptorHeap,
    heap_type: D3D12_DESCRIPTOR_HEAP_TYPE,
    cpu_base: D3D12_CPU_DESCRIPTOR_HANDLE,
    gpu_base: D3D12_GPU_DESCRIPTOR_HANDLE,
    increment: u32,
    capacity: u32,
    cursor: u32,
    free: Vec<(u32, u32)>,
}

impl DescriptorHeapArena {
    pub fn new(
        device: &ID3D12Device,
        heap_type: D3D12_DESCRIPTOR_HEAP_TYPE,
        capacity: u32,
        shader_visible: bool,
    ) -> Result<Self, ResourceError> {
        let desc = D3D12_DESCRIPTOR_HEAP_DESC {
            Type: heap_type,
            NumDescriptors: capacity,
            Flags: if shader_visible {
                D3D12_DESCRIPTOR_HEAP_FLAG_SHADER_VISIBLE
            } else {
                D3D12_DESCRIPTOR_HEAP_FLAG_NONE
            },
            NodeMask: 0,
        };
        let heap: ID3D12DescriptorHeap = unsafe { device.CreateDescriptorHeap(&desc) }
            .map_err(|err| ResourceError::CreationFailed {
                kind: ObjectKind::DescriptorPool,
                details: err.to_string(),
            })?;
        let cpu_base = unsafe { heap.GetCPUDescriptorHandleForHeapStart() };
        let gpu_base = if shader_visible {
            unsafe { heap.GetGPUDescriptorHandleForHeapStart() }
        } else {
            D3D12_GPU_DESCRIPTOR_HANDLE::default()
        };
        let increment = unsafe { device.GetDescriptorHandleIncrementSize(heap_type) };
        Ok(Self {
            heap,
            heap_type,
            cpu_base,
            gpu_base,
            increment,
            capacity,
            cursor: 0,
            free: Vec::new(),
        })
    }

    /// Reserves `count` consecutive slots and returns the first slot
    /// index, recycling freed ranges of the exact size first.
    pub fn allocate(&mut self, count: u32) -> Option<u32> {
        if let Some(position) = self.free.iter().position(|&(_, n)| n == count) {
            return Some(self.free.swap_remove(position).0);
        }
        if self.cursor + count > self.capacity {
            return None;
        }
        let start = self.cursor;
        self.cursor += count;
        Some(start)
    }

    /// Returns a previously allocated range for reuse.
    pub fn free(&mut self, start: u32, count: u32) {
        self.free.push((start, count));
    }

    /// Drops every allocation; only valid when no carved range is still
    /// referenced by pending GPU work (transient heap rotation).
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.free.clear();
    }

    pub fn cpu_handle(&self, slot: u32) -> D3D12_CPU_DESCRIPTOR_HANDLE {
        D3D12_CPU_DESCRIPTOR_HANDLE {
            ptr: self.cpu_base.ptr + slot as usize * self.increment as usize,
        }
    }

    pub fn gpu_handle(&self, slot: u32) -> D3D12_GPU_DESCRIPTOR_HANDLE {
        D3D12_GPU_DESCRIPTOR_HANDLE {
            ptr: self.gpu_base.ptr + u64::from(slot) * u64::from(self.increment),
        }
    }

    /// Maps a CPU descriptor address previously handed out by this arena
    /// back to its slot index; `None` if the address is foreign.
    pub fn slot_of(&self, cpu_ptr: usize) -> Option<u32> {
        let bytes = cpu_ptr.checked_sub(self.cpu_base.ptr)?;
        let slot = (bytes / self.increment as usize) as u32;
        (slot < self.capacity).then_some(slot)
    }

    pub fn heap(&self) -> &ID3D12DescriptorHeap {
        &self.heap
    }

    pub fn heap_type(&self) -> D3D12_DESCRIPTOR_HEAP_TYPE {
        self.heap_type
    }
}
