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

//! Per-kind side-data records persisted alongside native D3D12 objects.
//!
//! COM lifetimes ride along: a record owns the interface it describes,
//! so unregistering the record releases the last reference the backend
//! holds.

use argus_core::api::{QueryType, Resource, ResourceDesc, ResourceViewDesc};
use windows::Win32::Graphics::Direct3D12::*;

/// Side data of a committed buffer or texture resource.
#[derive(Debug)]
pub(crate) struct ResourceData {
    pub desc: ResourceDesc,
    pub resource: ID3D12Resource,
    pub name: Option<String>,
}

/// Side data of a view: its staging-heap slot plus reverse-query data.
#[derive(Debug)]
pub(crate) struct ResourceViewData {
    pub resource: Resource,
    pub desc: ResourceViewDesc,
    pub heap_type: D3D12_DESCRIPTOR_HEAP_TYPE,
    pub slot: u32,
    pub name: Option<String>,
}

/// Side data of a root signature acting as the pipeline layout.
#[derive(Debug)]
pub(crate) struct RootSignatureData {
    pub params: Vec<argus_core::api::PipelineLayoutParam>,
    pub root_signature: ID3D12RootSignature,
}

/// Side data of a pipeline state object.
#[derive(Debug)]
pub(crate) struct PipelineData {
    pub pso: ID3D12PipelineState,
}

/// Side data of a descriptor set: the shader-visible arena range it was
/// carved from.
#[derive(Debug)]
pub(crate) struct DescriptorSetData {
    pub heap_type: D3D12_DESCRIPTOR_HEAP_TYPE,
    pub start: u32,
    pub count: u32,
}

/// Side data of a query heap.
#[derive(Debug)]
pub(crate) struct QueryPoolData {
    pub ty: QueryType,
    pub heap: ID3D12QueryHeap,
}
