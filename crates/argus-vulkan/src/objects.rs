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

//! Per-kind side-data records persisted alongside native Vulkan handles.
//!
//! One record is registered when the device creates (or import-wraps) a
//! native object and removed when the facade destroys it; the records
//! answer the reverse queries (`resource_desc`, `resource_from_view`, ...)
//! without touching the driver.

use argus_core::api::{PipelineLayoutParam, QueryType, Resource, ResourceDesc, ResourceViewDesc};
use ash::vk;
use gpu_allocator::vulkan::Allocation;

/// Side data of a buffer or image resource.
#[derive(Debug)]
pub(crate) struct ResourceData {
    /// The descriptor the resource was created with.
    pub desc: ResourceDesc,
    /// The backing allocation; `None` for import-wrapped resources whose
    /// memory is owned elsewhere.
    pub allocation: Option<Allocation>,
    /// Debug name attached through `set_resource_name`.
    pub name: Option<String>,
}

/// Side data of a resource view.
#[derive(Debug)]
pub(crate) struct ResourceViewData {
    /// The resource the view was created over.
    pub resource: Resource,
    /// The descriptor the view was created with.
    pub desc: ResourceViewDesc,
    /// Debug name attached through `set_resource_view_name`.
    pub name: Option<String>,
}

/// Side data of a pipeline layout.
///
/// `set_layouts` has one entry per layout parameter so a parameter index
/// maps directly onto its descriptor set layout; push-constant
/// parameters occupy their slot with an empty layout.
#[derive(Debug)]
pub(crate) struct PipelineLayoutData {
    pub params: Vec<PipelineLayoutParam>,
    pub set_layouts: Vec<vk::DescriptorSetLayout>,
}

/// Side data of a descriptor set: which pool it came from and its
/// allocation sequence number within that pool generation.
#[derive(Debug)]
pub(crate) struct DescriptorSetData {
    pub pool: vk::DescriptorPool,
    pub offset: u32,
}

/// Side data of a query pool.
#[derive(Debug)]
pub(crate) struct QueryPoolData {
    pub ty: QueryType,
}
