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

use crate::api::*;
use crate::error::ResourceError;
use crate::object::ApiObject;
use std::fmt::Debug;

/// The per-backend device facade: creates, inspects and destroys GPU
/// objects behind a uniform capability surface, so consumers never know
/// which underlying driver is active.
///
/// Every operation is synchronous and either completes or fails
/// immediately; nothing is cancellable or has a timeout. Creation
/// operations return `Err` on native creation failure, in which case no
/// handle is produced and no side-data is registered (no partial
/// registration on failure). Destruction-style operations accept the
/// null sentinel as a safe no-op. Passing a handle that was created by a
/// different device is a caller contract violation.
///
/// Implementations are internally synchronized: any thread the host
/// application or its render threads use may call any operation.
pub trait GraphicsDevice: ApiObject + Debug + Send + Sync {
    /// Returns which native graphics API this device drives.
    fn api(&self) -> GraphicsBackendType;

    /// Returns information about the adapter the device was created on.
    fn adapter_info(&self) -> AdapterInfo;

    /// Returns `true` if the device supports `capability`.
    fn check_capability(&self, capability: DeviceCapability) -> bool;

    /// Returns `true` if `format` supports every usage in `usage`.
    fn check_format_support(&self, format: Format, usage: ResourceUsage) -> bool;

    /// Creates a sampler.
    fn create_sampler(&self, desc: &SamplerDesc) -> Result<Sampler, ResourceError>;

    /// Destroys a sampler. No-op for the null sentinel.
    fn destroy_sampler(&self, sampler: Sampler);

    /// Creates a buffer or texture resource.
    ///
    /// ## Arguments
    /// * `desc` - What to create.
    /// * `initial_data` - Optional initial contents, one entry per
    ///   subresource (a single entry for buffers).
    /// * `initial_state` - The usage state the resource starts in.
    fn create_resource(
        &self,
        desc: &ResourceDesc,
        initial_data: Option<&[SubresourceData<'_>]>,
        initial_state: ResourceUsage,
    ) -> Result<Resource, ResourceError>;

    /// Destroys a resource. No-op for the null sentinel.
    fn destroy_resource(&self, resource: Resource);

    /// Returns the descriptor `resource` was created with, or `None` if
    /// the handle is not registered with this device.
    fn resource_desc(&self, resource: Resource) -> Option<ResourceDesc>;

    /// Attaches a debug name to a resource.
    fn set_resource_name(&self, resource: Resource, name: &str);

    /// Creates a view over (a subrange of) a resource.
    ///
    /// `usage` selects which usage class the view serves (render target,
    /// shader resource, ...), which backends need to pick the native view
    /// kind.
    fn create_resource_view(
        &self,
        resource: Resource,
        usage: ResourceUsage,
        desc: &ResourceViewDesc,
    ) -> Result<ResourceView, ResourceError>;

    /// Destroys a resource view. No-op for the null sentinel.
    fn destroy_resource_view(&self, view: ResourceView);

    /// Returns the resource a view was created over, or `None` if the
    /// view is not registered with this device.
    fn resource_from_view(&self, view: ResourceView) -> Option<Resource>;

    /// Returns the descriptor `view` was created with, or `None` if the
    /// view is not registered with this device.
    fn resource_view_desc(&self, view: ResourceView) -> Option<ResourceViewDesc>;

    /// Attaches a debug name to a resource view.
    fn set_resource_view_name(&self, view: ResourceView, name: &str);

    /// Maps a byte range of a buffer for CPU access.
    ///
    /// The pointer stays valid until the matching
    /// [`unmap_buffer_region`](Self::unmap_buffer_region). Mapping
    /// requires the buffer to live on a CPU-accessible heap.
    fn map_buffer_region(
        &self,
        resource: Resource,
        offset: u64,
        size: u64,
        access: MapAccess,
    ) -> Result<*mut u8, ResourceError>;

    /// Unmaps a previously mapped buffer.
    fn unmap_buffer_region(&self, resource: Resource);

    /// Maps one texture subresource for CPU access.
    fn map_texture_region(
        &self,
        resource: Resource,
        subresource: u32,
        bounds: Option<&SubresourceBox>,
        access: MapAccess,
    ) -> Result<MappedSubresource, ResourceError>;

    /// Unmaps a previously mapped texture subresource.
    fn unmap_texture_region(&self, resource: Resource, subresource: u32);

    /// Uploads `data` into a byte range of a buffer.
    fn update_buffer_region(
        &self,
        data: &[u8],
        resource: Resource,
        offset: u64,
    ) -> Result<(), ResourceError>;

    /// Uploads texel data into (a region of) one texture subresource.
    fn update_texture_region(
        &self,
        data: &SubresourceData<'_>,
        resource: Resource,
        subresource: u32,
        bounds: Option<&SubresourceBox>,
    ) -> Result<(), ResourceError>;

    /// Creates a pipeline layout from a sequence of parameters.
    fn create_pipeline_layout(
        &self,
        params: &[PipelineLayoutParam],
    ) -> Result<PipelineLayout, ResourceError>;

    /// Destroys a pipeline layout. No-op for the null sentinel.
    fn destroy_pipeline_layout(&self, layout: PipelineLayout);

    /// Creates a pipeline state object from a sequence of typed
    /// subobjects.
    fn create_pipeline(
        &self,
        layout: PipelineLayout,
        subobjects: &[PipelineSubobject<'_>],
    ) -> Result<Pipeline, ResourceError>;

    /// Destroys a pipeline. No-op for the null sentinel.
    fn destroy_pipeline(&self, pipeline: Pipeline);

    /// Allocates `count` descriptor sets with the layout of descriptor
    /// table parameter `param_index` of `layout`.
    fn allocate_descriptor_sets(
        &self,
        count: u32,
        layout: PipelineLayout,
        param_index: u32,
    ) -> Result<Vec<DescriptorSet>, ResourceError>;

    /// Returns previously allocated descriptor sets to their pool.
    fn free_descriptor_sets(&self, sets: &[DescriptorSet]);

    /// Applies a batch of descriptor writes.
    fn update_descriptor_sets(&self, updates: &[DescriptorSetUpdate<'_>]);

    /// Applies a batch of descriptor copies.
    fn copy_descriptor_sets(&self, copies: &[DescriptorSetCopy]);

    /// Reports the pool a descriptor set was allocated from and its
    /// offset within it, or `None` if the set is not registered.
    fn descriptor_pool_offset(&self, set: DescriptorSet) -> Option<(DescriptorPool, u32)>;

    /// Creates a pool of `size` queries of type `ty`.
    fn create_query_pool(&self, ty: QueryType, size: u32) -> Result<QueryPool, ResourceError>;

    /// Destroys a query pool. No-op for the null sentinel.
    fn destroy_query_pool(&self, pool: QueryPool);

    /// Copies the results of queries `first..first + count` into
    /// `results`, `stride` bytes apart.
    ///
    /// Non-blocking: returns [`ResourceError::NotReady`] if the GPU has
    /// not produced all requested results yet.
    fn query_pool_results(
        &self,
        pool: QueryPool,
        first: u32,
        count: u32,
        stride: u32,
        results: &mut [u8],
    ) -> Result<(), ResourceError>;
}
