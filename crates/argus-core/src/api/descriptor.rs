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

//! Descriptor binding model: layouts, updates and copies.

use super::common::ShaderStageFlags;
use super::handle::{DescriptorSet, Resource, ResourceView, Sampler};

/// What a descriptor binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorType {
    /// A standalone sampler.
    Sampler,
    /// A sampler paired with a sampled image view.
    CombinedImageSampler,
    /// A read-only shader resource view.
    ShaderResourceView,
    /// A read/write unordered access view.
    UnorderedAccessView,
    /// A constant (uniform) buffer range.
    ConstantBuffer,
    /// A read/write storage buffer range.
    StorageBuffer,
}

/// A contiguous range of bindings of one descriptor type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorRange {
    /// First binding slot covered by the range.
    pub binding: u32,
    /// Number of descriptors in the range.
    pub count: u32,
    /// Descriptor type of every slot in the range.
    pub ty: DescriptorType,
    /// Shader stages that can access the range.
    pub visibility: ShaderStageFlags,
}

/// One parameter of a pipeline layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineLayoutParam {
    /// A table of descriptor ranges bound as one descriptor set.
    DescriptorTable(Vec<DescriptorRange>),
    /// A range of 32-bit push constants.
    PushConstants {
        /// Number of 32-bit values.
        count: u32,
        /// Shader stages that can read the constants.
        visibility: ShaderStageFlags,
    },
}

/// A byte range of a buffer bound through a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferRange {
    /// The buffer resource.
    pub buffer: Resource,
    /// Byte offset of the range.
    pub offset: u64,
    /// Byte size of the range (`u64::MAX` = to the end).
    pub size: u64,
}

/// The descriptors written by one update, matching its descriptor type.
#[derive(Debug, Clone, Copy)]
pub enum DescriptorData<'a> {
    /// For [`DescriptorType::Sampler`].
    Samplers(&'a [Sampler]),
    /// For [`DescriptorType::CombinedImageSampler`].
    CombinedImageSamplers(&'a [(Sampler, ResourceView)]),
    /// For [`DescriptorType::ShaderResourceView`].
    ShaderResourceViews(&'a [ResourceView]),
    /// For [`DescriptorType::UnorderedAccessView`].
    UnorderedAccessViews(&'a [ResourceView]),
    /// For [`DescriptorType::ConstantBuffer`] and
    /// [`DescriptorType::StorageBuffer`].
    BufferRanges(&'a [BufferRange]),
}

impl DescriptorData<'_> {
    /// Number of descriptors carried by this update.
    pub const fn len(&self) -> usize {
        match self {
            DescriptorData::Samplers(s) => s.len(),
            DescriptorData::CombinedImageSamplers(s) => s.len(),
            DescriptorData::ShaderResourceViews(s) => s.len(),
            DescriptorData::UnorderedAccessViews(s) => s.len(),
            DescriptorData::BufferRanges(s) => s.len(),
        }
    }

    /// Returns `true` if the update carries no descriptors.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A batched write into one binding range of a descriptor set.
#[derive(Debug, Clone, Copy)]
pub struct DescriptorSetUpdate<'a> {
    /// The set being written.
    pub set: DescriptorSet,
    /// First binding slot written.
    pub binding: u32,
    /// Offset into the binding's array.
    pub array_offset: u32,
    /// Descriptor type of the written slots.
    pub ty: DescriptorType,
    /// The descriptors to write.
    pub descriptors: DescriptorData<'a>,
}

/// A copy between binding ranges of two descriptor sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorSetCopy {
    /// The set copied from.
    pub source_set: DescriptorSet,
    /// First source binding slot.
    pub source_binding: u32,
    /// Offset into the source binding's array.
    pub source_array_offset: u32,
    /// The set copied into.
    pub dest_set: DescriptorSet,
    /// First destination binding slot.
    pub dest_binding: u32,
    /// Offset into the destination binding's array.
    pub dest_array_offset: u32,
    /// Number of descriptors copied.
    pub count: u32,
}
