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

//! Conversions between the backend-agnostic API types and Vulkan.

use argus_core::api::*;
use ash::vk;
use gpu_allocator::MemoryLocation;

/// A local extension trait to convert engine types into Vulkan types.
/// This avoids Rust's orphan rules while keeping an idiomatic
/// `.into_vk()` syntax.
pub trait IntoVk<T> {
    /// Consumes self and converts it into a Vulkan-compatible type.
    fn into_vk(self) -> T;
}

impl IntoVk<vk::Format> for Format {
    fn into_vk(self) -> vk::Format {
        match self {
            Format::Unknown => vk::Format::UNDEFINED,
            Format::R8Unorm => vk::Format::R8_UNORM,
            Format::R8G8Unorm => vk::Format::R8G8_UNORM,
            Format::R8G8B8A8Unorm => vk::Format::R8G8B8A8_UNORM,
            Format::R8G8B8A8UnormSrgb => vk::Format::R8G8B8A8_SRGB,
            Format::B8G8R8A8Unorm => vk::Format::B8G8R8A8_UNORM,
            Format::B8G8R8A8UnormSrgb => vk::Format::B8G8R8A8_SRGB,
            Format::R10G10B10A2Unorm => vk::Format::A2B10G10R10_UNORM_PACK32,
            Format::R16Float => vk::Format::R16_SFLOAT,
            Format::R16G16Float => vk::Format::R16G16_SFLOAT,
            Format::R16G16B16A16Float => vk::Format::R16G16B16A16_SFLOAT,
            Format::R32Uint => vk::Format::R32_UINT,
            Format::R32Float => vk::Format::R32_SFLOAT,
            Format::R32G32Float => vk::Format::R32G32_SFLOAT,
            Format::R32G32B32A32Float => vk::Format::R32G32B32A32_SFLOAT,
            Format::D16Unorm => vk::Format::D16_UNORM,
            Format::D24UnormS8Uint => vk::Format::D24_UNORM_S8_UINT,
            Format::D32Float => vk::Format::D32_SFLOAT,
            Format::D32FloatS8Uint => vk::Format::D32_SFLOAT_S8_UINT,
            Format::Bc1Unorm => vk::Format::BC1_RGBA_UNORM_BLOCK,
            Format::Bc3Unorm => vk::Format::BC3_UNORM_BLOCK,
            Format::Bc7Unorm => vk::Format::BC7_UNORM_BLOCK,
        }
    }
}

/// Returns the image aspect flags implied by a format.
pub fn format_aspect(format: Format) -> vk::ImageAspectFlags {
    let mut aspect = vk::ImageAspectFlags::empty();
    if format.has_depth() {
        aspect |= vk::ImageAspectFlags::DEPTH;
    }
    if format.has_stencil() {
        aspect |= vk::ImageAspectFlags::STENCIL;
    }
    if aspect.is_empty() {
        aspect = vk::ImageAspectFlags::COLOR;
    }
    aspect
}

impl IntoVk<MemoryLocation> for MemoryHeap {
    fn into_vk(self) -> MemoryLocation {
        match self {
            MemoryHeap::GpuOnly => MemoryLocation::GpuOnly,
            MemoryHeap::CpuToGpu => MemoryLocation::CpuToGpu,
            MemoryHeap::GpuToCpu => MemoryLocation::GpuToCpu,
        }
    }
}

/// Maps usage flags onto buffer usage bits.
pub fn buffer_usage_flags(usage: ResourceUsage) -> vk::BufferUsageFlags {
    let mut flags = vk::BufferUsageFlags::empty();
    if usage.contains(ResourceUsage::COPY_SOURCE) {
        flags |= vk::BufferUsageFlags::TRANSFER_SRC;
    }
    if usage.contains(ResourceUsage::COPY_DEST) {
        flags |= vk::BufferUsageFlags::TRANSFER_DST;
    }
    if usage.contains(ResourceUsage::VERTEX_BUFFER) {
        flags |= vk::BufferUsageFlags::VERTEX_BUFFER;
    }
    if usage.contains(ResourceUsage::INDEX_BUFFER) {
        flags |= vk::BufferUsageFlags::INDEX_BUFFER;
    }
    if usage.contains(ResourceUsage::CONSTANT_BUFFER) {
        flags |= vk::BufferUsageFlags::UNIFORM_BUFFER;
    }
    if usage.contains(ResourceUsage::SHADER_RESOURCE) {
        flags |= vk::BufferUsageFlags::UNIFORM_TEXEL_BUFFER;
    }
    if usage.contains(ResourceUsage::UNORDERED_ACCESS) {
        flags |= vk::BufferUsageFlags::STORAGE_BUFFER | vk::BufferUsageFlags::STORAGE_TEXEL_BUFFER;
    }
    if usage.contains(ResourceUsage::INDIRECT_ARGUMENT) {
        flags |= vk::BufferUsageFlags::INDIRECT_BUFFER;
    }
    flags
}

/// Maps usage flags onto image usage bits.
pub fn image_usage_flags(usage: ResourceUsage) -> vk::ImageUsageFlags {
    let mut flags = vk::ImageUsageFlags::empty();
    if usage.contains(ResourceUsage::COPY_SOURCE) || usage.contains(ResourceUsage::RESOLVE_SOURCE) {
        flags |= vk::ImageUsageFlags::TRANSFER_SRC;
    }
    if usage.contains(ResourceUsage::COPY_DEST) || usage.contains(ResourceUsage::RESOLVE_DEST) {
        flags |= vk::ImageUsageFlags::TRANSFER_DST;
    }
    if usage.contains(ResourceUsage::SHADER_RESOURCE) {
        flags |= vk::ImageUsageFlags::SAMPLED;
    }
    if usage.contains(ResourceUsage::UNORDERED_ACCESS) {
        flags |= vk::ImageUsageFlags::STORAGE;
    }
    if usage.contains(ResourceUsage::RENDER_TARGET) {
        flags |= vk::ImageUsageFlags::COLOR_ATTACHMENT;
    }
    if usage.intersects(ResourceUsage::DEPTH_STENCIL) {
        flags |= vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT;
    }
    flags
}

/// Maps usage flags onto the format feature bits format support is
/// queried with.
pub fn format_feature_flags(usage: ResourceUsage) -> vk::FormatFeatureFlags {
    let mut flags = vk::FormatFeatureFlags::empty();
    if usage.contains(ResourceUsage::COPY_SOURCE) {
        flags |= vk::FormatFeatureFlags::TRANSFER_SRC;
    }
    if usage.contains(ResourceUsage::COPY_DEST) {
        flags |= vk::FormatFeatureFlags::TRANSFER_DST;
    }
    if usage.contains(ResourceUsage::SHADER_RESOURCE) {
        flags |= vk::FormatFeatureFlags::SAMPLED_IMAGE;
    }
    if usage.contains(ResourceUsage::UNORDERED_ACCESS) {
        flags |= vk::FormatFeatureFlags::STORAGE_IMAGE;
    }
    if usage.contains(ResourceUsage::RENDER_TARGET) {
        flags |= vk::FormatFeatureFlags::COLOR_ATTACHMENT;
    }
    if usage.intersects(ResourceUsage::DEPTH_STENCIL) {
        flags |= vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT;
    }
    flags
}

impl IntoVk<vk::ImageViewType> for TextureViewDimension {
    fn into_vk(self) -> vk::ImageViewType {
        match self {
            TextureViewDimension::D1 => vk::ImageViewType::TYPE_1D,
            TextureViewDimension::D2 => vk::ImageViewType::TYPE_2D,
            TextureViewDimension::D2Array => vk::ImageViewType::TYPE_2D_ARRAY,
            TextureViewDimension::Cube => vk::ImageViewType::CUBE,
            TextureViewDimension::CubeArray => vk::ImageViewType::CUBE_ARRAY,
            TextureViewDimension::D3 => vk::ImageViewType::TYPE_3D,
        }
    }
}

impl IntoVk<vk::ImageType> for TextureDimension {
    fn into_vk(self) -> vk::ImageType {
        match self {
            TextureDimension::D1 => vk::ImageType::TYPE_1D,
            TextureDimension::D2 => vk::ImageType::TYPE_2D,
            TextureDimension::D3 => vk::ImageType::TYPE_3D,
        }
    }
}

impl IntoVk<vk::Filter> for FilterMode {
    fn into_vk(self) -> vk::Filter {
        match self {
            FilterMode::Nearest => vk::Filter::NEAREST,
            FilterMode::Linear => vk::Filter::LINEAR,
        }
    }
}

impl IntoVk<vk::SamplerMipmapMode> for FilterMode {
    fn into_vk(self) -> vk::SamplerMipmapMode {
        match self {
            FilterMode::Nearest => vk::SamplerMipmapMode::NEAREST,
            FilterMode::Linear => vk::SamplerMipmapMode::LINEAR,
        }
    }
}

impl IntoVk<vk::SamplerAddressMode> for AddressMode {
    fn into_vk(self) -> vk::SamplerAddressMode {
        match self {
            AddressMode::Repeat => vk::SamplerAddressMode::REPEAT,
            AddressMode::MirrorRepeat => vk::SamplerAddressMode::MIRRORED_REPEAT,
            AddressMode::ClampToEdge => vk::SamplerAddressMode::CLAMP_TO_EDGE,
            AddressMode::ClampToBorder => vk::SamplerAddressMode::CLAMP_TO_BORDER,
        }
    }
}

impl IntoVk<vk::CompareOp> for CompareFunction {
    fn into_vk(self) -> vk::CompareOp {
        match self {
            CompareFunction::Never => vk::CompareOp::NEVER,
            CompareFunction::Less => vk::CompareOp::LESS,
            CompareFunction::Equal => vk::CompareOp::EQUAL,
            CompareFunction::LessEqual => vk::CompareOp::LESS_OR_EQUAL,
            CompareFunction::Greater => vk::CompareOp::GREATER,
            CompareFunction::NotEqual => vk::CompareOp::NOT_EQUAL,
            CompareFunction::GreaterEqual => vk::CompareOp::GREATER_OR_EQUAL,
            CompareFunction::Always => vk::CompareOp::ALWAYS,
        }
    }
}

impl IntoVk<vk::BlendFactor> for BlendFactor {
    fn into_vk(self) -> vk::BlendFactor {
        match self {
            BlendFactor::Zero => vk::BlendFactor::ZERO,
            BlendFactor::One => vk::BlendFactor::ONE,
            BlendFactor::SourceColor => vk::BlendFactor::SRC_COLOR,
            BlendFactor::OneMinusSourceColor => vk::BlendFactor::ONE_MINUS_SRC_COLOR,
            BlendFactor::SourceAlpha => vk::BlendFactor::SRC_ALPHA,
            BlendFactor::OneMinusSourceAlpha => vk::BlendFactor::ONE_MINUS_SRC_ALPHA,
            BlendFactor::DestColor => vk::BlendFactor::DST_COLOR,
            BlendFactor::OneMinusDestColor => vk::BlendFactor::ONE_MINUS_DST_COLOR,
            BlendFactor::DestAlpha => vk::BlendFactor::DST_ALPHA,
            BlendFactor::OneMinusDestAlpha => vk::BlendFactor::ONE_MINUS_DST_ALPHA,
        }
    }
}

impl IntoVk<vk::BlendOp> for BlendOperation {
    fn into_vk(self) -> vk::BlendOp {
        match self {
            BlendOperation::Add => vk::BlendOp::ADD,
            BlendOperation::Subtract => vk::BlendOp::SUBTRACT,
            BlendOperation::ReverseSubtract => vk::BlendOp::REVERSE_SUBTRACT,
            BlendOperation::Min => vk::BlendOp::MIN,
            BlendOperation::Max => vk::BlendOp::MAX,
        }
    }
}

impl IntoVk<vk::StencilOp> for StencilOp {
    fn into_vk(self) -> vk::StencilOp {
        match self {
            StencilOp::Keep => vk::StencilOp::KEEP,
            StencilOp::Zero => vk::StencilOp::ZERO,
            StencilOp::Replace => vk::StencilOp::REPLACE,
            StencilOp::IncrementClamp => vk::StencilOp::INCREMENT_AND_CLAMP,
            StencilOp::DecrementClamp => vk::StencilOp::DECREMENT_AND_CLAMP,
            StencilOp::Invert => vk::StencilOp::INVERT,
            StencilOp::IncrementWrap => vk::StencilOp::INCREMENT_AND_WRAP,
            StencilOp::DecrementWrap => vk::StencilOp::DECREMENT_AND_WRAP,
        }
    }
}

impl IntoVk<vk::PolygonMode> for FillMode {
    fn into_vk(self) -> vk::PolygonMode {
        match self {
            FillMode::Solid => vk::PolygonMode::FILL,
            FillMode::Wireframe => vk::PolygonMode::LINE,
        }
    }
}

impl IntoVk<vk::CullModeFlags> for CullMode {
    fn into_vk(self) -> vk::CullModeFlags {
        match self {
            CullMode::None => vk::CullModeFlags::NONE,
            CullMode::Front => vk::CullModeFlags::FRONT,
            CullMode::Back => vk::CullModeFlags::BACK,
        }
    }
}

impl IntoVk<vk::PrimitiveTopology> for PrimitiveTopology {
    fn into_vk(self) -> vk::PrimitiveTopology {
        match self {
            PrimitiveTopology::PointList => vk::PrimitiveTopology::POINT_LIST,
            PrimitiveTopology::LineList => vk::PrimitiveTopology::LINE_LIST,
            PrimitiveTopology::LineStrip => vk::PrimitiveTopology::LINE_STRIP,
            PrimitiveTopology::TriangleList => vk::PrimitiveTopology::TRIANGLE_LIST,
            PrimitiveTopology::TriangleStrip => vk::PrimitiveTopology::TRIANGLE_STRIP,
        }
    }
}

impl IntoVk<vk::DescriptorType> for DescriptorType {
    fn into_vk(self) -> vk::DescriptorType {
        match self {
            DescriptorType::Sampler => vk::DescriptorType::SAMPLER,
            DescriptorType::CombinedImageSampler => vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
            DescriptorType::ShaderResourceView => vk::DescriptorType::SAMPLED_IMAGE,
            DescriptorType::UnorderedAccessView => vk::DescriptorType::STORAGE_IMAGE,
            DescriptorType::ConstantBuffer => vk::DescriptorType::UNIFORM_BUFFER,
            DescriptorType::StorageBuffer => vk::DescriptorType::STORAGE_BUFFER,
        }
    }
}

impl IntoVk<vk::ShaderStageFlags> for ShaderStageFlags {
    fn into_vk(self) -> vk::ShaderStageFlags {
        let mut flags = vk::ShaderStageFlags::empty();
        if self.contains(ShaderStageFlags::VERTEX) {
            flags |= vk::ShaderStageFlags::VERTEX;
        }
        if self.contains(ShaderStageFlags::GEOMETRY) {
            flags |= vk::ShaderStageFlags::GEOMETRY;
        }
        if self.contains(ShaderStageFlags::PIXEL) {
            flags |= vk::ShaderStageFlags::FRAGMENT;
        }
        if self.contains(ShaderStageFlags::COMPUTE) {
            flags |= vk::ShaderStageFlags::COMPUTE;
        }
        flags
    }
}

impl IntoVk<vk::QueryType> for QueryType {
    fn into_vk(self) -> vk::QueryType {
        match self {
            QueryType::Occlusion | QueryType::BinaryOcclusion => vk::QueryType::OCCLUSION,
            QueryType::Timestamp => vk::QueryType::TIMESTAMP,
            QueryType::PipelineStatistics => vk::QueryType::PIPELINE_STATISTICS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_formats_map_to_depth_aspects() {
        assert_eq!(format_aspect(Format::R8G8B8A8Unorm), vk::ImageAspectFlags::COLOR);
        assert_eq!(format_aspect(Format::D32Float), vk::ImageAspectFlags::DEPTH);
        assert_eq!(
            format_aspect(Format::D24UnormS8Uint),
            vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL
        );
    }

    #[test]
    fn buffer_and_image_usages_map_to_distinct_bits() {
        let usage = ResourceUsage::COPY_DEST | ResourceUsage::SHADER_RESOURCE;
        assert!(buffer_usage_flags(usage).contains(vk::BufferUsageFlags::TRANSFER_DST));
        assert!(image_usage_flags(usage).contains(vk::ImageUsageFlags::SAMPLED));
        assert!(image_usage_flags(ResourceUsage::DEPTH_STENCIL_WRITE)
            .contains(vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT));
    }

    #[test]
    fn stage_visibility_accumulates() {
        let flags: vk::ShaderStageFlags = ShaderStageFlags::ALL_GRAPHICS.into_vk();
        assert!(flags.contains(vk::ShaderStageFlags::VERTEX));
        assert!(flags.contains(vk::ShaderStageFlags::FRAGMENT));
        assert!(!flags.contains(vk::ShaderStageFlags::COMPUTE));
    }
}
