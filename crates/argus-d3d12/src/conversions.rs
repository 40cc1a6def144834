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

//! Conversions between the backend-agnostic API types and Direct3D 12.

use argus_core::api::*;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;

pub fn to_dxgi_format(format: Format) -> DXGI_FORMAT {
    match format {
        Format::Unknown => DXGI_FORMAT_UNKNOWN,
        Format::R8Unorm => DXGI_FORMAT_R8_UNORM,
        Format::R8G8Unorm => DXGI_FORMAT_R8G8_UNORM,
        Format::R8G8B8A8Unorm => DXGI_FORMAT_R8G8B8A8_UNORM,
        Format::R8G8B8A8UnormSrgb => DXGI_FORMAT_R8G8B8A8_UNORM_SRGB,
        Format::B8G8R8A8Unorm => DXGI_FORMAT_B8G8R8A8_UNORM,
        Format::B8G8R8A8UnormSrgb => DXGI_FORMAT_B8G8R8A8_UNORM_SRGB,
        Format::R10G10B10A2Unorm => DXGI_FORMAT_R10G10B10A2_UNORM,
        Format::R16Float => DXGI_FORMAT_R16_FLOAT,
        Format::R16G16Float => DXGI_FORMAT_R16G16_FLOAT,
        Format::R16G16B16A16Float => DXGI_FORMAT_R16G16B16A16_FLOAT,
        Format::R32Uint => DXGI_FORMAT_R32_UINT,
        Format::R32Float => DXGI_FORMAT_R32_FLOAT,
        Format::R32G32Float => DXGI_FORMAT_R32G32_FLOAT,
        Format::R32G32B32A32Float => DXGI_FORMAT_R32G32B32A32_FLOAT,
        Format::D16Unorm => DXGI_FORMAT_D16_UNORM,
        Format::D24UnormS8Uint => DXGI_FORMAT_D24_UNORM_S8_UINT,
        Format::D32Float => DXGI_FORMAT_D32_FLOAT,
        Format::D32FloatS8Uint => DXGI_FORMAT_D32_FLOAT_S8X24_UINT,
        Format::Bc1Unorm => DXGI_FORMAT_BC1_UNORM,
        Format::Bc3Unorm => DXGI_FORMAT_BC3_UNORM,
        Format::Bc7Unorm => DXGI_FORMAT_BC7_UNORM,
    }
}

pub fn to_heap_type(heap: MemoryHeap) -> D3D12_HEAP_TYPE {
    match heap {
        MemoryHeap::GpuOnly => D3D12_HEAP_TYPE_DEFAULT,
        MemoryHeap::CpuToGpu => D3D12_HEAP_TYPE_UPLOAD,
        MemoryHeap::GpuToCpu => D3D12_HEAP_TYPE_READBACK,
    }
}

pub fn to_resource_states(usage: ResourceUsage) -> D3D12_RESOURCE_STATES {
    let mut states = D3D12_RESOURCE_STATE_COMMON;
    if usage.contains(ResourceUsage::COPY_SOURCE) {
        states |= D3D12_RESOURCE_STATE_COPY_SOURCE;
    }
    if usage.contains(ResourceUsage::COPY_DEST) {
        states |= D3D12_RESOURCE_STATE_COPY_DEST;
    }
    if usage.contains(ResourceUsage::VERTEX_BUFFER) || usage.contains(ResourceUsage::CONSTANT_BUFFER)
    {
        states |= D3D12_RESOURCE_STATE_VERTEX_AND_CONSTANT_BUFFER;
    }
    if usage.contains(ResourceUsage::INDEX_BUFFER) {
        states |= D3D12_RESOURCE_STATE_INDEX_BUFFER;
    }
    if usage.contains(ResourceUsage::SHADER_RESOURCE) {
        states |= D3D12_RESOURCE_STATE_ALL_SHADER_RESOURCE;
    }
    if usage.contains(ResourceUsage::UNORDERED_ACCESS) {
        states |= D3D12_RESOURCE_STATE_UNORDERED_ACCESS;
    }
    if usage.contains(ResourceUsage::RENDER_TARGET) {
        states |= D3D12_RESOURCE_STATE_RENDER_TARGET;
    }
    if usage.contains(ResourceUsage::DEPTH_STENCIL_WRITE) {
        states |= D3D12_RESOURCE_STATE_DEPTH_WRITE;
    } else if usage.contains(ResourceUsage::DEPTH_STENCIL_READ) {
        states |= D3D12_RESOURCE_STATE_DEPTH_READ;
    }
    if usage.contains(ResourceUsage::INDIRECT_ARGUMENT) {
        states |= D3D12_RESOURCE_STATE_INDIRECT_ARGUMENT;
    }
    states
}

pub fn to_resource_flags(usage: ResourceUsage) -> D3D12_RESOURCE_FLAGS {
    let mut flags = D3D12_RESOURCE_FLAG_NONE;
    if usage.contains(ResourceUsage::RENDER_TARGET) {
        flags |= D3D12_RESOURCE_FLAG_ALLOW_RENDER_TARGET;
    }
    if usage.intersects(ResourceUsage::DEPTH_STENCIL) {
        flags |= D3D12_RESOURCE_FLAG_ALLOW_DEPTH_STENCIL;
    }
    if usage.contains(ResourceUsage::UNORDERED_ACCESS) {
        flags |= D3D12_RESOURCE_FLAG_ALLOW_UNORDERED_ACCESS;
    }
    flags
}

pub fn to_comparison_func(func: CompareFunction) -> D3D12_COMPARISON_FUNC {
    match func {
        CompareFunction::Never => D3D12_COMPARISON_FUNC_NEVER,
        CompareFunction::Less => D3D12_COMPARISON_FUNC_LESS,
        CompareFunction::Equal => D3D12_COMPARISON_FUNC_EQUAL,
        CompareFunction::LessEqual => D3D12_COMPARISON_FUNC_LESS_EQUAL,
        CompareFunction::Greater => D3D12_COMPARISON_FUNC_GREATER,
        CompareFunction::NotEqual => D3D12_COMPARISON_FUNC_NOT_EQUAL,
        CompareFunction::GreaterEqual => D3D12_COMPARISON_FUNC_GREATER_EQUAL,
        CompareFunction::Always => D3D12_COMPARISON_FUNC_ALWAYS,
    }
}

pub fn to_blend_factor(factor: BlendFactor) -> D3D12_BLEND {
    match factor {
        BlendFactor::Zero => D3D12_BLEND_ZERO,
        BlendFactor::One => D3D12_BLEND_ONE,
        BlendFactor::SourceColor => D3D12_BLEND_SRC_COLOR,
        BlendFactor::OneMinusSourceColor => D3D12_BLEND_INV_SRC_COLOR,
        BlendFactor::SourceAlpha => D3D12_BLEND_SRC_ALPHA,
        BlendFactor::OneMinusSourceAlpha => D3D12_BLEND_INV_SRC_ALPHA,
        BlendFactor::DestColor => D3D12_BLEND_DEST_COLOR,
        BlendFactor::OneMinusDestColor => D3D12_BLEND_INV_DEST_COLOR,
        BlendFactor::DestAlpha => D3D12_BLEND_DEST_ALPHA,
        BlendFactor::OneMinusDestAlpha => D3D12_BLEND_INV_DEST_ALPHA,
    }
}

pub fn to_blend_op(op: BlendOperation) -> D3D12_BLEND_OP {
    match op {
        BlendOperation::Add => D3D12_BLEND_OP_ADD,
        BlendOperation::Subtract => D3D12_BLEND_OP_SUBTRACT,
        BlendOperation::ReverseSubtract => D3D12_BLEND_OP_REV_SUBTRACT,
        BlendOperation::Min => D3D12_BLEND_OP_MIN,
        BlendOperation::Max => D3D12_BLEND_OP_MAX,
    }
}

pub fn to_stencil_op(op: StencilOp) -> D3D12_STENCIL_OP {
    match op {
        StencilOp::Keep => D3D12_STENCIL_OP_KEEP,
        StencilOp::Zero => D3D12_STENCIL_OP_ZERO,
        StencilOp::Replace => D3D12_STENCIL_OP_REPLACE,
        StencilOp::IncrementClamp => D3D12_STENCIL_OP_INCR_SAT,
        StencilOp::DecrementClamp => D3D12_STENCIL_OP_DECR_SAT,
        StencilOp::Invert => D3D12_STENCIL_OP_INVERT,
        StencilOp::IncrementWrap => D3D12_STENCIL_OP_INCR,
        StencilOp::DecrementWrap => D3D12_STENCIL_OP_DECR,
    }
}

pub fn to_address_mode(mode: AddressMode) -> D3D12_TEXTURE_ADDRESS_MODE {
    match mode {
        AddressMode::Repeat => D3D12_TEXTURE_ADDRESS_MODE_WRAP,
        AddressMode::MirrorRepeat => D3D12_TEXTURE_ADDRESS_MODE_MIRROR,
        AddressMode::ClampToEdge => D3D12_TEXTURE_ADDRESS_MODE_CLAMP,
        AddressMode::ClampToBorder => D3D12_TEXTURE_ADDRESS_MODE_BORDER,
    }
}

/// Encodes the basic D3D12 filter from the three filter selections plus
/// the comparison bit (linear = 1 per stage, comparison adds the
/// reduction bits).
pub fn to_filter(min: FilterMode, mag: FilterMode, mip: FilterMode, compare: bool) -> D3D12_FILTER {
    let mut bits = 0;
    if mip == FilterMode::Linear {
        bits |= 0x1;
    }
    if mag == FilterMode::Linear {
        bits |= 0x4;
    }
    if min == FilterMode::Linear {
        bits |= 0x10;
    }
    if compare {
        bits |= D3D12_FILTER_COMPARISON_MIN_MAG_MIP_POINT.0;
    }
    D3D12_FILTER(bits)
}

pub fn to_range_type(ty: DescriptorType) -> D3D12_DESCRIPTOR_RANGE_TYPE {
    match ty {
        DescriptorType::Sampler => D3D12_DESCRIPTOR_RANGE_TYPE_SAMPLER,
        DescriptorType::CombinedImageSampler | DescriptorType::ShaderResourceView => {
            D3D12_DESCRIPTOR_RANGE_TYPE_SRV
        }
        DescriptorType::UnorderedAccessView | DescriptorType::StorageBuffer => {
            D3D12_DESCRIPTOR_RANGE_TYPE_UAV
        }
        DescriptorType::ConstantBuffer => D3D12_DESCRIPTOR_RANGE_TYPE_CBV,
    }
}

pub fn to_shader_visibility(visibility: ShaderStageFlags) -> D3D12_SHADER_VISIBILITY {
    if visibility == ShaderStageFlags::VERTEX {
        D3D12_SHADER_VISIBILITY_VERTEX
    } else if visibility == ShaderStageFlags::GEOMETRY {
        D3D12_SHADER_VISIBILITY_GEOMETRY
    } else if visibility == ShaderStageFlags::PIXEL {
        D3D12_SHADER_VISIBILITY_PIXEL
    } else {
        D3D12_SHADER_VISIBILITY_ALL
    }
}
