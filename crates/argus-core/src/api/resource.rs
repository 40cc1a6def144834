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

//! Resource descriptors and CPU access types.

use super::format::Format;
use crate::argus_bitflags;

/// The memory heap a resource is allocated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MemoryHeap {
    /// Device-local memory, not CPU-accessible.
    #[default]
    GpuOnly,
    /// CPU-writable upload memory.
    CpuToGpu,
    /// CPU-readable readback memory.
    GpuToCpu,
}

argus_bitflags! {
    /// Ways a resource may be used, and the states it transitions between.
    pub struct ResourceUsage: u32 {
        /// Source of a copy operation.
        const COPY_SOURCE = 1 << 0;
        /// Destination of a copy operation.
        const COPY_DEST = 1 << 1;
        /// Bound as a vertex buffer.
        const VERTEX_BUFFER = 1 << 2;
        /// Bound as an index buffer.
        const INDEX_BUFFER = 1 << 3;
        /// Bound as a constant (uniform) buffer.
        const CONSTANT_BUFFER = 1 << 4;
        /// Sampled or read from shaders.
        const SHADER_RESOURCE = 1 << 5;
        /// Read/write access from shaders.
        const UNORDERED_ACCESS = 1 << 6;
        /// Bound as a color render target.
        const RENDER_TARGET = 1 << 7;
        /// Read as a depth/stencil attachment.
        const DEPTH_STENCIL_READ = 1 << 8;
        /// Written as a depth/stencil attachment.
        const DEPTH_STENCIL_WRITE = 1 << 9;
        /// Source of a multisample resolve.
        const RESOLVE_SOURCE = 1 << 10;
        /// Destination of a multisample resolve.
        const RESOLVE_DEST = 1 << 11;
        /// Read as indirect draw/dispatch arguments.
        const INDIRECT_ARGUMENT = 1 << 12;
        /// Any depth/stencil use.
        const DEPTH_STENCIL = Self::DEPTH_STENCIL_READ.bits() | Self::DEPTH_STENCIL_WRITE.bits();
    }
}

/// The dimensionality of a texture resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureDimension {
    /// A one-dimensional texture.
    D1,
    /// A two-dimensional texture.
    D2,
    /// A three-dimensional (volumetric) texture.
    D3,
}

/// Describes a buffer resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferDesc {
    /// Size in bytes.
    pub size: u64,
    /// Heap the buffer memory comes from.
    pub heap: MemoryHeap,
    /// Allowed usages.
    pub usage: ResourceUsage,
}

/// Describes a texture resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDesc {
    /// Dimensionality.
    pub dimension: TextureDimension,
    /// Width in texels.
    pub width: u32,
    /// Height in texels (1 for 1D textures).
    pub height: u32,
    /// Depth for 3D textures, array layer count otherwise.
    pub depth_or_layers: u16,
    /// Number of mipmap levels.
    pub levels: u16,
    /// Texel format.
    pub format: Format,
    /// Samples per texel (1 = not multisampled).
    pub samples: u32,
    /// Heap the texture memory comes from.
    pub heap: MemoryHeap,
    /// Allowed usages.
    pub usage: ResourceUsage,
}

/// Describes a resource of either kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceDesc {
    /// A buffer resource.
    Buffer(BufferDesc),
    /// A texture resource.
    Texture(TextureDesc),
}

impl ResourceDesc {
    /// Returns the buffer descriptor, if this describes a buffer.
    pub const fn as_buffer(&self) -> Option<&BufferDesc> {
        match self {
            ResourceDesc::Buffer(desc) => Some(desc),
            ResourceDesc::Texture(_) => None,
        }
    }

    /// Returns the texture descriptor, if this describes a texture.
    pub const fn as_texture(&self) -> Option<&TextureDesc> {
        match self {
            ResourceDesc::Texture(desc) => Some(desc),
            ResourceDesc::Buffer(_) => None,
        }
    }

    /// Returns the heap the resource is allocated from.
    pub const fn heap(&self) -> MemoryHeap {
        match self {
            ResourceDesc::Buffer(desc) => desc.heap,
            ResourceDesc::Texture(desc) => desc.heap,
        }
    }

    /// Returns the allowed usages.
    pub const fn usage(&self) -> ResourceUsage {
        match self {
            ResourceDesc::Buffer(desc) => desc.usage,
            ResourceDesc::Texture(desc) => desc.usage,
        }
    }
}

/// How a mapped region will be accessed by the CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapAccess {
    /// Read only.
    ReadOnly,
    /// Write only.
    WriteOnly,
    /// Read and write.
    ReadWrite,
    /// Write only; previous contents may be discarded.
    WriteDiscard,
}

/// One subresource worth of initial or update data.
#[derive(Debug, Clone, Copy)]
pub struct SubresourceData<'a> {
    /// Raw texel/byte data.
    pub data: &'a [u8],
    /// Bytes from one row to the next (textures).
    pub row_pitch: u32,
    /// Bytes from one depth slice to the next (3D textures).
    pub slice_pitch: u32,
}

/// A CPU pointer to a mapped texture subresource.
#[derive(Debug, Clone, Copy)]
pub struct MappedSubresource {
    /// Pointer to the first mapped byte.
    pub data: *mut u8,
    /// Bytes from one row to the next.
    pub row_pitch: u32,
    /// Bytes from one depth slice to the next.
    pub slice_pitch: u32,
}

/// A box selecting a region within a texture subresource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubresourceBox {
    /// Left edge, in texels.
    pub left: u32,
    /// Top edge, in texels.
    pub top: u32,
    /// Front edge, in texels.
    pub front: u32,
    /// Right edge (exclusive), in texels.
    pub right: u32,
    /// Bottom edge (exclusive), in texels.
    pub bottom: u32,
    /// Back edge (exclusive), in texels.
    pub back: u32,
}

impl SubresourceBox {
    /// Width of the box in texels.
    pub const fn width(&self) -> u32 {
        self.right - self.left
    }

    /// Height of the box in texels.
    pub const fn height(&self) -> u32 {
        self.bottom - self.top
    }

    /// Depth of the box in texels.
    pub const fn depth(&self) -> u32 {
        self.back - self.front
    }
}
