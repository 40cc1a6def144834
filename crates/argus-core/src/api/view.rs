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

//! Resource view descriptors.

use super::format::Format;

/// The dimensionality of a texture view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureViewDimension {
    /// A view of a 1D texture.
    D1,
    /// A view of a 2D texture.
    D2,
    /// A view of a 2D texture array.
    D2Array,
    /// A view of a cubemap texture.
    Cube,
    /// A view of a cubemap texture array.
    CubeArray,
    /// A view of a 3D texture.
    D3,
}

/// Selects all remaining mipmap levels or array layers from the first.
pub const REMAINING: u32 = u32::MAX;

/// Describes a view over (a subrange of) a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceViewDesc {
    /// A view over a byte range of a buffer.
    Buffer {
        /// Element format the range is interpreted as.
        format: Format,
        /// Byte offset of the range.
        offset: u64,
        /// Byte size of the range (`u64::MAX` = to the end).
        size: u64,
    },
    /// A view over a level/layer range of a texture.
    Texture {
        /// View dimensionality.
        dimension: TextureViewDimension,
        /// Format the texels are interpreted as.
        format: Format,
        /// First mipmap level included.
        first_level: u32,
        /// Number of levels ([`REMAINING`] = all from `first_level`).
        levels: u32,
        /// First array layer included.
        first_layer: u32,
        /// Number of layers ([`REMAINING`] = all from `first_layer`).
        layers: u32,
    },
}

impl ResourceViewDesc {
    /// Returns the format the view interprets its data as.
    pub const fn format(&self) -> Format {
        match self {
            ResourceViewDesc::Buffer { format, .. } => *format,
            ResourceViewDesc::Texture { format, .. } => *format,
        }
    }
}
