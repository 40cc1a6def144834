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

//! Data formats shared by resources and views.

/// A backend-agnostic texel/element format.
///
/// The set covers the formats the effect runtime and addons actually
/// exchange; backends map each entry to the matching native format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Format {
    /// Format is unknown or irrelevant (raw buffers).
    #[default]
    Unknown,
    /// 8-bit red, unsigned normalized.
    R8Unorm,
    /// 8-bit red/green, unsigned normalized.
    R8G8Unorm,
    /// 8-bit RGBA, unsigned normalized.
    R8G8B8A8Unorm,
    /// 8-bit RGBA, unsigned normalized, sRGB encoded.
    R8G8B8A8UnormSrgb,
    /// 8-bit BGRA, unsigned normalized.
    B8G8R8A8Unorm,
    /// 8-bit BGRA, unsigned normalized, sRGB encoded.
    B8G8R8A8UnormSrgb,
    /// 10-bit RGB plus 2-bit alpha, unsigned normalized.
    R10G10B10A2Unorm,
    /// 16-bit red, float.
    R16Float,
    /// 16-bit red/green, float.
    R16G16Float,
    /// 16-bit RGBA, float.
    R16G16B16A16Float,
    /// 32-bit red, unsigned integer.
    R32Uint,
    /// 32-bit red, float.
    R32Float,
    /// 32-bit red/green, float.
    R32G32Float,
    /// 32-bit RGBA, float.
    R32G32B32A32Float,
    /// 16-bit depth, unsigned normalized.
    D16Unorm,
    /// 24-bit depth plus 8-bit stencil.
    D24UnormS8Uint,
    /// 32-bit float depth.
    D32Float,
    /// 32-bit float depth plus 8-bit stencil.
    D32FloatS8Uint,
    /// BC1 (DXT1) block compression, unsigned normalized.
    Bc1Unorm,
    /// BC3 (DXT5) block compression, unsigned normalized.
    Bc3Unorm,
    /// BC7 block compression, unsigned normalized.
    Bc7Unorm,
}

impl Format {
    /// Returns `true` if the format carries a depth aspect.
    pub const fn has_depth(self) -> bool {
        matches!(
            self,
            Format::D16Unorm | Format::D24UnormS8Uint | Format::D32Float | Format::D32FloatS8Uint
        )
    }

    /// Returns `true` if the format carries a stencil aspect.
    pub const fn has_stencil(self) -> bool {
        matches!(self, Format::D24UnormS8Uint | Format::D32FloatS8Uint)
    }

    /// Returns `true` if the format is depth and/or stencil.
    pub const fn is_depth_stencil(self) -> bool {
        self.has_depth() || self.has_stencil()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_stencil_classification() {
        assert!(Format::D32FloatS8Uint.has_depth());
        assert!(Format::D32FloatS8Uint.has_stencil());
        assert!(Format::D32Float.has_depth());
        assert!(!Format::D32Float.has_stencil());
        assert!(!Format::R8G8B8A8Unorm.is_depth_stencil());
    }
}
