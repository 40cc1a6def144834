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

//! Optional device capabilities.

/// An optional capability a device may or may not support.
///
/// Queried through
/// [`GraphicsDevice::check_capability`](crate::GraphicsDevice::check_capability);
/// callers gate optional code paths on the answer instead of probing the
/// native API directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceCapability {
    /// Compute shaders and compute pipelines.
    ComputeShader,
    /// Geometry shaders.
    GeometryShader,
    /// Logic operations in the blend stage.
    LogicOp,
    /// Dual-source blending.
    DualSourceBlend,
    /// Independent blend state per render target.
    IndependentBlend,
    /// Wireframe and point fill modes.
    FillModeNonSolid,
    /// Conservative rasterization.
    ConservativeRasterization,
    /// Anisotropic texture filtering.
    SamplerAnisotropic,
    /// Comparison (shadow) samplers.
    SamplerCompare,
    /// Samplers bound together with a resource view in one descriptor.
    SamplerWithResourceView,
    /// Partial updates of push constants.
    PartialPushConstantUpdates,
    /// Copies between buffer regions.
    CopyBufferRegion,
    /// Copies between buffer and texture regions.
    CopyBufferToTexture,
    /// Blits between overlapping regions with scaling.
    BlitRegion,
    /// Multisample resolve of a sub-region.
    ResolveRegion,
    /// Copying query pool results into a buffer.
    CopyQueryPoolResults,
    /// Resources shareable across device or process boundaries.
    SharedResource,
}
