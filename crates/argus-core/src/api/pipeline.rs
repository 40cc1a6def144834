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

//! Pipeline state descriptions.
//!
//! A pipeline is created from a sequence of typed [`PipelineSubobject`]s
//! rather than one monolithic descriptor, so callers only specify the
//! state they care about and backends reject combinations they cannot
//! express.

use super::format::Format;

/// A comparison function used for depth, stencil and shadow-sampler tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompareFunction {
    /// Never passes.
    Never,
    /// Passes if source < destination.
    Less,
    /// Passes if source == destination.
    Equal,
    /// Passes if source <= destination.
    LessEqual,
    /// Passes if source > destination.
    Greater,
    /// Passes if source != destination.
    NotEqual,
    /// Passes if source >= destination.
    GreaterEqual,
    /// Always passes.
    #[default]
    Always,
}

/// A multiplier applied to a blend input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendFactor {
    /// `0`.
    Zero,
    /// `1`.
    #[default]
    One,
    /// Source color.
    SourceColor,
    /// `1 - source color`.
    OneMinusSourceColor,
    /// Source alpha.
    SourceAlpha,
    /// `1 - source alpha`.
    OneMinusSourceAlpha,
    /// Destination color.
    DestColor,
    /// `1 - destination color`.
    OneMinusDestColor,
    /// Destination alpha.
    DestAlpha,
    /// `1 - destination alpha`.
    OneMinusDestAlpha,
}

/// The operation combining the two blend inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendOperation {
    /// `source + destination`.
    #[default]
    Add,
    /// `source - destination`.
    Subtract,
    /// `destination - source`.
    ReverseSubtract,
    /// `min(source, destination)`.
    Min,
    /// `max(source, destination)`.
    Max,
}

/// Per-render-target blend state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetBlendDesc {
    /// Whether blending is enabled for this target.
    pub blend_enable: bool,
    /// Multiplier for the source color.
    pub source_color: BlendFactor,
    /// Multiplier for the destination color.
    pub dest_color: BlendFactor,
    /// Operation combining the color inputs.
    pub color_op: BlendOperation,
    /// Multiplier for the source alpha.
    pub source_alpha: BlendFactor,
    /// Multiplier for the destination alpha.
    pub dest_alpha: BlendFactor,
    /// Operation combining the alpha inputs.
    pub alpha_op: BlendOperation,
    /// Per-channel write mask (RGBA bits 0..=3).
    pub write_mask: u8,
}

impl Default for TargetBlendDesc {
    fn default() -> Self {
        Self {
            blend_enable: false,
            source_color: BlendFactor::One,
            dest_color: BlendFactor::Zero,
            color_op: BlendOperation::Add,
            source_alpha: BlendFactor::One,
            dest_alpha: BlendFactor::Zero,
            alpha_op: BlendOperation::Add,
            write_mask: 0xF,
        }
    }
}

/// Blend state for all render targets of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlendDesc {
    /// Whether coverage is derived from alpha.
    pub alpha_to_coverage: bool,
    /// Per-target blend state, in render target order.
    pub targets: [TargetBlendDesc; 8],
}

/// How polygon interiors are rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FillMode {
    /// Fill polygons.
    #[default]
    Solid,
    /// Draw polygon edges only.
    Wireframe,
}

/// Which polygon faces are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CullMode {
    /// No culling.
    None,
    /// Discard front-facing polygons.
    Front,
    /// Discard back-facing polygons.
    #[default]
    Back,
}

/// Rasterizer state of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterizerDesc {
    /// Polygon fill mode.
    pub fill_mode: FillMode,
    /// Face culling mode.
    pub cull_mode: CullMode,
    /// Whether counter-clockwise winding is front-facing.
    pub front_counter_clockwise: bool,
    /// Whether fragments outside the depth range are clipped.
    pub depth_clip: bool,
    /// Whether conservative rasterization is enabled.
    pub conservative: bool,
}

impl Default for RasterizerDesc {
    fn default() -> Self {
        Self {
            fill_mode: FillMode::Solid,
            cull_mode: CullMode::Back,
            front_counter_clockwise: false,
            depth_clip: true,
            conservative: false,
        }
    }
}

/// An operation applied to a stencil value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StencilOp {
    /// Keep the current value.
    #[default]
    Keep,
    /// Set the value to zero.
    Zero,
    /// Replace with the reference value.
    Replace,
    /// Increment, clamping at maximum.
    IncrementClamp,
    /// Decrement, clamping at zero.
    DecrementClamp,
    /// Bitwise-invert the value.
    Invert,
    /// Increment with wrap.
    IncrementWrap,
    /// Decrement with wrap.
    DecrementWrap,
}

/// Stencil behavior for one face orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StencilOpDesc {
    /// Applied when the stencil test fails.
    pub fail: StencilOp,
    /// Applied when the stencil test passes but the depth test fails.
    pub depth_fail: StencilOp,
    /// Applied when both tests pass.
    pub pass: StencilOp,
    /// The stencil comparison function.
    pub func: CompareFunction,
}

/// Depth/stencil state of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthStencilDesc {
    /// Whether the depth test is enabled.
    pub depth_enable: bool,
    /// Whether passing fragments write their depth.
    pub depth_write: bool,
    /// The depth comparison function.
    pub depth_func: CompareFunction,
    /// Whether the stencil test is enabled.
    pub stencil_enable: bool,
    /// Mask applied when reading stencil values.
    pub stencil_read_mask: u8,
    /// Mask applied when writing stencil values.
    pub stencil_write_mask: u8,
    /// Stencil behavior for front-facing polygons.
    pub front: StencilOpDesc,
    /// Stencil behavior for back-facing polygons.
    pub back: StencilOpDesc,
}

impl Default for DepthStencilDesc {
    fn default() -> Self {
        Self {
            depth_enable: true,
            depth_write: true,
            depth_func: CompareFunction::Less,
            stencil_enable: false,
            stencil_read_mask: 0xFF,
            stencil_write_mask: 0xFF,
            front: StencilOpDesc::default(),
            back: StencilOpDesc::default(),
        }
    }
}

/// How vertices are assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopology {
    /// Isolated points.
    PointList,
    /// Isolated line segments.
    LineList,
    /// A connected line strip.
    LineStrip,
    /// Isolated triangles.
    #[default]
    TriangleList,
    /// A connected triangle strip.
    TriangleStrip,
}

/// One element of the vertex input layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputElementDesc<'a> {
    /// Shader input location (Vulkan-style backends).
    pub location: u32,
    /// Shader semantic name (D3D-style backends).
    pub semantic: &'a str,
    /// Index disambiguating elements sharing one semantic name.
    pub semantic_index: u32,
    /// Element format.
    pub format: Format,
    /// Index of the vertex buffer binding this element reads from.
    pub buffer_binding: u32,
    /// Byte offset of the element within one vertex.
    pub offset: u32,
    /// Byte stride between consecutive vertices in the buffer.
    pub stride: u32,
    /// Instances sharing one element value (`0` = per-vertex data).
    pub instance_step_rate: u32,
}

/// A shader stage binary plus its entry point.
#[derive(Debug, Clone, Copy)]
pub struct ShaderDesc<'a> {
    /// Backend-specific shader binary (SPIR-V, DXIL, ...).
    pub code: &'a [u8],
    /// Name of the entry point function.
    pub entry_point: &'a str,
}

/// One typed element of a pipeline description.
#[derive(Debug, Clone, Copy)]
pub enum PipelineSubobject<'a> {
    /// The vertex shader stage.
    VertexShader(&'a ShaderDesc<'a>),
    /// The geometry shader stage.
    GeometryShader(&'a ShaderDesc<'a>),
    /// The pixel (fragment) shader stage.
    PixelShader(&'a ShaderDesc<'a>),
    /// The compute shader stage (mutually exclusive with graphics stages).
    ComputeShader(&'a ShaderDesc<'a>),
    /// The vertex input layout.
    InputLayout(&'a [InputElementDesc<'a>]),
    /// Blend state for the render targets.
    BlendState(&'a BlendDesc),
    /// Rasterizer state.
    RasterizerState(&'a RasterizerDesc),
    /// Depth/stencil state.
    DepthStencilState(&'a DepthStencilDesc),
    /// Primitive assembly topology.
    PrimitiveTopology(PrimitiveTopology),
    /// Formats of the color render targets, in attachment order.
    RenderTargetFormats(&'a [Format]),
    /// Format of the depth/stencil attachment.
    DepthStencilFormat(Format),
    /// Samples per pixel.
    SampleCount(u32),
    /// Sample coverage mask.
    SampleMask(u32),
}
