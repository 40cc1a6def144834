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

//! Backend-agnostic API types.
//!
//! Organized into several logical sub-modules:
//!
//! - **[`handle`]**: opaque handles for every object kind the facade
//!   hands out.
//! - **[`common`]**: backend identification and adapter information.
//! - **[`format`]**: data formats shared by resources and views.
//! - **[`resource`]**: resource descriptors, mapping and update types.
//! - **[`view`]**: resource view descriptors.
//! - **[`sampler`]**: sampler descriptors.
//! - **[`pipeline`]**: pipeline subobjects, state descriptions, layouts.
//! - **[`descriptor`]**: descriptor types, updates and copies.
//! - **[`query`]**: query pool types.
//! - **[`capability`]**: optional device capabilities.

pub mod capability;
pub mod common;
pub mod descriptor;
pub mod format;
pub mod handle;
pub mod pipeline;
pub mod query;
pub mod resource;
pub mod sampler;
pub mod view;

pub use self::capability::DeviceCapability;
pub use self::common::{AdapterInfo, DeviceType, GraphicsBackendType, ShaderStageFlags};
pub use self::descriptor::{
    BufferRange, DescriptorData, DescriptorRange, DescriptorSetCopy, DescriptorSetUpdate,
    DescriptorType, PipelineLayoutParam,
};
pub use self::format::Format;
pub use self::handle::{
    DescriptorPool, DescriptorSet, Pipeline, PipelineLayout, QueryPool, Resource, ResourceView,
    Sampler,
};
pub use self::pipeline::{
    BlendDesc, BlendFactor, BlendOperation, CompareFunction, CullMode, DepthStencilDesc, FillMode,
    InputElementDesc, PipelineSubobject, PrimitiveTopology, RasterizerDesc, ShaderDesc, StencilOp,
    StencilOpDesc, TargetBlendDesc,
};
pub use self::query::QueryType;
pub use self::resource::{
    BufferDesc, MapAccess, MappedSubresource, MemoryHeap, ResourceDesc, ResourceUsage,
    SubresourceBox, SubresourceData, TextureDesc, TextureDimension,
};
pub use self::sampler::{AddressMode, FilterMode, SamplerDesc};
pub use self::view::{ResourceViewDesc, TextureViewDimension, REMAINING};
