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

//! Common, backend-agnostic identification types.

use crate::argus_bitflags;

/// A backend-agnostic representation of a native graphics API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GraphicsBackendType {
    /// Vulkan API.
    Vulkan,
    /// Microsoft's DirectX 12 API.
    Dx12,
    /// An unknown or unsupported backend.
    #[default]
    Unknown,
}

/// The physical type of a graphics device (GPU).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeviceType {
    /// A GPU integrated into the CPU.
    IntegratedGpu,
    /// A discrete, dedicated GPU.
    DiscreteGpu,
    /// A virtualized or software-based GPU.
    VirtualGpu,
    /// A software renderer running on the CPU.
    Cpu,
    /// An unknown or unsupported device type.
    #[default]
    Unknown,
}

/// Information about the adapter a device was created on.
#[derive(Debug, Clone, Default)]
pub struct AdapterInfo {
    /// Human-readable adapter name reported by the driver.
    pub name: String,
    /// PCI vendor identifier.
    pub vendor_id: u32,
    /// PCI device identifier.
    pub device_id: u32,
    /// Physical device type.
    pub device_type: DeviceType,
}

argus_bitflags! {
    /// Flags representing which shader stages can access a binding.
    pub struct ShaderStageFlags: u32 {
        /// The vertex shader stage.
        const VERTEX = 1 << 0;
        /// The geometry shader stage.
        const GEOMETRY = 1 << 1;
        /// The pixel (fragment) shader stage.
        const PIXEL = 1 << 2;
        /// The compute shader stage.
        const COMPUTE = 1 << 3;
        /// All graphics stages.
        const ALL_GRAPHICS = Self::VERTEX.bits() | Self::GEOMETRY.bits() | Self::PIXEL.bits();
        /// All stages.
        const ALL = Self::ALL_GRAPHICS.bits() | Self::COMPUTE.bits();
    }
}
