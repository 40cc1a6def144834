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

//! The Direct3D 12 device facade.

use std::ffi::c_void;
use std::sync::Mutex;

use windows::core::{Interface, PCWSTR};
use windows::Win32::Graphics::Direct3D::ID3DBlob;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;

use argus_core::api::*;
use argus_core::error::{PipelineError, ResourceError};
use argus_core::object::{ApiObject, ApiObjectWrapper, Guid};
use argus_core::registry::{ObjectKind, ObjectRegistry};
use argus_core::traits::GraphicsDevice;
use argus_core::transient::DescriptorPoolRing;

use crate::conversions::*;
use crate::heaps::DescriptorHeapArena;
use crate::objects::{
    DescriptorSetData, PipelineData, QueryPoolData, ResourceData, ResourceViewData,
    RootSignatureData,
};
use crate::queue::D3d12Queue;

/// Number of shader-visible heaps in the transient ring, covering the
/// in-flight frame depth.
const TRANSIENT_HEAP_COUNT: usize = 4;

/// `D3D12_DEFAULT_SHADER_4_COMPONENT_MAPPING`.
const DEFAULT_COMPONENT_MAPPING: u32 = 0x1688;

/// The Direct3D 12 implementation of the device facade.
///
/// Views and samplers are slots in CPU staging heaps; descriptor sets
/// are ranges carved from shader-visible heaps; transient per-frame
/// descriptors rotate over a ring of shader-visible heaps the same way
/// the Vulkan backend rotates descriptor pools.
pub struct D3d12Device {
    wrapper: ApiObjectWrapper<u64>,
    device: ID3D12Device,
    adapter_info: AdapterInfo,

    resources: ObjectRegistry<ResourceData>,
    views: ObjectRegistry<ResourceViewData>,
    layouts: ObjectRegistry<RootSignatureData>,
    pipelines: ObjectRegistry<PipelineData>,
    sets: ObjectRegistry<DescriptorSetData>,
    query_pools: ObjectRegistry<QueryPoolData>,

    rtv_heap: Mutex<DescriptorHeapArena>,
    dsv_heap: Mutex<DescriptorHeapArena>,
    srv_heap: Mutex<DescriptorHeapArena>,
    sampler_heap: Mutex<DescriptorHeapArena>,

    gpu_resource_heap: Mutex<DescriptorHeapArena>,
    gpu_sampler_heap: Mutex<DescriptorHeapArena>,
    transient_heaps: [Mutex<DescriptorHeapArena>; TRANSIENT_HEAP_COUNT],
    transient_ring: DescriptorPoolRing<usize, TRANSIENT_HEAP_COUNT>,

    queues: Vec<D3d12Queue>,
}

// The ID3D12Device interface and everything created from it is
// free-threaded; the COM pointers themselves are safe to share.
unsafe impl Send for D3d12Device {}
unsafe impl Sync for D3d12Device {}

fn backend_error(err: windows::core::Error) -> ResourceError {
    ResourceError::BackendError(err.to_string())
}

fn creation_error(kind: ObjectKind, err: windows::core::Error) -> ResourceError {
    ResourceError::CreationFailed {
        kind,
        details: err.to_string(),
    }
}

impl D3d12Device {
    /// Wraps an already-created `ID3D12Device` in the facade.
    ///
    /// `adapter_info` comes from the DXGI adapter the device was created
    /// on; `queues` are the device's submission queues.
    pub fn new(
        device: ID3D12Device,
        adapter_info: AdapterInfo,
        queues: Vec<ID3D12CommandQueue>,
    ) -> anyhow::Result<Self> {
        log::info!(
            "creating D3D12 device facade on '{}' (vendor {:#06x})",
            adapter_info.name,
            adapter_info.vendor_id
        );

        let rtv_heap =
            DescriptorHeapArena::new(&device, D3D12_DESCRIPTOR_HEAP_TYPE_RTV, 1024, false)?;
        let dsv_heap =
            DescriptorHeapArena::new(&device, D3D12_DESCRIPTOR_HEAP_TYPE_DSV, 512, false)?;
        let srv_heap = DescriptorHeapArena::new(
            &device,
            D3D12_DESCRIPTOR_HEAP_TYPE_CBV_SRV_UAV,
            4096,
            false,
        )?;
        let sampler_heap =
            DescriptorHeapArena::new(&device, D3D12_DESCRIPTOR_HEAP_TYPE_SAMPLER, 512, false)?;

        let gpu_resource_heap = DescriptorHeapArena::new(
            &device,
            D3D12_DESCRIPTOR_HEAP_TYPE_CBV_SRV_UAV,
            8192,
            true,
        )?;
        let gpu_sampler_heap =
            DescriptorHeapArena::new(&device, D3D12_DESCRIPTOR_HEAP_TYPE_SAMPLER, 1024, true)?;
        let transient_heaps = [
            Mutex::new(DescriptorHeapArena::new(
                &device,
                D3D12_DESCRIPTOR_HEAP_TYPE_CBV_SRV_UAV,
                2048,
                true,
            )?),
            Mutex::new(DescriptorHeapArena::new(
                &device,
                D3D12_DESCRIPTOR_HEAP_TYPE_CBV_SRV_UAV,
                2048,
                true,
            )?),
            Mutex::new(DescriptorHeapArena::new(
                &device,
                D3D12_DESCRIPTOR_HEAP_TYPE_CBV_SRV_UAV,
                2048,
                true,
            )?),
            Mutex::new(DescriptorHeapArena::new(
                &device,
                D3D12_DESCRIPTOR_HEAP_TYPE_CBV_SRV_UAV,
                2048,
                true,
            )?),
        ];

        let queues = queues
            .into_iter()
            .map(|queue| D3d12Queue::new(&device, queue))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            wrapper: ApiObjectWrapper::new(device.as_raw() as u64),
            device,
            adapter_info,
            resources: ObjectRegistry::new(),
            views: ObjectRegistry::new(),
            layouts: ObjectRegistry::new(),
            pipelines: ObjectRegistry::new(),
            sets: ObjectRegistry::new(),
            query_pools: ObjectRegistry::new(),
            rtv_heap: Mutex::new(rtv_heap),
            dsv_heap: Mutex::new(dsv_heap),
            srv_heap: Mutex::new(srv_heap),
            sampler_heap: Mutex::new(sampler_heap),
            gpu_resource_heap: Mutex::new(gpu_resource_heap),
            gpu_sampler_heap: Mutex::new(gpu_sampler_heap),
            transient_heaps,
            transient_ring: DescriptorPoolRing::new([0, 1, 2, 3]),
            queues,
        })
    }

    /// Returns the device's submission queues.
    pub fn queues(&self) -> &[D3d12Queue] {
        &self.queues
    }

    /// Rotates the transient heap ring and resets the heap that is now
    /// current. The caller guarantees the GPU finished all work
    /// referencing that heap.
    pub fn advance_transient_descriptor_heap(&self) -> usize {
        let index = self.transient_ring.advance();
        self.transient_heaps[index].lock().unwrap().reset();
        index
    }

    /// Carves `count` transient descriptors out of the current
    /// shader-visible heap, returning the first slot's GPU handle.
    pub fn allocate_transient_descriptors(
        &self,
        count: u32,
    ) -> Result<D3D12_GPU_DESCRIPTOR_HANDLE, ResourceError> {
        let index = self.transient_ring.current();
        let mut heap = self.transient_heaps[index].lock().unwrap();
        let slot = heap.allocate(count).ok_or(ResourceError::OutOfMemory)?;
        Ok(heap.gpu_handle(slot))
    }

    fn native_resource(&self, resource: Resource) -> Result<ID3D12Resource, ResourceError> {
        self.resources
            .read(resource, |data| data.resource.clone())
            .ok_or(ResourceError::InvalidHandle)
    }

    fn map_pointer(
        &self,
        resource: Resource,
        subresource: u32,
    ) -> Result<*mut u8, ResourceError> {
        let native = self.native_resource(resource)?;
        let mut pointer: *mut c_void = std::ptr::null_mut();
        unsafe { native.Map(subresource, None, Some(&mut pointer)) }.map_err(backend_error)?;
        Ok(pointer.cast())
    }
}

impl std::fmt::Debug for D3d12Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("D3d12Device")
            .field("device", &self.wrapper.native())
            .field("adapter", &self.adapter_info.name)
            .field("resources", &self.resources)
            .finish_non_exhaustive()
    }
}

impl ApiObject for D3d12Device {
    fn native(&self) -> u64 {
        self.wrapper.native()
    }

    fn get_private_data(&self, key: &Guid) -> u64 {
        self.wrapper.get_private_data(key)
    }

    fn set_private_data(&self, key: &Guid, value: u64) {
        self.wrapper.set_private_data(key, value)
    }
}

impl GraphicsDevice for D3d12Device {
    fn api(&self) -> GraphicsBackendType {
        GraphicsBackendType::Dx12
    }

    fn adapter_info(&self) -> AdapterInfo {
        self.adapter_info.clone()
    }

    fn check_capability(&self, capability: DeviceCapability) -> bool {
        match capability {
            DeviceCapability::ComputeShader
            | DeviceCapability::GeometryShader
            | DeviceCapability::DualSourceBlend
            | DeviceCapability::IndependentBlend
            | DeviceCapability::FillModeNonSolid
            | DeviceCapability::SamplerAnisotropic
            | DeviceCapability::SamplerCompare
            | DeviceCapability::PartialPushConstantUpdates
            | DeviceCapability::CopyBufferRegion
            | DeviceCapability::CopyBufferToTexture
            | DeviceCapability::ResolveRegion
            | DeviceCapability::CopyQueryPoolResults
            | DeviceCapability::SharedResource => true,
            // Descriptors always pair a sampler register with a texture
            // register on D3D12; there is no combined object.
            DeviceCapability::SamplerWithResourceView => false,
            DeviceCapability::BlitRegion => false,
            DeviceCapability::LogicOp | DeviceCapability::ConservativeRasterization => {
                let mut options = D3D12_FEATURE_DATA_D3D12_OPTIONS::default();
                let supported = unsafe {
                    self.device.CheckFeatureSupport(
                        D3D12_FEATURE_D3D12_OPTIONS,
                        (&mut options as *mut D3D12_FEATURE_DATA_D3D12_OPTIONS).cast(),
                        std::mem::size_of::<D3D12_FEATURE_DATA_D3D12_OPTIONS>() as u32,
                    )
                }
                .is_ok();
                supported
                    && if capability == DeviceCapability::LogicOp {
                        options.OutputMergerLogicOp.as_bool()
                    } else {
                        options.ConservativeRasterizationTier
                            != D3D12_CONSERVATIVE_RASTERIZATION_TIER_NOT_SUPPORTED
                    }
            }
        }
    }

    fn check_format_support(&self, format: Format, usage: ResourceUsage) -> bool {
        let mut support = D3D12_FEATURE_DATA_FORMAT_SUPPORT {
            Format: to_dxgi_format(format),
            ..Default::default()
        };
        if unsafe {
            self.device.CheckFeatureSupport(
                D3D12_FEATURE_FORMAT_SUPPORT,
                (&mut support as *mut D3D12_FEATURE_DATA_FORMAT_SUPPORT).cast(),
                std::mem::size_of::<D3D12_FEATURE_DATA_FORMAT_SUPPORT>() as u32,
            )
        }
        .is_err()
        {
            return false;
        }

        let mut required = D3D12_FORMAT_SUPPORT1(0);
        if usage.contains(ResourceUsage::SHADER_RESOURCE) {
            required |= D3D12_FORMAT_SUPPORT1_SHADER_SAMPLE;
        }
        if usage.contains(ResourceUsage::UNORDERED_ACCESS) {
            required |= D3D12_FORMAT_SUPPORT1_TYPED_UNORDERED_ACCESS_VIEW;
        }
        if usage.contains(ResourceUsage::RENDER_TARGET) {
            required |= D3D12_FORMAT_SUPPORT1_RENDER_TARGET;
        }
        if usage.intersects(ResourceUsage::DEPTH_STENCIL) {
            required |= D3D12_FORMAT_SUPPORT1_DEPTH_STENCIL;
        }
        (support.Support1 & required) == required
    }

    fn create_sampler(&self, desc: &SamplerDesc) -> Result<Sampler, ResourceError> {
        let mut heap = self.sampler_heap.lock().unwrap();
        let slot = heap.allocate(1).ok_or(ResourceError::OutOfMemory)?;
        let native_desc = D3D12_SAMPLER_DESC {
            Filter: to_filter(
                desc.min_filter,
                desc.mag_filter,
                desc.mip_filter,
                desc.compare.is_some(),
            ),
            AddressU: to_address_mode(desc.address_u),
            AddressV: to_address_mode(desc.address_v),
            AddressW: to_address_mode(desc.address_w),
            MipLODBias: desc.mip_lod_bias,
            MaxAnisotropy: desc.max_anisotropy as u32,
            ComparisonFunc: to_comparison_func(desc.compare.unwrap_or_default()),
            BorderColor: desc.border_color,
            MinLOD: desc.min_lod,
            MaxLOD: desc.max_lod,
        };
        let handle = heap.cpu_handle(slot);
        unsafe { self.device.CreateSampler(&native_desc, handle) };
        Ok(Sampler(handle.ptr as u64))
    }

    fn destroy_sampler(&self, sampler: Sampler) {
        if sampler.is_null() {
            return;
        }
        let mut heap = self.sampler_heap.lock().unwrap();
        if let Some(slot) = heap.slot_of(sampler.as_raw() as usize) {
            heap.free(slot, 1);
        }
    }

    fn create_resource(
        &self,
        desc: &ResourceDesc,
        initial_data: Option<&[SubresourceData<'_>]>,
        initial_state: ResourceUsage,
    ) -> Result<Resource, ResourceError> {
        let (native_desc, heap) = match desc {
            ResourceDesc::Buffer(buffer) => (
                D3D12_RESOURCE_DESC {
                    Dimension: D3D12_RESOURCE_DIMENSION_BUFFER,
                    Alignment: 0,
                    Width: buffer.size,
                    Height: 1,
                    DepthOrArraySize: 1,
                    MipLevels: 1,
                    Format: DXGI_FORMAT_UNKNOWN,
                    SampleDesc: DXGI_SAMPLE_DESC {
                        Count: 1,
                        Quality: 0,
                    },
                    Layout: D3D12_TEXTURE_LAYOUT_ROW_MAJOR,
                    Flags: to_resource_flags(buffer.usage),
                },
                buffer.heap,
            ),
            ResourceDesc::Texture(texture) => (
                D3D12_RESOURCE_DESC {
                    Dimension: match texture.dimension {
                        TextureDimension::D1 => D3D12_RESOURCE_DIMENSION_TEXTURE1D,
                        TextureDimension::D2 => D3D12_RESOURCE_DIMENSION_TEXTURE2D,
                        TextureDimension::D3 => D3D12_RESOURCE_DIMENSION_TEXTURE3D,
                    },
                    Alignment: 0,
                    Width: u64::from(texture.width),
                    Height: texture.height,
                    DepthOrArraySize: texture.depth_or_layers.max(1),
                    MipLevels: texture.levels.max(1),
                    Format: to_dxgi_format(texture.format),
                    SampleDesc: DXGI_SAMPLE_DESC {
                        Count: texture.samples.max(1),
                        Quality: 0,
                    },
                    Layout: D3D12_TEXTURE_LAYOUT_UNKNOWN,
                    Flags: to_resource_flags(texture.usage),
                },
                texture.heap,
            ),
        };

        // Upload and readback heaps mandate their starting state.
        let state = match heap {
            MemoryHeap::CpuToGpu => D3D12_RESOURCE_STATE_GENERIC_READ,
            MemoryHeap::GpuToCpu => D3D12_RESOURCE_STATE_COPY_DEST,
            MemoryHeap::GpuOnly => to_resource_states(initial_state),
        };
        let heap_properties = D3D12_HEAP_PROPERTIES {
            Type: to_heap_type(heap),
            ..Default::default()
        };

        let mut native: Option<ID3D12Resource> = None;
        unsafe {
            self.device.CreateCommittedResource(
                &heap_properties,
                D3D12_HEAP_FLAG_NONE,
                &native_desc,
                state,
                None,
                &mut native,
            )
        }
        .map_err(|err| creation_error(ObjectKind::Resource, err))?;
        let native = native.ok_or_else(|| ResourceError::CreationFailed {
            kind: ObjectKind::Resource,
            details: "driver returned no resource".into(),
        })?;

        let handle = Resource(native.as_raw() as u64);
        self.resources.register(
            handle,
            ResourceData {
                desc: *desc,
                resource: native,
                name: None,
            },
        );

        if let Some(slices) = initial_data {
            if heap == MemoryHeap::GpuOnly {
                self.destroy_resource(handle);
                return Err(ResourceError::BackendError(
                    "initial data for device-local resources requires an upload queue".into(),
                ));
            }
            match desc {
                ResourceDesc::Buffer(_) => {
                    if let Some(data) = slices.first() {
                        self.update_buffer_region(data.data, handle, 0)?;
                    }
                }
                ResourceDesc::Texture(_) => {
                    for (subresource, data) in slices.iter().enumerate() {
                        self.update_texture_region(data, handle, subresource as u32, None)?;
                    }
                }
            }
        }
        Ok(handle)
    }

    fn destroy_resource(&self, resource: Resource) {
        // Dropping the record releases the COM reference.
        self.resources.unregister(resource);
    }

    fn resource_desc(&self, resource: Resource) -> Option<ResourceDesc> {
        self.resources.read(resource, |data| data.desc)
    }

    fn set_resource_name(&self, resource: Resource, name: &str) {
        let native = self
            .resources
            .write(resource, |data| {
                data.name = Some(name.to_string());
                data.resource.clone()
            });
        if let Some(native) = native {
            let wide: Vec<u16> = name.encode_utf16().chain(Some(0)).collect();
            let _ = unsafe { native.SetName(PCWSTR(wide.as_ptr())) };
        }
    }

    fn create_resource_view(
        &self,
        resource: Resource,
        usage: ResourceUsage,
        desc: &ResourceViewDesc,
    ) -> Result<ResourceView, ResourceError> {
        let native = self.native_resource(resource)?;

        let (arena, heap_type) = if usage.contains(ResourceUsage::RENDER_TARGET) {
            (&self.rtv_heap, D3D12_DESCRIPTOR_HEAP_TYPE_RTV)
        } else if usage.intersects(ResourceUsage::DEPTH_STENCIL) {
            (&self.dsv_heap, D3D12_DESCRIPTOR_HEAP_TYPE_DSV)
        } else {
            (&self.srv_heap, D3D12_DESCRIPTOR_HEAP_TYPE_CBV_SRV_UAV)
        };
        let mut heap = arena.lock().unwrap();
        let slot = heap.allocate(1).ok_or(ResourceError::OutOfMemory)?;
        let handle = heap.cpu_handle(slot);

        match heap_type {
            D3D12_DESCRIPTOR_HEAP_TYPE_RTV => unsafe {
                self.device.CreateRenderTargetView(&native, None, handle);
            },
            D3D12_DESCRIPTOR_HEAP_TYPE_DSV => unsafe {
                self.device.CreateDepthStencilView(&native, None, handle);
            },
            _ if usage.contains(ResourceUsage::UNORDERED_ACCESS) => unsafe {
                self.device.CreateUnorderedAccessView(
                    &native,
                    None::<&ID3D12Resource>,
                    None,
                    handle,
                );
            },
            _ => {
                let srv_desc = match desc {
                    ResourceViewDesc::Texture {
                        format,
                        first_level,
                        levels,
                        ..
                    } => Some(D3D12_SHADER_RESOURCE_VIEW_DESC {
                        Format: to_dxgi_format(*format),
                        ViewDimension: D3D12_SRV_DIMENSION_TEXTURE2D,
                        Shader4ComponentMapping: DEFAULT_COMPONENT_MAPPING,
                        Anonymous: D3D12_SHADER_RESOURCE_VIEW_DESC_0 {
                            Texture2D: D3D12_TEX2D_SRV {
                                MostDetailedMip: *first_level,
                                MipLevels: *levels,
                                PlaneSlice: 0,
                                ResourceMinLODClamp: 0.0,
                            },
                        },
                    }),
                    ResourceViewDesc::Buffer { .. } => None,
                };
                match srv_desc {
                    Some(srv_desc) => unsafe {
                        self.device
                            .CreateShaderResourceView(&native, Some(&srv_desc), handle);
                    },
                    None => unsafe {
                        self.device.CreateShaderResourceView(&native, None, handle);
                    },
                }
            }
        }

        let view = ResourceView(handle.ptr as u64);
        self.views.register(
            view,
            ResourceViewData {
                resource,
                desc: *desc,
                heap_type,
                slot,
                name: None,
            },
        );
        Ok(view)
    }

    fn destroy_resource_view(&self, view: ResourceView) {
        let Some(data) = self.views.unregister(view) else {
            return;
        };
        let arena = match data.heap_type {
            D3D12_DESCRIPTOR_HEAP_TYPE_RTV => &self.rtv_heap,
            D3D12_DESCRIPTOR_HEAP_TYPE_DSV => &self.dsv_heap,
            _ => &self.srv_heap,
        };
        arena.lock().unwrap().free(data.slot, 1);
    }

    fn resource_from_view(&self, view: ResourceView) -> Option<Resource> {
        self.views.read(view, |data| data.resource)
    }

    fn resource_view_desc(&self, view: ResourceView) -> Option<ResourceViewDesc> {
        self.views.read(view, |data| data.desc)
    }

    fn set_resource_view_name(&self, view: ResourceView, name: &str) {
        self.views
            .write(view, |data| data.name = Some(name.to_string()));
    }

    fn map_buffer_region(
        &self,
        resource: Resource,
        offset: u64,
        _size: u64,
        _access: MapAccess,
    ) -> Result<*mut u8, ResourceError> {
        let pointer = self.map_pointer(resource, 0)?;
        Ok(unsafe { pointer.add(offset as usize) })
    }

    fn unmap_buffer_region(&self, resource: Resource) {
        if let Ok(native) = self.native_resource(resource) {
            unsafe { native.Unmap(0, None) };
        }
    }

    fn map_texture_region(
        &self,
        resource: Resource,
        subresource: u32,
        _bounds: Option<&SubresourceBox>,
        _access: MapAccess,
    ) -> Result<MappedSubresource, ResourceError> {
        let native = self.native_resource(resource)?;
        let desc = unsafe { native.GetDesc() };

        let mut footprint = D3D12_PLACED_SUBRESOURCE_FOOTPRINT::default();
        let mut rows = 0u32;
        unsafe {
            self.device.GetCopyableFootprints(
                &desc,
                subresource,
                1,
                0,
                Some(&mut footprint),
                Some(&mut rows),
                None,
                None,
            );
        }

        let pointer = self.map_pointer(resource, subresource)?;
        Ok(MappedSubresource {
            data: pointer,
            row_pitch: footprint.Footprint.RowPitch,
            slice_pitch: footprint.Footprint.RowPitch * rows,
        })
    }

    fn unmap_texture_region(&self, resource: Resource, subresource: u32) {
        if let Ok(native) = self.native_resource(resource) {
            unsafe { native.Unmap(subresource, None) };
        }
    }

    fn update_buffer_region(
        &self,
        data: &[u8],
        resource: Resource,
        offset: u64,
    ) -> Result<(), ResourceError> {
        let pointer = self.map_buffer_region(resource, offset, data.len() as u64, MapAccess::WriteOnly)?;
        unsafe {
            std::ptr::copy_nonoverlapping(data.as_ptr(), pointer, data.len());
        }
        self.unmap_buffer_region(resource);
        Ok(())
    }

    fn update_texture_region(
        &self,
        data: &SubresourceData<'_>,
        resource: Resource,
        subresource: u32,
        bounds: Option<&SubresourceBox>,
    ) -> Result<(), ResourceError> {
        if bounds.is_some() {
            return Err(ResourceError::BackendError(
                "sub-region texture updates are not supported on this path".into(),
            ));
        }
        let mapped = self.map_texture_region(resource, subresource, None, MapAccess::WriteOnly)?;
        let row_count = data.data.len() / data.row_pitch.max(1) as usize;
        let copy_pitch = data.row_pitch.min(mapped.row_pitch) as usize;
        for row in 0..row_count {
            let source = &data.data[row * data.row_pitch as usize..][..copy_pitch];
            unsafe {
                std::ptr::copy_nonoverlapping(
                    source.as_ptr(),
                    mapped.data.add(row * mapped.row_pitch as usize),
                    copy_pitch,
                );
            }
        }
        self.unmap_texture_region(resource, subresource);
        Ok(())
    }

    fn create_pipeline_layout(
        &self,
        params: &[PipelineLayoutParam],
    ) -> Result<PipelineLayout, ResourceError> {
        let table_ranges: Vec<Vec<D3D12_DESCRIPTOR_RANGE>> = params
            .iter()
            .map(|param| match param {
                PipelineLayoutParam::DescriptorTable(ranges) => ranges
                    .iter()
                    .map(|range| D3D12_DESCRIPTOR_RANGE {
                        RangeType: to_range_type(range.ty),
                        NumDescriptors: range.count,
                        BaseShaderRegister: range.binding,
                        RegisterSpace: 0,
                        OffsetInDescriptorsFromTableStart:
                            D3D12_DESCRIPTOR_RANGE_OFFSET_APPEND,
                    })
                    .collect(),
                PipelineLayoutParam::PushConstants { .. } => Vec::new(),
            })
            .collect();

        let root_params: Vec<D3D12_ROOT_PARAMETER> = params
            .iter()
            .zip(&table_ranges)
            .map(|(param, ranges)| match param {
                PipelineLayoutParam::DescriptorTable(tables) => D3D12_ROOT_PARAMETER {
                    ParameterType: D3D12_ROOT_PARAMETER_TYPE_DESCRIPTOR_TABLE,
                    Anonymous: D3D12_ROOT_PARAMETER_0 {
                        DescriptorTable: D3D12_ROOT_DESCRIPTOR_TABLE {
                            NumDescriptorRanges: ranges.len() as u32,
                            pDescriptorRanges: ranges.as_ptr(),
                        },
                    },
                    ShaderVisibility: to_shader_visibility(
                        tables
                            .first()
                            .map(|range| range.visibility)
                            .unwrap_or(ShaderStageFlags::ALL),
                    ),
                },
                PipelineLayoutParam::PushConstants { count, visibility } => D3D12_ROOT_PARAMETER {
                    ParameterType: D3D12_ROOT_PARAMETER_TYPE_32BIT_CONSTANTS,
                    Anonymous: D3D12_ROOT_PARAMETER_0 {
                        Constants: D3D12_ROOT_CONSTANTS {
                            ShaderRegister: 0,
                            RegisterSpace: 0,
                            Num32BitValues: *count,
                        },
                    },
                    ShaderVisibility: to_shader_visibility(*visibility),
                },
            })
            .collect();

        let desc = D3D12_ROOT_SIGNATURE_DESC {
            NumParameters: root_params.len() as u32,
            pParameters: root_params.as_ptr(),
            NumStaticSamplers: 0,
            pStaticSamplers: std::ptr::null(),
            Flags: D3D12_ROOT_SIGNATURE_FLAG_ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT,
        };

        let mut blob: Option<ID3DBlob> = None;
        unsafe {
            D3D12SerializeRootSignature(&desc, D3D_ROOT_SIGNATURE_VERSION_1, &mut blob, None)
        }
        .map_err(|err| {
            ResourceError::from(PipelineError::LayoutCreationFailed(err.to_string()))
        })?;
        let blob = blob.ok_or_else(|| {
            ResourceError::from(PipelineError::LayoutCreationFailed(
                "serializer returned no blob".into(),
            ))
        })?;

        let bytes = unsafe {
            std::slice::from_raw_parts(blob.GetBufferPointer().cast::<u8>(), blob.GetBufferSize())
        };
        let root_signature: ID3D12RootSignature =
            unsafe { self.device.CreateRootSignature(0, bytes) }.map_err(|err| {
                ResourceError::from(PipelineError::LayoutCreationFailed(err.to_string()))
            })?;

        let handle = PipelineLayout(root_signature.as_raw() as u64);
        self.layouts.register(
            handle,
            RootSignatureData {
                params: params.to_vec(),
                root_signature,
            },
        );
        Ok(handle)
    }

    fn destroy_pipeline_layout(&self, layout: PipelineLayout) {
        self.layouts.unregister(layout);
    }

    fn create_pipeline(
        &self,
        layout: PipelineLayout,
        subobjects: &[PipelineSubobject<'_>],
    ) -> Result<Pipeline, ResourceError> {
        let root_signature = self
            .layouts
            .read(layout, |data| data.root_signature.clone())
            .ok_or(ResourceError::InvalidHandle)?;

        let bytecode = |shader: &ShaderDesc<'_>| D3D12_SHADER_BYTECODE {
            pShaderBytecode: shader.code.as_ptr().cast(),
            BytecodeLength: shader.code.len(),
        };

        let compute_shader = subobjects.iter().find_map(|subobject| match subobject {
            PipelineSubobject::ComputeShader(shader) => Some(*shader),
            _ => None,
        });
        let pso: ID3D12PipelineState = if let Some(shader) = compute_shader {
            let desc = D3D12_COMPUTE_PIPELINE_STATE_DESC {
                pRootSignature: unsafe { std::mem::transmute_copy(&root_signature) },
                CS: bytecode(shader),
                ..Default::default()
            };
            unsafe { self.device.CreateComputePipelineState(&desc) }
                .map_err(|err| creation_error(ObjectKind::Pipeline, err))?
        } else {
            let mut desc = D3D12_GRAPHICS_PIPELINE_STATE_DESC {
                pRootSignature: unsafe { std::mem::transmute_copy(&root_signature) },
                SampleMask: u32::MAX,
                SampleDesc: DXGI_SAMPLE_DESC {
                    Count: 1,
                    Quality: 0,
                },
                PrimitiveTopologyType: D3D12_PRIMITIVE_TOPOLOGY_TYPE_TRIANGLE,
                ..Default::default()
            };
            desc.RasterizerState = D3D12_RASTERIZER_DESC {
                FillMode: D3D12_FILL_MODE_SOLID,
                CullMode: D3D12_CULL_MODE_BACK,
                DepthClipEnable: true.into(),
                ..Default::default()
            };

            let mut semantics: Vec<std::ffi::CString> = Vec::new();
            let mut input_elements: Vec<D3D12_INPUT_ELEMENT_DESC> = Vec::new();

            for subobject in subobjects {
                match subobject {
                    PipelineSubobject::VertexShader(shader) => desc.VS = bytecode(shader),
                    PipelineSubobject::GeometryShader(shader) => desc.GS = bytecode(shader),
                    PipelineSubobject::PixelShader(shader) => desc.PS = bytecode(shader),
                    PipelineSubobject::ComputeShader(_) => unreachable!(),
                    PipelineSubobject::InputLayout(elements) => {
                        for element in *elements {
                            semantics.push(
                                std::ffi::CString::new(element.semantic).unwrap_or_default(),
                            );
                        }
                        input_elements = elements
                            .iter()
                            .zip(&semantics)
                            .map(|(element, semantic)| D3D12_INPUT_ELEMENT_DESC {
                                SemanticName: windows::core::PCSTR(semantic.as_ptr().cast()),
                                SemanticIndex: element.semantic_index,
                                Format: to_dxgi_format(element.format),
                                InputSlot: element.buffer_binding,
                                AlignedByteOffset: element.offset,
                                InputSlotClass: if element.instance_step_rate > 0 {
                                    D3D12_INPUT_CLASSIFICATION_PER_INSTANCE_DATA
                                } else {
                                    D3D12_INPUT_CLASSIFICATION_PER_VERTEX_DATA
                                },
                                InstanceDataStepRate: element.instance_step_rate,
                            })
                            .collect();
                    }
                    PipelineSubobject::BlendState(blend) => {
                        desc.BlendState.AlphaToCoverageEnable = blend.alpha_to_coverage.into();
                        desc.BlendState.IndependentBlendEnable = true.into();
                        for (index, target) in blend.targets.iter().enumerate() {
                            desc.BlendState.RenderTarget[index] = D3D12_RENDER_TARGET_BLEND_DESC {
                                BlendEnable: target.blend_enable.into(),
                                LogicOpEnable: false.into(),
                                SrcBlend: to_blend_factor(target.source_color),
                                DestBlend: to_blend_factor(target.dest_color),
                                BlendOp: to_blend_op(target.color_op),
                                SrcBlendAlpha: to_blend_factor(target.source_alpha),
                                DestBlendAlpha: to_blend_factor(target.dest_alpha),
                                BlendOpAlpha: to_blend_op(target.alpha_op),
                                LogicOp: D3D12_LOGIC_OP_NOOP,
                                RenderTargetWriteMask: target.write_mask,
                            };
                        }
                    }
                    PipelineSubobject::RasterizerState(rasterizer) => {
                        desc.RasterizerState = D3D12_RASTERIZER_DESC {
                            FillMode: match rasterizer.fill_mode {
                                FillMode::Solid => D3D12_FILL_MODE_SOLID,
                                FillMode::Wireframe => D3D12_FILL_MODE_WIREFRAME,
                            },
                            CullMode: match rasterizer.cull_mode {
                                CullMode::None => D3D12_CULL_MODE_NONE,
                                CullMode::Front => D3D12_CULL_MODE_FRONT,
                                CullMode::Back => D3D12_CULL_MODE_BACK,
                            },
                            FrontCounterClockwise: rasterizer.front_counter_clockwise.into(),
                            DepthClipEnable: rasterizer.depth_clip.into(),
                            ConservativeRaster: if rasterizer.conservative {
                                D3D12_CONSERVATIVE_RASTERIZATION_MODE_ON
                            } else {
                                D3D12_CONSERVATIVE_RASTERIZATION_MODE_OFF
                            },
                            ..Default::default()
                        };
                    }
                    PipelineSubobject::DepthStencilState(depth_stencil) => {
                        let stencil_desc = |ops: &StencilOpDesc| D3D12_DEPTH_STENCILOP_DESC {
                            StencilFailOp: to_stencil_op(ops.fail),
                            StencilDepthFailOp: to_stencil_op(ops.depth_fail),
                            StencilPassOp: to_stencil_op(ops.pass),
                            StencilFunc: to_comparison_func(ops.func),
                        };
                        desc.DepthStencilState = D3D12_DEPTH_STENCIL_DESC {
                            DepthEnable: depth_stencil.depth_enable.into(),
                            DepthWriteMask: if depth_stencil.depth_write {
                                D3D12_DEPTH_WRITE_MASK_ALL
                            } else {
                                D3D12_DEPTH_WRITE_MASK_ZERO
                            },
                            DepthFunc: to_comparison_func(depth_stencil.depth_func),
                            StencilEnable: depth_stencil.stencil_enable.into(),
                            StencilReadMask: depth_stencil.stencil_read_mask,
                            StencilWriteMask: depth_stencil.stencil_write_mask,
                            FrontFace: stencil_desc(&depth_stencil.front),
                            BackFace: stencil_desc(&depth_stencil.back),
                        };
                    }
                    PipelineSubobject::PrimitiveTopology(topology) => {
                        desc.PrimitiveTopologyType = match topology {
                            PrimitiveTopology::PointList => D3D12_PRIMITIVE_TOPOLOGY_TYPE_POINT,
                            PrimitiveTopology::LineList | PrimitiveTopology::LineStrip => {
                                D3D12_PRIMITIVE_TOPOLOGY_TYPE_LINE
                            }
                            _ => D3D12_PRIMITIVE_TOPOLOGY_TYPE_TRIANGLE,
                        };
                    }
                    PipelineSubobject::RenderTargetFormats(formats) => {
                        desc.NumRenderTargets = formats.len() as u32;
                        for (index, format) in formats.iter().enumerate().take(8) {
                            desc.RTVFormats[index] = to_dxgi_format(*format);
                        }
                    }
                    PipelineSubobject::DepthStencilFormat(format) => {
                        desc.DSVFormat = to_dxgi_format(*format);
                    }
                    PipelineSubobject::SampleCount(count) => {
                        desc.SampleDesc.Count = (*count).max(1);
                    }
                    PipelineSubobject::SampleMask(mask) => desc.SampleMask = *mask,
                }
            }
            desc.InputLayout = D3D12_INPUT_LAYOUT_DESC {
                pInputElementDescs: input_elements.as_ptr(),
                NumElements: input_elements.len() as u32,
            };

            unsafe { self.device.CreateGraphicsPipelineState(&desc) }
                .map_err(|err| creation_error(ObjectKind::Pipeline, err))?
        };

        let handle = Pipeline(pso.as_raw() as u64);
        self.pipelines.register(handle, PipelineData { pso });
        Ok(handle)
    }

    fn destroy_pipeline(&self, pipeline: Pipeline) {
        self.pipelines.unregister(pipeline);
    }

    fn allocate_descriptor_sets(
        &self,
        count: u32,
        layout: PipelineLayout,
        param_index: u32,
    ) -> Result<Vec<DescriptorSet>, ResourceError> {
        let ranges = self
            .layouts
            .read(layout, |data| {
                match data.params.get(param_index as usize) {
                    Some(PipelineLayoutParam::DescriptorTable(ranges)) => Some(ranges.clone()),
                    _ => None,
                }
            })
            .ok_or(ResourceError::InvalidHandle)?
            .ok_or_else(|| {
                ResourceError::BackendError("layout parameter is not a descriptor table".into())
            })?;

        let per_set: u32 = ranges.iter().map(|range| range.count).sum();
        let samplers_only = ranges
            .iter()
            .all(|range| range.ty == DescriptorType::Sampler);
        let arena = if samplers_only {
            &self.gpu_sampler_heap
        } else {
            &self.gpu_resource_heap
        };

        let mut heap = arena.lock().unwrap();
        let heap_type = heap.heap_type();
        let mut sets = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let start = heap
                .allocate(per_set.max(1))
                .ok_or(ResourceError::OutOfMemory)?;
            let handle = DescriptorSet(heap.cpu_handle(start).ptr as u64);
            self.sets.register(
                handle,
                DescriptorSetData {
                    heap_type,
                    start,
                    count: per_set.max(1),
                },
            );
            sets.push(handle);
        }
        Ok(sets)
    }

    fn free_descriptor_sets(&self, sets: &[DescriptorSet]) {
        for set in sets {
            let Some(data) = self.sets.unregister(*set) else {
                continue;
            };
            let arena = if data.heap_type == D3D12_DESCRIPTOR_HEAP_TYPE_SAMPLER {
                &self.gpu_sampler_heap
            } else {
                &self.gpu_resource_heap
            };
            arena.lock().unwrap().free(data.start, data.count);
        }
    }

    fn update_descriptor_sets(&self, updates: &[DescriptorSetUpdate<'_>]) {
        for update in updates {
            let Some((heap_type, start)) = self
                .sets
                .read(update.set, |data| (data.heap_type, data.start))
            else {
                continue;
            };
            let arena = if heap_type == D3D12_DESCRIPTOR_HEAP_TYPE_SAMPLER {
                &self.gpu_sampler_heap
            } else {
                &self.gpu_resource_heap
            };
            // Table ranges are laid out binding-major, so the slot of a
            // write is its binding plus the array offset.
            let heap = arena.lock().unwrap();
            let base = start + update.binding + update.array_offset;

            match update.descriptors {
                DescriptorData::Samplers(samplers) => {
                    for (index, sampler) in samplers.iter().enumerate() {
                        unsafe {
                            self.device.CopyDescriptorsSimple(
                                1,
                                heap.cpu_handle(base + index as u32),
                                D3D12_CPU_DESCRIPTOR_HANDLE {
                                    ptr: sampler.as_raw() as usize,
                                },
                                D3D12_DESCRIPTOR_HEAP_TYPE_SAMPLER,
                            );
                        }
                    }
                }
                DescriptorData::ShaderResourceViews(views)
                | DescriptorData::UnorderedAccessViews(views) => {
                    for (index, view) in views.iter().enumerate() {
                        unsafe {
                            self.device.CopyDescriptorsSimple(
                                1,
                                heap.cpu_handle(base + index as u32),
                                D3D12_CPU_DESCRIPTOR_HANDLE {
                                    ptr: view.as_raw() as usize,
                                },
                                D3D12_DESCRIPTOR_HEAP_TYPE_CBV_SRV_UAV,
                            );
                        }
                    }
                }
                DescriptorData::CombinedImageSamplers(_) => {
                    log::warn!("combined image/sampler descriptors are not expressible on D3D12");
                }
                DescriptorData::BufferRanges(ranges) => {
                    for (index, range) in ranges.iter().enumerate() {
                        let Some(address) = self
                            .resources
                            .read(range.buffer, |data| unsafe {
                                data.resource.GetGPUVirtualAddress()
                            })
                        else {
                            continue;
                        };
                        let size = if range.size == u64::MAX {
                            self.resources
                                .read(range.buffer, |data| match data.desc {
                                    ResourceDesc::Buffer(buffer) => buffer.size - range.offset,
                                    ResourceDesc::Texture(_) => 0,
                                })
                                .unwrap_or(0)
                        } else {
                            range.size
                        };
                        let view_desc = D3D12_CONSTANT_BUFFER_VIEW_DESC {
                            BufferLocation: address + range.offset,
                            // CBV sizes are 256-byte aligned by API rule.
                            SizeInBytes: ((size as u32) + 255) & !255,
                        };
                        unsafe {
                            self.device.CreateConstantBufferView(
                                Some(&view_desc),
                                heap.cpu_handle(base + index as u32),
                            );
                        }
                    }
                }
            }
        }
    }

    fn copy_descriptor_sets(&self, copies: &[DescriptorSetCopy]) {
        for copy in copies {
            let source = self
                .sets
                .read(copy.source_set, |data| (data.heap_type, data.start));
            let dest = self
                .sets
                .read(copy.dest_set, |data| (data.heap_type, data.start));
            let (Some((source_type, source_start)), Some((_, dest_start))) = (source, dest) else {
                continue;
            };
            let arena = if source_type == D3D12_DESCRIPTOR_HEAP_TYPE_SAMPLER {
                &self.gpu_sampler_heap
            } else {
                &self.gpu_resource_heap
            };
            let heap = arena.lock().unwrap();
            unsafe {
                self.device.CopyDescriptorsSimple(
                    copy.count,
                    heap.cpu_handle(dest_start + copy.dest_binding + copy.dest_array_offset),
                    heap.cpu_handle(source_start + copy.source_binding + copy.source_array_offset),
                    source_type,
                );
            }
        }
    }

    fn descriptor_pool_offset(&self, set: DescriptorSet) -> Option<(DescriptorPool, u32)> {
        self.sets.read(set, |data| {
            let arena = if data.heap_type == D3D12_DESCRIPTOR_HEAP_TYPE_SAMPLER {
                &self.gpu_sampler_heap
            } else {
                &self.gpu_resource_heap
            };
            let heap = arena.lock().unwrap();
            (DescriptorPool(heap.heap().as_raw() as u64), data.start)
        })
    }

    fn create_query_pool(&self, ty: QueryType, size: u32) -> Result<QueryPool, ResourceError> {
        let desc = D3D12_QUERY_HEAP_DESC {
            Type: match ty {
                QueryType::Occlusion | QueryType::BinaryOcclusion => {
                    D3D12_QUERY_HEAP_TYPE_OCCLUSION
                }
                QueryType::Timestamp => D3D12_QUERY_HEAP_TYPE_TIMESTAMP,
                QueryType::PipelineStatistics => D3D12_QUERY_HEAP_TYPE_PIPELINE_STATISTICS,
            },
            Count: size,
            NodeMask: 0,
        };
        let mut heap: Option<ID3D12QueryHeap> = None;
        unsafe { self.device.CreateQueryHeap(&desc, &mut heap) }
            .map_err(|err| creation_error(ObjectKind::QueryPool, err))?;
        let heap = heap.ok_or_else(|| ResourceError::CreationFailed {
            kind: ObjectKind::QueryPool,
            details: "driver returned no query heap".into(),
        })?;

        let handle = QueryPool(heap.as_raw() as u64);
        self.query_pools.register(handle, QueryPoolData { ty, heap });
        Ok(handle)
    }

    fn destroy_query_pool(&self, pool: QueryPool) {
        self.query_pools.unregister(pool);
    }

    fn query_pool_results(
        &self,
        pool: QueryPool,
        _first: u32,
        _count: u32,
        _stride: u32,
        _results: &mut [u8],
    ) -> Result<(), ResourceError> {
        if !self.query_pools.contains(pool) {
            return Err(ResourceError::InvalidHandle);
        }
        // Query heaps resolve into a readback buffer on a command list;
        // there is no direct CPU readback on D3D12.
        Err(ResourceError::BackendError(
            "query results require ResolveQueryData on a command list".into(),
        ))
    }
}
