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

//! The Vulkan device facade.

use std::ffi::{CStr, CString};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use anyhow::Context;
use ash::vk;
use ash::vk::Handle;
use gpu_allocator::vulkan::{
    Allocation, AllocationCreateDesc, AllocationScheme, Allocator, AllocatorCreateDesc,
};
use scopeguard::ScopeGuard;

use argus_core::api::*;
use argus_core::error::{PipelineError, ResourceError};
use argus_core::object::{ApiObject, ApiObjectWrapper, Guid, NativeHandle};
use argus_core::registry::{ObjectKind, ObjectRegistry};
use argus_core::traits::GraphicsDevice;
use argus_core::transient::DescriptorPoolRing;
use argus_core::RenderPassCache;

use crate::conversions::*;
use crate::objects::{
    DescriptorSetData, PipelineLayoutData, QueryPoolData, ResourceData, ResourceViewData,
};
use crate::pass::{RenderPassBegin, RenderPassDesc, RenderPassKey};
use crate::queue::VulkanQueue;

/// Number of pools in the transient descriptor ring, covering the
/// in-flight frame depth.
const TRANSIENT_POOL_COUNT: usize = 4;

/// `VkDevice` viewed as a native handle.
#[derive(Debug, Clone, Copy)]
struct RawDevice(vk::Device);

impl NativeHandle for RawDevice {
    fn as_raw(&self) -> u64 {
        self.0.as_raw()
    }
}

/// The Vulkan implementation of the device facade.
///
/// Owns the per-kind object registries, the transient descriptor-pool
/// ring, the render-pass cache and its command queues. Device memory
/// comes from a `gpu-allocator` instance behind a mutex; everything else
/// is internally synchronized per data structure, so any host thread may
/// call any facade operation.
pub struct VulkanDevice {
    wrapper: ApiObjectWrapper<RawDevice>,
    device: ash::Device,
    instance: ash::Instance,
    physical_device: vk::PhysicalDevice,
    enabled_features: vk::PhysicalDeviceFeatures,
    conservative_rasterization_ext: bool,
    adapter_info: AdapterInfo,
    allocator: Mutex<Allocator>,

    resources: ObjectRegistry<ResourceData>,
    views: ObjectRegistry<ResourceViewData>,
    layouts: ObjectRegistry<PipelineLayoutData>,
    sets: ObjectRegistry<DescriptorSetData>,
    query_pools: ObjectRegistry<QueryPoolData>,

    descriptor_pool: vk::DescriptorPool,
    transient_pools: DescriptorPoolRing<vk::DescriptorPool, TRANSIENT_POOL_COUNT>,
    next_set_offset: AtomicU32,
    render_passes: RenderPassCache<RenderPassKey, RenderPassBegin>,

    queues: Vec<VulkanQueue>,
}

impl std::fmt::Debug for VulkanDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VulkanDevice")
            .field("device", &self.wrapper.native_object().0)
            .field("adapter", &self.adapter_info.name)
            .field("resources", &self.resources)
            .field("render_passes", &self.render_passes)
            .finish_non_exhaustive()
    }
}

fn creation_error(kind: ObjectKind, err: vk::Result) -> ResourceError {
    match err {
        vk::Result::ERROR_OUT_OF_DEVICE_MEMORY | vk::Result::ERROR_OUT_OF_HOST_MEMORY => {
            ResourceError::OutOfMemory
        }
        other => ResourceError::CreationFailed {
            kind,
            details: other.to_string(),
        },
    }
}

fn make_descriptor_pool(
    device: &ash::Device,
    max_sets: u32,
    descriptors_per_type: u32,
    free_individual_sets: bool,
) -> anyhow::Result<vk::DescriptorPool> {
    let sizes = [
        vk::DescriptorPoolSize {
            ty: vk::DescriptorType::SAMPLER,
            descriptor_count: descriptors_per_type,
        },
        vk::DescriptorPoolSize {
            ty: vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
            descriptor_count: descriptors_per_type,
        },
        vk::DescriptorPoolSize {
            ty: vk::DescriptorType::SAMPLED_IMAGE,
            descriptor_count: descriptors_per_type,
        },
        vk::DescriptorPoolSize {
            ty: vk::DescriptorType::STORAGE_IMAGE,
            descriptor_count: descriptors_per_type,
        },
        vk::DescriptorPoolSize {
            ty: vk::DescriptorType::UNIFORM_BUFFER,
            descriptor_count: descriptors_per_type,
        },
        vk::DescriptorPoolSize {
            ty: vk::DescriptorType::STORAGE_BUFFER,
            descriptor_count: descriptors_per_type,
        },
    ];
    let mut flags = vk::DescriptorPoolCreateFlags::empty();
    if free_individual_sets {
        flags |= vk::DescriptorPoolCreateFlags::FREE_DESCRIPTOR_SET;
    }
    let info = vk::DescriptorPoolCreateInfo::default()
        .flags(flags)
        .max_sets(max_sets)
        .pool_sizes(&sizes);
    unsafe { device.create_descriptor_pool(&info, None) }
        .context("failed to create descriptor pool")
}

impl VulkanDevice {
    /// Wraps an already-created `VkDevice` in the facade.
    ///
    /// ## Arguments
    /// * `instance`/`physical_device`/`device` - The native objects, with
    ///   their loaded function tables.
    /// * `enabled_features` - The features the device was created with;
    ///   capability queries answer from these.
    /// * `conservative_rasterization_ext` - Whether
    ///   `VK_EXT_conservative_rasterization` was enabled.
    /// * `queues` - The device's submission queues as
    ///   `(queue, family index)` pairs.
    pub fn new(
        instance: ash::Instance,
        physical_device: vk::PhysicalDevice,
        device: ash::Device,
        enabled_features: vk::PhysicalDeviceFeatures,
        conservative_rasterization_ext: bool,
        queues: &[(vk::Queue, u32)],
    ) -> anyhow::Result<Self> {
        let allocator = Allocator::new(&AllocatorCreateDesc {
            instance: instance.clone(),
            device: device.clone(),
            physical_device,
            debug_settings: Default::default(),
            buffer_device_address: false,
            allocation_sizes: Default::default(),
        })
        .context("failed to create the device memory allocator")?;

        let properties = unsafe { instance.get_physical_device_properties(physical_device) };
        let adapter_info = AdapterInfo {
            name: unsafe { CStr::from_ptr(properties.device_name.as_ptr()) }
                .to_string_lossy()
                .into_owned(),
            vendor_id: properties.vendor_id,
            device_id: properties.device_id,
            device_type: match properties.device_type {
                vk::PhysicalDeviceType::INTEGRATED_GPU => DeviceType::IntegratedGpu,
                vk::PhysicalDeviceType::DISCRETE_GPU => DeviceType::DiscreteGpu,
                vk::PhysicalDeviceType::VIRTUAL_GPU => DeviceType::VirtualGpu,
                vk::PhysicalDeviceType::CPU => DeviceType::Cpu,
                _ => DeviceType::Unknown,
            },
        };
        log::info!(
            "creating Vulkan device facade on '{}' (vendor {:#06x})",
            adapter_info.name,
            adapter_info.vendor_id
        );

        let descriptor_pool = make_descriptor_pool(&device, 512, 1024, true)?;
        let transient_pools = {
            let mut pools = [vk::DescriptorPool::null(); TRANSIENT_POOL_COUNT];
            for pool in &mut pools {
                *pool = make_descriptor_pool(&device, 128, 256, false)?;
            }
            DescriptorPoolRing::new(pools)
        };

        let queues = queues
            .iter()
            .map(|&(queue, family_index)| VulkanQueue::new(device.clone(), queue, family_index))
            .collect();

        Ok(Self {
            wrapper: ApiObjectWrapper::new(RawDevice(device.handle())),
            device,
            instance,
            physical_device,
            enabled_features,
            conservative_rasterization_ext,
            adapter_info,
            allocator: Mutex::new(allocator),
            resources: ObjectRegistry::new(),
            views: ObjectRegistry::new(),
            layouts: ObjectRegistry::new(),
            sets: ObjectRegistry::new(),
            query_pools: ObjectRegistry::new(),
            descriptor_pool,
            transient_pools,
            next_set_offset: AtomicU32::new(0),
            render_passes: RenderPassCache::new(),
            queues,
        })
    }

    /// Returns the device's submission queues.
    pub fn queues(&self) -> &[VulkanQueue] {
        &self.queues
    }

    /// Wraps a native image whose memory is owned elsewhere (swapchain
    /// images and the like) so reverse queries and destruction behave
    /// like any created resource.
    pub fn import_resource(&self, image: vk::Image, desc: ResourceDesc) -> Resource {
        let handle = Resource(image.as_raw());
        self.resources.register(
            handle,
            ResourceData {
                desc,
                allocation: None,
                name: None,
            },
        );
        handle
    }

    /// Rotates the transient descriptor ring and resets the pool that is
    /// now current, making it available for this frame's allocations.
    ///
    /// The caller guarantees the GPU finished all work referencing that
    /// pool (the ring depth covers the in-flight frame count).
    pub fn advance_transient_descriptor_pool(&self) -> vk::DescriptorPool {
        let pool = self.transient_pools.advance();
        if let Err(err) =
            unsafe { self.device.reset_descriptor_pool(pool, vk::DescriptorPoolResetFlags::empty()) }
        {
            log::warn!("vkResetDescriptorPool failed on transient pool rotation: {err}");
        }
        pool
    }

    /// Allocates one descriptor set with a single-frame lifetime from the
    /// current transient pool.
    pub fn allocate_transient_descriptor_set(
        &self,
        set_layout: vk::DescriptorSetLayout,
    ) -> Result<vk::DescriptorSet, ResourceError> {
        let pool = self.transient_pools.current();
        let layouts = [set_layout];
        let info = vk::DescriptorSetAllocateInfo::default()
            .descriptor_pool(pool)
            .set_layouts(&layouts);
        let sets = unsafe { self.device.allocate_descriptor_sets(&info) }
            .map_err(|err| creation_error(ObjectKind::DescriptorSet, err))?;
        Ok(sets[0])
    }

    /// Returns the cached begin record for `desc`, building the native
    /// render pass and framebuffer on first use.
    ///
    /// Two calls with an identical attachment configuration return the
    /// same record; the writer lock inside the cache guarantees racing
    /// first uses build it exactly once.
    pub fn render_pass_begin(
        &self,
        desc: &RenderPassDesc,
    ) -> Result<std::sync::Arc<RenderPassBegin>, ResourceError> {
        let mut formats = Vec::with_capacity(desc.render_targets.len() + 1);
        for attachment in &desc.render_targets {
            formats.push(self.view_format(attachment.view)?);
        }
        if let Some(depth) = &desc.depth_stencil {
            formats.push(self.view_format(depth.view)?);
        }

        let key = RenderPassKey {
            desc: desc.clone(),
            formats,
        };
        self.render_passes
            .get_or_create(&key, || self.build_render_pass(&key))
    }

    fn view_format(&self, view: ResourceView) -> Result<Format, ResourceError> {
        self.views
            .read(view, |data| data.desc.format())
            .ok_or(ResourceError::InvalidHandle)
    }

    fn attachment_extent(&self, view: ResourceView) -> Result<vk::Extent2D, ResourceError> {
        let resource = self
            .views
            .read(view, |data| data.resource)
            .ok_or(ResourceError::InvalidHandle)?;
        self.resources
            .read(resource, |data| match &data.desc {
                ResourceDesc::Texture(texture) => vk::Extent2D {
                    width: texture.width,
                    height: texture.height,
                },
                ResourceDesc::Buffer(_) => vk::Extent2D::default(),
            })
            .ok_or(ResourceError::InvalidHandle)
    }

    fn build_render_pass(&self, key: &RenderPassKey) -> Result<RenderPassBegin, ResourceError> {
        let desc = &key.desc;
        let samples = vk::SampleCountFlags::from_raw(desc.samples.max(1));

        let mut attachments = Vec::new();
        let mut color_refs = Vec::new();
        for (index, attachment) in desc.render_targets.iter().enumerate() {
            let initial_layout = match attachment.load_op {
                crate::pass::AttachmentLoadOp::Load => {
                    vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL
                }
                _ => vk::ImageLayout::UNDEFINED,
            };
            attachments.push(
                vk::AttachmentDescription::default()
                    .format(key.formats[index].into_vk())
                    .samples(samples)
                    .load_op(attachment.load_op.into_vk())
                    .store_op(attachment.store_op.into_vk())
                    .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
                    .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
                    .initial_layout(initial_layout)
                    .final_layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL),
            );
            color_refs.push(vk::AttachmentReference {
                attachment: index as u32,
                layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
            });
        }

        let mut depth_ref = vk::AttachmentReference::default();
        if let Some(depth) = &desc.depth_stencil {
            let format = key.formats[desc.render_targets.len()];
            let initial_layout = match depth.load_op {
                crate::pass::AttachmentLoadOp::Load => {
                    vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL
                }
                _ => vk::ImageLayout::UNDEFINED,
            };
            depth_ref = vk::AttachmentReference {
                attachment: attachments.len() as u32,
                layout: vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
            };
            attachments.push(
                vk::AttachmentDescription::default()
                    .format(format.into_vk())
                    .samples(samples)
                    .load_op(depth.load_op.into_vk())
                    .store_op(depth.store_op.into_vk())
                    .stencil_load_op(depth.load_op.into_vk())
                    .stencil_store_op(depth.store_op.into_vk())
                    .initial_layout(initial_layout)
                    .final_layout(vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL),
            );
        }

        let mut subpass = vk::SubpassDescription::default()
            .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
            .color_attachments(&color_refs);
        if desc.depth_stencil.is_some() {
            subpass = subpass.depth_stencil_attachment(&depth_ref);
        }
        let subpasses = [subpass];

        let render_pass_info = vk::RenderPassCreateInfo::default()
            .attachments(&attachments)
            .subpasses(&subpasses);
        let render_pass = unsafe { self.device.create_render_pass(&render_pass_info, None) }
            .map_err(|err| ResourceError::BackendError(format!("vkCreateRenderPass: {err}")))?;
        let render_pass = scopeguard::guard(render_pass, |pass| unsafe {
            self.device.destroy_render_pass(pass, None);
        });

        let first_view = desc
            .render_targets
            .first()
            .map(|a| a.view)
            .or(desc.depth_stencil.as_ref().map(|a| a.view))
            .ok_or_else(|| {
                ResourceError::BackendError("render pass needs at least one attachment".into())
            })?;
        let extent = self.attachment_extent(first_view)?;

        let image_views: Vec<vk::ImageView> = desc
            .render_targets
            .iter()
            .chain(desc.depth_stencil.iter())
            .map(|a| vk::ImageView::from_raw(a.view.as_raw()))
            .collect();
        let framebuffer_info = vk::FramebufferCreateInfo::default()
            .render_pass(*render_pass)
            .attachments(&image_views)
            .width(extent.width)
            .height(extent.height)
            .layers(1);
        let framebuffer = unsafe { self.device.create_framebuffer(&framebuffer_info, None) }
            .map_err(|err| ResourceError::BackendError(format!("vkCreateFramebuffer: {err}")))?;

        log::trace!(
            "built render pass for {} color attachment(s), samples {}",
            desc.render_targets.len(),
            desc.samples
        );
        Ok(RenderPassBegin {
            render_pass: ScopeGuard::into_inner(render_pass),
            framebuffer,
            render_area: vk::Rect2D {
                offset: vk::Offset2D::default(),
                extent,
            },
        })
    }

    fn allocate_memory(
        &self,
        requirements: vk::MemoryRequirements,
        heap: MemoryHeap,
        linear: bool,
        name: &str,
    ) -> Result<Allocation, ResourceError> {
        self.allocator
            .lock()
            .unwrap()
            .allocate(&AllocationCreateDesc {
                name,
                requirements,
                location: heap.into_vk(),
                linear,
                allocation_scheme: AllocationScheme::GpuAllocatorManaged,
            })
            .map_err(|err| match err {
                gpu_allocator::AllocationError::OutOfMemory => ResourceError::OutOfMemory,
                other => ResourceError::BackendError(format!("allocation failed: {other}")),
            })
    }

    fn free_memory(&self, allocation: Allocation) {
        if let Err(err) = self.allocator.lock().unwrap().free(allocation) {
            log::warn!("failed to free device memory: {err}");
        }
    }

    fn create_buffer_resource(
        &self,
        desc: &BufferDesc,
        initial_data: Option<&[SubresourceData<'_>]>,
    ) -> Result<Resource, ResourceError> {
        let info = vk::BufferCreateInfo::default()
            .size(desc.size)
            .usage(buffer_usage_flags(desc.usage))
            .sharing_mode(vk::SharingMode::EXCLUSIVE);
        let buffer = unsafe { self.device.create_buffer(&info, None) }
            .map_err(|err| creation_error(ObjectKind::Resource, err))?;
        let buffer = scopeguard::guard(buffer, |b| unsafe {
            self.device.destroy_buffer(b, None);
        });

        let requirements = unsafe { self.device.get_buffer_memory_requirements(*buffer) };
        let mut allocation = self.allocate_memory(requirements, desc.heap, true, "argus buffer")?;
        let bind_result = unsafe {
            self.device
                .bind_buffer_memory(*buffer, allocation.memory(), allocation.offset())
        };
        if let Err(err) = bind_result {
            self.free_memory(allocation);
            return Err(creation_error(ObjectKind::Resource, err));
        }

        if let Some(data) = initial_data.and_then(|slices| slices.first()) {
            if allocation.mapped_ptr().is_none() {
                self.free_memory(allocation);
                return Err(ResourceError::BackendError(
                    "initial data for device-local resources requires an upload queue".into(),
                ));
            }
            if let Some(mapped) = allocation.mapped_slice_mut() {
                let len = data.data.len().min(mapped.len());
                mapped[..len].copy_from_slice(&data.data[..len]);
            }
        }

        let buffer = ScopeGuard::into_inner(buffer);
        let handle = Resource(buffer.as_raw());
        self.resources.register(
            handle,
            ResourceData {
                desc: ResourceDesc::Buffer(*desc),
                allocation: Some(allocation),
                name: None,
            },
        );
        Ok(handle)
    }

    fn create_texture_resource(&self, desc: &TextureDesc) -> Result<Resource, ResourceError> {
        // Host-accessible textures use linear tiling so they stay
        // mappable; device-local ones use optimal tiling.
        let linear = desc.heap != MemoryHeap::GpuOnly;
        let extent = vk::Extent3D {
            width: desc.width,
            height: desc.height,
            depth: if desc.dimension == TextureDimension::D3 {
                u32::from(desc.depth_or_layers)
            } else {
                1
            },
        };
        let array_layers = if desc.dimension == TextureDimension::D3 {
            1
        } else {
            u32::from(desc.depth_or_layers)
        };
        let info = vk::ImageCreateInfo::default()
            .image_type(desc.dimension.into_vk())
            .format(desc.format.into_vk())
            .extent(extent)
            .mip_levels(u32::from(desc.levels.max(1)))
            .array_layers(array_layers.max(1))
            .samples(vk::SampleCountFlags::from_raw(desc.samples.max(1)))
            .tiling(if linear {
                vk::ImageTiling::LINEAR
            } else {
                vk::ImageTiling::OPTIMAL
            })
            .usage(image_usage_flags(desc.usage))
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .initial_layout(vk::ImageLayout::UNDEFINED);
        let image = unsafe { self.device.create_image(&info, None) }
            .map_err(|err| creation_error(ObjectKind::Resource, err))?;
        let image = scopeguard::guard(image, |i| unsafe {
            self.device.destroy_image(i, None);
        });

        let requirements = unsafe { self.device.get_image_memory_requirements(*image) };
        let allocation = self.allocate_memory(requirements, desc.heap, linear, "argus texture")?;
        let bind_result = unsafe {
            self.device
                .bind_image_memory(*image, allocation.memory(), allocation.offset())
        };
        if let Err(err) = bind_result {
            self.free_memory(allocation);
            return Err(creation_error(ObjectKind::Resource, err));
        }

        let image = ScopeGuard::into_inner(image);
        let handle = Resource(image.as_raw());
        self.resources.register(
            handle,
            ResourceData {
                desc: ResourceDesc::Texture(*desc),
                allocation: Some(allocation),
                name: None,
            },
        );
        Ok(handle)
    }

    fn create_shader_stage(
        &self,
        stage: vk::ShaderStageFlags,
        shader: &ShaderDesc<'_>,
    ) -> Result<(vk::ShaderModule, CString), ResourceError> {
        let code = ash::util::read_spv(&mut std::io::Cursor::new(shader.code)).map_err(|err| {
            ResourceError::from(PipelineError::CreationFailed {
                label: None,
                details: format!("invalid SPIR-V for {stage:?} stage: {err}"),
            })
        })?;
        let info = vk::ShaderModuleCreateInfo::default().code(&code);
        let module = unsafe { self.device.create_shader_module(&info, None) }
            .map_err(|err| creation_error(ObjectKind::Pipeline, err))?;
        let entry_point = CString::new(shader.entry_point).unwrap_or_default();
        Ok((module, entry_point))
    }
}

impl ApiObject for VulkanDevice {
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

impl GraphicsDevice for VulkanDevice {
    fn api(&self) -> GraphicsBackendType {
        GraphicsBackendType::Vulkan
    }

    fn adapter_info(&self) -> AdapterInfo {
        self.adapter_info.clone()
    }

    fn check_capability(&self, capability: DeviceCapability) -> bool {
        let features = &self.enabled_features;
        match capability {
            DeviceCapability::ComputeShader => true,
            DeviceCapability::GeometryShader => features.geometry_shader != vk::FALSE,
            DeviceCapability::LogicOp => features.logic_op != vk::FALSE,
            DeviceCapability::DualSourceBlend => features.dual_src_blend != vk::FALSE,
            DeviceCapability::IndependentBlend => features.independent_blend != vk::FALSE,
            DeviceCapability::FillModeNonSolid => features.fill_mode_non_solid != vk::FALSE,
            DeviceCapability::ConservativeRasterization => self.conservative_rasterization_ext,
            DeviceCapability::SamplerAnisotropic => features.sampler_anisotropy != vk::FALSE,
            DeviceCapability::SamplerCompare => true,
            DeviceCapability::SamplerWithResourceView => true,
            DeviceCapability::PartialPushConstantUpdates => true,
            DeviceCapability::CopyBufferRegion => true,
            DeviceCapability::CopyBufferToTexture => true,
            DeviceCapability::BlitRegion => true,
            DeviceCapability::ResolveRegion => true,
            DeviceCapability::CopyQueryPoolResults => true,
            DeviceCapability::SharedResource => false,
        }
    }

    fn check_format_support(&self, format: Format, usage: ResourceUsage) -> bool {
        let properties = unsafe {
            self.instance
                .get_physical_device_format_properties(self.physical_device, format.into_vk())
        };
        properties
            .optimal_tiling_features
            .contains(format_feature_flags(usage))
    }

    fn create_sampler(&self, desc: &SamplerDesc) -> Result<Sampler, ResourceError> {
        let border_color = if desc.border_color[3] == 0.0 {
            vk::BorderColor::FLOAT_TRANSPARENT_BLACK
        } else if desc.border_color[0] == 1.0 {
            vk::BorderColor::FLOAT_OPAQUE_WHITE
        } else {
            vk::BorderColor::FLOAT_OPAQUE_BLACK
        };
        let info = vk::SamplerCreateInfo::default()
            .mag_filter(desc.mag_filter.into_vk())
            .min_filter(desc.min_filter.into_vk())
            .mipmap_mode(IntoVk::<vk::SamplerMipmapMode>::into_vk(desc.mip_filter))
            .address_mode_u(desc.address_u.into_vk())
            .address_mode_v(desc.address_v.into_vk())
            .address_mode_w(desc.address_w.into_vk())
            .mip_lod_bias(desc.mip_lod_bias)
            .anisotropy_enable(desc.max_anisotropy > 1.0)
            .max_anisotropy(desc.max_anisotropy)
            .compare_enable(desc.compare.is_some())
            .compare_op(desc.compare.unwrap_or_default().into_vk())
            .min_lod(desc.min_lod)
            .max_lod(desc.max_lod)
            .border_color(border_color);
        let sampler = unsafe { self.device.create_sampler(&info, None) }
            .map_err(|err| creation_error(ObjectKind::Sampler, err))?;
        Ok(Sampler(sampler.as_raw()))
    }

    fn destroy_sampler(&self, sampler: Sampler) {
        if sampler.is_null() {
            return;
        }
        unsafe {
            self.device
                .destroy_sampler(vk::Sampler::from_raw(sampler.as_raw()), None);
        }
    }

    fn create_resource(
        &self,
        desc: &ResourceDesc,
        initial_data: Option<&[SubresourceData<'_>]>,
        _initial_state: ResourceUsage,
    ) -> Result<Resource, ResourceError> {
        match desc {
            ResourceDesc::Buffer(buffer) => self.create_buffer_resource(buffer, initial_data),
            ResourceDesc::Texture(texture) => {
                let handle = self.create_texture_resource(texture)?;
                if let Some(slices) = initial_data {
                    for (subresource, data) in slices.iter().enumerate() {
                        if let Err(err) =
                            self.update_texture_region(data, handle, subresource as u32, None)
                        {
                            self.destroy_resource(handle);
                            return Err(err);
                        }
                    }
                }
                Ok(handle)
            }
        }
    }

    fn destroy_resource(&self, resource: Resource) {
        let Some(data) = self.resources.unregister(resource) else {
            return;
        };
        if let Some(allocation) = data.allocation {
            match data.desc {
                ResourceDesc::Buffer(_) => unsafe {
                    self.device
                        .destroy_buffer(vk::Buffer::from_raw(resource.as_raw()), None);
                },
                ResourceDesc::Texture(_) => unsafe {
                    self.device
                        .destroy_image(vk::Image::from_raw(resource.as_raw()), None);
                },
            }
            self.free_memory(allocation);
        }
    }

    fn resource_desc(&self, resource: Resource) -> Option<ResourceDesc> {
        self.resources.read(resource, |data| data.desc)
    }

    fn set_resource_name(&self, resource: Resource, name: &str) {
        self.resources
            .write(resource, |data| data.name = Some(name.to_string()));
        log::trace!("resource {:#x} named '{name}'", resource.as_raw());
    }

    fn create_resource_view(
        &self,
        resource: Resource,
        _usage: ResourceUsage,
        desc: &ResourceViewDesc,
    ) -> Result<ResourceView, ResourceError> {
        let resource_desc = self
            .resources
            .read(resource, |data| data.desc)
            .ok_or(ResourceError::InvalidHandle)?;

        let raw = match (desc, resource_desc) {
            (
                ResourceViewDesc::Texture {
                    dimension,
                    format,
                    first_level,
                    levels,
                    first_layer,
                    layers,
                },
                ResourceDesc::Texture(_),
            ) => {
                let range = vk::ImageSubresourceRange {
                    aspect_mask: format_aspect(*format),
                    base_mip_level: *first_level,
                    level_count: *levels,
                    base_array_layer: *first_layer,
                    layer_count: *layers,
                };
                let info = vk::ImageViewCreateInfo::default()
                    .image(vk::Image::from_raw(resource.as_raw()))
                    .view_type((*dimension).into_vk())
                    .format((*format).into_vk())
                    .subresource_range(range);
                unsafe { self.device.create_image_view(&info, None) }
                    .map_err(|err| creation_error(ObjectKind::ResourceView, err))?
                    .as_raw()
            }
            (
                ResourceViewDesc::Buffer {
                    format,
                    offset,
                    size,
                },
                ResourceDesc::Buffer(_),
            ) => {
                if *format == Format::Unknown {
                    return Err(ResourceError::UnsupportedFormat {
                        details: "buffer views need an element format on Vulkan".into(),
                    });
                }
                let info = vk::BufferViewCreateInfo::default()
                    .buffer(vk::Buffer::from_raw(resource.as_raw()))
                    .format((*format).into_vk())
                    .offset(*offset)
                    .range(if *size == u64::MAX {
                        vk::WHOLE_SIZE
                    } else {
                        *size
                    });
                unsafe { self.device.create_buffer_view(&info, None) }
                    .map_err(|err| creation_error(ObjectKind::ResourceView, err))?
                    .as_raw()
            }
            _ => {
                return Err(ResourceError::UnsupportedFormat {
                    details: "view descriptor kind does not match the resource kind".into(),
                })
            }
        };

        let handle = ResourceView(raw);
        self.views.register(
            handle,
            ResourceViewData {
                resource,
                desc: *desc,
                name: None,
            },
        );
        Ok(handle)
    }

    fn destroy_resource_view(&self, view: ResourceView) {
        let Some(data) = self.views.unregister(view) else {
            return;
        };
        match data.desc {
            ResourceViewDesc::Texture { .. } => unsafe {
                self.device
                    .destroy_image_view(vk::ImageView::from_raw(view.as_raw()), None);
            },
            ResourceViewDesc::Buffer { .. } => unsafe {
                self.device
                    .destroy_buffer_view(vk::BufferView::from_raw(view.as_raw()), None);
            },
        }
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
        self.resources
            .read(resource, |data| {
                data.allocation
                    .as_ref()
                    .and_then(|allocation| allocation.mapped_ptr())
                    .map(|ptr| unsafe { ptr.as_ptr().cast::<u8>().add(offset as usize) })
            })
            .ok_or(ResourceError::InvalidHandle)?
            .ok_or_else(|| {
                ResourceError::BackendError("buffer is not host-visible, cannot map".into())
            })
    }

    fn unmap_buffer_region(&self, _resource: Resource) {
        // Host-visible allocations stay persistently mapped.
    }

    fn map_texture_region(
        &self,
        resource: Resource,
        subresource: u32,
        _bounds: Option<&SubresourceBox>,
        _access: MapAccess,
    ) -> Result<MappedSubresource, ResourceError> {
        let (texture, base_ptr) = self
            .resources
            .read(resource, |data| {
                let texture = data.desc.as_texture().copied();
                let ptr = data
                    .allocation
                    .as_ref()
                    .and_then(|allocation| allocation.mapped_ptr());
                (texture, ptr)
            })
            .ok_or(ResourceError::InvalidHandle)?;
        let texture = texture.ok_or(ResourceError::InvalidHandle)?;
        let base_ptr = base_ptr.ok_or_else(|| {
            ResourceError::BackendError("texture is not host-visible, cannot map".into())
        })?;

        let levels = u32::from(texture.levels.max(1));
        let layout = unsafe {
            self.device.get_image_subresource_layout(
                vk::Image::from_raw(resource.as_raw()),
                vk::ImageSubresource {
                    aspect_mask: format_aspect(texture.format),
                    mip_level: subresource % levels,
                    array_layer: subresource / levels,
                },
            )
        };
        Ok(MappedSubresource {
            data: unsafe { base_ptr.as_ptr().cast::<u8>().add(layout.offset as usize) },
            row_pitch: layout.row_pitch as u32,
            slice_pitch: layout.depth_pitch as u32,
        })
    }

    fn unmap_texture_region(&self, _resource: Resource, _subresource: u32) {
        // Host-visible allocations stay persistently mapped.
    }

    fn update_buffer_region(
        &self,
        data: &[u8],
        resource: Resource,
        offset: u64,
    ) -> Result<(), ResourceError> {
        self.resources
            .write(resource, |record| {
                let Some(mapped) = record
                    .allocation
                    .as_mut()
                    .and_then(|allocation| allocation.mapped_slice_mut())
                else {
                    return Err(ResourceError::BackendError(
                        "updating device-local buffers requires an upload queue".into(),
                    ));
                };
                let start = offset as usize;
                let end = start + data.len();
                if end > mapped.len() {
                    return Err(ResourceError::BackendError(
                        "update range exceeds the buffer size".into(),
                    ));
                }
                mapped[start..end].copy_from_slice(data);
                Ok(())
            })
            .ok_or(ResourceError::InvalidHandle)?
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
        let row_count = if mapped.row_pitch == 0 {
            0
        } else {
            data.data.len() / data.row_pitch.max(1) as usize
        };
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
        Ok(())
    }

    fn create_pipeline_layout(
        &self,
        params: &[PipelineLayoutParam],
    ) -> Result<PipelineLayout, ResourceError> {
        let mut set_layouts = Vec::with_capacity(params.len());
        let mut push_constant_ranges = Vec::new();
        let destroy_layouts = |layouts: &[vk::DescriptorSetLayout]| {
            for &layout in layouts {
                unsafe { self.device.destroy_descriptor_set_layout(layout, None) };
            }
        };

        for param in params {
            match param {
                PipelineLayoutParam::DescriptorTable(ranges) => {
                    let bindings: Vec<vk::DescriptorSetLayoutBinding<'_>> = ranges
                        .iter()
                        .map(|range| {
                            vk::DescriptorSetLayoutBinding::default()
                                .binding(range.binding)
                                .descriptor_type(range.ty.into_vk())
                                .descriptor_count(range.count)
                                .stage_flags(range.visibility.into_vk())
                        })
                        .collect();
                    let info = vk::DescriptorSetLayoutCreateInfo::default().bindings(&bindings);
                    match unsafe { self.device.create_descriptor_set_layout(&info, None) } {
                        Ok(layout) => set_layouts.push(layout),
                        Err(err) => {
                            destroy_layouts(&set_layouts);
                            return Err(ResourceError::from(PipelineError::LayoutCreationFailed(
                                err.to_string(),
                            )));
                        }
                    }
                }
                PipelineLayoutParam::PushConstants { count, visibility } => {
                    push_constant_ranges.push(
                        vk::PushConstantRange::default()
                            .stage_flags(visibility.into_vk())
                            .offset(0)
                            .size(count * 4),
                    );
                    // Keep parameter and set indices aligned.
                    let info = vk::DescriptorSetLayoutCreateInfo::default();
                    match unsafe { self.device.create_descriptor_set_layout(&info, None) } {
                        Ok(layout) => set_layouts.push(layout),
                        Err(err) => {
                            destroy_layouts(&set_layouts);
                            return Err(ResourceError::from(PipelineError::LayoutCreationFailed(
                                err.to_string(),
                            )));
                        }
                    }
                }
            }
        }

        let info = vk::PipelineLayoutCreateInfo::default()
            .set_layouts(&set_layouts)
            .push_constant_ranges(&push_constant_ranges);
        let layout = match unsafe { self.device.create_pipeline_layout(&info, None) } {
            Ok(layout) => layout,
            Err(err) => {
                destroy_layouts(&set_layouts);
                return Err(ResourceError::from(PipelineError::LayoutCreationFailed(
                    err.to_string(),
                )));
            }
        };

        let handle = PipelineLayout(layout.as_raw());
        self.layouts.register(
            handle,
            PipelineLayoutData {
                params: params.to_vec(),
                set_layouts,
            },
        );
        Ok(handle)
    }

    fn destroy_pipeline_layout(&self, layout: PipelineLayout) {
        let Some(data) = self.layouts.unregister(layout) else {
            return;
        };
        for set_layout in data.set_layouts {
            unsafe { self.device.destroy_descriptor_set_layout(set_layout, None) };
        }
        unsafe {
            self.device
                .destroy_pipeline_layout(vk::PipelineLayout::from_raw(layout.as_raw()), None);
        }
    }

    fn create_pipeline(
        &self,
        layout: PipelineLayout,
        subobjects: &[PipelineSubobject<'_>],
    ) -> Result<Pipeline, ResourceError> {
        if !self.layouts.contains(layout) {
            return Err(ResourceError::InvalidHandle);
        }
        let vk_layout = vk::PipelineLayout::from_raw(layout.as_raw());

        // A compute stage makes this a compute pipeline; everything else
        // builds the graphics path.
        let compute_shader = subobjects.iter().find_map(|subobject| match subobject {
            PipelineSubobject::ComputeShader(shader) => Some(*shader),
            _ => None,
        });
        if let Some(shader) = compute_shader {
            let (module, entry_point) =
                self.create_shader_stage(vk::ShaderStageFlags::COMPUTE, shader)?;
            let module = scopeguard::guard(module, |m| unsafe {
                self.device.destroy_shader_module(m, None);
            });
            let stage = vk::PipelineShaderStageCreateInfo::default()
                .stage(vk::ShaderStageFlags::COMPUTE)
                .module(*module)
                .name(&entry_point);
            let info = vk::ComputePipelineCreateInfo::default()
                .stage(stage)
                .layout(vk_layout);
            let pipelines = unsafe {
                self.device
                    .create_compute_pipelines(vk::PipelineCache::null(), &[info], None)
            }
            .map_err(|(_, err)| creation_error(ObjectKind::Pipeline, err))?;
            return Ok(Pipeline(pipelines[0].as_raw()));
        }

        self.create_graphics_pipeline(vk_layout, subobjects)
    }

    fn destroy_pipeline(&self, pipeline: Pipeline) {
        if pipeline.is_null() {
            return;
        }
        unsafe {
            self.device
                .destroy_pipeline(vk::Pipeline::from_raw(pipeline.as_raw()), None);
        }
    }

    fn allocate_descriptor_sets(
        &self,
        count: u32,
        layout: PipelineLayout,
        param_index: u32,
    ) -> Result<Vec<DescriptorSet>, ResourceError> {
        let set_layout = self
            .layouts
            .read(layout, |data| {
                match data.params.get(param_index as usize) {
                    Some(PipelineLayoutParam::DescriptorTable(_)) => {
                        data.set_layouts.get(param_index as usize).copied()
                    }
                    _ => None,
                }
            })
            .ok_or(ResourceError::InvalidHandle)?
            .ok_or_else(|| {
                ResourceError::BackendError(
                    "layout parameter is not a descriptor table".into(),
                )
            })?;

        let layouts = vec![set_layout; count as usize];
        let info = vk::DescriptorSetAllocateInfo::default()
            .descriptor_pool(self.descriptor_pool)
            .set_layouts(&layouts);
        let raw_sets = unsafe { self.device.allocate_descriptor_sets(&info) }
            .map_err(|err| creation_error(ObjectKind::DescriptorSet, err))?;

        let sets = raw_sets
            .into_iter()
            .map(|raw| {
                let handle = DescriptorSet(raw.as_raw());
                self.sets.register(
                    handle,
                    DescriptorSetData {
                        pool: self.descriptor_pool,
                        offset: self.next_set_offset.fetch_add(1, Ordering::Relaxed),
                    },
                );
                handle
            })
            .collect();
        Ok(sets)
    }

    fn free_descriptor_sets(&self, sets: &[DescriptorSet]) {
        let mut raw_sets = Vec::with_capacity(sets.len());
        for set in sets {
            if self.sets.unregister(*set).is_some() {
                raw_sets.push(vk::DescriptorSet::from_raw(set.as_raw()));
            }
        }
        if raw_sets.is_empty() {
            return;
        }
        if let Err(err) = unsafe {
            self.device
                .free_descriptor_sets(self.descriptor_pool, &raw_sets)
        } {
            log::warn!("vkFreeDescriptorSets failed: {err}");
        }
    }

    fn update_descriptor_sets(&self, updates: &[DescriptorSetUpdate<'_>]) {
        let mut image_infos: Vec<Vec<vk::DescriptorImageInfo>> = Vec::with_capacity(updates.len());
        let mut buffer_infos: Vec<Vec<vk::DescriptorBufferInfo>> =
            Vec::with_capacity(updates.len());
        for update in updates {
            let (images, buffers) = match update.descriptors {
                DescriptorData::Samplers(samplers) => (
                    samplers
                        .iter()
                        .map(|sampler| vk::DescriptorImageInfo {
                            sampler: vk::Sampler::from_raw(sampler.as_raw()),
                            image_view: vk::ImageView::null(),
                            image_layout: vk::ImageLayout::UNDEFINED,
                        })
                        .collect(),
                    Vec::new(),
                ),
                DescriptorData::CombinedImageSamplers(pairs) => (
                    pairs
                        .iter()
                        .map(|(sampler, view)| vk::DescriptorImageInfo {
                            sampler: vk::Sampler::from_raw(sampler.as_raw()),
                            image_view: vk::ImageView::from_raw(view.as_raw()),
                            image_layout: vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
                        })
                        .collect(),
                    Vec::new(),
                ),
                DescriptorData::ShaderResourceViews(views) => (
                    views
                        .iter()
                        .map(|view| vk::DescriptorImageInfo {
                            sampler: vk::Sampler::null(),
                            image_view: vk::ImageView::from_raw(view.as_raw()),
                            image_layout: vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
                        })
                        .collect(),
                    Vec::new(),
                ),
                DescriptorData::UnorderedAccessViews(views) => (
                    views
                        .iter()
                        .map(|view| vk::DescriptorImageInfo {
                            sampler: vk::Sampler::null(),
                            image_view: vk::ImageView::from_raw(view.as_raw()),
                            image_layout: vk::ImageLayout::GENERAL,
                        })
                        .collect(),
                    Vec::new(),
                ),
                DescriptorData::BufferRanges(ranges) => (
                    Vec::new(),
                    ranges
                        .iter()
                        .map(|range| vk::DescriptorBufferInfo {
                            buffer: vk::Buffer::from_raw(range.buffer.as_raw()),
                            offset: range.offset,
                            range: if range.size == u64::MAX {
                                vk::WHOLE_SIZE
                            } else {
                                range.size
                            },
                        })
                        .collect(),
                ),
            };
            image_infos.push(images);
            buffer_infos.push(buffers);
        }

        let writes: Vec<vk::WriteDescriptorSet<'_>> = updates
            .iter()
            .enumerate()
            .map(|(index, update)| {
                let mut write = vk::WriteDescriptorSet::default()
                    .dst_set(vk::DescriptorSet::from_raw(update.set.as_raw()))
                    .dst_binding(update.binding)
                    .dst_array_element(update.array_offset)
                    .descriptor_type(update.ty.into_vk());
                if buffer_infos[index].is_empty() {
                    write = write.image_info(&image_infos[index]);
                } else {
                    write = write.buffer_info(&buffer_infos[index]);
                }
                write
            })
            .collect();

        unsafe { self.device.update_descriptor_sets(&writes, &[]) };
    }

    fn copy_descriptor_sets(&self, copies: &[DescriptorSetCopy]) {
        let vk_copies: Vec<vk::CopyDescriptorSet<'_>> = copies
            .iter()
            .map(|copy| {
                vk::CopyDescriptorSet::default()
                    .src_set(vk::DescriptorSet::from_raw(copy.source_set.as_raw()))
                    .src_binding(copy.source_binding)
                    .src_array_element(copy.source_array_offset)
                    .dst_set(vk::DescriptorSet::from_raw(copy.dest_set.as_raw()))
                    .dst_binding(copy.dest_binding)
                    .dst_array_element(copy.dest_array_offset)
                    .descriptor_count(copy.count)
            })
            .collect();
        unsafe { self.device.update_descriptor_sets(&[], &vk_copies) };
    }

    fn descriptor_pool_offset(&self, set: DescriptorSet) -> Option<(DescriptorPool, u32)> {
        self.sets
            .read(set, |data| (DescriptorPool(data.pool.as_raw()), data.offset))
    }

    fn create_query_pool(&self, ty: QueryType, size: u32) -> Result<QueryPool, ResourceError> {
        let mut info = vk::QueryPoolCreateInfo::default()
            .query_type(ty.into_vk())
            .query_count(size);
        if ty == QueryType::PipelineStatistics {
            info = info.pipeline_statistics(
                vk::QueryPipelineStatisticFlags::INPUT_ASSEMBLY_VERTICES
                    | vk::QueryPipelineStatisticFlags::INPUT_ASSEMBLY_PRIMITIVES
                    | vk::QueryPipelineStatisticFlags::VERTEX_SHADER_INVOCATIONS
                    | vk::QueryPipelineStatisticFlags::CLIPPING_INVOCATIONS
                    | vk::QueryPipelineStatisticFlags::CLIPPING_PRIMITIVES
                    | vk::QueryPipelineStatisticFlags::FRAGMENT_SHADER_INVOCATIONS,
            );
        }
        let pool = unsafe { self.device.create_query_pool(&info, None) }
            .map_err(|err| creation_error(ObjectKind::QueryPool, err))?;

        let handle = QueryPool(pool.as_raw());
        self.query_pools.register(handle, QueryPoolData { ty });
        Ok(handle)
    }

    fn destroy_query_pool(&self, pool: QueryPool) {
        if self.query_pools.unregister(pool).is_none() {
            return;
        }
        unsafe {
            self.device
                .destroy_query_pool(vk::QueryPool::from_raw(pool.as_raw()), None);
        }
    }

    fn query_pool_results(
        &self,
        pool: QueryPool,
        first: u32,
        count: u32,
        stride: u32,
        results: &mut [u8],
    ) -> Result<(), ResourceError> {
        if !self.query_pools.contains(pool) {
            return Err(ResourceError::InvalidHandle);
        }
        let result = unsafe {
            (self.device.fp_v1_0().get_query_pool_results)(
                self.device.handle(),
                vk::QueryPool::from_raw(pool.as_raw()),
                first,
                count,
                results.len(),
                results.as_mut_ptr().cast(),
                vk::DeviceSize::from(stride),
                vk::QueryResultFlags::TYPE_64,
            )
        };
        match result {
            vk::Result::SUCCESS => Ok(()),
            vk::Result::NOT_READY => Err(ResourceError::NotReady),
            err => Err(ResourceError::BackendError(format!(
                "vkGetQueryPoolResults: {err}"
            ))),
        }
    }
}

impl VulkanDevice {
    fn create_graphics_pipeline(
        &self,
        layout: vk::PipelineLayout,
        subobjects: &[PipelineSubobject<'_>],
    ) -> Result<Pipeline, ResourceError> {
        let mut shader_stages: Vec<(vk::ShaderStageFlags, &ShaderDesc<'_>)> = Vec::new();
        let mut input_layout: &[InputElementDesc<'_>] = &[];
        let default_blend = BlendDesc::default();
        let default_rasterizer = RasterizerDesc::default();
        let default_depth_stencil = DepthStencilDesc::default();
        let mut blend = &default_blend;
        let mut rasterizer = &default_rasterizer;
        let mut depth_stencil = &default_depth_stencil;
        let mut topology = PrimitiveTopology::TriangleList;
        let mut render_target_formats: &[Format] = &[];
        let mut depth_stencil_format = Format::Unknown;
        let mut sample_count = 1u32;
        let mut sample_mask = u32::MAX;

        for subobject in subobjects {
            match subobject {
                PipelineSubobject::VertexShader(shader) => {
                    shader_stages.push((vk::ShaderStageFlags::VERTEX, shader));
                }
                PipelineSubobject::GeometryShader(shader) => {
                    shader_stages.push((vk::ShaderStageFlags::GEOMETRY, shader));
                }
                PipelineSubobject::PixelShader(shader) => {
                    shader_stages.push((vk::ShaderStageFlags::FRAGMENT, shader));
                }
                PipelineSubobject::ComputeShader(_) => {
                    return Err(ResourceError::from(PipelineError::InvalidSubobject {
                        subobject: "compute shader mixed into a graphics pipeline".into(),
                    }));
                }
                PipelineSubobject::InputLayout(elements) => input_layout = elements,
                PipelineSubobject::BlendState(state) => blend = state,
                PipelineSubobject::RasterizerState(state) => rasterizer = state,
                PipelineSubobject::DepthStencilState(state) => depth_stencil = state,
                PipelineSubobject::PrimitiveTopology(value) => topology = *value,
                PipelineSubobject::RenderTargetFormats(formats) => render_target_formats = formats,
                PipelineSubobject::DepthStencilFormat(format) => depth_stencil_format = *format,
                PipelineSubobject::SampleCount(count) => sample_count = (*count).max(1),
                PipelineSubobject::SampleMask(mask) => sample_mask = *mask,
            }
        }

        if rasterizer.conservative && !self.conservative_rasterization_ext {
            return Err(ResourceError::from(PipelineError::FeatureNotSupported(
                "conservative rasterization".into(),
            )));
        }
        if shader_stages.is_empty() {
            return Err(ResourceError::from(PipelineError::InvalidSubobject {
                subobject: "graphics pipeline without shader stages".into(),
            }));
        }

        let mut modules = Vec::with_capacity(shader_stages.len());
        for (stage, shader) in &shader_stages {
            match self.create_shader_stage(*stage, shader) {
                Ok(module) => modules.push(module),
                Err(err) => {
                    for (module, _) in modules {
                        unsafe { self.device.destroy_shader_module(module, None) };
                    }
                    return Err(err);
                }
            }
        }
        // From here on the modules are destroyed on every exit path once
        // pipeline creation has been attempted.
        let modules = scopeguard::guard(modules, |modules| {
            for (module, _) in modules {
                unsafe { self.device.destroy_shader_module(module, None) };
            }
        });

        let stage_infos: Vec<vk::PipelineShaderStageCreateInfo<'_>> = shader_stages
            .iter()
            .zip(modules.iter())
            .map(|((stage, _), (module, entry_point))| {
                vk::PipelineShaderStageCreateInfo::default()
                    .stage(*stage)
                    .module(*module)
                    .name(entry_point)
            })
            .collect();

        let mut bindings: Vec<vk::VertexInputBindingDescription> = Vec::new();
        let attributes: Vec<vk::VertexInputAttributeDescription> = input_layout
            .iter()
            .map(|element| {
                if !bindings.iter().any(|b| b.binding == element.buffer_binding) {
                    bindings.push(vk::VertexInputBindingDescription {
                        binding: element.buffer_binding,
                        stride: element.stride,
                        input_rate: if element.instance_step_rate > 0 {
                            vk::VertexInputRate::INSTANCE
                        } else {
                            vk::VertexInputRate::VERTEX
                        },
                    });
                }
                vk::VertexInputAttributeDescription {
                    location: element.location,
                    binding: element.buffer_binding,
                    format: element.format.into_vk(),
                    offset: element.offset,
                }
            })
            .collect();
        let vertex_input = vk::PipelineVertexInputStateCreateInfo::default()
            .vertex_binding_descriptions(&bindings)
            .vertex_attribute_descriptions(&attributes);

        let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::default()
            .topology(topology.into_vk())
            .primitive_restart_enable(false);

        let viewport_state = vk::PipelineViewportStateCreateInfo::default()
            .viewport_count(1)
            .scissor_count(1);

        let rasterization = vk::PipelineRasterizationStateCreateInfo::default()
            .polygon_mode(rasterizer.fill_mode.into_vk())
            .cull_mode(rasterizer.cull_mode.into_vk())
            .front_face(if rasterizer.front_counter_clockwise {
                vk::FrontFace::COUNTER_CLOCKWISE
            } else {
                vk::FrontFace::CLOCKWISE
            })
            .depth_clamp_enable(!rasterizer.depth_clip)
            .line_width(1.0);

        let sample_masks = [sample_mask];
        let multisample = vk::PipelineMultisampleStateCreateInfo::default()
            .rasterization_samples(vk::SampleCountFlags::from_raw(sample_count))
            .sample_mask(&sample_masks)
            .alpha_to_coverage_enable(blend.alpha_to_coverage);

        let stencil_state = |desc: &StencilOpDesc| vk::StencilOpState {
            fail_op: desc.fail.into_vk(),
            pass_op: desc.pass.into_vk(),
            depth_fail_op: desc.depth_fail.into_vk(),
            compare_op: desc.func.into_vk(),
            compare_mask: u32::from(depth_stencil.stencil_read_mask),
            write_mask: u32::from(depth_stencil.stencil_write_mask),
            reference: 0,
        };
        let depth_stencil_state = vk::PipelineDepthStencilStateCreateInfo::default()
            .depth_test_enable(depth_stencil.depth_enable)
            .depth_write_enable(depth_stencil.depth_write)
            .depth_compare_op(depth_stencil.depth_func.into_vk())
            .stencil_test_enable(depth_stencil.stencil_enable)
            .front(stencil_state(&depth_stencil.front))
            .back(stencil_state(&depth_stencil.back));

        let blend_attachments: Vec<vk::PipelineColorBlendAttachmentState> = render_target_formats
            .iter()
            .enumerate()
            .map(|(index, _)| {
                let target = &blend.targets[index.min(blend.targets.len() - 1)];
                vk::PipelineColorBlendAttachmentState::default()
                    .blend_enable(target.blend_enable)
                    .src_color_blend_factor(target.source_color.into_vk())
                    .dst_color_blend_factor(target.dest_color.into_vk())
                    .color_blend_op(target.color_op.into_vk())
                    .src_alpha_blend_factor(target.source_alpha.into_vk())
                    .dst_alpha_blend_factor(target.dest_alpha.into_vk())
                    .alpha_blend_op(target.alpha_op.into_vk())
                    .color_write_mask(vk::ColorComponentFlags::from_raw(u32::from(
                        target.write_mask,
                    )))
            })
            .collect();
        let color_blend =
            vk::PipelineColorBlendStateCreateInfo::default().attachments(&blend_attachments);

        let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
        let dynamic_state =
            vk::PipelineDynamicStateCreateInfo::default().dynamic_states(&dynamic_states);

        let color_formats: Vec<vk::Format> = render_target_formats
            .iter()
            .map(|format| format.into_vk())
            .collect();
        let mut rendering_info = vk::PipelineRenderingCreateInfo::default()
            .color_attachment_formats(&color_formats)
            .depth_attachment_format(if depth_stencil_format.has_depth() {
                depth_stencil_format.into_vk()
            } else {
                vk::Format::UNDEFINED
            })
            .stencil_attachment_format(if depth_stencil_format.has_stencil() {
                depth_stencil_format.into_vk()
            } else {
                vk::Format::UNDEFINED
            });

        let info = vk::GraphicsPipelineCreateInfo::default()
            .stages(&stage_infos)
            .vertex_input_state(&vertex_input)
            .input_assembly_state(&input_assembly)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterization)
            .multisample_state(&multisample)
            .depth_stencil_state(&depth_stencil_state)
            .color_blend_state(&color_blend)
            .dynamic_state(&dynamic_state)
            .layout(layout)
            .push_next(&mut rendering_info);

        let pipelines = unsafe {
            self.device
                .create_graphics_pipelines(vk::PipelineCache::null(), &[info], None)
        }
        .map_err(|(_, err)| creation_error(ObjectKind::Pipeline, err))?;
        Ok(Pipeline(pipelines[0].as_raw()))
    }
}

impl Drop for VulkanDevice {
    fn drop(&mut self) {
        unsafe {
            for begin in self.render_passes.drain() {
                self.device.destroy_framebuffer(begin.framebuffer, None);
                self.device.destroy_render_pass(begin.render_pass, None);
            }
            for &pool in self.transient_pools.pools() {
                self.device.destroy_descriptor_pool(pool, None);
            }
            self.device
                .destroy_descriptor_pool(self.descriptor_pool, None);
        }

        // Anything still registered at teardown is a caller leak; free
        // the backing memory so the allocator shuts down clean.
        let leaked = self.resources.drain();
        if !leaked.is_empty() {
            log::warn!("{} resource(s) never destroyed before device teardown", leaked.len());
            for record in leaked {
                if let Some(allocation) = record.allocation {
                    self.free_memory(allocation);
                }
            }
        }
    }
}
