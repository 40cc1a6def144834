use argus_core::api::*;
use argus_core::error::ResourceError;
use argus_core::object::{ApiObject, ApiObjectWrapper, Guid};
use argus_core::registry::{AnyObjectRegistry, ObjectKind, ObjectRegistry};
use argus_core::traits::GraphicsDevice;
use argus_core::transient::DescriptorPoolRing;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

#[derive(Debug)]
struct MockResourceData {
    desc: ResourceDesc,
    name: Option<String>,
}

#[derive(Debug)]
struct MockViewData {
    resource: Resource,
    desc: ResourceViewDesc,
}

#[derive(Debug)]
struct MockSetData {
    pool: DescriptorPool,
    offset: u32,
}

#[derive(Debug)]
struct MockLayoutData {
    param_count: u32,
}

/// A driver-less device backed by the real registry/ring machinery, so
/// the facade contract can be exercised without a GPU.
#[derive(Debug)]
struct MockDevice {
    wrapper: ApiObjectWrapper<u64>,
    resources: ObjectRegistry<MockResourceData>,
    views: ObjectRegistry<MockViewData>,
    sets: ObjectRegistry<MockSetData>,
    erased: AnyObjectRegistry,
    transient_pools: DescriptorPoolRing<DescriptorPool, 4>,
    next_handle: AtomicU64,
    next_set_offset: AtomicU32,
    refuse_creation: AtomicBool,
}

impl MockDevice {
    fn new() -> Self {
        Self {
            wrapper: ApiObjectWrapper::new(0xD0_u64),
            resources: ObjectRegistry::new(),
            views: ObjectRegistry::new(),
            sets: ObjectRegistry::new(),
            erased: AnyObjectRegistry::new(),
            transient_pools: DescriptorPoolRing::new([
                DescriptorPool(0x100),
                DescriptorPool(0x101),
                DescriptorPool(0x102),
                DescriptorPool(0x103),
            ]),
            next_handle: AtomicU64::new(1),
            next_set_offset: AtomicU32::new(0),
            refuse_creation: AtomicBool::new(false),
        }
    }

    fn refuse_next_creations(&self, refuse: bool) {
        self.refuse_creation.store(refuse, Ordering::SeqCst);
    }

    fn driver_create(&self, kind: ObjectKind) -> Result<u64, ResourceError> {
        if self.refuse_creation.load(Ordering::SeqCst) {
            return Err(ResourceError::CreationFailed {
                kind,
                details: "simulated driver refusal".to_string(),
            });
        }
        Ok(self.next_handle.fetch_add(1, Ordering::SeqCst))
    }
}

impl ApiObject for MockDevice {
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

impl GraphicsDevice for MockDevice {
    fn api(&self) -> GraphicsBackendType {
        GraphicsBackendType::Unknown
    }

    fn adapter_info(&self) -> AdapterInfo {
        AdapterInfo {
            name: "Mock Adapter".to_string(),
            device_type: DeviceType::Cpu,
            ..AdapterInfo::default()
        }
    }

    fn check_capability(&self, capability: DeviceCapability) -> bool {
        matches!(capability, DeviceCapability::ComputeShader)
    }

    fn check_format_support(&self, format: Format, _usage: ResourceUsage) -> bool {
        format != Format::Unknown
    }

    fn create_sampler(&self, _desc: &SamplerDesc) -> Result<Sampler, ResourceError> {
        self.driver_create(ObjectKind::Sampler).map(Sampler)
    }

    fn destroy_sampler(&self, _sampler: Sampler) {}

    fn create_resource(
        &self,
        desc: &ResourceDesc,
        _initial_data: Option<&[SubresourceData<'_>]>,
        _initial_state: ResourceUsage,
    ) -> Result<Resource, ResourceError> {
        let handle = Resource(self.driver_create(ObjectKind::Resource)?);
        self.resources.register(
            handle,
            MockResourceData {
                desc: *desc,
                name: None,
            },
        );
        Ok(handle)
    }

    fn destroy_resource(&self, resource: Resource) {
        self.resources.unregister(resource);
    }

    fn resource_desc(&self, resource: Resource) -> Option<ResourceDesc> {
        self.resources.read(resource, |data| data.desc)
    }

    fn set_resource_name(&self, resource: Resource, name: &str) {
        self.resources
            .write(resource, |data| data.name = Some(name.to_string()));
    }

    fn create_resource_view(
        &self,
        resource: Resource,
        _usage: ResourceUsage,
        desc: &ResourceViewDesc,
    ) -> Result<ResourceView, ResourceError> {
        if !self.resources.contains(resource) {
            return Err(ResourceError::InvalidHandle);
        }
        let handle = ResourceView(self.driver_create(ObjectKind::ResourceView)?);
        self.views.register(handle, MockViewData {
            resource,
            desc: *desc,
        });
        Ok(handle)
    }

    fn destroy_resource_view(&self, view: ResourceView) {
        self.views.unregister(view);
    }

    fn resource_from_view(&self, view: ResourceView) -> Option<Resource> {
        self.views.read(view, |data| data.resource)
    }

    fn resource_view_desc(&self, view: ResourceView) -> Option<ResourceViewDesc> {
        self.views.read(view, |data| data.desc)
    }

    fn set_resource_view_name(&self, _view: ResourceView, _name: &str) {}

    fn map_buffer_region(
        &self,
        _resource: Resource,
        _offset: u64,
        _size: u64,
        _access: MapAccess,
    ) -> Result<*mut u8, ResourceError> {
        Err(ResourceError::BackendError(
            "mock device has no mappable memory".to_string(),
        ))
    }

    fn unmap_buffer_region(&self, _resource: Resource) {}

    fn map_texture_region(
        &self,
        _resource: Resource,
        _subresource: u32,
        _bounds: Option<&SubresourceBox>,
        _access: MapAccess,
    ) -> Result<MappedSubresource, ResourceError> {
        Err(ResourceError::BackendError(
            "mock device has no mappable memory".to_string(),
        ))
    }

    fn unmap_texture_region(&self, _resource: Resource, _subresource: u32) {}

    fn update_buffer_region(
        &self,
        _data: &[u8],
        resource: Resource,
        _offset: u64,
    ) -> Result<(), ResourceError> {
        if self.resources.contains(resource) {
            Ok(())
        } else {
            Err(ResourceError::InvalidHandle)
        }
    }

    fn update_texture_region(
        &self,
        _data: &SubresourceData<'_>,
        resource: Resource,
        _subresource: u32,
        _bounds: Option<&SubresourceBox>,
    ) -> Result<(), ResourceError> {
        if self.resources.contains(resource) {
            Ok(())
        } else {
            Err(ResourceError::InvalidHandle)
        }
    }

    fn create_pipeline_layout(
        &self,
        params: &[PipelineLayoutParam],
    ) -> Result<PipelineLayout, ResourceError> {
        let handle = PipelineLayout(self.driver_create(ObjectKind::PipelineLayout)?);
        self.erased.register(
            ObjectKind::PipelineLayout,
            handle.as_raw(),
            Box::new(MockLayoutData {
                param_count: params.len() as u32,
            }),
        );
        Ok(handle)
    }

    fn destroy_pipeline_layout(&self, layout: PipelineLayout) {
        self.erased
            .unregister(ObjectKind::PipelineLayout, layout.as_raw());
    }

    fn create_pipeline(
        &self,
        layout: PipelineLayout,
        _subobjects: &[PipelineSubobject<'_>],
    ) -> Result<Pipeline, ResourceError> {
        let param_count = self.erased.read(
            ObjectKind::PipelineLayout,
            layout.as_raw(),
            |data: &MockLayoutData| data.param_count,
        );
        if param_count.is_none() {
            return Err(ResourceError::InvalidHandle);
        }
        self.driver_create(ObjectKind::Pipeline).map(Pipeline)
    }

    fn destroy_pipeline(&self, _pipeline: Pipeline) {}

    fn allocate_descriptor_sets(
        &self,
        count: u32,
        _layout: PipelineLayout,
        _param_index: u32,
    ) -> Result<Vec<DescriptorSet>, ResourceError> {
        let pool = self.transient_pools.current();
        let mut sets = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let handle = DescriptorSet(self.driver_create(ObjectKind::DescriptorSet)?);
            let offset = self.next_set_offset.fetch_add(1, Ordering::SeqCst);
            self.sets.register(handle, MockSetData { pool, offset });
            sets.push(handle);
        }
        Ok(sets)
    }

    fn free_descriptor_sets(&self, sets: &[DescriptorSet]) {
        for set in sets {
            self.sets.unregister(*set);
        }
    }

    fn update_descriptor_sets(&self, _updates: &[DescriptorSetUpdate<'_>]) {}

    fn copy_descriptor_sets(&self, _copies: &[DescriptorSetCopy]) {}

    fn descriptor_pool_offset(&self, set: DescriptorSet) -> Option<(DescriptorPool, u32)> {
        self.sets.read(set, |data| (data.pool, data.offset))
    }

    fn create_query_pool(&self, _ty: QueryType, _size: u32) -> Result<QueryPool, ResourceError> {
        self.driver_create(ObjectKind::QueryPool).map(QueryPool)
    }

    fn destroy_query_pool(&self, _pool: QueryPool) {}

    fn query_pool_results(
        &self,
        pool: QueryPool,
        _first: u32,
        _count: u32,
        _stride: u32,
        results: &mut [u8],
    ) -> Result<(), ResourceError> {
        if pool.is_null() {
            return Err(ResourceError::InvalidHandle);
        }
        results.fill(0);
        Ok(())
    }
}

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn test_buffer_desc(size: u64) -> ResourceDesc {
    ResourceDesc::Buffer(BufferDesc {
        size,
        heap: MemoryHeap::GpuOnly,
        usage: ResourceUsage::SHADER_RESOURCE | ResourceUsage::COPY_DEST,
    })
}

#[test]
fn created_resource_reports_its_descriptor() {
    init_logs();
    let device = MockDevice::new();
    let desc = test_buffer_desc(256);
    let resource = device
        .create_resource(&desc, None, ResourceUsage::SHADER_RESOURCE)
        .unwrap();

    assert!(!resource.is_null());
    assert_eq!(device.resource_desc(resource), Some(desc));
    assert_eq!(device.resources.len(), 1);

    device.destroy_resource(resource);
    assert_eq!(device.resource_desc(resource), None);
    assert!(device.resources.is_empty());
}

#[test]
fn creation_failure_registers_nothing() {
    let device = MockDevice::new();
    device.refuse_next_creations(true);

    let result = device.create_resource(&test_buffer_desc(64), None, ResourceUsage::COPY_DEST);
    assert!(matches!(
        result,
        Err(ResourceError::CreationFailed {
            kind: ObjectKind::Resource,
            ..
        })
    ));
    assert!(device.resources.is_empty());

    // The device recovers once the driver stops refusing.
    device.refuse_next_creations(false);
    assert!(device
        .create_resource(&test_buffer_desc(64), None, ResourceUsage::COPY_DEST)
        .is_ok());
    assert_eq!(device.resources.len(), 1);
}

#[test]
fn view_reverse_queries_resolve_parent_and_descriptor() {
    let device = MockDevice::new();
    let texture = device
        .create_resource(
            &ResourceDesc::Texture(TextureDesc {
                dimension: TextureDimension::D2,
                width: 1920,
                height: 1080,
                depth_or_layers: 1,
                levels: 1,
                format: Format::R8G8B8A8Unorm,
                samples: 1,
                heap: MemoryHeap::GpuOnly,
                usage: ResourceUsage::RENDER_TARGET,
            }),
            None,
            ResourceUsage::RENDER_TARGET,
        )
        .unwrap();

    let view_desc = ResourceViewDesc::Texture {
        dimension: TextureViewDimension::D2,
        format: Format::R8G8B8A8Unorm,
        first_level: 0,
        levels: 1,
        first_layer: 0,
        layers: 1,
    };
    let view = device
        .create_resource_view(texture, ResourceUsage::RENDER_TARGET, &view_desc)
        .unwrap();

    assert_eq!(device.resource_from_view(view), Some(texture));
    assert_eq!(device.resource_view_desc(view), Some(view_desc));

    device.destroy_resource_view(view);
    assert_eq!(device.resource_from_view(view), None);
}

#[test]
fn view_of_foreign_resource_is_rejected() {
    let device = MockDevice::new();
    let err = device.create_resource_view(
        Resource(0xDEAD),
        ResourceUsage::SHADER_RESOURCE,
        &ResourceViewDesc::Buffer {
            format: Format::R32Float,
            offset: 0,
            size: u64::MAX,
        },
    );
    assert!(matches!(err, Err(ResourceError::InvalidHandle)));
    assert!(device.views.is_empty());
}

#[test]
fn transient_sets_follow_pool_rotation() {
    let device = MockDevice::new();
    let layout = device.create_pipeline_layout(&[]).unwrap();

    let first = device.allocate_descriptor_sets(2, layout, 0).unwrap();
    for set in &first {
        let (pool, _) = device.descriptor_pool_offset(*set).unwrap();
        assert_eq!(pool, DescriptorPool(0x100));
    }

    device.transient_pools.advance();
    let second = device.allocate_descriptor_sets(1, layout, 0).unwrap();
    let (pool, _) = device.descriptor_pool_offset(second[0]).unwrap();
    assert_eq!(pool, DescriptorPool(0x101));

    // Three more advances wrap back to the first pool.
    for _ in 0..3 {
        device.transient_pools.advance();
    }
    let third = device.allocate_descriptor_sets(1, layout, 0).unwrap();
    let (pool, _) = device.descriptor_pool_offset(third[0]).unwrap();
    assert_eq!(pool, DescriptorPool(0x100));

    device.free_descriptor_sets(&first);
    assert!(device.descriptor_pool_offset(first[0]).is_none());
}

#[test]
fn pipeline_creation_validates_layout_through_erased_registry() {
    let device = MockDevice::new();
    let layout = device
        .create_pipeline_layout(&[PipelineLayoutParam::PushConstants {
            count: 4,
            visibility: ShaderStageFlags::ALL,
        }])
        .unwrap();

    let shader = ShaderDesc {
        code: &[0u8; 16],
        entry_point: "main",
    };
    let pipeline = device.create_pipeline(
        layout,
        &[
            PipelineSubobject::ComputeShader(&shader),
        ],
    );
    assert!(pipeline.is_ok());

    device.destroy_pipeline_layout(layout);
    let stale = device.create_pipeline(layout, &[PipelineSubobject::ComputeShader(&shader)]);
    assert!(matches!(stale, Err(ResourceError::InvalidHandle)));
}

#[test]
fn private_data_round_trips_through_the_capability_trait() {
    let device = MockDevice::new();
    let object: &dyn GraphicsDevice = &device;

    let key = Guid::from(uuid::Uuid::new_v4());
    assert_eq!(object.get_private_data(&key), 0);

    object.set_private_data(&key, 0xCAFE);
    assert_eq!(object.get_private_data(&key), 0xCAFE);

    object.set_private_data(&key, 0);
    assert_eq!(object.get_private_data(&key), 0);

    assert_eq!(object.native(), 0xD0);
    assert_eq!(object.api(), GraphicsBackendType::Unknown);
}
